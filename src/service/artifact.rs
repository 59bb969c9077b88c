use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use chrono::Utc;
use thiserror::Error;

use crate::generation::types::ProviderOutput;
use crate::schema::enum_def::GenerationKind;
use crate::service::storage::types::{PutObjectOptions, StorageError};
use crate::service::storage::Storage;

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("failed to download generated {0}")]
    Download(GenerationKind),
    #[error("failed to decode inline payload: {0}")]
    Decode(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug)]
pub struct StoredArtifact {
    pub object_key: String,
    pub url: String,
}

fn content_type(kind: GenerationKind) -> &'static str {
    match kind {
        GenerationKind::Image => "image/png",
        GenerationKind::Sound => "audio/mpeg",
        GenerationKind::Living => "video/mp4",
    }
}

fn object_key(caller_id: i64, kind: GenerationKind, timestamp_millis: i64) -> String {
    match kind {
        GenerationKind::Image => format!("{}/ai_{}.png", caller_id, timestamp_millis),
        GenerationKind::Sound => format!("{}/ai_sound_{}.mp3", caller_id, timestamp_millis),
        GenerationKind::Living => format!("{}/ai_living_{}.mp4", caller_id, timestamp_millis),
    }
}

/// Materializes a provider's output as a durable object: inline payloads
/// are decoded, remote ones fetched, then the bytes land in storage under a
/// caller-scoped key. Nothing here touches the caller's balance; the
/// deduction happens only after this step returns Ok.
pub async fn store_artifact(
    storage: &dyn Storage,
    client: &reqwest::Client,
    caller_id: i64,
    kind: GenerationKind,
    output: &ProviderOutput,
) -> Result<StoredArtifact, ArtifactError> {
    let bytes = match output {
        ProviderOutput::Inline { data, .. } => Bytes::from(
            STANDARD
                .decode(data)
                .map_err(|e| ArtifactError::Decode(e.to_string()))?,
        ),
        ProviderOutput::Remote(url) => {
            let response = client
                .get(url)
                .send()
                .await
                .map_err(|_| ArtifactError::Download(kind))?;
            if !response.status().is_success() {
                return Err(ArtifactError::Download(kind));
            }
            response
                .bytes()
                .await
                .map_err(|_| ArtifactError::Download(kind))?
        }
    };

    let key = object_key(caller_id, kind, Utc::now().timestamp_millis());
    storage
        .put_object(
            &key,
            bytes,
            Some(PutObjectOptions {
                content_type: Some(content_type(kind)),
            }),
        )
        .await?;

    let url = storage.public_url(&key);
    Ok(StoredArtifact {
        object_key: key,
        url,
    })
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::service::storage::local::LocalStorage;

    // 1x1 transparent png
    const TINY_PNG_B64: &str =
        "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    #[tokio::test]
    async fn inline_output_is_decoded_and_stored() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().to_str().unwrap(), "/files");
        let client = reqwest::Client::new();
        let output = ProviderOutput::Inline {
            mime: "image/png".to_string(),
            data: TINY_PNG_B64.to_string(),
        };

        let stored = store_artifact(&storage, &client, 41, GenerationKind::Image, &output)
            .await
            .unwrap();

        assert!(stored.object_key.starts_with("41/ai_"));
        assert!(stored.object_key.ends_with(".png"));
        assert_eq!(stored.url, format!("/files/{}", stored.object_key));

        let bytes = storage.get_object(&stored.object_key).await.unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[tokio::test]
    async fn sound_and_living_keys_carry_kind_prefixes() {
        assert_eq!(
            object_key(7, GenerationKind::Sound, 1700000000000),
            "7/ai_sound_1700000000000.mp3"
        );
        assert_eq!(
            object_key(7, GenerationKind::Living, 1700000000000),
            "7/ai_living_1700000000000.mp4"
        );
    }

    #[tokio::test]
    async fn malformed_inline_payload_fails_without_storing() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().to_str().unwrap(), "/files");
        let client = reqwest::Client::new();
        let output = ProviderOutput::Inline {
            mime: "image/png".to_string(),
            data: "%%% not base64 %%%".to_string(),
        };

        let err = store_artifact(&storage, &client, 41, GenerationKind::Image, &output)
            .await
            .unwrap_err();
        assert!(matches!(err, ArtifactError::Decode(_)));
    }
}
