use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::json;

use crate::config::CONFIG;
use crate::generation::providers::GenerationProvider;
use crate::generation::types::{ProviderError, ProviderOutput};
use crate::generation::SOUND_DURATION_SECS;

const ELEVENLABS_ENDPOINT: &str = "https://api.elevenlabs.io/v1/sound-generation";
const PROVIDER: &str = "elevenlabs";

/// Secondary sound tier. The API answers with raw audio bytes, which are
/// carried inline (base64) to the persistence step.
pub struct ElevenLabsSound;

#[async_trait]
impl GenerationProvider for ElevenLabsSound {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(60)
    }

    async fn generate(
        &self,
        client: &reqwest::Client,
        prompt: &str,
    ) -> Result<ProviderOutput, ProviderError> {
        let key = CONFIG
            .providers
            .elevenlabs_api_key
            .as_deref()
            .ok_or(ProviderError::Unconfigured(PROVIDER))?;

        let response = client
            .post(ELEVENLABS_ENDPOINT)
            .header("xi-api-key", key)
            .json(&json!({
                "text": prompt,
                "duration_seconds": SOUND_DURATION_SECS,
                "prompt_influence": 0.3,
            }))
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(PROVIDER, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_response(PROVIDER, status.as_u16(), body));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| ProviderError::from_transport(PROVIDER, e))?;
        if audio.is_empty() {
            return Err(ProviderError::Empty { provider: PROVIDER });
        }

        Ok(ProviderOutput::Inline {
            mime: "audio/mpeg".to_string(),
            data: STANDARD.encode(&audio),
        })
    }
}
