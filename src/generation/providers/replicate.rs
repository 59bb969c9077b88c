use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde_json::{json, Value};

use crate::config::CONFIG;
use crate::generation::providers::GenerationProvider;
use crate::generation::types::{ProviderError, ProviderOutput};

const REPLICATE_ENDPOINT: &str = "https://api.replicate.com/v1/predictions";
const ANIMATEDIFF_VERSION: &str =
    "db21e45d3f7023abc2a46ee38a23973f6dce16bb082a930b0c49861f96d1e5bf";
const POLL_INTERVAL: Duration = Duration::from_secs(2);
const MAX_POLLS: usize = 60;
const PROVIDER: &str = "replicate";

/// Terminal living-image tier. Replicate's API is asynchronous: a
/// prediction is created, then polled until it settles. The chain-level
/// timeout still bounds the whole attempt.
pub struct ReplicateVideo;

fn output_url(output: &Value) -> Option<String> {
    if let Some(url) = output.as_str() {
        return Some(url.to_string());
    }
    output
        .as_array()
        .and_then(|items| items.first())
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[async_trait]
impl GenerationProvider for ReplicateVideo {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(120)
    }

    async fn generate(
        &self,
        client: &reqwest::Client,
        prompt: &str,
    ) -> Result<ProviderOutput, ProviderError> {
        let key = CONFIG
            .providers
            .replicate_api_key
            .as_deref()
            .ok_or(ProviderError::Unconfigured(PROVIDER))?;

        let response = client
            .post(REPLICATE_ENDPOINT)
            .header(AUTHORIZATION, format!("Token {}", key))
            .json(&json!({
                "version": ANIMATEDIFF_VERSION,
                "input": {
                    "prompt": prompt,
                    "num_frames": 16,
                    "fps": 8,
                },
            }))
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(PROVIDER, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_response(PROVIDER, status.as_u16(), body));
        }

        let mut prediction = response
            .json::<Value>()
            .await
            .map_err(|e| ProviderError::from_transport(PROVIDER, e))?;
        let id = prediction["id"]
            .as_str()
            .ok_or(ProviderError::Empty { provider: PROVIDER })?
            .to_string();

        let mut polls = 0;
        while prediction["status"] != "succeeded"
            && prediction["status"] != "failed"
            && polls < MAX_POLLS
        {
            tokio::time::sleep(POLL_INTERVAL).await;
            let poll = client
                .get(format!("{}/{}", REPLICATE_ENDPOINT, id))
                .header(AUTHORIZATION, format!("Token {}", key))
                .send()
                .await
                .map_err(|e| ProviderError::from_transport(PROVIDER, e))?;
            prediction = poll
                .json::<Value>()
                .await
                .map_err(|e| ProviderError::from_transport(PROVIDER, e))?;
            polls += 1;
        }

        if prediction["status"] == "succeeded" {
            if let Some(url) = output_url(&prediction["output"]) {
                return Ok(ProviderOutput::Remote(url));
            }
        }

        Err(ProviderError::Transient {
            provider: PROVIDER,
            detail: format!("prediction did not complete: {}", prediction["status"]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_url_accepts_string_or_array() {
        assert_eq!(
            output_url(&json!("https://r/video.mp4")),
            Some("https://r/video.mp4".to_string())
        );
        assert_eq!(
            output_url(&json!(["https://r/a.mp4", "https://r/b.mp4"])),
            Some("https://r/a.mp4".to_string())
        );
        assert_eq!(output_url(&json!(null)), None);
    }
}
