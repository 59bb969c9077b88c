use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde_json::{json, Value};

use crate::config::CONFIG;
use crate::generation::providers::GenerationProvider;
use crate::generation::types::{ProviderError, ProviderOutput};

const FAL_QUEUE_BASE: &str = "https://queue.fal.run";
const PROVIDER: &str = "fal";

async fn invoke_fal(
    client: &reqwest::Client,
    path: &str,
    payload: Value,
) -> Result<Value, ProviderError> {
    let key = CONFIG
        .providers
        .fal_api_key
        .as_deref()
        .ok_or(ProviderError::Unconfigured(PROVIDER))?;

    let response = client
        .post(format!("{}/{}", FAL_QUEUE_BASE, path))
        .header(AUTHORIZATION, format!("Key {}", key))
        .json(&payload)
        .send()
        .await
        .map_err(|e| ProviderError::from_transport(PROVIDER, e))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::from_response(PROVIDER, status.as_u16(), body));
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| ProviderError::from_transport(PROVIDER, e))
}

/// Primary image tier: flux/schnell.
pub struct FalFluxImage;

#[async_trait]
impl GenerationProvider for FalFluxImage {
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
        let result = invoke_fal(
            client,
            "fal-ai/flux/schnell",
            json!({
                "prompt": prompt,
                "image_size": "square_hd",
                "num_images": 1,
                "enable_safety_checker": true,
            }),
        )
        .await?;

        if let Some(url) = result["images"][0]["url"].as_str() {
            return Ok(ProviderOutput::Remote(url.to_string()));
        }
        Err(ProviderError::Empty { provider: PROVIDER })
    }
}

/// Primary sound tier: stable-audio, fixed 15 second clips.
pub struct FalStableAudio;

#[async_trait]
impl GenerationProvider for FalStableAudio {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(90)
    }

    async fn generate(
        &self,
        client: &reqwest::Client,
        prompt: &str,
    ) -> Result<ProviderOutput, ProviderError> {
        let result = invoke_fal(
            client,
            "fal-ai/stable-audio",
            json!({
                "prompt": prompt,
                "seconds_total": crate::generation::SOUND_DURATION_SECS,
                "steps": 100,
            }),
        )
        .await?;

        if let Some(url) = result["audio_file"]["url"].as_str() {
            return Ok(ProviderOutput::Remote(url.to_string()));
        }
        Err(ProviderError::Empty { provider: PROVIDER })
    }
}

/// Primary living-image tier: fast-animatediff text-to-video.
pub struct FalAnimateDiff;

#[async_trait]
impl GenerationProvider for FalAnimateDiff {
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
        let result = invoke_fal(
            client,
            "fal-ai/fast-animatediff/text-to-video",
            json!({
                "prompt": prompt,
                "num_frames": 16,
                "num_inference_steps": 4,
                "guidance_scale": 1.0,
                "fps": 8,
                "video_size": "square",
            }),
        )
        .await?;

        if let Some(url) = result["video"]["url"].as_str() {
            return Ok(ProviderOutput::Remote(url.to_string()));
        }
        Err(ProviderError::Empty { provider: PROVIDER })
    }
}
