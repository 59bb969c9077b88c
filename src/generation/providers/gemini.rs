use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::config::CONFIG;
use crate::generation::providers::GenerationProvider;
use crate::generation::types::{ProviderError, ProviderOutput};

const GEMINI_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash-exp:generateContent";
const PROVIDER: &str = "gemini";

/// Secondary image tier: a general-purpose generative API asked for an
/// inline image. The output comes back base64-encoded in the response body
/// rather than as a hosted URL.
pub struct GeminiImage;

#[async_trait]
impl GenerationProvider for GeminiImage {
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
            .gemini_api_key
            .as_deref()
            .ok_or(ProviderError::Unconfigured(PROVIDER))?;

        let payload = json!({
            "contents": [{
                "parts": [{
                    "text": format!(
                        "Generate an artistic, beautiful image of: {}. Make it serene, calming, and visually appealing.",
                        prompt
                    ),
                }],
            }],
            "generationConfig": {
                "responseModalities": ["image", "text"],
                "responseMimeType": "text/plain",
            },
        });

        let response = client
            .post(GEMINI_ENDPOINT)
            .query(&[("key", key)])
            .json(&payload)
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(PROVIDER, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_response(PROVIDER, status.as_u16(), body));
        }

        let result = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| ProviderError::from_transport(PROVIDER, e))?;

        if let Some(parts) = result["candidates"][0]["content"]["parts"].as_array() {
            for part in parts {
                let mime = part["inlineData"]["mimeType"].as_str().unwrap_or_default();
                if mime.starts_with("image/") {
                    if let Some(data) = part["inlineData"]["data"].as_str() {
                        return Ok(ProviderOutput::Inline {
                            mime: mime.to_string(),
                            data: data.to_string(),
                        });
                    }
                }
            }
        }
        Err(ProviderError::Empty { provider: PROVIDER })
    }
}
