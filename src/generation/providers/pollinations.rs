use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::Url;

use crate::generation::providers::GenerationProvider;
use crate::generation::types::{ProviderError, ProviderOutput};

const POLLINATIONS_BASE: &str = "https://image.pollinations.ai";
const PROVIDER: &str = "pollinations";

/// Terminal image tier: a free, no-auth API where the prompt is the URL.
/// The fetch both checks that the service is up and warms the image; the
/// persistence step downloads the same URL for storage.
pub struct Pollinations;

#[async_trait]
impl GenerationProvider for Pollinations {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(45)
    }

    async fn generate(
        &self,
        client: &reqwest::Client,
        prompt: &str,
    ) -> Result<ProviderOutput, ProviderError> {
        let seed: u32 = rand::rng().random_range(0..1_000_000);

        let mut url = Url::parse(POLLINATIONS_BASE).expect("static base url");
        url.path_segments_mut()
            .expect("http url has path segments")
            .extend(["prompt", prompt]);
        url.query_pairs_mut()
            .append_pair("width", "512")
            .append_pair("height", "512")
            .append_pair("seed", &seed.to_string())
            .append_pair("nologo", "true");

        let response = client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(PROVIDER, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_response(PROVIDER, status.as_u16(), body));
        }

        Ok(ProviderOutput::Remote(url.to_string()))
    }
}
