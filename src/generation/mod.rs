use cyder_tools::log::error;
use reqwest::Proxy;

use crate::config::CONFIG;
use crate::controller::BaseError;

pub mod chain;
pub mod providers;
pub mod types;
pub mod validate;

/// Generated sound clips have a fixed length; the value is echoed in the
/// success response so clients can size their players.
pub const SOUND_DURATION_SECS: u32 = 15;

/// Builds the outbound HTTP client for provider calls, honoring the egress
/// proxy when one is configured.
pub fn build_http_client() -> Result<reqwest::Client, BaseError> {
    let mut client_builder = reqwest::Client::builder();
    if let Some(proxy_url) = &CONFIG.proxy {
        let proxy = Proxy::https(proxy_url).map_err(|e| {
            error!("Invalid proxy URL '{}': {}", proxy_url, e);
            BaseError::InternalServerError(Some("Invalid proxy configuration".to_string()))
        })?;
        client_builder = client_builder.proxy(proxy);
    }
    client_builder.build().map_err(|e| {
        error!("Failed to build reqwest client: {}", e);
        BaseError::InternalServerError(Some("Failed to build HTTP client".to_string()))
    })
}
