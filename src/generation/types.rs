use serde::Serialize;
use thiserror::Error;

use crate::schema::enum_def::GenerationKind;

/// What a provider hands back on success: either a URL the persistence step
/// fetches, or an inline base64 payload it decodes.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderOutput {
    Remote(String),
    Inline { mime: String, data: String },
}

/// Informational label derived purely from chain position; it says which
/// fallback tier served the request, not anything about measured output
/// quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    High,
    Standard,
    Basic,
}

impl Quality {
    pub fn from_tier(tier: usize) -> Self {
        match tier {
            0 => Quality::High,
            1 => Quality::Standard,
            _ => Quality::Basic,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::High => "high",
            Quality::Standard => "standard",
            Quality::Basic => "basic",
        }
    }
}

/// HTTP statuses classified as transient: the chain moves on to the next
/// provider instead of failing the request.
const TRANSIENT_STATUS: [u16; 7] = [402, 403, 429, 500, 502, 503, 504];

/// Secondary check for statuses outside the list above: upstreams sometimes
/// wrap a throttle or outage in an unexpected status, so the body text gets
/// one pass over the known transient phrases before an error is ruled
/// permanent.
const TRANSIENT_PHRASES: [&str; 11] = [
    "quota exceeded",
    "rate limit",
    "model unavailable",
    "insufficient",
    "payment required",
    "forbidden",
    "too many requests",
    "timeout",
    "service unavailable",
    "internal server error",
    "bad gateway",
];

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{0} is not configured")]
    Unconfigured(&'static str),
    #[error("{provider} transient failure: {detail}")]
    Transient {
        provider: &'static str,
        detail: String,
    },
    #[error("{provider} request failed: {detail}")]
    Permanent {
        provider: &'static str,
        detail: String,
    },
    #[error("{provider} returned no usable output")]
    Empty { provider: &'static str },
    #[error("{provider} timed out")]
    Timeout { provider: &'static str },
}

impl ProviderError {
    /// Whether the chain should advance past this failure. Only permanent
    /// errors abort the whole request.
    pub fn falls_through(&self) -> bool {
        !matches!(self, ProviderError::Permanent { .. })
    }

    /// Classify a non-2xx provider response.
    pub fn from_response(provider: &'static str, status: u16, body: String) -> Self {
        if TRANSIENT_STATUS.contains(&status) {
            return ProviderError::Transient {
                provider,
                detail: format!("status {}: {}", status, body),
            };
        }
        let lower = body.to_lowercase();
        if TRANSIENT_PHRASES.iter().any(|phrase| lower.contains(phrase)) {
            return ProviderError::Transient {
                provider,
                detail: format!("status {}: {}", status, body),
            };
        }
        ProviderError::Permanent {
            provider,
            detail: format!("status {}: {}", status, body),
        }
    }

    /// Classify a reqwest transport failure (refused connection, reset,
    /// DNS): likely temporary, so the chain advances.
    pub fn from_transport(provider: &'static str, err: reqwest::Error) -> Self {
        ProviderError::Transient {
            provider,
            detail: err.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ChainError {
    #[error("all {0} providers are resting")]
    Exhausted(GenerationKind),
    #[error(transparent)]
    Provider(ProviderError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listed_statuses_are_transient() {
        for status in [402, 403, 429, 500, 502, 503, 504] {
            let err = ProviderError::from_response("fal", status, String::new());
            assert!(
                matches!(err, ProviderError::Transient { .. }),
                "status {} should be transient",
                status
            );
        }
    }

    #[test]
    fn transient_phrase_matches_case_insensitively() {
        let err = ProviderError::from_response("fal", 400, "Rate Limit hit, slow down".to_string());
        assert!(matches!(err, ProviderError::Transient { .. }));
    }

    #[test]
    fn unknown_status_without_phrase_is_permanent() {
        let err = ProviderError::from_response("fal", 400, "prompt rejected".to_string());
        assert!(matches!(err, ProviderError::Permanent { .. }));
        assert!(!err.falls_through());
    }

    #[test]
    fn unconfigured_and_timeout_fall_through() {
        assert!(ProviderError::Unconfigured("gemini").falls_through());
        assert!(ProviderError::Timeout { provider: "fal" }.falls_through());
        assert!(ProviderError::Empty { provider: "fal" }.falls_through());
    }

    #[test]
    fn quality_follows_chain_position() {
        assert_eq!(Quality::from_tier(0), Quality::High);
        assert_eq!(Quality::from_tier(1), Quality::Standard);
        assert_eq!(Quality::from_tier(2), Quality::Basic);
        assert_eq!(Quality::from_tier(7), Quality::Basic);
    }
}
