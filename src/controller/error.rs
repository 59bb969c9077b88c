use axum::{
    response::{IntoResponse, Response},
    Json,
};
use cyder_tools::log::error;
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::generation::types::ChainError;
use crate::schema::enum_def::GenerationKind;
use crate::service::artifact::ArtifactError;
use crate::service::storage::types::StorageError;

#[derive(Debug)]
pub enum BaseError {
    ParamInvalid(String),
    InsufficientBalance,
    NotFound(Option<String>),
    /// Every provider in the fallback chain failed or was unconfigured.
    /// Surfaced as a calm 503 so clients show a retry message, not an alarm.
    Resting(GenerationKind),
    DatabaseFatal(Option<String>),
    InternalServerError(Option<String>),
}

impl From<diesel::result::Error> for BaseError {
    fn from(err: diesel::result::Error) -> Self {
        BaseError::DatabaseFatal(Some(err.to_string()))
    }
}

impl From<StorageError> for BaseError {
    fn from(err: StorageError) -> Self {
        BaseError::InternalServerError(Some(err.to_string()))
    }
}

impl From<ArtifactError> for BaseError {
    fn from(err: ArtifactError) -> Self {
        BaseError::InternalServerError(Some(err.to_string()))
    }
}

impl From<ChainError> for BaseError {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::Exhausted(kind) => BaseError::Resting(kind),
            ChainError::Provider(provider_err) => {
                BaseError::InternalServerError(Some(provider_err.to_string()))
            }
        }
    }
}

fn resting_body(kind: GenerationKind) -> Value {
    match kind {
        GenerationKind::Image => json!({
            "error": "All generation providers are currently resting. Please try again later.",
            "resting": true,
        }),
        GenerationKind::Sound => json!({
            "error": "AI music is resting. Enjoy the ambient garden sound instead.",
            "resting": true,
            "fallbackAudio": "/audio/hidden-garden.mp3",
        }),
        GenerationKind::Living => json!({
            "error": "Video generation is temporarily resting. Try creating an AI image instead.",
            "resting": true,
            "suggestAlternative": "image",
        }),
    }
}

impl IntoResponse for BaseError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            BaseError::ParamInvalid(reason) => {
                (StatusCode::BAD_REQUEST, json!({ "error": reason }))
            }
            BaseError::InsufficientBalance => {
                (StatusCode::BAD_REQUEST, json!({ "error": "Not enough CTY" }))
            }
            BaseError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                json!({ "error": msg.unwrap_or("data not found".to_string()) }),
            ),
            BaseError::Resting(kind) => (StatusCode::SERVICE_UNAVAILABLE, resting_body(kind)),
            BaseError::DatabaseFatal(msg) => {
                error!(
                    "database failure: {}",
                    msg.unwrap_or("unknown error".to_string())
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Something went wrong. Please try again." }),
                )
            }
            BaseError::InternalServerError(msg) => {
                error!(
                    "internal error: {}",
                    msg.unwrap_or("unknown error".to_string())
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Something went wrong. Please try again." }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resting_sound_keeps_ambient_fallback() {
        let body = resting_body(GenerationKind::Sound);
        assert_eq!(body["resting"], true);
        assert_eq!(body["fallbackAudio"], "/audio/hidden-garden.mp3");
    }

    #[test]
    fn resting_living_suggests_image_instead() {
        let body = resting_body(GenerationKind::Living);
        assert_eq!(body["resting"], true);
        assert_eq!(body["suggestAlternative"], "image");
    }

    #[test]
    fn chain_exhaustion_maps_to_service_unavailable() {
        let err: BaseError = ChainError::Exhausted(GenerationKind::Image).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
