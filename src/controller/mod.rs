use crate::config::{StorageDriver, CONFIG};
use axum::{
    http::{self, header, HeaderName, Method},
    response::IntoResponse,
    Router,
};
use generate::create_generate_router;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

mod error;
mod generate;

pub use error::BaseError;

// Mirrors the permissive headers the hosted deployment answered preflights
// with. The UI is served from a different origin.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ])
}

pub fn create_router() -> Router {
    let mut app = Router::new().nest(&CONFIG.base_path, create_generate_router());

    // With the local driver, stored artifacts are served straight out of
    // the storage root so their public URLs resolve.
    if CONFIG.storage.driver == StorageDriver::Local {
        app = app.nest_service(
            &CONFIG.storage.local.public_base,
            ServeDir::new(&CONFIG.storage.local.root),
        );
    }

    app.layer(cors_layer()).fallback(handle_404)
}

pub async fn handle_404() -> impl IntoResponse {
    (http::StatusCode::NOT_FOUND, "not found")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::util::ServiceExt;

    #[tokio::test]
    async fn generation_rejects_missing_authorization() {
        let app = create_router();
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("{}/generate/image", CONFIG.base_path))
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"prompt":"a quiet pond"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn costs_are_served_without_auth() {
        let app = create_router();
        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("{}/generate/costs", CONFIG.base_path))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let costs: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(costs["image"].is_i64());
        assert!(costs["sound"].is_i64());
        assert!(costs["living"].is_i64());
    }

    #[tokio::test]
    async fn unknown_routes_fall_through_to_404() {
        let app = create_router();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/definitely/not/here")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
