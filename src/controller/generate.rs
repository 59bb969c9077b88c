use axum::{
    extract::{Path, Query},
    middleware,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use cyder_tools::log::warn;
use serde::{Deserialize, Serialize};

use crate::config::{CostsConfig, CONFIG};
use crate::controller::BaseError;
use crate::database::artifact::{Artifact, NewArtifact};
use crate::database::profile::UserProfile;
use crate::database::{DbResult, ListResult};
use crate::generation::chain::run_chain;
use crate::generation::providers::chain_for;
use crate::generation::types::Quality;
use crate::generation::validate::validate_prompt;
use crate::generation::{build_http_client, SOUND_DURATION_SECS};
use crate::schema::enum_def::GenerationKind;
use crate::service::artifact::store_artifact;
use crate::service::storage::get_storage;
use crate::utils::auth::{authorization_access_middleware, JwtResult};
use crate::utils::{HttpResult, ID_GENERATOR};

#[derive(Deserialize)]
struct GeneratePayload {
    prompt: Option<String>,
}

#[derive(Serialize)]
struct GenerateResponse {
    url: String,
    prompt: String,
    #[serde(rename = "type")]
    kind: GenerationKind,
    provider: &'static str,
    quality: Quality,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration: Option<u32>,
}

/// The full generation flow: validate, gate on balance, run the fallback
/// chain, persist, then deduct. Order matters: the deduction comes last so
/// a failure anywhere above leaves the balance untouched.
async fn run_generation(
    caller_id: i64,
    kind: GenerationKind,
    prompt: String,
) -> Result<GenerateResponse, BaseError> {
    validate_prompt(kind, &prompt).map_err(BaseError::ParamInvalid)?;

    let cost = CONFIG.costs.cost(kind);
    let profile = UserProfile::find(caller_id)?.ok_or(BaseError::InsufficientBalance)?;
    if profile.cty_balance < cost {
        return Err(BaseError::InsufficientBalance);
    }

    let client = build_http_client()?;
    let providers = chain_for(kind);
    let outcome = run_chain(kind, &providers, &client, &prompt).await?;

    let stored = store_artifact(
        get_storage().await.as_ref(),
        &client,
        caller_id,
        kind,
        &outcome.output,
    )
    .await?;

    UserProfile::set_cty_balance(caller_id, profile.cty_balance - cost)?;

    // The ledger row is informational; losing it is not worth failing a
    // request that already produced and charged for an artifact.
    let new_artifact = NewArtifact {
        id: ID_GENERATOR.generate_id(),
        user_id: caller_id,
        kind,
        prompt: prompt.clone(),
        provider: outcome.provider.to_string(),
        quality: outcome.quality.as_str().to_string(),
        object_key: stored.object_key,
        url: stored.url.clone(),
        cost,
        created_at: Utc::now().timestamp_millis(),
    };
    if let Err(e) = Artifact::create(&new_artifact) {
        warn!("Failed to record artifact for user {}: {:?}", caller_id, e);
    }

    Ok(GenerateResponse {
        url: stored.url,
        prompt,
        kind,
        provider: outcome.provider,
        quality: outcome.quality,
        duration: (kind == GenerationKind::Sound).then_some(SOUND_DURATION_SECS),
    })
}

async fn generate_image(
    Extension(caller): Extension<JwtResult>,
    Json(payload): Json<GeneratePayload>,
) -> Result<Json<GenerateResponse>, BaseError> {
    let prompt = payload.prompt.unwrap_or_default();
    run_generation(caller.id, GenerationKind::Image, prompt)
        .await
        .map(Json)
}

async fn generate_sound(
    Extension(caller): Extension<JwtResult>,
    Json(payload): Json<GeneratePayload>,
) -> Result<Json<GenerateResponse>, BaseError> {
    let prompt = payload.prompt.unwrap_or_default();
    run_generation(caller.id, GenerationKind::Sound, prompt)
        .await
        .map(Json)
}

async fn generate_living(
    Extension(caller): Extension<JwtResult>,
    Json(payload): Json<GeneratePayload>,
) -> Result<Json<GenerateResponse>, BaseError> {
    let prompt = payload.prompt.unwrap_or_default();
    run_generation(caller.id, GenerationKind::Living, prompt)
        .await
        .map(Json)
}

async fn get_costs() -> Json<CostsConfig> {
    Json(CONFIG.costs.clone())
}

#[derive(Deserialize)]
struct HistoryQuery {
    page: Option<i64>,
    page_size: Option<i64>,
}

async fn list_history(
    Extension(caller): Extension<JwtResult>,
    Query(params): Query<HistoryQuery>,
) -> DbResult<HttpResult<ListResult<Artifact>>> {
    let result = Artifact::list_by_user(caller.id, params.page, params.page_size)?;
    Ok(HttpResult::new(result))
}

async fn delete_artifact(
    Extension(caller): Extension<JwtResult>,
    Path(id): Path<i64>,
) -> Result<HttpResult<()>, BaseError> {
    let artifact = Artifact::find(id)?.ok_or(BaseError::NotFound(None))?;
    if artifact.user_id != caller.id {
        // don't reveal other users' artifact ids
        return Err(BaseError::NotFound(None));
    }

    if let Err(e) = get_storage().await.delete_object(&artifact.object_key).await {
        warn!(
            "Failed to delete stored object {}: {}",
            artifact.object_key, e
        );
    }
    Artifact::delete(id)?;
    Ok(HttpResult::new(()))
}

pub fn create_generate_router() -> Router {
    Router::new().nest(
        "/generate",
        Router::new()
            .route("/image", post(generate_image))
            .route("/sound", post(generate_sound))
            .route("/living", post(generate_living))
            .route("/history", get(list_history))
            .route("/history/{id}", delete(delete_artifact))
            .layer(middleware::from_fn(authorization_access_middleware))
            .route("/costs", get(get_costs)),
    )
}
