use std::time::{SystemTime, UNIX_EPOCH};

use axum::body::Body;
use axum::extract::Request;
use axum::http::{self, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cyder_tools::auth::{
    decode_jwt, issue_jwt, DecodingKey,
    EncodingKey, JwtError, JwtValidation
};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::CONFIG;

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Keys {
    fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

static KEYS: Lazy<Keys> =
    Lazy::new(|| Keys::new(CONFIG.jwt_secret.as_bytes()));

const ISSUER: &str = "sanctra-api";
const ACCESS_TOKEN_SUBJECT: &str = "USER";
const ACCESS_TOKEN_ISSUE_SEC: u64 = 3600;

fn get_current_timestamp() -> u64 {
    let now = SystemTime::now();
    now.duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_secs()
}

#[derive(Debug, Serialize, Deserialize)]
struct AccessClaims {
    aud: String,
    exp: u64,
    iat: u64,
    iss: String,
    sub: String,
}

impl AccessClaims {
    fn new(id: i64) -> Self {
        let now = get_current_timestamp();
        AccessClaims {
            aud: id.to_string(),
            exp: now + ACCESS_TOKEN_ISSUE_SEC,
            iat: now,
            iss: ISSUER.to_string(),
            sub: ACCESS_TOKEN_SUBJECT.to_string(),
        }
    }
}

/// The authenticated caller, inserted into request extensions by the
/// middleware below.
#[derive(Clone)]
pub struct JwtResult {
    pub id: i64,
}

pub fn issue_access_token(id: i64) -> String {
    let claims = AccessClaims::new(id);
    issue_jwt(&KEYS.encoding, &claims)
}

fn decode_access_token(token: &str) -> Result<JwtResult, JwtError> {
    let validate = JwtValidation {
        validate_aud: false,
        issuer: ISSUER,
        required_spec: &["sub", "iat", "exp"],
    };
    let result = decode_jwt::<AccessClaims>(&KEYS.decoding, token, validate)?;
    let user_id = result.aud.parse::<i64>().map_err(|_| JwtError::Parse)?;
    Ok(JwtResult { id: user_id })
}

#[derive(Debug)]
pub enum AuthError {
    Empty,
    Invalid,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AuthError::Empty => (StatusCode::UNAUTHORIZED, "Missing authorization"),
            AuthError::Invalid => (StatusCode::UNAUTHORIZED, "Invalid token"),
        };
        let body = Json(json!({
            "error": error_message,
        }));
        (status, body).into_response()
    }
}

pub async fn authorization_access_middleware(
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, AuthError> {
    let auth_header = req.headers_mut().get(http::header::AUTHORIZATION);

    let auth_header = match auth_header {
        Some(header) => header.to_str().map_err(|_| AuthError::Invalid)?,
        None => return Err(AuthError::Empty),
    };
    let mut header = auth_header.split_whitespace();
    let (_, token) = (header.next(), header.next());
    let token = token.ok_or(AuthError::Empty)?;
    let token_data = match decode_access_token(token) {
        Ok(data) => data,
        Err(_) => {
            return Err(AuthError::Invalid);
        }
    };
    req.extensions_mut().insert(token_data);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_round_trips() {
        let token = issue_access_token(4242);
        let decoded = decode_access_token(&token).unwrap();
        assert_eq!(decoded.id, 4242);
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(decode_access_token("not-a-jwt").is_err());
    }
}
