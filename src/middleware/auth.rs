use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::{validate_jwt, Claims};
use crate::config;
use crate::error::ApiError;

/// Acting identity extracted from the bearer token; every scoped query keys
/// off `(org_id, user_id)`.
#[derive(Clone, Debug)]
pub struct Identity {
    pub user_id: String,
    pub org_id: i64,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image_url: Option<String>,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            org_id: claims
                .org_id
                .unwrap_or(config::config().tenancy.default_org_id),
            email: claims.email,
            first_name: claims.first_name,
            last_name: claims.last_name,
            image_url: claims.image_url,
        }
    }
}

/// Bearer-JWT middleware that validates tokens and attaches the identity.
/// Runs before any handler; an absent or invalid credential short-circuits
/// with an enveloped 401.
pub async fn jwt_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer_token(&headers)
        .map_err(|msg| ApiError::unauthorized(msg).into_response())?;

    let secret = &config::config().security.jwt_secret;
    let claims = validate_jwt(&token, secret)
        .map_err(|e| ApiError::unauthorized(e.to_string()).into_response())?;

    let identity = Identity::from(claims);
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer ...` header
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty bearer token".to_string());
        }
        Ok(token.to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}
