use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;
use crate::middleware::auth::Identity;
use crate::services::users_service::UsersService;

/// Materializes the local user row on the first authenticated request from a
/// new identity. The upsert is conflict-tolerant, so concurrent first
/// requests cannot trip a duplicate-key failure; for known identities this is
/// a no-op beyond the insert attempt.
pub async fn ensure_user_middleware(request: Request, next: Next) -> Result<Response, Response> {
    let identity = request
        .extensions()
        .get::<Identity>()
        .cloned()
        .ok_or_else(|| {
            ApiError::unauthorized("Authentication required before user resolution").into_response()
        })?;

    let service = UsersService::new()
        .await
        .map_err(|e| ApiError::from(e).into_response())?;
    service
        .ensure_exists(&identity)
        .await
        .map_err(|e| ApiError::from(e).into_response())?;

    Ok(next.run(request).await)
}
