use axum::Extension;

use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::auth::Identity;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::users_service::UsersService;

/// GET /api/auth/profile - the stored user row for the acting identity.
/// The ensure-user middleware has already materialized it.
pub async fn profile(Extension(identity): Extension<Identity>) -> ApiResult<User> {
    let user = UsersService::new()
        .await?
        .get_profile(&identity)
        .await?
        .ok_or_else(|| ApiError::not_found("User profile not found"))?;
    Ok(ApiResponse::success(user))
}
