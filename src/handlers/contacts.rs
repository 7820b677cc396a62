use axum::extract::{Path, Query};
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::Value;

use super::parse_id;
use crate::database::models::ContactWithEvent;
use crate::error::ApiError;
use crate::middleware::auth::Identity;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::contacts_service::ContactsService;
use crate::validation::{validate_insert_contact, validate_update_contact};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// GET /api/contacts
pub async fn list(Extension(identity): Extension<Identity>) -> ApiResult<Vec<ContactWithEvent>> {
    let contacts = ContactsService::new().await?.list(&identity).await?;
    Ok(ApiResponse::success(contacts))
}

/// GET /api/contacts/search?q=
pub async fn search(
    Extension(identity): Extension<Identity>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Vec<ContactWithEvent>> {
    let q = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::bad_request("Search query is required"))?;
    let contacts = ContactsService::new().await?.search(&identity, q).await?;
    Ok(ApiResponse::success(contacts))
}

/// GET /api/contacts/:id
pub async fn get(
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<ContactWithEvent> {
    let contact_id = parse_id(&id, "contact")?;
    let contact = ContactsService::new()
        .await?
        .get_by_id(&identity, contact_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Contact not found"))?;
    Ok(ApiResponse::success(contact))
}

/// POST /api/contacts
pub async fn create(
    Extension(identity): Extension<Identity>,
    Json(body): Json<Value>,
) -> ApiResult<ContactWithEvent> {
    let input = validate_insert_contact(&body)?;
    let contact = ContactsService::new().await?.create(&identity, input).await?;
    Ok(ApiResponse::created(contact))
}

/// PUT /api/contacts/:id
pub async fn update(
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<ContactWithEvent> {
    let contact_id = parse_id(&id, "contact")?;
    let patch = validate_update_contact(&body)?;
    let contact = ContactsService::new()
        .await?
        .update(&identity, contact_id, patch)
        .await?
        .ok_or_else(|| ApiError::not_found("Contact not found"))?;
    Ok(ApiResponse::success(contact))
}

/// POST /api/contacts/:id/verify
pub async fn verify(
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<ContactWithEvent> {
    let contact_id = parse_id(&id, "contact")?;
    let contact = ContactsService::new()
        .await?
        .verify(&identity, contact_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Contact not found"))?;
    Ok(ApiResponse::success(contact))
}

/// DELETE /api/contacts/:id
pub async fn delete(
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let contact_id = parse_id(&id, "contact")?;
    let deleted = ContactsService::new()
        .await?
        .delete(&identity, contact_id)
        .await?;
    if !deleted {
        return Err(ApiError::not_found("Contact not found"));
    }
    Ok(ApiResponse::<()>::message("Contact deleted successfully"))
}
