use axum::extract::Path;
use axum::{Extension, Json};
use serde_json::Value;

use super::parse_id;
use crate::database::models::{LeadGroup, LeadGroupWithContacts};
use crate::error::ApiError;
use crate::middleware::auth::Identity;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::lead_groups_service::LeadGroupsService;
use crate::validation::{validate_insert_lead_group, validate_update_lead_group};

/// GET /api/lead-groups
pub async fn list(Extension(identity): Extension<Identity>) -> ApiResult<Vec<LeadGroup>> {
    let groups = LeadGroupsService::new().await?.list(&identity).await?;
    Ok(ApiResponse::success(groups))
}

/// GET /api/lead-groups/:id - group plus its member contacts
pub async fn get(
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<LeadGroupWithContacts> {
    let group_id = parse_id(&id, "lead group")?;
    let group = LeadGroupsService::new()
        .await?
        .get_with_contacts(&identity, group_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Lead group not found"))?;
    Ok(ApiResponse::success(group))
}

/// POST /api/lead-groups
pub async fn create(
    Extension(identity): Extension<Identity>,
    Json(body): Json<Value>,
) -> ApiResult<LeadGroup> {
    let input = validate_insert_lead_group(&body)?;
    let group = LeadGroupsService::new()
        .await?
        .create(&identity, input)
        .await?;
    Ok(ApiResponse::created(group))
}

/// PUT /api/lead-groups/:id
pub async fn update(
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<LeadGroup> {
    let group_id = parse_id(&id, "lead group")?;
    let patch = validate_update_lead_group(&body)?;
    let group = LeadGroupsService::new()
        .await?
        .update(&identity, group_id, patch)
        .await?
        .ok_or_else(|| ApiError::not_found("Lead group not found"))?;
    Ok(ApiResponse::success(group))
}

/// DELETE /api/lead-groups/:id - removes memberships, never the contacts
pub async fn delete(
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let group_id = parse_id(&id, "lead group")?;
    let deleted = LeadGroupsService::new()
        .await?
        .delete(&identity, group_id)
        .await?;
    if !deleted {
        return Err(ApiError::not_found("Lead group not found"));
    }
    Ok(ApiResponse::<()>::message("Lead group deleted successfully"))
}

/// POST /api/lead-groups/:id/contacts/:contactId
pub async fn add_contact(
    Extension(identity): Extension<Identity>,
    Path((id, contact_id)): Path<(String, String)>,
) -> ApiResult<()> {
    let group_id = parse_id(&id, "lead group")?;
    let contact_id = parse_id(&contact_id, "contact")?;
    LeadGroupsService::new()
        .await?
        .add_contact(&identity, group_id, contact_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Lead group or contact not found"))?;
    Ok(ApiResponse::<()>::message("Contact added to lead group"))
}

/// DELETE /api/lead-groups/:id/contacts/:contactId
pub async fn remove_contact(
    Extension(identity): Extension<Identity>,
    Path((id, contact_id)): Path<(String, String)>,
) -> ApiResult<()> {
    let group_id = parse_id(&id, "lead group")?;
    let contact_id = parse_id(&contact_id, "contact")?;
    let removed = LeadGroupsService::new()
        .await?
        .remove_contact(&identity, group_id, contact_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Lead group or contact not found"))?;
    if !removed {
        return Err(ApiError::not_found("Contact is not in this lead group"));
    }
    Ok(ApiResponse::<()>::message("Contact removed from lead group"))
}
