use axum::extract::Path;
use axum::{Extension, Json};
use serde_json::Value;

use super::parse_id;
use crate::database::models::{EmailDraftWithDetails, EmailTemplate, GmailConnection};
use crate::error::ApiError;
use crate::middleware::auth::Identity;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::emails_service::EmailsService;
use crate::validation::{
    validate_draft_transition, validate_gmail_connection, validate_insert_draft,
    validate_insert_template, validate_update_draft, validate_update_template,
};

// ----- Templates -----

/// GET /api/emails/templates
pub async fn list_templates(
    Extension(identity): Extension<Identity>,
) -> ApiResult<Vec<EmailTemplate>> {
    let templates = EmailsService::new().await?.list_templates(&identity).await?;
    Ok(ApiResponse::success(templates))
}

/// GET /api/emails/templates/:id
pub async fn get_template(
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<EmailTemplate> {
    let template_id = parse_id(&id, "template")?;
    let template = EmailsService::new()
        .await?
        .get_template(&identity, template_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Email template not found"))?;
    Ok(ApiResponse::success(template))
}

/// POST /api/emails/templates
pub async fn create_template(
    Extension(identity): Extension<Identity>,
    Json(body): Json<Value>,
) -> ApiResult<EmailTemplate> {
    let input = validate_insert_template(&body)?;
    let template = EmailsService::new()
        .await?
        .create_template(&identity, input)
        .await?;
    Ok(ApiResponse::created(template))
}

/// PUT /api/emails/templates/:id
pub async fn update_template(
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<EmailTemplate> {
    let template_id = parse_id(&id, "template")?;
    let patch = validate_update_template(&body)?;
    let template = EmailsService::new()
        .await?
        .update_template(&identity, template_id, patch)
        .await?
        .ok_or_else(|| ApiError::not_found("Email template not found"))?;
    Ok(ApiResponse::success(template))
}

/// DELETE /api/emails/templates/:id
pub async fn delete_template(
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let template_id = parse_id(&id, "template")?;
    let deleted = EmailsService::new()
        .await?
        .delete_template(&identity, template_id)
        .await?;
    if !deleted {
        return Err(ApiError::not_found("Email template not found"));
    }
    Ok(ApiResponse::<()>::message("Email template deleted successfully"))
}

// ----- Drafts -----

/// GET /api/emails/drafts
pub async fn list_drafts(
    Extension(identity): Extension<Identity>,
) -> ApiResult<Vec<EmailDraftWithDetails>> {
    let drafts = EmailsService::new().await?.list_drafts(&identity).await?;
    Ok(ApiResponse::success(drafts))
}

/// GET /api/emails/drafts/:id
pub async fn get_draft(
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<EmailDraftWithDetails> {
    let draft_id = parse_id(&id, "draft")?;
    let draft = EmailsService::new()
        .await?
        .get_draft(&identity, draft_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Email draft not found"))?;
    Ok(ApiResponse::success(draft))
}

/// POST /api/emails/drafts
pub async fn create_draft(
    Extension(identity): Extension<Identity>,
    Json(body): Json<Value>,
) -> ApiResult<EmailDraftWithDetails> {
    let input = validate_insert_draft(&body)?;
    let draft = EmailsService::new()
        .await?
        .create_draft(&identity, input)
        .await?;
    Ok(ApiResponse::created(draft))
}

/// PUT /api/emails/drafts/:id
pub async fn update_draft(
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<EmailDraftWithDetails> {
    let draft_id = parse_id(&id, "draft")?;
    let patch = validate_update_draft(&body)?;
    let draft = EmailsService::new()
        .await?
        .update_draft(&identity, draft_id, patch)
        .await?
        .ok_or_else(|| ApiError::not_found("Email draft not found"))?;
    Ok(ApiResponse::success(draft))
}

/// POST /api/emails/drafts/:id/status
pub async fn transition_draft(
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<EmailDraftWithDetails> {
    let draft_id = parse_id(&id, "draft")?;
    let next = validate_draft_transition(&body)?;
    let draft = EmailsService::new()
        .await?
        .transition_draft(&identity, draft_id, next)
        .await?
        .ok_or_else(|| ApiError::not_found("Email draft not found"))?;
    Ok(ApiResponse::success(draft))
}

/// DELETE /api/emails/drafts/:id
pub async fn delete_draft(
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let draft_id = parse_id(&id, "draft")?;
    let deleted = EmailsService::new()
        .await?
        .delete_draft(&identity, draft_id)
        .await?;
    if !deleted {
        return Err(ApiError::not_found("Email draft not found"));
    }
    Ok(ApiResponse::<()>::message("Email draft deleted successfully"))
}

// ----- Gmail connection -----

/// GET /api/emails/gmail
pub async fn get_connection(
    Extension(identity): Extension<Identity>,
) -> ApiResult<GmailConnection> {
    let connection = EmailsService::new()
        .await?
        .get_connection(&identity)
        .await?
        .ok_or_else(|| ApiError::not_found("Gmail connection not found"))?;
    Ok(ApiResponse::success(connection))
}

/// POST /api/emails/gmail - store/replace the OAuth connection for this user
pub async fn upsert_connection(
    Extension(identity): Extension<Identity>,
    Json(body): Json<Value>,
) -> ApiResult<GmailConnection> {
    let input = validate_gmail_connection(&body)?;
    let connection = EmailsService::new()
        .await?
        .upsert_connection(&identity, input)
        .await?;
    Ok(ApiResponse::created(connection))
}

/// DELETE /api/emails/gmail
pub async fn disconnect(Extension(identity): Extension<Identity>) -> ApiResult<()> {
    let removed = EmailsService::new().await?.disconnect(&identity).await?;
    if !removed {
        return Err(ApiError::not_found("Gmail connection not found"));
    }
    Ok(ApiResponse::<()>::message("Gmail connection removed successfully"))
}
