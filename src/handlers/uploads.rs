use axum::extract::Path;
use axum::{Extension, Json};
use serde_json::Value;

use super::parse_id;
use crate::database::models::BusinessCard;
use crate::error::ApiError;
use crate::middleware::auth::Identity;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::cards_service::CardsService;
use crate::validation::{validate_card_upload, validate_processing_result};

/// GET /api/uploads/business-card
pub async fn list(Extension(identity): Extension<Identity>) -> ApiResult<Vec<BusinessCard>> {
    let cards = CardsService::new().await?.list(&identity).await?;
    Ok(ApiResponse::success(cards))
}

/// GET /api/uploads/business-card/:id
pub async fn get(
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<BusinessCard> {
    let card_id = parse_id(&id, "business card")?;
    let card = CardsService::new()
        .await?
        .get_by_id(&identity, card_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Business card not found"))?;
    Ok(ApiResponse::success(card))
}

/// POST /api/uploads/business-card - register an upload; the card starts in
/// `processing` and the OCR collaborator reports back later
pub async fn upload(
    Extension(identity): Extension<Identity>,
    Json(body): Json<Value>,
) -> ApiResult<BusinessCard> {
    let input = validate_card_upload(&body)?;
    let card = CardsService::new().await?.upload(&identity, input).await?;
    Ok(ApiResponse::created(card))
}

/// PUT /api/uploads/business-card/:id/status - OCR result callback
pub async fn set_status(
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<BusinessCard> {
    let card_id = parse_id(&id, "business card")?;
    let result = validate_processing_result(&body)?;
    let card = CardsService::new()
        .await?
        .set_processing_result(&identity, card_id, result)
        .await?
        .ok_or_else(|| ApiError::not_found("Business card not found"))?;
    Ok(ApiResponse::success(card))
}

/// POST /api/uploads/business-card/:id/verify
pub async fn verify(
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<BusinessCard> {
    let card_id = parse_id(&id, "business card")?;
    let card = CardsService::new()
        .await?
        .verify(&identity, card_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Business card not found"))?;
    Ok(ApiResponse::success(card))
}
