use axum::extract::Path;
use axum::{Extension, Json};
use serde_json::Value;

use super::parse_id;
use crate::database::models::Event;
use crate::error::ApiError;
use crate::middleware::auth::Identity;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::events_service::EventsService;
use crate::validation::{validate_insert_event, validate_update_event};

/// GET /api/events
pub async fn list(Extension(identity): Extension<Identity>) -> ApiResult<Vec<Event>> {
    let events = EventsService::new().await?.list(&identity).await?;
    Ok(ApiResponse::success(events))
}

/// GET /api/events/:id
pub async fn get(
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<Event> {
    let event_id = parse_id(&id, "event")?;
    let event = EventsService::new()
        .await?
        .get_by_id(&identity, event_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Event not found"))?;
    Ok(ApiResponse::success(event))
}

/// POST /api/events
pub async fn create(
    Extension(identity): Extension<Identity>,
    Json(body): Json<Value>,
) -> ApiResult<Event> {
    let input = validate_insert_event(&body)?;
    let event = EventsService::new().await?.create(&identity, input).await?;
    Ok(ApiResponse::created(event))
}

/// PUT /api/events/:id
pub async fn update(
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Event> {
    let event_id = parse_id(&id, "event")?;
    let patch = validate_update_event(&body)?;
    let event = EventsService::new()
        .await?
        .update(&identity, event_id, patch)
        .await?
        .ok_or_else(|| ApiError::not_found("Event not found"))?;
    Ok(ApiResponse::success(event))
}

/// DELETE /api/events/:id
pub async fn delete(
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let event_id = parse_id(&id, "event")?;
    let deleted = EventsService::new()
        .await?
        .delete(&identity, event_id)
        .await?;
    if !deleted {
        return Err(ApiError::not_found("Event not found"));
    }
    Ok(ApiResponse::<()>::message("Event deleted successfully"))
}
