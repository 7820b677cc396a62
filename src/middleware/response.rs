use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::ApiError;

/// Wrapper that gives every successful response the `{"data": ...}` envelope
/// (or `{"message": ...}` for void operations such as deletes).
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    data: Option<T>,
    message: Option<String>,
    status_code: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK with a data payload
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            message: None,
            status_code: StatusCode::OK,
        }
    }

    /// 201 Created with a data payload
    pub fn created(data: T) -> Self {
        Self {
            data: Some(data),
            message: None,
            status_code: StatusCode::CREATED,
        }
    }

    /// 200 OK with a confirmation message instead of data
    pub fn message(message: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            data: None,
            message: Some(message.into()),
            status_code: StatusCode::OK,
        }
    }

    fn envelope(&self) -> Result<Value, serde_json::Error> {
        if let Some(message) = &self.message {
            return Ok(json!({ "message": message }));
        }
        let data = serde_json::to_value(&self.data)?;
        Ok(json!({ "data": data }))
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match self.envelope() {
            Ok(body) => (self.status_code, Json(body)).into_response(),
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                ApiError::internal_server_error("Failed to serialize response data").into_response()
            }
        }
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_envelope() {
        let response = ApiResponse::success(vec![1, 2, 3]);
        assert_eq!(response.envelope().unwrap(), json!({ "data": [1, 2, 3] }));
        assert_eq!(response.status_code, StatusCode::OK);
    }

    #[test]
    fn created_sets_201() {
        let response = ApiResponse::created(json!({ "id": 1 }));
        assert_eq!(response.status_code, StatusCode::CREATED);
    }

    #[test]
    fn message_envelope() {
        let response = ApiResponse::<()>::message("Event deleted successfully");
        assert_eq!(
            response.envelope().unwrap(),
            json!({ "message": "Event deleted successfully" })
        );
    }
}
