use rust_decimal::Decimal;
use serde_json::Value;

use super::*;
use crate::database::models::business_card::CardStatus;

const UPLOAD_FIELDS: &[&str] = &["storagePath", "eventId"];
const RESULT_FIELDS: &[&str] = &["status", "ocrData", "confidenceScore"];

#[derive(Debug, Clone)]
pub struct BusinessCardUpload {
    /// Generated server-side when the client does not name one.
    pub storage_path: Option<String>,
    pub event_id: Option<i64>,
}

/// Outcome reported by the OCR collaborator for a processing card.
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    pub status: CardStatus,
    pub ocr_data: Option<Value>,
    pub confidence_score: Option<Decimal>,
}

pub fn validate_card_upload(body: &Value) -> Result<BusinessCardUpload, ValidationErrors> {
    let map = object_body(body)?;
    let mut errors = ValidationErrors::new();
    check_unknown_fields(map, UPLOAD_FIELDS, &mut errors);

    let storage_path = match map.get("storagePath") {
        Some(_) => required_string(map, "storagePath", &mut errors),
        None => None,
    };
    let event_id = optional_id(map, "eventId", &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(BusinessCardUpload {
        storage_path,
        event_id,
    })
}

pub fn validate_processing_result(body: &Value) -> Result<ProcessingResult, ValidationErrors> {
    let map = object_body(body)?;
    let mut errors = ValidationErrors::new();
    check_unknown_fields(map, RESULT_FIELDS, &mut errors);

    let status = match required_string(map, "status", &mut errors) {
        Some(raw) => match raw.parse::<CardStatus>() {
            // Only the OCR outcomes are acceptable here; user_verified has
            // its own endpoint and processing is the starting state.
            Ok(
                status @ (CardStatus::Completed
                | CardStatus::Failed
                | CardStatus::PendingReview),
            ) => Some(status),
            _ => {
                errors.format(
                    "status",
                    "status must be one of completed, failed, pending_review",
                );
                None
            }
        },
        None => None,
    };
    let ocr_data = match map.get("ocrData") {
        None => None,
        Some(value) => Some(value.clone()),
    };
    let confidence_score = optional_confidence(map, "confidenceScore", &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(ProcessingResult {
        status: status.unwrap(),
        ocr_data,
        confidence_score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn upload_accepts_empty_body() {
        let upload = validate_card_upload(&json!({})).unwrap();
        assert!(upload.storage_path.is_none());
        assert!(upload.event_id.is_none());
    }

    #[test]
    fn upload_rejects_blank_storage_path() {
        let err = validate_card_upload(&json!({ "storagePath": "" })).unwrap_err();
        assert_eq!(err.into_errors()[0].field, "storagePath");
    }

    #[test]
    fn result_parses_status_and_payload() {
        let result = validate_processing_result(&json!({
            "status": "completed",
            "ocrData": { "lines": ["Ada Lovelace", "Tech Corp"] },
            "confidenceScore": 93.25,
        }))
        .unwrap();
        assert_eq!(result.status, CardStatus::Completed);
        assert!(result.ocr_data.is_some());
    }

    #[test]
    fn result_rejects_unknown_status() {
        let err = validate_processing_result(&json!({ "status": "done" })).unwrap_err();
        assert_eq!(err.into_errors()[0].field, "status");
    }
}
