use rust_decimal::Decimal;
use serde_json::Value;

use super::*;

const FIELDS: &[&str] = &[
    "fullName",
    "company",
    "title",
    "phone",
    "email",
    "linkedinUrl",
    "website",
    "notes",
    "eventId",
    "cardId",
    "ocrConfidence",
];

#[derive(Debug, Clone)]
pub struct ContactInsert {
    pub full_name: String,
    pub company: Option<String>,
    pub title: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub linkedin_url: Option<String>,
    pub website: Option<String>,
    pub notes: Option<String>,
    pub event_id: Option<i64>,
    pub card_id: Option<i64>,
    pub ocr_confidence: Option<Decimal>,
}

#[derive(Debug, Clone, Default)]
pub struct ContactPatch {
    pub full_name: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub linkedin_url: Option<String>,
    pub website: Option<String>,
    pub notes: Option<String>,
    pub event_id: Option<i64>,
    pub card_id: Option<i64>,
    pub ocr_confidence: Option<Decimal>,
}

pub fn validate_insert_contact(body: &Value) -> Result<ContactInsert, ValidationErrors> {
    let map = object_body(body)?;
    let mut errors = ValidationErrors::new();
    check_unknown_fields(map, FIELDS, &mut errors);

    let full_name = required_string(map, "fullName", &mut errors);
    let company = optional_string(map, "company", &mut errors);
    let title = optional_string(map, "title", &mut errors);
    let phone = optional_string(map, "phone", &mut errors);
    let email = optional_email(map, "email", &mut errors);
    let linkedin_url = optional_string(map, "linkedinUrl", &mut errors);
    let website = optional_string(map, "website", &mut errors);
    let notes = optional_string(map, "notes", &mut errors);
    let event_id = optional_id(map, "eventId", &mut errors);
    let card_id = optional_id(map, "cardId", &mut errors);
    let ocr_confidence = optional_confidence(map, "ocrConfidence", &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(ContactInsert {
        full_name: full_name.unwrap(),
        company,
        title,
        phone,
        email,
        linkedin_url,
        website,
        notes,
        event_id,
        card_id,
        ocr_confidence,
    })
}

pub fn validate_update_contact(body: &Value) -> Result<ContactPatch, ValidationErrors> {
    let map = object_body(body)?;
    let mut errors = ValidationErrors::new();
    check_unknown_fields(map, FIELDS, &mut errors);

    let patch = ContactPatch {
        full_name: match map.get("fullName") {
            Some(_) => required_string(map, "fullName", &mut errors),
            None => None,
        },
        company: optional_string(map, "company", &mut errors),
        title: optional_string(map, "title", &mut errors),
        phone: optional_string(map, "phone", &mut errors),
        email: optional_email(map, "email", &mut errors),
        linkedin_url: optional_string(map, "linkedinUrl", &mut errors),
        website: optional_string(map, "website", &mut errors),
        notes: optional_string(map, "notes", &mut errors),
        event_id: optional_id(map, "eventId", &mut errors),
        card_id: optional_id(map, "cardId", &mut errors),
        ocr_confidence: optional_confidence(map, "ocrConfidence", &mut errors),
    };

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(patch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn insert_requires_full_name() {
        let err = validate_insert_contact(&json!({ "company": "Tech Corp" })).unwrap_err();
        let errors = err.into_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "fullName");
    }

    #[test]
    fn insert_checks_email_format() {
        let err = validate_insert_contact(&json!({
            "fullName": "Ada Lovelace",
            "email": "not-an-email",
        }))
        .unwrap_err();
        let errors = err.into_errors();
        assert_eq!(errors[0].field, "email");
        assert_eq!(errors[0].code, "format");
    }

    #[test]
    fn insert_accepts_full_payload() {
        let contact = validate_insert_contact(&json!({
            "fullName": "Ada Lovelace",
            "company": "Tech Corp",
            "title": "Engineer",
            "email": "ada@techcorp.com",
            "eventId": 3,
            "ocrConfidence": 92.5,
        }))
        .unwrap();
        assert_eq!(contact.full_name, "Ada Lovelace");
        assert_eq!(contact.event_id, Some(3));
        assert!(contact.ocr_confidence.is_some());
    }

    #[test]
    fn update_rejects_ownership_fields() {
        let err = validate_update_contact(&json!({ "userId": "user_9" })).unwrap_err();
        assert_eq!(err.into_errors()[0].code, "unknown");
    }

    #[test]
    fn update_rejects_non_positive_event_id() {
        let err = validate_update_contact(&json!({ "eventId": 0 })).unwrap_err();
        assert_eq!(err.into_errors()[0].field, "eventId");
    }
}
