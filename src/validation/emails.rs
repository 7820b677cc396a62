use serde_json::Value;

use super::*;
use crate::database::models::email::EmailStatus;

const TEMPLATE_FIELDS: &[&str] = &["name", "subject", "body", "isDefault"];
const DRAFT_FIELDS: &[&str] = &["contactId", "templateId", "leadGroupId", "subject", "body"];
const CONNECTION_FIELDS: &[&str] = &["email", "accessToken", "refreshToken", "tokenExpiry"];

#[derive(Debug, Clone)]
pub struct EmailTemplateInsert {
    pub name: String,
    pub subject: String,
    pub body: String,
    pub is_default: bool,
}

#[derive(Debug, Clone, Default)]
pub struct EmailTemplatePatch {
    pub name: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub is_default: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct EmailDraftInsert {
    pub contact_id: i64,
    pub template_id: Option<i64>,
    pub lead_group_id: Option<i64>,
    pub subject: String,
    pub body: String,
}

/// Only the message content is patchable; status moves through its own
/// transition endpoint.
#[derive(Debug, Clone, Default)]
pub struct EmailDraftPatch {
    pub subject: Option<String>,
    pub body: Option<String>,
    pub template_id: Option<i64>,
    pub lead_group_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct GmailConnectionUpsert {
    pub email: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_expiry: Option<chrono::DateTime<chrono::Utc>>,
}

pub fn validate_insert_template(body: &Value) -> Result<EmailTemplateInsert, ValidationErrors> {
    let map = object_body(body)?;
    let mut errors = ValidationErrors::new();
    check_unknown_fields(map, TEMPLATE_FIELDS, &mut errors);

    let name = required_string(map, "name", &mut errors);
    let subject = required_string(map, "subject", &mut errors);
    let text = required_string(map, "body", &mut errors);
    let is_default = optional_bool(map, "isDefault", &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(EmailTemplateInsert {
        name: name.unwrap(),
        subject: subject.unwrap(),
        body: text.unwrap(),
        is_default: is_default.unwrap_or(false),
    })
}

pub fn validate_update_template(body: &Value) -> Result<EmailTemplatePatch, ValidationErrors> {
    let map = object_body(body)?;
    let mut errors = ValidationErrors::new();
    check_unknown_fields(map, TEMPLATE_FIELDS, &mut errors);

    let patch = EmailTemplatePatch {
        name: match map.get("name") {
            Some(_) => required_string(map, "name", &mut errors),
            None => None,
        },
        subject: match map.get("subject") {
            Some(_) => required_string(map, "subject", &mut errors),
            None => None,
        },
        body: match map.get("body") {
            Some(_) => required_string(map, "body", &mut errors),
            None => None,
        },
        is_default: optional_bool(map, "isDefault", &mut errors),
    };

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(patch)
}

pub fn validate_insert_draft(body: &Value) -> Result<EmailDraftInsert, ValidationErrors> {
    let map = object_body(body)?;
    let mut errors = ValidationErrors::new();
    check_unknown_fields(map, DRAFT_FIELDS, &mut errors);

    let contact_id = required_id(map, "contactId", &mut errors);
    let template_id = optional_id(map, "templateId", &mut errors);
    let lead_group_id = optional_id(map, "leadGroupId", &mut errors);
    let subject = required_string(map, "subject", &mut errors);
    let text = required_string(map, "body", &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(EmailDraftInsert {
        contact_id: contact_id.unwrap(),
        template_id,
        lead_group_id,
        subject: subject.unwrap(),
        body: text.unwrap(),
    })
}

pub fn validate_update_draft(body: &Value) -> Result<EmailDraftPatch, ValidationErrors> {
    let map = object_body(body)?;
    let mut errors = ValidationErrors::new();
    check_unknown_fields(
        map,
        &["subject", "body", "templateId", "leadGroupId"],
        &mut errors,
    );

    let patch = EmailDraftPatch {
        subject: match map.get("subject") {
            Some(_) => required_string(map, "subject", &mut errors),
            None => None,
        },
        body: match map.get("body") {
            Some(_) => required_string(map, "body", &mut errors),
            None => None,
        },
        template_id: optional_id(map, "templateId", &mut errors),
        lead_group_id: optional_id(map, "leadGroupId", &mut errors),
    };

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(patch)
}

/// Body of the draft status transition endpoint: `{"status": "..."}`.
pub fn validate_draft_transition(body: &Value) -> Result<EmailStatus, ValidationErrors> {
    let map = object_body(body)?;
    let mut errors = ValidationErrors::new();
    check_unknown_fields(map, &["status"], &mut errors);

    let status = match required_string(map, "status", &mut errors) {
        Some(raw) => match raw.parse::<EmailStatus>() {
            Ok(status) => Some(status),
            Err(_) => {
                errors.format(
                    "status",
                    "status must be one of draft, sent_to_gmail, sent, failed",
                );
                None
            }
        },
        None => None,
    };

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(status.unwrap())
}

pub fn validate_gmail_connection(body: &Value) -> Result<GmailConnectionUpsert, ValidationErrors> {
    let map = object_body(body)?;
    let mut errors = ValidationErrors::new();
    check_unknown_fields(map, CONNECTION_FIELDS, &mut errors);

    let email = match required_string(map, "email", &mut errors) {
        Some(raw) if is_valid_email(&raw) => Some(raw),
        Some(_) => {
            errors.format("email", "email must be a valid email address");
            None
        }
        None => None,
    };
    let access_token = required_string(map, "accessToken", &mut errors);
    let refresh_token = optional_string(map, "refreshToken", &mut errors);
    let token_expiry = optional_datetime(map, "tokenExpiry", &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(GmailConnectionUpsert {
        email: email.unwrap(),
        access_token: access_token.unwrap(),
        refresh_token,
        token_expiry,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn template_requires_name_subject_body() {
        let err = validate_insert_template(&json!({})).unwrap_err();
        let fields: Vec<String> = err.into_errors().into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["name", "subject", "body"]);
    }

    #[test]
    fn draft_requires_contact() {
        let err = validate_insert_draft(&json!({
            "subject": "Hello",
            "body": "Great meeting you",
        }))
        .unwrap_err();
        assert_eq!(err.into_errors()[0].field, "contactId");
    }

    #[test]
    fn draft_patch_rejects_status() {
        let err = validate_update_draft(&json!({ "status": "sent" })).unwrap_err();
        assert_eq!(err.into_errors()[0].code, "unknown");
    }

    #[test]
    fn transition_parses_status() {
        let status = validate_draft_transition(&json!({ "status": "sent_to_gmail" })).unwrap();
        assert_eq!(status, EmailStatus::SentToGmail);
    }

    #[test]
    fn transition_rejects_unknown_status() {
        let err = validate_draft_transition(&json!({ "status": "bounced" })).unwrap_err();
        assert_eq!(err.into_errors()[0].field, "status");
    }

    #[test]
    fn connection_requires_tokens() {
        let err = validate_gmail_connection(&json!({ "email": "me@example.com" })).unwrap_err();
        assert_eq!(err.into_errors()[0].field, "accessToken");
    }
}
