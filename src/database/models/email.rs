use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use std::fmt;
use std::str::FromStr;

use super::contact::Contact;

/// Outbound draft lifecycle. Transitions are monotonic; `failed` is reachable
/// from either non-terminal state and nothing moves backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "email_status", rename_all = "snake_case")]
pub enum EmailStatus {
    Draft,
    SentToGmail,
    Sent,
    Failed,
}

impl EmailStatus {
    pub fn can_transition_to(self, next: EmailStatus) -> bool {
        use EmailStatus::*;
        matches!(
            (self, next),
            (Draft, SentToGmail) | (SentToGmail, Sent) | (Draft, Failed) | (SentToGmail, Failed)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EmailStatus::Draft => "draft",
            EmailStatus::SentToGmail => "sent_to_gmail",
            EmailStatus::Sent => "sent",
            EmailStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for EmailStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmailStatus {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "draft" => Ok(EmailStatus::Draft),
            "sent_to_gmail" => Ok(EmailStatus::SentToGmail),
            "sent" => Ok(EmailStatus::Sent),
            "failed" => Ok(EmailStatus::Failed),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailTemplate {
    pub id: i64,
    pub org_id: i64,
    pub user_id: String,
    pub name: String,
    pub subject: String,
    pub body: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EmailTemplate {
    pub(crate) fn from_prefixed_row(row: &PgRow, prefix: &str) -> Result<Self, sqlx::Error> {
        let col = |name: &str| format!("{prefix}{name}");
        Ok(Self {
            id: row.try_get(col("id").as_str())?,
            org_id: row.try_get(col("org_id").as_str())?,
            user_id: row.try_get(col("user_id").as_str())?,
            name: row.try_get(col("name").as_str())?,
            subject: row.try_get(col("subject").as_str())?,
            body: row.try_get(col("body").as_str())?,
            is_default: row.try_get(col("is_default").as_str())?,
            created_at: row.try_get(col("created_at").as_str())?,
            updated_at: row.try_get(col("updated_at").as_str())?,
        })
    }
}

impl FromRow<'_, PgRow> for EmailTemplate {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Self::from_prefixed_row(row, "")
    }
}

/// One-per-user Gmail OAuth link. Tokens are encrypted before they reach the
/// database and never serialized back out.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GmailConnection {
    pub id: i64,
    pub user_id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    pub token_expiry: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub connected_at: DateTime<Utc>,
    pub last_sync_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailDraft {
    pub id: i64,
    pub org_id: i64,
    pub user_id: String,
    pub contact_id: i64,
    pub template_id: Option<i64>,
    pub lead_group_id: Option<i64>,
    pub subject: String,
    pub body: String,
    pub status: EmailStatus,
    pub gmail_draft_id: Option<String>,
    pub sent_to_gmail_at: Option<DateTime<Utc>>,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl EmailDraft {
    pub(crate) fn from_prefixed_row(row: &PgRow, prefix: &str) -> Result<Self, sqlx::Error> {
        let col = |name: &str| format!("{prefix}{name}");
        Ok(Self {
            id: row.try_get(col("id").as_str())?,
            org_id: row.try_get(col("org_id").as_str())?,
            user_id: row.try_get(col("user_id").as_str())?,
            contact_id: row.try_get(col("contact_id").as_str())?,
            template_id: row.try_get(col("template_id").as_str())?,
            lead_group_id: row.try_get(col("lead_group_id").as_str())?,
            subject: row.try_get(col("subject").as_str())?,
            body: row.try_get(col("body").as_str())?,
            status: row.try_get(col("status").as_str())?,
            gmail_draft_id: row.try_get(col("gmail_draft_id").as_str())?,
            sent_to_gmail_at: row.try_get(col("sent_to_gmail_at").as_str())?,
            sent_at: row.try_get(col("sent_at").as_str())?,
            created_at: row.try_get(col("created_at").as_str())?,
        })
    }
}

impl FromRow<'_, PgRow> for EmailDraft {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Self::from_prefixed_row(row, "")
    }
}

/// Draft joined with its recipient contact and optional source template.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailDraftWithDetails {
    #[serde(flatten)]
    pub draft: EmailDraft,
    pub contact: Contact,
    pub template: Option<EmailTemplate>,
}

impl FromRow<'_, PgRow> for EmailDraftWithDetails {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let draft = EmailDraft::from_prefixed_row(row, "")?;
        let contact = Contact::from_prefixed_row(row, "c_")?;
        let template = match row.try_get::<Option<i64>, _>("t_id")? {
            Some(_) => Some(EmailTemplate::from_prefixed_row(row, "t_")?),
            None => None,
        };
        Ok(Self {
            draft,
            contact,
            template,
        })
    }
}
