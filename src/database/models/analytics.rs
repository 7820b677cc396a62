use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Per-organization, per-day counters. Rows are only ever inserted or
/// incremented, never rewritten.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    pub id: i64,
    pub org_id: i64,
    pub date: NaiveDate,
    pub cards_uploaded: i32,
    pub contacts_created: i32,
    pub contacts_verified: i32,
    pub drafts_generated: i32,
    pub drafts_sent_to_gmail: i32,
    pub emails_sent: i32,
    pub created_at: DateTime<Utc>,
}

/// Append-only audit trail of user actions.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: i64,
    pub org_id: i64,
    pub user_id: String,
    pub action: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<i64>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}
