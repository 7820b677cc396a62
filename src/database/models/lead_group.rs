use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::contact::Contact;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LeadGroup {
    pub id: i64,
    pub org_id: i64,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Group with its member contacts, assembled from two scoped queries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadGroupWithContacts {
    #[serde(flatten)]
    pub group: LeadGroup,
    pub contacts: Vec<Contact>,
    pub contact_count: i64,
}
