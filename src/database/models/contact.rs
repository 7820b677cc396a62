use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

use super::event::Event;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: i64,
    pub org_id: i64,
    pub user_id: String,
    pub event_id: Option<i64>,
    pub card_id: Option<i64>,
    pub full_name: String,
    pub company: Option<String>,
    pub title: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub ocr_confidence: Option<Decimal>,
    pub is_verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<String>,
    pub linkedin_url: Option<String>,
    pub website: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    pub(crate) fn from_prefixed_row(row: &PgRow, prefix: &str) -> Result<Self, sqlx::Error> {
        let col = |name: &str| format!("{prefix}{name}");
        Ok(Self {
            id: row.try_get(col("id").as_str())?,
            org_id: row.try_get(col("org_id").as_str())?,
            user_id: row.try_get(col("user_id").as_str())?,
            event_id: row.try_get(col("event_id").as_str())?,
            card_id: row.try_get(col("card_id").as_str())?,
            full_name: row.try_get(col("full_name").as_str())?,
            company: row.try_get(col("company").as_str())?,
            title: row.try_get(col("title").as_str())?,
            phone: row.try_get(col("phone").as_str())?,
            email: row.try_get(col("email").as_str())?,
            ocr_confidence: row.try_get(col("ocr_confidence").as_str())?,
            is_verified: row.try_get(col("is_verified").as_str())?,
            verified_at: row.try_get(col("verified_at").as_str())?,
            verified_by: row.try_get(col("verified_by").as_str())?,
            linkedin_url: row.try_get(col("linkedin_url").as_str())?,
            website: row.try_get(col("website").as_str())?,
            notes: row.try_get(col("notes").as_str())?,
            created_at: row.try_get(col("created_at").as_str())?,
            updated_at: row.try_get(col("updated_at").as_str())?,
        })
    }
}

impl FromRow<'_, PgRow> for Contact {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Self::from_prefixed_row(row, "")
    }
}

/// Contact joined with its optional parent event; the shape every contact
/// read endpoint returns.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactWithEvent {
    #[serde(flatten)]
    pub contact: Contact,
    pub event: Option<Event>,
}

impl FromRow<'_, PgRow> for ContactWithEvent {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let contact = Contact::from_prefixed_row(row, "")?;
        let event = match row.try_get::<Option<i64>, _>("e_id")? {
            Some(_) => Some(Event::from_prefixed_row(row, "e_")?),
            None => None,
        };
        Ok(Self { contact, event })
    }
}
