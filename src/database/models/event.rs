use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i64,
    pub org_id: i64,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Read an event out of a row whose columns carry the given alias prefix
    /// (empty for a plain `SELECT *`, `e_` inside joined shapes).
    pub(crate) fn from_prefixed_row(row: &PgRow, prefix: &str) -> Result<Self, sqlx::Error> {
        let col = |name: &str| format!("{prefix}{name}");
        Ok(Self {
            id: row.try_get(col("id").as_str())?,
            org_id: row.try_get(col("org_id").as_str())?,
            user_id: row.try_get(col("user_id").as_str())?,
            name: row.try_get(col("name").as_str())?,
            description: row.try_get(col("description").as_str())?,
            industry: row.try_get(col("industry").as_str())?,
            location: row.try_get(col("location").as_str())?,
            start_date: row.try_get(col("start_date").as_str())?,
            end_date: row.try_get(col("end_date").as_str())?,
            created_at: row.try_get(col("created_at").as_str())?,
            updated_at: row.try_get(col("updated_at").as_str())?,
        })
    }
}

impl FromRow<'_, PgRow> for Event {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Self::from_prefixed_row(row, "")
    }
}
