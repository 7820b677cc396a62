use chrono::NaiveDate;
use sqlx::PgPool;

use super::ServiceError;
use crate::database::manager::DatabaseManager;
use crate::database::models::{ActivityLog, DailyStats};
use crate::middleware::auth::Identity;

/// Counter columns on the per-day stats row.
#[derive(Debug, Clone, Copy)]
pub enum StatColumn {
    CardsUploaded,
    ContactsCreated,
    ContactsVerified,
    DraftsGenerated,
    DraftsSentToGmail,
    EmailsSent,
}

impl StatColumn {
    fn as_sql(self) -> &'static str {
        match self {
            StatColumn::CardsUploaded => "cards_uploaded",
            StatColumn::ContactsCreated => "contacts_created",
            StatColumn::ContactsVerified => "contacts_verified",
            StatColumn::DraftsGenerated => "drafts_generated",
            StatColumn::DraftsSentToGmail => "drafts_sent_to_gmail",
            StatColumn::EmailsSent => "emails_sent",
        }
    }
}

pub struct AnalyticsService {
    pool: PgPool,
}

impl AnalyticsService {
    pub async fn new() -> Result<Self, ServiceError> {
        Ok(Self {
            pool: DatabaseManager::pool().await?,
        })
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn record_activity(
        &self,
        identity: &Identity,
        action: &str,
        entity_type: &str,
        entity_id: i64,
        metadata: Option<serde_json::Value>,
    ) -> Result<(), ServiceError> {
        sqlx::query(
            "INSERT INTO activity_logs (org_id, user_id, action, entity_type, entity_id, metadata) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(identity.org_id)
        .bind(&identity.user_id)
        .bind(action)
        .bind(entity_type)
        .bind(entity_id)
        .bind(metadata)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn bump_daily_stat(
        &self,
        org_id: i64,
        column: StatColumn,
    ) -> Result<(), ServiceError> {
        let column = column.as_sql();
        let sql = format!(
            "INSERT INTO daily_stats (org_id, date, {column}) VALUES ($1, CURRENT_DATE, 1) \
             ON CONFLICT (org_id, date) DO UPDATE SET {column} = daily_stats.{column} + 1"
        );
        sqlx::query(&sql).bind(org_id).execute(&self.pool).await?;
        Ok(())
    }

    /// Best-effort bookkeeping after a successful mutation. Analytics
    /// failures are logged and never fail the caller's request.
    pub async fn track(
        &self,
        identity: &Identity,
        action: &str,
        stat: Option<StatColumn>,
        entity_type: &str,
        entity_id: i64,
        metadata: Option<serde_json::Value>,
    ) {
        if let Err(e) = self
            .record_activity(identity, action, entity_type, entity_id, metadata)
            .await
        {
            tracing::warn!("failed to record {} activity: {}", action, e);
        }
        if let Some(column) = stat {
            if let Err(e) = self.bump_daily_stat(identity.org_id, column).await {
                tracing::warn!("failed to bump daily stat for {}: {}", action, e);
            }
        }
    }

    pub async fn daily_stats(
        &self,
        identity: &Identity,
        date: NaiveDate,
    ) -> Result<Option<DailyStats>, ServiceError> {
        let stats = sqlx::query_as::<_, DailyStats>(
            "SELECT * FROM daily_stats WHERE org_id = $1 AND date = $2",
        )
        .bind(identity.org_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(stats)
    }

    pub async fn recent_activity(
        &self,
        identity: &Identity,
        limit: i64,
    ) -> Result<Vec<ActivityLog>, ServiceError> {
        let entries = sqlx::query_as::<_, ActivityLog>(
            "SELECT * FROM activity_logs WHERE org_id = $1 AND user_id = $2 \
             ORDER BY created_at DESC, id DESC LIMIT $3",
        )
        .bind(identity.org_id)
        .bind(&identity.user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }
}
