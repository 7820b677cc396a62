use sqlx::{PgPool, Postgres, QueryBuilder};

use super::ServiceError;
use crate::database::manager::DatabaseManager;
use crate::database::models::Event;
use crate::middleware::auth::Identity;
use crate::validation::{check_date_order, EventInsert, EventPatch, ValidationErrors};

pub struct EventsService {
    pool: PgPool,
}

impl EventsService {
    pub async fn new() -> Result<Self, ServiceError> {
        Ok(Self {
            pool: DatabaseManager::pool().await?,
        })
    }

    /// Soonest/most recent start date first; undated events sort last. The id
    /// tiebreak keeps the order deterministic.
    pub async fn list(&self, identity: &Identity) -> Result<Vec<Event>, ServiceError> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE org_id = $1 AND user_id = $2 \
             ORDER BY start_date DESC NULLS LAST, created_at DESC, id DESC",
        )
        .bind(identity.org_id)
        .bind(&identity.user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    pub async fn get_by_id(
        &self,
        identity: &Identity,
        event_id: i64,
    ) -> Result<Option<Event>, ServiceError> {
        let event = sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE id = $1 AND org_id = $2 AND user_id = $3",
        )
        .bind(event_id)
        .bind(identity.org_id)
        .bind(&identity.user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(event)
    }

    pub async fn create(
        &self,
        identity: &Identity,
        input: EventInsert,
    ) -> Result<Event, ServiceError> {
        let (event_id,): (i64,) = sqlx::query_as(
            "INSERT INTO events (org_id, user_id, name, description, industry, location, start_date, end_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING id",
        )
        .bind(identity.org_id)
        .bind(&identity.user_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.industry)
        .bind(&input.location)
        .bind(input.start_date)
        .bind(input.end_date)
        .fetch_one(&self.pool)
        .await?;

        // Re-fetch so the create response matches get_by_id exactly
        self.get_by_id(identity, event_id)
            .await?
            .ok_or(ServiceError::Query(sqlx::Error::RowNotFound))
    }

    /// Applies only the provided fields and refreshes `updated_at`. The date
    /// ordering rule is re-checked against the merged row.
    pub async fn update(
        &self,
        identity: &Identity,
        event_id: i64,
        patch: EventPatch,
    ) -> Result<Option<Event>, ServiceError> {
        let Some(existing) = self.get_by_id(identity, event_id).await? else {
            return Ok(None);
        };

        let merged_start = patch.start_date.or(existing.start_date);
        let merged_end = patch.end_date.or(existing.end_date);
        let mut errors = ValidationErrors::new();
        check_date_order(merged_start, merged_end, &mut errors);
        if !errors.is_empty() {
            return Err(ServiceError::Validation(errors));
        }

        let mut query = QueryBuilder::<Postgres>::new("UPDATE events SET updated_at = NOW()");
        if let Some(name) = &patch.name {
            query.push(", name = ").push_bind(name);
        }
        if let Some(description) = &patch.description {
            query.push(", description = ").push_bind(description);
        }
        if let Some(industry) = &patch.industry {
            query.push(", industry = ").push_bind(industry);
        }
        if let Some(location) = &patch.location {
            query.push(", location = ").push_bind(location);
        }
        if let Some(start_date) = patch.start_date {
            query.push(", start_date = ").push_bind(start_date);
        }
        if let Some(end_date) = patch.end_date {
            query.push(", end_date = ").push_bind(end_date);
        }
        query.push(" WHERE id = ").push_bind(event_id);
        query.push(" AND org_id = ").push_bind(identity.org_id);
        query.push(" AND user_id = ").push_bind(&identity.user_id);
        query.push(" RETURNING *");

        let event = query
            .build_query_as::<Event>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(event)
    }

    pub async fn delete(&self, identity: &Identity, event_id: i64) -> Result<bool, ServiceError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1 AND org_id = $2 AND user_id = $3")
            .bind(event_id)
            .bind(identity.org_id)
            .bind(&identity.user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
