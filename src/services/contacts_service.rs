use sqlx::{PgPool, Postgres, QueryBuilder};

use super::analytics_service::{AnalyticsService, StatColumn};
use super::ServiceError;
use crate::database::manager::DatabaseManager;
use crate::database::models::ContactWithEvent;
use crate::middleware::auth::Identity;
use crate::validation::{ContactInsert, ContactPatch, ValidationErrors};

/// Contact reads always join the optional parent event so every endpoint
/// returns the same shape.
const WITH_EVENT_SELECT: &str = "SELECT c.*, \
     e.id AS e_id, e.org_id AS e_org_id, e.user_id AS e_user_id, e.name AS e_name, \
     e.description AS e_description, e.industry AS e_industry, e.location AS e_location, \
     e.start_date AS e_start_date, e.end_date AS e_end_date, \
     e.created_at AS e_created_at, e.updated_at AS e_updated_at \
     FROM contacts c LEFT JOIN events e ON e.id = c.event_id";

pub struct ContactsService {
    pool: PgPool,
}

impl ContactsService {
    pub async fn new() -> Result<Self, ServiceError> {
        Ok(Self {
            pool: DatabaseManager::pool().await?,
        })
    }

    pub async fn list(&self, identity: &Identity) -> Result<Vec<ContactWithEvent>, ServiceError> {
        let sql = format!(
            "{WITH_EVENT_SELECT} WHERE c.org_id = $1 AND c.user_id = $2 \
             ORDER BY c.created_at ASC, c.id ASC"
        );
        let contacts = sqlx::query_as::<_, ContactWithEvent>(&sql)
            .bind(identity.org_id)
            .bind(&identity.user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(contacts)
    }

    pub async fn get_by_id(
        &self,
        identity: &Identity,
        contact_id: i64,
    ) -> Result<Option<ContactWithEvent>, ServiceError> {
        let sql = format!(
            "{WITH_EVENT_SELECT} WHERE c.org_id = $1 AND c.user_id = $2 AND c.id = $3"
        );
        let contact = sqlx::query_as::<_, ContactWithEvent>(&sql)
            .bind(identity.org_id)
            .bind(&identity.user_id)
            .bind(contact_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(contact)
    }

    /// Case-insensitive substring match ORed across the text columns. A
    /// linear filter, not ranked search.
    pub async fn search(
        &self,
        identity: &Identity,
        query: &str,
    ) -> Result<Vec<ContactWithEvent>, ServiceError> {
        let pattern = format!("%{}%", escape_like(query));
        let sql = format!(
            "{WITH_EVENT_SELECT} WHERE c.org_id = $1 AND c.user_id = $2 AND \
             (c.full_name ILIKE $3 OR c.email ILIKE $3 OR c.company ILIKE $3 \
              OR c.title ILIKE $3 OR c.notes ILIKE $3) \
             ORDER BY c.created_at ASC, c.id ASC"
        );
        let contacts = sqlx::query_as::<_, ContactWithEvent>(&sql)
            .bind(identity.org_id)
            .bind(&identity.user_id)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?;
        Ok(contacts)
    }

    pub async fn create(
        &self,
        identity: &Identity,
        input: ContactInsert,
    ) -> Result<ContactWithEvent, ServiceError> {
        self.check_owned_refs(identity, input.event_id, input.card_id)
            .await?;

        let (contact_id,): (i64,) = sqlx::query_as(
            "INSERT INTO contacts (org_id, user_id, event_id, card_id, full_name, company, title, \
             phone, email, ocr_confidence, linkedin_url, website, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) RETURNING id",
        )
        .bind(identity.org_id)
        .bind(&identity.user_id)
        .bind(input.event_id)
        .bind(input.card_id)
        .bind(&input.full_name)
        .bind(&input.company)
        .bind(&input.title)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(input.ocr_confidence)
        .bind(&input.linkedin_url)
        .bind(&input.website)
        .bind(&input.notes)
        .fetch_one(&self.pool)
        .await?;

        AnalyticsService::with_pool(self.pool.clone())
            .track(
                identity,
                "contact_created",
                Some(StatColumn::ContactsCreated),
                "contact",
                contact_id,
                None,
            )
            .await;

        // Re-fetch the joined shape so create matches get_by_id
        self.get_by_id(identity, contact_id)
            .await?
            .ok_or(ServiceError::Query(sqlx::Error::RowNotFound))
    }

    pub async fn update(
        &self,
        identity: &Identity,
        contact_id: i64,
        patch: ContactPatch,
    ) -> Result<Option<ContactWithEvent>, ServiceError> {
        if self.get_by_id(identity, contact_id).await?.is_none() {
            return Ok(None);
        }
        self.check_owned_refs(identity, patch.event_id, patch.card_id)
            .await?;

        let mut query = QueryBuilder::<Postgres>::new("UPDATE contacts SET updated_at = NOW()");
        if let Some(full_name) = &patch.full_name {
            query.push(", full_name = ").push_bind(full_name);
        }
        if let Some(company) = &patch.company {
            query.push(", company = ").push_bind(company);
        }
        if let Some(title) = &patch.title {
            query.push(", title = ").push_bind(title);
        }
        if let Some(phone) = &patch.phone {
            query.push(", phone = ").push_bind(phone);
        }
        if let Some(email) = &patch.email {
            query.push(", email = ").push_bind(email);
        }
        if let Some(linkedin_url) = &patch.linkedin_url {
            query.push(", linkedin_url = ").push_bind(linkedin_url);
        }
        if let Some(website) = &patch.website {
            query.push(", website = ").push_bind(website);
        }
        if let Some(notes) = &patch.notes {
            query.push(", notes = ").push_bind(notes);
        }
        if let Some(event_id) = patch.event_id {
            query.push(", event_id = ").push_bind(event_id);
        }
        if let Some(card_id) = patch.card_id {
            query.push(", card_id = ").push_bind(card_id);
        }
        if let Some(ocr_confidence) = patch.ocr_confidence {
            query.push(", ocr_confidence = ").push_bind(ocr_confidence);
        }
        query.push(" WHERE id = ").push_bind(contact_id);
        query.push(" AND org_id = ").push_bind(identity.org_id);
        query.push(" AND user_id = ").push_bind(&identity.user_id);

        query.build().execute(&self.pool).await?;

        self.get_by_id(identity, contact_id).await
    }

    /// Marks the contact as reviewed by the acting user.
    pub async fn verify(
        &self,
        identity: &Identity,
        contact_id: i64,
    ) -> Result<Option<ContactWithEvent>, ServiceError> {
        let result = sqlx::query(
            "UPDATE contacts SET is_verified = TRUE, verified_at = NOW(), verified_by = $1, \
             updated_at = NOW() WHERE id = $2 AND org_id = $3 AND user_id = $4",
        )
        .bind(&identity.user_id)
        .bind(contact_id)
        .bind(identity.org_id)
        .bind(&identity.user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        AnalyticsService::with_pool(self.pool.clone())
            .track(
                identity,
                "contact_verified",
                Some(StatColumn::ContactsVerified),
                "contact",
                contact_id,
                None,
            )
            .await;

        self.get_by_id(identity, contact_id).await
    }

    /// Hard delete. Lead-group memberships and email drafts referencing the
    /// contact go with it via the declared cascades, in one atomic statement.
    pub async fn delete(&self, identity: &Identity, contact_id: i64) -> Result<bool, ServiceError> {
        let result =
            sqlx::query("DELETE FROM contacts WHERE id = $1 AND org_id = $2 AND user_id = $3")
                .bind(contact_id)
                .bind(identity.org_id)
                .bind(&identity.user_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// A referenced event or card must belong to the same identity; anything
    /// else is reported as a field error, indistinguishable from a
    /// nonexistent id.
    async fn check_owned_refs(
        &self,
        identity: &Identity,
        event_id: Option<i64>,
        card_id: Option<i64>,
    ) -> Result<(), ServiceError> {
        let mut errors = ValidationErrors::new();

        if let Some(event_id) = event_id {
            let found = sqlx::query_scalar::<_, i64>(
                "SELECT id FROM events WHERE id = $1 AND org_id = $2 AND user_id = $3",
            )
            .bind(event_id)
            .bind(identity.org_id)
            .bind(&identity.user_id)
            .fetch_optional(&self.pool)
            .await?;
            if found.is_none() {
                errors.reference("eventId", "eventId does not reference one of your events");
            }
        }

        if let Some(card_id) = card_id {
            let found = sqlx::query_scalar::<_, i64>(
                "SELECT id FROM business_cards WHERE id = $1 AND org_id = $2 AND user_id = $3",
            )
            .bind(card_id)
            .bind(identity.org_id)
            .bind(&identity.user_id)
            .fetch_optional(&self.pool)
            .await?;
            if found.is_none() {
                errors.reference("cardId", "cardId does not reference one of your business cards");
            }
        }

        if !errors.is_empty() {
            return Err(ServiceError::Validation(errors));
        }
        Ok(())
    }
}

/// Escape ILIKE metacharacters so the query always matches literally.
pub(crate) fn escape_like(query: &str) -> String {
    query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
