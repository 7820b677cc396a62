use sqlx::{PgPool, Postgres, QueryBuilder};

use super::ServiceError;
use crate::database::manager::DatabaseManager;
use crate::database::models::{Contact, LeadGroup, LeadGroupWithContacts};
use crate::middleware::auth::Identity;
use crate::validation::{LeadGroupInsert, LeadGroupPatch};

pub struct LeadGroupsService {
    pool: PgPool,
}

impl LeadGroupsService {
    pub async fn new() -> Result<Self, ServiceError> {
        Ok(Self {
            pool: DatabaseManager::pool().await?,
        })
    }

    pub async fn list(&self, identity: &Identity) -> Result<Vec<LeadGroup>, ServiceError> {
        let groups = sqlx::query_as::<_, LeadGroup>(
            "SELECT * FROM lead_groups WHERE org_id = $1 AND user_id = $2 \
             ORDER BY name ASC, id ASC",
        )
        .bind(identity.org_id)
        .bind(&identity.user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(groups)
    }

    pub async fn get_by_id(
        &self,
        identity: &Identity,
        group_id: i64,
    ) -> Result<Option<LeadGroup>, ServiceError> {
        let group = sqlx::query_as::<_, LeadGroup>(
            "SELECT * FROM lead_groups WHERE id = $1 AND org_id = $2 AND user_id = $3",
        )
        .bind(group_id)
        .bind(identity.org_id)
        .bind(&identity.user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(group)
    }

    pub async fn get_with_contacts(
        &self,
        identity: &Identity,
        group_id: i64,
    ) -> Result<Option<LeadGroupWithContacts>, ServiceError> {
        let Some(group) = self.get_by_id(identity, group_id).await? else {
            return Ok(None);
        };

        let contacts = sqlx::query_as::<_, Contact>(
            "SELECT c.* FROM contacts c \
             JOIN lead_group_contacts lgc ON lgc.contact_id = c.id \
             WHERE lgc.lead_group_id = $1 AND c.org_id = $2 AND c.user_id = $3 \
             ORDER BY lgc.added_at ASC, c.id ASC",
        )
        .bind(group_id)
        .bind(identity.org_id)
        .bind(&identity.user_id)
        .fetch_all(&self.pool)
        .await?;

        let contact_count = contacts.len() as i64;
        Ok(Some(LeadGroupWithContacts {
            group,
            contacts,
            contact_count,
        }))
    }

    pub async fn create(
        &self,
        identity: &Identity,
        input: LeadGroupInsert,
    ) -> Result<LeadGroup, ServiceError> {
        let (group_id,): (i64,) = sqlx::query_as(
            "INSERT INTO lead_groups (org_id, user_id, name, description, color) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(identity.org_id)
        .bind(&identity.user_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.color)
        .fetch_one(&self.pool)
        .await?;

        self.get_by_id(identity, group_id)
            .await?
            .ok_or(ServiceError::Query(sqlx::Error::RowNotFound))
    }

    pub async fn update(
        &self,
        identity: &Identity,
        group_id: i64,
        patch: LeadGroupPatch,
    ) -> Result<Option<LeadGroup>, ServiceError> {
        let mut query = QueryBuilder::<Postgres>::new("UPDATE lead_groups SET updated_at = NOW()");
        if let Some(name) = &patch.name {
            query.push(", name = ").push_bind(name);
        }
        if let Some(description) = &patch.description {
            query.push(", description = ").push_bind(description);
        }
        if let Some(color) = &patch.color {
            query.push(", color = ").push_bind(color);
        }
        query.push(" WHERE id = ").push_bind(group_id);
        query.push(" AND org_id = ").push_bind(identity.org_id);
        query.push(" AND user_id = ").push_bind(&identity.user_id);
        query.push(" RETURNING *");

        let group = query
            .build_query_as::<LeadGroup>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(group)
    }

    /// Removes the group and, via the join-table cascade, its memberships.
    /// Member contacts are untouched.
    pub async fn delete(&self, identity: &Identity, group_id: i64) -> Result<bool, ServiceError> {
        let result =
            sqlx::query("DELETE FROM lead_groups WHERE id = $1 AND org_id = $2 AND user_id = $3")
                .bind(group_id)
                .bind(identity.org_id)
                .bind(&identity.user_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Idempotent membership insert. Both the group and the contact must be
    /// owned by the identity; a miss on either reads as not-found.
    pub async fn add_contact(
        &self,
        identity: &Identity,
        group_id: i64,
        contact_id: i64,
    ) -> Result<Option<()>, ServiceError> {
        if !self.owns_group_and_contact(identity, group_id, contact_id).await? {
            return Ok(None);
        }

        sqlx::query(
            "INSERT INTO lead_group_contacts (lead_group_id, contact_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(group_id)
        .bind(contact_id)
        .execute(&self.pool)
        .await?;
        Ok(Some(()))
    }

    /// `Ok(Some(false))` means the pair exists but the contact was not a
    /// member.
    pub async fn remove_contact(
        &self,
        identity: &Identity,
        group_id: i64,
        contact_id: i64,
    ) -> Result<Option<bool>, ServiceError> {
        if !self.owns_group_and_contact(identity, group_id, contact_id).await? {
            return Ok(None);
        }

        let result = sqlx::query(
            "DELETE FROM lead_group_contacts WHERE lead_group_id = $1 AND contact_id = $2",
        )
        .bind(group_id)
        .bind(contact_id)
        .execute(&self.pool)
        .await?;
        Ok(Some(result.rows_affected() > 0))
    }

    async fn owns_group_and_contact(
        &self,
        identity: &Identity,
        group_id: i64,
        contact_id: i64,
    ) -> Result<bool, ServiceError> {
        let group = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM lead_groups WHERE id = $1 AND org_id = $2 AND user_id = $3",
        )
        .bind(group_id)
        .bind(identity.org_id)
        .bind(&identity.user_id)
        .fetch_optional(&self.pool)
        .await?;

        let contact = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM contacts WHERE id = $1 AND org_id = $2 AND user_id = $3",
        )
        .bind(contact_id)
        .bind(identity.org_id)
        .bind(&identity.user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(group.is_some() && contact.is_some())
    }
}
