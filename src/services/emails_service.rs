use serde_json::json;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::analytics_service::{AnalyticsService, StatColumn};
use super::ServiceError;
use crate::database::manager::DatabaseManager;
use crate::database::models::{
    EmailDraftWithDetails, EmailStatus, EmailTemplate, GmailConnection,
};
use crate::middleware::auth::Identity;
use crate::security::TokenCipher;
use crate::validation::{
    EmailDraftInsert, EmailDraftPatch, EmailTemplateInsert, EmailTemplatePatch,
    GmailConnectionUpsert, ValidationErrors,
};

/// Draft reads join the recipient contact and the optional source template so
/// every endpoint returns the same detailed shape.
const DRAFT_WITH_DETAILS_SELECT: &str = "SELECT d.*, \
     c.id AS c_id, c.org_id AS c_org_id, c.user_id AS c_user_id, c.event_id AS c_event_id, \
     c.card_id AS c_card_id, c.full_name AS c_full_name, c.company AS c_company, \
     c.title AS c_title, c.phone AS c_phone, c.email AS c_email, \
     c.ocr_confidence AS c_ocr_confidence, c.is_verified AS c_is_verified, \
     c.verified_at AS c_verified_at, c.verified_by AS c_verified_by, \
     c.linkedin_url AS c_linkedin_url, c.website AS c_website, c.notes AS c_notes, \
     c.created_at AS c_created_at, c.updated_at AS c_updated_at, \
     t.id AS t_id, t.org_id AS t_org_id, t.user_id AS t_user_id, t.name AS t_name, \
     t.subject AS t_subject, t.body AS t_body, t.is_default AS t_is_default, \
     t.created_at AS t_created_at, t.updated_at AS t_updated_at \
     FROM email_drafts d \
     JOIN contacts c ON c.id = d.contact_id \
     LEFT JOIN email_templates t ON t.id = d.template_id";

pub struct EmailsService {
    pool: PgPool,
}

impl EmailsService {
    pub async fn new() -> Result<Self, ServiceError> {
        Ok(Self {
            pool: DatabaseManager::pool().await?,
        })
    }

    // ----- Templates -----

    pub async fn list_templates(
        &self,
        identity: &Identity,
    ) -> Result<Vec<EmailTemplate>, ServiceError> {
        let templates = sqlx::query_as::<_, EmailTemplate>(
            "SELECT * FROM email_templates WHERE org_id = $1 AND user_id = $2 \
             ORDER BY name ASC, id ASC",
        )
        .bind(identity.org_id)
        .bind(&identity.user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(templates)
    }

    pub async fn get_template(
        &self,
        identity: &Identity,
        template_id: i64,
    ) -> Result<Option<EmailTemplate>, ServiceError> {
        let template = sqlx::query_as::<_, EmailTemplate>(
            "SELECT * FROM email_templates WHERE id = $1 AND org_id = $2 AND user_id = $3",
        )
        .bind(template_id)
        .bind(identity.org_id)
        .bind(&identity.user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(template)
    }

    pub async fn create_template(
        &self,
        identity: &Identity,
        input: EmailTemplateInsert,
    ) -> Result<EmailTemplate, ServiceError> {
        let (template_id,): (i64,) = sqlx::query_as(
            "INSERT INTO email_templates (org_id, user_id, name, subject, body, is_default) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(identity.org_id)
        .bind(&identity.user_id)
        .bind(&input.name)
        .bind(&input.subject)
        .bind(&input.body)
        .bind(input.is_default)
        .fetch_one(&self.pool)
        .await?;

        self.get_template(identity, template_id)
            .await?
            .ok_or(ServiceError::Query(sqlx::Error::RowNotFound))
    }

    pub async fn update_template(
        &self,
        identity: &Identity,
        template_id: i64,
        patch: EmailTemplatePatch,
    ) -> Result<Option<EmailTemplate>, ServiceError> {
        let mut query =
            QueryBuilder::<Postgres>::new("UPDATE email_templates SET updated_at = NOW()");
        if let Some(name) = &patch.name {
            query.push(", name = ").push_bind(name);
        }
        if let Some(subject) = &patch.subject {
            query.push(", subject = ").push_bind(subject);
        }
        if let Some(body) = &patch.body {
            query.push(", body = ").push_bind(body);
        }
        if let Some(is_default) = patch.is_default {
            query.push(", is_default = ").push_bind(is_default);
        }
        query.push(" WHERE id = ").push_bind(template_id);
        query.push(" AND org_id = ").push_bind(identity.org_id);
        query.push(" AND user_id = ").push_bind(&identity.user_id);
        query.push(" RETURNING *");

        let template = query
            .build_query_as::<EmailTemplate>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(template)
    }

    pub async fn delete_template(
        &self,
        identity: &Identity,
        template_id: i64,
    ) -> Result<bool, ServiceError> {
        let result = sqlx::query(
            "DELETE FROM email_templates WHERE id = $1 AND org_id = $2 AND user_id = $3",
        )
        .bind(template_id)
        .bind(identity.org_id)
        .bind(&identity.user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // ----- Drafts -----

    pub async fn list_drafts(
        &self,
        identity: &Identity,
    ) -> Result<Vec<EmailDraftWithDetails>, ServiceError> {
        let sql = format!(
            "{DRAFT_WITH_DETAILS_SELECT} WHERE d.org_id = $1 AND d.user_id = $2 \
             ORDER BY d.created_at DESC, d.id DESC"
        );
        let drafts = sqlx::query_as::<_, EmailDraftWithDetails>(&sql)
            .bind(identity.org_id)
            .bind(&identity.user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(drafts)
    }

    pub async fn get_draft(
        &self,
        identity: &Identity,
        draft_id: i64,
    ) -> Result<Option<EmailDraftWithDetails>, ServiceError> {
        let sql = format!(
            "{DRAFT_WITH_DETAILS_SELECT} WHERE d.org_id = $1 AND d.user_id = $2 AND d.id = $3"
        );
        let draft = sqlx::query_as::<_, EmailDraftWithDetails>(&sql)
            .bind(identity.org_id)
            .bind(&identity.user_id)
            .bind(draft_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(draft)
    }

    pub async fn create_draft(
        &self,
        identity: &Identity,
        input: EmailDraftInsert,
    ) -> Result<EmailDraftWithDetails, ServiceError> {
        self.check_owned_refs(identity, &input).await?;

        let (draft_id,): (i64,) = sqlx::query_as(
            "INSERT INTO email_drafts (org_id, user_id, contact_id, template_id, lead_group_id, \
             subject, body) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
        )
        .bind(identity.org_id)
        .bind(&identity.user_id)
        .bind(input.contact_id)
        .bind(input.template_id)
        .bind(input.lead_group_id)
        .bind(&input.subject)
        .bind(&input.body)
        .fetch_one(&self.pool)
        .await?;

        AnalyticsService::with_pool(self.pool.clone())
            .track(
                identity,
                "draft_generated",
                Some(StatColumn::DraftsGenerated),
                "email_draft",
                draft_id,
                None,
            )
            .await;

        self.get_draft(identity, draft_id)
            .await?
            .ok_or(ServiceError::Query(sqlx::Error::RowNotFound))
    }

    /// Content edits only apply while the draft has not left `draft`.
    pub async fn update_draft(
        &self,
        identity: &Identity,
        draft_id: i64,
        patch: EmailDraftPatch,
    ) -> Result<Option<EmailDraftWithDetails>, ServiceError> {
        let Some(existing) = self.get_draft(identity, draft_id).await? else {
            return Ok(None);
        };
        if existing.draft.status != EmailStatus::Draft {
            return Err(ServiceError::Conflict(format!(
                "Cannot edit a draft in status {}",
                existing.draft.status
            )));
        }

        if let Some(template_id) = patch.template_id {
            self.check_template_ref(identity, template_id).await?;
        }
        if let Some(lead_group_id) = patch.lead_group_id {
            self.check_lead_group_ref(identity, lead_group_id).await?;
        }

        // Drafts carry no updated_at; the no-op assignment keeps SET well-formed
        // when the patch is empty.
        let mut query = QueryBuilder::<Postgres>::new("UPDATE email_drafts SET id = id");
        if let Some(subject) = &patch.subject {
            query.push(", subject = ").push_bind(subject);
        }
        if let Some(body) = &patch.body {
            query.push(", body = ").push_bind(body);
        }
        if let Some(template_id) = patch.template_id {
            query.push(", template_id = ").push_bind(template_id);
        }
        if let Some(lead_group_id) = patch.lead_group_id {
            query.push(", lead_group_id = ").push_bind(lead_group_id);
        }
        query.push(" WHERE id = ").push_bind(draft_id);
        query.push(" AND org_id = ").push_bind(identity.org_id);
        query.push(" AND user_id = ").push_bind(&identity.user_id);

        query.build().execute(&self.pool).await?;

        self.get_draft(identity, draft_id).await
    }

    /// Monotonic status walk: draft -> sent_to_gmail -> sent, with failed
    /// reachable from the two non-terminal states. Stamps the matching
    /// timestamp on the way through.
    pub async fn transition_draft(
        &self,
        identity: &Identity,
        draft_id: i64,
        next: EmailStatus,
    ) -> Result<Option<EmailDraftWithDetails>, ServiceError> {
        let Some(existing) = self.get_draft(identity, draft_id).await? else {
            return Ok(None);
        };
        let current = existing.draft.status;
        if !current.can_transition_to(next) {
            return Err(ServiceError::Conflict(format!(
                "Cannot transition draft from {current} to {next}"
            )));
        }

        let sql = match next {
            EmailStatus::SentToGmail => {
                "UPDATE email_drafts SET status = $1, sent_to_gmail_at = NOW() \
                 WHERE id = $2 AND org_id = $3 AND user_id = $4"
            }
            EmailStatus::Sent => {
                "UPDATE email_drafts SET status = $1, sent_at = NOW() \
                 WHERE id = $2 AND org_id = $3 AND user_id = $4"
            }
            _ => {
                "UPDATE email_drafts SET status = $1 \
                 WHERE id = $2 AND org_id = $3 AND user_id = $4"
            }
        };
        sqlx::query(sql)
            .bind(next)
            .bind(draft_id)
            .bind(identity.org_id)
            .bind(&identity.user_id)
            .execute(&self.pool)
            .await?;

        let (action, stat) = match next {
            EmailStatus::SentToGmail => ("draft_sent_to_gmail", Some(StatColumn::DraftsSentToGmail)),
            EmailStatus::Sent => ("email_sent", Some(StatColumn::EmailsSent)),
            _ => ("draft_failed", None),
        };
        AnalyticsService::with_pool(self.pool.clone())
            .track(
                identity,
                action,
                stat,
                "email_draft",
                draft_id,
                Some(json!({ "from": current.as_str(), "to": next.as_str() })),
            )
            .await;

        self.get_draft(identity, draft_id).await
    }

    pub async fn delete_draft(
        &self,
        identity: &Identity,
        draft_id: i64,
    ) -> Result<bool, ServiceError> {
        let result =
            sqlx::query("DELETE FROM email_drafts WHERE id = $1 AND org_id = $2 AND user_id = $3")
                .bind(draft_id)
                .bind(identity.org_id)
                .bind(&identity.user_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    // ----- Gmail connection -----

    pub async fn get_connection(
        &self,
        identity: &Identity,
    ) -> Result<Option<GmailConnection>, ServiceError> {
        let connection = sqlx::query_as::<_, GmailConnection>(
            "SELECT * FROM gmail_connections WHERE user_id = $1",
        )
        .bind(&identity.user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(connection)
    }

    /// One connection per user; tokens are encrypted before they reach the
    /// database.
    pub async fn upsert_connection(
        &self,
        identity: &Identity,
        input: GmailConnectionUpsert,
    ) -> Result<GmailConnection, ServiceError> {
        let cipher = TokenCipher::from_config()?;
        let access_token = cipher.encrypt(&input.access_token)?;
        let refresh_token = input
            .refresh_token
            .as_deref()
            .map(|token| cipher.encrypt(token))
            .transpose()?;

        let connection = sqlx::query_as::<_, GmailConnection>(
            "INSERT INTO gmail_connections (user_id, email, access_token, refresh_token, token_expiry) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (user_id) DO UPDATE SET \
                 email = EXCLUDED.email, \
                 access_token = EXCLUDED.access_token, \
                 refresh_token = EXCLUDED.refresh_token, \
                 token_expiry = EXCLUDED.token_expiry, \
                 is_active = TRUE \
             RETURNING *",
        )
        .bind(&identity.user_id)
        .bind(&input.email)
        .bind(access_token)
        .bind(refresh_token)
        .bind(input.token_expiry)
        .fetch_one(&self.pool)
        .await?;
        Ok(connection)
    }

    pub async fn disconnect(&self, identity: &Identity) -> Result<bool, ServiceError> {
        let result = sqlx::query("DELETE FROM gmail_connections WHERE user_id = $1")
            .bind(&identity.user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ----- Reference checks -----

    async fn check_owned_refs(
        &self,
        identity: &Identity,
        input: &EmailDraftInsert,
    ) -> Result<(), ServiceError> {
        let mut errors = ValidationErrors::new();

        let contact = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM contacts WHERE id = $1 AND org_id = $2 AND user_id = $3",
        )
        .bind(input.contact_id)
        .bind(identity.org_id)
        .bind(&identity.user_id)
        .fetch_optional(&self.pool)
        .await?;
        if contact.is_none() {
            errors.reference("contactId", "contactId does not reference one of your contacts");
        }

        if let Some(template_id) = input.template_id {
            if self.get_template(identity, template_id).await?.is_none() {
                errors.reference("templateId", "templateId does not reference one of your templates");
            }
        }

        if let Some(lead_group_id) = input.lead_group_id {
            let group = sqlx::query_scalar::<_, i64>(
                "SELECT id FROM lead_groups WHERE id = $1 AND org_id = $2 AND user_id = $3",
            )
            .bind(lead_group_id)
            .bind(identity.org_id)
            .bind(&identity.user_id)
            .fetch_optional(&self.pool)
            .await?;
            if group.is_none() {
                errors.reference(
                    "leadGroupId",
                    "leadGroupId does not reference one of your lead groups",
                );
            }
        }

        if !errors.is_empty() {
            return Err(ServiceError::Validation(errors));
        }
        Ok(())
    }

    async fn check_template_ref(
        &self,
        identity: &Identity,
        template_id: i64,
    ) -> Result<(), ServiceError> {
        if self.get_template(identity, template_id).await?.is_none() {
            let mut errors = ValidationErrors::new();
            errors.reference("templateId", "templateId does not reference one of your templates");
            return Err(ServiceError::Validation(errors));
        }
        Ok(())
    }

    async fn check_lead_group_ref(
        &self,
        identity: &Identity,
        lead_group_id: i64,
    ) -> Result<(), ServiceError> {
        let group = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM lead_groups WHERE id = $1 AND org_id = $2 AND user_id = $3",
        )
        .bind(lead_group_id)
        .bind(identity.org_id)
        .bind(&identity.user_id)
        .fetch_optional(&self.pool)
        .await?;
        if group.is_none() {
            let mut errors = ValidationErrors::new();
            errors.reference(
                "leadGroupId",
                "leadGroupId does not reference one of your lead groups",
            );
            return Err(ServiceError::Validation(errors));
        }
        Ok(())
    }
}
