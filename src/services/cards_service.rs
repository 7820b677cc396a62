use sqlx::PgPool;
use uuid::Uuid;

use super::analytics_service::{AnalyticsService, StatColumn};
use super::ServiceError;
use crate::database::manager::DatabaseManager;
use crate::database::models::{BusinessCard, CardStatus};
use crate::middleware::auth::Identity;
use crate::validation::{BusinessCardUpload, ProcessingResult, ValidationErrors};

pub struct CardsService {
    pool: PgPool,
}

impl CardsService {
    pub async fn new() -> Result<Self, ServiceError> {
        Ok(Self {
            pool: DatabaseManager::pool().await?,
        })
    }

    pub async fn list(&self, identity: &Identity) -> Result<Vec<BusinessCard>, ServiceError> {
        let cards = sqlx::query_as::<_, BusinessCard>(
            "SELECT * FROM business_cards WHERE org_id = $1 AND user_id = $2 \
             ORDER BY uploaded_at DESC, id DESC",
        )
        .bind(identity.org_id)
        .bind(&identity.user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(cards)
    }

    pub async fn get_by_id(
        &self,
        identity: &Identity,
        card_id: i64,
    ) -> Result<Option<BusinessCard>, ServiceError> {
        let card = sqlx::query_as::<_, BusinessCard>(
            "SELECT * FROM business_cards WHERE id = $1 AND org_id = $2 AND user_id = $3",
        )
        .bind(card_id)
        .bind(identity.org_id)
        .bind(&identity.user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(card)
    }

    /// Registers an uploaded card image; OCR happens elsewhere, so the row
    /// starts in `processing` and is observed via its status.
    pub async fn upload(
        &self,
        identity: &Identity,
        input: BusinessCardUpload,
    ) -> Result<BusinessCard, ServiceError> {
        if let Some(event_id) = input.event_id {
            self.check_event_ref(identity, event_id).await?;
        }

        let storage_path = input.storage_path.unwrap_or_else(|| {
            format!("business-cards/{}/{}", identity.user_id, Uuid::new_v4())
        });

        let (card_id,): (i64,) = sqlx::query_as(
            "INSERT INTO business_cards (org_id, user_id, event_id, storage_path) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(identity.org_id)
        .bind(&identity.user_id)
        .bind(input.event_id)
        .bind(&storage_path)
        .fetch_one(&self.pool)
        .await?;

        AnalyticsService::with_pool(self.pool.clone())
            .track(
                identity,
                "card_uploaded",
                Some(StatColumn::CardsUploaded),
                "business_card",
                card_id,
                None,
            )
            .await;

        self.get_by_id(identity, card_id)
            .await?
            .ok_or(ServiceError::Query(sqlx::Error::RowNotFound))
    }

    /// Records the OCR collaborator's outcome for a card still in
    /// `processing` and stamps `processed_at`.
    pub async fn set_processing_result(
        &self,
        identity: &Identity,
        card_id: i64,
        result: ProcessingResult,
    ) -> Result<Option<BusinessCard>, ServiceError> {
        let Some(existing) = self.get_by_id(identity, card_id).await? else {
            return Ok(None);
        };
        if !existing.status.can_transition_to(result.status) {
            return Err(ServiceError::Conflict(format!(
                "Cannot transition card from {} to {}",
                existing.status, result.status
            )));
        }

        sqlx::query(
            "UPDATE business_cards SET status = $1, ocr_data = $2, confidence_score = $3, \
             processed_at = NOW() WHERE id = $4 AND org_id = $5 AND user_id = $6",
        )
        .bind(result.status)
        .bind(result.ocr_data)
        .bind(result.confidence_score)
        .bind(card_id)
        .bind(identity.org_id)
        .bind(&identity.user_id)
        .execute(&self.pool)
        .await?;

        self.get_by_id(identity, card_id).await
    }

    /// Explicit user sign-off, only reachable from `completed` or
    /// `pending_review`. A failed card can only be re-uploaded.
    pub async fn verify(
        &self,
        identity: &Identity,
        card_id: i64,
    ) -> Result<Option<BusinessCard>, ServiceError> {
        let Some(existing) = self.get_by_id(identity, card_id).await? else {
            return Ok(None);
        };
        if !existing.status.can_transition_to(CardStatus::UserVerified) {
            return Err(ServiceError::Conflict(format!(
                "Cannot verify a card in status {}",
                existing.status
            )));
        }

        sqlx::query(
            "UPDATE business_cards SET status = $1 \
             WHERE id = $2 AND org_id = $3 AND user_id = $4",
        )
        .bind(CardStatus::UserVerified)
        .bind(card_id)
        .bind(identity.org_id)
        .bind(&identity.user_id)
        .execute(&self.pool)
        .await?;

        AnalyticsService::with_pool(self.pool.clone())
            .track(identity, "card_verified", None, "business_card", card_id, None)
            .await;

        self.get_by_id(identity, card_id).await
    }

    async fn check_event_ref(
        &self,
        identity: &Identity,
        event_id: i64,
    ) -> Result<(), ServiceError> {
        let found = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM events WHERE id = $1 AND org_id = $2 AND user_id = $3",
        )
        .bind(event_id)
        .bind(identity.org_id)
        .bind(&identity.user_id)
        .fetch_optional(&self.pool)
        .await?;
        if found.is_none() {
            let mut errors = ValidationErrors::new();
            errors.reference("eventId", "eventId does not reference one of your events");
            return Err(ServiceError::Validation(errors));
        }
        Ok(())
    }
}
