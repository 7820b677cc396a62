use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// Business card OCR lifecycle. The OCR collaborator moves a card out of
/// `processing`; only an explicit user action reaches `user_verified`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "card_status", rename_all = "snake_case")]
pub enum CardStatus {
    Processing,
    Completed,
    Failed,
    PendingReview,
    UserVerified,
}

impl CardStatus {
    pub fn can_transition_to(self, next: CardStatus) -> bool {
        use CardStatus::*;
        matches!(
            (self, next),
            (Processing, Completed)
                | (Processing, Failed)
                | (Processing, PendingReview)
                | (Completed, UserVerified)
                | (PendingReview, UserVerified)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CardStatus::Processing => "processing",
            CardStatus::Completed => "completed",
            CardStatus::Failed => "failed",
            CardStatus::PendingReview => "pending_review",
            CardStatus::UserVerified => "user_verified",
        }
    }
}

impl fmt::Display for CardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CardStatus {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "processing" => Ok(CardStatus::Processing),
            "completed" => Ok(CardStatus::Completed),
            "failed" => Ok(CardStatus::Failed),
            "pending_review" => Ok(CardStatus::PendingReview),
            "user_verified" => Ok(CardStatus::UserVerified),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BusinessCard {
    pub id: i64,
    pub org_id: i64,
    pub user_id: String,
    pub event_id: Option<i64>,
    pub storage_path: String,
    pub status: CardStatus,
    pub ocr_data: Option<serde_json::Value>,
    pub confidence_score: Option<Decimal>,
    pub uploaded_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}
