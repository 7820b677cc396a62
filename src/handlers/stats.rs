use axum::extract::Query;
use axum::Extension;
use chrono::Utc;
use serde::Deserialize;

use crate::config;
use crate::database::models::{ActivityLog, DailyStats};
use crate::error::ApiError;
use crate::middleware::auth::Identity;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::analytics_service::AnalyticsService;
use crate::validation::parse_date;

#[derive(Debug, Deserialize)]
pub struct DailyQuery {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<i64>,
}

/// GET /api/stats/daily?date=YYYY-MM-DD - defaults to today; a day with no
/// recorded activity reads as zeros.
pub async fn daily(
    Extension(identity): Extension<Identity>,
    Query(query): Query<DailyQuery>,
) -> ApiResult<DailyStats> {
    let date = match query.date.as_deref() {
        Some(raw) => {
            parse_date(raw).ok_or_else(|| ApiError::bad_request("Invalid date, expected YYYY-MM-DD"))?
        }
        None => Utc::now().date_naive(),
    };

    let stats = AnalyticsService::new().await?.daily_stats(&identity, date).await?;
    let stats = stats.unwrap_or(DailyStats {
        id: 0,
        org_id: identity.org_id,
        date,
        cards_uploaded: 0,
        contacts_created: 0,
        contacts_verified: 0,
        drafts_generated: 0,
        drafts_sent_to_gmail: 0,
        emails_sent: 0,
        created_at: Utc::now(),
    });
    Ok(ApiResponse::success(stats))
}

/// GET /api/activity?limit= - most recent first
pub async fn activity(
    Extension(identity): Extension<Identity>,
    Query(query): Query<ActivityQuery>,
) -> ApiResult<Vec<ActivityLog>> {
    let default_limit = config::config().api.activity_page_limit;
    let limit = query.limit.unwrap_or(default_limit).clamp(1, 200);
    let entries = AnalyticsService::new()
        .await?
        .recent_activity(&identity, limit)
        .await?;
    Ok(ApiResponse::success(entries))
}
