use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;

use fairway_shared::errors::{AppError, AppResult};
use fairway_shared::types::api::ApiResponse;
use fairway_shared::types::auth::AuthUser;

use crate::models::Subscription;
use crate::schema::subscriptions;
use crate::services::usage_service::{self, UsageStats};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SubscriptionInfo {
    pub tier: String,
    pub current_period_end: Option<DateTime<Utc>>,
}

/// GET /subscription - the caller's subscription. No row means the
/// implicit free tier, not a 404.
pub async fn get_subscription(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<SubscriptionInfo>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let subscription = subscriptions::table
        .filter(subscriptions::user_id.eq(auth_user.id))
        .first::<Subscription>(&mut conn)
        .optional()?;

    let now = Utc::now();
    let info = match subscription {
        Some(s) => SubscriptionInfo {
            tier: s.effective_tier(now).to_string(),
            current_period_end: s.current_period_end,
        },
        None => SubscriptionInfo {
            tier: "free".to_string(),
            current_period_end: None,
        },
    };

    Ok(Json(ApiResponse::ok(info)))
}

/// GET /usage - today's like usage for the caller.
pub async fn get_usage(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<UsageStats>>> {
    let now = Utc::now();
    let tier = usage_service::tier_for_user(&state.db, auth_user.id, now)?;

    let stats = usage_service::usage_stats(
        &state.redis,
        tier,
        state.config.free_daily_likes,
        auth_user.id,
        now,
    )
    .await?;

    Ok(Json(ApiResponse::ok(stats)))
}
