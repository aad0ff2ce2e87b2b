use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use fairway_shared::errors::{AppError, AppResult, ErrorCode};
use fairway_shared::types::api::ApiResponse;

use crate::services::usage_service::{self, ConsumeResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ConsumeLikeRequest {
    pub user_id: Option<Uuid>,
}

/// POST /internal/likes/consume
///
/// Consume one unit of today's like quota for a user. Called by the
/// matching service before it records a like. Service-to-service only;
/// mounted without auth.
pub async fn consume_like(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ConsumeLikeRequest>,
) -> AppResult<Json<ApiResponse<ConsumeResult>>> {
    let user_id = req
        .user_id
        .ok_or_else(|| AppError::new(ErrorCode::ValidationError, "user_id is required"))?;

    let now = Utc::now();
    let tier = usage_service::tier_for_user(&state.db, user_id, now)?;

    let result = usage_service::consume_like(
        &state.redis,
        tier,
        state.config.free_daily_likes,
        user_id,
        now,
    )
    .await?;

    if !result.allowed {
        tracing::info!(user_id = %user_id, "daily like quota exhausted");
    }

    Ok(Json(ApiResponse::ok(result)))
}
