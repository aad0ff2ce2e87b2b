use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use fairway_shared::errors::{AppError, AppResult, ErrorCode};
use fairway_shared::types::auth::AuthUser;
use fairway_shared::types::ApiResponse;

use crate::events::publisher;
use crate::models::{ordered_pair, Match, NewMatch, NewSwipe, Swipe, SwipeDirection};
use crate::routes::matches::fetch_cards;
use crate::schema::{matches, swipes};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSwipeRequest {
    pub target_user_id: Option<Uuid>,
    pub direction: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SwipeResponse {
    pub swipe: Swipe,
    pub matched: bool,
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    pub match_record: Option<Match>,
}

pub async fn create_swipe(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSwipeRequest>,
) -> AppResult<Json<ApiResponse<SwipeResponse>>> {
    let target_id = req
        .target_user_id
        .ok_or_else(|| AppError::new(ErrorCode::ValidationError, "target_user_id is required"))?;

    let direction: SwipeDirection = req
        .direction
        .as_deref()
        .ok_or_else(|| AppError::new(ErrorCode::ValidationError, "direction is required"))?
        .parse()
        .map_err(|_| {
            AppError::new(ErrorCode::InvalidSwipeDirection, "direction must be 'like' or 'pass'")
        })?;

    if user.id == target_id {
        return Err(AppError::new(ErrorCode::CannotSwipeSelf, "you cannot swipe on yourself"));
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    // One swipe per pair, lifetime. Repeats are idempotent.
    let existing = swipes::table
        .filter(swipes::swiper_id.eq(user.id))
        .filter(swipes::target_id.eq(target_id))
        .first::<Swipe>(&mut conn)
        .optional()?;

    if let Some(swipe) = existing {
        let match_record = find_match(&mut conn, user.id, target_id)?;
        return Ok(Json(ApiResponse::ok(SwipeResponse {
            matched: match_record.is_some(),
            match_record,
            swipe,
        })));
    }

    if direction == SwipeDirection::Like {
        consume_like_quota(&state, user.id).await?;
    }

    let new_swipe = NewSwipe {
        swiper_id: user.id,
        target_id,
        direction: direction.to_string(),
    };

    let swipe: Swipe = match diesel::insert_into(swipes::table)
        .values(&new_swipe)
        .get_result(&mut conn)
    {
        Ok(swipe) => swipe,
        // Lost a concurrent duplicate race: the earlier swipe wins.
        Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            swipes::table
                .filter(swipes::swiper_id.eq(user.id))
                .filter(swipes::target_id.eq(target_id))
                .first::<Swipe>(&mut conn)?
        }
        Err(e) => return Err(AppError::Database(e)),
    };

    if direction == SwipeDirection::Pass {
        return Ok(Json(ApiResponse::ok(SwipeResponse {
            swipe,
            matched: false,
            match_record: None,
        })));
    }

    // A reciprocal like turns into a match.
    let reciprocal: i64 = swipes::table
        .filter(swipes::swiper_id.eq(target_id))
        .filter(swipes::target_id.eq(user.id))
        .filter(swipes::direction.eq("like"))
        .count()
        .get_result(&mut conn)?;

    if reciprocal > 0 {
        let match_record = create_match(&mut conn, user.id, target_id)?;
        publisher::publish_match_created(
            &state.rabbitmq,
            match_record.id,
            match_record.user_a_id,
            match_record.user_b_id,
        )
        .await;

        return Ok(Json(ApiResponse::ok(SwipeResponse {
            swipe,
            matched: true,
            match_record: Some(match_record),
        })));
    }

    let display_name = fetch_cards(&state, &[user.id])
        .await
        .get(&user.id)
        .and_then(|card| card.get("display_name").and_then(|v| v.as_str()).map(String::from))
        .unwrap_or_else(|| "A golfer".to_string());

    publisher::publish_swipe_liked(&state.rabbitmq, user.id, target_id, &display_name).await;

    Ok(Json(ApiResponse::ok(SwipeResponse {
        swipe,
        matched: false,
        match_record: None,
    })))
}

fn find_match(conn: &mut PgConnection, x: Uuid, y: Uuid) -> AppResult<Option<Match>> {
    let (a, b) = ordered_pair(x, y);
    let found = matches::table
        .filter(matches::user_a_id.eq(a))
        .filter(matches::user_b_id.eq(b))
        .first::<Match>(conn)
        .optional()?;
    Ok(found)
}

fn create_match(conn: &mut PgConnection, x: Uuid, y: Uuid) -> AppResult<Match> {
    let (user_a_id, user_b_id) = ordered_pair(x, y);
    match diesel::insert_into(matches::table)
        .values(&NewMatch { user_a_id, user_b_id })
        .get_result::<Match>(conn)
    {
        Ok(m) => Ok(m),
        // Both sides liked at once; keep the row that won.
        Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            find_match(conn, x, y)?
                .ok_or_else(|| AppError::internal("match vanished after unique violation"))
        }
        Err(e) => Err(AppError::Database(e)),
    }
}

// --- Daily like quota ---

#[derive(Debug, Serialize, Deserialize)]
struct ConsumeResult {
    allowed: bool,
    remaining: Option<i64>,
    resets_at: DateTime<Utc>,
}

/// Ask the subscription service for one unit of today's like quota. The
/// quota is a product limit, not a safety control: if the service cannot
/// be reached, the like goes through and we log the gap.
async fn consume_like_quota(state: &AppState, user_id: Uuid) -> AppResult<()> {
    let url = format!(
        "{}/internal/likes/consume",
        state.config.subscription_service_url
    );

    let result = state
        .http_client
        .post(&url)
        .json(&serde_json::json!({ "user_id": user_id }))
        .send()
        .await;

    let resp = match result {
        Ok(resp) => resp,
        Err(e) => {
            tracing::warn!(user_id = %user_id, error = %e, "quota check unreachable, allowing like");
            return Ok(());
        }
    };

    let body: ApiResponse<ConsumeResult> = match resp.json().await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(user_id = %user_id, error = %e, "malformed quota response, allowing like");
            return Ok(());
        }
    };

    if !body.data.allowed {
        return Err(AppError::with_details(
            ErrorCode::LikeQuotaExceeded,
            "daily like limit reached",
            serde_json::json!({
                "remaining": body.data.remaining.unwrap_or(0),
                "resets_at": body.data.resets_at,
            }),
        ));
    }

    Ok(())
}
