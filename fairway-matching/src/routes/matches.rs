use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use fairway_shared::errors::{AppError, AppResult, ErrorCode};
use fairway_shared::types::auth::AuthUser;
use fairway_shared::types::pagination::{Paginated, PaginationParams};
use fairway_shared::types::ApiResponse;

use crate::events::publisher;
use crate::models::Match;
use crate::schema::matches;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct MatchPreview {
    pub id: Uuid,
    pub partner_id: Uuid,
    pub partner: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// GET /matches - the caller's matches, newest first, with partner cards.
pub async fn list_matches(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<MatchPreview>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let items: Vec<Match> = matches::table
        .filter(matches::user_a_id.eq(user.id).or(matches::user_b_id.eq(user.id)))
        .order(matches::created_at.desc())
        .offset(params.offset() as i64)
        .limit(params.limit() as i64)
        .load::<Match>(&mut conn)?;

    let total: i64 = matches::table
        .filter(matches::user_a_id.eq(user.id).or(matches::user_b_id.eq(user.id)))
        .count()
        .get_result(&mut conn)?;

    let partner_ids: Vec<Uuid> = items.iter().map(|m| m.partner_of(user.id)).collect();
    let cards = fetch_cards(&state, &partner_ids).await;

    let previews: Vec<MatchPreview> = items
        .into_iter()
        .map(|m| {
            let partner_id = m.partner_of(user.id);
            MatchPreview {
                id: m.id,
                partner_id,
                partner: cards.get(&partner_id).cloned(),
                created_at: m.created_at,
            }
        })
        .collect();

    let paginated = Paginated::new(previews, total as u64, &params);
    Ok(Json(ApiResponse::ok(paginated)))
}

/// DELETE /matches/:id - unmatch. Members only; the row is gone for both.
pub async fn delete_match(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(match_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let match_record = matches::table
        .find(match_id)
        .first::<Match>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::MatchNotFound, "match not found"))?;

    if !match_record.involves(user.id) {
        return Err(AppError::new(ErrorCode::NotMatchMember, "you are not part of this match"));
    }

    diesel::delete(matches::table.find(match_id)).execute(&mut conn)?;

    publisher::publish_match_deleted(
        &state.rabbitmq,
        match_record.id,
        match_record.user_a_id,
        match_record.user_b_id,
        "unmatched",
    )
    .await;

    Ok(Json(ApiResponse::ok(serde_json::json!({
        "match_id": match_id,
        "deleted": true,
    }))))
}

/// Fetch profile cards from fairway-profile for a set of user ids.
/// Best-effort: an unreachable profile service just means bare previews.
pub(crate) async fn fetch_cards(
    state: &AppState,
    user_ids: &[Uuid],
) -> HashMap<Uuid, serde_json::Value> {
    if user_ids.is_empty() {
        return HashMap::new();
    }

    let url = format!("{}/internal/profiles/batch", state.config.profile_service_url);
    let cards: Vec<serde_json::Value> = match state
        .http_client
        .post(&url)
        .json(&serde_json::json!({ "user_ids": user_ids }))
        .send()
        .await
    {
        Ok(resp) => match resp.json::<ApiResponse<Vec<serde_json::Value>>>().await {
            Ok(body) => body.data,
            Err(e) => {
                tracing::warn!(error = %e, "malformed profile batch response");
                vec![]
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "failed to fetch profiles from fairway-profile");
            vec![]
        }
    };

    cards
        .into_iter()
        .filter_map(|card| {
            card.get("user_id")
                .and_then(|v| v.as_str())
                .and_then(|s| Uuid::parse_str(s).ok())
                .map(|id| (id, card))
        })
        .collect()
}
