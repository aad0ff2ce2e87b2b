use axum::extract::{Path, State};
use axum::Json;
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use fairway_shared::errors::{AppError, AppResult};
use fairway_shared::types::api::ApiResponse;

use crate::schema::blocks;
use crate::AppState;

/// GET /internal/blocked-ids/:user_id
///
/// Every user id involved in a block with the given user, in either
/// direction. Service-to-service only; mounted without auth.
pub async fn get_blocked_ids(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<Uuid>>>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let outgoing: Vec<Uuid> = blocks::table
        .filter(blocks::blocker_id.eq(user_id))
        .select(blocks::blocked_id)
        .load::<Uuid>(&mut conn)?;

    let incoming: Vec<Uuid> = blocks::table
        .filter(blocks::blocked_id.eq(user_id))
        .select(blocks::blocker_id)
        .load::<Uuid>(&mut conn)?;

    let mut ids = outgoing;
    for id in incoming {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    Ok(Json(ApiResponse::ok(ids)))
}
