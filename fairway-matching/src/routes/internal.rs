use axum::extract::{Path, State};
use axum::Json;
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use fairway_shared::errors::{AppError, AppResult};
use fairway_shared::types::api::ApiResponse;

use crate::schema::swipes;
use crate::AppState;

/// GET /internal/swiped-ids/:user_id
///
/// Every user id the given user has already swiped on, liked or passed.
/// Service-to-service only; mounted without auth.
pub async fn get_swiped_ids(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<Uuid>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let ids: Vec<Uuid> = swipes::table
        .filter(swipes::swiper_id.eq(user_id))
        .select(swipes::target_id)
        .load::<Uuid>(&mut conn)?;

    Ok(Json(ApiResponse::ok(ids)))
}
