use axum::extract::State;
use axum::Json;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use fairway_shared::errors::{AppError, AppResult};
use fairway_shared::types::api::ApiResponse;

use crate::models::{Profile, ProfileCard};
use crate::schema::profiles;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct BatchProfilesRequest {
    pub user_ids: Vec<Uuid>,
}

/// POST /internal/profiles/batch
///
/// Card projections for a set of user ids. Service-to-service only;
/// mounted without auth. Unknown ids are simply absent from the result.
pub async fn batch_profiles(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchProfilesRequest>,
) -> AppResult<Json<ApiResponse<Vec<ProfileCard>>>> {
    if req.user_ids.is_empty() {
        return Ok(Json(ApiResponse::ok(vec![])));
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let items: Vec<Profile> = profiles::table
        .filter(profiles::user_id.eq_any(&req.user_ids))
        .load::<Profile>(&mut conn)?;

    let cards: Vec<ProfileCard> = items.into_iter().map(ProfileCard::from).collect();
    Ok(Json(ApiResponse::ok(cards)))
}
