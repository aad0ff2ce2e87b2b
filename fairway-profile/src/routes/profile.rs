use axum::extract::{Path, Query, State};
use axum::Json;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use fairway_shared::errors::{AppError, AppResult, ErrorCode};
use fairway_shared::types::auth::AuthUser;
use fairway_shared::types::pagination::{Paginated, PaginationParams};
use fairway_shared::types::ApiResponse;

use crate::events::publisher;
use crate::models::{NewProfile, Profile, ProfileCard, UpdateProfile};
use crate::schema::profiles;
use crate::AppState;

pub const HANDICAP_MIN: f64 = -10.0;
pub const HANDICAP_MAX: f64 = 54.0;

fn validate_display_name(name: &str) -> AppResult<()> {
    if name.len() < 3 || name.len() > 30 {
        return Err(AppError::new(
            ErrorCode::InvalidDisplayName,
            "display name must be between 3 and 30 characters",
        ));
    }
    if !name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == ' ') {
        return Err(AppError::new(
            ErrorCode::InvalidDisplayName,
            "display name can only contain letters, numbers, spaces, and underscores",
        ));
    }
    Ok(())
}

fn validate_handicap(handicap: f64) -> AppResult<()> {
    if !(HANDICAP_MIN..=HANDICAP_MAX).contains(&handicap) {
        return Err(AppError::new(
            ErrorCode::InvalidHandicap,
            format!("handicap must be between {HANDICAP_MIN} and {HANDICAP_MAX}"),
        ));
    }
    Ok(())
}

// --- POST /profiles ---

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProfileRequest {
    pub display_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 100))]
    pub home_course: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    pub handicap: Option<f64>,
    #[validate(length(max = 500))]
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

pub async fn create_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateProfileRequest>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    req.validate().map_err(|e| AppError::Validation(e.to_string()))?;

    let display_name = req
        .display_name
        .ok_or_else(|| AppError::new(ErrorCode::ValidationError, "display_name is required"))?;
    let email = req
        .email
        .ok_or_else(|| AppError::new(ErrorCode::ValidationError, "email is required"))?;

    validate_display_name(&display_name)?;
    if let Some(handicap) = req.handicap {
        validate_handicap(handicap)?;
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let existing: i64 = profiles::table
        .filter(profiles::user_id.eq(user.id))
        .count()
        .get_result(&mut conn)?;

    if existing > 0 {
        return Err(AppError::bad_request("profile already exists"));
    }

    let new_profile = NewProfile {
        user_id: user.id,
        display_name,
        email,
        home_course: req.home_course,
        city: req.city,
        handicap: req.handicap,
        bio: req.bio,
        avatar_url: req.avatar_url,
    };

    let profile: Profile = diesel::insert_into(profiles::table)
        .values(&new_profile)
        .get_result(&mut conn)?;

    tracing::info!(user_id = %user.id, profile_id = %profile.id, "profile created");

    Ok(Json(ApiResponse::ok(profile)))
}

// --- GET /me ---

pub async fn get_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let profile = profiles::table
        .filter(profiles::user_id.eq(user.id))
        .first::<Profile>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;

    Ok(Json(ApiResponse::ok(profile)))
}

// --- PATCH /me ---

pub async fn update_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UpdateProfile>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    payload.validate().map_err(|e| AppError::Validation(e.to_string()))?;

    if let Some(ref name) = payload.display_name {
        validate_display_name(name)?;
    }
    if let Some(handicap) = payload.handicap {
        validate_handicap(handicap)?;
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let profile = profiles::table
        .filter(profiles::user_id.eq(user.id))
        .first::<Profile>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;

    if profile.is_banned {
        return Err(AppError::new(ErrorCode::UserBanned, "banned accounts are read-only"));
    }
    if !profile.is_active {
        return Err(AppError::new(
            ErrorCode::UserDeactivated,
            "deactivated accounts are read-only",
        ));
    }

    let updated = diesel::update(profiles::table.filter(profiles::id.eq(profile.id)))
        .set((
            &payload,
            profiles::updated_at.eq(chrono::Utc::now()),
        ))
        .get_result::<Profile>(&mut conn)?;

    publisher::publish_profile_updated(&state.rabbitmq, updated.id, updated.user_id).await;

    Ok(Json(ApiResponse::ok(updated)))
}

// --- GET /profiles/:id --- (public card by user_id or profile id)

pub async fn get_public_profile(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ProfileCard>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let profile = profiles::table
        .filter(profiles::user_id.eq(id).or(profiles::id.eq(id)))
        .first::<Profile>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;

    // Banned and deactivated golfers disappear from the public surface.
    if profile.is_banned || !profile.is_active {
        return Err(AppError::new(ErrorCode::ProfileNotFound, "profile not found"));
    }

    Ok(Json(ApiResponse::ok(ProfileCard::from(profile))))
}

// --- GET /discover ---

/// Candidate feed for swiping: active, unbanned golfers the caller has
/// neither swiped on nor exchanged a block with. The exclusion lists come
/// from the matching and safety services; either being unreachable only
/// shrinks the filter.
pub async fn discover(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<ProfileCard>>>> {
    let mut excluded = fetch_ids(
        &state,
        &format!("{}/internal/swiped-ids/{}", state.config.matching_service_url, user.id),
    )
    .await;
    excluded.extend(
        fetch_ids(
            &state,
            &format!("{}/internal/blocked-ids/{}", state.config.safety_service_url, user.id),
        )
        .await,
    );
    excluded.push(user.id);

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let items: Vec<Profile> = profiles::table
        .filter(profiles::is_active.eq(true))
        .filter(profiles::is_banned.eq(false))
        .filter(profiles::user_id.ne_all(&excluded))
        .order(profiles::created_at.desc())
        .offset(params.offset() as i64)
        .limit(params.limit() as i64)
        .load::<Profile>(&mut conn)?;

    let total: i64 = profiles::table
        .filter(profiles::is_active.eq(true))
        .filter(profiles::is_banned.eq(false))
        .filter(profiles::user_id.ne_all(&excluded))
        .count()
        .get_result(&mut conn)?;

    let cards: Vec<ProfileCard> = items.into_iter().map(ProfileCard::from).collect();
    let paginated = Paginated::new(cards, total as u64, &params);

    Ok(Json(ApiResponse::ok(paginated)))
}

async fn fetch_ids(state: &AppState, url: &str) -> Vec<Uuid> {
    match state.http_client.get(url).send().await {
        Ok(resp) => match resp.json::<ApiResponse<Vec<Uuid>>>().await {
            Ok(body) => body.data,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "malformed exclusion list response");
                vec![]
            }
        },
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "failed to fetch exclusion list");
            vec![]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_length_bounds() {
        assert!(validate_display_name("Jo").is_err());
        assert!(validate_display_name("Jo Mulligan").is_ok());
        assert!(validate_display_name(&"x".repeat(31)).is_err());
    }

    #[test]
    fn display_name_charset() {
        assert!(validate_display_name("birdie_hunter 9").is_ok());
        assert!(validate_display_name("drop-shot!").is_err());
    }

    #[test]
    fn handicap_bounds() {
        assert!(validate_handicap(-10.0).is_ok());
        assert!(validate_handicap(0.0).is_ok());
        assert!(validate_handicap(54.0).is_ok());
        assert!(validate_handicap(-10.1).is_err());
        assert!(validate_handicap(54.1).is_err());
    }
}
