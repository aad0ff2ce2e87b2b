use axum::extract::{Path, Query, State};
use axum::Json;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use fairway_shared::errors::{AppError, AppResult, ErrorCode};
use fairway_shared::middleware::AdminUser;
use fairway_shared::types::api::ApiResponse;
use fairway_shared::types::pagination::{Paginated, PaginationParams};

use crate::events::publisher;
use crate::models::Profile;
use crate::schema::profiles;
use crate::AppState;

// --- List users (paginated, optional filters) ---

#[derive(Debug, Deserialize)]
pub struct UserFilterParams {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
    pub search: Option<String>,
    pub is_banned: Option<bool>,
    pub is_verified: Option<bool>,
}

fn default_limit() -> u64 { 20 }

impl UserFilterParams {
    fn pagination(&self) -> PaginationParams {
        PaginationParams {
            limit: self.limit,
            offset: self.offset,
        }
    }
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(params): Query<UserFilterParams>,
) -> AppResult<Json<ApiResponse<Paginated<Profile>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let pagination = params.pagination();

    let mut query = profiles::table.into_boxed();
    let mut count_query = profiles::table.into_boxed();

    if let Some(ref search) = params.search {
        let pattern = format!("%{search}%");
        query = query.filter(
            profiles::display_name
                .ilike(pattern.clone())
                .or(profiles::email.ilike(pattern.clone())),
        );
        count_query = count_query.filter(
            profiles::display_name
                .ilike(pattern.clone())
                .or(profiles::email.ilike(pattern)),
        );
    }
    if let Some(is_banned) = params.is_banned {
        query = query.filter(profiles::is_banned.eq(is_banned));
        count_query = count_query.filter(profiles::is_banned.eq(is_banned));
    }
    if let Some(is_verified) = params.is_verified {
        query = query.filter(profiles::is_verified.eq(is_verified));
        count_query = count_query.filter(profiles::is_verified.eq(is_verified));
    }

    let items = query
        .order(profiles::created_at.desc())
        .offset(pagination.offset() as i64)
        .limit(pagination.limit() as i64)
        .load::<Profile>(&mut conn)?;

    let total: i64 = count_query.count().get_result(&mut conn)?;

    let paginated = Paginated::new(items, total as u64, &pagination);
    Ok(Json(ApiResponse::ok(paginated)))
}

// --- Update user flags (ban / verify / deactivate) ---

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub is_banned: Option<bool>,
    pub is_verified: Option<bool>,
    pub is_active: Option<bool>,
    pub ban_reason: Option<String>,
}

pub async fn update_user(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(user_id): Path<Uuid>,
    Json(body): Json<UpdateUserRequest>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    if body.is_banned.is_none() && body.is_verified.is_none() && body.is_active.is_none() {
        return Err(AppError::new(
            ErrorCode::EmptyUpdate,
            "at least one of is_banned, is_verified, is_active is required",
        ));
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let profile = profiles::table
        .filter(profiles::user_id.eq(user_id).or(profiles::id.eq(user_id)))
        .first::<Profile>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;

    let is_banned = body.is_banned.unwrap_or(profile.is_banned);
    let is_verified = body.is_verified.unwrap_or(profile.is_verified);
    let is_active = body.is_active.unwrap_or(profile.is_active);
    let ban_reason = if is_banned {
        body.ban_reason.clone().or_else(|| profile.ban_reason.clone())
    } else {
        None
    };

    let updated: Profile = diesel::update(profiles::table.filter(profiles::id.eq(profile.id)))
        .set((
            profiles::is_banned.eq(is_banned),
            profiles::is_verified.eq(is_verified),
            profiles::is_active.eq(is_active),
            profiles::ban_reason.eq(ban_reason.clone()),
            profiles::updated_at.eq(chrono::Utc::now()),
        ))
        .get_result(&mut conn)?;

    // Announce ban state changes so other services can react.
    if body.is_banned.is_some() && body.is_banned != Some(profile.is_banned) {
        publisher::publish_user_banned(&state.rabbitmq, updated.user_id, is_banned, ban_reason)
            .await;
    }

    tracing::info!(
        admin_id = %admin.0.id,
        user_id = %updated.user_id,
        is_banned = updated.is_banned,
        is_verified = updated.is_verified,
        is_active = updated.is_active,
        "admin updated user flags"
    );

    Ok(Json(ApiResponse::ok(updated)))
}
