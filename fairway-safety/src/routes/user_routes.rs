use axum::extract::{Path, Query, State};
use axum::Json;
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use fairway_shared::errors::{AppError, AppResult, ErrorCode};
use fairway_shared::types::api::ApiResponse;
use fairway_shared::types::auth::AuthUser;
use fairway_shared::types::pagination::{Paginated, PaginationParams};

use crate::events::publisher;
use crate::models::{Block, NewBlock, NewReport, Report, ReportReason};
use crate::schema::{blocks, reports};
use crate::AppState;

const MAX_DESCRIPTION_LEN: usize = 1000;

// --- Reports ---

#[derive(Debug, Deserialize)]
pub struct CreateReportRequest {
    pub reported_user_id: Option<Uuid>,
    pub reason: Option<String>,
    pub description: Option<String>,
}

pub async fn create_report(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<CreateReportRequest>,
) -> AppResult<Json<ApiResponse<Report>>> {
    let reported_id = body
        .reported_user_id
        .ok_or_else(|| AppError::new(ErrorCode::ValidationError, "reported_user_id is required"))?;

    let reason: ReportReason = body
        .reason
        .as_deref()
        .ok_or_else(|| AppError::new(ErrorCode::ValidationError, "reason is required"))?
        .parse()
        .map_err(|_| {
            AppError::with_details(
                ErrorCode::InvalidReportReason,
                "invalid report reason",
                serde_json::json!({ "allowed": ReportReason::ALL }),
            )
        })?;

    if let Some(ref description) = body.description {
        if description.len() > MAX_DESCRIPTION_LEN {
            return Err(AppError::new(
                ErrorCode::ValidationError,
                format!("description must be at most {MAX_DESCRIPTION_LEN} characters"),
            ));
        }
    }

    // Cannot report self
    if auth.id == reported_id {
        return Err(AppError::new(ErrorCode::CannotReportSelf, "you cannot report yourself"));
    }

    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    // Check for duplicate pending report from same reporter against same user
    let existing: i64 = reports::table
        .filter(reports::reporter_id.eq(auth.id))
        .filter(reports::reported_id.eq(reported_id))
        .filter(reports::status.eq("pending"))
        .count()
        .get_result(&mut conn)?;

    if existing > 0 {
        return Err(AppError::new(
            ErrorCode::DuplicateReport,
            "you already have a pending report against this user",
        ));
    }

    let new_report = NewReport {
        reporter_id: auth.id,
        reported_id,
        reason: reason.to_string(),
        description: body.description,
    };

    let report: Report = diesel::insert_into(reports::table)
        .values(&new_report)
        .get_result(&mut conn)
        .map_err(|e| AppError::internal(format!("failed to create report: {e}")))?;

    publisher::publish_report_created(
        &state.rabbitmq,
        report.id,
        report.reporter_id,
        report.reported_id,
        &report.reason,
    )
    .await;

    // Severe reasons also block the reported user. This is a secondary
    // write: its failure must never change the report response.
    if reason.is_severe() {
        match auto_block(&mut conn, auth.id, reported_id, &reason.to_string()) {
            Ok(Some(block)) => {
                publisher::publish_block_created(
                    &state.rabbitmq,
                    block.id,
                    block.blocker_id,
                    block.blocked_id,
                )
                .await;
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(
                    reporter_id = %auth.id,
                    reported_id = %reported_id,
                    error = %e,
                    "auto-block after severe report failed"
                );
            }
        }
    }

    Ok(Json(ApiResponse::ok(report)))
}

/// Insert a block for a severe report unless one already exists.
fn auto_block(
    conn: &mut PgConnection,
    blocker_id: Uuid,
    blocked_id: Uuid,
    reason: &str,
) -> AppResult<Option<Block>> {
    let existing: i64 = blocks::table
        .filter(blocks::blocker_id.eq(blocker_id))
        .filter(blocks::blocked_id.eq(blocked_id))
        .count()
        .get_result(conn)?;

    if existing > 0 {
        return Ok(None);
    }

    let block: Block = diesel::insert_into(blocks::table)
        .values(&NewBlock {
            blocker_id,
            blocked_id,
            reason: Some(format!("auto: {reason}")),
        })
        .get_result(conn)?;

    tracing::info!(
        block_id = %block.id,
        blocker_id = %blocker_id,
        blocked_id = %blocked_id,
        "auto-blocked after severe report"
    );

    Ok(Some(block))
}

// --- Blocks ---

#[derive(Debug, Deserialize)]
pub struct CreateBlockRequest {
    pub blocked_user_id: Option<Uuid>,
    pub reason: Option<String>,
}

pub async fn create_block(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<CreateBlockRequest>,
) -> AppResult<Json<ApiResponse<Block>>> {
    let blocked_id = body
        .blocked_user_id
        .ok_or_else(|| AppError::new(ErrorCode::ValidationError, "blocked_user_id is required"))?;

    if auth.id == blocked_id {
        return Err(AppError::new(ErrorCode::CannotBlockSelf, "you cannot block yourself"));
    }

    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    // Pre-check for a friendly 409; the unique index on
    // (blocker_id, blocked_id) closes the race.
    let existing: i64 = blocks::table
        .filter(blocks::blocker_id.eq(auth.id))
        .filter(blocks::blocked_id.eq(blocked_id))
        .count()
        .get_result(&mut conn)?;

    if existing > 0 {
        return Err(AppError::new(
            ErrorCode::DuplicateBlock,
            "you have already blocked this user",
        ));
    }

    let block: Block = diesel::insert_into(blocks::table)
        .values(&NewBlock {
            blocker_id: auth.id,
            blocked_id,
            reason: body.reason,
        })
        .get_result(&mut conn)
        .map_err(|e| match e {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                AppError::new(ErrorCode::DuplicateBlock, "you have already blocked this user")
            }
            other => AppError::Database(other),
        })?;

    publisher::publish_block_created(&state.rabbitmq, block.id, block.blocker_id, block.blocked_id)
        .await;

    Ok(Json(ApiResponse::ok(block)))
}

pub async fn remove_block(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(blocked_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let deleted = diesel::delete(
        blocks::table
            .filter(blocks::blocker_id.eq(auth.id))
            .filter(blocks::blocked_id.eq(blocked_id)),
    )
    .execute(&mut conn)?;

    if deleted == 0 {
        return Err(AppError::new(ErrorCode::BlockNotFound, "you have not blocked this user"));
    }

    publisher::publish_block_removed(&state.rabbitmq, auth.id, blocked_id).await;

    Ok(Json(ApiResponse::ok(serde_json::json!({
        "blocked_user_id": blocked_id,
        "unblocked": true,
    }))))
}

pub async fn list_blocked(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<Block>>>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let items = blocks::table
        .filter(blocks::blocker_id.eq(auth.id))
        .order(blocks::created_at.desc())
        .offset(params.offset() as i64)
        .limit(params.limit() as i64)
        .load::<Block>(&mut conn)?;

    let total: i64 = blocks::table
        .filter(blocks::blocker_id.eq(auth.id))
        .count()
        .get_result(&mut conn)?;

    let paginated = Paginated::new(items, total as u64, &params);
    Ok(Json(ApiResponse::ok(paginated)))
}

// --- Block membership check (used by discovery and chat) ---

#[derive(Debug, Deserialize)]
pub struct CheckBlockedRequest {
    pub user_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Serialize)]
pub struct CheckBlockedResponse {
    pub blocked_user_ids: Vec<Uuid>,
}

/// Returns the subset of `user_ids` involved in a block with the caller,
/// in either direction.
pub async fn check_blocked(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<CheckBlockedRequest>,
) -> AppResult<Json<ApiResponse<CheckBlockedResponse>>> {
    let user_ids = body
        .user_ids
        .ok_or_else(|| AppError::new(ErrorCode::ValidationError, "user_ids is required"))?;

    if user_ids.is_empty() {
        return Ok(Json(ApiResponse::ok(CheckBlockedResponse {
            blocked_user_ids: vec![],
        })));
    }

    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let outgoing: Vec<Uuid> = blocks::table
        .filter(blocks::blocker_id.eq(auth.id))
        .filter(blocks::blocked_id.eq_any(&user_ids))
        .select(blocks::blocked_id)
        .load::<Uuid>(&mut conn)?;

    let incoming: Vec<Uuid> = blocks::table
        .filter(blocks::blocked_id.eq(auth.id))
        .filter(blocks::blocker_id.eq_any(&user_ids))
        .select(blocks::blocker_id)
        .load::<Uuid>(&mut conn)?;

    let mut blocked_user_ids = outgoing;
    for id in incoming {
        if !blocked_user_ids.contains(&id) {
            blocked_user_ids.push(id);
        }
    }

    Ok(Json(ApiResponse::ok(CheckBlockedResponse { blocked_user_ids })))
}
