use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use fairway_shared::errors::{AppError, AppResult, ErrorCode};
use fairway_shared::middleware::AdminUser;
use fairway_shared::types::api::ApiResponse;
use fairway_shared::types::pagination::{Paginated, PaginationParams};

use crate::models::{AdminAction, NewAdminAction, Report, ReportStatus};
use crate::schema::{admin_actions, blocks, reports};
use crate::AppState;

// --- Request / Response types ---

#[derive(Debug, Deserialize)]
pub struct ReportFilterParams {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
    pub status: Option<String>,
}

fn default_limit() -> u64 { 20 }

impl ReportFilterParams {
    fn pagination(&self) -> PaginationParams {
        PaginationParams {
            limit: self.limit,
            offset: self.offset,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateReportRequest {
    pub status: Option<String>,
    pub admin_notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub pending_reports: i64,
    pub reports_today: i64,
    pub blocks_today: i64,
}

// --- List reports (paginated, optional status filter) ---

pub async fn list_reports(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(params): Query<ReportFilterParams>,
) -> AppResult<Json<ApiResponse<Paginated<Report>>>> {
    // An unknown status filter is a caller bug, not an empty result set.
    if let Some(ref status) = params.status {
        status.parse::<ReportStatus>().map_err(|_| {
            AppError::new(ErrorCode::InvalidReportStatus, format!("invalid status filter '{status}'"))
        })?;
    }

    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let pagination = params.pagination();
    let offset = pagination.offset() as i64;
    let limit = pagination.limit() as i64;

    let (items, total): (Vec<Report>, i64) = if let Some(ref status) = params.status {
        let items = reports::table
            .filter(reports::status.eq(status))
            .order(reports::created_at.desc())
            .offset(offset)
            .limit(limit)
            .load::<Report>(&mut conn)?;

        let total: i64 = reports::table
            .filter(reports::status.eq(status))
            .count()
            .get_result(&mut conn)?;

        (items, total)
    } else {
        let items = reports::table
            .order(reports::created_at.desc())
            .offset(offset)
            .limit(limit)
            .load::<Report>(&mut conn)?;

        let total: i64 = reports::table
            .count()
            .get_result(&mut conn)?;

        (items, total)
    };

    let paginated = Paginated::new(items, total as u64, &pagination);
    Ok(Json(ApiResponse::ok(paginated)))
}

// --- Get report details ---

pub async fn get_report(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(report_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Report>>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let report = reports::table
        .find(report_id)
        .first::<Report>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::ReportNotFound, "report not found"))?;

    Ok(Json(ApiResponse::ok(report)))
}

// --- Update report status / notes ---

pub async fn update_report(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(report_id): Path<Uuid>,
    Json(body): Json<UpdateReportRequest>,
) -> AppResult<Json<ApiResponse<Report>>> {
    let new_status: ReportStatus = body
        .status
        .as_deref()
        .ok_or_else(|| AppError::new(ErrorCode::ValidationError, "status is required"))?
        .parse()
        .map_err(|_| {
            AppError::new(
                ErrorCode::InvalidReportStatus,
                "status must be one of: investigating, resolved, dismissed",
            )
        })?;

    if new_status == ReportStatus::Pending {
        return Err(AppError::new(
            ErrorCode::InvalidReportStatus,
            "a report cannot be moved back to pending",
        ));
    }

    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let report = reports::table
        .find(report_id)
        .first::<Report>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::ReportNotFound, "report not found"))?;

    let current: ReportStatus = report
        .status
        .parse()
        .map_err(|_| AppError::internal(format!("report {report_id} has corrupt status")))?;

    if current.is_terminal() {
        return Err(AppError::new(
            ErrorCode::ReportAlreadyClosed,
            "this report has already been resolved or dismissed",
        ));
    }

    // Absent notes keep whatever was recorded before.
    let admin_notes = body.admin_notes.clone().or_else(|| report.admin_notes.clone());

    let updated_report: Report = diesel::update(reports::table.find(report_id))
        .set((
            reports::status.eq(new_status.to_string()),
            reports::admin_notes.eq(admin_notes.clone()),
            reports::reviewed_by.eq(admin.0.id),
            reports::reviewed_at.eq(Utc::now()),
        ))
        .get_result(&mut conn)
        .map_err(|e| AppError::internal(format!("failed to update report: {e}")))?;

    // Audit log insert is best-effort; the review must not fail on it.
    let action_detail = serde_json::json!({
        "report_id": report_id,
        "status": new_status.to_string(),
        "admin_notes": body.admin_notes,
    });

    let admin_action = NewAdminAction {
        admin_id: admin.0.id,
        action: format!("review_report_{new_status}"),
        target_user_id: Some(report.reported_id),
        details: Some(action_detail),
    };

    if let Err(e) = diesel::insert_into(admin_actions::table)
        .values(&admin_action)
        .execute(&mut conn)
    {
        tracing::warn!(report_id = %report_id, error = %e, "failed to log admin action");
    }

    Ok(Json(ApiResponse::ok(updated_report)))
}

// --- Dashboard stats ---

pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> AppResult<Json<ApiResponse<DashboardStats>>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let pending_reports: i64 = reports::table
        .filter(reports::status.eq("pending"))
        .count()
        .get_result(&mut conn)?;

    let today_start = Utc::now()
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc();

    let reports_today: i64 = reports::table
        .filter(reports::created_at.ge(today_start))
        .count()
        .get_result(&mut conn)?;

    let blocks_today: i64 = blocks::table
        .filter(blocks::created_at.ge(today_start))
        .count()
        .get_result(&mut conn)?;

    Ok(Json(ApiResponse::ok(DashboardStats {
        pending_reports,
        reports_today,
        blocks_today,
    })))
}

// --- Audit log (paginated admin actions) ---

pub async fn get_audit_log(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<AdminAction>>>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let items = admin_actions::table
        .order(admin_actions::created_at.desc())
        .offset(params.offset() as i64)
        .limit(params.limit() as i64)
        .load::<AdminAction>(&mut conn)?;

    let total: i64 = admin_actions::table
        .count()
        .get_result(&mut conn)?;

    let paginated = Paginated::new(items, total as u64, &params);
    Ok(Json(ApiResponse::ok(paginated)))
}
