use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::types::ApiErrorResponse;

/// Application error codes following the pattern E{service}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/infrastructure errors
/// - E1xxx: Profile errors
/// - E2xxx: Matching errors
/// - E3xxx: Messaging errors
/// - E4xxx: Safety errors
/// - E5xxx: Notification errors
/// - E6xxx: Subscription errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    ValidationError,
    NotFound,
    Unauthorized,
    Forbidden,
    RateLimited,
    ServiceUnavailable,
    BadRequest,
    TokenExpired,
    TokenInvalid,

    // Profile (E1xxx)
    ProfileNotFound,
    InvalidDisplayName,
    InvalidHandicap,
    UserBanned,
    UserDeactivated,
    EmptyUpdate,

    // Matching (E2xxx)
    CannotSwipeSelf,
    InvalidSwipeDirection,
    MatchNotFound,
    NotMatchMember,
    LikeQuotaExceeded,

    // Messaging (E3xxx)
    ConversationNotFound,
    NotConversationMember,
    MessageNotFound,
    EmptyMessage,

    // Safety (E4xxx)
    ReportNotFound,
    CannotReportSelf,
    DuplicateReport,
    InvalidReportReason,
    InvalidReportStatus,
    ReportAlreadyClosed,
    BlockNotFound,
    CannotBlockSelf,
    DuplicateBlock,

    // Notification (E5xxx)
    NotificationNotFound,

    // Subscription (E6xxx)
    SubscriptionNotFound,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            // Shared
            Self::InternalError => "E0001",
            Self::ValidationError => "E0002",
            Self::NotFound => "E0003",
            Self::Unauthorized => "E0004",
            Self::Forbidden => "E0005",
            Self::RateLimited => "E0006",
            Self::ServiceUnavailable => "E0007",
            Self::BadRequest => "E0008",
            Self::TokenExpired => "E0009",
            Self::TokenInvalid => "E0010",

            // Profile
            Self::ProfileNotFound => "E1001",
            Self::InvalidDisplayName => "E1002",
            Self::InvalidHandicap => "E1003",
            Self::UserBanned => "E1004",
            Self::UserDeactivated => "E1005",
            Self::EmptyUpdate => "E1006",

            // Matching
            Self::CannotSwipeSelf => "E2001",
            Self::InvalidSwipeDirection => "E2002",
            Self::MatchNotFound => "E2003",
            Self::NotMatchMember => "E2004",
            Self::LikeQuotaExceeded => "E2005",

            // Messaging
            Self::ConversationNotFound => "E3001",
            Self::NotConversationMember => "E3002",
            Self::MessageNotFound => "E3003",
            Self::EmptyMessage => "E3004",

            // Safety
            Self::ReportNotFound => "E4001",
            Self::CannotReportSelf => "E4002",
            Self::DuplicateReport => "E4003",
            Self::InvalidReportReason => "E4004",
            Self::InvalidReportStatus => "E4005",
            Self::ReportAlreadyClosed => "E4006",
            Self::BlockNotFound => "E4007",
            Self::CannotBlockSelf => "E4008",
            Self::DuplicateBlock => "E4009",

            // Notification
            Self::NotificationNotFound => "E5001",

            // Subscription
            Self::SubscriptionNotFound => "E6001",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalError | Self::ServiceUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            // Self-directed actions are malformed input, not a permission problem.
            Self::ValidationError | Self::BadRequest | Self::InvalidDisplayName
            | Self::InvalidHandicap | Self::EmptyUpdate | Self::CannotSwipeSelf
            | Self::InvalidSwipeDirection | Self::EmptyMessage | Self::CannotReportSelf
            | Self::InvalidReportReason | Self::InvalidReportStatus
            | Self::CannotBlockSelf => StatusCode::BAD_REQUEST,
            Self::NotFound | Self::ProfileNotFound | Self::MatchNotFound
            | Self::ConversationNotFound | Self::MessageNotFound | Self::ReportNotFound
            | Self::BlockNotFound | Self::NotificationNotFound
            | Self::SubscriptionNotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized | Self::TokenExpired | Self::TokenInvalid => {
                StatusCode::UNAUTHORIZED
            }
            Self::Forbidden | Self::UserBanned | Self::UserDeactivated | Self::NotMatchMember
            | Self::NotConversationMember => StatusCode::FORBIDDEN,
            Self::RateLimited | Self::LikeQuotaExceeded => StatusCode::TOO_MANY_REQUESTS,
            Self::DuplicateReport | Self::DuplicateBlock | Self::ReportAlreadyClosed => {
                StatusCode::CONFLICT
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Known {
        code: ErrorCode,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(code: ErrorCode, message: impl Into<String>, details: serde_json::Value) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            AppError::Known { code, message, details } => {
                let status = code.status_code();
                let mut resp = ApiErrorResponse::new(code.code(), message);
                if let Some(d) = details {
                    resp = resp.with_details(d.clone());
                }
                (status, resp)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorResponse::new("E0001", "internal server error"),
                )
            }
            AppError::Database(err) => {
                tracing::error!(error = %err, "database error");
                match err {
                    diesel::result::Error::NotFound => (
                        StatusCode::NOT_FOUND,
                        ApiErrorResponse::new("E0003", "resource not found"),
                    ),
                    _ => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiErrorResponse::new("E0001", "database error"),
                    ),
                }
            }
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ApiErrorResponse::new("E0002", msg),
            ),
        };

        (status, Json(error_response)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: AppError) -> serde_json::Value {
        let response = err.into_response();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn self_directed_actions_are_bad_requests() {
        assert_eq!(ErrorCode::CannotReportSelf.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::CannotBlockSelf.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::CannotSwipeSelf.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn duplicates_conflict() {
        assert_eq!(ErrorCode::DuplicateReport.status_code(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::DuplicateBlock.status_code(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn known_error_envelope_shape() {
        let json = body_json(AppError::new(
            ErrorCode::DuplicateReport,
            "you already have a pending report against this user",
        ))
        .await;

        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "E4003");
        assert_eq!(
            json["error"]["message"],
            "you already have a pending report against this user"
        );
    }

    #[tokio::test]
    async fn internal_errors_hide_the_cause() {
        let json = body_json(AppError::Internal(anyhow::anyhow!("pool exhausted"))).await;

        assert_eq!(json["error"]["code"], "E0001");
        assert_eq!(json["error"]["message"], "internal server error");
    }

    #[tokio::test]
    async fn database_not_found_maps_to_404() {
        let response = AppError::Database(diesel::result::Error::NotFound).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
