use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use diesel::dsl::count_star;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use fairway_shared::errors::{AppError, AppResult, ErrorCode};
use fairway_shared::types::api::ApiResponse;
use fairway_shared::types::auth::AuthUser;
use fairway_shared::types::pagination::{Paginated, PaginationParams};

use crate::events::publisher;
use crate::models::{Message, NewMessage};
use crate::schema::{conversation_members, conversations, messages};
use crate::AppState;

const MAX_MESSAGE_LEN: usize = 2000;
const PREVIEW_LEN: usize = 100;

// --- Request DTOs ---

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub content: Option<String>,
}

// --- Response DTOs ---

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub total_unread: i64,
}

// --- Helpers ---

/// Verify the user is a member of the given conversation. Returns an error if not.
fn verify_membership(
    conn: &mut PgConnection,
    conversation_id: Uuid,
    user_id: Uuid,
) -> AppResult<()> {
    let exists: i64 = conversation_members::table
        .filter(conversation_members::conversation_id.eq(conversation_id))
        .filter(conversation_members::user_id.eq(user_id))
        .select(count_star())
        .first::<i64>(conn)?;

    if exists == 0 {
        // Missing conversations and foreign conversations look the same
        // from outside.
        let conversation_exists: i64 = conversations::table
            .filter(conversations::id.eq(conversation_id))
            .select(count_star())
            .first::<i64>(conn)?;

        if conversation_exists == 0 {
            return Err(AppError::new(
                ErrorCode::ConversationNotFound,
                "conversation not found",
            ));
        }
        return Err(AppError::new(
            ErrorCode::NotConversationMember,
            "you are not a member of this conversation",
        ));
    }

    Ok(())
}

// --- Handlers ---

/// GET /conversations/:id/messages - paginated messages, newest first
pub async fn list_messages(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<Uuid>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<Message>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::Internal(e.into()))?;

    verify_membership(&mut conn, conversation_id, auth_user.id)?;

    let total: i64 = messages::table
        .filter(messages::conversation_id.eq(conversation_id))
        .select(count_star())
        .first::<i64>(&mut conn)?;

    let items: Vec<Message> = messages::table
        .filter(messages::conversation_id.eq(conversation_id))
        .order(messages::created_at.desc())
        .offset(params.offset() as i64)
        .limit(params.limit() as i64)
        .load::<Message>(&mut conn)?;

    let paginated = Paginated::new(items, total as u64, &params);

    Ok(Json(ApiResponse::ok(paginated)))
}

/// POST /conversations/:id/messages - send a message
pub async fn send_message(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<Uuid>,
    Json(req): Json<SendMessageRequest>,
) -> AppResult<Json<ApiResponse<Message>>> {
    let content = req
        .content
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();

    if content.is_empty() {
        return Err(AppError::new(ErrorCode::EmptyMessage, "message content is required"));
    }
    if content.len() > MAX_MESSAGE_LEN {
        return Err(AppError::new(
            ErrorCode::ValidationError,
            format!("message must be at most {MAX_MESSAGE_LEN} characters"),
        ));
    }

    let mut conn = state.db.get().map_err(|e| AppError::Internal(e.into()))?;

    verify_membership(&mut conn, conversation_id, auth_user.id)?;

    let new_message = NewMessage {
        conversation_id,
        sender_id: auth_user.id,
        content,
    };

    let message: Message = diesel::insert_into(messages::table)
        .values(&new_message)
        .get_result(&mut conn)?;

    diesel::update(conversations::table.find(conversation_id))
        .set(conversations::updated_at.eq(Utc::now()))
        .execute(&mut conn)?;

    // The recipient is the other member; the event carries it so the
    // notification service needs no lookup of its own.
    let recipient_id: Option<Uuid> = conversation_members::table
        .filter(conversation_members::conversation_id.eq(conversation_id))
        .filter(conversation_members::user_id.ne(auth_user.id))
        .select(conversation_members::user_id)
        .first::<Uuid>(&mut conn)
        .optional()?;

    if let Some(recipient_id) = recipient_id {
        let content_preview: String = message.content.chars().take(PREVIEW_LEN).collect();
        publisher::publish_message_sent(
            &state.rabbitmq,
            message.id,
            conversation_id,
            auth_user.id,
            recipient_id,
            &content_preview,
        )
        .await;
    }

    Ok(Json(ApiResponse::ok(message)))
}

/// DELETE /messages/:id - soft delete a message (only the sender can delete)
pub async fn delete_message(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(message_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Message>>> {
    let mut conn = state.db.get().map_err(|e| AppError::Internal(e.into()))?;

    let message: Message = messages::table
        .find(message_id)
        .first::<Message>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::MessageNotFound, "message not found"))?;

    if message.sender_id != auth_user.id {
        return Err(AppError::new(
            ErrorCode::Forbidden,
            "you can only delete your own messages",
        ));
    }

    let updated: Message = diesel::update(messages::table.find(message_id))
        .set(messages::is_deleted.eq(true))
        .get_result(&mut conn)?;

    Ok(Json(ApiResponse::ok(updated)))
}

/// POST /conversations/:id/read - mark conversation as read
pub async fn mark_as_read(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let mut conn = state.db.get().map_err(|e| AppError::Internal(e.into()))?;

    let updated_rows = diesel::update(
        conversation_members::table
            .filter(conversation_members::conversation_id.eq(conversation_id))
            .filter(conversation_members::user_id.eq(auth_user.id)),
    )
    .set(conversation_members::last_read_at.eq(Utc::now()))
    .execute(&mut conn)?;

    if updated_rows == 0 {
        return Err(AppError::new(
            ErrorCode::NotConversationMember,
            "you are not a member of this conversation",
        ));
    }

    Ok(Json(ApiResponse::ok(serde_json::json!({
        "conversation_id": conversation_id,
        "read_at": Utc::now()
    }))))
}

/// GET /unread-count - total unread messages across all conversations.
/// Clients poll this for the badge in the tab bar.
pub async fn get_unread_count(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<UnreadCountResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::Internal(e.into()))?;
    let user_id = auth_user.id;

    let memberships: Vec<(Uuid, chrono::DateTime<Utc>)> = conversation_members::table
        .filter(conversation_members::user_id.eq(user_id))
        .select((conversation_members::conversation_id, conversation_members::last_read_at))
        .load::<(Uuid, chrono::DateTime<Utc>)>(&mut conn)?;

    let mut total_unread: i64 = 0;

    for (conv_id, last_read_at) in &memberships {
        let unread: i64 = messages::table
            .filter(messages::conversation_id.eq(conv_id))
            .filter(messages::created_at.gt(last_read_at))
            .filter(messages::sender_id.ne(user_id))
            .select(count_star())
            .first::<i64>(&mut conn)?;

        total_unread += unread;
    }

    Ok(Json(ApiResponse::ok(UnreadCountResponse { total_unread })))
}
