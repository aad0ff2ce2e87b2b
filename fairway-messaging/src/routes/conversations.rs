use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use diesel::dsl::count_star;
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use fairway_shared::errors::{AppError, AppResult};
use fairway_shared::types::api::ApiResponse;
use fairway_shared::types::auth::AuthUser;

use crate::models::{Conversation, Message};
use crate::schema::{conversation_members, conversations, messages};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ConversationPreview {
    pub id: Uuid,
    pub match_id: Uuid,
    pub partner_id: Option<Uuid>,
    pub partner: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_message: Option<String>,
    pub last_message_time: Option<DateTime<Utc>>,
    pub unread_count: i64,
}

/// GET /conversations - list the caller's conversations with last message
/// preview and unread count, most recent activity first.
pub async fn list_conversations(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<ConversationPreview>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::Internal(e.into()))?;
    let user_id = auth_user.id;

    let memberships: Vec<(Uuid, DateTime<Utc>)> = conversation_members::table
        .filter(conversation_members::user_id.eq(user_id))
        .select((conversation_members::conversation_id, conversation_members::last_read_at))
        .load::<(Uuid, DateTime<Utc>)>(&mut conn)?;

    if memberships.is_empty() {
        return Ok(Json(ApiResponse::ok(vec![])));
    }

    let conv_ids: Vec<Uuid> = memberships.iter().map(|(id, _)| *id).collect();

    let convs: Vec<Conversation> = conversations::table
        .filter(conversations::id.eq_any(&conv_ids))
        .load::<Conversation>(&mut conn)?;

    let mut previews = Vec::with_capacity(convs.len());
    for conv in convs {
        let last_read_at = memberships
            .iter()
            .find(|(cid, _)| *cid == conv.id)
            .map(|(_, lr)| *lr)
            .unwrap_or(conv.created_at);

        let last_msg: Option<Message> = messages::table
            .filter(messages::conversation_id.eq(conv.id))
            .order(messages::created_at.desc())
            .first::<Message>(&mut conn)
            .optional()?;

        let unread: i64 = messages::table
            .filter(messages::conversation_id.eq(conv.id))
            .filter(messages::created_at.gt(last_read_at))
            .filter(messages::sender_id.ne(user_id))
            .select(count_star())
            .first::<i64>(&mut conn)?;

        let partner_id = conversation_members::table
            .filter(conversation_members::conversation_id.eq(conv.id))
            .filter(conversation_members::user_id.ne(user_id))
            .select(conversation_members::user_id)
            .first::<Uuid>(&mut conn)
            .optional()?;

        let last_message_time = last_msg.as_ref().map(|m| m.created_at);
        let last_message = last_msg.map(|m| {
            if m.is_deleted {
                "Message deleted".to_string()
            } else {
                m.content
            }
        });

        previews.push(ConversationPreview {
            id: conv.id,
            match_id: conv.match_id,
            partner_id,
            partner: None,
            created_at: conv.created_at,
            updated_at: conv.updated_at,
            last_message,
            last_message_time,
            unread_count: unread,
        });
    }

    // Enrich previews with partner cards from fairway-profile
    let partner_ids: Vec<Uuid> = previews.iter().filter_map(|p| p.partner_id).collect();
    if !partner_ids.is_empty() {
        let cards = fetch_cards(&state, &partner_ids).await;
        for preview in &mut previews {
            if let Some(pid) = preview.partner_id {
                preview.partner = cards.get(&pid).cloned();
            }
        }
    }

    // Most recent activity first, falling back to conversation creation
    previews.sort_by(|a, b| {
        let a_time = a.last_message_time.unwrap_or(a.created_at);
        let b_time = b.last_message_time.unwrap_or(b.created_at);
        b_time.cmp(&a_time)
    });

    Ok(Json(ApiResponse::ok(previews)))
}

/// Fetch profile cards from fairway-profile for a set of user ids.
async fn fetch_cards(
    state: &AppState,
    user_ids: &[Uuid],
) -> std::collections::HashMap<Uuid, serde_json::Value> {
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
