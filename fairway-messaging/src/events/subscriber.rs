use std::sync::Arc;

use diesel::dsl::count_star;
use diesel::prelude::*;
use futures_lite::StreamExt;
use lapin::options::BasicAckOptions;
use uuid::Uuid;

use fairway_shared::types::event::{payloads, routing_keys, Event};

use crate::models::{NewConversation, NewConversationMember};
use crate::schema::{conversation_members, conversations, messages};
use crate::AppState;

/// Listen for match lifecycle events. A new match opens a conversation;
/// a deleted match (unmatch or block) removes it along with its history.
pub async fn listen_match_events(state: Arc<AppState>) -> anyhow::Result<()> {
    let mut consumer = state.rabbitmq.subscribe(
        "fairway-messaging.match",
        &[
            routing_keys::MATCHING_MATCH_CREATED,
            routing_keys::MATCHING_MATCH_DELETED,
        ],
    ).await?;

    tracing::info!("listening for match events");

    while let Some(delivery) = consumer.next().await {
        match delivery {
            Ok(delivery) => {
                let routing_key = delivery.routing_key.to_string();

                if routing_key == routing_keys::MATCHING_MATCH_CREATED {
                    match serde_json::from_slice::<Event<payloads::MatchCreated>>(&delivery.data) {
                        Ok(event) => {
                            let data = &event.data;
                            if let Err(e) = open_conversation(
                                &state,
                                data.match_id,
                                data.user_a_id,
                                data.user_b_id,
                            ) {
                                tracing::error!(error = %e, "failed to open conversation for match");
                            }
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "failed to deserialize match.created event");
                        }
                    }
                } else if routing_key == routing_keys::MATCHING_MATCH_DELETED {
                    match serde_json::from_slice::<Event<payloads::MatchDeleted>>(&delivery.data) {
                        Ok(event) => {
                            let data = &event.data;
                            if let Err(e) = close_conversation(&state, data.match_id) {
                                tracing::error!(error = %e, "failed to close conversation for match");
                            }
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "failed to deserialize match.deleted event");
                        }
                    }
                }

                let _ = delivery.ack(BasicAckOptions::default()).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "match consumer error");
            }
        }
    }

    Ok(())
}

fn open_conversation(
    state: &AppState,
    match_id: Uuid,
    user_a_id: Uuid,
    user_b_id: Uuid,
) -> anyhow::Result<()> {
    let mut conn = state.db.get()?;

    // Redelivered events must not open a second conversation.
    let existing: i64 = conversations::table
        .filter(conversations::match_id.eq(match_id))
        .select(count_star())
        .first::<i64>(&mut conn)?;

    if existing > 0 {
        tracing::debug!(match_id = %match_id, "conversation already exists, skipping");
        return Ok(());
    }

    let conversation_id: Uuid = diesel::insert_into(conversations::table)
        .values(&NewConversation { match_id })
        .returning(conversations::id)
        .get_result(&mut conn)?;

    let members = vec![
        NewConversationMember { conversation_id, user_id: user_a_id },
        NewConversationMember { conversation_id, user_id: user_b_id },
    ];

    diesel::insert_into(conversation_members::table)
        .values(&members)
        .execute(&mut conn)?;

    tracing::info!(
        match_id = %match_id,
        conversation_id = %conversation_id,
        "conversation opened for match"
    );

    Ok(())
}

fn close_conversation(state: &AppState, match_id: Uuid) -> anyhow::Result<()> {
    let mut conn = state.db.get()?;

    let conv_ids: Vec<Uuid> = conversations::table
        .filter(conversations::match_id.eq(match_id))
        .select(conversations::id)
        .load::<Uuid>(&mut conn)?;

    if conv_ids.is_empty() {
        return Ok(());
    }

    diesel::delete(messages::table.filter(messages::conversation_id.eq_any(&conv_ids)))
        .execute(&mut conn)?;
    diesel::delete(
        conversation_members::table.filter(conversation_members::conversation_id.eq_any(&conv_ids)),
    )
    .execute(&mut conn)?;
    diesel::delete(conversations::table.filter(conversations::id.eq_any(&conv_ids)))
        .execute(&mut conn)?;

    tracing::info!(match_id = %match_id, conversations = conv_ids.len(), "conversation closed");

    Ok(())
}
