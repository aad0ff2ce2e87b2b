use std::sync::Arc;

use diesel::prelude::*;
use futures_lite::StreamExt;
use lapin::options::BasicAckOptions;

use fairway_shared::types::event::{payloads, routing_keys, Event};

use crate::events::publisher;
use crate::models::{ordered_pair, Match};
use crate::schema::matches;
use crate::AppState;

/// Listen for block events. A block tears down any match between the
/// pair; each deletion is announced so messaging can drop the
/// conversation.
pub async fn listen_block_events(state: Arc<AppState>) -> anyhow::Result<()> {
    let mut consumer = state.rabbitmq.subscribe(
        "fairway-matching.block",
        &[routing_keys::SAFETY_BLOCK_CREATED],
    ).await?;

    tracing::info!("listening for block events");

    while let Some(delivery) = consumer.next().await {
        match delivery {
            Ok(delivery) => {
                match serde_json::from_slice::<Event<payloads::BlockCreated>>(&delivery.data) {
                    Ok(event) => {
                        let data = &event.data;
                        tracing::info!(
                            blocker_id = %data.blocker_id,
                            blocked_id = %data.blocked_id,
                            "received block.created event"
                        );

                        if let Err(e) = delete_matches_for_pair(&state, data.blocker_id, data.blocked_id).await {
                            tracing::error!(error = %e, "failed to delete matches after block");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to deserialize block.created event");
                    }
                }

                let _ = delivery.ack(BasicAckOptions::default()).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "block consumer error");
            }
        }
    }

    Ok(())
}

async fn delete_matches_for_pair(
    state: &AppState,
    blocker_id: uuid::Uuid,
    blocked_id: uuid::Uuid,
) -> anyhow::Result<()> {
    let (user_a_id, user_b_id) = ordered_pair(blocker_id, blocked_id);

    let mut conn = state.db.get()?;

    let doomed: Vec<Match> = matches::table
        .filter(matches::user_a_id.eq(user_a_id))
        .filter(matches::user_b_id.eq(user_b_id))
        .load::<Match>(&mut conn)?;

    if doomed.is_empty() {
        return Ok(());
    }

    diesel::delete(
        matches::table
            .filter(matches::user_a_id.eq(user_a_id))
            .filter(matches::user_b_id.eq(user_b_id)),
    )
    .execute(&mut conn)?;

    for m in doomed {
        tracing::info!(match_id = %m.id, "match deleted after block");
        publisher::publish_match_deleted(&state.rabbitmq, m.id, m.user_a_id, m.user_b_id, "blocked")
            .await;
    }

    Ok(())
}
