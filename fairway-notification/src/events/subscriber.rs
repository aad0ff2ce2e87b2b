use std::sync::Arc;

use futures_lite::StreamExt;
use lapin::options::BasicAckOptions;

use fairway_shared::types::event::{payloads, routing_keys, Event};

use crate::services::notification_service;
use crate::AppState;

/// Listen for like events (swipe.liked).
pub async fn listen_swipe_events(state: Arc<AppState>) -> anyhow::Result<()> {
    let mut consumer = state.rabbitmq.subscribe(
        "fairway-notification.swipe.liked",
        &[routing_keys::MATCHING_SWIPE_LIKED],
    ).await?;

    tracing::info!("listening for swipe events");

    while let Some(delivery) = consumer.next().await {
        match delivery {
            Ok(delivery) => {
                match serde_json::from_slice::<Event<payloads::SwipeLiked>>(&delivery.data) {
                    Ok(event) => {
                        let data = &event.data;
                        tracing::info!(
                            swiper_id = %data.swiper_id,
                            target_id = %data.target_id,
                            "received swipe.liked event"
                        );

                        if let Err(e) = notification_service::create_notification(
                            &state.db,
                            data.target_id,
                            "like_received",
                            "Someone wants to play a round!",
                            &format!("{} liked your profile", data.swiper_display_name),
                            Some(serde_json::json!({
                                "swiper_id": data.swiper_id,
                                "swiper_display_name": data.swiper_display_name,
                            })),
                        ) {
                            tracing::error!(error = %e, "failed to create like notification");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to deserialize swipe.liked event");
                    }
                }

                let _ = delivery.ack(BasicAckOptions::default()).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "swipe consumer error");
            }
        }
    }

    Ok(())
}

/// Listen for match events (match.created). Both members get the
/// celebration notification.
pub async fn listen_match_events(state: Arc<AppState>) -> anyhow::Result<()> {
    let mut consumer = state.rabbitmq.subscribe(
        "fairway-notification.match",
        &[routing_keys::MATCHING_MATCH_CREATED],
    ).await?;

    tracing::info!("listening for match events");

    while let Some(delivery) = consumer.next().await {
        match delivery {
            Ok(delivery) => {
                match serde_json::from_slice::<Event<payloads::MatchCreated>>(&delivery.data) {
                    Ok(event) => {
                        let data = &event.data;
                        tracing::info!(match_id = %data.match_id, "received match.created event");

                        for user_id in [data.user_a_id, data.user_b_id] {
                            if let Err(e) = notification_service::create_notification(
                                &state.db,
                                user_id,
                                "match_created",
                                "You found a golf buddy!",
                                "You matched. Tee up a conversation.",
                                Some(serde_json::json!({
                                    "match_id": data.match_id,
                                    "user_a_id": data.user_a_id,
                                    "user_b_id": data.user_b_id,
                                })),
                            ) {
                                tracing::error!(error = %e, "failed to create match notification");
                            }
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to deserialize match.created event");
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

/// Listen for message events (message.sent). The payload carries the
/// recipient, so no membership lookup is needed here.
pub async fn listen_message_events(state: Arc<AppState>) -> anyhow::Result<()> {
    let mut consumer = state.rabbitmq.subscribe(
        "fairway-notification.message.sent",
        &[routing_keys::MESSAGING_MESSAGE_SENT],
    ).await?;

    tracing::info!("listening for message events");

    while let Some(delivery) = consumer.next().await {
        match delivery {
            Ok(delivery) => {
                match serde_json::from_slice::<Event<payloads::MessageSent>>(&delivery.data) {
                    Ok(event) => {
                        let data = &event.data;
                        tracing::info!(
                            sender_id = %data.sender_id,
                            conversation_id = %data.conversation_id,
                            "received message.sent event"
                        );

                        if let Err(e) = notification_service::create_notification(
                            &state.db,
                            data.recipient_id,
                            "message_received",
                            "New message",
                            &data.content_preview,
                            Some(serde_json::json!({
                                "conversation_id": data.conversation_id,
                                "message_id": data.message_id,
                                "sender_id": data.sender_id,
                            })),
                        ) {
                            tracing::error!(error = %e, "failed to create message notification");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to deserialize message.sent event");
                    }
                }

                let _ = delivery.ack(BasicAckOptions::default()).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "message consumer error");
            }
        }
    }

    Ok(())
}

/// Listen for ban events (user.banned).
pub async fn listen_ban_events(state: Arc<AppState>) -> anyhow::Result<()> {
    let mut consumer = state.rabbitmq.subscribe(
        "fairway-notification.ban",
        &[routing_keys::PROFILE_USER_BANNED],
    ).await?;

    tracing::info!("listening for ban events");

    while let Some(delivery) = consumer.next().await {
        match delivery {
            Ok(delivery) => {
                match serde_json::from_slice::<Event<payloads::UserBanned>>(&delivery.data) {
                    Ok(event) => {
                        let data = &event.data;
                        tracing::info!(
                            user_id = %data.user_id,
                            is_banned = data.is_banned,
                            "received user.banned event"
                        );

                        let (title, body) = if data.is_banned {
                            (
                                "Account suspended",
                                data.reason.clone().unwrap_or_else(|| {
                                    "Your account has been suspended.".to_string()
                                }),
                            )
                        } else {
                            ("Account reinstated", "Your account is active again.".to_string())
                        };

                        if let Err(e) = notification_service::create_notification(
                            &state.db,
                            data.user_id,
                            if data.is_banned { "account_banned" } else { "account_reinstated" },
                            title,
                            &body,
                            None,
                        ) {
                            tracing::error!(error = %e, "failed to create ban notification");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to deserialize user.banned event");
                    }
                }

                let _ = delivery.ack(BasicAckOptions::default()).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "ban consumer error");
            }
        }
    }

    Ok(())
}
