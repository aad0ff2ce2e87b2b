use uuid::Uuid;

use fairway_shared::clients::rabbitmq::RabbitMQClient;
use fairway_shared::types::event::{payloads, routing_keys, Event};

pub async fn publish_swipe_liked(
    rabbitmq: &RabbitMQClient,
    swiper_id: Uuid,
    target_id: Uuid,
    swiper_display_name: &str,
) {
    let event = Event::new(
        "fairway-matching",
        routing_keys::MATCHING_SWIPE_LIKED,
        payloads::SwipeLiked {
            swiper_id,
            target_id,
            swiper_display_name: swiper_display_name.to_string(),
        },
    )
    .with_user(swiper_id);

    if let Err(e) = rabbitmq.publish(routing_keys::MATCHING_SWIPE_LIKED, &event).await {
        tracing::error!(error = %e, "failed to publish swipe.liked event");
    }
}

pub async fn publish_match_created(
    rabbitmq: &RabbitMQClient,
    match_id: Uuid,
    user_a_id: Uuid,
    user_b_id: Uuid,
) {
    let event = Event::new(
        "fairway-matching",
        routing_keys::MATCHING_MATCH_CREATED,
        payloads::MatchCreated {
            match_id,
            user_a_id,
            user_b_id,
        },
    );

    if let Err(e) = rabbitmq.publish(routing_keys::MATCHING_MATCH_CREATED, &event).await {
        tracing::error!(error = %e, "failed to publish match.created event");
    }
}

pub async fn publish_match_deleted(
    rabbitmq: &RabbitMQClient,
    match_id: Uuid,
    user_a_id: Uuid,
    user_b_id: Uuid,
    reason: &str,
) {
    let event = Event::new(
        "fairway-matching",
        routing_keys::MATCHING_MATCH_DELETED,
        payloads::MatchDeleted {
            match_id,
            user_a_id,
            user_b_id,
            reason: reason.to_string(),
        },
    );

    if let Err(e) = rabbitmq.publish(routing_keys::MATCHING_MATCH_DELETED, &event).await {
        tracing::error!(error = %e, "failed to publish match.deleted event");
    }
}
