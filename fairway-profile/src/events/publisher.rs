use uuid::Uuid;

use fairway_shared::clients::rabbitmq::RabbitMQClient;
use fairway_shared::types::event::{payloads, routing_keys, Event};

pub async fn publish_profile_updated(rabbitmq: &RabbitMQClient, profile_id: Uuid, user_id: Uuid) {
    let event = Event::new(
        "fairway-profile",
        routing_keys::PROFILE_UPDATED,
        payloads::ProfileUpdated { profile_id, user_id },
    )
    .with_user(user_id);

    if let Err(e) = rabbitmq.publish(routing_keys::PROFILE_UPDATED, &event).await {
        tracing::error!(error = %e, "failed to publish profile.updated event");
    }
}

pub async fn publish_user_banned(
    rabbitmq: &RabbitMQClient,
    user_id: Uuid,
    is_banned: bool,
    reason: Option<String>,
) {
    let event = Event::new(
        "fairway-profile",
        routing_keys::PROFILE_USER_BANNED,
        payloads::UserBanned { user_id, is_banned, reason },
    )
    .with_user(user_id);

    if let Err(e) = rabbitmq.publish(routing_keys::PROFILE_USER_BANNED, &event).await {
        tracing::error!(error = %e, "failed to publish user.banned event");
    }
}
