use uuid::Uuid;

use fairway_shared::clients::rabbitmq::RabbitMQClient;
use fairway_shared::types::event::{payloads, routing_keys, Event};

pub async fn publish_message_sent(
    rabbitmq: &RabbitMQClient,
    message_id: Uuid,
    conversation_id: Uuid,
    sender_id: Uuid,
    recipient_id: Uuid,
    content_preview: &str,
) {
    let event = Event::new(
        "fairway-messaging",
        routing_keys::MESSAGING_MESSAGE_SENT,
        payloads::MessageSent {
            message_id,
            conversation_id,
            sender_id,
            recipient_id,
            content_preview: content_preview.to_string(),
        },
    )
    .with_user(sender_id);

    if let Err(e) = rabbitmq.publish(routing_keys::MESSAGING_MESSAGE_SENT, &event).await {
        tracing::error!(error = %e, "failed to publish message.sent event");
    }
}
