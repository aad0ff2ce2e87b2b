use uuid::Uuid;

use fairway_shared::clients::rabbitmq::RabbitMQClient;
use fairway_shared::types::event::{payloads, routing_keys, Event};

pub async fn publish_report_created(
    rabbitmq: &RabbitMQClient,
    report_id: Uuid,
    reporter_id: Uuid,
    reported_id: Uuid,
    reason: &str,
) {
    let event = Event::new(
        "fairway-safety",
        routing_keys::SAFETY_REPORT_CREATED,
        payloads::ReportCreated {
            report_id,
            reporter_id,
            reported_id,
            reason: reason.to_string(),
        },
    )
    .with_user(reporter_id);

    if let Err(e) = rabbitmq.publish(routing_keys::SAFETY_REPORT_CREATED, &event).await {
        tracing::error!(error = %e, "failed to publish report.created event");
    }
}

pub async fn publish_block_created(
    rabbitmq: &RabbitMQClient,
    block_id: Uuid,
    blocker_id: Uuid,
    blocked_id: Uuid,
) {
    let event = Event::new(
        "fairway-safety",
        routing_keys::SAFETY_BLOCK_CREATED,
        payloads::BlockCreated {
            block_id,
            blocker_id,
            blocked_id,
        },
    )
    .with_user(blocker_id);

    if let Err(e) = rabbitmq.publish(routing_keys::SAFETY_BLOCK_CREATED, &event).await {
        tracing::error!(error = %e, "failed to publish block.created event");
    }
}

pub async fn publish_block_removed(
    rabbitmq: &RabbitMQClient,
    blocker_id: Uuid,
    blocked_id: Uuid,
) {
    let event = Event::new(
        "fairway-safety",
        routing_keys::SAFETY_BLOCK_REMOVED,
        payloads::BlockRemoved {
            blocker_id,
            blocked_id,
        },
    )
    .with_user(blocker_id);

    if let Err(e) = rabbitmq.publish(routing_keys::SAFETY_BLOCK_REMOVED, &event).await {
        tracing::error!(error = %e, "failed to publish block.removed event");
    }
}
