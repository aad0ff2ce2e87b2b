use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// RabbitMQ Event envelope wrapping all domain events.
///
/// Routing key format: `fairway.{domain}.{entity}.{action}`
/// Example: `fairway.safety.block.created`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event<T: Serialize> {
    pub id: Uuid,
    pub source: String,
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    pub correlation_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub data: T,
}

impl<T: Serialize> Event<T> {
    pub fn new(source: impl Into<String>, event_type: impl Into<String>, data: T) -> Self {
        Self {
            id: Uuid::now_v7(),
            source: source.into(),
            event_type: event_type.into(),
            timestamp: Utc::now(),
            correlation_id: None,
            user_id: None,
            data,
        }
    }

    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_correlation(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }
}

/// RabbitMQ routing keys
pub mod routing_keys {
    // Profile events
    pub const PROFILE_UPDATED: &str = "fairway.profile.profile.updated";
    pub const PROFILE_USER_BANNED: &str = "fairway.profile.user.banned";

    // Matching events
    pub const MATCHING_SWIPE_LIKED: &str = "fairway.matching.swipe.liked";
    pub const MATCHING_MATCH_CREATED: &str = "fairway.matching.match.created";
    pub const MATCHING_MATCH_DELETED: &str = "fairway.matching.match.deleted";

    // Messaging events
    pub const MESSAGING_MESSAGE_SENT: &str = "fairway.messaging.message.sent";

    // Safety events
    pub const SAFETY_REPORT_CREATED: &str = "fairway.safety.report.created";
    pub const SAFETY_BLOCK_CREATED: &str = "fairway.safety.block.created";
    pub const SAFETY_BLOCK_REMOVED: &str = "fairway.safety.block.removed";
}

/// Common event data payloads
pub mod payloads {
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ProfileUpdated {
        pub profile_id: Uuid,
        pub user_id: Uuid,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct UserBanned {
        pub user_id: Uuid,
        pub is_banned: bool,
        pub reason: Option<String>,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct SwipeLiked {
        pub swiper_id: Uuid,
        pub target_id: Uuid,
        pub swiper_display_name: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MatchCreated {
        pub match_id: Uuid,
        pub user_a_id: Uuid,
        pub user_b_id: Uuid,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MatchDeleted {
        pub match_id: Uuid,
        pub user_a_id: Uuid,
        pub user_b_id: Uuid,
        pub reason: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MessageSent {
        pub message_id: Uuid,
        pub conversation_id: Uuid,
        pub sender_id: Uuid,
        pub recipient_id: Uuid,
        pub content_preview: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ReportCreated {
        pub report_id: Uuid,
        pub reporter_id: Uuid,
        pub reported_id: Uuid,
        pub reason: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct BlockCreated {
        pub block_id: Uuid,
        pub blocker_id: Uuid,
        pub blocked_id: Uuid,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct BlockRemoved {
        pub blocker_id: Uuid,
        pub blocked_id: Uuid,
    }
}
