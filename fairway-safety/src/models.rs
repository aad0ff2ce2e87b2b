use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::schema::{admin_actions, blocks, reports};

// --- Report ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = reports)]
pub struct Report {
    pub id: Uuid,
    pub reporter_id: Uuid,
    pub reported_id: Uuid,
    pub reason: String,
    pub description: Option<String>,
    pub status: String,
    pub admin_notes: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = reports)]
pub struct NewReport {
    pub reporter_id: Uuid,
    pub reported_id: Uuid,
    pub reason: String,
    pub description: Option<String>,
}

/// Why a user was reported. Stored as text; parsed at the route boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportReason {
    Harassment,
    InappropriateBehavior,
    FakeProfile,
    Spam,
    NoShow,
    Other,
}

impl ReportReason {
    pub const ALL: [&'static str; 6] = [
        "harassment",
        "inappropriate_behavior",
        "fake_profile",
        "spam",
        "no_show",
        "other",
    ];

    /// Severe reasons trigger an automatic block of the reported user.
    pub fn is_severe(&self) -> bool {
        matches!(self, Self::Harassment | Self::InappropriateBehavior)
    }
}

impl std::fmt::Display for ReportReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Harassment => "harassment",
            Self::InappropriateBehavior => "inappropriate_behavior",
            Self::FakeProfile => "fake_profile",
            Self::Spam => "spam",
            Self::NoShow => "no_show",
            Self::Other => "other",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for ReportReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "harassment" => Ok(Self::Harassment),
            "inappropriate_behavior" => Ok(Self::InappropriateBehavior),
            "fake_profile" => Ok(Self::FakeProfile),
            "spam" => Ok(Self::Spam),
            "no_show" => Ok(Self::NoShow),
            "other" => Ok(Self::Other),
            _ => Err(format!("unknown report reason: {s}")),
        }
    }
}

/// Report lifecycle: pending -> investigating -> resolved | dismissed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStatus {
    Pending,
    Investigating,
    Resolved,
    Dismissed,
}

impl ReportStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved | Self::Dismissed)
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Investigating => "investigating",
            Self::Resolved => "resolved",
            Self::Dismissed => "dismissed",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "investigating" => Ok(Self::Investigating),
            "resolved" => Ok(Self::Resolved),
            "dismissed" => Ok(Self::Dismissed),
            _ => Err(format!("unknown report status: {s}")),
        }
    }
}

// --- Block ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = blocks)]
pub struct Block {
    pub id: Uuid,
    pub blocker_id: Uuid,
    pub blocked_id: Uuid,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = blocks)]
pub struct NewBlock {
    pub blocker_id: Uuid,
    pub blocked_id: Uuid,
    pub reason: Option<String>,
}

// --- AdminAction ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = admin_actions)]
pub struct AdminAction {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub action: String,
    pub target_user_id: Option<Uuid>,
    pub details: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = admin_actions)]
pub struct NewAdminAction {
    pub admin_id: Uuid,
    pub action: String,
    pub target_user_id: Option<Uuid>,
    pub details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_harassment_and_inappropriate_behavior_are_severe() {
        for raw in ReportReason::ALL {
            let reason: ReportReason = raw.parse().unwrap();
            let expected = raw == "harassment" || raw == "inappropriate_behavior";
            assert_eq!(reason.is_severe(), expected, "{raw}");
        }
    }

    #[test]
    fn reasons_round_trip_through_str() {
        for raw in ReportReason::ALL {
            let reason: ReportReason = raw.parse().unwrap();
            assert_eq!(reason.to_string(), raw);
        }
        assert!("rudeness".parse::<ReportReason>().is_err());
    }

    #[test]
    fn resolved_and_dismissed_are_terminal() {
        assert!(!"pending".parse::<ReportStatus>().unwrap().is_terminal());
        assert!(!"investigating".parse::<ReportStatus>().unwrap().is_terminal());
        assert!("resolved".parse::<ReportStatus>().unwrap().is_terminal());
        assert!("dismissed".parse::<ReportStatus>().unwrap().is_terminal());
    }
}
