use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::schema::{matches, swipes};

// --- Swipe ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = swipes)]
pub struct Swipe {
    pub id: Uuid,
    pub swiper_id: Uuid,
    pub target_id: Uuid,
    pub direction: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = swipes)]
pub struct NewSwipe {
    pub swiper_id: Uuid,
    pub target_id: Uuid,
    pub direction: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Like,
    Pass,
}

impl std::fmt::Display for SwipeDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Like => write!(f, "like"),
            Self::Pass => write!(f, "pass"),
        }
    }
}

impl std::str::FromStr for SwipeDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(Self::Like),
            "pass" => Ok(Self::Pass),
            _ => Err(format!("unknown swipe direction: {s}")),
        }
    }
}

// --- Match ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = matches)]
pub struct Match {
    pub id: Uuid,
    pub user_a_id: Uuid,
    pub user_b_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = matches)]
pub struct NewMatch {
    pub user_a_id: Uuid,
    pub user_b_id: Uuid,
}

impl Match {
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.user_a_id == user_id || self.user_b_id == user_id
    }

    pub fn partner_of(&self, user_id: Uuid) -> Uuid {
        if self.user_a_id == user_id {
            self.user_b_id
        } else {
            self.user_a_id
        }
    }
}

/// Matches store the pair in a canonical order so (a, b) and (b, a)
/// cannot coexist.
pub fn ordered_pair(x: Uuid, y: Uuid) -> (Uuid, Uuid) {
    if x <= y { (x, y) } else { (y, x) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_pair_is_symmetric() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        assert_eq!(ordered_pair(a, b), ordered_pair(b, a));
    }

    #[test]
    fn ordered_pair_is_sorted() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let (lo, hi) = ordered_pair(a, b);
        assert!(lo <= hi);
    }

    #[test]
    fn partner_of_returns_the_other_member() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let (user_a_id, user_b_id) = ordered_pair(a, b);
        let m = Match {
            id: Uuid::now_v7(),
            user_a_id,
            user_b_id,
            created_at: Utc::now(),
        };
        assert_eq!(m.partner_of(user_a_id), user_b_id);
        assert_eq!(m.partner_of(user_b_id), user_a_id);
        assert!(m.involves(a) && m.involves(b));
    }

    #[test]
    fn direction_round_trips_through_str() {
        for raw in ["like", "pass"] {
            let d: SwipeDirection = raw.parse().unwrap();
            assert_eq!(d.to_string(), raw);
        }
        assert!("superlike".parse::<SwipeDirection>().is_err());
    }
}
