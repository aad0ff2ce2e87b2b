use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::schema::subscriptions;

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = subscriptions)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tier: String,
    pub current_period_end: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// A premium subscription only counts while its period is open. A
    /// missing end date means a non-expiring grant.
    pub fn effective_tier(&self, now: DateTime<Utc>) -> Tier {
        match self.tier.parse::<Tier>() {
            Ok(Tier::Premium) => match self.current_period_end {
                Some(end) if end <= now => Tier::Free,
                _ => Tier::Premium,
            },
            _ => Tier::Free,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Free,
    Premium,
}

impl Tier {
    /// Daily like quota for the tier; `None` means unlimited.
    pub fn daily_like_quota(&self, free_daily_likes: i64) -> Option<i64> {
        match self {
            Self::Free => Some(free_daily_likes),
            Self::Premium => None,
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Free => write!(f, "free"),
            Self::Premium => write!(f, "premium"),
        }
    }
}

impl std::str::FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Self::Free),
            "premium" => Ok(Self::Premium),
            _ => Err(format!("unknown tier: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn subscription(tier: &str, end: Option<DateTime<Utc>>) -> Subscription {
        Subscription {
            id: Uuid::now_v7(),
            user_id: Uuid::now_v7(),
            tier: tier.to_string(),
            current_period_end: end,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn premium_with_open_period_is_premium() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap();
        assert_eq!(subscription("premium", Some(end)).effective_tier(now), Tier::Premium);
    }

    #[test]
    fn expired_premium_falls_back_to_free() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap();
        assert_eq!(subscription("premium", Some(end)).effective_tier(now), Tier::Free);
    }

    #[test]
    fn premium_without_end_date_never_expires() {
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(subscription("premium", None).effective_tier(now), Tier::Premium);
    }

    #[test]
    fn unknown_tier_string_is_free() {
        let now = Utc::now();
        assert_eq!(subscription("platinum", None).effective_tier(now), Tier::Free);
    }

    #[test]
    fn only_free_tier_has_a_quota() {
        assert_eq!(Tier::Free.daily_like_quota(25), Some(25));
        assert_eq!(Tier::Premium.daily_like_quota(25), None);
    }
}
