use chrono::{DateTime, Duration, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use fairway_shared::clients::db::DbPool;
use fairway_shared::clients::redis::RedisClient;
use fairway_shared::errors::{AppError, AppResult};

use crate::models::{Subscription, Tier};
use crate::schema::subscriptions;

#[derive(Debug, Serialize)]
pub struct ConsumeResult {
    pub allowed: bool,
    pub remaining: Option<i64>,
    pub resets_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct UsageStats {
    pub tier: String,
    pub daily_like_quota: Option<i64>,
    pub likes_used_today: i64,
    pub remaining: Option<i64>,
    pub resets_at: DateTime<Utc>,
}

/// Daily counters are keyed per user per UTC day and expire on their own.
pub fn usage_key(user_id: Uuid, now: DateTime<Utc>) -> String {
    format!("fairway:likes:{}:{}", user_id, now.format("%Y%m%d"))
}

/// The quota window resets at the next midnight UTC.
pub fn next_midnight_utc(now: DateTime<Utc>) -> DateTime<Utc> {
    (now + Duration::days(1))
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc()
}

/// Effective tier for a user; no subscription row means free.
pub fn tier_for_user(pool: &DbPool, user_id: Uuid, now: DateTime<Utc>) -> AppResult<Tier> {
    let mut conn = pool.get().map_err(|e| AppError::internal(e.to_string()))?;

    let subscription = subscriptions::table
        .filter(subscriptions::user_id.eq(user_id))
        .first::<Subscription>(&mut conn)
        .optional()?;

    Ok(subscription
        .map(|s| s.effective_tier(now))
        .unwrap_or(Tier::Free))
}

/// Consume one like from today's quota. Premium never runs out; free
/// tiers count against a Redis counter that expires at midnight UTC.
pub async fn consume_like(
    redis: &RedisClient,
    tier: Tier,
    free_daily_likes: i64,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> AppResult<ConsumeResult> {
    let resets_at = next_midnight_utc(now);

    let quota = match tier.daily_like_quota(free_daily_likes) {
        Some(quota) => quota,
        None => {
            return Ok(ConsumeResult {
                allowed: true,
                remaining: None,
                resets_at,
            });
        }
    };

    let key = usage_key(user_id, now);
    let ttl_secs = (resets_at - now).num_seconds().max(1);

    let count = redis
        .incr_with_ttl(&key, ttl_secs)
        .await
        .map_err(|e| AppError::internal(format!("redis error: {e}")))?;

    if count > quota {
        return Ok(ConsumeResult {
            allowed: false,
            remaining: Some(0),
            resets_at,
        });
    }

    Ok(ConsumeResult {
        allowed: true,
        remaining: Some((quota - count).max(0)),
        resets_at,
    })
}

/// Read-only view of today's usage.
pub async fn usage_stats(
    redis: &RedisClient,
    tier: Tier,
    free_daily_likes: i64,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> AppResult<UsageStats> {
    let key = usage_key(user_id, now);
    let likes_used_today: i64 = redis
        .get(&key)
        .await
        .map_err(|e| AppError::internal(format!("redis error: {e}")))?
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    let daily_like_quota = tier.daily_like_quota(free_daily_likes);
    let remaining = daily_like_quota.map(|q| (q - likes_used_today).max(0));

    Ok(UsageStats {
        tier: tier.to_string(),
        daily_like_quota,
        likes_used_today,
        remaining,
        resets_at: next_midnight_utc(now),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn usage_key_is_per_user_per_day() {
        let user = Uuid::now_v7();
        let morning = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
        let evening = Utc.with_ymd_and_hms(2025, 6, 1, 22, 0, 0).unwrap();
        let tomorrow = Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap();

        assert_eq!(usage_key(user, morning), usage_key(user, evening));
        assert_ne!(usage_key(user, morning), usage_key(user, tomorrow));
        assert_ne!(usage_key(user, morning), usage_key(Uuid::now_v7(), morning));
    }

    #[test]
    fn reset_is_the_next_midnight_utc() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 23, 59, 59).unwrap();
        let reset = next_midnight_utc(now);
        assert_eq!(reset, Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap());
        assert!(reset > now);
    }

    #[test]
    fn reset_from_just_after_midnight_is_a_full_day_out() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 1).unwrap();
        let reset = next_midnight_utc(now);
        assert_eq!(reset, Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap());
    }
}
