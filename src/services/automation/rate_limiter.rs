//! Rate Limiter (C4)
//!
//! Two atomic counters per user — hourly and daily — keyed to the current
//! window so each counter expires on its own at the window boundary rather
//! than needing an explicit reset job. A limit of 0 means unlimited.
//! Counters are advisory: concurrent increments across process restarts can
//! drift by the clock-skew tolerance configured in [`RateLimitConfig`].

use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, Timelike, Utc};
use tracing::instrument;

use crate::config::models::RateLimitConfig;
use crate::core::result::AppResult;
use crate::core::sniping::UserId;
use crate::infrastructure::database::redis::RedisService;

const HOUR_SECONDS: u64 = 3600;
const DAY_SECONDS: u64 = 86_400;

fn hour_window_key(user_id: UserId) -> String {
    let now = Utc::now();
    format!(
        "snipe:ratelimit:hour:{}:{}{:02}{:02}{:02}",
        user_id.0, now.year(), now.month(), now.day(), now.hour()
    )
}

fn day_window_key(user_id: UserId) -> String {
    let now = Utc::now();
    format!("snipe:ratelimit:day:{}:{}{:02}{:02}", user_id.0, now.year(), now.month(), now.day())
}

/// Enforces per-user hourly/daily buy caps via Redis counters.
pub struct RateLimiter {
    redis: Arc<RedisService>,
}

impl RateLimiter {
    pub fn new(redis: Arc<RedisService>) -> Self {
        Self { redis }
    }

    /// Increment both counters and return whether the attempt is allowed
    /// under `config`'s limits. A limit of 0 disables that window's check.
    #[instrument(skip(self, config))]
    pub async fn enforce(&self, user_id: UserId, config: &RateLimitConfig) -> AppResult<bool> {
        let hour_key = hour_window_key(user_id);
        let day_key = day_window_key(user_id);

        let hour_count = self.redis.increment(&hour_key, 1).await?;
        if hour_count == 1 {
            self.redis.expire(&hour_key, Duration::from_secs(HOUR_SECONDS)).await?;
        }

        let day_count = self.redis.increment(&day_key, 1).await?;
        if day_count == 1 {
            self.redis.expire(&day_key, Duration::from_secs(DAY_SECONDS)).await?;
        }

        let hour_ok = config.buys_per_hour == 0 || hour_count <= config.buys_per_hour as i64;
        let day_ok = config.buys_per_day == 0 || day_count <= config.buys_per_day as i64;

        Ok(hour_ok && day_ok)
    }

    /// Un-count an attempt that was incremented by [`Self::enforce`] but did
    /// not consume real trading capacity (honeypot-high, lease failure,
    /// unexpected error before the swap was attempted). Floors each counter
    /// at zero rather than letting it go negative across a window rollover.
    #[instrument(skip(self))]
    pub async fn decrement(&self, user_id: UserId) -> AppResult<()> {
        Self::decrement_floored(&self.redis, &hour_window_key(user_id)).await?;
        Self::decrement_floored(&self.redis, &day_window_key(user_id)).await?;
        Ok(())
    }

    async fn decrement_floored(redis: &RedisService, key: &str) -> AppResult<()> {
        let current: i64 = redis.get::<i64>(key).await?.unwrap_or(0);
        if current > 0 {
            redis.decrement(key, 1).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_keys_are_stable_within_same_instant() {
        let user_id = UserId(7);
        let a = hour_window_key(user_id);
        let b = hour_window_key(user_id);
        assert_eq!(a, b);
        assert!(a.starts_with("snipe:ratelimit:hour:7:"));

        let d = day_window_key(user_id);
        assert!(d.starts_with("snipe:ratelimit:day:7:"));
    }
}
