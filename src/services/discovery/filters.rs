//! Filter + Dedup (C7)
//!
//! Two independent gates sit between token discovery and execution: a
//! cross-source dedup window (first source to observe a mint for a given
//! user wins) and a per-user policy filter (whitelist/blacklist/liquidity/
//! market-cap/enabled-sources).

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::core::error::AppError;
use crate::core::result::AppResult;
use crate::core::sniping::{NewTokenEvent, SnipeConfig};
use crate::infrastructure::database::redis::RedisService;

fn dedup_key(user_id: i64, mint: &str) -> String {
    format!("snipe:dedup:{user_id}:{mint}")
}

/// Attempt to claim `(user_id, mint)` for this discovery event. Returns
/// `true` if this call is the first to observe the pair within the
/// dedup window (the caller should proceed), `false` if another source
/// already claimed it (the caller should silently drop the event).
pub async fn try_claim(
    redis: &RedisService,
    user_id: i64,
    mint: &str,
    window_ms: u64,
) -> AppResult<bool> {
    let acquired = redis
        .set_nx_ex(&dedup_key(user_id, mint), "1", Duration::from_millis(window_ms))
        .await?;

    if !acquired {
        debug!("dedup drop: user={} mint={}", user_id, mint);
    }

    Ok(acquired)
}

/// Evaluate a user's policy against a discovered token.
///
/// `Ok(false)` means silently skip (the user never opted into this
/// source). `Ok(true)` means proceed to honeypot screening. `Err(reason)`
/// means a user-visible policy rejection (may be notified as a Skip).
pub fn evaluate(config: &SnipeConfig, event: &NewTokenEvent) -> AppResult<bool> {
    if !config.enabled_sources.contains(&event.source) {
        return Ok(false);
    }

    if config.blacklist.contains(event.mint.as_str()) {
        return Err(AppError::validation("blacklisted"));
    }

    // A whitelisted mint bypasses the liquidity/market-cap gates entirely.
    if !config.whitelist.is_empty() {
        if config.whitelist.contains(event.mint.as_str()) {
            return Ok(true);
        }
        return Err(AppError::validation("whitelist_miss"));
    }

    if let Some(min) = config.min_liquidity_lamports {
        if event.liquidity_lamports < min {
            return Err(AppError::validation("liquidity_below_min"));
        }
    }
    if let Some(max) = config.max_liquidity_lamports {
        if event.liquidity_lamports > max {
            return Err(AppError::validation("liquidity_above_max"));
        }
    }

    let market_cap = event.market_cap_usd.unwrap_or(0);
    if let Some(min) = config.min_market_cap_usd {
        if market_cap < min {
            return Err(AppError::validation("market_cap_below_min"));
        }
    }
    if let Some(max) = config.max_market_cap_usd {
        if market_cap > max {
            return Err(AppError::validation("market_cap_above_max"));
        }
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sniping::{DexSource, HoneypotRiskScore, SlippageBps, UserId};
    use crate::core::types::{Timestamp, TokenAddress};
    use std::collections::HashSet;

    fn sample_event(source: DexSource) -> NewTokenEvent {
        NewTokenEvent {
            source,
            mint: TokenAddress::new_unchecked("Mint1111111111111111111111111111111111111".to_string()),
            name: None,
            symbol: None,
            liquidity_lamports: 5_000_000_000,
            market_cap_usd: Some(50_000),
            tx: "sig".to_string(),
            timestamp: Timestamp::now(),
        }
    }

    fn sample_config() -> SnipeConfig {
        SnipeConfig {
            user_id: UserId(1),
            enabled: true,
            auto_trading: true,
            enabled_sources: HashSet::from([DexSource::PumpFun]),
            buy_amount_lamports: 1_000_000_000,
            slippage_bps: SlippageBps(100),
            min_liquidity_lamports: None,
            max_liquidity_lamports: None,
            min_market_cap_usd: None,
            max_market_cap_usd: None,
            whitelist: HashSet::new(),
            blacklist: HashSet::new(),
            max_honeypot_risk: HoneypotRiskScore(50),
            notify_on_success: true,
            notify_on_failure: true,
            last_automation_at: None,
        }
    }

    #[test]
    fn test_source_not_enabled_is_silent() {
        let config = sample_config();
        let event = sample_event(DexSource::RaydiumV4);
        assert_eq!(evaluate(&config, &event).unwrap(), false);
    }

    #[test]
    fn test_blacklist_rejects() {
        let mut config = sample_config();
        let event = sample_event(DexSource::PumpFun);
        config.blacklist.insert(event.mint.as_str().to_string());
        assert!(evaluate(&config, &event).is_err());
    }

    #[test]
    fn test_whitelist_miss_rejects() {
        let mut config = sample_config();
        config.whitelist.insert("SomeOtherMint".to_string());
        let event = sample_event(DexSource::PumpFun);
        assert!(evaluate(&config, &event).is_err());
    }

    #[test]
    fn test_passes_with_no_restrictions() {
        let config = sample_config();
        let event = sample_event(DexSource::PumpFun);
        assert_eq!(evaluate(&config, &event).unwrap(), true);
    }
}
