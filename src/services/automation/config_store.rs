//! Config Store (C3)
//!
//! Upserts and reads [`SnipeConfig`] rows from Postgres, with a 30-second
//! in-memory TTL cache per user to absorb the orchestrator's per-event
//! lookups without round-tripping to the database on every token discovery.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use sqlx::{PgPool, Row};
use tracing::instrument;

use crate::core::error::AppError;
use crate::core::result::AppResult;
use crate::core::sniping::{DexSource, HoneypotRiskScore, SlippageBps, SnipeConfig, UserId};
use crate::core::types::Timestamp;

const CACHE_TTL: Duration = Duration::from_secs(30);

const SELECT_COLUMNS: &str = r#"
    user_id, enabled, auto_trading, enabled_sources,
    buy_amount_lamports, slippage_bps,
    min_liquidity_lamports, max_liquidity_lamports,
    min_market_cap_usd, max_market_cap_usd,
    whitelist, blacklist, max_honeypot_risk,
    notify_on_success, notify_on_failure, last_automation_at
"#;

struct CacheEntry {
    config: SnipeConfig,
    cached_at: Instant,
}

fn row_to_config(row: &sqlx::postgres::PgRow) -> AppResult<SnipeConfig> {
    let enabled_sources_raw: Vec<String> = row.try_get("enabled_sources")
        .map_err(|e| AppError::database(format!("malformed snipe_configs row: {e}"), "decode"))?;
    let enabled_sources = enabled_sources_raw
        .iter()
        .filter_map(|s| s.parse::<DexSource>().ok())
        .collect::<HashSet<_>>();

    let whitelist: Vec<String> = row.try_get("whitelist")
        .map_err(|e| AppError::database(format!("malformed snipe_configs row: {e}"), "decode"))?;
    let blacklist: Vec<String> = row.try_get("blacklist")
        .map_err(|e| AppError::database(format!("malformed snipe_configs row: {e}"), "decode"))?;

    let slippage_bps: i32 = row.try_get("slippage_bps")
        .map_err(|e| AppError::database(format!("malformed snipe_configs row: {e}"), "decode"))?;
    let max_honeypot_risk: i32 = row.try_get("max_honeypot_risk")
        .map_err(|e| AppError::database(format!("malformed snipe_configs row: {e}"), "decode"))?;
    let user_id: i64 = row.try_get("user_id")
        .map_err(|e| AppError::database(format!("malformed snipe_configs row: {e}"), "decode"))?;
    let buy_amount_lamports: i64 = row.try_get("buy_amount_lamports")
        .map_err(|e| AppError::database(format!("malformed snipe_configs row: {e}"), "decode"))?;
    let last_automation_at: Option<chrono::DateTime<chrono::Utc>> = row.try_get("last_automation_at")
        .map_err(|e| AppError::database(format!("malformed snipe_configs row: {e}"), "decode"))?;

    Ok(SnipeConfig {
        user_id: UserId(user_id),
        enabled: row.try_get("enabled")
            .map_err(|e| AppError::database(format!("malformed snipe_configs row: {e}"), "decode"))?,
        auto_trading: row.try_get("auto_trading")
            .map_err(|e| AppError::database(format!("malformed snipe_configs row: {e}"), "decode"))?,
        enabled_sources,
        buy_amount_lamports: buy_amount_lamports as u64,
        slippage_bps: SlippageBps::new(slippage_bps as u16)?,
        min_liquidity_lamports: row.try_get::<Option<i64>, _>("min_liquidity_lamports")
            .map_err(|e| AppError::database(format!("malformed snipe_configs row: {e}"), "decode"))?
            .map(|v| v as u64),
        max_liquidity_lamports: row.try_get::<Option<i64>, _>("max_liquidity_lamports")
            .map_err(|e| AppError::database(format!("malformed snipe_configs row: {e}"), "decode"))?
            .map(|v| v as u64),
        min_market_cap_usd: row.try_get::<Option<i64>, _>("min_market_cap_usd")
            .map_err(|e| AppError::database(format!("malformed snipe_configs row: {e}"), "decode"))?
            .map(|v| v as u64),
        max_market_cap_usd: row.try_get::<Option<i64>, _>("max_market_cap_usd")
            .map_err(|e| AppError::database(format!("malformed snipe_configs row: {e}"), "decode"))?
            .map(|v| v as u64),
        whitelist: whitelist.into_iter().collect(),
        blacklist: blacklist.into_iter().collect(),
        max_honeypot_risk: HoneypotRiskScore::new(max_honeypot_risk as u8)?,
        notify_on_success: row.try_get("notify_on_success")
            .map_err(|e| AppError::database(format!("malformed snipe_configs row: {e}"), "decode"))?,
        notify_on_failure: row.try_get("notify_on_failure")
            .map_err(|e| AppError::database(format!("malformed snipe_configs row: {e}"), "decode"))?,
        last_automation_at: last_automation_at.map(Timestamp::from_datetime),
    })
}

/// Postgres-backed store for per-user snipe configuration.
pub struct SnipeConfigStore {
    pool: PgPool,
    cache: Arc<DashMap<i64, CacheEntry>>,
}

impl SnipeConfigStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            cache: Arc::new(DashMap::new()),
        }
    }

    /// Read a user's config, preferring a fresh cache entry.
    #[instrument(skip(self))]
    pub async fn get(&self, user_id: UserId) -> AppResult<Option<SnipeConfig>> {
        if let Some(entry) = self.cache.get(&user_id.0) {
            if entry.cached_at.elapsed() < CACHE_TTL {
                return Ok(Some(entry.config.clone()));
            }
        }

        let query = format!("SELECT {SELECT_COLUMNS} FROM snipe_configs WHERE user_id = $1");
        let row = sqlx::query(&query)
            .bind(user_id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("failed to load snipe config: {e}"), "select"))?;

        let config = match row {
            Some(row) => Some(row_to_config(&row)?),
            None => None,
        };

        if let Some(ref config) = config {
            self.cache.insert(
                user_id.0,
                CacheEntry { config: config.clone(), cached_at: Instant::now() },
            );
        }

        Ok(config)
    }

    /// Idempotently create or update a user's config; invalidates the cache
    /// entry so the next read observes the write.
    #[instrument(skip(self, config))]
    pub async fn upsert(&self, config: &SnipeConfig) -> AppResult<()> {
        config.validate()?;

        let enabled_sources: Vec<String> =
            config.enabled_sources.iter().map(|s| s.to_string()).collect();
        let whitelist: Vec<String> = config.whitelist.iter().cloned().collect();
        let blacklist: Vec<String> = config.blacklist.iter().cloned().collect();

        sqlx::query(
            r#"
            INSERT INTO snipe_configs (
                user_id, enabled, auto_trading, enabled_sources,
                buy_amount_lamports, slippage_bps,
                min_liquidity_lamports, max_liquidity_lamports,
                min_market_cap_usd, max_market_cap_usd,
                whitelist, blacklist, max_honeypot_risk,
                notify_on_success, notify_on_failure, last_automation_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            ON CONFLICT (user_id) DO UPDATE SET
                enabled = EXCLUDED.enabled,
                auto_trading = EXCLUDED.auto_trading,
                enabled_sources = EXCLUDED.enabled_sources,
                buy_amount_lamports = EXCLUDED.buy_amount_lamports,
                slippage_bps = EXCLUDED.slippage_bps,
                min_liquidity_lamports = EXCLUDED.min_liquidity_lamports,
                max_liquidity_lamports = EXCLUDED.max_liquidity_lamports,
                min_market_cap_usd = EXCLUDED.min_market_cap_usd,
                max_market_cap_usd = EXCLUDED.max_market_cap_usd,
                whitelist = EXCLUDED.whitelist,
                blacklist = EXCLUDED.blacklist,
                max_honeypot_risk = EXCLUDED.max_honeypot_risk,
                notify_on_success = EXCLUDED.notify_on_success,
                notify_on_failure = EXCLUDED.notify_on_failure,
                last_automation_at = EXCLUDED.last_automation_at
            "#,
        )
        .bind(config.user_id.0)
        .bind(config.enabled)
        .bind(config.auto_trading)
        .bind(&enabled_sources)
        .bind(config.buy_amount_lamports as i64)
        .bind(config.slippage_bps.value() as i32)
        .bind(config.min_liquidity_lamports.map(|v| v as i64))
        .bind(config.max_liquidity_lamports.map(|v| v as i64))
        .bind(config.min_market_cap_usd.map(|v| v as i64))
        .bind(config.max_market_cap_usd.map(|v| v as i64))
        .bind(&whitelist)
        .bind(&blacklist)
        .bind(config.max_honeypot_risk.value() as i32)
        .bind(config.notify_on_success)
        .bind(config.notify_on_failure)
        .bind(config.last_automation_at.map(|t| t.into_inner()))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("failed to upsert snipe config: {e}"), "upsert"))?;

        self.cache.remove(&config.user_id.0);

        Ok(())
    }

    /// All configs with `enabled = true`, used by the orchestrator at startup
    /// and on periodic refresh.
    #[instrument(skip(self))]
    pub async fn list_active(&self) -> AppResult<Vec<SnipeConfig>> {
        let query = format!("SELECT {SELECT_COLUMNS} FROM snipe_configs WHERE enabled = true");
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("failed to list active snipe configs: {e}"), "select"))?;

        rows.iter().map(row_to_config).collect()
    }

    /// Record that automation fired for a user just now, bypassing a full
    /// config rewrite.
    #[instrument(skip(self))]
    pub async fn touch_last_automation(&self, user_id: UserId) -> AppResult<()> {
        sqlx::query("UPDATE snipe_configs SET last_automation_at = now() WHERE user_id = $1")
            .bind(user_id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("failed to touch last_automation_at: {e}"), "update"))?;

        self.cache.remove(&user_id.0);
        Ok(())
    }
}
