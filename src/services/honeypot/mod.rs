//! Honeypot Detector (C5)
//!
//! Aggregates N external providers plus an on-chain authority-check layer
//! into one [`HoneypotResult`], with a Redis-backed cache keyed by mint and
//! a configurable whitelist bypass.

mod onchain;
mod providers;

pub use onchain::OnChainLayer;
pub use providers::{GoPlusProvider, HoneypotIsProvider};

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{instrument, warn};

use crate::config::models::HoneypotConfig;
use crate::core::error::AppError;
use crate::core::result::AppResult;
use crate::core::sniping::{HoneypotResult, HoneypotRiskScore, HoneypotSubResult};
use crate::core::types::{Timestamp, TokenAddress};
use crate::infrastructure::database::redis::RedisService;
use crate::infrastructure::monitoring::metrics::MetricsService;

/// A single honeypot-screening layer: an external provider, or the
/// on-chain authority check.
#[async_trait]
pub trait HoneypotProvider: Send + Sync {
    /// Stable identifier used in flags/metrics/cache diagnostics
    fn name(&self) -> &str;

    /// This layer's contribution weight in the aggregate score
    fn weight(&self) -> f64;

    /// Screen a single mint
    async fn check(&self, mint: &str) -> AppResult<HoneypotSubResult>;
}

fn cache_key(mint: &str) -> String {
    format!("honeypot:cache:{mint}")
}

/// Composes all configured providers and the on-chain layer into a single
/// aggregate honeypot risk assessment, cached in Redis.
pub struct HoneypotDetector {
    providers: Vec<Arc<dyn HoneypotProvider>>,
    onchain: Arc<OnChainLayer>,
    config: HoneypotConfig,
    whitelist: HashSet<String>,
    redis: Arc<RedisService>,
    metrics: Arc<MetricsService>,
}

impl HoneypotDetector {
    /// Build a detector from configured providers plus the on-chain layer.
    pub fn new(
        providers: Vec<Arc<dyn HoneypotProvider>>,
        onchain: Arc<OnChainLayer>,
        config: HoneypotConfig,
        redis: Arc<RedisService>,
        metrics: Arc<MetricsService>,
    ) -> Self {
        let whitelist = config.whitelist.iter().cloned().collect();
        Self { providers, onchain, config, whitelist, redis, metrics }
    }

    /// Screen `mint` for honeypot risk, bounded overall by
    /// `config.timeout_ms`.
    #[instrument(skip(self))]
    pub async fn analyze(&self, mint: &TokenAddress) -> AppResult<HoneypotResult> {
        if self.whitelist.contains(mint.as_str()) {
            return Ok(HoneypotResult {
                token_mint: mint.clone(),
                is_honeypot: false,
                risk_score: HoneypotRiskScore::min(),
                confidence: 100,
                flags: HashSet::from(["whitelisted".to_string()]),
                checked_at: Timestamp::now(),
                analysis_time_ms: 0,
                sub_results: Vec::new(),
            });
        }

        if let Some(cached) = self.cached(mint).await {
            self.metrics.record_honeypot_cache(true);
            return Ok(cached);
        }
        self.metrics.record_honeypot_cache(false);

        let started = std::time::Instant::now();
        let timeout = Duration::from_millis(self.config.timeout_ms);

        let analysis = tokio::time::timeout(timeout, self.run_layers(mint)).await;

        let result = match analysis {
            Ok(result) => result?,
            Err(_) => return Err(AppError::timeout(
                "Honeypot analysis error: timeout".to_string(),
                "honeypot_analyze".to_string(),
                self.config.timeout_ms,
            )),
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        let result = HoneypotResult { analysis_time_ms: elapsed_ms, ..result };

        self.store_cache(mint, &result).await;

        Ok(result)
    }

    async fn run_layers(&self, mint: &TokenAddress) -> AppResult<HoneypotResult> {
        let mint_str = mint.as_str().to_string();

        let provider_futures = self.providers.iter().map(|provider| {
            let provider = Arc::clone(provider);
            let mint_str = mint_str.clone();
            async move { provider.check(&mint_str).await }
        });

        let onchain = Arc::clone(&self.onchain);
        let onchain_mint = mint_str.clone();
        let onchain_future = async move { onchain.check(&onchain_mint).await };

        let (provider_results, onchain_result) =
            futures::join!(futures::future::join_all(provider_futures), onchain_future);

        let mut sub_results = Vec::with_capacity(self.providers.len() + 1);
        let mut flags = HashSet::new();
        let mut succeeded = 0usize;
        let mut conclusive = false;
        let mut weighted_sum = 0.0_f64;
        let mut weight_total = 0.0_f64;

        for (provider, outcome) in self.providers.iter().zip(provider_results) {
            match outcome {
                Ok(sub) => {
                    succeeded += 1;
                    if let Some(score) = sub.score {
                        if score >= 100 {
                            conclusive = true;
                        }
                        weighted_sum += f64::from(score) * provider.weight();
                        weight_total += provider.weight();
                    }
                    flags.extend(sub.flags.iter().cloned());
                    sub_results.push(sub);
                }
                Err(e) => {
                    warn!("honeypot provider {} failed: {}", provider.name(), e);
                    self.metrics.record_honeypot_provider_error(provider.name());
                    sub_results.push(HoneypotSubResult {
                        layer: provider.name().to_string(),
                        score: None,
                        flags: Vec::new(),
                        succeeded: false,
                    });
                }
            }
        }

        match onchain_result {
            Ok(sub) => {
                succeeded += 1;
                if let Some(score) = sub.score {
                    if score >= 100 {
                        conclusive = true;
                    }
                    weighted_sum += f64::from(score) * self.config.onchain_weight;
                    weight_total += self.config.onchain_weight;
                }
                flags.extend(sub.flags.iter().cloned());
                sub_results.push(sub);
            }
            Err(e) => {
                warn!("on-chain honeypot layer failed for {}: {}", mint_str, e);
                sub_results.push(HoneypotSubResult {
                    layer: "onchain".to_string(),
                    score: None,
                    flags: Vec::new(),
                    succeeded: false,
                });
            }
        }

        let total_layers = self.providers.len() + 1;
        let confidence = ((succeeded as f64 / total_layers as f64) * 100.0) as u8;

        let risk_score = if conclusive {
            100
        } else if weight_total > 0.0 {
            ((weighted_sum / weight_total).round() as i64).clamp(0, 100) as u8
        } else {
            0
        };

        Ok(HoneypotResult {
            token_mint: mint.clone(),
            is_honeypot: risk_score >= 100,
            risk_score: HoneypotRiskScore::new(risk_score)?,
            confidence,
            flags,
            checked_at: Timestamp::now(),
            analysis_time_ms: 0,
            sub_results,
        })
    }

    async fn cached(&self, mint: &TokenAddress) -> Option<HoneypotResult> {
        self.redis.get_cached_json::<HoneypotResult>(&cache_key(mint.as_str())).await.ok().flatten()
    }

    async fn store_cache(&self, mint: &TokenAddress, result: &HoneypotResult) {
        let ttl_secs = if result.risk_score.is_low_risk(self.config.medium_risk_threshold) {
            self.config.safe_cache_ttl_seconds
        } else {
            self.config.cache_ttl_seconds
        };

        if let Err(e) = self.redis
            .cache_json(&cache_key(mint.as_str()), result, Some(Duration::from_secs(ttl_secs)))
            .await
        {
            warn!("failed to cache honeypot result for {}: {}", mint.as_str(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysSafe;

    #[async_trait]
    impl HoneypotProvider for AlwaysSafe {
        fn name(&self) -> &str { "always_safe" }
        fn weight(&self) -> f64 { 1.0 }
        async fn check(&self, _mint: &str) -> AppResult<HoneypotSubResult> {
            Ok(HoneypotSubResult {
                layer: "always_safe".to_string(),
                score: Some(5),
                flags: Vec::new(),
                succeeded: true,
            })
        }
    }

    #[test]
    fn test_cache_key_format() {
        assert_eq!(cache_key("Mint111"), "honeypot:cache:Mint111");
    }
}
