//! Snipe Executor (C8)
//!
//! Drives one [`SnipeExecution`] through its state machine: rate limit,
//! persist PENDING, honeypot screen, lease the signing key, quote+swap,
//! submit, persist the terminal state, notify. Every exit path zeroises the
//! decrypted lease secret before returning.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use base64::Engine;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use solana_sdk::transaction::Transaction;
use tracing::{instrument, warn};
use zeroize::Zeroize;

use crate::config::models::AutomationConfig;
use crate::core::error::AppError;
use crate::core::result::AppResult;
use crate::core::sniping::{NewTokenEvent, SnipeConfig, SnipeExecution, UserId};
use crate::core::types::Timestamp;
use crate::infrastructure::monitoring::metrics::MetricsService;
use crate::services::honeypot::HoneypotDetector;
use crate::services::notifier::{FeeBreakdown, NotificationContext, NotificationKind, Notifier};
use crate::services::solana::SolanaService;

use super::aggregator::AggregatorClient;
use super::config_store::SnipeConfigStore;
use super::execution_store::SnipeExecutionStore;
use super::lease_store::AutomationLeaseStore;
use super::rate_limiter::RateLimiter;

const SOL_MINT: &str = "So11111111111111111111111111111111111111112";

/// Drives a single discovered token through the automation pipeline for a
/// single user.
pub struct SnipeExecutor {
    execution_store: Arc<SnipeExecutionStore>,
    config_store: Arc<SnipeConfigStore>,
    lease_store: Arc<AutomationLeaseStore>,
    rate_limiter: Arc<RateLimiter>,
    honeypot: Arc<HoneypotDetector>,
    aggregator: Arc<AggregatorClient>,
    solana: Arc<SolanaService>,
    notifier: Arc<dyn Notifier>,
    metrics: Arc<MetricsService>,
}

impl SnipeExecutor {
    pub fn new(
        execution_store: Arc<SnipeExecutionStore>,
        config_store: Arc<SnipeConfigStore>,
        lease_store: Arc<AutomationLeaseStore>,
        rate_limiter: Arc<RateLimiter>,
        honeypot: Arc<HoneypotDetector>,
        aggregator: Arc<AggregatorClient>,
        solana: Arc<SolanaService>,
        notifier: Arc<dyn Notifier>,
        metrics: Arc<MetricsService>,
    ) -> Self {
        Self { execution_store, config_store, lease_store, rate_limiter, honeypot, aggregator, solana, notifier, metrics }
    }

    /// Run a single user's snipe attempt for `event` to completion.
    ///
    /// Returns `Ok(())` for every outcome that reached a terminal state
    /// (including FAILED/SKIPPED); only infrastructure errors that prevent
    /// recording an outcome at all propagate as `Err`.
    #[instrument(skip(self, config, event), fields(user_id = %config.user_id, mint = %event.mint))]
    pub async fn execute(&self, config: &SnipeConfig, event: &NewTokenEvent, automation: &AutomationConfig) -> AppResult<()> {
        let user_id = config.user_id;

        if !self.rate_limiter.enforce(user_id, &automation.rate_limit).await? {
            warn!("rate limit rejected snipe for user {}", user_id);
            self.metrics.record_rate_limit_rejection("hour_or_day");
            self.notify_if_enabled(
                config,
                event,
                NotificationKind::Failure,
                Some("rate limit exceeded".to_string()),
                None,
            )
            .await;
            return Ok(());
        }

        let mut execution = SnipeExecution::pending(user_id, event, config.buy_amount_lamports);
        self.execution_store.create(&execution).await?;

        let screening_started = Instant::now();
        self.execution_store.mark_analyzing(execution.id).await?;

        let honeypot_result = match self.honeypot.analyze(&event.mint).await {
            Ok(result) => result,
            Err(e) => {
                return self.fail(&mut execution, config, event, user_id, e.message(), true).await;
            }
        };
        self.metrics.record_honeypot_latency(honeypot_result.analysis_time_ms as f64);

        if !honeypot_result.risk_score.is_low_risk(config.max_honeypot_risk.value().saturating_add(1)) {
            let reason = format!(
                "Risk score {} exceeds limit of {}",
                honeypot_result.risk_score, config.max_honeypot_risk.value()
            );
            return self.skip(&mut execution, config, event, user_id, &reason).await;
        }

        let lease = match self.lease_store.load(user_id).await {
            Ok(lease) => lease,
            Err(e) => {
                self.metrics.record_lease_failure(classify_lease_failure(e.message()));
                return self
                    .fail(&mut execution, config, event, user_id, &format!("lease unavailable: {e}"), true)
                    .await;
            }
        };
        let mut lease = lease;

        let analysis_duration_ms = screening_started.elapsed().as_millis() as u64;
        self.execution_store
            .mark_executing(
                execution.id,
                honeypot_result.risk_score,
                Timestamp::now(),
                analysis_duration_ms,
                config.slippage_bps,
            )
            .await?;

        let outcome = self.swap(config, event, &lease.secret).await;
        lease.secret.zeroize();

        match outcome {
            Ok((signature, output_amount, price_impact_pct)) => {
                let now = Timestamp::now();
                self.execution_store
                    .mark_success(execution.id, &signature, output_amount, now, now)
                    .await?;
                if let Err(e) = self.config_store.touch_last_automation(user_id).await {
                    warn!("failed to update last_automation_at for user {}: {}", user_id, e);
                }
                self.metrics.record_execution("success");

                if config.notify_on_success {
                    self.notifier
                        .notify(
                            user_id,
                            NotificationKind::Success,
                            NotificationContext {
                                token_mint: event.mint.clone(),
                                buy_amount_lamports: config.buy_amount_lamports,
                                transaction_signature: Some(signature),
                                reason: None,
                                fee_breakdown: Some(FeeBreakdown {
                                    network_fee_lamports: automation.aggregator.base_fee_lamports,
                                    jito_tip_lamports: automation.aggregator.jito_tip_lamports,
                                    price_impact_pct,
                                }),
                            },
                        )
                        .await
                        .ok();
                }

                Ok(())
            }
            Err(e) => self.fail(&mut execution, config, event, user_id, &format!("{e}"), false).await,
        }
    }

    async fn swap(
        &self,
        config: &SnipeConfig,
        event: &NewTokenEvent,
        secret: &[u8],
    ) -> AppResult<(String, rust_decimal::Decimal, f64)> {
        if secret.len() != 64 {
            return Err(AppError::security("leased secret key has unexpected length"));
        }

        let keypair = Keypair::from_bytes(secret)
            .map_err(|e| AppError::security(format!("invalid leased signing key: {e}")))?;

        let quote = self
            .aggregator
            .quote_and_swap(
                SOL_MINT,
                event.mint.as_str(),
                config.buy_amount_lamports,
                config.slippage_bps.value(),
                &keypair.pubkey().to_string(),
            )
            .await?;

        let swap_started = Instant::now();

        let raw = base64::engine::general_purpose::STANDARD
            .decode(&quote.transaction)
            .map_err(|e| AppError::external_service("aggregator".to_string(), format!("invalid transaction encoding: {e}")))?;
        let (mut transaction, _): (Transaction, usize) = bincode::serde::decode_from_slice(&raw, bincode::config::legacy())
            .map_err(|e| AppError::external_service("aggregator".to_string(), format!("invalid transaction payload: {e}")))?;

        let conn = self.solana.get_rpc_client().await?;
        let blockhash = conn.get_recent_blockhash().await?;
        transaction.sign(&[&keypair], blockhash);

        let signature = conn.send_transaction(&transaction).await?;
        self.metrics.record_swap_latency(swap_started.elapsed().as_millis() as f64);

        let output_amount = rust_decimal::Decimal::from(quote.out_amount);
        Ok((signature.to_string(), output_amount, quote.price_impact_pct))
    }

    async fn fail(
        &self,
        execution: &mut SnipeExecution,
        config: &SnipeConfig,
        event: &NewTokenEvent,
        user_id: UserId,
        reason: &str,
        uncount: bool,
    ) -> AppResult<()> {
        self.execution_store.mark_failed(execution.id, reason).await?;
        self.metrics.record_execution("failed");
        if uncount {
            let _ = self.rate_limiter.decrement(user_id).await;
        }
        self.notify_if_enabled(config, event, NotificationKind::Failure, Some(reason.to_string()), None).await;
        Ok(())
    }

    async fn skip(
        &self,
        execution: &mut SnipeExecution,
        config: &SnipeConfig,
        event: &NewTokenEvent,
        user_id: UserId,
        reason: &str,
    ) -> AppResult<()> {
        self.execution_store.mark_skipped(execution.id, reason).await?;
        self.metrics.record_execution("skipped");
        let _ = self.rate_limiter.decrement(user_id).await;
        self.notify_if_enabled(config, event, NotificationKind::Skip, Some(reason.to_string()), None).await;
        Ok(())
    }

    async fn notify_if_enabled(
        &self,
        config: &SnipeConfig,
        event: &NewTokenEvent,
        kind: NotificationKind,
        reason: Option<String>,
        transaction_signature: Option<String>,
    ) {
        let should_notify = match kind {
            NotificationKind::Success => config.notify_on_success,
            NotificationKind::Failure | NotificationKind::Skip => config.notify_on_failure,
        };
        if !should_notify {
            return;
        }

        let _ = self
            .notifier
            .notify(
                config.user_id,
                kind,
                NotificationContext {
                    token_mint: event.mint.clone(),
                    buy_amount_lamports: config.buy_amount_lamports,
                    transaction_signature,
                    reason,
                    fee_breakdown: None,
                },
            )
            .await;
    }
}

#[allow(dead_code)]
fn parse_pubkey(s: &str) -> AppResult<Pubkey> {
    Pubkey::from_str(s).map_err(|e| AppError::validation(format!("invalid pubkey: {e}")))
}

/// Map an [`AutomationLeaseStore::load`] failure message to one of the
/// `automation_lease_failure{reason=...}` labels named in spec step 4.8.4:
/// `expired`, `auth_failed` (tampered/corrupt/wrong master key), or
/// `storage_error` for anything else (missing record, Redis failure).
fn classify_lease_failure(message: &str) -> &'static str {
    if message.contains("expired") {
        "expired"
    } else if message.contains("corrupt") || message.contains("decryption failed") {
        "auth_failed"
    } else {
        "storage_error"
    }
}

#[cfg(test)]
mod lease_failure_tests {
    use super::classify_lease_failure;

    #[test]
    fn test_classify_expired() {
        assert_eq!(classify_lease_failure("automation lease expired for user 1"), "expired");
    }

    #[test]
    fn test_classify_auth_failed() {
        assert_eq!(
            classify_lease_failure("lease decryption failed (tampered or wrong master key): bad tag"),
            "auth_failed"
        );
        assert_eq!(classify_lease_failure("corrupt lease record: invalid json"), "auth_failed");
    }

    #[test]
    fn test_classify_storage_error_default() {
        assert_eq!(classify_lease_failure("automation lease not found for user 1"), "storage_error");
    }
}
