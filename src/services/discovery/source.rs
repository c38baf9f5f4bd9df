//! Per-DEX log-stream discovery worker
//!
//! One [`LogStreamSource`] instance runs per [`DexSource`]: it subscribes
//! to `logsSubscribe` for the source's program ID(s), matches the emitted
//! log lines against a small per-DEX pattern table, and hands matching
//! signatures to a bounded worker pool that resolves balance deltas into
//! [`NewTokenEvent`]s.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use solana_client::{
    nonblocking::pubsub_client::PubsubClient,
    rpc_config::{RpcTransactionLogsConfig, RpcTransactionLogsFilter},
};
use solana_sdk::commitment_config::CommitmentConfig;
use tokio::sync::{mpsc, Mutex, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::config::models::DiscoveryConfig;
use crate::core::result::AppResult;
use crate::core::sniping::{DexSource, NewTokenEvent};
use crate::core::types::{Timestamp, TokenAddress};
use crate::infrastructure::monitoring::metrics::MetricsService;
use crate::services::solana::SolanaService;

/// Quote mints excluded from candidate selection: a positive balance delta
/// on these is liquidity flowing in, not a new token.
const QUOTE_MINTS: &[&str] = &[
    "So11111111111111111111111111111111111111112", // SOL / WSOL
    "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v", // USDC
    "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB", // USDT
];

fn is_quote_mint(mint: &str) -> bool {
    QUOTE_MINTS.contains(&mint)
}

/// Per-DEX log line substrings that indicate a pool/bonding-curve
/// initialization worth resolving into a candidate event.
fn log_match_patterns(source: DexSource) -> &'static [&'static str] {
    match source {
        DexSource::RaydiumV4 => &["Program log: initialize2", "ray_log"],
        DexSource::RaydiumClmm => &["Instruction: CreatePool"],
        DexSource::Orca => &["Instruction: InitializePool"],
        DexSource::Meteora => &["Instruction: InitializeLbPair", "Instruction: InitializePermissionlessPool"],
        DexSource::PumpFun => &["Instruction: Create"],
        DexSource::PumpSwap => &["Instruction: CreatePool"],
    }
}

fn matches_any(logs: &[String], patterns: &[&str]) -> bool {
    logs.iter().any(|line| patterns.iter().any(|p| line.contains(p)))
}

/// Runs the subscribe -> queue -> dispatch loop for a single DEX source.
pub struct LogStreamSource {
    source: DexSource,
    program_ids: Vec<String>,
    ws_url: String,
    config: DiscoveryConfig,
    solana: Arc<SolanaService>,
    metrics: Arc<MetricsService>,
}

impl LogStreamSource {
    pub fn new(
        source: DexSource,
        program_ids: Vec<String>,
        ws_url: String,
        config: DiscoveryConfig,
        solana: Arc<SolanaService>,
        metrics: Arc<MetricsService>,
    ) -> Self {
        Self { source, program_ids, ws_url, config, solana, metrics }
    }

    fn concurrency(&self) -> usize {
        if self.source == DexSource::Meteora { self.config.meteora_concurrency } else { self.config.default_concurrency }
    }

    fn queue_size(&self) -> usize {
        if self.source == DexSource::Meteora { self.config.meteora_queue_size } else { self.config.default_queue_size }
    }

    fn dispatch_delay(&self) -> Duration {
        if self.source == DexSource::Meteora {
            Duration::from_millis(self.config.meteora_delay_ms)
        } else {
            Duration::from_millis(0)
        }
    }

    /// Run until `cancel` fires, reconnecting with exponential backoff on
    /// stream failure up to `reconnect_max_attempts` times.
    #[instrument(skip(self, cancel, out), fields(source = %self.source))]
    pub async fn run(&self, out: mpsc::Sender<NewTokenEvent>, cancel: CancellationToken) {
        let mut attempt = 0u32;
        let mut backoff_ms = self.config.reconnect_initial_backoff_ms;

        loop {
            if cancel.is_cancelled() {
                return;
            }

            match self.run_once(&out, cancel.clone()).await {
                Ok(()) => return, // cancelled cleanly
                Err(e) => {
                    attempt += 1;
                    warn!("{} discovery stream failed (attempt {}): {}", self.source, attempt, e);
                    if attempt >= self.config.reconnect_max_attempts {
                        error!("{} discovery giving up after {} attempts", self.source, attempt);
                        return;
                    }
                    tokio::select! {
                        _ = tokio::time::sleep(Duration::from_millis(backoff_ms)) => {},
                        _ = cancel.cancelled() => return,
                    }
                    backoff_ms = backoff_ms.saturating_mul(2);
                }
            }
        }
    }

    async fn run_once(&self, out: &mpsc::Sender<NewTokenEvent>, cancel: CancellationToken) -> AppResult<()> {
        let pubsub = PubsubClient::new(&self.ws_url)
            .await
            .map_err(|e| crate::core::error::AppError::network(format!("pubsub connect failed: {e}")))?;

        let queue: Arc<Mutex<VecDeque<String>>> = Arc::new(Mutex::new(VecDeque::with_capacity(self.queue_size())));
        let in_flight: Arc<Mutex<HashSet<String>>> = Arc::new(Mutex::new(HashSet::new()));
        let semaphore = Arc::new(Semaphore::new(self.concurrency()));

        let mut subscriptions = Vec::new();
        for program_id in &self.program_ids {
            let (stream, unsubscribe) = pubsub
                .logs_subscribe(
                    RpcTransactionLogsFilter::Mentions(vec![program_id.clone()]),
                    RpcTransactionLogsConfig { commitment: Some(CommitmentConfig::confirmed()) },
                )
                .await
                .map_err(|e| crate::core::error::AppError::network(format!("logsSubscribe failed: {e}")))?;
            subscriptions.push((stream, unsubscribe));
        }

        let patterns = log_match_patterns(self.source);
        let queue_size = self.queue_size();

        let mut streams: Vec<_> = subscriptions.into_iter().map(|(s, _)| s).collect();
        let mut merged = futures::stream::select_all(streams.drain(..));

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                next = merged.next() => {
                    let Some(response) = next else {
                        return Err(crate::core::error::AppError::network("log subscription stream closed"));
                    };
                    let signature = response.value.signature.clone();
                    if !matches_any(&response.value.logs, patterns) {
                        continue;
                    }

                    let mut in_flight_guard = in_flight.lock().await;
                    if in_flight_guard.contains(&signature) {
                        continue;
                    }
                    in_flight_guard.insert(signature.clone());
                    drop(in_flight_guard);

                    let mut queue_guard = queue.lock().await;
                    if queue_guard.len() >= queue_size {
                        if let Some(dropped) = queue_guard.pop_front() {
                            debug!("{} discovery queue full, dropping oldest signature {}", self.source, dropped);
                            in_flight.lock().await.remove(&dropped);
                        }
                    }
                    queue_guard.push_back(signature);
                    drop(queue_guard);

                    self.drain_one(&queue, &in_flight, &semaphore, out, &cancel).await;
                    if self.dispatch_delay() > Duration::ZERO {
                        tokio::time::sleep(self.dispatch_delay()).await;
                    }
                }
            }
        }
    }

    async fn drain_one(
        &self,
        queue: &Arc<Mutex<VecDeque<String>>>,
        in_flight: &Arc<Mutex<HashSet<String>>>,
        semaphore: &Arc<Semaphore>,
        out: &mpsc::Sender<NewTokenEvent>,
        cancel: &CancellationToken,
    ) {
        let signature = {
            let mut guard = queue.lock().await;
            guard.pop_front()
        };
        let Some(signature) = signature else { return };

        let Ok(permit) = semaphore.clone().acquire_owned().await else { return };
        let solana = Arc::clone(&self.solana);
        let metrics = Arc::clone(&self.metrics);
        let source = self.source;
        let out = out.clone();
        let in_flight = Arc::clone(in_flight);
        let cancel = cancel.clone();

        tokio::spawn(async move {
            let _permit = permit;
            let result = Self::resolve_event(&solana, source, &signature).await;
            in_flight.lock().await.remove(&signature);

            match result {
                Ok(Some(event)) => {
                    metrics.record_discovery_event(source.config_key(), "emitted");
                    if cancel.is_cancelled() {
                        return;
                    }
                    let _ = out.send(event).await;
                }
                Ok(None) => {
                    metrics.record_discovery_event(source.config_key(), "no_candidate");
                }
                Err(e) => {
                    metrics.record_discovery_event(source.config_key(), "error");
                    warn!("{} failed to resolve signature {}: {}", source, signature, e);
                }
            }
        });
    }

    async fn resolve_event(
        solana: &Arc<SolanaService>,
        source: DexSource,
        signature: &str,
    ) -> AppResult<Option<NewTokenEvent>> {
        let client = solana.get_dedicated_rpc_client().await?;
        let deltas = client.get_token_balance_deltas(signature).await?;

        let mut candidate_mint: Option<String> = None;
        let mut quote_lamports: i128 = 0;
        let mut usd_cents: i128 = 0;

        for (mint, delta) in &deltas {
            if is_quote_mint(mint) {
                if mint == QUOTE_MINTS[0] {
                    quote_lamports += *delta;
                } else {
                    usd_cents += *delta;
                }
                continue;
            }
            if *delta > 0 {
                // A pool-init transaction with more than one non-quote positive
                // delta keeps only the last one seen; this emits a single
                // `NewTokenEvent` rather than one per candidate mint.
                candidate_mint = Some(mint.clone());
            }
        }

        let Some(mint) = candidate_mint else { return Ok(None) };

        let liquidity_lamports = quote_lamports.max(0) as u64;
        let market_cap_usd = if usd_cents > 0 { Some((usd_cents / 1_000_000) as u64) } else { None };

        // Metadata is best-effort: an unreadable/missing metadata account
        // must not stop the event, only leave name/symbol unset.
        let (name, symbol) = match solana.get_token_metadata(&mint).await {
            Ok(metadata) => (metadata.name, metadata.symbol),
            Err(e) => {
                debug!("{} metadata fetch failed for {}: {}", source, mint, e);
                (None, None)
            }
        };

        Ok(Some(NewTokenEvent {
            source,
            mint: TokenAddress::new_unchecked(mint),
            name,
            symbol,
            liquidity_lamports,
            market_cap_usd,
            tx: signature.to_string(),
            timestamp: Timestamp::now(),
        }))
    }
}
