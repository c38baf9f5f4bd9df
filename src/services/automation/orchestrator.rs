//! Snipe Orchestrator (C9)
//!
//! Glues discovery to execution: consumes [`NewTokenEvent`]s from the
//! [`DiscoveryHub`](crate::services::discovery::DiscoveryHub), fans each
//! one out to every enabled user, applies the dedup + policy gates, and
//! dispatches surviving `(user, event)` pairs to [`SnipeExecutor`] bounded
//! by `automation.global_parallelism` concurrent executions.

use std::sync::Arc;

use dashmap::DashSet;
use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::models::AppConfig;
use crate::core::result::AppResult;
use crate::core::sniping::{NewTokenEvent, UserId};
use crate::infrastructure::database::redis::RedisService;
use crate::infrastructure::monitoring::metrics::MetricsService;
use crate::services::discovery::{evaluate, try_claim, DiscoveryHub};
use crate::services::solana::SolanaService;

use super::config_store::SnipeConfigStore;
use super::executor::SnipeExecutor;
use super::lease_store::AutomationLeaseStore;

/// Owns the discovery hub and the event-consumption loop; `run` returns
/// once `shutdown` is called or the discovery channel closes.
pub struct SnipeOrchestrator {
    config_store: Arc<SnipeConfigStore>,
    executor: Arc<SnipeExecutor>,
    lease_store: Arc<AutomationLeaseStore>,
    redis: Arc<RedisService>,
    metrics: Arc<MetricsService>,
    solana: Arc<SolanaService>,
    cancel: CancellationToken,
    /// `MAX_CONCURRENT_EXECUTIONS_PER_USER = 1`: a user id present here has
    /// an execution in flight; released on every exit path in [`Self::dispatch`].
    in_flight: Arc<DashSet<UserId>>,
}

impl SnipeOrchestrator {
    pub fn new(
        config_store: Arc<SnipeConfigStore>,
        executor: Arc<SnipeExecutor>,
        lease_store: Arc<AutomationLeaseStore>,
        redis: Arc<RedisService>,
        metrics: Arc<MetricsService>,
        solana: Arc<SolanaService>,
    ) -> Self {
        Self {
            config_store,
            executor,
            lease_store,
            redis,
            metrics,
            solana,
            cancel: CancellationToken::new(),
            in_flight: Arc::new(DashSet::new()),
        }
    }

    /// Spawn the discovery workers and run the dispatch loop until
    /// cancelled. Consumes `self` because the loop owns its own lifetime;
    /// callers keep a `CancellationToken` clone via [`cancellation`] to stop
    /// it early.
    pub async fn run(self, config: Arc<AppConfig>) -> AppResult<()> {
        if !config.automation.enabled {
            info!("automation disabled, orchestrator not starting");
            return Ok(());
        }

        let (tx, mut rx) = mpsc::channel::<NewTokenEvent>(1024);
        let hub = DiscoveryHub::spawn(&config, Arc::clone(&self.solana), Arc::clone(&self.metrics), tx);

        let parallelism = config.automation.global_parallelism.max(1);
        let permits = Arc::new(Semaphore::new(parallelism));

        info!("snipe orchestrator started, parallelism={}", parallelism);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("snipe orchestrator shutdown requested");
                    break;
                }
                event = rx.recv() => {
                    match event {
                        Some(event) => self.dispatch(event, Arc::clone(&config), Arc::clone(&permits)).await,
                        None => {
                            warn!("discovery channel closed, stopping orchestrator");
                            break;
                        }
                    }
                }
            }
        }

        hub.shutdown().await
    }

    /// A token handle callers can use to stop [`run`] without waiting for
    /// the discovery channel to close on its own.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    async fn dispatch(&self, event: NewTokenEvent, config: Arc<AppConfig>, permits: Arc<Semaphore>) {
        self.metrics.record_discovery_event(event.source.config_key(), "received");

        let configs = match self.config_store.list_active().await {
            Ok(configs) => configs,
            Err(e) => {
                error!("failed to list active snipe configs: {}", e);
                return;
            }
        };

        // Prune users without an active automation lease before doing any
        // further per-user work (filter eval, dedup claim, dispatch).
        let candidate_ids: Vec<UserId> = configs.iter().map(|c| c.user_id).collect();
        let presence = match self.lease_store.batch_presence(&candidate_ids).await {
            Ok(presence) => presence,
            Err(e) => {
                error!("batch lease presence check failed: {}", e);
                return;
            }
        };

        for (user_config, has_lease) in configs.into_iter().zip(presence.into_iter()) {
            if !user_config.auto_trading || !has_lease {
                continue;
            }

            match evaluate(&user_config, &event) {
                Ok(false) => continue,
                Err(reason) => {
                    self.metrics.record_filter_rejection(&reason.to_string());
                    continue;
                }
                Ok(true) => {}
            }

            let claimed = match try_claim(
                &self.redis,
                user_config.user_id.0,
                event.mint.as_str(),
                config.automation.dedup_window_ms,
            )
            .await
            {
                Ok(claimed) => claimed,
                Err(e) => {
                    error!("dedup check failed for user {}: {}", user_config.user_id, e);
                    continue;
                }
            };

            if !claimed {
                self.metrics.record_dedup_drop(event.source.config_key());
                continue;
            }

            if !self.in_flight.insert(user_config.user_id) {
                debug!("user {} already has an execution in flight, skipping", user_config.user_id);
                continue;
            }

            let executor = Arc::clone(&self.executor);
            let event = event.clone();
            let automation = config.automation.clone();
            let permits = Arc::clone(&permits);
            let in_flight = Arc::clone(&self.in_flight);
            let user_id = user_config.user_id;

            tokio::spawn(async move {
                // Scoped guard releases the per-user in-flight flag on every
                // exit path, including a panic unwind inside `execute`.
                struct InFlightGuard(Arc<DashSet<UserId>>, UserId);
                impl Drop for InFlightGuard {
                    fn drop(&mut self) {
                        self.0.remove(&self.1);
                    }
                }
                let _guard = InFlightGuard(in_flight, user_id);

                let Ok(_permit) = permits.acquire_owned().await else {
                    return;
                };
                debug!("executing snipe for user {} mint {}", user_config.user_id, event.mint);
                if let Err(e) = executor.execute(&user_config, &event, &automation).await {
                    error!("snipe execution failed for user {}: {}", user_config.user_id, e);
                }
            });
        }
    }

    /// Stop the dispatch loop and tear down discovery workers.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
    }
}
