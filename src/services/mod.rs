//! Services layer module
//!
//! This module contains all business services including blockchain integration,
//! the automation pipeline (C1-C11), and external API integrations. See
//! `SPEC_FULL.md` component list for how the submodules below map to it.

pub mod automation;
pub mod discovery;
pub mod honeypot;
pub mod notifier;
pub mod retry;
pub mod solana;

// Re-export commonly used types
pub use solana::{SolanaService, HeliusClient, TokenMetadata, RpcClient};

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use teloxide::Bot;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::AppConfig;
use crate::core::error::AppError;
use crate::core::result::AppResult;
use crate::infrastructure::database::DatabaseService;
use crate::infrastructure::monitoring::metrics::MetricsService;

use automation::{
    AggregatorClient, AutomationLeaseStore, RateLimiter, SnipeConfigStore, SnipeExecutionStore,
    SnipeExecutor, SnipeOrchestrator,
};
use honeypot::{GoPlusProvider, HoneypotDetector, HoneypotIsProvider, HoneypotProvider, OnChainLayer};
use notifier::{Notifier, TelegramNotifier};

/// Services collection for dependency injection.
///
/// Owns every C1-C11 service the orchestrator needs; [`Application`](crate::application::app::Application)
/// holds one of these and is responsible for spawning/cancelling [`SnipeOrchestrator::run`].
#[derive(Clone)]
pub struct ServiceContainer {
    /// Solana blockchain service
    pub solana: Arc<solana::SolanaService>,
    /// Database coordinator (Postgres + Redis)
    pub database: Arc<DatabaseService>,
    /// Metrics collection (C12)
    pub metrics: Arc<MetricsService>,
    /// Honeypot Detector (C5)
    pub honeypot: Arc<HoneypotDetector>,
    /// Config Store (C3)
    pub config_store: Arc<SnipeConfigStore>,
    /// Execution persistence (C10)
    pub execution_store: Arc<SnipeExecutionStore>,
    /// Automation Lease Store (C2)
    pub lease_store: Arc<AutomationLeaseStore>,
    /// Rate Limiter (C4)
    pub rate_limiter: Arc<RateLimiter>,
    /// Swap aggregator client
    pub aggregator: Arc<AggregatorClient>,
    /// Notifier (C11)
    pub notifier: Arc<dyn Notifier>,
    /// Snipe Executor (C8)
    pub executor: Arc<SnipeExecutor>,
    /// Snipe Orchestrator (C9) cancellation handle; the orchestrator itself
    /// is consumed by the background task spawned in [`Self::spawn_orchestrator`].
    orchestrator_cancel: Arc<parking_lot::Mutex<Option<CancellationToken>>>,
}

fn build_honeypot_provider(config: &crate::config::models::HoneypotProviderConfig) -> AppResult<Arc<dyn HoneypotProvider>> {
    match config.name.as_str() {
        "goplus" => Ok(Arc::new(GoPlusProvider::new(config)?)),
        "honeypot_is" => Ok(Arc::new(HoneypotIsProvider::new(config)?)),
        other => Err(AppError::config(format!("unknown honeypot provider configured: {other}"))),
    }
}

impl ServiceContainer {
    /// Initialize all services, wiring C1-C11 together from `config`.
    pub async fn initialize(config: &AppConfig) -> AppResult<Self> {
        info!("🚀 Initializing service container");

        let database = Arc::new(DatabaseService::new(config).await?);
        let solana = Arc::new(solana::SolanaService::new(config).await?);
        let metrics = Arc::new(MetricsService::new(config)?);

        let pool: PgPool = database.postgres.pool().clone();
        let redis = Arc::new(database.redis.clone());

        let providers: Vec<Arc<dyn HoneypotProvider>> = config
            .automation
            .honeypot
            .providers
            .iter()
            .map(build_honeypot_provider)
            .collect::<AppResult<Vec<_>>>()?;
        let onchain = Arc::new(OnChainLayer::new(Arc::clone(&solana)));
        let honeypot = Arc::new(HoneypotDetector::new(
            providers,
            onchain,
            config.automation.honeypot.clone(),
            Arc::clone(&redis),
            Arc::clone(&metrics),
        ));

        let config_store = Arc::new(SnipeConfigStore::new(pool.clone()));
        let execution_store = Arc::new(SnipeExecutionStore::new(pool.clone()));
        let lease_store = Arc::new(AutomationLeaseStore::new(
            Arc::clone(&redis),
            &config.automation.session_master_secret,
            Duration::from_secs(config.automation.lease_ttl_seconds),
        ));
        let rate_limiter = Arc::new(RateLimiter::new(Arc::clone(&redis)));
        let aggregator = Arc::new(AggregatorClient::new(&config.automation.aggregator)?);

        let bot = Bot::new(config.telegram.bot_token.clone());
        let notifier: Arc<dyn Notifier> = Arc::new(TelegramNotifier::new(
            bot,
            pool.clone(),
            config.automation.notifier.success_template.clone(),
        ));

        let executor = Arc::new(SnipeExecutor::new(
            Arc::clone(&execution_store),
            Arc::clone(&config_store),
            Arc::clone(&lease_store),
            Arc::clone(&rate_limiter),
            Arc::clone(&honeypot),
            Arc::clone(&aggregator),
            Arc::clone(&solana),
            Arc::clone(&notifier),
            Arc::clone(&metrics),
        ));

        info!("✅ Service container initialized successfully");

        Ok(Self {
            solana,
            database,
            metrics,
            honeypot,
            config_store,
            execution_store,
            lease_store,
            rate_limiter,
            aggregator,
            notifier,
            executor,
            orchestrator_cancel: Arc::new(parking_lot::Mutex::new(None)),
        })
    }

    /// Build the orchestrator and spawn its dispatch loop as a background
    /// task. Returns the join handle; the orchestrator's cancellation token
    /// is retained so [`Self::shutdown`] can stop it.
    pub fn spawn_orchestrator(&self, config: Arc<AppConfig>) -> tokio::task::JoinHandle<AppResult<()>> {
        let orchestrator = SnipeOrchestrator::new(
            Arc::clone(&self.config_store),
            Arc::clone(&self.executor),
            Arc::clone(&self.lease_store),
            Arc::new(self.database.redis.clone()),
            Arc::clone(&self.metrics),
            Arc::clone(&self.solana),
        );

        *self.orchestrator_cancel.lock() = Some(orchestrator.cancellation());

        tokio::spawn(orchestrator.run(config))
    }

    /// Signal the orchestrator's dispatch loop to stop. Callers should await
    /// the join handle returned by [`Self::spawn_orchestrator`] before
    /// calling [`Self::shutdown`], so in-flight executions finish against
    /// live backends.
    pub fn stop_orchestrator(&self) {
        if let Some(cancel) = self.orchestrator_cancel.lock().take() {
            cancel.cancel();
        }
    }

    /// Tear down backend connections. Call only after the orchestrator's
    /// join handle has completed.
    pub async fn shutdown(&self) -> AppResult<()> {
        info!("🛑 Shutting down services");

        self.solana.shutdown().await?;
        self.database.close().await?;
        self.metrics.flush().await?;

        info!("✅ Services shut down successfully");
        Ok(())
    }

    /// Health check for all services.
    pub async fn health_check(&self) -> std::collections::HashMap<String, crate::application::health::ComponentHealth> {
        let mut health_status = std::collections::HashMap::new();

        health_status.extend(self.solana.health_check().await);
        health_status.extend(self.database.health_check().await);

        health_status
    }
}
