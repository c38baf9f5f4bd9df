//! Main application structure and lifecycle management
//!
//! This module contains the core Application struct that coordinates all services
//! and manages the application lifecycle from startup to shutdown.

use anyhow::Result;
use std::sync::Arc;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use tokio::sync::RwLock;
use tracing::{info, warn, error, debug, instrument};

use crate::config::AppConfig;
use crate::core::result::AppResult;
use crate::core::error::AppError;
use crate::infrastructure::monitoring::metrics::MetricsService;
use crate::services::ServiceContainer;
use super::health::{HealthService, HealthStatus};

/// `GET /metrics` — Prometheus text exposition of every counter/histogram/
/// gauge the automation pipeline (C1-C12) has recorded.
async fn metrics_handler(State(metrics): State<Arc<MetricsService>>) -> impl IntoResponse {
    (
        [("content-type", "text/plain; version=0.0.4")],
        metrics.export_prometheus().await,
    )
}

/// `GET /health` — aggregate health of every probed component (database,
/// Redis, Solana RPC, Helius, and the external notifier/market-data APIs).
/// Returns 503 when any critical component is unhealthy so orchestration
/// platforms can act on it.
async fn health_handler(State(health_service): State<Arc<HealthService>>) -> impl IntoResponse {
    let overall = health_service.get_overall_health().await;
    let components = health_service.get_all_component_health().await;

    let status_code = match overall {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        HealthStatus::Starting => StatusCode::OK,
    };

    (
        status_code,
        Json(serde_json::json!({
            "status": overall,
            "components": components,
        })),
    )
}

/// `GET /health/:component` — health of a single named component (e.g.
/// `database`, `redis`, `solana_rpc`), 404 if unknown.
async fn component_health_handler(
    State(health_service): State<Arc<HealthService>>,
    Path(component): Path<String>,
) -> impl IntoResponse {
    match health_service.get_component_health(&component).await {
        Some(component) => (StatusCode::OK, Json(component)).into_response(),
        None => (StatusCode::NOT_FOUND, format!("unknown component: {component}")).into_response(),
    }
}

/// Resolves on SIGTERM/SIGINT (unix) or Ctrl+C (windows), whichever fires
/// first. Lives inside [`Application::run`] so the shutdown path always
/// goes through [`Application::shutdown`] with `self` still owned.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("failed to register SIGTERM handler");
        let mut sigint = signal(SignalKind::interrupt()).expect("failed to register SIGINT handler");

        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }

    #[cfg(windows)]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// Main application state and coordinator
pub struct Application {
    /// Application configuration
    config: Arc<AppConfig>,

    /// Health service for monitoring
    health_service: Arc<HealthService>,

    /// Wired C1-C11 automation services
    services: Arc<ServiceContainer>,

    /// Join handle of the background orchestrator dispatch loop, populated
    /// once [`Self::run`] spawns it
    orchestrator_handle: Arc<RwLock<Option<tokio::task::JoinHandle<AppResult<()>>>>>,

    /// Application state
    state: Arc<RwLock<ApplicationState>>,
}

/// Application runtime state
#[derive(Debug, Clone)]
pub struct ApplicationState {
    /// Whether the application is running
    pub is_running: bool,

    /// Whether the application is shutting down
    pub is_shutting_down: bool,

    /// Start timestamp
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// Last health check timestamp
    pub last_health_check: Option<chrono::DateTime<chrono::Utc>>,

    /// Current health status
    pub health_status: HealthStatus,
}

impl Default for ApplicationState {
    fn default() -> Self {
        Self {
            is_running: false,
            is_shutting_down: false,
            started_at: chrono::Utc::now(),
            last_health_check: None,
            health_status: HealthStatus::Starting,
        }
    }
}

impl Application {
    /// Build a new application instance with the given configuration
    #[instrument(skip(config))]
    pub async fn build(config: AppConfig) -> AppResult<Self> {
        info!("🏗️  Building application instance");

        // Validate configuration before proceeding
        let validation_result = config.validate()?;
        if !validation_result.is_valid {
            return Err(AppError::config(format!(
                "Configuration validation failed: {:?}",
                validation_result.errors
            )));
        }

        if !validation_result.warnings.is_empty() {
            for warning in &validation_result.warnings {
                warn!("⚠️  Configuration warning: {}", warning);
            }
        }

        let config = Arc::new(config);

        // Initialize health service
        let health_service = Arc::new(HealthService::new(config.clone()));

        // Wire the automation services (C1-C11)
        let services = Arc::new(ServiceContainer::initialize(&config).await?);

        // Attach the live services so health probes hit real backends
        // instead of validating config shape alone
        health_service.set_services(Arc::clone(&services)).await;

        // Initialize application state
        let state = Arc::new(RwLock::new(ApplicationState::default()));

        let app = Self {
            config,
            health_service,
            services,
            orchestrator_handle: Arc::new(RwLock::new(None)),
            state,
        };

        info!("✅ Application instance built successfully");
        Ok(app)
    }

    /// Run the application main loop
    #[instrument(skip(self))]
    pub async fn run(self) -> AppResult<()> {
        info!("🚀 Starting Solana Sniper Bot application");

        // Update state to running
        {
            let mut state = self.state.write().await;
            state.is_running = true;
            state.health_status = HealthStatus::Healthy;
        }

        // Start health service
        let health_service = self.health_service.clone();
        let health_task = tokio::spawn(async move {
            if let Err(e) = health_service.start().await {
                error!("Health service failed: {}", e);
            }
        });

        // Start the snipe orchestrator (C9), which fans discovery (C6) out
        // to execution (C8) for every enabled user config
        {
            let handle = self.services.spawn_orchestrator(Arc::clone(&self.config));
            *self.orchestrator_handle.write().await = Some(handle);
        }

        // Start core services based on configuration
        let mut service_handles = Vec::new();

        // Start metrics server if enabled
        if self.config.analytics.enable_metrics {
            info!("📊 Starting metrics server on port {}", self.config.analytics.metrics_port);
            let metrics_handle = self.start_metrics_server().await?;
            service_handles.push(metrics_handle);
        }

        // Start health check server if enabled
        if self.config.monitoring.enable_health_checks {
            info!("🔍 Starting health check server on port {}", self.config.monitoring.health_check_port);
            let health_handle = self.start_health_server().await?;
            service_handles.push(health_handle);
        }

        info!("✅ All services started successfully");
        info!("🎯 Solana Sniper Bot is now running in {} mode", self.config.trading.scenario_mode);

        // Main application loop
        let main_loop = async {
            loop {
                // Check if we should shut down
                {
                    let state = self.state.read().await;
                    if state.is_shutting_down {
                        break;
                    }
                }

                // Perform periodic health checks
                if let Err(e) = self.perform_health_check().await {
                    warn!("Health check failed: {}", e);
                }

                // Sleep for a short interval
                tokio::time::sleep(tokio::time::Duration::from_secs(1)).await;
            }
        };

        // Wait for the main loop, the health service, or an OS shutdown
        // signal (SIGTERM/SIGINT/Ctrl+C) — whichever comes first. Racing
        // the signal here, rather than one level up in `main`, keeps `self`
        // alive so the orchestrator and backend connections always go
        // through the same graceful `shutdown()` path below.
        tokio::select! {
            _ = main_loop => {
                info!("Main application loop completed");
            }
            result = health_task => {
                match result {
                    Ok(_) => info!("Health service completed"),
                    Err(e) => error!("Health service task failed: {}", e),
                }
            }
            _ = shutdown_signal() => {
                warn!("🛑 Shutdown signal received");
            }
        }

        // Graceful shutdown
        self.shutdown().await?;

        info!("👋 Solana Sniper Bot application stopped");
        Ok(())
    }

    /// Start the Prometheus metrics server, exposing `GET /metrics`.
    async fn start_metrics_server(&self) -> AppResult<tokio::task::JoinHandle<()>> {
        let port = self.config.analytics.metrics_port;
        let metrics = Arc::clone(&self.services.metrics);

        let app = axum::Router::new()
            .route("/metrics", axum::routing::get(metrics_handler))
            .with_state(metrics);

        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::internal(format!("failed to bind metrics server on {addr}: {e}")))?;

        let handle = tokio::spawn(async move {
            info!("📊 Metrics server listening on {}", addr);
            if let Err(e) = axum::serve(listener, app).await {
                error!("Metrics server stopped: {}", e);
            }
        });

        Ok(handle)
    }

    /// Start the health check server, exposing `GET /health` and
    /// `GET /health/:component`.
    async fn start_health_server(&self) -> AppResult<tokio::task::JoinHandle<()>> {
        let port = self.config.monitoring.health_check_port;
        let health_service = self.health_service.clone();

        let app = axum::Router::new()
            .route("/health", axum::routing::get(health_handler))
            .route("/health/:component", axum::routing::get(component_health_handler))
            .with_state(health_service);

        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::internal(format!("failed to bind health server on {addr}: {e}")))?;

        let handle = tokio::spawn(async move {
            info!("🔍 Health check server listening on {}", addr);
            if let Err(e) = axum::serve(listener, app).await {
                error!("Health check server stopped: {}", e);
            }
        });

        Ok(handle)
    }

    /// Perform a health check on all components
    async fn perform_health_check(&self) -> AppResult<()> {
        let health_status = self.health_service.get_overall_health().await;

        // Update state with health status
        {
            let mut state = self.state.write().await;
            state.last_health_check = Some(chrono::Utc::now());
            state.health_status = health_status;
        }

        match health_status {
            HealthStatus::Healthy => {
                debug!("✅ All systems healthy");
            }
            HealthStatus::Degraded => {
                warn!("⚠️  System degraded - some components unhealthy");
            }
            HealthStatus::Unhealthy => {
                error!("❌ System unhealthy - critical components failed");
            }
            HealthStatus::Starting => {
                debug!("🔄 System starting up");
            }
        }

        Ok(())
    }

    /// Initiate graceful shutdown
    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> AppResult<()> {
        info!("🛑 Initiating graceful shutdown");

        // Mark as shutting down
        {
            let mut state = self.state.write().await;
            state.is_shutting_down = true;
            state.is_running = false;
        }

        // Stop the orchestrator and drain its discovery workers before
        // tearing down the backends it depends on
        self.services.stop_orchestrator();

        if let Some(handle) = self.orchestrator_handle.write().await.take() {
            match handle.await {
                Ok(Ok(())) => debug!("orchestrator stopped cleanly"),
                Ok(Err(e)) => warn!("orchestrator stopped with error: {}", e),
                Err(e) => warn!("orchestrator task panicked: {}", e),
            }
        }

        if let Err(e) = self.services.shutdown().await {
            warn!("Failed to shut down services cleanly: {}", e);
        }

        // Stop health service
        if let Err(e) = self.health_service.stop().await {
            warn!("Failed to stop health service cleanly: {}", e);
        }

        info!("✅ Graceful shutdown completed");
        Ok(())
    }

    /// Access the wired service container, e.g. for direct config-store
    /// writes from the Telegram command layer.
    pub fn services(&self) -> &Arc<ServiceContainer> {
        &self.services
    }

    /// Get current application state
    pub async fn get_state(&self) -> ApplicationState {
        self.state.read().await.clone()
    }

    /// Get application configuration
    pub fn get_config(&self) -> &AppConfig {
        &self.config
    }

    /// Check if application is running
    pub async fn is_running(&self) -> bool {
        self.state.read().await.is_running
    }

    /// Check if application is shutting down
    pub async fn is_shutting_down(&self) -> bool {
        self.state.read().await.is_shutting_down
    }

    /// Get current health status
    pub async fn get_health_status(&self) -> HealthStatus {
        self.state.read().await.health_status
    }

    /// Get application uptime
    pub async fn get_uptime(&self) -> chrono::Duration {
        let state = self.state.read().await;
        chrono::Utc::now() - state.started_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;

    #[tokio::test]
    async fn test_application_build() {
        // Create a minimal test configuration
        let config = ConfigLoader::new().without_env().create_default_config();

        let app_result = Application::build(config).await;
        assert!(app_result.is_ok());

        let app = app_result.unwrap();
        assert!(!app.is_running().await);
        assert!(!app.is_shutting_down().await);
    }

    #[tokio::test]
    async fn test_application_state() {
        let config = ConfigLoader::new().without_env().create_default_config();
        let app = Application::build(config).await.unwrap();

        let state = app.get_state().await;
        assert!(!state.is_running);
        assert!(!state.is_shutting_down);
        assert!(matches!(state.health_status, HealthStatus::Starting));
    }

    #[tokio::test]
    async fn test_application_configuration_access() {
        let config = ConfigLoader::new().without_env().create_default_config();
        let expected_env = config.environment.name.clone();

        let app = Application::build(config).await.unwrap();

        assert_eq!(app.get_config().environment.name, expected_env);
    }

    #[tokio::test]
    async fn test_application_shutdown() {
        let config = ConfigLoader::new().without_env().create_default_config();
        let app = Application::build(config).await.unwrap();

        // Test shutdown
        let shutdown_result = app.shutdown().await;
        assert!(shutdown_result.is_ok());

        assert!(app.is_shutting_down().await);
        assert!(!app.is_running().await);
    }
}