//! Metrics collection and reporting service
//!
//! Thin wrapper around the `metrics` facade crate, with a Prometheus
//! exporter installed when the crate's `metrics` feature is enabled.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant, SystemTime};

use metrics::{counter, gauge, histogram, Label};
#[cfg(feature = "metrics")]
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{debug, info, instrument};

use crate::application::health::ComponentHealth;
use crate::config::AppConfig;
use crate::core::result::AppResult;

#[cfg(feature = "metrics")]
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn to_labels(labels: Option<HashMap<String, String>>) -> Vec<Label> {
    labels
        .unwrap_or_default()
        .into_iter()
        .map(|(k, v)| Label::new(k, v))
        .collect()
}

/// Metrics service for collecting and exposing application metrics
#[derive(Debug, Clone)]
pub struct MetricsService {
    config: Arc<AppConfig>,
    start_time: SystemTime,
}

impl MetricsService {
    /// Create a new metrics service, installing the Prometheus recorder
    /// exactly once per process.
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        info!("initializing metrics service");

        #[cfg(feature = "metrics")]
        {
            if PROMETHEUS_HANDLE.get().is_none() {
                let builder = PrometheusBuilder::new();
                let handle = builder
                    .install_recorder()
                    .map_err(|e| crate::core::error::AppError::internal(format!("failed to install prometheus recorder: {e}")))?;
                let _ = PROMETHEUS_HANDLE.set(handle);
            }
        }

        Ok(Self { config: Arc::new(config.clone()), start_time: SystemTime::now() })
    }

    /// Increment a named counter
    pub fn increment_counter(&self, name: &'static str, labels: Option<HashMap<String, String>>) {
        counter!(name, to_labels(labels)).increment(1);
    }

    /// Add value to histogram
    pub fn record_histogram(&self, name: &'static str, value: f64, labels: Option<HashMap<String, String>>) {
        histogram!(name, to_labels(labels)).record(value);
    }

    /// Set gauge value
    pub fn set_gauge(&self, name: &'static str, value: f64, labels: Option<HashMap<String, String>>) {
        gauge!(name, to_labels(labels)).set(value);
    }

    /// Record a timer measurement as seconds
    pub fn record_timer(&self, name: &'static str, duration: Duration, labels: Option<HashMap<String, String>>) {
        self.record_histogram(name, duration.as_secs_f64(), labels);
    }

    /// Start a timer
    pub fn start_timer(&self, name: &'static str) -> Timer {
        Timer::new(name, self.clone())
    }

    /// Record trade metrics
    #[instrument(skip(self))]
    pub fn record_trade(&self, success: bool, execution_time: Duration, dex: &str, pnl_sol: f64) {
        let mut labels = HashMap::new();
        labels.insert("dex".to_string(), dex.to_string());
        labels.insert("success".to_string(), success.to_string());

        self.increment_counter("sniper_bot_trades_total", Some(labels.clone()));
        self.record_timer("sniper_bot_trade_execution_duration_seconds", execution_time, Some(labels.clone()));

        if success {
            self.set_gauge("sniper_bot_trade_pnl_sol", pnl_sol, Some(labels));
        } else {
            self.increment_counter("sniper_bot_trade_failures_total", Some(labels));
        }

        debug!(success, ms = execution_time.as_millis(), dex, pnl_sol, "recorded trade metrics");
    }

    /// Record token detection metrics
    #[instrument(skip(self))]
    pub fn record_token_detection(&self, detection_time: Duration, tokens_found: u32, source: &str) {
        let mut labels = HashMap::new();
        labels.insert("source".to_string(), source.to_string());

        self.record_timer("sniper_bot_token_detection_duration_seconds", detection_time, Some(labels.clone()));
        self.set_gauge("sniper_bot_tokens_detected_total", f64::from(tokens_found), Some(labels));
    }

    /// Record error metrics
    #[instrument(skip(self))]
    pub fn record_error(&self, error_type: &str, component: &str) {
        let mut labels = HashMap::new();
        labels.insert("error_type".to_string(), error_type.to_string());
        labels.insert("component".to_string(), component.to_string());

        self.increment_counter("sniper_bot_errors_total", Some(labels));
    }

    /// `discovery_events_total{source,outcome}`
    pub fn record_discovery_event(&self, source: &str, outcome: &str) {
        let mut labels = HashMap::new();
        labels.insert("source".to_string(), source.to_string());
        labels.insert("outcome".to_string(), outcome.to_string());
        self.increment_counter("discovery_events_total", Some(labels));
    }

    /// `dedup_drops_total{source}`
    pub fn record_dedup_drop(&self, source: &str) {
        let mut labels = HashMap::new();
        labels.insert("source".to_string(), source.to_string());
        self.increment_counter("dedup_drops_total", Some(labels));
    }

    /// `filter_rejections_total{reason}`
    pub fn record_filter_rejection(&self, reason: &str) {
        let mut labels = HashMap::new();
        labels.insert("reason".to_string(), reason.to_string());
        self.increment_counter("filter_rejections_total", Some(labels));
    }

    /// `honeypot_cache_total{result}`
    pub fn record_honeypot_cache(&self, hit: bool) {
        let mut labels = HashMap::new();
        labels.insert("result".to_string(), if hit { "hit" } else { "miss" }.to_string());
        self.increment_counter("honeypot_cache_total", Some(labels));
    }

    /// `honeypot_provider_errors_total{provider}`
    pub fn record_honeypot_provider_error(&self, provider: &str) {
        let mut labels = HashMap::new();
        labels.insert("provider".to_string(), provider.to_string());
        self.increment_counter("honeypot_provider_errors_total", Some(labels));
    }

    /// `rate_limit_rejections_total{window}`
    pub fn record_rate_limit_rejection(&self, window: &str) {
        let mut labels = HashMap::new();
        labels.insert("window".to_string(), window.to_string());
        self.increment_counter("rate_limit_rejections_total", Some(labels));
    }

    /// `automation_lease_failure_total{reason}`
    pub fn record_lease_failure(&self, reason: &str) {
        let mut labels = HashMap::new();
        labels.insert("reason".to_string(), reason.to_string());
        self.increment_counter("automation_lease_failure_total", Some(labels));
    }

    /// `executions_total{status}`
    pub fn record_execution(&self, status: &str) {
        let mut labels = HashMap::new();
        labels.insert("status".to_string(), status.to_string());
        self.increment_counter("executions_total", Some(labels));
    }

    /// `swap_latency_ms` histogram
    pub fn record_swap_latency(&self, ms: f64) {
        self.record_histogram("swap_latency_ms", ms, None);
    }

    /// `honeypot_analysis_latency_ms` histogram
    pub fn record_honeypot_latency(&self, ms: f64) {
        self.record_histogram("honeypot_analysis_latency_ms", ms, None);
    }

    /// Update system metrics
    #[instrument(skip(self))]
    pub async fn update_system_metrics(&self) {
        if let Ok(elapsed) = self.start_time.elapsed() {
            self.set_gauge("sniper_bot_uptime_seconds", elapsed.as_secs() as f64, None);
        }
    }

    /// Export metrics in Prometheus format
    pub async fn export_prometheus(&self) -> String {
        #[cfg(feature = "metrics")]
        {
            if let Some(handle) = PROMETHEUS_HANDLE.get() {
                return handle.render();
            }
        }
        String::new()
    }

    /// Get metrics summary (best-effort: the `metrics` facade does not
    /// expose the registry directly, so this reports the rendered text size)
    pub async fn get_summary(&self) -> MetricsSummary {
        let rendered = self.export_prometheus().await;
        MetricsSummary { total_metrics: rendered.lines().filter(|l| !l.starts_with('#')).count() }
    }

    /// Health check for metrics service
    pub async fn health_check(&self) -> ComponentHealth {
        let mut component = ComponentHealth::new("metrics".to_string(), false);
        let start = Instant::now();

        let summary = self.get_summary().await;
        let response_time = start.elapsed().as_millis() as u64;

        component.mark_healthy(
            Some(format!("metrics service healthy, {} series observed", summary.total_metrics)),
            Some(response_time),
        );

        component
    }

    /// Flush metrics (prepare for shutdown)
    pub async fn flush(&self) -> AppResult<()> {
        info!("flushing metrics");
        Ok(())
    }
}

/// RAII timer: records elapsed wall time as a histogram observation on drop
/// unless explicitly stopped first.
#[derive(Debug)]
pub struct Timer {
    name: &'static str,
    start_time: Instant,
    service: MetricsService,
}

impl Timer {
    fn new(name: &'static str, service: MetricsService) -> Self {
        Self { name, start_time: Instant::now(), service }
    }

    /// Stop the timer and record the measurement
    pub fn stop(self) {
        let duration = self.start_time.elapsed();
        self.service.record_histogram(self.name, duration.as_secs_f64(), None);
    }

    /// Stop the timer with labels and record the measurement
    pub fn stop_with_labels(self, labels: HashMap<String, String>) {
        let duration = self.start_time.elapsed();
        self.service.record_histogram(self.name, duration.as_secs_f64(), Some(labels));
    }
}

/// Metrics summary
#[derive(Debug, Clone)]
pub struct MetricsSummary {
    pub total_metrics: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;

    #[tokio::test]
    async fn test_metrics_service_creation() {
        let config = ConfigLoader::new().without_env().create_default_config();
        let metrics_service = MetricsService::new(&config);
        assert!(metrics_service.is_ok());
    }

    #[tokio::test]
    async fn test_domain_recorders_do_not_panic() {
        let config = ConfigLoader::new().without_env().create_default_config();
        let service = MetricsService::new(&config).unwrap();

        service.record_discovery_event("pump_fun", "emitted");
        service.record_dedup_drop("pump_fun");
        service.record_filter_rejection("liquidity_below_min");
        service.record_honeypot_cache(true);
        service.record_honeypot_provider_error("goplus");
        service.record_rate_limit_rejection("hour");
        service.record_lease_failure("expired");
        service.record_execution("success");
        service.record_swap_latency(123.0);
        service.record_honeypot_latency(456.0);
    }
}
