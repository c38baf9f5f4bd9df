//! Token Discovery (C6)
//!
//! Subscribes to per-DEX log streams, parses balance deltas into
//! candidate [`NewTokenEvent`]s, and fans them into a single channel the
//! orchestrator consumes.

mod filters;
mod source;

pub use filters::{evaluate, try_claim};
pub use source::LogStreamSource;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::models::{AppConfig, DiscoveryConfig};
use crate::core::result::AppResult;
use crate::core::sniping::{DexSource, NewTokenEvent};
use crate::infrastructure::monitoring::metrics::MetricsService;
use crate::services::solana::SolanaService;

fn ws_url_for(config: &AppConfig) -> String {
    if let Some(url) = &config.solana.ws_url {
        return url.clone();
    }
    config
        .solana
        .rpc_url
        .replacen("https://", "wss://", 1)
        .replacen("http://", "ws://", 1)
}

fn program_ids_for(source: DexSource, discovery: &DiscoveryConfig) -> Vec<String> {
    discovery
        .program_id_overrides
        .get(source.config_key())
        .cloned()
        .unwrap_or_else(|| source.default_program_ids().iter().map(|s| s.to_string()).collect())
}

/// Owns one [`LogStreamSource`] worker task per [`DexSource`] and the
/// fan-in channel that feeds the orchestrator.
pub struct DiscoveryHub {
    handles: Vec<JoinHandle<()>>,
    cancel: CancellationToken,
}

impl DiscoveryHub {
    /// Spawn one worker task per configured DEX source, all feeding `out`.
    pub fn spawn(
        config: &AppConfig,
        solana: Arc<SolanaService>,
        metrics: Arc<MetricsService>,
        out: mpsc::Sender<NewTokenEvent>,
    ) -> Self {
        let cancel = CancellationToken::new();
        let ws_url = ws_url_for(config);
        let mut handles = Vec::with_capacity(DexSource::ALL.len());

        for &dex in DexSource::ALL.iter() {
            let program_ids = program_ids_for(dex, &config.automation.discovery);
            let source = LogStreamSource::new(
                dex,
                program_ids,
                ws_url.clone(),
                config.automation.discovery.clone(),
                Arc::clone(&solana),
                Arc::clone(&metrics),
            );
            let out = out.clone();
            let cancel = cancel.clone();

            info!("starting discovery worker for {}", dex);
            handles.push(tokio::spawn(async move {
                source.run(out, cancel).await;
            }));
        }

        Self { handles, cancel }
    }

    /// Signal all workers to stop and wait for them to exit.
    pub async fn shutdown(self) -> AppResult<()> {
        self.cancel.cancel();
        for handle in self.handles {
            let _ = handle.await;
        }
        Ok(())
    }
}

/// Per-source discovery counters, exposed for health/diagnostics.
#[derive(Debug, Default, Clone)]
pub struct DiscoveryStats {
    pub events_by_source: HashMap<DexSource, u64>,
}
