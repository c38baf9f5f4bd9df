//! Automation services: the pieces that let a user's snipe configuration
//! execute unattended once a wallet key has been leased for a bounded
//! window (C1-C4, C8-C9 from the automation design).

pub mod aggregator;
pub mod config_store;
pub mod execution_store;
pub mod executor;
pub mod key_vault;
pub mod lease_store;
pub mod orchestrator;
pub mod rate_limiter;

pub use aggregator::AggregatorClient;
pub use config_store::SnipeConfigStore;
pub use execution_store::SnipeExecutionStore;
pub use executor::SnipeExecutor;
pub use key_vault::{EncryptedSecret, KeyVault};
pub use lease_store::AutomationLeaseStore;
pub use orchestrator::SnipeOrchestrator;
pub use rate_limiter::RateLimiter;
