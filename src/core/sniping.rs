//! Domain entities and value objects for the automated sniping pipeline
//!
//! These types model the data described in the sniping engine's data model:
//! discovered tokens, per-user configuration, automation leases, honeypot
//! screening results, and the append-only execution record. They complement
//! [`crate::core::types`] rather than replacing it — the 1-10 trading
//! `RiskScore` there is a distinct scale from the 0-100 [`HoneypotRiskScore`]
//! defined here.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::core::error::AppError;
use crate::core::types::{Timestamp, TokenAddress};

/// Unique identifier for a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a wallet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WalletId(pub Uuid);

impl WalletId {
    /// Create a new random wallet ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WalletId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WalletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a snipe execution (append-only fact row)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecutionId(pub Uuid);

impl ExecutionId {
    /// Create a new random execution ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ExecutionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lamport amount (1 SOL = 1_000_000_000 lamports)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LamportAmount(pub u64);

impl LamportAmount {
    /// Construct a lamport amount; any u64 value is valid (zero included)
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw lamport value
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Convert to a SOL-denominated decimal for display/analytics
    pub fn to_sol(&self) -> rust_decimal::Decimal {
        rust_decimal::Decimal::from(self.0) / rust_decimal_macros::dec!(1_000_000_000)
    }
}

impl fmt::Display for LamportAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} lamports", self.0)
    }
}

/// Slippage tolerance in basis points, validated to `[1, 10000]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlippageBps(pub u16);

impl SlippageBps {
    /// Create a validated slippage-bps value
    pub fn new(bps: u16) -> Result<Self, AppError> {
        if bps == 0 || bps > 10_000 {
            return Err(AppError::validation(format!(
                "slippageBps must be within [1, 10000], got {bps}"
            )));
        }
        Ok(Self(bps))
    }

    /// Raw basis-points value
    pub fn value(&self) -> u16 {
        self.0
    }

    /// As a fraction of 1.0 (e.g. 100 bps -> 0.01)
    pub fn to_ratio(&self) -> f64 {
        f64::from(self.0) / 10_000.0
    }
}

impl fmt::Display for SlippageBps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bps", self.0)
    }
}

/// Honeypot risk score on a 0-100 scale, distinct from [`crate::core::types::RiskScore`]'s
/// 1-10 trading-risk scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HoneypotRiskScore(pub u8);

impl HoneypotRiskScore {
    /// Construct a score, clamping to `[0, 100]`
    pub fn new(score: u8) -> Result<Self, AppError> {
        if score > 100 {
            return Err(AppError::validation(format!(
                "riskScore must be within [0, 100], got {score}"
            )));
        }
        Ok(Self(score))
    }

    /// The maximum possible score, used for conclusive honeypot signals
    pub fn max() -> Self {
        Self(100)
    }

    /// The minimum possible score, used for whitelisted tokens
    pub fn min() -> Self {
        Self(0)
    }

    /// Raw score value
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Whether this score is below `threshold` (the "safe" / low-risk side)
    pub fn is_low_risk(&self, medium_risk_threshold: u8) -> bool {
        self.0 < medium_risk_threshold
    }
}

impl fmt::Display for HoneypotRiskScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/100", self.0)
    }
}

/// The closed set of DEX programs the discovery pipeline subscribes to.
///
/// Modeled as a tagged union per the design notes: the base subscribe /
/// queue / throttle / dispatch pipeline is shared across all six variants,
/// which differ only in program IDs and log/account parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DexSource {
    /// Raydium AMM V4
    RaydiumV4,
    /// Raydium concentrated-liquidity market maker
    RaydiumClmm,
    /// Orca Whirlpool
    Orca,
    /// Meteora dynamic/DLMM pools
    Meteora,
    /// Pump.fun bonding-curve launches
    PumpFun,
    /// PumpSwap (Pump.fun's AMM graduation venue)
    PumpSwap,
}

impl DexSource {
    /// All known sources, in a stable order
    pub const ALL: [DexSource; 6] = [
        DexSource::RaydiumV4,
        DexSource::RaydiumClmm,
        DexSource::Orca,
        DexSource::Meteora,
        DexSource::PumpFun,
        DexSource::PumpSwap,
    ];

    /// The configuration key used for per-source environment overrides
    /// (`SNIPE_{SOURCE}_PROGRAM_IDS`).
    pub fn config_key(&self) -> &'static str {
        match self {
            Self::RaydiumV4 => "raydium_v4",
            Self::RaydiumClmm => "raydium_clmm",
            Self::Orca => "orca",
            Self::Meteora => "meteora",
            Self::PumpFun => "pumpfun",
            Self::PumpSwap => "pumpswap",
        }
    }

    /// The hardcoded default mainnet program ID(s) for this source, used
    /// when no environment override is configured.
    pub fn default_program_ids(&self) -> &'static [&'static str] {
        match self {
            Self::RaydiumV4 => &["675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8"],
            Self::RaydiumClmm => &["CAMMCzo5YL8w4VFF8KVHrK22GGUsp5VTaW7grrKgrWqK"],
            Self::Orca => &["whirLbMiicVdio4qvUfM5KAg6Ct8VwpYzGff3uctyCc"],
            Self::Meteora => &["LBUZKhRxPF3XUpBCjp4YzTKgLccjZhTSDM9YuVaPwxo"],
            Self::PumpFun => &["6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P"],
            Self::PumpSwap => &["pAMMBay6oceH9fJKBRHGP5D4bD4sWpmSwMn52FMfXEA"],
        }
    }
}

impl fmt::Display for DexSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.config_key())
    }
}

impl FromStr for DexSource {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "raydium_v4" | "raydium-v4" => Ok(Self::RaydiumV4),
            "raydium_clmm" | "raydium-clmm" => Ok(Self::RaydiumClmm),
            "orca" => Ok(Self::Orca),
            "meteora" => Ok(Self::Meteora),
            "pumpfun" | "pump_fun" | "pump.fun" => Ok(Self::PumpFun),
            "pumpswap" | "pump_swap" => Ok(Self::PumpSwap),
            _ => Err(AppError::validation(format!("Invalid discovery source: {s}"))),
        }
    }
}

/// An immutable event materialised by a discovery source the moment a new
/// token's liquidity pool is observed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTokenEvent {
    /// Which DEX program produced this event
    pub source: DexSource,
    /// The mint address of the candidate new token
    pub mint: TokenAddress,
    /// Token name, if resolvable from metadata
    pub name: Option<String>,
    /// Token symbol, if resolvable from metadata
    pub symbol: Option<String>,
    /// Quote-side (SOL/WSOL) liquidity delta, clamped at zero
    pub liquidity_lamports: u64,
    /// USD market cap in integer cents, if derivable from stablecoin deltas
    pub market_cap_usd: Option<u64>,
    /// The transaction signature this event was derived from
    pub tx: String,
    /// When the event was materialised
    pub timestamp: Timestamp,
}

/// Per-user configuration for the automated sniping pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnipeConfig {
    /// The owning user
    pub user_id: UserId,
    /// Master toggle; orchestrator skips users with `enabled = false`
    pub enabled: bool,
    /// Whether automated execution is armed (vs. notify-only)
    pub auto_trading: bool,
    /// Sources this user wants events from
    pub enabled_sources: HashSet<DexSource>,
    /// Amount to spend per snipe, in lamports
    pub buy_amount_lamports: u64,
    /// Slippage tolerance for the swap
    pub slippage_bps: SlippageBps,
    /// Minimum acceptable quote-side liquidity
    pub min_liquidity_lamports: Option<u64>,
    /// Maximum acceptable quote-side liquidity
    pub max_liquidity_lamports: Option<u64>,
    /// Minimum acceptable market cap, USD
    pub min_market_cap_usd: Option<u64>,
    /// Maximum acceptable market cap, USD
    pub max_market_cap_usd: Option<u64>,
    /// Mints this user always allows, bypassing other filters except blacklist
    pub whitelist: HashSet<String>,
    /// Mints this user never trades
    pub blacklist: HashSet<String>,
    /// Maximum honeypot risk score (0-100) this user will tolerate
    pub max_honeypot_risk: HoneypotRiskScore,
    /// Whether to notify on successful snipes
    pub notify_on_success: bool,
    /// Whether to notify on failed/skipped snipes
    pub notify_on_failure: bool,
    /// When automation last fired for this user
    pub last_automation_at: Option<Timestamp>,
}

impl SnipeConfig {
    /// Validate the structural invariants named in the data model.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.buy_amount_lamports == 0 {
            return Err(AppError::validation("buyAmountLamports must be > 0"));
        }

        if let (Some(min), Some(max)) = (self.min_liquidity_lamports, self.max_liquidity_lamports) {
            if min > max {
                return Err(AppError::validation("minLiquidityLamports must be <= maxLiquidityLamports"));
            }
        }

        if let (Some(min), Some(max)) = (self.min_market_cap_usd, self.max_market_cap_usd) {
            if min > max {
                return Err(AppError::validation("minMarketCapUsd must be <= maxMarketCapUsd"));
            }
        }

        Ok(())
    }
}

/// A TTL-bounded, encrypted signing-key lease used to execute automated
/// buys without holding a plaintext key anywhere but in-memory, briefly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationLease {
    /// The owning user
    pub user_id: UserId,
    /// The wallet this lease authorizes spending from
    pub wallet_id: WalletId,
    /// AES-256-GCM ciphertext of the 64-byte Ed25519 secret key
    pub ciphertext: Vec<u8>,
    /// 12-byte GCM nonce/IV
    pub iv: [u8; 12],
    /// 16-byte GCM authentication tag
    pub auth_tag: [u8; 16],
    /// When this lease expires
    pub expires_at: Timestamp,
}

impl AutomationLease {
    /// Whether the lease has expired as of `now`
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now.into_inner() >= self.expires_at.into_inner()
    }
}

/// A decrypted lease, returned to the caller who must zeroise `secret`
/// after use.
#[derive(Debug, Clone)]
pub struct DecryptedLease {
    /// The wallet this lease authorizes spending from
    pub wallet_id: WalletId,
    /// The raw 64-byte Ed25519 secret key material
    pub secret: Vec<u8>,
    /// When this lease expires
    pub expires_at: Timestamp,
}

/// A single honeypot provider's or the on-chain layer's flags contributing
/// to the aggregated [`HoneypotResult`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoneypotSubResult {
    /// Name of the contributing layer ("goplus", "honeypot_is", "onchain", ...)
    pub layer: String,
    /// That layer's own risk score, 0-100, if it returned successfully
    pub score: Option<u8>,
    /// Flags raised by this layer
    pub flags: Vec<String>,
    /// Whether the layer returned without error
    pub succeeded: bool,
}

/// The aggregated outcome of screening a token mint for honeypot risk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoneypotResult {
    /// The token mint that was screened
    pub token_mint: TokenAddress,
    /// Whether this mint is considered an outright honeypot
    pub is_honeypot: bool,
    /// Aggregated risk score, 0-100
    pub risk_score: HoneypotRiskScore,
    /// Confidence in the result: fraction of layers that succeeded, 0-100
    pub confidence: u8,
    /// Union of flags raised across all contributing layers
    pub flags: HashSet<String>,
    /// When this result was computed
    pub checked_at: Timestamp,
    /// Wall-clock time the analysis took
    pub analysis_time_ms: u64,
    /// Individual layer contributions, for diagnostics
    pub sub_results: Vec<HoneypotSubResult>,
}

/// Terminal and intermediate states of a [`SnipeExecution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExecutionStatus {
    /// Row created, rate limit passed, not yet screened
    Pending,
    /// Honeypot screening and lease load in progress
    Analyzing,
    /// Quote+swap in flight
    Executing,
    /// Swap submitted and confirmed
    Success,
    /// Terminal failure; no further automatic retry
    Failed,
    /// Deliberately not executed due to policy (honeypot risk, filters)
    Skipped,
}

impl ExecutionStatus {
    /// Whether this status is a terminal state that will never transition further
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failed | Self::Skipped)
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Analyzing => write!(f, "ANALYZING"),
            Self::Executing => write!(f, "EXECUTING"),
            Self::Success => write!(f, "SUCCESS"),
            Self::Failed => write!(f, "FAILED"),
            Self::Skipped => write!(f, "SKIPPED"),
        }
    }
}

/// An append-only fact recording one attempted snipe for `(user, event)`.
///
/// Rows before a terminal status are updated in place (status/timestamp
/// columns); once `status` reaches SUCCESS/FAILED/SKIPPED the row is never
/// written to again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnipeExecution {
    /// Unique identifier for this execution
    pub id: ExecutionId,
    /// The owning user
    pub user_id: UserId,
    /// The token mint this execution targets
    pub token_mint: TokenAddress,
    /// Current state-machine status
    pub status: ExecutionStatus,
    /// Amount requested to spend, in lamports
    pub buy_amount_lamports: u64,
    /// When the underlying discovery event was observed
    pub discovered_at: Timestamp,
    /// Quote-side liquidity reported by the discovery event
    pub liquidity_lamports: u64,
    /// USD market cap reported by the discovery event, if any
    pub market_cap_usd: Option<u64>,
    /// Honeypot score recorded at screening time
    pub honeypot_score: Option<HoneypotRiskScore>,
    /// When honeypot screening completed
    pub analyzed_at: Option<Timestamp>,
    /// How long honeypot screening took
    pub analysis_duration_ms: Option<u64>,
    /// Slippage actually used for the swap
    pub slippage_bps: Option<SlippageBps>,
    /// The submitted transaction signature, once known
    pub transaction_signature: Option<String>,
    /// Output token amount received, once known
    pub output_amount_tokens: Option<rust_decimal::Decimal>,
    /// When the swap was submitted
    pub executed_at: Option<Timestamp>,
    /// When the swap was confirmed on-chain
    pub confirmed_at: Option<Timestamp>,
    /// Human-readable reason for FAILED/SKIPPED terminal states
    pub failure_reason: Option<String>,
}

impl SnipeExecution {
    /// Construct a freshly PENDING execution row for a just-observed event.
    pub fn pending(user_id: UserId, event: &NewTokenEvent, buy_amount_lamports: u64) -> Self {
        Self {
            id: ExecutionId::new(),
            user_id,
            token_mint: event.mint.clone(),
            status: ExecutionStatus::Pending,
            buy_amount_lamports,
            discovered_at: event.timestamp,
            liquidity_lamports: event.liquidity_lamports,
            market_cap_usd: event.market_cap_usd,
            honeypot_score: None,
            analyzed_at: None,
            analysis_duration_ms: None,
            slippage_bps: None,
            transaction_signature: None,
            output_amount_tokens: None,
            executed_at: None,
            confirmed_at: None,
            failure_reason: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_honeypot_risk_score_bounds() {
        assert!(HoneypotRiskScore::new(0).is_ok());
        assert!(HoneypotRiskScore::new(100).is_ok());
        assert!(HoneypotRiskScore::new(101).is_err());
    }

    #[test]
    fn test_slippage_bps_bounds() {
        assert!(SlippageBps::new(0).is_err());
        assert!(SlippageBps::new(1).is_ok());
        assert!(SlippageBps::new(10_000).is_ok());
        assert!(SlippageBps::new(10_001).is_err());
    }

    #[test]
    fn test_dex_source_round_trip() {
        for source in DexSource::ALL {
            let s = source.to_string();
            let parsed = DexSource::from_str(&s).unwrap();
            assert_eq!(source, parsed);
        }
    }

    #[test]
    fn test_execution_status_terminal() {
        assert!(!ExecutionStatus::Pending.is_terminal());
        assert!(!ExecutionStatus::Analyzing.is_terminal());
        assert!(ExecutionStatus::Success.is_terminal());
        assert!(ExecutionStatus::Failed.is_terminal());
        assert!(ExecutionStatus::Skipped.is_terminal());
    }

    #[test]
    fn test_snipe_config_validation() {
        let mut cfg = SnipeConfig {
            user_id: UserId(1),
            enabled: true,
            auto_trading: true,
            enabled_sources: HashSet::from([DexSource::RaydiumV4]),
            buy_amount_lamports: 50_000_000,
            slippage_bps: SlippageBps::new(100).unwrap(),
            min_liquidity_lamports: Some(10),
            max_liquidity_lamports: Some(5),
            min_market_cap_usd: None,
            max_market_cap_usd: None,
            whitelist: HashSet::new(),
            blacklist: HashSet::new(),
            max_honeypot_risk: HoneypotRiskScore::new(50).unwrap(),
            notify_on_success: true,
            notify_on_failure: true,
            last_automation_at: None,
        };
        assert!(cfg.validate().is_err());
        cfg.max_liquidity_lamports = Some(100);
        assert!(cfg.validate().is_ok());
    }
}
