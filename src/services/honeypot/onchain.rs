//! On-chain authority-check honeypot layer
//!
//! Flags mints that retain a live mint authority (supply can still be
//! inflated) or freeze authority (holder accounts can be frozen, a classic
//! honeypot primitive).

use std::sync::Arc;

use tracing::debug;

use crate::core::result::AppResult;
use crate::core::sniping::HoneypotSubResult;
use crate::services::solana::SolanaService;

/// Score contribution for a live mint authority
const MINT_AUTHORITY_SCORE: u8 = 60;
/// Score contribution for a live freeze authority
const FREEZE_AUTHORITY_SCORE: u8 = 80;

/// Inspects mint/freeze authority state for a token mint via RPC.
pub struct OnChainLayer {
    solana: Arc<SolanaService>,
}

impl OnChainLayer {
    pub fn new(solana: Arc<SolanaService>) -> Self {
        Self { solana }
    }

    pub async fn check(&self, mint: &str) -> AppResult<HoneypotSubResult> {
        let metadata = self.solana.get_token_metadata(mint).await?;

        let mut flags = Vec::new();
        let mut score = 0u8;

        if metadata.mint_authority.is_some() {
            flags.push("mint_authority_active".to_string());
            score = score.max(MINT_AUTHORITY_SCORE);
        }

        if metadata.freeze_authority.is_some() {
            flags.push("freeze_authority_active".to_string());
            score = score.max(FREEZE_AUTHORITY_SCORE);
        }

        debug!("onchain layer for {}: score={} flags={:?}", mint, score, flags);

        Ok(HoneypotSubResult {
            layer: "onchain".to_string(),
            score: Some(score),
            flags,
            succeeded: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_constants_bounded() {
        assert!(MINT_AUTHORITY_SCORE <= 100);
        assert!(FREEZE_AUTHORITY_SCORE <= 100);
    }
}
