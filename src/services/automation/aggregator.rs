//! Swap Aggregator client (C8 dependency)
//!
//! Wraps the external DEX aggregator behind a single combined quote+swap
//! call, matching the wire format of the other `HeliusClient`-style
//! external API wrappers and reusing [`RetryingHttpClient`] for the retry
//! loop rather than rolling a new one.

use serde::{Deserialize, Serialize};

use crate::config::models::AggregatorConfig;
use crate::core::result::AppResult;
use crate::services::retry::{RetryPolicy, RetryingHttpClient};

/// Request body for the combined quote+swap endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuoteAndSwapRequest<'a> {
    input_mint: &'a str,
    output_mint: &'a str,
    amount_lamports: u64,
    slippage_bps: u16,
    user_public_key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    jito_tip_lamports: Option<u64>,
}

/// A quote+unsigned-transaction response from the aggregator.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapQuote {
    pub in_amount: u64,
    pub out_amount: u64,
    pub price_impact_pct: f64,
    /// Base64-encoded, unsigned versioned transaction
    pub transaction: String,
    pub slippage_bps: u16,
    pub request_id: String,
}

/// Thin client over the configured swap aggregator (`automation.aggregator`).
pub struct AggregatorClient {
    http: RetryingHttpClient,
    base_url: String,
    jito_tip_lamports: u64,
}

impl AggregatorClient {
    pub fn new(config: &AggregatorConfig) -> AppResult<Self> {
        let http = RetryingHttpClient::new(
            "aggregator",
            RetryPolicy {
                timeout: std::time::Duration::from_millis(config.timeout_ms),
                max_elapsed: std::time::Duration::from_millis(config.timeout_ms.saturating_mul(config.max_retries.max(1) as u64)),
                max_concurrent: 8,
            },
        )?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            jito_tip_lamports: config.jito_tip_lamports,
        })
    }

    /// Request a quote and an unsigned swap transaction in one call.
    ///
    /// `user_public_key` is the wallet the transaction's fee payer and
    /// source token account will be derived for; the caller signs the
    /// returned `transaction` with the matching secret key before submission.
    pub async fn quote_and_swap(
        &self,
        input_mint: &str,
        output_mint: &str,
        amount_lamports: u64,
        slippage_bps: u16,
        user_public_key: &str,
    ) -> AppResult<SwapQuote> {
        let url = format!("{}/quote-and-swap", self.base_url);
        let jito_tip_lamports = if self.jito_tip_lamports > 0 { Some(self.jito_tip_lamports) } else { None };

        let request = QuoteAndSwapRequest {
            input_mint,
            output_mint,
            amount_lamports,
            slippage_bps,
            user_public_key,
            jito_tip_lamports,
        };

        self.http.post_json(&url, &request, &[]).await
    }
}
