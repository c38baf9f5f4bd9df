//! External honeypot-screening provider implementations
//!
//! Each provider wraps a [`RetryingHttpClient`] pointed at one upstream API
//! and maps its response shape onto [`HoneypotSubResult`].

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

use crate::config::models::HoneypotProviderConfig;
use crate::core::result::AppResult;
use crate::core::sniping::HoneypotSubResult;
use crate::services::retry::{RetryPolicy, RetryingHttpClient};

use super::HoneypotProvider;

/// GoPlus Security `token_security` endpoint
///
/// `GET {base_url}/token_security/solana?contract_addresses={mint}`
pub struct GoPlusProvider {
    client: RetryingHttpClient,
    base_url: String,
    api_token: Option<String>,
    weight: f64,
}

#[derive(Debug, Deserialize)]
struct GoPlusResponse {
    result: HashMap<String, GoPlusTokenSecurity>,
}

#[derive(Debug, Deserialize)]
struct GoPlusTokenSecurity {
    #[serde(default)]
    is_honeypot: Option<String>,
    #[serde(default)]
    transfer_pausable: Option<String>,
    #[serde(default)]
    is_mintable: Option<String>,
}

impl GoPlusProvider {
    pub fn new(config: &HoneypotProviderConfig) -> AppResult<Self> {
        let client = RetryingHttpClient::new(
            config.name.clone(),
            RetryPolicy::from_timeout_ms(config.timeout_ms),
        )?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_token: config.api_token.clone(),
            weight: config.weight,
        })
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        match &self.api_token {
            Some(token) => vec![("Authorization", token.as_str())],
            None => Vec::new(),
        }
    }
}

#[async_trait]
impl HoneypotProvider for GoPlusProvider {
    fn name(&self) -> &str {
        "goplus"
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    async fn check(&self, mint: &str) -> AppResult<HoneypotSubResult> {
        let url = format!("{}/token_security/solana", self.base_url);
        let headers = self.headers();
        let response: GoPlusResponse = self
            .client
            .get_json(&url, &[("contract_addresses", mint)], &headers)
            .await?;

        let mut flags = Vec::new();
        let mut score = 0u8;

        if let Some(security) = response.result.get(mint) {
            if security.is_honeypot.as_deref() == Some("1") {
                flags.push("goplus_is_honeypot".to_string());
                score = 100;
            }
            if security.transfer_pausable.as_deref() == Some("1") {
                flags.push("goplus_transfer_pausable".to_string());
                score = score.max(70);
            }
            if security.is_mintable.as_deref() == Some("1") {
                flags.push("goplus_mintable".to_string());
                score = score.max(40);
            }
        }

        Ok(HoneypotSubResult { layer: "goplus".to_string(), score: Some(score), flags, succeeded: true })
    }
}

/// honeypot.is `IsHoneypot` endpoint
///
/// `GET {base_url}/IsHoneypot?address={mint}`
pub struct HoneypotIsProvider {
    client: RetryingHttpClient,
    base_url: String,
    weight: f64,
}

#[derive(Debug, Deserialize)]
struct HoneypotIsResponse {
    #[serde(default)]
    honeypot_result: Option<HoneypotIsVerdict>,
    #[serde(default)]
    simulation_result: Option<HoneypotIsSimulation>,
}

#[derive(Debug, Deserialize)]
struct HoneypotIsVerdict {
    #[serde(rename = "isHoneypot", default)]
    is_honeypot: bool,
}

#[derive(Debug, Deserialize)]
struct HoneypotIsSimulation {
    #[serde(rename = "sellTax", default)]
    sell_tax: f64,
    #[serde(rename = "buyTax", default)]
    buy_tax: f64,
}

impl HoneypotIsProvider {
    pub fn new(config: &HoneypotProviderConfig) -> AppResult<Self> {
        let client = RetryingHttpClient::new(
            config.name.clone(),
            RetryPolicy::from_timeout_ms(config.timeout_ms),
        )?;
        Ok(Self { client, base_url: config.base_url.clone(), weight: config.weight })
    }
}

#[async_trait]
impl HoneypotProvider for HoneypotIsProvider {
    fn name(&self) -> &str {
        "honeypot_is"
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    async fn check(&self, mint: &str) -> AppResult<HoneypotSubResult> {
        let url = format!("{}/IsHoneypot", self.base_url);
        let response: HoneypotIsResponse =
            self.client.get_json(&url, &[("address", mint)], &[]).await?;

        let mut flags = Vec::new();
        let mut score = 0u8;

        if response.honeypot_result.map(|v| v.is_honeypot).unwrap_or(false) {
            flags.push("honeypot_is_flagged".to_string());
            score = 100;
        }

        if let Some(sim) = response.simulation_result {
            if sim.sell_tax >= 50.0 {
                flags.push("honeypot_is_high_sell_tax".to_string());
                score = score.max(90);
            } else if sim.sell_tax >= 10.0 || sim.buy_tax >= 10.0 {
                flags.push("honeypot_is_elevated_tax".to_string());
                score = score.max(30);
            }
        }

        Ok(HoneypotSubResult { layer: "honeypot_is".to_string(), score: Some(score), flags, succeeded: true })
    }
}
