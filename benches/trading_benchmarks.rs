//! Hot-path benchmarks for the automation pipeline
//!
//! Covers the per-event work done on every discovery tick: policy
//! evaluation (C7) and honeypot risk-score construction (C5), both of
//! which run once per `(user, event)` pair and so sit directly on the
//! discovery-to-execution latency budget.

use std::collections::HashSet;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use solana_sniper_bot::core::sniping::{
    DexSource, HoneypotRiskScore, NewTokenEvent, SlippageBps, SnipeConfig, UserId,
};
use solana_sniper_bot::core::types::{Timestamp, TokenAddress};
use solana_sniper_bot::services::discovery::evaluate;

fn sample_config() -> SnipeConfig {
    SnipeConfig {
        user_id: UserId(1),
        enabled: true,
        auto_trading: true,
        enabled_sources: HashSet::from([DexSource::RaydiumV4, DexSource::PumpFun]),
        buy_amount_lamports: 1_000_000_000,
        slippage_bps: SlippageBps(100),
        min_liquidity_lamports: Some(100_000_000),
        max_liquidity_lamports: Some(10_000_000_000),
        min_market_cap_usd: Some(1_000),
        max_market_cap_usd: Some(1_000_000),
        whitelist: HashSet::new(),
        blacklist: HashSet::from(["BlacklistedMint1111111111111111111111111111".to_string()]),
        max_honeypot_risk: HoneypotRiskScore(50),
        notify_on_success: true,
        notify_on_failure: true,
        last_automation_at: None,
    }
}

fn sample_event() -> NewTokenEvent {
    NewTokenEvent {
        source: DexSource::RaydiumV4,
        mint: TokenAddress::new_unchecked("So1NewMint111111111111111111111111111111111".to_string()),
        name: Some("Sample".to_string()),
        symbol: Some("SMPL".to_string()),
        liquidity_lamports: 500_000_000,
        market_cap_usd: Some(120_000),
        tx: "signature".to_string(),
        timestamp: Timestamp::now(),
    }
}

fn benchmark_filter_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_evaluate");
    group.measurement_time(Duration::from_secs(5));

    let config = sample_config();
    let event = sample_event();

    group.bench_function("pass", |b| {
        b.iter(|| black_box(evaluate(black_box(&config), black_box(&event))))
    });

    let mut blacklisted = event.clone();
    blacklisted.mint = TokenAddress::new_unchecked("BlacklistedMint1111111111111111111111111111".to_string());
    group.bench_function("blacklist_reject", |b| {
        b.iter(|| black_box(evaluate(black_box(&config), black_box(&blacklisted))))
    });

    group.finish();
}

fn benchmark_honeypot_risk_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("honeypot_risk_score");
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("weighted_aggregate", |b| {
        b.iter(|| {
            let provider_scores = [black_box(12u8), black_box(8u8), black_box(20u8)];
            let weights = [0.4_f64, 0.4, 0.2];
            let weighted: f64 = provider_scores
                .iter()
                .zip(weights.iter())
                .map(|(score, weight)| f64::from(*score) * weight)
                .sum();
            black_box(HoneypotRiskScore::new(weighted.round().clamp(0.0, 100.0) as u8))
        })
    });

    group.bench_function("is_low_risk", |b| {
        let score = HoneypotRiskScore(35);
        b.iter(|| black_box(score.is_low_risk(black_box(50))))
    });

    group.finish();
}

criterion_group!(benches, benchmark_filter_evaluate, benchmark_honeypot_risk_score);
criterion_main!(benches);
