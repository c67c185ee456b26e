//! Market physics, trust/risk dynamics, revenue and leaderboard tests.

use std::collections::VecDeque;
use tokensim_core::{
    competitor::{ranking_score, rerank, ScoreInputs},
    config::ConfigParams,
    dynamics::{apply_risk_jump, clamp_score, stability, update_risk_memory},
    event::{truncate_window, TickLog},
    physics::{
        amm_liquidity, effective_liquidity, net_flow, scaled_risk, stdev, update_price,
        update_rolling, visibility, volume_stability,
    },
    revenue::{accrue, collect},
    rng::SimRng,
    scenario::create_scenario,
    state::{RollingMetrics, ScenarioType},
};

#[test]
fn effective_liquidity_formula() {
    let l = effective_liquidity(100_000.0, 50.0, 0.2, 1.2);
    let expected = 100_000.0 * 1.5 * 1.1 * 1.2;
    assert!((l - expected).abs() < 1e-6, "{l} != {expected}");
}

#[test]
fn scaled_risk_vanishes_for_tiny_projects() {
    assert_eq!(scaled_risk(80.0, 0.0, 50.0), 0.0);
    let small = scaled_risk(50.0, 1_000_000.0, 0.0);
    let big = scaled_risk(50.0, 100_000_000.0, 0.0);
    assert!(big > small, "Risk should scale with size");
}

#[test]
fn visibility_is_clamped() {
    assert_eq!(visibility(0.0, 0.0, 1.0), 0.0);
    assert_eq!(visibility(1e300, 1e300, 5.0), 100.0);
    let v = visibility(10_000.0, 1_000_000.0, 1.0);
    assert!((v - 35.0).abs() < 1e-3, "visibility {v}");
}

#[test]
fn stdev_and_volume_stability() {
    assert_eq!(stdev(&[1.0]), 0.0);
    assert!((stdev(&[1.0, 3.0]) - 1.0).abs() < 1e-12);

    let flat: VecDeque<f64> = vec![10.0; 5].into();
    assert_eq!(volume_stability(&flat), Some(1.0));
    let single: VecDeque<f64> = vec![10.0].into();
    assert_eq!(volume_stability(&single), None);
}

#[test]
fn amm_liquidity_tracks_sqrt_price() {
    assert!((amm_liquidity(100.0, 1.0, 4.0) - 200.0).abs() < 1e-9);
    assert_eq!(amm_liquidity(100.0, 0.0, 4.0), 100.0);
}

#[test]
fn price_stays_positive_under_extreme_selling() {
    let config = ConfigParams::default();
    let state = create_scenario(ScenarioType::DeadProject, 1);
    let mut rng = SimRng::new(1);
    let mut price = state.project.price;
    for _ in 0..200 {
        price = update_price(price, -1e15, 1.0, &state.project, &state.market, &mut rng, &config);
        assert!(price > 0.0 && price.is_finite(), "price {price}");
    }
}

#[test]
fn single_tick_move_is_bounded() {
    let config = ConfigParams::default();
    let state = create_scenario(ScenarioType::NewChain, 1);
    let mut rng = SimRng::new(1);
    let p0 = state.project.price;
    let p1 = update_price(p0, 1e15, 1.0, &state.project, &state.market, &mut rng, &config);
    assert!(p1 <= p0 * 3f64.exp() * (1.0 + 1e-12));
}

#[test]
fn score_helpers() {
    assert_eq!(clamp_score(-3.0), 0.0);
    assert_eq!(clamp_score(140.0), 100.0);
    assert_eq!(clamp_score(f64::NAN), 0.0);
    assert_eq!(stability(1.5), 0.0);
    assert_eq!(apply_risk_jump(99.0, 5.0), 100.0);
    assert_eq!(apply_risk_jump(0.5, -2.0), 0.0);

    let config = ConfigParams::default();
    let mem = update_risk_memory(10.0, 2.0, &config);
    assert!((mem - (10.0 * 0.99 + 2.0)).abs() < 1e-12);
    assert!((update_risk_memory(10.0, -1.0, &config) - 9.9).abs() < 1e-12);
}

#[test]
fn revenue_collects_only_on_interval() {
    let config = ConfigParams::default();
    let mut project = create_scenario(ScenarioType::NewChain, 1).project;
    let treasury = project.treasury;
    let mut log = TickLog::new(1);

    accrue(&mut project, &config);
    assert!(project.revenue.dex.accrued > 0.0);
    assert!(project.revenue.presale.accrued > 0.0);
    assert_eq!(project.revenue.staking.accrued, 0.0, "Locked streams earn nothing");

    assert_eq!(collect(&mut project, 7, &config, &mut log), 0.0);
    assert_eq!(project.treasury, treasury);

    let collected = collect(&mut project, 10, &config, &mut log);
    assert!(collected > 0.0);
    assert_eq!(project.treasury, treasury + collected);
    assert_eq!(project.revenue.dex.accrued, 0.0);
}

#[test]
fn ranking_prefers_bigger_cleaner_projects() {
    let w = ConfigParams::default().ranking_weights;
    let clean = ScoreInputs {
        market_cap: 10_000_000.0,
        trust: 60.0,
        liquidity: 100_000.0,
        volatility: 0.02,
        fake_share: 0.0,
        risk: 10.0,
    };
    let dirty = ScoreInputs { fake_share: 0.8, risk: 70.0, ..clean };
    assert!(ranking_score(&clean, &w) > ranking_score(&dirty, &w));
}

#[test]
fn rerank_assigns_unique_ranks() {
    let config = ConfigParams::default();
    let mut state = create_scenario(ScenarioType::NewChain, 3);
    state.project.market_cap = 1e15;
    let rank = rerank(&mut state.project, &mut state.market, &config);
    assert_eq!(rank, 1, "A dominant market cap should top the board");
}

#[test]
fn log_window_truncates_oldest() {
    let mut log = Vec::new();
    for tick in 1..=5 {
        let mut t = TickLog::new(tick);
        t.info("a", "b");
        t.info("c", "d");
        t.flush_into(&mut log, 6);
    }
    assert_eq!(log.len(), 6);
    assert_eq!(log[0].tick, 3);
    truncate_window(&mut log, 2);
    assert_eq!(log.len(), 2);
    assert_eq!(log[1].tick, 5);
    assert_ne!(log[0].id, log[1].id);
}

#[test]
fn buy_share_is_clamped_on_both_sides() {
    let mut state = create_scenario(ScenarioType::NewChain, 1);
    state.project.risk = 100.0;
    state.project.market_cap = 1e12;
    state.market.msi = -1.0;
    let mut config = ConfigParams::default();
    config.flow.sentiment_share = 5.0;
    let panic_selling = net_flow(&state.project, &state.market, &config);
    assert_eq!(panic_selling.buy_share, config.flow.buy_share_min);

    state.project.risk = 0.0;
    state.market.msi = 1.0;
    let mania = net_flow(&state.project, &state.market, &config);
    assert_eq!(mania.buy_share, config.flow.buy_share_max);
}

#[test]
fn speculative_inflow_needs_positive_sentiment() {
    let config = ConfigParams::default();
    let mut state = create_scenario(ScenarioType::ExistingToken, 1);

    state.market.msi = -0.4;
    let bearish = net_flow(&state.project, &state.market, &config);
    let balanced = bearish.organic_volume * (2.0 * bearish.buy_share - 1.0);
    let tolerance = 1e-9 * bearish.organic_volume.max(1.0);
    assert!((bearish.net_flow - balanced).abs() < tolerance, "No speculation below zero sentiment");

    state.market.msi = 0.4;
    let bullish = net_flow(&state.project, &state.market, &config);
    let balanced = bullish.organic_volume * (2.0 * bullish.buy_share - 1.0);
    let speculative = bullish.organic_volume * 0.4 * config.flow.speculative_share;
    let tolerance = 1e-9 * bullish.organic_volume.max(1.0);
    assert!(speculative > 0.0);
    assert!((bullish.net_flow - balanced - speculative).abs() < tolerance);
}

#[test]
fn rolling_returns_evict_past_the_window() {
    let config = ConfigParams::default();
    let mut rolling = RollingMetrics::default();
    let history = VecDeque::new();

    let total = config.volatility_window + 5;
    for i in 0..total {
        update_rolling(&mut rolling, i as f64 * 0.001, &history, &config);
    }
    assert_eq!(rolling.returns.len(), config.volatility_window);
    assert_eq!(rolling.returns.front().copied(), Some(0.005));
    assert_eq!(rolling.volume_stability, RollingMetrics::default().volume_stability);
    assert!(rolling.volatility > 0.0);
}
