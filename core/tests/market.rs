//! Market regime, rival behaviour and leaderboard tests.

use std::sync::Arc;
use tokensim_core::{
    competitor::{evolve_competitors, update_leaderboard},
    config::ConfigParams,
    event::{EventLogEntry, TickLog},
    market::evolve_market,
    rng::SimRng,
    scenario::{create_scenario, create_scenario_with},
    state::{GameState, Regime, ScenarioType, StrategyWeights},
};

fn entries(log: TickLog) -> Vec<EventLogEntry> {
    let mut out = Vec::new();
    log.flush_into(&mut out, usize::MAX);
    out
}

#[test]
fn regime_switches_when_its_timer_runs_out() {
    let config = ConfigParams::default();
    let mut market = create_scenario(ScenarioType::NewChain, 3).market;
    let mut rng = SimRng::new(3);
    let mut log = TickLog::new(1);

    market.regime_timer = 5;
    evolve_market(&mut market, &mut rng, &config, &mut log);
    assert_eq!(market.regime, Regime::Neutral);
    assert_eq!(market.regime_timer, 4);

    market.regime_timer = 1;
    evolve_market(&mut market, &mut rng, &config, &mut log);
    let p = &config.market;
    assert!(
        (p.regime_min_ticks..p.regime_max_ticks).contains(&market.regime_timer),
        "new regime lasts {} ticks",
        market.regime_timer
    );
}

#[test]
fn sentiment_stays_bounded_under_wild_noise() {
    let mut config = ConfigParams::default();
    config.market.msi_noise = 10.0;
    config.market.news_noise = 10.0;
    let mut market = create_scenario(ScenarioType::NewChain, 5).market;
    market.regime = Regime::Bull;
    market.regime_timer = 1_000;
    let mut rng = SimRng::new(5);
    let mut log = TickLog::new(1);

    for _ in 0..200 {
        evolve_market(&mut market, &mut rng, &config, &mut log);
        assert!((-1.0..=1.0).contains(&market.msi), "msi {}", market.msi);
        assert!((-1.0..=1.0).contains(&market.indicators.news_sentiment));
        let expected = 1.0 + config.market.liquidity_beta * market.msi;
        assert!((market.global_liquidity - expected).abs() < 1e-12);
    }
}

/// One rival that always spreads FUD, ranked directly above the player.
fn fud_duel() -> GameState {
    let mut state = create_scenario(ScenarioType::ExistingToken, 1);
    state.market.competitors.truncate(1);
    let rival = &mut state.market.competitors[0];
    rival.strategy_weights = StrategyWeights { fud: 1.0, pump: 0.0, utility: 0.0 };
    rival.risk_appetite = 100.0;
    rival.rank = 1;
    rival.memory.last_action_tick = 0;
    state.project.rank = 2;
    state.project.visibility = 50.0;
    state
}

#[test]
fn nearby_fud_costs_community_trust_by_visibility() {
    let config = ConfigParams::default();
    let mut state = fud_duel();
    let ct = state.project.community_trust;
    let mut rng = SimRng::new(1);
    let mut log = TickLog::new(10);

    evolve_competitors(&mut state.market, &mut state.project, 10, &mut rng, &config, &mut log);

    let expected = ct - config.competitors.fud_ct_hit * 0.5;
    assert!((state.project.community_trust - expected).abs() < 1e-12);
    assert!(entries(log).iter().any(|e| e.title.ends_with("Spreads FUD")));
}

#[test]
fn distant_fud_misses_the_player() {
    let config = ConfigParams::default();
    let mut state = fud_duel();
    state.project.rank = 1 + config.competitors.fud_rank_reach + 1;
    let ct = state.project.community_trust;
    let budget = state.market.competitors[0].budget;
    let mut rng = SimRng::new(1);
    let mut log = TickLog::new(10);

    evolve_competitors(&mut state.market, &mut state.project, 10, &mut rng, &config, &mut log);

    assert_eq!(state.project.community_trust, ct);
    let rival = &state.market.competitors[0];
    assert!(rival.budget < budget, "The campaign is still paid for");
    assert_eq!(rival.memory.last_action_tick, 10);
}

#[test]
fn rivals_act_only_on_their_interval() {
    let mut config = ConfigParams::default();
    config.competitors.budget_yield = 0.0;
    let mut state = create_scenario(ScenarioType::NewChain, 2);
    let before = state.market.competitors.clone();
    let mut rng = SimRng::new(2);
    let mut log = TickLog::new(5);

    evolve_competitors(&mut state.market, &mut state.project, 5, &mut rng, &config, &mut log);
    for (rival, old) in state.market.competitors.iter().zip(&before) {
        assert_eq!(rival.budget, old.budget, "{} spent before its interval", rival.id);
        assert_eq!(rival.memory.last_action_tick, 0);
    }

    let tick = config.competitors.action_interval;
    evolve_competitors(&mut state.market, &mut state.project, tick, &mut rng, &config, &mut log);
    for (rival, old) in state.market.competitors.iter().zip(&before) {
        let spent = old.budget - rival.budget;
        assert!((spent - config.competitors.action_cost).abs() < 1e-6, "{} spent {spent}", rival.id);
        assert_eq!(rival.memory.last_action_tick, tick);
    }
}

#[test]
fn leaderboard_tracks_streak_and_wins_once() {
    let config = Arc::new(ConfigParams { win_condition_ticks: 2, ..Default::default() });
    let mut state = create_scenario_with(ScenarioType::ExistingToken, 1, config.clone());
    state.project.market_cap = 1e15;
    let mut log = TickLog::new(1);

    for _ in 0..3 {
        update_leaderboard(&mut state.project, &mut state.market, &config, &mut log);
    }
    assert_eq!(state.project.rank, 1);
    assert_eq!(state.project.flags.ticks_at_no1, 3);
    assert!(state.project.flags.has_won);
    let victories = entries(log).iter().filter(|e| e.title == "Victory").count();
    assert_eq!(victories, 1, "The win is announced once");

    state.project.market_cap = 1.0;
    let mut log = TickLog::new(4);
    update_leaderboard(&mut state.project, &mut state.market, &config, &mut log);
    assert_ne!(state.project.rank, 1);
    assert_eq!(state.project.flags.ticks_at_no1, 0, "Losing #1 resets the streak");
    assert!(state.project.flags.has_won, "A win is never taken back");
}

#[test]
fn rank_momentum_is_clamped() {
    let config = ConfigParams::default();
    let mut state = create_scenario(ScenarioType::ExistingToken, 1);
    let last = state.market.competitors.len() as u32 + 1;
    let mut log = TickLog::new(1);

    state.project.market_cap = 1e15;
    state.project.rank = last;
    state.project.rolling.rank_momentum = 0.9;
    update_leaderboard(&mut state.project, &mut state.market, &config, &mut log);
    assert_eq!(state.project.rank, 1);
    assert_eq!(state.project.rolling.rank_momentum, 1.0);

    state.project.market_cap = 1.0;
    state.project.community_trust = 0.0;
    state.project.institutional_trust = 0.0;
    state.project.risk = 100.0;
    state.project.rolling.rank_momentum = -0.9;
    update_leaderboard(&mut state.project, &mut state.market, &config, &mut log);
    assert_eq!(state.project.rank, last);
    assert_eq!(state.project.rolling.rank_momentum, -1.0);
}
