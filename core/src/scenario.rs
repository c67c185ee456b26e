//! Scenario factory: the three starting positions.
//!
//! RULE: `create_scenario` is a pure function of (scenario, seed, config).
//! The rival roster is jittered by a `SetupRng` stream; the in-game RNG
//! starts at exactly `seed`.

use crate::{
    competitor::rerank,
    config::ConfigParams,
    event::TickLog,
    physics::{market_cap, venue_vis_multiplier, visibility},
    rng::{SetupRng, SetupSlot},
    state::{
        Archetype, CompetitorMemory, CompetitorState, ExchangeListing, ExchangeTier, Flags,
        GameState, Indicators, Liquidity, MarketState, ProjectState, Regime, Regulation,
        RevenueStream, RevenueStreams, RollingMetrics, ScenarioType, StrategyWeights, Volume,
    },
    types::RngState,
};
use std::{collections::BTreeMap, sync::Arc};

struct RivalTemplate {
    id: &'static str,
    name: &'static str,
    archetype: Archetype,
    budget: f64,
    risk_appetite: f64,
    weights: (f64, f64, f64),
    market_cap: f64,
    trust: f64,
}

const ROSTER: [RivalTemplate; 6] = [
    RivalTemplate { id: "c1", name: "SolanaKiller",  archetype: Archetype::Aggressive,    budget: 100_000.0, risk_appetite: 90.0,  weights: (0.5, 0.4, 0.1), market_cap: 50_000_000.0,  trust: 60.0 },
    RivalTemplate { id: "c2", name: "SafeMoon 3.0",  archetype: Archetype::Scammer,       budget: 10_000.0,  risk_appetite: 100.0, weights: (0.1, 0.9, 0.0), market_cap: 5_000_000.0,   trust: 20.0 },
    RivalTemplate { id: "c3", name: "CardanoClone",  archetype: Archetype::Institutional, budget: 500_000.0, risk_appetite: 20.0,  weights: (0.2, 0.1, 0.7), market_cap: 150_000_000.0, trust: 85.0 },
    RivalTemplate { id: "c4", name: "DogeWifHat",    archetype: Archetype::Scammer,       budget: 5_000.0,   risk_appetite: 100.0, weights: (0.1, 0.9, 0.0), market_cap: 2_000_000.0,   trust: 30.0 },
    RivalTemplate { id: "c5", name: "ZK-Rollup",     archetype: Archetype::Institutional, budget: 200_000.0, risk_appetite: 30.0,  weights: (0.3, 0.2, 0.5), market_cap: 80_000_000.0,  trust: 75.0 },
    RivalTemplate { id: "c6", name: "BaseMemes",     archetype: Archetype::Aggressive,    budget: 50_000.0,  risk_appetite: 80.0,  weights: (0.4, 0.5, 0.1), market_cap: 25_000_000.0,  trust: 50.0 },
];

fn roster(seed: RngState) -> Vec<CompetitorState> {
    let mut rng = SetupRng::new(u64::from(seed), SetupSlot::Roster);
    ROSTER
        .iter()
        .map(|t| {
            let (fud, pump, utility) = t.weights;
            CompetitorState {
                id: t.id.to_string(),
                name: t.name.to_string(),
                archetype: t.archetype,
                budget: t.budget * rng.range(0.9, 1.1),
                risk_appetite: t.risk_appetite,
                strategy_weights: StrategyWeights { fud, pump, utility },
                memory: CompetitorMemory { last_action_tick: 0, success_rate: 0.5 },
                market_cap: t.market_cap * rng.range(0.9, 1.1),
                trust: (t.trust + rng.range(-5.0, 5.0)).clamp(0.0, 100.0),
                rank: 0,
            }
        })
        .collect()
}

fn base_project(scenario: ScenarioType) -> ProjectState {
    ProjectState {
        id: "p1".to_string(),
        name: "Player Project".to_string(),
        ticker: "TKN".to_string(),
        scenario,
        tick: 0,
        s_max: 100_000_000.0,
        s_circ: 10_000_000.0,
        team_alloc: 20_000_000.0,
        team_tokens_remaining: 20_000_000.0,
        price: 0.10,
        market_cap: 0.0,
        volume: Volume::organic(10_000.0),
        liquidity: Liquidity { amount: 50_000.0, locked_pct: 0.2 },
        community_trust: 50.0,
        institutional_trust: 50.0,
        risk: 10.0,
        visibility: 0.0,
        rank: 0,
        treasury: 25_000.0,
        revenue: RevenueStreams {
            dex: RevenueStream::active(1, 0.8),
            ..RevenueStreams::default()
        },
        exchanges: BTreeMap::new(),
        rolling: RollingMetrics::default(),
        cooldowns: BTreeMap::new(),
        flags: Flags::default(),
        regulation: Regulation::default(),
        risk_memory: 0.0,
    }
}

fn with_team(project: &mut ProjectState, tokens: f64) {
    project.team_alloc = tokens;
    project.team_tokens_remaining = tokens;
}

/// Build the initial `GameState` for a scenario with the shipped config.
pub fn create_scenario(scenario: ScenarioType, seed: RngState) -> GameState {
    create_scenario_with(scenario, seed, Arc::new(ConfigParams::default()))
}

/// Build the initial `GameState` for a scenario under `config`.
pub fn create_scenario_with(
    scenario: ScenarioType,
    seed: RngState,
    config: Arc<ConfigParams>,
) -> GameState {
    let mut project = base_project(scenario);

    match scenario {
        ScenarioType::NewChain => {
            project.name = "New Layer 1".to_string();
            project.ticker = "L1".to_string();
            project.s_max = 1_000_000_000.0;
            project.s_circ = 50_000_000.0;
            with_team(&mut project, 200_000_000.0);
            project.price = 0.50;
            project.risk = 20.0;
            project.revenue.presale = RevenueStream::active(1, 1.0);
        }
        ScenarioType::ExistingToken => {
            project.name = "Utility Token".to_string();
            project.ticker = "UTIL".to_string();
            project.s_max = 100_000_000.0;
            project.s_circ = 80_000_000.0;
            with_team(&mut project, 10_000_000.0);
            project.price = 0.05;
            project.liquidity = Liquidity { amount: 200_000.0, locked_pct: 0.5 };
            project.institutional_trust = 60.0;
            project.risk = 5.0;
            let small = &config.exchange_tiers.small;
            project
                .exchanges
                .insert(ExchangeTier::Small, ExchangeListing::listed(ExchangeTier::Small, &small.name));
            project.revenue.cex = RevenueStream::active(1, 0.9);
        }
        ScenarioType::DeadProject => {
            project.name = "Lazarus DAO".to_string();
            project.ticker = "LAZ".to_string();
            project.s_max = 10_000_000.0;
            project.s_circ = 9_000_000.0;
            with_team(&mut project, 0.0);
            project.price = 0.01;
            project.volume = Volume::organic(500.0);
            project.liquidity = Liquidity { amount: 5_000.0, locked_pct: 0.0 };
            project.community_trust = 10.0;
            project.institutional_trust = 5.0;
            project.risk = 40.0;
            project.treasury = 50_000.0;
        }
    }

    project.market_cap = market_cap(project.price, project.s_circ);
    project.visibility = visibility(
        project.volume.total,
        project.market_cap,
        venue_vis_multiplier(&project, &config),
    );

    let mut market = MarketState {
        msi: 0.1,
        regime: Regime::Neutral,
        regime_timer: 0,
        global_liquidity: 1.0,
        indicators: Indicators::default(),
        competitors: roster(seed),
    };
    rerank(&mut project, &mut market, &config);

    let mut opening = TickLog::new(0);
    opening.info(
        "Project Launched",
        format!("{} ({}) enters the market at ${:.4}.", project.name, project.ticker, project.price),
    );
    let mut log = Vec::new();
    opening.flush_into(&mut log, config.log_window);

    log::info!("scenario {scenario} created: seed={seed} mc={:.0} rank={}", project.market_cap, project.rank);

    GameState { project, market, config, log, rng_state: seed }
}
