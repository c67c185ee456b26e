//! Scenario factory tests.

use tokensim_core::{
    engine::step,
    scenario::create_scenario,
    state::{ExchangeTier, RegulationStage, ScenarioType},
};

#[test]
fn dead_project_starts_broken() {
    let state = create_scenario(ScenarioType::DeadProject, 42);
    let p = &state.project;

    assert_eq!(p.community_trust, 10.0);
    assert_eq!(p.institutional_trust, 5.0);
    assert_eq!(p.risk, 40.0);
    assert_eq!(p.treasury, 50_000.0);
    assert_eq!(p.team_tokens_remaining, 0.0);
    assert_eq!(state.rng_state, 42, "In-game RNG must start at the seed");
}

#[test]
fn dead_project_survives_an_empty_step() {
    let state = create_scenario(ScenarioType::DeadProject, 42);
    let next = step(&state, &[]);

    assert_eq!(next.tick(), 1);
    assert!(
        next.project.s_circ <= next.project.s_max,
        "Circulating supply {} exceeds max {}",
        next.project.s_circ,
        next.project.s_max
    );
}

#[test]
fn every_scenario_has_consistent_supply_and_ranks() {
    for scenario in ScenarioType::ALL {
        let state = create_scenario(scenario, 1234);
        let p = &state.project;

        assert_eq!(p.tick, 0);
        assert_eq!(p.scenario, scenario);
        assert!(
            p.s_circ + p.team_tokens_remaining <= p.s_max,
            "{scenario}: supply exceeds max"
        );
        assert!((p.market_cap - p.price * p.s_circ).abs() < 1e-6);
        assert!((0.0..=100.0).contains(&p.visibility), "{scenario}: visibility {}", p.visibility);
        assert_eq!(p.regulation.stage, RegulationStage::Normal);

        assert_eq!(state.market.competitors.len(), 6);
        let mut ranks: Vec<u32> = state.market.competitors.iter().map(|c| c.rank).collect();
        ranks.push(p.rank);
        ranks.sort_unstable();
        assert_eq!(ranks, (1..=7).collect::<Vec<u32>>(), "{scenario}: ranks must be 1..=7");
    }
}

#[test]
fn scenario_specific_starting_positions() {
    let chain = create_scenario(ScenarioType::NewChain, 1);
    assert_eq!(chain.project.s_max, 1_000_000_000.0);
    assert!(chain.project.revenue.presale.unlocked);
    assert!(chain.project.exchanges.is_empty());

    let token = create_scenario(ScenarioType::ExistingToken, 1);
    assert_eq!(token.project.best_listed_tier(), Some(ExchangeTier::Small));
    assert_eq!(token.project.liquidity.locked_pct, 0.5);
    assert!(token.project.revenue.cex.unlocked);
}

#[test]
fn roster_jitter_is_seeded() {
    let a = create_scenario(ScenarioType::NewChain, 10);
    let b = create_scenario(ScenarioType::NewChain, 10);
    let c = create_scenario(ScenarioType::NewChain, 11);

    assert_eq!(a.market.competitors, b.market.competitors);
    assert_ne!(
        a.market.competitors, c.market.competitors,
        "Different seeds should jitter the rival roster"
    );
}

#[test]
fn scenario_names_parse() {
    for scenario in ScenarioType::ALL {
        let parsed: ScenarioType = scenario.as_str().parse().expect("parse scenario");
        assert_eq!(parsed, scenario);
    }
    assert!("moon_shot".parse::<ScenarioType>().is_err());
}
