//! Configuration loading tests.

use std::sync::Arc;
use tokensim_core::{
    config::ConfigParams,
    engine::step,
    scenario::{create_scenario, create_scenario_with},
    state::ScenarioType,
};

fn write_temp(name: &str, body: &str) -> String {
    let path = std::env::temp_dir().join(format!("tokensim-{}-{name}", std::process::id()));
    std::fs::write(&path, body).expect("write temp config");
    path.to_string_lossy().into_owned()
}

#[test]
fn partial_override_keeps_defaults() {
    let path = write_temp(
        "partial.json",
        r#"{ "price_k": 0.2, "actions": { "marketing_cost": 1000.0 } }"#,
    );
    let config = ConfigParams::load(&path).expect("load config");
    let defaults = ConfigParams::default();

    assert_eq!(config.price_k, 0.2);
    assert_eq!(config.actions.marketing_cost, 1_000.0);
    assert_eq!(config.actions.wash_cost, defaults.actions.wash_cost);
    assert_eq!(config.exchange_tiers, defaults.exchange_tiers);
    assert_eq!(config.win_condition_ticks, defaults.win_condition_ticks);
}

#[test]
fn missing_file_is_an_error() {
    assert!(ConfigParams::load("/definitely/not/here.json").is_err());
}

#[test]
fn malformed_file_is_an_error() {
    let path = write_temp("bad.json", "{ price_k: ");
    assert!(ConfigParams::load(&path).is_err());
}

#[test]
fn default_config_round_trips_through_json() {
    let config = ConfigParams::default();
    let text = serde_json::to_string(&config).expect("serialize");
    let back: ConfigParams = serde_json::from_str(&text).expect("deserialize");
    assert_eq!(config, back);
}

#[test]
fn custom_config_flows_into_the_engine() {
    let config = ConfigParams {
        actions: tokensim_core::config::ActionCosts {
            marketing_cost: 123.0,
            ..Default::default()
        },
        ..Default::default()
    };
    let state = create_scenario_with(ScenarioType::NewChain, 1, Arc::new(config));
    let next = step(&state, &[tokensim_core::action::GameAction::BuyMarketing]);
    assert_eq!(next.project.treasury, state.project.treasury - 123.0);

    let shipped = create_scenario(ScenarioType::NewChain, 1);
    assert_eq!(*shipped.config, ConfigParams::default());
}

#[test]
fn single_exchange_tier_field_can_be_overridden() {
    let config = ConfigParams::from_json(r#"{ "exchange_tiers": { "mid": { "listing_fee": 1.0 } } }"#)
        .expect("parse override");
    let defaults = ConfigParams::default();

    assert_eq!(config.exchange_tiers.mid.listing_fee, 1.0);
    assert_eq!(config.exchange_tiers.mid.name, "GateKeep");
    assert_eq!(config.exchange_tiers.mid.listing_req_it, defaults.exchange_tiers.mid.listing_req_it);
    assert_eq!(config.exchange_tiers.small, defaults.exchange_tiers.small);
    assert_eq!(config.exchange_tiers.major, defaults.exchange_tiers.major);
}

#[test]
fn nested_override_file_loads() {
    let path = write_temp(
        "tier.json",
        r#"{ "exchange_tiers": { "major": { "delist_threshold_it": 55.0 } }, "competitors": { "fud_rank_reach": 4 } }"#,
    );
    let config = ConfigParams::load(&path).expect("load config");

    assert_eq!(config.exchange_tiers.major.delist_threshold_it, 55.0);
    assert_eq!(config.competitors.fud_rank_reach, 4);
    assert_eq!(config.competitors.fud_ct_hit, ConfigParams::default().competitors.fud_ct_hit);
}
