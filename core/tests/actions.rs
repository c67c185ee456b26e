//! Player action tests.
//!
//! Each test steps the same state twice: once with the action and once
//! without (the control). Effects are judged against the control so the
//! market's own movement cancels out.

use tokensim_core::{
    action::GameAction,
    engine::step,
    event::LogKind,
    scenario::create_scenario,
    state::{cooldown, ExchangeTier, GameState, ListingStatus, ScenarioType},
};

fn fresh(scenario: ScenarioType) -> GameState {
    create_scenario(scenario, 42)
}

fn with_treasury(mut state: GameState, treasury: f64) -> GameState {
    state.project.treasury = treasury;
    state
}

#[test]
fn buy_marketing_costs_exactly_its_price() {
    let state = with_treasury(fresh(ScenarioType::NewChain), 5_000.0);

    let next = step(&state, &[GameAction::BuyMarketing]);
    let control = step(&state, &[]);

    assert_eq!(
        next.project.treasury,
        state.project.treasury - 5_000.0,
        "Marketing must deduct exactly 5000"
    );
    assert!(
        next.project.community_trust >= control.project.community_trust,
        "Marketing lowered CT: {} < control {}",
        next.project.community_trust,
        control.project.community_trust
    );
    assert!(
        next.log.iter().any(|e| e.tick == 1 && e.kind == LogKind::Success),
        "Successful action should log an entry"
    );
}

#[test]
fn unaffordable_action_equals_no_action() {
    let state = with_treasury(fresh(ScenarioType::NewChain), 4_999.0);

    let next = step(&state, &[GameAction::BuyMarketing]);
    let control = step(&state, &[]);

    assert_eq!(next, control, "A failed action must leave no trace");
}

#[test]
fn wash_trade_raises_fake_share_and_risk() {
    let state = fresh(ScenarioType::NewChain);
    let before = &state.project;

    let next = step(&state, &[GameAction::WashTrade]);
    let after = &next.project;

    assert!(
        after.rolling.fake_share > before.rolling.fake_share,
        "fake share did not increase: {} -> {}",
        before.rolling.fake_share,
        after.rolling.fake_share
    );
    assert!(after.rolling.fake_share <= 1.0);
    assert!(after.risk >= before.risk, "risk fell after wash trading: {} -> {}", before.risk, after.risk);
    assert_eq!(after.treasury, before.treasury - 1_000.0);
}

#[test]
fn fake_share_saturates_at_one() {
    let mut state = fresh(ScenarioType::NewChain);
    state.project.treasury = 1_000_000.0;
    for _ in 0..20 {
        state = step(&state, &[GameAction::WashTrade, GameAction::BuyFakeVolume]);
        assert!(state.project.rolling.fake_share <= 1.0);
    }
    assert_eq!(state.project.rolling.fake_share, 1.0);
}

#[test]
fn fake_share_decays_without_fake_actions() {
    let state = step(&fresh(ScenarioType::NewChain), &[GameAction::BuyFakeVolume]);
    let share = state.project.rolling.fake_share;
    let next = step(&state, &[]);
    assert!(next.project.rolling.fake_share < share);
}

#[test]
fn team_sell_moves_tokens_into_circulation() {
    let state = fresh(ScenarioType::NewChain);
    let before = &state.project;

    let next = step(&state, &[GameAction::TeamSell]);
    let control = step(&state, &[]);
    let after = &next.project;

    let sold = before.team_tokens_remaining * 0.01;
    assert!((after.team_tokens_remaining - (before.team_tokens_remaining - sold)).abs() < 1e-6);
    assert!((after.s_circ - (before.s_circ + sold)).abs() < 1e-6);
    assert!(after.s_circ <= after.s_max);
    assert!(after.treasury > before.treasury, "Proceeds must reach the treasury");
    assert!(after.community_trust < control.project.community_trust);
    assert!(after.risk > control.project.risk);
    assert!(after.price < control.project.price, "Dumping must push price down");
    assert!(after.cooldown_active(cooldown::TEAM_SELL));
}

#[test]
fn team_sell_without_tokens_is_a_no_op() {
    let state = fresh(ScenarioType::DeadProject);
    assert_eq!(state.project.team_tokens_remaining, 0.0);

    assert_eq!(step(&state, &[GameAction::TeamSell]), step(&state, &[]));
}

#[test]
fn stake_tokens_unlocks_staking_and_locks_liquidity() {
    let state = fresh(ScenarioType::DeadProject);
    let next = step(&state, &[GameAction::StakeTokens]);

    assert!(next.project.revenue.staking.unlocked);
    assert_eq!(next.project.revenue.staking.level, 1);
    assert!((next.project.liquidity.locked_pct - 0.05).abs() < 1e-12);
    assert_eq!(next.project.treasury, state.project.treasury - 10_000.0);

    let again = step(&next, &[GameAction::StakeTokens]);
    assert_eq!(again.project.revenue.staking.level, 2);
}

#[test]
fn launch_nft_respects_its_cooldown() {
    let state = with_treasury(fresh(ScenarioType::NewChain), 100_000.0);

    let first = step(&state, &[GameAction::LaunchNft]);
    assert!(first.project.revenue.nft.unlocked);
    assert!(first.project.cooldown_active(cooldown::NFT_DROP));

    let blocked = step(&first, &[GameAction::LaunchNft]);
    let control = step(&first, &[]);
    assert_eq!(blocked, control, "A second drop during cooldown must be ignored");
}

#[test]
fn upgrade_tech_improves_dex_efficiency() {
    let state = fresh(ScenarioType::DeadProject);
    let next = step(&state, &[GameAction::UpgradeTech]);

    assert!((next.project.revenue.dex.efficiency - 0.85).abs() < 1e-12);
    assert_eq!(next.project.treasury, state.project.treasury - 20_000.0);
}

#[test]
fn bribe_needs_an_active_regulator() {
    let state = fresh(ScenarioType::DeadProject);
    assert_eq!(step(&state, &[GameAction::BribeRegulator]), step(&state, &[]));
}

#[test]
fn listing_on_an_eligible_tier() {
    let state = fresh(ScenarioType::NewChain);
    let action = GameAction::ApplyListing { tier: ExchangeTier::Small };

    let next = step(&state, &[action.clone()]);
    let listing = next
        .project
        .exchanges
        .get(&ExchangeTier::Small)
        .expect("listing created");
    assert_eq!(listing.status, ListingStatus::Listed);
    assert!(next.project.revenue.cex.unlocked);
    assert_eq!(next.project.treasury, state.project.treasury - 10_000.0);

    assert_eq!(
        step(&next, &[action]),
        step(&next, &[]),
        "Applying to a venue we already trade on must be ignored"
    );
}

#[test]
fn listing_requirements_are_enforced() {
    let state = with_treasury(fresh(ScenarioType::NewChain), 10_000_000.0);
    let major = GameAction::ApplyListing { tier: ExchangeTier::Major };

    assert_eq!(step(&state, &[major]), step(&state, &[]));
}

#[test]
fn actions_deserialize_from_tagged_json() {
    let action: GameAction =
        serde_json::from_str(r#"{"type":"apply_listing","tier":"mid"}"#).expect("parse");
    assert_eq!(action, GameAction::ApplyListing { tier: ExchangeTier::Mid });

    let action: GameAction = serde_json::from_str(r#"{"type":"wash_trade"}"#).expect("parse");
    assert_eq!(action, GameAction::WashTrade);

    assert_eq!(
        GameAction::parse_short("apply_listing:major").expect("short form"),
        GameAction::ApplyListing { tier: ExchangeTier::Major }
    );
    assert!(GameAction::parse_short("rug_pull").is_err());
}
