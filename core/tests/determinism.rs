//! THE MOST IMPORTANT TEST IN THE PROJECT.
//!
//! Two runs, same seed, same actions.
//! They must produce byte-identical serialized states.
//! Any divergence is a blocker. Do not merge until fixed.

use tokensim_core::{
    action::GameAction,
    engine::{run_ticks, step, ActionSchedule},
    scenario::create_scenario,
    state::{GameState, ScenarioType},
};

fn schedule() -> ActionSchedule {
    let mut s = ActionSchedule::new();
    s.insert(5, vec![GameAction::BuyMarketing]);
    s.insert(12, vec![GameAction::TeamSell, GameAction::BuyFakeVolume]);
    s.insert(40, vec![GameAction::WashTrade]);
    s.insert(41, vec![GameAction::StakeTokens]);
    s
}

fn run(seed: u32, ticks: u64) -> GameState {
    let initial = create_scenario(ScenarioType::NewChain, seed);
    run_ticks(&initial, ticks, &schedule())
}

fn to_json(state: &GameState) -> String {
    serde_json::to_string(state).expect("serialize state")
}

#[test]
fn same_seed_produces_identical_states() {
    const SEED: u32 = 0xDEAD_BEEF;
    const TICKS: u64 = 300;

    let a = run(SEED, TICKS);
    let b = run(SEED, TICKS);

    assert_eq!(a.tick(), TICKS);
    assert_eq!(a.rng_state, b.rng_state, "RNG states diverged");
    assert_eq!(
        to_json(&a),
        to_json(&b),
        "Serialized states diverged after {TICKS} ticks"
    );
}

#[test]
fn same_seed_identical_at_every_tick() {
    let mut a = create_scenario(ScenarioType::ExistingToken, 7);
    let mut b = create_scenario(ScenarioType::ExistingToken, 7);
    let actions = schedule();

    for _ in 0..120 {
        let todo = actions.get(&a.tick()).cloned().unwrap_or_default();
        a = step(&a, &todo);
        b = step(&b, &todo);
        assert_eq!(to_json(&a), to_json(&b), "States diverged at tick {}", a.tick());
    }
}

#[test]
fn different_seeds_produce_different_states() {
    let a = run(42, 90);
    let b = run(99, 90);

    assert_ne!(
        a.project.price, b.project.price,
        "Different seeds produced identical prices; seed is not being used"
    );
    assert_ne!(to_json(&a), to_json(&b));
}

#[test]
fn step_does_not_mutate_its_input() {
    let initial = create_scenario(ScenarioType::NewChain, 42);
    let before = to_json(&initial);

    let _ = step(&initial, &[GameAction::BuyMarketing, GameAction::WashTrade]);

    assert_eq!(before, to_json(&initial), "step() modified the previous state");
}

#[test]
fn stepping_the_same_state_twice_gives_the_same_result() {
    let initial = create_scenario(ScenarioType::DeadProject, 3);
    let actions = [GameAction::BuyMarketing];

    let a = step(&initial, &actions);
    let b = step(&initial, &actions);

    assert_eq!(a, b);
}
