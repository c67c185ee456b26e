//! The tick engine.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Clone the previous state's substructures
//!   2. Fold player actions in arrival order
//!   3. Evolve market sentiment; compute effective liquidity and net flow
//!   4. Price, AMM liquidity drift, market cap, volume blend
//!   5. Rolling metrics, then volatility pressure
//!   6. Trust, risk, risk memory, visibility; rivals and leaderboard;
//!      revenue accrual and collection
//!   7. Discrete triggers: regulation, delistings, crisis alerts
//!   8. Cooldowns, tick counter, RNG state, log window
//!
//! RULES:
//!   - `step` reads only its inputs. The previous state is never mutated.
//!   - All randomness flows through one `SimRng` rebuilt from
//!     `rng_state`, and its advanced state is carried on the result.
//!   - No I/O, no clocks, no errors. Bad inputs are absorbed.

use crate::{
    action::{apply_actions, GameAction},
    competitor::{evolve_competitors, update_leaderboard},
    dynamics::{apply_risk_jump, update_risk, update_risk_memory, update_trust},
    event::TickLog,
    market::evolve_market,
    physics::{
        amm_liquidity, market_cap, net_flow, project_effective_liquidity, update_price,
        update_rolling, venue_vis_multiplier, visibility, volatility_pressure,
    },
    regulation::{check_crises, update_listings, update_regulation},
    revenue,
    rng::SimRng,
    state::GameState,
    types::Tick,
};
use std::{collections::BTreeMap, sync::Arc};

/// Actions keyed by the tick they are submitted on.
pub type ActionSchedule = BTreeMap<Tick, Vec<GameAction>>;

/// Advance one tick.
pub fn step(state: &GameState, actions: &[GameAction]) -> GameState {
    // 1.
    let config = Arc::clone(&state.config);
    let mut project = state.project.clone();
    let mut market = state.market.clone();
    let mut history = state.log.clone();
    let mut rng = SimRng::new(state.rng_state);
    let next_tick = project.tick + 1;
    let mut log = TickLog::new(next_tick);

    // 2.
    let effects = apply_actions(&mut project, &market, actions, &config, &mut log);
    if !effects.bought_fake_volume {
        project.rolling.fake_share = (project.rolling.fake_share - config.volume.fake_share_decay).max(0.0);
    }

    // 3.
    evolve_market(&mut market, &mut rng, &config, &mut log);
    let l_eff = project_effective_liquidity(&project, &market, &config);
    let flow = net_flow(&project, &market, &config);
    let total_flow = flow.net_flow + effects.net_flow;

    // 4.
    let old_price = project.price;
    project.price = update_price(old_price, total_flow, l_eff, &project, &market, &mut rng, &config);
    project.liquidity.amount = amm_liquidity(project.liquidity.amount, old_price, project.price);
    project.market_cap = market_cap(project.price, project.s_circ);

    let smoothing = config.volume.real_smoothing;
    let volume = &mut project.volume;
    volume.real = smoothing * volume.real + (1.0 - smoothing) * flow.organic_volume;
    volume.fake *= config.volume.fake_decay;
    volume.total = volume.real + volume.fake;
    volume.history.push_back(volume.total);
    while volume.history.len() > config.volume_history_len {
        volume.history.pop_front();
    }

    // 5.
    let realized = (project.price / old_price).ln();
    update_rolling(&mut project.rolling, realized, &project.volume.history, &config);
    let l_eff = project_effective_liquidity(&project, &market, &config);
    let vp = volatility_pressure(&project, &market, l_eff, &config);

    // 6.
    let supply_before = project.s_circ - effects.supply_added;
    let supply_growth = if supply_before > 0.0 {
        effects.supply_added / supply_before
    } else {
        0.0
    };
    let trust = update_trust(&project, &market, vp, &config);
    let continuous_risk = update_risk(&project, &market, vp, supply_growth, &config);
    project.community_trust = trust.community;
    project.institutional_trust = trust.institutional;
    project.risk = apply_risk_jump(continuous_risk, effects.risk_jump);
    project.risk_memory = update_risk_memory(project.risk_memory, effects.risk_jump, &config);
    project.visibility = visibility(
        project.volume.total,
        project.market_cap,
        venue_vis_multiplier(&project, &config),
    );

    evolve_competitors(&mut market, &mut project, next_tick, &mut rng, &config, &mut log);
    update_leaderboard(&mut project, &mut market, &config, &mut log);
    revenue::accrue(&mut project, &config);
    revenue::collect(&mut project, next_tick, &config, &mut log);

    // 7.
    update_regulation(&mut project, &mut rng, &config, &mut log);
    update_listings(&mut project, &mut rng, &config, &mut log);
    check_crises(&mut project, l_eff, &config, &mut log);

    // 8.
    for left in project.cooldowns.values_mut() {
        *left = left.saturating_sub(1);
    }
    project.cooldowns.retain(|_, left| *left > 0);
    project.tick = next_tick;

    log::debug!(
        "tick={next_tick} price={:.6} mc={:.0} vp={vp:.4} ct={:.1} it={:.1} risk={:.1} rank={} actions={}/{}",
        project.price,
        project.market_cap,
        project.community_trust,
        project.institutional_trust,
        project.risk,
        project.rank,
        effects.applied,
        actions.len(),
    );

    log.flush_into(&mut history, config.log_window);

    GameState {
        project,
        market,
        config,
        log: history,
        rng_state: rng.state(),
    }
}

/// Run `n` ticks, feeding each tick the actions scheduled for the tick
/// it starts from. Used by the runner and tests.
pub fn run_ticks(state: &GameState, n: u64, schedule: &ActionSchedule) -> GameState {
    let mut current = state.clone();
    for _ in 0..n {
        let actions = schedule
            .get(&current.tick())
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        current = step(&current, actions);
    }
    current
}
