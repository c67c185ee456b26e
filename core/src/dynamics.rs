//! Trust and risk dynamics.
//!
//! Community trust (CT), institutional trust (IT) and risk (R) are each
//! recomputed from the previous value plus this tick's gain and loss
//! terms, then clamped to [0, 100]. Discrete shocks (team dumps,
//! delistings, regulatory charges) are applied where the event happens,
//! not here.

use crate::{
    config::ConfigParams,
    physics::scaled_risk,
    state::{cooldown, MarketState, ProjectState},
};

pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 100.0;

pub fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        return SCORE_MIN;
    }
    value.clamp(SCORE_MIN, SCORE_MAX)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrustUpdate {
    pub community: f64,
    pub institutional: f64,
}

/// `stability = max(0, 1 − VP)`
pub fn stability(vp: f64) -> f64 {
    (1.0 - vp).max(0.0)
}

pub fn update_trust(
    project: &ProjectState,
    market: &MarketState,
    vp: f64,
    config: &ConfigParams,
) -> TrustUpdate {
    let rec = &config.trust_recovery_rates;
    let dec = &config.trust_decay_rates;
    let stable = stability(vp);

    let transparency = if project.flags.rugged { 0.0 } else { 0.05 };
    let revenue = if project.revenue.staking.unlocked { 0.02 } else { 0.0 };
    let gain_ct = rec.ct.stability * stable
        + rec.ct.transparency * transparency
        + rec.ct.revenue * revenue;

    let bad_news = market.indicators.news_sentiment < config.market.news_neg_threshold;
    let loss_ct = dec.ct.vp * vp * 2.0 + dec.ct.news_neg * if bad_news { 0.5 } else { 0.0 };

    // Clean volume only reassures institutions when the market is calm.
    // Every IT gain shrinks with the headroom left below 100.
    let headroom = 1.0 - project.institutional_trust / SCORE_MAX;
    let gain_it = (rec.it.stability * stable
        + rec.it.locked * project.liquidity.locked_pct
        + rec.it.clean_volume * (1.0 - project.rolling.fake_share) * stable)
        * headroom.max(0.0);

    let r_scaled = scaled_risk(project.risk, project.market_cap, project.visibility);
    let regulator = if project.regulation.stage.is_active() { 0.5 } else { 0.0 };
    let loss_it = dec.it.vp * vp + dec.it.risk * (r_scaled / 1000.0) + dec.it.regulator * regulator;

    TrustUpdate {
        community: clamp_score(project.community_trust + gain_ct - loss_ct),
        institutional: clamp_score(project.institutional_trust + gain_it - loss_it),
    }
}

/// Continuous risk drift. The caller adds the tick's discrete jump on top
/// and clamps again.
///
/// `supply_growth` is this tick's fractional growth of circulating supply.
pub fn update_risk(
    project: &ProjectState,
    market: &MarketState,
    vp: f64,
    supply_growth: f64,
    config: &ConfigParams,
) -> f64 {
    let rates = &config.risk_base_rates;

    let bear = if market.msi < rates.bear_threshold { rates.bear } else { 0.0 };
    let dumping = if project.cooldown_active(cooldown::TEAM_SELL) { rates.team_sell } else { 0.0 };
    let risk_up = bear
        + rates.volatility * vp
        + dumping
        + rates.wash * project.rolling.fake_share
        + rates.supply * supply_growth.max(0.0);

    // Regulators slow the natural forgetting of risk, as does being watched.
    let regulator_damping = if project.regulation.stage.is_active() { 0.3 } else { 0.0 };
    let vis_damping = 0.5 * (project.visibility / 100.0);
    let risk_down = rates.decay * (1.0 - vis_damping) * (1.0 - regulator_damping);

    clamp_score(project.risk + risk_up - risk_down)
}

/// Apply the tick's accumulated discrete jump after the continuous update.
pub fn apply_risk_jump(continuous: f64, jump: f64) -> f64 {
    clamp_score(clamp_score(continuous) + jump)
}

/// `mem' = mem·(1 − decay) + max(jump, 0)`
pub fn update_risk_memory(memory: f64, jump: f64, config: &ConfigParams) -> f64 {
    (memory * (1.0 - config.risk_memory_decay) + jump.max(0.0)).max(0.0)
}
