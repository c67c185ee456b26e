//! Market physics: pure functions over project and market state.
//!
//! Nothing here mutates `GameState` or holds state between calls. The
//! only side effect is RNG consumption in `update_price`. Every divisor
//! is floored by `config.liquidity_floor`; every logarithm takes `1 + x`.

use crate::{
    config::ConfigParams,
    rng::SimRng,
    state::{MarketState, ProjectState, RollingMetrics},
};
use std::collections::VecDeque;

/// Largest log-return a single tick may apply, in either direction.
const MAX_LOG_STEP: f64 = 3.0;
/// `exp` can underflow to zero after enough collapse ticks.
const PRICE_FLOOR: f64 = 1e-12;

pub fn market_cap(price: f64, s_circ: f64) -> f64 {
    price * s_circ
}

/// `L_eff = L · (1 + 0.01·IT) · (1 + 0.5·lockedPct) · tierMult`
pub fn effective_liquidity(liquidity: f64, it: f64, locked_pct: f64, tier_mult: f64) -> f64 {
    liquidity * (1.0 + 0.01 * it) * (1.0 + 0.5 * locked_pct) * tier_mult
}

/// Depth multiplier of the best venue the project trades on; 1 when unlisted.
pub fn tier_depth_multiplier(project: &ProjectState, config: &ConfigParams) -> f64 {
    project
        .best_listed_tier()
        .map(|tier| config.exchange_tiers.get(tier).depth_multiplier)
        .unwrap_or(1.0)
}

pub fn venue_volume_multiplier(project: &ProjectState, config: &ConfigParams) -> f64 {
    project
        .best_listed_tier()
        .map(|tier| config.exchange_tiers.get(tier).volume_multiplier)
        .unwrap_or(1.0)
}

pub fn venue_vis_multiplier(project: &ProjectState, config: &ConfigParams) -> f64 {
    project
        .best_listed_tier()
        .map(|tier| config.exchange_tiers.get(tier).vis_multiplier)
        .unwrap_or(1.0)
}

/// Effective liquidity of the project in the current market.
pub fn project_effective_liquidity(
    project: &ProjectState,
    market: &MarketState,
    config: &ConfigParams,
) -> f64 {
    effective_liquidity(
        project.liquidity.amount * market.global_liquidity,
        project.institutional_trust,
        project.liquidity.locked_pct,
        tier_depth_multiplier(project, config),
    )
}

/// Raw risk amplified by size and visibility.
///
/// `R · log10(1 + MC/1e6) · (1 + VIS/100)`
pub fn scaled_risk(risk: f64, market_cap: f64, visibility: f64) -> f64 {
    let mc_norm = (market_cap / 1_000_000.0).max(0.0);
    let size_factor = (1.0 + mc_norm).log10();
    let vis_factor = 1.0 + visibility / 100.0;
    risk * size_factor * vis_factor
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowOutcome {
    pub net_flow: f64,
    pub organic_volume: f64,
    pub buy_share: f64,
}

/// Organic order flow for one tick.
pub fn net_flow(project: &ProjectState, market: &MarketState, config: &ConfigParams) -> FlowOutcome {
    let p = &config.flow;
    let trust = (project.community_trust + project.institutional_trust) / 200.0;
    let msi_factor = (market.msi + 1.0) / 2.0;
    let vol_factor = 1.0 + project.rolling.volatility * p.vol_inflation;

    let organic_volume = project.market_cap
        * p.base_turnover
        * trust
        * msi_factor
        * vol_factor
        * venue_volume_multiplier(project, config);

    let r_scaled = scaled_risk(project.risk, project.market_cap, project.visibility);
    let buy_share = (0.5 + p.sentiment_share * market.msi + p.momentum_share * project.rolling.rank_momentum
        - p.volatility_share * project.rolling.volatility
        - p.risk_share * r_scaled)
        .clamp(p.buy_share_min, p.buy_share_max);

    let buys = organic_volume * buy_share;
    let sells = organic_volume * (1.0 - buy_share);
    let speculative = if market.msi > 0.0 {
        organic_volume * market.msi * p.speculative_share
    } else {
        0.0
    };

    FlowOutcome {
        net_flow: buys + speculative - sells,
        organic_volume,
        buy_share,
    }
}

/// Per-tick log drag from scaled risk and visibility.
pub fn price_drag(r_scaled: f64, visibility: f64, config: &ConfigParams) -> f64 {
    config.drag.risk * (r_scaled / 100.0) + config.drag.visibility * (visibility / 100.0)
}

/// Log-normal price step.
///
/// `P' = P · exp(k·netFlow/max(L_eff, ε) − drag + noise)`. Consumes one
/// gaussian from `rng`.
pub fn update_price(
    price: f64,
    net_flow: f64,
    l_eff: f64,
    project: &ProjectState,
    market: &MarketState,
    rng: &mut SimRng,
    config: &ConfigParams,
) -> f64 {
    let r_scaled = scaled_risk(project.risk, project.market_cap, project.visibility);
    let drag = price_drag(r_scaled, project.visibility, config);

    let noise_std =
        config.noise_sigma * (1.0 + market.msi.abs()) * (1.0 + project.rolling.volatility);
    let noise = rng.gaussian(0.0, noise_std);

    let flow_impact = config.price_k * (net_flow / l_eff.max(config.liquidity_floor));
    let exponent = (flow_impact - drag + noise).clamp(-MAX_LOG_STEP, MAX_LOG_STEP);

    (price * exponent.exp()).max(PRICE_FLOOR)
}

/// Constant-product pools hold USD value proportional to sqrt(price).
pub fn amm_liquidity(amount: f64, old_price: f64, new_price: f64) -> f64 {
    if old_price <= 0.0 {
        return amount;
    }
    amount * (new_price / old_price).sqrt()
}

/// Population standard deviation; 0 for fewer than two samples.
pub fn stdev<'a>(samples: impl IntoIterator<Item = &'a f64>) -> f64 {
    let values: Vec<f64> = samples.into_iter().copied().collect();
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    var.sqrt()
}

/// Composite instability signal.
///
/// `v1·|msi| + v2/sqrt(max(L_eff, ε)) + v3·R_scaled/100 + v4·stdev(returns)`
pub fn volatility_pressure(
    project: &ProjectState,
    market: &MarketState,
    l_eff: f64,
    config: &ConfigParams,
) -> f64 {
    let w = &config.pressure;
    let r_scaled = scaled_risk(project.risk, project.market_cap, project.visibility);
    w.sentiment * market.msi.abs()
        + w.inverse_liquidity / l_eff.max(config.liquidity_floor).sqrt()
        + w.risk * (r_scaled / 100.0)
        + w.returns * stdev(&project.rolling.returns)
}

/// Fold one realized return into the trailing metrics.
pub fn update_rolling(
    rolling: &mut RollingMetrics,
    realized_return: f64,
    volume_history: &VecDeque<f64>,
    config: &ConfigParams,
) {
    rolling.returns.push_back(realized_return);
    while rolling.returns.len() > config.volatility_window {
        rolling.returns.pop_front();
    }

    let alpha = config.volume.volatility_alpha;
    rolling.volatility = rolling.volatility * (1.0 - alpha) + realized_return.abs() * alpha;

    if let Some(stability) = volume_stability(volume_history) {
        rolling.volume_stability = stability;
    }
}

/// `1 − coefficient of variation` of the volume history, in [0, 1].
pub fn volume_stability(history: &VecDeque<f64>) -> Option<f64> {
    if history.len() < 2 {
        return None;
    }
    let mean = history.iter().sum::<f64>() / history.len() as f64;
    if mean <= 0.0 {
        return Some(0.0);
    }
    Some((1.0 - stdev(history) / mean).clamp(0.0, 1.0))
}

/// Derived visibility score from volume, market cap and venue reach.
pub fn visibility(volume_total: f64, market_cap: f64, vis_multiplier: f64) -> f64 {
    let base = ((volume_total.max(0.0) + 1.0).log10() * 10.0
        + (market_cap.max(0.0) + 1.0).log10() * 5.0)
        / 2.0;
    (base * (1.0 + 0.1 * (vis_multiplier - 1.0))).clamp(0.0, 100.0)
}
