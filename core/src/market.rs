//! Global market sentiment.
//!
//! RULE: The market evolves before any project physics run, so every
//! price, flow and trust term of a tick sees the same MSI.
//! RNG draws happen in a fixed order: regime switch (pick + duration,
//! only when the timer runs out), MSI noise, news noise.

use crate::{
    config::{ConfigParams, MarketParams},
    event::TickLog,
    rng::SimRng,
    state::{MarketState, Regime},
};

/// The MSI level a regime pulls toward.
pub fn regime_target(regime: Regime, params: &MarketParams) -> f64 {
    match regime {
        Regime::Bull => params.bull_target,
        Regime::Bear => params.bear_target,
        Regime::Crab => params.crab_target,
        Regime::Neutral => params.neutral_target,
    }
}

pub fn evolve_market(
    market: &mut MarketState,
    rng: &mut SimRng,
    config: &ConfigParams,
    log: &mut TickLog,
) {
    let params = &config.market;

    market.regime_timer = market.regime_timer.saturating_sub(1);
    if market.regime_timer == 0 {
        switch_regime(market, rng, params, log);
    }

    let target = regime_target(market.regime, params);
    let noise = rng.gaussian(0.0, params.msi_noise);
    market.msi = (market.msi + params.msi_reversion * (target - market.msi) + noise).clamp(-1.0, 1.0);

    let news = 0.7 * market.msi + rng.gaussian(0.0, params.news_noise);
    market.indicators.news_sentiment = news.clamp(-1.0, 1.0);
    market.indicators.btc_trend = (0.9 * market.indicators.btc_trend + 0.1 * market.msi).clamp(-1.0, 1.0);
    market.global_liquidity = 1.0 + params.liquidity_beta * market.msi;
}

fn switch_regime(market: &mut MarketState, rng: &mut SimRng, params: &MarketParams, log: &mut TickLog) {
    let previous = market.regime;
    market.regime = rng.pick(&Regime::ALL).copied().unwrap_or(previous);
    let duration = rng.int(params.regime_min_ticks as i64, params.regime_max_ticks as i64);
    market.regime_timer = duration.max(1) as u64;

    if market.regime != previous {
        log::info!(
            "regime {} -> {} for {} ticks",
            previous.as_str(),
            market.regime.as_str(),
            market.regime_timer
        );
        let headline = match market.regime {
            Regime::Bull => "Bull Run",
            Regime::Bear => "Bear Market",
            Regime::Crab => "Sideways Chop",
            Regime::Neutral => "Markets Calm",
        };
        log.news(
            headline,
            format!("Analysts call a {} market.", market.regime.as_str()),
        );
    }
}
