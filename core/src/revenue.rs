//! Revenue streams: per-tick accrual and periodic auto-collection.
//!
//! RULE: Streams accrue every tick but only reach the treasury on ticks
//! that are multiples of `revenue.collect_interval`. Locked streams earn
//! nothing.

use crate::{
    config::ConfigParams,
    event::TickLog,
    state::{ProjectState, RevenueStream},
    types::Tick,
};

fn earn(stream: &RevenueStream, base: f64) -> f64 {
    if !stream.unlocked {
        return 0.0;
    }
    (base * stream.efficiency * f64::from(stream.level)).max(0.0)
}

/// Add this tick's earnings to each stream's `accrued` balance.
pub fn accrue(project: &mut ProjectState, config: &ConfigParams) {
    let p = &config.revenue;
    let listed = project.best_listed_tier().is_some();

    let dex = earn(&project.revenue.dex, project.volume.real * p.dex_fee_rate);
    let cex = if listed {
        earn(&project.revenue.cex, project.volume.total * p.cex_fee_rate)
    } else {
        0.0
    };
    let staking = earn(&project.revenue.staking, project.market_cap * p.staking_yield);
    let nft = earn(&project.revenue.nft, project.visibility * p.nft_royalty);
    let presale = earn(&project.revenue.presale, p.presale_flat);

    let streams = &mut project.revenue;
    streams.dex.accrued += dex;
    streams.cex.accrued += cex;
    streams.staking.accrued += staking;
    streams.nft.accrued += nft;
    streams.presale.accrued += presale;
}

/// Move auto-collected balances to the treasury when `tick` is a
/// collection boundary. Returns the amount collected.
pub fn collect(project: &mut ProjectState, tick: Tick, config: &ConfigParams, log: &mut TickLog) -> f64 {
    let interval = config.revenue.collect_interval.max(1);
    if tick % interval != 0 {
        return 0.0;
    }

    let streams = &mut project.revenue;
    let mut total = 0.0;
    for stream in [
        &mut streams.dex,
        &mut streams.cex,
        &mut streams.staking,
        &mut streams.nft,
        &mut streams.presale,
    ] {
        if stream.unlocked && stream.auto_collect {
            total += stream.accrued;
            stream.accrued = 0.0;
        }
    }

    if total > 0.0 {
        project.treasury += total;
        log::debug!("tick={tick} collected revenue={total:.2}");
        if total >= 1_000.0 {
            log.info("Revenue Collected", format!("${total:.0} moved to the treasury."));
        }
    }
    total
}
