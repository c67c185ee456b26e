//! Discrete triggers: the regulator ladder, exchange delistings, and
//! crisis alerts.
//!
//! RULE: The ladder only moves forward. A stage is never left except by
//! escalating to the next one.
//! RULE: Draws happen only for eligible events, in the order regulation,
//! then exchanges by tier, so an ineligible tick consumes no randomness.

use crate::{
    config::ConfigParams,
    dynamics::clamp_score,
    event::TickLog,
    rng::SimRng,
    state::{cooldown, ExchangeTier, ListingStatus, ProjectState, RegulationStage},
};

const WARNING_STEP: f64 = 5.0;
const WARNING_RELIEF: f64 = 1.0;
const WARNING_LIMIT: f64 = 100.0;
const DELIST_GRACE_TICKS: u64 = 10;
const BRIBE_FACTOR: f64 = 0.5;

/// Risk needed to enter `stage`.
pub fn stage_threshold(stage: RegulationStage, config: &ConfigParams) -> f64 {
    let r = &config.regulation;
    match stage {
        RegulationStage::Normal => 0.0,
        RegulationStage::Watchlist => r.watchlist_risk,
        RegulationStage::Investigation => r.investigation_risk,
        RegulationStage::Charges => r.charges_risk,
        RegulationStage::Settlement => r.settlement_risk,
    }
}

/// Per-tick probability that the regulator escalates.
pub fn escalation_probability(project: &ProjectState, config: &ConfigParams) -> f64 {
    let d = &config.detection_params;
    let tier_factor = if project
        .listed_tiers()
        .any(|t| matches!(t, ExchangeTier::Mid | ExchangeTier::Major))
    {
        d.tier_multiplier
    } else {
        1.0
    };
    let bribe_factor = if project.cooldown_active(cooldown::REGULATOR_BRIBED) {
        BRIBE_FACTOR
    } else {
        1.0
    };
    let p = d.base_sensitivity
        * (project.risk / 100.0)
        * tier_factor
        * (1.0 + project.risk_memory / 50.0)
        * bribe_factor;
    p.clamp(0.0, 1.0)
}

/// Advance the stage timer and maybe escalate one step.
pub fn update_regulation(
    project: &mut ProjectState,
    rng: &mut SimRng,
    config: &ConfigParams,
    log: &mut TickLog,
) {
    project.regulation.timer += 1;

    let current = project.regulation.stage;
    let Some(next) = current.next() else {
        return;
    };
    let seasoned = current == RegulationStage::Normal
        || project.regulation.timer >= config.regulation.min_stage_ticks;
    if !seasoned || project.risk < stage_threshold(next, config) {
        return;
    }

    let p = escalation_probability(project, config);
    if !rng.chance(p) {
        return;
    }

    project.regulation.stage = next;
    project.regulation.timer = 0;
    log::warn!("tick={} regulation escalated to {next:?} (risk={:.1})", project.tick, project.risk);
    enter_stage(project, next, config, log);
}

fn enter_stage(project: &mut ProjectState, stage: RegulationStage, config: &ConfigParams, log: &mut TickLog) {
    let dec = &config.trust_decay_rates;
    match stage {
        RegulationStage::Normal => {}
        RegulationStage::Watchlist => {
            log.warning("Regulator Watchlist", "Your project has been flagged for review.");
        }
        RegulationStage::Investigation => {
            project.flags.investigated = true;
            project.institutional_trust = clamp_score(project.institutional_trust - dec.it.detection);
            log.warning("Formal Investigation", "Subpoenas have been issued to the core team.");
        }
        RegulationStage::Charges => {
            project.community_trust = clamp_score(project.community_trust - dec.ct.delist * 0.5);
            log.crisis("Charges Filed", "The regulator has filed charges against the project.");
        }
        RegulationStage::Settlement => {
            let r = &config.regulation;
            let fine = r
                .settlement_fine_min
                .max(r.settlement_fine_pct * project.treasury)
                .min(project.treasury);
            project.treasury -= fine;
            log.crisis("Settlement", format!("Paid a ${fine:.0} fine to close the case."));
        }
    }
}

/// Warning points, pending delist timers, and risk-driven delist draws
/// for every live listing. A timer delisting leaves the door open; a
/// risk-explosion delisting blacklists the project on that venue.
pub fn update_listings(
    project: &mut ProjectState,
    rng: &mut SimRng,
    config: &ConfigParams,
    log: &mut TickLog,
) {
    if project.exchanges.is_empty() {
        return;
    }

    let it = project.institutional_trust;
    let exploding = project.risk >= config.crisis_thresholds.risk_explosion;
    let p_risk_delist =
        (config.detection_params.base_sensitivity * config.detection_params.tier_multiplier).clamp(0.0, 1.0);

    let mut removed = Vec::new();
    for (tier, listing) in project.exchanges.iter_mut() {
        if !listing.is_listed() {
            continue;
        }
        let threshold = config.exchange_tiers.get(*tier).delist_threshold_it;
        listing.warning_points = if it < threshold {
            (listing.warning_points + WARNING_STEP).min(WARNING_LIMIT)
        } else {
            (listing.warning_points - WARNING_RELIEF).max(0.0)
        };

        let mut delist = None;
        let timer = listing.delist_timer;
        match timer {
            Some(left) if left <= 1 => delist = Some(ListingStatus::Delisted),
            Some(left) => listing.delist_timer = Some(left - 1),
            None if listing.warning_points >= WARNING_LIMIT => {
                listing.delist_timer = Some(DELIST_GRACE_TICKS);
                log.warning(
                    "Delisting Notice",
                    format!("{} will delist the token in {DELIST_GRACE_TICKS} ticks.", listing.name),
                );
            }
            None => {}
        }

        if delist.is_none() && exploding && rng.chance(p_risk_delist) {
            delist = Some(ListingStatus::Blacklisted);
        }

        if let Some(status) = delist {
            listing.status = status;
            listing.delist_timer = None;
            removed.push(listing.name.clone());
        }
    }

    for name in &removed {
        log::warn!("tick={} delisted from {name}", project.tick);
        project.community_trust = clamp_score(project.community_trust - config.trust_decay_rates.ct.delist);
        log.crisis("Delisted", format!("{name} has halted trading of the token."));
    }

    if !removed.is_empty() && project.best_listed_tier().is_none() {
        project.flags.delisted = true;
    }
}

/// Threshold alerts. Each kind repeats at most once per
/// `crisis_thresholds.alert_cooldown` ticks.
pub fn check_crises(project: &mut ProjectState, l_eff: f64, config: &ConfigParams, log: &mut TickLog) {
    let c = &config.crisis_thresholds;

    if l_eff < c.liquidity_death && !project.cooldown_active(cooldown::ALERT_LIQUIDITY) {
        if !project.flags.rugged {
            log::warn!("tick={} liquidity dead (l_eff={l_eff:.0}); project rugged", project.tick);
        }
        project.flags.rugged = true;
        project.set_cooldown(cooldown::ALERT_LIQUIDITY, c.alert_cooldown);
        log.crisis("Liquidity Gone", "The pool is too thin to trade. Holders call it a rug.");
    }

    if project.community_trust < c.trust_collapse && !project.cooldown_active(cooldown::ALERT_TRUST) {
        log::warn!("tick={} community trust collapsed ({:.1})", project.tick, project.community_trust);
        project.set_cooldown(cooldown::ALERT_TRUST, c.alert_cooldown);
        log.crisis("Trust Collapse", "The community has turned on the project.");
    }

    if project.risk >= c.risk_explosion && !project.cooldown_active(cooldown::ALERT_RISK) {
        log::warn!("tick={} risk exploded ({:.1})", project.tick, project.risk);
        project.set_cooldown(cooldown::ALERT_RISK, c.alert_cooldown);
        log.crisis("Risk Explosion", "Every desk in the market is watching you now.");
    }
}
