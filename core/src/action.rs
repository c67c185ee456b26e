//! Player actions and the per-tick action fold.
//!
//! RULE: An action whose precondition fails (not enough treasury, no
//! team tokens left, cooldown running) is skipped silently. It leaves no
//! trace in state and writes no log entry.

use crate::{
    config::ConfigParams,
    dynamics::clamp_score,
    event::TickLog,
    physics::project_effective_liquidity,
    state::{cooldown, ExchangeListing, ExchangeTier, ListingStatus, MarketState, ProjectState},
};
use serde::{Deserialize, Serialize};

/// All player-issued actions. Each variant carries only what it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameAction {
    BuyMarketing,
    BuyFakeVolume,
    WashTrade,
    TeamSell,
    StakeTokens,
    LaunchNft,
    UpgradeTech,
    BribeRegulator,
    ApplyListing { tier: ExchangeTier },
}

impl GameAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::BuyMarketing => "buy_marketing",
            Self::BuyFakeVolume => "buy_fake_volume",
            Self::WashTrade => "wash_trade",
            Self::TeamSell => "team_sell",
            Self::StakeTokens => "stake_tokens",
            Self::LaunchNft => "launch_nft",
            Self::UpgradeTech => "upgrade_tech",
            Self::BribeRegulator => "bribe_regulator",
            Self::ApplyListing { .. } => "apply_listing",
        }
    }

    /// Parse the short form used on the command line, e.g. `team_sell`
    /// or `apply_listing:mid`.
    pub fn parse_short(s: &str) -> anyhow::Result<Self> {
        let (name, arg) = match s.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (s, None),
        };
        let action = match name {
            "buy_marketing" => Self::BuyMarketing,
            "buy_fake_volume" => Self::BuyFakeVolume,
            "wash_trade" => Self::WashTrade,
            "team_sell" => Self::TeamSell,
            "stake_tokens" => Self::StakeTokens,
            "launch_nft" => Self::LaunchNft,
            "upgrade_tech" => Self::UpgradeTech,
            "bribe_regulator" => Self::BribeRegulator,
            "apply_listing" => {
                let tier = arg.ok_or_else(|| anyhow::anyhow!("apply_listing needs a tier"))?;
                Self::ApplyListing { tier: tier.parse()? }
            }
            other => anyhow::bail!("unknown action '{other}'"),
        };
        Ok(action)
    }
}

/// What a folded batch did beyond its direct edits to the project.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionEffects {
    /// Signed USD flow to add to the organic net flow.
    pub net_flow: f64,
    /// Additive risk applied after the continuous risk update.
    pub risk_jump: f64,
    /// Tokens moved into circulation this tick.
    pub supply_added: f64,
    pub bought_fake_volume: bool,
    pub applied: usize,
    pub skipped: usize,
}

/// Fold `actions` into `project` in arrival order.
pub fn apply_actions(
    project: &mut ProjectState,
    market: &MarketState,
    actions: &[GameAction],
    config: &ConfigParams,
    log: &mut TickLog,
) -> ActionEffects {
    let mut effects = ActionEffects::default();
    for action in actions {
        if apply_one(project, market, action, config, log, &mut effects) {
            effects.applied += 1;
        } else {
            effects.skipped += 1;
            log::debug!("tick={} skipped {}: precondition failed", project.tick, action.name());
        }
    }
    effects
}

fn spend(project: &mut ProjectState, cost: f64) -> bool {
    if project.treasury >= cost {
        project.treasury -= cost;
        true
    } else {
        false
    }
}

fn add_fake_volume(project: &mut ProjectState, usd: f64, share_step: f64) {
    project.volume.fake += usd;
    project.volume.total = project.volume.real + project.volume.fake;
    project.rolling.fake_share = (project.rolling.fake_share + share_step).min(1.0);
}

fn apply_one(
    project: &mut ProjectState,
    market: &MarketState,
    action: &GameAction,
    config: &ConfigParams,
    log: &mut TickLog,
    effects: &mut ActionEffects,
) -> bool {
    let costs = &config.actions;
    match action {
        GameAction::BuyMarketing => {
            if !spend(project, costs.marketing_cost) {
                return false;
            }
            project.community_trust = clamp_score(project.community_trust + costs.marketing_ct_boost);
            effects.net_flow += costs.marketing_cost * costs.marketing_flow_multiplier;
            log.success(
                "Marketing Push",
                format!("Spent ${:.0} on a campaign.", costs.marketing_cost),
            );
        }

        GameAction::BuyFakeVolume => {
            if !spend(project, costs.fake_volume_cost) {
                return false;
            }
            add_fake_volume(
                project,
                costs.fake_volume_cost * costs.fake_volume_multiplier,
                costs.fake_volume_share_step,
            );
            effects.risk_jump += costs.fake_volume_risk_jump;
            effects.bought_fake_volume = true;
            log.info(
                "Volume Bots Hired",
                format!("${:.0} of bot volume queued.", costs.fake_volume_cost * costs.fake_volume_multiplier),
            );
        }

        GameAction::WashTrade => {
            if !spend(project, costs.wash_cost) {
                return false;
            }
            add_fake_volume(
                project,
                costs.wash_cost * costs.wash_volume_multiplier,
                costs.wash_share_step,
            );
            effects.risk_jump += costs.wash_risk_jump;
            effects.bought_fake_volume = true;
            log.warning(
                "Wash Trading",
                format!("Cycled ${:.0} between our own wallets.", costs.wash_cost * costs.wash_volume_multiplier),
            );
        }

        GameAction::TeamSell => {
            let headroom = (project.s_max - project.s_circ).max(0.0);
            let amount = (project.team_tokens_remaining * costs.team_sell_fraction).min(headroom);
            if amount <= 0.0 {
                return false;
            }
            project.team_tokens_remaining -= amount;
            project.s_circ += amount;

            let value = amount * project.price;
            let l_eff = project_effective_liquidity(project, market, config);
            let slippage = (config.slippage_k * value / l_eff.max(config.liquidity_floor)).min(0.5);
            let proceeds = value * (1.0 - slippage);
            project.treasury += proceeds;

            project.community_trust = clamp_score(
                project.community_trust
                    - config.trust_decay_rates.ct.team_sell * costs.team_sell_ct_shock,
            );
            project.set_cooldown(cooldown::TEAM_SELL, costs.team_sell_cooldown);

            effects.net_flow -= value;
            effects.risk_jump += costs.team_sell_risk_jump;
            effects.supply_added += amount;
            log.warning(
                "Team Sell",
                format!("Sold {amount:.0} tokens for ${proceeds:.0}."),
            );
        }

        GameAction::StakeTokens => {
            if !spend(project, costs.stake_cost) {
                return false;
            }
            project.revenue.staking.level_up(0.8);
            project.liquidity.locked_pct = (project.liquidity.locked_pct + costs.stake_lock_step).min(1.0);
            log.success(
                "Staking Program",
                format!("Staking now at level {}.", project.revenue.staking.level),
            );
        }

        GameAction::LaunchNft => {
            if project.cooldown_active(cooldown::NFT_DROP) || !spend(project, costs.nft_cost) {
                return false;
            }
            project.revenue.nft.level_up(0.7);
            project.community_trust = clamp_score(project.community_trust + costs.nft_ct_boost);
            project.set_cooldown(cooldown::NFT_DROP, costs.nft_cooldown);
            effects.risk_jump += costs.nft_risk_jump;
            log.success(
                "NFT Drop",
                format!("Collection #{} minted out.", project.revenue.nft.level),
            );
        }

        GameAction::UpgradeTech => {
            if !spend(project, costs.tech_cost) {
                return false;
            }
            let dex = &mut project.revenue.dex;
            dex.efficiency = (dex.efficiency + costs.tech_efficiency_step).min(1.0);
            project.institutional_trust = clamp_score(project.institutional_trust + costs.tech_it_boost);
            effects.risk_jump -= costs.tech_risk_relief;
            log.success(
                "Protocol Upgrade",
                format!("DEX efficiency now {:.0}%.", project.revenue.dex.efficiency * 100.0),
            );
        }

        GameAction::BribeRegulator => {
            if !project.regulation.stage.is_active() || !spend(project, costs.bribe_cost) {
                return false;
            }
            project.set_cooldown(cooldown::REGULATOR_BRIBED, costs.bribe_cooldown);
            effects.risk_jump += costs.bribe_risk_jump;
            log.warning(
                "Quiet Payment",
                format!("${:.0} changed hands. The file moves slower for now.", costs.bribe_cost),
            );
        }

        GameAction::ApplyListing { tier } => {
            let tier_cfg = config.exchange_tiers.get(*tier);
            let blocked = project
                .exchanges
                .get(tier)
                .is_some_and(|l| matches!(l.status, ListingStatus::Listed | ListingStatus::Blacklisted));
            if blocked
                || project.institutional_trust < tier_cfg.listing_req_it
                || project.liquidity.amount < tier_cfg.listing_req_l
                || !spend(project, tier_cfg.listing_fee)
            {
                return false;
            }
            project
                .exchanges
                .insert(*tier, ExchangeListing::listed(*tier, &tier_cfg.name));
            if !project.revenue.cex.unlocked {
                project.revenue.cex.level_up(0.9);
            }
            log.success(
                "Exchange Listing",
                format!("Now trading on {} ({} tier).", tier_cfg.name, tier.as_str()),
            );
        }
    }
    true
}
