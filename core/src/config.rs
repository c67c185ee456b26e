//! Tunable coefficients for the whole simulation.
//!
//! One `ConfigParams` is built per run and shared read-only behind an
//! `Arc` by every tick. The engine never writes to it. Overrides are
//! merged key by key over the defaults, so a JSON override file only
//! needs the keys it changes, down to a single field of one exchange tier.

use crate::{state::ExchangeTier, types::Tick};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigParams {
    /// Real seconds between ticks when a session is running.
    pub tick_seconds_real: f64,
    /// Price sensitivity `k` to net flow over effective liquidity.
    pub price_k: f64,
    /// Base σ of the log-price noise term.
    pub noise_sigma: f64,
    /// Length of the trailing return window.
    pub volatility_window: usize,
    /// Liquidity floor ε used wherever liquidity is a divisor.
    pub liquidity_floor: f64,
    /// Slippage coefficient applied to team-sell proceeds.
    pub slippage_k: f64,
    /// Maximum number of log entries kept on `GameState`.
    pub log_window: usize,
    /// Maximum number of samples in the volume history.
    pub volume_history_len: usize,

    pub flow: FlowParams,
    pub drag: DragParams,
    pub pressure: PressureWeights,
    pub volume: VolumeParams,
    pub trust_decay_rates: TrustDecayRates,
    pub trust_recovery_rates: TrustRecoveryRates,
    pub risk_base_rates: RiskBaseRates,
    pub risk_memory_decay: f64,
    pub detection_params: DetectionParams,
    pub regulation: RegulationParams,
    pub exchange_tiers: ExchangeTiers,
    pub ranking_weights: RankingWeights,
    pub crisis_thresholds: CrisisThresholds,
    /// Consecutive ticks at rank #1 needed to win.
    pub win_condition_ticks: Tick,
    pub actions: ActionCosts,
    pub market: MarketParams,
    pub competitors: CompetitorParams,
    pub revenue: RevenueParams,
}

impl Default for ConfigParams {
    fn default() -> Self {
        Self {
            tick_seconds_real: 0.5,
            price_k: 0.05,
            noise_sigma: 0.01,
            volatility_window: 20,
            liquidity_floor: 1_000.0,
            slippage_k: 0.1,
            log_window: 50,
            volume_history_len: 50,
            flow: FlowParams::default(),
            drag: DragParams::default(),
            pressure: PressureWeights::default(),
            volume: VolumeParams::default(),
            trust_decay_rates: TrustDecayRates::default(),
            trust_recovery_rates: TrustRecoveryRates::default(),
            risk_base_rates: RiskBaseRates::default(),
            risk_memory_decay: 0.01,
            detection_params: DetectionParams::default(),
            regulation: RegulationParams::default(),
            exchange_tiers: ExchangeTiers::default(),
            ranking_weights: RankingWeights::default(),
            crisis_thresholds: CrisisThresholds::default(),
            win_condition_ticks: 500,
            actions: ActionCosts::default(),
            market: MarketParams::default(),
            competitors: CompetitorParams::default(),
            revenue: RevenueParams::default(),
        }
    }
}

impl ConfigParams {
    /// Load overrides from a JSON file. Missing keys keep their defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        Self::from_json(&content).map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))
    }

    /// Merge a JSON override document over the shipped defaults.
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let overrides: Value = serde_json::from_str(text)?;
        let mut merged = serde_json::to_value(Self::default())?;
        merge_json(&mut merged, overrides);
        Ok(serde_json::from_value(merged)?)
    }
}

/// Objects merge recursively; any other override value replaces the base.
fn merge_json(base: &mut Value, overrides: Value) {
    match (base, overrides) {
        (Value::Object(base), Value::Object(overrides)) => {
            for (key, value) in overrides {
                merge_json(base.entry(key).or_insert(Value::Null), value);
            }
        }
        (slot, value) => *slot = value,
    }
}

// ── Market physics ─────────────────────────────────────────────────

/// Organic order-flow coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowParams {
    /// Fraction of market cap that turns over organically per tick.
    pub base_turnover: f64,
    /// How strongly realized volatility inflates organic volume.
    pub vol_inflation: f64,
    pub sentiment_share: f64,
    pub momentum_share: f64,
    pub volatility_share: f64,
    /// Buy-share depression per point of scaled risk.
    pub risk_share: f64,
    /// Speculative inflow per unit of positive sentiment.
    pub speculative_share: f64,
    pub buy_share_min: f64,
    pub buy_share_max: f64,
}

impl Default for FlowParams {
    fn default() -> Self {
        Self {
            base_turnover: 0.01,
            vol_inflation: 5.0,
            sentiment_share: 0.2,
            momentum_share: 0.1,
            volatility_share: 0.5,
            risk_share: 0.001,
            speculative_share: 0.5,
            buy_share_min: 0.05,
            buy_share_max: 0.95,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragParams {
    pub risk: f64,
    pub visibility: f64,
}

impl Default for DragParams {
    fn default() -> Self {
        Self { risk: 0.001, visibility: 0.0001 }
    }
}

/// Weights of the volatility-pressure composite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PressureWeights {
    pub sentiment: f64,
    /// Applied to `1/sqrt(L_eff)`. At 10 a $100k pool adds about 0.03.
    pub inverse_liquidity: f64,
    pub risk: f64,
    pub returns: f64,
}

impl Default for PressureWeights {
    fn default() -> Self {
        Self {
            sentiment: 0.05,
            inverse_liquidity: 10.0,
            risk: 0.1,
            returns: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeParams {
    /// Weight kept on the previous real volume each tick.
    pub real_smoothing: f64,
    /// Multiplicative decay of fake volume each tick.
    pub fake_decay: f64,
    /// Decay of the fake-volume share on ticks with no fake purchases.
    pub fake_share_decay: f64,
    /// EMA weight of the rolling volatility estimate.
    pub volatility_alpha: f64,
}

impl Default for VolumeParams {
    fn default() -> Self {
        Self {
            real_smoothing: 0.9,
            fake_decay: 0.8,
            fake_share_decay: 0.02,
            volatility_alpha: 0.1,
        }
    }
}

// ── Trust and risk ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TrustDecayRates {
    pub ct: CommunityDecay,
    pub it: InstitutionalDecay,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommunityDecay {
    pub vp: f64,
    pub news_neg: f64,
    pub team_sell: f64,
    pub delist: f64,
}

impl Default for CommunityDecay {
    fn default() -> Self {
        Self { vp: 0.2, news_neg: 1.0, team_sell: 10.0, delist: 15.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstitutionalDecay {
    pub vp: f64,
    pub risk: f64,
    pub detection: f64,
    pub regulator: f64,
}

impl Default for InstitutionalDecay {
    fn default() -> Self {
        Self { vp: 0.1, risk: 0.1, detection: 10.0, regulator: 0.3 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TrustRecoveryRates {
    pub ct: CommunityRecovery,
    pub it: InstitutionalRecovery,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommunityRecovery {
    pub stability: f64,
    pub transparency: f64,
    pub revenue: f64,
}

impl Default for CommunityRecovery {
    fn default() -> Self {
        Self { stability: 0.15, transparency: 0.02, revenue: 0.05 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstitutionalRecovery {
    pub stability: f64,
    pub locked: f64,
    pub clean_volume: f64,
}

impl Default for InstitutionalRecovery {
    fn default() -> Self {
        Self { stability: 0.1, locked: 0.05, clean_volume: 0.1 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskBaseRates {
    pub wash: f64,
    pub team_sell: f64,
    pub supply: f64,
    pub volatility: f64,
    pub bear: f64,
    pub decay: f64,
    /// MSI below which the market counts as bearish for risk drift.
    pub bear_threshold: f64,
}

impl Default for RiskBaseRates {
    fn default() -> Self {
        Self {
            wash: 1.0,
            team_sell: 0.5,
            supply: 5.0,
            volatility: 0.1,
            bear: 0.05,
            decay: 0.05,
            bear_threshold: -0.3,
        }
    }
}

// ── Regulation and listings ────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionParams {
    pub base_sensitivity: f64,
    pub tier_multiplier: f64,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self { base_sensitivity: 0.05, tier_multiplier: 1.5 }
    }
}

/// Risk gates of the regulation ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegulationParams {
    pub watchlist_risk: f64,
    pub investigation_risk: f64,
    pub charges_risk: f64,
    pub settlement_risk: f64,
    /// Ticks a stage must last before it can escalate again.
    pub min_stage_ticks: Tick,
    pub settlement_fine_pct: f64,
    pub settlement_fine_min: f64,
}

impl Default for RegulationParams {
    fn default() -> Self {
        Self {
            watchlist_risk: 50.0,
            investigation_risk: 65.0,
            charges_risk: 80.0,
            settlement_risk: 85.0,
            min_stage_ticks: 20,
            settlement_fine_pct: 0.25,
            settlement_fine_min: 5_000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeTierConfig {
    pub name: String,
    pub listing_req_it: f64,
    pub listing_req_l: f64,
    pub listing_fee: f64,
    pub volume_multiplier: f64,
    pub vis_multiplier: f64,
    /// Order-book depth the venue adds to effective liquidity.
    pub depth_multiplier: f64,
    pub delist_threshold_it: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeTiers {
    pub small: ExchangeTierConfig,
    pub mid: ExchangeTierConfig,
    pub major: ExchangeTierConfig,
}

impl ExchangeTiers {
    pub fn get(&self, tier: ExchangeTier) -> &ExchangeTierConfig {
        match tier {
            ExchangeTier::Small => &self.small,
            ExchangeTier::Mid => &self.mid,
            ExchangeTier::Major => &self.major,
        }
    }
}

impl Default for ExchangeTiers {
    fn default() -> Self {
        Self {
            small: ExchangeTierConfig {
                name: "HopEx".into(),
                listing_req_it: 20.0,
                listing_req_l: 50_000.0,
                listing_fee: 10_000.0,
                volume_multiplier: 1.5,
                vis_multiplier: 1.2,
                depth_multiplier: 1.2,
                delist_threshold_it: 10.0,
            },
            mid: ExchangeTierConfig {
                name: "GateKeep".into(),
                listing_req_it: 50.0,
                listing_req_l: 250_000.0,
                listing_fee: 50_000.0,
                volume_multiplier: 3.0,
                vis_multiplier: 2.0,
                depth_multiplier: 1.6,
                delist_threshold_it: 30.0,
            },
            major: ExchangeTierConfig {
                name: "Binanza".into(),
                listing_req_it: 80.0,
                listing_req_l: 1_000_000.0,
                listing_fee: 250_000.0,
                volume_multiplier: 8.0,
                vis_multiplier: 5.0,
                depth_multiplier: 2.5,
                delist_threshold_it: 60.0,
            },
        }
    }
}

// ── Ranking and crises ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingWeights {
    pub mc: f64,
    pub trust: f64,
    pub liquidity: f64,
    pub volatility: f64,
    pub fake_penalty: f64,
    pub risk_penalty: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            mc: 0.5,
            trust: 0.2,
            liquidity: 0.1,
            volatility: 0.1,
            fake_penalty: 0.5,
            risk_penalty: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrisisThresholds {
    /// Effective liquidity (USD) below which the pool counts as dead.
    pub liquidity_death: f64,
    pub trust_collapse: f64,
    pub risk_explosion: f64,
    /// Ticks between repeated crisis log entries of the same kind.
    pub alert_cooldown: Tick,
}

impl Default for CrisisThresholds {
    fn default() -> Self {
        Self {
            liquidity_death: 1_000.0,
            trust_collapse: 10.0,
            risk_explosion: 90.0,
            alert_cooldown: 25,
        }
    }
}

// ── Player actions ─────────────────────────────────────────────────

/// Cost/effect table for every player action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionCosts {
    pub marketing_cost: f64,
    pub marketing_ct_boost: f64,
    /// Buy flow generated per USD of marketing spend.
    pub marketing_flow_multiplier: f64,

    pub fake_volume_cost: f64,
    pub fake_volume_multiplier: f64,
    pub fake_volume_share_step: f64,
    pub fake_volume_risk_jump: f64,

    pub wash_cost: f64,
    pub wash_volume_multiplier: f64,
    pub wash_share_step: f64,
    pub wash_risk_jump: f64,

    pub team_sell_fraction: f64,
    pub team_sell_risk_jump: f64,
    pub team_sell_cooldown: Tick,
    /// Share of `trust_decay_rates.ct.team_sell` applied per dump.
    pub team_sell_ct_shock: f64,

    pub stake_cost: f64,
    pub stake_lock_step: f64,

    pub nft_cost: f64,
    pub nft_ct_boost: f64,
    pub nft_risk_jump: f64,
    pub nft_cooldown: Tick,

    pub tech_cost: f64,
    pub tech_efficiency_step: f64,
    pub tech_it_boost: f64,
    pub tech_risk_relief: f64,

    pub bribe_cost: f64,
    pub bribe_cooldown: Tick,
    pub bribe_risk_jump: f64,
}

impl Default for ActionCosts {
    fn default() -> Self {
        Self {
            marketing_cost: 5_000.0,
            marketing_ct_boost: 5.0,
            marketing_flow_multiplier: 2.0,
            fake_volume_cost: 1_000.0,
            fake_volume_multiplier: 3.0,
            fake_volume_share_step: 0.05,
            fake_volume_risk_jump: 1.0,
            wash_cost: 1_000.0,
            wash_volume_multiplier: 5.0,
            wash_share_step: 0.1,
            wash_risk_jump: 2.0,
            team_sell_fraction: 0.01,
            team_sell_risk_jump: 5.0,
            team_sell_cooldown: 10,
            team_sell_ct_shock: 0.2,
            stake_cost: 10_000.0,
            stake_lock_step: 0.05,
            nft_cost: 15_000.0,
            nft_ct_boost: 2.0,
            nft_risk_jump: 1.0,
            nft_cooldown: 30,
            tech_cost: 20_000.0,
            tech_efficiency_step: 0.05,
            tech_it_boost: 2.0,
            tech_risk_relief: 1.0,
            bribe_cost: 25_000.0,
            bribe_cooldown: 50,
            bribe_risk_jump: 3.0,
        }
    }
}

// ── Market regime and competitors ──────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketParams {
    pub bull_target: f64,
    pub bear_target: f64,
    pub crab_target: f64,
    pub neutral_target: f64,
    /// Pull of MSI toward the regime target per tick.
    pub msi_reversion: f64,
    pub msi_noise: f64,
    pub regime_min_ticks: Tick,
    pub regime_max_ticks: Tick,
    pub news_noise: f64,
    /// News sentiment below which community trust takes a hit.
    pub news_neg_threshold: f64,
    /// Sensitivity of the global liquidity multiplier to MSI.
    pub liquidity_beta: f64,
}

impl Default for MarketParams {
    fn default() -> Self {
        Self {
            bull_target: 0.6,
            bear_target: -0.6,
            crab_target: 0.0,
            neutral_target: 0.1,
            msi_reversion: 0.05,
            msi_noise: 0.02,
            regime_min_ticks: 50,
            regime_max_ticks: 200,
            news_noise: 0.2,
            news_neg_threshold: -0.5,
            liquidity_beta: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompetitorParams {
    /// Minimum ticks between two strategic moves of one rival.
    pub action_interval: Tick,
    pub action_cost: f64,
    /// Full CT hit of one FUD campaign, before appetite and visibility.
    pub fud_ct_hit: f64,
    /// FUD only lands when the rival sits within this many ranks of the player.
    pub fud_rank_reach: u32,
    pub pump_mc_boost: f64,
    pub pump_trust_cost: f64,
    pub utility_trust_gain: f64,
    pub utility_mc_boost: f64,
    /// Budget income per tick as a fraction of market cap.
    pub budget_yield: f64,
}

impl Default for CompetitorParams {
    fn default() -> Self {
        Self {
            action_interval: 10,
            action_cost: 2_000.0,
            fud_ct_hit: 1.0,
            fud_rank_reach: 2,
            pump_mc_boost: 0.05,
            pump_trust_cost: 2.0,
            utility_trust_gain: 1.0,
            utility_mc_boost: 0.01,
            budget_yield: 0.000_01,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevenueParams {
    /// Auto-collect happens on ticks that are multiples of this.
    pub collect_interval: Tick,
    pub dex_fee_rate: f64,
    pub cex_fee_rate: f64,
    pub staking_yield: f64,
    pub nft_royalty: f64,
    pub presale_flat: f64,
}

impl Default for RevenueParams {
    fn default() -> Self {
        Self {
            collect_interval: 10,
            dex_fee_rate: 0.003,
            cex_fee_rate: 0.001,
            staking_yield: 0.000_001,
            nft_royalty: 2.0,
            presale_flat: 50.0,
        }
    }
}
