//! World state: the player's project, the market around it, and the
//! `GameState` aggregate that the engine replaces every tick.
//!
//! Everything here is plain data. Maps are `BTreeMap` so iteration order,
//! and therefore RNG consumption and serialized output, is stable.

use crate::{
    config::ConfigParams,
    event::EventLogEntry,
    types::{EntityId, RngState, Tick},
};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, VecDeque},
    fmt,
    str::FromStr,
    sync::Arc,
};

/// Named cooldown timers stored in `ProjectState::cooldowns`.
pub mod cooldown {
    pub const TEAM_SELL: &str = "team_sell";
    pub const NFT_DROP: &str = "nft_drop";
    pub const REGULATOR_BRIBED: &str = "regulator_bribed";
    pub const ALERT_LIQUIDITY: &str = "alert_liquidity";
    pub const ALERT_TRUST: &str = "alert_trust";
    pub const ALERT_RISK: &str = "alert_risk";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioType {
    NewChain,
    ExistingToken,
    DeadProject,
}

impl ScenarioType {
    pub const ALL: [ScenarioType; 3] = [Self::NewChain, Self::ExistingToken, Self::DeadProject];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewChain => "new_chain",
            Self::ExistingToken => "existing_token",
            Self::DeadProject => "dead_project",
        }
    }
}

impl fmt::Display for ScenarioType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScenarioType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown scenario '{s}'"))
    }
}

// ── Project ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    pub real: f64,
    pub fake: f64,
    pub total: f64,
    /// Trailing totals, oldest first.
    pub history: VecDeque<f64>,
}

impl Volume {
    pub fn organic(real: f64) -> Self {
        Self { real, fake: 0.0, total: real, history: VecDeque::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Liquidity {
    /// Pool depth in USD.
    pub amount: f64,
    /// Locked fraction of the pool, in [0, 1].
    pub locked_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RevenueStream {
    pub unlocked: bool,
    pub level: u32,
    /// Collection efficiency in [0, 1].
    pub efficiency: f64,
    pub auto_collect: bool,
    /// Earned but not yet moved to the treasury.
    pub accrued: f64,
}

impl RevenueStream {
    pub fn active(level: u32, efficiency: f64) -> Self {
        Self { unlocked: true, level, efficiency, auto_collect: true, accrued: 0.0 }
    }

    /// Unlock at level 1, or add a level if already unlocked.
    pub fn level_up(&mut self, base_efficiency: f64) {
        if self.unlocked {
            self.level += 1;
        } else {
            *self = Self::active(1, base_efficiency);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RevenueStreams {
    pub dex: RevenueStream,
    pub cex: RevenueStream,
    pub staking: RevenueStream,
    pub nft: RevenueStream,
    pub presale: RevenueStream,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeTier {
    Small,
    Mid,
    Major,
}

impl ExchangeTier {
    pub const ALL: [ExchangeTier; 3] = [Self::Small, Self::Mid, Self::Major];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Mid => "mid",
            Self::Major => "major",
        }
    }
}

impl FromStr for ExchangeTier {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown exchange tier '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Listed,
    /// Removed for compliance warnings. The project may apply again.
    Delisted,
    /// Removed during a risk explosion. The venue never relists.
    Blacklisted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeListing {
    pub id: EntityId,
    pub name: String,
    pub tier: ExchangeTier,
    pub status: ListingStatus,
    /// Accumulated compliance warnings, in [0, 100].
    pub warning_points: f64,
    /// Ticks left before a pending delisting takes effect.
    pub delist_timer: Option<Tick>,
}

impl ExchangeListing {
    pub fn listed(tier: ExchangeTier, name: &str) -> Self {
        Self {
            id: format!("ex-{}", tier.as_str()),
            name: name.to_string(),
            tier,
            status: ListingStatus::Listed,
            warning_points: 0.0,
            delist_timer: None,
        }
    }

    pub fn is_listed(&self) -> bool {
        self.status == ListingStatus::Listed
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingMetrics {
    /// Trailing per-tick returns, oldest first.
    pub returns: VecDeque<f64>,
    /// EMA of absolute returns. Never reset.
    pub volatility: f64,
    pub volume_stability: f64,
    /// Share of volume believed fake, in [0, 1].
    pub fake_share: f64,
    /// Smoothed leaderboard movement, in [-1, 1].
    pub rank_momentum: f64,
}

impl Default for RollingMetrics {
    fn default() -> Self {
        Self {
            returns: VecDeque::new(),
            volatility: 0.02,
            volume_stability: 0.9,
            fake_share: 0.0,
            rank_momentum: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Flags {
    pub rugged: bool,
    pub delisted: bool,
    pub investigated: bool,
    pub has_won: bool,
    pub ticks_at_no1: Tick,
}

/// Forward-only regulatory ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RegulationStage {
    #[default]
    Normal,
    Watchlist,
    Investigation,
    Charges,
    Settlement,
}

impl RegulationStage {
    /// The stage after this one; `None` at the end of the ladder.
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Normal => Some(Self::Watchlist),
            Self::Watchlist => Some(Self::Investigation),
            Self::Investigation => Some(Self::Charges),
            Self::Charges => Some(Self::Settlement),
            Self::Settlement => None,
        }
    }

    pub fn is_active(&self) -> bool {
        *self != Self::Normal
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Regulation {
    pub stage: RegulationStage,
    /// Ticks spent in the current stage.
    pub timer: Tick,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectState {
    // Identity
    pub id: EntityId,
    pub name: String,
    pub ticker: String,
    pub scenario: ScenarioType,
    pub tick: Tick,

    // Tokenomics
    pub s_max: f64,
    pub s_circ: f64,
    pub team_alloc: f64,
    pub team_tokens_remaining: f64,

    // Market
    pub price: f64,
    pub market_cap: f64,
    pub volume: Volume,
    pub liquidity: Liquidity,

    // Scores
    pub community_trust: f64,
    pub institutional_trust: f64,
    pub risk: f64,
    /// Derived every tick from volume and market cap; never set directly.
    pub visibility: f64,
    pub rank: u32,

    // Resources
    pub treasury: f64,

    // Systems
    pub revenue: RevenueStreams,
    pub exchanges: BTreeMap<ExchangeTier, ExchangeListing>,
    pub rolling: RollingMetrics,
    pub cooldowns: BTreeMap<String, Tick>,
    pub flags: Flags,
    pub regulation: Regulation,
    /// Decaying memory of discrete risk jumps; feeds regulator detection.
    pub risk_memory: f64,
}

impl ProjectState {
    pub fn cooldown_active(&self, name: &str) -> bool {
        self.cooldowns.get(name).is_some_and(|left| *left > 0)
    }

    pub fn set_cooldown(&mut self, name: &str, ticks: Tick) {
        self.cooldowns.insert(name.to_string(), ticks);
    }

    pub fn listed_tiers(&self) -> impl Iterator<Item = ExchangeTier> + '_ {
        self.exchanges.values().filter(|l| l.is_listed()).map(|l| l.tier)
    }

    /// Highest tier the project currently trades on.
    pub fn best_listed_tier(&self) -> Option<ExchangeTier> {
        self.listed_tiers().max()
    }

    pub fn blended_trust(&self) -> f64 {
        (self.community_trust + self.institutional_trust) / 2.0
    }
}

// ── Market ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    Bull,
    Bear,
    Crab,
    Neutral,
}

impl Regime {
    pub const ALL: [Regime; 4] = [Self::Bull, Self::Bear, Self::Crab, Self::Neutral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bull => "bull",
            Self::Bear => "bear",
            Self::Crab => "crab",
            Self::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Indicators {
    pub news_sentiment: f64,
    pub btc_trend: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Aggressive,
    Steady,
    Scammer,
    Institutional,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyWeights {
    pub fud: f64,
    pub pump: f64,
    pub utility: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorMemory {
    pub last_action_tick: Tick,
    pub success_rate: f64,
}

/// A scripted rival. Evolves by simple effect rules, not full physics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorState {
    pub id: EntityId,
    pub name: String,
    pub archetype: Archetype,
    pub budget: f64,
    pub risk_appetite: f64,
    pub strategy_weights: StrategyWeights,
    pub memory: CompetitorMemory,
    pub market_cap: f64,
    pub trust: f64,
    pub rank: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketState {
    /// Global sentiment index in [-1, 1].
    pub msi: f64,
    pub regime: Regime,
    /// Ticks left in the current regime.
    pub regime_timer: Tick,
    pub global_liquidity: f64,
    pub indicators: Indicators,
    pub competitors: Vec<CompetitorState>,
}

// ── Aggregate root ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub project: ProjectState,
    pub market: MarketState,
    pub config: Arc<ConfigParams>,
    /// Most recent last, at most `config.log_window` long.
    pub log: Vec<EventLogEntry>,
    pub rng_state: RngState,
}

impl GameState {
    pub fn tick(&self) -> Tick {
        self.project.tick
    }
}
