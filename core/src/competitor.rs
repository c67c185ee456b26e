//! Scripted rivals and the leaderboard.
//!
//! RULE: Rivals evolve by simple effect rules, never by the full project
//! physics. They are visited in roster order so RNG consumption is fixed.
//! FUD only reaches the player from rivals close on the leaderboard, and
//! hits harder the more visible the player is.
//! Ranking is a pure function of the scores; ties go to the lower id.

use crate::{
    config::{CompetitorParams, ConfigParams, RankingWeights},
    dynamics::clamp_score,
    event::TickLog,
    rng::SimRng,
    state::{Archetype, CompetitorState, MarketState, ProjectState},
    types::Tick,
};

/// Smallest market cap a rival can fall to.
const MC_FLOOR: f64 = 1_000.0;

/// Log-drift and σ of a rival's market cap per tick.
pub fn archetype_motion(archetype: Archetype) -> (f64, f64) {
    match archetype {
        Archetype::Aggressive    => (0.000_5, 0.030),
        Archetype::Steady        => (0.000_3, 0.010),
        Archetype::Scammer       => (-0.000_5, 0.050),
        Archetype::Institutional => (0.000_4, 0.008),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RivalMove {
    Fud,
    Pump,
    Utility,
}

/// Choose a move by strategy weight. One uniform draw.
fn choose_move(rival: &CompetitorState, rng: &mut SimRng) -> RivalMove {
    let w = &rival.strategy_weights;
    let total = (w.fud + w.pump + w.utility).max(f64::EPSILON);
    let roll = rng.next_f64() * total;
    if roll < w.fud {
        RivalMove::Fud
    } else if roll < w.fud + w.pump {
        RivalMove::Pump
    } else {
        RivalMove::Utility
    }
}

/// Advance every rival by one tick. `tick` is the tick being produced.
pub fn evolve_competitors(
    market: &mut MarketState,
    project: &mut ProjectState,
    tick: Tick,
    rng: &mut SimRng,
    config: &ConfigParams,
    log: &mut TickLog,
) {
    let params = &config.competitors;
    let msi = market.msi;

    for rival in market.competitors.iter_mut() {
        let (drift, sigma) = archetype_motion(rival.archetype);
        let shock = rng.gaussian(0.0, sigma);
        rival.market_cap = (rival.market_cap * (drift + 0.01 * msi + shock).exp()).max(MC_FLOOR);
        rival.budget += rival.market_cap * params.budget_yield;

        let due = tick >= rival.memory.last_action_tick + params.action_interval;
        if due && rival.budget >= params.action_cost {
            let chosen = choose_move(rival, rng);
            let mc_before = rival.market_cap;
            rival.budget -= params.action_cost;
            rival.memory.last_action_tick = tick;
            apply_move(rival, chosen, project, params, log);

            let succeeded = if rival.market_cap > mc_before { 1.0 } else { 0.0 };
            rival.memory.success_rate = 0.9 * rival.memory.success_rate + 0.1 * succeeded;
            log::debug!("tick={tick} rival={} move={chosen:?}", rival.id);
        }
    }
}

fn apply_move(
    rival: &mut CompetitorState,
    chosen: RivalMove,
    project: &mut ProjectState,
    params: &CompetitorParams,
    log: &mut TickLog,
) {
    match chosen {
        RivalMove::Fud => {
            if rival.rank.abs_diff(project.rank) > params.fud_rank_reach {
                return;
            }
            let hit = params.fud_ct_hit * (rival.risk_appetite / 100.0) * (project.visibility / 100.0);
            project.community_trust = clamp_score(project.community_trust - hit);
            log.news(
                format!("{} Spreads FUD", rival.name),
                format!("Anonymous threads question {}'s roadmap.", project.ticker),
            );
        }
        RivalMove::Pump => {
            rival.market_cap *= 1.0 + params.pump_mc_boost;
            rival.trust = clamp_score(rival.trust - params.pump_trust_cost);
        }
        RivalMove::Utility => {
            rival.market_cap *= 1.0 + params.utility_mc_boost;
            rival.trust = clamp_score(rival.trust + params.utility_trust_gain);
        }
    }
}

/// Inputs of the leaderboard score, shared by the player and rivals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreInputs {
    pub market_cap: f64,
    pub trust: f64,
    pub liquidity: f64,
    pub volatility: f64,
    pub fake_share: f64,
    pub risk: f64,
}

impl ScoreInputs {
    pub fn of_project(project: &ProjectState) -> Self {
        Self {
            market_cap: project.market_cap,
            trust: project.blended_trust(),
            liquidity: project.liquidity.amount,
            volatility: project.rolling.volatility,
            fake_share: project.rolling.fake_share,
            risk: project.risk,
        }
    }

    /// Rivals have no pool or order book; their profile is inferred from
    /// size and archetype.
    pub fn of_rival(rival: &CompetitorState) -> Self {
        let (_, sigma) = archetype_motion(rival.archetype);
        let fake_share = match rival.archetype {
            Archetype::Scammer => 0.3,
            _ => 0.0,
        };
        Self {
            market_cap: rival.market_cap,
            trust: rival.trust,
            liquidity: rival.market_cap * 0.02,
            volatility: sigma,
            fake_share,
            risk: rival.risk_appetite / 2.0,
        }
    }
}

pub fn ranking_score(inputs: &ScoreInputs, w: &RankingWeights) -> f64 {
    w.mc * (1.0 + inputs.market_cap.max(0.0)).log10()
        + w.trust * inputs.trust / 10.0
        + w.liquidity * (1.0 + inputs.liquidity.max(0.0)).log10()
        - w.volatility * 10.0 * inputs.volatility
        - w.fake_penalty * 10.0 * inputs.fake_share
        - w.risk_penalty * inputs.risk / 10.0
}

/// Assign ranks to the player and every rival. Returns the player's rank.
pub fn rerank(project: &mut ProjectState, market: &mut MarketState, config: &ConfigParams) -> u32 {
    let w = &config.ranking_weights;
    let mut board: Vec<(f64, String, Option<usize>)> =
        Vec::with_capacity(market.competitors.len() + 1);
    board.push((ranking_score(&ScoreInputs::of_project(project), w), project.id.clone(), None));
    for (idx, rival) in market.competitors.iter().enumerate() {
        board.push((ranking_score(&ScoreInputs::of_rival(rival), w), rival.id.clone(), Some(idx)));
    }
    board.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

    for (pos, (_, _, slot)) in board.iter().enumerate() {
        let rank = pos as u32 + 1;
        match slot {
            Some(idx) => market.competitors[*idx].rank = rank,
            None => project.rank = rank,
        }
    }
    project.rank
}

/// Re-rank, then update rank momentum and the win streak.
pub fn update_leaderboard(
    project: &mut ProjectState,
    market: &mut MarketState,
    config: &ConfigParams,
    log: &mut TickLog,
) {
    let previous = project.rank;
    let rank = rerank(project, market, config);

    let moved = f64::from(previous) - f64::from(rank);
    project.rolling.rank_momentum = (0.8 * project.rolling.rank_momentum + 0.2 * moved).clamp(-1.0, 1.0);

    if rank == 1 {
        project.flags.ticks_at_no1 += 1;
        if previous != 1 {
            log.success("Top of the Board", format!("{} is the #1 project.", project.ticker));
        }
    } else {
        project.flags.ticks_at_no1 = 0;
    }

    if !project.flags.has_won && project.flags.ticks_at_no1 >= config.win_condition_ticks {
        project.flags.has_won = true;
        log::info!("project {} won after {} ticks at #1", project.id, project.flags.ticks_at_no1);
        log.success(
            "Victory",
            format!("Held #1 for {} ticks.", project.flags.ticks_at_no1),
        );
    }
}
