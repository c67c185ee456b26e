//! sim-runner: headless runner for the token-market simulator.
//!
//! Usage:
//!   sim-runner --scenario new_chain --seed 42 --ticks 500
//!   sim-runner --scenario dead_project --actions "5:buy_marketing,12:team_sell" --json
//!   sim-runner --config tuning.json --ipc-mode

use anyhow::{Context, Result};
use chrono::Utc;
use std::{env, sync::Arc};
use tokensim_core::{
    action::GameAction,
    config::ConfigParams,
    engine::{run_ticks, ActionSchedule},
    message::HostMessage,
    scenario::create_scenario_with,
    session::SimSession,
    state::{GameState, ScenarioType},
    types::Tick,
};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};

#[derive(serde::Serialize)]
struct RunSummary<'a> {
    scenario: ScenarioType,
    seed: u32,
    final_tick: Tick,
    price: f64,
    market_cap: f64,
    treasury: f64,
    community_trust: f64,
    institutional_trust: f64,
    risk: f64,
    visibility: f64,
    rank: u32,
    regulation: &'a str,
    rugged: bool,
    delisted: bool,
    has_won: bool,
    rng_state: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u32);
    let ticks = parse_arg(&args, "--ticks", 500u64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let json = args.iter().any(|a| a == "--json");
    let scenario: ScenarioType = str_arg(&args, "--scenario").unwrap_or("new_chain").parse()?;

    let config = match str_arg(&args, "--config") {
        Some(path) => ConfigParams::load(path)?,
        None => ConfigParams::default(),
    };
    let config = Arc::new(config);

    if ipc_mode {
        return run_ipc_loop(config).await;
    }

    let schedule = match str_arg(&args, "--actions") {
        Some(raw) => parse_schedule(raw)?,
        None => ActionSchedule::new(),
    };

    if !json {
        println!("tokensim sim-runner");
        println!("  started:   {}", Utc::now().to_rfc3339());
        println!("  scenario:  {scenario}");
        println!("  seed:      {seed}");
        println!("  ticks:     {ticks}");
        println!("  actions:   {}", schedule.values().map(Vec::len).sum::<usize>());
        println!();
    }

    let initial = create_scenario_with(scenario, seed, config);
    let last = run_ticks(&initial, ticks, &schedule);
    print_summary(&last, seed, json)
}

async fn run_ipc_loop(config: Arc<ConfigParams>) -> Result<()> {
    let (mut session, mut updates) = SimSession::with_config(config);
    let mut lines = BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break; // EOF
                };
                if line.trim().is_empty() {
                    continue;
                }
                let message: HostMessage = match serde_json::from_str(&line) {
                    Ok(m) => m,
                    Err(e) => {
                        let err_json = serde_json::json!({ "error": e.to_string() });
                        write_line(&mut stdout, &err_json.to_string()).await?;
                        continue;
                    }
                };
                if let Err(e) = session.handle(message) {
                    log::warn!("host message rejected: {e}");
                    let err_json = serde_json::json!({ "error": e.to_string() });
                    write_line(&mut stdout, &err_json.to_string()).await?;
                }
            }
            Some(update) = updates.recv() => {
                write_line(&mut stdout, &serde_json::to_string(&update)?).await?;
            }
        }
    }

    session.stop();
    // Flush anything published before EOF, e.g. the reply to a final EXPORT.
    while let Ok(update) = updates.try_recv() {
        write_line(&mut stdout, &serde_json::to_string(&update)?).await?;
    }
    Ok(())
}

async fn write_line(stdout: &mut io::Stdout, line: &str) -> Result<()> {
    stdout.write_all(line.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;
    Ok(())
}

/// Parse `"5:buy_marketing,12:team_sell,20:apply_listing:small"`.
fn parse_schedule(raw: &str) -> Result<ActionSchedule> {
    let mut schedule = ActionSchedule::new();
    for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (tick, action) = item
            .split_once(':')
            .with_context(|| format!("expected <tick>:<action>, got '{item}'"))?;
        let tick: Tick = tick
            .parse()
            .with_context(|| format!("bad tick in '{item}'"))?;
        schedule
            .entry(tick)
            .or_default()
            .push(GameAction::parse_short(action)?);
    }
    Ok(schedule)
}

fn print_summary(state: &GameState, seed: u32, json: bool) -> Result<()> {
    let p = &state.project;
    let stage = format!("{:?}", p.regulation.stage).to_lowercase();
    let summary = RunSummary {
        scenario: p.scenario,
        seed,
        final_tick: p.tick,
        price: p.price,
        market_cap: p.market_cap,
        treasury: p.treasury,
        community_trust: p.community_trust,
        institutional_trust: p.institutional_trust,
        risk: p.risk,
        visibility: p.visibility,
        rank: p.rank,
        regulation: &stage,
        rugged: p.flags.rugged,
        delisted: p.flags.delisted,
        has_won: p.flags.has_won,
        rng_state: state.rng_state,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("=== RUN SUMMARY ===");
    println!("  project:        {} ({})", p.name, p.ticker);
    println!("  final tick:     {}", summary.final_tick);
    println!("  price:          ${:.6}", summary.price);
    println!("  market cap:     ${:.0}", summary.market_cap);
    println!("  treasury:       ${:.0}", summary.treasury);
    println!("  trust (CT/IT):  {:.1} / {:.1}", summary.community_trust, summary.institutional_trust);
    println!("  risk:           {:.1}", summary.risk);
    println!("  visibility:     {:.1}", summary.visibility);
    println!("  rank:           #{}", summary.rank);
    println!("  regulation:     {}", summary.regulation);
    println!("  rugged:         {}", summary.rugged);
    println!("  delisted:       {}", summary.delisted);
    println!("  won:            {}", summary.has_won);

    println!();
    println!("=== LEADERBOARD ===");
    let mut board: Vec<(u32, &str)> = state
        .market
        .competitors
        .iter()
        .map(|c| (c.rank, c.name.as_str()))
        .chain(std::iter::once((p.rank, p.name.as_str())))
        .collect();
    board.sort();
    for (rank, name) in board {
        println!("  #{rank:<2} {name}");
    }

    println!();
    println!("=== LAST EVENTS ===");
    for entry in state.log.iter().rev().take(10).rev() {
        println!("  [{:>4}] {:?}: {}: {}", entry.tick, entry.kind, entry.title, entry.detail);
    }
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn str_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
