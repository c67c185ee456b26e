//! A running simulation owned by one host.
//!
//! RULE: The session holds the only mutable reference point: the current
//! `Arc<GameState>` and the pending action queue, both behind one lock.
//! The lock is never held across an `.await`.
//! RULE: Start and stop are idempotent. Stopping aborts the ticker between
//! ticks; a tick in progress always completes and publishes.
//! RULE: START may arrive before INIT. The ticker runs idle until a state
//! exists, then steps it.

use crate::{
    action::GameAction,
    clock::TickClock,
    config::ConfigParams,
    engine::step,
    error::{SimError, SimResult},
    message::{EngineMessage, HostMessage, InitRequest},
    scenario::create_scenario_with,
    snapshot::Checkpoint,
    state::GameState,
    types::Tick,
};
use chrono::{DateTime, Utc};
use std::{
    mem,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};
use tokio::{
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use uuid::Uuid;

#[derive(Debug)]
struct SessionCore {
    state: Option<Arc<GameState>>,
    queue: Vec<GameAction>,
    clock: TickClock,
}

fn lock(core: &Mutex<SessionCore>) -> MutexGuard<'_, SessionCore> {
    core.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Step the current state with every queued action. `None` when the
/// session has no state yet.
fn advance(core: &Mutex<SessionCore>) -> Option<Arc<GameState>> {
    let mut guard = lock(core);
    let current = guard.state.clone()?;
    let actions = mem::take(&mut guard.queue);
    let next = Arc::new(step(&current, &actions));
    guard.state = Some(Arc::clone(&next));
    guard.clock.record_tick();
    Some(next)
}

pub struct SimSession {
    id: Uuid,
    created_at: DateTime<Utc>,
    config: Arc<ConfigParams>,
    core: Arc<Mutex<SessionCore>>,
    outbox: UnboundedSender<EngineMessage>,
    ticker: Option<JoinHandle<()>>,
}

impl SimSession {
    /// A session using the shipped configuration for scenario inits.
    pub fn new() -> (Self, UnboundedReceiver<EngineMessage>) {
        Self::with_config(Arc::new(ConfigParams::default()))
    }

    pub fn with_config(config: Arc<ConfigParams>) -> (Self, UnboundedReceiver<EngineMessage>) {
        let (outbox, inbox) = mpsc::unbounded_channel();
        let core = SessionCore {
            state: None,
            queue: Vec::new(),
            clock: TickClock::new(config.tick_seconds_real),
        };
        let session = Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            config,
            core: Arc::new(Mutex::new(core)),
            outbox,
            ticker: None,
        };
        log::info!("session {} created", session.id);
        (session, inbox)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Dispatch one host message.
    pub fn handle(&mut self, message: HostMessage) -> SimResult<()> {
        match message {
            HostMessage::Init(request) => self.init(request),
            HostMessage::Start => self.start(),
            HostMessage::Stop => {
                self.stop();
                Ok(())
            }
            HostMessage::Action(action) => {
                self.enqueue(action);
                Ok(())
            }
            HostMessage::Export => {
                let checkpoint = self.export()?;
                self.publish(EngineMessage::ExportData(checkpoint));
                Ok(())
            }
        }
    }

    /// Replace the session state and publish it. Queued actions are kept
    /// and apply to the new state on the next tick.
    pub fn init(&mut self, request: InitRequest) -> SimResult<()> {
        let state = match request {
            InitRequest::Scenario { scenario, seed } => {
                Arc::new(create_scenario_with(scenario, seed, Arc::clone(&self.config)))
            }
            InitRequest::Snapshot { state } => state,
        };
        log::info!("session {} init at tick {} ({})", self.id, state.tick(), state.project.scenario);

        let period_changed = {
            let mut guard = lock(&self.core);
            let changed = guard.clock.tick_seconds != state.config.tick_seconds_real;
            guard.clock.tick_seconds = state.config.tick_seconds_real;
            guard.state = Some(Arc::clone(&state));
            changed
        };
        self.publish(EngineMessage::StateUpdate(state));

        if period_changed && self.ticker.is_some() {
            self.respawn_ticker();
        }
        Ok(())
    }

    /// Begin ticking in real time. Must be called inside a tokio runtime.
    /// Without a state the ticker waits for the next INIT.
    pub fn start(&mut self) -> SimResult<()> {
        let (period, initialized) = {
            let mut guard = lock(&self.core);
            if !guard.clock.resume() {
                return Ok(());
            }
            (guard.clock.period(), guard.state.is_some())
        };
        if initialized {
            log::info!("session {} started ({period:?} per tick)", self.id);
        } else {
            log::info!("session {} started before INIT; waiting for a state", self.id);
        }
        self.ticker = Some(self.spawn_ticker(period));
        Ok(())
    }

    pub fn stop(&mut self) {
        let (was_running, stepped) = {
            let mut guard = lock(&self.core);
            (guard.clock.pause(), guard.clock.ticks_stepped)
        };
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
        if was_running {
            log::info!("session {} stopped after {stepped} ticks", self.id);
        }
    }

    /// Queue an action for the next tick. Never rejected here; actions
    /// that cannot apply are absorbed by the engine.
    pub fn enqueue(&self, action: GameAction) {
        lock(&self.core).queue.push(action);
    }

    /// Step once outside the real-time loop and publish the result.
    pub fn tick_once(&self) -> SimResult<Arc<GameState>> {
        let next = advance(&self.core).ok_or(SimError::NotInitialized)?;
        self.publish(EngineMessage::StateUpdate(Arc::clone(&next)));
        Ok(next)
    }

    pub fn state(&self) -> Option<Arc<GameState>> {
        lock(&self.core).state.clone()
    }

    pub fn export(&self) -> SimResult<Checkpoint> {
        let state = self.state().ok_or(SimError::NotInitialized)?;
        Ok(Checkpoint::capture(state))
    }

    pub fn is_running(&self) -> bool {
        lock(&self.core).clock.running
    }

    pub fn pending_actions(&self) -> usize {
        lock(&self.core).queue.len()
    }

    /// Ticks this session has stepped, across every INIT.
    pub fn ticks_stepped(&self) -> Tick {
        lock(&self.core).clock.ticks_stepped
    }

    fn publish(&self, message: EngineMessage) {
        if self.outbox.send(message).is_err() {
            log::debug!("session {} has no listener; update dropped", self.id);
        }
    }

    fn respawn_ticker(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
        let period = lock(&self.core).clock.period();
        self.ticker = Some(self.spawn_ticker(period));
    }

    fn spawn_ticker(&self, period: Duration) -> JoinHandle<()> {
        let core = Arc::clone(&self.core);
        let outbox = self.outbox.clone();
        let id = self.id;
        tokio::spawn(async move {
            let mut ticks = interval(period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of an interval completes immediately.
            ticks.tick().await;
            loop {
                ticks.tick().await;
                let Some(next) = advance(&core) else {
                    log::debug!("session {id} ticker idle; no state yet");
                    continue;
                };
                if outbox.send(EngineMessage::StateUpdate(next)).is_err() {
                    log::debug!("session {id} receiver closed; ticker exiting");
                    break;
                }
            }
        })
    }
}

impl Drop for SimSession {
    fn drop(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }
}
