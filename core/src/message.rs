//! Host ↔ engine message protocol.
//!
//! Every message is `{"type": "...", "payload": ...}`. Unit messages
//! (`START`, `STOP`, `EXPORT`) carry no payload.

use crate::{
    action::GameAction,
    snapshot::Checkpoint,
    state::{GameState, ScenarioType},
    types::RngState,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// What to (re)build the session state from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InitRequest {
    Scenario { scenario: ScenarioType, seed: RngState },
    Snapshot { state: Arc<GameState> },
}

/// Messages the host sends to a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HostMessage {
    Init(InitRequest),
    Start,
    Stop,
    Action(GameAction),
    Export,
}

/// Messages a session publishes back to the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EngineMessage {
    StateUpdate(Arc<GameState>),
    ExportData(Checkpoint),
}
