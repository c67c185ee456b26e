//! Checkpoints: the full game state serialized to JSON.
//!
//! A checkpoint captures everything needed to resume a run from its tick
//! without replaying from tick 0. Restoring a checkpoint and stepping it
//! produces the same states as the run it was taken from.

use crate::{
    error::{SimError, SimResult},
    state::GameState,
    types::{RngState, Tick},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const CHECKPOINT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub version:     u32,
    pub tick:        Tick,
    pub rng_state:   RngState,
    pub exported_at: DateTime<Utc>,
    pub state:       Arc<GameState>,
}

impl Checkpoint {
    pub fn capture(state: Arc<GameState>) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            tick: state.tick(),
            rng_state: state.rng_state,
            exported_at: Utc::now(),
            state,
        }
    }

    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse and validate a checkpoint.
    pub fn from_json(json: &str) -> SimResult<Self> {
        let checkpoint: Checkpoint = serde_json::from_str(json)?;
        checkpoint.validate()?;
        Ok(checkpoint)
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.version != CHECKPOINT_VERSION {
            return Err(SimError::CheckpointVersion {
                expected: CHECKPOINT_VERSION,
                found: self.version,
            });
        }
        if self.tick != self.state.tick() {
            return Err(SimError::CheckpointMismatch {
                expected: self.tick,
                actual: self.state.tick(),
            });
        }
        if self.rng_state != self.state.rng_state {
            return Err(SimError::Other(anyhow::anyhow!(
                "checkpoint rng_state {} does not match state {}",
                self.rng_state,
                self.state.rng_state
            )));
        }
        Ok(())
    }

    /// The state to resume from.
    pub fn into_state(self) -> Arc<GameState> {
        self.state
    }
}
