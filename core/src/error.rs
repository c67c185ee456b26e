use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session has no game state; send INIT first")]
    NotInitialized,

    #[error("Checkpoint tick mismatch: header says {expected}, state says {actual}")]
    CheckpointMismatch { expected: u64, actual: u64 },

    #[error("Unsupported checkpoint version {found} (expected {expected})")]
    CheckpointVersion { expected: u32, found: u32 },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;
