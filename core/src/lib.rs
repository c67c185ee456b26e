//! tokensim-core: a deterministic token-market simulator.
//!
//! `engine::step` is a pure function from one `GameState` (plus the
//! player's actions) to the next. Everything else either feeds it
//! (`scenario`, `config`) or hosts it (`session`, `snapshot`, `message`).

pub mod action;
pub mod clock;
pub mod competitor;
pub mod config;
pub mod dynamics;
pub mod engine;
pub mod error;
pub mod event;
pub mod market;
pub mod message;
pub mod physics;
pub mod regulation;
pub mod revenue;
pub mod rng;
pub mod scenario;
pub mod session;
pub mod snapshot;
pub mod state;
pub mod types;
