//! Shared primitive types used across the entire simulation.

/// A simulation tick. One tick = one step of simulated market time.
pub type Tick = u64;

/// A stable, unique identifier for any entity in the simulation.
pub type EntityId = String;

/// The raw state of the engine's deterministic generator.
pub type RngState = u32;
