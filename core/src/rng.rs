//! Deterministic random number generation.
//!
//! RULE: Nothing in the simulation may call any platform RNG.
//! All in-tick randomness flows through a `SimRng` rebuilt from the
//! `rng_state` carried on `GameState`, and the advanced state is written
//! back at the end of the tick. Same state in, same numbers out.
//!
//! Scenario construction uses a separate `SetupRng` stream derived from
//! (seed XOR slot). It never touches the carried state, so adding setup
//! randomness never shifts the in-game stream.

use crate::types::RngState;
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

const GOLDEN_GAMMA: u32 = 0x6D2B_79F5;
const TWO_POW_32: f64 = 4_294_967_296.0;

/// Mulberry32 over a single `u32`. The whole generator is its state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimRng {
    state: RngState,
}

impl SimRng {
    pub fn new(state: RngState) -> Self {
        Self { state }
    }

    fn advance(&mut self) -> u32 {
        self.state = self.state.wrapping_add(GOLDEN_GAMMA);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.advance()) / TWO_POW_32
    }

    /// Integer in [min, max). Returns `min` for an empty range.
    pub fn int(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        (self.next_f64() * (max - min) as f64 + min as f64).floor() as i64
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Box–Muller deviate. Each uniform is re-drawn while it is exactly 0
    /// so the logarithm stays finite.
    pub fn gaussian(&mut self, mean: f64, std: f64) -> f64 {
        let mut u = 0.0;
        while u == 0.0 {
            u = self.next_f64();
        }
        let mut v = 0.0;
        while v == 0.0 {
            v = self.next_f64();
        }
        let z = (-2.0 * u.ln()).sqrt() * (2.0 * std::f64::consts::PI * v).cos();
        z * std + mean
    }

    /// Pick one element uniformly. `None` for an empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.int(0, items.len() as i64) as usize;
        items.get(idx)
    }

    pub fn state(&self) -> RngState {
        self.state
    }

    pub fn set_state(&mut self, state: RngState) {
        self.state = state;
    }
}

impl RngCore for SimRng {
    fn next_u32(&mut self) -> u32 {
        self.advance()
    }

    fn next_u64(&mut self) -> u64 {
        let hi = u64::from(self.advance());
        let lo = u64::from(self.advance());
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.advance().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for SimRng {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u32::from_le_bytes(seed))
    }
}

/// A named, deterministic stream used only while building a scenario.
pub struct SetupRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl SetupRng {
    /// Derive a setup stream from the scenario seed and a stable slot.
    pub fn new(seed: u64, slot: SetupSlot) -> Self {
        let derived_seed = seed ^ (slot as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
        Self {
            name: slot.name(),
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Uniform float in [lo, hi).
    pub fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

/// Stable setup slot assignments.
/// NEVER reorder or remove entries. Only append.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum SetupSlot {
    Roster = 0,
}

impl SetupSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Roster => "roster",
        }
    }
}
