//! Counter-based deterministic random stream.
//!
//! Output `n` is a 64-bit mix of the seed and `n * φ64`, so the whole stream
//! is described by `(seed, counter)` and can be persisted and resumed
//! exactly. Every stochastic rule in the engine draws from one [`SimRng`]
//! passed by reference; nothing caches random state across ticks.

use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Golden-ratio increment.
const PHI64: u64 = 0x9E37_79B9_7F4A_7C15;

/// Multiplicative mixing for 64-bit values.
#[inline]
pub(crate) fn mix64(mut h: u64) -> u64 {
  h = h.wrapping_mul(0x517c_c1b7_2722_0a95);
  h ^= h >> 32;
  h = h.wrapping_mul(0x517c_c1b7_2722_0a95);
  h ^= h >> 32;
  h
}

/// Persistable position of a [`SimRng`] stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RngState {
  pub seed: u64,
  pub counter: u64,
}

/// Seedable counter-based generator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimRng {
  seed: u64,
  key: u64,
  counter: u64,
}

impl SimRng {
  pub fn new(seed: u64) -> Self {
    Self::from_state(RngState { seed, counter: 0 })
  }

  /// Resumes a stream at a previously captured position.
  pub fn from_state(state: RngState) -> Self {
    Self {
      seed: state.seed,
      key: mix64(state.seed ^ PHI64),
      counter: state.counter,
    }
  }

  /// Independent stream keyed by `seed` and a stream id.
  ///
  /// Used for state that must be rebuildable from `(seed, tick)` alone.
  pub fn derive(seed: u64, stream: u64) -> Self {
    Self::new(mix64(seed ^ mix64(stream.wrapping_add(1).wrapping_mul(PHI64))))
  }

  pub fn state(&self) -> RngState {
    RngState {
      seed: self.seed,
      counter: self.counter,
    }
  }

  pub fn seed(&self) -> u64 {
    self.seed
  }

  #[inline]
  pub fn next_u64(&mut self) -> u64 {
    self.counter = self.counter.wrapping_add(1);
    mix64(self.key ^ self.counter.wrapping_mul(PHI64))
  }

  #[inline]
  pub fn next_u32(&mut self) -> u32 {
    (self.next_u64() >> 32) as u32
  }

  /// Uniform float in `[0, 1)`.
  #[inline]
  pub fn next_f32(&mut self) -> f32 {
    (self.next_u32() >> 8) as f32 * (1.0 / (1u32 << 24) as f32)
  }

  /// Returns `true` with probability `p`. Always consumes one draw.
  #[inline]
  pub fn chance(&mut self, p: f32) -> bool {
    self.next_f32() < p
  }

  /// Uniform integer in `[0, n)`; `0` when `n == 0`.
  #[inline]
  pub fn range(&mut self, n: u32) -> u32 {
    ((self.next_u32() as u64 * n as u64) >> 32) as u32
  }

  /// Uniform integer in `[lo, hi]`.
  pub fn range_inclusive(&mut self, lo: i32, hi: i32) -> i32 {
    if hi <= lo {
      return lo;
    }
    let span = (hi as i64 - lo as i64 + 1) as u64;
    lo + ((self.next_u32() as u64 * span) >> 32) as i32
  }

  /// `-1` or `1` with equal probability.
  #[inline]
  pub fn next_sign(&mut self) -> i32 {
    if self.next_u32() & 0x8000_0000 != 0 { 1 } else { -1 }
  }

  /// Fisher-Yates shuffle.
  pub fn shuffle<T>(&mut self, items: &mut [T]) {
    for i in (1..items.len()).rev() {
      let j = self.range(i as u32 + 1) as usize;
      items.swap(i, j);
    }
  }
}

impl RngCore for SimRng {
  fn next_u32(&mut self) -> u32 {
    SimRng::next_u32(self)
  }

  fn next_u64(&mut self) -> u64 {
    SimRng::next_u64(self)
  }

  fn fill_bytes(&mut self, dst: &mut [u8]) {
    for chunk in dst.chunks_mut(8) {
      let bytes = SimRng::next_u64(self).to_le_bytes();
      chunk.copy_from_slice(&bytes[..chunk.len()]);
    }
  }
}
