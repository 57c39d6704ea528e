//! Generation-stamped per-cell marks.
//!
//! A cell is marked when its stamp equals the current generation, so
//! clearing every mark is a single increment. The buffer is only rewritten
//! when the generation counter wraps.

#[derive(Clone, Debug, Default)]
pub struct StampOverlay {
  stamps: Box<[u32]>,
  generation: u32,
}

impl StampOverlay {
  pub fn new(len: usize) -> Self {
    Self {
      stamps: vec![0; len].into_boxed_slice(),
      generation: 1,
    }
  }

  /// Clears all marks.
  #[inline]
  pub fn advance(&mut self) {
    self.generation = self.generation.wrapping_add(1);
    if self.generation == 0 {
      self.stamps.fill(0);
      self.generation = 1;
    }
  }

  #[inline]
  pub fn mark(&mut self, index: usize) {
    self.stamps[index] = self.generation;
  }

  #[inline]
  pub fn is_marked(&self, index: usize) -> bool {
    self.stamps[index] == self.generation
  }

  /// Marks `index`, returning `false` if it was already marked.
  #[inline]
  pub fn insert(&mut self, index: usize) -> bool {
    if self.is_marked(index) {
      return false;
    }
    self.stamps[index] = self.generation;
    true
  }
}
