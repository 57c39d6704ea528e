//! Tick hooks: the narrow grid interface used by external collaborators.
//!
//! Mobile entities (birds, fish) live outside the engine. Before or after
//! each tick they read the cells they occupy, stamp themselves into the
//! grid and reset the decay counter of cells they still own. Writes made
//! through [`HookAccess`] wake chunks the same way engine writes do.

use crate::cell::Cell;
use crate::chunk::ChunkMap;
use crate::grid::Grid;
use crate::rng::SimRng;
use crate::world::WorldModes;

/// A callback run before or after every tick.
pub type TickHook = Box<dyn FnMut(&mut HookAccess<'_>) + Send + Sync>;

#[derive(Default)]
pub(crate) struct Hooks {
  pub before: Vec<TickHook>,
  pub after: Vec<TickHook>,
}

/// Grid access handed to a [`TickHook`].
pub struct HookAccess<'w> {
  pub(crate) grid: &'w mut Grid,
  pub(crate) chunks: &'w mut ChunkMap,
  pub(crate) rng: &'w mut SimRng,
  pub(crate) modes: WorldModes,
  pub(crate) tick: u64,
}

impl HookAccess<'_> {
  /// # Panics
  /// Panics if the coordinate is outside the grid.
  #[inline]
  pub fn get(&self, x: u32, y: u32) -> Cell {
    self.grid.get(x, y)
  }

  /// # Panics
  /// Panics if the coordinate is outside the grid.
  pub fn set(&mut self, x: u32, y: u32, cell: Cell) {
    if self.grid.get(x, y) == cell {
      return;
    }
    self.grid.set(x, y, cell);
    self.touch(x, y);
  }

  pub fn swap(&mut self, x1: u32, y1: u32, x2: u32, y2: u32) {
    self.grid.swap(x1, y1, x2, y2);
    self.touch(x1, y1);
    self.touch(x2, y2);
  }

  #[inline]
  pub fn is_valid_position(&self, x: i32, y: i32) -> bool {
    self.grid.is_valid_position(x, y)
  }

  /// The shared stream. Hooks that draw from it stay deterministic as long
  /// as they are registered in the same order.
  #[inline]
  pub fn rng(&mut self) -> &mut SimRng {
    &mut *self.rng
  }

  /// Ticks simulated so far.
  #[inline]
  pub fn tick(&self) -> u64 {
    self.tick
  }

  #[inline]
  pub fn width(&self) -> u32 {
    self.grid.width()
  }

  #[inline]
  pub fn height(&self) -> u32 {
    self.grid.height()
  }

  #[inline]
  fn touch(&mut self, x: u32, y: u32) {
    let wrap = self.modes.contains(WorldModes::FALL_THROUGH);
    self.chunks.touch(x as i32, y as i32, wrap);
  }
}
