//! Tick-scoped write access to the grid.
//!
//! Behavior rules never touch the [`Grid`] directly. Every write goes
//! through a [`Canvas`], which keeps chunk activity and the handled-cell
//! overlay consistent with the change.

use crate::cell::{Cell, Head, Tail};
use crate::chunk::ChunkMap;
use crate::config::EngineConfig;
use crate::grid::Grid;
use crate::overlay::StampOverlay;
use crate::rng::SimRng;
use crate::simulation::bodies::BodyScratch;
use crate::world::WorldModes;

pub struct Canvas<'w> {
  pub(crate) grid: &'w mut Grid,
  pub(crate) chunks: &'w mut ChunkMap,
  pub(crate) handled: &'w mut StampOverlay,
  pub(crate) bodies: &'w mut BodyScratch,
  pub(crate) rng: &'w mut SimRng,
  pub(crate) config: &'w EngineConfig,
  pub(crate) modes: WorldModes,
  pub(crate) tick: u64,
}

impl<'w> Canvas<'w> {
  #[inline]
  pub fn width(&self) -> i32 {
    self.grid.width() as i32
  }

  #[inline]
  pub fn height(&self) -> i32 {
    self.grid.height() as i32
  }

  #[inline]
  pub fn tick(&self) -> u64 {
    self.tick
  }

  #[inline]
  pub fn config(&self) -> &'w EngineConfig {
    self.config
  }

  #[inline]
  pub fn rng(&mut self) -> &mut SimRng {
    &mut *self.rng
  }

  #[inline]
  pub fn fall_through(&self) -> bool {
    self.modes.contains(WorldModes::FALL_THROUGH)
  }

  #[inline]
  pub fn contains(&self, x: i32, y: i32) -> bool {
    self.grid.is_valid_position(x, y)
  }

  /// Maps a movement target into the grid, wrapping vertically in
  /// fall-through mode.
  #[inline]
  pub fn resolve(&self, x: i32, y: i32) -> Option<(i32, i32)> {
    if x < 0 || x >= self.width() {
      return None;
    }
    if y >= 0 && y < self.height() {
      return Some((x, y));
    }
    if self.fall_through() {
      Some((x, y.rem_euclid(self.height())))
    } else {
      None
    }
  }

  #[inline]
  pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
    self
      .contains(x, y)
      .then(|| self.grid.get(x as u32, y as u32))
  }

  /// Reads an in-bounds cell.
  #[inline]
  pub fn cell(&self, x: i32, y: i32) -> Cell {
    self.grid.get(x as u32, y as u32)
  }

  #[inline]
  pub fn head(&self, x: i32, y: i32) -> Head {
    self.grid.head(x as u32, y as u32)
  }

  /// Replaces a cell's identity. The new cell counts as handled this tick.
  pub fn set(&mut self, x: i32, y: i32, cell: Cell) {
    self.mark_handled(x, y);
    if self.cell(x, y) == cell {
      return;
    }
    self.grid.set(x as u32, y as u32, cell);
    self.touch(x, y);
  }

  /// Partial update of the head word. Does not mark the cell handled.
  pub fn set_head(&mut self, x: i32, y: i32, head: Head) {
    if self.head(x, y) == head {
      return;
    }
    self.grid.set_head(x as u32, y as u32, head);
    self.touch(x, y);
  }

  /// Partial update of the tail word. Does not mark the cell handled.
  pub fn set_tail(&mut self, x: i32, y: i32, tail: Tail) {
    if self.grid.tail(x as u32, y as u32) == tail {
      return;
    }
    self.grid.set_tail(x as u32, y as u32, tail);
    self.touch(x, y);
  }

  /// Exchanges two cells; both count as handled this tick.
  pub fn swap(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
    self.grid.swap(x1 as u32, y1 as u32, x2 as u32, y2 as u32);
    self.mark_handled(x1, y1);
    self.mark_handled(x2, y2);
    self.touch(x1, y1);
    self.touch(x2, y2);
  }

  #[inline]
  pub fn is_handled(&self, x: i32, y: i32) -> bool {
    self.handled.is_marked(self.grid.index_of(x as u32, y as u32))
  }

  #[inline]
  pub fn mark_handled(&mut self, x: i32, y: i32) {
    let i = self.grid.index_of(x as u32, y as u32);
    self.handled.mark(i);
  }

  #[inline]
  fn touch(&mut self, x: i32, y: i32) {
    let wrap = self.fall_through();
    self.chunks.touch(x, y, wrap);
  }
}
