//! The simulated world.
//!
//! [`ElementWorld`] owns the grid, the chunk scheduler, the shared random
//! stream and the tick counter. Everything outside the engine goes through
//! it: reads and writes keep chunk activity consistent, ticks run the
//! registered hooks around the simulation pass, and snapshots capture the
//! full resumable state.

use bitflags::bitflags;

use crate::cell::Cell;
use crate::chunk::{ChunkCoord, ChunkMap};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::grid::Grid;
use crate::hooks::{HookAccess, Hooks, TickHook};
use crate::overlay::StampOverlay;
use crate::persistence::{SnapshotMeta, WorldSnapshot};
use crate::rng::SimRng;
use crate::simulation::bodies::BodyScratch;
use crate::simulation::permutation::PermutationTables;
use crate::simulation::{TickReport, simulate_tick};

bitflags! {
  /// World-wide simulation modes.
  #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
  pub struct WorldModes: u8 {
    /// Cells leaving the bottom edge re-enter at the top.
    const FALL_THROUGH = 1;
    /// The outer ring of cells is cleared after every tick.
    const ERASING = 1 << 1;
  }
}

impl WorldModes {
  fn from_config(config: &EngineConfig) -> Self {
    let mut modes = Self::empty();
    modes.set(Self::FALL_THROUGH, config.fall_through);
    modes.set(Self::ERASING, config.erasing);
    modes
  }
}

pub struct ElementWorld {
  pub(crate) config: EngineConfig,
  pub(crate) grid: Grid,
  pub(crate) chunks: ChunkMap,
  pub(crate) rng: SimRng,
  pub(crate) tick: u64,
  pub(crate) modes: WorldModes,
  pub(crate) permutations: PermutationTables,
  pub(crate) handled: StampOverlay,
  pub(crate) bodies: BodyScratch,
  hooks: Hooks,
}

impl ElementWorld {
  /// Creates an empty world. Every chunk starts awake.
  pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
    config.validate()?;
    let grid = Grid::new(config.width, config.height)?;
    let chunks = ChunkMap::new(config.width, config.height, config.chunk_size)?;
    let rng = SimRng::new(config.seed);
    let world = Self::assemble(config, grid, chunks, rng, 0);
    log::info!(
      "Created {}x{} element world ({} chunks of {}), seed {}",
      world.grid.width(),
      world.grid.height(),
      world.chunks.len(),
      world.chunks.chunk_size(),
      world.rng.seed()
    );
    Ok(world)
  }

  fn assemble(config: EngineConfig, grid: Grid, chunks: ChunkMap, rng: SimRng, tick: u64) -> Self {
    let scheduler = &config.scheduler;
    let permutations = PermutationTables::new(
      rng.seed(),
      chunks.chunk_size(),
      scheduler.permutation_tables,
      scheduler.permutation_refresh_interval,
      tick,
    );
    let len = grid.len();
    Self {
      modes: WorldModes::from_config(&config),
      config,
      grid,
      chunks,
      rng,
      tick,
      permutations,
      handled: StampOverlay::new(len),
      bodies: BodyScratch::new(len),
      hooks: Hooks::default(),
    }
  }

  /// Advances the world by one tick.
  ///
  /// Before-tick hooks run first, then the simulation pass, then the
  /// after-tick hooks.
  pub fn tick(&mut self) -> TickReport {
    let mut hooks = std::mem::take(&mut self.hooks);
    self.run_hooks(&mut hooks.before);
    let report = simulate_tick(self);
    self.run_hooks(&mut hooks.after);
    self.hooks = hooks;
    report
  }

  fn run_hooks(&mut self, hooks: &mut [TickHook]) {
    if hooks.is_empty() {
      return;
    }
    let mut access = HookAccess {
      grid: &mut self.grid,
      chunks: &mut self.chunks,
      rng: &mut self.rng,
      modes: self.modes,
      tick: self.tick,
    };
    for hook in hooks.iter_mut() {
      hook(&mut access);
    }
  }

  /// Registers a hook that runs before every tick.
  pub fn add_before_tick_hook(&mut self, hook: TickHook) {
    self.hooks.before.push(hook);
  }

  /// Registers a hook that runs after every tick.
  pub fn add_after_tick_hook(&mut self, hook: TickHook) {
    self.hooks.after.push(hook);
  }

  /// Reads a cell.
  ///
  /// # Panics
  /// Panics if the coordinate is outside the grid.
  #[inline]
  pub fn get(&self, x: u32, y: u32) -> Cell {
    self.grid.get(x, y)
  }

  /// Writes a cell and wakes the chunks around it.
  ///
  /// # Panics
  /// Panics if the coordinate is outside the grid.
  pub fn set(&mut self, x: u32, y: u32, cell: Cell) {
    self.grid.set(x, y, cell);
    let wrap = self.modes.contains(WorldModes::FALL_THROUGH);
    self.chunks.touch(x as i32, y as i32, wrap);
  }

  /// Exchanges two cells and wakes the chunks around both.
  pub fn swap(&mut self, x1: u32, y1: u32, x2: u32, y2: u32) {
    self.grid.swap(x1, y1, x2, y2);
    let wrap = self.modes.contains(WorldModes::FALL_THROUGH);
    self.chunks.touch(x1 as i32, y1 as i32, wrap);
    self.chunks.touch(x2 as i32, y2 as i32, wrap);
  }

  #[inline]
  pub fn is_valid_position(&self, x: i32, y: i32) -> bool {
    self.grid.is_valid_position(x, y)
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
  pub fn config(&self) -> &EngineConfig {
    &self.config
  }

  #[inline]
  pub fn grid(&self) -> &Grid {
    &self.grid
  }

  #[inline]
  pub fn chunks(&self) -> &ChunkMap {
    &self.chunks
  }

  /// Number of ticks simulated so far.
  #[inline]
  pub fn tick_count(&self) -> u64 {
    self.tick
  }

  /// The shared random stream, for building elements deterministically.
  #[inline]
  pub fn rng_mut(&mut self) -> &mut SimRng {
    &mut self.rng
  }

  #[inline]
  pub fn modes(&self) -> WorldModes {
    self.modes
  }

  /// Changes the world modes. Every chunk is woken when they change.
  pub fn set_modes(&mut self, modes: WorldModes) {
    if modes == self.modes {
      return;
    }
    log::debug!("World modes {:?} -> {:?}", self.modes, modes);
    self.modes = modes;
    self.chunks.wake_all();
  }

  /// Chunks written to since the last call.
  pub fn take_changed_chunks(&mut self) -> Vec<ChunkCoord> {
    self.chunks.take_changed()
  }

  /// Captures the full resumable state.
  pub fn export_snapshot(&self) -> WorldSnapshot {
    WorldSnapshot {
      meta: SnapshotMeta {
        width: self.grid.width(),
        height: self.grid.height(),
        chunk_size: self.chunks.chunk_size(),
        rng: self.rng.state(),
        tick: self.tick,
        modes: self.modes,
      },
      heads: self.grid.heads_to_bytes(),
      tails: self.grid.tails_to_bytes(),
      chunks: self.chunks.export_state(),
    }
  }

  /// Rebuilds a world from a snapshot.
  ///
  /// Dimensions, chunk size, stream position, tick and modes come from the
  /// snapshot; tuning comes from `config`. Hooks are not part of a
  /// snapshot and must be registered again.
  pub fn from_snapshot(snapshot: &WorldSnapshot, mut config: EngineConfig) -> Result<Self, EngineError> {
    let meta = &snapshot.meta;
    config.width = meta.width;
    config.height = meta.height;
    config.chunk_size = meta.chunk_size;
    config.seed = meta.rng.seed;
    config.fall_through = meta.modes.contains(WorldModes::FALL_THROUGH);
    config.erasing = meta.modes.contains(WorldModes::ERASING);
    config.validate()?;

    let grid = Grid::from_bytes(meta.width, meta.height, &snapshot.heads, &snapshot.tails)?;
    let mut chunks = ChunkMap::new(meta.width, meta.height, meta.chunk_size)?;
    chunks.import_state(&snapshot.chunks)?;
    let rng = SimRng::from_state(meta.rng);

    let world = Self::assemble(config, grid, chunks, rng, meta.tick);
    log::info!(
      "Restored {}x{} element world at tick {}",
      meta.width,
      meta.height,
      meta.tick
    );
    log::debug!(
      "Restored stream at {:?}, {} chunk(s) awake",
      meta.rng,
      world.chunks.awake_count()
    );
    Ok(world)
  }
}

impl std::fmt::Debug for ElementWorld {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ElementWorld")
      .field("width", &self.grid.width())
      .field("height", &self.grid.height())
      .field("tick", &self.tick)
      .field("modes", &self.modes)
      .field("awake_chunks", &self.chunks.awake_count())
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::elements;

  fn world() -> ElementWorld {
    ElementWorld::new(EngineConfig {
      width: 16,
      height: 16,
      chunk_size: 8,
      seed: 4,
      ..Default::default()
    })
    .unwrap()
  }

  #[test]
  fn rejects_invalid_config() {
    let err = ElementWorld::new(EngineConfig {
      chunk_size: 3,
      ..Default::default()
    })
    .unwrap_err();
    assert!(matches!(err, EngineError::Config(_)));
  }

  #[test]
  fn hooks_run_around_the_tick() {
    let mut world = world();
    world.add_before_tick_hook(Box::new(|access: &mut HookAccess<'_>| {
      let stone = elements::stone(access.rng());
      access.set(3, 3, stone);
    }));
    world.add_after_tick_hook(Box::new(|access: &mut HookAccess<'_>| {
      assert_eq!(access.get(3, 3).behavior_or_none(), crate::cell::Behavior::None);
      access.set(3, 3, Cell::DEFAULT);
    }));
    world.tick();
    assert!(world.get(3, 3).is_default());
    assert_eq!(world.tick_count(), 1);
  }

  #[test]
  fn changing_modes_wakes_everything() {
    let mut world = world();
    for _ in 0..40 {
      world.tick();
    }
    assert_eq!(world.chunks().awake_count(), 0);
    world.set_modes(WorldModes::FALL_THROUGH);
    assert_eq!(world.chunks().awake_count(), world.chunks().len());
  }

  #[test]
  fn snapshot_restores_dimensions_and_modes() {
    let mut world = world();
    world.set_modes(WorldModes::ERASING);
    let sand = elements::sand(world.rng_mut());
    world.set(5, 5, sand);
    world.tick();
    let snapshot = world.export_snapshot();
    let restored = ElementWorld::from_snapshot(&snapshot, EngineConfig::default()).unwrap();
    assert_eq!(restored.width(), 16);
    assert_eq!(restored.modes(), WorldModes::ERASING);
    assert_eq!(restored.tick_count(), 1);
    assert_eq!(restored.get(5, 6), world.get(5, 6));
  }
}
