//! Cellular automaton tick.
//!
//! Active chunks are visited row by row from the bottom of the grid up,
//! left to right within a row. Cells inside a chunk are visited in one of a
//! few shuffled orders drawn from the shared stream, so no rule has a
//! preferred direction. After the pass, chunks that stopped changing are
//! verified and put to sleep.

pub(crate) mod activity;
pub(crate) mod bodies;
mod burning;
mod dispatch;
mod entity;
pub mod growth;
mod heat;
mod liquid;
mod meteor;
pub(crate) mod movement;
pub(crate) mod permutation;

use bitflags::bitflags;

use crate::canvas::Canvas;
use crate::cell::Cell;
use crate::world::{ElementWorld, WorldModes};

/// Cardinal neighbor offsets.
pub(crate) const CARDINAL: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

bitflags! {
  /// What a rule did to its cell.
  #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
  pub(crate) struct Outcome: u8 {
    /// The cell's state was written.
    const CHANGED = 1;
    /// The cell now lives at another position.
    const MOVED = 1 << 1;
    /// Heat already ran or would undo the rule's result.
    const SKIP_HEAT = 1 << 2;
  }
}

/// Result of the movement stage: where the cell ended up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Step {
  pub x: i32,
  pub y: i32,
  pub outcome: Outcome,
}

impl Step {
  #[inline]
  pub fn stay(x: i32, y: i32, outcome: Outcome) -> Self {
    Self { x, y, outcome }
  }

  #[inline]
  pub fn moved(x: i32, y: i32) -> Self {
    Self {
      x,
      y,
      outcome: Outcome::CHANGED | Outcome::MOVED,
    }
  }
}

/// Summary of one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
  /// The tick that was simulated.
  pub tick: u64,
  /// Chunks visited during the pass.
  pub processed_chunks: usize,
  /// Chunks scheduled for the next tick.
  pub active_chunks: usize,
  /// Cells dispatched to a rule.
  pub cells_processed: u64,
  /// Malformed cells skipped.
  pub cell_errors: u32,
}

/// Runs one tick over the world.
#[cfg_attr(feature = "trace", tracing::instrument(skip_all, fields(tick = world.tick)))]
pub(crate) fn simulate_tick(world: &mut ElementWorld) -> TickReport {
  let tick = world.tick;
  world.handled.advance();
  world.bodies.begin_tick();
  let order = world.chunks.begin_tick();
  world.permutations.refresh(world.rng.seed(), tick);

  let chunk_size = world.chunks.chunk_size() as i32;
  let mut cells_processed = 0u64;
  let mut cell_errors = 0u32;
  let mut first_error = None;

  {
    let mut canvas = Canvas {
      grid: &mut world.grid,
      chunks: &mut world.chunks,
      handled: &mut world.handled,
      bodies: &mut world.bodies,
      rng: &mut world.rng,
      config: &world.config,
      modes: world.modes,
      tick,
    };

    for &chunk in &order {
      let bounds = canvas.chunks.bounds(chunk);
      let table = world.permutations.pick(canvas.rng());
      for &offset in table {
        let x = bounds.x0 + offset as i32 % chunk_size;
        let y = bounds.y0 + offset as i32 / chunk_size;
        if !bounds.contains(x, y) || canvas.is_handled(x, y) {
          continue;
        }
        cells_processed += 1;
        if let Err(error) = dispatch::update_cell(&mut canvas, x, y) {
          cell_errors += 1;
          first_error.get_or_insert((x, y, error));
          canvas.mark_handled(x, y);
        }
      }
    }

    if canvas.modes.contains(WorldModes::ERASING) {
      erase_border(&mut canvas);
    }
  }

  if let Some((x, y, error)) = first_error {
    log::warn!(
      "Tick {}: skipped {} malformed cell(s), first at ({}, {}): {}",
      tick,
      cell_errors,
      x,
      y,
      error
    );
  }

  let fall_through = world.modes.contains(WorldModes::FALL_THROUGH);
  activity::settle_idle_chunks(
    &world.grid,
    &mut world.chunks,
    &world.config,
    fall_through,
    &order,
    tick,
  );

  world.tick += 1;

  TickReport {
    tick,
    processed_chunks: order.len(),
    active_chunks: world.chunks.awake_count(),
    cells_processed,
    cell_errors,
  }
}

/// Resets the outer ring of cells to the default element.
fn erase_border(canvas: &mut Canvas<'_>) {
  let (w, h) = (canvas.width(), canvas.height());
  let ring = (0..w)
    .flat_map(|x| [(x, 0), (x, h - 1)])
    .chain((1..h - 1).flat_map(|y| [(0, y), (w - 1, y)]));
  for (x, y) in ring {
    if !canvas.cell(x, y).is_default() {
      canvas.set(x, y, Cell::DEFAULT);
    }
  }
}
