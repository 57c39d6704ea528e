//! Chunk sleep decisions.
//!
//! A chunk that was processed but not written to is not put to sleep
//! right away. Its border is checked every tick for neighbors that could
//! spill into it, and every `idle_recheck_interval` ticks its interior is
//! scanned for cells that could still act on their own. Only a chunk that
//! passes `idle_checks_to_sleep` scans in a row goes to sleep.

use rayon::prelude::*;

use super::growth::{Vitality, grass, species_of, templates, tree, vitality_of};
use super::{CARDINAL, heat, movement};
use crate::cell::{Behavior, Head, LiquidKind, TypeClass};
use crate::chunk::{ChunkBounds, ChunkMap};
use crate::config::EngineConfig;
use crate::grid::Grid;

/// Read-only view used by the scan.
struct Scan<'a> {
  grid: &'a Grid,
  config: &'a EngineConfig,
  fall_through: bool,
}

impl Scan<'_> {
  #[inline]
  fn head_at(&self, x: i32, y: i32) -> Option<Head> {
    self
      .grid
      .is_valid_position(x, y)
      .then(|| self.grid.head(x as u32, y as u32))
  }

  /// Whether the cell at `(x, y)` could change state or position without
  /// anything around it changing first.
  fn cell_may_act(&self, x: i32, y: i32) -> bool {
    let cell = self.grid.get(x as u32, y as u32);
    let Ok(behavior) = cell.validate() else {
      // Malformed cells are skipped by every tick.
      return false;
    };
    let head = cell.head;
    let head_at = |x: i32, y: i32| self.head_at(x, y);

    let behaves = match behavior {
      Behavior::Fire | Behavior::FireSource | Behavior::Meteor | Behavior::Entity => true,
      Behavior::Grass => {
        head.type_class() != TypeClass::Static
          || head.special() > 0
          || grass::is_doomed(&head_at, x, y, head, self.config.growth.grass_max_temperature)
      }
      Behavior::Tree if head.type_class() != TypeClass::Static => true,
      Behavior::Tree => match vitality_of(head) {
        Vitality::Grown => {
          templates::damage(species_of(head), &head_at, x, y) > self.config.growth.tree_damage_fraction
        }
        _ => true,
      },
      Behavior::TreeRoot => head.special() > 0 || tree::root_can_harden(&head_at, x, y),
      Behavior::Liquid => self.liquid_may_act(x, y, head),
      Behavior::None | Behavior::Soil | Behavior::TreeTrunk | Behavior::TreeLeaf => false,
    };
    behaves
      || movement::could_move(self.grid, self.fall_through, x, y, head)
      || self.heat_may_act(x, y, head)
  }

  fn liquid_may_act(&self, x: i32, y: i32, head: Head) -> bool {
    let heat = &self.config.heat;
    match head.liquid_kind() {
      Ok(LiquidKind::Water) => match head.type_class() {
        TypeClass::Fluid => head.temp() >= heat.boil_temperature,
        TypeClass::Gas => head.temp() < heat.condense_temperature,
        _ => false,
      },
      Ok(LiquidKind::Molten) => CARDINAL.iter().any(|&(dx, dy)| {
        self
          .head_at(x + dx, y + dy)
          .is_some_and(|n| head.temp() as i32 - n.temp() as i32 >= 2)
      }),
      // Oil stains are cosmetic and never keep a chunk awake.
      Ok(LiquidKind::Oil) | Err(_) => false,
    }
  }

  /// Heat loss, conduction with any neighbor, or a pending phase change.
  fn heat_may_act(&self, x: i32, y: i32, head: Head) -> bool {
    let profile = head.profile();
    let t = head.temp();
    if t > 0 && profile.heat_loss_chance > 0.0 {
      return true;
    }
    let max_delta = self.config.heat.max_delta;
    let conducts = CARDINAL.iter().any(|&(dx, dy)| {
      self
        .head_at(x + dx, y + dy)
        .is_some_and(|n| heat::conduction(profile, t, n.temp(), max_delta) != 0)
    });
    if conducts {
      return true;
    }
    let burning = head.behavior().is_ok_and(|b| b.is_burning());
    let ignites = profile.is_flammable()
      && !burning
      && profile.self_ignition_chance > 0.0
      && t >= profile.ignition_temperature;
    let fluid = head.type_class() == TypeClass::Fluid;
    let melts = profile.melting.is_some_and(|m| !fluid && t >= m.temperature);
    let hardens = profile.hardening.is_some_and(|h| fluid && t < h.temperature);
    ignites || melts || hardens
  }

  fn chunk_is_idle(&self, bounds: ChunkBounds) -> bool {
    (bounds.y0..bounds.y1).all(|y| (bounds.x0..bounds.x1).all(|x| !self.cell_may_act(x, y)))
  }

  /// Whether a cell just outside the chunk, in a chunk that ran this tick,
  /// could act and spill in.
  fn border_may_wake(&self, chunks: &ChunkMap, index: usize) -> bool {
    let b = chunks.bounds(index);
    let h = self.grid.height() as i32;
    let mut ring = (b.x0 - 1..=b.x1)
      .flat_map(|x| [(x, b.y0 - 1), (x, b.y1)])
      .chain((b.y0..b.y1).flat_map(|y| [(b.x0 - 1, y), (b.x1, y)]));
    ring.any(|(x, mut y)| {
      if self.fall_through && (y < 0 || y >= h) {
        y = y.rem_euclid(h);
      }
      if !self.grid.is_valid_position(x, y) {
        return false;
      }
      let neighbor = chunks.chunk_of(x, y);
      neighbor != index && chunks.is_active(neighbor) && self.cell_may_act(x, y)
    })
  }
}

/// Decides which of this tick's chunks stay awake.
///
/// Busy chunks stay awake. The others are kept awake by an acting border
/// cell, or until their next scheduled full scan, whose verdicts are
/// computed in parallel and applied in `order`.
pub(crate) fn settle_idle_chunks(
  grid: &Grid,
  chunks: &mut ChunkMap,
  config: &EngineConfig,
  fall_through: bool,
  order: &[usize],
  tick: u64,
) {
  let scan = Scan {
    grid,
    config,
    fall_through,
  };
  let interval = config.scheduler.idle_recheck_interval as u64;
  let mut due = Vec::new();

  for &index in order {
    if chunks.is_busy(index) {
      chunks.wake(index);
      continue;
    }
    if chunks.is_awake(index) {
      continue;
    }
    if scan.border_may_wake(chunks, index) {
      chunks.wake(index);
      continue;
    }
    if tick >= chunks.last_checked(index) + interval {
      due.push(index);
    } else {
      chunks.wake(index);
    }
  }

  if due.is_empty() {
    return;
  }
  let verdicts: Vec<(usize, bool)> = due
    .par_iter()
    .map(|&index| (index, scan.chunk_is_idle(chunks.bounds(index))))
    .collect();

  let checks = config.scheduler.idle_checks_to_sleep;
  let mut slept = 0usize;
  for (index, idle) in verdicts {
    if chunks.record_idle_check(index, tick, idle, checks) {
      slept += 1;
    }
  }
  if slept > 0 {
    log::trace!("Tick {}: {} chunk(s) went to sleep", tick, slept);
  }
}
