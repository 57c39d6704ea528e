//! Rigid bodies.
//!
//! A body is not stored anywhere: it is the connected set of static cells
//! sharing a body id, rediscovered by flood fill from whichever member the
//! scheduler reaches first in a tick. Members are then marked seen so the
//! same body is analyzed once per tick.
//!
//! A body falls one row when (nearly) all of its lower border rests on free
//! space, carrying the granular cells stacked on top of it. Whatever still
//! props up a nearly free body is pushed up through it, unless the prop is
//! the floor, another body or an entity. A body that is only mostly
//! unsupported nudges the powder beneath it into sliding instead.
//! Trees only fall when completely unsupported.

use super::{Outcome, Step};
use crate::canvas::Canvas;
use crate::cell::{Behavior, Cell, Head, TypeClass};
use crate::overlay::StampOverlay;

const FOUR: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const EIGHT: [(i32, i32); 8] = [
  (1, 0),
  (-1, 0),
  (0, 1),
  (0, -1),
  (1, 1),
  (-1, 1),
  (1, -1),
  (-1, -1),
];

/// Reusable flood fill buffers sized to the grid.
#[derive(Clone, Debug, Default)]
pub(crate) struct BodyScratch {
  /// Cells already analyzed this tick.
  seen: StampOverlay,
  /// Cells in the current flood.
  flood: StampOverlay,
  stack: Vec<(i32, i32)>,
  members: Vec<(i32, i32)>,
  /// Members with no member directly below.
  lower: Vec<(i32, i32)>,
  /// Lower members sitting on a fluid.
  wet: Vec<(i32, i32)>,
  columns: Vec<i32>,
}

impl BodyScratch {
  pub fn new(len: usize) -> Self {
    Self {
      seen: StampOverlay::new(len),
      flood: StampOverlay::new(len),
      ..Default::default()
    }
  }

  #[inline]
  pub fn begin_tick(&mut self) {
    self.seen.advance();
  }
}

/// Whether `candidate` belongs to the same body as `seed`.
#[inline]
fn same_body(seed: Head, tree: bool, candidate: Head) -> bool {
  if candidate.type_class() != TypeClass::Static {
    return false;
  }
  let behavior = candidate.behavior().unwrap_or(Behavior::None);
  if tree {
    return behavior.is_tree();
  }
  candidate.body_id() == seed.body_id() && !behavior.is_tree() && behavior != Behavior::Entity
}

#[inline]
fn is_tree(head: Head) -> bool {
  head.behavior().is_ok_and(|b| b.is_tree())
}

/// Flood fills the body containing `(x, y)` into `scratch.members`.
fn discover(canvas: &Canvas<'_>, scratch: &mut BodyScratch, x: i32, y: i32, seed: Head) {
  let tree = is_tree(seed);
  let offsets: &[(i32, i32)] = if seed.eight_connected() { &EIGHT } else { &FOUR };

  scratch.flood.advance();
  scratch.members.clear();
  scratch.stack.clear();
  scratch.flood.mark(canvas.grid.index_of(x as u32, y as u32));
  scratch.stack.push((x, y));

  while let Some((cx, cy)) = scratch.stack.pop() {
    scratch.members.push((cx, cy));
    for &(dx, dy) in offsets {
      let (nx, ny) = (cx + dx, cy + dy);
      if !canvas.contains(nx, ny) {
        continue;
      }
      let i = canvas.grid.index_of(nx as u32, ny as u32);
      if scratch.flood.is_marked(i) || !same_body(seed, tree, canvas.head(nx, ny)) {
        continue;
      }
      scratch.flood.mark(i);
      scratch.stack.push((nx, ny));
    }
  }
}

#[inline]
fn in_flood(canvas: &Canvas<'_>, flood: &StampOverlay, x: i32, y: i32) -> bool {
  canvas.contains(x, y) && flood.is_marked(canvas.grid.index_of(x as u32, y as u32))
}

/// Free space a body can drop into.
#[inline]
fn is_free(cell: Cell) -> bool {
  cell.type_class().is_free() && cell.behavior_or_none() != Behavior::Entity
}

/// Support a body can never push through: the floor, another body or an
/// entity.
#[inline]
fn pins(below: Option<Cell>) -> bool {
  below.is_none_or(|c| {
    c.behavior_or_none() == Behavior::Entity
      || (c.type_class() == TypeClass::Static && c.head.body_id() != 0)
  })
}

/// Whether `rider` stacked on a body moves with it when `displaced` is what
/// the body pushes up through that column.
#[inline]
fn rides_on(rider: Head, displaced: Head) -> bool {
  rider.type_class().is_powder()
    && rider.behavior_bits() != Behavior::Entity as u32
    && rider.type_class().weight() >= displaced.type_class().weight()
}

/// Analyzes and moves the body containing `(x, y)`.
pub(crate) fn process(canvas: &mut Canvas<'_>, x: i32, y: i32, cell: Cell) -> Step {
  let index = canvas.grid.index_of(x as u32, y as u32);
  if canvas.bodies.seen.is_marked(index) {
    return Step::stay(x, y, Outcome::empty());
  }

  let mut scratch = std::mem::take(&mut *canvas.bodies);
  let step = analyze(canvas, &mut scratch, x, y, cell);
  *canvas.bodies = scratch;
  step
}

fn analyze(canvas: &mut Canvas<'_>, scratch: &mut BodyScratch, x: i32, y: i32, cell: Cell) -> Step {
  discover(canvas, scratch, x, y, cell.head);
  for &(mx, my) in &scratch.members {
    scratch.seen.mark(canvas.grid.index_of(mx as u32, my as u32));
  }
  collect_lower(canvas, scratch);

  let last_row = canvas.height() - 1;
  if canvas.fall_through() && scratch.lower.iter().any(|&(_, ly)| ly == last_row) {
    shatter_floor_columns(canvas, scratch, last_row);
    return Step::stay(x, y, Outcome::CHANGED | Outcome::SKIP_HEAT);
  }

  extend_with_riders(canvas, scratch);

  let mut free = 0usize;
  let mut pinned = false;
  for &(lx, ly) in &scratch.lower {
    let below = canvas.get(lx, ly + 1);
    if below.is_some_and(is_free) {
      free += 1;
    } else {
      pinned |= pins(below);
    }
  }
  let supported = scratch.lower.len() - free;
  let fraction = free as f32 / scratch.lower.len().max(1) as f32;
  let tree = is_tree(cell.head);
  let config = &canvas.config().body;

  if supported == 0 || (!tree && !pinned && fraction >= config.fall_fraction) {
    fall(canvas, scratch, config.fluid_reuse_distance);
    return Step::moved(x, y + 1);
  }

  if !tree && fraction >= config.destabilize_fraction {
    let momentum = config.nudge_momentum;
    let mut nudged = false;
    for &(lx, ly) in &scratch.lower {
      let Some(below) = canvas.get(lx, ly + 1) else {
        continue;
      };
      if below.type_class().is_loose() && !below.head.sliding() {
        let right = canvas.rng().next_sign() > 0;
        canvas.set_head(lx, ly + 1, below.head.with_slide(true, right, momentum));
        nudged = true;
      }
    }
    if nudged {
      return Step::stay(x, y, Outcome::CHANGED);
    }
  }

  Step::stay(x, y, Outcome::empty())
}

/// Fills `scratch.lower` from the current members.
fn collect_lower(canvas: &Canvas<'_>, scratch: &mut BodyScratch) {
  let BodyScratch {
    flood,
    members,
    lower,
    ..
  } = scratch;
  let flood: &StampOverlay = flood;
  lower.clear();
  lower.extend(
    members
      .iter()
      .copied()
      .filter(|&(mx, my)| !in_flood(canvas, flood, mx, my + 1)),
  );
}

/// Adds granular cells stacked on the body to the flood set.
///
/// A column only carries cells at least as heavy as the cell the body will
/// push up through it.
fn extend_with_riders(canvas: &Canvas<'_>, scratch: &mut BodyScratch) {
  let BodyScratch { flood, members, .. } = scratch;
  let count = members.len();
  for m in 0..count {
    let (mx, my) = members[m];
    if in_flood(canvas, flood, mx, my - 1) {
      continue;
    }
    let mut base = my;
    while in_flood(canvas, flood, mx, base + 1) {
      base += 1;
    }
    let Some(displaced) = canvas.get(mx, base + 1) else {
      continue;
    };

    let mut ry = my - 1;
    while canvas.contains(mx, ry) && rides_on(canvas.head(mx, ry), displaced.head) {
      flood.mark(canvas.grid.index_of(mx as u32, ry as u32));
      members.push((mx, ry));
      ry -= 1;
    }
  }
}

/// Moves every flood cell one row down, bottom rows first.
///
/// Each column's displaced cell bubbles up through the body. A displaced
/// fluid survives the trip with a probability that falls with the distance
/// it travelled; otherwise it is replaced by air.
fn fall(canvas: &mut Canvas<'_>, scratch: &mut BodyScratch, reuse_distance: u32) {
  scratch.wet.clear();
  for &(lx, ly) in &scratch.lower {
    if canvas.cell(lx, ly + 1).type_class() == TypeClass::Fluid {
      scratch.wet.push((lx, ly));
    }
  }

  scratch
    .members
    .sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
  for &(mx, my) in &scratch.members {
    canvas.swap(mx, my, mx, my + 1);
  }

  for &(lx, ly) in &scratch.wet {
    // The fluid rose to the top of this column's contiguous run.
    let mut top = ly;
    while in_flood(canvas, &scratch.flood, lx, top - 1) {
      top -= 1;
    }
    let distance = (ly + 1 - top) as f32;
    let keep = 1.0 - distance / reuse_distance.max(1) as f32;
    if !canvas.rng().chance(keep) {
      canvas.set(lx, top, Cell::DEFAULT);
    }
  }
}

/// Turns body columns touching the last row into loose fragments.
fn shatter_floor_columns(canvas: &mut Canvas<'_>, scratch: &mut BodyScratch, last_row: i32) {
  let BodyScratch {
    members,
    lower,
    columns,
    ..
  } = scratch;
  columns.clear();
  columns.extend(
    lower
      .iter()
      .filter(|&&(_, ly)| ly == last_row)
      .map(|&(lx, _)| lx),
  );
  for &(mx, my) in members.iter() {
    if !columns.contains(&mx) {
      continue;
    }
    let cell = canvas.cell(mx, my);
    let fragment = cell
      .head
      .with_type_class(TypeClass::Powder)
      .with_behavior(Behavior::None)
      .with_special(0)
      .with_slide(false, false, 0);
    canvas.set(mx, my, Cell::new(fragment, cell.tail));
  }
}

/// Members of the tree containing `(x, y)`.
pub(crate) fn tree_members(canvas: &mut Canvas<'_>, x: i32, y: i32) -> Vec<(i32, i32)> {
  let mut scratch = std::mem::take(&mut *canvas.bodies);
  let seed = canvas.head(x, y).with_body(crate::elements::TREE_BODY_ID, true);
  discover(canvas, &mut scratch, x, y, seed);
  let members = scratch.members.clone();
  *canvas.bodies = scratch;
  members
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::{BodyConfig, EngineConfig};
  use crate::elements;
  use crate::world::ElementWorld;

  fn world(fall_through: bool) -> ElementWorld {
    ElementWorld::new(EngineConfig {
      width: 20,
      height: 20,
      chunk_size: 8,
      seed: 9,
      fall_through,
      ..Default::default()
    })
    .unwrap()
  }

  fn place_block(world: &mut ElementWorld, id: u32, x0: u32, y0: u32, w: u32, h: u32) {
    for y in y0..y0 + h {
      for x in x0..x0 + w {
        let cell = elements::solid_body(world.rng_mut(), id);
        world.set(x, y, cell);
      }
    }
  }

  fn body_rows(world: &ElementWorld, id: u32) -> (u32, u32) {
    let ys: Vec<u32> = world
      .grid()
      .iter()
      .filter(|(_, _, c)| c.type_class() == TypeClass::Static && c.head.body_id() == id)
      .map(|(_, y, _)| y)
      .collect();
    (*ys.iter().min().unwrap(), *ys.iter().max().unwrap())
  }

  #[test]
  fn unsupported_block_falls_one_row_per_tick() {
    let mut world = world(false);
    place_block(&mut world, 2, 4, 2, 3, 3);
    world.tick();
    assert_eq!(body_rows(&world, 2), (3, 5));
    world.tick();
    assert_eq!(body_rows(&world, 2), (4, 6));
  }

  #[test]
  fn block_carries_sand_resting_on_it() {
    let mut world = world(false);
    place_block(&mut world, 3, 4, 5, 3, 2);
    let sand = elements::sand(world.rng_mut());
    world.set(5, 4, sand);
    world.tick();
    assert_eq!(body_rows(&world, 3), (6, 7));
    assert_eq!(world.get(5, 5).type_class(), TypeClass::Powder);
  }

  #[test]
  fn block_on_stone_stays_put() {
    let mut world = world(false);
    for x in 0..20 {
      let stone = elements::stone(world.rng_mut());
      world.set(x, 10, stone);
    }
    place_block(&mut world, 4, 4, 7, 4, 3);
    for _ in 0..5 {
      world.tick();
    }
    assert_eq!(body_rows(&world, 4), (7, 9));
  }

  #[test]
  fn separate_ids_are_separate_bodies() {
    let mut world = world(false);
    for x in 0..20 {
      let stone = elements::stone(world.rng_mut());
      world.set(x, 10, stone);
    }
    // Body 5 rests on the floor, body 6 clings to its side over open air.
    place_block(&mut world, 5, 2, 7, 2, 3);
    place_block(&mut world, 6, 4, 5, 2, 2);
    world.tick();
    assert_eq!(body_rows(&world, 5), (7, 9));
    assert_eq!(body_rows(&world, 6), (6, 7));
  }

  fn sized_world(width: u32, body: BodyConfig) -> ElementWorld {
    ElementWorld::new(EngineConfig {
      width,
      height: 20,
      chunk_size: 8,
      seed: 9,
      body,
      ..Default::default()
    })
    .unwrap()
  }

  fn stone_column(world: &mut ElementWorld, x: u32, from: u32) {
    for y in from..20 {
      let stone = elements::stone(world.rng_mut());
      world.set(x, y, stone);
    }
  }

  fn trunk_bar(world: &mut ElementWorld, x0: u32, y: u32, w: u32) {
    for x in x0..x0 + w {
      let trunk = elements::trunk(world.rng_mut());
      world.set(x, y, trunk);
    }
  }

  fn count(world: &ElementWorld, class: TypeClass) -> usize {
    world
      .grid()
      .iter()
      .filter(|(_, _, c)| c.type_class() == class)
      .count()
  }

  #[test]
  fn nearly_free_block_slides_down_a_pillar() {
    let mut world = sized_world(40, BodyConfig::default());
    place_block(&mut world, 2, 5, 5, 30, 2);
    stone_column(&mut world, 20, 7);
    let stone = 13;

    world.tick();
    assert_eq!(body_rows(&world, 2), (6, 7));
    // The top of the pillar now sits on the block.
    assert_eq!(world.get(20, 5).type_class(), TypeClass::Static);
    assert_eq!(world.get(20, 5).head.body_id(), 0);

    for _ in 0..4 {
      world.tick();
    }
    assert_eq!(body_rows(&world, 2), (10, 11));
    let plain_stone = world
      .grid()
      .iter()
      .filter(|(_, _, c)| c.type_class() == TypeClass::Static && c.head.body_id() == 0)
      .count();
    assert_eq!(plain_stone, stone);
  }

  #[test]
  fn another_body_pins_a_nearly_free_block() {
    let mut world = sized_world(40, BodyConfig::default());
    place_block(&mut world, 2, 5, 17, 30, 2);
    place_block(&mut world, 3, 20, 19, 1, 1);
    for _ in 0..5 {
      world.tick();
    }
    assert_eq!(body_rows(&world, 2), (17, 18));
    assert_eq!(body_rows(&world, 3), (19, 19));
  }

  #[test]
  fn partly_supported_block_nudges_the_sand_below() {
    let mut world = world(false);
    for x in 0..20 {
      let stone = elements::stone(world.rng_mut());
      world.set(x, 9, stone);
    }
    // Eight of ten lower cells are free; the chunk row holding the sand is
    // visited before the block's.
    place_block(&mut world, 2, 4, 6, 10, 2);
    for x in [4, 13] {
      let sand = elements::sand(world.rng_mut());
      world.set(x, 8, sand);
    }
    world.tick();
    assert_eq!(body_rows(&world, 2), (6, 7));
    assert!(world.get(4, 8).head.sliding());
    assert!(world.get(13, 8).head.sliding());
  }

  #[test]
  fn trees_ignore_partial_support_rules() {
    let mut world = sized_world(40, BodyConfig::default());
    trunk_bar(&mut world, 5, 5, 30);
    stone_column(&mut world, 20, 6);
    let sand = elements::sand(world.rng_mut());
    world.set(22, 6, sand);
    for x in 21..24 {
      let stone = elements::stone(world.rng_mut());
      world.set(x, 7, stone);
    }
    for _ in 0..5 {
      world.tick();
    }
    assert_eq!(body_rows(&world, 1), (5, 5));
    assert!(!world.get(22, 6).head.sliding());
  }

  #[test]
  fn unsupported_tree_falls() {
    let mut world = sized_world(40, BodyConfig::default());
    trunk_bar(&mut world, 5, 5, 30);
    world.tick();
    assert_eq!(body_rows(&world, 1), (6, 6));
    world.tick();
    assert_eq!(body_rows(&world, 1), (7, 7));
  }

  fn sink_into_pool(reuse_distance: u32) -> ElementWorld {
    let mut world = sized_world(
      20,
      BodyConfig {
        fluid_reuse_distance: reuse_distance,
        ..Default::default()
      },
    );
    for y in 15..20 {
      for x in 0..20 {
        let water = elements::water(world.rng_mut());
        world.set(x, y, water);
      }
    }
    place_block(&mut world, 2, 5, 13, 3, 2);
    world
  }

  #[test]
  fn displaced_fluid_survives_short_trips() {
    let mut world = sink_into_pool(u32::MAX);
    world.tick();
    assert_eq!(body_rows(&world, 2), (14, 15));
    assert_eq!(count(&world, TypeClass::Fluid), 100);
    for x in 5..8 {
      assert_eq!(world.get(x, 13).type_class(), TypeClass::Fluid);
    }
  }

  #[test]
  fn displaced_fluid_is_lost_beyond_the_reuse_distance() {
    let mut world = sink_into_pool(1);
    world.tick();
    assert_eq!(body_rows(&world, 2), (14, 15));
    assert_eq!(count(&world, TypeClass::Fluid), 97);
  }

  #[test]
  fn riders_must_outweigh_what_the_body_displaces() {
    let mut world = sink_into_pool(u32::MAX);
    // Ledges keep both riders from sliding off before the block moves.
    for x in [4, 8] {
      let stone = elements::stone(world.rng_mut());
      world.set(x, 13, stone);
    }
    let sand = elements::sand(world.rng_mut());
    let dust = elements::dust(world.rng_mut());
    world.set(5, 12, sand);
    world.set(7, 12, dust);
    world.tick();
    assert_eq!(body_rows(&world, 2), (14, 15));
    // Sand outweighs water and rides down; dust floats on the water.
    assert_eq!(world.get(5, 13).type_class(), TypeClass::Powder);
    assert_eq!(world.get(5, 12).type_class(), TypeClass::Fluid);
    assert_eq!(world.get(7, 12).type_class(), TypeClass::FloatingPowder);
    assert_eq!(world.get(7, 13).type_class(), TypeClass::Fluid);
  }

  #[test]
  fn border_buffers_are_reused_between_ticks() {
    let mut world = sink_into_pool(u32::MAX);
    world.tick();
    let lower = world.bodies.lower.as_ptr();
    let wet = world.bodies.wet.as_ptr();
    assert_eq!(world.bodies.lower.len(), 3);
    world.tick();
    assert_eq!(world.bodies.lower.as_ptr(), lower);
    assert_eq!(world.bodies.wet.as_ptr(), wet);
  }

  #[test]
  fn fall_through_shatters_at_the_floor() {
    let mut world = world(true);
    place_block(&mut world, 7, 4, 17, 3, 3);
    world.tick();
    let static_cells = world
      .grid()
      .iter()
      .filter(|(_, _, c)| c.type_class() == TypeClass::Static)
      .count();
    assert_eq!(static_cells, 0);
  }
}
