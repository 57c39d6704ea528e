//! Grass: a seed that lands grows a short chain of blades upward.
//!
//! `special` holds how many more cells the chain may grow. Each step adds
//! one blade straight up or, with the branch chance, diagonally. Grass dies
//! back to air when buried, overheated, or left hanging in the air.

use super::tree::is_grounded;
use crate::canvas::Canvas;
use crate::cell::{Cell, Head, TypeClass};
use crate::elements;
use crate::simulation::Outcome;

/// Whether a grass cell at `(x, y)` should wither this tick.
pub(crate) fn is_doomed(
  head_at: &dyn Fn(i32, i32) -> Option<Head>,
  x: i32,
  y: i32,
  head: Head,
  max_temperature: u8,
) -> bool {
  if head.temp() >= max_temperature {
    return true;
  }
  let buried = head_at(x, y - 1).is_some_and(|above| {
    let class = above.type_class();
    class.is_loose() || class == TypeClass::Fluid
  });
  if buried {
    return true;
  }
  head.type_class() == TypeClass::Static
    && (-1..=1).all(|dx| head_at(x + dx, y + 1).is_some_and(|below| below.type_class().is_free()))
}

pub(crate) fn update(canvas: &mut Canvas<'_>, x: i32, y: i32, cell: Cell) -> Outcome {
  let growth = &canvas.config().growth;
  let head = cell.head;
  let head_at = |x: i32, y: i32| canvas.get(x, y).map(|c| c.head);

  if is_doomed(&head_at, x, y, head, growth.grass_max_temperature) {
    canvas.set(x, y, elements::air());
    return Outcome::CHANGED | Outcome::SKIP_HEAT;
  }

  let height = head.special();
  if head.type_class() != TypeClass::Static {
    if !is_grounded(&head_at, x, y) || !canvas.rng().chance(growth.grass_growth_chance) {
      return Outcome::empty();
    }
    let blade = elements::grass_blade(canvas.rng(), height);
    canvas.set(x, y, Cell::new(blade.head.with_temp(head.temp()), blade.tail));
    return Outcome::CHANGED;
  }

  if height == 0 || !canvas.rng().chance(growth.grass_growth_chance) {
    return Outcome::empty();
  }
  let dx = if canvas.rng().chance(growth.grass_branch_chance) {
    canvas.rng().next_sign()
  } else {
    0
  };
  let open = canvas
    .get(x + dx, y - 1)
    .is_some_and(|target| target.type_class() == TypeClass::Air);
  if open {
    let blade = elements::grass_blade(canvas.rng(), height - 1);
    canvas.set(x + dx, y - 1, blade);
  }
  canvas.set_head(x, y, head.with_special(0));
  Outcome::CHANGED
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cell::Behavior;
  use crate::config::EngineConfig;
  use crate::world::ElementWorld;

  fn lawn(seed: u64) -> ElementWorld {
    let mut world = ElementWorld::new(EngineConfig {
      width: 24,
      height: 16,
      chunk_size: 8,
      seed,
      ..Default::default()
    })
    .unwrap();
    for x in 0..24 {
      let stone = elements::stone(world.rng_mut());
      world.set(x, 15, stone);
    }
    world
  }

  fn blades(world: &ElementWorld) -> usize {
    world
      .grid()
      .iter()
      .filter(|(_, _, c)| c.type_class() == TypeClass::Static && c.behavior_or_none() == Behavior::Grass)
      .count()
  }

  #[test]
  fn seed_grows_its_full_height() {
    let mut world = lawn(31);
    let seed = elements::grass_seed(world.rng_mut());
    let height = seed.head.special() as usize;
    world.set(12, 14, seed);
    for _ in 0..3000 {
      world.tick();
    }
    assert_eq!(blades(&world), height + 1);
  }

  #[test]
  fn buried_grass_withers() {
    let mut world = lawn(32);
    let blade = elements::grass_blade(world.rng_mut(), 0);
    world.set(12, 14, blade);
    // Walls keep the sand from sliding off the blade.
    for x in [11, 13] {
      let stone = elements::stone(world.rng_mut());
      world.set(x, 14, stone);
    }
    let sand = elements::sand(world.rng_mut());
    world.set(12, 13, sand);
    world.tick();
    assert_eq!(blades(&world), 0);
  }

  #[test]
  fn hanging_blade_withers() {
    let mut world = lawn(33);
    let blade = elements::grass_blade(world.rng_mut(), 0);
    world.set(12, 5, blade);
    world.tick();
    assert_eq!(blades(&world), 0);
  }
}
