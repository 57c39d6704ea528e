//! Granular movement: falling, momentum slides and diagonal settling.

use super::{can_swap_into, try_fall_and_slide};
use crate::canvas::Canvas;
use crate::cell::{Head, TypeClass};
use crate::simulation::{Outcome, Step};

/// Momentum a landing grain needs before it starts to slide.
const SLIDE_THRESHOLD: u32 = 2;

pub(super) fn step(canvas: &mut Canvas<'_>, x: i32, y: i32, head: Head) -> Step {
  // Falling builds momentum.
  if let Some((tx, ty)) = can_swap_into(canvas, head, x, y + 1) {
    let falling = head.with_slide(false, head.slides_right(), head.momentum() + 1);
    return move_to(canvas, x, y, falling, tx, ty);
  }

  let mut head = head;
  if !head.sliding() && head.momentum() >= SLIDE_THRESHOLD && head.type_class() != TypeClass::WetPowder {
    let right = canvas.rng().next_sign() > 0;
    head = head.with_slide(true, right, head.momentum() - 1);
  }

  if head.sliding() {
    return slide(canvas, x, y, head);
  }

  if head.momentum() > 0 {
    // Landed without enough momentum to slide.
    head = head.with_slide(false, false, 0);
    canvas.set_head(x, y, head);
  }

  if head.type_class() == TypeClass::WetPowder {
    let chance = canvas.config().powder.wet_slide_chance;
    if !canvas.rng().chance(chance) {
      return Step::stay(x, y, Outcome::empty());
    }
  }

  let flip = canvas.rng().next_sign();
  match try_fall_and_slide(canvas, x, y, head, flip) {
    Some((tx, ty)) => move_to(canvas, x, y, head, tx, ty),
    None => Step::stay(x, y, Outcome::empty()),
  }
}

/// One slide step; momentum decays on failed continuation rolls.
fn slide(canvas: &mut Canvas<'_>, x: i32, y: i32, head: Head) -> Step {
  let dir = if head.slides_right() { 1 } else { -1 };
  let target = can_swap_into(canvas, head, x + dir, y + 1).or_else(|| can_swap_into(canvas, head, x + dir, y));

  let Some((tx, ty)) = target else {
    let stopped = head.with_slide(false, head.slides_right(), 0);
    canvas.set_head(x, y, stopped);
    return Step::stay(x, y, Outcome::CHANGED);
  };

  let mut momentum = head.momentum();
  let keep = canvas.config().powder.momentum_continue[momentum as usize];
  if !canvas.rng().chance(keep) {
    momentum = momentum.saturating_sub(1);
  }
  let moved = head.with_slide(momentum > 0, head.slides_right(), momentum);
  move_to(canvas, x, y, moved, tx, ty)
}

fn move_to(canvas: &mut Canvas<'_>, x: i32, y: i32, head: Head, tx: i32, ty: i32) -> Step {
  canvas.set_head(x, y, head);
  canvas.swap(x, y, tx, ty);
  Step::moved(tx, ty)
}

#[cfg(test)]
mod tests {
  use crate::cell::TypeClass;
  use crate::config::EngineConfig;
  use crate::elements;
  use crate::world::ElementWorld;

  fn world(width: u32, height: u32) -> ElementWorld {
    ElementWorld::new(EngineConfig {
      width,
      height,
      chunk_size: 8,
      seed: 11,
      ..Default::default()
    })
    .unwrap()
  }

  fn powder_cells(world: &ElementWorld) -> Vec<(u32, u32)> {
    world
      .grid()
      .iter()
      .filter(|(_, _, c)| c.type_class() == TypeClass::Powder)
      .map(|(x, y, _)| (x, y))
      .collect()
  }

  #[test]
  fn sand_falls_to_the_floor() {
    let mut world = world(8, 16);
    let sand = elements::sand(world.rng_mut());
    world.set(3, 0, sand);
    for _ in 0..40 {
      world.tick();
    }
    let grains = powder_cells(&world);
    assert_eq!(grains.len(), 1);
    assert_eq!(grains[0].1, 15);
  }

  #[test]
  fn sand_sinks_through_water() {
    let mut world = world(1, 4);
    let sand = elements::sand(world.rng_mut());
    world.set(0, 0, sand);
    for y in 1..4 {
      let water = elements::water(world.rng_mut());
      world.set(0, y, water);
    }
    for _ in 0..10 {
      world.tick();
    }
    assert_eq!(world.get(0, 3).type_class(), TypeClass::Powder);
    for y in 0..3 {
      assert_eq!(world.get(0, y).type_class(), TypeClass::Fluid);
    }
  }

  #[test]
  fn grains_do_not_stack_in_one_column() {
    let mut world = world(9, 8);
    for _ in 0..6 {
      let sand = elements::sand(world.rng_mut());
      world.set(4, 0, sand);
      for _ in 0..12 {
        world.tick();
      }
    }
    let grains = powder_cells(&world);
    assert_eq!(grains.len(), 6);
    let mut columns: Vec<u32> = grains.iter().map(|&(x, _)| x).collect();
    columns.sort_unstable();
    columns.dedup();
    assert!(columns.len() >= 2);
  }

  #[test]
  fn stone_holds_sand() {
    let mut world = world(4, 6);
    let stone = elements::stone(world.rng_mut());
    let sand = elements::sand(world.rng_mut());
    for x in 0..4 {
      world.set(x, 3, stone);
    }
    world.set(1, 0, sand);
    for _ in 0..20 {
      world.tick();
    }
    let grains = powder_cells(&world);
    assert_eq!(grains.len(), 1);
    assert_eq!(grains[0].1, 2);
  }
}
