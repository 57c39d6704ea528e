//! Gas movement: rise, then drift sideways.

use super::can_displace;
use crate::canvas::Canvas;
use crate::cell::Head;
use crate::simulation::{Outcome, Step};

pub(super) fn step(canvas: &mut Canvas<'_>, x: i32, y: i32, head: Head) -> Step {
  let flip = canvas.rng().next_sign();

  // Gas never wraps through the top edge.
  for (tx, ty) in [(x, y - 1), (x + flip, y - 1), (x - flip, y - 1)] {
    if open(canvas, head, tx, ty) {
      canvas.swap(x, y, tx, ty);
      return Step::moved(tx, ty);
    }
  }

  let chance = canvas.config().fluid.gas_drift_chance;
  if canvas.rng().chance(chance) {
    for tx in [x + flip, x - flip] {
      if open(canvas, head, tx, y) {
        canvas.swap(x, y, tx, y);
        return Step::moved(tx, y);
      }
    }
  }

  Step::stay(x, y, Outcome::empty())
}

#[inline]
fn open(canvas: &Canvas<'_>, head: Head, x: i32, y: i32) -> bool {
  canvas.contains(x, y) && can_displace(head, canvas.head(x, y))
}

#[cfg(test)]
mod tests {
  use crate::cell::TypeClass;
  use crate::config::EngineConfig;
  use crate::elements;
  use crate::world::ElementWorld;

  #[test]
  fn smoke_rises_to_the_ceiling() {
    let mut world = ElementWorld::new(EngineConfig {
      width: 5,
      height: 12,
      chunk_size: 4,
      seed: 2,
      ..Default::default()
    })
    .unwrap();
    let smoke = elements::smoke(world.rng_mut());
    world.set(2, 11, smoke);
    for _ in 0..40 {
      world.tick();
    }
    let gas: Vec<(u32, u32)> = world
      .grid()
      .iter()
      .filter(|(_, _, c)| c.type_class() == TypeClass::Gas)
      .map(|(x, y, _)| (x, y))
      .collect();
    assert_eq!(gas.len(), 1);
    assert_eq!(gas[0].1, 0);
  }
}
