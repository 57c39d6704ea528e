//! Meteors: burning projectiles that fall through anything but static
//! cells and burst on impact.

use super::Outcome;
use crate::canvas::Canvas;
use crate::cell::{Behavior, Cell, TypeClass};
use crate::elements;

pub(crate) fn update(canvas: &mut Canvas<'_>, x: i32, y: i32, cell: Cell) -> Outcome {
  let c = &canvas.config().combustion;
  let radius = c.meteor_impact_radius as i32;
  let (impact_heat, trail_chance) = (c.meteor_impact_heat, c.meteor_trail_chance);

  let below = canvas.get(x, y + 1);
  match below {
    Some(target) if target.type_class() != TypeClass::Static => {
      canvas.swap(x, y, x, y + 1);
      if target.type_class() == TypeClass::Air && canvas.rng().chance(trail_chance) {
        let trail = elements::fire(canvas.rng(), cell.temp());
        canvas.set(x, y, trail);
      }
      Outcome::CHANGED | Outcome::MOVED | Outcome::SKIP_HEAT
    }
    _ => {
      impact(canvas, x, y, radius, impact_heat);
      Outcome::CHANGED | Outcome::SKIP_HEAT
    }
  }
}

/// Heats a disc around the impact point, sets its air alight and leaves a
/// burning coal behind.
fn impact(canvas: &mut Canvas<'_>, x: i32, y: i32, radius: i32, heat: u8) {
  for dy in -radius..=radius {
    for dx in -radius..=radius {
      if (dx, dy) == (0, 0) || dx * dx + dy * dy > radius * radius {
        continue;
      }
      let (nx, ny) = (x + dx, y + dy);
      let Some(target) = canvas.get(nx, ny) else {
        continue;
      };
      if target.behavior_or_none() == Behavior::Entity {
        continue;
      }
      let hotter = target.temp().saturating_add(heat);
      if target.type_class() == TypeClass::Air {
        let flame = elements::fire(canvas.rng(), hotter);
        canvas.set(nx, ny, flame);
      } else {
        canvas.set_head(nx, ny, target.head.with_temp(hotter));
      }
    }
  }
  let coal = elements::fire_source(canvas.rng());
  canvas.set(x, y, coal);
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::EngineConfig;
  use crate::world::ElementWorld;

  #[test]
  fn meteor_falls_and_leaves_a_burning_coal() {
    let mut world = ElementWorld::new(EngineConfig {
      width: 9,
      height: 12,
      chunk_size: 4,
      seed: 12,
      ..Default::default()
    })
    .unwrap();
    for x in 0..9 {
      let stone = elements::stone(world.rng_mut());
      world.set(x, 11, stone);
    }
    let meteor = elements::meteor(world.rng_mut());
    world.set(4, 0, meteor);

    // Ten rows of air to fall through, then the impact.
    for _ in 0..11 {
      world.tick();
    }
    let meteors = world
      .grid()
      .iter()
      .filter(|(_, _, c)| c.behavior_or_none() == Behavior::Meteor)
      .count();
    assert_eq!(meteors, 0);
    // The stone floor took the impact heat.
    assert!(world.get(4, 11).temp() > 0);
  }

  #[test]
  fn meteor_sinks_through_water() {
    let mut world = ElementWorld::new(EngineConfig {
      width: 1,
      height: 4,
      chunk_size: 4,
      seed: 2,
      ..Default::default()
    })
    .unwrap();
    let meteor = elements::meteor(world.rng_mut());
    world.set(0, 0, meteor);
    for y in 1..4 {
      let water = elements::water(world.rng_mut());
      world.set(0, y, water);
    }
    world.tick();
    assert_eq!(world.get(0, 1).behavior_or_none(), Behavior::Meteor);
    assert_eq!(world.get(0, 0).type_class(), TypeClass::Fluid);
  }
}
