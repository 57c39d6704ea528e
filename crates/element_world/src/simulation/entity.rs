//! Cells occupied by external entities.
//!
//! The owning entity resets the decay counter while it is alive. A cell
//! left behind ages and finally settles as static debris.

use super::Outcome;
use crate::canvas::Canvas;
use crate::cell::{Behavior, Cell, Head, TypeClass};
use crate::heat_profile::profiles;

/// Decay counter value at which the cell becomes debris.
const DEBRIS_AGE: u32 = 15;

pub(crate) fn update(canvas: &mut Canvas<'_>, x: i32, y: i32, cell: Cell) -> Outcome {
  let age = cell.head.special();
  if age >= DEBRIS_AGE {
    let debris = Head::new(TypeClass::Static, Behavior::None)
      .with_heat_index(profiles::ASH as u32)
      .with_temp(cell.temp());
    canvas.set(x, y, Cell::new(debris, cell.tail));
    return Outcome::CHANGED | Outcome::SKIP_HEAT;
  }

  let chance = canvas.config().entity.decay_chance;
  if canvas.rng().chance(chance) {
    canvas.set_head(x, y, cell.head.with_special(age + 1));
    return Outcome::CHANGED | Outcome::SKIP_HEAT;
  }
  Outcome::SKIP_HEAT
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::EngineConfig;
  use crate::elements;
  use crate::hooks::HookAccess;
  use crate::world::ElementWorld;

  #[test]
  fn abandoned_entity_cell_becomes_debris() {
    let mut world = ElementWorld::new(EngineConfig {
      width: 4,
      height: 4,
      chunk_size: 4,
      seed: 7,
      ..Default::default()
    })
    .unwrap();
    let bird = elements::entity([200, 30, 30]);
    world.set(1, 1, bird);
    for _ in 0..2000 {
      world.tick();
    }
    let cell = world.get(1, 1);
    assert_eq!(cell.type_class(), TypeClass::Static);
    assert_eq!(cell.behavior_or_none(), Behavior::None);
    assert_eq!(cell.tail.color(), [200, 30, 30]);
  }

  #[test]
  fn tended_entity_cell_survives() {
    let mut world = ElementWorld::new(EngineConfig {
      width: 4,
      height: 4,
      chunk_size: 4,
      seed: 7,
      ..Default::default()
    })
    .unwrap();
    world.set(1, 1, elements::entity([0, 0, 255]));
    world.add_after_tick_hook(Box::new(|access: &mut HookAccess<'_>| {
      let cell = access.get(1, 1);
      access.set(1, 1, Cell::new(cell.head.with_special(0), cell.tail));
    }));
    for _ in 0..2000 {
      world.tick();
    }
    assert_eq!(world.get(1, 1).behavior_or_none(), Behavior::Entity);
  }
}
