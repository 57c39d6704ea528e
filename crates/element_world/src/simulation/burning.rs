//! Combustion: short-lived flames and persistent fire sources.
//!
//! Flames cool toward the average of the cells below them and die under the
//! fire floor. Fire sources hold their profile's flame heat until they burn
//! down, heat their neighbors and ignite flammable ones.

use super::{CARDINAL, Outcome};
use crate::canvas::Canvas;
use crate::cell::{Behavior, Cell, Head, LiquidKind, TypeClass};
use crate::elements;
use crate::heat_profile::profiles;

/// Neighbors a flame heats besides the cell it rises into.
const FLAME_REACH: [(i32, i32); 4] = [(-1, 0), (1, 0), (-1, -1), (1, -1)];

pub(crate) fn update_flame(canvas: &mut Canvas<'_>, x: i32, y: i32, cell: Cell) -> Outcome {
  let c = &canvas.config().combustion;
  let (floor, decay) = (c.fire_floor, c.fire_decay);
  let (rise_chance, heat_share) = (c.fire_rise_chance, c.heat_share);

  let mut sum = 0u32;
  let mut count = 0u32;
  for dx in -1..=1 {
    if let Some(below) = canvas.get(x + dx, y + 1) {
      sum += below.temp() as u32;
      count += 1;
    }
  }
  let own = cell.temp() as i32;
  let below = if count > 0 { (sum / count) as i32 } else { own };
  let cooled = (own * 3 + below) / 4 - canvas.rng().range(decay as u32 + 1) as i32;

  if cooled < floor as i32 {
    canvas.set(x, y, elements::air());
    return Outcome::CHANGED | Outcome::SKIP_HEAT;
  }
  let cooled = cooled.min(255) as u8;
  canvas.set_head(x, y, cell.head.with_temp(cooled));

  if canvas.rng().chance(rise_chance)
    && canvas
      .get(x, y - 1)
      .is_some_and(|above| above.type_class() == TypeClass::Air)
  {
    let flame = elements::fire(canvas.rng(), cooled);
    canvas.set(x, y - 1, flame);
  }

  for (dx, dy) in FLAME_REACH {
    expose(canvas, x + dx, y + dy, cooled, heat_share);
  }
  Outcome::CHANGED | Outcome::SKIP_HEAT
}

pub(crate) fn update_source(canvas: &mut Canvas<'_>, x: i32, y: i32, cell: Cell) -> Outcome {
  let profile = cell.head.profile();
  let c = &canvas.config().combustion;
  let (ash_chance, heat_share, spawn_chance, mark_chance) =
    (c.ash_chance, c.heat_share, c.flame_spawn_chance, c.burn_mark_chance);

  if canvas.rng().chance(profile.burn_down_chance) {
    let heavy = cell.type_class() >= TypeClass::Powder;
    let remains = if heavy && canvas.rng().chance(ash_chance) {
      let mut ash = elements::ash(canvas.rng());
      ash.head = ash.head.with_temp(cell.temp());
      ash
    } else {
      elements::fire(canvas.rng(), profile.flame_heat)
    };
    canvas.set(x, y, remains);
    return Outcome::CHANGED | Outcome::SKIP_HEAT;
  }

  let mut breathes = false;
  let mut drowned = false;
  for (dx, dy) in CARDINAL {
    let Some(n) = canvas.get(x + dx, y + dy) else {
      continue;
    };
    breathes |= n.type_class().is_empty();
    drowned |= n.type_class() == TypeClass::Fluid
      && n.behavior_or_none() == Behavior::Liquid
      && n.head.liquid_kind() == Ok(LiquidKind::Water);
  }
  if drowned || !breathes {
    let out = Cell::new(extinguished(cell.head), cell.tail.with_heat_visual(0));
    canvas.set(x, y, out);
    return Outcome::CHANGED;
  }

  let flame = profile.flame_heat.max(cell.temp());
  canvas.set_head(x, y, cell.head.with_temp(flame));
  for (dx, dy) in CARDINAL {
    expose(canvas, x + dx, y + dy, flame, heat_share);
  }

  if canvas.rng().chance(spawn_chance)
    && canvas
      .get(x, y - 1)
      .is_some_and(|above| above.type_class() == TypeClass::Air)
  {
    let spawned = elements::fire(canvas.rng(), flame);
    canvas.set(x, y - 1, spawned);
  }

  if canvas.rng().chance(mark_chance) {
    scorch(canvas, x, y);
  }
  Outcome::CHANGED | Outcome::SKIP_HEAT
}

/// Heats one neighbor of a burning cell and lets it catch fire.
fn expose(canvas: &mut Canvas<'_>, x: i32, y: i32, heat: u8, heat_share: u8) {
  let Some(target) = canvas.get(x, y) else {
    return;
  };
  let behavior = target.behavior_or_none();
  if behavior.is_burning() || behavior == Behavior::Entity {
    return;
  }

  let profile = target.head.profile();
  if profile.is_flammable() && canvas.rng().chance(profile.flammability) {
    ignite(canvas, x, y, target);
    return;
  }

  let t = target.temp();
  if t < heat {
    let gain = (heat - t) / heat_share.max(1);
    if gain > 0 {
      canvas.set_head(x, y, target.head.with_temp(t + gain));
    }
  }

  let class = target.type_class();
  let mark_chance = canvas.config().combustion.burn_mark_chance;
  if (class.is_powder() || class == TypeClass::Static) && canvas.rng().chance(mark_chance) {
    scorch(canvas, x, y);
  }
}

/// Darkens the cell's burn mark by one step.
fn scorch(canvas: &mut Canvas<'_>, x: i32, y: i32) {
  let tail = canvas.cell(x, y).tail;
  if tail.burn() < 3 {
    canvas.set_tail(x, y, tail.with_burn(tail.burn() + 1));
  }
}

/// Turns a cell into a fire source. The new source waits for the next tick.
pub(crate) fn ignite(canvas: &mut Canvas<'_>, x: i32, y: i32, target: Cell) {
  let profile = target.head.profile();
  let head = target
    .head
    .with_behavior(Behavior::FireSource)
    .with_special(0)
    .with_temp(target.temp().max(profile.ignition_temperature));
  canvas.set(x, y, Cell::new(head, target.tail.with_heat_visual(2)));
}

/// State of a fire source once it goes out.
fn extinguished(head: Head) -> Head {
  if head.type_class() == TypeClass::Fluid && head.heat_index() == profiles::OIL as u32 {
    head
      .with_behavior(Behavior::Liquid)
      .with_special(LiquidKind::Oil as u32)
  } else {
    head.with_behavior(Behavior::None).with_special(0)
  }
}
