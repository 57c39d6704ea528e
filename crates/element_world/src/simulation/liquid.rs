//! Liquid subtypes: water and steam, molten matter, oil.

use super::{CARDINAL, Outcome};
use crate::canvas::Canvas;
use crate::cell::{Behavior, BlurClass, Cell, LiquidKind, Tail, TypeClass};
use crate::elements::{colors, tint};
use crate::heat_profile::profiles;

pub(crate) fn update(canvas: &mut Canvas<'_>, x: i32, y: i32, cell: Cell) -> Outcome {
  match cell.head.liquid_kind() {
    Ok(LiquidKind::Water) => water(canvas, x, y, cell),
    Ok(LiquidKind::Molten) => molten(canvas, x, y, cell),
    Ok(LiquidKind::Oil) => oil(canvas, x, y, cell),
    Err(_) => Outcome::empty(),
  }
}

/// Boils at the boil temperature; steam condenses below the condense
/// temperature.
fn water(canvas: &mut Canvas<'_>, x: i32, y: i32, cell: Cell) -> Outcome {
  let heat = &canvas.config().heat;
  let (boil, condense) = (heat.boil_temperature, heat.condense_temperature);
  let condense_chance = heat.condense_chance;
  let head = cell.head;

  match head.type_class() {
    TypeClass::Fluid if head.temp() >= boil => {
      let steam = head
        .with_type_class(TypeClass::Gas)
        .with_heat_index(profiles::STEAM as u32);
      let tail = tint(canvas.rng(), colors::STEAM, 8).with_blur_class(BlurClass::Background);
      canvas.set(x, y, Cell::new(steam, tail));
      Outcome::CHANGED | Outcome::SKIP_HEAT
    }
    TypeClass::Gas if head.temp() < condense => {
      if !canvas.rng().chance(condense_chance) {
        return Outcome::empty();
      }
      let water = head
        .with_type_class(TypeClass::Fluid)
        .with_heat_index(profiles::WATER as u32);
      let tail = tint(canvas.rng(), colors::WATER, 6).with_blur_class(BlurClass::Foreground);
      canvas.set(x, y, Cell::new(water, tail));
      Outcome::CHANGED | Outcome::SKIP_HEAT
    }
    _ => Outcome::empty(),
  }
}

/// Radiates heat into a cooler random neighbor.
fn molten(canvas: &mut Canvas<'_>, x: i32, y: i32, cell: Cell) -> Outcome {
  let radiation = canvas.config().heat.molten_radiation as i32;
  let (dx, dy) = CARDINAL[canvas.rng().range(4) as usize];
  let Some(neighbor) = canvas.get(x + dx, y + dy) else {
    return Outcome::empty();
  };
  let own = cell.temp() as i32;
  let other = neighbor.temp() as i32;
  let amount = radiation.min((own - other) / 2);
  if amount <= 0 {
    return Outcome::empty();
  }
  canvas.set_head(x + dx, y + dy, neighbor.head.with_temp((other + amount) as u8));
  canvas.set_head(x, y, cell.head.with_temp((own - amount) as u8));
  Outcome::CHANGED
}

/// Occasionally stains a neighboring solid or powder cell.
fn oil(canvas: &mut Canvas<'_>, x: i32, y: i32, cell: Cell) -> Outcome {
  let chance = canvas.config().fluid.oil_stain_chance;
  if !canvas.rng().chance(chance) {
    return Outcome::empty();
  }
  let (dx, dy) = CARDINAL[canvas.rng().range(4) as usize];
  let Some(target) = canvas.get(x + dx, y + dy) else {
    return Outcome::empty();
  };
  let stainable = target.type_class() == TypeClass::Static || target.type_class().is_powder();
  if !stainable || target.behavior_or_none() == Behavior::Entity {
    return Outcome::empty();
  }
  canvas.set_tail(x + dx, y + dy, stain(target.tail, cell.tail));
  Outcome::CHANGED
}

/// Moves each channel of `base` halfway toward `oil`.
fn stain(base: Tail, oil: Tail) -> Tail {
  let [r, g, b] = base.color();
  let [or, og, ob] = oil.color();
  let mix = |c: u8, o: u8| ((c as u16 + o as u16) / 2) as u8;
  base.with_color([mix(r, or), mix(g, og), mix(b, ob)])
}
