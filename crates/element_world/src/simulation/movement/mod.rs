//! Per-type-class displacement.
//!
//! Every move is a [`Canvas::swap`], so movement never creates or destroys
//! cells. Heavier classes displace lighter ones; static cells and cells
//! occupied by an entity are never displaced.

mod fluid;
mod gas;
mod powder;

use super::{Outcome, Step};
use crate::canvas::Canvas;
use crate::cell::{Behavior, Cell, Head, TypeClass};

/// Applies the movement rule of the cell's type class.
pub(crate) fn step(canvas: &mut Canvas<'_>, x: i32, y: i32, cell: Cell) -> Step {
  match cell.type_class() {
    TypeClass::Powder | TypeClass::WetPowder | TypeClass::FloatingPowder => {
      powder::step(canvas, x, y, cell.head)
    }
    TypeClass::Fluid => fluid::step(canvas, x, y, cell.head),
    TypeClass::Gas => gas::step(canvas, x, y, cell.head),
    TypeClass::Air | TypeClass::Effect | TypeClass::Static => Step::stay(x, y, Outcome::empty()),
  }
}

/// Whether `mover` may swap into a cell holding `target`.
#[inline]
pub(crate) fn can_displace(mover: Head, target: Head) -> bool {
  if target.behavior_bits() == Behavior::Entity as u32 {
    return false;
  }
  let t = target.type_class();
  match mover.type_class() {
    TypeClass::Air | TypeClass::Effect | TypeClass::Static => false,
    // Floats on fluids.
    TypeClass::FloatingPowder => matches!(t, TypeClass::Air | TypeClass::Effect | TypeClass::Gas),
    m => t != TypeClass::Static && t.weight() < m.weight(),
  }
}

/// Relative density of a fluid head; non-liquid fluids count as water.
#[inline]
pub(crate) fn density(head: Head) -> u8 {
  head.liquid_kind().map(|k| k.density()).unwrap_or(2)
}

/// Whether a denser fluid `mover` may sink through the fluid `target`.
#[inline]
pub(crate) fn can_sink_through(mover: Head, target: Head) -> bool {
  mover.type_class() == TypeClass::Fluid
    && target.type_class() == TypeClass::Fluid
    && target.behavior_bits() != Behavior::Entity as u32
    && density(mover) > density(target)
}

/// Returns the resolved target if `mover` can swap into it.
#[inline]
fn can_swap_into(canvas: &Canvas<'_>, mover: Head, x: i32, y: i32) -> Option<(i32, i32)> {
  let (tx, ty) = canvas.resolve(x, y)?;
  can_displace(mover, canvas.head(tx, ty)).then_some((tx, ty))
}

/// Falling, then diagonal sliding. Shared by powders and fluids.
fn try_fall_and_slide(canvas: &Canvas<'_>, x: i32, y: i32, mover: Head, flip: i32) -> Option<(i32, i32)> {
  if let Some(target) = can_swap_into(canvas, mover, x, y + 1) {
    return Some(target);
  }
  if let Some(target) = can_swap_into(canvas, mover, x + flip, y + 1) {
    return Some(target);
  }
  can_swap_into(canvas, mover, x - flip, y + 1)
}

/// Read-only version of the movement rules, used by the idle scan.
pub(crate) fn could_move(grid: &crate::grid::Grid, fall_through: bool, x: i32, y: i32, head: Head) -> bool {
  let h = grid.height() as i32;
  let open = |tx: i32, ty: i32| {
    if !grid.is_valid_position(tx, 0) {
      return false;
    }
    let ty = if (0..h).contains(&ty) {
      ty
    } else if fall_through && ty >= h {
      ty.rem_euclid(h)
    } else {
      return false;
    };
    let target = grid.head(tx as u32, ty as u32);
    can_displace(head, target)
      || (head.type_class() == TypeClass::Fluid && ty == y + 1 && can_sink_through(head, target))
  };

  match head.type_class() {
    TypeClass::Powder | TypeClass::WetPowder | TypeClass::FloatingPowder => {
      head.sliding() || open(x, y + 1) || open(x - 1, y + 1) || open(x + 1, y + 1)
    }
    TypeClass::Fluid => {
      open(x, y + 1) || open(x - 1, y + 1) || open(x + 1, y + 1) || open(x - 1, y) || open(x + 1, y)
    }
    TypeClass::Gas => {
      let up = |tx: i32| y > 0 && open(tx, y - 1);
      up(x) || up(x - 1) || up(x + 1) || open(x - 1, y) || open(x + 1, y)
    }
    TypeClass::Air | TypeClass::Effect | TypeClass::Static => false,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::elements;
  use crate::rng::SimRng;

  #[test]
  fn weight_order_decides_displacement() {
    let mut rng = SimRng::new(1);
    let sand = elements::sand(&mut rng).head;
    let water = elements::water(&mut rng).head;
    let steam = elements::steam(&mut rng).head;
    let dust = elements::dust(&mut rng).head;
    let stone = elements::stone(&mut rng).head;
    let air = Cell::DEFAULT.head;

    assert!(can_displace(sand, water));
    assert!(can_displace(sand, air));
    assert!(!can_displace(water, sand));
    assert!(can_displace(water, steam));
    assert!(can_displace(steam, air));
    assert!(!can_displace(sand, stone));
    assert!(!can_displace(stone, air));
    assert!(!can_displace(dust, water));
    assert!(can_displace(water, dust));
  }

  #[test]
  fn entities_are_obstacles() {
    let mut rng = SimRng::new(1);
    let sand = elements::sand(&mut rng).head;
    let bird = elements::entity([0, 0, 0]).head.with_type_class(TypeClass::Air);
    assert!(!can_displace(sand, bird));
  }

  #[test]
  fn denser_liquids_sink() {
    let mut rng = SimRng::new(1);
    let water = elements::water(&mut rng).head;
    let oil = elements::oil(&mut rng).head;
    let lava = elements::lava(&mut rng).head;
    assert!(can_sink_through(water, oil));
    assert!(can_sink_through(lava, water));
    assert!(!can_sink_through(oil, water));
    assert!(!can_sink_through(water, water));
  }
}
