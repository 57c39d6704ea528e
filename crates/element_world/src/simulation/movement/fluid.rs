//! Fluid movement: fall, sink by density, then spread with lookahead.

use super::{can_displace, can_sink_through, try_fall_and_slide};
use crate::canvas::Canvas;
use crate::cell::Head;
use crate::simulation::{Outcome, Step};

pub(super) fn step(canvas: &mut Canvas<'_>, x: i32, y: i32, head: Head) -> Step {
  let flip = canvas.rng().next_sign();

  if let Some((tx, ty)) = try_fall_and_slide(canvas, x, y, head, flip) {
    canvas.swap(x, y, tx, ty);
    return Step::moved(tx, ty);
  }

  if let Some((bx, by)) = canvas.resolve(x, y + 1)
    && can_sink_through(head, canvas.head(bx, by))
  {
    let chance = canvas.config().fluid.sink_chance;
    if canvas.rng().chance(chance) {
      canvas.swap(x, y, bx, by);
      return Step::moved(bx, by);
    }
  }

  for dir in [flip, -flip] {
    if let Some(tx) = spread_target(canvas, x, y, head, dir) {
      canvas.swap(x, y, tx, y);
      return Step::moved(tx, y);
    }
  }

  Step::stay(x, y, Outcome::empty())
}

/// Furthest reachable cell in `dir`, stopping early above a drop.
fn spread_target(canvas: &Canvas<'_>, x: i32, y: i32, head: Head, dir: i32) -> Option<i32> {
  let distance = canvas.config().fluid.spread_distance as i32;
  let mut chosen = None;
  for d in 1..=distance {
    let tx = x + dir * d;
    if !canvas.contains(tx, y) || !can_displace(head, canvas.head(tx, y)) {
      break;
    }
    chosen = Some(tx);
    let drop = canvas
      .resolve(tx, y + 1)
      .is_some_and(|(bx, by)| can_displace(head, canvas.head(bx, by)));
    if drop {
      break;
    }
  }
  chosen
}
