//! Conduction and phase changes.
//!
//! Each tick only one cell in nine runs heat: the cell whose `(x mod 3,
//! y mod 3)` phase matches `tick mod 9`. A heat step exchanges temperature
//! with one random cardinal neighbor. The exchange is symmetric, so
//! conduction never adds heat; only heat loss and burning change the total.

use super::{CARDINAL, Outcome};
use crate::canvas::Canvas;
use crate::cell::{Behavior, Cell, Head, LiquidKind, TypeClass};
use crate::heat_profile::HeatProfile;

#[inline]
pub(crate) fn is_heat_phase(x: i32, y: i32, tick: u64) -> bool {
  let phase = (x.rem_euclid(3) + 3 * y.rem_euclid(3)) as u64;
  phase == tick % 9
}

/// Degrees moved from `from` to `to` by one conduction step.
#[inline]
pub(crate) fn conduction(profile: &HeatProfile, from: u8, to: u8, max_delta: u8) -> i32 {
  let diff = to as i32 - from as i32;
  let delta = (profile.conductive_index * diff as f32) as i32;
  delta.clamp(-(max_delta as i32), max_delta as i32)
}

pub(crate) fn update(canvas: &mut Canvas<'_>, x: i32, y: i32) -> Outcome {
  let cell = canvas.cell(x, y);
  let head = cell.head;
  let profile = head.profile();
  let max_delta = canvas.config().heat.max_delta;

  let mut temp = head.temp() as i32;
  let (dx, dy) = CARDINAL[canvas.rng().range(4) as usize];
  let (nx, ny) = (x + dx, y + dy);
  if canvas.contains(nx, ny) {
    let neighbor = canvas.head(nx, ny);
    let delta = conduction(profile, head.temp(), neighbor.temp(), max_delta);
    if delta != 0 {
      temp += delta;
      let warmed = (neighbor.temp() as i32 - delta).clamp(0, 255) as u8;
      canvas.set_head(nx, ny, neighbor.with_temp(warmed));
    }
  }
  if temp > 0 && canvas.rng().chance(profile.heat_loss_chance) {
    temp -= 1;
  }
  let temp = temp.clamp(0, 255) as u8;

  if let Some(outcome) = phase_change(canvas, x, y, cell, temp) {
    return outcome;
  }

  if temp != head.temp() {
    canvas.set_head(x, y, head.with_temp(temp));
    return Outcome::CHANGED;
  }
  Outcome::empty()
}

/// Self-ignition, melting and hardening at the post-conduction temperature.
fn phase_change(canvas: &mut Canvas<'_>, x: i32, y: i32, cell: Cell, temp: u8) -> Option<Outcome> {
  let head = cell.head;
  let profile = head.profile();
  let behavior = cell.behavior_or_none();

  if profile.is_flammable()
    && !behavior.is_burning()
    && temp >= profile.ignition_temperature
    && canvas.rng().chance(profile.self_ignition_chance)
  {
    let lit = head.with_behavior(Behavior::FireSource).with_special(0).with_temp(temp);
    canvas.set(x, y, Cell::new(lit, cell.tail.with_heat_visual(2)));
    return Some(Outcome::CHANGED);
  }

  if let Some(melt) = profile.melting
    && head.type_class() != TypeClass::Fluid
    && temp >= melt.temperature
  {
    let molten = Head::new(TypeClass::Fluid, Behavior::Liquid)
      .with_special(LiquidKind::Molten as u32)
      .with_heat_index(melt.target as u32)
      .with_temp(temp);
    canvas.set(x, y, Cell::new(molten, cell.tail.with_heat_visual(2)));
    return Some(Outcome::CHANGED);
  }

  if let Some(hard) = profile.hardening
    && head.type_class() == TypeClass::Fluid
    && temp < hard.temperature
  {
    let margin = canvas.config().heat.forced_hardening_margin as i32;
    let forced = (temp as i32) < hard.temperature as i32 - margin;
    if forced || has_support(canvas, x, y) {
      let solid = Head::new(TypeClass::Static, Behavior::None)
        .with_heat_index(hard.target as u32)
        .with_temp(temp);
      canvas.set(x, y, Cell::new(solid, cell.tail.with_heat_visual(0)));
      return Some(Outcome::CHANGED);
    }
  }

  None
}

/// A cardinal neighbor that is neither free space nor fluid.
fn has_support(canvas: &Canvas<'_>, x: i32, y: i32) -> bool {
  CARDINAL.iter().any(|&(dx, dy)| {
    canvas
      .get(x + dx, y + dy)
      .is_some_and(|n| !n.type_class().is_free())
  })
}
