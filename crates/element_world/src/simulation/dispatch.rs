//! Per-cell state machine: movement, then behavior, then heat.

use super::{Outcome, Step, bodies, burning, entity, growth, heat, liquid, meteor, movement};
use crate::canvas::Canvas;
use crate::cell::{Behavior, TypeClass};
use crate::error::CellError;

/// Advances the cell at `(x, y)` by one tick.
///
/// Malformed cells are reported before any rule touches them.
pub(crate) fn update_cell(canvas: &mut Canvas<'_>, x: i32, y: i32) -> Result<(), CellError> {
  let cell = canvas.cell(x, y);
  let behavior = cell.validate()?;

  let step = match behavior {
    // Entities are moved by their owner; meteors move themselves.
    Behavior::Entity | Behavior::Meteor => Step::stay(x, y, Outcome::empty()),
    _ if cell.type_class() == TypeClass::Static => {
      if cell.head.body_id() != 0 {
        bodies::process(canvas, x, y, cell)
      } else {
        Step::stay(x, y, Outcome::empty())
      }
    }
    _ => movement::step(canvas, x, y, cell),
  };

  let (x, y) = (step.x, step.y);
  let mut outcome = step.outcome;
  if !outcome.contains(Outcome::SKIP_HEAT) {
    outcome |= behave(canvas, x, y);
  }

  if !outcome.contains(Outcome::SKIP_HEAT) && heat::is_heat_phase(x, y, canvas.tick()) {
    heat::update(canvas, x, y);
  }
  Ok(())
}

fn behave(canvas: &mut Canvas<'_>, x: i32, y: i32) -> Outcome {
  let cell = canvas.cell(x, y);
  match cell.behavior_or_none() {
    Behavior::None | Behavior::Soil | Behavior::TreeTrunk | Behavior::TreeLeaf => Outcome::empty(),
    Behavior::Liquid => liquid::update(canvas, x, y, cell),
    Behavior::Fire => burning::update_flame(canvas, x, y, cell),
    Behavior::FireSource => burning::update_source(canvas, x, y, cell),
    Behavior::Meteor => meteor::update(canvas, x, y, cell),
    Behavior::Grass => growth::grass::update(canvas, x, y, cell),
    Behavior::Tree => growth::tree::update(canvas, x, y, cell),
    Behavior::TreeRoot => growth::tree::update_root(canvas, x, y, cell),
    Behavior::Entity => entity::update(canvas, x, y, cell),
  }
}
