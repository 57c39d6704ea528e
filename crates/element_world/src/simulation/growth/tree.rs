//! Trees: seed, templated growth, vitality and roots.
//!
//! A landed seed becomes the tree base. While growing, the base places a
//! few template nodes per step. A grown base watches its crown; once too
//! much of it is gone the tree is marked damaged, then dying, and finally
//! dies: wood stays as dead timber, leaves vanish and roots crumble to soil.

use super::templates::{self, Node, Part};
use super::{TreeSpecies, Vitality, species_of, tree_special, vitality_of};
use crate::canvas::Canvas;
use crate::cell::{Behavior, Cell, Head, TypeClass};
use crate::elements::{self, TREE_BODY_ID};
use crate::simulation::{CARDINAL, Outcome, bodies};

/// Directions a growing root picks from, biased downward.
const ROOT_WALK: [(i32, i32); 6] = [(0, 1), (0, 1), (-1, 1), (1, 1), (-1, 0), (1, 0)];

/// Whether a seed at `(x, y)` has something to stand on. The floor counts.
pub(crate) fn is_grounded(head_at: &dyn Fn(i32, i32) -> Option<Head>, x: i32, y: i32) -> bool {
  head_at(x, y + 1).is_none_or(|below| {
    !below.type_class().is_free() && below.behavior_bits() != Behavior::Entity as u32
  })
}

/// A cell a root can push into.
#[inline]
pub(crate) fn is_rootable(head: Head) -> bool {
  head.type_class().is_loose() && head.behavior_bits() != Behavior::Entity as u32
}

pub(crate) fn update(canvas: &mut Canvas<'_>, x: i32, y: i32, cell: Cell) -> Outcome {
  let head = cell.head;
  let chance = canvas.config().growth.tree_growth_chance;

  if head.type_class() != TypeClass::Static {
    let grounded = is_grounded(&|x, y| canvas.get(x, y).map(|c| c.head), x, y);
    if !grounded || !canvas.rng().chance(chance) {
      return Outcome::empty();
    }
    let special = tree_special(species_of(head), Vitality::Growing);
    let base = elements::tree_base(canvas.rng(), special);
    canvas.set(x, y, Cell::new(base.head.with_temp(head.temp()), base.tail));
    return Outcome::CHANGED | Outcome::SKIP_HEAT;
  }

  let species = species_of(head);
  match vitality_of(head) {
    Vitality::Dying => {
      die(canvas, x, y);
      Outcome::CHANGED | Outcome::SKIP_HEAT
    }
    _ if !canvas.rng().chance(chance) => Outcome::empty(),
    Vitality::Growing => {
      if grow(canvas, x, y, species) {
        let grown = head.with_special(tree_special(species, Vitality::Grown));
        canvas.set_head(x, y, grown);
      }
      Outcome::CHANGED
    }
    stage @ (Vitality::Grown | Vitality::Damaged) => {
      let threshold = canvas.config().growth.tree_damage_fraction;
      let damage = templates::damage(species, &|x, y| canvas.get(x, y).map(|c| c.head), x, y);
      let next = match (stage, damage > threshold) {
        (_, false) => Vitality::Grown,
        (Vitality::Grown, true) => Vitality::Damaged,
        _ => Vitality::Dying,
      };
      if next == stage {
        return Outcome::empty();
      }
      log::debug!("Tree at ({}, {}) is now {:?}", x, y, next);
      canvas.set_head(x, y, head.with_special(tree_special(species, next)));
      Outcome::CHANGED
    }
  }
}

/// Places up to the configured number of template nodes. Returns `true`
/// once the whole template has been walked.
fn grow(canvas: &mut Canvas<'_>, x: i32, y: i32, species: TreeSpecies) -> bool {
  let growth = &canvas.config().growth;
  let mut grower = Grower {
    budget: growth.tree_nodes_per_step,
    root_length: growth.root_length,
    complete: true,
  };
  grower.walk(canvas, templates::template(species), x, y);
  grower.complete
}

struct Grower {
  budget: u32,
  root_length: u32,
  complete: bool,
}

impl Grower {
  fn walk(&mut self, canvas: &mut Canvas<'_>, nodes: &'static [Node], x: i32, y: i32) {
    for node in nodes {
      if self.budget == 0 {
        self.complete = false;
        return;
      }
      let (nx, ny) = (x + node.dx as i32, y + node.dy as i32);
      let Some(target) = canvas.get(nx, ny) else {
        continue;
      };
      if node.part.matches(target.head) {
        self.walk(canvas, node.branch, nx, ny);
        continue;
      }
      let open = match node.part {
        Part::Root => is_rootable(target.head),
        Part::Trunk | Part::Leaf => target.type_class().is_empty(),
      };
      if !open {
        continue;
      }
      let part = match node.part {
        Part::Trunk => elements::trunk(canvas.rng()),
        Part::Leaf => elements::leaf(canvas.rng()),
        Part::Root => elements::root(canvas.rng(), self.root_length),
      };
      canvas.set(nx, ny, part);
      self.budget -= 1;
      self.walk(canvas, node.branch, nx, ny);
    }
  }
}

/// Replaces every part of the tree rooted at `(x, y)` with its remains.
fn die(canvas: &mut Canvas<'_>, x: i32, y: i32) {
  let members = bodies::tree_members(canvas, x, y);
  log::debug!("Tree at ({}, {}) died, {} cells", x, y, members.len());
  for (mx, my) in members {
    let cell = canvas.cell(mx, my);
    let remains = match cell.behavior_or_none() {
      Behavior::Tree | Behavior::TreeTrunk => {
        let wood = Head::new(TypeClass::Static, Behavior::None)
          .with_heat_index(cell.head.heat_index())
          .with_body(TREE_BODY_ID, true)
          .with_temp(cell.temp());
        Cell::new(wood, cell.tail)
      }
      Behavior::TreeRoot => {
        let soil = elements::soil(canvas.rng());
        Cell::new(soil.head.with_temp(cell.temp()), soil.tail)
      }
      _ => elements::air(),
    };
    canvas.set(mx, my, remains);
  }
}

pub(crate) fn update_root(canvas: &mut Canvas<'_>, x: i32, y: i32, cell: Cell) -> Outcome {
  let growth = &canvas.config().growth;
  let (chance, harden_chance) = (growth.tree_growth_chance, growth.root_harden_chance);
  let length = cell.head.special();

  if length > 0 {
    if !canvas.rng().chance(chance) {
      return Outcome::empty();
    }
    let (dx, dy) = ROOT_WALK[canvas.rng().range(ROOT_WALK.len() as u32) as usize];
    let target = [(x + dx, y + dy), (x, y + 1)]
      .into_iter()
      .find(|&(tx, ty)| canvas.get(tx, ty).is_some_and(|c| is_rootable(c.head)));
    if let Some((tx, ty)) = target {
      let tip = elements::root(canvas.rng(), length - 1);
      canvas.set(tx, ty, tip);
    }
    canvas.set_head(x, y, cell.head.with_special(0));
    return Outcome::CHANGED;
  }

  if !canvas.rng().chance(harden_chance) {
    return Outcome::empty();
  }
  let (dx, dy) = CARDINAL[canvas.rng().range(4) as usize];
  let Some(neighbor) = canvas.get(x + dx, y + dy) else {
    return Outcome::empty();
  };
  if !is_rootable(neighbor.head) {
    return Outcome::empty();
  }
  let packed = neighbor
    .head
    .with_type_class(TypeClass::Static)
    .with_behavior(Behavior::None)
    .with_body(0, false);
  canvas.set(x + dx, y + dy, Cell::new(packed, neighbor.tail));
  Outcome::CHANGED
}

/// Whether a mature root still has loose ground to pack.
pub(crate) fn root_can_harden(head_at: &dyn Fn(i32, i32) -> Option<Head>, x: i32, y: i32) -> bool {
  CARDINAL
    .iter()
    .any(|&(dx, dy)| head_at(x + dx, y + dy).is_some_and(is_rootable))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::{EngineConfig, GrowthConfig};
  use crate::world::ElementWorld;

  fn meadow(seed: u64) -> ElementWorld {
    let mut world = ElementWorld::new(EngineConfig {
      width: 16,
      height: 20,
      chunk_size: 8,
      seed,
      growth: GrowthConfig {
        tree_growth_chance: 0.2,
        ..Default::default()
      },
      ..Default::default()
    })
    .unwrap();
    for y in 14..20 {
      for x in 0..16 {
        let soil = elements::soil(world.rng_mut());
        world.set(x, y, soil);
      }
    }
    world
  }

  fn count(world: &ElementWorld, behavior: Behavior) -> usize {
    world
      .grid()
      .iter()
      .filter(|(_, _, c)| c.type_class() == TypeClass::Static && c.behavior_or_none() == behavior)
      .count()
  }

  #[test]
  fn seed_grows_into_a_full_oak() {
    let mut world = meadow(21);
    let seed = elements::tree_seed(world.rng_mut(), TreeSpecies::Oak);
    world.set(8, 13, seed);
    for _ in 0..1500 {
      world.tick();
    }
    let base = world.get(8, 13);
    assert_eq!(base.behavior_or_none(), Behavior::Tree);
    assert_eq!(vitality_of(base.head), Vitality::Grown);
    assert_eq!(count(&world, Behavior::TreeTrunk), 4);
    assert_eq!(count(&world, Behavior::TreeLeaf), 16);
    assert!(count(&world, Behavior::TreeRoot) >= 3);
  }

  #[test]
  fn stripped_tree_dies() {
    let mut world = meadow(22);
    let seed = elements::tree_seed(world.rng_mut(), TreeSpecies::Shrub);
    world.set(8, 13, seed);
    for _ in 0..1000 {
      world.tick();
    }
    assert_eq!(vitality_of(world.get(8, 13).head), Vitality::Grown);

    let crown: Vec<(u32, u32)> = world
      .grid()
      .iter()
      .filter(|(_, _, c)| matches!(c.behavior_or_none(), Behavior::TreeLeaf | Behavior::TreeTrunk))
      .map(|(x, y, _)| (x, y))
      .collect();
    for (x, y) in crown {
      world.set(x, y, Cell::DEFAULT);
    }
    for _ in 0..1000 {
      world.tick();
    }
    assert_eq!(count(&world, Behavior::Tree), 0);
    assert_eq!(count(&world, Behavior::TreeRoot), 0);
    // The base is left as dead wood.
    let base = world.get(8, 13);
    assert_eq!(base.type_class(), TypeClass::Static);
    assert_eq!(base.behavior_or_none(), Behavior::None);
  }

  #[test]
  fn roots_pack_the_soil_around_them() {
    let mut world = meadow(23);
    let root = elements::root(world.rng_mut(), 0);
    world.set(8, 16, root);
    let before = world
      .grid()
      .iter()
      .filter(|(_, _, c)| c.type_class() == TypeClass::Static)
      .count();
    for _ in 0..2000 {
      world.tick();
    }
    let after = world
      .grid()
      .iter()
      .filter(|(_, _, c)| c.type_class() == TypeClass::Static)
      .count();
    assert_eq!(after, before + 4);
  }
}
