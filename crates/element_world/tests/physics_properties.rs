//! Whole-world properties: heat bounds, phase change timing, combustion
//! odds, conservation under movement and isolation of malformed cells.
//!
//! Run: cargo test -p element_world --test physics_properties

mod common;

use std::collections::HashMap;

use common::{busy_scene, fill, run, world};
use element_world::heat_profile::profile;
use element_world::{Behavior, Cell, ElementWorld, Head, Tail, TypeClass, elements, profiles};

fn temperature_sum(world: &ElementWorld) -> u64 {
  world.grid().iter().map(|(_, _, c)| c.temp() as u64).sum()
}

#[test]
fn conduction_never_creates_heat() {
  // Stone and metal below every melting point, no air and no heat loss.
  let mut world = world(24, 24, 8, 31);
  for y in 0..24 {
    for x in 0..24 {
      let temp = world.rng_mut().range(220) as u8;
      let mut cell = if (x + y) % 2 == 0 {
        elements::stone(world.rng_mut())
      } else {
        elements::metal(world.rng_mut())
      };
      cell.head = cell.head.with_temp(temp);
      world.set(x, y, cell);
    }
  }

  let mut sum = temperature_sum(&world);
  for tick in 0..300 {
    world.tick();
    let next = temperature_sum(&world);
    assert!(next <= sum, "tick {tick}: {sum} -> {next}");
    sum = next;
  }
  assert!(
    world.grid().iter().all(|(_, _, c)| c.type_class() == TypeClass::Static),
    "nothing may melt below 220"
  );
}

#[test]
fn busy_world_only_holds_well_formed_cells() {
  let mut world = busy_scene(13);
  for _ in 0..150 {
    world.tick();
    for (x, y, cell) in world.grid().iter() {
      assert!(cell.validate().is_ok(), "malformed cell at ({x}, {y})");
    }
  }
}

#[test]
fn melting_happens_once_on_the_cells_heat_tick() {
  let mut world = world(9, 9, 16, 3);
  fill(&mut world, 0, 0, 9, 9, |rng| {
    let mut lava = elements::lava(rng);
    lava.head = lava.head.with_temp(250);
    lava
  });
  let mut stone = elements::stone(world.rng_mut());
  stone.head = stone.head.with_temp(250);
  world.set(4, 4, stone);

  // (4, 4) runs heat on ticks where tick % 9 == 4.
  run(&mut world, 4);
  assert_eq!(world.get(4, 4).type_class(), TypeClass::Static);

  world.tick();
  let melted = world.get(4, 4);
  assert_eq!(melted.type_class(), TypeClass::Fluid);
  assert_eq!(melted.behavior_or_none(), Behavior::Liquid);
  assert!(melted.temp() >= 250);

  // Molten rock above its hardening point has nothing left to do.
  run(&mut world, 9);
  assert_eq!(world.get(4, 4).type_class(), TypeClass::Fluid);
}

#[test]
fn ignition_rate_matches_flammability() {
  const SAMPLES: u64 = 4000;
  let flammability = profile(profiles::WOOD as u32).flammability;

  let mut ignited = 0u64;
  for seed in 0..SAMPLES {
    let mut world = world(3, 3, 4, seed);
    fill(&mut world, 0, 2, 3, 3, elements::stone);
    let source = elements::fire_source(world.rng_mut());
    world.set(1, 1, source);
    let wood = elements::wood(world.rng_mut());
    world.set(2, 1, wood);

    world.tick();
    if world.get(2, 1).behavior_or_none() == Behavior::FireSource {
      ignited += 1;
    }
  }

  let rate = ignited as f32 / SAMPLES as f32;
  assert!(
    (rate - flammability).abs() < 0.015,
    "ignition rate {rate} vs flammability {flammability}"
  );
}

#[test]
fn movement_conserves_cell_identities() {
  let mut world = world(48, 48, 16, 19);
  fill(&mut world, 0, 47, 48, 48, elements::stone);
  fill(&mut world, 10, 30, 12, 47, elements::stone);
  fill(&mut world, 5, 0, 20, 10, elements::sand);
  fill(&mut world, 22, 5, 40, 12, elements::water);
  fill(&mut world, 30, 30, 40, 40, elements::smoke);

  let census = |world: &ElementWorld| {
    let mut counts = HashMap::new();
    for (_, _, cell) in world.grid().iter() {
      *counts.entry(cell.identity()).or_insert(0u32) += 1;
    }
    counts
  };

  let before = census(&world);
  for _ in 0..120 {
    world.tick();
    assert_eq!(census(&world), before);
  }
}

#[test]
fn malformed_cells_do_not_stop_the_world() {
  let mut world = world(32, 32, 16, 41);
  let bad_head = Head::new(TypeClass::Powder, Behavior::None).with_behavior_bits(15);
  let bad = Cell::new(bad_head, Tail::ZERO);
  for x in [3, 17, 29] {
    world.set(x, 20, bad);
  }
  let sand = elements::sand(world.rng_mut());
  world.set(8, 0, sand);

  let report = world.tick();
  assert_eq!(report.cell_errors, 3);

  run(&mut world, 40);
  let landed = (0..32)
    .filter(|&x| world.get(x, 31).type_class() == TypeClass::Powder)
    .count();
  assert_eq!(landed, 1);
  for x in [3, 17, 29] {
    assert_eq!(world.get(x, 20), bad);
  }
}
