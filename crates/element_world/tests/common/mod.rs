//! Scene builders shared by the integration tests.

#![allow(dead_code)]

use element_world::{ElementWorld, EngineConfig, TreeSpecies, elements};

pub fn config(width: u32, height: u32, chunk_size: u32, seed: u64) -> EngineConfig {
  EngineConfig {
    width,
    height,
    chunk_size,
    seed,
    ..Default::default()
  }
}

pub fn world(width: u32, height: u32, chunk_size: u32, seed: u64) -> ElementWorld {
  ElementWorld::new(config(width, height, chunk_size, seed)).unwrap()
}

/// Fills a rectangle with cells built by `make`.
pub fn fill(
  world: &mut ElementWorld,
  x0: u32,
  y0: u32,
  x1: u32,
  y1: u32,
  mut make: impl FnMut(&mut element_world::SimRng) -> element_world::Cell,
) {
  for y in y0..y1 {
    for x in x0..x1 {
      let cell = make(world.rng_mut());
      world.set(x, y, cell);
    }
  }
}

/// A busy 64x64 scene touching most rule families: falling sand and water,
/// a stone basin, a lava pocket, a burning wooden beam, a loose body and a
/// patch of planted soil.
pub fn busy_scene(seed: u64) -> ElementWorld {
  let mut world = world(64, 64, 16, seed);

  fill(&mut world, 0, 60, 64, 64, elements::stone);
  fill(&mut world, 4, 44, 6, 60, elements::stone);
  fill(&mut world, 30, 44, 32, 60, elements::stone);

  fill(&mut world, 8, 4, 20, 12, elements::sand);
  fill(&mut world, 20, 2, 28, 8, elements::water);
  fill(&mut world, 10, 56, 16, 60, elements::lava);
  fill(&mut world, 36, 30, 50, 32, elements::wood);
  let source = elements::fire_source(world.rng_mut());
  world.set(42, 29, source);
  fill(&mut world, 52, 10, 58, 14, |rng| elements::solid_body(rng, 3));

  fill(&mut world, 34, 54, 64, 60, elements::soil);
  let seed_cell = elements::tree_seed(world.rng_mut(), TreeSpecies::Shrub);
  world.set(40, 53, seed_cell);
  let grass = elements::grass_seed(world.rng_mut());
  world.set(56, 53, grass);
  world
}

pub fn run(world: &mut ElementWorld, ticks: u32) {
  for _ in 0..ticks {
    world.tick();
  }
}

/// Raw words of the whole grid, for bit-exact comparisons.
pub fn words(world: &ElementWorld) -> (Vec<u8>, Vec<u8>) {
  (world.grid().heads_to_bytes(), world.grid().tails_to_bytes())
}
