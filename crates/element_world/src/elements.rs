//! Element constructors.
//!
//! The narrow authoring surface the engine needs for its own rules and for
//! tests. Color variation draws from the shared stream, so building the
//! same scene with the same stream gives identical cells.

use crate::cell::{Behavior, BlurClass, Cell, Head, LiquidKind, Tail, TypeClass};
use crate::heat_profile::profiles;
use crate::rng::SimRng;
use crate::simulation::growth::TreeSpecies;

/// Body id given to every tree part.
pub const TREE_BODY_ID: u32 = 1;

pub mod colors {
  pub const SAND: [u8; 3] = [220, 190, 120];
  pub const SOIL: [u8; 3] = [110, 80, 50];
  pub const WET_SAND: [u8; 3] = [170, 140, 90];
  pub const DUST: [u8; 3] = [200, 200, 190];
  pub const STONE: [u8; 3] = [120, 120, 125];
  pub const METAL: [u8; 3] = [160, 165, 175];
  pub const WOOD: [u8; 3] = [110, 75, 40];
  pub const COAL: [u8; 3] = [40, 40, 40];
  pub const WATER: [u8; 3] = [50, 100, 220];
  pub const OIL: [u8; 3] = [70, 50, 20];
  pub const LAVA: [u8; 3] = [230, 90, 20];
  pub const STEAM: [u8; 3] = [210, 210, 230];
  pub const SMOKE: [u8; 3] = [80, 80, 80];
  pub const FIRE: [u8; 3] = [255, 140, 30];
  pub const ASH: [u8; 3] = [150, 150, 150];
  pub const GRASS: [u8; 3] = [60, 170, 50];
  pub const LEAF: [u8; 3] = [40, 140, 40];
  pub const ROOT: [u8; 3] = [130, 95, 60];
  pub const METEOR: [u8; 3] = [90, 60, 40];
  pub const BLOCK: [u8; 3] = [100, 100, 110];
}

/// Brightness-shifted color.
pub fn tint(rng: &mut SimRng, base: [u8; 3], spread: i32) -> Tail {
  let shift = rng.range_inclusive(-spread, spread);
  let channel = |c: u8| (c as i32 + shift).clamp(0, 255) as u8;
  Tail::rgb(channel(base[0]), channel(base[1]), channel(base[2]))
}

fn make(class: TypeClass, behavior: Behavior, heat: u8) -> Head {
  Head::new(class, behavior).with_heat_index(heat as u32)
}

#[inline]
pub fn air() -> Cell {
  Cell::DEFAULT
}

pub fn sand(rng: &mut SimRng) -> Cell {
  Cell::new(
    make(TypeClass::Powder, Behavior::None, profiles::SAND),
    tint(rng, colors::SAND, 12),
  )
}

pub fn soil(rng: &mut SimRng) -> Cell {
  Cell::new(
    make(TypeClass::Powder, Behavior::Soil, profiles::ASH),
    tint(rng, colors::SOIL, 10),
  )
}

pub fn wet_sand(rng: &mut SimRng) -> Cell {
  Cell::new(
    make(TypeClass::WetPowder, Behavior::None, profiles::SAND),
    tint(rng, colors::WET_SAND, 10),
  )
}

pub fn dust(rng: &mut SimRng) -> Cell {
  Cell::new(
    make(TypeClass::FloatingPowder, Behavior::None, profiles::ASH),
    tint(rng, colors::DUST, 8),
  )
}

pub fn stone(rng: &mut SimRng) -> Cell {
  Cell::new(
    make(TypeClass::Static, Behavior::None, profiles::STONE),
    tint(rng, colors::STONE, 10),
  )
}

pub fn metal(rng: &mut SimRng) -> Cell {
  Cell::new(
    make(TypeClass::Static, Behavior::None, profiles::METAL),
    tint(rng, colors::METAL, 6),
  )
}

pub fn wood(rng: &mut SimRng) -> Cell {
  Cell::new(
    make(TypeClass::Static, Behavior::None, profiles::WOOD),
    tint(rng, colors::WOOD, 8),
  )
}

pub fn coal(rng: &mut SimRng) -> Cell {
  Cell::new(
    make(TypeClass::Powder, Behavior::None, profiles::COAL),
    tint(rng, colors::COAL, 6),
  )
}

fn liquid(class: TypeClass, kind: LiquidKind, heat: u8) -> Head {
  make(class, Behavior::Liquid, heat).with_special(kind as u32)
}

pub fn water(rng: &mut SimRng) -> Cell {
  Cell::new(
    liquid(TypeClass::Fluid, LiquidKind::Water, profiles::WATER),
    tint(rng, colors::WATER, 6).with_blur_class(BlurClass::Foreground),
  )
}

pub fn oil(rng: &mut SimRng) -> Cell {
  Cell::new(
    liquid(TypeClass::Fluid, LiquidKind::Oil, profiles::OIL),
    tint(rng, colors::OIL, 6),
  )
}

pub fn lava(rng: &mut SimRng) -> Cell {
  Cell::new(
    liquid(TypeClass::Fluid, LiquidKind::Molten, profiles::LAVA).with_temp(230),
    tint(rng, colors::LAVA, 15).with_heat_visual(2),
  )
}

pub fn steam(rng: &mut SimRng) -> Cell {
  Cell::new(
    liquid(TypeClass::Gas, LiquidKind::Water, profiles::STEAM).with_temp(110),
    tint(rng, colors::STEAM, 8).with_blur_class(BlurClass::Background),
  )
}

pub fn smoke(rng: &mut SimRng) -> Cell {
  Cell::new(
    make(TypeClass::Gas, Behavior::None, profiles::AIR),
    tint(rng, colors::SMOKE, 10).with_blur_class(BlurClass::Background),
  )
}

/// Transient flame holding `temperature`.
pub fn fire(rng: &mut SimRng, temperature: u8) -> Cell {
  Cell::new(
    make(TypeClass::Effect, Behavior::Fire, profiles::AIR).with_temp(temperature),
    tint(rng, colors::FIRE, 20)
      .with_blur_class(BlurClass::Foreground)
      .with_heat_visual(3),
  )
}

/// Burning coal.
pub fn fire_source(rng: &mut SimRng) -> Cell {
  Cell::new(
    make(TypeClass::Powder, Behavior::FireSource, profiles::COAL).with_temp(230),
    tint(rng, colors::COAL, 6).with_heat_visual(2),
  )
}

pub fn ash(rng: &mut SimRng) -> Cell {
  Cell::new(
    make(TypeClass::Powder, Behavior::None, profiles::ASH),
    tint(rng, colors::ASH, 12),
  )
}

/// Seed that grows a grass chain of `3..=8` cells once it lands.
pub fn grass_seed(rng: &mut SimRng) -> Cell {
  let height = rng.range_inclusive(3, 8) as u32;
  Cell::new(
    make(TypeClass::Powder, Behavior::Grass, profiles::GRASS).with_special(height),
    tint(rng, colors::GRASS, 10),
  )
}

/// Standing grass cell that can still grow `height` cells.
pub fn grass_blade(rng: &mut SimRng, height: u32) -> Cell {
  Cell::new(
    make(TypeClass::Static, Behavior::Grass, profiles::GRASS).with_special(height),
    tint(rng, colors::GRASS, 14),
  )
}

pub fn tree_seed(rng: &mut SimRng, species: TreeSpecies) -> Cell {
  Cell::new(
    make(TypeClass::Powder, Behavior::Tree, profiles::WOOD).with_special(species as u32),
    tint(rng, colors::WOOD, 8),
  )
}

fn tree_part(behavior: Behavior, heat: u8) -> Head {
  make(TypeClass::Static, behavior, heat).with_body(TREE_BODY_ID, true)
}

/// Rooted tree base; `special` holds species and vitality.
pub fn tree_base(rng: &mut SimRng, special: u32) -> Cell {
  Cell::new(
    tree_part(Behavior::Tree, profiles::WOOD).with_special(special),
    tint(rng, colors::WOOD, 6),
  )
}

pub fn trunk(rng: &mut SimRng) -> Cell {
  Cell::new(
    tree_part(Behavior::TreeTrunk, profiles::WOOD),
    tint(rng, colors::WOOD, 10),
  )
}

pub fn leaf(rng: &mut SimRng) -> Cell {
  Cell::new(
    tree_part(Behavior::TreeLeaf, profiles::LEAF),
    tint(rng, colors::LEAF, 18),
  )
}

/// Root that can still extend `length` cells.
pub fn root(rng: &mut SimRng, length: u32) -> Cell {
  Cell::new(
    tree_part(Behavior::TreeRoot, profiles::WOOD).with_special(length),
    tint(rng, colors::ROOT, 8),
  )
}

pub fn meteor(rng: &mut SimRng) -> Cell {
  Cell::new(
    make(TypeClass::Powder, Behavior::Meteor, profiles::COAL).with_temp(255),
    tint(rng, colors::METEOR, 10).with_heat_visual(3),
  )
}

/// Rigid block cell belonging to body `id` (1..=15).
pub fn solid_body(rng: &mut SimRng, id: u32) -> Cell {
  Cell::new(
    make(TypeClass::Static, Behavior::None, profiles::STONE).with_body(id, false),
    tint(rng, colors::BLOCK, 8),
  )
}

/// Cell occupied by an external mobile entity.
pub fn entity(color: [u8; 3]) -> Cell {
  Cell::new(
    make(TypeClass::Static, Behavior::Entity, profiles::AIR),
    Tail::rgb(color[0], color[1], color[2]),
  )
}
