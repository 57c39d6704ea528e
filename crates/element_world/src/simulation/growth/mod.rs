//! Slow structural growth: grass chains and templated trees.
//!
//! Growth rules are rolled with small per-tick chances, so a seed takes
//! tens to hundreds of ticks to sprout and a tree grows a few template
//! nodes at a time.

pub mod grass;
pub(crate) mod templates;
pub mod tree;

use crate::cell::Head;

/// Tree template selector stored in a tree seed or base.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TreeSpecies {
  Oak = 0,
  Pine = 1,
  Birch = 2,
  Shrub = 3,
}

impl TreeSpecies {
  pub const ALL: [Self; 4] = [Self::Oak, Self::Pine, Self::Birch, Self::Shrub];

  #[inline]
  pub const fn from_bits(bits: u32) -> Self {
    match bits & 0b11 {
      0 => Self::Oak,
      1 => Self::Pine,
      2 => Self::Birch,
      _ => Self::Shrub,
    }
  }
}

/// Life stage of a rooted tree, kept on its base cell.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Vitality {
  Growing = 0,
  Grown = 1,
  Damaged = 2,
  Dying = 3,
}

impl Vitality {
  #[inline]
  pub const fn from_bits(bits: u32) -> Self {
    match bits & 0b11 {
      0 => Self::Growing,
      1 => Self::Grown,
      2 => Self::Damaged,
      _ => Self::Dying,
    }
  }
}

const VITALITY_SHIFT: u32 = 2;

/// `special` value of a tree base: `species:2 | vitality:2`.
#[inline]
pub const fn tree_special(species: TreeSpecies, vitality: Vitality) -> u32 {
  species as u32 | ((vitality as u32) << VITALITY_SHIFT)
}

#[inline]
pub(crate) fn species_of(head: Head) -> TreeSpecies {
  TreeSpecies::from_bits(head.special())
}

#[inline]
pub(crate) fn vitality_of(head: Head) -> Vitality {
  Vitality::from_bits(head.special() >> VITALITY_SHIFT)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cell::{Behavior, TypeClass};

  #[test]
  fn special_packs_species_and_vitality() {
    for species in TreeSpecies::ALL {
      let special = tree_special(species, Vitality::Damaged);
      let head = Head::new(TypeClass::Static, Behavior::Tree).with_special(special);
      assert_eq!(species_of(head), species);
      assert_eq!(vitality_of(head), Vitality::Damaged);
    }
  }
}
