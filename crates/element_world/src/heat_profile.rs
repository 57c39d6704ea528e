//! Heat-modifier profiles.
//!
//! Every head word carries a 4-bit index into [`HEAT_PROFILES`], a fixed
//! table of thermal constants. The table is never mutated; phase changes
//! re-point a cell to another entry.

/// A temperature threshold and the profile a cell switches to past it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseChange {
  pub temperature: u8,
  pub target: u8,
}

/// Thermal constants for one heat-modifier index.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeatProfile {
  pub name: &'static str,
  /// Fraction of the temperature difference exchanged per conduction step.
  pub conductive_index: f32,
  /// Chance to lose one degree per heat step.
  pub heat_loss_chance: f32,
  /// Chance to catch fire per tick when next to a flame.
  pub flammability: f32,
  /// Chance to ignite unaided once at or above `ignition_temperature`.
  pub self_ignition_chance: f32,
  pub ignition_temperature: u8,
  /// Temperature a burning cell of this profile holds.
  pub flame_heat: u8,
  /// Chance per tick that a burning cell is consumed.
  pub burn_down_chance: f32,
  pub melting: Option<PhaseChange>,
  pub hardening: Option<PhaseChange>,
}

impl HeatProfile {
  const INERT: Self = Self {
    name: "",
    conductive_index: 0.2,
    heat_loss_chance: 0.01,
    flammability: 0.0,
    self_ignition_chance: 0.0,
    ignition_temperature: 255,
    flame_heat: 0,
    burn_down_chance: 0.0,
    melting: None,
    hardening: None,
  };

  #[inline]
  pub fn is_flammable(&self) -> bool {
    self.flammability > 0.0
  }
}

/// Named indices into [`HEAT_PROFILES`].
pub mod profiles {
  pub const AIR: u8 = 0;
  pub const STONE: u8 = 1;
  pub const LAVA: u8 = 2;
  pub const METAL: u8 = 3;
  pub const MOLTEN_METAL: u8 = 4;
  pub const SAND: u8 = 5;
  pub const MOLTEN_GLASS: u8 = 6;
  pub const GLASS: u8 = 7;
  pub const WOOD: u8 = 8;
  pub const LEAF: u8 = 9;
  pub const GRASS: u8 = 10;
  pub const COAL: u8 = 11;
  pub const OIL: u8 = 12;
  pub const WATER: u8 = 13;
  pub const STEAM: u8 = 14;
  pub const ASH: u8 = 15;
}

const fn change(temperature: u8, target: u8) -> Option<PhaseChange> {
  Some(PhaseChange {
    temperature,
    target,
  })
}

pub static HEAT_PROFILES: [HeatProfile; 16] = [
  HeatProfile {
    name: "air",
    conductive_index: 0.25,
    heat_loss_chance: 0.3,
    ..HeatProfile::INERT
  },
  HeatProfile {
    name: "stone",
    conductive_index: 0.1,
    heat_loss_chance: 0.0,
    melting: change(250, profiles::LAVA),
    ..HeatProfile::INERT
  },
  HeatProfile {
    name: "lava",
    conductive_index: 0.3,
    heat_loss_chance: 0.02,
    hardening: change(180, profiles::STONE),
    ..HeatProfile::INERT
  },
  HeatProfile {
    name: "metal",
    conductive_index: 0.7,
    heat_loss_chance: 0.0,
    melting: change(220, profiles::MOLTEN_METAL),
    ..HeatProfile::INERT
  },
  HeatProfile {
    name: "molten metal",
    conductive_index: 0.7,
    heat_loss_chance: 0.01,
    hardening: change(200, profiles::METAL),
    ..HeatProfile::INERT
  },
  HeatProfile {
    name: "sand",
    conductive_index: 0.15,
    heat_loss_chance: 0.01,
    melting: change(235, profiles::MOLTEN_GLASS),
    ..HeatProfile::INERT
  },
  HeatProfile {
    name: "molten glass",
    conductive_index: 0.3,
    heat_loss_chance: 0.02,
    hardening: change(215, profiles::GLASS),
    ..HeatProfile::INERT
  },
  HeatProfile {
    name: "glass",
    conductive_index: 0.2,
    heat_loss_chance: 0.01,
    melting: change(240, profiles::MOLTEN_GLASS),
    ..HeatProfile::INERT
  },
  HeatProfile {
    name: "wood",
    conductive_index: 0.1,
    heat_loss_chance: 0.02,
    flammability: 0.05,
    self_ignition_chance: 0.01,
    ignition_temperature: 110,
    flame_heat: 190,
    burn_down_chance: 0.004,
    ..HeatProfile::INERT
  },
  HeatProfile {
    name: "leaf",
    conductive_index: 0.1,
    heat_loss_chance: 0.05,
    flammability: 0.3,
    self_ignition_chance: 0.05,
    ignition_temperature: 90,
    flame_heat: 160,
    burn_down_chance: 0.05,
    ..HeatProfile::INERT
  },
  HeatProfile {
    name: "grass",
    conductive_index: 0.1,
    heat_loss_chance: 0.05,
    flammability: 0.4,
    self_ignition_chance: 0.05,
    ignition_temperature: 80,
    flame_heat: 150,
    burn_down_chance: 0.1,
    ..HeatProfile::INERT
  },
  HeatProfile {
    name: "coal",
    conductive_index: 0.2,
    heat_loss_chance: 0.01,
    flammability: 0.02,
    self_ignition_chance: 0.005,
    ignition_temperature: 140,
    flame_heat: 230,
    burn_down_chance: 0.001,
    ..HeatProfile::INERT
  },
  HeatProfile {
    name: "oil",
    conductive_index: 0.2,
    heat_loss_chance: 0.02,
    flammability: 0.5,
    self_ignition_chance: 0.02,
    ignition_temperature: 100,
    flame_heat: 200,
    burn_down_chance: 0.02,
    ..HeatProfile::INERT
  },
  HeatProfile {
    name: "water",
    conductive_index: 0.5,
    heat_loss_chance: 0.02,
    ..HeatProfile::INERT
  },
  HeatProfile {
    name: "steam",
    conductive_index: 0.3,
    heat_loss_chance: 0.3,
    ..HeatProfile::INERT
  },
  HeatProfile {
    name: "ash",
    conductive_index: 0.15,
    heat_loss_chance: 0.05,
    ..HeatProfile::INERT
  },
];

/// Looks up a profile by its 4-bit index.
#[inline]
pub fn profile(index: u32) -> &'static HeatProfile {
  &HEAT_PROFILES[(index & 0xF) as usize]
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn indices_match_names() {
    assert_eq!(profile(profiles::AIR as u32).name, "air");
    assert_eq!(profile(profiles::MOLTEN_METAL as u32).name, "molten metal");
    assert_eq!(profile(profiles::ASH as u32).name, "ash");
  }

  #[test]
  fn phase_changes_round_trip() {
    for (index, p) in HEAT_PROFILES.iter().enumerate() {
      if let Some(melt) = p.melting {
        let molten = profile(melt.target as u32);
        let harden = molten
          .hardening
          .unwrap_or_else(|| panic!("{} melts into a profile that never hardens", p.name));
        assert!(
          harden.temperature < melt.temperature,
          "{} would oscillate",
          p.name
        );
        assert_ne!(melt.target as usize, index);
      }
    }
  }

  #[test]
  fn flammable_profiles_burn() {
    for p in HEAT_PROFILES.iter().filter(|p| p.is_flammable()) {
      assert!(p.flame_heat > 0, "{}", p.name);
      assert!(p.burn_down_chance > 0.0, "{}", p.name);
    }
  }

  #[test]
  fn probabilities_are_probabilities() {
    for p in &HEAT_PROFILES {
      for v in [
        p.conductive_index,
        p.heat_loss_chance,
        p.flammability,
        p.self_ignition_chance,
        p.burn_down_chance,
      ] {
        assert!((0.0..=1.0).contains(&v), "{}", p.name);
      }
    }
  }
}
