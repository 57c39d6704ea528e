//! Engine configuration.
//!
//! Every empirically tuned constant of the simulation lives here. All
//! sections are `#[serde(default)]`, so a TOML file only needs the keys it
//! overrides:
//!
//! ```toml
//! width = 320
//! height = 180
//! seed = 7
//!
//! [fluid]
//! spread_distance = 4
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::chunk::{MAX_CHUNK_SIZE, MIN_CHUNK_SIZE};
use crate::error::{ConfigError, EngineError};
use crate::grid::MAX_DIMENSION;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
  pub width: u32,
  pub height: u32,
  /// Chunk edge in cells (4..=128).
  pub chunk_size: u32,
  pub seed: u64,
  /// Target tick rate of the external clock.
  pub ticks_per_second: f64,
  /// Cells leaving the bottom edge re-enter at the top.
  pub fall_through: bool,
  /// The outer border ring is reset to air every tick.
  pub erasing: bool,
  pub scheduler: SchedulerConfig,
  pub powder: PowderConfig,
  pub fluid: FluidConfig,
  pub heat: HeatConfig,
  pub body: BodyConfig,
  pub growth: GrowthConfig,
  pub combustion: CombustionConfig,
  pub entity: EntityConfig,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      width: 256,
      height: 256,
      chunk_size: 16,
      seed: 0,
      ticks_per_second: 60.0,
      fall_through: false,
      erasing: false,
      scheduler: SchedulerConfig::default(),
      powder: PowderConfig::default(),
      fluid: FluidConfig::default(),
      heat: HeatConfig::default(),
      body: BodyConfig::default(),
      growth: GrowthConfig::default(),
      combustion: CombustionConfig::default(),
      entity: EntityConfig::default(),
    }
  }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
  /// Number of precomputed cell-order permutations.
  pub permutation_tables: u32,
  /// Ticks between reshuffles of one permutation table.
  pub permutation_refresh_interval: u32,
  /// Minimum ticks between full idle scans of one chunk.
  pub idle_recheck_interval: u32,
  /// Consecutive passing idle scans before a chunk sleeps.
  pub idle_checks_to_sleep: u8,
}

impl Default for SchedulerConfig {
  fn default() -> Self {
    Self {
      permutation_tables: 4,
      permutation_refresh_interval: 16,
      idle_recheck_interval: 10,
      idle_checks_to_sleep: 2,
    }
  }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowderConfig {
  /// Chance to keep full momentum for one more slide step, indexed by the
  /// current momentum. A failed roll costs one momentum point.
  pub momentum_continue: [f32; 8],
  /// Chance per tick that a resting wet powder slides diagonally.
  pub wet_slide_chance: f32,
}

impl Default for PowderConfig {
  fn default() -> Self {
    Self {
      momentum_continue: [0.0, 0.5, 0.6, 0.7, 0.8, 0.85, 0.9, 0.95],
      wet_slide_chance: 0.1,
    }
  }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FluidConfig {
  /// Furthest horizontal step per tick.
  pub spread_distance: u32,
  /// Chance per tick that a denser liquid sinks through a lighter one.
  pub sink_chance: f32,
  /// Chance per tick that a gas drifts sideways when it cannot rise.
  pub gas_drift_chance: f32,
  /// Chance per tick that oil tints an adjacent solid or powder.
  pub oil_stain_chance: f32,
}

impl Default for FluidConfig {
  fn default() -> Self {
    Self {
      spread_distance: 3,
      sink_chance: 0.3,
      gas_drift_chance: 0.5,
      oil_stain_chance: 0.01,
    }
  }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatConfig {
  /// Largest temperature change one conduction step applies.
  pub max_delta: u8,
  /// Below `hardening - margin` a molten cell hardens without support.
  pub forced_hardening_margin: u8,
  /// Water turns to steam at or above this temperature.
  pub boil_temperature: u8,
  /// Steam may condense below this temperature.
  pub condense_temperature: u8,
  pub condense_chance: f32,
  /// Degrees a molten liquid hands to a cooler neighbor per tick.
  pub molten_radiation: u8,
}

impl Default for HeatConfig {
  fn default() -> Self {
    Self {
      max_delta: 10,
      forced_hardening_margin: 40,
      boil_temperature: 100,
      condense_temperature: 60,
      condense_chance: 0.05,
      molten_radiation: 4,
    }
  }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
  /// Free lower-border fraction at which a non-tree body falls.
  pub fall_fraction: f32,
  /// Free lower-border fraction above which a body destabilizes the powder
  /// beneath it.
  pub destabilize_fraction: f32,
  /// A displaced fluid moved further than this is replaced by air.
  pub fluid_reuse_distance: u32,
  /// Momentum given to powder nudged by a destabilized body.
  pub nudge_momentum: u32,
}

impl Default for BodyConfig {
  fn default() -> Self {
    Self {
      fall_fraction: 0.95,
      destabilize_fraction: 0.75,
      fluid_reuse_distance: 8,
      nudge_momentum: 3,
    }
  }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthConfig {
  pub grass_growth_chance: f32,
  pub grass_branch_chance: f32,
  /// Grass dies at or above this temperature.
  pub grass_max_temperature: u8,
  pub tree_growth_chance: f32,
  /// Template nodes placed per growth step.
  pub tree_nodes_per_step: u32,
  /// Fraction of missing template nodes that marks a grown tree damaged.
  pub tree_damage_fraction: f32,
  /// Length a fresh root keeps growing.
  pub root_length: u32,
  pub root_harden_chance: f32,
}

impl Default for GrowthConfig {
  fn default() -> Self {
    Self {
      grass_growth_chance: 0.025,
      grass_branch_chance: 0.2,
      grass_max_temperature: 120,
      tree_growth_chance: 0.01,
      tree_nodes_per_step: 2,
      tree_damage_fraction: 0.34,
      root_length: 6,
      root_harden_chance: 0.05,
    }
  }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombustionConfig {
  /// Fire cells below this temperature go out.
  pub fire_floor: u8,
  /// Largest random temperature loss of a fire cell per tick.
  pub fire_decay: u8,
  /// Chance that a fire cell spawns another above it.
  pub fire_rise_chance: f32,
  /// Chance that a fire source emits a flame into the air above it.
  pub flame_spawn_chance: f32,
  /// Chance that a consumed powder or solid turns to ash rather than fire.
  pub ash_chance: f32,
  /// A burning cell raises each neighbor by `1/heat_share` of the gap to
  /// its flame heat.
  pub heat_share: u8,
  pub burn_mark_chance: f32,
  pub meteor_impact_radius: u32,
  pub meteor_impact_heat: u8,
  pub meteor_trail_chance: f32,
}

impl Default for CombustionConfig {
  fn default() -> Self {
    Self {
      fire_floor: 60,
      fire_decay: 12,
      fire_rise_chance: 0.5,
      flame_spawn_chance: 0.3,
      ash_chance: 0.5,
      heat_share: 8,
      burn_mark_chance: 0.05,
      meteor_impact_radius: 3,
      meteor_impact_heat: 120,
      meteor_trail_chance: 0.5,
    }
  }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityConfig {
  /// Chance per tick that an unattended entity cell ages one step.
  pub decay_chance: f32,
}

impl Default for EntityConfig {
  fn default() -> Self {
    Self { decay_chance: 0.05 }
  }
}

impl EngineConfig {
  /// Parses and validates a TOML document.
  pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
    let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
    config.validate()?;
    Ok(config)
  }

  pub fn to_toml_string(&self) -> Result<String, ConfigError> {
    toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
  }

  /// Reads, parses and validates a TOML file.
  pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let config = Self::from_toml_str(&text)?;
    log::debug!("Loaded engine config from {}", path.display());
    Ok(config)
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.width == 0 || self.width > MAX_DIMENSION {
      return Err(invalid("width", format!("must be in 1..={}", MAX_DIMENSION)));
    }
    if self.height == 0 || self.height > MAX_DIMENSION {
      return Err(invalid("height", format!("must be in 1..={}", MAX_DIMENSION)));
    }
    if !(MIN_CHUNK_SIZE..=MAX_CHUNK_SIZE).contains(&self.chunk_size) {
      return Err(invalid(
        "chunk_size",
        format!("must be in {}..={}", MIN_CHUNK_SIZE, MAX_CHUNK_SIZE),
      ));
    }
    if !(self.ticks_per_second > 0.0) {
      return Err(invalid("ticks_per_second", "must be positive".into()));
    }

    let s = &self.scheduler;
    if s.permutation_tables == 0 || s.permutation_tables > 64 {
      return Err(invalid("scheduler.permutation_tables", "must be in 1..=64".into()));
    }
    if s.permutation_refresh_interval == 0 {
      return Err(invalid("scheduler.permutation_refresh_interval", "must be positive".into()));
    }
    if s.idle_recheck_interval == 0 {
      return Err(invalid("scheduler.idle_recheck_interval", "must be positive".into()));
    }
    if s.idle_checks_to_sleep == 0 {
      return Err(invalid("scheduler.idle_checks_to_sleep", "must be positive".into()));
    }

    for (i, &p) in self.powder.momentum_continue.iter().enumerate() {
      check_probability("powder.momentum_continue", p).map_err(|_| {
        invalid(
          "powder.momentum_continue",
          format!("entry {} is not in [0, 1]", i),
        )
      })?;
    }
    check_probability("powder.wet_slide_chance", self.powder.wet_slide_chance)?;

    if self.fluid.spread_distance == 0 {
      return Err(invalid("fluid.spread_distance", "must be positive".into()));
    }
    check_probability("fluid.sink_chance", self.fluid.sink_chance)?;
    check_probability("fluid.gas_drift_chance", self.fluid.gas_drift_chance)?;
    check_probability("fluid.oil_stain_chance", self.fluid.oil_stain_chance)?;

    if self.heat.condense_temperature >= self.heat.boil_temperature {
      return Err(invalid(
        "heat.condense_temperature",
        "must be below heat.boil_temperature".into(),
      ));
    }
    check_probability("heat.condense_chance", self.heat.condense_chance)?;

    check_probability("body.fall_fraction", self.body.fall_fraction)?;
    check_probability("body.destabilize_fraction", self.body.destabilize_fraction)?;
    if self.body.destabilize_fraction > self.body.fall_fraction {
      return Err(invalid(
        "body.destabilize_fraction",
        "must not exceed body.fall_fraction".into(),
      ));
    }

    let g = &self.growth;
    check_probability("growth.grass_growth_chance", g.grass_growth_chance)?;
    check_probability("growth.grass_branch_chance", g.grass_branch_chance)?;
    check_probability("growth.tree_growth_chance", g.tree_growth_chance)?;
    check_probability("growth.tree_damage_fraction", g.tree_damage_fraction)?;
    check_probability("growth.root_harden_chance", g.root_harden_chance)?;
    if g.root_length > 15 {
      return Err(invalid("growth.root_length", "must be at most 15".into()));
    }

    let c = &self.combustion;
    check_probability("combustion.fire_rise_chance", c.fire_rise_chance)?;
    check_probability("combustion.flame_spawn_chance", c.flame_spawn_chance)?;
    check_probability("combustion.ash_chance", c.ash_chance)?;
    check_probability("combustion.burn_mark_chance", c.burn_mark_chance)?;
    check_probability("combustion.meteor_trail_chance", c.meteor_trail_chance)?;
    if c.heat_share == 0 {
      return Err(invalid("combustion.heat_share", "must be positive".into()));
    }

    check_probability("entity.decay_chance", self.entity.decay_chance)?;
    Ok(())
  }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
  ConfigError::Invalid { field, reason }
}

fn check_probability(field: &'static str, p: f32) -> Result<(), ConfigError> {
  if (0.0..=1.0).contains(&p) {
    Ok(())
  } else {
    Err(invalid(field, format!("{} is not in [0, 1]", p)))
  }
}
