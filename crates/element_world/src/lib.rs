//! Element World - deterministic falling-element cellular automaton.
//!
//! A fixed-size grid of packed two-word cells advanced tick by tick:
//! granular and fluid flow, heat conduction and phase changes, combustion,
//! rigid bodies and slow plant growth. A chunk scheduler skips settled
//! regions, and every random decision draws from one seeded stream, so a
//! world built from the same seed and inputs evolves identically.
//!
//! ```
//! use element_world::{ElementWorld, EngineConfig, elements};
//!
//! let mut world = ElementWorld::new(EngineConfig {
//!   width: 64,
//!   height: 64,
//!   ..Default::default()
//! })
//! .unwrap();
//! let sand = elements::sand(world.rng_mut());
//! world.set(10, 0, sand);
//! world.tick();
//! assert_eq!(world.get(10, 1).type_class(), element_world::TypeClass::Powder);
//! ```

pub(crate) mod canvas;
pub mod cell;
pub mod chunk;
pub mod config;
pub mod elements;
pub mod error;
pub mod grid;
pub mod heat_profile;
pub mod hooks;
pub mod overlay;
pub mod persistence;
pub mod rng;
pub mod simulation;
pub mod world;

pub use cell::{Behavior, BlurClass, Cell, Head, LiquidKind, Tail, TypeClass};
pub use chunk::{ChunkBounds, ChunkCoord, ChunkMap};
pub use config::{
  BodyConfig, CombustionConfig, EngineConfig, EntityConfig, FluidConfig, GrowthConfig, HeatConfig,
  PowderConfig, SchedulerConfig,
};
pub use error::{CellError, ConfigError, EngineError};
pub use grid::Grid;
pub use heat_profile::{HEAT_PROFILES, HeatProfile, PhaseChange, profiles};
pub use hooks::{HookAccess, TickHook};
pub use persistence::{SnapshotMeta, WorldSnapshot};
pub use rng::{RngState, SimRng};
pub use simulation::TickReport;
pub use simulation::growth::{TreeSpecies, Vitality, tree_special};
pub use world::{ElementWorld, WorldModes};
