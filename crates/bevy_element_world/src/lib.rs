//! Bevy integration for `element_world`.
//!
//! [`ElementWorldPlugin`] owns the simulation as the [`SandWorld`] resource
//! and advances it once per `FixedUpdate` at the configured tick rate.
//! Systems that move entities through the grid go in
//! [`ElementWorldSet::BeforeTick`] or [`ElementWorldSet::AfterTick`];
//! renderers read [`ChangedChunks`] to know which chunks to repaint.

pub mod control;
pub mod diagnostics;

use std::path::Path;

use bevy::prelude::*;
pub use control::{LoadWorld, SaveWorld, SimulationState, SnapshotComplete, SnapshotKind};
pub use diagnostics::{SimulationMetrics, TimeSeries};
use element_world::{ChunkCoord, ElementWorld, EngineConfig, EngineError};
use web_time::Instant;

/// The simulated world.
#[derive(Resource, Deref, DerefMut)]
pub struct SandWorld(pub ElementWorld);

/// Chunks written to by the most recent tick, or by anything that touched
/// the world since the tick before it.
#[derive(Resource, Debug, Default, Deref)]
pub struct ChangedChunks(pub Vec<ChunkCoord>);

/// Ordering of the simulation inside `FixedUpdate`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementWorldSet {
  /// Entities stamp themselves into the grid.
  BeforeTick,
  /// The tick itself.
  Tick,
  /// Entities read back what the tick did to them.
  AfterTick,
}

/// Plugin running an [`ElementWorld`].
#[derive(Default)]
pub struct ElementWorldPlugin {
  pub config: EngineConfig,
}

impl ElementWorldPlugin {
  pub fn new(config: EngineConfig) -> Self {
    Self { config }
  }

  /// Reads the engine config from a TOML file.
  pub fn from_toml(path: impl AsRef<Path>) -> Result<Self, EngineError> {
    Ok(Self::new(EngineConfig::load(path)?))
  }
}

impl Plugin for ElementWorldPlugin {
  fn build(&self, app: &mut App) {
    match ElementWorld::new(self.config.clone()) {
      Ok(world) => {
        app.insert_resource(SandWorld(world));
      }
      Err(e) => {
        log::error!("Element world not created: {}", e);
      }
    }

    app
      .insert_resource(Time::<Fixed>::from_hz(self.config.ticks_per_second))
      .init_resource::<SimulationState>()
      .init_resource::<ChangedChunks>()
      .init_resource::<SimulationMetrics>()
      .add_message::<SaveWorld>()
      .add_message::<LoadWorld>()
      .add_message::<SnapshotComplete>();

    app.configure_sets(
      FixedUpdate,
      (
        ElementWorldSet::BeforeTick,
        ElementWorldSet::Tick,
        ElementWorldSet::AfterTick,
      )
        .chain(),
    );

    app.add_systems(
      FixedUpdate,
      (run_tick, publish_changed_chunks)
        .chain()
        .in_set(ElementWorldSet::Tick)
        .run_if(resource_exists::<SandWorld>)
        .run_if(simulation_not_paused),
    );

    app.add_systems(
      Update,
      control::handle_snapshot_messages.run_if(resource_exists::<SandWorld>),
    );
  }
}

/// System: advances the world by one tick.
fn run_tick(mut world: ResMut<SandWorld>, mut metrics: ResMut<SimulationMetrics>) {
  let start = Instant::now();
  let report = world.tick();
  let elapsed_ms = start.elapsed().as_secs_f32() * 1000.0;
  if report.cell_errors > 0 {
    log::debug!("Tick {} skipped {} cell(s)", report.tick, report.cell_errors);
  }
  metrics.record(report, elapsed_ms);
}

/// System: hands the changed chunk set to renderers.
fn publish_changed_chunks(mut world: ResMut<SandWorld>, mut changed: ResMut<ChangedChunks>) {
  changed.0 = world.take_changed_chunks();
}

fn simulation_not_paused(state: Res<SimulationState>) -> bool {
  state.is_running()
}
