//! World control: pausing the simulation and saving or restoring snapshots.

use std::path::PathBuf;

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;
use element_world::{ElementWorld, WorldSnapshot};

use crate::{ChangedChunks, SandWorld};

/// Whether ticks run.
///
/// While paused the world keeps its state and can still be edited, saved
/// or restored; `FixedUpdate` simply skips the tick.
#[derive(Resource, Debug, Default)]
pub struct SimulationState {
  paused: bool,
}

impl SimulationState {
  pub fn paused() -> Self {
    Self { paused: true }
  }

  pub fn is_paused(&self) -> bool {
    self.paused
  }

  pub fn is_running(&self) -> bool {
    !self.paused
  }

  pub fn pause(&mut self) {
    self.paused = true;
  }

  pub fn resume(&mut self) {
    self.paused = false;
  }

  pub fn toggle(&mut self) {
    self.paused = !self.paused;
  }
}

/// Message asking for the world to be written to `path`.
#[derive(Message, Clone, Debug)]
pub struct SaveWorld {
  pub path: PathBuf,
  /// LZ4 compress the payload.
  pub compress: bool,
}

/// Message asking for the world to be replaced by the snapshot at `path`.
///
/// Tuning comes from the running world's config. Tick hooks are dropped
/// with the old world and must be registered again.
#[derive(Message, Clone, Debug)]
pub struct LoadWorld {
  pub path: PathBuf,
}

/// Outcome of a [`SaveWorld`] or [`LoadWorld`] request.
#[derive(Message, Clone, Debug)]
pub struct SnapshotComplete {
  pub path: PathBuf,
  pub kind: SnapshotKind,
  /// Error text if the operation failed.
  pub error: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnapshotKind {
  Save,
  Load,
}

impl SnapshotComplete {
  pub fn is_ok(&self) -> bool {
    self.error.is_none()
  }
}

/// System: handles pending save and load requests.
pub(crate) fn handle_snapshot_messages(
  mut saves: MessageReader<SaveWorld>,
  mut loads: MessageReader<LoadWorld>,
  mut world: ResMut<SandWorld>,
  mut changed: ResMut<ChangedChunks>,
  mut complete: MessageWriter<SnapshotComplete>,
) {
  for request in saves.read() {
    let result = world.export_snapshot().save(&request.path, request.compress);
    if let Err(e) = &result {
      log::error!("Failed to save world to {}: {}", request.path.display(), e);
    }
    complete.write(SnapshotComplete {
      path: request.path.clone(),
      kind: SnapshotKind::Save,
      error: result.err().map(|e| e.to_string()),
    });
  }

  for request in loads.read() {
    let result = WorldSnapshot::load(&request.path)
      .and_then(|snapshot| ElementWorld::from_snapshot(&snapshot, world.config().clone()));
    let error = match result {
      Ok(restored) => {
        world.0 = restored;
        // Everything on screen is stale.
        changed.0 = all_chunks(&world);
        None
      }
      Err(e) => {
        log::error!("Failed to load world from {}: {}", request.path.display(), e);
        Some(e.to_string())
      }
    };
    complete.write(SnapshotComplete {
      path: request.path.clone(),
      kind: SnapshotKind::Load,
      error,
    });
  }
}

fn all_chunks(world: &ElementWorld) -> Vec<element_world::ChunkCoord> {
  let chunks = world.chunks();
  (0..chunks.len()).map(|i| chunks.coord(i)).collect()
}
