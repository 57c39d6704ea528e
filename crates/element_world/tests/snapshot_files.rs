//! Snapshot save/load through the filesystem.
//!
//! Run: cargo test -p element_world --test snapshot_files

mod common;

use common::{busy_scene, run, words};
use element_world::persistence::format::{Header, HeaderError};
use element_world::{ElementWorld, EngineError, WorldModes, WorldSnapshot};
use tempfile::TempDir;

#[test]
fn saved_world_loads_back() {
  let dir = TempDir::new().unwrap();
  let mut world = busy_scene(7);
  world.set_modes(WorldModes::FALL_THROUGH);
  run(&mut world, 40);

  for compress in [false, true] {
    let path = dir.path().join(format!("world_{compress}.elws"));
    world.export_snapshot().save(&path, compress).unwrap();

    let snapshot = WorldSnapshot::load(&path).unwrap();
    assert_eq!(snapshot.meta.tick, 40);
    assert_eq!(snapshot.meta.modes, WorldModes::FALL_THROUGH);

    let restored = ElementWorld::from_snapshot(&snapshot, world.config().clone()).unwrap();
    assert_eq!(words(&restored), words(&world));
    assert_eq!(restored.tick_count(), world.tick_count());
    assert_eq!(restored.modes(), world.modes());
  }
}

#[test]
fn compression_shrinks_a_mostly_empty_world() {
  let dir = TempDir::new().unwrap();
  let world = busy_scene(3);
  let raw = dir.path().join("raw.elws");
  let packed = dir.path().join("packed.elws");
  world.export_snapshot().save(&raw, false).unwrap();
  world.export_snapshot().save(&packed, true).unwrap();

  let raw_len = std::fs::metadata(&raw).unwrap().len();
  let packed_len = std::fs::metadata(&packed).unwrap().len();
  assert!(packed_len < raw_len / 2, "{packed_len} vs {raw_len}");
}

#[test]
fn missing_file_is_an_io_error() {
  let dir = TempDir::new().unwrap();
  let err = WorldSnapshot::load(dir.path().join("absent.elws")).unwrap_err();
  assert!(matches!(err, EngineError::Io(_)));
}

#[test]
fn corrupted_file_is_rejected() {
  let dir = TempDir::new().unwrap();
  let path = dir.path().join("world.elws");
  busy_scene(9).export_snapshot().save(&path, true).unwrap();

  let mut bytes = std::fs::read(&path).unwrap();
  let last = bytes.len() - 1;
  bytes[last] ^= 0x5A;
  std::fs::write(&path, &bytes).unwrap();

  let err = WorldSnapshot::load(&path).unwrap_err();
  assert!(matches!(
    err,
    EngineError::Header(HeaderError::ChecksumMismatch { .. })
  ));
}

#[test]
fn mismatched_cell_buffers_are_rejected() {
  let mut snapshot = busy_scene(2).export_snapshot();
  snapshot.tails.truncate(snapshot.tails.len() - 4);
  let bytes = snapshot.to_bytes(false).unwrap();
  assert!(bytes.len() > Header::SIZE);
  let err = WorldSnapshot::from_bytes(&bytes).unwrap_err();
  assert!(matches!(
    err,
    EngineError::Header(HeaderError::PayloadLength { .. })
  ));
}
