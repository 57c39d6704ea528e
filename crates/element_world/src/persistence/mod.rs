//! World snapshots.
//!
//! A [`WorldSnapshot`] captures everything a world needs to continue
//! exactly where it stopped: the raw cell words, chunk scheduling state,
//! the random stream position, the tick count and the world modes. The
//! derived per-tick state (permutation tables, handled marks) is rebuilt
//! on import.

pub mod format;

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use lz4_flex::{compress_prepend_size, decompress_size_prepended};

use self::format::{FLAG_LZ4, Header, HeaderError, LAYOUT_REVISION, MAGIC, VERSION, crc8};
use crate::error::EngineError;
use crate::rng::RngState;
use crate::world::WorldModes;

/// Dimensions and stream state stored alongside the cell buffers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SnapshotMeta {
  pub width: u32,
  pub height: u32,
  pub chunk_size: u32,
  pub rng: RngState,
  pub tick: u64,
  pub modes: WorldModes,
}

/// Complete serializable world state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorldSnapshot {
  pub meta: SnapshotMeta,
  /// Little-endian head words, row-major.
  pub heads: Vec<u8>,
  /// Little-endian tail words, row-major.
  pub tails: Vec<u8>,
  /// Per-chunk scheduling state.
  pub chunks: Vec<u8>,
}

impl WorldSnapshot {
  /// Writes the framed snapshot, LZ4 compressing the payload if asked to.
  pub fn write_to<W: Write>(&self, writer: &mut W, compress: bool) -> Result<(), EngineError> {
    let mut raw = Vec::with_capacity(self.heads.len() + self.tails.len() + self.chunks.len());
    raw.extend_from_slice(&self.heads);
    raw.extend_from_slice(&self.tails);
    raw.extend_from_slice(&self.chunks);
    let payload = if compress {
      compress_prepend_size(&raw)
    } else {
      raw
    };

    let meta = &self.meta;
    let header = Header {
      magic: MAGIC,
      version: VERSION,
      flags: if compress { FLAG_LZ4 } else { 0 },
      layout: LAYOUT_REVISION,
      chunk_size: meta.chunk_size as u16,
      width: meta.width,
      height: meta.height,
      tick: meta.tick,
      rng_seed: meta.rng.seed,
      rng_counter: meta.rng.counter,
      modes: meta.modes.bits(),
      checksum: crc8(&payload),
      _reserved: [0; 2],
      payload_len: payload.len() as u32,
      heads_len: self.heads.len() as u32,
      tails_len: self.tails.len() as u32,
      chunk_state_len: self.chunks.len() as u32,
    };
    header.write_to(writer)?;
    writer.write_all(&payload)?;
    Ok(())
  }

  /// Reads and validates a framed snapshot.
  pub fn read_from<R: Read>(reader: &mut R) -> Result<Self, EngineError> {
    let header = Header::read_from(reader)?;
    header.validate()?;
    let modes = WorldModes::from_bits(header.modes).ok_or(HeaderError::UnknownModes(header.modes))?;

    let mut payload = vec![0u8; header.payload_len as usize];
    reader.read_exact(&mut payload)?;
    let computed = crc8(&payload);
    if computed != header.checksum {
      return Err(
        HeaderError::ChecksumMismatch {
          stored: header.checksum,
          computed,
        }
        .into(),
      );
    }

    let raw = if header.is_compressed() {
      decompress_size_prepended(&payload).map_err(|e| EngineError::Decompress(e.to_string()))?
    } else {
      payload
    };
    if raw.len() != header.raw_len() {
      return Err(
        HeaderError::PayloadLength {
          expected: header.raw_len(),
          actual: raw.len(),
        }
        .into(),
      );
    }

    let heads_end = header.heads_len as usize;
    let tails_end = heads_end + header.tails_len as usize;
    Ok(Self {
      meta: SnapshotMeta {
        width: header.width,
        height: header.height,
        chunk_size: header.chunk_size as u32,
        rng: RngState {
          seed: header.rng_seed,
          counter: header.rng_counter,
        },
        tick: header.tick,
        modes,
      },
      heads: raw[..heads_end].to_vec(),
      tails: raw[heads_end..tails_end].to_vec(),
      chunks: raw[tails_end..].to_vec(),
    })
  }

  pub fn to_bytes(&self, compress: bool) -> Result<Vec<u8>, EngineError> {
    let mut out = Vec::with_capacity(Header::SIZE + self.heads.len() * 2 + self.chunks.len());
    self.write_to(&mut out, compress)?;
    Ok(out)
  }

  pub fn from_bytes(bytes: &[u8]) -> Result<Self, EngineError> {
    let mut reader = bytes;
    Self::read_from(&mut reader)
  }

  pub fn save(&self, path: impl AsRef<Path>, compress: bool) -> Result<(), EngineError> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    self.write_to(&mut writer, compress)?;
    writer.flush()?;
    log::debug!(
      "Saved {}x{} snapshot at tick {} to {}",
      self.meta.width,
      self.meta.height,
      self.meta.tick,
      path.display()
    );
    Ok(())
  }

  pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
    let mut reader = BufReader::new(File::open(path)?);
    Self::read_from(&mut reader)
  }
}
