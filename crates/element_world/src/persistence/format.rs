//! Binary framing for world snapshots.
//!
//! A snapshot file is a 64-byte little-endian [`Header`] followed by one
//! payload: head words, tail words and chunk scheduling state, back to
//! back, optionally LZ4 compressed as a whole.

use std::io::{self, Read, Write};

/// Magic bytes identifying a snapshot ("ELWS").
pub const MAGIC: u32 = 0x5357_4C45;

/// Current format version.
pub const VERSION: u16 = 1;

/// Revision of the cell word layout. Snapshots from another revision are
/// rejected instead of being reinterpreted.
pub const LAYOUT_REVISION: u16 = 1;

/// The payload is LZ4 compressed with a prepended size.
pub const FLAG_LZ4: u16 = 1;

const KNOWN_FLAGS: u16 = FLAG_LZ4;

/// File header (64 bytes, fixed size).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
  pub magic: u32,
  pub version: u16,
  pub flags: u16,
  /// Cell layout revision the words were written with.
  pub layout: u16,
  pub chunk_size: u16,
  pub width: u32,
  pub height: u32,
  pub tick: u64,
  pub rng_seed: u64,
  pub rng_counter: u64,
  /// `WorldModes` bits.
  pub modes: u8,
  /// CRC-8 of the stored payload bytes.
  pub checksum: u8,
  pub _reserved: [u8; 2],
  /// Stored payload size, after compression.
  pub payload_len: u32,
  pub heads_len: u32,
  pub tails_len: u32,
  pub chunk_state_len: u32,
}

impl Header {
  /// Header size in bytes.
  pub const SIZE: usize = 64;

  #[inline]
  pub fn is_compressed(&self) -> bool {
    self.flags & FLAG_LZ4 != 0
  }

  /// Uncompressed payload size.
  #[inline]
  pub fn raw_len(&self) -> usize {
    self.heads_len as usize + self.tails_len as usize + self.chunk_state_len as usize
  }

  /// Checks the fields that do not depend on the payload.
  pub fn validate(&self) -> Result<(), HeaderError> {
    if self.magic != MAGIC {
      return Err(HeaderError::InvalidMagic(self.magic));
    }
    if self.version > VERSION {
      return Err(HeaderError::UnsupportedVersion(self.version));
    }
    if self.layout != LAYOUT_REVISION {
      return Err(HeaderError::LayoutMismatch {
        file: self.layout,
        engine: LAYOUT_REVISION,
      });
    }
    if self.flags & !KNOWN_FLAGS != 0 {
      return Err(HeaderError::UnknownFlags(self.flags));
    }
    let cells = self.width as usize * self.height as usize * 4;
    if self.heads_len as usize != cells || self.tails_len as usize != cells {
      return Err(HeaderError::PayloadLength {
        expected: cells,
        actual: self.heads_len.max(self.tails_len) as usize,
      });
    }
    if !self.is_compressed() && self.payload_len as usize != self.raw_len() {
      return Err(HeaderError::PayloadLength {
        expected: self.raw_len(),
        actual: self.payload_len as usize,
      });
    }
    Ok(())
  }

  pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
    writer.write_all(&self.magic.to_le_bytes())?;
    writer.write_all(&self.version.to_le_bytes())?;
    writer.write_all(&self.flags.to_le_bytes())?;
    writer.write_all(&self.layout.to_le_bytes())?;
    writer.write_all(&self.chunk_size.to_le_bytes())?;
    writer.write_all(&self.width.to_le_bytes())?;
    writer.write_all(&self.height.to_le_bytes())?;
    writer.write_all(&self.tick.to_le_bytes())?;
    writer.write_all(&self.rng_seed.to_le_bytes())?;
    writer.write_all(&self.rng_counter.to_le_bytes())?;
    writer.write_all(&[self.modes, self.checksum])?;
    writer.write_all(&self._reserved)?;
    writer.write_all(&self.payload_len.to_le_bytes())?;
    writer.write_all(&self.heads_len.to_le_bytes())?;
    writer.write_all(&self.tails_len.to_le_bytes())?;
    writer.write_all(&self.chunk_state_len.to_le_bytes())?;
    Ok(())
  }

  pub fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
    let mut buf = [0u8; Self::SIZE];
    reader.read_exact(&mut buf)?;

    let u16_at = |at: usize| u16::from_le_bytes([buf[at], buf[at + 1]]);
    let u32_at = |at: usize| u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]]);
    let u64_at = |at: usize| {
      let mut word = [0u8; 8];
      word.copy_from_slice(&buf[at..at + 8]);
      u64::from_le_bytes(word)
    };

    Ok(Self {
      magic: u32_at(0),
      version: u16_at(4),
      flags: u16_at(6),
      layout: u16_at(8),
      chunk_size: u16_at(10),
      width: u32_at(12),
      height: u32_at(16),
      tick: u64_at(20),
      rng_seed: u64_at(28),
      rng_counter: u64_at(36),
      modes: buf[44],
      checksum: buf[45],
      _reserved: [buf[46], buf[47]],
      payload_len: u32_at(48),
      heads_len: u32_at(52),
      tails_len: u32_at(56),
      chunk_state_len: u32_at(60),
    })
  }
}

/// CRC-8 (polynomial 0x07).
pub fn crc8(bytes: &[u8]) -> u8 {
  bytes.iter().fold(0u8, |mut crc, &byte| {
    crc ^= byte;
    for _ in 0..8 {
      crc = if crc & 0x80 != 0 {
        (crc << 1) ^ 0x07
      } else {
        crc << 1
      };
    }
    crc
  })
}

/// Header validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
  InvalidMagic(u32),
  UnsupportedVersion(u16),
  LayoutMismatch { file: u16, engine: u16 },
  UnknownFlags(u16),
  UnknownModes(u8),
  ChecksumMismatch { stored: u8, computed: u8 },
  PayloadLength { expected: usize, actual: usize },
}

impl std::fmt::Display for HeaderError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::InvalidMagic(m) => write!(f, "invalid magic number: 0x{:08X}", m),
      Self::UnsupportedVersion(v) => write!(f, "unsupported version: {}", v),
      Self::LayoutMismatch { file, engine } => {
        write!(f, "cell layout mismatch: file={}, engine={}", file, engine)
      }
      Self::UnknownFlags(flags) => write!(f, "unknown flags: 0x{:04X}", flags),
      Self::UnknownModes(modes) => write!(f, "unknown world modes: 0x{:02X}", modes),
      Self::ChecksumMismatch { stored, computed } => {
        write!(f, "checksum mismatch: stored=0x{:02X}, computed=0x{:02X}", stored, computed)
      }
      Self::PayloadLength { expected, actual } => {
        write!(f, "payload length mismatch: expected {}, got {}", expected, actual)
      }
    }
  }
}

impl std::error::Error for HeaderError {}
