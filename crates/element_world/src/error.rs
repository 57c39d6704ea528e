//! Error types for the engine boundary and for per-cell failures.

use std::fmt;

use crate::persistence::format::HeaderError;

/// Structural errors surfaced at the API boundary before any tick runs.
#[derive(Debug)]
pub enum EngineError {
  /// Grid dimensions are zero or larger than [`crate::grid::MAX_DIMENSION`].
  InvalidDimensions { width: u32, height: u32 },
  /// Chunk size outside the supported range.
  InvalidChunkSize(u32),
  /// A raw buffer does not match the grid dimensions.
  BufferLength {
    buffer: &'static str,
    expected: usize,
    actual: usize,
  },
  /// A snapshot header failed validation.
  Header(HeaderError),
  /// An LZ4 payload could not be decompressed.
  Decompress(String),
  /// The configuration could not be parsed or is out of range.
  Config(ConfigError),
  Io(std::io::Error),
}

impl fmt::Display for EngineError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::InvalidDimensions { width, height } => {
        write!(f, "invalid grid dimensions: {}x{}", width, height)
      }
      Self::InvalidChunkSize(size) => write!(f, "invalid chunk size: {}", size),
      Self::BufferLength {
        buffer,
        expected,
        actual,
      } => write!(
        f,
        "{} buffer length mismatch: expected {} bytes, got {}",
        buffer, expected, actual
      ),
      Self::Header(e) => write!(f, "snapshot header: {}", e),
      Self::Decompress(msg) => write!(f, "decompression failed: {}", msg),
      Self::Config(e) => write!(f, "config: {}", e),
      Self::Io(e) => write!(f, "io: {}", e),
    }
  }
}

impl std::error::Error for EngineError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::Header(e) => Some(e),
      Self::Config(e) => Some(e),
      Self::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<std::io::Error> for EngineError {
  fn from(e: std::io::Error) -> Self {
    Self::Io(e)
  }
}

impl From<HeaderError> for EngineError {
  fn from(e: HeaderError) -> Self {
    Self::Header(e)
  }
}

impl From<ConfigError> for EngineError {
  fn from(e: ConfigError) -> Self {
    Self::Config(e)
  }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
  Parse(String),
  Serialize(String),
  Invalid { field: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Parse(msg) => write!(f, "parse error: {}", msg),
      Self::Serialize(msg) => write!(f, "serialize error: {}", msg),
      Self::Invalid { field, reason } => write!(f, "invalid `{}`: {}", field, reason),
    }
  }
}

impl std::error::Error for ConfigError {}

/// A malformed head word found while dispatching a cell.
///
/// The scheduler skips the offending cell and keeps ticking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellError {
  /// Behavior tag 12..15 is reserved.
  ReservedBehavior(u32),
  /// Liquid cell whose special field names no known liquid.
  UnknownLiquidKind(u32),
  /// Reserved head bits are set.
  ReservedBits(u32),
}

impl fmt::Display for CellError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::ReservedBehavior(tag) => write!(f, "reserved behavior tag {}", tag),
      Self::UnknownLiquidKind(kind) => write!(f, "unknown liquid kind {}", kind),
      Self::ReservedBits(bits) => write!(f, "reserved head bits set: 0x{:08X}", bits),
    }
  }
}

impl std::error::Error for CellError {}
