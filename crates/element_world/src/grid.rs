//! Dual-buffer cell storage.
//!
//! Heads and tails live in two parallel arrays addressed as `y * width + x`.
//! The grid has no behavior; coordinates are checked by callers and an
//! out-of-range access panics in every build.

use crate::cell::{Cell, Head, Tail};
use crate::error::EngineError;

/// Largest supported width or height.
pub const MAX_DIMENSION: u32 = 8192;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
  width: u32,
  height: u32,
  heads: Box<[Head]>,
  tails: Box<[Tail]>,
}

impl Grid {
  /// Creates a grid filled with the default element.
  pub fn new(width: u32, height: u32) -> Result<Self, EngineError> {
    Self::filled(width, height, Cell::DEFAULT)
  }

  pub fn filled(width: u32, height: u32, cell: Cell) -> Result<Self, EngineError> {
    check_dimensions(width, height)?;
    let len = (width * height) as usize;
    Ok(Self {
      width,
      height,
      heads: vec![cell.head; len].into_boxed_slice(),
      tails: vec![cell.tail; len].into_boxed_slice(),
    })
  }

  #[inline]
  pub fn width(&self) -> u32 {
    self.width
  }

  #[inline]
  pub fn height(&self) -> u32 {
    self.height
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.heads.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.heads.is_empty()
  }

  #[inline]
  pub fn is_valid_position(&self, x: i32, y: i32) -> bool {
    x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
  }

  /// Returns the linear index for a coordinate.
  ///
  /// # Panics
  /// Panics if the coordinate is outside the grid.
  #[inline]
  pub fn index_of(&self, x: u32, y: u32) -> usize {
    assert!(
      x < self.width && y < self.height,
      "cell ({}, {}) outside {}x{} grid",
      x,
      y,
      self.width,
      self.height
    );
    (y * self.width + x) as usize
  }

  #[inline]
  pub fn get(&self, x: u32, y: u32) -> Cell {
    let i = self.index_of(x, y);
    Cell::new(self.heads[i], self.tails[i])
  }

  #[inline]
  pub fn head(&self, x: u32, y: u32) -> Head {
    self.heads[self.index_of(x, y)]
  }

  #[inline]
  pub fn tail(&self, x: u32, y: u32) -> Tail {
    self.tails[self.index_of(x, y)]
  }

  #[inline]
  pub fn set_head(&mut self, x: u32, y: u32, head: Head) {
    let i = self.index_of(x, y);
    self.heads[i] = head;
  }

  #[inline]
  pub fn set_tail(&mut self, x: u32, y: u32, tail: Tail) {
    let i = self.index_of(x, y);
    self.tails[i] = tail;
  }

  #[inline]
  pub fn set(&mut self, x: u32, y: u32, cell: Cell) {
    let i = self.index_of(x, y);
    self.heads[i] = cell.head;
    self.tails[i] = cell.tail;
  }

  /// Exchanges both words of two cells.
  #[inline]
  pub fn swap(&mut self, x1: u32, y1: u32, x2: u32, y2: u32) {
    let a = self.index_of(x1, y1);
    let b = self.index_of(x2, y2);
    self.heads.swap(a, b);
    self.tails.swap(a, b);
  }

  pub fn heads(&self) -> &[Head] {
    &self.heads
  }

  pub fn tails(&self) -> &[Tail] {
    &self.tails
  }

  /// Iterates `(x, y, cell)` in row-major order.
  pub fn iter(&self) -> impl Iterator<Item = (u32, u32, Cell)> + '_ {
    let width = self.width;
    self
      .heads
      .iter()
      .zip(self.tails.iter())
      .enumerate()
      .map(move |(i, (&h, &t))| (i as u32 % width, i as u32 / width, Cell::new(h, t)))
  }

  /// Head words as little-endian bytes.
  pub fn heads_to_bytes(&self) -> Vec<u8> {
    self.heads.iter().flat_map(|h| h.bits().to_le_bytes()).collect()
  }

  /// Tail words as little-endian bytes.
  pub fn tails_to_bytes(&self) -> Vec<u8> {
    self.tails.iter().flat_map(|t| t.bits().to_le_bytes()).collect()
  }

  /// Rebuilds a grid from raw little-endian buffers.
  ///
  /// Both buffers must hold exactly `width * height * 4` bytes.
  pub fn from_bytes(width: u32, height: u32, heads: &[u8], tails: &[u8]) -> Result<Self, EngineError> {
    check_dimensions(width, height)?;
    let expected = width as usize * height as usize * 4;
    if heads.len() != expected {
      return Err(EngineError::BufferLength {
        buffer: "head",
        expected,
        actual: heads.len(),
      });
    }
    if tails.len() != expected {
      return Err(EngineError::BufferLength {
        buffer: "tail",
        expected,
        actual: tails.len(),
      });
    }

    Ok(Self {
      width,
      height,
      heads: words(heads).map(Head::from_bits).collect(),
      tails: words(tails).map(Tail::from_bits).collect(),
    })
  }
}

fn words(bytes: &[u8]) -> impl Iterator<Item = u32> + '_ {
  bytes
    .chunks_exact(4)
    .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

fn check_dimensions(width: u32, height: u32) -> Result<(), EngineError> {
  if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
    return Err(EngineError::InvalidDimensions { width, height });
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cell::{Behavior, TypeClass};

  fn sand() -> Cell {
    Cell::new(
      Head::new(TypeClass::Powder, Behavior::None).with_temp(20),
      Tail::rgb(220, 190, 120),
    )
  }

  #[test]
  fn rejects_bad_dimensions() {
    assert!(matches!(
      Grid::new(0, 10),
      Err(EngineError::InvalidDimensions { .. })
    ));
    assert!(Grid::new(MAX_DIMENSION + 1, 1).is_err());
    assert!(Grid::new(1, 1).is_ok());
  }

  #[test]
  fn set_get_swap() {
    let mut grid = Grid::new(4, 3).unwrap();
    grid.set(1, 2, sand());
    assert_eq!(grid.get(1, 2), sand());
    assert_eq!(grid.get(0, 0), Cell::DEFAULT);

    grid.swap(1, 2, 3, 0);
    assert_eq!(grid.get(3, 0), sand());
    assert_eq!(grid.get(1, 2), Cell::DEFAULT);

    grid.set_tail(3, 0, Tail::rgb(1, 2, 3));
    assert_eq!(grid.head(3, 0), sand().head);
    assert_eq!(grid.tail(3, 0).color(), [1, 2, 3]);
  }

  #[test]
  fn index_is_row_major() {
    let grid = Grid::new(5, 4).unwrap();
    assert_eq!(grid.index_of(0, 0), 0);
    assert_eq!(grid.index_of(4, 0), 4);
    assert_eq!(grid.index_of(0, 1), 5);
    assert_eq!(grid.index_of(4, 3), 19);
  }

  #[test]
  #[should_panic(expected = "outside")]
  fn out_of_range_panics() {
    let grid = Grid::new(4, 4).unwrap();
    grid.get(4, 0);
  }

  #[test]
  fn validity() {
    let grid = Grid::new(4, 4).unwrap();
    assert!(grid.is_valid_position(3, 3));
    assert!(!grid.is_valid_position(-1, 0));
    assert!(!grid.is_valid_position(0, 4));
  }

  #[test]
  fn bytes_round_trip() {
    let mut grid = Grid::new(3, 2).unwrap();
    grid.set(2, 1, sand());
    let heads = grid.heads_to_bytes();
    let tails = grid.tails_to_bytes();
    assert_eq!(heads.len(), 24);

    let restored = Grid::from_bytes(3, 2, &heads, &tails).unwrap();
    assert_eq!(restored, grid);
  }

  #[test]
  fn short_buffers_are_reported() {
    let grid = Grid::new(3, 2).unwrap();
    let heads = grid.heads_to_bytes();
    let tails = grid.tails_to_bytes();
    match Grid::from_bytes(3, 2, &heads[..20], &tails) {
      Err(EngineError::BufferLength {
        buffer,
        expected,
        actual,
      }) => {
        assert_eq!(buffer, "head");
        assert_eq!(expected, 24);
        assert_eq!(actual, 20);
      }
      other => panic!("unexpected {:?}", other),
    }
    assert!(Grid::from_bytes(3, 2, &heads, &tails[..23]).is_err());
  }
}
