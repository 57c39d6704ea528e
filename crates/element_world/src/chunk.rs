//! Chunk activity tracking.
//!
//! Chunks are a coordinate mapping over the grid, not storage. Each chunk
//! carries:
//! - `active`: processed during the current tick
//! - `next_active`: collected during the tick, becomes `active` next tick
//! - `changed`: touched since the renderer last asked
//! - `busy`: written to during the current tick
//! - `last_checked` / `idle_checks`: bookkeeping for the periodic idle scan

use crate::error::EngineError;

/// Smallest and largest supported chunk edge.
pub const MIN_CHUNK_SIZE: u32 = 4;
pub const MAX_CHUNK_SIZE: u32 = 128;

/// Chunk coordinate (column, row).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
  pub x: u32,
  pub y: u32,
}

/// Inclusive-exclusive cell bounds of one chunk, clipped to the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkBounds {
  pub x0: i32,
  pub y0: i32,
  pub x1: i32,
  pub y1: i32,
}

impl ChunkBounds {
  #[inline]
  pub fn contains(&self, x: i32, y: i32) -> bool {
    x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
  }
}

#[derive(Clone, Debug)]
pub struct ChunkMap {
  chunk_size: u32,
  width: u32,
  height: u32,
  cols: u32,
  rows: u32,
  active: Vec<bool>,
  next_active: Vec<bool>,
  changed: Vec<bool>,
  busy: Vec<bool>,
  last_checked: Vec<u64>,
  idle_checks: Vec<u8>,
}

impl ChunkMap {
  /// Partitions a `width` x `height` grid. Every chunk starts awake.
  pub fn new(width: u32, height: u32, chunk_size: u32) -> Result<Self, EngineError> {
    if !(MIN_CHUNK_SIZE..=MAX_CHUNK_SIZE).contains(&chunk_size) {
      return Err(EngineError::InvalidChunkSize(chunk_size));
    }
    let cols = width.div_ceil(chunk_size);
    let rows = height.div_ceil(chunk_size);
    let count = (cols * rows) as usize;
    Ok(Self {
      chunk_size,
      width,
      height,
      cols,
      rows,
      active: vec![false; count],
      next_active: vec![true; count],
      changed: vec![true; count],
      busy: vec![false; count],
      last_checked: vec![0; count],
      idle_checks: vec![0; count],
    })
  }

  #[inline]
  pub fn chunk_size(&self) -> u32 {
    self.chunk_size
  }

  #[inline]
  pub fn cols(&self) -> u32 {
    self.cols
  }

  #[inline]
  pub fn rows(&self) -> u32 {
    self.rows
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.active.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.active.is_empty()
  }

  #[inline]
  pub fn index(&self, coord: ChunkCoord) -> usize {
    (coord.y * self.cols + coord.x) as usize
  }

  #[inline]
  pub fn coord(&self, index: usize) -> ChunkCoord {
    ChunkCoord {
      x: index as u32 % self.cols,
      y: index as u32 / self.cols,
    }
  }

  /// Chunk index containing an in-bounds cell.
  #[inline]
  pub fn chunk_of(&self, x: i32, y: i32) -> usize {
    let cx = x as u32 / self.chunk_size;
    let cy = y as u32 / self.chunk_size;
    (cy * self.cols + cx) as usize
  }

  pub fn bounds(&self, index: usize) -> ChunkBounds {
    let c = self.coord(index);
    let x0 = c.x * self.chunk_size;
    let y0 = c.y * self.chunk_size;
    ChunkBounds {
      x0: x0 as i32,
      y0: y0 as i32,
      x1: (x0 + self.chunk_size).min(self.width) as i32,
      y1: (y0 + self.chunk_size).min(self.height) as i32,
    }
  }

  /// Whether the chunk is being processed this tick.
  #[inline]
  pub fn is_active(&self, index: usize) -> bool {
    self.active[index]
  }

  /// Whether the chunk is scheduled for the next tick.
  #[inline]
  pub fn is_awake(&self, index: usize) -> bool {
    self.next_active[index]
  }

  #[inline]
  pub fn is_changed(&self, index: usize) -> bool {
    self.changed[index]
  }

  #[inline]
  pub fn is_busy(&self, index: usize) -> bool {
    self.busy[index]
  }

  #[inline]
  pub fn last_checked(&self, index: usize) -> u64 {
    self.last_checked[index]
  }

  /// Number of chunks scheduled for the next tick.
  pub fn awake_count(&self) -> usize {
    self.next_active.iter().filter(|&&a| a).count()
  }

  /// Records a write at an in-bounds cell.
  ///
  /// The cell's chunk becomes busy and changed; it and every chunk holding
  /// one of the cell's 8 neighbors are woken for the next tick. With
  /// `wrap_vertical` the top and bottom rows are neighbors.
  pub fn touch(&mut self, x: i32, y: i32, wrap_vertical: bool) {
    let own = self.chunk_of(x, y);
    self.busy[own] = true;
    self.changed[own] = true;
    self.idle_checks[own] = 0;
    self.wake_around(x, y, wrap_vertical);
  }

  /// Wakes the chunks covering the 3x3 neighborhood of a cell.
  pub fn wake_around(&mut self, x: i32, y: i32, wrap_vertical: bool) {
    let h = self.height as i32;
    let w = self.width as i32;
    for dy in -1..=1 {
      let mut ny = y + dy;
      if ny < 0 || ny >= h {
        if !wrap_vertical {
          continue;
        }
        ny = ny.rem_euclid(h);
      }
      for dx in -1..=1 {
        let nx = x + dx;
        if nx < 0 || nx >= w {
          continue;
        }
        let i = self.chunk_of(nx, ny);
        self.next_active[i] = true;
      }
    }
  }

  /// Wakes one chunk for the next tick.
  #[inline]
  pub fn wake(&mut self, index: usize) {
    self.next_active[index] = true;
  }

  /// Wakes every chunk.
  pub fn wake_all(&mut self) {
    self.next_active.fill(true);
    self.changed.fill(true);
  }

  /// Starts a tick: the woken set becomes the processed set and is cleared.
  ///
  /// Returns active chunk indices in traversal order: rows bottom to top,
  /// columns left to right.
  pub fn begin_tick(&mut self) -> Vec<usize> {
    std::mem::swap(&mut self.active, &mut self.next_active);
    self.next_active.fill(false);
    self.busy.fill(false);

    let mut order = Vec::with_capacity(self.active.len());
    for cy in (0..self.rows).rev() {
      for cx in 0..self.cols {
        let i = (cy * self.cols + cx) as usize;
        if self.active[i] {
          order.push(i);
        }
      }
    }
    order
  }

  /// Records the outcome of a full idle scan.
  ///
  /// Returns `true` when the chunk has now passed `checks_to_sleep` scans
  /// in a row and is put to sleep. A sleeping chunk is marked changed once
  /// more so renderers repaint its final state.
  pub fn record_idle_check(&mut self, index: usize, tick: u64, idle: bool, checks_to_sleep: u8) -> bool {
    self.last_checked[index] = tick;
    if !idle {
      self.idle_checks[index] = 0;
      self.next_active[index] = true;
      return false;
    }
    self.idle_checks[index] = self.idle_checks[index].saturating_add(1);
    if self.idle_checks[index] >= checks_to_sleep {
      self.idle_checks[index] = 0;
      self.changed[index] = true;
      return true;
    }
    self.next_active[index] = true;
    false
  }

  /// Drains the changed set, returning the changed chunk coordinates.
  pub fn take_changed(&mut self) -> Vec<ChunkCoord> {
    let mut out = Vec::new();
    for (i, changed) in self.changed.iter_mut().enumerate() {
      if std::mem::take(changed) {
        out.push(ChunkCoord {
          x: i as u32 % self.cols,
          y: i as u32 / self.cols,
        });
      }
    }
    out
  }

  /// Per-chunk scheduling state as bytes: `awake:u8 | idle_checks:u8 |
  /// last_checked:u64le`.
  pub fn export_state(&self) -> Vec<u8> {
    let mut out = Vec::with_capacity(self.len() * CHUNK_STATE_SIZE);
    for i in 0..self.len() {
      out.push(self.next_active[i] as u8);
      out.push(self.idle_checks[i]);
      out.extend_from_slice(&self.last_checked[i].to_le_bytes());
    }
    out
  }

  /// Restores state written by [`ChunkMap::export_state`].
  pub fn import_state(&mut self, bytes: &[u8]) -> Result<(), EngineError> {
    let expected = self.len() * CHUNK_STATE_SIZE;
    if bytes.len() != expected {
      return Err(EngineError::BufferLength {
        buffer: "chunk state",
        expected,
        actual: bytes.len(),
      });
    }
    for (i, entry) in bytes.chunks_exact(CHUNK_STATE_SIZE).enumerate() {
      self.next_active[i] = entry[0] != 0;
      self.idle_checks[i] = entry[1];
      let mut stamp = [0u8; 8];
      stamp.copy_from_slice(&entry[2..10]);
      self.last_checked[i] = u64::from_le_bytes(stamp);
    }
    self.changed.fill(true);
    Ok(())
  }
}

/// Bytes per chunk in [`ChunkMap::export_state`].
pub const CHUNK_STATE_SIZE: usize = 10;
