//! Precomputed cell visiting orders.
//!
//! Each chunk is traversed in one of a few shuffled orders so rules have no
//! directional bias. One table is reshuffled every refresh interval. Table
//! contents depend only on the world seed and the tick, so they can be
//! rebuilt exactly after a snapshot import.

use crate::rng::SimRng;

/// Stream ids below this are refresh epochs; initial tables use the rest.
const INITIAL_STREAM: u64 = 1 << 63;

#[derive(Clone, Debug)]
pub struct PermutationTables {
  tables: Vec<Box<[u16]>>,
  refresh_interval: u64,
}

impl PermutationTables {
  /// Builds the tables a world with `seed` holds at the start of `tick`.
  pub fn new(seed: u64, chunk_size: u32, count: u32, refresh_interval: u32, tick: u64) -> Self {
    let cells = (chunk_size * chunk_size) as usize;
    let count = count.max(1) as u64;
    let refresh_interval = refresh_interval.max(1) as u64;

    // Refreshes happen at the start of ticks that are multiples of the
    // interval, so epochs up to `tick - 1` have already been applied.
    let latest = if tick == 0 { 0 } else { (tick - 1) / refresh_interval };

    let tables = (0..count)
      .map(|slot| {
        let last_epoch = (latest >= slot.max(1)).then(|| latest - (latest + count - slot) % count);
        match last_epoch {
          Some(epoch) if epoch >= 1 => shuffled(cells, &mut SimRng::derive(seed, epoch)),
          _ => shuffled(cells, &mut SimRng::derive(seed, INITIAL_STREAM | slot)),
        }
      })
      .collect();

    Self {
      tables,
      refresh_interval,
    }
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.tables.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.tables.is_empty()
  }

  #[inline]
  pub fn table(&self, index: usize) -> &[u16] {
    &self.tables[index]
  }

  /// Reshuffles the table owned by this tick's epoch, if the tick starts one.
  pub fn refresh(&mut self, seed: u64, tick: u64) {
    if tick == 0 || tick % self.refresh_interval != 0 {
      return;
    }
    let epoch = tick / self.refresh_interval;
    let slot = (epoch % self.tables.len() as u64) as usize;
    let cells = self.tables[slot].len();
    self.tables[slot] = shuffled(cells, &mut SimRng::derive(seed, epoch));
  }

  /// Draws the table for one chunk from the shared stream.
  #[inline]
  pub fn pick(&self, rng: &mut SimRng) -> &[u16] {
    let i = rng.range(self.tables.len() as u32) as usize;
    &self.tables[i]
  }
}

fn shuffled(cells: usize, rng: &mut SimRng) -> Box<[u16]> {
  let mut order: Vec<u16> = (0..cells as u32).map(|i| i as u16).collect();
  rng.shuffle(&mut order);
  order.into_boxed_slice()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tables_are_permutations() {
    let tables = PermutationTables::new(3, 16, 4, 16, 0);
    assert_eq!(tables.len(), 4);
    for i in 0..tables.len() {
      let mut sorted = tables.table(i).to_vec();
      sorted.sort_unstable();
      assert_eq!(sorted, (0..256).collect::<Vec<u16>>());
    }
    assert_ne!(tables.table(0), tables.table(1));
  }

  #[test]
  fn largest_chunk_fits_u16() {
    let tables = PermutationTables::new(1, 128, 1, 16, 0);
    assert_eq!(tables.table(0).len(), 128 * 128);
    assert_eq!(*tables.table(0).iter().max().unwrap(), 128 * 128 - 1);
  }

  #[test]
  fn refresh_touches_one_slot() {
    let mut tables = PermutationTables::new(9, 8, 4, 16, 0);
    let before: Vec<Vec<u16>> = (0..4).map(|i| tables.table(i).to_vec()).collect();
    tables.refresh(9, 15);
    tables.refresh(9, 16);
    let changed: Vec<usize> = (0..4).filter(|&i| tables.table(i) != before[i].as_slice()).collect();
    assert_eq!(changed, vec![1]);
  }

  #[test]
  fn rebuild_matches_incremental_refresh() {
    let mut live = PermutationTables::new(77, 8, 4, 16, 0);
    for tick in 0..=200 {
      live.refresh(77, tick);
      let rebuilt = PermutationTables::new(77, 8, 4, 16, tick + 1);
      for i in 0..4 {
        assert_eq!(live.table(i), rebuilt.table(i), "tick {tick} slot {i}");
      }
    }
  }
}
