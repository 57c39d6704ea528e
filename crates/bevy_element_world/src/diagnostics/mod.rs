mod time_series;

use bevy::prelude::*;
use element_world::TickReport;
pub use time_series::TimeSeries;

const SAMPLE_CAPACITY: usize = 300;

/// Per-tick simulation metrics, one sample per simulated tick.
#[derive(Resource, Debug)]
pub struct SimulationMetrics {
  /// Wall time of the tick in milliseconds.
  pub tick_time: TimeSeries,
  pub active_chunks: TimeSeries,
  pub cells_processed: TimeSeries,
  pub cell_errors: TimeSeries,
  /// Report of the most recent tick.
  pub last_report: Option<TickReport>,
}

impl Default for SimulationMetrics {
  fn default() -> Self {
    Self {
      tick_time: TimeSeries::new(SAMPLE_CAPACITY),
      active_chunks: TimeSeries::new(SAMPLE_CAPACITY),
      cells_processed: TimeSeries::new(SAMPLE_CAPACITY),
      cell_errors: TimeSeries::new(SAMPLE_CAPACITY),
      last_report: None,
    }
  }
}

impl SimulationMetrics {
  pub(crate) fn record(&mut self, report: TickReport, elapsed_ms: f32) {
    self.tick_time.push(elapsed_ms);
    self.active_chunks.push(report.active_chunks as f32);
    self.cells_processed.push(report.cells_processed as f32);
    self.cell_errors.push(report.cell_errors as f32);
    self.last_report = Some(report);
  }
}
