use std::collections::VecDeque;

/// Fixed-capacity ring of samples with a running sum.
#[derive(Clone, Debug)]
pub struct TimeSeries {
  samples: VecDeque<f32>,
  capacity: usize,
  sum: f32,
}

impl TimeSeries {
  pub fn new(capacity: usize) -> Self {
    Self {
      samples: VecDeque::with_capacity(capacity),
      capacity: capacity.max(1),
      sum: 0.0,
    }
  }

  /// Appends a sample, dropping the oldest once full.
  pub fn push(&mut self, value: f32) {
    if self.samples.len() == self.capacity
      && let Some(oldest) = self.samples.pop_front()
    {
      self.sum -= oldest;
    }
    self.samples.push_back(value);
    self.sum += value;
  }

  pub fn samples(&self) -> &VecDeque<f32> {
    &self.samples
  }

  pub fn len(&self) -> usize {
    self.samples.len()
  }

  pub fn is_empty(&self) -> bool {
    self.samples.is_empty()
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  /// Most recent sample.
  pub fn current(&self) -> Option<f32> {
    self.samples.back().copied()
  }

  pub fn min(&self) -> Option<f32> {
    self.samples.iter().copied().reduce(f32::min)
  }

  pub fn max(&self) -> Option<f32> {
    self.samples.iter().copied().reduce(f32::max)
  }

  pub fn avg(&self) -> f32 {
    if self.samples.is_empty() {
      0.0
    } else {
      self.sum / self.samples.len() as f32
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn drops_oldest_when_full() {
    let mut series = TimeSeries::new(3);
    for v in [1.0, 2.0, 3.0, 4.0] {
      series.push(v);
    }
    assert_eq!(series.len(), 3);
    assert_eq!(series.samples().iter().copied().collect::<Vec<_>>(), vec![2.0, 3.0, 4.0]);
    assert_eq!(series.min(), Some(2.0));
    assert_eq!(series.max(), Some(4.0));
    assert_eq!(series.avg(), 3.0);
    assert_eq!(series.current(), Some(4.0));
  }

  #[test]
  fn empty_series() {
    let series = TimeSeries::new(10);
    assert!(series.is_empty());
    assert_eq!(series.min(), None);
    assert_eq!(series.avg(), 0.0);
  }
}
