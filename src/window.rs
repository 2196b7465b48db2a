//! Trailing statistics over the most recent readings
//!
//! Each metric gets its own [`SlidingWindow`]: a ring buffer holding
//! strictly the last N observed values, evicting the oldest on overflow.
//! Statistics are computed over exactly the retained set, so a window that
//! has seen fewer than N readings aggregates over what it has — never a
//! division fault, never padding with zeros.
//!
//! The window is transient state. [`StatisticsWindow::reset`] clears all
//! three rings in one call, which the pipeline invokes on every stream
//! restart so no values bleed across sessions.

use crate::errors::ConfigError;
use crate::reading::{Metric, Reading};

/// Ring buffer over the last N observed values
///
/// Capacity is runtime configuration (the window size comes from the
/// external settings collaborator), so storage is a heap slab rather than a
/// const-generic array. Invariants:
/// - `write_pos < capacity`
/// - `len <= capacity`
/// - iteration yields values oldest to newest
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    data: Vec<f32>,
    capacity: usize,
    write_pos: usize,
    len: usize,
}

impl SlidingWindow {
    /// Create an empty window holding at most `capacity` values
    ///
    /// Callers guarantee `capacity >= 1`; [`StatisticsWindow::new`] enforces
    /// it at the configuration boundary.
    fn new(capacity: usize) -> Self {
        debug_assert!(capacity >= 1);
        Self {
            data: vec![0.0; capacity],
            capacity,
            write_pos: 0,
            len: 0,
        }
    }

    /// Append a value, evicting the oldest when full
    pub fn push(&mut self, value: f32) {
        self.data[self.write_pos] = value;
        self.write_pos = (self.write_pos + 1) % self.capacity;
        if self.len < self.capacity {
            self.len += 1;
        }
    }

    /// Number of retained values
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no values have been observed
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Discard all retained values
    pub fn clear(&mut self) {
        self.write_pos = 0;
        self.len = 0;
    }

    /// Iterate retained values from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        // Before the first wrap data starts at 0; afterwards the oldest
        // value sits at write_pos.
        let start = if self.len < self.capacity {
            0
        } else {
            self.write_pos
        };
        (0..self.len).map(move |i| self.data[(start + i) % self.capacity])
    }
}

/// Point-in-time aggregate over one metric's window
///
/// Derived and transient: recomputed on each request, never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatisticsSnapshot {
    /// Metric the aggregate describes
    pub metric: Metric,
    /// Configured window capacity
    pub window_size: usize,
    /// Values actually retained (≤ `window_size`)
    pub samples: usize,
    /// Arithmetic mean of the retained values
    pub mean: f32,
    /// Smallest retained value
    pub min: f32,
    /// Largest retained value
    pub max: f32,
}

/// Per-metric trailing windows with on-demand aggregates
#[derive(Debug, Clone)]
pub struct StatisticsWindow {
    windows: [SlidingWindow; 3],
    capacity: usize,
}

impl StatisticsWindow {
    /// Create windows of the given capacity for all three metrics
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        Ok(Self {
            windows: [
                SlidingWindow::new(capacity),
                SlidingWindow::new(capacity),
                SlidingWindow::new(capacity),
            ],
            capacity,
        })
    }

    /// Configured window capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record one reading across all three metric windows
    pub fn observe(&mut self, reading: &Reading) {
        for metric in Metric::ALL {
            self.windows[metric as usize].push(reading.value(metric));
        }
    }

    /// Aggregate the retained values for one metric
    ///
    /// Returns `None` until at least one reading has been observed; an
    /// aggregate over zero samples is undefined rather than zero.
    pub fn snapshot(&self, metric: Metric) -> Option<StatisticsSnapshot> {
        let window = &self.windows[metric as usize];
        if window.is_empty() {
            return None;
        }

        let mut sum = 0.0f32;
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for value in window.iter() {
            sum += value;
            min = min.min(value);
            max = max.max(value);
        }

        Some(StatisticsSnapshot {
            metric,
            window_size: self.capacity,
            samples: window.len(),
            mean: sum / window.len() as f32,
            min,
            max,
        })
    }

    /// Drop all retained values for every metric
    ///
    /// Invoked on stream restart so no statistics bleed across sessions.
    pub fn reset(&mut self) {
        for window in &mut self.windows {
            window.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn reading(t: u64, temp: f32, hum: f32, lux: f32) -> Reading {
        Reading {
            timestamp: t,
            temperature: temp,
            humidity: hum,
            luminosity: lux,
        }
    }

    #[test]
    fn empty_window_has_no_snapshot() {
        let stats = StatisticsWindow::new(4).unwrap();
        assert!(stats.snapshot(Metric::Temperature).is_none());
    }

    #[test]
    fn zero_capacity_rejected() {
        assert!(matches!(
            StatisticsWindow::new(0),
            Err(ConfigError::ZeroWindow)
        ));
    }

    #[test]
    fn partial_window_aggregates_available_subset() {
        let mut stats = StatisticsWindow::new(10).unwrap();
        stats.observe(&reading(1, 20.0, 40.0, 300.0));
        stats.observe(&reading(2, 22.0, 50.0, 400.0));

        let snap = stats.snapshot(Metric::Temperature).unwrap();
        assert_eq!(snap.samples, 2);
        assert_eq!(snap.window_size, 10);
        assert_eq!(snap.mean, 21.0);
        assert_eq!(snap.min, 20.0);
        assert_eq!(snap.max, 22.0);
    }

    #[test]
    fn overflow_evicts_oldest() {
        let mut stats = StatisticsWindow::new(3).unwrap();
        for (i, t) in [10.0, 20.0, 30.0, 40.0].iter().enumerate() {
            stats.observe(&reading(i as u64, *t, 50.0, 100.0));
        }

        // Retained set is exactly the last three: 20, 30, 40
        let snap = stats.snapshot(Metric::Temperature).unwrap();
        assert_eq!(snap.samples, 3);
        assert_eq!(snap.mean, 30.0);
        assert_eq!(snap.min, 20.0);
        assert_eq!(snap.max, 40.0);
    }

    #[test]
    fn sliding_window_iterates_oldest_first() {
        let mut window = SlidingWindow::new(3);
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            window.push(v);
        }
        let values: Vec<f32> = window.iter().collect();
        assert_eq!(values, vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn reset_clears_all_metrics() {
        let mut stats = StatisticsWindow::new(4).unwrap();
        stats.observe(&reading(1, 20.0, 40.0, 300.0));
        stats.observe(&reading(2, 25.0, 45.0, 350.0));

        stats.reset();
        for metric in Metric::ALL {
            assert!(stats.snapshot(metric).is_none());
        }

        // A single post-reset observation equals itself for mean/min/max
        stats.observe(&reading(3, 19.0, 55.0, 120.0));
        let snap = stats.snapshot(Metric::Humidity).unwrap();
        assert_eq!(snap.samples, 1);
        assert_eq!(snap.mean, 55.0);
        assert_eq!(snap.min, 55.0);
        assert_eq!(snap.max, 55.0);
    }

    proptest! {
        /// Mean/min/max always describe exactly the last `capacity` values.
        #[test]
        fn aggregates_match_retained_subset(
            values in prop::collection::vec(-1000.0f32..1000.0, 1..64),
            capacity in 1usize..16,
        ) {
            let mut stats = StatisticsWindow::new(capacity).unwrap();
            for (i, v) in values.iter().enumerate() {
                stats.observe(&reading(i as u64, *v, 50.0, 100.0));
            }

            let retained: Vec<f32> = values
                .iter()
                .copied()
                .skip(values.len().saturating_sub(capacity))
                .collect();

            let snap = stats.snapshot(Metric::Temperature).unwrap();
            prop_assert_eq!(snap.samples, retained.len());

            let expected_mean: f32 =
                retained.iter().sum::<f32>() / retained.len() as f32;
            let expected_min = retained.iter().copied().fold(f32::INFINITY, f32::min);
            let expected_max = retained.iter().copied().fold(f32::NEG_INFINITY, f32::max);

            prop_assert_eq!(snap.mean, expected_mean);
            prop_assert_eq!(snap.min, expected_min);
            prop_assert_eq!(snap.max, expected_max);
        }
    }
}
