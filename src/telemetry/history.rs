//! # History Windows
//!
//! Fixed-capacity, insertion-ordered buffers for the audit log and the
//! chart time series.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;

use super::HistoryRecord;

/// Maximum number of records kept in the audit log
pub const HISTORY_CAPACITY: usize = 100;

/// Maximum number of points kept per chart series
pub const SERIES_CAPACITY: usize = 15;

/// Fixed-capacity buffer that evicts its oldest entry on overflow
///
/// # Examples
///
/// ```
/// use asset_monitor::telemetry::history::SlidingWindow;
///
/// let mut window = SlidingWindow::new(2);
/// window.push(1);
/// window.push(2);
/// window.push(3);
/// assert_eq!(window.snapshot(), vec![2, 3]);
/// ```
#[derive(Debug, Clone)]
pub struct SlidingWindow<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T: Clone> SlidingWindow<T> {
    /// Create an empty window. A capacity of zero is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an item, evicting the oldest one first when full
    pub fn push(&mut self, item: T) {
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    /// Copy of the contents, oldest first
    #[must_use]
    pub fn snapshot(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Audit log of recent events across all sensors
///
/// Order is arrival order, never device-timestamp order.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    window: SlidingWindow<HistoryRecord>,
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            window: SlidingWindow::new(HISTORY_CAPACITY),
        }
    }

    /// Append a record, evicting the oldest beyond [`HISTORY_CAPACITY`]
    pub fn append(&mut self, record: HistoryRecord) {
        self.window.push(record);
    }

    /// Copy of the log, most recent last
    #[must_use]
    pub fn snapshot(&self) -> Vec<HistoryRecord> {
        self.window.snapshot()
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}

/// One chart sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub time: DateTime<Utc>,
    pub value: f64,
}

/// Short chart window fed only by environment readings
#[derive(Debug, Clone)]
pub struct TimeSeries {
    window: SlidingWindow<SeriesPoint>,
}

impl Default for TimeSeries {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSeries {
    #[must_use]
    pub fn new() -> Self {
        Self {
            window: SlidingWindow::new(SERIES_CAPACITY),
        }
    }

    /// Record a sample, evicting the oldest beyond [`SERIES_CAPACITY`]
    pub fn push(&mut self, time: DateTime<Utc>, value: f64) {
        self.window.push(SeriesPoint { time, value });
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<SeriesPoint> {
        self.window.snapshot()
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}
