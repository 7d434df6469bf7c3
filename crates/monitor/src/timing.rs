//! Point-in-time marks and interval measurement.
//!
//! The monitor never reads a clock directly; it records named marks
//! through this trait and derives durations from them. Marks are a
//! scoped resource: the engine clears every mark and measure it
//! created on each emission path.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration as ChronoDuration, Utc};

/// Capture/measure/clear interface over a monotonic timeline.
///
/// All offsets are milliseconds since [`TimingProvider::time_origin`],
/// taken from one monotonic origin, so `end - start` is never negative
/// and offsets are comparable across marks.
pub trait TimingProvider: Send + Sync {
    /// Record a named point-in-time mark at `now()`.
    fn mark(&self, name: &str);

    /// Offset of a previously recorded mark, if it exists.
    fn mark_time(&self, name: &str) -> Option<f64>;

    /// Record a named measure between two marks and return its
    /// duration. `None` if either mark is missing; an incomplete
    /// phase is a legitimate state, not an error.
    fn measure(&self, name: &str, start_mark: &str, end_mark: &str) -> Option<f64>;

    fn clear_mark(&self, name: &str);

    fn clear_measure(&self, name: &str);

    /// Wall-clock instant the monotonic timeline started.
    fn time_origin(&self) -> DateTime<Utc>;

    /// Milliseconds elapsed since the time origin.
    fn now(&self) -> f64;

    /// Absolute wall-clock time for an offset on this timeline.
    fn wall_time(&self, offset_ms: f64) -> DateTime<Utc> {
        self.time_origin() + ChronoDuration::microseconds((offset_ms * 1_000.0) as i64)
    }
}

/// In-process mark/measure table over a monotonic origin.
///
/// `now()` is derived from a `tokio::time::Instant`, so the whole
/// engine runs deterministically under tokio's paused test clock.
pub struct PerformanceTimeline {
    origin_wall: DateTime<Utc>,
    origin: tokio::time::Instant,
    marks: Mutex<HashMap<String, f64>>,
    measures: Mutex<HashMap<String, f64>>,
}

impl PerformanceTimeline {
    pub fn new() -> Self {
        Self {
            origin_wall: Utc::now(),
            origin: tokio::time::Instant::now(),
            marks: Mutex::new(HashMap::new()),
            measures: Mutex::new(HashMap::new()),
        }
    }

    #[cfg(test)]
    pub(crate) fn mark_count(&self) -> usize {
        self.marks.lock().unwrap().len()
    }
}

impl Default for PerformanceTimeline {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingProvider for PerformanceTimeline {
    fn mark(&self, name: &str) {
        let at = self.now();
        self.marks.lock().unwrap().insert(name.to_string(), at);
    }

    fn mark_time(&self, name: &str) -> Option<f64> {
        self.marks.lock().unwrap().get(name).copied()
    }

    fn measure(&self, name: &str, start_mark: &str, end_mark: &str) -> Option<f64> {
        let marks = self.marks.lock().unwrap();
        let start = *marks.get(start_mark)?;
        let end = *marks.get(end_mark)?;
        drop(marks);

        let duration = end - start;
        self.measures
            .lock()
            .unwrap()
            .insert(name.to_string(), duration);
        Some(duration)
    }

    fn clear_mark(&self, name: &str) {
        self.marks.lock().unwrap().remove(name);
    }

    fn clear_measure(&self, name: &str) {
        self.measures.lock().unwrap().remove(name);
    }

    fn time_origin(&self) -> DateTime<Utc> {
        self.origin_wall
    }

    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1_000.0
    }
}
