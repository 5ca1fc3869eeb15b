//! Throughput Monitor — frame-rate reporting for the emission loop
//!
//! Counts emitted frames and periodically yields the cumulative rate
//! (total frames over total elapsed wall time). The emitter logs one
//! report per window; the inter-frame pacing itself is a plain sleep in
//! the emitter with no drift compensation, so the reported rate runs a
//! little below the nominal target under load.
//!
//! ## Example
//!
//! ```rust
//! use sigstream_core::throttle::ThroughputMonitor;
//!
//! let mut monitor = ThroughputMonitor::new(3);
//! assert!(monitor.record().is_none());
//! assert!(monitor.record().is_none());
//! assert!(monitor.record().is_some()); // every 3rd frame reports
//! assert_eq!(monitor.total_frames(), 3);
//! ```

use std::time::{Duration, Instant};

/// Cumulative frames-per-second monitor.
#[derive(Debug, Clone)]
pub struct ThroughputMonitor {
    /// Frames between reports.
    window_frames: u64,
    /// Frames since the last report.
    since_report: u64,
    /// Total frames recorded.
    total_frames: u64,
    /// Time of the first recorded frame.
    start: Option<Instant>,
}

impl ThroughputMonitor {
    /// Create a monitor that reports every `window_frames` frames.
    pub fn new(window_frames: u64) -> Self {
        Self {
            window_frames: window_frames.max(1),
            since_report: 0,
            total_frames: 0,
            start: None,
        }
    }

    /// Record one emitted frame.
    ///
    /// Returns `Some(rate)` every `window_frames` frames, where `rate` is
    /// the cumulative frames-per-second since the first recorded frame.
    pub fn record(&mut self) -> Option<f64> {
        let now = Instant::now();
        if self.start.is_none() {
            self.start = Some(now);
        }
        self.total_frames += 1;
        self.since_report += 1;

        if self.since_report >= self.window_frames {
            self.since_report = 0;
            Some(self.average_rate_at(now))
        } else {
            None
        }
    }

    /// Total frames recorded.
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Elapsed time since the first recorded frame.
    pub fn elapsed(&self) -> Duration {
        self.start.map_or(Duration::ZERO, |t| t.elapsed())
    }

    /// Cumulative frames-per-second since the first recorded frame.
    pub fn average_rate(&self) -> f64 {
        self.average_rate_at(Instant::now())
    }

    fn average_rate_at(&self, now: Instant) -> f64 {
        match self.start {
            Some(start) => {
                let elapsed = now.duration_since(start).as_secs_f64();
                if elapsed > 0.0 {
                    self.total_frames as f64 / elapsed
                } else {
                    0.0
                }
            }
            None => 0.0,
        }
    }

    /// Reset all counters.
    pub fn reset(&mut self) {
        self.since_report = 0;
        self.total_frames = 0;
        self.start = None;
    }
}
