//! Timers
//!
//! Frame delta tracking and scoped timing for the render loop.

use std::time::{Duration, Instant};

use crate::frame::FrameTime;

/// Turns frame timestamps into clamped deltas
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<FrameTime>,
    max_delta: f64,
    frames: u64,
}

impl FrameClock {
    /// Largest delta reported by default, so a stalled host does not cause a jump
    pub const DEFAULT_MAX_DELTA: f64 = 0.1;

    /// Create a new frame clock
    pub fn new() -> Self {
        Self::with_max_delta(Self::DEFAULT_MAX_DELTA)
    }

    /// Create a frame clock with a custom delta clamp
    pub fn with_max_delta(max_delta: f64) -> Self {
        Self {
            last: None,
            max_delta,
            frames: 0,
        }
    }

    /// Record a frame timestamp, returning seconds since the previous one
    ///
    /// The first frame reports zero. Timestamps that go backwards also report zero.
    pub fn tick(&mut self, time: FrameTime) -> f64 {
        let delta = match self.last {
            Some(last) => (time - last).clamp(0.0, self.max_delta),
            None => 0.0,
        };
        self.last = Some(time);
        self.frames += 1;
        delta
    }

    /// Number of frames ticked
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoped timer that records duration on drop
pub struct ScopedTimer<'a> {
    name: &'a str,
    start: Instant,
}

impl<'a> ScopedTimer<'a> {
    /// Start a timer that reports through tracing when dropped
    pub fn traced(name: &'a str) -> Self {
        Self {
            name,
            start: Instant::now(),
        }
    }

    /// Get elapsed time so far
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for ScopedTimer<'_> {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        tracing::debug!(
            target: "timing",
            name = self.name,
            duration_us = duration.as_micros() as u64,
            "Timer completed"
        );
    }
}
