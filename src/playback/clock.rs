//! Frame pacing

use std::time::{Duration, Instant};

/// Absolute-deadline frame clock
///
/// Deadlines are `start + n / fps`, so sleep overshoot on one frame does not
/// accumulate into drift over the session.
#[derive(Debug, Clone)]
pub struct FrameClock {
    period: Duration,
    start: Instant,
    frames: u32,
}

impl FrameClock {
    /// Start a clock now; non-finite or non-positive rates fall back to 17.89 fps
    pub fn new(fps: f64) -> Self {
        let fps = if fps.is_finite() && fps > 0.0 {
            fps
        } else {
            crate::FALLBACK_FPS
        };
        Self {
            period: Duration::from_secs_f64(1.0 / fps),
            start: Instant::now(),
            frames: 0,
        }
    }

    /// Time between frames
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Frames ticked so far
    pub fn frames(&self) -> u32 {
        self.frames
    }

    /// Restart the schedule at frame zero, now
    pub fn restart(&mut self) {
        self.start = Instant::now();
        self.frames = 0;
    }

    /// Shift the schedule so the next frame is due now
    ///
    /// Used after a pause so the paused time is not caught up with a burst.
    pub fn rebase(&mut self) {
        self.start = Instant::now()
            .checked_sub(self.period * self.frames)
            .unwrap_or_else(Instant::now);
    }

    /// Deadline of the next frame
    pub fn next_deadline(&self) -> Instant {
        self.start + self.period * self.frames
    }

    /// Advance one frame and return how long to wait until it is due
    pub fn tick(&mut self) -> Duration {
        let deadline = self.next_deadline();
        self.frames += 1;
        deadline.saturating_duration_since(Instant::now())
    }

    /// Advance one frame and sleep until it is due
    pub fn wait(&mut self) {
        let delay = self.tick();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}

/// Position within a stream in frame units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackPosition {
    /// Zero-based frame index
    pub frame_index: u32,
    /// Stream frame rate
    pub fps: f64,
}

impl PlaybackPosition {
    /// Presentation time of the frame from the start of the stream
    pub fn timestamp(&self) -> Duration {
        if self.fps.is_finite() && self.fps > 0.0 {
            Duration::from_secs_f64(f64::from(self.frame_index) / self.fps)
        } else {
            Duration::ZERO
        }
    }

    /// Whether audio should have started, given a delay in frames
    pub fn audio_started(&self, audio_frame_delay: u32) -> bool {
        self.frame_index >= audio_frame_delay
    }
}
