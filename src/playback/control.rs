//! Shared pause/stop state

use std::sync::{Arc, Condvar, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct ControlState {
    paused: bool,
    stopped: bool,
}

/// Pause, resume and stop flags shared between a UI thread and a decode thread
///
/// Clones share the same state. Stopping also releases any thread blocked in
/// [`PlaybackControl::wait_while_paused`].
#[derive(Debug, Clone, Default)]
pub struct PlaybackControl {
    inner: Arc<(Mutex<ControlState>, Condvar)>,
}

impl PlaybackControl {
    /// Create a control in the playing state
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ControlState> {
        // The state is two booleans; a panic elsewhere cannot leave it inconsistent
        self.inner.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Hold decoding before the next chunk
    pub fn pause(&self) {
        self.state().paused = true;
    }

    /// Continue after a pause
    pub fn resume(&self) {
        self.state().paused = false;
        self.inner.1.notify_all();
    }

    /// End the session at the next chunk boundary
    pub fn stop(&self) {
        self.state().stopped = true;
        self.inner.1.notify_all();
    }

    /// Whether playback is paused
    pub fn is_paused(&self) -> bool {
        self.state().paused
    }

    /// Whether playback was stopped
    pub fn is_stopped(&self) -> bool {
        self.state().stopped
    }

    /// Block until resumed or stopped
    pub fn wait_while_paused(&self) {
        let guard = self.state();
        let _guard = self
            .inner
            .1
            .wait_while(guard, |state| state.paused && !state.stopped)
            .unwrap_or_else(|poisoned| poisoned.into_inner());
    }
}
