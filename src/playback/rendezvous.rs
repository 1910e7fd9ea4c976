//! One-shot audio/video rendezvous

use std::sync::{Arc, Condvar, Mutex};

#[derive(Debug, Default)]
struct Meeting {
    arrived: u8,
}

/// One side of a two-party barrier
///
/// Created in pairs by [`AvRendezvous::pair`]. Each side arrives at most once:
/// [`AvRendezvous::wait`] blocks until the other side has arrived too, and
/// dropping a side that never waited counts as arriving, so the peer cannot
/// block forever.
#[derive(Debug)]
pub struct AvRendezvous {
    meeting: Arc<(Mutex<Meeting>, Condvar)>,
    arrived: bool,
}

impl AvRendezvous {
    /// Create the two sides of a rendezvous
    pub fn pair() -> (AvRendezvous, AvRendezvous) {
        let meeting = Arc::new((Mutex::new(Meeting::default()), Condvar::new()));
        (
            AvRendezvous {
                meeting: Arc::clone(&meeting),
                arrived: false,
            },
            AvRendezvous {
                meeting,
                arrived: false,
            },
        )
    }

    /// Whether this side has already arrived
    pub fn has_arrived(&self) -> bool {
        self.arrived
    }

    fn arrive(&mut self) {
        let (lock, cvar) = &*self.meeting;
        lock.lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .arrived += 1;
        cvar.notify_all();
        self.arrived = true;
    }

    /// Arrive and block until the peer has arrived
    ///
    /// Returns `false` without blocking if this side already arrived.
    pub fn wait(&mut self) -> bool {
        if self.arrived {
            return false;
        }
        self.arrive();

        let (lock, cvar) = &*self.meeting;
        let guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let _guard = cvar
            .wait_while(guard, |meeting| meeting.arrived < 2)
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        true
    }
}

impl Drop for AvRendezvous {
    fn drop(&mut self) {
        if !self.arrived {
            self.arrive();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_both_sides_meet() {
        let (mut video, mut audio) = AvRendezvous::pair();
        let audio_ready = Arc::new(AtomicBool::new(false));

        let audio_thread = {
            let audio_ready = Arc::clone(&audio_ready);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                audio_ready.store(true, Ordering::SeqCst);
                audio.wait()
            })
        };

        assert!(video.wait());
        assert!(audio_ready.load(Ordering::SeqCst));
        assert!(audio_thread.join().unwrap());
    }

    #[test]
    fn test_second_wait_returns_immediately() {
        let (mut video, audio) = AvRendezvous::pair();
        drop(audio);
        assert!(video.wait());
        assert!(video.has_arrived());
        assert!(!video.wait());
    }

    #[test]
    fn test_dropped_peer_releases_waiter() {
        let (mut video, audio) = AvRendezvous::pair();
        let dropper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            drop(audio);
        });
        assert!(video.wait());
        dropper.join().unwrap();
    }
}
