//! Streaming consumer contract
//!
//! Playback surfaces, audio devices and exporters all implement
//! [`StreamConsumer`]. The orchestrator guarantees:
//!
//! - `initialize` is called exactly once, before any `image_data` or
//!   `audio_data` call
//! - `image_data` is called once per logical frame, in order
//! - `audio_data` calls are in order and concatenate into one track
//! - exactly one of `finished`, `stopped` or `fatal` ends the session

use super::{Frame, StreamInfo};
use crate::SpidyAniError;
use std::io::Read;
use std::time::Duration;

/// Sleep used by the default [`StreamConsumer::wait_while_paused`]
pub const PAUSE_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Target of a decode session
pub trait StreamConsumer {
    /// Container source type
    type Source: Read;

    /// Name of the container, for diagnostics
    fn file_name(&self) -> &str;

    /// Open a fresh stream positioned at the start of the container
    ///
    /// Called once for the optional pre-scan and once for decoding.
    fn new_input_stream(&mut self) -> std::io::Result<Self::Source>;

    /// Stream parameters, before any data
    fn initialize(&mut self, info: &StreamInfo);

    /// One complete frame
    fn image_data(&mut self, frame: &Frame);

    /// A block of unsigned 8-bit mono PCM at 22050 Hz
    fn audio_data(&mut self, samples: &[u8]);

    /// Whether decoding should hold before the next chunk
    fn is_paused(&self) -> bool {
        false
    }

    /// Whether decoding should end before the next chunk
    fn is_stopped(&self) -> bool {
        false
    }

    /// Block while paused
    ///
    /// Called by the orchestrator only while `is_paused()` is true. The
    /// default sleeps for [`PAUSE_POLL_INTERVAL`]; consumers with a
    /// [`crate::playback::PlaybackControl`] block on it instead.
    fn wait_while_paused(&mut self) {
        std::thread::sleep(PAUSE_POLL_INTERVAL);
    }

    /// Meet the audio side once, right before the first frame
    fn rendezvous(&mut self) {}

    /// The session failed; no further calls follow
    fn fatal(&mut self, error: SpidyAniError);

    /// The container was decoded to the end
    fn finished(&mut self);

    /// The session ended because `is_stopped()` returned true
    fn stopped(&mut self);
}
