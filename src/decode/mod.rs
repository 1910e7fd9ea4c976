//! Decode orchestration
//!
//! [`FrameDecoder`] is the chunk-to-frame state machine: it owns the chunk
//! reader, the active palette and the frame accumulator, and turns chunks into
//! frames and audio one step at a time. [`AnimationDecoder`] drives it against
//! a [`StreamConsumer`], and [`spawn_event_channel`] runs the same session on a
//! producer thread that emits [`DecodeEvent`] values.

mod channel;
mod consumer;
mod frame_decoder;
mod orchestrator;

pub use channel::{spawn_event_channel, EventChannel};
pub use consumer::{StreamConsumer, PAUSE_POLL_INTERVAL};
pub use frame_decoder::{DecodeStep, FrameDecoder};
pub use orchestrator::{AnimationDecoder, DecoderOptions, SessionOutcome};

#[cfg(feature = "async")]
pub(crate) use channel::{ChannelConsumer, EventSink};

use crate::palette::to_rgba;
use crate::{Algorithm, SpidyAniError};

/// One fully assembled frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Zero-based frame index
    pub index: u32,
    /// Width in pixels
    pub width: u16,
    /// Height in pixels
    pub height: u16,
    /// Row-major `0xAARRGGBB` pixels
    pub pixels: Vec<u32>,
}

impl Frame {
    /// Pixels as interleaved RGBA bytes
    pub fn to_rgba(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|&color| to_rgba(color)).collect()
    }

    /// Pixels as interleaved RGB bytes
    pub fn to_rgb(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|&color| {
                let [r, g, b, _] = to_rgba(color);
                [r, g, b]
            })
            .collect()
    }
}

/// Stream parameters handed to `initialize`
#[derive(Debug, Clone, PartialEq)]
pub struct StreamInfo {
    /// Frame width in pixels
    pub width: u16,
    /// Frame height in pixels
    pub height: u16,
    /// Frames announced by the header
    pub frame_count: u16,
    /// Language of the audio track
    pub language_code: u16,
    /// Playback rate
    pub fps: f64,
    /// Frames to present before starting audio
    pub audio_frame_delay: u32,
    /// Pixel-run variant
    pub algorithm: Algorithm,
    /// Whether Data payloads are LZSS-compressed
    pub uses_lzss: bool,
    /// Whether frames span several Data chunks
    pub partial_data: bool,
}

/// Events produced by a decode session
#[derive(Debug)]
pub enum DecodeEvent {
    /// The session parsed the header and will start streaming
    Initialized(StreamInfo),
    /// A complete frame
    Frame(Frame),
    /// Unsigned 8-bit PCM samples
    Audio(Vec<u8>),
    /// The container ended cleanly
    Finished,
    /// The session was cancelled
    Stopped,
    /// The session failed
    Fatal(SpidyAniError),
}
