//! SpidyAni - Rust decoder for the SpidyAni animation container
//!
//! This crate reads the SpidyAni container used by 1990s multimedia titles: a
//! 19-byte header followed by palette, sound and frame-data chunks. Frame data
//! is a palette-indexed pixel-run stream, optionally packed with a 4 KB-window
//! LZSS coder, and large frames are split across several Data chunks.
//!
//! # Features
//!
//! - Container parsing with typed chunks and precise truncation errors
//! - LZSS decompression (and the matching greedy compressor)
//! - Both pixel-run variants, resolving indices through the active palette
//! - Frame reassembly across partial Data chunks, with mid-stream re-palette
//! - Callback-driven sessions with cooperative pause and stop, or the same
//!   session as a channel of events
//! - Real-time pacing and an audio/video rendezvous for playback consumers
//! - GIF, PNG sequence and WAV export on a bounded worker pool
//! - Container writing for authoring and test fixtures
//!
//! # Example - Decoding
//!
//! ```no_run
//! use spidyani::{FrameDecoder, DecodeStep};
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! let mut decoder = FrameDecoder::new(BufReader::new(File::open("intro.ani")?))?;
//! println!("{}x{}", decoder.header().width, decoder.header().height);
//! loop {
//!     match decoder.step()? {
//!         DecodeStep::Frame(frame) => println!("frame {}", frame.index),
//!         DecodeStep::Audio(samples) => println!("{} audio bytes", samples.len()),
//!         DecodeStep::Consumed => {}
//!         DecodeStep::End => break,
//!     }
//! }
//! # Ok::<(), spidyani::SpidyAniError>(())
//! ```
//!
//! # Example - Writing
//!
//! ```no_run
//! use spidyani::{Algorithm, AnimationWriter, Header};
//!
//! let header = Header::new(320, 200, 1, Algorithm::Type2, true);
//! let mut writer = AnimationWriter::new(Vec::new(), header)?;
//! writer.write_frame(&vec![0u8; 320 * 200])?;
//! let container = writer.finish()?;
//! # Ok::<(), spidyani::SpidyAniError>(())
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

// Public modules
pub mod common;
pub mod container;
pub mod decode;
pub mod error;
pub mod export;
pub mod lzss;
pub mod palette;
pub mod playback;
pub mod rle;

// Async module (only available with async feature)
#[cfg(feature = "async")]
pub mod async_decode;

// Re-export commonly used types
pub use common::{
    frames_per_second, Algorithm, DecodeStats, Result, SpidyAniError, FALLBACK_FPS,
    FLAG_ALGORITHM, FLAG_COMPRESSED, FLAG_LZSS, HEADER_SIZE, MAGIC, PALETTE_ENTRIES, PALETTE_SIZE,
    PARTIAL_DATA_THRESHOLD, SAMPLE_RATE, SOUND_CHUNK_SIZE, SOUND_OFFSET, SPECIAL_FRAME_LENGTH,
    TAG_DATA, TAG_PALETTE, TAG_SOUND, VERSION,
};
pub use container::{AnimationWriter, Chunk, ChunkReader, ContainerSummary, DataChunk, Header};
pub use decode::{
    spawn_event_channel, AnimationDecoder, DecodeEvent, DecodeStep, DecoderOptions, EventChannel,
    Frame, FrameDecoder, SessionOutcome, StreamConsumer, StreamInfo,
};
pub use palette::Palette;
pub use playback::{AvRendezvous, FrameClock, PacedConsumer, PlaybackControl};

// Re-export async types when async feature is enabled
#[cfg(feature = "async")]
pub use async_decode::{decode_frames_async, DecodeEventStream};

use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;

// Convenience functions

/// Decode every frame of an in-memory container
///
/// # Arguments
/// * `data` - The complete container
///
/// # Returns
/// The frames in order; audio is skipped
pub fn decode_frames(data: &[u8]) -> Result<Vec<Frame>> {
    let mut decoder = FrameDecoder::new(Cursor::new(data))?;
    let mut frames = Vec::new();
    loop {
        match decoder.step()? {
            DecodeStep::Frame(frame) => frames.push(frame),
            DecodeStep::Audio(_) | DecodeStep::Consumed => {}
            DecodeStep::End => return Ok(frames),
        }
    }
}

/// Concatenate the audio track of an in-memory container
///
/// # Returns
/// Unsigned 8-bit mono PCM at 22050 Hz
pub fn decode_audio(data: &[u8]) -> Result<Vec<u8>> {
    let mut reader = ChunkReader::new(Cursor::new(data))?;
    let mut samples = Vec::new();
    while let Some(chunk) = reader.next_chunk()? {
        if let Chunk::Sound(block) = chunk {
            samples.extend_from_slice(&block);
        }
    }
    Ok(samples)
}

/// Scan a container file without decoding pixels
///
/// # Arguments
/// * `path` - Path of the container
pub fn read_summary<P: AsRef<Path>>(path: P) -> Result<ContainerSummary> {
    let file = File::open(path)?;
    ContainerSummary::scan(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reexports() {
        // Test that common types are accessible
        let _ = Algorithm::Type1;
        let _ = DecoderOptions::default();
        let _ = PlaybackControl::new();
        assert_eq!(HEADER_SIZE, 19);
        assert_eq!(frames_per_second(10, 0), FALLBACK_FPS);

        // Format constants used across modules are reachable from the root
        assert_eq!(MAGIC, b"SpidyAni");
        assert_eq!(VERSION, 2);
        assert_eq!((TAG_PALETTE, TAG_SOUND, TAG_DATA), (b"Pal ", b"Hang", b"Data"));
        assert_eq!(FLAG_COMPRESSED | FLAG_ALGORITHM | FLAG_LZSS, 0x25);
        assert_eq!(PALETTE_ENTRIES * 3, PALETTE_SIZE);
        assert_eq!((SOUND_OFFSET, SPECIAL_FRAME_LENGTH), (0x80, 0xFFFF));
        assert_eq!(PARTIAL_DATA_THRESHOLD, 65536);
    }

    #[test]
    fn test_decode_helpers() {
        let header = Header::new(3, 1, 1, Algorithm::Type1, false);
        let mut writer = AnimationWriter::new(Vec::new(), header).unwrap();
        writer.write_audio(&[0x90; 100]).unwrap();
        writer.write_frame(&[0, 1, 2]).unwrap();
        let data = writer.finish().unwrap();

        let frames = decode_frames(&data).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].width, 3);

        // Audio is padded to whole sound chunks with silence
        let audio = decode_audio(&data).unwrap();
        assert_eq!(audio.len(), 1270);
        assert!(audio[..100].iter().all(|&s| s == 0x90));
        assert!(audio[100..].iter().all(|&s| s == 0x80));
    }

    #[test]
    fn test_truncated_container() {
        let err = decode_frames(b"SpidyAni2").unwrap_err();
        assert!(matches!(err, SpidyAniError::EndOfStream(_)));
    }
}
