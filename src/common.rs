//! Common types and constants for the SpidyAni container format
//!
//! This module defines the core types, constants, and error type shared by the
//! container parser, the two codecs (LZSS and pixel-run), and the decode
//! orchestrator.

use thiserror::Error;

/// Pixel-run algorithm variant selected by header flag bit 2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Codes 0x00-0x7F are a single pixel whose index is the code itself
    Type1 = 0,
    /// Codes 0x00-0x7F start a literal run of raw index bytes
    Type2 = 1,
}

impl Algorithm {
    /// Create an Algorithm from the raw header flags
    pub fn from_flags(flags: u16) -> Self {
        if flags & FLAG_ALGORITHM != 0 {
            Algorithm::Type2
        } else {
            Algorithm::Type1
        }
    }

    /// The flag bits this variant contributes to the header
    pub fn flag_bits(&self) -> u16 {
        match self {
            Algorithm::Type1 => 0,
            Algorithm::Type2 => FLAG_ALGORITHM,
        }
    }
}

/// Error type for SpidyAni operations
#[derive(Debug, Error)]
pub enum SpidyAniError {
    /// Header magic did not match `SpidyAni`
    #[error("Invalid container magic: {0:?}")]
    Format([u8; 8]),

    /// Version other than 2
    #[error("Unsupported container version: {0} (expected 2)")]
    UnsupportedVersion(u8),

    /// The compressed flag is not set
    #[error("Unsupported container format: flags {0:#06x} lack the compressed bit")]
    UnsupportedFormat(u16),

    /// Unknown chunk tag
    #[error("Unsupported block tag: {}", String::from_utf8_lossy(.0))]
    UnsupportedBlock([u8; 4]),

    /// Source ended inside a header or chunk
    #[error("Unexpected end of stream while reading {0}")]
    EndOfStream(&'static str),

    /// Pixel-run output would run past the destination buffer
    #[error("Decode overrun: {count} cells at position {position} exceed capacity {capacity}")]
    DecodeOverrun {
        /// Cursor position when the instruction was read
        position: usize,
        /// Number of cells the instruction covers
        count: usize,
        /// Size of the destination buffer
        capacity: usize,
    },

    /// An encoded chunk does not fit its 16-bit length field
    #[error("Chunk payload of {0} bytes does not fit a 16-bit length")]
    ChunkTooLarge(usize),

    /// A frame handed to the writer does not match the header dimensions
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    /// Failure inside an export encoder
    #[error("Export error: {0}")]
    Export(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<gif::EncodingError> for SpidyAniError {
    fn from(err: gif::EncodingError) -> Self {
        SpidyAniError::Export(format!("gif: {err}"))
    }
}

impl From<png::EncodingError> for SpidyAniError {
    fn from(err: png::EncodingError) -> Self {
        SpidyAniError::Export(format!("png: {err}"))
    }
}

impl From<hound::Error> for SpidyAniError {
    fn from(err: hound::Error) -> Self {
        SpidyAniError::Export(format!("wav: {err}"))
    }
}

/// Result type alias for SpidyAni operations
pub type Result<T> = std::result::Result<T, SpidyAniError>;

// Container constants

/// Magic marker at the start of every container
pub const MAGIC: &[u8; 8] = b"SpidyAni";

/// The only supported container version
pub const VERSION: u8 = 2;

/// Size of the fixed header in bytes
pub const HEADER_SIZE: usize = 19;

/// Header flag: frames are compressed (must be set)
pub const FLAG_COMPRESSED: u16 = 1 << 0;

/// Header flag: pixel-run variant TYPE_2
pub const FLAG_ALGORITHM: u16 = 1 << 2;

/// Header flag: Data payloads are LZSS-compressed
pub const FLAG_LZSS: u16 = 1 << 5;

/// Tag of a palette chunk
pub const TAG_PALETTE: &[u8; 4] = b"Pal ";

/// Tag of a sound chunk
pub const TAG_SOUND: &[u8; 4] = b"Hang";

/// Tag of a frame data chunk
pub const TAG_DATA: &[u8; 4] = b"Data";

/// Palette payload size (256 six-bit RGB triples)
pub const PALETTE_SIZE: usize = 768;

/// Number of palette entries
pub const PALETTE_ENTRIES: usize = 256;

/// Sound payload size
pub const SOUND_CHUNK_SIZE: usize = 1270;

/// Sound sample rate (8-bit unsigned mono)
pub const SAMPLE_RATE: u32 = 22050;

/// Offset applied to sound samples on disk
pub const SOUND_OFFSET: u8 = 0x80;

/// Length value marking a Data chunk stored without LZSS
pub const SPECIAL_FRAME_LENGTH: u16 = 0xFFFF;

/// Frames larger than this many cells arrive split across Data chunks
pub const PARTIAL_DATA_THRESHOLD: usize = 65536;

/// Frame rate used when a container carries no sound
pub const FALLBACK_FPS: f64 = 17.89;

/// Statistics for a decode session
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DecodeStats {
    /// Logical frames emitted
    pub frames: u32,
    /// Data chunks consumed
    pub data_chunks: u32,
    /// Data chunks stored without LZSS
    pub special_frames: u32,
    /// Palette chunks consumed
    pub palette_chunks: u32,
    /// Sound chunks consumed
    pub sound_chunks: u32,
    /// Total sound bytes forwarded
    pub sound_bytes: u64,
}

/// Frame rate for a container with the given frame count and total sound bytes
pub fn frames_per_second(frame_count: u16, sound_bytes: u64) -> f64 {
    if sound_bytes == 0 {
        FALLBACK_FPS
    } else {
        frame_count as f64 * SAMPLE_RATE as f64 / sound_bytes as f64
    }
}
