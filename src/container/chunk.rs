//! Typed container chunks

use crate::{PALETTE_SIZE, SPECIAL_FRAME_LENGTH};

/// A frame data chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataChunk {
    /// Size of the pixel-run stream before LZSS (present iff the header uses LZSS)
    pub pre_lzss_length: Option<u16>,
    /// Stored payload length, or 0xFFFF for a chunk stored without LZSS
    pub length: u16,
    /// Width of the region this chunk covers
    pub frame_width: u16,
    /// Height of the region this chunk covers
    pub frame_height: u16,
    /// Stored payload
    pub payload: Vec<u8>,
}

impl DataChunk {
    /// Whether the chunk was stored without LZSS inside an LZSS container
    pub fn is_special(&self) -> bool {
        self.pre_lzss_length.is_some() && self.length == SPECIAL_FRAME_LENGTH
    }

    /// Whether the payload must go through the LZSS decompressor
    pub fn is_lzss_compressed(&self) -> bool {
        self.pre_lzss_length.is_some() && !self.is_special()
    }

    /// Number of payload bytes stored on disk
    pub fn stored_len(&self) -> usize {
        match self.pre_lzss_length {
            Some(pre) if self.length == SPECIAL_FRAME_LENGTH => pre as usize,
            _ => self.length as usize,
        }
    }

    /// Number of cells this chunk covers
    pub fn cells(&self) -> usize {
        self.frame_width as usize * self.frame_height as usize
    }
}

/// A chunk read from a container
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    /// Raw palette payload
    Palette(Box<[u8; PALETTE_SIZE]>),
    /// Unsigned 8-bit PCM samples with the on-disk offset removed
    Sound(Vec<u8>),
    /// Frame data
    Data(DataChunk),
}

impl Chunk {
    /// Four-byte tag identifying this chunk on disk
    pub fn tag(&self) -> &'static [u8; 4] {
        match self {
            Chunk::Palette(_) => crate::TAG_PALETTE,
            Chunk::Sound(_) => crate::TAG_SOUND,
            Chunk::Data(_) => crate::TAG_DATA,
        }
    }
}
