//! ChunkReader - Sequential chunk parser
//!
//! Reads the header on construction, then yields one typed chunk per call
//! until the source ends cleanly at a tag boundary.

use super::{read_exact_or_eos, read_u16, Chunk, DataChunk, Header};
use crate::{
    Result, SpidyAniError, PALETTE_SIZE, SOUND_CHUNK_SIZE, SOUND_OFFSET, TAG_DATA, TAG_PALETTE,
    TAG_SOUND,
};
use std::io::{ErrorKind, Read};

/// Streaming chunk reader over a container source
#[derive(Debug)]
pub struct ChunkReader<R: Read> {
    reader: R,
    header: Header,
    chunks_read: u64,
    sound_bytes: u64,
}

impl<R: Read> ChunkReader<R> {
    /// Create a ChunkReader, reading and validating the header
    pub fn new(mut reader: R) -> Result<Self> {
        let header = super::read_header(&mut reader)?;
        log::debug!(
            "Container header: {}x{}, {} frames, flags {:#06x}, language {}",
            header.width,
            header.height,
            header.frame_count,
            header.flags,
            header.language_code
        );
        Ok(Self {
            reader,
            header,
            chunks_read: 0,
            sound_bytes: 0,
        })
    }

    /// The validated header
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Number of chunks read so far
    pub fn chunks_read(&self) -> u64 {
        self.chunks_read
    }

    /// Total sound bytes read so far
    pub fn sound_bytes(&self) -> u64 {
        self.sound_bytes
    }

    /// Give back the underlying source
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Read the next tag; `None` when the source ends exactly at a boundary
    fn read_tag(&mut self) -> Result<Option<[u8; 4]>> {
        let mut tag = [0u8; 4];
        let mut filled = 0;
        while filled < tag.len() {
            match self.reader.read(&mut tag[filled..]) {
                Ok(0) if filled == 0 => return Ok(None),
                Ok(0) => return Err(SpidyAniError::EndOfStream("chunk tag")),
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(Some(tag))
    }

    /// Read the next chunk, or `None` at the clean end of the container
    pub fn next_chunk(&mut self) -> Result<Option<Chunk>> {
        let Some(tag) = self.read_tag()? else {
            log::trace!("End of container after {} chunks", self.chunks_read);
            return Ok(None);
        };

        let chunk = match &tag {
            TAG_PALETTE => {
                let mut raw = Box::new([0u8; PALETTE_SIZE]);
                read_exact_or_eos(&mut self.reader, &mut raw[..], "palette chunk")?;
                Chunk::Palette(raw)
            }
            TAG_SOUND => {
                let mut samples = vec![0u8; SOUND_CHUNK_SIZE];
                read_exact_or_eos(&mut self.reader, &mut samples, "sound chunk")?;
                for sample in &mut samples {
                    *sample = sample.wrapping_sub(SOUND_OFFSET);
                }
                self.sound_bytes += SOUND_CHUNK_SIZE as u64;
                Chunk::Sound(samples)
            }
            TAG_DATA => Chunk::Data(self.read_data()?),
            _ => {
                log::warn!("Unsupported block tag {:02x?}", tag);
                return Err(SpidyAniError::UnsupportedBlock(tag));
            }
        };

        self.chunks_read += 1;
        Ok(Some(chunk))
    }

    fn read_data(&mut self) -> Result<DataChunk> {
        let pre_lzss_length = if self.header.uses_lzss() {
            Some(read_u16(&mut self.reader, "data chunk header")?)
        } else {
            None
        };
        let length = read_u16(&mut self.reader, "data chunk header")?;
        let frame_width = read_u16(&mut self.reader, "data chunk header")?;
        let frame_height = read_u16(&mut self.reader, "data chunk header")?;

        let mut chunk = DataChunk {
            pre_lzss_length,
            length,
            frame_width,
            frame_height,
            payload: Vec::new(),
        };
        chunk.payload = vec![0u8; chunk.stored_len()];
        read_exact_or_eos(&mut self.reader, &mut chunk.payload, "data payload")?;

        log::trace!(
            "Data chunk {}x{}: {} stored bytes{}",
            frame_width,
            frame_height,
            chunk.payload.len(),
            if chunk.is_special() { " (special)" } else { "" }
        );
        Ok(chunk)
    }
}

impl<R: Read> Iterator for ChunkReader<R> {
    type Item = Result<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_chunk().transpose()
    }
}
