//! AnimationWriter - Container encoder
//!
//! Writes the header and chunks in the order the decoder consumes them. Frames
//! are handed over as palette-index buffers; the writer pixel-run encodes each
//! one against the previous frame, LZSS-compresses it when the header asks for
//! it, and splits frames larger than 65536 cells into row bands.

use super::{Chunk, DataChunk, Header};
use crate::rle::encode_indices;
use crate::{
    lzss, Result, SpidyAniError, PALETTE_SIZE, PARTIAL_DATA_THRESHOLD, SOUND_CHUNK_SIZE,
    SOUND_OFFSET, SPECIAL_FRAME_LENGTH,
};
use std::io::Write;

/// Largest payload a 16-bit length can describe without hitting the sentinel
const MAX_PAYLOAD: usize = SPECIAL_FRAME_LENGTH as usize - 1;

/// Streaming container writer
#[derive(Debug)]
pub struct AnimationWriter<W: Write> {
    writer: W,
    header: Header,
    previous: Option<Vec<u8>>,
    frames_written: u32,
    sound_bytes: u64,
    pending_audio: Vec<u8>,
}

impl<W: Write> AnimationWriter<W> {
    /// Create a writer and emit the header
    pub fn new(mut writer: W, header: Header) -> Result<Self> {
        if !header.is_compressed() {
            return Err(SpidyAniError::UnsupportedFormat(header.flags));
        }
        writer.write_all(&header.to_bytes())?;
        Ok(Self {
            writer,
            header,
            previous: None,
            frames_written: 0,
            sound_bytes: 0,
            pending_audio: Vec::new(),
        })
    }

    /// The header being written
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Frames written so far
    pub fn frames_written(&self) -> u32 {
        self.frames_written
    }

    /// Sound bytes written so far
    pub fn sound_bytes(&self) -> u64 {
        self.sound_bytes
    }

    /// Write a Palette chunk
    ///
    /// The next frame is written in full, since cells unchanged in index space
    /// no longer share a color.
    pub fn write_palette(&mut self, raw: &[u8; PALETTE_SIZE]) -> Result<()> {
        self.write_chunk(&Chunk::Palette(Box::new(*raw)))?;
        self.previous = None;
        Ok(())
    }

    /// Write one Sound chunk of unsigned 8-bit samples
    pub fn write_sound(&mut self, samples: &[u8; SOUND_CHUNK_SIZE]) -> Result<()> {
        self.write_chunk(&Chunk::Sound(samples.to_vec()))
    }

    /// Queue audio, emitting a Sound chunk for every 1270 samples
    pub fn write_audio(&mut self, samples: &[u8]) -> Result<()> {
        self.pending_audio.extend_from_slice(samples);
        while self.pending_audio.len() >= SOUND_CHUNK_SIZE {
            let rest = self.pending_audio.split_off(SOUND_CHUNK_SIZE);
            let chunk = std::mem::replace(&mut self.pending_audio, rest);
            self.write_chunk(&Chunk::Sound(chunk))?;
        }
        Ok(())
    }

    /// Write one logical frame of palette indices
    pub fn write_frame(&mut self, indices: &[u8]) -> Result<()> {
        let width = self.header.width as usize;
        let height = self.header.height as usize;
        if indices.len() != width * height {
            return Err(SpidyAniError::InvalidFrame(format!(
                "expected {}x{} = {} indices, got {}",
                width,
                height,
                width * height,
                indices.len()
            )));
        }

        let mut rows_per_band = if self.header.partial_data() {
            (PARTIAL_DATA_THRESHOLD / width.max(1)).clamp(1, height.max(1))
        } else {
            height
        };

        let mut row = 0;
        while row < height {
            let rows = rows_per_band.min(height - row);
            let range = row * width..(row + rows) * width;
            let previous = self.previous.as_ref().map(|prev| &prev[range.clone()]);

            match self.encode_band(&indices[range.clone()], previous, width, rows) {
                Ok(chunk) => {
                    self.write_chunk(&Chunk::Data(chunk))?;
                    row += rows;
                }
                Err(SpidyAniError::ChunkTooLarge(size))
                    if self.header.partial_data() && rows > 1 =>
                {
                    log::debug!("Band of {rows} rows encodes to {size} bytes, halving");
                    rows_per_band = rows / 2;
                }
                Err(e) => return Err(e),
            }
        }

        self.previous = Some(indices.to_vec());
        self.frames_written += 1;
        Ok(())
    }

    fn encode_band(
        &self,
        band: &[u8],
        previous: Option<&[u8]>,
        width: usize,
        rows: usize,
    ) -> Result<DataChunk> {
        let stream = encode_indices(band, previous, self.header.algorithm());
        if stream.len() > MAX_PAYLOAD {
            return Err(SpidyAniError::ChunkTooLarge(stream.len()));
        }

        let chunk = if self.header.uses_lzss() {
            let packed = lzss::compress(&stream);
            if packed.len() < stream.len() {
                DataChunk {
                    pre_lzss_length: Some(stream.len() as u16),
                    length: packed.len() as u16,
                    frame_width: width as u16,
                    frame_height: rows as u16,
                    payload: packed,
                }
            } else {
                DataChunk {
                    pre_lzss_length: Some(stream.len() as u16),
                    length: SPECIAL_FRAME_LENGTH,
                    frame_width: width as u16,
                    frame_height: rows as u16,
                    payload: stream,
                }
            }
        } else {
            DataChunk {
                pre_lzss_length: None,
                length: stream.len() as u16,
                frame_width: width as u16,
                frame_height: rows as u16,
                payload: stream,
            }
        };
        Ok(chunk)
    }

    /// Write a chunk exactly as given
    pub fn write_chunk(&mut self, chunk: &Chunk) -> Result<()> {
        self.writer.write_all(chunk.tag())?;
        match chunk {
            Chunk::Palette(raw) => self.writer.write_all(&raw[..])?,
            Chunk::Sound(samples) => {
                let stored: Vec<u8> = samples
                    .iter()
                    .map(|sample| sample.wrapping_add(SOUND_OFFSET))
                    .collect();
                self.writer.write_all(&stored)?;
                self.sound_bytes += samples.len() as u64;
            }
            Chunk::Data(data) => {
                if let Some(pre) = data.pre_lzss_length {
                    self.writer.write_all(&pre.to_le_bytes())?;
                }
                self.writer.write_all(&data.length.to_le_bytes())?;
                self.writer.write_all(&data.frame_width.to_le_bytes())?;
                self.writer.write_all(&data.frame_height.to_le_bytes())?;
                self.writer.write_all(&data.payload)?;
            }
        }
        Ok(())
    }

    /// Flush queued audio (padded with silence) and return the sink
    pub fn finish(mut self) -> Result<W> {
        if !self.pending_audio.is_empty() {
            let mut tail = std::mem::take(&mut self.pending_audio);
            tail.resize(SOUND_CHUNK_SIZE, SOUND_OFFSET);
            self.write_chunk(&Chunk::Sound(tail))?;
        }
        if self.frames_written != self.header.frame_count as u32 {
            log::warn!(
                "Header announces {} frames but {} were written",
                self.header.frame_count,
                self.frames_written
            );
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}
