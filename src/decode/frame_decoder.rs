//! FrameDecoder - Chunk-to-frame state machine
//!
//! Each step consumes exactly one chunk. Palette chunks swap the active
//! table, Sound chunks pass straight through, and Data chunks are decoded into
//! the frame accumulator. When the header marks frames as split, each chunk
//! covers its declared sub-area at the current cursor and a frame is emitted
//! once the accumulator is full; otherwise each chunk decodes over the whole
//! accumulator and emits a frame. Pixels stay in place so the next frame's
//! skip instructions see them.

use super::{DecodeEvent, Frame};
use crate::container::{Chunk, ChunkReader, DataChunk, Header};
use crate::palette::{Palette, OPAQUE};
use crate::rle::decode_pixels;
use crate::{lzss, DecodeStats, Result, SpidyAniError};
use std::io::Read;

/// Outcome of a single step
#[derive(Debug)]
pub enum DecodeStep {
    /// A Data chunk completed a frame
    Frame(Frame),
    /// A Sound chunk
    Audio(Vec<u8>),
    /// A chunk was consumed without producing output
    Consumed,
    /// The container ended cleanly
    End,
}

/// Pull-style decoder over a container source
#[derive(Debug)]
pub struct FrameDecoder<R: Read> {
    chunks: ChunkReader<R>,
    palette: Palette,
    accumulator: Vec<u32>,
    cursor: usize,
    scratch: Vec<u8>,
    stats: DecodeStats,
    finished: bool,
}

impl<R: Read> FrameDecoder<R> {
    /// Create a decoder, reading and validating the header
    pub fn new(reader: R) -> Result<Self> {
        let chunks = ChunkReader::new(reader)?;
        let cells = chunks.header().frame_cells();
        Ok(Self {
            chunks,
            palette: Palette::default(),
            accumulator: vec![OPAQUE; cells],
            cursor: 0,
            scratch: Vec::new(),
            stats: DecodeStats::default(),
            finished: false,
        })
    }

    /// The container header
    pub fn header(&self) -> &Header {
        self.chunks.header()
    }

    /// The active palette
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Counters for the session so far
    pub fn stats(&self) -> &DecodeStats {
        &self.stats
    }

    /// Consume one chunk
    pub fn step(&mut self) -> Result<DecodeStep> {
        if self.finished {
            return Ok(DecodeStep::End);
        }

        let Some(chunk) = self.chunks.next_chunk()? else {
            self.finished = true;
            if self.cursor != 0 {
                log::warn!(
                    "Container ended with a partial frame ({} of {} cells)",
                    self.cursor,
                    self.accumulator.len()
                );
            }
            return Ok(DecodeStep::End);
        };

        match chunk {
            Chunk::Palette(raw) => {
                self.palette = Palette::from_chunk(&raw);
                self.stats.palette_chunks += 1;
                log::trace!("Palette replaced");
                Ok(DecodeStep::Consumed)
            }
            Chunk::Sound(samples) => {
                self.stats.sound_chunks += 1;
                self.stats.sound_bytes += samples.len() as u64;
                Ok(DecodeStep::Audio(samples))
            }
            Chunk::Data(data) => match self.apply_data(data)? {
                Some(frame) => Ok(DecodeStep::Frame(frame)),
                None => Ok(DecodeStep::Consumed),
            },
        }
    }

    /// Next frame or audio event, or `None` at the clean end
    pub fn next_event(&mut self) -> Result<Option<DecodeEvent>> {
        loop {
            match self.step()? {
                DecodeStep::Frame(frame) => return Ok(Some(DecodeEvent::Frame(frame))),
                DecodeStep::Audio(samples) => return Ok(Some(DecodeEvent::Audio(samples))),
                DecodeStep::Consumed => continue,
                DecodeStep::End => return Ok(None),
            }
        }
    }

    fn apply_data(&mut self, data: DataChunk) -> Result<Option<Frame>> {
        self.stats.data_chunks += 1;
        if data.is_special() {
            self.stats.special_frames += 1;
        }

        let capacity = self.accumulator.len();
        if capacity == 0 {
            log::warn!("Ignoring Data chunk in a container with empty frames");
            return Ok(None);
        }

        // Split frames place each chunk after the previous one; otherwise every
        // chunk redraws the whole frame
        let partial = self.chunks.header().partial_data();
        let cells = if partial { data.cells() } else { capacity };
        if self.cursor + cells > capacity {
            return Err(SpidyAniError::DecodeOverrun {
                position: self.cursor,
                count: cells,
                capacity,
            });
        }

        let stream: &[u8] = match data.pre_lzss_length {
            Some(expected) if data.is_lzss_compressed() => {
                self.scratch.resize(expected as usize, 0);
                let produced = lzss::decompress_into(&data.payload, &mut self.scratch);
                if produced < expected as usize {
                    log::warn!("LZSS payload produced {produced} of {expected} bytes");
                }
                &self.scratch[..produced]
            }
            _ => &data.payload,
        };

        let region = &mut self.accumulator[self.cursor..self.cursor + cells];
        let written = decode_pixels(stream, region, self.chunks.header().algorithm(), &self.palette)?;
        if written < cells {
            log::warn!(
                "Data chunk covered {written} of {cells} cells; keeping previous pixels for the rest"
            );
        }

        self.cursor += cells;
        if self.cursor < capacity {
            log::trace!("Frame accumulator at {} of {} cells", self.cursor, capacity);
            return Ok(None);
        }

        self.cursor = 0;
        let header = self.chunks.header();
        let frame = Frame {
            index: self.stats.frames,
            width: header.width,
            height: header.height,
            pixels: self.accumulator.clone(),
        };
        self.stats.frames += 1;
        Ok(Some(frame))
    }
}

impl<R: Read> Iterator for FrameDecoder<R> {
    type Item = Result<DecodeEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::AnimationWriter;
    use crate::{Algorithm, PALETTE_SIZE};
    use std::io::Cursor;

    fn palette_raw() -> [u8; PALETTE_SIZE] {
        let mut raw = [0u8; PALETTE_SIZE];
        for (i, rgb) in raw.chunks_exact_mut(3).enumerate() {
            rgb.copy_from_slice(&[(i % 64) as u8, (i / 4 % 64) as u8, 0x3F]);
        }
        raw
    }

    #[test]
    fn test_palette_resolved_frames() {
        let header = Header::new(4, 2, 2, Algorithm::Type2, true);
        let mut writer = AnimationWriter::new(Vec::new(), header).unwrap();
        writer.write_palette(&palette_raw()).unwrap();
        writer.write_frame(&[1, 1, 1, 1, 2, 3, 4, 5]).unwrap();
        writer.write_frame(&[1, 1, 9, 1, 2, 3, 4, 5]).unwrap();
        let bytes = writer.finish().unwrap();

        let mut decoder = FrameDecoder::new(Cursor::new(bytes)).unwrap();
        let palette = Palette::from_chunk(&palette_raw());

        let Some(DecodeEvent::Frame(first)) = decoder.next_event().unwrap() else {
            panic!("expected first frame");
        };
        let expected: Vec<u32> = [1, 1, 1, 1, 2, 3, 4, 5].map(|i| palette.color(i)).to_vec();
        assert_eq!(first.pixels, expected);
        assert_eq!(first.index, 0);

        let Some(DecodeEvent::Frame(second)) = decoder.next_event().unwrap() else {
            panic!("expected second frame");
        };
        assert_eq!(second.index, 1);
        assert_eq!(second.pixels[2], palette.color(9));
        assert_eq!(second.pixels[3], palette.color(1));

        assert!(decoder.next_event().unwrap().is_none());
        assert_eq!(decoder.stats().frames, 2);
        assert_eq!(decoder.stats().palette_chunks, 1);
    }

    #[test]
    fn test_oversized_chunk_overruns() {
        let header = Header::new(2, 2, 1, Algorithm::Type1, false);
        let mut writer = AnimationWriter::new(Vec::new(), header).unwrap();
        writer
            .write_chunk(&Chunk::Data(DataChunk {
                pre_lzss_length: None,
                length: 2,
                frame_width: 5,
                frame_height: 1,
                payload: vec![0xC5, 0x01],
            }))
            .unwrap();
        let bytes = writer.finish().unwrap();

        let mut decoder = FrameDecoder::new(Cursor::new(bytes)).unwrap();
        assert!(matches!(
            decoder.step(),
            Err(SpidyAniError::DecodeOverrun {
                position: 0,
                count: 5,
                capacity: 4
            })
        ));
    }

    #[test]
    fn test_whole_frame_chunks_ignore_declared_size() {
        // Declared sub-areas only matter for split frames
        for (frame_width, frame_height) in [(4, 1), (0, 0)] {
            let header = Header::new(4, 2, 1, Algorithm::Type1, false);
            let mut writer = AnimationWriter::new(Vec::new(), header).unwrap();
            writer
                .write_chunk(&Chunk::Data(DataChunk {
                    pre_lzss_length: None,
                    length: 2,
                    frame_width,
                    frame_height,
                    payload: vec![0xC8, 0x05],
                }))
                .unwrap();
            let bytes = writer.finish().unwrap();

            let mut decoder = FrameDecoder::new(Cursor::new(bytes)).unwrap();
            let DecodeStep::Frame(frame) = decoder.step().unwrap() else {
                panic!("expected a frame from a {frame_width}x{frame_height} chunk");
            };
            assert_eq!(frame.pixels, vec![Palette::default().color(5); 8]);
            assert!(matches!(decoder.step().unwrap(), DecodeStep::End));
        }
    }

    #[test]
    fn test_end_is_sticky() {
        let header = Header::new(1, 1, 0, Algorithm::Type1, false);
        let bytes = AnimationWriter::new(Vec::new(), header).unwrap().finish().unwrap();
        let mut decoder = FrameDecoder::new(Cursor::new(bytes)).unwrap();
        assert!(matches!(decoder.step().unwrap(), DecodeStep::End));
        assert!(matches!(decoder.step().unwrap(), DecodeStep::End));
    }
}
