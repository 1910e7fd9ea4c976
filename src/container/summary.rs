//! Single-pass container summary
//!
//! Walks every chunk without decoding pixels. The decode orchestrator uses it
//! to learn the total sound size (and therefore the frame rate) before
//! playback starts.

use super::{Chunk, ChunkReader, Header};
use crate::{frames_per_second, Result, SpidyAniError};
use std::io::Read;

/// Chunk and frame counts for a whole container
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerSummary {
    /// Container header
    pub header: Header,
    /// Palette chunks seen
    pub palette_chunks: u32,
    /// Data chunks seen
    pub data_chunks: u32,
    /// Data chunks stored without LZSS
    pub special_frames: u32,
    /// Sound chunks seen
    pub sound_chunks: u32,
    /// Total sound bytes
    pub sound_bytes: u64,
    /// Logical frames completed by the Data chunks
    pub frames: u32,
    /// Frames completed before the first Sound chunk, if any sound exists
    pub frames_before_first_sound: Option<u32>,
}

impl ContainerSummary {
    /// Scan a whole container
    pub fn scan<R: Read>(reader: R) -> Result<Self> {
        match Self::scan_lenient(reader)? {
            (summary, None) => Ok(summary),
            (_, Some(error)) => Err(error),
        }
    }

    /// Scan up to the first broken chunk
    ///
    /// Header errors still fail. A chunk that cannot be read ends the scan and
    /// its error is returned alongside the counts gathered before it.
    pub fn scan_lenient<R: Read>(reader: R) -> Result<(Self, Option<SpidyAniError>)> {
        let mut chunks = ChunkReader::new(reader)?;
        let header = *chunks.header();
        let frame_cells = header.frame_cells();
        let partial = header.partial_data();

        let mut summary = Self {
            header,
            palette_chunks: 0,
            data_chunks: 0,
            special_frames: 0,
            sound_chunks: 0,
            sound_bytes: 0,
            frames: 0,
            frames_before_first_sound: None,
        };
        let mut pending_cells = 0usize;

        let error = loop {
            let chunk = match chunks.next_chunk() {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break None,
                Err(e) => break Some(e),
            };
            match chunk {
                Chunk::Palette(_) => summary.palette_chunks += 1,
                Chunk::Sound(samples) => {
                    summary.sound_chunks += 1;
                    summary.sound_bytes += samples.len() as u64;
                    summary.frames_before_first_sound.get_or_insert(summary.frames);
                }
                Chunk::Data(data) => {
                    summary.data_chunks += 1;
                    if data.is_special() {
                        summary.special_frames += 1;
                    }
                    if frame_cells == 0 {
                        continue;
                    }
                    if partial {
                        pending_cells += data.cells();
                        summary.frames += (pending_cells / frame_cells) as u32;
                        pending_cells %= frame_cells;
                    } else {
                        summary.frames += 1;
                    }
                }
            }
        };

        if let Some(e) = &error {
            log::debug!("Scan stopped after {} chunks: {}", chunks.chunks_read(), e);
        }
        log::debug!(
            "Scanned container: {} frames in {} data chunks, {} sound bytes",
            summary.frames,
            summary.data_chunks,
            summary.sound_bytes
        );
        Ok((summary, error))
    }

    /// Playback rate derived from the header frame count and total sound
    pub fn fps(&self) -> f64 {
        frames_per_second(self.header.frame_count, self.sound_bytes)
    }

    /// Frames that should be shown before audio starts
    pub fn audio_frame_delay(&self) -> u32 {
        self.frames_before_first_sound.unwrap_or(0)
    }

    /// Length of the audio track in seconds
    pub fn audio_duration(&self) -> f64 {
        self.sound_bytes as f64 / crate::SAMPLE_RATE as f64
    }
}
