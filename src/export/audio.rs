//! WAV audio sink

use super::{ExportOptions, ExportSink};
use crate::decode::{Frame, StreamInfo};
use crate::{Result, SAMPLE_RATE};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Writes the audio track as 8-bit mono 22050 Hz WAV
pub struct WavSink {
    path: PathBuf,
    writer: Option<hound::WavWriter<BufWriter<File>>>,
    samples: u64,
    name: String,
}

/// Format of the exported track
pub(crate) fn wav_spec() -> hound::WavSpec {
    hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 8,
        sample_format: hound::SampleFormat::Int,
    }
}

impl WavSink {
    /// Create the output file
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let writer = hound::WavWriter::create(&path, wav_spec())?;
        Ok(Self {
            name: format!("wav {}", path.display()),
            path,
            writer: Some(writer),
            samples: 0,
        })
    }

    /// Output path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Samples written so far
    pub fn samples(&self) -> u64 {
        self.samples
    }
}

impl std::fmt::Debug for WavSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WavSink")
            .field("path", &self.path)
            .field("samples", &self.samples)
            .finish()
    }
}

impl ExportSink for WavSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn begin(&mut self, _info: &StreamInfo, _options: &ExportOptions) -> Result<()> {
        Ok(())
    }

    fn frame(&mut self, _frame: &Frame) -> Result<()> {
        Ok(())
    }

    fn audio(&mut self, samples: &[u8]) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            for &sample in samples {
                // hound stores 8-bit samples unsigned, offsetting i8 by 128
                writer.write_sample((i16::from(sample) - 128) as i8)?;
            }
            self.samples += samples.len() as u64;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.take() {
            writer.finalize()?;
            log::debug!("{}: wrote {} samples", self.name, self.samples);
        }
        Ok(())
    }
}
