//! Numbered PNG sequence sink

use super::{ExportOptions, ExportSink, FramePool};
use crate::decode::{Frame, StreamInfo};
use crate::{Result, SpidyAniError};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Writes every frame to `{stem}_{index:05}.png`
pub struct PngSequenceSink {
    dir: PathBuf,
    stem: String,
    pool: Option<FramePool<PathBuf>>,
    written: Vec<PathBuf>,
    name: String,
}

impl PngSequenceSink {
    /// Write into `dir`, creating it if needed
    pub fn create<P: AsRef<Path>>(dir: P, stem: impl Into<String>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            name: format!("png {}", dir.display()),
            dir,
            stem: stem.into(),
            pool: None,
            written: Vec::new(),
        })
    }

    /// Path of the file for frame `index`
    pub fn frame_path(&self, index: u32) -> PathBuf {
        self.dir.join(format!("{}_{:05}.png", self.stem, index))
    }

    /// Files written so far, in frame order
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn collect(&mut self, results: Vec<Result<PathBuf>>) -> Result<()> {
        for result in results {
            self.written.push(result?);
        }
        Ok(())
    }
}

impl std::fmt::Debug for PngSequenceSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PngSequenceSink")
            .field("dir", &self.dir)
            .field("stem", &self.stem)
            .field("written", &self.written.len())
            .finish()
    }
}

fn write_png(path: &Path, width: u32, height: u32, rgba: &[u8]) -> Result<()> {
    let file = BufWriter::new(File::create(path)?);
    let mut encoder = png::Encoder::new(file, width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header()?;
    writer.write_image_data(rgba)?;
    writer.finish()?;
    Ok(())
}

impl ExportSink for PngSequenceSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn begin(&mut self, _info: &StreamInfo, options: &ExportOptions) -> Result<()> {
        self.pool = Some(FramePool::new(
            "spidyani-png",
            options.workers,
            options.queue_depth,
        )?);
        Ok(())
    }

    fn frame(&mut self, frame: &Frame) -> Result<()> {
        let path = self.frame_path(frame.index);
        let (width, height) = (u32::from(frame.width), u32::from(frame.height));
        let rgba = frame.to_rgba();

        let pool = self
            .pool
            .as_mut()
            .ok_or_else(|| SpidyAniError::Export("png sink not started".into()))?;
        pool.submit(move || {
            write_png(&path, width, height, &rgba)?;
            log::trace!("wrote {}", path.display());
            Ok(path)
        })?;
        let ready = pool.drain_ready();
        self.collect(ready)
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(pool) = self.pool.take() {
            let remaining = pool.finish();
            self.collect(remaining)?;
            log::debug!("{}: wrote {} frames", self.name, self.written.len());
        }
        Ok(())
    }
}
