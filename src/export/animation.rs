//! Animated GIF sink

use super::{ExportOptions, ExportSink, FramePool};
use crate::decode::{Frame, StreamInfo};
use crate::{Result, SpidyAniError};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes frames as a looping GIF
///
/// Quantization runs on the worker pool; frames are written in order as they
/// come back.
pub struct GifSink {
    path: PathBuf,
    output: Option<BufWriter<File>>,
    encoder: Option<gif::Encoder<BufWriter<File>>>,
    pool: Option<FramePool<gif::Frame<'static>>>,
    delay: u16,
    speed: i32,
    name: String,
}

impl GifSink {
    /// Create the output file
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let output = BufWriter::new(File::create(&path)?);
        Ok(Self {
            name: format!("gif {}", path.display()),
            path,
            output: Some(output),
            encoder: None,
            pool: None,
            delay: 0,
            speed: 10,
        })
    }

    /// Output path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_ready(&mut self, frames: Vec<Result<gif::Frame<'static>>>) -> Result<()> {
        let encoder = self
            .encoder
            .as_mut()
            .ok_or_else(|| SpidyAniError::Export("gif encoder not started".into()))?;
        for frame in frames {
            encoder.write_frame(&frame?)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for GifSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GifSink")
            .field("path", &self.path)
            .field("delay", &self.delay)
            .field("speed", &self.speed)
            .field("started", &self.encoder.is_some())
            .finish()
    }
}

/// Frame delay in hundredths of a second
pub(crate) fn frame_delay(fps: f64) -> u16 {
    if fps.is_finite() && fps > 0.0 {
        (100.0 / fps).round().clamp(1.0, f64::from(u16::MAX)) as u16
    } else {
        (100.0 / crate::FALLBACK_FPS).round() as u16
    }
}

impl ExportSink for GifSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn begin(&mut self, info: &StreamInfo, options: &ExportOptions) -> Result<()> {
        let output = self
            .output
            .take()
            .ok_or_else(|| SpidyAniError::Export("gif sink already started".into()))?;
        let mut encoder = gif::Encoder::new(output, info.width, info.height, &[])?;
        encoder.set_repeat(gif::Repeat::Infinite)?;

        self.delay = frame_delay(info.fps);
        self.speed = options.gif_speed.clamp(1, 30);
        self.encoder = Some(encoder);
        self.pool = Some(FramePool::new(
            "spidyani-gif",
            options.workers,
            options.queue_depth,
        )?);
        log::debug!(
            "{}: {}x{}, delay {} cs",
            self.name,
            info.width,
            info.height,
            self.delay
        );
        Ok(())
    }

    fn frame(&mut self, frame: &Frame) -> Result<()> {
        let (width, height, delay, speed) = (frame.width, frame.height, self.delay, self.speed);
        let mut rgba = frame.to_rgba();

        let pool = self
            .pool
            .as_mut()
            .ok_or_else(|| SpidyAniError::Export("gif sink not started".into()))?;
        pool.submit(move || {
            let mut frame = gif::Frame::from_rgba_speed(width, height, &mut rgba, speed);
            frame.delay = delay;
            Ok(frame)
        })?;
        let ready = pool.drain_ready();
        self.write_ready(ready)
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(pool) = self.pool.take() {
            let remaining = pool.finish();
            self.write_ready(remaining)?;
        }
        if let Some(encoder) = self.encoder.take() {
            let mut output = encoder.into_inner()?;
            output.flush()?;
            log::debug!("{}: finished", self.name);
        }
        Ok(())
    }
}
