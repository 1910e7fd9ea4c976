//! Export consumers
//!
//! [`Exporter`] is a [`StreamConsumer`] that fans a decode session out to any
//! number of [`ExportSink`]s: a GIF animation, a numbered PNG sequence and a
//! WAV track are provided. Frame encoding runs on a [`FramePool`] so the
//! decode thread only waits when the pool's queue is full.
//!
//! ```no_run
//! use spidyani::export::{ExportOptions, Exporter};
//!
//! let report = Exporter::from_path("intro.ani")?
//!     .with_options(ExportOptions::new().with_workers(4))
//!     .add_gif("intro.gif")?
//!     .add_wav("intro.wav")?
//!     .run()?;
//! println!("{} frames at {:.2} fps", report.frames, report.fps);
//! # Ok::<(), spidyani::SpidyAniError>(())
//! ```

mod animation;
mod audio;
mod frames;
mod pool;

pub use animation::GifSink;
pub use audio::WavSink;
pub use frames::PngSequenceSink;
pub use pool::FramePool;

use crate::decode::{AnimationDecoder, DecoderOptions, SessionOutcome};
use crate::decode::{Frame, StreamConsumer, StreamInfo};
use crate::playback::PlaybackControl;
use crate::{DecodeStats, Result, SpidyAniError};
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Export settings
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Frame encoder threads
    pub workers: usize,
    /// Frames waiting for a worker before the decoder blocks
    pub queue_depth: usize,
    /// GIF quantizer speed, 1 (best) to 30 (fastest)
    pub gif_speed: i32,
    /// Options for the underlying decode session
    pub decoder: DecoderOptions,
}

impl ExportOptions {
    /// Default settings: one worker per CPU, two queued frames per worker
    pub fn new() -> Self {
        let workers = num_cpus::get();
        Self {
            workers,
            queue_depth: workers * 2,
            gif_speed: 10,
            decoder: DecoderOptions::default(),
        }
    }

    /// Set the number of encoder threads
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set the encoder queue depth
    pub fn with_queue_depth(mut self, depth: usize) -> Self {
        self.queue_depth = depth.max(1);
        self
    }

    /// Set the GIF quantizer speed, clamped to 1..=30
    pub fn with_gif_speed(mut self, speed: i32) -> Self {
        self.gif_speed = speed.clamp(1, 30);
        self
    }

    /// Set the decode session options
    pub fn with_decoder_options(mut self, decoder: DecoderOptions) -> Self {
        self.decoder = decoder;
        self
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Output target of an export
pub trait ExportSink {
    /// Short description for logs
    fn name(&self) -> &str;

    /// Called once before any frame or audio
    fn begin(&mut self, info: &StreamInfo, options: &ExportOptions) -> Result<()>;

    /// One complete frame, in order
    fn frame(&mut self, frame: &Frame) -> Result<()>;

    /// A block of unsigned 8-bit PCM
    fn audio(&mut self, _samples: &[u8]) -> Result<()> {
        Ok(())
    }

    /// Flush and close; called on every path once `begin` succeeded
    fn finish(&mut self) -> Result<()>;
}

/// Result of a completed export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    /// Frames written to every sink
    pub frames: u32,
    /// Audio bytes written
    pub audio_bytes: u64,
    /// Playback rate used for frame timing
    pub fps: f64,
    /// Whether the session was stopped before the end of the container
    pub stopped: bool,
    /// Decode statistics
    pub stats: DecodeStats,
}

/// Progress of a running export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportProgress {
    /// Frames exported so far
    pub frames: u32,
    /// Frames announced by the header
    pub frame_count: u16,
}

#[derive(Debug, Clone)]
enum ExportSource {
    File(PathBuf),
    Memory(Arc<[u8]>),
}

/// Decodes a container into a set of sinks
pub struct Exporter {
    name: String,
    source: ExportSource,
    options: ExportOptions,
    sinks: Vec<Box<dyn ExportSink>>,
    started: usize,
    control: PlaybackControl,
    progress: Option<Box<dyn FnMut(ExportProgress)>>,
    info: Option<StreamInfo>,
    frames: u32,
    audio_bytes: u64,
    error: Option<SpidyAniError>,
}

impl Exporter {
    fn new(name: String, source: ExportSource) -> Self {
        Self {
            name,
            source,
            options: ExportOptions::default(),
            sinks: Vec::new(),
            started: 0,
            control: PlaybackControl::new(),
            progress: None,
            info: None,
            frames: 0,
            audio_bytes: 0,
            error: None,
        }
    }

    /// Export the container at `path`
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        // Fail early on a missing file instead of inside the session
        File::open(path)?;
        Ok(Self::new(
            path.display().to_string(),
            ExportSource::File(path.to_path_buf()),
        ))
    }

    /// Export a container held in memory
    pub fn from_bytes(name: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        Self::new(name.into(), ExportSource::Memory(data.into()))
    }

    /// Replace the export settings
    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    /// Add an arbitrary sink
    pub fn add_sink(mut self, sink: Box<dyn ExportSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Write an animated GIF
    pub fn add_gif<P: AsRef<Path>>(self, path: P) -> Result<Self> {
        let sink = GifSink::create(path)?;
        Ok(self.add_sink(Box::new(sink)))
    }

    /// Write one PNG per frame into `dir`
    pub fn add_png_dir<P: AsRef<Path>>(self, dir: P) -> Result<Self> {
        let stem = Path::new(&self.name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("frame")
            .to_string();
        let sink = PngSequenceSink::create(dir, stem)?;
        Ok(self.add_sink(Box::new(sink)))
    }

    /// Write the audio track as WAV
    pub fn add_wav<P: AsRef<Path>>(self, path: P) -> Result<Self> {
        let sink = WavSink::create(path)?;
        Ok(self.add_sink(Box::new(sink)))
    }

    /// Report progress after every frame
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: FnMut(ExportProgress) + 'static,
    {
        self.progress = Some(Box::new(callback));
        self
    }

    /// Handle for stopping the export from another thread
    pub fn control(&self) -> PlaybackControl {
        self.control.clone()
    }

    /// Number of attached sinks
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    fn record_error(&mut self, error: SpidyAniError) {
        if self.error.is_none() {
            log::error!("{}: export failed: {}", self.name, error);
            self.error = Some(error);
        } else {
            log::warn!("{}: additional export error: {}", self.name, error);
        }
    }

    fn finish_sinks(&mut self) {
        let started = std::mem::take(&mut self.started);
        let mut failures = Vec::new();
        for sink in self.sinks.iter_mut().take(started) {
            if let Err(e) = sink.finish() {
                failures.push(e);
            }
        }
        for failure in failures {
            self.record_error(failure);
        }
    }

    /// Decode the whole container into every sink
    ///
    /// Sinks that were started are finished on every path, including errors
    /// and stops.
    pub fn run(mut self) -> Result<ExportReport> {
        let decoder = AnimationDecoder::with_options(self.options.decoder.clone());
        let outcome = decoder.run(&mut self);
        self.finish_sinks();

        if let Some(error) = self.error.take() {
            return Err(error);
        }

        let fps = self.info.as_ref().map_or(crate::FALLBACK_FPS, |info| info.fps);
        let (stats, stopped) = match outcome {
            SessionOutcome::Finished(stats) => (stats, false),
            SessionOutcome::Stopped(stats) => (stats, true),
            SessionOutcome::Failed => {
                return Err(SpidyAniError::Export(format!("{}: decode failed", self.name)))
            }
        };
        log::info!(
            "{}: exported {} frames, {} audio bytes",
            self.name,
            self.frames,
            self.audio_bytes
        );

        Ok(ExportReport {
            frames: self.frames,
            audio_bytes: self.audio_bytes,
            fps,
            stopped,
            stats,
        })
    }
}

impl std::fmt::Debug for Exporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exporter")
            .field("name", &self.name)
            .field("options", &self.options)
            .field("sinks", &self.sinks.iter().map(|s| s.name()).collect::<Vec<_>>())
            .field("frames", &self.frames)
            .finish()
    }
}

impl StreamConsumer for Exporter {
    type Source = Box<dyn Read + Send>;

    fn file_name(&self) -> &str {
        &self.name
    }

    fn new_input_stream(&mut self) -> std::io::Result<Self::Source> {
        Ok(match &self.source {
            ExportSource::File(path) => Box::new(BufReader::new(File::open(path)?)),
            ExportSource::Memory(data) => Box::new(Cursor::new(Arc::clone(data))),
        })
    }

    fn initialize(&mut self, info: &StreamInfo) {
        self.info = Some(info.clone());
        for index in 0..self.sinks.len() {
            let result = self.sinks[index].begin(info, &self.options);
            match result {
                Ok(()) => self.started = index + 1,
                Err(e) => {
                    self.record_error(e);
                    return;
                }
            }
        }
    }

    fn image_data(&mut self, frame: &Frame) {
        if self.error.is_some() {
            return;
        }
        let mut failure = None;
        for sink in &mut self.sinks {
            if let Err(e) = sink.frame(frame) {
                failure = Some(e);
                break;
            }
        }
        if let Some(e) = failure {
            self.record_error(e);
            return;
        }

        self.frames += 1;
        if let Some(progress) = self.progress.as_mut() {
            progress(ExportProgress {
                frames: self.frames,
                frame_count: self.info.as_ref().map_or(0, |info| info.frame_count),
            });
        }
    }

    fn audio_data(&mut self, samples: &[u8]) {
        if self.error.is_some() {
            return;
        }
        let mut failure = None;
        for sink in &mut self.sinks {
            if let Err(e) = sink.audio(samples) {
                failure = Some(e);
                break;
            }
        }
        match failure {
            Some(e) => self.record_error(e),
            None => self.audio_bytes += samples.len() as u64,
        }
    }

    fn is_paused(&self) -> bool {
        self.control.is_paused()
    }

    fn is_stopped(&self) -> bool {
        self.error.is_some() || self.control.is_stopped()
    }

    fn wait_while_paused(&mut self) {
        self.control.wait_while_paused();
    }

    fn fatal(&mut self, error: SpidyAniError) {
        self.record_error(error);
    }

    fn finished(&mut self) {}

    fn stopped(&mut self) {
        if self.error.is_none() {
            log::info!("{}: export stopped after {} frames", self.name, self.frames);
        }
    }
}
