//! AnimationDecoder - Callback-driven decode sessions
//!
//! Drives a [`FrameDecoder`] against a [`StreamConsumer`], polling for pause
//! and stop before every chunk.

use super::{DecodeStep, FrameDecoder, StreamConsumer, StreamInfo};
use crate::container::ContainerSummary;
use crate::{DecodeStats, Result, FALLBACK_FPS};

/// Options for a decode session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderOptions {
    /// Scan the whole container first to derive fps and the audio delay
    pub prescan: bool,
    /// Fixed audio delay in frames, overriding the scanned value
    pub audio_frame_delay: Option<u32>,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            prescan: true,
            audio_frame_delay: None,
        }
    }
}

impl DecoderOptions {
    /// Enable or disable the pre-scan pass
    pub fn with_prescan(mut self, prescan: bool) -> Self {
        self.prescan = prescan;
        self
    }

    /// Use a fixed audio delay
    pub fn with_audio_frame_delay(mut self, frames: u32) -> Self {
        self.audio_frame_delay = Some(frames);
        self
    }
}

/// How a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Decoded to the end of the container
    Finished(DecodeStats),
    /// Cancelled through `is_stopped()`
    Stopped(DecodeStats),
    /// Ended by an error, already reported through `fatal()`
    Failed,
}

/// Decode session driver
#[derive(Debug, Clone, Default)]
pub struct AnimationDecoder {
    options: DecoderOptions,
}

impl AnimationDecoder {
    /// Create a decoder with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder with the given options
    pub fn with_options(options: DecoderOptions) -> Self {
        Self { options }
    }

    /// Session options
    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    /// Run one session to completion on the calling thread
    ///
    /// The source is dropped before the terminal callback on every path.
    pub fn run<C: StreamConsumer + ?Sized>(&self, consumer: &mut C) -> SessionOutcome {
        if consumer.is_stopped() {
            log::debug!("{}: stopped before start", consumer.file_name());
            consumer.stopped();
            return SessionOutcome::Stopped(DecodeStats::default());
        }

        match self.stream(consumer) {
            Ok(SessionOutcome::Finished(stats)) => {
                log::debug!(
                    "{}: finished after {} frames",
                    consumer.file_name(),
                    stats.frames
                );
                consumer.finished();
                SessionOutcome::Finished(stats)
            }
            Ok(SessionOutcome::Stopped(stats)) => {
                log::debug!(
                    "{}: stopped after {} frames",
                    consumer.file_name(),
                    stats.frames
                );
                consumer.stopped();
                SessionOutcome::Stopped(stats)
            }
            Ok(SessionOutcome::Failed) => SessionOutcome::Failed,
            Err(e) => {
                log::error!("{}: {}", consumer.file_name(), e);
                consumer.fatal(e);
                SessionOutcome::Failed
            }
        }
    }

    fn stream<C: StreamConsumer + ?Sized>(&self, consumer: &mut C) -> Result<SessionOutcome> {
        let mut decoder = FrameDecoder::new(consumer.new_input_stream()?)?;
        let header = *decoder.header();

        let (fps, scanned_delay) = if self.options.prescan {
            // A broken chunk is left for the decode pass to report, after the
            // frames before it have been delivered
            let (summary, error) = ContainerSummary::scan_lenient(consumer.new_input_stream()?)?;
            if let Some(e) = error {
                log::warn!("{}: pre-scan stopped early: {}", consumer.file_name(), e);
            }
            (summary.fps(), summary.audio_frame_delay())
        } else {
            (FALLBACK_FPS, 0)
        };

        let info = StreamInfo {
            width: header.width,
            height: header.height,
            frame_count: header.frame_count,
            language_code: header.language_code,
            fps,
            audio_frame_delay: self.options.audio_frame_delay.unwrap_or(scanned_delay),
            algorithm: header.algorithm(),
            uses_lzss: header.uses_lzss(),
            partial_data: header.partial_data(),
        };
        log::debug!(
            "{}: streaming {}x{} at {:.2} fps, audio delay {} frames",
            consumer.file_name(),
            info.width,
            info.height,
            info.fps,
            info.audio_frame_delay
        );
        consumer.initialize(&info);

        let mut met_audio = false;
        loop {
            while consumer.is_paused() && !consumer.is_stopped() {
                consumer.wait_while_paused();
            }
            if consumer.is_stopped() {
                return Ok(SessionOutcome::Stopped(decoder.stats().clone()));
            }

            match decoder.step()? {
                DecodeStep::Frame(frame) => {
                    if !met_audio {
                        consumer.rendezvous();
                        met_audio = true;
                    }
                    consumer.image_data(&frame);
                }
                DecodeStep::Audio(samples) => consumer.audio_data(&samples),
                DecodeStep::Consumed => {}
                DecodeStep::End => return Ok(SessionOutcome::Finished(decoder.stats().clone())),
            }
        }
    }
}
