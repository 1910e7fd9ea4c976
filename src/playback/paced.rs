//! Real-time pacing adapter

use super::{FrameClock, PlaybackPosition};
use crate::decode::{Frame, StreamConsumer, StreamInfo};
use crate::SpidyAniError;

/// Presents frames at the stream rate
///
/// Wraps another consumer and sleeps before each `image_data` until the
/// frame's deadline. Everything else is forwarded unchanged. Time spent paused
/// is not caught up afterwards.
#[derive(Debug)]
pub struct PacedConsumer<C> {
    inner: C,
    clock: Option<FrameClock>,
    fps: f64,
    paused: bool,
}

impl<C: StreamConsumer> PacedConsumer<C> {
    /// Pace `inner`
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            clock: None,
            fps: crate::FALLBACK_FPS,
            paused: false,
        }
    }

    /// The wrapped consumer
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// The wrapped consumer, mutably
    pub fn inner_mut(&mut self) -> &mut C {
        &mut self.inner
    }

    /// Unwrap the consumer
    pub fn into_inner(self) -> C {
        self.inner
    }

    /// Position of the next frame to present
    pub fn position(&self) -> PlaybackPosition {
        PlaybackPosition {
            frame_index: self.clock.as_ref().map_or(0, FrameClock::frames),
            fps: self.fps,
        }
    }
}

impl<C: StreamConsumer> StreamConsumer for PacedConsumer<C> {
    type Source = C::Source;

    fn file_name(&self) -> &str {
        self.inner.file_name()
    }

    fn new_input_stream(&mut self) -> std::io::Result<Self::Source> {
        self.inner.new_input_stream()
    }

    fn initialize(&mut self, info: &StreamInfo) {
        self.fps = info.fps;
        self.inner.initialize(info);
    }

    fn image_data(&mut self, frame: &Frame) {
        // The schedule starts at the first frame, after the rendezvous
        let clock = self.clock.get_or_insert_with(|| FrameClock::new(self.fps));
        if self.paused {
            clock.rebase();
            self.paused = false;
        }
        clock.wait();
        self.inner.image_data(frame);
    }

    fn audio_data(&mut self, samples: &[u8]) {
        self.inner.audio_data(samples);
    }

    fn is_paused(&self) -> bool {
        self.inner.is_paused()
    }

    fn is_stopped(&self) -> bool {
        self.inner.is_stopped()
    }

    fn wait_while_paused(&mut self) {
        self.paused = true;
        self.inner.wait_while_paused();
    }

    fn rendezvous(&mut self) {
        self.inner.rendezvous();
    }

    fn fatal(&mut self, error: SpidyAniError) {
        self.inner.fatal(error);
    }

    fn finished(&mut self) {
        self.inner.finished();
    }

    fn stopped(&mut self) {
        self.inner.stopped();
    }
}
