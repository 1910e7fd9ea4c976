//! Event channel - decode sessions as a stream of events
//!
//! A session runs on a producer thread and sends [`DecodeEvent`] values over a
//! bounded channel, so the receiving side can pull at its own pace. A full
//! channel blocks the producer; dropping the receiver stops the session at the
//! next chunk boundary and waits for the producer thread to exit.

use super::{AnimationDecoder, DecodeEvent, DecoderOptions, Frame, SessionOutcome};
use super::{StreamConsumer, StreamInfo};
use crate::playback::PlaybackControl;
use crate::SpidyAniError;
use std::io::Read;
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::thread::JoinHandle;
use std::time::Duration;

/// Destination for session events
pub(crate) trait EventSink {
    /// Deliver an event; `false` when the receiving side is gone
    fn send_event(&mut self, event: DecodeEvent) -> bool;
}

impl EventSink for SyncSender<DecodeEvent> {
    fn send_event(&mut self, event: DecodeEvent) -> bool {
        self.send(event).is_ok()
    }
}

/// Consumer forwarding every callback as an event
pub(crate) struct ChannelConsumer<F, S> {
    name: String,
    open: F,
    sink: S,
    control: PlaybackControl,
    disconnected: bool,
}

impl<F, S> ChannelConsumer<F, S> {
    pub(crate) fn new(name: impl Into<String>, open: F, sink: S, control: PlaybackControl) -> Self {
        Self {
            name: name.into(),
            open,
            sink,
            control,
            disconnected: false,
        }
    }
}

impl<F, S> ChannelConsumer<F, S>
where
    S: EventSink,
{
    fn forward(&mut self, event: DecodeEvent) {
        if !self.disconnected && !self.sink.send_event(event) {
            log::debug!("{}: event receiver dropped", self.name);
            self.disconnected = true;
        }
    }
}

impl<F, R, S> StreamConsumer for ChannelConsumer<F, S>
where
    F: FnMut() -> std::io::Result<R>,
    R: Read,
    S: EventSink,
{
    type Source = R;

    fn file_name(&self) -> &str {
        &self.name
    }

    fn new_input_stream(&mut self) -> std::io::Result<R> {
        (self.open)()
    }

    fn initialize(&mut self, info: &StreamInfo) {
        self.forward(DecodeEvent::Initialized(info.clone()));
    }

    fn image_data(&mut self, frame: &Frame) {
        self.forward(DecodeEvent::Frame(frame.clone()));
    }

    fn audio_data(&mut self, samples: &[u8]) {
        self.forward(DecodeEvent::Audio(samples.to_vec()));
    }

    fn is_paused(&self) -> bool {
        self.control.is_paused()
    }

    fn is_stopped(&self) -> bool {
        self.disconnected || self.control.is_stopped()
    }

    fn wait_while_paused(&mut self) {
        self.control.wait_while_paused();
    }

    fn fatal(&mut self, error: SpidyAniError) {
        self.forward(DecodeEvent::Fatal(error));
    }

    fn finished(&mut self) {
        self.forward(DecodeEvent::Finished);
    }

    fn stopped(&mut self) {
        self.forward(DecodeEvent::Stopped);
    }
}

/// Receiving end of a session running on a producer thread
#[derive(Debug)]
pub struct EventChannel {
    receiver: Receiver<DecodeEvent>,
    control: PlaybackControl,
    producer: Option<JoinHandle<SessionOutcome>>,
}

impl EventChannel {
    /// Pause, resume and stop the producer
    pub fn control(&self) -> &PlaybackControl {
        &self.control
    }

    /// Block for the next event; `None` once the session has ended
    pub fn recv(&self) -> Option<DecodeEvent> {
        self.receiver.recv().ok()
    }

    /// Wait up to `timeout` for the next event
    pub fn recv_timeout(&self, timeout: Duration) -> Option<DecodeEvent> {
        self.receiver.recv_timeout(timeout).ok()
    }

    /// Stop the session and wait for the producer thread
    ///
    /// Events still queued are discarded.
    pub fn stop(mut self) -> Option<SessionOutcome> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Option<SessionOutcome> {
        self.control.stop();
        while self.receiver.try_recv().is_ok() {}
        let producer = self.producer.take()?;
        // The producer may be blocked on a full channel; keep draining until it exits
        while !producer.is_finished() {
            let _ = self.receiver.recv_timeout(Duration::from_millis(5));
        }
        producer.join().ok()
    }
}

impl Iterator for EventChannel {
    type Item = DecodeEvent;

    fn next(&mut self) -> Option<DecodeEvent> {
        self.recv()
    }
}

impl Drop for EventChannel {
    fn drop(&mut self) {
        if let Some(SessionOutcome::Failed) = self.shutdown() {
            log::debug!("Dropped event channel after a failed session");
        }
    }
}

/// Run a session on a new thread, delivering events over a bounded channel
///
/// `open` is called for every stream the session needs (pre-scan and decode).
pub fn spawn_event_channel<F, R>(
    name: impl Into<String>,
    open: F,
    options: DecoderOptions,
    capacity: usize,
) -> std::io::Result<EventChannel>
where
    F: FnMut() -> std::io::Result<R> + Send + 'static,
    R: Read,
{
    let name = name.into();
    let (sender, receiver) = sync_channel(capacity.max(1));
    let control = PlaybackControl::new();
    let mut consumer = ChannelConsumer::new(name.clone(), open, sender, control.clone());

    let producer = std::thread::Builder::new()
        .name(format!("spidyani-decode-{name}"))
        .spawn(move || AnimationDecoder::with_options(options).run(&mut consumer))?;

    Ok(EventChannel {
        receiver,
        control,
        producer: Some(producer),
    })
}
