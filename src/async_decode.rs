//! Async decode sessions
//!
//! The decoder itself is blocking; this module runs a session on Tokio's
//! blocking pool and exposes its events as a [`futures::Stream`].

#[cfg(feature = "async")]
/// Decode events as an async stream
pub mod stream {
    use crate::decode::{
        AnimationDecoder, ChannelConsumer, DecodeEvent, DecoderOptions, EventSink, Frame,
        SessionOutcome,
    };
    use crate::playback::PlaybackControl;
    use crate::{Result, SpidyAniError};
    use futures::Stream;
    use std::io::Read;
    use std::path::{Path, PathBuf};
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::sync::mpsc;
    use tokio::task::JoinHandle;

    impl EventSink for mpsc::Sender<DecodeEvent> {
        fn send_event(&mut self, event: DecodeEvent) -> bool {
            // Runs on the blocking pool, never inside the runtime's workers
            self.blocking_send(event).is_ok()
        }
    }

    /// Events of a session running on the blocking pool
    ///
    /// The stream ends after the terminal event. Dropping it stops the
    /// session at the next chunk boundary.
    #[derive(Debug)]
    pub struct DecodeEventStream {
        receiver: mpsc::Receiver<DecodeEvent>,
        control: PlaybackControl,
        session: Option<JoinHandle<SessionOutcome>>,
    }

    impl DecodeEventStream {
        /// Start a session; must be called within a Tokio runtime
        pub fn spawn<F, R>(
            name: impl Into<String>,
            open: F,
            options: DecoderOptions,
            capacity: usize,
        ) -> Self
        where
            F: FnMut() -> std::io::Result<R> + Send + 'static,
            R: Read,
        {
            let (sender, receiver) = mpsc::channel(capacity.max(1));
            let control = PlaybackControl::new();
            let mut consumer = ChannelConsumer::new(name, open, sender, control.clone());

            let session = tokio::task::spawn_blocking(move || {
                AnimationDecoder::with_options(options).run(&mut consumer)
            });

            Self {
                receiver,
                control,
                session: Some(session),
            }
        }

        /// Decode the container at `path`
        pub fn open<P: AsRef<Path>>(path: P, options: DecoderOptions) -> Self {
            let path: PathBuf = path.as_ref().to_path_buf();
            let name = path.display().to_string();
            Self::spawn(
                name,
                move || std::fs::File::open(&path).map(std::io::BufReader::new),
                options,
                16,
            )
        }

        /// Pause, resume and stop the session
        pub fn control(&self) -> &PlaybackControl {
            &self.control
        }

        /// Stop the session and wait for it to wind down
        pub async fn stop(mut self) -> Option<SessionOutcome> {
            self.control.stop();
            self.receiver.close();
            let session = self.session.take()?;
            session.await.ok()
        }
    }

    impl Stream for DecodeEventStream {
        type Item = DecodeEvent;

        fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<DecodeEvent>> {
            self.get_mut().receiver.poll_recv(cx)
        }
    }

    impl Drop for DecodeEventStream {
        fn drop(&mut self) {
            self.control.stop();
        }
    }

    /// Decode an in-memory container to frames without blocking the runtime
    pub async fn decode_frames_async(data: Vec<u8>) -> Result<Vec<Frame>> {
        tokio::task::spawn_blocking(move || crate::decode_frames(&data))
            .await
            .map_err(|e| SpidyAniError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?
    }
}

#[cfg(feature = "async")]
pub use stream::{decode_frames_async, DecodeEventStream};
