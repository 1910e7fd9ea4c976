//! Real-time playback building blocks
//!
//! Playback is the consumer's job: the orchestrator only polls for pause and
//! stop. These pieces cover the common needs of a playback consumer:
//!
//! - [`PlaybackControl`]: pause/resume/stop shared between threads
//! - [`AvRendezvous`]: one-shot two-party barrier between the video and
//!   audio sides
//! - [`FrameClock`]: absolute per-frame deadlines from a start instant
//! - [`PacedConsumer`]: wraps any consumer and presents frames on time

mod clock;
mod control;
mod paced;
mod rendezvous;

pub use clock::{FrameClock, PlaybackPosition};
pub use control::PlaybackControl;
pub use paced::PacedConsumer;
pub use rendezvous::AvRendezvous;
