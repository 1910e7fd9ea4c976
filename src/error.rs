//! Error handling for SpidyAni operations
//!
//! This module defines the error types used throughout the decoder, the
//! encoders, and the export consumers. It uses thiserror for ergonomic error
//! handling and provides context-specific error variants.

pub use crate::common::Result;
pub use crate::common::SpidyAniError;
