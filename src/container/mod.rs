//! SpidyAni container format
//!
//! A container is a 19-byte header followed by tagged chunks until the end of
//! the source:
//!
//! - `"Pal "`: 768 bytes, 256 six-bit RGB triples
//! - `"Hang"`: 1270 bytes of 22050 Hz mono 8-bit PCM
//! - `"Data"`: frame payload, LZSS and/or pixel-run encoded
//!
//! All multi-byte integers are little-endian.

mod chunk;
mod header;
mod reader;
mod summary;
mod writer;

pub use chunk::{Chunk, DataChunk};
pub use header::{read_header, Header};
pub use reader::ChunkReader;
pub use summary::ContainerSummary;
pub use writer::AnimationWriter;

use crate::{Result, SpidyAniError};
use std::io::{ErrorKind, Read};

/// `read_exact` that reports truncation as [`SpidyAniError::EndOfStream`]
pub(crate) fn read_exact_or_eos<R: Read>(
    reader: &mut R,
    buf: &mut [u8],
    context: &'static str,
) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => SpidyAniError::EndOfStream(context),
        _ => SpidyAniError::Io(e),
    })
}

pub(crate) fn read_u16<R: Read>(reader: &mut R, context: &'static str) -> Result<u16> {
    let mut bytes = [0u8; 2];
    read_exact_or_eos(reader, &mut bytes, context)?;
    Ok(u16::from_le_bytes(bytes))
}
