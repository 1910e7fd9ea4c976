//! LZSS sliding-window codec
//!
//! Data payloads are compressed with a classic 4 KiB window LZSS: one control
//! byte announces eight items, least-significant bit first; a set bit is a
//! literal byte and a clear bit a two-byte back-reference into the window.
//! The stream carries no end marker, so the decompressor is driven by the
//! expected output length stored in the chunk.

mod decoder;
mod encoder;

pub use decoder::{decompress, decompress_into};
pub use encoder::compress;

/// Window size (4096 bytes)
pub const WINDOW_SIZE: usize = 0x1000;

/// Mask for window positions
pub const WINDOW_MASK: usize = WINDOW_SIZE - 1;

/// Initial write cursor inside the zeroed window
pub const WINDOW_START: usize = 0xFEE;

/// Shortest back-reference length
pub const MIN_MATCH: usize = 3;

/// Longest back-reference length (4-bit length field + 3)
pub const MAX_MATCH: usize = 0x0F + MIN_MATCH;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_constants() {
        assert_eq!(WINDOW_START, 4078);
        assert_eq!(MAX_MATCH, 18);
        assert_eq!(WINDOW_MASK, 0xFFF);
    }

    #[test]
    fn test_round_trip_text() {
        let data = b"Spidy frames repeat, frames repeat, frames repeat forever.";
        let packed = compress(data);
        assert!(packed.len() < data.len());
        assert_eq!(decompress(&packed, data.len()), data.to_vec());
    }

    #[test]
    fn test_round_trip_empty() {
        assert!(compress(&[]).is_empty());
        assert!(decompress(&[], 0).is_empty());
    }
}
