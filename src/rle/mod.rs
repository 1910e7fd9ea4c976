//! Palette-indexed pixel-run codec
//!
//! After LZSS, a Data payload is a stream of pixel-run instructions:
//!
//! | code        | meaning                                                |
//! |-------------|--------------------------------------------------------|
//! | `0xC0`      | fill, 16-bit count and one index byte follow           |
//! | `0xC1-0xFF` | fill `code & 0x3F` cells, one index byte follows       |
//! | `0x80`      | skip, 16-bit count follows                             |
//! | `0x81-0xBF` | skip `code & 0x3F` cells                               |
//! | `0x00-0x7F` | TYPE_1: one pixel of index `code`                      |
//! |             | TYPE_2: literal run of `code` raw indices (`0`: 16-bit) |
//!
//! Skipped cells keep whatever the destination already holds, which is how
//! delta frames leave unchanged regions alone.

mod decoder;
mod encoder;

pub use decoder::decode_pixels;
pub use encoder::encode_indices;

/// First fill code
pub const FILL_BASE: u8 = 0xC0;

/// First skip code
pub const SKIP_BASE: u8 = 0x80;

/// Mask extracting the short count from fill and skip codes
pub const COUNT_MASK: u8 = 0x3F;

/// Turns a palette index into the value stored in the destination buffer
pub trait Resolve {
    /// Destination cell type
    type Output: Copy;

    /// Resolve one index
    fn resolve(&self, index: u8) -> Self::Output;
}

/// Resolution mode that stores raw palette indices
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawIndex;

impl Resolve for RawIndex {
    type Output = u8;

    #[inline]
    fn resolve(&self, index: u8) -> u8 {
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Algorithm;

    #[test]
    fn test_encoded_frame_decodes_back() {
        let previous: Vec<u8> = (0..64u8).collect();
        let mut current = previous.clone();
        current[10..30].fill(0x90);
        current[40] = 0x05;

        for algorithm in [Algorithm::Type1, Algorithm::Type2] {
            let stream = encode_indices(&current, Some(&previous), algorithm);
            let mut frame = previous.clone();
            let end = decode_pixels(&stream, &mut frame, algorithm, &RawIndex).unwrap();
            assert_eq!(end, frame.len());
            assert_eq!(frame, current, "{algorithm:?}");
        }
    }
}
