//! LZSS decompression
//!
//! The decompressor never fails: it stops as soon as the destination is full
//! or the input runs out, and reports how many bytes it produced.

use super::{MIN_MATCH, WINDOW_MASK, WINDOW_SIZE, WINDOW_START};

/// Decompress `src` into `dst`, returning the number of bytes written
///
/// Decoding stops once `dst` is full, even in the middle of a back-reference,
/// or when `src` is exhausted.
pub fn decompress_into(src: &[u8], dst: &mut [u8]) -> usize {
    let mut window = [0u8; WINDOW_SIZE];
    let mut cursor = WINDOW_START;
    let mut src_pos = 0;
    let mut written = 0;

    while written < dst.len() && src_pos < src.len() {
        let control = src[src_pos];
        src_pos += 1;

        for bit in 0..8 {
            if written >= dst.len() || src_pos >= src.len() {
                return written;
            }

            if control & (1 << bit) != 0 {
                let byte = src[src_pos];
                src_pos += 1;
                dst[written] = byte;
                written += 1;
                window[cursor] = byte;
                cursor = (cursor + 1) & WINDOW_MASK;
            } else {
                if src_pos + 1 >= src.len() {
                    return written;
                }
                let low = src[src_pos] as usize;
                let high = src[src_pos + 1] as usize;
                src_pos += 2;

                let offset = low | ((high & 0xF0) << 4);
                let length = (high & 0x0F) + MIN_MATCH;

                for j in 0..length {
                    if written >= dst.len() {
                        return written;
                    }
                    let byte = window[(offset + j) & WINDOW_MASK];
                    dst[written] = byte;
                    written += 1;
                    window[cursor] = byte;
                    cursor = (cursor + 1) & WINDOW_MASK;
                }
            }
        }
    }

    written
}

/// Decompress `src`, producing at most `expected_len` bytes
pub fn decompress(src: &[u8], expected_len: usize) -> Vec<u8> {
    let mut output = vec![0u8; expected_len];
    let written = decompress_into(src, &mut output);
    output.truncate(written);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literals_only() {
        // Control byte 0xFF: eight literals
        let src = [0xFF, b'S', b'p', b'i', b'd', b'y', b'A', b'n', b'i'];
        assert_eq!(decompress(&src, 8), b"SpidyAni".to_vec());
    }

    #[test]
    fn test_back_reference_into_zero_window() {
        // Offset 0, length 0 + 3: three bytes from the zeroed window
        let src = [0x00, 0x00, 0x00];
        assert_eq!(decompress(&src, 3), vec![0, 0, 0]);
    }

    #[test]
    fn test_overlapping_back_reference() {
        // Literal 'A' lands at 0xFEE; a match at 0xFEE of length 6 repeats it
        let src = [0x01, b'A', 0xEE, 0xF3];
        assert_eq!(decompress(&src, 7), b"AAAAAAA".to_vec());
    }

    #[test]
    fn test_offset_high_nibble() {
        // Eight literals fill 0xFEE..0xFF6; reference 0xFF0 (low 0xF0, high nibble 0xF)
        let mut src = vec![0xFF];
        src.extend_from_slice(b"abcdefgh");
        src.extend_from_slice(&[0x00, 0xF0, 0xF1]);
        assert_eq!(decompress(&src, 12), b"abcdefghcdef".to_vec());
    }

    #[test]
    fn test_stops_when_destination_full() {
        let src = [0x01, b'A', 0xEE, 0xFF];
        let mut dst = [0u8; 4];
        assert_eq!(decompress_into(&src, &mut dst), 4);
        assert_eq!(&dst, b"AAAA");
    }

    #[test]
    fn test_truncated_input() {
        // Back-reference missing its second byte
        let src = [0x01, b'Z', 0x10];
        assert_eq!(decompress(&src, 16), b"Z".to_vec());
        assert!(decompress(&[], 16).is_empty());
    }
}
