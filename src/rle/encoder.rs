//! Pixel-run encoding
//!
//! Greedy encoder for index buffers. Cells equal to the previous frame become
//! skips, repeated indices become fills, and everything else becomes literals
//! in the form the algorithm variant understands.

use super::{COUNT_MASK, FILL_BASE, SKIP_BASE};
use crate::Algorithm;

/// Shortest run worth a skip instruction
const MIN_SKIP: usize = 2;

/// Shortest run worth a fill instruction
const MIN_FILL: usize = 3;

/// Longest count a single instruction can carry
const MAX_COUNT: usize = u16::MAX as usize;

/// Longest TYPE_2 literal run with a one-byte header
const MAX_SHORT_LITERAL: usize = 0x7F;

fn push_counted(out: &mut Vec<u8>, base: u8, count: usize) {
    if count <= COUNT_MASK as usize {
        out.push(base | count as u8);
    } else {
        out.push(base);
        out.extend_from_slice(&(count as u16).to_le_bytes());
    }
}

fn run_length(cells: &[u8], matches: impl Fn(usize) -> bool) -> usize {
    (0..cells.len().min(MAX_COUNT))
        .take_while(|&k| matches(k))
        .count()
}

fn flush_literals(out: &mut Vec<u8>, literals: &mut Vec<u8>) {
    for run in literals.chunks(MAX_COUNT) {
        if run.len() <= MAX_SHORT_LITERAL {
            out.push(run.len() as u8);
        } else {
            out.push(0);
            out.extend_from_slice(&(run.len() as u16).to_le_bytes());
        }
        out.extend_from_slice(run);
    }
    literals.clear();
}

/// Encode an index buffer, optionally against the previous frame
///
/// `previous` is ignored unless it has the same length as `current`.
pub fn encode_indices(current: &[u8], previous: Option<&[u8]>, algorithm: Algorithm) -> Vec<u8> {
    let previous = previous.filter(|prev| prev.len() == current.len());
    let mut out = Vec::with_capacity(current.len() / 2 + 16);
    let mut literals = Vec::new();
    let mut pos = 0;

    while pos < current.len() {
        let rest = &current[pos..];

        if let Some(prev) = previous {
            let prev_rest = &prev[pos..];
            let skip = run_length(rest, |k| rest[k] == prev_rest[k]);
            if skip >= MIN_SKIP {
                flush_literals(&mut out, &mut literals);
                push_counted(&mut out, SKIP_BASE, skip);
                pos += skip;
                continue;
            }
        }

        let fill = run_length(rest, |k| rest[k] == rest[0]);
        if fill >= MIN_FILL {
            flush_literals(&mut out, &mut literals);
            push_counted(&mut out, FILL_BASE, fill);
            out.push(rest[0]);
            pos += fill;
            continue;
        }

        match algorithm {
            Algorithm::Type1 if rest[0] < SKIP_BASE => out.push(rest[0]),
            Algorithm::Type1 => out.extend_from_slice(&[FILL_BASE | 1, rest[0]]),
            Algorithm::Type2 => literals.push(rest[0]),
        }
        pos += 1;
    }

    flush_literals(&mut out, &mut literals);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rle::{decode_pixels, RawIndex};

    #[test]
    fn test_fill_encoding() {
        assert_eq!(encode_indices(&[4; 10], None, Algorithm::Type1), vec![0xCA, 0x04]);
        assert_eq!(
            encode_indices(&[4; 1000], None, Algorithm::Type1),
            vec![0xC0, 0xE8, 0x03, 0x04]
        );
    }

    #[test]
    fn test_unchanged_frame_is_all_skips() {
        let frame: Vec<u8> = (0..100).map(|i| (i % 13) as u8).collect();
        assert_eq!(
            encode_indices(&frame, Some(&frame), Algorithm::Type2),
            vec![0x80, 100, 0]
        );
    }

    #[test]
    fn test_type1_high_index_literal() {
        assert_eq!(
            encode_indices(&[0x10, 0x90], None, Algorithm::Type1),
            vec![0x10, 0xC1, 0x90]
        );
    }

    #[test]
    fn test_type2_literal_run() {
        assert_eq!(
            encode_indices(&[0x10, 0x90, 0xFF], None, Algorithm::Type2),
            vec![0x03, 0x10, 0x90, 0xFF]
        );
    }

    #[test]
    fn test_long_literal_run() {
        let frame: Vec<u8> = (0..400).map(|i| (i % 2) as u8 + (i / 2 % 100) as u8).collect();
        let stream = encode_indices(&frame, None, Algorithm::Type2);
        assert_eq!(stream[0], 0);

        let mut decoded = vec![0u8; frame.len()];
        decode_pixels(&stream, &mut decoded, Algorithm::Type2, &RawIndex).unwrap();
        assert_eq!(decoded, frame);
    }
}
