//! Reference LZSS compressor
//!
//! A greedy encoder over the stream the decompressor sees: the zeroed initial
//! window followed by the input. Back-references may point into the zero fill
//! or overlap the match being written. Candidates come from hash-head chains
//! keyed on the next three bytes, so each position checks a bounded number of
//! earlier occurrences instead of the whole window.

use super::{MAX_MATCH, MIN_MATCH, WINDOW_MASK, WINDOW_SIZE, WINDOW_START};

/// Hash table size (12-bit hash of three bytes)
const HASH_SIZE: usize = 0x1000;

/// Longest chain walked per position
const MAX_CHAIN: usize = 128;

/// Empty chain link
const NIL: usize = usize::MAX;

fn triple_hash(bytes: &[u8]) -> usize {
    ((usize::from(bytes[0]) << 8) ^ (usize::from(bytes[1]) << 4) ^ usize::from(bytes[2]))
        & (HASH_SIZE - 1)
}

/// Hash-head chains over positions of the virtual stream
///
/// Position `v` of the virtual stream sits in window slot
/// `(WINDOW_START + v) & WINDOW_MASK`; the first `WINDOW_SIZE` positions are
/// the zero fill.
struct MatchFinder {
    head: Vec<usize>,
    prev: Vec<usize>,
}

impl MatchFinder {
    fn new() -> Self {
        Self {
            head: vec![NIL; HASH_SIZE],
            prev: vec![NIL; WINDOW_SIZE],
        }
    }

    fn insert(&mut self, stream: &[u8], pos: usize) {
        if pos + MIN_MATCH > stream.len() {
            return;
        }
        let hash = triple_hash(&stream[pos..]);
        self.prev[pos & WINDOW_MASK] = self.head[hash];
        self.head[hash] = pos;
    }

    /// Longest match for `stream[pos..]`, as (start, length)
    fn find(&self, stream: &[u8], pos: usize) -> Option<(usize, usize)> {
        let limit = (stream.len() - pos).min(MAX_MATCH);
        if limit < MIN_MATCH {
            return None;
        }

        let mut best: Option<(usize, usize)> = None;
        let mut candidate = self.head[triple_hash(&stream[pos..])];
        for _ in 0..MAX_CHAIN {
            if candidate == NIL || candidate + WINDOW_SIZE < pos {
                break;
            }

            let length = (0..limit)
                .take_while(|&j| stream[candidate + j] == stream[pos + j])
                .count();
            if length >= MIN_MATCH && best.map_or(true, |(_, best_len)| length > best_len) {
                best = Some((candidate, length));
                if length == limit {
                    break;
                }
            }

            // A slot reused by a newer position ends the chain
            let next = self.prev[candidate & WINDOW_MASK];
            if next == NIL || next >= candidate {
                break;
            }
            candidate = next;
        }
        best
    }
}

/// Compress `data` into an LZSS stream readable by [`super::decompress`]
pub fn compress(data: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(data.len() + data.len() / 8 + 1);
    if data.is_empty() {
        return output;
    }

    let mut stream = vec![0u8; WINDOW_SIZE];
    stream.extend_from_slice(data);

    let mut finder = MatchFinder::new();
    for pos in 0..WINDOW_SIZE {
        finder.insert(&stream, pos);
    }

    let mut pos = WINDOW_SIZE;
    while pos < stream.len() {
        let control_index = output.len();
        output.push(0u8);

        for bit in 0..8 {
            if pos >= stream.len() {
                break;
            }

            let advance = match finder.find(&stream, pos) {
                Some((start, length)) => {
                    let offset = (WINDOW_START + start) & WINDOW_MASK;
                    output.push((offset & 0xFF) as u8);
                    output.push((((offset >> 4) & 0xF0) | (length - MIN_MATCH)) as u8);
                    length
                }
                None => {
                    output[control_index] |= 1 << bit;
                    output.push(stream[pos]);
                    1
                }
            };
            for _ in 0..advance {
                finder.insert(&stream, pos);
                pos += 1;
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::super::decompress;
    use super::*;

    #[test]
    fn test_zero_run_uses_initial_window() {
        let data = [0u8; 18];
        let packed = compress(&data);
        // One control byte plus a single back-reference
        assert_eq!(packed.len(), 3);
        assert_eq!(decompress(&packed, data.len()), data.to_vec());
    }

    #[test]
    fn test_overlapping_match() {
        let data = b"xyzxyzxyzxyzxyzxyzxyz";
        let packed = compress(data);
        assert!(packed.len() < data.len());
        assert_eq!(decompress(&packed, data.len()), data.to_vec());
    }

    #[test]
    fn test_incompressible_data() {
        let data: Vec<u8> = (1..=200u8).collect();
        let packed = compress(&data);
        assert_eq!(decompress(&packed, data.len()), data);
    }

    #[test]
    fn test_window_wraps() {
        let data: Vec<u8> = (0..10_000u32)
            .map(|i| (i.wrapping_mul(2_654_435_761) >> 24) as u8)
            .chain(std::iter::repeat(7u8).take(500))
            .collect();
        let packed = compress(&data);
        assert_eq!(decompress(&packed, data.len()), data);
    }

    #[test]
    fn test_large_input_round_trip() {
        // A full 64 KiB band of banded, mostly repetitive indices
        let data: Vec<u8> = (0..65_536u32)
            .map(|i| if i % 97 == 0 { (i >> 3) as u8 } else { (i / 320 % 16) as u8 })
            .collect();
        let packed = compress(&data);
        assert!(packed.len() < data.len() / 4);
        assert_eq!(decompress(&packed, data.len()), data);
    }

    #[test]
    fn test_match_reaches_oldest_window_byte() {
        // The repeat starts exactly one window after the original
        let head: Vec<u8> = (0..WINDOW_SIZE as u32)
            .map(|i| (i.wrapping_mul(2_654_435_761) >> 24) as u8)
            .collect();
        let mut data = head.clone();
        data.extend_from_slice(&head[..MAX_MATCH]);
        let packed = compress(&data);
        assert_eq!(decompress(&packed, data.len()), data);
    }
}
