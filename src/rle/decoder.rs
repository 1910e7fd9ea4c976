//! Pixel-run decoding

use super::{Resolve, COUNT_MASK, FILL_BASE, SKIP_BASE};
use crate::{Algorithm, Result, SpidyAniError};

/// Byte cursor over an instruction stream
struct Instructions<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> Instructions<'a> {
    fn next_byte(&mut self) -> Option<u8> {
        let byte = *self.src.get(self.pos)?;
        self.pos += 1;
        Some(byte)
    }

    fn next_u16(&mut self) -> Option<usize> {
        let bytes = self.src.get(self.pos..self.pos + 2)?;
        self.pos += 2;
        Some(u16::from_le_bytes([bytes[0], bytes[1]]) as usize)
    }

    fn next_slice(&mut self, len: usize) -> Option<&'a [u8]> {
        let bytes = self.src.get(self.pos..self.pos + len)?;
        self.pos += len;
        Some(bytes)
    }
}

fn check_room(position: usize, count: usize, capacity: usize) -> Result<()> {
    if position + count > capacity {
        return Err(SpidyAniError::DecodeOverrun {
            position,
            count,
            capacity,
        });
    }
    Ok(())
}

/// Decode a pixel-run stream into `dst`, returning the final cursor
///
/// Decoding ends normally when `dst` is full; trailing input is ignored. When
/// the input runs out first (including in the middle of an instruction) the
/// cursor reached so far is returned and the caller decides whether a short
/// frame matters. An instruction covering more cells than remain fails with
/// [`SpidyAniError::DecodeOverrun`].
pub fn decode_pixels<R: Resolve>(
    src: &[u8],
    dst: &mut [R::Output],
    algorithm: Algorithm,
    resolver: &R,
) -> Result<usize> {
    let mut input = Instructions { src, pos: 0 };
    let capacity = dst.len();
    let mut cursor = 0;

    while cursor < capacity {
        let Some(code) = input.next_byte() else {
            break;
        };

        if code >= FILL_BASE {
            let count = if code == FILL_BASE {
                match input.next_u16() {
                    Some(count) => count,
                    None => break,
                }
            } else {
                (code & COUNT_MASK) as usize
            };
            let Some(index) = input.next_byte() else {
                break;
            };
            check_room(cursor, count, capacity)?;
            dst[cursor..cursor + count].fill(resolver.resolve(index));
            cursor += count;
        } else if code >= SKIP_BASE {
            let count = if code == SKIP_BASE {
                match input.next_u16() {
                    Some(count) => count,
                    None => break,
                }
            } else {
                (code & COUNT_MASK) as usize
            };
            check_room(cursor, count, capacity)?;
            cursor += count;
        } else {
            match algorithm {
                Algorithm::Type1 => {
                    dst[cursor] = resolver.resolve(code);
                    cursor += 1;
                }
                Algorithm::Type2 => {
                    let count = if code == 0 {
                        match input.next_u16() {
                            Some(count) => count,
                            None => break,
                        }
                    } else {
                        code as usize
                    };
                    check_room(cursor, count, capacity)?;
                    // A literal cut short by the end of input still writes what it has
                    let available = count.min(src.len() - input.pos);
                    let Some(indices) = input.next_slice(available) else {
                        break;
                    };
                    for (cell, &index) in dst[cursor..cursor + available].iter_mut().zip(indices) {
                        *cell = resolver.resolve(index);
                    }
                    cursor += available;
                    if available < count {
                        break;
                    }
                }
            }
        }
    }

    Ok(cursor)
}
