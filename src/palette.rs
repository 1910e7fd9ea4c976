//! Palette table
//!
//! A Palette chunk carries 256 six-bit RGB triples. The table scales each
//! channel to eight bits and packs it as an opaque `0xAARRGGBB` color.

use crate::rle::Resolve;
use crate::{Result, SpidyAniError, PALETTE_ENTRIES, PALETTE_SIZE};

/// Alpha lane of every resolved color
pub const OPAQUE: u32 = 0xFF00_0000;

/// 256-entry color table built from a Palette chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: [u32; PALETTE_ENTRIES],
}

impl Palette {
    /// Build the table from a raw 768-byte chunk payload
    pub fn from_chunk(raw: &[u8; PALETTE_SIZE]) -> Self {
        let mut colors = [OPAQUE; PALETTE_ENTRIES];
        for (color, rgb) in colors.iter_mut().zip(raw.chunks_exact(3)) {
            let r = ((rgb[0] & 0x3F) as u32) << 2;
            let g = ((rgb[1] & 0x3F) as u32) << 2;
            let b = ((rgb[2] & 0x3F) as u32) << 2;
            *color = OPAQUE | (r << 16) | (g << 8) | b;
        }
        Self { colors }
    }

    /// Build the table from a slice, which must hold exactly 768 bytes
    pub fn from_slice(raw: &[u8]) -> Result<Self> {
        let raw: &[u8; PALETTE_SIZE] = raw.try_into().map_err(|_| {
            SpidyAniError::InvalidFrame(format!(
                "palette needs {PALETTE_SIZE} bytes, got {}",
                raw.len()
            ))
        })?;
        Ok(Self::from_chunk(raw))
    }

    /// A grayscale ramp, active until the first Palette chunk arrives
    pub fn grayscale() -> Self {
        let mut raw = [0u8; PALETTE_SIZE];
        for (i, rgb) in raw.chunks_exact_mut(3).enumerate() {
            rgb.fill((i >> 2) as u8);
        }
        Self::from_chunk(&raw)
    }

    /// Color for a palette index
    #[inline]
    pub fn color(&self, index: u8) -> u32 {
        self.colors[index as usize]
    }

    /// All 256 colors
    pub fn colors(&self) -> &[u32; PALETTE_ENTRIES] {
        &self.colors
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::grayscale()
    }
}

impl Resolve for Palette {
    type Output = u32;

    #[inline]
    fn resolve(&self, index: u8) -> u32 {
        self.color(index)
    }
}

/// Split a packed color into `[r, g, b, a]` bytes
#[inline]
pub fn to_rgba(color: u32) -> [u8; 4] {
    [
        (color >> 16) as u8,
        (color >> 8) as u8,
        color as u8,
        (color >> 24) as u8,
    ]
}
