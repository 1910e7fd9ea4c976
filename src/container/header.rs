//! Fixed 19-byte container header

use crate::{
    Algorithm, Result, SpidyAniError, FLAG_COMPRESSED, FLAG_LZSS, HEADER_SIZE, MAGIC,
    PARTIAL_DATA_THRESHOLD, VERSION,
};
use std::io::Read;

use super::read_exact_or_eos;

/// Parsed container header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Raw flag bits
    pub flags: u16,
    /// Number of logical frames
    pub frame_count: u16,
    /// Frame width in pixels
    pub width: u16,
    /// Frame height in pixels
    pub height: u16,
    /// Language the embedded audio was recorded in
    pub language_code: u16,
}

impl Header {
    /// Create a header for a compressed container
    pub fn new(
        width: u16,
        height: u16,
        frame_count: u16,
        algorithm: Algorithm,
        uses_lzss: bool,
    ) -> Self {
        let mut flags = FLAG_COMPRESSED | algorithm.flag_bits();
        if uses_lzss {
            flags |= FLAG_LZSS;
        }
        Self {
            flags,
            frame_count,
            width,
            height,
            language_code: 0,
        }
    }

    /// Set the language code
    pub fn with_language_code(mut self, language_code: u16) -> Self {
        self.language_code = language_code;
        self
    }

    /// Pixel-run variant
    pub fn algorithm(&self) -> Algorithm {
        Algorithm::from_flags(self.flags)
    }

    /// Whether Data payloads are LZSS-compressed (and carry a pre-LZSS length)
    pub fn uses_lzss(&self) -> bool {
        self.flags & FLAG_LZSS != 0
    }

    /// Whether the compressed flag is set
    pub fn is_compressed(&self) -> bool {
        self.flags & FLAG_COMPRESSED != 0
    }

    /// Number of cells in one frame
    pub fn frame_cells(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Whether frames are split across several Data chunks
    pub fn partial_data(&self) -> bool {
        self.frame_cells() > PARTIAL_DATA_THRESHOLD
    }

    /// Parse and validate the raw header bytes
    pub fn parse(bytes: &[u8; HEADER_SIZE]) -> Result<Self> {
        let mut magic = [0u8; 8];
        magic.copy_from_slice(&bytes[0..8]);
        if &magic != MAGIC {
            return Err(SpidyAniError::Format(magic));
        }

        let version = bytes[8].wrapping_sub(b'0');
        if version != VERSION {
            return Err(SpidyAniError::UnsupportedVersion(version));
        }

        let field = |at: usize| u16::from_le_bytes([bytes[at], bytes[at + 1]]);
        let header = Self {
            flags: field(9),
            frame_count: field(11),
            width: field(13),
            height: field(15),
            language_code: field(17),
        };

        if !header.is_compressed() {
            return Err(SpidyAniError::UnsupportedFormat(header.flags));
        }

        Ok(header)
    }

    /// Serialize the header
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..8].copy_from_slice(MAGIC);
        bytes[8] = b'0' + VERSION;
        bytes[9..11].copy_from_slice(&self.flags.to_le_bytes());
        bytes[11..13].copy_from_slice(&self.frame_count.to_le_bytes());
        bytes[13..15].copy_from_slice(&self.width.to_le_bytes());
        bytes[15..17].copy_from_slice(&self.height.to_le_bytes());
        bytes[17..19].copy_from_slice(&self.language_code.to_le_bytes());
        bytes
    }
}

/// Read and validate the header at the start of `reader`
pub fn read_header<R: Read>(reader: &mut R) -> Result<Header> {
    let mut bytes = [0u8; HEADER_SIZE];
    read_exact_or_eos(reader, &mut bytes, "header")?;
    Header::parse(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bytes() -> [u8; HEADER_SIZE] {
        let raw = hex::decode("5370696479416e6932250014000001c8000200").unwrap();
        raw.try_into().unwrap()
    }

    #[test]
    fn test_parse_fields() {
        let header = Header::parse(&sample_bytes()).unwrap();
        assert_eq!(header.flags, 0x0025);
        assert_eq!(header.frame_count, 20);
        assert_eq!(header.width, 0x100);
        assert_eq!(header.height, 200);
        assert_eq!(header.language_code, 2);
        assert_eq!(header.algorithm(), Algorithm::Type2);
        assert!(header.uses_lzss());
        assert!(!header.partial_data());
    }

    #[test]
    fn test_round_trip_bytes() {
        let header = Header::new(640, 480, 12, Algorithm::Type1, false).with_language_code(3);
        let parsed = Header::parse(&header.to_bytes()).unwrap();
        assert_eq!(parsed, header);
        assert!(parsed.partial_data());
        assert_eq!(parsed.algorithm(), Algorithm::Type1);
        assert!(!parsed.uses_lzss());
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = sample_bytes();
        bytes[0] = b'X';
        assert!(matches!(Header::parse(&bytes), Err(SpidyAniError::Format(m)) if &m == b"XpidyAni"));
    }

    #[test]
    fn test_bad_version() {
        let mut bytes = sample_bytes();
        bytes[8] = b'3';
        assert!(matches!(
            Header::parse(&bytes),
            Err(SpidyAniError::UnsupportedVersion(3))
        ));
    }

    #[test]
    fn test_uncompressed_rejected() {
        let mut bytes = sample_bytes();
        bytes[9] = 0x24;
        assert!(matches!(
            Header::parse(&bytes),
            Err(SpidyAniError::UnsupportedFormat(0x0024))
        ));
    }

    #[test]
    fn test_short_header() {
        let mut cursor = std::io::Cursor::new(&b"SpidyAni2"[..]);
        assert!(matches!(
            read_header(&mut cursor),
            Err(SpidyAniError::EndOfStream("header"))
        ));
    }
}
