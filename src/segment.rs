//! Data segments and the mode classification of text payloads.

use crate::bit_buffer::BitBuffer;
use crate::error::{QrError, Result};
use crate::version::Version;

/// The 45 characters encodable in alphanumeric mode, in code order.
pub static ALPHANUMERIC_CHARSET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

/// Describes how a segment's data bits are interpreted.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum SegmentMode {
    Numeric,
    Alphanumeric,
    Byte,
    Kanji,
    Eci,
}

impl SegmentMode {
    /// The 4-bit mode indicator.
    pub fn mode_bits(self) -> u32 {
        match self {
            SegmentMode::Numeric => 0x1,
            SegmentMode::Alphanumeric => 0x2,
            SegmentMode::Byte => 0x4,
            SegmentMode::Kanji => 0x8,
            SegmentMode::Eci => 0x7,
        }
    }

    /// Width of the character count field at the given version.
    pub fn num_char_count_bits(self, ver: Version) -> u8 {
        let widths: [u8; 3] = match self {
            SegmentMode::Numeric => [10, 12, 14],
            SegmentMode::Alphanumeric => [9, 11, 13],
            SegmentMode::Byte => [8, 16, 16],
            SegmentMode::Kanji => [8, 10, 12],
            SegmentMode::Eci => [0, 0, 0],
        };
        // Tiers: versions 1-9, 10-26, 27-40
        widths[usize::from((ver.value() + 7) / 17)]
    }
}

/// A segment of character/binary/control data in a QR Code symbol.
///
/// Immutable once built. The mid-level way to create one is with a factory such as
/// [`QrSegment::make_numeric`]; [`QrSegment::make_segments`] picks the mode for you.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QrSegment {
    mode: SegmentMode,
    numchars: usize,
    data: BitBuffer,
}

impl QrSegment {
    /// Creates a segment from raw parts. `numchars` counts characters for text modes,
    /// bytes for byte mode and is zero for ECI.
    pub fn new(mode: SegmentMode, numchars: usize, data: BitBuffer) -> Self {
        Self { mode, numchars, data }
    }

    /// Byte mode: each byte becomes 8 bits verbatim.
    pub fn make_bytes(data: &[u8]) -> Self {
        let mut bb = BitBuffer::new();
        for &b in data {
            bb.append_byte(b);
        }
        QrSegment::new(SegmentMode::Byte, data.len(), bb)
    }

    /// Numeric mode: groups of 3/2/1 digits become 10/7/4-bit fields.
    pub fn make_numeric(text: &str) -> Result<Self> {
        if !Self::is_numeric(text) {
            return Err(QrError::invalid("String contains non-numeric characters"));
        }
        let mut bb = BitBuffer::new();
        for chunk in text.as_bytes().chunks(3) {
            let value = chunk
                .iter()
                .fold(0u32, |acc, &b| acc * 10 + u32::from(b - b'0'));
            bb.append_bits(value, chunk.len() as u8 * 3 + 1)?;
        }
        Ok(QrSegment::new(SegmentMode::Numeric, text.len(), bb))
    }

    /// Alphanumeric mode: pairs become 11-bit fields (`45 * first + second`), a trailing
    /// single character a 6-bit field.
    pub fn make_alphanumeric(text: &str) -> Result<Self> {
        let indices = text
            .chars()
            .map(|c| {
                ALPHANUMERIC_CHARSET.find(c).map(|i| i as u32).ok_or_else(|| {
                    QrError::invalid("String contains unencodable characters in alphanumeric mode")
                })
            })
            .collect::<Result<Vec<u32>>>()?;
        let mut bb = BitBuffer::new();
        for pair in indices.chunks(2) {
            match *pair {
                [first, second] => bb.append_bits(first * 45 + second, 11)?,
                [single] => bb.append_bits(single, 6)?,
                _ => unreachable!(),
            }
        }
        Ok(QrSegment::new(SegmentMode::Alphanumeric, indices.len(), bb))
    }

    /// Creates an Extended Channel Interpretation (ECI) designator segment.
    pub fn make_eci(assignval: u32) -> Result<Self> {
        let mut bb = BitBuffer::new();
        if assignval < 1 << 7 {
            bb.append_bits(assignval, 8)?;
        } else if assignval < 1 << 14 {
            bb.append_bits(0b10, 2)?;
            bb.append_bits(assignval, 14)?;
        } else if assignval < 1_000_000 {
            bb.append_bits(0b110, 3)?;
            bb.append_bits(assignval, 21)?;
        } else {
            return Err(QrError::invalid("ECI assignment value out of range"));
        }
        Ok(QrSegment::new(SegmentMode::Eci, 0, bb))
    }

    /// Classifies the whole of `text` as numeric, alphanumeric or byte (UTF-8), in
    /// that order of preference. Empty text yields no segments.
    pub fn make_segments(text: &str) -> Vec<Self> {
        if text.is_empty() {
            return Vec::new();
        }
        let seg = if Self::is_numeric(text) {
            Self::make_numeric(text)
        } else if Self::is_alphanumeric(text) {
            Self::make_alphanumeric(text)
        } else {
            Ok(Self::make_bytes(text.as_bytes()))
        };
        // Classification guarantees the charset checks pass
        seg.into_iter().collect()
    }

    pub fn mode(&self) -> SegmentMode {
        self.mode
    }

    pub fn num_chars(&self) -> usize {
        self.numchars
    }

    pub fn data(&self) -> &BitBuffer {
        &self.data
    }

    /// Bits needed to encode the segments at `version`, including mode indicators and
    /// count fields. `None` if a count does not fit its field or the sum exceeds `i32::MAX`.
    pub fn get_total_bits(segs: &[Self], version: Version) -> Option<usize> {
        let mut result: usize = 0;
        for seg in segs {
            let ccbits: u8 = seg.mode.num_char_count_bits(version);
            if seg.numchars >= 1usize << ccbits {
                return None;
            }
            result = result
                .checked_add(4 + usize::from(ccbits))?
                .checked_add(seg.data.len())?;
            if result > i32::MAX as usize {
                return None;
            }
        }
        Some(result)
    }

    pub fn is_numeric(text: &str) -> bool {
        text.chars().all(|c| c.is_ascii_digit())
    }

    pub fn is_alphanumeric(text: &str) -> bool {
        text.chars().all(|c| ALPHANUMERIC_CHARSET.contains(c))
    }
}
