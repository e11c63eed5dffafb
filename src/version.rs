//! Symbol versions, error correction levels and the capacity tables that tie them together.

use tracing::debug;

use crate::error::{QrError, Result};
use crate::segment::QrSegment;

/// Error correction level for a QR code.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub enum EcLevel {
    /// Tolerates ~7% erroneous codewords.
    Low,
    /// Tolerates ~15% erroneous codewords.
    #[default]
    Medium,
    /// Tolerates ~25% erroneous codewords.
    Quartile,
    /// Tolerates ~30% erroneous codewords.
    High,
}

impl EcLevel {
    /// All levels in index order, which is also increasing robustness.
    pub const ALL: [EcLevel; 4] = [EcLevel::Low, EcLevel::Medium, EcLevel::Quartile, EcLevel::High];

    /// Row index into the capacity tables (0 to 3).
    pub fn ordinal(self) -> usize {
        match self {
            EcLevel::Low => 0,
            EcLevel::Medium => 1,
            EcLevel::Quartile => 2,
            EcLevel::High => 3,
        }
    }

    /// The 2-bit code written into the format information.
    pub fn format_bits(self) -> u8 {
        match self {
            EcLevel::Low => 1,
            EcLevel::Medium => 0,
            EcLevel::Quartile => 3,
            EcLevel::High => 2,
        }
    }
}

/// A QR code version (1–40).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Version(u8);

impl Version {
    /// The minimum version number supported in the QR Code Model 2 standard.
    pub const MIN: Version = Version(1);

    /// The maximum version number supported in the QR Code Model 2 standard.
    pub const MAX: Version = Version(40);

    /// Creates a version from the given number, which must be in [1, 40].
    pub fn new(ver: u8) -> Result<Self> {
        if (Self::MIN.0..=Self::MAX.0).contains(&ver) {
            Ok(Self(ver))
        } else {
            Err(QrError::invalid(format!("version {} out of range", ver)))
        }
    }

    /// Returns the value, which is in the range [1, 40].
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Side length of the symbol in modules, between 21 and 177.
    pub const fn size(self) -> usize {
        self.0 as usize * 4 + 17
    }

    /// The next larger version, if any.
    pub fn next(self) -> Option<Version> {
        (self < Self::MAX).then(|| Version(self.0 + 1))
    }

    /// Number of data bits that fit in a symbol of this version after all function
    /// modules are excluded. Includes remainder bits, so it may not be a multiple of 8.
    pub fn raw_data_modules(self) -> usize {
        let ver = usize::from(self.0);
        let size = self.size();
        let mut result = size * size;
        result -= 8 * 8 * 3; // Finder patterns with separators
        result -= 15 * 2 + 1; // Format information and the dark module
        result -= (size - 16) * 2; // Timing patterns
        if ver >= 2 {
            let numalign = ver / 7 + 2;
            result -= (numalign - 1) * (numalign - 1) * 25;
            result -= (numalign - 2) * 2 * 20; // Alignment patterns overlapping timing
            if ver >= 7 {
                result -= 6 * 3 * 2;
            }
        }
        result
    }

    /// Total codewords (data plus error correction) in a symbol of this version.
    pub fn raw_codewords(self) -> usize {
        self.raw_data_modules() / 8
    }

    /// Error correction codewords in each block at the given level.
    pub fn ecc_codewords_per_block(self, ecl: EcLevel) -> usize {
        table_get(&ECC_CODEWORDS_PER_BLOCK, self, ecl)
    }

    /// Number of error correction blocks the codewords are split into.
    pub fn num_blocks(self, ecl: EcLevel) -> usize {
        table_get(&NUM_ERROR_CORRECTION_BLOCKS, self, ecl)
    }

    /// Number of 8-bit data codewords available at the given level.
    pub fn data_codewords(self, ecl: EcLevel) -> usize {
        self.raw_codewords() - self.ecc_codewords_per_block(ecl) * self.num_blocks(ecl)
    }

    pub fn data_capacity_bits(self, ecl: EcLevel) -> usize {
        self.data_codewords(ecl) * 8
    }

    /// Centre coordinates of the alignment patterns along one axis, ascending.
    /// Empty for version 1.
    pub fn alignment_pattern_positions(self) -> Vec<usize> {
        let ver = usize::from(self.0);
        if ver == 1 {
            return Vec::new();
        }
        let numalign = ver / 7 + 2;
        let step = (ver * 8 + numalign * 3 + 5) / (numalign * 4 - 4) * 2;
        let last = self.size() - 7;
        let mut result: Vec<usize> = (0..numalign - 1).map(|i| last - i * step).collect();
        result.push(6);
        result.reverse();
        result
    }
}

impl TryFrom<u8> for Version {
    type Error = QrError;

    fn try_from(ver: u8) -> Result<Self> {
        Version::new(ver)
    }
}

/// Outcome of fitting a set of segments into a symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    pub version: Version,
    pub ecl: EcLevel,
    /// Bits used by the segments, before terminator and padding.
    pub data_bits: usize,
}

/// Finds the smallest version in `[minversion, maxversion]` whose capacity at `ecl` holds
/// the segments, then optionally raises the level while the data still fits.
pub fn select_version(
    segs: &[QrSegment],
    ecl: EcLevel,
    minversion: Version,
    maxversion: Version,
    boostecl: bool,
) -> Result<Selection> {
    if minversion > maxversion {
        return Err(QrError::invalid("min version exceeds max version"));
    }

    let mut version = minversion;
    let data_bits = loop {
        let capacity = version.data_capacity_bits(ecl);
        let used = QrSegment::get_total_bits(segs, version);
        match used {
            Some(n) if n <= capacity => break n,
            _ if version >= maxversion => {
                return Err(QrError::DataTooLong {
                    required: used.unwrap_or_else(|| saturating_total_bits(segs, version)),
                    available: capacity,
                });
            }
            _ => {}
        }
        version = Version(version.0 + 1);
    };

    // Index order; every level that still fits is adopted, so the last one wins
    let mut chosen = ecl;
    if boostecl {
        for newecl in EcLevel::ALL {
            if newecl >= ecl && data_bits <= version.data_capacity_bits(newecl) {
                chosen = newecl;
            }
        }
    }
    debug!(
        version = version.value(),
        requested = ?ecl,
        ecl = ?chosen,
        data_bits,
        "selected symbol version"
    );
    Ok(Selection {
        version,
        ecl: chosen,
        data_bits,
    })
}

/// Bits the segments would take at `version` if every count field were wide enough.
fn saturating_total_bits(segs: &[QrSegment], version: Version) -> usize {
    segs.iter().fold(0usize, |acc, seg| {
        acc.saturating_add(4 + usize::from(seg.mode().num_char_count_bits(version)))
            .saturating_add(seg.data().len())
    })
}

fn table_get(table: &'static [[u8; 41]; 4], ver: Version, ecl: EcLevel) -> usize {
    usize::from(table[ecl.ordinal()][usize::from(ver.value())])
}

// Indexed by [level][version]; column 0 is padding.
static ECC_CODEWORDS_PER_BLOCK: [[u8; 41]; 4] = [
    [
        0, 7, 10, 15, 20, 26, 18, 20, 24, 30, 18, 20, 24, 26, 30, 22, 24, 28, 30, 28, 28, 28, 28, 30,
        30, 26, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Low
    [
        0, 10, 16, 26, 18, 24, 16, 18, 22, 22, 26, 30, 22, 22, 24, 24, 28, 28, 26, 26, 26, 26, 28, 28,
        28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28,
    ], // Medium
    [
        0, 13, 22, 18, 26, 18, 24, 18, 22, 20, 24, 28, 26, 24, 20, 30, 24, 28, 28, 26, 30, 28, 30, 30,
        30, 30, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Quartile
    [
        0, 17, 28, 22, 16, 22, 28, 26, 26, 24, 28, 24, 28, 22, 24, 24, 30, 28, 28, 26, 28, 30, 24, 30,
        30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // High
];

static NUM_ERROR_CORRECTION_BLOCKS: [[u8; 41]; 4] = [
    [
        0, 1, 1, 1, 1, 1, 2, 2, 2, 2, 4, 4, 4, 4, 4, 6, 6, 6, 6, 7, 8, 8, 9, 9, 10, 12, 12, 12,
        13, 14, 15, 16, 17, 18, 19, 19, 20, 21, 22, 24, 25,
    ], // Low
    [
        0, 1, 1, 1, 2, 2, 4, 4, 4, 5, 5, 5, 8, 9, 9, 10, 10, 11, 13, 14, 16, 17, 17, 18, 20, 21,
        23, 25, 26, 28, 29, 31, 33, 35, 37, 38, 40, 43, 45, 47, 49,
    ], // Medium
    [
        0, 1, 1, 2, 2, 4, 4, 6, 6, 8, 8, 8, 10, 12, 16, 12, 17, 16, 18, 21, 20, 23, 23, 25, 27, 29,
        34, 34, 35, 38, 40, 43, 45, 48, 51, 53, 56, 59, 62, 65, 68,
    ], // Quartile
    [
        0, 1, 1, 2, 4, 4, 4, 5, 6, 8, 8, 11, 11, 16, 16, 18, 16, 19, 21, 25, 25, 25, 34, 30, 32, 35,
        37, 40, 42, 45, 48, 51, 54, 57, 60, 63, 66, 70, 74, 77, 81,
    ], // High
];
