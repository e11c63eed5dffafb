use crate::error::{QrError, Result};

/// One of the 8 data mask patterns. `x` is the column, `y` the row.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Mask {
    /// (x + y) % 2 == 0
    Pattern0,
    /// y % 2 == 0
    Pattern1,
    /// x % 3 == 0
    Pattern2,
    /// (x + y) % 3 == 0
    Pattern3,
    /// (x/3 + y/2) % 2 == 0
    Pattern4,
    /// (x*y)%2 + (x*y)%3 == 0
    Pattern5,
    /// ((x*y)%2 + (x*y)%3) % 2 == 0
    Pattern6,
    /// ((x+y)%2 + (x*y)%3) % 2 == 0
    Pattern7,
}

impl Mask {
    pub const ALL: [Mask; 8] = [
        Mask::Pattern0,
        Mask::Pattern1,
        Mask::Pattern2,
        Mask::Pattern3,
        Mask::Pattern4,
        Mask::Pattern5,
        Mask::Pattern6,
        Mask::Pattern7,
    ];

    /// Creates a mask from its index in [0, 7].
    pub fn new(index: u8) -> Result<Self> {
        Self::ALL
            .get(usize::from(index))
            .copied()
            .ok_or_else(|| QrError::invalid(format!("mask {} out of range", index)))
    }

    /// Returns the index, which is in the range [0, 7].
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Whether the module at column `x`, row `y` is inverted by this mask.
    pub fn is_masked(self, x: usize, y: usize) -> bool {
        match self {
            Mask::Pattern0 => (x + y) % 2 == 0,
            Mask::Pattern1 => y % 2 == 0,
            Mask::Pattern2 => x % 3 == 0,
            Mask::Pattern3 => (x + y) % 3 == 0,
            Mask::Pattern4 => (x / 3 + y / 2) % 2 == 0,
            Mask::Pattern5 => (x * y) % 2 + (x * y) % 3 == 0,
            Mask::Pattern6 => ((x * y) % 2 + (x * y) % 3) % 2 == 0,
            Mask::Pattern7 => ((x + y) % 2 + (x * y) % 3) % 2 == 0,
        }
    }
}

impl TryFrom<u8> for Mask {
    type Error = QrError;

    fn try_from(index: u8) -> Result<Self> {
        Mask::new(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_index_round_trip() {
        for i in 0u8..8 {
            assert_eq!(Mask::new(i).unwrap().value(), i);
        }
        assert!(Mask::new(8).is_err());
    }

    #[test]
    fn test_mask_predicates() {
        assert!(Mask::Pattern0.is_masked(0, 0));
        assert!(!Mask::Pattern0.is_masked(1, 0));
        assert!(Mask::Pattern1.is_masked(5, 2));
        assert!(Mask::Pattern2.is_masked(3, 1));
        assert!(!Mask::Pattern2.is_masked(1, 3));
        assert!(Mask::Pattern4.is_masked(0, 1));
        assert!(!Mask::Pattern4.is_masked(3, 0));
        assert!(Mask::Pattern5.is_masked(6, 1));
        assert!(!Mask::Pattern5.is_masked(1, 1));
    }
}
