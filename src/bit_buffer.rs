use crate::error::{QrError, Result};

/// An appendable sequence of bits (0s and 1s).
///
/// Multi-bit values are written most significant bit first. The length only ever grows.
/// Cloning yields an independent copy.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BitBuffer(Vec<bool>);

impl BitBuffer {
    /// Creates an empty bit buffer.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Returns the number of bits in this buffer.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no bits have been appended.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Appends the low `len` bits of `val`, most significant first.
    ///
    /// Fails with [`QrError::InvalidArgument`] if `len > 31` or `val` has bits set at or
    /// above position `len`.
    pub fn append_bits(&mut self, val: u32, len: u8) -> Result<()> {
        if len > 31 || (val >> len) != 0 {
            return Err(QrError::invalid(format!(
                "value {} does not fit in {} bits",
                val, len
            )));
        }
        self.0.extend((0..len).rev().map(|i| get_bit(val, i)));
        Ok(())
    }

    /// Appends all 8 bits of `b`, most significant first.
    pub fn append_byte(&mut self, b: u8) {
        self.0.extend((0..8).rev().map(|i| get_bit(u32::from(b), i)));
    }

    /// Appends the full content of another buffer, bit for bit.
    pub fn append_buffer(&mut self, other: &BitBuffer) {
        self.0.extend_from_slice(&other.0);
    }

    /// Returns the bit at `index`.
    pub fn bit_at(&self, index: usize) -> Result<bool> {
        self.0.get(index).copied().ok_or(QrError::IndexOutOfRange {
            index,
            len: self.0.len(),
        })
    }

    /// Iterates over the bits in append order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.0.iter().copied()
    }

    /// Packs the bits into bytes, big endian within each byte. A trailing partial
    /// byte is padded with zero bits.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = vec![0u8; (self.0.len() + 7) / 8];
        for (i, &bit) in self.0.iter().enumerate() {
            result[i >> 3] |= u8::from(bit) << (7 - (i & 7));
        }
        result
    }
}

pub(crate) fn get_bit(x: u32, i: u8) -> bool {
    ((x >> i) & 1) != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_bits_msb_first() {
        let mut bb = BitBuffer::new();
        bb.append_bits(0b1011, 4).unwrap();
        bb.append_bits(1, 1).unwrap();
        assert_eq!(bb.len(), 5);
        let bits: Vec<bool> = bb.iter().collect();
        assert_eq!(bits, vec![true, false, true, true, true]);
    }

    #[test]
    fn test_append_zero_width() {
        let mut bb = BitBuffer::new();
        bb.append_bits(0, 0).unwrap();
        assert!(bb.is_empty());
    }

    #[test]
    fn test_append_bits_rejects_bad_widths() {
        let mut bb = BitBuffer::new();
        assert!(matches!(bb.append_bits(0, 32), Err(QrError::InvalidArgument(_))));
        assert!(matches!(bb.append_bits(4, 2), Err(QrError::InvalidArgument(_))));
        assert!(bb.append_bits(0x7fff_ffff, 31).is_ok());
        assert_eq!(bb.len(), 31);
    }

    #[test]
    fn test_bit_at_out_of_range() {
        let mut bb = BitBuffer::new();
        bb.append_bits(0b10, 2).unwrap();
        assert!(bb.bit_at(0).unwrap());
        assert!(!bb.bit_at(1).unwrap());
        assert!(matches!(
            bb.bit_at(2),
            Err(QrError::IndexOutOfRange { index: 2, len: 2 })
        ));
    }

    #[test]
    fn test_clone_is_independent() {
        let mut a = BitBuffer::new();
        a.append_bits(0b11, 2).unwrap();
        let b = a.clone();
        a.append_bits(0, 3).unwrap();
        assert_eq!(a.len(), 5);
        assert_eq!(b.len(), 2);
    }

    #[test]
    fn test_append_buffer_and_pack() {
        let mut a = BitBuffer::new();
        a.append_bits(0xA, 4).unwrap();
        let mut b = BitBuffer::new();
        b.append_bits(0x5, 4).unwrap();
        b.append_bits(1, 1).unwrap();
        a.append_buffer(&b);
        assert_eq!(a.len(), 9);
        assert_eq!(a.to_bytes(), vec![0xA5, 0x80]);
    }
}
