//! Reed-Solomon error correction over GF(2^8).
//!
//! QR codes use the primitive polynomial x^8 + x^4 + x^3 + x^2 + 1 (0x11D) and the
//! generator element α = 0x02.

use crate::error::{QrError, Result};

/// Returns the product of the two given field elements modulo GF(2^8/0x11D).
pub fn multiply(x: u8, y: u8) -> u8 {
    // Russian peasant multiplication
    let mut z: u8 = 0;
    for i in (0..8).rev() {
        z = (z << 1) ^ ((z >> 7) * 0x1d);
        z ^= ((y >> i) & 1) * x;
    }
    z
}

/// Computes Reed-Solomon error correction codewords for blocks of data.
///
/// The divisor polynomial is stored highest power first with the leading
/// (always 1) coefficient omitted: `x^n + divisor[0] x^(n-1) + ... + divisor[n-1]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReedSolomonGenerator {
    divisor: Vec<u8>,
}

impl ReedSolomonGenerator {
    /// Builds the generator polynomial `(x - α^0)(x - α^1)...(x - α^(degree-1))`.
    pub fn new(degree: usize) -> Result<Self> {
        if !(1..=255).contains(&degree) {
            return Err(QrError::invalid(format!("degree {} out of range", degree)));
        }
        Ok(Self::for_block(degree))
    }

    /// Same as [`ReedSolomonGenerator::new`] for a degree already known to be in range.
    pub(crate) fn for_block(degree: usize) -> Self {
        // Start off with the monomial x^0
        let mut divisor = vec![0u8; degree];
        divisor[degree - 1] = 1;

        // Multiply by (x - α^i) for each root, dropping the leading term
        let mut root: u8 = 1;
        for _ in 0..degree {
            for j in 0..degree {
                divisor[j] = multiply(divisor[j], root);
                if j + 1 < degree {
                    divisor[j] ^= divisor[j + 1];
                }
            }
            root = multiply(root, 0x02);
        }
        Self { divisor }
    }

    /// Number of error correction codewords this generator produces.
    pub fn degree(&self) -> usize {
        self.divisor.len()
    }

    pub fn divisor(&self) -> &[u8] {
        &self.divisor
    }

    /// Returns the remainder of `data * x^degree` divided by the generator polynomial.
    pub fn compute_remainder(&self, data: &[u8]) -> Vec<u8> {
        let mut result = vec![0u8; self.divisor.len()];
        for &b in data {
            let factor: u8 = b ^ result[0];
            result.rotate_left(1);
            if let Some(last) = result.last_mut() {
                *last = 0;
            }
            for (x, &y) in result.iter_mut().zip(self.divisor.iter()) {
                *x ^= multiply(y, factor);
            }
        }
        result
    }

    /// Evaluates `codeword` (data followed by its error correction bytes, highest power
    /// first) at each generator root. All syndromes are zero for an intact codeword.
    pub fn syndromes(&self, codeword: &[u8]) -> Vec<u8> {
        let mut result = Vec::with_capacity(self.divisor.len());
        let mut root: u8 = 1;
        for _ in 0..self.divisor.len() {
            let value = codeword.iter().fold(0u8, |acc, &b| multiply(acc, root) ^ b);
            result.push(value);
            root = multiply(root, 0x02);
        }
        result
    }

    pub fn is_valid_codeword(&self, codeword: &[u8]) -> bool {
        self.syndromes(codeword).iter().all(|&s| s == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiply() {
        assert_eq!(multiply(0, 0x53), 0);
        assert_eq!(multiply(1, 0x53), 0x53);
        assert_eq!(multiply(0x02, 0x80), 0x1d);
        assert_eq!(multiply(0xff, 0xff), 0xe2);
        assert_eq!(multiply(0x53, 0xca), multiply(0xca, 0x53));
    }

    #[test]
    fn test_divisor_degree_7() {
        let rs = ReedSolomonGenerator::new(7).unwrap();
        assert_eq!(rs.divisor(), &[127, 122, 154, 164, 11, 68, 117]);
        assert_eq!(ReedSolomonGenerator::new(2).unwrap().divisor(), &[3, 2]);
    }

    #[test]
    fn test_degree_out_of_range() {
        assert!(ReedSolomonGenerator::new(0).is_err());
        assert!(ReedSolomonGenerator::new(256).is_err());
        assert_eq!(ReedSolomonGenerator::new(255).unwrap().degree(), 255);
    }

    #[test]
    fn test_hello_world_quartile_block() {
        // Version 1-Q, "HELLO WORLD"
        let data = [32, 91, 11, 120, 209, 114, 220, 77, 67, 64, 236, 17, 236];
        let rs = ReedSolomonGenerator::new(13).unwrap();
        assert_eq!(
            rs.compute_remainder(&data),
            vec![168, 72, 22, 82, 217, 54, 156, 0, 46, 15, 180, 122, 16]
        );
    }

    #[test]
    fn test_codeword_is_divisible() {
        let data = b"otpauth://totp/x";
        let rs = ReedSolomonGenerator::new(10).unwrap();
        let mut codeword = data.to_vec();
        codeword.extend(rs.compute_remainder(data));
        assert!(rs.compute_remainder(&codeword).iter().all(|&b| b == 0));
        assert!(rs.is_valid_codeword(&codeword));

        codeword[3] ^= 0x40;
        assert!(!rs.is_valid_codeword(&codeword));
    }
}
