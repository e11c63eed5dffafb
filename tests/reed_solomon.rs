//! Randomized checks of the Reed-Solomon generator against its algebraic properties.

use qrenc::reed_solomon::{multiply, ReedSolomonGenerator};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_block(rng: &mut StdRng, len: usize) -> Vec<u8> {
    (0..len).map(|_| rng.gen()).collect()
}

#[test]
fn test_field_multiplication_laws() {
    let mut rng = StdRng::seed_from_u64(0x11d);
    for _ in 0..2000 {
        let (a, b, c): (u8, u8, u8) = (rng.gen(), rng.gen(), rng.gen());
        assert_eq!(multiply(a, b), multiply(b, a));
        assert_eq!(multiply(multiply(a, b), c), multiply(a, multiply(b, c)));
        assert_eq!(multiply(a, b ^ c), multiply(a, b) ^ multiply(a, c));
        assert_eq!(multiply(a, 1), a);
    }
}

#[test]
fn test_codewords_are_divisible_by_generator() {
    let mut rng = StdRng::seed_from_u64(7);
    for degree in [7usize, 10, 13, 18, 22, 26, 30] {
        let rs = ReedSolomonGenerator::new(degree).unwrap();
        for _ in 0..20 {
            let len = rng.gen_range(1..=123);
            let mut codeword = random_block(&mut rng, len);
            let ecc = rs.compute_remainder(&codeword);
            assert_eq!(ecc.len(), degree);
            codeword.extend(ecc);
            assert!(rs.compute_remainder(&codeword).iter().all(|&b| b == 0));
            assert!(rs.is_valid_codeword(&codeword));
        }
    }
}

#[test]
fn test_corruption_is_detected() {
    let mut rng = StdRng::seed_from_u64(42);
    for degree in [7usize, 16, 30] {
        let rs = ReedSolomonGenerator::new(degree).unwrap();
        for _ in 0..50 {
            let len = rng.gen_range(1..=100);
            let mut codeword = random_block(&mut rng, len);
            codeword.extend(rs.compute_remainder(&codeword));

            // Fewer errors than the minimum distance always leave a nonzero syndrome
            let errors = rng.gen_range(1..=degree);
            let mut positions: Vec<usize> = (0..codeword.len()).collect();
            for i in 0..errors {
                let j = rng.gen_range(i..positions.len());
                positions.swap(i, j);
            }
            for &pos in &positions[..errors] {
                codeword[pos] ^= rng.gen_range(1..=255u8);
            }
            assert!(!rs.is_valid_codeword(&codeword));
        }
    }
}

#[test]
fn test_zero_data_has_zero_ecc() {
    let rs = ReedSolomonGenerator::new(17).unwrap();
    assert_eq!(rs.compute_remainder(&[0u8; 40]), vec![0u8; 17]);
    assert_eq!(rs.compute_remainder(&[]), vec![0u8; 17]);
}
