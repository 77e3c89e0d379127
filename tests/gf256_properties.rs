//! GF(2^8) field-law properties exercised through the public API.

use gridcode::gf256::{self, matrix};
use rand::{rngs::StdRng, Rng, SeedableRng};

#[test]
fn every_nonzero_element_times_its_inverse_is_one() {
    for a in 1u16..256 {
        let a = a as u8;
        assert_eq!(gf256::mul(a, gf256::inv(a)), 1);
    }
}

#[test]
fn pow_matches_iterated_multiplication_for_random_bases() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..100 {
        let a: u8 = loop {
            let x = rng.gen::<u8>();
            if x != 0 {
                break x;
            }
        };
        let n = rng.gen_range(0..16u32);
        let mut expect = 1u8;
        for _ in 0..n {
            expect = gf256::mul(expect, a);
        }
        assert_eq!(gf256::pow(a, n), expect);
    }
}

#[test]
fn gaussian_elimination_solves_nonsingular_systems() {
    let mut rng = StdRng::seed_from_u64(123);
    for _ in 0..15 {
        let n = 2 + (rng.gen::<usize>() % 6);
        let a = loop {
            let candidate: Vec<Vec<u8>> =
                (0..n).map(|_| (0..n).map(|_| rng.gen::<u8>()).collect()).collect();
            if matrix::invert(&candidate).is_ok() {
                break candidate;
            }
        };
        let x: Vec<Vec<u8>> = (0..n).map(|_| vec![rng.gen::<u8>()]).collect();

        let mut b = vec![vec![0u8]; n];
        for i in 0..n {
            let mut acc = 0u8;
            for j in 0..n {
                acc ^= gf256::mul(a[i][j], x[j][0]);
            }
            b[i][0] = acc;
        }

        let solved = matrix::gaussian_eliminate(&a, &b).unwrap();
        assert_eq!(solved, x);
    }
}

#[test]
fn gaussian_elimination_reports_singular_for_a_zero_row() {
    let a = vec![vec![0u8, 0u8, 0u8], vec![1u8, 2u8, 3u8], vec![4u8, 5u8, 6u8]];
    assert!(matrix::invert(&a).is_err());
}
