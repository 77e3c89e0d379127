//! Gaussian elimination and matrix inversion over GF(2^8).
//!
//! Ported line-for-line in spirit from the original `gf256_solver`'s
//! `gf256_gaussian_elimination`: forward-selection pivoting (first nonzero
//! row from `i` down), normalize the pivot row by its inverse, eliminate
//! column `i` in every other row by XORing a scaled copy of the pivot row.
//! Operates on the coefficient matrix and the right-hand side in lockstep,
//! the way `dirvine-saorsa-fec`'s `PureRustBackend::decode_systematic`
//! builds and inverts a decode matrix before reconstructing shares.

use super::{inv, mul};
use crate::error::{GridError, GridResult};

/// Solve `A * X = B` over GF(2^8) in place, where `A` is `n x n` and `B`
/// (hence `X`) is `n x m`. Returns `X`; `GridError::Singular` if `A` has no
/// pivot in some column.
pub fn gaussian_eliminate(a: &[Vec<u8>], b: &[Vec<u8>]) -> GridResult<Vec<Vec<u8>>> {
    let n = a.len();
    if n == 0 {
        return Ok(Vec::new());
    }
    if a.iter().any(|row| row.len() != n) {
        return Err(GridError::InvalidArgument("gaussian_eliminate: A must be square"));
    }
    if b.len() != n {
        return Err(GridError::InvalidArgument("gaussian_eliminate: B row count must match A"));
    }
    let m = b[0].len();
    if b.iter().any(|row| row.len() != m) {
        return Err(GridError::InvalidArgument("gaussian_eliminate: B rows must be equal length"));
    }

    let mut mat: Vec<Vec<u8>> = a.to_vec();
    let mut rhs: Vec<Vec<u8>> = b.to_vec();

    for i in 0..n {
        let pivot = (i..n).find(|&r| mat[r][i] != 0);
        let pivot = match pivot {
            Some(p) => p,
            None => return Err(GridError::Singular),
        };
        if pivot != i {
            mat.swap(i, pivot);
            rhs.swap(i, pivot);
        }

        let pivot_inv = inv(mat[i][i]);
        for j in 0..n {
            mat[i][j] = mul(mat[i][j], pivot_inv);
        }
        for j in 0..m {
            rhs[i][j] = mul(rhs[i][j], pivot_inv);
        }

        for r in 0..n {
            if r == i {
                continue;
            }
            let factor = mat[r][i];
            if factor == 0 {
                continue;
            }
            for j in 0..n {
                mat[r][j] ^= mul(factor, mat[i][j]);
            }
            for j in 0..m {
                rhs[r][j] ^= mul(factor, rhs[i][j]);
            }
        }
    }

    Ok(rhs)
}

/// Invert an `n x n` matrix over GF(2^8) by eliminating against the identity.
pub fn invert(a: &[Vec<u8>]) -> GridResult<Vec<Vec<u8>>> {
    let n = a.len();
    let identity: Vec<Vec<u8>> = (0..n)
        .map(|i| {
            let mut row = vec![0u8; n];
            row[i] = 1;
            row
        })
        .collect();
    gaussian_eliminate(a, &identity)
}
