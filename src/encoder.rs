//! Product-code encoder: builds the `D | R` / `C | S` grid from raw data
//! blocks.
//!
//! Mirrors `Encoder::encode` from the original C++ driver: reshape the
//! `k1 * k2` input blocks into a `D[r][c]` grid, derive row parity `R` with
//! the row Vandermonde matrix, column parity `C` (for data columns only)
//! with the column Vandermonde matrix, then cross parity `S` by applying
//! the *column* matrix to `R`'s columns — the same coefficients
//! `generate_col_parity_for_data` uses, which is what makes `S` computable
//! equally well from `C`'s rows under the row matrix (see
//! `commutes_under_both_codings` below).

use crate::coding::VandermondeMatrix;
use crate::error::{GridError, GridResult};
use crate::grid::CodeParams;

/// A fully encoded product-code grid: block id -> bytes.
#[derive(Debug, Clone)]
pub struct EncodedGrid {
    pub params: CodeParams,
    pub block_size: usize,
    blocks: Vec<Vec<u8>>,
}

impl EncodedGrid {
    pub fn get(&self, block_id: usize) -> GridResult<&[u8]> {
        self.params.validate_block_id(block_id)?;
        Ok(&self.blocks[block_id])
    }

    pub fn into_map(self) -> Vec<(usize, Vec<u8>)> {
        self.blocks.into_iter().enumerate().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &[u8])> {
        self.blocks.iter().enumerate().map(|(id, b)| (id, b.as_slice()))
    }
}

/// Encode `data_blocks` (length must be `k1 * k2`, in row-major `D[r][c]`
/// order) into the full product-code grid. Shorter blocks are zero-padded
/// to `block_size`; longer blocks are an error (the original silently
/// truncated via `memcpy` with a `min` length — we reject instead, since a
/// silent truncation would be a correctness footgun `GridError` already has
/// vocabulary for).
pub fn encode(
    params: CodeParams,
    data_blocks: &[Vec<u8>],
    block_size: usize,
) -> GridResult<EncodedGrid> {
    let expected = params.k1 * params.k2;
    if data_blocks.len() != expected {
        return Err(GridError::InvalidArgument(
            "encode: data_blocks length must equal k1 * k2",
        ));
    }
    if data_blocks.iter().any(|b| b.len() > block_size) {
        return Err(GridError::InvalidArgument(
            "encode: a data block exceeds block_size",
        ));
    }

    let mut d = vec![vec![vec![0u8; block_size]; params.k1]; params.k2];
    for r in 0..params.k2 {
        for c in 0..params.k1 {
            let idx = r * params.k1 + c;
            let src = &data_blocks[idx];
            d[r][c][..src.len()].copy_from_slice(src);
        }
    }

    let row_vm = VandermondeMatrix::new(params.k1, params.m1);
    let col_vm = VandermondeMatrix::new(params.k2, params.m2);

    let row_parity = generate_row_parity(&d, &row_vm, params.k2, params.m1, block_size);
    let col_parity = generate_col_parity(&d, &col_vm, params.k1, params.m2, block_size);
    let cross_parity =
        generate_cross_parity(&row_parity, &col_vm, params.m1, params.m2, block_size);

    let blocks = flatten(&d, &row_parity, &col_parity, &cross_parity, &params, block_size);

    Ok(EncodedGrid { params, block_size, blocks })
}

/// `R[r][p] = sum_c row_vm.coefficients(p)[c] * D[r][c]`.
fn generate_row_parity(
    d: &[Vec<Vec<u8>>],
    row_vm: &VandermondeMatrix,
    k2: usize,
    m1: usize,
    block_size: usize,
) -> Vec<Vec<Vec<u8>>> {
    let mut r = vec![vec![vec![0u8; block_size]; m1]; k2];
    for row in 0..k2 {
        for p in 0..m1 {
            let coeffs = row_vm.coefficients(p);
            let cols: Vec<&[u8]> = d[row].iter().map(|col| col.as_slice()).collect();
            crate::gf256::mul_add_slices(&mut r[row][p], coeffs, &cols);
        }
    }
    r
}

/// `C[q][c] = sum_row col_vm.coefficients(q)[row] * D[row][c]`.
fn generate_col_parity(
    d: &[Vec<Vec<u8>>],
    col_vm: &VandermondeMatrix,
    k1: usize,
    m2: usize,
    block_size: usize,
) -> Vec<Vec<Vec<u8>>> {
    let k2 = d.len();
    let mut c_out = vec![vec![vec![0u8; block_size]; k1]; m2];
    for q in 0..m2 {
        let coeffs = col_vm.coefficients(q);
        for c in 0..k1 {
            let col: Vec<&[u8]> = (0..k2).map(|row| d[row][c].as_slice()).collect();
            crate::gf256::mul_add_slices(&mut c_out[q][c], coeffs, &col);
        }
    }
    c_out
}

/// `S[q][p] = sum_row col_vm.coefficients(q)[row] * R[row][p]`.
fn generate_cross_parity(
    r: &[Vec<Vec<u8>>],
    col_vm: &VandermondeMatrix,
    m1: usize,
    m2: usize,
    block_size: usize,
) -> Vec<Vec<Vec<u8>>> {
    if m1 == 0 || m2 == 0 {
        return vec![vec![vec![0u8; block_size]; m1]; m2];
    }
    let k2 = r.len();
    let mut s = vec![vec![vec![0u8; block_size]; m1]; m2];
    for q in 0..m2 {
        let coeffs = col_vm.coefficients(q);
        for p in 0..m1 {
            let col: Vec<&[u8]> = (0..k2).map(|row| r[row][p].as_slice()).collect();
            crate::gf256::mul_add_slices(&mut s[q][p], coeffs, &col);
        }
    }
    s
}

/// Row-major flatten: row `r < k2` is `[D | R]`, row `r >= k2` is `[C | S]`.
fn flatten(
    d: &[Vec<Vec<u8>>],
    r: &[Vec<Vec<u8>>],
    c: &[Vec<Vec<u8>>],
    s: &[Vec<Vec<u8>>],
    params: &CodeParams,
    block_size: usize,
) -> Vec<Vec<u8>> {
    let mut out = vec![vec![0u8; block_size]; params.total_blocks()];
    for row in 0..params.rows() {
        for col in 0..params.cols() {
            let id = params.block_id(row, col);
            let block = if row < params.k2 && col < params.k1 {
                &d[row][col]
            } else if row < params.k2 {
                &r[row][col - params.k1]
            } else if col < params.k1 {
                &c[row - params.k2][col]
            } else {
                &s[row - params.k2][col - params.k1]
            };
            out[id].copy_from_slice(block);
        }
    }
    out
}

/// Recompute cross parity from `C`'s rows under the row Vandermonde matrix
/// and assert it matches the `S` produced from `R`'s columns under the
/// column matrix. Exposed so integration tests (and, if ever wired up,
/// online consistency checks) can verify the product code's defining
/// invariant without re-deriving the whole grid.
pub fn commutes_under_both_codings(grid: &EncodedGrid) -> GridResult<bool> {
    let p = &grid.params;
    if p.m1 == 0 || p.m2 == 0 {
        return Ok(true);
    }
    let row_vm = VandermondeMatrix::new(p.k1, p.m1);
    let col_vm = VandermondeMatrix::new(p.k2, p.m2);

    // Recover C[q][c] and R[r][p] from the encoded grid.
    let mut c_rows: Vec<Vec<Vec<u8>>> = vec![vec![vec![0u8; grid.block_size]; p.k1]; p.m2];
    for q in 0..p.m2 {
        for col in 0..p.k1 {
            c_rows[q][col] = grid.get(p.block_id(p.k2 + q, col))?.to_vec();
        }
    }
    let mut r_rows: Vec<Vec<Vec<u8>>> = vec![vec![vec![0u8; grid.block_size]; p.m1]; p.k2];
    for row in 0..p.k2 {
        for pp in 0..p.m1 {
            r_rows[row][pp] = grid.get(p.block_id(row, p.k1 + pp))?.to_vec();
        }
    }

    // S computed from R via col matrix (how the encoder built it).
    let s_from_r = generate_cross_parity(&r_rows, &col_vm, p.m1, p.m2, grid.block_size);

    // S computed from C via row matrix (the other valid derivation).
    let mut s_from_c = vec![vec![vec![0u8; grid.block_size]; p.m1]; p.m2];
    for q in 0..p.m2 {
        for pp in 0..p.m1 {
            let coeffs = row_vm.coefficients(pp);
            let cols: Vec<&[u8]> = c_rows[q].iter().map(|v| v.as_slice()).collect();
            crate::gf256::mul_add_slices(&mut s_from_c[q][pp], coeffs, &cols);
        }
    }

    for q in 0..p.m2 {
        for pp in 0..p.m1 {
            let actual = grid.get(p.block_id(p.k2 + q, p.k1 + pp))?;
            if actual != s_from_r[q][pp].as_slice() || actual != s_from_c[q][pp].as_slice() {
                return Ok(false);
            }
        }
    }
    Ok(true)
}
