//! Grid geometry shared by the encoder, placement, and repair planner.
//!
//! Centralizes the `(row, col) <-> block_id` math that the original C++
//! `Repair::get_rc`/`get_block_id` and `Placement`'s strategies each
//! re-derived independently (`cols = k1 + m1`, `id = r * cols + c`).
//! Keeping one implementation here avoids the row/col coordinate bugs that
//! crop up when the same formula is copy-pasted across several files.

use crate::error::{GridError, GridResult};

/// Which quadrant of the `(k2+m2) x (k1+m1)` grid a block sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    /// `D`: original data, `r < k2, c < k1`.
    Data,
    /// `R`: row parity for a data row, `r < k2, c >= k1`.
    RowParity,
    /// `C`: column parity for a data column, `r >= k2, c < k1`.
    ColParity,
    /// `S`: cross parity, shared by both codes, `r >= k2, c >= k1`.
    CrossParity,
}

/// Product-code dimensions: row code RS(k1, m1), column code RS(k2, m2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeParams {
    pub k1: usize,
    pub m1: usize,
    pub k2: usize,
    pub m2: usize,
}

impl CodeParams {
    pub fn new(k1: usize, m1: usize, k2: usize, m2: usize) -> GridResult<Self> {
        if k1 == 0 || k2 == 0 {
            return Err(GridError::InvalidArgument("k1 and k2 must be nonzero"));
        }
        Ok(CodeParams { k1, m1, k2, m2 })
    }

    /// Total grid columns (`k1 + m1`).
    #[inline]
    pub fn cols(&self) -> usize {
        self.k1 + self.m1
    }

    /// Total grid rows (`k2 + m2`).
    #[inline]
    pub fn rows(&self) -> usize {
        self.k2 + self.m2
    }

    /// Total block count.
    #[inline]
    pub fn total_blocks(&self) -> usize {
        self.rows() * self.cols()
    }

    /// `block_id = r * cols + c`.
    #[inline]
    pub fn block_id(&self, r: usize, c: usize) -> usize {
        r * self.cols() + c
    }

    /// Inverse of [`CodeParams::block_id`].
    #[inline]
    pub fn rc(&self, block_id: usize) -> (usize, usize) {
        let cols = self.cols();
        (block_id / cols, block_id % cols)
    }

    pub fn quadrant_of(&self, block_id: usize) -> Quadrant {
        let (r, c) = self.rc(block_id);
        match (r < self.k2, c < self.k1) {
            (true, true) => Quadrant::Data,
            (true, false) => Quadrant::RowParity,
            (false, true) => Quadrant::ColParity,
            (false, false) => Quadrant::CrossParity,
        }
    }

    /// All block ids in row `r`, in column-increasing order.
    pub fn row_peers(&self, r: usize) -> Vec<usize> {
        (0..self.cols()).map(|c| self.block_id(r, c)).collect()
    }

    /// All block ids in column `c`, in row-increasing order.
    pub fn col_peers(&self, c: usize) -> Vec<usize> {
        (0..self.rows()).map(|r| self.block_id(r, c)).collect()
    }

    pub fn validate_block_id(&self, block_id: usize) -> GridResult<()> {
        if block_id >= self.total_blocks() {
            return Err(GridError::UnknownBlock(block_id));
        }
        Ok(())
    }
}
