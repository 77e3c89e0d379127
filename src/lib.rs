//! gridcode — rack-aware two-dimensional product-code erasure coding.
//!
//! A product code `PC(k1, m1, k2, m2)` lays data out on a `k2 x k1` grid,
//! adds `m1` row-parity columns and `m2` column-parity rows, and fills the
//! bottom-right `m2 x m1` corner with cross parity derivable equally from
//! either code. This crate builds that grid ([`encoder`]), assigns each
//! block a rack and server ([`placement`]), and plans + executes repairs
//! that minimize cross-rack reads when blocks are lost ([`repair`]).
//!
//! Module map:
//! - [`gf256`] — GF(2^8) field arithmetic and Gaussian elimination.
//! - [`coding`] — Vandermonde row/column coding matrices.
//! - [`grid`] — shared `(row, col) <-> block_id` geometry.
//! - [`encoder`] — builds the `D | R` / `C | S` grid.
//! - [`store`] — async block-store client and wire protocol.
//! - [`placement`] — rack/server placement strategies.
//! - [`repair`] — repair planning and execution.
//! - [`bench`] — failure-combination benchmark driver.
//!
//! Features:
//! - `rayon` (default): parallel failure-combination enumeration in
//!   [`bench`]; falls back to sequential iteration when disabled.

#![deny(rust_2018_idioms, unused_must_use)]

pub mod bench;
pub mod coding;
pub mod encoder;
pub mod error;
pub mod gf256;
pub mod grid;
pub mod placement;
pub mod repair;
pub mod store;
pub mod utils;

pub use error::{GridError, GridResult};
pub use grid::{CodeParams, Quadrant};
