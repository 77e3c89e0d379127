//! Crate-wide error type.
//!
//! `GridError` covers every failure in the crate (`thiserror`-derived,
//! matching `animica_native::nmt::verify::VerifyError`'s style): parameter
//! validation, GF(2^8) matrix singularity, planner infeasibility, and block
//! store transport failures all share this one enum rather than each
//! subsystem defining its own.

use thiserror::Error;

/// Canonical error for the crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("singular matrix, no unique solution")]
    Singular,

    #[error("not enough survivors to reconstruct (have {have}, need {need})")]
    NotEnoughSurvivors { have: usize, need: usize },

    #[error("unknown block id {0}")]
    UnknownBlock(usize),

    #[error("planner found no repair path for the given failure set")]
    Unrepairable,

    #[error("too many failures for the planner's bitmask search ({n} > {limit})")]
    TooManyFailures { n: usize, limit: usize },

    #[error("block store error: {0}")]
    Store(String),
}

/// Convenience alias for results that use `GridError`.
pub type GridResult<T> = Result<T, GridError>;
