//! Misc low-level helpers shared by the GF(2^8) kernels and the repair executor.
//!
//! Kept dependency-light and allocation-free where practical, the way
//! `animica_native::utils` keeps its byte-twiddling helpers separate from the
//! higher-level modules that use them.

pub mod rayon_pool;
