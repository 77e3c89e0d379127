//! Optional Rayon-backed parallel map, used by the benchmark driver to fan
//! out independent failure-combination repair runs across CPU cores.
//!
//! Mirrors `animica_native::utils::rayon_pool`'s `maybe_par_map`: falls back
//! to a sequential map when the `rayon` feature is disabled, so call sites
//! never need to sprinkle `#[cfg]`.

/// Maybe-parallel map: if rayon is available **and** `input.len() >=
/// threshold`, map in parallel; otherwise sequential.
pub fn maybe_par_map<T, U, F>(input: &[T], threshold: usize, f: F) -> Vec<U>
where
    T: Send + Sync,
    U: Send,
    F: Fn(&T) -> U + Sync,
{
    maybe_par_map_impl(input, threshold, f)
}

#[cfg(feature = "rayon")]
fn maybe_par_map_impl<T, U, F>(input: &[T], threshold: usize, f: F) -> Vec<U>
where
    T: Send + Sync,
    U: Send,
    F: Fn(&T) -> U + Sync,
{
    use rayon::prelude::*;
    if input.len() >= threshold {
        input.par_iter().map(|t| f(t)).collect()
    } else {
        input.iter().map(|t| f(t)).collect()
    }
}

#[cfg(not(feature = "rayon"))]
fn maybe_par_map_impl<T, U, F>(input: &[T], _threshold: usize, f: F) -> Vec<U>
where
    T: Send + Sync,
    U: Send,
    F: Fn(&T) -> U + Sync,
{
    input.iter().map(|t| f(t)).collect()
}
