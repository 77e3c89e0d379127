//! GF(2^8) arithmetic over the AES/Rijndael primitive polynomial `0x11D`.
//!
//! Precomputes a length-255 discrete-log table and a doubled (length-512)
//! exponential table so `exp[a+b]` never needs a modular reduction in the
//! hot multiply path. Ported from first principles rather than wrapping a
//! third-party GF(256)/RS crate: the product code's cross-parity
//! commutativity invariant and the repair executor's manual decode (§4.1,
//! §4.6, §9 of the design) need direct access to log/exp tables and
//! Gaussian elimination, not an opaque `encode`/`reconstruct` pair.

pub mod matrix;

const GF_SIZE: usize = 256;
const PRIMITIVE_POLY: u16 = 0x11D;

struct Tables {
    log: [u8; GF_SIZE],
    exp: [u8; 2 * GF_SIZE],
}

fn build_tables() -> Tables {
    let mut exp = [0u8; 2 * GF_SIZE];
    let mut log = [0u8; GF_SIZE];

    exp[0] = 1;
    for i in 1..512usize {
        let prev = exp[i - 1] as u16;
        let mut cur = prev << 1;
        if prev & 0x80 != 0 {
            cur ^= PRIMITIVE_POLY;
        }
        exp[i] = (cur & 0xFF) as u8;
    }
    for i in 0..255usize {
        log[exp[i] as usize] = i as u8;
    }

    Tables { log, exp }
}

fn tables() -> &'static Tables {
    use once_cell::sync::OnceCell;
    static TABLES: OnceCell<Tables> = OnceCell::new();
    TABLES.get_or_init(build_tables)
}

/// Multiply two GF(2^8) elements.
#[inline]
pub fn mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    let t = tables();
    let sum = t.log[a as usize] as usize + t.log[b as usize] as usize;
    t.exp[sum % 255]
}

/// Multiplicative inverse of a nonzero GF(2^8) element.
///
/// # Panics
/// Panics if `a == 0` (zero has no inverse); callers in this crate always
/// guard against zero pivots before calling this.
#[inline]
pub fn inv(a: u8) -> u8 {
    assert!(a != 0, "gf256::inv: zero has no multiplicative inverse");
    let t = tables();
    t.exp[(255 - t.log[a as usize] as usize) % 255]
}

/// Raise `a` to the `n`-th power in GF(2^8).
#[inline]
pub fn pow(a: u8, n: u32) -> u8 {
    if n == 0 {
        return 1;
    }
    if a == 0 {
        return 0;
    }
    let t = tables();
    let log_a = t.log[a as usize] as u64;
    let exp_idx = (log_a * n as u64) % 255;
    t.exp[exp_idx as usize]
}

/// XOR `n` GF(2^8) coefficients times column vectors into `dst`:
/// `dst ^= sum_i coeffs[i] * cols[i]`, all slices of equal length.
#[inline]
pub fn mul_add_slices(dst: &mut [u8], coeffs: &[u8], cols: &[&[u8]]) {
    debug_assert_eq!(coeffs.len(), cols.len());
    for (&c, col) in coeffs.iter().zip(cols.iter()) {
        if c == 0 {
            continue;
        }
        debug_assert_eq!(dst.len(), col.len());
        for (d, &s) in dst.iter_mut().zip(col.iter()) {
            *d ^= mul(c, s);
        }
    }
}
