//! Deterministic key → index selection.
//!
//! A 32-bit FNV-1a fold over the key's code points. The output for a given
//! key never changes, which is what makes "same date, same record" hold
//! across processes and releases.

use crate::error::SelectionError;

const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

/// Hash a key to a non-negative 32-bit value.
///
/// The accumulator is read back as a signed 32-bit integer and its absolute
/// value taken, so the result lies in `0..=2^31`.
pub fn hash(key: &str) -> u32 {
    let mut acc = FNV_OFFSET_BASIS;
    for c in key.chars() {
        acc ^= c as u32;
        acc = acc.wrapping_mul(FNV_PRIME);
    }
    (acc as i32).unsigned_abs()
}

/// Map a key onto `0..length`.
pub fn index(key: &str, length: usize) -> Result<usize, SelectionError> {
    if length == 0 {
        return Err(SelectionError::EmptyCorpus);
    }
    Ok(hash(key) as usize % length)
}
