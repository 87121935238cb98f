//! Random bytes for salts, file encryption keys, IVs and Perms filler.
//!
//! Everything comes from the operating system CSPRNG. `OsRng` holds no
//! state, so concurrent callers need no locking.

use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{Error, Result};

/// Fill `buf` from the OS random number generator.
pub(crate) fn fill_random(buf: &mut [u8]) -> Result<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| Error::Random(e.to_string()))
}

/// Generate `N` random bytes.
pub(crate) fn random_array<const N: usize>() -> Result<[u8; N]> {
    let mut bytes = [0u8; N];
    fill_random(&mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_arrays_differ() {
        let a: [u8; 32] = random_array().unwrap();
        let b: [u8; 32] = random_array().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_fill_random_empty() {
        fill_random(&mut []).unwrap();
    }
}
