//! SHA-2 hashing used by Algorithm 2.B.

use sha2::{Digest, Sha256, Sha384, Sha512};

/// The SHA-2 variant selected for a hash round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    /// SHA-256 (32-byte digest)
    Sha256,
    /// SHA-384 (48-byte digest)
    Sha384,
    /// SHA-512 (64-byte digest)
    Sha512,
}

impl HashAlgorithm {
    /// Select the next round's hash from the sum of the first 16 bytes of E.
    ///
    /// The sum mod 3 equals the 128-bit big-endian value mod 3, since 256 ≡ 1 (mod 3).
    ///
    /// # Panics
    ///
    /// Panics if `e` is shorter than 16 bytes. E is always at least 64 bytes.
    pub(crate) fn for_round(e: &[u8]) -> Self {
        let sum: u32 = e[..16].iter().map(|&b| b as u32).sum();
        match sum % 3 {
            0 => HashAlgorithm::Sha256,
            1 => HashAlgorithm::Sha384,
            _ => HashAlgorithm::Sha512,
        }
    }

    /// Digest length in bytes.
    pub fn output_len(self) -> usize {
        match self {
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }

    /// Hash the concatenation of `parts`.
    pub fn digest(self, parts: &[&[u8]]) -> Vec<u8> {
        match self {
            HashAlgorithm::Sha256 => digest_parts::<Sha256>(parts),
            HashAlgorithm::Sha384 => digest_parts::<Sha384>(parts),
            HashAlgorithm::Sha512 => digest_parts::<Sha512>(parts),
        }
    }
}

fn digest_parts<D: Digest>(parts: &[&[u8]]) -> Vec<u8> {
    let mut hasher = D::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().to_vec()
}
