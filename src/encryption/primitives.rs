//! Cryptographic primitives behind Algorithm 2.B.
//!
//! [`compute_hash_r6_with`](super::algorithms::compute_hash_r6_with) is generic
//! over [`CryptoProvider`], so a caller can swap or instrument the hash and
//! cipher backends. [`RustCrypto`] is the default.

use super::aes;
use super::digest::HashAlgorithm;
use crate::error::Result;

/// Hash and block cipher operations needed by the revision 6 hash.
pub trait CryptoProvider {
    /// Hash the concatenation of `parts` with `algorithm`.
    fn digest(&self, algorithm: HashAlgorithm, parts: &[&[u8]]) -> Vec<u8>;

    /// AES-128-CBC encrypt `data` in place, no padding.
    fn aes128_cbc_encrypt(&self, key: &[u8; 16], iv: &[u8; 16], data: &mut [u8]) -> Result<()>;
}

/// Provider backed by the `sha2`, `aes` and `cbc` crates.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustCrypto;

impl CryptoProvider for RustCrypto {
    fn digest(&self, algorithm: HashAlgorithm, parts: &[&[u8]]) -> Vec<u8> {
        algorithm.digest(parts)
    }

    fn aes128_cbc_encrypt(&self, key: &[u8; 16], iv: &[u8; 16], data: &mut [u8]) -> Result<()> {
        aes::aes128_cbc_encrypt_in_place(key, iv, data)
    }
}

impl<P: CryptoProvider + ?Sized> CryptoProvider for &P {
    fn digest(&self, algorithm: HashAlgorithm, parts: &[&[u8]]) -> Vec<u8> {
        (**self).digest(algorithm, parts)
    }

    fn aes128_cbc_encrypt(&self, key: &[u8; 16], iv: &[u8; 16], data: &mut [u8]) -> Result<()> {
        (**self).aes128_cbc_encrypt(key, iv, data)
    }
}
