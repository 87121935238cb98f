//! Content encryption for strings and streams.
//!
//! Revision 6 uses the file encryption key directly for every object, so
//! the object and generation numbers accepted by the per-object methods do
//! not influence the key. Each call draws a fresh 16-byte IV, which is
//! prepended to the ciphertext.

use super::aes::{self, BLOCK_SIZE};
use super::keys::FileEncryptionKey;
use super::random;
use crate::error::Result;

/// Encrypts and decrypts PDF strings and streams with AES-256-CBC.
///
/// The context owns the file encryption key, which is zeroized when the
/// context is dropped. It holds no mutable state and can be shared across
/// threads behind an `Arc`.
#[derive(Debug, Clone)]
pub struct EncryptionContext {
    /// The 256-bit file encryption key
    file_key: FileEncryptionKey,
    /// Whether metadata streams are encrypted
    encrypt_metadata: bool,
}

impl EncryptionContext {
    /// Create a context for the given file encryption key.
    pub fn new(file_key: FileEncryptionKey) -> Self {
        Self {
            file_key,
            encrypt_metadata: true,
        }
    }

    /// Set whether metadata streams are encrypted.
    pub fn with_encrypt_metadata(mut self, encrypt_metadata: bool) -> Self {
        self.encrypt_metadata = encrypt_metadata;
        self
    }

    /// Encrypt a byte string.
    ///
    /// Returns `IV || ciphertext`. Input whose length is already a multiple
    /// of 16 (including empty input) is encrypted without padding.
    pub fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        let iv: [u8; BLOCK_SIZE] = random::random_array()?;
        let ciphertext = aes::aes256_encrypt(self.file_key.as_bytes(), &iv, data)?;

        let mut result = Vec::with_capacity(BLOCK_SIZE + ciphertext.len());
        result.extend_from_slice(&iv);
        result.extend(ciphertext);
        Ok(result)
    }

    /// Encrypt a string belonging to the given object.
    pub fn encrypt_string(&self, data: &[u8], _obj_num: u32, _gen_num: u16) -> Result<Vec<u8>> {
        self.encrypt(data)
    }

    /// Encrypt a stream belonging to the given object.
    pub fn encrypt_stream(&self, data: &[u8], _obj_num: u32, _gen_num: u16) -> Result<Vec<u8>> {
        self.encrypt(data)
    }

    /// Decrypt `IV || ciphertext` produced by [`encrypt`](Self::encrypt).
    ///
    /// Input shorter than one block decrypts to nothing. Trailing padding is
    /// removed only when it is well-formed.
    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        if data.len() < BLOCK_SIZE {
            log::warn!(
                "Encrypted data too short for IV: {} bytes, treating as empty",
                data.len()
            );
            return Ok(Vec::new());
        }

        let (iv, ciphertext) = data.split_at(BLOCK_SIZE);
        let mut iv_bytes = [0u8; BLOCK_SIZE];
        iv_bytes.copy_from_slice(iv);

        aes::aes256_decrypt(self.file_key.as_bytes(), &iv_bytes, ciphertext)
    }

    /// Check if metadata should be encrypted.
    pub fn encrypt_metadata(&self) -> bool {
        self.encrypt_metadata
    }

    /// The file encryption key.
    pub fn file_key(&self) -> &FileEncryptionKey {
        &self.file_key
    }
}
