//! Fixed-size key material for revision 6.
//!
//! Byte strings read from an encryption dictionary are checked once, when
//! they are turned into these types; everything past that point works on
//! arrays whose lengths cannot be wrong.

use zeroize::Zeroize;

use super::random;
use crate::error::{Error, Result};

/// File encryption key length (AES-256).
pub const KEY_SIZE: usize = 32;
/// Validation and key salt length.
pub const SALT_SIZE: usize = 8;
/// Length of the hash stored at the start of U and O.
pub const HASH_SIZE: usize = 32;
/// Length of a U or O string.
pub const RECORD_SIZE: usize = HASH_SIZE + 2 * SALT_SIZE;

/// An 8-byte validation or key salt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Salt(pub [u8; SALT_SIZE]);

impl Salt {
    /// Generate a fresh random salt.
    pub fn generate() -> Result<Self> {
        Ok(Self(random::random_array()?))
    }

    /// The salt bytes.
    pub fn as_bytes(&self) -> &[u8; SALT_SIZE] {
        &self.0
    }
}

/// The 256-bit file encryption key. Zeroized on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct FileEncryptionKey {
    bytes: [u8; KEY_SIZE],
}

impl FileEncryptionKey {
    /// Wrap existing key bytes.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Build a key from a recovered byte vector, checking its length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| Error::InvalidRecordLength {
            record: "FileEncryptionKey",
            expected: KEY_SIZE,
            found: bytes.len(),
        })?;
        Ok(Self { bytes })
    }

    /// Generate a random file encryption key.
    pub fn generate() -> Result<Self> {
        Ok(Self::from_bytes(random::random_array()?))
    }

    /// The key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl Drop for FileEncryptionKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for FileEncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileEncryptionKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// A U or O string: 32-byte hash, validation salt, key salt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordRecord {
    /// Algorithm 2.B hash over the password and validation salt
    pub hash: [u8; HASH_SIZE],
    /// Salt used for password validation
    pub validation_salt: Salt,
    /// Salt used to derive the key that wraps the file encryption key
    pub key_salt: Salt,
}

impl PasswordRecord {
    /// Parse the 48-byte U or O string of an encryption dictionary.
    ///
    /// `record` names the entry ("U" or "O") for error reporting.
    pub fn from_bytes(record: &'static str, bytes: &[u8]) -> Result<Self> {
        if bytes.len() != RECORD_SIZE {
            return Err(Error::InvalidRecordLength {
                record,
                expected: RECORD_SIZE,
                found: bytes.len(),
            });
        }

        let mut hash = [0u8; HASH_SIZE];
        let mut validation_salt = [0u8; SALT_SIZE];
        let mut key_salt = [0u8; SALT_SIZE];
        hash.copy_from_slice(&bytes[..HASH_SIZE]);
        validation_salt.copy_from_slice(&bytes[HASH_SIZE..HASH_SIZE + SALT_SIZE]);
        key_salt.copy_from_slice(&bytes[HASH_SIZE + SALT_SIZE..]);

        Ok(Self {
            hash,
            validation_salt: Salt(validation_salt),
            key_salt: Salt(key_salt),
        })
    }

    /// Serialize to the 48-byte dictionary layout.
    pub fn to_bytes(&self) -> [u8; RECORD_SIZE] {
        let mut bytes = [0u8; RECORD_SIZE];
        bytes[..HASH_SIZE].copy_from_slice(&self.hash);
        bytes[HASH_SIZE..HASH_SIZE + SALT_SIZE].copy_from_slice(&self.validation_salt.0);
        bytes[HASH_SIZE + SALT_SIZE..].copy_from_slice(&self.key_salt.0);
        bytes
    }
}

/// A UE or OE string: the file encryption key wrapped under a password-derived key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrappedKey(pub [u8; KEY_SIZE]);

impl WrappedKey {
    /// Parse the 32-byte UE or OE string of an encryption dictionary.
    pub fn from_bytes(record: &'static str, bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| Error::InvalidRecordLength {
            record,
            expected: KEY_SIZE,
            found: bytes.len(),
        })?;
        Ok(Self(bytes))
    }

    /// The wrapped key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}
