//! The encrypted permissions block (/Perms).
//!
//! ISO 32000-2: Algorithm 10 (creating Perms) and Algorithm 13 (validating Perms)
//!
//! Layout of the 16-byte plaintext:
//!
//! | Bytes | Content |
//! |-------|---------|
//! | 0-3   | P, little-endian |
//! | 4-7   | 0xFF |
//! | 8     | `T` or `F` (EncryptMetadata) |
//! | 9-11  | `adb` |
//! | 12-15 | random, ignored |

use super::aes::{self, BLOCK_SIZE};
use super::keys::FileEncryptionKey;
use super::random;
use crate::error::{Error, Result};

const MARKER: &[u8; 3] = b"adb";

/// Build the plaintext permissions block with random filler bytes.
pub fn create_perms(permissions: i32, encrypt_metadata: bool) -> Result<[u8; BLOCK_SIZE]> {
    let filler: [u8; 4] = random::random_array()?;
    Ok(create_perms_with_filler(permissions, encrypt_metadata, filler))
}

/// Build the plaintext permissions block with the given bytes 12-15.
pub fn create_perms_with_filler(
    permissions: i32,
    encrypt_metadata: bool,
    filler: [u8; 4],
) -> [u8; BLOCK_SIZE] {
    let mut block = [0u8; BLOCK_SIZE];
    block[..4].copy_from_slice(&permissions.to_le_bytes());
    block[4..8].fill(0xFF);
    block[8] = if encrypt_metadata { b'T' } else { b'F' };
    block[9..12].copy_from_slice(MARKER);
    block[12..].copy_from_slice(&filler);
    block
}

/// Encrypt the permissions block as one AES-256-ECB block under the file key.
pub fn encrypt_perms(block: &[u8; BLOCK_SIZE], file_key: &FileEncryptionKey) -> [u8; BLOCK_SIZE] {
    let mut encrypted = *block;
    aes::aes256_ecb_encrypt_block(file_key.as_bytes(), &mut encrypted);
    encrypted
}

/// Decrypt the /Perms string.
///
/// Fails only when the string is not exactly 16 bytes; whether the content
/// makes sense is reported by [`PermsBlock::is_valid`].
pub fn decrypt_perms(encrypted: &[u8], file_key: &FileEncryptionKey) -> Result<PermsBlock> {
    let mut block: [u8; BLOCK_SIZE] =
        encrypted.try_into().map_err(|_| Error::InvalidRecordLength {
            record: "Perms",
            expected: BLOCK_SIZE,
            found: encrypted.len(),
        })?;
    aes::aes256_ecb_decrypt_block(file_key.as_bytes(), &mut block);
    Ok(PermsBlock(block))
}

/// A decrypted permissions block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermsBlock(pub [u8; BLOCK_SIZE]);

impl PermsBlock {
    /// The P value stored in bytes 0-3.
    pub fn permissions(&self) -> i32 {
        i32::from_le_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    /// The EncryptMetadata flag stored in byte 8.
    pub fn encrypt_metadata(&self) -> bool {
        self.0[8] == b'T'
    }

    /// Whether bytes 9-11 hold the `adb` marker.
    pub fn is_valid(&self) -> bool {
        &self.0[9..12] == MARKER
    }

    /// Check the block against the P and EncryptMetadata dictionary entries.
    pub fn matches(&self, permissions: i32, encrypt_metadata: bool) -> bool {
        self.is_valid()
            && self.permissions() == permissions
            && self.0[8] == if encrypt_metadata { b'T' } else { b'F' }
    }
}
