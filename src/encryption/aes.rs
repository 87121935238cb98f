//! AES encryption/decryption for PDF.
//!
//! Revision 6 uses AES in three ways:
//! - AES-128-CBC without padding inside the Algorithm 2.B hash rounds
//! - AES-256-CBC without padding and a zero IV to wrap the file encryption key (UE/OE)
//! - AES-256-ECB on exactly one block for the Perms entry
//!
//! Content strings and streams use AES-256-CBC with a random IV prefixed to
//! the ciphertext and the padding rule in [`pad_to_block`].
//!
//! ISO 32000-2: Section 7.6.3 - General Encryption Algorithm

use aes::cipher::block_padding::NoPadding;
use aes::cipher::{BlockDecrypt, BlockDecryptMut, BlockEncrypt, BlockEncryptMut, KeyInit, KeyIvInit};
use aes::{Aes128, Aes256};
use cbc::{Decryptor, Encryptor};

use crate::error::{Error, Result};

type Aes128CbcEnc = Encryptor<Aes128>;
type Aes256CbcEnc = Encryptor<Aes256>;
type Aes256CbcDec = Decryptor<Aes256>;

/// AES block size in bytes.
pub const BLOCK_SIZE: usize = 16;

/// Encrypt `data` in place with AES-128-CBC and no padding.
///
/// `data.len()` must be a multiple of 16.
pub fn aes128_cbc_encrypt_in_place(
    key: &[u8; 16],
    iv: &[u8; BLOCK_SIZE],
    data: &mut [u8],
) -> Result<()> {
    let len = data.len();
    Aes128CbcEnc::new(key.as_slice().into(), iv.as_slice().into())
        .encrypt_padded_mut::<NoPadding>(data, len)
        .map_err(|_| Error::Cipher("AES-128-CBC input is not block aligned".to_string()))?;
    Ok(())
}

/// Encrypt `data` in place with AES-256-CBC and no padding.
///
/// `data.len()` must be a multiple of 16.
pub fn aes256_cbc_encrypt_in_place(
    key: &[u8; 32],
    iv: &[u8; BLOCK_SIZE],
    data: &mut [u8],
) -> Result<()> {
    let len = data.len();
    Aes256CbcEnc::new(key.as_slice().into(), iv.as_slice().into())
        .encrypt_padded_mut::<NoPadding>(data, len)
        .map_err(|_| Error::Cipher("AES-256-CBC input is not block aligned".to_string()))?;
    Ok(())
}

/// Decrypt `data` in place with AES-256-CBC and no padding.
///
/// Returns the number of bytes produced.
pub fn aes256_cbc_decrypt_in_place(
    key: &[u8; 32],
    iv: &[u8; BLOCK_SIZE],
    data: &mut [u8],
) -> Result<usize> {
    let decrypted = Aes256CbcDec::new(key.as_slice().into(), iv.as_slice().into())
        .decrypt_padded_mut::<NoPadding>(data)
        .map_err(|_| Error::Cipher("AES-256-CBC input is not block aligned".to_string()))?;
    Ok(decrypted.len())
}

/// Encrypt a single block with AES-256 (ECB).
pub fn aes256_ecb_encrypt_block(key: &[u8; 32], block: &mut [u8; BLOCK_SIZE]) {
    let cipher = Aes256::new(key.as_slice().into());
    cipher.encrypt_block(block.as_mut_slice().into());
}

/// Decrypt a single block with AES-256 (ECB).
pub fn aes256_ecb_decrypt_block(key: &[u8; 32], block: &mut [u8; BLOCK_SIZE]) {
    let cipher = Aes256::new(key.as_slice().into());
    cipher.decrypt_block(block.as_mut_slice().into());
}

/// Pad content to a whole number of AES blocks.
///
/// Each pad byte holds the number of bytes added. Unlike PKCS#7, input that
/// is already block aligned (including empty input) is left unpadded.
pub fn pad_to_block(data: &[u8]) -> Vec<u8> {
    let padded_len = data.len().div_ceil(BLOCK_SIZE) * BLOCK_SIZE;
    let padding_len = padded_len - data.len();

    let mut padded = Vec::with_capacity(padded_len);
    padded.extend_from_slice(data);
    padded.resize(padded_len, padding_len as u8);
    padded
}

/// Strip a trailing pad run written by [`pad_to_block`], if one is present.
///
/// Block aligned content carries no padding, so a trailer that does not look
/// like padding is kept as content.
pub fn strip_padding(data: &[u8]) -> &[u8] {
    let Some(&last) = data.last() else {
        return data;
    };

    let padding_len = last as usize;
    if padding_len == 0 || padding_len >= BLOCK_SIZE || padding_len > data.len() {
        return data;
    }

    let data_len = data.len() - padding_len;
    if data[data_len..].iter().all(|&byte| byte == last) {
        &data[..data_len]
    } else {
        data
    }
}

/// Encrypt content with AES-256-CBC under `iv`, padding with [`pad_to_block`].
pub fn aes256_encrypt(key: &[u8; 32], iv: &[u8; BLOCK_SIZE], data: &[u8]) -> Result<Vec<u8>> {
    let mut padded = pad_to_block(data);
    aes256_cbc_encrypt_in_place(key, iv, &mut padded)?;
    Ok(padded)
}

/// Decrypt content with AES-256-CBC under `iv` and strip padding.
pub fn aes256_decrypt(key: &[u8; 32], iv: &[u8; BLOCK_SIZE], data: &[u8]) -> Result<Vec<u8>> {
    if data.is_empty() {
        return Ok(Vec::new());
    }
    if data.len() % BLOCK_SIZE != 0 {
        return Err(Error::Cipher(format!(
            "Encrypted data length {} is not a multiple of 16",
            data.len()
        )));
    }

    let mut buffer = data.to_vec();
    let len = aes256_cbc_decrypt_in_place(key, iv, &mut buffer)?;
    buffer.truncate(len);

    let content_len = strip_padding(&buffer).len();
    buffer.truncate(content_len);
    Ok(buffer)
}
