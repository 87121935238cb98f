//! PDF encryption algorithms for revision 6.
//!
//! This module implements the password hash, the U/UE and O/OE records and
//! password validation of the Standard Security Handler.
//!
//! ISO 32000-2:2020 Section 7.6.4.3.3 - Algorithms 2.A, 2.B, 8, 9, 11 and 12

use zeroize::Zeroize;

use super::aes;
use super::digest::HashAlgorithm;
use super::keys::{FileEncryptionKey, PasswordRecord, Salt, WrappedKey, HASH_SIZE, RECORD_SIZE};
use super::primitives::{CryptoProvider, RustCrypto};
use crate::error::Result;

/// Passwords are limited to 127 bytes of UTF-8.
pub const MAX_PASSWORD_LEN: usize = 127;

/// Algorithm 2.B always runs at least this many rounds.
pub const MIN_ROUNDS: u32 = 64;

/// Repetitions of K0 that make up K1 in every round.
const K1_REPETITIONS: usize = 64;

/// UE and OE are wrapped with a zero initialization vector.
const ZERO_IV: [u8; 16] = [0u8; 16];

/// Compute a hash (revision 6).
///
/// ISO 32000-2: Algorithm 2.B - Computing a hash
///
/// # Arguments
///
/// * `password` - UTF-8 password bytes
/// * `salt` - Validation or key salt
/// * `user_key` - The 48-byte U string when hashing for the owner password
///
/// # Returns
///
/// The 32-byte hash
pub fn compute_hash_r6(
    password: &[u8],
    salt: &Salt,
    user_key: Option<&[u8; RECORD_SIZE]>,
) -> Result<[u8; HASH_SIZE]> {
    compute_hash_r6_with(&RustCrypto, password, salt, user_key)
}

/// [`compute_hash_r6`] with an explicit hash/cipher provider.
pub fn compute_hash_r6_with<P: CryptoProvider>(
    provider: &P,
    password: &[u8],
    salt: &Salt,
    user_key: Option<&[u8; RECORD_SIZE]>,
) -> Result<[u8; HASH_SIZE]> {
    let user_key: &[u8] = user_key.map(|u| u.as_slice()).unwrap_or(&[]);

    // Round 0: K = SHA-256(password || salt || U)
    let mut k = provider.digest(
        HashAlgorithm::Sha256,
        &[password, salt.as_bytes().as_slice(), user_key],
    );

    // K may grow to 64 bytes (SHA-512), size the buffer for the largest K0
    let mut k1 = Vec::with_capacity(K1_REPETITIONS * (password.len() + 64 + user_key.len()));
    let mut round: u32 = 0;

    loop {
        // K1 = 64 repetitions of K0 = password || K || U
        k1.clear();
        for _ in 0..K1_REPETITIONS {
            k1.extend_from_slice(password);
            k1.extend_from_slice(&k);
            k1.extend_from_slice(user_key);
        }

        // E = AES-128-CBC(K1), key = K[0..16], IV = K[16..32]. K1 is a multiple
        // of 64 bytes, so no padding is needed.
        let mut key = [0u8; 16];
        let mut iv = [0u8; 16];
        key.copy_from_slice(&k[..16]);
        iv.copy_from_slice(&k[16..32]);
        provider.aes128_cbc_encrypt(&key, &iv, &mut k1)?;
        let e = &k1;

        // Next K is SHA-256/384/512(E), chosen by the first 16 bytes of E mod 3
        k = provider.digest(HashAlgorithm::for_round(e), &[e.as_slice()]);
        round += 1;

        let last = e[e.len() - 1];
        if round >= MIN_ROUNDS && u32::from(last) <= round - 32 {
            break;
        }
    }

    log::debug!("Algorithm 2.B finished after {} rounds", round);

    let mut hash = [0u8; HASH_SIZE];
    hash.copy_from_slice(&k[..HASH_SIZE]);
    k.zeroize();
    k1.zeroize();
    Ok(hash)
}

/// Compute the U and UE entries (revision 6).
///
/// ISO 32000-2: Algorithm 8 - Computing the encryption dictionary's U and UE
///
/// Fresh validation and key salts are drawn from the OS random number generator.
pub fn generate_u_and_ue(
    password: &[u8],
    file_key: &FileEncryptionKey,
) -> Result<(PasswordRecord, WrappedKey)> {
    generate_u_and_ue_with_salts(password, file_key, Salt::generate()?, Salt::generate()?)
}

/// [`generate_u_and_ue`] with caller-supplied salts.
pub fn generate_u_and_ue_with_salts(
    password: &[u8],
    file_key: &FileEncryptionKey,
    validation_salt: Salt,
    key_salt: Salt,
) -> Result<(PasswordRecord, WrappedKey)> {
    derive_record(password, file_key, validation_salt, key_salt, None)
}

/// Compute the O and OE entries (revision 6).
///
/// ISO 32000-2: Algorithm 9 - Computing the encryption dictionary's O and OE
///
/// O mixes in the complete U string, so U must be computed first.
pub fn generate_o_and_oe(
    password: &[u8],
    file_key: &FileEncryptionKey,
    user_record: &PasswordRecord,
) -> Result<(PasswordRecord, WrappedKey)> {
    generate_o_and_oe_with_salts(
        password,
        file_key,
        user_record,
        Salt::generate()?,
        Salt::generate()?,
    )
}

/// [`generate_o_and_oe`] with caller-supplied salts.
pub fn generate_o_and_oe_with_salts(
    password: &[u8],
    file_key: &FileEncryptionKey,
    user_record: &PasswordRecord,
    validation_salt: Salt,
    key_salt: Salt,
) -> Result<(PasswordRecord, WrappedKey)> {
    let user_key = user_record.to_bytes();
    derive_record(password, file_key, validation_salt, key_salt, Some(&user_key))
}

fn derive_record(
    password: &[u8],
    file_key: &FileEncryptionKey,
    validation_salt: Salt,
    key_salt: Salt,
    user_key: Option<&[u8; RECORD_SIZE]>,
) -> Result<(PasswordRecord, WrappedKey)> {
    let password = truncate_password(password);

    let hash = compute_hash_r6(password, &validation_salt, user_key)?;

    // The intermediate key wraps the file key with AES-256-CBC, zero IV, no padding
    let mut intermediate_key = compute_hash_r6(password, &key_salt, user_key)?;
    let mut wrapped = *file_key.as_bytes();
    let result = aes::aes256_cbc_encrypt_in_place(&intermediate_key, &ZERO_IV, &mut wrapped);
    intermediate_key.zeroize();
    result?;

    Ok((
        PasswordRecord {
            hash,
            validation_salt,
            key_salt,
        },
        WrappedKey(wrapped),
    ))
}

/// Authenticate the user password (revision 6).
///
/// ISO 32000-2: Algorithm 11 - Authenticating the user password
pub fn validate_user_password(password: &[u8], user_record: &PasswordRecord) -> Result<bool> {
    let password = truncate_password(password);
    let hash = compute_hash_r6(password, &user_record.validation_salt, None)?;
    Ok(constant_time_compare(&hash, &user_record.hash))
}

/// Authenticate the owner password (revision 6).
///
/// ISO 32000-2: Algorithm 12 - Authenticating the owner password
pub fn validate_owner_password(
    password: &[u8],
    owner_record: &PasswordRecord,
    user_record: &PasswordRecord,
) -> Result<bool> {
    let password = truncate_password(password);
    let user_key = user_record.to_bytes();
    let hash = compute_hash_r6(password, &owner_record.validation_salt, Some(&user_key))?;
    Ok(constant_time_compare(&hash, &owner_record.hash))
}

/// Unwrap the file encryption key from UE or OE.
///
/// ISO 32000-2: Algorithm 2.A, steps (d) and (e)
///
/// Pass `user_record` (the U string) when unwrapping OE with the owner password,
/// `None` when unwrapping UE with the user password. The password is not
/// validated here; a wrong password yields a wrong key. An empty result means
/// the unwrap produced nothing.
pub fn decrypt_key(
    password: &[u8],
    record: &PasswordRecord,
    wrapped: &WrappedKey,
    user_record: Option<&PasswordRecord>,
) -> Result<Vec<u8>> {
    let password = truncate_password(password);
    let user_key = user_record.map(PasswordRecord::to_bytes);

    let mut intermediate_key = compute_hash_r6(password, &record.key_salt, user_key.as_ref())?;
    let mut buffer = *wrapped.as_bytes();
    let result = aes::aes256_cbc_decrypt_in_place(&intermediate_key, &ZERO_IV, &mut buffer);
    intermediate_key.zeroize();

    let produced = result?;
    if produced == 0 {
        return Ok(Vec::new());
    }

    let key = buffer[..produced].to_vec();
    buffer.zeroize();
    Ok(key)
}

/// Truncate a password to 127 bytes on a UTF-8 character boundary.
pub fn truncate_password(password: &[u8]) -> &[u8] {
    if password.len() <= MAX_PASSWORD_LEN {
        return password;
    }

    let mut end = MAX_PASSWORD_LEN;
    while end > 0 && (password[end] & 0xC0) == 0x80 {
        end -= 1;
    }
    &password[..end]
}

/// Constant-time comparison to prevent timing attacks.
///
/// Returns true if the slices are equal.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn hex32(s: &str) -> [u8; 32] {
        hex::decode(s).unwrap().try_into().unwrap()
    }

    /// Wraps the default provider and counts AES-128 invocations (one per round).
    #[derive(Default)]
    struct CountingProvider {
        rounds: Cell<u32>,
    }

    impl CryptoProvider for CountingProvider {
        fn digest(&self, algorithm: HashAlgorithm, parts: &[&[u8]]) -> Vec<u8> {
            RustCrypto.digest(algorithm, parts)
        }

        fn aes128_cbc_encrypt(
            &self,
            key: &[u8; 16],
            iv: &[u8; 16],
            data: &mut [u8],
        ) -> Result<()> {
            self.rounds.set(self.rounds.get() + 1);
            RustCrypto.aes128_cbc_encrypt(key, iv, data)
        }
    }

    #[test]
    fn test_hash_r6_reference_vector() {
        let hash = compute_hash_r6(b"test", &Salt([0u8; 8]), None).unwrap();
        assert_eq!(
            hash,
            hex32("f3f8c6879f3d70dc0ec118d318afd2f00b5b54744f5fd6c737477475e8eb0626")
        );
    }

    #[test]
    fn test_hash_r6_empty_password_vector() {
        let hash = compute_hash_r6(b"", &Salt([0u8; 8]), None).unwrap();
        assert_eq!(
            hash,
            hex32("439feba099a63d0d035a1e5fb67ff307329189584956425aff2d3bd3d15edc60")
        );
    }

    #[test]
    fn test_hash_r6_with_user_key_vector() {
        let user_key: [u8; 48] = std::array::from_fn(|i| i as u8);
        let salt = Salt(std::array::from_fn(|i| i as u8));

        let hash = compute_hash_r6(b"owner", &salt, Some(&user_key)).unwrap();
        assert_eq!(
            hash,
            hex32("f77bbaa82ba46eca0e3997ad8c91b9fa4a3f83750e13a950f901abef1f69b683")
        );

        // The user key changes every round's input
        let without = compute_hash_r6(b"owner", &salt, None).unwrap();
        assert_ne!(hash, without);
    }

    #[test]
    fn test_hash_r6_runs_at_least_64_rounds() {
        let provider = CountingProvider::default();
        let hash = compute_hash_r6_with(&provider, b"test", &Salt([0u8; 8]), None).unwrap();

        assert!(provider.rounds.get() >= MIN_ROUNDS);
        assert_eq!(provider.rounds.get(), 69);
        assert_eq!(hash, compute_hash_r6(b"test", &Salt([0u8; 8]), None).unwrap());
    }

    #[test]
    fn test_hash_r6_round_floor_for_many_inputs() {
        for i in 0u8..8 {
            let provider = CountingProvider::default();
            compute_hash_r6_with(&provider, &[b'p', i], &Salt([i; 8]), None).unwrap();
            assert!(provider.rounds.get() >= MIN_ROUNDS);
        }
    }

    #[test]
    fn test_u_and_ue_reference_vector() {
        let file_key = FileEncryptionKey::from_bytes([0u8; 32]);
        let (u, ue) =
            generate_u_and_ue_with_salts(b"user", &file_key, Salt([1; 8]), Salt([2; 8])).unwrap();

        assert_eq!(
            hex::encode(u.to_bytes()),
            "273444d38b9bfa2ef7f9ec30b363c84a94e674abb67e0e8c8ca3479a96551090\
             01010101010101010202020202020202"
        );
        assert_eq!(
            hex::encode(ue.as_bytes()),
            "125f0d21c44c8793c6a8b8eef224ae53910b323ae1b86ebeacfa31522bdebcba"
        );
    }

    #[test]
    fn test_o_and_oe_reference_vector() {
        let file_key = FileEncryptionKey::from_bytes([0u8; 32]);
        let (u, _) =
            generate_u_and_ue_with_salts(b"user", &file_key, Salt([1; 8]), Salt([2; 8])).unwrap();
        let (o, oe) =
            generate_o_and_oe_with_salts(b"owner", &file_key, &u, Salt([3; 8]), Salt([4; 8]))
                .unwrap();

        assert_eq!(
            hex::encode(o.to_bytes()),
            "9f982be98253f0645861cac62fb244eac286ca130f3246b202b4aadcf58d8d0b\
             03030303030303030404040404040404"
        );
        assert_eq!(
            hex::encode(oe.as_bytes()),
            "4b47fe7750e5a9fe94b9044a17dd3f351f43517c9ffe72db4ad775a72a89eb4b"
        );
    }

    #[test]
    fn test_user_round_trip() {
        let file_key = FileEncryptionKey::generate().unwrap();
        let (u, ue) = generate_u_and_ue(b"secret", &file_key).unwrap();

        assert!(validate_user_password(b"secret", &u).unwrap());
        let recovered = decrypt_key(b"secret", &u, &ue, None).unwrap();
        assert_eq!(&recovered[..], file_key.as_bytes());
    }

    #[test]
    fn test_wrong_password_single_byte_flip() {
        let file_key = FileEncryptionKey::generate().unwrap();
        let (u, ue) = generate_u_and_ue(b"secret", &file_key).unwrap();

        assert!(!validate_user_password(b"secreu", &u).unwrap());
        assert!(!validate_user_password(b"", &u).unwrap());

        let wrong = decrypt_key(b"secreu", &u, &ue, None).unwrap();
        assert_ne!(&wrong[..], file_key.as_bytes());
    }

    #[test]
    fn test_owner_round_trip() {
        let file_key = FileEncryptionKey::generate().unwrap();
        let (u, ue) = generate_u_and_ue(b"user", &file_key).unwrap();
        let (o, oe) = generate_o_and_oe(b"owner", &file_key, &u).unwrap();

        assert!(validate_owner_password(b"owner", &o, &u).unwrap());
        assert!(!validate_owner_password(b"user", &o, &u).unwrap());
        assert!(!validate_user_password(b"owner", &u).unwrap());

        let from_owner = decrypt_key(b"owner", &o, &oe, Some(&u)).unwrap();
        let from_user = decrypt_key(b"user", &u, &ue, None).unwrap();
        assert_eq!(&from_owner[..], file_key.as_bytes());
        assert_eq!(from_owner, from_user);
    }

    #[test]
    fn test_owner_depends_on_user_record() {
        let file_key = FileEncryptionKey::generate().unwrap();
        let (u1, _) =
            generate_u_and_ue_with_salts(b"alice", &file_key, Salt([1; 8]), Salt([2; 8])).unwrap();
        let (u2, _) =
            generate_u_and_ue_with_salts(b"bob", &file_key, Salt([1; 8]), Salt([2; 8])).unwrap();

        let (o1, _) =
            generate_o_and_oe_with_salts(b"owner", &file_key, &u1, Salt([3; 8]), Salt([4; 8]))
                .unwrap();
        let (o2, _) =
            generate_o_and_oe_with_salts(b"owner", &file_key, &u2, Salt([3; 8]), Salt([4; 8]))
                .unwrap();

        assert_ne!(o1.hash, o2.hash);
        // An O string only validates against the U it was built from
        assert!(validate_owner_password(b"owner", &o1, &u1).unwrap());
        assert!(!validate_owner_password(b"owner", &o1, &u2).unwrap());
    }

    #[test]
    fn test_fresh_salts_per_call() {
        let file_key = FileEncryptionKey::generate().unwrap();
        let (u1, ue1) = generate_u_and_ue(b"same", &file_key).unwrap();
        let (u2, ue2) = generate_u_and_ue(b"same", &file_key).unwrap();

        assert_ne!(u1, u2);
        assert_ne!(ue1, ue2);
        assert_ne!(u1.validation_salt, u1.key_salt);
    }

    #[test]
    fn test_truncate_password() {
        assert_eq!(truncate_password(b"short"), b"short");

        let long = vec![b'a'; 200];
        assert_eq!(truncate_password(&long).len(), MAX_PASSWORD_LEN);

        // 126 ASCII bytes followed by a 2-byte character straddling the limit
        let mut straddling = vec![b'a'; 126];
        straddling.extend_from_slice("é".as_bytes());
        assert_eq!(truncate_password(&straddling).len(), 126);
    }

    #[test]
    fn test_long_password_validates_after_truncation() {
        let file_key = FileEncryptionKey::generate().unwrap();
        let long = vec![b'x'; 300];
        let (u, _) = generate_u_and_ue(&long, &file_key).unwrap();

        assert!(validate_user_password(&long[..MAX_PASSWORD_LEN], &u).unwrap());
        assert!(validate_user_password(&long[..250], &u).unwrap());
        assert!(!validate_user_password(&long[..126], &u).unwrap());
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare(b"test1234", b"test1234"));
        assert!(!constant_time_compare(b"test1234", b"test1235"));
        assert!(!constant_time_compare(b"test", b"testing"));
    }
}
