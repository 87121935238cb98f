//! Encryption setup for writing encrypted PDFs.
//!
//! Produces the /Encrypt dictionary entries (U, UE, O, OE, P, Perms) and the
//! [`EncryptionContext`] used to encrypt the document's strings and streams.

use super::algorithms;
use super::context::EncryptionContext;
use super::keys::FileEncryptionKey;
use super::perms;
use super::{EncryptDict, KEY_LENGTH_BITS, REVISION, VERSION};
use crate::config::{EncryptionConfig, Permissions};
use crate::error::Result;

/// Builder for a revision 6 encryption dictionary.
///
/// # Example
///
/// ```
/// use pdf_secure::config::Permissions;
/// use pdf_secure::encryption::EncryptDictBuilder;
///
/// # fn main() -> pdf_secure::error::Result<()> {
/// let (dict, context) = EncryptDictBuilder::new()
///     .user_password(b"user")
///     .owner_password(b"owner")
///     .permissions(Permissions::read_only().to_bits())
///     .build()?;
///
/// assert_eq!(dict.revision, 6);
/// assert!(context.encrypt_metadata());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct EncryptDictBuilder {
    user_password: Vec<u8>,
    owner_password: Vec<u8>,
    permissions: i32,
    encrypt_metadata: bool,
    file_key: Option<FileEncryptionKey>,
}

impl Default for EncryptDictBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EncryptDictBuilder {
    /// Create a builder with empty passwords and all permissions granted.
    pub fn new() -> Self {
        Self {
            user_password: Vec::new(),
            owner_password: Vec::new(),
            permissions: Permissions::all().to_bits(),
            encrypt_metadata: true,
            file_key: None,
        }
    }

    /// Set the user password (UTF-8 bytes).
    pub fn user_password(mut self, password: &[u8]) -> Self {
        self.user_password = password.to_vec();
        self
    }

    /// Set the owner password (UTF-8 bytes). Empty means the user password.
    pub fn owner_password(mut self, password: &[u8]) -> Self {
        self.owner_password = password.to_vec();
        self
    }

    /// Set the P value.
    pub fn permissions(mut self, permissions: i32) -> Self {
        self.permissions = permissions;
        self
    }

    /// Set whether metadata is encrypted.
    pub fn encrypt_metadata(mut self, encrypt: bool) -> Self {
        self.encrypt_metadata = encrypt;
        self
    }

    /// Use an existing file encryption key instead of generating one.
    pub fn file_key(mut self, file_key: FileEncryptionKey) -> Self {
        self.file_key = Some(file_key);
        self
    }

    /// Derive all dictionary entries and the matching content context.
    ///
    /// ISO 32000-2: Algorithms 8, 9 and 10, in that order, since O depends on U.
    pub fn build(self) -> Result<(EncryptDict, EncryptionContext)> {
        let file_key = match self.file_key {
            Some(key) => key,
            None => FileEncryptionKey::generate()?,
        };

        let (user_record, user_encryption) =
            algorithms::generate_u_and_ue(&self.user_password, &file_key)?;
        let owner_password = if self.owner_password.is_empty() {
            &self.user_password
        } else {
            &self.owner_password
        };
        let (owner_record, owner_encryption) =
            algorithms::generate_o_and_oe(owner_password, &file_key, &user_record)?;

        let block = perms::create_perms(self.permissions, self.encrypt_metadata)?;
        let perms = perms::encrypt_perms(&block, &file_key);

        let dict = EncryptDict {
            filter: "Standard".to_string(),
            sub_filter: None,
            version: VERSION,
            length: Some(KEY_LENGTH_BITS),
            revision: REVISION,
            owner_record,
            user_record,
            owner_encryption,
            user_encryption,
            permissions: self.permissions,
            perms,
            encrypt_metadata: self.encrypt_metadata,
        };

        let context = EncryptionContext::new(file_key).with_encrypt_metadata(self.encrypt_metadata);

        Ok((dict, context))
    }
}

/// Prepare encryption for a document from its configuration.
///
/// Returns `None` when the user password is empty, in which case the
/// document is written unencrypted. An empty owner password falls back to
/// the user password.
pub fn setup_encryption(
    config: &EncryptionConfig,
) -> Result<Option<(EncryptDict, EncryptionContext)>> {
    if !config.is_enabled() {
        log::info!("Empty user password, document will not be encrypted");
        return Ok(None);
    }

    let permissions = config.permissions.to_bits();
    let (dict, context) = EncryptDictBuilder::new()
        .user_password(config.user_password.as_bytes())
        .owner_password(config.effective_owner_password().as_bytes())
        .permissions(permissions)
        .encrypt_metadata(config.encrypt_metadata)
        .build()?;

    log::info!(
        "Encryption set up: AES-256 (V={}, R={}), P={:#010x}, EncryptMetadata={}",
        dict.version,
        dict.revision,
        permissions as u32,
        dict.encrypt_metadata
    );

    Ok(Some((dict, context)))
}
