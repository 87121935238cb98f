//! Encryption handler for reading encrypted PDF documents.
//!
//! Authenticates a password against the /Encrypt dictionary, recovers the
//! file encryption key and decrypts strings and streams.

use zeroize::Zeroizing;

use super::algorithms;
use super::context::EncryptionContext;
use super::keys::FileEncryptionKey;
use super::perms;
use super::EncryptDict;
use crate::config::Permissions;
use crate::error::{Error, Result};
use crate::object::Object;

/// Main encryption handler for PDF documents.
///
/// This struct manages the encryption state and provides methods for
/// authenticating passwords and decrypting content.
#[derive(Debug, Clone)]
pub struct EncryptionHandler {
    /// Encryption dictionary
    dict: EncryptDict,
    /// Content context (set after successful authentication)
    context: Option<EncryptionContext>,
    /// Whether the accepted password was the owner password
    owner: bool,
}

impl EncryptionHandler {
    /// Create a new encryption handler from an encryption dictionary.
    ///
    /// # Arguments
    ///
    /// * `encrypt_obj` - The /Encrypt dictionary object from the PDF trailer
    pub fn new(encrypt_obj: &Object) -> Result<Self> {
        let dict = EncryptDict::from_object(encrypt_obj)?;
        Ok(Self::from_dict(dict))
    }

    /// Create a handler from an already parsed dictionary.
    pub fn from_dict(dict: EncryptDict) -> Self {
        log::info!(
            "PDF is encrypted with AES-256 (V={}, R={})",
            dict.version,
            dict.revision
        );

        Self {
            dict,
            context: None,
            owner: false,
        }
    }

    /// Authenticate with a password.
    ///
    /// The password is tried as the owner password first, then as the user
    /// password. On success the file encryption key is recovered and checked
    /// against /Perms. Any earlier authentication is discarded first, so a
    /// rejected password leaves the handler unauthenticated.
    ///
    /// # Returns
    ///
    /// `Ok(true)` if authentication succeeded, `Ok(false)` if the password is
    /// wrong or the recovered key does not decrypt /Perms consistently.
    pub fn authenticate(&mut self, password: &[u8]) -> Result<bool> {
        self.context = None;
        self.owner = false;

        let dict = &self.dict;

        let (key, owner) = if algorithms::validate_owner_password(
            password,
            &dict.owner_record,
            &dict.user_record,
        )? {
            let key = algorithms::decrypt_key(
                password,
                &dict.owner_record,
                &dict.owner_encryption,
                Some(&dict.user_record),
            )?;
            (key, true)
        } else if algorithms::validate_user_password(password, &dict.user_record)? {
            let key =
                algorithms::decrypt_key(password, &dict.user_record, &dict.user_encryption, None)?;
            (key, false)
        } else {
            log::warn!("Password authentication failed");
            return Ok(false);
        };

        let key = Zeroizing::new(key);
        if key.is_empty() {
            log::warn!("Password accepted but no file encryption key was recovered");
            return Ok(false);
        }

        let file_key = FileEncryptionKey::from_slice(&key)?;
        let block = perms::decrypt_perms(&dict.perms, &file_key)?;
        if !block.matches(dict.permissions, dict.encrypt_metadata) {
            log::warn!(
                "/Perms does not match /P={:#010x} and /EncryptMetadata={}, rejecting key",
                dict.permissions as u32,
                dict.encrypt_metadata
            );
            return Ok(false);
        }

        log::info!(
            "Successfully authenticated with {} password",
            if owner { "owner" } else { "user" }
        );

        self.context =
            Some(EncryptionContext::new(file_key).with_encrypt_metadata(dict.encrypt_metadata));
        self.owner = owner;
        Ok(true)
    }

    /// Check if a password has been accepted.
    pub fn is_authenticated(&self) -> bool {
        self.context.is_some()
    }

    /// Check if the accepted password was the owner password.
    pub fn is_owner(&self) -> bool {
        self.owner
    }

    /// Get the document permissions.
    ///
    /// With the owner password every permission is granted.
    pub fn permissions(&self) -> Permissions {
        if self.owner {
            Permissions::all()
        } else {
            Permissions::from_bits(self.dict.permissions)
        }
    }

    /// The parsed encryption dictionary.
    pub fn encrypt_dict(&self) -> &EncryptDict {
        &self.dict
    }

    /// The content context, once authenticated.
    pub fn context(&self) -> Option<&EncryptionContext> {
        self.context.as_ref()
    }

    /// Decrypt a stream.
    pub fn decrypt_stream(&self, data: &[u8], _obj_num: u32, _gen_num: u16) -> Result<Vec<u8>> {
        self.context
            .as_ref()
            .ok_or(Error::NotAuthenticated)?
            .decrypt(data)
    }

    /// Decrypt a string.
    pub fn decrypt_string(&self, data: &[u8], obj_num: u32, gen_num: u16) -> Result<Vec<u8>> {
        self.decrypt_stream(data, obj_num, gen_num)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encryption::EncryptDictBuilder;

    fn create_test_handler(permissions: i32) -> (EncryptionHandler, EncryptionContext) {
        let (dict, context) = EncryptDictBuilder::new()
            .user_password(b"user")
            .owner_password(b"owner")
            .permissions(permissions)
            .build()
            .unwrap();
        (EncryptionHandler::new(&dict.to_object()).unwrap(), context)
    }

    #[test]
    fn test_authenticate_user() {
        let p = Permissions::read_only().to_bits();
        let (mut handler, context) = create_test_handler(p);

        assert!(handler.authenticate(b"user").unwrap());
        assert!(handler.is_authenticated());
        assert!(!handler.is_owner());
        assert_eq!(handler.permissions(), Permissions::read_only());
        assert_eq!(handler.context().unwrap().file_key(), context.file_key());
    }

    #[test]
    fn test_authenticate_owner() {
        let (mut handler, context) = create_test_handler(Permissions::read_only().to_bits());

        assert!(handler.authenticate(b"owner").unwrap());
        assert!(handler.is_owner());
        assert_eq!(handler.permissions(), Permissions::all());
        assert_eq!(handler.context().unwrap().file_key(), context.file_key());
    }

    #[test]
    fn test_authenticate_wrong_password() {
        let (mut handler, _) = create_test_handler(-4);

        assert!(!handler.authenticate(b"guess").unwrap());
        assert!(!handler.authenticate(b"").unwrap());
        assert!(!handler.is_authenticated());
    }

    #[test]
    fn test_decrypt_before_authentication() {
        let (handler, context) = create_test_handler(-4);
        let encrypted = context.encrypt(b"data").unwrap();

        assert!(matches!(
            handler.decrypt_stream(&encrypted, 1, 0),
            Err(Error::NotAuthenticated)
        ));
    }

    #[test]
    fn test_decrypt_after_authentication() {
        let (mut handler, context) = create_test_handler(-4);
        let string = context.encrypt_string(b"(Secret title)", 3, 0).unwrap();
        let stream = context.encrypt_stream(b"q 1 0 0 1 0 0 cm Q", 5, 0).unwrap();

        assert!(handler.authenticate(b"user").unwrap());
        assert_eq!(handler.decrypt_string(&string, 3, 0).unwrap(), b"(Secret title)");
        assert_eq!(handler.decrypt_stream(&stream, 5, 0).unwrap(), b"q 1 0 0 1 0 0 cm Q");
    }

    #[test]
    fn test_failed_reauthentication_clears_owner_state() {
        let (mut handler, context) = create_test_handler(Permissions::read_only().to_bits());
        let encrypted = context.encrypt(b"data").unwrap();

        assert!(handler.authenticate(b"owner").unwrap());
        assert!(handler.is_owner());

        assert!(!handler.authenticate(b"wrong").unwrap());
        assert!(!handler.is_authenticated());
        assert!(!handler.is_owner());
        assert!(handler.context().is_none());
        assert_eq!(handler.permissions(), Permissions::read_only());
        assert!(matches!(
            handler.decrypt_stream(&encrypted, 1, 0),
            Err(Error::NotAuthenticated)
        ));
    }

    #[test]
    fn test_reauthentication_as_user_drops_owner() {
        let (mut handler, _) = create_test_handler(Permissions::read_only().to_bits());

        assert!(handler.authenticate(b"owner").unwrap());
        assert!(handler.authenticate(b"user").unwrap());
        assert!(handler.is_authenticated());
        assert!(!handler.is_owner());
        assert_eq!(handler.permissions(), Permissions::read_only());
    }

    #[test]
    fn test_tampered_p_is_rejected() {
        let (dict, _) = EncryptDictBuilder::new()
            .user_password(b"user")
            .permissions(Permissions::read_only().to_bits())
            .build()
            .unwrap();

        let mut tampered = dict.clone();
        tampered.permissions = Permissions::all().to_bits();
        let mut handler = EncryptionHandler::from_dict(tampered);

        assert!(!handler.authenticate(b"user").unwrap());
        assert!(!handler.is_authenticated());
    }

    #[test]
    fn test_tampered_encrypt_metadata_is_rejected() {
        let (dict, _) = EncryptDictBuilder::new()
            .user_password(b"user")
            .owner_password(b"owner")
            .encrypt_metadata(true)
            .build()
            .unwrap();

        let mut tampered = dict.clone();
        tampered.encrypt_metadata = false;
        let mut handler = EncryptionHandler::from_dict(tampered);

        assert!(!handler.authenticate(b"user").unwrap());
        assert!(!handler.authenticate(b"owner").unwrap());
        assert!(!handler.is_authenticated());

        let mut untouched = EncryptionHandler::from_dict(dict);
        assert!(untouched.authenticate(b"user").unwrap());
    }
}
