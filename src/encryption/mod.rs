//! PDF encryption support.
//!
//! This module implements the Standard Security Handler of PDF 2.0
//! (ISO 32000-2:2020, Section 7.6.4), revision 6:
//!
//! - Password hashing (Algorithm 2.B): iterated SHA-256/384/512 and AES-128
//! - U/UE and O/OE records (Algorithms 8 and 9): the random 256-bit file
//!   encryption key wrapped under password-derived keys
//! - Password validation and key recovery (Algorithms 2.A, 11 and 12)
//! - The encrypted permissions block (Algorithms 10 and 13)
//! - AES-256-CBC encryption of strings and streams with a random IV
//!
//! # Writing
//!
//! ```
//! use pdf_secure::config::EncryptionConfig;
//! use pdf_secure::encryption::setup_encryption;
//!
//! # fn main() -> pdf_secure::error::Result<()> {
//! let config = EncryptionConfig::new("user", "owner");
//! let (dict, context) = setup_encryption(&config)?.expect("user password is set");
//!
//! let encrypted = context.encrypt_string(b"(Hello)", 4, 0)?;
//! assert_eq!(dict.to_object().as_dict().unwrap()["R"].as_integer(), Some(6));
//! assert_eq!(context.decrypt(&encrypted)?, b"(Hello)");
//! # Ok(())
//! # }
//! ```
//!
//! # Reading
//!
//! [`EncryptionHandler`] takes the /Encrypt dictionary, authenticates a
//! password (owner first, then user) and decrypts strings and streams.
//!
//! # Security Considerations
//!
//! - The file encryption key is zeroized when the owning context is dropped
//! - Password hashes are compared in constant time
//! - Salts, keys and IVs come from the operating system CSPRNG
//! - A wrong password and a corrupted record are indistinguishable
//!
//! # References
//!
//! - ISO 32000-2 Section 7.6.3: General Encryption Algorithm
//! - ISO 32000-2 Section 7.6.4.3.3: Algorithms 2.A, 2.B, 8-13

use crate::error::{Error, Result};
use crate::object::{Dictionary, Object};

pub mod aes;
pub mod algorithms;
mod context;
pub mod digest;
mod handler;
pub mod keys;
pub mod perms;
pub mod primitives;
mod random;
mod write_handler;

pub use context::EncryptionContext;
pub use handler::EncryptionHandler;
pub use keys::{FileEncryptionKey, PasswordRecord, Salt, WrappedKey};
pub use perms::PermsBlock;
pub use write_handler::{setup_encryption, EncryptDictBuilder};

/// Security handler version (V) for AES-256.
pub const VERSION: u32 = 5;
/// Standard Security Handler revision (R) implemented here.
pub const REVISION: u32 = 6;
/// File encryption key length in bits.
pub const KEY_LENGTH_BITS: u32 = 256;

/// Name of the crypt filter used for strings and streams.
const CRYPT_FILTER_NAME: &str = "StdCF";

/// PDF encryption dictionary (/Encrypt entry in trailer), revision 6.
///
/// ISO 32000-2: Table 20 (common entries) and Table 21 (Standard Security Handler)
#[derive(Debug, Clone, PartialEq)]
pub struct EncryptDict {
    /// Filter name (always "Standard")
    pub filter: String,
    /// SubFilter name (optional)
    pub sub_filter: Option<String>,
    /// Algorithm version (V), 5
    pub version: u32,
    /// Key length in bits (Length), 256
    pub length: Option<u32>,
    /// Revision number (R), 6
    pub revision: u32,
    /// Owner password record (O): 48 bytes
    pub owner_record: PasswordRecord,
    /// User password record (U): 48 bytes
    pub user_record: PasswordRecord,
    /// File key wrapped with the owner password (OE): 32 bytes
    pub owner_encryption: WrappedKey,
    /// File key wrapped with the user password (UE): 32 bytes
    pub user_encryption: WrappedKey,
    /// User permissions (P): 32-bit integer
    pub permissions: i32,
    /// Encrypted permissions (Perms): 16 bytes
    pub perms: [u8; 16],
    /// Encrypt metadata flag (EncryptMetadata): true by default
    pub encrypt_metadata: bool,
}

impl EncryptDict {
    /// Parse an encryption dictionary from a PDF object.
    ///
    /// ISO 32000-2: Section 7.6.2 - General
    pub fn from_object(obj: &Object) -> Result<Self> {
        let dict = obj
            .as_dict()
            .ok_or_else(|| Error::InvalidPdf("Encrypt entry is not a dictionary".to_string()))?;

        let filter = dict
            .get("Filter")
            .and_then(|o| o.as_name())
            .ok_or_else(|| Error::InvalidPdf("Encrypt dictionary missing /Filter".to_string()))?
            .to_string();

        if filter != "Standard" {
            return Err(Error::Unsupported(format!("Security handler /{}", filter)));
        }

        let version = required_integer(dict, "V")? as u32;
        let revision = required_integer(dict, "R")? as u32;

        if (version, revision) != (VERSION, REVISION) {
            return Err(Error::Unsupported(format!(
                "Unsupported encryption version V={}, R={}",
                version, revision
            )));
        }

        let owner_record = PasswordRecord::from_bytes("O", required_string(dict, "O")?)?;
        let user_record = PasswordRecord::from_bytes("U", required_string(dict, "U")?)?;
        let owner_encryption = WrappedKey::from_bytes("OE", required_string(dict, "OE")?)?;
        let user_encryption = WrappedKey::from_bytes("UE", required_string(dict, "UE")?)?;

        let perms_bytes = required_string(dict, "Perms")?;
        let perms: [u8; 16] = perms_bytes
            .try_into()
            .map_err(|_| Error::InvalidRecordLength {
                record: "Perms",
                expected: 16,
                found: perms_bytes.len(),
            })?;

        // P is a signed 32-bit value, but some writers store it unsigned
        let permissions = required_integer(dict, "P")? as i32;

        let sub_filter = dict
            .get("SubFilter")
            .and_then(|o| o.as_name())
            .map(|s| s.to_string());

        let length = dict
            .get("Length")
            .and_then(|o| o.as_integer())
            .map(|l| l as u32);

        let encrypt_metadata = dict
            .get("EncryptMetadata")
            .and_then(|o| o.as_bool())
            .unwrap_or(true);

        Ok(EncryptDict {
            filter,
            sub_filter,
            version,
            length,
            revision,
            owner_record,
            user_record,
            owner_encryption,
            user_encryption,
            permissions,
            perms,
            encrypt_metadata,
        })
    }

    /// Build the PDF dictionary for the /Encrypt trailer entry.
    ///
    /// Strings and streams both use the AESV3 crypt filter.
    pub fn to_object(&self) -> Object {
        let mut std_cf = Dictionary::new();
        std_cf.insert("Type".to_string(), Object::Name("CryptFilter".to_string()));
        std_cf.insert("CFM".to_string(), Object::Name("AESV3".to_string()));
        std_cf.insert("AuthEvent".to_string(), Object::Name("DocOpen".to_string()));
        std_cf.insert("Length".to_string(), Object::Integer(32));

        let mut cf = Dictionary::new();
        cf.insert(CRYPT_FILTER_NAME.to_string(), Object::Dictionary(std_cf));

        let mut dict = Dictionary::new();
        dict.insert("Filter".to_string(), Object::Name(self.filter.clone()));
        if let Some(sub_filter) = &self.sub_filter {
            dict.insert("SubFilter".to_string(), Object::Name(sub_filter.clone()));
        }
        dict.insert("V".to_string(), Object::Integer(self.version as i64));
        dict.insert("R".to_string(), Object::Integer(self.revision as i64));
        if let Some(length) = self.length {
            dict.insert("Length".to_string(), Object::Integer(length as i64));
        }
        dict.insert("O".to_string(), Object::String(self.owner_record.to_bytes().to_vec()));
        dict.insert("U".to_string(), Object::String(self.user_record.to_bytes().to_vec()));
        dict.insert("OE".to_string(), Object::String(self.owner_encryption.0.to_vec()));
        dict.insert("UE".to_string(), Object::String(self.user_encryption.0.to_vec()));
        dict.insert("P".to_string(), Object::Integer(self.permissions as i64));
        dict.insert("Perms".to_string(), Object::String(self.perms.to_vec()));
        dict.insert("EncryptMetadata".to_string(), Object::Boolean(self.encrypt_metadata));
        dict.insert("CF".to_string(), Object::Dictionary(cf));
        dict.insert("StmF".to_string(), Object::Name(CRYPT_FILTER_NAME.to_string()));
        dict.insert("StrF".to_string(), Object::Name(CRYPT_FILTER_NAME.to_string()));

        Object::Dictionary(dict)
    }

    /// Get the effective key length in bytes.
    pub fn key_length_bytes(&self) -> usize {
        (self.length.unwrap_or(KEY_LENGTH_BITS) / 8) as usize
    }
}

fn required_integer(dict: &Dictionary, key: &str) -> Result<i64> {
    dict.get(key)
        .and_then(|o| o.as_integer())
        .ok_or_else(|| Error::InvalidPdf(format!("Encrypt dictionary missing /{}", key)))
}

fn required_string<'a>(dict: &'a Dictionary, key: &str) -> Result<&'a [u8]> {
    dict.get(key)
        .and_then(|o| o.as_string())
        .ok_or_else(|| Error::InvalidPdf(format!("Encrypt dictionary missing /{}", key)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_dict() -> EncryptDict {
        EncryptDict {
            filter: "Standard".to_string(),
            sub_filter: None,
            version: VERSION,
            length: Some(KEY_LENGTH_BITS),
            revision: REVISION,
            owner_record: PasswordRecord {
                hash: [1; 32],
                validation_salt: Salt([2; 8]),
                key_salt: Salt([3; 8]),
            },
            user_record: PasswordRecord {
                hash: [4; 32],
                validation_salt: Salt([5; 8]),
                key_salt: Salt([6; 8]),
            },
            owner_encryption: WrappedKey([7; 32]),
            user_encryption: WrappedKey([8; 32]),
            permissions: -3904,
            perms: [9; 16],
            encrypt_metadata: false,
        }
    }

    fn dict_of(obj: &Object) -> Dictionary {
        obj.as_dict().unwrap().clone()
    }

    #[test]
    fn test_to_object_entries() {
        let obj = sample_dict().to_object();
        let dict = dict_of(&obj);

        assert_eq!(dict["Filter"].as_name(), Some("Standard"));
        assert_eq!(dict["V"].as_integer(), Some(5));
        assert_eq!(dict["R"].as_integer(), Some(6));
        assert_eq!(dict["Length"].as_integer(), Some(256));
        assert_eq!(dict["U"].as_string().unwrap().len(), 48);
        assert_eq!(dict["O"].as_string().unwrap().len(), 48);
        assert_eq!(dict["UE"].as_string().unwrap().len(), 32);
        assert_eq!(dict["OE"].as_string().unwrap().len(), 32);
        assert_eq!(dict["Perms"].as_string().unwrap().len(), 16);
        assert_eq!(dict["P"].as_integer(), Some(-3904));
        assert_eq!(dict["EncryptMetadata"].as_bool(), Some(false));
        assert_eq!(dict["StmF"].as_name(), Some("StdCF"));
        assert_eq!(dict["StrF"].as_name(), Some("StdCF"));

        let std_cf = dict["CF"].as_dict().unwrap()["StdCF"].as_dict().unwrap();
        assert_eq!(std_cf["CFM"].as_name(), Some("AESV3"));
        assert_eq!(std_cf["AuthEvent"].as_name(), Some("DocOpen"));
    }

    #[test]
    fn test_from_object_round_trip() {
        let original = sample_dict();
        let parsed = EncryptDict::from_object(&original.to_object()).unwrap();
        assert_eq!(parsed, original);
        assert_eq!(parsed.key_length_bytes(), 32);
    }

    #[test]
    fn test_from_object_unsigned_p() {
        let mut dict = dict_of(&sample_dict().to_object());
        dict.insert("P".to_string(), Object::Integer(0xFFFF_F0C4));

        let parsed = EncryptDict::from_object(&Object::Dictionary(dict)).unwrap();
        assert_eq!(parsed.permissions, 0xFFFF_F0C4u32 as i32);
    }

    #[test]
    fn test_from_object_defaults_encrypt_metadata() {
        let mut dict = dict_of(&sample_dict().to_object());
        dict.remove("EncryptMetadata");

        let parsed = EncryptDict::from_object(&Object::Dictionary(dict)).unwrap();
        assert!(parsed.encrypt_metadata);
    }

    #[test]
    fn test_from_object_missing_entry() {
        let mut dict = dict_of(&sample_dict().to_object());
        dict.remove("UE");

        let err = EncryptDict::from_object(&Object::Dictionary(dict)).unwrap_err();
        assert!(matches!(err, Error::InvalidPdf(ref msg) if msg.contains("/UE")));
    }

    #[test]
    fn test_from_object_wrong_record_length() {
        let mut dict = dict_of(&sample_dict().to_object());
        dict.insert("U".to_string(), Object::String(vec![0; 32]));

        let err = EncryptDict::from_object(&Object::Dictionary(dict)).unwrap_err();
        assert!(matches!(err, Error::InvalidRecordLength { record: "U", .. }));
    }

    #[test]
    fn test_from_object_rejects_older_revisions() {
        let mut dict = dict_of(&sample_dict().to_object());
        dict.insert("V".to_string(), Object::Integer(4));
        dict.insert("R".to_string(), Object::Integer(4));

        let err = EncryptDict::from_object(&Object::Dictionary(dict)).unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));
    }

    #[test]
    fn test_from_object_rejects_other_handlers() {
        let mut dict = dict_of(&sample_dict().to_object());
        dict.insert("Filter".to_string(), Object::Name("Adobe.PubSec".to_string()));

        assert!(matches!(
            EncryptDict::from_object(&Object::Dictionary(dict)),
            Err(Error::Unsupported(_))
        ));
        assert!(EncryptDict::from_object(&Object::Null).is_err());
    }
}
