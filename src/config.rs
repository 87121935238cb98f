//! Configuration for document encryption.

use serde::{Deserialize, Serialize};

/// Permission flags for encrypted PDFs.
///
/// Per ISO 32000-2:2020 Table 22, these flags control what operations
/// are permitted when the document is opened with the user password.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Permissions {
    /// Allow printing the document.
    pub print: bool,
    /// Allow high-resolution printing.
    pub print_high_quality: bool,
    /// Allow modifying the document contents.
    pub modify: bool,
    /// Allow copying or extracting text and graphics.
    pub copy: bool,
    /// Allow adding annotations and form fields.
    pub annotate: bool,
    /// Allow filling in form fields.
    pub fill_forms: bool,
    /// Allow extracting content for accessibility.
    pub accessibility: bool,
    /// Allow document assembly (insert, rotate, delete pages).
    pub assemble: bool,
}

const PRINT: i32 = 1 << 2;
const MODIFY: i32 = 1 << 3;
const COPY: i32 = 1 << 4;
const ANNOTATE: i32 = 1 << 5;
const FILL_FORMS: i32 = 1 << 8;
const ACCESSIBILITY: i32 = 1 << 9;
const ASSEMBLE: i32 = 1 << 10;
const PRINT_HIGH_QUALITY: i32 = 1 << 11;

/// Bits 7-8 and 13-32 must be 1, bits 1-2 must be 0.
const RESERVED_BITS: u32 = 0xFFFF_F0C0;

impl Permissions {
    /// Create with all permissions granted.
    pub fn all() -> Self {
        Self {
            print: true,
            print_high_quality: true,
            modify: true,
            copy: true,
            annotate: true,
            fill_forms: true,
            accessibility: true,
            assemble: true,
        }
    }

    /// Create with minimal permissions (view only).
    pub fn read_only() -> Self {
        Self {
            accessibility: true, // Always allow for compliance
            ..Default::default()
        }
    }

    /// Convert permissions to the 32-bit P value for the encryption dictionary.
    ///
    /// The returned value has the reserved bits set as PDF 2.0 requires.
    pub fn to_bits(&self) -> i32 {
        let mut bits = RESERVED_BITS as i32;

        for (allowed, flag) in [
            (self.print, PRINT),
            (self.modify, MODIFY),
            (self.copy, COPY),
            (self.annotate, ANNOTATE),
            (self.fill_forms, FILL_FORMS),
            (self.accessibility, ACCESSIBILITY),
            (self.assemble, ASSEMBLE),
            (self.print_high_quality, PRINT_HIGH_QUALITY),
        ] {
            if allowed {
                bits |= flag;
            }
        }

        bits
    }

    /// Decode the P value of an encryption dictionary (or a decrypted Perms block).
    pub fn from_bits(bits: i32) -> Self {
        Self {
            print: bits & PRINT != 0,
            modify: bits & MODIFY != 0,
            copy: bits & COPY != 0,
            annotate: bits & ANNOTATE != 0,
            fill_forms: bits & FILL_FORMS != 0,
            accessibility: bits & ACCESSIBILITY != 0,
            assemble: bits & ASSEMBLE != 0,
            print_high_quality: bits & PRINT_HIGH_QUALITY != 0,
        }
    }
}

/// Configuration for encrypting a document on save.
///
/// # Example
///
/// ```
/// use pdf_secure::config::{EncryptionConfig, Permissions};
///
/// let config = EncryptionConfig::new("user123", "owner456")
///     .with_permissions(Permissions::read_only())
///     .with_encrypt_metadata(false);
///
/// assert!(!config.permissions.print);
/// assert!(!config.encrypt_metadata);
/// ```
///
/// An empty user password means the document is written unencrypted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncryptionConfig {
    /// Password required to open the document. Empty disables encryption.
    pub user_password: String,
    /// Password for full access. Empty falls back to the user password.
    pub owner_password: String,
    /// Permission flags when opened with user password.
    pub permissions: Permissions,
    /// Whether the document metadata stream is encrypted too.
    pub encrypt_metadata: bool,
}

impl Default for EncryptionConfig {
    fn default() -> Self {
        Self {
            user_password: String::new(),
            owner_password: String::new(),
            permissions: Permissions::all(),
            encrypt_metadata: true,
        }
    }
}

impl EncryptionConfig {
    /// Create a new encryption config with the given passwords.
    pub fn new(user_password: impl Into<String>, owner_password: impl Into<String>) -> Self {
        Self {
            user_password: user_password.into(),
            owner_password: owner_password.into(),
            ..Default::default()
        }
    }

    /// Set the permissions.
    pub fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = permissions;
        self
    }

    /// Set whether metadata is encrypted.
    pub fn with_encrypt_metadata(mut self, encrypt_metadata: bool) -> Self {
        self.encrypt_metadata = encrypt_metadata;
        self
    }

    /// Whether this configuration asks for encryption at all.
    pub fn is_enabled(&self) -> bool {
        !self.user_password.is_empty()
    }

    /// The owner password that will actually be used.
    pub(crate) fn effective_owner_password(&self) -> &str {
        if self.owner_password.is_empty() {
            &self.user_password
        } else {
            &self.owner_password
        }
    }
}
