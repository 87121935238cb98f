#![warn(missing_docs)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]

//! # PDF Secure
//!
//! The PDF 2.0 Standard Security Handler, revision 6 (AES-256), in Rust.
//!
//! ## Core Features
//!
//! - **Password hashing**: Algorithm 2.B (ISO 32000-2:2020 §7.6.4.3.4)
//! - **Dictionary entries**: U/UE, O/OE and Perms (Algorithms 8, 9, 10)
//! - **Authentication**: user and owner passwords, key recovery (Algorithms 2.A, 11, 12, 13)
//! - **Content encryption**: AES-256-CBC with a random IV per string or stream
//!
//! Parsing and serializing whole PDF files is left to the caller; the
//! /Encrypt dictionary is exchanged as an [`object::Object`].
//!
//! ## Quick Start
//!
//! ```
//! use pdf_secure::config::{EncryptionConfig, Permissions};
//! use pdf_secure::encryption::{setup_encryption, EncryptionHandler};
//!
//! # fn main() -> pdf_secure::error::Result<()> {
//! // Writing: derive the /Encrypt dictionary and encrypt content
//! let config = EncryptionConfig::new("user", "owner").with_permissions(Permissions::read_only());
//! let (dict, context) = setup_encryption(&config)?.expect("encryption enabled");
//! let stream = context.encrypt_stream(b"BT /F1 12 Tf (Hi) Tj ET", 4, 0)?;
//!
//! // Reading: authenticate and decrypt
//! let mut handler = EncryptionHandler::new(&dict.to_object())?;
//! assert!(handler.authenticate(b"user")?);
//! assert_eq!(handler.decrypt_stream(&stream, 4, 0)?, b"BT /F1 12 Tf (Hi) Tj ET");
//! # Ok(())
//! # }
//! ```

// Error handling
pub mod error;

// Configuration
pub mod config;

// PDF objects exchanged with the caller
pub mod object;

// Standard Security Handler, revision 6
pub mod encryption;

// Re-exports
pub use config::{EncryptionConfig, Permissions};
pub use encryption::{
    setup_encryption, EncryptDict, EncryptDictBuilder, EncryptionContext, EncryptionHandler,
    FileEncryptionKey,
};
pub use error::{Error, Result};
