//! Error types for the security handler.
//!
//! Wrong passwords are not errors: validation returns `false` and key
//! recovery returns an empty key. The variants below cover malformed input
//! and backend failures.

/// Result type alias for security handler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while deriving, validating or applying encryption.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A stored record (U, O, UE, OE, Perms) has the wrong length
    #[error("Invalid /{record} length: expected {expected} bytes, found {found}")]
    InvalidRecordLength {
        /// Name of the encryption dictionary entry
        record: &'static str,
        /// Required length in bytes
        expected: usize,
        /// Actual length in bytes
        found: usize,
    },

    /// Invalid or incomplete encryption dictionary
    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    /// Unsupported security handler, version or revision
    #[error("Unsupported feature: {0}")]
    Unsupported(String),

    /// Block cipher backend failure
    #[error("Cipher error: {0}")]
    Cipher(String),

    /// Random number generator failure
    #[error("Random number generator failure: {0}")]
    Random(String),

    /// Decryption requested before a password was accepted
    #[error("Not authenticated: no password has been accepted yet")]
    NotAuthenticated,
}
