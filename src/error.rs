//! Error types for the signing library.
//!
//! This module defines all error types that can occur while preparing,
//! serializing, and patching a signed PDF document.

/// Result type alias for signing library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Opaque error surfaced by a signing provider.
pub type SignerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error types that can occur during signature embedding.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A new signature field was requested but the document has no page
    /// that could host its widget annotation.
    #[error("no page available to host a new signature field")]
    MissingAttachmentTarget,

    /// A signing session is already attached to this document.
    #[error("a signing session is already attached to this document")]
    DuplicateAttachment,

    /// A placeholder position was queried before serialization completed,
    /// or resolved a second time without a new serialization pass.
    #[error("stale placeholder position: {0}")]
    StalePosition(String),

    /// The signature container produced by the signer does not fit in the
    /// reserved placeholder. Unrecoverable for the current save; the caller
    /// must restart with a larger explicit reservation.
    #[error("signature of {actual} bytes exceeds the reserved {reserved} bytes")]
    SignatureOverflow {
        /// Actual signature container length in bytes
        actual: usize,
        /// Reserved placeholder capacity in bytes
        reserved: usize,
    },

    /// Failure surfaced from the signing provider, propagated unchanged.
    #[error("signing provider failure: {0}")]
    SigningProvider(#[source] SignerError),

    /// Invalid PDF structure (generic)
    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
