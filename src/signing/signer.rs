//! Signing provider abstraction.
//!
//! The library never touches key material. Producing the actual CMS/PKCS#7
//! container is delegated to a [`Signer`] implementation supplied by the
//! caller, which may wrap a local certificate store, an HSM, or a remote
//! signing service.

use crate::error::SignerError;
use std::io::Read;

/// Produces a detached signature container over a byte stream.
///
/// The stream handed to [`sign`](Signer::sign) is the serialized document
/// with the signature placeholder excluded, exactly the bytes a verifier
/// will hash when checking the ByteRange. Implementations must return the
/// DER-encoded container as raw bytes, not hex.
///
/// Errors are surfaced as an opaque [`SignerError`] and propagated to the
/// caller unchanged, wrapped in
/// [`Error::SigningProvider`](crate::error::Error::SigningProvider).
pub trait Signer {
    /// Sign the bytes exposed by `data` and return the signature container.
    fn sign(&self, data: &mut dyn Read) -> std::result::Result<Vec<u8>, SignerError>;

    /// Human-readable signer identity, typically the certificate subject
    /// name. Shown by appearance renderers; empty means unknown.
    fn display_name(&self) -> String {
        String::new()
    }
}
