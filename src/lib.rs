//! PDF generation with embedded digital signatures.
//!
//! Builds PDF documents and signs them in a single pass. The signature
//! container is produced by a caller-supplied [`Signer`] (a certificate
//! store, HSM, or remote service); this crate handles everything around it:
//! reserving a fixed-width placeholder, computing the /ByteRange, and
//! patching the serialized file in place so no byte offset moves.
//!
//! # Quick start
//!
//! ```
//! use pdf_signer::{DocumentWriter, SignatureHandler, Signer, SignerError, SigningOptions};
//! use std::io::Read;
//!
//! struct NullSigner;
//!
//! impl Signer for NullSigner {
//!     fn sign(&self, data: &mut dyn Read) -> Result<Vec<u8>, SignerError> {
//!         let mut buf = Vec::new();
//!         data.read_to_end(&mut buf)?;
//!         // a real implementation returns a DER-encoded PKCS#7 container
//!         Ok(vec![0u8; 16])
//!     }
//! }
//!
//! # fn main() -> pdf_signer::Result<()> {
//! let mut doc = DocumentWriter::new();
//! doc.add_page(595.0, 842.0);
//! doc.page_content(0)?
//!     .begin_text()
//!     .set_font("Helv", 12.0)
//!     .text("Contract", 72.0, 720.0)
//!     .end_text();
//!
//! let options = SigningOptions::new()
//!     .with_reason("Approved")
//!     .with_location("Paris");
//! SignatureHandler::new(Box::new(NullSigner), options).attach_to(&mut doc)?;
//!
//! let bytes = doc.to_bytes()?;
//! assert!(bytes.starts_with(b"%PDF"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod geometry;
pub mod object;
pub mod signing;
pub mod writer;

pub use error::{Error, Result, SignerError};
pub use geometry::Rect;
pub use object::{Object, ObjectRef};
pub use signing::{
    AppearanceContext, AppearanceRenderer, ByteRangeDescriptor, ByteRangeView, DefaultAppearance,
    SignatureHandler, Signer, SigningOptions,
};
pub use writer::{ContentStreamBuilder, DocumentWriter, SaveHook};
