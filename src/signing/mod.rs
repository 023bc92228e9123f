//! Digital signature embedding.
//!
//! Signing a PDF is a chicken-and-egg problem: the signature covers the
//! file's bytes, but the signature itself is stored inside the file. The
//! standard resolution is placeholder patching. Before serialization a
//! fixed-width hex placeholder is reserved for the signature container and
//! another for the /ByteRange array; during serialization their byte
//! offsets are recorded; after serialization both are overwritten in place
//! without moving a single byte.
//!
//! [`SignatureHandler`] orchestrates the whole flow. The supporting pieces
//! are exposed for callers with custom pipelines: [`ByteRangeView`] streams
//! the signed bytes to a [`Signer`], [`PlaceholderAllocator`] sizes the
//! reservations, and [`SignatureEmbedder`] performs the final patch.

pub mod allocator;
pub mod appearance;
pub mod byterange;
pub mod embedder;
pub mod field;
pub mod handler;
pub mod options;
pub mod position;
pub mod signer;

pub use allocator::{PlaceholderAllocator, PlaceholderReservation, BYTE_RANGE_PLACEHOLDER_WIDTH};
pub use appearance::{AppearanceContext, AppearanceRenderer, DefaultAppearance};
pub use byterange::{ByteRangeDescriptor, ByteRangeView};
pub use embedder::SignatureEmbedder;
pub use field::{AnnotationFlags, SignatureField};
pub use handler::SignatureHandler;
pub use options::SigningOptions;
pub use position::{ByteSpan, PlaceholderId, PositionTable, PositionTracker};
pub use signer::Signer;
