//! PDF generation.
//!
//! Document assembly, object serialization, content streams, and the
//! interactive form dictionary. Everything here is deterministic: the same
//! document model always serializes to the same bytes (timestamps aside,
//! which are fixed-width), which is what lets the signing layer patch
//! recorded offsets after the fact.

pub mod acroform;
pub mod content_stream;
pub mod document;
pub mod object_serializer;

pub use acroform::AcroFormBuilder;
pub use content_stream::{ContentStreamBuilder, ContentStreamOp};
pub use document::{DocumentWriter, SaveHook};
pub use object_serializer::ObjectSerializer;
