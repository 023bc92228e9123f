//! Document assembly and serialization.
//!
//! [`DocumentWriter`] holds the page model and turns it into a complete PDF
//! file: header, body objects, cross-reference table, and trailer. Object
//! numbers are assigned per pass from the document structure alone, so two
//! serializations of the same document place every object at the same byte
//! offset. The signing layer depends on that: it serializes once, records
//! where its placeholders landed, and patches those exact offsets.

use crate::error::{Error, Result};
use crate::object::{Object, ObjectRef};
use crate::signing::field::SignatureField;
use crate::signing::position::{ByteSpan, PlaceholderId, PositionTable};
use crate::writer::acroform::AcroFormBuilder;
use crate::writer::content_stream::ContentStreamBuilder;
use crate::writer::object_serializer::ObjectSerializer;
use chrono::{DateTime, Utc};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::path::Path;

/// Participates in the save pipeline of a [`DocumentWriter`].
///
/// Hooks run in registration order. `before_save` may mutate the document;
/// `after_save` receives the serialized bytes and the placeholder positions
/// recorded during the pass, and may patch the bytes in place.
pub trait SaveHook {
    /// Prepare the document for serialization.
    fn before_save(&mut self, doc: &mut DocumentWriter) -> Result<()>;

    /// Patch the serialized output.
    fn after_save(
        &mut self,
        doc: &mut DocumentWriter,
        output: &mut Vec<u8>,
        positions: &PositionTable,
    ) -> Result<()>;
}

/// Signature material inserted into the document for one save pass.
pub(crate) struct SignatureAttachment {
    /// Regular signature dictionary entries (Type, Filter, M, ...)
    pub(crate) entries: Vec<(String, Object)>,
    /// Placeholder identity for the /Contents value
    pub(crate) contents_id: PlaceholderId,
    /// Serialized /Contents placeholder bytes
    pub(crate) contents_placeholder: Vec<u8>,
    /// Placeholder identity for the /ByteRange value
    pub(crate) byte_range_id: PlaceholderId,
    /// Serialized /ByteRange placeholder bytes
    pub(crate) byte_range_placeholder: Vec<u8>,
    /// The signature form field and widget
    pub(crate) field: SignatureField,
    /// Appearance content stream for visible signatures
    pub(crate) appearance: Option<Vec<u8>>,
}

struct PageData {
    width: f32,
    height: f32,
    content: ContentStreamBuilder,
}

/// Object number layout for one serialization pass.
///
/// Numbers depend only on the page count and signature presence, never on
/// mutable counters, which keeps repeated passes byte-identical.
struct IdLayout {
    page_count: usize,
    has_appearance: bool,
    has_signature: bool,
}

impl IdLayout {
    const CATALOG: u32 = 1;
    const PAGES: u32 = 2;

    fn page(&self, index: usize) -> u32 {
        3 + 2 * index as u32
    }

    fn content(&self, index: usize) -> u32 {
        4 + 2 * index as u32
    }

    fn acroform(&self) -> u32 {
        3 + 2 * self.page_count as u32
    }

    fn signature(&self) -> u32 {
        self.acroform() + 1
    }

    fn widget(&self) -> u32 {
        self.acroform() + 2
    }

    fn appearance(&self) -> u32 {
        self.acroform() + 3
    }

    fn signature_object_count(&self) -> u32 {
        if self.has_signature {
            3 + self.has_appearance as u32
        } else {
            0
        }
    }

    fn info(&self) -> u32 {
        self.acroform() + self.signature_object_count()
    }

    fn object_count(&self) -> usize {
        2 + 2 * self.page_count + self.signature_object_count() as usize + 1
    }
}

/// Builds and serializes a PDF document.
pub struct DocumentWriter {
    pages: Vec<PageData>,
    signature: Option<SignatureAttachment>,
    hooks: Vec<Box<dyn SaveHook>>,
    signing_attached: bool,
    // fixed at creation so repeated passes stay byte-identical
    created_at: DateTime<Utc>,
}

impl Default for DocumentWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentWriter {
    /// Create an empty document.
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            signature: None,
            hooks: Vec::new(),
            signing_attached: false,
            created_at: Utc::now(),
        }
    }

    /// Append a page of the given size in points. Returns the page index.
    pub fn add_page(&mut self, width: f32, height: f32) -> usize {
        self.pages.push(PageData {
            width,
            height,
            content: ContentStreamBuilder::new(),
        });
        self.pages.len() - 1
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Access a page's content stream builder.
    pub fn page_content(&mut self, index: usize) -> Result<&mut ContentStreamBuilder> {
        let count = self.pages.len();
        self.pages
            .get_mut(index)
            .map(|page| &mut page.content)
            .ok_or_else(|| {
                Error::InvalidPdf(format!("page index {} out of range ({} pages)", index, count))
            })
    }

    /// Register a save hook. Hooks run on every save, in registration order.
    pub fn add_save_hook(&mut self, hook: Box<dyn SaveHook>) {
        self.hooks.push(hook);
    }

    /// Claim the single signing slot of this document.
    pub(crate) fn mark_signing_attached(&mut self) -> Result<()> {
        if self.signing_attached {
            return Err(Error::DuplicateAttachment);
        }
        self.signing_attached = true;
        Ok(())
    }

    /// Replace the signature material for the upcoming pass.
    pub(crate) fn set_signature(&mut self, signature: SignatureAttachment) {
        self.signature = Some(signature);
    }

    /// Serialize the document and return the bytes together with the
    /// placeholder positions recorded during the pass.
    pub fn serialize(&self) -> Result<(Vec<u8>, PositionTable)> {
        let layout = IdLayout {
            page_count: self.pages.len(),
            has_signature: self.signature.is_some(),
            has_appearance: self
                .signature
                .as_ref()
                .is_some_and(|sig| sig.appearance.is_some()),
        };
        if let Some(sig) = &self.signature {
            if sig.field.page_index >= self.pages.len() {
                return Err(Error::MissingAttachmentTarget);
            }
        }

        let serializer = ObjectSerializer::new();
        let mut buf: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = Vec::new();
        let mut positions = PositionTable::new();

        buf.extend_from_slice(b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n");

        // 1: catalog
        let mut catalog = HashMap::new();
        catalog.insert("Type".to_string(), Object::Name("Catalog".to_string()));
        catalog.insert(
            "Pages".to_string(),
            Object::Reference(ObjectRef::new(IdLayout::PAGES, 0)),
        );
        if layout.has_signature {
            catalog.insert(
                "AcroForm".to_string(),
                Object::Reference(ObjectRef::new(layout.acroform(), 0)),
            );
        }
        Self::emit(&mut buf, &mut offsets, &serializer, IdLayout::CATALOG, &Object::Dictionary(catalog));

        // 2: page tree root
        let mut pages_root = HashMap::new();
        pages_root.insert("Type".to_string(), Object::Name("Pages".to_string()));
        pages_root.insert(
            "Kids".to_string(),
            Object::Array(
                (0..self.pages.len())
                    .map(|i| Object::Reference(ObjectRef::new(layout.page(i), 0)))
                    .collect(),
            ),
        );
        pages_root.insert("Count".to_string(), Object::Integer(self.pages.len() as i64));
        Self::emit(&mut buf, &mut offsets, &serializer, IdLayout::PAGES, &Object::Dictionary(pages_root));

        // pages and their content streams
        for (i, page) in self.pages.iter().enumerate() {
            let mut dict = HashMap::new();
            dict.insert("Type".to_string(), Object::Name("Page".to_string()));
            dict.insert(
                "Parent".to_string(),
                Object::Reference(ObjectRef::new(IdLayout::PAGES, 0)),
            );
            dict.insert(
                "MediaBox".to_string(),
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(page.width as f64),
                    Object::Real(page.height as f64),
                ]),
            );
            dict.insert(
                "Contents".to_string(),
                Object::Reference(ObjectRef::new(layout.content(i), 0)),
            );
            dict.insert(
                "Resources".to_string(),
                Object::Dictionary(AcroFormBuilder::build_default_resources()),
            );
            if let Some(sig) = &self.signature {
                if sig.field.page_index == i {
                    dict.insert(
                        "Annots".to_string(),
                        Object::Array(vec![Object::Reference(ObjectRef::new(layout.widget(), 0))]),
                    );
                }
            }
            Self::emit(&mut buf, &mut offsets, &serializer, layout.page(i), &Object::Dictionary(dict));

            let raw = page.content.build()?;
            let compressed = Self::compress(&raw)?;
            let mut stream_dict = HashMap::new();
            stream_dict.insert("Filter".to_string(), Object::Name("FlateDecode".to_string()));
            let stream = Object::Stream {
                dict: stream_dict,
                data: bytes::Bytes::from(compressed),
            };
            Self::emit(&mut buf, &mut offsets, &serializer, layout.content(i), &stream);
        }

        if let Some(sig) = &self.signature {
            // interactive form
            let mut acroform = AcroFormBuilder::new();
            acroform.add_field(ObjectRef::new(layout.widget(), 0));
            acroform.set_sig_flags(AcroFormBuilder::SIG_FLAGS_SIGNED);
            Self::emit(
                &mut buf,
                &mut offsets,
                &serializer,
                layout.acroform(),
                &Object::Dictionary(acroform.build()),
            );

            // signature dictionary, written by hand so the placeholder
            // value spans can be recorded as they land
            offsets.push(buf.len());
            self.write_signature_object(&mut buf, &mut positions, &serializer, sig, layout.signature())?;

            // field widget annotation
            let appearance_ref = sig
                .appearance
                .as_ref()
                .map(|_| ObjectRef::new(layout.appearance(), 0));
            let widget = sig.field.widget_dict(
                ObjectRef::new(layout.signature(), 0),
                ObjectRef::new(layout.page(sig.field.page_index), 0),
                appearance_ref,
            );
            Self::emit(&mut buf, &mut offsets, &serializer, layout.widget(), &Object::Dictionary(widget));

            if let Some(appearance) = &sig.appearance {
                let mut dict = HashMap::new();
                dict.insert("Type".to_string(), Object::Name("XObject".to_string()));
                dict.insert("Subtype".to_string(), Object::Name("Form".to_string()));
                dict.insert(
                    "BBox".to_string(),
                    Object::Array(vec![
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Real(sig.field.rect.width as f64),
                        Object::Real(sig.field.rect.height as f64),
                    ]),
                );
                dict.insert(
                    "Resources".to_string(),
                    Object::Dictionary(AcroFormBuilder::build_default_resources()),
                );
                let stream = Object::Stream {
                    dict,
                    data: bytes::Bytes::from(appearance.clone()),
                };
                Self::emit(&mut buf, &mut offsets, &serializer, layout.appearance(), &stream);
            }
        }

        // document information dictionary
        let mut info = HashMap::new();
        info.insert(
            "Producer".to_string(),
            Object::String(
                format!("pdf_signer {}", env!("CARGO_PKG_VERSION")).into_bytes(),
            ),
        );
        info.insert(
            "CreationDate".to_string(),
            Object::String(
                self.created_at
                    .format("D:%Y%m%d%H%M%S+00'00'")
                    .to_string()
                    .into_bytes(),
            ),
        );
        Self::emit(&mut buf, &mut offsets, &serializer, layout.info(), &Object::Dictionary(info));

        debug_assert_eq!(offsets.len(), layout.object_count());

        // cross-reference table and trailer
        let xref_offset = buf.len();
        writeln!(buf, "xref")?;
        writeln!(buf, "0 {}", offsets.len() + 1)?;
        buf.extend_from_slice(b"0000000000 65535 f \n");
        for offset in &offsets {
            write!(buf, "{:010} 00000 n \n", offset)?;
        }
        writeln!(buf, "trailer")?;
        let trailer = ObjectSerializer::dict(vec![
            ("Size", Object::Integer(offsets.len() as i64 + 1)),
            ("Root", Object::Reference(ObjectRef::new(IdLayout::CATALOG, 0))),
            ("Info", Object::Reference(ObjectRef::new(layout.info(), 0))),
        ]);
        buf.extend_from_slice(&serializer.serialize(&trailer));
        writeln!(buf)?;
        writeln!(buf, "startxref")?;
        writeln!(buf, "{}", xref_offset)?;
        buf.extend_from_slice(b"%%EOF\n");

        log::debug!("serialized {} objects, {} bytes", offsets.len(), buf.len());
        Ok((buf, positions))
    }

    /// Serialize the document, running all registered save hooks.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let mut hooks = std::mem::take(&mut self.hooks);
        let result = self.run_save(&mut hooks);
        self.hooks = hooks;
        result
    }

    /// Save the document to a file, running all registered save hooks.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    fn run_save(&mut self, hooks: &mut [Box<dyn SaveHook>]) -> Result<Vec<u8>> {
        for hook in hooks.iter_mut() {
            hook.before_save(self)?;
        }
        let (mut output, positions) = self.serialize()?;
        for hook in hooks.iter_mut() {
            hook.after_save(self, &mut output, &positions)?;
        }
        Ok(output)
    }

    fn emit(
        buf: &mut Vec<u8>,
        offsets: &mut Vec<usize>,
        serializer: &ObjectSerializer,
        id: u32,
        obj: &Object,
    ) {
        offsets.push(buf.len());
        buf.extend_from_slice(&serializer.serialize_indirect(id, 0, obj));
    }

    /// Write the signature dictionary with keys in sorted order, recording
    /// the absolute span of each placeholder value.
    fn write_signature_object(
        &self,
        buf: &mut Vec<u8>,
        positions: &mut PositionTable,
        serializer: &ObjectSerializer,
        sig: &SignatureAttachment,
        id: u32,
    ) -> Result<()> {
        enum Entry<'a> {
            Plain(&'a Object),
            Placeholder(PlaceholderId, &'a [u8]),
        }

        let mut entries: Vec<(&str, Entry)> = sig
            .entries
            .iter()
            .map(|(key, value)| (key.as_str(), Entry::Plain(value)))
            .collect();
        entries.push((
            "ByteRange",
            Entry::Placeholder(sig.byte_range_id, &sig.byte_range_placeholder),
        ));
        entries.push((
            "Contents",
            Entry::Placeholder(sig.contents_id, &sig.contents_placeholder),
        ));
        entries.sort_by(|a, b| a.0.cmp(b.0));

        write!(buf, "{} 0 obj\n<<", id)?;
        for (key, entry) in entries {
            write!(buf, "\n  /{} ", key)?;
            match entry {
                Entry::Plain(obj) => buf.extend_from_slice(&serializer.serialize(obj)),
                Entry::Placeholder(placeholder_id, bytes) => {
                    let start = buf.len();
                    buf.extend_from_slice(bytes);
                    positions.record(placeholder_id, ByteSpan::new(start, buf.len()));
                },
            }
        }
        write!(buf, "\n>>\nendobj\n")?;
        Ok(())
    }

    fn compress(data: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data)?;
        Ok(encoder.finish()?)
    }
}

impl fmt::Debug for DocumentWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentWriter")
            .field("pages", &self.pages.len())
            .field("hooks", &self.hooks.len())
            .field("signing_attached", &self.signing_attached)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::allocator::PlaceholderAllocator;

    #[test]
    fn test_minimal_document_structure() {
        let mut doc = DocumentWriter::new();
        doc.add_page(595.0, 842.0);

        let bytes = doc.to_bytes().unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(bytes.starts_with(b"%PDF-1.7\n"));
        assert!(text.contains("1 0 obj"));
        assert!(text.contains("/Type /Catalog"));
        assert!(text.contains("/Type /Pages"));
        assert!(text.contains("/MediaBox [0 0 595 842]"));
        assert!(text.contains("/Producer (pdf_signer"));
        assert!(text.contains("xref"));
        assert!(text.contains("startxref"));
        assert!(text.trim_end().ends_with("%%EOF"));
    }

    #[test]
    fn test_serialize_is_deterministic() {
        let mut doc = DocumentWriter::new();
        doc.add_page(595.0, 842.0);
        doc.page_content(0)
            .unwrap()
            .begin_text()
            .set_font("Helv", 12.0)
            .text("Invoice 2024-001", 72.0, 720.0)
            .end_text();

        let (first, _) = doc.serialize().unwrap();
        let (second, _) = doc.serialize().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_page_content_out_of_range() {
        let mut doc = DocumentWriter::new();
        assert!(matches!(doc.page_content(0), Err(Error::InvalidPdf(_))));
    }

    #[test]
    fn test_page_content_is_compressed() {
        let mut doc = DocumentWriter::new();
        doc.add_page(595.0, 842.0);
        doc.page_content(0).unwrap().text("hello", 10.0, 10.0);

        let bytes = doc.to_bytes().unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Filter /FlateDecode"));
    }

    #[test]
    fn test_duplicate_attachment_rejected() {
        let mut doc = DocumentWriter::new();
        doc.mark_signing_attached().unwrap();
        assert!(matches!(doc.mark_signing_attached(), Err(Error::DuplicateAttachment)));
    }

    #[test]
    fn test_placeholder_spans_point_at_placeholder_bytes() {
        let mut allocator = PlaceholderAllocator::new();
        let reservation = allocator.reserve(32);

        let mut doc = DocumentWriter::new();
        doc.add_page(595.0, 842.0);
        doc.set_signature(SignatureAttachment {
            entries: vec![
                ("Type".to_string(), Object::Name("Sig".to_string())),
                ("Filter".to_string(), Object::Name("Adobe.PPKLite".to_string())),
            ],
            contents_id: reservation.contents_id(),
            contents_placeholder: reservation.contents_placeholder(),
            byte_range_id: reservation.byte_range_id(),
            byte_range_placeholder: reservation.byte_range_placeholder(),
            field: SignatureField::new("Signature1", crate::geometry::Rect::empty(), 0),
            appearance: None,
        });

        let (bytes, positions) = doc.serialize().unwrap();

        let contents = positions.get(reservation.contents_id()).unwrap();
        assert_eq!(contents.len(), 2 * 32 + 2);
        assert_eq!(bytes[contents.start], b'<');
        assert_eq!(bytes[contents.end - 1], b'>');
        assert!(bytes[contents.start + 1..contents.end - 1].iter().all(|&b| b == b'0'));

        let byte_range = positions.get(reservation.byte_range_id()).unwrap();
        assert_eq!(byte_range.len(), 36);
        assert_eq!(bytes[byte_range.start], b'[');
        assert_eq!(bytes[byte_range.end - 1], b']');
    }

    #[test]
    fn test_signature_keys_are_sorted() {
        let mut allocator = PlaceholderAllocator::new();
        let reservation = allocator.reserve(8);

        let mut doc = DocumentWriter::new();
        doc.add_page(595.0, 842.0);
        doc.set_signature(SignatureAttachment {
            entries: vec![
                ("Type".to_string(), Object::Name("Sig".to_string())),
                ("Filter".to_string(), Object::Name("Adobe.PPKLite".to_string())),
            ],
            contents_id: reservation.contents_id(),
            contents_placeholder: reservation.contents_placeholder(),
            byte_range_id: reservation.byte_range_id(),
            byte_range_placeholder: reservation.byte_range_placeholder(),
            field: SignatureField::new("Signature1", crate::geometry::Rect::empty(), 0),
            appearance: None,
        });

        let (bytes, _) = doc.serialize().unwrap();
        let text = String::from_utf8_lossy(&bytes);
        // ByteRange sorts first among the signature keys, right after <<
        assert!(text.contains("<<\n  /ByteRange"));
        let sig_dict = &text[text.find("<<\n  /ByteRange").unwrap()..];
        let contents = sig_dict.find("/Contents").unwrap();
        let filter = sig_dict.find("/Filter /Adobe.PPKLite").unwrap();
        assert!(contents < filter);
    }

    #[test]
    fn test_hooks_run_on_every_save() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        struct CountingHook {
            before: Arc<AtomicUsize>,
            after: Arc<AtomicUsize>,
        }
        impl SaveHook for CountingHook {
            fn before_save(&mut self, _doc: &mut DocumentWriter) -> Result<()> {
                self.before.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            fn after_save(
                &mut self,
                _doc: &mut DocumentWriter,
                _output: &mut Vec<u8>,
                _positions: &PositionTable,
            ) -> Result<()> {
                self.after.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }

        let before = Arc::new(AtomicUsize::new(0));
        let after = Arc::new(AtomicUsize::new(0));

        let mut doc = DocumentWriter::new();
        doc.add_page(595.0, 842.0);
        doc.add_save_hook(Box::new(CountingHook {
            before: before.clone(),
            after: after.clone(),
        }));

        doc.to_bytes().unwrap();
        doc.to_bytes().unwrap();
        assert_eq!(before.load(Ordering::SeqCst), 2);
        assert_eq!(after.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failing_hook_keeps_hooks_installed() {
        struct FailingHook;
        impl SaveHook for FailingHook {
            fn before_save(&mut self, _doc: &mut DocumentWriter) -> Result<()> {
                Err(Error::InvalidPdf("hook failed".to_string()))
            }
            fn after_save(
                &mut self,
                _doc: &mut DocumentWriter,
                _output: &mut Vec<u8>,
                _positions: &PositionTable,
            ) -> Result<()> {
                Ok(())
            }
        }

        let mut doc = DocumentWriter::new();
        doc.add_page(595.0, 842.0);
        doc.add_save_hook(Box::new(FailingHook));

        assert!(doc.to_bytes().is_err());
        // still fails the same way on the next save: the hook was restored
        assert!(doc.to_bytes().is_err());
    }
}
