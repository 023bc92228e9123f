//! Signing session lifecycle.
//!
//! A [`SignatureHandler`] attaches to a document once, then participates in
//! every save: before serialization it inserts the signature dictionary,
//! field widget, and placeholders; after serialization it resolves the
//! placeholder offsets and patches the final bytes in place.

use crate::error::{Error, Result};
use crate::signing::allocator::{PlaceholderAllocator, PlaceholderReservation};
use crate::signing::appearance::{AppearanceContext, AppearanceRenderer, DefaultAppearance};
use crate::signing::byterange::ByteRangeView;
use crate::signing::embedder::SignatureEmbedder;
use crate::signing::field::SignatureField;
use crate::signing::options::SigningOptions;
use crate::signing::position::PositionTable;
use crate::signing::signer::Signer;
use crate::object::Object;
use crate::writer::document::{DocumentWriter, SaveHook, SignatureAttachment};
use chrono::Utc;

/// Where the session is in its lifecycle. Transitions only move forward
/// within a save pass; a new save returns from `Patched` to
/// `PlaceholdersReserved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Unattached,
    HooksRegistered,
    PlaceholdersReserved,
    Patched,
}

/// Drives signature embedding across document saves.
///
/// Create one with a [`Signer`] and [`SigningOptions`], then hand it to the
/// document with [`attach_to`](SignatureHandler::attach_to). Every
/// subsequent save of that document is signed; saving the same document
/// twice produces two independently signed files.
pub struct SignatureHandler {
    signer: Box<dyn Signer>,
    options: SigningOptions,
    capacity: usize,
    allocator: PlaceholderAllocator,
    reservation: Option<PlaceholderReservation>,
    state: SessionState,
}

impl SignatureHandler {
    /// Create a handler. No work happens until it is attached.
    pub fn new(signer: Box<dyn Signer>, options: SigningOptions) -> Self {
        Self {
            signer,
            options,
            capacity: 0,
            allocator: PlaceholderAllocator::new(),
            reservation: None,
            state: SessionState::Unattached,
        }
    }

    /// Attach this session to `doc`.
    ///
    /// At most one session may be attached to a document; a second attach
    /// fails with [`Error::DuplicateAttachment`].
    ///
    /// Unless the caller fixed the capacity with
    /// [`SigningOptions::with_max_signature_len`], the signer is probed here,
    /// exactly once, by signing a single-byte input; the probe result's
    /// length becomes the placeholder capacity for every save.
    pub fn attach_to(mut self, doc: &mut DocumentWriter) -> Result<()> {
        // resolve capacity before claiming the document's signing slot, so
        // a failed probe leaves the document free for another session
        self.capacity = match self.options.max_signature_len {
            Some(len) => len,
            None => self.probe_capacity()?,
        };
        doc.mark_signing_attached()?;
        log::debug!("signature placeholder capacity: {} bytes", self.capacity);

        self.state = SessionState::HooksRegistered;
        doc.add_save_hook(Box::new(self));
        Ok(())
    }

    fn probe_capacity(&self) -> Result<usize> {
        let mut probe = ByteRangeView::whole(&[0u8]);
        let container = self.signer.sign(&mut probe).map_err(Error::SigningProvider)?;
        Ok(container.len())
    }

    fn signature_entries(&self) -> Vec<(String, Object)> {
        let mut entries = vec![
            ("Type".to_string(), Object::Name("Sig".to_string())),
            ("Filter".to_string(), Object::Name("Adobe.PPKLite".to_string())),
            (
                "SubFilter".to_string(),
                Object::Name("adbe.pkcs7.detached".to_string()),
            ),
            (
                "M".to_string(),
                Object::String(
                    Utc::now()
                        .format("D:%Y%m%d%H%M%S+00'00'")
                        .to_string()
                        .into_bytes(),
                ),
            ),
        ];
        if let Some(reason) = &self.options.reason {
            entries.push(("Reason".to_string(), Object::String(reason.as_bytes().to_vec())));
        }
        if let Some(location) = &self.options.location {
            entries.push((
                "Location".to_string(),
                Object::String(location.as_bytes().to_vec()),
            ));
        }
        if let Some(contact) = &self.options.contact_info {
            entries.push((
                "ContactInfo".to_string(),
                Object::String(contact.as_bytes().to_vec()),
            ));
        }
        entries
    }

    fn render_appearance(&self) -> Result<Option<Vec<u8>>> {
        if self.options.rect.is_empty() {
            return Ok(None);
        }
        let signer_name = self.signer.display_name();
        let ctx = AppearanceContext {
            field_name: &self.options.field_name,
            signer_name: (!signer_name.is_empty()).then_some(signer_name.as_str()),
            reason: self.options.reason.as_deref(),
            location: self.options.location.as_deref(),
            contact_info: self.options.contact_info.as_deref(),
            signed_at: Utc::now(),
        };
        let default_renderer;
        let renderer: &dyn AppearanceRenderer = match &self.options.appearance {
            Some(custom) => custom.as_ref(),
            None => {
                default_renderer = DefaultAppearance::new();
                &default_renderer
            },
        };
        renderer.render(self.options.rect, &ctx).map(Some)
    }
}

impl SaveHook for SignatureHandler {
    fn before_save(&mut self, doc: &mut DocumentWriter) -> Result<()> {
        if self.options.page_index >= doc.page_count() {
            return Err(Error::MissingAttachmentTarget);
        }

        let reservation = self.allocator.reserve(self.capacity);
        let field = SignatureField::new(
            self.options.field_name.clone(),
            self.options.rect,
            self.options.page_index,
        );

        doc.set_signature(SignatureAttachment {
            entries: self.signature_entries(),
            contents_id: reservation.contents_id(),
            contents_placeholder: reservation.contents_placeholder(),
            byte_range_id: reservation.byte_range_id(),
            byte_range_placeholder: reservation.byte_range_placeholder(),
            field,
            appearance: self.render_appearance()?,
        });

        self.reservation = Some(reservation);
        self.state = SessionState::PlaceholdersReserved;
        Ok(())
    }

    fn after_save(
        &mut self,
        _doc: &mut DocumentWriter,
        output: &mut Vec<u8>,
        positions: &PositionTable,
    ) -> Result<()> {
        let mut reservation = self.reservation.take().ok_or_else(|| {
            Error::StalePosition("no placeholders reserved for this save".to_string())
        })?;
        debug_assert_eq!(self.state, SessionState::PlaceholdersReserved);

        let (contents, byte_range) = reservation.resolve(positions)?;
        let descriptor = SignatureEmbedder::embed(output, contents, byte_range, &*self.signer)?;

        self.state = SessionState::Patched;
        log::debug!("document signed, byte range {:?}", descriptor.values());
        Ok(())
    }
}
