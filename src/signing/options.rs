//! Caller-facing configuration for a signing session.

use crate::geometry::Rect;
use crate::signing::appearance::AppearanceRenderer;
use std::fmt;

/// Options controlling how a signature is embedded.
///
/// Defaults produce an invisible signature named `Signature1` on the first
/// page, with the placeholder capacity determined by probing the signer.
pub struct SigningOptions {
    /// Name of the signature form field
    pub field_name: String,
    /// Reason for signing (/Reason)
    pub reason: Option<String>,
    /// Location of signing (/Location)
    pub location: Option<String>,
    /// Signer contact information (/ContactInfo)
    pub contact_info: Option<String>,
    /// Zero-based index of the page hosting the widget annotation
    pub page_index: usize,
    /// Widget rectangle in page coordinates; an empty rect yields an
    /// invisible signature
    pub rect: Rect,
    /// Explicit placeholder capacity in bytes.
    ///
    /// When set, the signer is not probed; the caller takes responsibility
    /// for reserving enough room for the real container (for example when a
    /// timestamp token of varying size will be attached).
    pub max_signature_len: Option<usize>,
    /// Custom appearance renderer for visible signatures
    pub appearance: Option<Box<dyn AppearanceRenderer>>,
}

impl Default for SigningOptions {
    fn default() -> Self {
        Self {
            field_name: "Signature1".to_string(),
            reason: None,
            location: None,
            contact_info: None,
            page_index: 0,
            rect: Rect::empty(),
            max_signature_len: None,
            appearance: None,
        }
    }
}

impl SigningOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the signature field name.
    pub fn with_field_name(mut self, name: impl Into<String>) -> Self {
        self.field_name = name.into();
        self
    }

    /// Set the /Reason entry.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Set the /Location entry.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the /ContactInfo entry.
    pub fn with_contact_info(mut self, contact: impl Into<String>) -> Self {
        self.contact_info = Some(contact.into());
        self
    }

    /// Place the widget annotation on the given page.
    pub fn with_page_index(mut self, index: usize) -> Self {
        self.page_index = index;
        self
    }

    /// Make the signature visible inside `rect` (page coordinates).
    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }

    /// Reserve exactly `len` bytes for the signature container instead of
    /// probing the signer.
    pub fn with_max_signature_len(mut self, len: usize) -> Self {
        self.max_signature_len = Some(len);
        self
    }

    /// Use a custom appearance renderer for the visible signature.
    pub fn with_appearance(mut self, renderer: Box<dyn AppearanceRenderer>) -> Self {
        self.appearance = Some(renderer);
        self
    }
}

impl fmt::Debug for SigningOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningOptions")
            .field("field_name", &self.field_name)
            .field("reason", &self.reason)
            .field("location", &self.location)
            .field("contact_info", &self.contact_info)
            .field("page_index", &self.page_index)
            .field("rect", &self.rect)
            .field("max_signature_len", &self.max_signature_len)
            .field("appearance", &self.appearance.as_ref().map(|_| "custom"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = SigningOptions::new();
        assert_eq!(options.field_name, "Signature1");
        assert_eq!(options.page_index, 0);
        assert!(options.rect.is_empty());
        assert!(options.max_signature_len.is_none());
    }

    #[test]
    fn test_builder_chain() {
        let options = SigningOptions::new()
            .with_field_name("ApprovalSig")
            .with_reason("Reviewed")
            .with_location("Lyon")
            .with_max_signature_len(8192)
            .with_rect(Rect::new(36.0, 700.0, 200.0, 50.0));

        assert_eq!(options.field_name, "ApprovalSig");
        assert_eq!(options.reason.as_deref(), Some("Reviewed"));
        assert_eq!(options.location.as_deref(), Some("Lyon"));
        assert_eq!(options.max_signature_len, Some(8192));
        assert!(!options.rect.is_empty());
    }
}
