//! Visible signature appearance rendering.
//!
//! A visible signature carries a form XObject drawn inside the widget
//! annotation's rectangle. Callers can provide their own renderer or rely
//! on [`DefaultAppearance`], which draws a bordered box with the signing
//! metadata as text lines.

use crate::error::Result;
use crate::geometry::Rect;
use crate::writer::content_stream::{ContentStreamBuilder, ContentStreamOp};
use chrono::{DateTime, Utc};

/// Signing metadata available to an appearance renderer.
#[derive(Debug, Clone, Copy)]
pub struct AppearanceContext<'a> {
    /// Name of the signature field being drawn
    pub field_name: &'a str,
    /// Signer identity reported by the signing provider, if any
    pub signer_name: Option<&'a str>,
    /// Reason for signing, if any
    pub reason: Option<&'a str>,
    /// Location of signing, if any
    pub location: Option<&'a str>,
    /// Signer contact information, if any
    pub contact_info: Option<&'a str>,
    /// Timestamp recorded in the signature dictionary
    pub signed_at: DateTime<Utc>,
}

/// Draws the visible appearance of a signature widget.
///
/// The returned bytes are a content stream in the coordinate space of the
/// widget's bounding box: origin at the lower-left corner, `rect.width` by
/// `rect.height` units. The stream is wrapped in a form XObject by the
/// writer; renderers only produce operators.
pub trait AppearanceRenderer {
    /// Produce the content stream drawn inside `rect`.
    fn render(&self, rect: Rect, ctx: &AppearanceContext<'_>) -> Result<Vec<u8>>;
}

/// Built-in appearance: a thin border with the signing metadata as text.
#[derive(Debug, Clone)]
pub struct DefaultAppearance {
    font_size: f32,
}

impl Default for DefaultAppearance {
    fn default() -> Self {
        Self { font_size: 8.0 }
    }
}

impl DefaultAppearance {
    /// Create a renderer with the default font size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the font size used for the text lines.
    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }
}

impl AppearanceRenderer for DefaultAppearance {
    fn render(&self, rect: Rect, ctx: &AppearanceContext<'_>) -> Result<Vec<u8>> {
        let size = self.font_size;
        let leading = size * 1.2;

        let headline = match ctx.signer_name {
            Some(name) => format!("Digitally signed by {}", name),
            None => "Digitally signed".to_string(),
        };

        let mut builder = ContentStreamBuilder::new();
        builder
            .op(ContentStreamOp::SaveState)
            .op(ContentStreamOp::SetLineWidth(0.5))
            .rect(0.5, 0.5, rect.width - 1.0, rect.height - 1.0)
            .stroke()
            .fill_gray(0.0)
            .begin_text()
            .set_font("Helv", size)
            .set_leading(leading)
            .text(&headline, 4.0, rect.height - leading);

        if let Some(reason) = ctx.reason {
            builder.text_line(&format!("Reason: {}", reason));
        }
        if let Some(location) = ctx.location {
            builder.text_line(&format!("Location: {}", location));
        }
        builder.text_line(&ctx.signed_at.format("%Y-%m-%d %H:%M:%S UTC").to_string());
        builder.end_text().op(ContentStreamOp::RestoreState);

        builder.build()
    }
}
