//! PDF content stream builder.
//!
//! Builds PDF content streams containing graphics and text operators
//! according to PDF specification ISO 32000-1:2008 Section 8-9. Used for
//! page content and for signature appearance streams.

use crate::error::Result;
use std::io::Write;

/// Operations that can be added to a content stream.
#[derive(Debug, Clone)]
pub enum ContentStreamOp {
    /// Save graphics state (q)
    SaveState,
    /// Restore graphics state (Q)
    RestoreState,
    /// Begin text object (BT)
    BeginText,
    /// End text object (ET)
    EndText,
    /// Set font and size (Tf)
    SetFont(String, f32),
    /// Move text position (Td)
    MoveText(f32, f32),
    /// Set text leading (TL)
    SetTextLeading(f32),
    /// Move to next line (T*)
    NextLine,
    /// Show text (Tj) - literal string
    ShowText(String),
    /// Set fill color gray (g)
    SetFillColorGray(f32),
    /// Set line width (w)
    SetLineWidth(f32),
    /// Rectangle (re)
    Rectangle(f32, f32, f32, f32),
    /// Stroke (S)
    Stroke,
}

/// Builder for PDF content streams.
///
/// Creates the byte sequence for a PDF content stream from operations.
#[derive(Debug, Default)]
pub struct ContentStreamBuilder {
    /// Operations in the stream
    operations: Vec<ContentStreamOp>,
    /// Whether a text object is currently open
    in_text: bool,
}

impl ContentStreamBuilder {
    /// Create a new, empty content stream builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a raw operation to the stream.
    pub fn op(&mut self, op: ContentStreamOp) -> &mut Self {
        self.operations.push(op);
        self
    }

    /// Begin a text object (BT). No-op if already inside one.
    pub fn begin_text(&mut self) -> &mut Self {
        if !self.in_text {
            self.operations.push(ContentStreamOp::BeginText);
            self.in_text = true;
        }
        self
    }

    /// End the current text object (ET). No-op if none is open.
    pub fn end_text(&mut self) -> &mut Self {
        if self.in_text {
            self.operations.push(ContentStreamOp::EndText);
            self.in_text = false;
        }
        self
    }

    /// Set the active font and size (Tf).
    pub fn set_font(&mut self, name: impl Into<String>, size: f32) -> &mut Self {
        self.operations.push(ContentStreamOp::SetFont(name.into(), size));
        self
    }

    /// Set the text leading used by `next_line` (TL).
    pub fn set_leading(&mut self, leading: f32) -> &mut Self {
        self.operations.push(ContentStreamOp::SetTextLeading(leading));
        self
    }

    /// Show text at the given position (Td + Tj).
    pub fn text(&mut self, text: &str, x: f32, y: f32) -> &mut Self {
        self.begin_text();
        self.operations.push(ContentStreamOp::MoveText(x, y));
        self.operations.push(ContentStreamOp::ShowText(text.to_string()));
        self
    }

    /// Show text on the next line (T* + Tj).
    pub fn text_line(&mut self, text: &str) -> &mut Self {
        self.operations.push(ContentStreamOp::NextLine);
        self.operations.push(ContentStreamOp::ShowText(text.to_string()));
        self
    }

    /// Add a rectangle path (re).
    pub fn rect(&mut self, x: f32, y: f32, width: f32, height: f32) -> &mut Self {
        self.end_text();
        self.operations
            .push(ContentStreamOp::Rectangle(x, y, width, height));
        self
    }

    /// Stroke the current path (S).
    pub fn stroke(&mut self) -> &mut Self {
        self.operations.push(ContentStreamOp::Stroke);
        self
    }

    /// Set the fill color as a gray level, 0.0 (black) to 1.0 (white).
    pub fn fill_gray(&mut self, gray: f32) -> &mut Self {
        self.operations.push(ContentStreamOp::SetFillColorGray(gray));
        self
    }

    /// Check whether any operations have been added.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Build the content stream bytes.
    ///
    /// Any open text object is closed implicitly.
    pub fn build(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        for op in &self.operations {
            Self::write_op(&mut out, op)?;
        }
        if self.in_text {
            writeln!(out, "ET")?;
        }
        Ok(out)
    }

    fn write_op(out: &mut Vec<u8>, op: &ContentStreamOp) -> Result<()> {
        match op {
            ContentStreamOp::SaveState => writeln!(out, "q")?,
            ContentStreamOp::RestoreState => writeln!(out, "Q")?,
            ContentStreamOp::BeginText => writeln!(out, "BT")?,
            ContentStreamOp::EndText => writeln!(out, "ET")?,
            ContentStreamOp::SetFont(name, size) => {
                write!(out, "/")?;
                out.extend_from_slice(name.as_bytes());
                writeln!(out, " {} Tf", fmt_num(*size))?;
            },
            ContentStreamOp::MoveText(x, y) => {
                writeln!(out, "{} {} Td", fmt_num(*x), fmt_num(*y))?
            },
            ContentStreamOp::SetTextLeading(l) => writeln!(out, "{} TL", fmt_num(*l))?,
            ContentStreamOp::NextLine => writeln!(out, "T*")?,
            ContentStreamOp::ShowText(text) => {
                write!(out, "(")?;
                for &byte in text.as_bytes() {
                    match byte {
                        b'(' => out.extend_from_slice(b"\\("),
                        b')' => out.extend_from_slice(b"\\)"),
                        b'\\' => out.extend_from_slice(b"\\\\"),
                        _ => out.push(byte),
                    }
                }
                writeln!(out, ") Tj")?;
            },
            ContentStreamOp::SetFillColorGray(g) => writeln!(out, "{} g", fmt_num(*g))?,
            ContentStreamOp::SetLineWidth(w) => writeln!(out, "{} w", fmt_num(*w))?,
            ContentStreamOp::Rectangle(x, y, w, h) => writeln!(
                out,
                "{} {} {} {} re",
                fmt_num(*x),
                fmt_num(*y),
                fmt_num(*w),
                fmt_num(*h)
            )?,
            ContentStreamOp::Stroke => writeln!(out, "S")?,
        }
        Ok(())
    }
}

/// Format a number the way PDF content streams expect: integers without a
/// decimal point, reals with trailing zeros trimmed.
fn fmt_num(value: f32) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        let formatted = format!("{:.4}", value);
        formatted
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}
