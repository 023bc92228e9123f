//! AcroForm builder for the document-level interactive form dictionary.
//!
//! Implements the AcroForm dictionary per ISO 32000-1:2008 Section 12.7.2.
//! For signed documents the dictionary carries the SigFlags entry
//! (Table 219): bit 1 marks that signatures exist, bit 2 requests
//! append-only incremental saves.

use crate::object::{Object, ObjectRef};
use std::collections::HashMap;

/// Builder for the document-level AcroForm dictionary.
///
/// This dictionary defines the document's interactive form properties
/// and contains references to all form fields.
#[derive(Debug, Clone)]
pub struct AcroFormBuilder {
    /// Field object references
    fields: Vec<ObjectRef>,
    /// Signature flags
    sig_flags: Option<u32>,
    /// Default appearance string
    default_appearance: Option<String>,
}

impl Default for AcroFormBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AcroFormBuilder {
    /// SigFlags value for a signed document: SignaturesExist | AppendOnly.
    pub const SIG_FLAGS_SIGNED: u32 = 3;

    /// Create a new AcroForm builder.
    ///
    /// NeedAppearances is deliberately absent: signed documents provide
    /// their own appearance streams so viewers do not touch signed bytes.
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            sig_flags: None,
            default_appearance: Some("/Helv 0 Tf 0 g".to_string()),
        }
    }

    /// Add a field reference.
    pub fn add_field(&mut self, field_ref: ObjectRef) {
        self.fields.push(field_ref);
    }

    /// Replace the signature flags.
    ///
    /// Per PDF spec Table 219:
    /// - Bit 1: SignaturesExist - document contains signatures
    /// - Bit 2: AppendOnly - document shall be saved with incremental updates
    pub fn set_sig_flags(&mut self, flags: u32) {
        self.sig_flags = Some(flags);
    }

    /// Get the current signature flags, if set.
    pub fn sig_flags(&self) -> Option<u32> {
        self.sig_flags
    }

    /// Check if this form has any fields.
    pub fn has_fields(&self) -> bool {
        !self.fields.is_empty()
    }

    /// Get the number of fields.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Build the AcroForm dictionary with default resources embedded.
    pub fn build(&self) -> HashMap<String, Object> {
        let mut dict = HashMap::new();

        // Fields array (required)
        let fields: Vec<Object> = self.fields.iter().map(|r| Object::Reference(*r)).collect();
        dict.insert("Fields".to_string(), Object::Array(fields));

        if let Some(flags) = self.sig_flags {
            dict.insert("SigFlags".to_string(), Object::Integer(flags as i64));
        }

        if let Some(ref da) = self.default_appearance {
            dict.insert("DA".to_string(), Object::String(da.as_bytes().to_vec()));
        }

        dict.insert("DR".to_string(), Object::Dictionary(Self::build_default_resources()));

        dict
    }

    /// Build a minimal DR (Default Resources) dictionary with the standard
    /// form font used by signature appearances.
    pub fn build_default_resources() -> HashMap<String, Object> {
        let mut dr = HashMap::new();
        let mut fonts = HashMap::new();

        // Helvetica (Helv)
        let mut helv = HashMap::new();
        helv.insert("Type".to_string(), Object::Name("Font".to_string()));
        helv.insert("Subtype".to_string(), Object::Name("Type1".to_string()));
        helv.insert("BaseFont".to_string(), Object::Name("Helvetica".to_string()));
        helv.insert("Encoding".to_string(), Object::Name("WinAnsiEncoding".to_string()));
        fonts.insert("Helv".to_string(), Object::Dictionary(helv));

        dr.insert("Font".to_string(), Object::Dictionary(fonts));
        dr
    }
}
