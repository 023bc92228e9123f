//! Signature form field and its widget annotation.

use crate::geometry::Rect;
use crate::object::{Object, ObjectRef};
use crate::writer::object_serializer::ObjectSerializer;
use std::collections::HashMap;

bitflags::bitflags! {
    /// Annotation flags per ISO 32000-1:2008 Table 165.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AnnotationFlags: u32 {
        /// Do not display the annotation
        const HIDDEN = 1 << 1;
        /// Print the annotation when the page is printed
        const PRINT = 1 << 2;
        /// Do not allow the annotation to be deleted or moved
        const LOCKED = 1 << 7;
        /// Do not allow the annotation contents to be modified
        const LOCKED_CONTENTS = 1 << 9;
    }
}

/// A signature form field, merged with its widget annotation.
///
/// PDF allows a field with a single widget to share one dictionary for
/// both; signed documents conventionally do so.
#[derive(Debug, Clone)]
pub struct SignatureField {
    /// Partial field name (/T)
    pub name: String,
    /// Widget rectangle in page coordinates; empty for invisible signatures
    pub rect: Rect,
    /// Zero-based index of the hosting page
    pub page_index: usize,
    /// Annotation flags (/F)
    pub flags: AnnotationFlags,
}

impl SignatureField {
    /// Create a field with the conventional flags for signatures: printed
    /// with the page and locked against deletion.
    pub fn new(name: impl Into<String>, rect: Rect, page_index: usize) -> Self {
        Self {
            name: name.into(),
            rect,
            page_index,
            flags: AnnotationFlags::PRINT | AnnotationFlags::LOCKED,
        }
    }

    /// Build the merged field/widget dictionary.
    ///
    /// `value` references the signature dictionary, `page` the hosting page,
    /// and `appearance` the normal appearance form XObject if the signature
    /// is visible.
    pub(crate) fn widget_dict(
        &self,
        value: ObjectRef,
        page: ObjectRef,
        appearance: Option<ObjectRef>,
    ) -> HashMap<String, Object> {
        let mut dict = HashMap::new();
        dict.insert("Type".to_string(), Object::Name("Annot".to_string()));
        dict.insert("Subtype".to_string(), Object::Name("Widget".to_string()));
        dict.insert("FT".to_string(), Object::Name("Sig".to_string()));
        dict.insert("T".to_string(), Object::String(self.name.as_bytes().to_vec()));
        dict.insert(
            "Rect".to_string(),
            ObjectSerializer::rect(
                self.rect.x as f64,
                self.rect.y as f64,
                self.rect.width as f64,
                self.rect.height as f64,
            ),
        );
        dict.insert("F".to_string(), Object::Integer(self.flags.bits() as i64));
        dict.insert("P".to_string(), Object::Reference(page));
        dict.insert("V".to_string(), Object::Reference(value));

        if let Some(ap) = appearance {
            let mut ap_dict = HashMap::new();
            ap_dict.insert("N".to_string(), Object::Reference(ap));
            dict.insert("AP".to_string(), Object::Dictionary(ap_dict));
        }

        dict
    }
}
