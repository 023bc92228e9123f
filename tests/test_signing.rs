//! End-to-end signing tests: build a document, sign it, and verify the
//! patched file the way a PDF validator would.

use pdf_signer::{
    DocumentWriter, Rect, SignatureHandler, Signer, SignerError, SigningOptions,
};
use sha2::{Digest, Sha256};
use std::io::Read;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Signs by hashing the stream; the "container" is the SHA-256 digest.
/// Deterministic, so tests can recompute the expected signature.
struct DigestSigner;

impl Signer for DigestSigner {
    fn sign(&self, data: &mut dyn Read) -> Result<Vec<u8>, SignerError> {
        let mut hasher = Sha256::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = data.read(&mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        Ok(hasher.finalize().to_vec())
    }

    fn display_name(&self) -> String {
        "Alice Example".to_string()
    }
}

/// Returns a fixed-size dummy container.
struct StubSigner(usize);

impl Signer for StubSigner {
    fn sign(&self, data: &mut dyn Read) -> Result<Vec<u8>, SignerError> {
        let mut buf = Vec::new();
        data.read_to_end(&mut buf)?;
        Ok(vec![0xAB; self.0])
    }
}

fn sample_document() -> DocumentWriter {
    let mut doc = DocumentWriter::new();
    doc.add_page(595.0, 842.0);
    doc.page_content(0)
        .unwrap()
        .begin_text()
        .set_font("Helv", 12.0)
        .text("Service agreement", 72.0, 720.0)
        .end_text();
    doc
}

/// Parse the patched /ByteRange array out of a signed file.
fn extract_byte_range(bytes: &[u8]) -> [i64; 4] {
    let text = String::from_utf8_lossy(bytes);
    let start = text.find("/ByteRange [").expect("no ByteRange") + "/ByteRange [".len();
    let end = start + text[start..].find(']').expect("unterminated ByteRange");
    let values: Vec<i64> = text[start..end]
        .split_whitespace()
        .map(|v| v.parse().expect("non-integer in ByteRange"))
        .collect();
    assert_eq!(values.len(), 4, "ByteRange must hold four integers");
    [values[0], values[1], values[2], values[3]]
}

#[test]
fn test_signed_file_verifies() {
    init_logging();
    let mut doc = sample_document();
    SignatureHandler::new(Box::new(DigestSigner), SigningOptions::new())
        .attach_to(&mut doc)
        .unwrap();

    let bytes = doc.to_bytes().unwrap();
    let [zero, c0, c1, rem] = extract_byte_range(&bytes);
    let (c0, c1) = (c0 as usize, c1 as usize);

    // the descriptor partitions the file around the placeholder
    assert_eq!(zero, 0);
    assert_eq!(c1 + rem as usize, bytes.len());
    assert!(c0 < c1);

    // the placeholder sits exactly at [c0, c1) with its delimiters
    assert_eq!(bytes[c0], b'<');
    assert_eq!(bytes[c1 - 1], b'>');

    // recompute the signature over the covered ranges
    let mut hasher = Sha256::new();
    hasher.update(&bytes[..c0]);
    hasher.update(&bytes[c1..]);
    let expected = hex_lower(&hasher.finalize());

    let embedded = std::str::from_utf8(&bytes[c0 + 1..c0 + 1 + expected.len()]).unwrap();
    assert_eq!(embedded, expected);
}

#[test]
fn test_signature_is_lowercase_hex_with_zero_fill() {
    init_logging();
    let mut doc = sample_document();
    // probe sees 4 bytes; reserve more so zero-fill is observable
    let options = SigningOptions::new().with_max_signature_len(16);
    SignatureHandler::new(Box::new(StubSigner(4)), options)
        .attach_to(&mut doc)
        .unwrap();

    let bytes = doc.to_bytes().unwrap();
    let [_, c0, c1, _] = extract_byte_range(&bytes);
    let digits = &bytes[c0 as usize + 1..c1 as usize - 1];

    assert_eq!(digits.len(), 32);
    assert_eq!(&digits[..8], b"abababab");
    assert!(digits[8..].iter().all(|&b| b == b'0'));
}

#[test]
fn test_visible_signature_structure() {
    init_logging();
    let mut doc = sample_document();
    let options = SigningOptions::new()
        .with_reason("Contract approval")
        .with_location("Paris")
        .with_rect(Rect::new(36.0, 700.0, 200.0, 50.0));
    SignatureHandler::new(Box::new(DigestSigner), options)
        .attach_to(&mut doc)
        .unwrap();

    let bytes = doc.to_bytes().unwrap();
    let text = String::from_utf8_lossy(&bytes);

    assert!(text.contains("/FT /Sig"));
    assert!(text.contains("/T (Signature1)"));
    assert!(text.contains("/Subtype /Widget"));
    assert!(text.contains("/Rect [36 700 236 750]"));
    assert!(text.contains("/SigFlags 3"));
    assert!(text.contains("/Subtype /Form"));
    assert!(text.contains("/Reason (Contract approval)"));
    assert!(text.contains("/Location (Paris)"));
    assert!(text.contains("/SubFilter /adbe.pkcs7.detached"));
    // appearance stream is stored uncompressed
    assert!(text.contains("(Digitally signed by Alice Example) Tj"));
}

#[test]
fn test_invisible_signature_has_no_appearance() {
    init_logging();
    let mut doc = sample_document();
    SignatureHandler::new(Box::new(DigestSigner), SigningOptions::new())
        .attach_to(&mut doc)
        .unwrap();

    let bytes = doc.to_bytes().unwrap();
    let text = String::from_utf8_lossy(&bytes);

    assert!(text.contains("/Rect [0 0 0 0]"));
    assert!(!text.contains("/AP <<"));
    assert!(!text.contains("/Subtype /Form"));
}

#[test]
fn test_custom_field_name() {
    init_logging();
    let mut doc = sample_document();
    let options = SigningOptions::new().with_field_name("ApprovalSig");
    SignatureHandler::new(Box::new(DigestSigner), options)
        .attach_to(&mut doc)
        .unwrap();

    let bytes = doc.to_bytes().unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("/T (ApprovalSig)"));
}

#[test]
fn test_overflow_when_real_signature_exceeds_probe() {
    init_logging();

    /// Probe answers 8 bytes, real signing answers 64.
    struct GrowingSigner(AtomicUsize);
    impl Signer for GrowingSigner {
        fn sign(&self, data: &mut dyn Read) -> Result<Vec<u8>, SignerError> {
            let mut buf = Vec::new();
            data.read_to_end(&mut buf)?;
            let call = self.0.fetch_add(1, Ordering::SeqCst);
            Ok(vec![0u8; if call == 0 { 8 } else { 64 }])
        }
    }

    let mut doc = sample_document();
    SignatureHandler::new(Box::new(GrowingSigner(AtomicUsize::new(0))), SigningOptions::new())
        .attach_to(&mut doc)
        .unwrap();

    let err = doc.to_bytes().unwrap_err();
    assert!(matches!(
        err,
        pdf_signer::Error::SignatureOverflow { actual: 64, reserved: 8 }
    ));
}

#[test]
fn test_explicit_capacity_absorbs_growth() {
    init_logging();

    struct GrowingSigner(AtomicUsize);
    impl Signer for GrowingSigner {
        fn sign(&self, data: &mut dyn Read) -> Result<Vec<u8>, SignerError> {
            let mut buf = Vec::new();
            data.read_to_end(&mut buf)?;
            let call = self.0.fetch_add(1, Ordering::SeqCst);
            Ok(vec![0u8; 8 + call * 4])
        }
    }

    let mut doc = sample_document();
    let options = SigningOptions::new().with_max_signature_len(256);
    SignatureHandler::new(Box::new(GrowingSigner(AtomicUsize::new(0))), options)
        .attach_to(&mut doc)
        .unwrap();

    assert!(doc.to_bytes().is_ok());
}

#[test]
fn test_saving_twice_signs_each_file() {
    init_logging();
    let mut doc = sample_document();
    SignatureHandler::new(Box::new(DigestSigner), SigningOptions::new())
        .attach_to(&mut doc)
        .unwrap();

    let first = doc.to_bytes().unwrap();
    let second = doc.to_bytes().unwrap();

    // serialization is deterministic, so both saves place the signature
    // at the same offsets
    assert_eq!(extract_byte_range(&first), extract_byte_range(&second));

    for bytes in [&first, &second] {
        let [_, c0, c1, rem] = extract_byte_range(bytes);
        assert_eq!(c1 as usize + rem as usize, bytes.len());
        assert!(c0 < c1);
        // one signature field, not one per save
        let text = String::from_utf8_lossy(bytes);
        assert_eq!(text.matches("/FT /Sig").count(), 1);
    }
}

#[test]
fn test_provider_failure_during_save() {
    init_logging();

    struct FlakySigner(Arc<AtomicUsize>);
    impl Signer for FlakySigner {
        fn sign(&self, data: &mut dyn Read) -> Result<Vec<u8>, SignerError> {
            let mut buf = Vec::new();
            data.read_to_end(&mut buf)?;
            if self.0.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(vec![0u8; 16]) // probe succeeds
            } else {
                Err("smartcard removed".into())
            }
        }
    }

    let mut doc = sample_document();
    let calls = Arc::new(AtomicUsize::new(0));
    SignatureHandler::new(Box::new(FlakySigner(calls)), SigningOptions::new())
        .attach_to(&mut doc)
        .unwrap();

    let err = doc.to_bytes().unwrap_err();
    assert!(matches!(err, pdf_signer::Error::SigningProvider(_)));
    assert!(err.to_string().contains("smartcard removed"));
}

#[test]
fn test_save_to_disk() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("signed.pdf");

    let mut doc = sample_document();
    SignatureHandler::new(Box::new(DigestSigner), SigningOptions::new())
        .attach_to(&mut doc)
        .unwrap();
    doc.save(&path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF-1.7"));
    let [_, c0, c1, rem] = extract_byte_range(&bytes);
    assert_eq!(c1 as usize + rem as usize, bytes.len());
    assert!(c0 < c1);
}

#[test]
fn test_unsigned_document_has_no_form() {
    init_logging();
    let mut doc = sample_document();
    let bytes = doc.to_bytes().unwrap();
    let text = String::from_utf8_lossy(&bytes);

    assert!(!text.contains("/AcroForm"));
    assert!(!text.contains("/ByteRange"));
}

fn hex_lower(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
