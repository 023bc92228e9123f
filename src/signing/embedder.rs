//! In-place signature embedding.
//!
//! Patches a fully serialized document: writes the real /ByteRange values
//! over their placeholder, signs everything outside the /Contents
//! placeholder, and writes the signature as lowercase hex into the
//! placeholder. All patches are width-preserving, so no byte offset in the
//! file moves.

use crate::error::{Error, Result};
use crate::signing::byterange::{ByteRangeDescriptor, ByteRangeView};
use crate::signing::position::ByteSpan;
use crate::signing::signer::Signer;

const HEX_LOWER: &[u8; 16] = b"0123456789abcdef";

/// Patches a serialized document with its final signature.
pub struct SignatureEmbedder;

impl SignatureEmbedder {
    /// Embed the signature into `output` in place.
    ///
    /// `contents` and `byte_range` are the resolved placeholder spans. The
    /// ByteRange values are patched first, so the signer sees the final
    /// bytes of everything it covers; on [`Error::SignatureOverflow`] or a
    /// provider failure the file is left with the ByteRange patched but the
    /// placeholder digits still zero.
    pub fn embed(
        output: &mut [u8],
        contents: ByteSpan,
        byte_range: ByteSpan,
        signer: &dyn Signer,
    ) -> Result<ByteRangeDescriptor> {
        Self::check_contents_placeholder(output, contents)?;
        Self::check_byte_range_placeholder(output, byte_range)?;

        let descriptor = ByteRangeDescriptor::compute(output.len(), contents)?;
        let patched = descriptor.format_padded(byte_range.len())?;
        output[byte_range.start..byte_range.end].copy_from_slice(&patched);

        let signature = {
            let mut view = ByteRangeView::new(output, contents.start, contents.end)?;
            signer.sign(&mut view).map_err(Error::SigningProvider)?
        };

        let capacity = (contents.len() - 2) / 2;
        if signature.len() > capacity {
            return Err(Error::SignatureOverflow {
                actual: signature.len(),
                reserved: capacity,
            });
        }
        log::debug!(
            "embedding {} byte signature into {} byte placeholder at offset {}",
            signature.len(),
            capacity,
            contents.start
        );

        let mut pos = contents.start + 1;
        for byte in &signature {
            output[pos] = HEX_LOWER[(byte >> 4) as usize];
            output[pos + 1] = HEX_LOWER[(byte & 0x0F) as usize];
            pos += 2;
        }

        Ok(descriptor)
    }

    fn check_contents_placeholder(output: &[u8], span: ByteSpan) -> Result<()> {
        let valid = span.end <= output.len()
            && span.len() >= 4
            && span.len() % 2 == 0
            && output[span.start] == b'<'
            && output[span.end - 1] == b'>';
        if !valid {
            return Err(Error::StalePosition(format!(
                "bytes at [{}, {}) are not a hex string placeholder",
                span.start, span.end
            )));
        }
        Ok(())
    }

    fn check_byte_range_placeholder(output: &[u8], span: ByteSpan) -> Result<()> {
        let valid = span.end <= output.len()
            && span.len() >= 2
            && output[span.start] == b'['
            && output[span.end - 1] == b']';
        if !valid {
            return Err(Error::StalePosition(format!(
                "bytes at [{}, {}) are not an array placeholder",
                span.start, span.end
            )));
        }
        Ok(())
    }
}
