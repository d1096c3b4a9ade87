//! src/decryptor/stream/trailer.rs
//! Final block handling: PKCS#7 validation and release

use crate::decryptor::stream::context::DecryptionContext;
use crate::error::DecodeError;
use secure_gate::conversions::SecureConversionsExt;
use std::io::Write;

/// Strip PKCS#7 padding from the held-back final block and write the rest.
///
/// Returns the number of plaintext bytes written.
#[inline(always)]
pub(crate) fn write_final_pkcs7<W: Write>(
    ctx: &DecryptionContext,
    output: &mut W,
) -> Result<u64, DecodeError> {
    if !ctx.need_write_plaintext {
        // empty body: there is no block to carry the mandatory padding
        return Err(DecodeError::InvalidPadding);
    }

    let block = ctx.plaintext_block.expose_secret();
    let padding = block[15];

    if padding == 0 || padding > 16 {
        return Err(DecodeError::InvalidPadding);
    }

    // constant-time compare of every padding byte
    let padding_start = 16 - padding as usize;
    let expected_padding = [padding; 16];
    let actual_padding_slice = &block[padding_start..];
    let expected_padding_slice = &expected_padding[padding_start..];
    if !actual_padding_slice.ct_eq(expected_padding_slice) {
        return Err(DecodeError::InvalidPadding);
    }

    output.write_all(&block[..padding_start])?;
    Ok(padding_start as u64)
}
