//! src/decryptor/stream/pipeline.rs
//! read → CBC decrypt → sink, one chunk at a time

use crate::aliases::Iv16;
use crate::cipher::AesCipher;
use crate::consts::{BLOCK_SIZE, STREAM_CHUNK_SIZE};
use crate::decryptor::stream::context::DecryptionContext;
use crate::decryptor::stream::trailer::write_final_pkcs7;
use crate::error::DecodeError;
use std::io::{self, Read, Write};

/// Fill `buf` from `reader` until it is full or the reader is exhausted.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut off = 0;
    while off < buf.len() {
        match reader.read(&mut buf[off..]) {
            Ok(0) => break,
            Ok(n) => off += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(off)
}

/// Decrypt a PKCS#7-padded AES-CBC stream from `input` into `output`.
///
/// `input` must yield exactly the ciphertext body. Each chunk is decrypted and
/// handed to `output` before the next is read, so memory stays at one chunk
/// and a slow sink throttles the reader. Returns plaintext bytes written.
///
/// # Errors
///
/// - [`DecodeError::UnalignedBody`] if the stream is not a whole number of blocks
/// - [`DecodeError::InvalidPadding`] if the final block is not PKCS#7 padded
/// - [`DecodeError::Io`] on read/write failure
pub(crate) fn decrypt_ciphertext_stream<R, W>(
    mut input: R,
    output: &mut W,
    cipher: &AesCipher,
    iv: &Iv16,
) -> Result<u64, DecodeError>
where
    R: Read,
    W: Write,
{
    let mut ctx = DecryptionContext::new_with_iv(iv);
    let mut chunk = vec![0u8; STREAM_CHUNK_SIZE];
    let mut plaintext = Vec::with_capacity(STREAM_CHUNK_SIZE);
    let mut consumed = 0u64;
    let mut written = 0u64;

    loop {
        let n = read_full(&mut input, &mut chunk)?;
        if n == 0 {
            break;
        }
        consumed += n as u64;
        if n % BLOCK_SIZE != 0 {
            return Err(DecodeError::UnalignedBody { len: consumed });
        }

        plaintext.clear();
        ctx.decrypt_blocks(cipher, &chunk[..n], &mut plaintext);
        output.write_all(&plaintext)?;
        written += plaintext.len() as u64;

        if n < chunk.len() {
            break;
        }
    }

    written += write_final_pkcs7(&ctx, output)?;
    output.flush()?;
    Ok(written)
}
