//! src/encryptor/encode.rs
//! Container writer, the inverse of `decode`. Used to build fixtures.

use crate::aliases::{Credential, Iv16};
use crate::cipher::{AesCipher, CipherTable};
use crate::encryptor::stream::encrypt_stream;
use crate::error::DecodeError;
use crate::layout::ContainerLayout;
use md5::Md5;
use sha2::{Digest, Sha256};
use std::io::{self, Read, Write};

/// Seal `input` into a container written to `output`.
///
/// The header receives the plaintext SHA-256 and `cipher_id`; the footer
/// receives the MD5 and SHA-256 of the ciphertext body. All other header and
/// footer bytes are zero.
///
/// Because the footer digests cover the ciphertext, the body is buffered in
/// memory before anything is written. Returns the container length.
///
/// # Errors
///
/// - [`DecodeError::Layout`] for a layout that does not validate
/// - [`DecodeError::UnsupportedCipher`] if `cipher_id` is not in `table`
/// - [`DecodeError::KeyLengthMismatch`] if `key` has the wrong length
/// - [`DecodeError::Io`] on read/write failure
pub fn encode_container<R, W>(
    input: R,
    mut output: W,
    cipher_id: u32,
    key: &Credential,
    layout: &ContainerLayout,
    table: &CipherTable,
) -> Result<u64, DecodeError>
where
    R: Read,
    W: Write,
{
    layout.validate()?;
    let spec = table.resolve(cipher_id)?;
    let key = key.expose_secret();
    if key.len() != spec.key_len {
        return Err(DecodeError::KeyLengthMismatch {
            expected: spec.key_len,
            actual: key.len(),
        });
    }
    let cipher = AesCipher::new(spec.algorithm, key)?;

    let mut plain = HashingReader::<_, Sha256>::new(input);
    let mut body = Vec::new();
    encrypt_stream(&mut plain, &mut body, &Iv16::new(layout.iv), &cipher)?;
    let plain_sha256 = plain.finish();
    let body_md5 = Md5::digest(&body);
    let body_sha256 = Sha256::digest(&body);

    let mut header = vec![0u8; layout.header_size];
    header[layout.source_sha256_offset..layout.source_sha256_offset + 32]
        .copy_from_slice(&plain_sha256);
    header[layout.cipher_id_offset..layout.cipher_id_offset + 4]
        .copy_from_slice(&cipher_id.to_le_bytes());

    let mut footer = vec![0u8; layout.footer_size];
    footer[layout.body_md5_offset..layout.body_md5_offset + 16].copy_from_slice(&body_md5);
    footer[layout.body_sha256_offset..layout.body_sha256_offset + 32]
        .copy_from_slice(&body_sha256);

    output.write_all(&header)?;
    output.write_all(&body)?;
    output.write_all(&footer)?;
    output.flush()?;

    Ok((header.len() + body.len() + footer.len()) as u64)
}

/// Reader stage that hashes everything it yields.
struct HashingReader<R, D> {
    inner: R,
    digest: D,
}

impl<R: Read, D: Digest> HashingReader<R, D> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            digest: D::new(),
        }
    }

    fn finish(self) -> Vec<u8> {
        self.digest.finalize().to_vec()
    }
}

impl<R: Read, D: Digest> Read for HashingReader<R, D> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.digest.update(&buf[..n]);
        Ok(n)
    }
}
