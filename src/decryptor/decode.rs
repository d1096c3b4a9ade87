//! src/decryptor/decode.rs
//! Container decode: verify ciphertext, decrypt, verify plaintext

use crate::aliases::{Credential, Iv16};
use crate::cipher::{AesCipher, CipherSpec, CipherTable};
use crate::consts::BLOCK_SIZE;
use crate::decryptor::output::StagedOutput;
use crate::decryptor::stream::decrypt_ciphertext_stream;
use crate::error::DecodeError;
use crate::header::read_regions;
use crate::integrity::{verify_range, DigestWriter};
use crate::layout::ContainerLayout;
use crate::utils::hex_eq_ignore_case;
use sha2::Sha256;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::debug;

/// The container codec.
///
/// Holds only immutable format data (layout + cipher table), so one decoder
/// can be shared by any number of concurrent decodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Decoder {
    layout: ContainerLayout,
    table: CipherTable,
}

/// Everything established before a single plaintext byte is produced.
struct DecodePlan {
    spec: CipherSpec,
    body_start: u64,
    body_len: u64,
    expected_plain_sha256: String,
    cipher: AesCipher,
    iv: Iv16,
}

impl Decoder {
    pub const fn new(layout: ContainerLayout, table: CipherTable) -> Self {
        Self { layout, table }
    }

    /// Decode the container at `input_path` into `output_path`.
    ///
    /// Nothing is written until the ciphertext digests, cipher id and key
    /// length have all been checked. Plaintext is then staged in a temp file
    /// beside `output_path` and renamed over it only after the plaintext
    /// digest matches, so a failed decode leaves `output_path` (and an input
    /// at the same path) exactly as it was. The input handle is closed on
    /// every path.
    ///
    /// Returns the number of plaintext bytes written.
    pub fn decode(
        &self,
        input_path: &Path,
        output_path: &Path,
        credential: &Credential,
    ) -> Result<u64, DecodeError> {
        let mut input = File::open(input_path)?;
        let plan = self.plan(&mut input, credential)?;

        let mut output = StagedOutput::create(output_path)?;
        let written = self.decrypt_into(&mut input, &mut output, &plan)?;
        drop(input);
        output.commit()?;

        debug!(
            input = %input_path.display(),
            output = %output_path.display(),
            cipher = %plan.spec.algorithm,
            bytes = written,
            "decoded container"
        );
        Ok(written)
    }

    /// Decode from any seekable source into any sink.
    ///
    /// Same checks and ordering as [`decode`](Self::decode), but the caller
    /// owns the sink: on failure whatever was already written stays there.
    pub fn decode_stream<R, W>(
        &self,
        input: &mut R,
        output: &mut W,
        credential: &Credential,
    ) -> Result<u64, DecodeError>
    where
        R: Read + Seek,
        W: Write,
    {
        let plan = self.plan(input, credential)?;
        self.decrypt_into(input, output, &plan)
    }

    /// Steps that can fail without touching any output.
    fn plan<R>(&self, input: &mut R, credential: &Credential) -> Result<DecodePlan, DecodeError>
    where
        R: Read + Seek,
    {
        let layout = &self.layout;
        layout.validate()?;

        let size = input.seek(SeekFrom::End(0))?;
        let minimum = layout.min_container_len();
        if size < minimum {
            return Err(DecodeError::TooSmall { size, minimum });
        }

        let regions = read_regions(input, layout, size)?;
        debug!(size, "read container header and footer");

        let body = layout.body_range(size);
        verify_range(
            input,
            body.start,
            body.end - 1,
            &hex::encode(regions.body_md5(layout)),
            &hex::encode(regions.body_sha256(layout)),
        )?;
        let body_len = body.end - body.start;
        debug!(body_len, "ciphertext digests verified");

        let spec = self.table.resolve(regions.cipher_id(layout))?;

        let key = credential.expose_secret();
        if key.len() != spec.key_len {
            return Err(DecodeError::KeyLengthMismatch {
                expected: spec.key_len,
                actual: key.len(),
            });
        }

        if body_len % BLOCK_SIZE as u64 != 0 {
            return Err(DecodeError::UnalignedBody { len: body_len });
        }

        Ok(DecodePlan {
            spec,
            body_start: body.start,
            body_len,
            expected_plain_sha256: hex::encode(regions.source_sha256(layout)),
            cipher: AesCipher::new(spec.algorithm, key)?,
            iv: Iv16::new(layout.iv),
        })
    }

    /// Stream-decrypt the body into `output` while hashing the plaintext.
    fn decrypt_into<R, W>(
        &self,
        input: &mut R,
        output: &mut W,
        plan: &DecodePlan,
    ) -> Result<u64, DecodeError>
    where
        R: Read + Seek,
        W: Write,
    {
        input.seek(SeekFrom::Start(plan.body_start))?;
        let body = input.take(plan.body_len);

        let mut hashing = DigestWriter::<_, Sha256>::new(output);
        decrypt_ciphertext_stream(body, &mut hashing, &plan.cipher, &plan.iv)?;
        let (_, actual, written) = hashing.finish();

        if !hex_eq_ignore_case(&actual, &plan.expected_plain_sha256) {
            return Err(DecodeError::PostDecryptIntegrity {
                expected: plan.expected_plain_sha256.clone(),
                actual,
            });
        }
        Ok(written)
    }
}

/// Decode with the standard layout and cipher table.
///
/// See [`Decoder::decode`].
pub fn decode(
    input_path: &Path,
    output_path: &Path,
    credential: &Credential,
) -> Result<u64, DecodeError> {
    Decoder::default().decode(input_path, output_path, credential)
}
