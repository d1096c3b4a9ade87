//! # Decode Jobs
//!
//! A [`DecodeJob`] names one container, where its plaintext goes and the key
//! that opens it. [`JobDecoder`] is the seam between the batch orchestrator
//! and whatever actually decodes a job.

use crate::aliases::Credential;
use crate::decryptor::Decoder;
use crate::error::DecodeError;
use std::fmt;
use std::path::PathBuf;

/// One container to decode. Consumed exactly once by a batch.
pub struct DecodeJob {
    /// Stable identifier used in progress events and failure reports.
    pub id: String,
    pub input: PathBuf,
    pub output: PathBuf,
    pub credential: Credential,
}

impl DecodeJob {
    pub fn new(
        id: impl Into<String>,
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        credential: Credential,
    ) -> Self {
        Self {
            id: id.into(),
            input: input.into(),
            output: output.into(),
            credential,
        }
    }
}

impl fmt::Debug for DecodeJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeJob")
            .field("id", &self.id)
            .field("input", &self.input)
            .field("output", &self.output)
            .field("credential", &"[REDACTED]")
            .finish()
    }
}

/// Something that can run a single [`DecodeJob`].
///
/// Implementations are called from several worker threads at once.
pub trait JobDecoder {
    /// Decode `job`, returning plaintext bytes written.
    fn decode_job(&self, job: &DecodeJob) -> Result<u64, DecodeError>;
}

impl JobDecoder for Decoder {
    fn decode_job(&self, job: &DecodeJob) -> Result<u64, DecodeError> {
        self.decode(&job.input, &job.output, &job.credential)
    }
}

impl<T: JobDecoder + ?Sized> JobDecoder for &T {
    fn decode_job(&self, job: &DecodeJob) -> Result<u64, DecodeError> {
        (**self).decode_job(job)
    }
}
