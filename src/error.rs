//! # Error Types
//!
//! One closed enum per concern. Per-container failures are [`DecodeError`];
//! they never escape a batch on their own and are collected per job by the
//! orchestrator. [`BatchError`] is reserved for failures of the batch as a
//! whole.

use std::fmt;
use thiserror::Error;

/// A container layout whose fields do not fit inside their region.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// A header or footer region of size zero.
    #[error("{region} size must be non-zero")]
    EmptyRegion { region: &'static str },

    /// A field extends past the end of its region.
    #[error("{field} at offset {offset} (+{len}) does not fit in {region} of {size} bytes")]
    FieldOutOfBounds {
        region: &'static str,
        field: &'static str,
        offset: usize,
        len: usize,
        size: usize,
    },
}

/// The error type for decoding a single container.
///
/// Variants carry structured context instead of pre-formatted text so callers
/// can branch on [`DecodeError::kind`] and still render a useful message.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// I/O error while reading the container or writing the output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The container is shorter than its fixed header plus footer.
    #[error("container too small: {size} bytes, need at least {minimum}")]
    TooSmall { size: u64, minimum: u64 },

    /// The ciphertext body does not match the digests embedded in the footer.
    ///
    /// No decryption is attempted when this is returned.
    #[error(
        "ciphertext integrity check failed over bytes {start}..={end}: \
         md5 expected {expected_fast}, got {actual_fast}; \
         sha256 expected {expected_strong}, got {actual_strong}"
    )]
    PreDecryptIntegrity {
        start: u64,
        end: u64,
        expected_fast: String,
        actual_fast: String,
        expected_strong: String,
        actual_strong: String,
    },

    /// The header names a cipher identifier outside the cipher table.
    #[error("unsupported cipher id: {0:#x}")]
    UnsupportedCipher(u32),

    /// The credential length differs from the resolved cipher's key length.
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    KeyLengthMismatch { expected: usize, actual: usize },

    /// The ciphertext body is not a whole number of cipher blocks.
    #[error("ciphertext body of {len} bytes is not a multiple of the block size")]
    UnalignedBody { len: u64 },

    /// The final decrypted block does not carry valid PKCS#7 padding.
    #[error("invalid PKCS#7 padding in final block")]
    InvalidPadding,

    /// The decrypted plaintext does not match the digest embedded in the header.
    #[error("plaintext integrity check failed: sha256 expected {expected}, got {actual}")]
    PostDecryptIntegrity { expected: String, actual: String },

    /// The decoder was built with a layout that cannot be applied.
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),
}

/// Fieldless tag for [`DecodeError`], handy for matching and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeErrorKind {
    Io,
    TooSmall,
    PreDecryptIntegrity,
    UnsupportedCipher,
    KeyLengthMismatch,
    UnalignedBody,
    InvalidPadding,
    PostDecryptIntegrity,
    Layout,
}

impl DecodeError {
    /// The variant of this error without its context.
    pub fn kind(&self) -> DecodeErrorKind {
        match self {
            DecodeError::Io(_) => DecodeErrorKind::Io,
            DecodeError::TooSmall { .. } => DecodeErrorKind::TooSmall,
            DecodeError::PreDecryptIntegrity { .. } => DecodeErrorKind::PreDecryptIntegrity,
            DecodeError::UnsupportedCipher(_) => DecodeErrorKind::UnsupportedCipher,
            DecodeError::KeyLengthMismatch { .. } => DecodeErrorKind::KeyLengthMismatch,
            DecodeError::UnalignedBody { .. } => DecodeErrorKind::UnalignedBody,
            DecodeError::InvalidPadding => DecodeErrorKind::InvalidPadding,
            DecodeError::PostDecryptIntegrity { .. } => DecodeErrorKind::PostDecryptIntegrity,
            DecodeError::Layout(_) => DecodeErrorKind::Layout,
        }
    }
}

impl fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Why a single batch job did not succeed.
#[derive(Error, Debug)]
pub enum JobError {
    /// The codec rejected the container.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The job panicked; the panic was contained to this job.
    #[error("job panicked: {0}")]
    Panicked(String),
}

/// Failures of a batch as a whole.
#[derive(Error, Debug)]
pub enum BatchError {
    /// Concurrency must be at least one.
    #[error("invalid concurrency: {0} (must be >= 1)")]
    InvalidConcurrency(usize),

    /// The worker pool could not be started.
    #[cfg(feature = "batch-ops")]
    #[error("failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// One or more jobs failed; every job still ran to completion.
    #[error("{failed} of {total} jobs failed")]
    PartialFailure { failed: usize, total: usize },
}

/// Failures while loading batch configuration or a job manifest.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// No credential is known for a job. Raised before anything is scheduled.
    #[error("no credential for job {id}")]
    MissingCredential { id: String },
}

/// Failures of the read-only metadata inspection.
#[derive(Error, Debug)]
pub enum InspectError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("container too small: {size} bytes, need at least {minimum}")]
    TooSmall { size: u64, minimum: u64 },

    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),
}
