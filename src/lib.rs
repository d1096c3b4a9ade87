// src/lib.rs

//! Decoder for sealed containers: a fixed 1024-byte header, an AES-CBC
//! encrypted body and a fixed 1024-byte footer.
//!
//! The ciphertext is checked against the footer's MD5 and SHA-256 before any
//! decryption, and the plaintext against the header's SHA-256 afterwards. The
//! output file only survives if both checks pass.

pub mod aliases;
#[cfg(feature = "batch-ops")]
pub mod batch_ops;
pub mod cipher;
pub mod config;
pub mod consts;
pub mod decryptor;
pub mod encryptor;
pub mod error;
pub mod header;
pub mod inspect;
pub mod integrity;
pub mod job;
pub mod layout;
pub mod utils;

// High-level API
pub use decryptor::{decode, Decoder};
pub use encryptor::encode_container;
pub use error::{
    BatchError, ConfigError, DecodeError, DecodeErrorKind, InspectError, JobError, LayoutError,
};

pub use aliases::Credential;
pub use cipher::{resolve, CipherAlgorithm, CipherSpec, CipherTable};
pub use config::{BatchConfig, JobManifest};
pub use inspect::{inspect_path, ContainerReport};
pub use job::{DecodeJob, JobDecoder};
pub use layout::ContainerLayout;

#[cfg(feature = "batch-ops")]
pub use batch_ops::{
    run_all, run_all_with, BatchSummary, JobOutcome, LogProgress, NoProgress, ProgressEvent,
    ProgressSink,
};
