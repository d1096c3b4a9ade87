// src/decryptor/mod.rs

//! High-level decoding facade.
//!
//! Core API: `decode(input, output, &credential)?` for full file handling.
//! [`Decoder`] for a custom layout / cipher table or in-memory streams.

pub(crate) mod decode;
pub(crate) mod output;
pub(crate) mod stream;

pub use decode::{decode, Decoder};
