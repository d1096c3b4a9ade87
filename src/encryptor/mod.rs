// src/encryptor/mod.rs

//! Container writer.
//!
//! Core API: `encode_container(src, dst, cipher_id, &key, &layout, &table)?`.
//! Produces containers `decode` accepts; used for fixtures and benchmarks.

pub(crate) mod encode;
pub(crate) mod stream;

pub use encode::encode_container;
