// src/decryptor/stream/mod.rs
pub(crate) mod context;
pub(crate) mod pipeline;
pub(crate) mod trailer;

pub(crate) use pipeline::decrypt_ciphertext_stream;
