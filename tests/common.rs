//! tests/common.rs
//! Fixture builders shared across test files

#![allow(dead_code)] // each test binary uses a different subset

use md5::Md5;
use sealed_container::aliases::Credential;
use sealed_container::consts::{CIPHER_ID_AES_128_CBC, CIPHER_ID_AES_192_CBC, CIPHER_ID_AES_256_CBC};
use sealed_container::{encode_container, CipherTable, ContainerLayout};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

pub const KEY_128: &[u8] = b"0123456789abcdef";
pub const KEY_192: &[u8] = b"0123456789abcdef01234567";
pub const KEY_256: &[u8] = b"0123456789abcdef0123456789abcdef";

/// Every supported cipher id with a key of the right length.
pub const ALL_CIPHERS: &[(u32, &[u8])] = &[
    (CIPHER_ID_AES_128_CBC, KEY_128),
    (CIPHER_ID_AES_192_CBC, KEY_192),
    (CIPHER_ID_AES_256_CBC, KEY_256),
];

pub fn credential(key: &[u8]) -> Credential {
    Credential::new(key.to_vec())
}

/// Deterministic non-repeating-ish plaintext.
pub fn sample_plaintext(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 + i / 251) as u8).collect()
}

/// Seal `plain` with the standard layout.
pub fn seal(plain: &[u8], cipher_id: u32, key: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    encode_container(
        plain,
        &mut out,
        cipher_id,
        &credential(key),
        &ContainerLayout::STANDARD,
        &CipherTable::STANDARD,
    )
    .unwrap();
    out
}

/// Seal `plain` and write it to `dir/name`.
pub fn write_container(
    dir: &Path,
    name: &str,
    plain: &[u8],
    cipher_id: u32,
    key: &[u8],
) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, seal(plain, cipher_id, key)).unwrap();
    path
}

/// Assemble a container around an arbitrary body, with footer digests that
/// match it.
pub fn raw_container(body: &[u8], cipher_id: u32, plain_sha256: &[u8; 32]) -> Vec<u8> {
    let layout = ContainerLayout::STANDARD;

    let mut header = vec![0u8; layout.header_size];
    header[layout.source_sha256_offset..layout.source_sha256_offset + 32]
        .copy_from_slice(plain_sha256);
    header[layout.cipher_id_offset..layout.cipher_id_offset + 4]
        .copy_from_slice(&cipher_id.to_le_bytes());

    let mut footer = vec![0u8; layout.footer_size];
    footer[layout.body_md5_offset..layout.body_md5_offset + 16]
        .copy_from_slice(&Md5::digest(body));
    footer[layout.body_sha256_offset..layout.body_sha256_offset + 32]
        .copy_from_slice(&Sha256::digest(body));

    [header, body.to_vec(), footer].concat()
}

/// Recompute the footer digests after the body was edited in place.
pub fn refresh_footer(container: &mut [u8]) {
    let layout = ContainerLayout::STANDARD;
    let body_end = container.len() - layout.footer_size;
    let md5 = Md5::digest(&container[layout.header_size..body_end]);
    let sha = Sha256::digest(&container[layout.header_size..body_end]);
    let footer = &mut container[body_end..];
    footer[layout.body_md5_offset..layout.body_md5_offset + 16].copy_from_slice(&md5);
    footer[layout.body_sha256_offset..layout.body_sha256_offset + 32].copy_from_slice(&sha);
}
