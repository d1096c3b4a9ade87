//! # Header / Footer Parsing
//!
//! Reads the two fixed-size regions of a container and exposes the fields the
//! codec needs. These buffers are the only whole regions ever held in memory;
//! the body is always streamed.

use crate::consts::{MD5_LEN, SHA256_LEN};
use crate::layout::ContainerLayout;
use std::io::{self, Read, Seek, SeekFrom};

/// Raw header and footer bytes of one container.
#[derive(Debug, Clone)]
pub struct ContainerRegions {
    pub header: Vec<u8>,
    pub footer: Vec<u8>,
    /// Total container length in bytes.
    pub size: u64,
}

/// Read the header (first `header_size` bytes) and footer (last `footer_size`
/// bytes) of a container of `size` bytes.
///
/// The caller is responsible for checking `size >= layout.min_container_len()`
/// and for validating the layout; this function only performs I/O.
pub fn read_regions<R>(
    reader: &mut R,
    layout: &ContainerLayout,
    size: u64,
) -> io::Result<ContainerRegions>
where
    R: Read + Seek,
{
    let mut header = vec![0u8; layout.header_size];
    reader.seek(SeekFrom::Start(0))?;
    reader.read_exact(&mut header)?;

    let mut footer = vec![0u8; layout.footer_size];
    reader.seek(SeekFrom::Start(size - layout.footer_size as u64))?;
    reader.read_exact(&mut footer)?;

    Ok(ContainerRegions {
        header,
        footer,
        size,
    })
}

impl ContainerRegions {
    /// Cipher identifier (little-endian `u32`) from the header.
    #[inline]
    pub fn cipher_id(&self, layout: &ContainerLayout) -> u32 {
        read_u32_le(&self.header, layout.cipher_id_offset)
    }

    /// Expected SHA-256 of the decrypted plaintext.
    #[inline]
    pub fn source_sha256<'a>(&'a self, layout: &ContainerLayout) -> &'a [u8] {
        &self.header[layout.source_sha256_offset..layout.source_sha256_offset + SHA256_LEN]
    }

    /// Expected MD5 of the ciphertext body.
    #[inline]
    pub fn body_md5<'a>(&'a self, layout: &ContainerLayout) -> &'a [u8] {
        &self.footer[layout.body_md5_offset..layout.body_md5_offset + MD5_LEN]
    }

    /// Expected SHA-256 of the ciphertext body.
    #[inline]
    pub fn body_sha256<'a>(&'a self, layout: &ContainerLayout) -> &'a [u8] {
        &self.footer[layout.body_sha256_offset..layout.body_sha256_offset + SHA256_LEN]
    }
}

/// Little-endian `u32` at `offset`. Panics if out of bounds (layout is validated first).
#[inline]
pub(crate) fn read_u32_le(buf: &[u8], offset: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&buf[offset..offset + 4]);
    u32::from_le_bytes(bytes)
}

/// Little-endian `i64` at `offset`. Panics if out of bounds.
#[inline]
pub(crate) fn read_i64_le(buf: &[u8], offset: usize) -> i64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&buf[offset..offset + 8]);
    i64::from_le_bytes(bytes)
}
