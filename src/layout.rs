//! # Container Layout
//!
//! Byte offsets of every decode-relevant field, kept as data so a corrected
//! layout can be swapped in without touching the codec's control flow.

use crate::consts::{
    FIXED_IV, FOOTER_BODY_MD5_OFFSET, FOOTER_BODY_SHA256_OFFSET, FOOTER_SIZE,
    HEADER_CIPHER_ID_OFFSET, HEADER_SIZE, HEADER_SOURCE_SHA256_OFFSET, MD5_LEN, SHA256_LEN,
};
use crate::error::LayoutError;
use std::ops::Range;

/// Where the codec finds its inputs inside a container.
///
/// `STANDARD` is the only layout observed in real containers so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerLayout {
    pub header_size: usize,
    pub footer_size: usize,
    /// Header: SHA-256 of the original plaintext, checked after decryption.
    pub source_sha256_offset: usize,
    /// Header: little-endian `u32` cipher identifier.
    pub cipher_id_offset: usize,
    /// Footer: MD5 of the ciphertext body, checked before decryption.
    pub body_md5_offset: usize,
    /// Footer: SHA-256 of the ciphertext body, checked before decryption.
    pub body_sha256_offset: usize,
    pub iv: [u8; 16],
}

impl ContainerLayout {
    pub const STANDARD: ContainerLayout = ContainerLayout {
        header_size: HEADER_SIZE,
        footer_size: FOOTER_SIZE,
        source_sha256_offset: HEADER_SOURCE_SHA256_OFFSET,
        cipher_id_offset: HEADER_CIPHER_ID_OFFSET,
        body_md5_offset: FOOTER_BODY_MD5_OFFSET,
        body_sha256_offset: FOOTER_BODY_SHA256_OFFSET,
        iv: FIXED_IV,
    };

    /// Smallest container this layout can describe (empty body).
    #[inline]
    pub fn min_container_len(&self) -> u64 {
        (self.header_size + self.footer_size) as u64
    }

    /// Byte range of the ciphertext body for a container of `size` bytes.
    ///
    /// Callers must have checked `size >= min_container_len()`.
    #[inline]
    pub fn body_range(&self, size: u64) -> Range<u64> {
        self.header_size as u64..size - self.footer_size as u64
    }

    /// Check that every field fits inside its region.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.header_size == 0 {
            return Err(LayoutError::EmptyRegion { region: "header" });
        }
        if self.footer_size == 0 {
            return Err(LayoutError::EmptyRegion { region: "footer" });
        }

        let fields = [
            ("header", self.header_size, "source sha256", self.source_sha256_offset, SHA256_LEN),
            ("header", self.header_size, "cipher id", self.cipher_id_offset, 4),
            ("footer", self.footer_size, "body md5", self.body_md5_offset, MD5_LEN),
            ("footer", self.footer_size, "body sha256", self.body_sha256_offset, SHA256_LEN),
        ];

        for (region, size, field, offset, len) in fields {
            if offset.checked_add(len).is_none_or(|end| end > size) {
                return Err(LayoutError::FieldOutOfBounds {
                    region,
                    field,
                    offset,
                    len,
                    size,
                });
            }
        }
        Ok(())
    }
}

impl Default for ContainerLayout {
    fn default() -> Self {
        Self::STANDARD
    }
}
