//! # Constants
//!
//! Fixed values of the sealed container format. Decoding never reads these
//! directly: they seed [`ContainerLayout::STANDARD`](crate::layout::ContainerLayout::STANDARD)
//! and [`CipherTable::STANDARD`](crate::cipher::CipherTable::STANDARD), which is
//! what the codec consults.

/// Size of the fixed header region at the start of every container.
pub const HEADER_SIZE: usize = 1024;

/// Size of the fixed footer region at the end of every container.
pub const FOOTER_SIZE: usize = 1024;

/// Offset of the SHA-256 of the original plaintext inside the header.
pub const HEADER_SOURCE_SHA256_OFFSET: usize = 88;

/// Offset of the little-endian `u32` cipher identifier inside the header.
pub const HEADER_CIPHER_ID_OFFSET: usize = 212;

/// Offset of the MD5 of the ciphertext body inside the footer.
pub const FOOTER_BODY_MD5_OFFSET: usize = 132;

/// Offset of the SHA-256 of the ciphertext body inside the footer.
pub const FOOTER_BODY_SHA256_OFFSET: usize = 148;

/// Length of an MD5 digest.
pub const MD5_LEN: usize = 16;

/// Length of a SHA-256 digest.
pub const SHA256_LEN: usize = 32;

/// AES block size. Every cipher in the table is AES in CBC mode.
pub const BLOCK_SIZE: usize = 16;

/// Format-fixed initialization vector (`"1234567887654321"` in ASCII).
pub const FIXED_IV: [u8; 16] = *b"1234567887654321";

/// Cipher identifier for AES-128-CBC.
pub const CIPHER_ID_AES_128_CBC: u32 = 0x65;

/// Cipher identifier for AES-192-CBC.
pub const CIPHER_ID_AES_192_CBC: u32 = 0x79;

/// Cipher identifier for AES-256-CBC.
pub const CIPHER_ID_AES_256_CBC: u32 = 0x8d;

/// Read/write chunk used by every streaming stage.
pub const STREAM_CHUNK_SIZE: usize = 64 * 1024;

/// Default number of decode jobs allowed in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Upper bound accepted by [`BatchConfig::validate`](crate::config::BatchConfig::validate).
pub const MAX_CONCURRENCY: usize = 64;

/// Timestamps earlier than 2000-01-01T00:00:00Z are treated as garbage.
pub const MIN_PLAUSIBLE_TIMESTAMP: i64 = 946_684_800;
