//! src/utils.rs
//! Utility functions used across the library

use crate::consts::MIN_PLAUSIBLE_TIMESTAMP;
use chrono::{DateTime, SecondsFormat, Utc};

/// XORs two 16-byte blocks and writes the result to `output`.
///
/// Used by both CBC directions. Panics if any slice is shorter than 16 bytes;
/// every caller passes exactly one AES block.
#[inline(always)]
pub const fn xor_blocks(block_a: &[u8], block_b: &[u8], output: &mut [u8]) {
    let mut i = 0;
    while i < 16 {
        output[i] = block_a[i] ^ block_b[i];
        i += 1;
    }
}

/// Case-insensitive comparison of two hexadecimal digest strings.
#[inline]
pub fn hex_eq_ignore_case(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Read a NUL-terminated UTF-8 string starting at `offset`, trimmed.
///
/// Runs to the end of `buf` if no NUL is present. Invalid UTF-8 is replaced,
/// not rejected: the value is informational only.
pub fn read_c_string(buf: &[u8], offset: usize) -> String {
    let Some(tail) = buf.get(offset..) else {
        return String::new();
    };
    let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
    String::from_utf8_lossy(&tail[..end]).trim().to_string()
}

/// Render unix seconds as RFC 3339, or flag values that cannot be real.
pub fn format_timestamp(seconds: i64) -> String {
    if seconds < MIN_PLAUSIBLE_TIMESTAMP {
        return format!("invalid/obfuscated timestamp (raw: {seconds})");
    }
    match DateTime::<Utc>::from_timestamp(seconds, 0) {
        Some(dt) => dt.to_rfc3339_opts(SecondsFormat::Secs, true),
        None => format!("invalid timestamp (raw: {seconds})"),
    }
}
