//! # Cipher Resolution
//!
//! Maps the header's cipher identifier to an algorithm and key length through
//! a closed table. Unknown identifiers are a hard failure; there is no
//! fallback or guessing.

use crate::consts::{CIPHER_ID_AES_128_CBC, CIPHER_ID_AES_192_CBC, CIPHER_ID_AES_256_CBC};
use crate::error::DecodeError;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes128, Aes192, Aes256, Block as AesBlock};
use std::fmt;

/// Block cipher variants the format can select. All run in CBC mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherAlgorithm {
    Aes128Cbc,
    Aes192Cbc,
    Aes256Cbc,
}

impl CipherAlgorithm {
    /// Key length in bytes required by this algorithm.
    pub const fn key_len(self) -> usize {
        match self {
            CipherAlgorithm::Aes128Cbc => 16,
            CipherAlgorithm::Aes192Cbc => 24,
            CipherAlgorithm::Aes256Cbc => 32,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            CipherAlgorithm::Aes128Cbc => "aes-128-cbc",
            CipherAlgorithm::Aes192Cbc => "aes-192-cbc",
            CipherAlgorithm::Aes256Cbc => "aes-256-cbc",
        }
    }
}

impl fmt::Display for CipherAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a cipher identifier resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CipherSpec {
    pub algorithm: CipherAlgorithm,
    pub key_len: usize,
}

impl CipherSpec {
    pub const fn new(algorithm: CipherAlgorithm) -> Self {
        Self {
            algorithm,
            key_len: algorithm.key_len(),
        }
    }
}

/// One row of a [`CipherTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CipherEntry {
    pub id: u32,
    pub spec: CipherSpec,
}

/// Closed mapping from cipher identifier to [`CipherSpec`].
///
/// Pure data; safe to share between any number of concurrent decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CipherTable {
    entries: &'static [CipherEntry],
}

const STANDARD_ENTRIES: &[CipherEntry] = &[
    CipherEntry {
        id: CIPHER_ID_AES_128_CBC,
        spec: CipherSpec::new(CipherAlgorithm::Aes128Cbc),
    },
    CipherEntry {
        id: CIPHER_ID_AES_192_CBC,
        spec: CipherSpec::new(CipherAlgorithm::Aes192Cbc),
    },
    CipherEntry {
        id: CIPHER_ID_AES_256_CBC,
        spec: CipherSpec::new(CipherAlgorithm::Aes256Cbc),
    },
];

impl CipherTable {
    pub const STANDARD: CipherTable = CipherTable {
        entries: STANDARD_ENTRIES,
    };

    /// Build a table from custom rows.
    pub const fn from_entries(entries: &'static [CipherEntry]) -> Self {
        Self { entries }
    }

    /// Look up `cipher_id`.
    ///
    /// # Errors
    ///
    /// [`DecodeError::UnsupportedCipher`] for any identifier not in the table.
    pub fn resolve(&self, cipher_id: u32) -> Result<CipherSpec, DecodeError> {
        self.entries
            .iter()
            .find(|entry| entry.id == cipher_id)
            .map(|entry| entry.spec)
            .ok_or(DecodeError::UnsupportedCipher(cipher_id))
    }
}

impl Default for CipherTable {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Resolve against [`CipherTable::STANDARD`].
#[inline]
pub fn resolve(cipher_id: u32) -> Result<CipherSpec, DecodeError> {
    CipherTable::STANDARD.resolve(cipher_id)
}

/// An AES key schedule for whichever key size the container selected.
pub(crate) enum AesCipher {
    Aes128(Aes128),
    Aes192(Aes192),
    Aes256(Aes256),
}

impl AesCipher {
    /// Expand `key` for `algorithm`. The key length must already match.
    pub(crate) fn new(algorithm: CipherAlgorithm, key: &[u8]) -> Result<Self, DecodeError> {
        let mismatch = |_| DecodeError::KeyLengthMismatch {
            expected: algorithm.key_len(),
            actual: key.len(),
        };
        Ok(match algorithm {
            CipherAlgorithm::Aes128Cbc => {
                AesCipher::Aes128(Aes128::new_from_slice(key).map_err(mismatch)?)
            }
            CipherAlgorithm::Aes192Cbc => {
                AesCipher::Aes192(Aes192::new_from_slice(key).map_err(mismatch)?)
            }
            CipherAlgorithm::Aes256Cbc => {
                AesCipher::Aes256(Aes256::new_from_slice(key).map_err(mismatch)?)
            }
        })
    }

    #[inline(always)]
    pub(crate) fn decrypt_block(&self, block: &mut AesBlock) {
        match self {
            AesCipher::Aes128(c) => c.decrypt_block(block),
            AesCipher::Aes192(c) => c.decrypt_block(block),
            AesCipher::Aes256(c) => c.decrypt_block(block),
        }
    }

    #[inline(always)]
    pub(crate) fn encrypt_block(&self, block: &mut AesBlock) {
        match self {
            AesCipher::Aes128(c) => c.encrypt_block(block),
            AesCipher::Aes192(c) => c.encrypt_block(block),
            AesCipher::Aes256(c) => c.encrypt_block(block),
        }
    }
}
