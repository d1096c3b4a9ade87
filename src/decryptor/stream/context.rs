//! src/decryptor/stream/context.rs
//! CBC chaining state for streaming decryption

use crate::aliases::{Block16, Iv16};
use crate::cipher::AesCipher;
use crate::consts::BLOCK_SIZE;
use crate::utils::xor_blocks;
use aes::Block as AesBlock;

/// Running state of one CBC decryption.
///
/// The most recent plaintext block is always held back: it can only be
/// released once another block follows, because the last block of the stream
/// carries the PKCS#7 padding.
pub(crate) struct DecryptionContext {
    pub(crate) chain_block: Iv16,
    pub(crate) plaintext_block: Block16,
    pub(crate) need_write_plaintext: bool,
}

impl DecryptionContext {
    #[inline(always)]
    pub(crate) fn new_with_iv(iv: &Iv16) -> Self {
        Self {
            chain_block: Iv16::new(*iv.expose_secret()),
            plaintext_block: Block16::new([0u8; 16]),
            need_write_plaintext: false,
        }
    }

    /// Decrypt whole blocks of `ciphertext`, appending released plaintext to `out`.
    ///
    /// `ciphertext.len()` must be a multiple of the block size.
    #[inline(always)]
    pub(crate) fn decrypt_blocks(
        &mut self,
        cipher: &AesCipher,
        ciphertext: &[u8],
        out: &mut Vec<u8>,
    ) {
        debug_assert_eq!(ciphertext.len() % BLOCK_SIZE, 0);

        for chunk in ciphertext.chunks_exact(BLOCK_SIZE) {
            if self.need_write_plaintext {
                out.extend_from_slice(self.plaintext_block.expose_secret());
            }

            let mut block_bytes = [0u8; 16];
            block_bytes.copy_from_slice(chunk);
            let mut aes_block = AesBlock::from(block_bytes);
            cipher.decrypt_block(&mut aes_block);

            xor_blocks(
                aes_block.as_slice(),
                self.chain_block.expose_secret(),
                self.plaintext_block.expose_secret_mut(),
            );
            self.need_write_plaintext = true;

            self.chain_block.expose_secret_mut().copy_from_slice(chunk);
        }
    }
}
