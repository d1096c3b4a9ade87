//! src/encryptor/stream.rs
//! PKCS#7 AES-CBC streaming encryption

use crate::aliases::{Block16, Iv16};
use crate::cipher::AesCipher;
use crate::utils::xor_blocks;
use aes::Block as AesBlock;
use std::io::{self, Read, Write};

/// Encrypt everything `source` yields into `destination`.
///
/// Always emits at least one block: a plaintext that is a whole number of
/// blocks gets a full block of padding. Returns ciphertext bytes written.
pub(crate) fn encrypt_stream<R, W>(
    mut source: R,
    mut destination: W,
    iv: &Iv16,
    cipher: &AesCipher,
) -> io::Result<u64>
where
    R: Read,
    W: Write,
{
    // previous ciphertext block
    let mut prev_block: [u8; 16] = *iv.expose_secret();
    let mut plaintext_block = Block16::new([0u8; 16]);
    let mut written = 0u64;

    loop {
        let n = read_block(&mut source, plaintext_block.expose_secret_mut())?;

        let is_final = n < 16;
        if is_final {
            let pad = (16 - n) as u8;
            plaintext_block.expose_secret_mut()[n..].fill(pad);
        }

        let mut xor_output = Block16::new([0u8; 16]);
        xor_blocks(
            plaintext_block.expose_secret(),
            &prev_block,
            xor_output.expose_secret_mut(),
        );

        let mut aes_block = AesBlock::from(*xor_output.expose_secret());
        cipher.encrypt_block(&mut aes_block);
        prev_block.copy_from_slice(aes_block.as_slice());

        destination.write_all(&prev_block)?;
        written += 16;

        if is_final {
            break;
        }
    }

    Ok(written)
}

/// Read up to one block, retrying short reads until the block is full or EOF.
fn read_block<R: Read>(source: &mut R, block: &mut [u8; 16]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < block.len() {
        match source.read(&mut block[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
