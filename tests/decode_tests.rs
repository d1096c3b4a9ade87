//! tests/decode_tests.rs
//! Container decoding against files on disk: success paths, every rejection
//! kind, and what a failed decode leaves behind at the output path.

mod common;
use common::*;

use sealed_container::consts::{CIPHER_ID_AES_128_CBC, CIPHER_ID_AES_256_CBC};
use sealed_container::{decode, ContainerLayout, DecodeError, DecodeErrorKind, Decoder};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Cursor;
use tempfile::tempdir;

fn decode_err_kind(result: Result<u64, DecodeError>) -> DecodeErrorKind {
    result.expect_err("decode should fail").kind()
}

#[test]
fn decodes_every_cipher_and_size() {
    let dir = tempdir().unwrap();
    let sizes = [0usize, 1, 15, 16, 17, 1000, 65_536, 200_003];

    for &(cipher_id, key) in ALL_CIPHERS {
        for &len in &sizes {
            let plain = sample_plaintext(len);
            let name = format!("c{cipher_id:x}_{len}");
            let input = write_container(dir.path(), &format!("{name}.ctr"), &plain, cipher_id, key);
            let output = dir.path().join(format!("{name}.out"));

            let written = decode(&input, &output, &credential(key)).unwrap();

            assert_eq!(written, len as u64, "cipher {cipher_id:#x}, len {len}");
            assert_eq!(fs::read(&output).unwrap(), plain, "cipher {cipher_id:#x}, len {len}");
        }
    }
}

#[test]
fn aes128_container_round_trips_byte_identical() {
    let dir = tempdir().unwrap();
    let plain = b"The quick brown fox jumps over the lazy dog".to_vec();
    let input = write_container(dir.path(), "fox.ctr", &plain, CIPHER_ID_AES_128_CBC, KEY_128);
    let output = dir.path().join("fox.txt");

    assert_eq!(KEY_128.len(), 16);
    decode(&input, &output, &credential(KEY_128)).unwrap();

    let decoded = fs::read(&output).unwrap();
    assert_eq!(decoded, plain);
    assert_eq!(
        Sha256::digest(&decoded).as_slice(),
        &fs::read(&input).unwrap()[88..120]
    );
}

#[test]
fn container_below_minimum_size_is_too_small() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("short.ctr");
    let output = dir.path().join("short.out");
    fs::write(&input, vec![0u8; 2047]).unwrap();

    let err = decode(&input, &output, &credential(KEY_128)).unwrap_err();

    assert!(matches!(err, DecodeError::TooSmall { size: 2047, minimum: 2048 }));
    assert!(!output.exists());
}

#[test]
fn short_key_for_aes128_is_rejected_without_output() {
    let dir = tempdir().unwrap();
    let input = write_container(dir.path(), "a.ctr", b"payload", CIPHER_ID_AES_128_CBC, KEY_128);
    let output = dir.path().join("a.out");

    let err = decode(&input, &output, &credential(&KEY_128[..15])).unwrap_err();

    assert!(matches!(
        err,
        DecodeError::KeyLengthMismatch { expected: 16, actual: 15 }
    ));
    assert!(!output.exists());
}

#[test]
fn tampered_body_fails_before_decryption() {
    let dir = tempdir().unwrap();
    let mut bytes = seal(&sample_plaintext(300), CIPHER_ID_AES_256_CBC, KEY_256);
    bytes[1024 + 5] ^= 0x01;
    let input = dir.path().join("t.ctr");
    let output = dir.path().join("t.out");
    fs::write(&input, &bytes).unwrap();

    let err = decode(&input, &output, &credential(KEY_256)).unwrap_err();

    match err {
        DecodeError::PreDecryptIntegrity { start, end, .. } => {
            assert_eq!(start, 1024);
            assert_eq!(end, bytes.len() as u64 - 1024 - 1);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!output.exists());
}

#[test]
fn tampered_footer_digest_fails_before_decryption() {
    let dir = tempdir().unwrap();
    let mut bytes = seal(b"footer", CIPHER_ID_AES_128_CBC, KEY_128);
    let footer_start = bytes.len() - 1024;
    bytes[footer_start + 148] ^= 0xff; // strong digest only
    let input = dir.path().join("f.ctr");
    let output = dir.path().join("f.out");
    fs::write(&input, &bytes).unwrap();

    assert_eq!(
        decode_err_kind(decode(&input, &output, &credential(KEY_128))),
        DecodeErrorKind::PreDecryptIntegrity
    );
    assert!(!output.exists());
}

#[test]
fn unknown_cipher_id_is_unsupported() {
    let dir = tempdir().unwrap();
    let mut bytes = seal(b"cipher", CIPHER_ID_AES_128_CBC, KEY_128);
    // header is outside the digested body range
    bytes[212..216].copy_from_slice(&0x42u32.to_le_bytes());
    let input = dir.path().join("u.ctr");
    let output = dir.path().join("u.out");
    fs::write(&input, &bytes).unwrap();

    let err = decode(&input, &output, &credential(KEY_128)).unwrap_err();

    assert!(matches!(err, DecodeError::UnsupportedCipher(0x42)));
    assert!(!output.exists());

    // cipher resolution happens before the key length is looked at
    let err = decode(&input, &output, &credential(b"short")).unwrap_err();
    assert!(matches!(err, DecodeError::UnsupportedCipher(0x42)));
}

#[test]
fn tampered_plaintext_digest_publishes_no_output() {
    let dir = tempdir().unwrap();
    let mut bytes = seal(&sample_plaintext(5000), CIPHER_ID_AES_128_CBC, KEY_128);
    bytes[100] ^= 0x80;
    let input = dir.path().join("p.ctr");
    let output = dir.path().join("p.out");
    fs::write(&input, &bytes).unwrap();

    let err = decode(&input, &output, &credential(KEY_128)).unwrap_err();

    assert_eq!(err.kind(), DecodeErrorKind::PostDecryptIntegrity);
    assert!(!output.exists());
}

#[test]
fn wrong_key_of_right_length_never_leaves_output() {
    let dir = tempdir().unwrap();
    let plain = sample_plaintext(777);
    let input = write_container(dir.path(), "w.ctr", &plain, CIPHER_ID_AES_128_CBC, KEY_128);
    let output = dir.path().join("w.out");

    let kind = decode_err_kind(decode(&input, &output, &credential(b"fedcba9876543210")));

    assert!(matches!(
        kind,
        DecodeErrorKind::InvalidPadding | DecodeErrorKind::PostDecryptIntegrity
    ));
    assert!(!output.exists());
}

fn stray_partials(dir: &std::path::Path) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with(".ctr-partial-"))
        .collect()
}

#[test]
fn failed_decode_leaves_existing_output_untouched() {
    let dir = tempdir().unwrap();
    let plain = sample_plaintext(512);
    let input = write_container(dir.path(), "x.ctr", &plain, CIPHER_ID_AES_128_CBC, KEY_128);
    let output = dir.path().join("x.out");
    fs::write(&output, b"result of an earlier run").unwrap();

    decode(&input, &output, &credential(b"fedcba9876543210")).unwrap_err();

    assert_eq!(fs::read(&output).unwrap(), b"result of an earlier run");
    assert!(stray_partials(dir.path()).is_empty());
}

#[test]
fn failed_decode_onto_its_own_input_keeps_input() {
    let dir = tempdir().unwrap();
    let plain = sample_plaintext(300);
    let input = write_container(dir.path(), "self.ctr", &plain, CIPHER_ID_AES_128_CBC, KEY_128);
    let before = fs::read(&input).unwrap();

    decode(&input, &input, &credential(b"fedcba9876543210")).unwrap_err();

    assert_eq!(fs::read(&input).unwrap(), before);
    assert!(stray_partials(dir.path()).is_empty());
}

#[test]
fn successful_decode_replaces_existing_output() {
    let dir = tempdir().unwrap();
    let plain = sample_plaintext(64);
    let input = write_container(dir.path(), "r.ctr", &plain, CIPHER_ID_AES_128_CBC, KEY_128);
    let output = dir.path().join("r.out");
    fs::write(&output, vec![0xaa; 4096]).unwrap();

    decode(&input, &output, &credential(KEY_128)).unwrap();

    assert_eq!(fs::read(&output).unwrap(), plain);
    assert!(stray_partials(dir.path()).is_empty());
}

#[test]
fn unaligned_body_is_rejected_before_output() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("odd.ctr");
    let output = dir.path().join("odd.out");
    fs::write(&input, raw_container(&[7u8; 17], CIPHER_ID_AES_128_CBC, &[0u8; 32])).unwrap();

    let err = decode(&input, &output, &credential(KEY_128)).unwrap_err();

    assert!(matches!(err, DecodeError::UnalignedBody { len: 17 }));
    assert!(!output.exists());
}

#[test]
fn empty_body_fails_padding_and_cleans_up() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("empty.ctr");
    let output = dir.path().join("empty.out");
    let empty_sha: [u8; 32] = Sha256::digest(b"").into();
    fs::write(&input, raw_container(&[], CIPHER_ID_AES_128_CBC, &empty_sha)).unwrap();

    let err = decode(&input, &output, &credential(KEY_128)).unwrap_err();

    assert_eq!(err.kind(), DecodeErrorKind::InvalidPadding);
    assert!(!output.exists());
}

#[test]
fn corrupted_padding_is_invalid_padding() {
    let dir = tempdir().unwrap();
    let mut bytes = seal(&sample_plaintext(40), CIPHER_ID_AES_128_CBC, KEY_128);
    // flipping the second-to-last ciphertext block flips the same bit of the
    // final plaintext block, i.e. its last (padding) byte
    let footer_start = bytes.len() - 1024;
    bytes[footer_start - 17] ^= 0x20;
    refresh_footer(&mut bytes);
    let input = dir.path().join("pad.ctr");
    let output = dir.path().join("pad.out");
    fs::write(&input, &bytes).unwrap();

    let err = decode(&input, &output, &credential(KEY_128)).unwrap_err();

    assert_eq!(err.kind(), DecodeErrorKind::InvalidPadding);
    assert!(!output.exists());
}

#[test]
fn missing_input_is_io_error() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("nothing.out");

    let err = decode(&dir.path().join("nothing.ctr"), &output, &credential(KEY_128)).unwrap_err();

    assert_eq!(err.kind(), DecodeErrorKind::Io);
    assert!(!output.exists());
}

#[test]
fn decode_stream_works_in_memory() {
    let plain = sample_plaintext(4096 + 3);
    let bytes = seal(&plain, CIPHER_ID_AES_256_CBC, KEY_256);

    let mut out = Vec::new();
    let written = Decoder::default()
        .decode_stream(&mut Cursor::new(bytes), &mut out, &credential(KEY_256))
        .unwrap();

    assert_eq!(written, plain.len() as u64);
    assert_eq!(out, plain);
}

#[test]
fn invalid_layout_is_reported() {
    let layout = ContainerLayout {
        cipher_id_offset: 1022,
        ..ContainerLayout::STANDARD
    };
    let decoder = Decoder::new(layout, Default::default());
    let bytes = seal(b"x", CIPHER_ID_AES_128_CBC, KEY_128);

    let err = decoder
        .decode_stream(&mut Cursor::new(bytes), &mut Vec::new(), &credential(KEY_128))
        .unwrap_err();

    assert_eq!(err.kind(), DecodeErrorKind::Layout);
}
