//! # Integrity Verification
//!
//! Streaming digests over a byte range of a source, plus a pass-through
//! writer stage that hashes exactly what it forwards.
//!
//! Both digests are always computed and both must match; a mismatch in either
//! is reported as one failure.

use crate::consts::STREAM_CHUNK_SIZE;
use crate::error::DecodeError;
use crate::utils::hex_eq_ignore_case;
use md5::Md5;
use sha2::{Digest, Sha256};
use std::io::{self, Read, Seek, SeekFrom, Write};

/// Fast and strong digests of one byte range, as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeDigests {
    pub md5: String,
    pub sha256: String,
}

/// Hash bytes `start..=end_inclusive` of `source` in fixed-size chunks.
///
/// An `end_inclusive` below `start` denotes an empty range. Memory use is one
/// chunk regardless of range length. An `end_inclusive` of `u64::MAX` is
/// rejected with [`io::ErrorKind::InvalidInput`].
pub fn digest_range<R>(source: &mut R, start: u64, end_inclusive: u64) -> io::Result<RangeDigests>
where
    R: Read + Seek,
{
    let Some(end_exclusive) = end_inclusive.checked_add(1) else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("range end {end_inclusive} is past the largest file offset"),
        ));
    };
    let len = end_exclusive.saturating_sub(start);
    source.seek(SeekFrom::Start(start))?;

    let mut md5 = Md5::new();
    let mut sha256 = Sha256::new();
    let mut limited = source.take(len);
    let mut chunk = vec![0u8; STREAM_CHUNK_SIZE];
    let mut seen = 0u64;

    loop {
        let n = limited.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        md5.update(&chunk[..n]);
        sha256.update(&chunk[..n]);
        seen += n as u64;
    }

    if seen != len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("range {start}..={end_inclusive} ended after {seen} of {len} bytes"),
        ));
    }

    Ok(RangeDigests {
        md5: hex::encode(md5.finalize()),
        sha256: hex::encode(sha256.finalize()),
    })
}

/// Verify bytes `start..=end_inclusive` of `source` against expected hex digests.
///
/// # Errors
///
/// - [`DecodeError::Io`] if the range cannot be read in full
/// - [`DecodeError::PreDecryptIntegrity`] if either digest differs
///   (hex compared case-insensitively)
pub fn verify_range<R>(
    source: &mut R,
    start: u64,
    end_inclusive: u64,
    expected_fast: &str,
    expected_strong: &str,
) -> Result<(), DecodeError>
where
    R: Read + Seek,
{
    let actual = digest_range(source, start, end_inclusive)?;

    let fast_ok = hex_eq_ignore_case(&actual.md5, expected_fast);
    let strong_ok = hex_eq_ignore_case(&actual.sha256, expected_strong);
    if fast_ok && strong_ok {
        return Ok(());
    }

    Err(DecodeError::PreDecryptIntegrity {
        start,
        end: end_inclusive,
        expected_fast: expected_fast.to_ascii_lowercase(),
        actual_fast: actual.md5,
        expected_strong: expected_strong.to_ascii_lowercase(),
        actual_strong: actual.sha256,
    })
}

/// Writer stage that feeds every forwarded byte into a digest.
///
/// Only bytes the inner writer accepted are hashed, so the digest always
/// covers exactly what reached the sink.
pub struct DigestWriter<W, D> {
    inner: W,
    digest: D,
    written: u64,
}

impl<W: Write, D: Digest> DigestWriter<W, D> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            digest: D::new(),
            written: 0,
        }
    }

    /// Consume the stage, returning the inner writer, the digest as lowercase
    /// hex and the byte count.
    pub fn finish(self) -> (W, String, u64) {
        (self.inner, hex::encode(self.digest.finalize()), self.written)
    }
}

impl<W: Write, D: Digest> Write for DigestWriter<W, D> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.digest.update(&buf[..n]);
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const EMPTY_MD5: &str = "d41d8cd98f00b204e9800998ecf8427e";
    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
    const ABC_MD5: &str = "900150983cd24fb0d6963f7d28e17f72";
    const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    #[test]
    fn digests_only_the_requested_range() {
        let mut src = Cursor::new(b"xxabcyy".to_vec());
        let d = digest_range(&mut src, 2, 4).unwrap();
        assert_eq!(d.md5, ABC_MD5);
        assert_eq!(d.sha256, ABC_SHA256);
    }

    #[test]
    fn empty_range() {
        let mut src = Cursor::new(b"xx".to_vec());
        let d = digest_range(&mut src, 1, 0).unwrap();
        assert_eq!(d.md5, EMPTY_MD5);
        assert_eq!(d.sha256, EMPTY_SHA256);
    }

    #[test]
    fn verify_accepts_uppercase_expectations() {
        let mut src = Cursor::new(b"abc".to_vec());
        verify_range(
            &mut src,
            0,
            2,
            &ABC_MD5.to_uppercase(),
            &ABC_SHA256.to_uppercase(),
        )
        .unwrap();
    }

    #[test]
    fn either_digest_mismatch_fails() {
        let mut src = Cursor::new(b"abc".to_vec());
        let err = verify_range(&mut src, 0, 2, EMPTY_MD5, ABC_SHA256).unwrap_err();
        assert!(matches!(err, DecodeError::PreDecryptIntegrity { .. }));

        let err = verify_range(&mut src, 0, 2, ABC_MD5, EMPTY_SHA256).unwrap_err();
        match err {
            DecodeError::PreDecryptIntegrity {
                actual_strong,
                expected_strong,
                ..
            } => {
                assert_eq!(actual_strong, ABC_SHA256);
                assert_eq!(expected_strong, EMPTY_SHA256);
            }
            e => panic!("unexpected error: {e:?}"),
        }
    }

    #[test]
    fn truncated_source_is_io_error() {
        let mut src = Cursor::new(b"ab".to_vec());
        let err = verify_range(&mut src, 0, 9, ABC_MD5, ABC_SHA256).unwrap_err();
        assert!(matches!(err, DecodeError::Io(_)));
    }

    #[test]
    fn range_ending_at_u64_max_is_invalid_input() {
        let mut src = Cursor::new(b"abc".to_vec());
        let err = verify_range(&mut src, 0, u64::MAX, ABC_MD5, ABC_SHA256).unwrap_err();
        match err {
            DecodeError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::InvalidInput),
            other => panic!("unexpected error: {other:?}"),
        }

        let err = digest_range(&mut src, u64::MAX, u64::MAX).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn digest_writer_hashes_what_it_forwards() {
        let mut stage = DigestWriter::<_, Sha256>::new(Vec::new());
        stage.write_all(b"ab").unwrap();
        stage.write_all(b"c").unwrap();
        let (sink, hex, n) = stage.finish();
        assert_eq!(sink, b"abc");
        assert_eq!(hex, ABC_SHA256);
        assert_eq!(n, 3);
    }
}
