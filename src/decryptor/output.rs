//! src/decryptor/output.rs
//! Plaintext staged next to its destination and published only on commit

use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};
use tracing::debug;

/// A temp file in the destination's directory that replaces the destination
/// only when [`commit`](Self::commit) is called.
///
/// Until then the destination is left as it was. Dropping
/// an uncommitted output (failed decode, unwinding) deletes the temp file.
pub(crate) struct StagedOutput {
    dest: PathBuf,
    writer: BufWriter<NamedTempFile>,
}

impl StagedOutput {
    /// Create the temp file beside `dest`.
    pub(crate) fn create(dest: &Path) -> io::Result<Self> {
        let tmp = Builder::new()
            .prefix(".ctr-partial-")
            .tempfile_in(parent_dir_or_dot(dest))?;
        Ok(Self {
            dest: dest.to_path_buf(),
            writer: BufWriter::new(tmp),
        })
    }

    /// Flush, sync and atomically rename onto the destination.
    pub(crate) fn commit(self) -> io::Result<()> {
        let tmp = self.writer.into_inner().map_err(io::IntoInnerError::into_error)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.dest).map_err(|e| e.error)?;
        debug!(path = %self.dest.display(), "published output");
        Ok(())
    }
}

impl Write for StagedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// `Path::parent` yields `""` for bare file names; treat that as `.`.
fn parent_dir_or_dot(path: &Path) -> &Path {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}
