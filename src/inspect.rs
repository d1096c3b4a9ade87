//! # Container Inspection
//!
//! Read-only view of a container's header and footer metadata. Never
//! decrypts and never needs a credential.

use crate::cipher::CipherTable;
use crate::error::InspectError;
use crate::header::{read_i64_le, read_regions, read_u32_le, ContainerRegions};
use crate::layout::ContainerLayout;
use crate::utils::{format_timestamp, read_c_string};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// Which fixed region a field was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Header,
    Footer,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Region::Header => "header",
            Region::Footer => "footer",
        })
    }
}

/// One labelled metadata value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub region: Region,
    pub field: &'static str,
    pub value: String,
}

/// Everything [`inspect_path`] could read from a container.
#[derive(Debug, Clone)]
pub struct ContainerReport {
    pub size: u64,
    pub rows: Vec<ReportRow>,
}

impl ContainerReport {
    /// Rows belonging to `region`, in layout order.
    pub fn region(&self, region: Region) -> impl Iterator<Item = &ReportRow> {
        self.rows.iter().filter(move |r| r.region == region)
    }

    /// Value of the first row named `field`.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|r| r.field == field)
            .map(|r| r.value.as_str())
    }
}

// Informational header fields outside the decode-relevant ones.
const BEGIN_MARKER: (usize, usize) = (0, 64);
const HEAD_VERSION: usize = 64;
const BODY_VERSION: usize = 68;
const SOURCE_MD5: (usize, usize) = (72, 16);
const CREATE_TIME: usize = 204;
const FILE_METHOD: usize = 208;
const CIPHER_DESCRIPTION: usize = 216;

// Informational footer fields.
const TAIL_VERSION: usize = 0;
const UPDATE_TIME: usize = 264;
const COPYRIGHT: usize = 832;
const END_MARKER: (usize, usize) = (960, 16);

/// Open `path` and report its metadata.
pub fn inspect_path(
    path: &Path,
    layout: &ContainerLayout,
) -> Result<ContainerReport, InspectError> {
    let mut reader = BufReader::new(File::open(path)?);
    inspect(&mut reader, layout)
}

/// Report the metadata of the container `reader` yields.
///
/// Fields the layout's regions are too small to hold are skipped.
pub fn inspect<R>(reader: &mut R, layout: &ContainerLayout) -> Result<ContainerReport, InspectError>
where
    R: Read + Seek,
{
    layout.validate()?;
    let size = reader.seek(SeekFrom::End(0))?;
    let minimum = layout.min_container_len();
    if size < minimum {
        return Err(InspectError::TooSmall { size, minimum });
    }

    let regions = read_regions(reader, layout, size)?;
    Ok(ContainerReport {
        size,
        rows: collect_rows(&regions, layout),
    })
}

fn collect_rows(regions: &ContainerRegions, layout: &ContainerLayout) -> Vec<ReportRow> {
    let header = &regions.header;
    let footer = &regions.footer;
    let mut rows = Vec::new();

    let mut push = |region, field, value: Option<String>| {
        if let Some(value) = value {
            rows.push(ReportRow {
                region,
                field,
                value,
            });
        }
    };

    push(Region::Header, "begin marker", hex_field(header, BEGIN_MARKER));
    push(Region::Header, "head version", u32_field(header, HEAD_VERSION));
    push(Region::Header, "body version", u32_field(header, BODY_VERSION));
    push(Region::Header, "source md5", hex_field(header, SOURCE_MD5));
    push(
        Region::Header,
        "source sha256",
        Some(hex::encode(regions.source_sha256(layout))),
    );
    push(
        Region::Header,
        "create time",
        i64_field(header, CREATE_TIME).map(format_timestamp),
    );
    push(Region::Header, "file method", u32_field(header, FILE_METHOD));

    let cipher_id = regions.cipher_id(layout);
    let cipher = match CipherTable::STANDARD.resolve(cipher_id) {
        Ok(spec) => format!("{cipher_id:#x} ({})", spec.algorithm),
        Err(_) => format!("{cipher_id:#x} (unsupported)"),
    };
    push(Region::Header, "cipher id", Some(cipher));
    push(
        Region::Header,
        "cipher description",
        string_field(header, CIPHER_DESCRIPTION),
    );

    push(Region::Footer, "tail version", u32_field(footer, TAIL_VERSION));
    push(
        Region::Footer,
        "body md5",
        Some(hex::encode(regions.body_md5(layout))),
    );
    push(
        Region::Footer,
        "body sha256",
        Some(hex::encode(regions.body_sha256(layout))),
    );
    push(
        Region::Footer,
        "update time",
        i64_field(footer, UPDATE_TIME).map(format_timestamp),
    );
    push(Region::Footer, "copyright", string_field(footer, COPYRIGHT));
    push(Region::Footer, "end marker", hex_field(footer, END_MARKER));

    rows
}

fn hex_field(buf: &[u8], (offset, len): (usize, usize)) -> Option<String> {
    buf.get(offset..offset + len).map(hex::encode)
}

fn u32_field(buf: &[u8], offset: usize) -> Option<String> {
    (offset + 4 <= buf.len()).then(|| read_u32_le(buf, offset).to_string())
}

fn i64_field(buf: &[u8], offset: usize) -> Option<i64> {
    (offset + 8 <= buf.len()).then(|| read_i64_le(buf, offset))
}

fn string_field(buf: &[u8], offset: usize) -> Option<String> {
    (offset < buf.len()).then(|| read_c_string(buf, offset))
}
