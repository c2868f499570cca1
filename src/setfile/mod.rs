//! Set File Module
//!
//! Durable, order-preserving, duplicate-permitting on-disk record sets.
//!
//! ## File Format
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │ Header (24 bytes)                                             │
//! │   Magic: "FPST" (4) | Version: u16 (2) | Fingerprint: u16 (2) │
//! │   RecordCount: u64 (8) | BodyCRC: u32 (4) | Reserved (4)      │
//! ├───────────────────────────────────────────────────────────────┤
//! │ Body (variable)                                               │
//! │   [Fingerprint: u64][Len: u32][Payload]                       │
//! │   ... repeated for each record, in append order ...           │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! All integers are little-endian. The record count is written as
//! `u64::MAX` when the file is created and only replaced by the real count
//! (together with the body CRC) once every record is on disk, so a write
//! that dies halfway leaves a file every reader rejects.

mod reader;
mod writer;

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{FormatErrorKind, FpsetError, Result};
use crate::fingerprint::FingerprintAlgorithm;

pub use reader::SetReader;
pub use writer::SetWriter;

// =============================================================================
// Shared Constants (used by writer and reader)
// =============================================================================

/// Magic bytes identifying a set file
pub const MAGIC: &[u8; 4] = b"FPST";

/// Current set file format version
pub const FORMAT_VERSION: u16 = 1;

/// Header size: Magic (4) + Version (2) + Fingerprint (2) + Count (8) + CRC (4) + Reserved (4)
pub const HEADER_SIZE: u64 = 24;

/// Byte offset of the record count inside the header
pub(crate) const COUNT_OFFSET: u64 = 8;

/// Placeholder count written until the file is finalized
pub const UNFINALIZED_COUNT: u64 = u64::MAX;

/// Per-record prefix: Fingerprint (8) + Len (4)
pub(crate) const ENTRY_PREFIX_SIZE: usize = 12;

/// A single stored element: an opaque byte string
pub type Record = Vec<u8>;

// =============================================================================
// Header
// =============================================================================

/// Decoded set file header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetHeader {
    pub version: u16,
    pub algorithm: FingerprintAlgorithm,
    pub record_count: u64,
    pub body_crc: u32,
}

impl SetHeader {
    /// Header for a freshly created, not yet finalized file
    pub(crate) fn unfinalized() -> Self {
        Self {
            version: FORMAT_VERSION,
            algorithm: FingerprintAlgorithm::CURRENT,
            record_count: UNFINALIZED_COUNT,
            body_crc: 0,
        }
    }

    pub(crate) fn encode(&self) -> [u8; HEADER_SIZE as usize] {
        let mut buf = [0u8; HEADER_SIZE as usize];
        buf[0..4].copy_from_slice(MAGIC);
        buf[4..6].copy_from_slice(&self.version.to_le_bytes());
        buf[6..8].copy_from_slice(&self.algorithm.id().to_le_bytes());
        buf[8..16].copy_from_slice(&self.record_count.to_le_bytes());
        buf[16..20].copy_from_slice(&self.body_crc.to_le_bytes());
        // 20..24 reserved, zero
        buf
    }

    /// Decode and validate a header read from `path`
    pub(crate) fn decode(path: &Path, buf: &[u8; HEADER_SIZE as usize]) -> Result<Self> {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&buf[0..4]);
        if &magic != MAGIC {
            return Err(FpsetError::format(path, FormatErrorKind::BadMagic(magic)));
        }

        let version = u16::from_le_bytes([buf[4], buf[5]]);
        if version != FORMAT_VERSION {
            return Err(FpsetError::format(
                path,
                FormatErrorKind::UnsupportedVersion(version),
            ));
        }

        let algorithm_id = u16::from_le_bytes([buf[6], buf[7]]);
        let algorithm = FingerprintAlgorithm::from_id(algorithm_id).ok_or_else(|| {
            FpsetError::format(path, FormatErrorKind::UnknownFingerprint(algorithm_id))
        })?;

        let mut count = [0u8; 8];
        count.copy_from_slice(&buf[8..16]);
        let record_count = u64::from_le_bytes(count);
        if record_count == UNFINALIZED_COUNT {
            return Err(FpsetError::format(path, FormatErrorKind::Unfinalized));
        }

        let body_crc = u32::from_le_bytes([buf[16], buf[17], buf[18], buf[19]]);

        Ok(Self {
            version,
            algorithm,
            record_count,
            body_crc,
        })
    }
}

// =============================================================================
// Set File Metadata
// =============================================================================

/// Metadata about a finished (or fully verified) set file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetFileSummary {
    /// Path to the set file
    pub path: PathBuf,
    /// Number of records, duplicates counted
    pub record_count: u64,
    /// CRC32 over the body
    pub body_crc: u32,
    /// File size in bytes
    pub file_size: u64,
}

// =============================================================================
// One-shot Operations
// =============================================================================

/// Write `records` to a new set file at `path` using the default config
pub fn write_set<I, R, P>(records: I, path: P) -> Result<u64>
where
    I: IntoIterator<Item = R>,
    R: AsRef<[u8]>,
    P: AsRef<Path>,
{
    write_set_with(records, path, &Config::default())
}

/// Write `records` to a new set file at `path`, returning the record count.
///
/// Duplicates are written as given. If any step fails the header is left
/// unfinalized, so the partial file cannot be mistaken for a valid set.
pub fn write_set_with<I, R, P>(records: I, path: P, config: &Config) -> Result<u64>
where
    I: IntoIterator<Item = R>,
    R: AsRef<[u8]>,
    P: AsRef<Path>,
{
    let mut writer = SetWriter::create(path.as_ref(), config)?;
    writer.append_all(records)?;
    let summary = writer.finish()?;

    tracing::info!(
        "Wrote {} records to {}",
        summary.record_count,
        summary.path.display()
    );
    Ok(summary.record_count)
}

/// Read every record of the set file at `path` using the default config
pub fn read_set<P: AsRef<Path>>(path: P) -> Result<Vec<Record>> {
    read_set_with(path, &Config::default())
}

/// Read every record in stored order, duplicates included.
///
/// The whole file is validated (count, trailing bytes, checksum) before
/// anything is returned.
pub fn read_set_with<P: AsRef<Path>>(path: P, config: &Config) -> Result<Vec<Record>> {
    let reader = SetReader::open(path.as_ref(), config)?;
    // The header count is untrusted until the body validates
    let capacity = usize::try_from(reader.record_count()).unwrap_or(0).min(1024);
    let mut records = Vec::with_capacity(capacity);
    for record in reader {
        records.push(record?);
    }
    Ok(records)
}

/// Validate the set file at `path` without retaining its records
pub fn verify_set<P: AsRef<Path>>(path: P) -> Result<SetFileSummary> {
    verify_set_with(path, &Config::default())
}

pub fn verify_set_with<P: AsRef<Path>>(path: P, config: &Config) -> Result<SetFileSummary> {
    SetReader::open(path.as_ref(), config)?.verify_remaining()
}
