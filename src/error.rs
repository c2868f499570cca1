//! Error types for fpset
//!
//! Provides a unified error type for all operations. Every variant that
//! concerns a file carries its path so callers can report exactly which
//! input failed when several files are in play.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias using FpsetError
pub type Result<T> = std::result::Result<T, FpsetError>;

/// Unified error type for fpset operations
#[derive(Debug, Error)]
pub enum FpsetError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("set file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    // -------------------------------------------------------------------------
    // Format Errors
    // -------------------------------------------------------------------------
    #[error("invalid set file {}: {kind}", .path.display())]
    Format { path: PathBuf, kind: FormatErrorKind },

    #[error("record of {len} bytes is too large for set file {}", .path.display())]
    RecordTooLarge { path: PathBuf, len: usize },

    // -------------------------------------------------------------------------
    // Request Errors
    // -------------------------------------------------------------------------
    #[error("intersection requested with no input files")]
    EmptyInput,

    #[error("{} input files failed: {}", .0.len(), join_messages(.0))]
    Multiple(Vec<FpsetError>),

    // -------------------------------------------------------------------------
    // Typed Layer Errors
    // -------------------------------------------------------------------------
    #[error("codec error on {}: {message}", .path.display())]
    Codec { path: PathBuf, message: String },
}

/// What exactly was wrong with a set file's structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatErrorKind {
    /// File is shorter than a header
    ShortHeader,

    /// File does not start with the set file marker
    BadMagic([u8; 4]),

    /// Format version this build cannot read
    UnsupportedVersion(u16),

    /// Fingerprint algorithm this build does not implement
    UnknownFingerprint(u16),

    /// Header still carries the placeholder count: the write never completed
    Unfinalized,

    /// Stream ended before the declared number of records
    Truncated { expected: u64, found: u64 },

    /// Bytes remain after the declared number of records
    TrailingData { expected: u64 },

    /// Body checksum does not match the header
    ChecksumMismatch { expected: u32, actual: u32 },

    /// Stored fingerprint disagrees with the payload it precedes
    FingerprintMismatch { position: u64 },

    /// Record length exceeds the configured limit
    RecordTooLong { position: u64, len: u64, limit: u64 },
}

impl fmt::Display for FormatErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShortHeader => write!(f, "file too small for a set file header"),
            Self::BadMagic(found) => write!(f, "bad marker {:?}", found),
            Self::UnsupportedVersion(v) => write!(f, "unsupported format version {}", v),
            Self::UnknownFingerprint(id) => write!(f, "unknown fingerprint algorithm {}", id),
            Self::Unfinalized => write!(f, "header was never finalized (incomplete write)"),
            Self::Truncated { expected, found } => write!(
                f,
                "truncated: header declares {} records, found {}",
                expected, found
            ),
            Self::TrailingData { expected } => {
                write!(f, "unexpected data after {} declared records", expected)
            }
            Self::ChecksumMismatch { expected, actual } => write!(
                f,
                "body checksum mismatch: expected {:#010x}, got {:#010x}",
                expected, actual
            ),
            Self::FingerprintMismatch { position } => {
                write!(f, "fingerprint mismatch at record {}", position)
            }
            Self::RecordTooLong {
                position,
                len,
                limit,
            } => write!(
                f,
                "record {} is {} bytes, above the {} byte limit",
                position, len, limit
            ),
        }
    }
}

impl FpsetError {
    /// Wrap an I/O error for `path`, splitting out "not found"
    pub fn io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            FpsetError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            FpsetError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    pub fn format(path: &Path, kind: FormatErrorKind) -> Self {
        FpsetError::Format {
            path: path.to_path_buf(),
            kind,
        }
    }

    /// Collapse a list of per-path failures into one error
    pub(crate) fn from_failures(mut failures: Vec<FpsetError>) -> Self {
        if failures.len() == 1 {
            failures.remove(0)
        } else {
            FpsetError::Multiple(failures)
        }
    }

    /// All paths this error refers to, in the order they were reported
    pub fn paths(&self) -> Vec<&Path> {
        match self {
            FpsetError::NotFound { path }
            | FpsetError::Io { path, .. }
            | FpsetError::Format { path, .. }
            | FpsetError::RecordTooLarge { path, .. }
            | FpsetError::Codec { path, .. } => vec![path.as_path()],
            FpsetError::EmptyInput => Vec::new(),
            FpsetError::Multiple(errors) => errors.iter().flat_map(|e| e.paths()).collect(),
        }
    }

    /// True when the file exists but its contents cannot be trusted
    pub fn is_corrupt(&self) -> bool {
        matches!(self, FpsetError::Format { .. })
    }
}

fn join_messages(errors: &[FpsetError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
