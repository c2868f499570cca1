//! # fpset
//!
//! Fast persistent sets: large collections of opaque records stored on disk
//! and intersected without materializing whole inputs in memory.
//! - Streaming writer with a per-record fingerprint
//! - Validating reader (marker, version, count, checksum)
//! - Multi-way intersection bounded by the first file's distinct records
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Typed boundary (serde)                      │
//! │              values  ⇄  opaque byte records                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌──────────────────┐
//!   │  SetWriter  │          │ Intersection     │
//!   │  (append)   │          │ (CandidateIndex) │
//!   └──────┬──────┘          └────────┬─────────┘
//!          │                          │
//!          ▼                          ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  Set files  │ ───────▶ │  SetReader  │
//!   └─────────────┘          └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use fpset::{intersect_sets, write_set};
//!
//! # fn main() -> fpset::Result<()> {
//! write_set(["one", "two", "three"], "a.fps")?;
//! write_set(["three", "four", "five"], "b.fps")?;
//! assert_eq!(intersect_sets(&["a.fps", "b.fps"])?, vec![b"three".to_vec()]);
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod fingerprint;
pub mod setfile;
pub mod intersect;
pub mod typed;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{FormatErrorKind, FpsetError, Result};
pub use config::Config;
pub use fingerprint::{fingerprint, Fingerprint};
pub use setfile::{
    read_set, read_set_with, verify_set, verify_set_with, write_set, write_set_with, Record,
    SetFileSummary, SetReader, SetWriter,
};
pub use intersect::{intersect_sets, intersect_sets_with, read_unique_set, read_unique_set_with};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of fpset
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
