//! Set File Reader
//!
//! Validates the header on open, then streams records back in stored order.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{FormatErrorKind, FpsetError, Result};
use crate::fingerprint::Fingerprint;

use super::{Record, SetFileSummary, SetHeader, ENTRY_PREFIX_SIZE, HEADER_SIZE};

/// Sequential reader for a set file
///
/// Every structural check that can be made up front (marker, version,
/// fingerprint algorithm, finalized count) happens in `open()`. Truncation,
/// trailing bytes and checksum mismatches are only visible at the end of
/// the stream and surface from the call that reaches it.
pub struct SetReader {
    path: PathBuf,
    reader: BufReader<File>,
    header: SetHeader,
    /// Records consumed so far
    position: u64,
    /// Running CRC over the body bytes consumed so far
    body_hasher: crc32fast::Hasher,
    verify_fingerprints: bool,
    max_record_len: u64,
    /// Set once the end of the stream has been validated
    finished: bool,
}

impl SetReader {
    /// Open a set file and validate its header
    pub fn open(path: &Path, config: &Config) -> Result<Self> {
        let file = File::open(path).map_err(|e| FpsetError::io(path, e))?;
        // fill_buf() must be able to see trailing bytes, so never capacity 0
        let mut reader = BufReader::with_capacity(config.read_buffer_size.max(1), file);

        let mut buf = [0u8; HEADER_SIZE as usize];
        if let Err(e) = reader.read_exact(&mut buf) {
            return Err(match e.kind() {
                io::ErrorKind::UnexpectedEof => {
                    FpsetError::format(path, FormatErrorKind::ShortHeader)
                }
                _ => FpsetError::io(path, e),
            });
        }

        let header = match SetHeader::decode(path, &buf) {
            Ok(header) => header,
            Err(e) => {
                tracing::warn!("Rejected set file: {}", e);
                return Err(e);
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            reader,
            header,
            position: 0,
            body_hasher: crc32fast::Hasher::new(),
            verify_fingerprints: config.verify_fingerprints,
            max_record_len: config.max_record_len,
            finished: false,
        })
    }

    pub fn header(&self) -> &SetHeader {
        &self.header
    }

    /// Number of records declared by the header
    pub fn record_count(&self) -> u64 {
        self.header.record_count
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the next record into `buf`, replacing its contents.
    ///
    /// Returns the record's fingerprint, or `None` once every declared
    /// record has been read and the end of the file validated.
    pub fn read_next_into(&mut self, buf: &mut Vec<u8>) -> Result<Option<Fingerprint>> {
        if self.finished {
            return Ok(None);
        }
        if self.position == self.header.record_count {
            self.finish_stream()?;
            return Ok(None);
        }

        let mut prefix = [0u8; ENTRY_PREFIX_SIZE];
        self.reader
            .read_exact(&mut prefix)
            .map_err(|e| self.read_error(e))?;

        let mut fp_bytes = [0u8; 8];
        fp_bytes.copy_from_slice(&prefix[0..8]);
        let stored_fp = Fingerprint::from_le_bytes(fp_bytes);
        let len = u32::from_le_bytes([prefix[8], prefix[9], prefix[10], prefix[11]]) as u64;

        if len > self.max_record_len {
            return Err(self.corrupt(FormatErrorKind::RecordTooLong {
                position: self.position,
                len,
                limit: self.max_record_len,
            }));
        }

        // Grow the buffer only as bytes actually arrive, so a corrupt
        // length cannot force a huge allocation.
        buf.clear();
        let result = (&mut self.reader).take(len).read_to_end(buf);
        let read = result.map_err(|e| self.read_error(e))?;
        if (read as u64) < len {
            return Err(self.truncated());
        }

        if self.verify_fingerprints && self.header.algorithm.hash(buf) != stored_fp {
            return Err(self.corrupt(FormatErrorKind::FingerprintMismatch {
                position: self.position,
            }));
        }

        self.body_hasher.update(&prefix);
        self.body_hasher.update(buf);
        self.position += 1;

        Ok(Some(stored_fp))
    }

    /// Read the next record together with its fingerprint
    pub fn next_entry(&mut self) -> Result<Option<(Fingerprint, Record)>> {
        let mut buf = Vec::new();
        Ok(self.read_next_into(&mut buf)?.map(|fp| (fp, buf)))
    }

    /// Consume the rest of the file, validating it without keeping records
    pub fn verify_remaining(mut self) -> Result<SetFileSummary> {
        let mut buf = Vec::new();
        while self.read_next_into(&mut buf)?.is_some() {}

        let file_size = self
            .reader
            .get_ref()
            .metadata()
            .map_err(|e| FpsetError::io(&self.path, e))?
            .len();

        Ok(SetFileSummary {
            path: self.path,
            record_count: self.header.record_count,
            body_crc: self.header.body_crc,
            file_size,
        })
    }

    /// All declared records are consumed: check for trailing bytes and the checksum
    fn finish_stream(&mut self) -> Result<()> {
        let trailing = !self
            .reader
            .fill_buf()
            .map_err(|e| FpsetError::io(&self.path, e))?
            .is_empty();
        if trailing {
            return Err(self.corrupt(FormatErrorKind::TrailingData {
                expected: self.header.record_count,
            }));
        }

        let actual = self.body_hasher.clone().finalize();
        if actual != self.header.body_crc {
            return Err(self.corrupt(FormatErrorKind::ChecksumMismatch {
                expected: self.header.body_crc,
                actual,
            }));
        }

        self.finished = true;
        Ok(())
    }

    fn read_error(&self, e: io::Error) -> FpsetError {
        match e.kind() {
            io::ErrorKind::UnexpectedEof => self.truncated(),
            _ => FpsetError::io(&self.path, e),
        }
    }

    fn truncated(&self) -> FpsetError {
        self.corrupt(FormatErrorKind::Truncated {
            expected: self.header.record_count,
            found: self.position,
        })
    }

    fn corrupt(&self, kind: FormatErrorKind) -> FpsetError {
        tracing::warn!(
            "Set file {} is corrupt at record {}: {}",
            self.path.display(),
            self.position,
            kind
        );
        FpsetError::format(&self.path, kind)
    }
}

impl Iterator for SetReader {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_entry() {
            Ok(Some((_, record))) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => {
                // yield the error once, then stop
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}
