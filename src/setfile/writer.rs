//! Set File Writer
//!
//! Streams records to a new set file, fingerprinting each one on the fly.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{FpsetError, Result};
use crate::fingerprint::fingerprint;

use super::{SetFileSummary, SetHeader, COUNT_OFFSET, HEADER_SIZE};

/// Writer for a single set file
///
/// Records are appended in call order; duplicates are kept. Nothing is
/// buffered beyond the `BufWriter`, so memory use does not grow with the
/// number of records. The file only becomes readable after `finish()`.
pub struct SetWriter {
    /// Output file path
    path: PathBuf,
    /// Buffered writer for performance
    writer: BufWriter<File>,
    /// Number of records written
    record_count: u64,
    /// Running CRC hasher for the body
    body_hasher: crc32fast::Hasher,
    /// fsync after finalizing
    sync_on_finish: bool,
}

impl SetWriter {
    /// Create (or truncate) the file at `path` and write an unfinalized header
    pub fn create(path: &Path, config: &Config) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .map_err(|e| FpsetError::io(path, e))?;

        let mut writer = BufWriter::with_capacity(config.write_buffer_size, file);
        writer
            .write_all(&SetHeader::unfinalized().encode())
            .map_err(|e| FpsetError::io(path, e))?;

        tracing::debug!("Created set file {}", path.display());

        Ok(Self {
            path: path.to_path_buf(),
            writer,
            record_count: 0,
            body_hasher: crc32fast::Hasher::new(),
            sync_on_finish: config.sync_on_finish,
        })
    }

    /// Append one record: [fingerprint(8)][len(4)][payload]
    pub fn append(&mut self, record: &[u8]) -> Result<()> {
        let len = u32::try_from(record.len()).map_err(|_| FpsetError::RecordTooLarge {
            path: self.path.clone(),
            len: record.len(),
        })?;

        let fp_bytes = fingerprint(record).to_le_bytes();
        let len_bytes = len.to_le_bytes();

        self.write_raw(&fp_bytes)?;
        self.write_raw(&len_bytes)?;
        self.write_raw(record)?;

        self.body_hasher.update(&fp_bytes);
        self.body_hasher.update(&len_bytes);
        self.body_hasher.update(record);

        self.record_count += 1;
        Ok(())
    }

    /// Append every record produced by `records`, in order
    pub fn append_all<I, R>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[u8]>,
    {
        for record in records {
            self.append(record.as_ref())?;
        }
        Ok(())
    }

    /// Number of records appended so far
    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush the body, then seek back and finalize count and checksum
    pub fn finish(mut self) -> Result<SetFileSummary> {
        let path = self.path;
        let io_err = |e: std::io::Error| FpsetError::io(&path, e);

        self.writer.flush().map_err(io_err)?;
        let mut file = self
            .writer
            .into_inner()
            .map_err(|e| FpsetError::io(&path, e.into_error()))?;

        let header = SetHeader {
            record_count: self.record_count,
            body_crc: self.body_hasher.finalize(),
            ..SetHeader::unfinalized()
        };
        let encoded = header.encode();

        file.seek(SeekFrom::Start(COUNT_OFFSET)).map_err(io_err)?;
        file.write_all(&encoded[COUNT_OFFSET as usize..HEADER_SIZE as usize])
            .map_err(io_err)?;
        if self.sync_on_finish {
            file.sync_all().map_err(io_err)?;
        }

        let file_size = file.metadata().map_err(io_err)?.len();

        tracing::debug!(
            "Finalized set file {} ({} records, {} bytes)",
            path.display(),
            header.record_count,
            file_size
        );

        Ok(SetFileSummary {
            path,
            record_count: header.record_count,
            body_crc: header.body_crc,
            file_size,
        })
    }

    fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer
            .write_all(bytes)
            .map_err(|e| FpsetError::io(&self.path, e))
    }
}
