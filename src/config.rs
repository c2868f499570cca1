//! Configuration for fpset
//!
//! Centralized configuration with sensible defaults. Every operation has a
//! plain variant that uses `Config::default()` and a `_with` variant that
//! takes an explicit config.

/// Tuning knobs for writing, reading and intersecting set files
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Writer Configuration
    // -------------------------------------------------------------------------
    /// Capacity of the buffered writer (bytes)
    pub write_buffer_size: usize,

    /// fsync the file once the header is finalized
    pub sync_on_finish: bool,

    // -------------------------------------------------------------------------
    // Reader Configuration
    // -------------------------------------------------------------------------
    /// Capacity of the buffered reader (bytes)
    pub read_buffer_size: usize,

    /// Recompute each record's fingerprint and compare it with the stored one
    pub verify_fingerprints: bool,

    /// Largest payload the reader will allocate for (bytes).
    /// A larger length field is treated as corruption.
    pub max_record_len: u64,

    // -------------------------------------------------------------------------
    // Intersection Configuration
    // -------------------------------------------------------------------------
    /// Scan files 2..N on worker threads
    pub parallel_scan: bool,

    /// Max files scanned concurrently when `parallel_scan` is set
    pub scan_threads: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            write_buffer_size: 64 * 1024,
            sync_on_finish: true,
            read_buffer_size: 64 * 1024,
            verify_fingerprints: true,
            max_record_len: u32::MAX as u64,
            parallel_scan: false,
            scan_threads: 4,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the write buffer capacity (in bytes)
    pub fn write_buffer_size(mut self, size: usize) -> Self {
        self.config.write_buffer_size = size.max(1);
        self
    }

    /// Enable or disable fsync after finalizing a written file
    pub fn sync_on_finish(mut self, sync: bool) -> Self {
        self.config.sync_on_finish = sync;
        self
    }

    /// Set the read buffer capacity (in bytes)
    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.config.read_buffer_size = size.max(1);
        self
    }

    /// Enable or disable per-record fingerprint verification on read
    pub fn verify_fingerprints(mut self, verify: bool) -> Self {
        self.config.verify_fingerprints = verify;
        self
    }

    /// Set the largest payload length accepted by the reader
    pub fn max_record_len(mut self, len: u64) -> Self {
        self.config.max_record_len = len;
        self
    }

    /// Enable or disable parallel scanning of files 2..N
    pub fn parallel_scan(mut self, parallel: bool) -> Self {
        self.config.parallel_scan = parallel;
        self
    }

    /// Set the number of concurrent scan threads
    pub fn scan_threads(mut self, count: usize) -> Self {
        self.config.scan_threads = count.max(1);
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
