//! Log configuration.

/// Configuration for opening an apo log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Whether to create the log if it doesn't exist.
    pub create_if_missing: bool,

    /// Whether to error if the log already exists.
    pub error_if_exists: bool,

    /// Whether to fsync after every write (safer but slower).
    ///
    /// When disabled, writes are only flushed to the OS.
    pub sync_on_write: bool,

    /// Whether to create missing parent directories.
    pub create_parent_dirs: bool,

    /// Whether to open the file without write access.
    ///
    /// A read-only log is never created or initialized, and rejects writes.
    pub read_only: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            error_if_exists: false,
            sync_on_write: true,
            create_parent_dirs: false,
            read_only: false,
        }
    }
}

impl LogConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to create the log if missing.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets whether to error if the log exists.
    #[must_use]
    pub const fn error_if_exists(mut self, value: bool) -> Self {
        self.error_if_exists = value;
        self
    }

    /// Sets whether to fsync after every write.
    #[must_use]
    pub const fn sync_on_write(mut self, value: bool) -> Self {
        self.sync_on_write = value;
        self
    }

    /// Sets whether to create missing parent directories.
    #[must_use]
    pub const fn create_parent_dirs(mut self, value: bool) -> Self {
        self.create_parent_dirs = value;
        self
    }

    /// Sets whether to open the log read-only.
    #[must_use]
    pub const fn read_only(mut self, value: bool) -> Self {
        self.read_only = value;
        self
    }
}
