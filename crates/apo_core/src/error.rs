//! Error types for apo core.

use apo_storage::StorageError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in apo log operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A storage step failed.
    #[error("I/O error during {op}: {source}")]
    Io {
        /// The step that failed, e.g. "write footer".
        op: &'static str,
        /// The underlying storage error.
        #[source]
        source: StorageError,
    },

    /// Codec error.
    #[error("codec error: {0}")]
    Codec(#[from] apo_codec::CodecError),

    /// The file is not a valid apo log.
    #[error("invalid log format: {message}")]
    InvalidFormat {
        /// Description of the format issue.
        message: String,
    },

    /// The header carries a version this build cannot read.
    #[error("unsupported log version {found}, expected {expected}")]
    UnsupportedVersion {
        /// Version found in the header.
        found: u8,
        /// Version this build writes.
        expected: u8,
    },

    /// Reading a record failed.
    #[error("failed to read record {index}: {source}")]
    RecordRead {
        /// Index of the failing record.
        index: u64,
        /// What went wrong.
        #[source]
        source: Box<CoreError>,
    },

    /// Record index past the end of the log.
    #[error("record {index} out of range, log holds {total}")]
    RecordOutOfRange {
        /// Requested index.
        index: u64,
        /// Number of records in the log.
        total: u64,
    },

    /// The log file does not exist and creation was disabled.
    #[error("log not found: {}", path.display())]
    NotFound {
        /// Path that was opened.
        path: PathBuf,
    },

    /// The log file exists but the config asked for a fresh one.
    #[error("log already exists: {}", path.display())]
    AlreadyExists {
        /// Path that was opened.
        path: PathBuf,
    },

    /// The log has been closed.
    #[error("log is closed")]
    LogClosed,

    /// The log was opened read-only.
    #[error("log is read-only")]
    ReadOnly,
}

impl CoreError {
    /// Returns a mapper that wraps a storage error with the failing step.
    ///
    /// ```
    /// use apo_core::CoreError;
    /// use apo_storage::{InMemoryBackend, StorageBackend};
    ///
    /// let backend = InMemoryBackend::new();
    /// let err = backend.read_at(0, 17).map_err(CoreError::io("read header")).unwrap_err();
    /// assert!(err.to_string().starts_with("I/O error during read header"));
    /// ```
    pub fn io(op: &'static str) -> impl FnOnce(StorageError) -> Self {
        move |source| Self::Io { op, source }
    }

    /// Creates an invalid format error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Wraps an error with the index of the record being read.
    pub fn record_read(index: u64, source: CoreError) -> Self {
        Self::RecordRead {
            index,
            source: Box::new(source),
        }
    }

    /// Returns the failing step name if this is (or wraps) an I/O error.
    #[must_use]
    pub fn io_op(&self) -> Option<&'static str> {
        match self {
            Self::Io { op, .. } => Some(*op),
            Self::RecordRead { source, .. } => source.io_op(),
            _ => None,
        }
    }
}
