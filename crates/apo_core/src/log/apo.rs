//! The append-only log.

use crate::config::LogConfig;
use crate::error::{CoreError, CoreResult};
use crate::log::footer::{Footer, FOOTER_COUNT_SIZE, FOOTER_ENTRY_SIZE};
use crate::log::header::{Header, HEADER_SIZE};
use crate::log::iter::RawRecords;
use crate::log::meta::{Meta, MetaData, RawRecord, META_SIZE};
use apo_codec::{from_bytes, to_bytes, Decode, Decoder, Encode};
use apo_storage::{FileBackend, StorageBackend};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// An append-only log of `(Meta, Data)` records.
///
/// ## Layout
///
/// ```text
/// | header (17) | meta (13) | data | meta (13) | data | ... | footer |
/// ```
///
/// Every write overwrites the old footer with the new record, writes a
/// footer one entry longer after it, then rewrites the header. The header is
/// the commit point for readers of the file.
///
/// ## Concurrency
///
/// Writes and `close` hold an exclusive lock for the whole commit. Reads
/// share a read lock, so they never observe a half-written record.
///
/// # Example
///
/// ```rust
/// use apo_core::{ApoLog, LogConfig, Meta, Op};
/// use apo_storage::InMemoryBackend;
///
/// let log = ApoLog::with_backend(Box::new(InMemoryBackend::new()), LogConfig::default()).unwrap();
/// log.write(Meta::new(*b"user", Op::Insert), &1u64).unwrap();
///
/// let records = log.read_all::<u64>().unwrap();
/// assert_eq!(records[0].data, 1);
/// assert_eq!(log.header().unwrap().footer_offset, 38);
/// ```
pub struct ApoLog {
    path: Option<PathBuf>,
    config: LogConfig,
    state: RwLock<Option<LogState>>,
}

/// Summary of a log's on-disk state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogStats {
    /// The current header.
    pub header: Header,
    /// Size of the encoded footer.
    pub footer_size: u64,
    /// Size of the underlying storage.
    pub file_size: u64,
    /// Bytes stored past the end of the footer.
    pub orphaned_bytes: u64,
}

pub(crate) struct LogState {
    backend: Box<dyn StorageBackend>,
    header: Header,
    footer: Footer,
}

impl ApoLog {
    /// Opens the log at `path` with the default configuration, creating it
    /// if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or its header and
    /// footer cannot be read or are inconsistent.
    pub fn open(path: impl AsRef<Path>) -> CoreResult<Self> {
        Self::open_with_config(path, LogConfig::default())
    }

    /// Opens the log at `path`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` / `AlreadyExists` when the config forbids the
    /// file's current state, otherwise as [`ApoLog::open`]. A read-only open
    /// of a missing file is `NotFound`, and of an empty file `InvalidFormat`.
    pub fn open_with_config(path: impl AsRef<Path>, config: LogConfig) -> CoreResult<Self> {
        let path = path.as_ref();
        let exists = path.exists();

        if !exists && (config.read_only || !config.create_if_missing) {
            return Err(CoreError::NotFound {
                path: path.to_path_buf(),
            });
        }
        if exists && config.error_if_exists {
            return Err(CoreError::AlreadyExists {
                path: path.to_path_buf(),
            });
        }

        let backend = if config.read_only {
            FileBackend::open_read_only(path)
        } else if config.create_parent_dirs {
            FileBackend::open_with_create_dirs(path)
        } else {
            FileBackend::open(path)
        }
        .map_err(CoreError::io("open"))?;

        debug!("Opening apo log {:?}", path);
        Self::init(Some(path.to_path_buf()), Box::new(backend), config)
    }

    /// Opens a log over an arbitrary storage backend.
    ///
    /// An empty backend is initialized as a new log.
    ///
    /// # Errors
    ///
    /// As [`ApoLog::open`].
    pub fn with_backend(backend: Box<dyn StorageBackend>, config: LogConfig) -> CoreResult<Self> {
        Self::init(None, backend, config)
    }

    fn init(
        path: Option<PathBuf>,
        backend: Box<dyn StorageBackend>,
        config: LogConfig,
    ) -> CoreResult<Self> {
        let size = backend.size().map_err(CoreError::io("size"))?;
        if size == 0 && config.read_only {
            return Err(CoreError::invalid_format("empty file has no header"));
        }
        let state = if size == 0 {
            let state = LogState::create(backend)?;
            info!("Created apo log {:?}", path.as_deref().unwrap_or(Path::new("<memory>")));
            state
        } else {
            let state = LogState::load(backend)?;
            debug!(
                records = state.header.total_records,
                footer_offset = state.header.footer_offset,
                "Loaded apo log"
            );
            state
        };

        Ok(Self {
            path,
            config,
            state: RwLock::new(Some(state)),
        })
    }

    /// Appends a record and returns its index.
    ///
    /// An unset `meta.at` is replaced with the current time. The record is
    /// durable once this returns when `sync_on_write` is enabled.
    ///
    /// # Errors
    ///
    /// Returns a codec error if `data` cannot be encoded, `LogClosed` after
    /// [`ApoLog::close`], `ReadOnly` for a read-only log, or an I/O error
    /// naming the failed commit step.
    ///
    /// A failed commit leaves the previous records and file end in place.
    /// The exception is a failed `sync` or `flush`: the record is already
    /// committed and keeps its index, only its durability is unknown.
    pub fn write<D: Encode + ?Sized>(&self, mut meta: Meta, data: &D) -> CoreResult<u64> {
        if self.config.read_only {
            return Err(CoreError::ReadOnly);
        }
        meta.stamp();
        let meta_bytes = to_bytes(&meta)?;
        let data_bytes = to_bytes(data)?;

        let mut guard = self.state.write();
        let state = guard.as_mut().ok_or(CoreError::LogClosed)?;
        let index = state.commit(&meta_bytes, &data_bytes)?;

        if self.config.sync_on_write {
            state.backend.sync().map_err(CoreError::io("sync"))?;
        } else {
            state.backend.flush().map_err(CoreError::io("flush"))?;
        }

        debug!(
            index,
            kind = %meta.kind,
            op = %meta.op,
            size = data_bytes.len(),
            "Committed record"
        );
        Ok(index)
    }

    /// Reads every record in append order.
    ///
    /// # Errors
    ///
    /// Returns `RecordRead` naming the first record that could not be read
    /// or decoded.
    pub fn read_all<D: Decode>(&self) -> CoreResult<Vec<MetaData<D>>> {
        let guard = self.state.read();
        let state = guard.as_ref().ok_or(CoreError::LogClosed)?;
        (0..state.header.total_records)
            .map(|index| state.read(index))
            .collect()
    }

    /// Reads the record at `index`.
    ///
    /// # Errors
    ///
    /// Returns `RecordOutOfRange` for an index past the end, otherwise as
    /// [`ApoLog::read_all`].
    pub fn read<D: Decode>(&self, index: u64) -> CoreResult<MetaData<D>> {
        let guard = self.state.read();
        let state = guard.as_ref().ok_or(CoreError::LogClosed)?;
        state.read(index)
    }

    /// Reads the record at `index` without decoding its data.
    ///
    /// # Errors
    ///
    /// As [`ApoLog::read`].
    pub fn read_raw(&self, index: u64) -> CoreResult<RawRecord> {
        let guard = self.state.read();
        let state = guard.as_ref().ok_or(CoreError::LogClosed)?;
        state.read_raw(index)
    }

    /// Returns an iterator over undecoded records from `start`.
    ///
    /// The iterator holds the read lock; writes block until it is dropped.
    ///
    /// # Errors
    ///
    /// Returns `LogClosed` after [`ApoLog::close`].
    pub fn iter_raw(&self, start: u64) -> CoreResult<RawRecords<'_>> {
        let guard = self.state.read();
        if guard.is_none() {
            return Err(CoreError::LogClosed);
        }
        Ok(RawRecords::new(guard, start))
    }

    /// The current header.
    ///
    /// # Errors
    ///
    /// Returns `LogClosed` after [`ApoLog::close`].
    pub fn header(&self) -> CoreResult<Header> {
        self.with_state(|state| Ok(state.header))
    }

    /// A copy of the current footer.
    ///
    /// # Errors
    ///
    /// Returns `LogClosed` after [`ApoLog::close`].
    pub fn footer(&self) -> CoreResult<Footer> {
        self.with_state(|state| Ok(state.footer.clone()))
    }

    /// Number of committed records.
    ///
    /// # Errors
    ///
    /// Returns `LogClosed` after [`ApoLog::close`].
    pub fn len(&self) -> CoreResult<u64> {
        self.with_state(|state| Ok(state.header.total_records))
    }

    /// Returns `true` if no records have been committed.
    ///
    /// # Errors
    ///
    /// Returns `LogClosed` after [`ApoLog::close`].
    pub fn is_empty(&self) -> CoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Header, footer and storage sizes.
    ///
    /// # Errors
    ///
    /// Returns `LogClosed` after [`ApoLog::close`], or an I/O error if the
    /// storage size cannot be read.
    pub fn stats(&self) -> CoreResult<LogStats> {
        self.with_state(|state| {
            let file_size = state.backend.size().map_err(CoreError::io("size"))?;
            Ok(LogStats {
                header: state.header,
                footer_size: state.footer.encoded_len(),
                file_size,
                orphaned_bytes: file_size.saturating_sub(state.end()),
            })
        })
    }

    /// Path of the log file, if file-backed.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The configuration the log was opened with.
    #[must_use]
    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Forces all committed records to durable storage.
    ///
    /// # Errors
    ///
    /// Returns `LogClosed` after [`ApoLog::close`], or an I/O error.
    pub fn sync(&self) -> CoreResult<()> {
        let mut guard = self.state.write();
        let state = guard.as_mut().ok_or(CoreError::LogClosed)?;
        if self.config.read_only {
            return Ok(());
        }
        state.backend.sync().map_err(CoreError::io("sync"))
    }

    /// Syncs and releases the storage.
    ///
    /// Later operations fail with `LogClosed`; closing twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the final sync fails. The storage is released
    /// either way.
    pub fn close(&self) -> CoreResult<()> {
        let Some(mut state) = self.state.write().take() else {
            return Ok(());
        };
        debug!("Closing apo log {:?}", self.path);
        if self.config.read_only {
            return Ok(());
        }
        state.backend.sync().map_err(CoreError::io("sync"))
    }

    /// Returns `true` once [`ApoLog::close`] has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.read().is_none()
    }

    fn with_state<T>(&self, f: impl FnOnce(&LogState) -> CoreResult<T>) -> CoreResult<T> {
        let guard = self.state.read();
        let state = guard.as_ref().ok_or(CoreError::LogClosed)?;
        f(state)
    }
}

impl std::fmt::Debug for ApoLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let guard = self.state.read();
        f.debug_struct("ApoLog")
            .field("path", &self.path)
            .field("header", &guard.as_ref().map(|state| state.header))
            .finish_non_exhaustive()
    }
}

impl LogState {
    fn create(mut backend: Box<dyn StorageBackend>) -> CoreResult<Self> {
        let header = Header::new();
        let footer = Footer::new();

        backend
            .write_at(0, &to_bytes(&header)?)
            .map_err(CoreError::io("write header"))?;
        backend
            .write_at(header.footer_offset, &to_bytes(&footer)?)
            .map_err(CoreError::io("write footer"))?;
        backend.sync().map_err(CoreError::io("sync"))?;

        Ok(Self {
            backend,
            header,
            footer,
        })
    }

    fn load(backend: Box<dyn StorageBackend>) -> CoreResult<Self> {
        let bytes = backend
            .read_at(0, HEADER_SIZE as usize)
            .map_err(CoreError::io("read header"))?;
        let header: Header = from_bytes(&bytes)?;
        header.validate()?;

        let count_bytes = backend
            .read_at(header.footer_offset, FOOTER_COUNT_SIZE as usize)
            .map_err(CoreError::io("read footer"))?;
        let count: u64 = from_bytes(&count_bytes)?;
        if count != header.total_records {
            return Err(CoreError::invalid_format(format!(
                "footer lists {count} records, header says {}",
                header.total_records
            )));
        }

        let entries_len = count
            .checked_mul(FOOTER_ENTRY_SIZE)
            .and_then(|len| usize::try_from(len).ok())
            .ok_or_else(|| CoreError::invalid_format(format!("footer count {count} too large")))?;
        let entries = backend
            .read_at(header.footer_offset + FOOTER_COUNT_SIZE, entries_len)
            .map_err(CoreError::io("read footer"))?;

        let mut footer_bytes = count_bytes;
        footer_bytes.extend_from_slice(&entries);
        let footer: Footer = from_bytes(&footer_bytes)?;
        footer.validate(&header)?;

        let state = Self {
            backend,
            header,
            footer,
        };

        let size = state.backend.size().map_err(CoreError::io("size"))?;
        if size > state.end() {
            debug!(
                orphaned = size - state.end(),
                "Log has bytes past its footer; they will be trimmed on the next write"
            );
        }

        Ok(state)
    }

    /// Offset just past the footer.
    fn end(&self) -> u64 {
        self.header.footer_offset + self.footer.encoded_len()
    }

    /// Writes one record and the new footer and header.
    ///
    /// The record lands on top of the current footer, so a failure at any
    /// step puts the committed footer and header back and cuts the file to
    /// its previous end. In-memory state only advances once the header is
    /// written.
    fn commit(&mut self, meta: &[u8], data: &[u8]) -> CoreResult<u64> {
        let index = self.header.total_records;
        let offset = self.header.footer_offset;

        let mut footer = self.footer.clone();
        footer.push(offset);
        let header = Header {
            total_records: index + 1,
            footer_offset: offset + META_SIZE + data.len() as u64,
            ..self.header
        };

        if let Err(err) = self.write_record(meta, data, &header, &footer) {
            self.roll_back();
            return Err(err);
        }

        self.header = header;
        self.footer = footer;
        Ok(index)
    }

    fn write_record(
        &mut self,
        meta: &[u8],
        data: &[u8],
        header: &Header,
        footer: &Footer,
    ) -> CoreResult<()> {
        let offset = self.header.footer_offset;
        let header_bytes = to_bytes(header)?;
        let footer_bytes = to_bytes(footer)?;

        self.backend
            .write_at(offset, meta)
            .map_err(CoreError::io("write meta"))?;
        self.backend
            .write_at(offset + META_SIZE, data)
            .map_err(CoreError::io("write data"))?;
        self.backend
            .write_at(header.footer_offset, &footer_bytes)
            .map_err(CoreError::io("write footer"))?;

        let end = header.footer_offset + footer_bytes.len() as u64;
        let size = self.backend.size().map_err(CoreError::io("size"))?;
        if size > end {
            warn!(orphaned = size - end, "Trimming bytes past the footer");
            self.backend
                .truncate(end)
                .map_err(CoreError::io("trim tail"))?;
        }

        self.backend
            .write_at(0, &header_bytes)
            .map_err(CoreError::io("write header"))
    }

    /// Restores the committed footer and header after a failed write.
    fn roll_back(&mut self) {
        match self.restore() {
            Ok(()) => debug!(
                records = self.header.total_records,
                "Rolled back failed write"
            ),
            Err(err) => warn!(
                error = %err,
                "Could not roll back failed write; the file may not reopen"
            ),
        }
    }

    fn restore(&mut self) -> CoreResult<()> {
        self.backend
            .write_at(self.header.footer_offset, &to_bytes(&self.footer)?)
            .map_err(CoreError::io("write footer"))?;
        self.backend
            .write_at(0, &to_bytes(&self.header)?)
            .map_err(CoreError::io("write header"))?;

        let end = self.end();
        let size = self.backend.size().map_err(CoreError::io("size"))?;
        if size > end {
            self.backend
                .truncate(end)
                .map_err(CoreError::io("trim tail"))?;
        }
        Ok(())
    }

    pub(crate) fn total_records(&self) -> u64 {
        self.header.total_records
    }

    pub(crate) fn read<D: Decode>(&self, index: u64) -> CoreResult<MetaData<D>> {
        let raw = self.read_raw(index)?;
        let data = from_bytes(&raw.data)
            .map_err(|err| CoreError::record_read(index, err.into()))?;
        Ok(MetaData {
            meta: raw.meta,
            data,
        })
    }

    pub(crate) fn read_raw(&self, index: u64) -> CoreResult<RawRecord> {
        let total = self.header.total_records;
        let offset = self
            .footer
            .get(index)
            .ok_or(CoreError::RecordOutOfRange { index, total })?;
        let end = self.footer.get(index + 1).unwrap_or(self.header.footer_offset);

        self.load_record(index, offset, end)
            .map_err(|err| CoreError::record_read(index, err))
    }

    fn load_record(&self, index: u64, offset: u64, end: u64) -> CoreResult<RawRecord> {
        let len = end
            .checked_sub(offset)
            .and_then(|len| usize::try_from(len).ok())
            .ok_or_else(|| CoreError::invalid_format(format!("record spans {offset}..{end}")))?;
        let bytes = self
            .backend
            .read_at(offset, len)
            .map_err(CoreError::io("read record"))?;

        let mut decoder = Decoder::new(&bytes);
        let meta: Meta = decoder.decode()?;
        let data = decoder.remaining().to_vec();

        Ok(RawRecord {
            index,
            offset,
            meta,
            data,
        })
    }
}
