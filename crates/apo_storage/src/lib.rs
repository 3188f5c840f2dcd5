//! # Apo Storage
//!
//! Storage backend trait and implementations for apo log files.
//!
//! Storage backends are **opaque positional byte stores** - they do not
//! interpret the data they store.
//!
//! ## Design Principles
//!
//! - Backends read and write byte ranges, and flush/sync
//! - No knowledge of the apo header, record or footer layout
//! - Must be `Send + Sync` for concurrent access
//! - The log owns all file format interpretation
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and crash simulation
//! - [`FileBackend`] - For persistent storage using OS file APIs
//!
//! ## Example
//!
//! ```rust
//! use apo_storage::{StorageBackend, InMemoryBackend};
//!
//! let mut backend = InMemoryBackend::new();
//! let offset = backend.append(b"hello world").unwrap();
//! let data = backend.read_at(offset, 11).unwrap();
//! assert_eq!(&data, b"hello world");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
