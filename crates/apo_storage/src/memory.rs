//! In-memory storage backend for testing.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;

/// An in-memory storage backend.
///
/// Suitable for unit tests and for simulating damaged files: build one with
/// [`InMemoryBackend::with_data`] from a truncated or corrupted image.
///
/// # Example
///
/// ```rust
/// use apo_storage::{StorageBackend, InMemoryBackend};
///
/// let mut backend = InMemoryBackend::new();
/// backend.write_at(0, b"test data").unwrap();
/// assert_eq!(backend.size().unwrap(), 9);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    data: RwLock<Vec<u8>>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory backend with pre-existing data.
    #[must_use]
    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            data: RwLock::new(data),
        }
    }

    /// Returns a copy of all data in the backend.
    #[must_use]
    pub fn data(&self) -> Vec<u8> {
        self.data.read().clone()
    }
}

impl StorageBackend for InMemoryBackend {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let data = self.data.read();
        let size = data.len() as u64;
        let end = offset.saturating_add(len as u64);

        if offset > size || end > size {
            return Err(StorageError::ReadPastEnd { offset, len, size });
        }

        Ok(data[offset as usize..end as usize].to_vec())
    }

    fn write_at(&mut self, offset: u64, new_data: &[u8]) -> StorageResult<()> {
        let mut data = self.data.write();
        let size = data.len() as u64;

        if offset > size {
            return Err(StorageError::WritePastEnd { offset, size });
        }

        let start = offset as usize;
        let end = start + new_data.len();
        if end > data.len() {
            data.resize(end, 0);
        }
        data[start..end].copy_from_slice(new_data);
        Ok(())
    }

    fn flush(&mut self) -> StorageResult<()> {
        Ok(())
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(self.data.read().len() as u64)
    }

    fn sync(&mut self) -> StorageResult<()> {
        Ok(())
    }

    fn truncate(&mut self, new_size: u64) -> StorageResult<()> {
        let mut data = self.data.write();
        let size = data.len() as u64;

        if new_size > size {
            return Err(StorageError::TruncateBeyondEnd { new_size, size });
        }

        data.truncate(new_size as usize);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn memory_new_is_empty() {
        let backend = InMemoryBackend::new();
        assert_eq!(backend.size().unwrap(), 0);
        assert!(backend.data().is_empty());
    }

    #[test]
    fn memory_overwrite_and_extend() {
        let mut backend = InMemoryBackend::with_data(b"abcdef".to_vec());
        backend.write_at(4, b"XYZ").unwrap();
        assert_eq!(backend.data(), b"abcdXYZ");
        backend.write_at(0, b"_").unwrap();
        assert_eq!(backend.data(), b"_bcdXYZ");
    }

    #[test]
    fn memory_gap_rejected() {
        let mut backend = InMemoryBackend::new();
        assert!(matches!(
            backend.write_at(1, b"x"),
            Err(StorageError::WritePastEnd { offset: 1, size: 0 })
        ));
    }

    #[test]
    fn memory_read_past_end() {
        let backend = InMemoryBackend::with_data(vec![1, 2, 3]);
        assert!(matches!(
            backend.read_at(2, 2),
            Err(StorageError::ReadPastEnd { offset: 2, len: 2, size: 3 })
        ));
        assert!(backend.read_at(3, 0).unwrap().is_empty());
    }

    #[test]
    fn memory_truncate() {
        let mut backend = InMemoryBackend::with_data(vec![1, 2, 3]);
        backend.truncate(1).unwrap();
        assert_eq!(backend.data(), vec![1]);
        assert!(backend.truncate(2).is_err());
    }

    proptest! {
        #[test]
        fn writes_match_vec_model(ops in prop::collection::vec((0u64..64, prop::collection::vec(any::<u8>(), 0..16)), 1..32)) {
            let mut backend = InMemoryBackend::new();
            let mut model: Vec<u8> = Vec::new();
            for (offset, bytes) in ops {
                let offset = offset.min(model.len() as u64);
                backend.write_at(offset, &bytes).unwrap();
                let start = offset as usize;
                let end = start + bytes.len();
                if end > model.len() {
                    model.resize(end, 0);
                }
                model[start..end].copy_from_slice(&bytes);
            }
            prop_assert_eq!(backend.data(), model);
        }
    }
}
