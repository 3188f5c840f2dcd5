//! Streaming iteration over undecoded records.

use crate::error::CoreResult;
use crate::log::apo::LogState;
use crate::log::meta::RawRecord;
use parking_lot::RwLockReadGuard;

/// An iterator over records, one storage read per record.
///
/// Holds the log's read lock for its whole lifetime, so the records it yields
/// all come from the same committed state. Iteration ends at the last record
/// or, after yielding one, at the first error.
pub struct RawRecords<'a> {
    guard: RwLockReadGuard<'a, Option<LogState>>,
    next: u64,
    failed: bool,
}

impl<'a> RawRecords<'a> {
    pub(crate) fn new(guard: RwLockReadGuard<'a, Option<LogState>>, start: u64) -> Self {
        Self {
            guard,
            next: start,
            failed: false,
        }
    }
}

impl Iterator for RawRecords<'_> {
    type Item = CoreResult<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let state = self.guard.as_ref()?;
        if self.next >= state.total_records() {
            return None;
        }

        let result = state.read_raw(self.next);
        self.next += 1;
        self.failed = result.is_err();
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .guard
            .as_ref()
            .map_or(0, |state| state.total_records().saturating_sub(self.next));
        let remaining = usize::try_from(remaining).unwrap_or(usize::MAX);
        (0, Some(remaining))
    }
}
