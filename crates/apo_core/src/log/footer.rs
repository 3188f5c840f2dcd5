//! Trailing record index.

use crate::error::{CoreError, CoreResult};
use crate::log::header::{Header, HEADER_SIZE};
use crate::log::meta::META_SIZE;
use apo_codec::{CodecError, CodecResult, Decode, Decoder, Encode, Encoder};

/// Size of the footer's count field.
pub const FOOTER_COUNT_SIZE: u64 = 8;

/// Size of one footer offset entry.
pub const FOOTER_ENTRY_SIZE: u64 = 8;

/// Byte offsets of every record, in append order.
///
/// Encoded as a big-endian `u64` count followed by one `u64` per record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Footer {
    offsets: Vec<u64>,
}

impl Footer {
    /// Creates an empty footer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a footer from record offsets.
    #[must_use]
    pub fn from_offsets(offsets: Vec<u64>) -> Self {
        Self { offsets }
    }

    /// Record offsets in append order.
    #[must_use]
    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }

    /// Number of records indexed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Returns `true` if no records are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Offset of the record at `index`.
    #[must_use]
    pub fn get(&self, index: u64) -> Option<u64> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.offsets.get(i).copied())
    }

    /// Adds the offset of a newly committed record.
    pub fn push(&mut self, offset: u64) {
        self.offsets.push(offset);
    }

    /// Size of this footer once encoded.
    #[must_use]
    pub fn encoded_len(&self) -> u64 {
        FOOTER_COUNT_SIZE + FOOTER_ENTRY_SIZE * self.offsets.len() as u64
    }

    /// Checks this footer against the header it was loaded with.
    ///
    /// Records are contiguous from the end of the header, each at least a
    /// Meta long, and the last one ends at or before the footer.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` describing the first inconsistency.
    pub fn validate(&self, header: &Header) -> CoreResult<()> {
        if self.offsets.len() as u64 != header.total_records {
            return Err(CoreError::invalid_format(format!(
                "footer lists {} records, header says {}",
                self.offsets.len(),
                header.total_records
            )));
        }

        if let Some(&first) = self.offsets.first() {
            if first != HEADER_SIZE {
                return Err(CoreError::invalid_format(format!(
                    "first record at {first}, expected {HEADER_SIZE}"
                )));
            }
        }

        let ends = self
            .offsets
            .iter()
            .skip(1)
            .copied()
            .chain(std::iter::once(header.footer_offset));
        for (index, (&start, end)) in self.offsets.iter().zip(ends).enumerate() {
            if !matches!(start.checked_add(META_SIZE), Some(min) if min <= end) {
                return Err(CoreError::invalid_format(format!(
                    "record {index} at {start} is shorter than its meta (next boundary {end})"
                )));
            }
        }

        Ok(())
    }
}

impl Encode for Footer {
    fn encode(&self, encoder: &mut Encoder) -> CodecResult<()> {
        encoder.put_u64(self.offsets.len() as u64);
        for &offset in &self.offsets {
            encoder.put_u64(offset);
        }
        Ok(())
    }
}

impl Decode for Footer {
    fn decode(decoder: &mut Decoder<'_>) -> CodecResult<Self> {
        let count = decoder.get_u64()?;
        let available = decoder.remaining().len() / FOOTER_ENTRY_SIZE as usize;
        let count = usize::try_from(count)
            .ok()
            .filter(|&count| count <= available)
            .ok_or_else(|| {
                CodecError::unexpected_eof(
                    usize::try_from(count.saturating_mul(FOOTER_ENTRY_SIZE)).unwrap_or(usize::MAX),
                    decoder.remaining().len(),
                )
            })?;

        let mut offsets = Vec::with_capacity(count);
        for _ in 0..count {
            offsets.push(decoder.get_u64()?);
        }
        Ok(Self { offsets })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apo_codec::{from_bytes, to_bytes};

    fn header(total_records: u64, footer_offset: u64) -> Header {
        Header {
            total_records,
            footer_offset,
            ..Header::new()
        }
    }

    #[test]
    fn empty_footer_is_count_only() {
        let bytes = to_bytes(&Footer::new()).unwrap();
        assert_eq!(bytes, vec![0; 8]);
        assert_eq!(Footer::new().encoded_len(), 8);
    }

    #[test]
    fn footer_layout() {
        let footer = Footer::from_offsets(vec![17, 38]);
        let bytes = to_bytes(&footer).unwrap();
        assert_eq!(bytes.len() as u64, footer.encoded_len());
        assert_eq!(&bytes[..8], &2u64.to_be_bytes());
        assert_eq!(&bytes[8..16], &17u64.to_be_bytes());
        assert_eq!(from_bytes::<Footer>(&bytes).unwrap(), footer);
    }

    #[test]
    fn absurd_count_fails_without_allocating() {
        let mut bytes = u64::MAX.to_be_bytes().to_vec();
        bytes.extend_from_slice(&17u64.to_be_bytes());
        assert!(matches!(
            from_bytes::<Footer>(&bytes),
            Err(CodecError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn validate_accepts_consistent_footer() {
        let footer = Footer::from_offsets(vec![17, 38, 51]);
        footer.validate(&header(3, 70)).unwrap();
        Footer::new().validate(&Header::new()).unwrap();
    }

    #[test]
    fn validate_rejects_count_mismatch() {
        let footer = Footer::from_offsets(vec![17]);
        assert!(footer.validate(&header(2, 38)).is_err());
    }

    #[test]
    fn validate_rejects_bad_first_offset() {
        let footer = Footer::from_offsets(vec![20]);
        assert!(footer.validate(&header(1, 40)).is_err());
    }

    #[test]
    fn validate_rejects_overlapping_records() {
        let footer = Footer::from_offsets(vec![17, 25]);
        assert!(footer.validate(&header(2, 60)).is_err());

        let footer = Footer::from_offsets(vec![17, 17]);
        assert!(footer.validate(&header(2, 60)).is_err());
    }

    #[test]
    fn validate_rejects_record_running_into_footer() {
        let footer = Footer::from_offsets(vec![17]);
        assert!(footer.validate(&header(1, 29)).is_err());
        footer.validate(&header(1, 30)).unwrap();
    }
}
