//! Fixed header at offset 0.

use crate::error::{CoreError, CoreResult};
use apo_codec::impl_record;

/// Format version written by this build.
pub const FORMAT_VERSION: u8 = 1;

/// Encoded header size: version (1) + total records (8) + footer offset (8).
pub const HEADER_SIZE: u64 = 17;

/// The log header.
///
/// Rewritten in place as the last step of every commit, so it always
/// describes the most recent complete record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Format version.
    pub version: u8,
    /// Number of committed records.
    pub total_records: u64,
    /// Byte offset of the footer.
    pub footer_offset: u64,
}

impl_record!(Header {
    version,
    total_records,
    footer_offset
});

impl Default for Header {
    fn default() -> Self {
        Self::new()
    }
}

impl Header {
    /// Header of a freshly created, empty log.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            version: FORMAT_VERSION,
            total_records: 0,
            footer_offset: HEADER_SIZE,
        }
    }

    /// Checks the fields that can be judged without the footer.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedVersion` for a foreign version and `InvalidFormat`
    /// if the footer would overlap the header.
    pub fn validate(&self) -> CoreResult<()> {
        if self.version != FORMAT_VERSION {
            return Err(CoreError::UnsupportedVersion {
                found: self.version,
                expected: FORMAT_VERSION,
            });
        }
        if self.footer_offset < HEADER_SIZE {
            return Err(CoreError::invalid_format(format!(
                "footer offset {} overlaps the header",
                self.footer_offset
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apo_codec::{from_bytes, to_bytes};

    #[test]
    fn fresh_header_layout() {
        let bytes = to_bytes(&Header::new()).unwrap();
        assert_eq!(bytes.len() as u64, HEADER_SIZE);
        assert_eq!(bytes[0], 1);
        assert_eq!(&bytes[1..9], &[0; 8]);
        assert_eq!(&bytes[9..17], &17u64.to_be_bytes());
    }

    #[test]
    fn header_decodes() {
        let header = Header {
            version: 1,
            total_records: 3,
            footer_offset: 120,
        };
        let back: Header = from_bytes(&to_bytes(&header).unwrap()).unwrap();
        assert_eq!(back, header);
    }

    #[test]
    fn rejects_unknown_version() {
        let header = Header {
            version: 2,
            ..Header::new()
        };
        assert!(matches!(
            header.validate(),
            Err(CoreError::UnsupportedVersion { found: 2, expected: 1 })
        ));
    }

    #[test]
    fn rejects_footer_inside_header() {
        let header = Header {
            footer_offset: 4,
            ..Header::new()
        };
        assert!(matches!(
            header.validate(),
            Err(CoreError::InvalidFormat { .. })
        ));
    }
}
