//! Per-record metadata.

use apo_codec::{CodecError, CodecResult, Decode, Decoder, Encode, Encoder};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Encoded meta size: at (8) + kind (4) + op (1).
pub const META_SIZE: u64 = 13;

/// The kind of change a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Op {
    /// A new entry.
    Insert = 0,
    /// A partial change to an existing entry.
    Update = 1,
    /// A full replacement of an existing entry.
    Replace = 2,
    /// A logical deletion.
    Delete = 4,
}

impl Op {
    /// Converts a byte to an op.
    #[must_use]
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(Self::Insert),
            1 => Some(Self::Update),
            2 => Some(Self::Replace),
            4 => Some(Self::Delete),
            _ => None,
        }
    }

    /// Converts the op to a byte.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    /// Lowercase name of the op.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Replace => "replace",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A 4-byte record kind tag, stored raw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Kind(pub [u8; 4]);

impl Kind {
    /// Creates a kind from raw bytes.
    #[must_use]
    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// The raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl From<[u8; 4]> for Kind {
    fn from(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Kind {
    /// Printable ASCII tags are shown as text (trailing NULs dropped),
    /// anything else as hex.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let trimmed = match self.0.iter().rposition(|&b| b != 0) {
            Some(last) => &self.0[..=last],
            None => &[][..],
        };
        if trimmed.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
            for &b in trimmed {
                write!(f, "{}", b as char)?;
            }
            Ok(())
        } else {
            write!(f, "0x")?;
            for b in self.0 {
                write!(f, "{b:02x}")?;
            }
            Ok(())
        }
    }
}

/// Metadata written in front of every record's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Meta {
    /// Timestamp in nanoseconds since the Unix epoch; 0 means unset.
    pub at: i64,
    /// Record kind.
    pub kind: Kind,
    /// Change kind.
    pub op: Op,
}

impl Meta {
    /// Creates meta with an unset timestamp, filled in on write.
    #[must_use]
    pub fn new(kind: impl Into<Kind>, op: Op) -> Self {
        Self {
            at: 0,
            kind: kind.into(),
            op,
        }
    }

    /// Sets an explicit timestamp.
    #[must_use]
    pub const fn with_at(mut self, at: i64) -> Self {
        self.at = at;
        self
    }

    /// Returns `true` if the timestamp has not been assigned.
    #[must_use]
    pub const fn is_unset(&self) -> bool {
        self.at == 0
    }

    /// Assigns the current time if the timestamp is unset.
    pub fn stamp(&mut self) {
        if self.is_unset() {
            self.at = now_nanos();
        }
    }
}

impl Encode for Meta {
    fn encode(&self, encoder: &mut Encoder) -> CodecResult<()> {
        encoder.put_i64(self.at);
        encoder.put_raw(&self.kind.0);
        encoder.put_u8(self.op.as_byte());
        Ok(())
    }
}

impl Decode for Meta {
    fn decode(decoder: &mut Decoder<'_>) -> CodecResult<Self> {
        let at = decoder.get_i64()?;
        let mut kind = [0u8; 4];
        kind.copy_from_slice(decoder.get_raw(4)?);
        let tag = decoder.get_u8()?;
        let op = Op::from_byte(tag).ok_or_else(|| CodecError::invalid_tag("Op", tag))?;
        Ok(Self {
            at,
            kind: Kind(kind),
            op,
        })
    }
}

/// A decoded record.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaData<D> {
    /// The record's metadata.
    pub meta: Meta,
    /// The record's payload.
    pub data: D,
}

/// A record with its payload left undecoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// Position in the log.
    pub index: u64,
    /// Byte offset of the record's meta.
    pub offset: u64,
    /// The record's metadata.
    pub meta: Meta,
    /// The encoded payload.
    pub data: Vec<u8>,
}

impl RawRecord {
    /// Total encoded size, meta included.
    #[must_use]
    pub fn size(&self) -> u64 {
        META_SIZE + self.data.len() as u64
    }
}

fn now_nanos() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_nanos()).unwrap_or(i64::MAX)
        })
}
