//! Append-only structured log ("apo").
//!
//! An apo file holds an ordered sequence of `(Meta, Data)` records between a
//! fixed header and a trailing footer that indexes them.
//!
//! ## File Format
//!
//! All integers are big-endian.
//!
//! ```text
//! [Header]   offset 0
//!   version       : u8  = 1
//!   total_records : u64
//!   footer_offset : u64
//! [Record 0] offset 17
//!   at   : i64  (ns since the Unix epoch)
//!   kind : [u8; 4]
//!   op   : u8   (0=insert, 1=update, 2=replace, 4=delete)
//!   data : codec-encoded payload
//! [Record 1] ...
//! [Footer]   at footer_offset, rewritten on every write
//!   count   : u64
//!   offsets : u64 × count
//! ```
//!
//! ## Recovery Policy
//!
//! Open trusts the header, not the file length. Bytes past the footer are
//! ignored on open and trimmed by the next write. A header or footer that
//! cannot be read, or that disagree with each other, fail the open.
//!
//! A write lays its record over the previous footer before the new header
//! lands. When a step of the commit fails, the log writes the previous
//! footer and header back and cuts the file to its previous end, so earlier
//! records stay readable. A crash inside a commit gets no such repair: the
//! header points at record bytes, and the file fails to open with
//! `InvalidFormat` rather than being silently misread.

mod apo;
mod footer;
mod header;
mod iter;
mod meta;

pub use apo::{ApoLog, LogStats};
pub use footer::Footer;
pub use header::{Header, FORMAT_VERSION, HEADER_SIZE};
pub use iter::RawRecords;
pub use meta::{Kind, Meta, MetaData, Op, RawRecord, META_SIZE};
