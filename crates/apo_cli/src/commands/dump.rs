//! Dump command implementation.

use super::open_existing;
use apo_codec::{decode_value, Decoder, Shape, Value};
use apo_core::{ApoLog, RawRecord};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Record representation for output.
#[derive(Debug, Serialize)]
pub struct RecordInfo {
    /// Position in the log.
    pub index: u64,
    /// Byte offset of the record.
    pub offset: u64,
    /// Encoded size (meta and data).
    pub size: u64,
    /// Timestamp in nanoseconds since the Unix epoch.
    pub at: i64,
    /// Record kind.
    pub kind: String,
    /// Change kind.
    pub op: String,
    /// Decoded data (if a shape was given).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Why the data could not be decoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Runs the dump command.
pub fn run(
    path: &Path,
    shape: Option<&str>,
    start: u64,
    limit: Option<usize>,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let shape = shape.map(Shape::parse).transpose()?;
    info!("Dumping {:?} from record {}", path, start);

    let log = open_existing(path)?;
    let records = collect_records(&log, shape.as_ref(), start, limit)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        _ => {
            print_text_output(&records);
        }
    }

    Ok(())
}

/// Reads up to `limit` records starting at `start`.
///
/// A record whose data does not match `shape` is still listed, with the
/// decode error in place of the data.
pub fn collect_records(
    log: &ApoLog,
    shape: Option<&Shape>,
    start: u64,
    limit: Option<usize>,
) -> Result<Vec<RecordInfo>, Box<dyn std::error::Error>> {
    let mut records = Vec::new();
    for raw in log.iter_raw(start)?.take(limit.unwrap_or(usize::MAX)) {
        records.push(describe(&raw?, shape));
    }
    Ok(records)
}

fn describe(raw: &RawRecord, shape: Option<&Shape>) -> RecordInfo {
    let mut info = RecordInfo {
        index: raw.index,
        offset: raw.offset,
        size: raw.size(),
        at: raw.meta.at,
        kind: raw.meta.kind.to_string(),
        op: raw.meta.op.to_string(),
        data: None,
        error: None,
    };

    if let Some(shape) = shape {
        let mut decoder = Decoder::new(&raw.data);
        match decode_value(shape, &mut decoder).and_then(|value| {
            decoder.finish()?;
            Ok(value)
        }) {
            Ok(value) => info.data = Some(value),
            Err(e) => info.error = Some(e.to_string()),
        }
    }

    info
}

fn print_text_output(records: &[RecordInfo]) {
    println!("Records ({} shown)", records.len());
    println!("================");
    println!();

    for record in records {
        print!(
            "[{:6}] @{:<8} {:7} {:>5}B at={} kind={}",
            record.index, record.offset, record.op, record.size, record.at, record.kind
        );
        if let Some(data) = &record.data {
            match serde_json::to_string(data) {
                Ok(json) => print!(" {json}"),
                Err(e) => print!(" <{e}>"),
            }
        }
        if let Some(error) = &record.error {
            print!(" error: {error}");
        }
        println!();
    }
}
