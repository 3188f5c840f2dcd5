//! Inspect command implementation.

use super::open_existing;
use apo_core::ApoLog;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Log inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Log path.
    pub path: String,
    /// Format version from the header.
    pub version: u8,
    /// Number of committed records.
    pub total_records: u64,
    /// Footer position.
    pub footer_offset: u64,
    /// Encoded footer size in bytes.
    pub footer_size: u64,
    /// File size in bytes.
    pub file_size: u64,
    /// Bytes stored past the footer.
    pub orphaned_bytes: u64,
    /// Bytes taken by records (meta and data).
    pub record_bytes: u64,
    /// Record offsets (if requested).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offsets: Option<Vec<u64>>,
}

/// Runs the inspect command.
pub fn run(path: &Path, show_offsets: bool, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    info!("Inspecting {:?}", path);
    let log = open_existing(path)?;
    let result = inspect(&log, show_offsets)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

/// Collects header, footer and size information from an open log.
pub fn inspect(log: &ApoLog, show_offsets: bool) -> Result<InspectResult, Box<dyn std::error::Error>> {
    let stats = log.stats()?;
    let offsets = if show_offsets {
        Some(log.footer()?.offsets().to_vec())
    } else {
        None
    };

    Ok(InspectResult {
        path: log
            .path()
            .map_or_else(|| "<memory>".to_string(), |p| p.display().to_string()),
        version: stats.header.version,
        total_records: stats.header.total_records,
        footer_offset: stats.header.footer_offset,
        footer_size: stats.footer_size,
        file_size: stats.file_size,
        orphaned_bytes: stats.orphaned_bytes,
        record_bytes: stats.header.footer_offset - apo_core::HEADER_SIZE,
        offsets,
    })
}

fn print_text_output(result: &InspectResult) {
    println!("apo log: {}", result.path);
    println!("================");
    println!("Version:        {}", result.version);
    println!("Records:        {}", result.total_records);
    println!("Record bytes:   {}", result.record_bytes);
    println!("Footer offset:  {}", result.footer_offset);
    println!("Footer size:    {}", result.footer_size);
    println!("File size:      {}", result.file_size);
    if result.orphaned_bytes > 0 {
        println!("Orphaned bytes: {} (trimmed on next write)", result.orphaned_bytes);
    }

    if let Some(offsets) = &result.offsets {
        println!();
        println!("Offsets:");
        for (index, offset) in offsets.iter().enumerate() {
            println!("  [{index:6}] {offset}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apo_core::{Meta, Op};
    use tempfile::tempdir;

    #[test]
    fn inspect_reports_layout() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("events.apo");
        let log = ApoLog::open(&path).unwrap();
        log.write(Meta::new(*b"user", Op::Insert), &1u64).unwrap();

        let result = inspect(&log, true).unwrap();
        assert_eq!(result.total_records, 1);
        assert_eq!(result.footer_offset, 38);
        assert_eq!(result.record_bytes, 21);
        assert_eq!(result.footer_size, 16);
        assert_eq!(result.file_size, 54);
        assert_eq!(result.offsets, Some(vec![17]));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["total_records"], 1);
    }

    #[test]
    fn inspect_missing_file_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.apo");
        assert!(open_existing(&path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn inspect_leaves_files_untouched() {
        let dir = tempdir().unwrap();
        let empty = dir.path().join("empty.apo");
        std::fs::File::create(&empty).unwrap();
        assert!(open_existing(&empty).is_err());
        assert_eq!(std::fs::metadata(&empty).unwrap().len(), 0);

        let path = dir.path().join("events.apo");
        let log = ApoLog::open(&path).unwrap();
        log.write(Meta::new(*b"user", Op::Insert), &1u64).unwrap();
        log.close().unwrap();

        let mut permissions = std::fs::metadata(&path).unwrap().permissions();
        permissions.set_readonly(true);
        std::fs::set_permissions(&path, permissions).unwrap();

        let log = open_existing(&path).unwrap();
        assert_eq!(inspect(&log, false).unwrap().total_records, 1);
        assert!(log.write(Meta::new(*b"user", Op::Insert), &2u64).is_err());
        log.close().unwrap();
    }
}
