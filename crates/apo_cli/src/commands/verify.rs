//! Verify command implementation.

use apo_codec::{decode_value, Decoder, Shape};
use super::read_only_config;
use apo_core::{ApoLog, CoreError};
use std::path::Path;

/// Verification result.
#[derive(Debug, Default)]
pub struct VerifyResult {
    /// Number of records in the header.
    pub total_records: u64,
    /// Number of records read successfully.
    pub valid_records: u64,
    /// Index of the first record that failed, if any.
    pub failed_index: Option<u64>,
    /// List of errors found.
    pub errors: Vec<String>,
}

impl VerifyResult {
    fn is_ok(&self) -> bool {
        self.failed_index.is_none() && self.errors.is_empty()
    }
}

/// Runs the verify command.
pub fn run(path: &Path, shape: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    println!("Verifying log at {:?}", path);
    println!();

    let shape = shape.map(Shape::parse).transpose()?;
    let result = match ApoLog::open_with_config(path, read_only_config()) {
        Ok(log) => verify_log(&log, shape.as_ref())?,
        Err(e @ CoreError::NotFound { .. }) => return Err(e.into()),
        Err(e) => VerifyResult {
            errors: vec![format!("Failed to open log: {e}")],
            ..VerifyResult::default()
        },
    };
    print_result(&result);

    println!();
    if result.is_ok() {
        println!("✓ Log verification passed");
        Ok(())
    } else {
        println!("✗ Log verification failed");
        Err("Verification failed".into())
    }
}

/// Reads every record, stopping at the first one that cannot be read or,
/// with a shape, decoded.
pub fn verify_log(
    log: &ApoLog,
    shape: Option<&Shape>,
) -> Result<VerifyResult, Box<dyn std::error::Error>> {
    let mut result = VerifyResult {
        total_records: log.len()?,
        ..VerifyResult::default()
    };

    let stats = log.stats()?;
    if stats.orphaned_bytes > 0 {
        println!(
            "Note: {} bytes past the footer will be trimmed on the next write",
            stats.orphaned_bytes
        );
    }

    for (index, raw) in (0..).zip(log.iter_raw(0)?) {
        let raw = match raw {
            Ok(raw) => raw,
            Err(e) => {
                result.failed_index = Some(index);
                result.errors.push(e.to_string());
                break;
            }
        };

        if let Some(shape) = shape {
            let mut decoder = Decoder::new(&raw.data);
            if let Err(e) = decode_value(shape, &mut decoder).and_then(|_| decoder.finish()) {
                result.failed_index = Some(raw.index);
                result
                    .errors
                    .push(format!("Record {} does not match shape: {e}", raw.index));
                break;
            }
        }

        result.valid_records += 1;
    }

    Ok(result)
}

fn print_result(result: &VerifyResult) {
    println!("  Records: {}", result.total_records);
    println!("  Valid:   {}", result.valid_records);
    if let Some(index) = result.failed_index {
        println!("  First failure at record {index}");
    }
    for error in &result.errors {
        println!("  Error: {error}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apo_core::{Meta, Op};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn clean_log_verifies() {
        let dir = tempdir().unwrap();
        let log = ApoLog::open(dir.path().join("events.apo")).unwrap();
        for id in 0..3u64 {
            log.write(Meta::new(*b"item", Op::Insert), &id).unwrap();
        }

        let result = verify_log(&log, Some(&Shape::U64)).unwrap();
        assert!(result.is_ok());
        assert_eq!(result.valid_records, 3);
    }

    #[test]
    fn corrupt_record_reported_by_index() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("events.apo");
        {
            let log = ApoLog::open(&path).unwrap();
            for id in 0..3u64 {
                log.write(Meta::new(*b"item", Op::Insert), &id).unwrap();
            }
        }

        // records are 21 bytes each; break the op byte of record 2
        let mut bytes = fs::read(&path).unwrap();
        bytes[17 + 2 * 21 + 12] = 9;
        fs::write(&path, bytes).unwrap();

        let log = ApoLog::open(&path).unwrap();
        let result = verify_log(&log, None).unwrap();
        assert_eq!(result.valid_records, 2);
        assert_eq!(result.failed_index, Some(2));
    }

    #[test]
    fn shape_mismatch_reported() {
        let dir = tempdir().unwrap();
        let log = ApoLog::open(dir.path().join("events.apo")).unwrap();
        log.write(Meta::new(*b"item", Op::Insert), &7u64).unwrap();

        let result = verify_log(&log, Some(&Shape::U32)).unwrap();
        assert_eq!(result.failed_index, Some(0));
        assert!(!result.is_ok());
    }
}
