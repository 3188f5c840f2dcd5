//! CLI command implementations.

pub mod dump;
pub mod inspect;
pub mod verify;

use apo_core::{ApoLog, LogConfig};
use std::path::Path;

/// Configuration for the inspection commands: never create, initialize or
/// write a log.
#[must_use]
pub fn read_only_config() -> LogConfig {
    LogConfig::new().create_if_missing(false).read_only(true)
}

/// Opens an existing log read-only.
pub fn open_existing(path: &Path) -> Result<ApoLog, Box<dyn std::error::Error>> {
    Ok(ApoLog::open_with_config(path, read_only_config())?)
}
