//! # Apo Core
//!
//! Append-only structured log for apo.
//!
//! This crate provides:
//! - [`ApoLog`], a durable, reopenable log of `(Meta, Data)` records
//! - The on-disk [`Header`], [`Footer`] and [`Meta`] layouts
//! - [`LogConfig`] for open and durability options
//!
//! Record payloads are any type implementing [`apo_codec::Encode`] and
//! [`apo_codec::Decode`].

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod log;

pub use config::LogConfig;
pub use error::{CoreError, CoreResult};
pub use log::{
    ApoLog, Footer, Header, Kind, LogStats, Meta, MetaData, Op, RawRecord, RawRecords,
    FORMAT_VERSION, HEADER_SIZE, META_SIZE,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
