//! Shared fixtures for apo benchmarks.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod utils;
