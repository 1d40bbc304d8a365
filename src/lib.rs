//! Statuscan Core Library
//!
//! This library provides the core functionality for the statuscan tool,
//! which checks the HTTP status of every URL in a list and reports how many
//! landed in each status class.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`input`] - Loading, normalizing and deduplicating the URL list
//! - [`probe`] - Worker pool, retry policy, HTTP adapter, counters and sinks

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod input;
pub mod probe;

// Re-export commonly used types
pub use input::{InputError, load_url_file, parse_url_list};
pub use probe::{
    Backoff, DEFAULT_CONCURRENCY, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT, EngineError, FileSink,
    HttpClient, NullSink, OutcomeClass, ProbeEngine, ProbeEvent, RetryPolicy, ScanConfig,
    StatsSnapshot, SuccessSink, classify,
};
