//! Concurrent HTTP status probing.
//!
//! This module turns a list of URLs into per-class outcome counts.
//!
//! # Features
//!
//! - Fixed worker pool draining a shared [`WorkQueue`]
//! - Global admission gate bounding in-flight requests
//! - Retry of 5xx responses and timeouts with an optional backoff
//! - Thread-safe per-class counters ([`ScanStats`])
//! - Optional append-only file of reachable URLs ([`FileSink`])
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use statuscan_core::probe::{FileSink, HttpClient, ProbeEngine, ScanConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ScanConfig::default();
//! let engine = ProbeEngine::new(&config)?;
//! let client = Arc::new(HttpClient::new(&config.client_options())?);
//! let sink = Arc::new(FileSink::create(Path::new("result/ok.txt")).await?);
//!
//! let urls = vec!["https://example.com".to_string(), "https://example.org".to_string()];
//! let stats = engine.run(urls, client, sink, None).await?;
//! for (class, count) in stats.iter() {
//!     println!("{:<10} : {count}", class.label());
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod engine;
mod outcome;
mod queue;
mod retry;
mod sink;
mod stats;

pub use client::{
    ClientError, ClientOptions, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, Fetcher, HttpClient,
};
pub use config::ScanConfig;
pub use engine::{DEFAULT_CONCURRENCY, EngineError, ProbeEngine, ProbeEvent};
pub use outcome::{AttemptResult, FailureTag, OutcomeClass, classify};
pub use queue::{QueueError, WorkItem, WorkQueue};
pub use retry::{Backoff, DEFAULT_MAX_RETRIES, RetryDecision, RetryPolicy, should_retry};
pub use sink::{DegradingSink, FileSink, NullSink, SinkError, SuccessSink};
pub use stats::{ScanStats, StatsSnapshot};
