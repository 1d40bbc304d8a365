//! Scan configuration shared by the CLI and library callers.

use std::time::Duration;

use super::client::{ClientOptions, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
use super::engine::DEFAULT_CONCURRENCY;
use super::retry::{Backoff, DEFAULT_MAX_RETRIES, RetryPolicy};

/// Everything needed to run one scan.
///
/// # Default Values
///
/// - `retry`: 2 (three attempts per URL)
/// - `concurrency`: 10
/// - `workers`: same as `concurrency`
/// - `timeout`: 20 seconds
/// - `follow_redirects`: true
/// - `backoff`: none (immediate retries)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Extra attempts allowed for 5xx and timeouts.
    pub retry: u32,
    /// Maximum requests in flight at once.
    pub concurrency: usize,
    /// Worker task count; `None` uses `concurrency`.
    pub workers: Option<usize>,
    /// Wall-clock limit per request.
    pub timeout: Duration,
    /// Chase 3xx responses.
    pub follow_redirects: bool,
    /// Delay strategy between attempts of the same URL.
    pub backoff: Backoff,
    /// User-Agent header value.
    pub user_agent: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            retry: DEFAULT_MAX_RETRIES,
            concurrency: DEFAULT_CONCURRENCY,
            workers: None,
            timeout: DEFAULT_TIMEOUT,
            follow_redirects: true,
            backoff: Backoff::None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ScanConfig {
    /// Number of worker tasks the engine spawns.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or(self.concurrency)
    }

    /// Retry policy derived from `retry` and `backoff`.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry).with_backoff(self.backoff)
    }

    /// Transport settings for [`super::HttpClient`].
    #[must_use]
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            timeout: self.timeout,
            follow_redirects: self.follow_redirects,
            user_agent: self.user_agent.clone(),
        }
    }
}
