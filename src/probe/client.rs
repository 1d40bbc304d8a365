//! HTTP client adapter for single probe attempts.
//!
//! [`HttpClient`] issues one GET per call and reduces the response to its
//! status code. The body is never read. Failures collapse into two tags:
//! [`FailureTag::Timeout`] when the configured wall-clock timeout elapses and
//! [`FailureTag::Transport`] for everything else (refused connections, DNS,
//! TLS, malformed responses, redirect loops, unparsable URLs).

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use reqwest::redirect::Policy;
use thiserror::Error;
use tracing::{debug, instrument};

use super::{AttemptResult, FailureTag};

/// Default per-request timeout (20 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Browser User-Agent sent by default; many sites reject unknown agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const DEFAULT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.5";

/// Upper bound on redirects chased when following is enabled.
const MAX_REDIRECTS: usize = 10;

/// Performs one attempt against a URL.
///
/// The engine depends on this trait rather than on [`HttpClient`] so other
/// transports can be plugged in.
#[async_trait]
pub trait Fetcher: Send + Sync + fmt::Debug {
    /// Issues a single request and reports its status code or failure tag.
    async fn fetch(&self, url: &str) -> AttemptResult;
}

/// Errors from constructing the HTTP client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// reqwest refused the builder configuration.
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// The configured User-Agent is not a valid header value.
    #[error("invalid User-Agent header value: {value:?}")]
    InvalidUserAgent {
        /// The rejected value.
        value: String,
    },
}

/// Transport settings for [`HttpClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Wall-clock limit for one request.
    pub timeout: Duration,
    /// Chase 3xx responses instead of reporting them.
    pub follow_redirects: bool,
    /// Value of the User-Agent header.
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            follow_redirects: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// reqwest-backed [`Fetcher`].
///
/// Create once and share; clones reuse the same connection pool.
///
/// # Example
///
/// ```no_run
/// use statuscan_core::probe::{ClientOptions, Fetcher, HttpClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new(&ClientOptions::default())?;
/// let result = client.fetch("https://example.com").await;
/// println!("{result:?}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    timeout: Duration,
    follow_redirects: bool,
}

impl HttpClient {
    /// Builds a client from `options`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the User-Agent is not a valid header value
    /// or reqwest cannot build the client.
    #[instrument(level = "debug")]
    pub fn new(options: &ClientOptions) -> Result<Self, ClientError> {
        let user_agent = HeaderValue::from_str(&options.user_agent).map_err(|_| {
            ClientError::InvalidUserAgent {
                value: options.user_agent.clone(),
            }
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static(DEFAULT_ACCEPT_LANGUAGE),
        );

        let redirect = if options.follow_redirects {
            Policy::limited(MAX_REDIRECTS)
        } else {
            Policy::none()
        };

        let client = Client::builder()
            .timeout(options.timeout)
            .redirect(redirect)
            .user_agent(user_agent)
            .default_headers(headers)
            .gzip(true)
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            client,
            timeout: options.timeout,
            follow_redirects: options.follow_redirects,
        })
    }

    /// The configured per-request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether 3xx responses are chased.
    #[must_use]
    pub fn follows_redirects(&self) -> bool {
        self.follow_redirects
    }
}

#[async_trait]
impl Fetcher for HttpClient {
    #[instrument(level = "debug", skip(self), fields(url = %url))]
    async fn fetch(&self, url: &str) -> AttemptResult {
        match self.client.get(url).send().await {
            Ok(response) => AttemptResult::Status(response.status().as_u16()),
            Err(error) if error.is_timeout() => {
                debug!(timeout_ms = self.timeout.as_millis(), "request timed out");
                AttemptResult::Failed(FailureTag::Timeout)
            }
            Err(error) => {
                debug!(error = %error, "request failed");
                AttemptResult::Failed(FailureTag::Transport)
            }
        }
    }
}
