//! Probe engine: a fixed pool of workers draining a [`WorkQueue`].
//!
//! # Overview
//!
//! Each worker loops `pop → attempt → retry? → record → complete` until the
//! queue reports that it is closed and empty. Attempts pass through a shared
//! admission gate (a semaphore) before touching the network, so the number
//! of in-flight requests never exceeds the configured concurrency, whatever
//! the worker count.
//!
//! Attempts for one URL are strictly sequential. Across URLs there is no
//! ordering: outcomes and events arrive in completion order.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use statuscan_core::probe::{HttpClient, NullSink, ProbeEngine, ScanConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ScanConfig::default();
//! let engine = ProbeEngine::new(&config)?;
//! let client = Arc::new(HttpClient::new(&config.client_options())?);
//! let urls = vec!["https://example.com".to_string()];
//! let stats = engine.run(urls, client, Arc::new(NullSink), None).await?;
//! println!("reachable: {}", stats.success);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, instrument, warn};

use super::config::ScanConfig;
use super::outcome::{OutcomeClass, classify};
use super::queue::WorkQueue;
use super::retry::{RetryDecision, RetryPolicy};
use super::sink::{DegradingSink, SuccessSink};
use super::stats::{ScanStats, StatsSnapshot};
use super::{Fetcher, WorkItem};

/// Minimum allowed concurrency value.
const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed concurrency (and worker) value.
const MAX_CONCURRENCY: usize = 1000;

/// Default concurrency if not specified.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Error type for probe engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Invalid concurrency value provided.
    #[error(
        "invalid concurrency value {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency {
        /// The invalid value that was provided.
        value: usize,
    },

    /// Invalid worker count provided.
    #[error(
        "invalid worker count {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidWorkerCount {
        /// The invalid value that was provided.
        value: usize,
    },

    /// A zero request timeout would fail every attempt.
    #[error("invalid timeout: must be greater than zero")]
    InvalidTimeout,

    /// Admission gate was closed unexpectedly.
    #[error("admission gate closed unexpectedly")]
    SemaphoreClosed,

    /// Workers stopped before every URL was counted.
    #[error("scan incomplete: {counted} of {expected} URLs were classified")]
    Incomplete {
        /// URLs pushed onto the queue.
        expected: usize,
        /// URLs that reached the aggregator.
        counted: usize,
    },
}

/// Final result for one URL, emitted on the event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeEvent {
    /// The probed URL.
    pub url: String,
    /// Outcome class of the last attempt.
    pub class: OutcomeClass,
    /// Status code of the last attempt, if a response arrived.
    pub status: Option<u16>,
    /// Attempts made, including the first.
    pub attempts: u32,
}

impl fmt::Display for ProbeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.class, self.status) {
            (OutcomeClass::Timeout | OutcomeClass::TransportError, _) | (_, None) => {
                write!(f, "{} {}", self.class.label(), self.url)
            }
            (_, Some(status)) => write!(f, "[{status}] {}", self.url),
        }
    }
}

/// Outcome of the attempt loop for one URL.
#[derive(Debug, Clone, Copy)]
struct ProbeOutcome {
    class: OutcomeClass,
    status: Option<u16>,
    attempts: u32,
}

/// State shared by every worker of one run.
#[derive(Debug)]
struct WorkerContext {
    queue: WorkQueue,
    admission: Arc<Semaphore>,
    fetcher: Arc<dyn Fetcher>,
    sink: DegradingSink,
    stats: ScanStats,
    retry_policy: RetryPolicy,
    events: Option<UnboundedSender<ProbeEvent>>,
}

/// Probe engine for concurrent status checks with retry support.
///
/// # Concurrency Model
///
/// - `workers` Tokio tasks pull URLs from one shared queue
/// - Every attempt holds one admission permit for the duration of the request
/// - Permits are released automatically when the attempt returns (RAII)
/// - The run ends when the queue has been joined, i.e. every URL is counted
///
/// # Retry Behavior
///
/// - 5xx and timeouts are retried up to the configured budget
/// - Every other outcome is final after one attempt
/// - Retries are immediate unless the policy carries a backoff
#[derive(Debug)]
pub struct ProbeEngine {
    /// Admission gate bounding in-flight requests.
    admission: Arc<Semaphore>,
    /// Configured concurrency limit.
    concurrency: usize,
    /// Number of worker tasks per run.
    workers: usize,
    /// Retry policy for transient outcomes.
    retry_policy: RetryPolicy,
}

impl ProbeEngine {
    /// Creates an engine from a [`ScanConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConcurrency`] or
    /// [`EngineError::InvalidWorkerCount`] when a value is outside 1-1000, and
    /// [`EngineError::InvalidTimeout`] for a zero timeout.
    pub fn new(config: &ScanConfig) -> Result<Self, EngineError> {
        if config.timeout.is_zero() {
            return Err(EngineError::InvalidTimeout);
        }
        Self::with_limits(
            config.concurrency,
            config.worker_count(),
            config.retry_policy(),
        )
    }

    /// Creates an engine with explicit limits.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConcurrency`] or
    /// [`EngineError::InvalidWorkerCount`] when a value is outside 1-1000.
    #[instrument(level = "debug", skip(retry_policy))]
    pub fn with_limits(
        concurrency: usize,
        workers: usize,
        retry_policy: RetryPolicy,
    ) -> Result<Self, EngineError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&concurrency) {
            return Err(EngineError::InvalidConcurrency { value: concurrency });
        }
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&workers) {
            return Err(EngineError::InvalidWorkerCount { value: workers });
        }

        debug!(
            concurrency,
            workers,
            max_retries = retry_policy.max_retries(),
            backoff = ?retry_policy.backoff(),
            "creating probe engine"
        );

        Ok(Self {
            admission: Arc::new(Semaphore::new(concurrency)),
            concurrency,
            workers,
            retry_policy,
        })
    }

    /// Returns the configured concurrency limit.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Returns the number of worker tasks spawned per run.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Returns the configured retry policy.
    #[must_use]
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Probes every URL in `urls` and returns the per-class counts.
    ///
    /// `urls` is expected to be normalized and deduplicated already.
    ///
    /// # Errors
    ///
    /// See [`run_queue`](Self::run_queue).
    pub async fn run<I>(
        &self,
        urls: I,
        fetcher: Arc<dyn Fetcher>,
        sink: Arc<dyn SuccessSink>,
        events: Option<UnboundedSender<ProbeEvent>>,
    ) -> Result<StatsSnapshot, EngineError>
    where
        I: IntoIterator<Item = String>,
    {
        let queue = WorkQueue::from_urls(urls);
        self.run_queue(&queue, fetcher, sink, events).await
    }

    /// Drains `queue` with the worker pool.
    ///
    /// Successful URLs are appended to `sink`; a failing sink is reported
    /// once and then ignored. One [`ProbeEvent`] per URL is sent on `events`
    /// when provided.
    ///
    /// An empty queue yields an all-zero snapshot without any request.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Incomplete`] if the workers stopped (for
    /// example by panicking) before every URL was counted. Individual request
    /// failures never produce an error; they are counted.
    #[instrument(skip_all, fields(urls = queue.pushed(), workers = self.workers, concurrency = self.concurrency))]
    pub async fn run_queue(
        &self,
        queue: &WorkQueue,
        fetcher: Arc<dyn Fetcher>,
        sink: Arc<dyn SuccessSink>,
        events: Option<UnboundedSender<ProbeEvent>>,
    ) -> Result<StatsSnapshot, EngineError> {
        if queue.pushed() == 0 {
            info!("no work: input is empty");
            return Ok(StatsSnapshot::default());
        }

        info!("starting scan");

        let ctx = Arc::new(WorkerContext {
            queue: queue.clone(),
            admission: Arc::clone(&self.admission),
            fetcher,
            sink: DegradingSink::new(sink),
            stats: ScanStats::new(),
            retry_policy: self.retry_policy.clone(),
            events,
        });

        let mut workers = JoinSet::new();
        for worker_id in 0..self.workers {
            workers.spawn(run_worker(worker_id, Arc::clone(&ctx)));
        }

        let drained = queue.join();
        tokio::pin!(drained);
        loop {
            tokio::select! {
                () = &mut drained => break,
                joined = workers.join_next() => match joined {
                    Some(result) => log_worker_exit(result),
                    None => break,
                },
            }
        }

        // Workers still parked in `pop` on an open queue are cancelled here.
        workers.abort_all();
        while let Some(result) = workers.join_next().await {
            log_worker_exit(result);
        }

        let snapshot = ctx.stats.snapshot();
        let expected = queue.pushed();
        let counted = snapshot.total();
        if counted != expected {
            error!(expected, counted, "workers stopped before the queue drained");
            return Err(EngineError::Incomplete { expected, counted });
        }

        info!(
            total = counted,
            success = snapshot.success,
            client_error = snapshot.client_error,
            server_error = snapshot.server_error,
            timeout = snapshot.timeout,
            transport_error = snapshot.transport_error,
            persistence_disabled = ctx.sink.is_disabled(),
            "scan complete"
        );

        Ok(snapshot)
    }
}

fn log_worker_exit(result: Result<Result<(), EngineError>, JoinError>) {
    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(error = %e, "worker stopped"),
        Err(e) if e.is_cancelled() => {}
        Err(e) => warn!(error = %e, "worker task panicked"),
    }
}

#[instrument(skip(ctx))]
async fn run_worker(worker_id: usize, ctx: Arc<WorkerContext>) -> Result<(), EngineError> {
    while let Some(item) = ctx.queue.pop().await {
        let outcome = probe_with_retry(&ctx, item.url()).await?;
        record(&ctx, item, outcome).await;
    }
    debug!("queue drained, worker exiting");
    Ok(())
}

/// Counts the outcome, persists successes, emits the event, and releases the item.
async fn record(ctx: &WorkerContext, item: WorkItem, outcome: ProbeOutcome) {
    ctx.stats.increment(outcome.class);

    if outcome.class == OutcomeClass::Success {
        ctx.sink.append(item.url()).await;
    }

    if let Some(events) = &ctx.events {
        // A dropped receiver only means nobody is printing.
        let _ = events.send(ProbeEvent {
            url: item.url().to_string(),
            class: outcome.class,
            status: outcome.status,
            attempts: outcome.attempts,
        });
    }

    item.complete();
}

/// Runs the attempt loop for one URL.
///
/// Each attempt holds one admission permit only while the request is in
/// flight; backoff sleeps happen without a permit.
#[instrument(skip(ctx), fields(url = %url))]
async fn probe_with_retry(ctx: &WorkerContext, url: &str) -> Result<ProbeOutcome, EngineError> {
    let mut attempt = 0u32;

    loop {
        let result = {
            let _permit = ctx
                .admission
                .acquire()
                .await
                .map_err(|_| EngineError::SemaphoreClosed)?;
            ctx.fetcher.fetch(url).await
        };
        let class = classify(result);
        debug!(attempt, ?result, %class, "attempt finished");

        match ctx.retry_policy.decide(class, attempt) {
            RetryDecision::Retry {
                delay,
                attempt: next_attempt,
            } => {
                debug!(
                    next_attempt,
                    delay_ms = delay.as_millis(),
                    "retrying"
                );
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                attempt = next_attempt;
            }
            RetryDecision::DoNotRetry { reason } => {
                debug!(%reason, "outcome is final");
                return Ok(ProbeOutcome {
                    class,
                    status: result.status(),
                    attempts: attempt + 1,
                });
            }
        }
    }
}
