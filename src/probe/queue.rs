//! In-memory work queue with completion tracking.
//!
//! A URL is *popped* when a worker claims it and *completed* when the worker
//! has finished every attempt and recorded the outcome. [`WorkQueue::join`]
//! waits for the second event, so the queue is not considered drained while
//! retries are still in flight.
//!
//! The queue is filled before the workers start and then closed. Once closed
//! and empty, [`WorkQueue::pop`] returns `None` and workers exit.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tokio::sync::Notify;
use tracing::warn;

/// Errors raised by queue operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    /// The queue was closed before the push.
    #[error("cannot push {url}: queue is closed")]
    Closed {
        /// URL that was rejected.
        url: String,
    },
}

#[derive(Debug, Default)]
struct QueueState {
    pending: VecDeque<String>,
    pushed: usize,
    completed: usize,
    closed: bool,
}

impl QueueState {
    fn is_drained(&self) -> bool {
        self.pending.is_empty() && self.completed == self.pushed
    }
}

#[derive(Debug, Default)]
struct Inner {
    state: Mutex<QueueState>,
    item_ready: Notify,
    drained: Notify,
}

/// Multi-consumer URL queue. Cloning shares the same queue.
#[derive(Debug, Clone, Default)]
pub struct WorkQueue {
    inner: Arc<Inner>,
}

impl WorkQueue {
    /// Creates an empty, open queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a queue holding `urls` in order, already closed.
    #[must_use]
    pub fn from_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let queue = Self::new();
        {
            let mut state = queue.lock();
            for url in urls {
                state.pending.push_back(url.into());
                state.pushed += 1;
            }
            state.closed = true;
        }
        queue
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a URL.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Closed`] once [`close`](Self::close) was called.
    pub fn push(&self, url: impl Into<String>) -> Result<(), QueueError> {
        let url = url.into();
        {
            let mut state = self.lock();
            if state.closed {
                return Err(QueueError::Closed { url });
            }
            state.pending.push_back(url);
            state.pushed += 1;
        }
        self.inner.item_ready.notify_waiters();
        Ok(())
    }

    /// Seals the queue; waiting consumers see `None` once it empties.
    pub fn close(&self) {
        self.lock().closed = true;
        self.inner.item_ready.notify_waiters();
    }

    /// Claims the next URL.
    ///
    /// Waits while the queue is empty but open. Returns `None` when the queue
    /// is empty and closed.
    pub async fn pop(&self) -> Option<WorkItem> {
        loop {
            // Registered before the check so a concurrent push cannot be missed.
            let notified = self.inner.item_ready.notified();
            {
                let mut state = self.lock();
                if let Some(url) = state.pending.pop_front() {
                    return Some(WorkItem {
                        url,
                        queue: self.clone(),
                        completed: false,
                    });
                }
                if state.closed {
                    return None;
                }
            }
            notified.await;
        }
    }

    /// Waits until every pushed URL has been popped and completed.
    pub async fn join(&self) {
        loop {
            let notified = self.inner.drained.notified();
            if self.is_drained() {
                return;
            }
            notified.await;
        }
    }

    /// Whether every pushed URL has been popped and completed.
    #[must_use]
    pub fn is_drained(&self) -> bool {
        self.lock().is_drained()
    }

    /// Number of URLs waiting to be popped.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().pending.len()
    }

    /// Whether no URL is waiting to be popped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().pending.is_empty()
    }

    /// Total URLs ever pushed.
    #[must_use]
    pub fn pushed(&self) -> usize {
        self.lock().pushed
    }

    /// URLs popped and completed so far.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.lock().completed
    }

    /// URLs that were pushed but not yet completed.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        let state = self.lock();
        state.pushed - state.completed
    }

    fn finish_one(&self) {
        let drained = {
            let mut state = self.lock();
            state.completed += 1;
            state.is_drained()
        };
        if drained {
            self.inner.drained.notify_waiters();
        }
    }
}

/// A claimed URL. Completing it (or dropping it) marks the queue slot done.
#[derive(Debug)]
pub struct WorkItem {
    url: String,
    queue: WorkQueue,
    completed: bool,
}

impl WorkItem {
    /// The claimed URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Marks the URL fully processed.
    pub fn complete(mut self) {
        self.completed = true;
        self.queue.finish_one();
    }
}

impl Drop for WorkItem {
    fn drop(&mut self) {
        if !self.completed {
            warn!(url = %self.url, "work item released without completion");
            self.queue.finish_one();
        }
    }
}
