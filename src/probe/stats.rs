//! Per-class outcome counters shared by all workers.

use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;

use super::OutcomeClass;

/// Thread-safe outcome counters for one scan.
///
/// Workers call [`ScanStats::increment`] exactly once per URL. The engine
/// reads [`ScanStats::snapshot`] after every worker has finished.
#[derive(Debug, Default)]
pub struct ScanStats {
    counts: [AtomicUsize; 7],
}

impl ScanStats {
    /// Creates a tracker with every class at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one completed URL under `class`.
    pub fn increment(&self, class: OutcomeClass) {
        self.counts[class.index()].fetch_add(1, Ordering::SeqCst);
    }

    /// Current count for `class`.
    #[must_use]
    pub fn get(&self, class: OutcomeClass) -> usize {
        self.counts[class.index()].load(Ordering::SeqCst)
    }

    /// Copies the counters into an immutable snapshot.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            informational: self.get(OutcomeClass::Informational),
            success: self.get(OutcomeClass::Success),
            redirect: self.get(OutcomeClass::Redirect),
            client_error: self.get(OutcomeClass::ClientError),
            server_error: self.get(OutcomeClass::ServerError),
            timeout: self.get(OutcomeClass::Timeout),
            transport_error: self.get(OutcomeClass::TransportError),
        }
    }
}

/// Final per-class counts of a scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// 1xx responses.
    pub informational: usize,
    /// 2xx responses.
    pub success: usize,
    /// 3xx responses.
    pub redirect: usize,
    /// 4xx responses.
    pub client_error: usize,
    /// 5xx responses after the retry budget ran out.
    pub server_error: usize,
    /// Timeouts after the retry budget ran out.
    pub timeout: usize,
    /// Connection, DNS, TLS and protocol failures.
    pub transport_error: usize,
}

impl StatsSnapshot {
    /// Count for `class`.
    #[must_use]
    pub fn get(&self, class: OutcomeClass) -> usize {
        match class {
            OutcomeClass::Informational => self.informational,
            OutcomeClass::Success => self.success,
            OutcomeClass::Redirect => self.redirect,
            OutcomeClass::ClientError => self.client_error,
            OutcomeClass::ServerError => self.server_error,
            OutcomeClass::Timeout => self.timeout,
            OutcomeClass::TransportError => self.transport_error,
        }
    }

    /// Number of URLs that completed classification.
    #[must_use]
    pub fn total(&self) -> usize {
        OutcomeClass::ALL.iter().map(|class| self.get(*class)).sum()
    }

    /// `(class, count)` pairs in summary order.
    pub fn iter(&self) -> impl Iterator<Item = (OutcomeClass, usize)> + '_ {
        OutcomeClass::ALL
            .into_iter()
            .map(move |class| (class, self.get(class)))
    }

    /// Whether nothing was counted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_scan_stats_starts_at_zero() {
        let snapshot = ScanStats::new().snapshot();
        assert_eq!(snapshot, StatsSnapshot::default());
        assert!(snapshot.is_empty());
        assert!(snapshot.iter().all(|(_, count)| count == 0));
    }

    #[test]
    fn test_scan_stats_increment_counts_per_class() {
        let stats = ScanStats::new();
        stats.increment(OutcomeClass::Success);
        stats.increment(OutcomeClass::Success);
        stats.increment(OutcomeClass::Timeout);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.success, 2);
        assert_eq!(snapshot.timeout, 1);
        assert_eq!(snapshot.get(OutcomeClass::ClientError), 0);
        assert_eq!(snapshot.total(), 3);
    }

    #[test]
    fn test_scan_stats_thread_safe() {
        use std::thread;

        let stats = Arc::new(ScanStats::new());
        let mut handles = Vec::new();

        for worker in 0..8 {
            let stats = Arc::clone(&stats);
            handles.push(thread::spawn(move || {
                for i in 0..125 {
                    let class = OutcomeClass::ALL[(worker + i) % OutcomeClass::ALL.len()];
                    stats.increment(class);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(stats.snapshot().total(), 1000);
    }

    #[test]
    fn test_snapshot_iter_follows_summary_order() {
        let labels: Vec<_> = StatsSnapshot::default()
            .iter()
            .map(|(class, _)| class.label())
            .collect();
        assert_eq!(
            labels,
            vec![
                "[100-199]",
                "[200-299]",
                "[300-399]",
                "[400-499]",
                "[500-599]",
                "[ERROR]",
                "[TIMEOUT]"
            ]
        );
    }

    #[test]
    fn test_snapshot_serializes_with_class_names() {
        let stats = ScanStats::new();
        stats.increment(OutcomeClass::ClientError);
        let json = serde_json::to_value(stats.snapshot()).unwrap();
        assert_eq!(json["client_error"], 1);
        assert_eq!(json["transport_error"], 0);
    }
}
