//! Console output: per-URL lines, progress, and the final summary.

use std::fmt::Write as _;
use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use statuscan_core::{FileSink, ProbeEvent, StatsSnapshot};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

/// Stream that receives the per-URL lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineTarget {
    Stdout,
    /// Keeps stdout free for machine-readable output.
    Stderr,
}

impl LineTarget {
    fn print(self, event: &ProbeEvent) {
        match self {
            Self::Stdout => println!("{event}"),
            Self::Stderr => eprintln!("{event}"),
        }
    }
}

/// Prints one line per finished URL as events arrive.
///
/// When `show_progress` is set, a progress bar is drawn on stderr and URL
/// lines are printed above it.
pub(crate) fn spawn_event_printer(
    mut events: UnboundedReceiver<ProbeEvent>,
    total: usize,
    target: LineTarget,
    show_progress: bool,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let bar = show_progress.then(|| progress_bar(total));

        while let Some(event) = events.recv().await {
            match &bar {
                Some(bar) => {
                    bar.suspend(|| target.print(&event));
                    bar.inc(1);
                }
                None => target.print(&event),
            }
        }

        if let Some(bar) = bar {
            bar.finish_and_clear();
        }
    })
}

fn progress_bar(total: usize) -> ProgressBar {
    let bar = ProgressBar::new(u64::try_from(total).unwrap_or(u64::MAX));
    bar.set_style(
        ProgressStyle::with_template("{spinner} [{pos}/{len}] scanning... {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Path to report as saved, or `None` when nothing (or not everything) was written.
pub(crate) fn saved_location(sink: Option<&FileSink>) -> Option<&Path> {
    sink.filter(|sink| !sink.is_incomplete())
        .map(FileSink::path)
}

/// Renders the `RESULT :` table.
pub(crate) fn render_summary(
    stats: &StatsSnapshot,
    saved_to: Option<&Path>,
    elapsed: Duration,
) -> String {
    let mut out = String::from("\nRESULT : \n");
    for (class, count) in stats.iter() {
        let _ = writeln!(out, "{:<10} : {count}", class.label());
    }
    if let Some(path) = saved_to {
        let _ = writeln!(out, "saved on {}", path.display());
    }
    let _ = write!(out, "Total : {:.2} Seconds", elapsed.as_secs_f64());
    out
}
