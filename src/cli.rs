//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use statuscan_core::probe::DEFAULT_USER_AGENT;
use statuscan_core::{
    Backoff, DEFAULT_CONCURRENCY, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT, ScanConfig,
};

/// A simple command-line utility to check website HTTP status codes.
///
/// Reads one URL per line, probes each concurrently and prints the status of
/// every URL followed by a count per status class.
#[derive(Parser, Debug)]
#[command(name = "statuscan")]
#[command(author, version, about)]
pub struct Args {
    /// File containing the URLs to scan, one per line
    #[arg(short = 'u', long = "url", value_name = "FILE")]
    pub url: Option<PathBuf>,

    /// Save reachable (2xx) URLs to this file inside the output directory
    #[arg(short = 'o', long, value_name = "NAME")]
    pub output: Option<PathBuf>,

    /// Directory for the --output file (created if missing)
    #[arg(long, default_value = "result")]
    pub output_dir: PathBuf,

    /// Number of times to retry a URL after a 5xx response or timeout (0-20)
    #[arg(short = 'r', long, default_value_t = DEFAULT_MAX_RETRIES, value_parser = clap::value_parser!(u32).range(0..=20))]
    pub retry: u32,

    /// Maximum number of requests in flight (1-1000)
    #[arg(short = 'c', long, default_value_t = DEFAULT_CONCURRENCY as u16, value_parser = clap::value_parser!(u16).range(1..=1000))]
    pub concurrency: u16,

    /// Number of worker tasks (defaults to --concurrency)
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..=1000))]
    pub workers: Option<u16>,

    /// Timeout in seconds for each request (1-3600)
    #[arg(short = 't', long, default_value_t = DEFAULT_TIMEOUT.as_secs(), value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub timeout: u64,

    /// Do not follow HTTP redirects (301, 302, etc)
    #[arg(long)]
    pub no_redirect: bool,

    /// Fixed delay in milliseconds between retries of the same URL (0 retries immediately)
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub backoff_ms: u64,

    /// User-Agent header sent with every request
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Print only the final counts, as JSON
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress everything except errors and results
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Maps the flags onto a [`ScanConfig`].
    pub fn scan_config(&self) -> ScanConfig {
        let backoff = if self.backoff_ms == 0 {
            Backoff::None
        } else {
            Backoff::Fixed(Duration::from_millis(self.backoff_ms))
        };

        ScanConfig {
            retry: self.retry,
            concurrency: usize::from(self.concurrency),
            workers: self.workers.map(usize::from),
            timeout: Duration::from_secs(self.timeout),
            follow_redirects: !self.no_redirect,
            backoff,
            user_agent: self.user_agent.clone(),
        }
    }

    /// Where successful URLs are persisted, if requested.
    pub fn output_path(&self) -> Option<PathBuf> {
        self.output.as_ref().map(|name| self.output_dir.join(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let args = Args::try_parse_from(["statuscan"]).unwrap();
        assert!(args.url.is_none());
        assert!(args.output.is_none());
        assert_eq!(args.retry, 2);
        assert_eq!(args.concurrency, 10);
        assert_eq!(args.timeout, 20);
        assert!(!args.no_redirect);
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
    }

    #[test]
    fn test_cli_short_flags() {
        let args = Args::try_parse_from([
            "statuscan", "-u", "urls.txt", "-o", "ok.txt", "-r", "5", "-c", "50", "-t", "3",
        ])
        .unwrap();
        assert_eq!(args.url, Some(PathBuf::from("urls.txt")));
        assert_eq!(args.output, Some(PathBuf::from("ok.txt")));
        assert_eq!(args.retry, 5);
        assert_eq!(args.concurrency, 50);
        assert_eq!(args.timeout, 3);
    }

    #[test]
    fn test_cli_output_path_joins_output_dir() {
        let args = Args::try_parse_from(["statuscan", "-o", "ok.txt"]).unwrap();
        assert_eq!(args.output_path(), Some(PathBuf::from("result/ok.txt")));

        let args =
            Args::try_parse_from(["statuscan", "-o", "ok.txt", "--output-dir", "out"]).unwrap();
        assert_eq!(args.output_path(), Some(PathBuf::from("out/ok.txt")));

        let args = Args::try_parse_from(["statuscan"]).unwrap();
        assert_eq!(args.output_path(), None);
    }

    #[test]
    fn test_cli_retry_zero_allowed() {
        let args = Args::try_parse_from(["statuscan", "-r", "0"]).unwrap();
        assert_eq!(args.retry, 0);
    }

    #[test]
    fn test_cli_retry_over_max_rejected() {
        let err = Args::try_parse_from(["statuscan", "-r", "21"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_concurrency_zero_rejected() {
        let err = Args::try_parse_from(["statuscan", "-c", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_concurrency_over_max_rejected() {
        let err = Args::try_parse_from(["statuscan", "-c", "1001"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_timeout_zero_rejected() {
        let err = Args::try_parse_from(["statuscan", "-t", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let err = Args::try_parse_from(["statuscan", "--invalid-flag"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let err = Args::try_parse_from(["statuscan", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["statuscan", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_scan_config_from_defaults() {
        let config = Args::try_parse_from(["statuscan"]).unwrap().scan_config();
        assert_eq!(config, ScanConfig::default());
    }

    #[test]
    fn test_scan_config_maps_flags() {
        let args = Args::try_parse_from([
            "statuscan",
            "--no-redirect",
            "--workers",
            "32",
            "-c",
            "8",
            "--backoff-ms",
            "250",
            "--user-agent",
            "probe/1.0",
        ])
        .unwrap();
        let config = args.scan_config();
        assert!(!config.follow_redirects);
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.worker_count(), 32);
        assert_eq!(config.backoff, Backoff::Fixed(Duration::from_millis(250)));
        assert_eq!(config.user_agent, "probe/1.0");
    }
}
