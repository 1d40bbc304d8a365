//! CLI entry point for the statuscan tool.

use std::io::{self, IsTerminal};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use statuscan_core::probe::{HttpClient, SuccessSink};
use statuscan_core::{FileSink, InputError, NullSink, ProbeEngine, load_url_file};
use tracing::{debug, info, warn};

mod cli;
mod output;

use cli::Args;
use output::LineTarget;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (warn).
    // stdout carries results, so logs go to stderr.
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let Some(input_path) = args.url.as_deref() else {
        Args::command().print_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    let started = Instant::now();

    let urls = match load_url_file(input_path) {
        Ok(urls) => urls,
        Err(error @ InputError::NotFound { .. }) => {
            println!("{error}");
            return Ok(ExitCode::FAILURE);
        }
        Err(error) => return Err(error.into()),
    };

    if urls.is_empty() {
        println!("{} Empty", input_path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let config = args.scan_config();
    let engine = ProbeEngine::new(&config)?;
    let client = Arc::new(HttpClient::new(&config.client_options())?);

    let file_sink = match args.output_path() {
        Some(path) => match FileSink::create(&path).await {
            Ok(sink) => Some(Arc::new(sink)),
            Err(error) => {
                warn!(error = %error, "cannot open result file; continuing without persistence");
                None
            }
        },
        None => None,
    };
    let sink: Arc<dyn SuccessSink> = match &file_sink {
        Some(file_sink) => file_sink.clone(),
        None => Arc::new(NullSink),
    };

    info!(urls = urls.len(), "Statuscan starting");

    // With --json, stdout carries only the snapshot.
    let (target, show_progress) = if args.json {
        (LineTarget::Stderr, false)
    } else {
        (LineTarget::Stdout, !args.quiet && io::stderr().is_terminal())
    };
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let printer = output::spawn_event_printer(rx, urls.len(), target, show_progress);
    let stats = engine.run(urls, client, sink, Some(tx)).await?;

    if let Err(error) = printer.await {
        warn!(error = %error, "output task failed");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        let saved_to = output::saved_location(file_sink.as_deref());
        println!(
            "{}",
            output::render_summary(&stats, saved_to, started.elapsed())
        );
    }

    Ok(ExitCode::SUCCESS)
}
