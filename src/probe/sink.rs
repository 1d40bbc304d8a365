//! Append-only destinations for successfully reached URLs.
//!
//! The engine hands every 2xx URL to a [`SuccessSink`] exactly once. Sink
//! failures never abort a scan: [`DegradingSink`] reports the first failure
//! and stops persisting for the rest of the run.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use thiserror::Error;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

/// Errors from persisting successful URLs.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Creating, opening or writing the result file failed.
    #[error("IO error writing results to {path}: {source}")]
    Io {
        /// The result file (or its directory).
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl SinkError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Receives one call per successfully reached URL.
#[async_trait]
pub trait SuccessSink: Send + Sync + fmt::Debug {
    /// Persists `url` as one logical record.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] when the record could not be written.
    async fn append(&self, url: &str) -> Result<(), SinkError>;
}

/// Discards everything. Used when no output file is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

#[async_trait]
impl SuccessSink for NullSink {
    async fn append(&self, _url: &str) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Appends one URL per line to a text file.
///
/// Writes are serialized through a mutex so concurrent workers never
/// interleave partial lines.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    file: Mutex<File>,
    write_failed: AtomicBool,
}

impl FileSink {
    /// Opens `path` for appending, creating it and its parent directory on demand.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Io`] if the directory or file cannot be created.
    #[instrument(level = "debug", fields(path = %path.display()))]
    pub async fn create(path: &Path) -> Result<Self, SinkError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SinkError::io(parent, e))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|e| SinkError::io(path, e))?;

        debug!("result file ready");
        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
            write_failed: AtomicBool::new(false),
        })
    }

    /// The file being appended to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether any append failed, i.e. the file may be missing URLs.
    #[must_use]
    pub fn is_incomplete(&self) -> bool {
        self.write_failed.load(Ordering::SeqCst)
    }

    async fn write_line(&self, url: &str) -> std::io::Result<()> {
        let line = format!("{url}\n");
        let mut file = self.file.lock().await;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }
}

#[async_trait]
impl SuccessSink for FileSink {
    async fn append(&self, url: &str) -> Result<(), SinkError> {
        self.write_line(url).await.map_err(|e| {
            self.write_failed.store(true, Ordering::SeqCst);
            SinkError::io(&self.path, e)
        })
    }
}

/// Wraps a sink so that the first failure is reported once and persistence
/// is switched off for the remainder of the scan.
#[derive(Debug)]
pub struct DegradingSink {
    inner: Arc<dyn SuccessSink>,
    disabled: AtomicBool,
}

impl DegradingSink {
    /// Wraps `inner`.
    #[must_use]
    pub fn new(inner: Arc<dyn SuccessSink>) -> Self {
        Self {
            inner,
            disabled: AtomicBool::new(false),
        }
    }

    /// Whether a failure has switched persistence off.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }

    /// Forwards `url` to the wrapped sink. Returns whether it was persisted.
    pub async fn append(&self, url: &str) -> bool {
        if self.is_disabled() {
            return false;
        }
        match self.inner.append(url).await {
            Ok(()) => true,
            Err(error) => {
                if !self.disabled.swap(true, Ordering::SeqCst) {
                    warn!(
                        url = %url,
                        error = %error,
                        "persisting successful URLs failed; continuing without persistence"
                    );
                }
                false
            }
        }
    }
}
