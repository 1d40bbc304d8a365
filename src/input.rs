//! Loading the URL list handed to the probe engine.
//!
//! Lines are trimmed and blank lines dropped. Duplicates are removed keeping
//! the first occurrence, and lines without an `http://` or `https://` prefix
//! get `https://` prepended.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, instrument};

const DEFAULT_SCHEME: &str = "https://";

/// Errors from reading the input file.
#[derive(Debug, Error)]
pub enum InputError {
    /// The input file does not exist.
    #[error("{} Not found.", path.display())]
    NotFound {
        /// The missing file.
        path: PathBuf,
    },

    /// The input file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// The unreadable file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Reads `path` and returns its normalized, deduplicated URLs in file order.
///
/// # Errors
///
/// Returns [`InputError::NotFound`] when the file is missing and
/// [`InputError::Io`] for any other read failure (including invalid UTF-8).
#[instrument(level = "debug", fields(path = %path.display()))]
pub fn load_url_file(path: &Path) -> Result<Vec<String>, InputError> {
    let text = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            InputError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            InputError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let urls = parse_url_list(&text);
    debug!(urls = urls.len(), "loaded input file");
    Ok(urls)
}

/// Normalizes and deduplicates newline-separated URLs.
#[must_use]
pub fn parse_url_list(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(normalize_url)
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// Prepends `https://` unless the URL already names `http` or `https`.
#[must_use]
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("https://") || trimmed.starts_with("http://") {
        trimmed.to_string()
    } else {
        format!("{DEFAULT_SCHEME}{trimmed}")
    }
}
