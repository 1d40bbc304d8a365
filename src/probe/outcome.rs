//! Outcome classification for single probe attempts.
//!
//! Every completed URL lands in exactly one [`OutcomeClass`]. The mapping from
//! an [`AttemptResult`] to a class is a pure function ([`classify`]), so the
//! engine and its tests can rely on it being call-order independent.
//!
//! | Attempt result            | Class              |
//! |---------------------------|--------------------|
//! | status 100..=199          | `Informational`    |
//! | status 200..=299          | `Success`          |
//! | status 300..=399          | `Redirect`         |
//! | status 400..=499          | `ClientError`      |
//! | status 500..=599          | `ServerError`      |
//! | any other status          | `TransportError`   |
//! | `FailureTag::Timeout`     | `Timeout`          |
//! | `FailureTag::Transport`   | `TransportError`   |

use std::fmt;

use serde::Serialize;

/// Why an attempt produced no status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureTag {
    /// The request exceeded its wall-clock timeout.
    Timeout,
    /// Connection refused, DNS failure, TLS failure, malformed response, etc.
    Transport,
}

/// Result of one HTTP attempt. Lives only inside the attempt loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttemptResult {
    /// The server answered with this status code.
    Status(u16),
    /// No response was received.
    Failed(FailureTag),
}

impl AttemptResult {
    /// Returns the status code when the attempt got a response.
    #[must_use]
    pub fn status(self) -> Option<u16> {
        match self {
            Self::Status(code) => Some(code),
            Self::Failed(_) => None,
        }
    }
}

/// Mutually exclusive buckets a probed URL can fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeClass {
    /// 1xx
    Informational,
    /// 2xx
    Success,
    /// 3xx
    Redirect,
    /// 4xx
    ClientError,
    /// 5xx
    ServerError,
    /// Request timed out.
    Timeout,
    /// Any other failure to obtain a valid response.
    TransportError,
}

impl OutcomeClass {
    /// All classes in summary order (status ranges first, then failures).
    pub const ALL: [Self; 7] = [
        Self::Informational,
        Self::Success,
        Self::Redirect,
        Self::ClientError,
        Self::ServerError,
        Self::TransportError,
        Self::Timeout,
    ];

    /// Stable array slot used by the counters in [`super::ScanStats`].
    #[must_use]
    pub(crate) fn index(self) -> usize {
        match self {
            Self::Informational => 0,
            Self::Success => 1,
            Self::Redirect => 2,
            Self::ClientError => 3,
            Self::ServerError => 4,
            Self::Timeout => 5,
            Self::TransportError => 6,
        }
    }

    /// Whether a fresh attempt might change the answer.
    #[must_use]
    pub fn is_transient(self) -> bool {
        matches!(self, Self::ServerError | Self::Timeout)
    }

    /// Summary label, e.g. `[200-299]` or `[TIMEOUT]`.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Informational => "[100-199]",
            Self::Success => "[200-299]",
            Self::Redirect => "[300-399]",
            Self::ClientError => "[400-499]",
            Self::ServerError => "[500-599]",
            Self::Timeout => "[TIMEOUT]",
            Self::TransportError => "[ERROR]",
        }
    }
}

impl fmt::Display for OutcomeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Informational => "informational",
            Self::Success => "success",
            Self::Redirect => "redirect",
            Self::ClientError => "client_error",
            Self::ServerError => "server_error",
            Self::Timeout => "timeout",
            Self::TransportError => "transport_error",
        };
        f.write_str(name)
    }
}

/// Maps an attempt result onto its outcome class.
#[must_use]
pub fn classify(result: AttemptResult) -> OutcomeClass {
    match result {
        AttemptResult::Status(code) => classify_status(code),
        AttemptResult::Failed(FailureTag::Timeout) => OutcomeClass::Timeout,
        AttemptResult::Failed(FailureTag::Transport) => OutcomeClass::TransportError,
    }
}

fn classify_status(code: u16) -> OutcomeClass {
    match code {
        100..=199 => OutcomeClass::Informational,
        200..=299 => OutcomeClass::Success,
        300..=399 => OutcomeClass::Redirect,
        400..=499 => OutcomeClass::ClientError,
        500..=599 => OutcomeClass::ServerError,
        // reqwest accepts codes up to 999; anything outside 1xx-5xx is not a usable answer
        _ => OutcomeClass::TransportError,
    }
}
