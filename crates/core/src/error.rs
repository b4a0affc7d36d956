//! Error types for the extraction pipeline.
//!
//! Failures only originate before extraction proper: an unusable URL, a failed
//! fetch, or a body that is not an HTML document. Once a document is parsed the
//! two-stage extractor always yields a record, so [`LumpyError`] has no variant
//! for "no content".
//!
//! # Example
//!
//! ```rust
//! use lumpy_core::{ArticleUrl, LumpyError};
//!
//! match ArticleUrl::parse("not a url") {
//!     Err(LumpyError::InvalidUrl { url, .. }) => assert_eq!(url, "not a url"),
//!     _ => unreachable!(),
//! }
//! ```

use std::fmt;

use thiserror::Error;

/// Classified failure of a save attempt.
///
/// Every variant carries the offending URL so callers can echo it back to the
/// end user alongside [`LumpyError::cause`] and, for fetch failures, the HTTP
/// status.
#[derive(Error, Debug)]
pub enum LumpyError {
    /// The input is not an absolute http(s) URL.
    ///
    /// Raised before any network access.
    #[error("Invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Transport failure or non-success HTTP status.
    #[error("Failed to fetch {url}: {failure}")]
    Fetch { url: String, status: Option<u16>, failure: FetchFailure },

    /// The fetched body could not be treated as an HTML document.
    #[error("Failed to parse {url}: {reason}")]
    Parse { url: String, reason: String },
}

/// Underlying cause of a [`LumpyError::Fetch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// The request exceeded the configured timeout.
    Timeout { secs: u64 },
    /// The server answered with a non-2xx status.
    Status { code: u16, reason: Option<String> },
    /// DNS resolution or TCP/TLS connection failed, or the connection was reset.
    Connect(String),
    /// The response body could not be read.
    Body(String),
    /// Any other request error (redirect loop, invalid header, ...).
    Request(String),
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout { secs } => write!(f, "request timed out after {} seconds", secs),
            Self::Status { code, reason: Some(reason) } => write!(f, "server responded with {} {}", code, reason),
            Self::Status { code, reason: None } => write!(f, "server responded with {}", code),
            Self::Connect(msg) => write!(f, "connection failed: {}", msg),
            Self::Body(msg) => write!(f, "could not read response body: {}", msg),
            Self::Request(msg) => write!(f, "request failed: {}", msg),
        }
    }
}

impl LumpyError {
    /// The URL the failed attempt was made for.
    pub fn url(&self) -> &str {
        match self {
            Self::InvalidUrl { url, .. } | Self::Fetch { url, .. } | Self::Parse { url, .. } => url,
        }
    }

    /// HTTP status of the response, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Fetch { status, .. } => *status,
            _ => None,
        }
    }

    /// Short, human-readable cause without the URL prefix.
    pub fn cause(&self) -> String {
        match self {
            Self::InvalidUrl { reason, .. } | Self::Parse { reason, .. } => reason.clone(),
            Self::Fetch { failure, .. } => failure.to_string(),
        }
    }

    /// Stable machine-readable tag for the failure class.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidUrl { .. } => "invalid_url",
            Self::Fetch { .. } => "fetch_error",
            Self::Parse { .. } => "parse_error",
        }
    }

    pub(crate) fn invalid_url(url: &str, reason: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.to_string(), reason: reason.into() }
    }

    pub(crate) fn parse(url: &str, reason: impl Into<String>) -> Self {
        Self::Parse { url: url.to_string(), reason: reason.into() }
    }
}

/// Result type alias for LumpyError.
pub type Result<T> = std::result::Result<T, LumpyError>;
