//! Validated article URLs.
//!
//! An [`ArticleUrl`] keeps the caller's exact text next to the parsed form. The
//! text is the record's identity and its last-resort title, so it is never
//! re-serialized through [`Url`] (which would, for instance, append a trailing
//! slash to `https://example.com`).

use std::fmt;

use url::Url;

use crate::{LumpyError, Result};

/// An absolute http(s) URL with a host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleUrl {
    raw: String,
    parsed: Url,
}

impl ArticleUrl {
    /// Validates `input` without touching the network.
    ///
    /// # Errors
    ///
    /// Returns [`LumpyError::InvalidUrl`] for relative URLs, non-http(s)
    /// schemes, and URLs without a host.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lumpy_core::ArticleUrl;
    ///
    /// let url = ArticleUrl::parse("https://example.com/post").unwrap();
    /// assert_eq!(url.hostname(), "example.com");
    /// assert!(ArticleUrl::parse("example.com/post").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self> {
        let parsed = Url::parse(input).map_err(|e| LumpyError::invalid_url(input, e.to_string()))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(LumpyError::invalid_url(
                input,
                format!("unsupported scheme {:?}, expected http or https", parsed.scheme()),
            ));
        }

        match parsed.host_str() {
            Some(host) if !host.is_empty() => {}
            _ => return Err(LumpyError::invalid_url(input, "URL has no host")),
        }

        Ok(Self { raw: input.to_string(), parsed })
    }

    /// The URL exactly as the caller supplied it.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The parsed URL.
    pub fn url(&self) -> &Url {
        &self.parsed
    }

    /// Hostname as a WHATWG URL parser reports it (lowercased, punycode,
    /// IPv6 in brackets).
    pub fn hostname(&self) -> &str {
        self.parsed.host_str().unwrap_or_default()
    }
}

impl fmt::Display for ArticleUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
