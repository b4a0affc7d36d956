//! Page fetching over HTTP.
//!
//! A single GET with a bounded timeout and a browser-like header set: plenty
//! of sites answer non-browser clients with 403s or bot challenges. There is
//! no retry; the first failure is classified and returned.

use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Response};
use url::Url;

use crate::{ArticleUrl, FetchFailure, LumpyError, Result};

/// Desktop Chrome on Windows.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// HTTP client configuration for fetching web pages.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds, covering connect, headers and body.
    pub timeout: u64,
    /// User-Agent header value.
    pub user_agent: String,
    /// Accept header value.
    pub accept: String,
    /// Accept-Language header value.
    pub accept_language: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: 10,
            user_agent: BROWSER_USER_AGENT.to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8".to_string(),
            accept_language: "en-US,en;q=0.5".to_string(),
        }
    }
}

/// A fetched page, before any parsing.
#[derive(Debug, Clone)]
pub struct RawPage {
    /// Decoded response body.
    pub body: String,
    /// URL after redirects; base for resolving relative links.
    pub final_url: Url,
    /// HTTP status of the final response.
    pub status: u16,
    /// Declared `Content-Type`, if any.
    pub content_type: Option<String>,
}

/// Reusable HTTP fetcher.
///
/// The underlying [`Client`] pools connections, so clone or share one
/// `Fetcher` instead of building one per request.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    timeout: u64,
}

impl Fetcher {
    /// Builds a fetcher with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LumpyError::Fetch`] with [`FetchFailure::Request`] when a
    /// header value is invalid or the TLS backend cannot be initialised.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let headers = browser_headers(config).map_err(|reason| config_error(&reason))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .default_headers(headers)
            .build()
            .map_err(|e| config_error(&e.to_string()))?;

        Ok(Self { client, timeout: config.timeout })
    }

    /// Fetches `url` once.
    ///
    /// Non-2xx responses are errors carrying the status code; they are never
    /// turned into an empty page.
    #[tracing::instrument(level = "debug", skip(self), fields(url = %url))]
    pub async fn fetch(&self, url: &ArticleUrl) -> Result<RawPage> {
        let response = self
            .client
            .get(url.url().clone())
            .send()
            .await
            .map_err(|e| self.classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "non-success response");
            return Err(LumpyError::Fetch {
                url: url.as_str().to_string(),
                status: Some(status.as_u16()),
                failure: FetchFailure::Status {
                    code: status.as_u16(),
                    reason: status.canonical_reason().map(str::to_string),
                },
            });
        }

        self.read_page(url, response).await
    }

    async fn read_page(&self, url: &ArticleUrl, response: Response) -> Result<RawPage> {
        let final_url = response.url().clone();
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.text().await.map_err(|e| LumpyError::Fetch {
            url: url.as_str().to_string(),
            status: Some(status),
            failure: if e.is_timeout() {
                FetchFailure::Timeout { secs: self.timeout }
            } else {
                FetchFailure::Body(root_cause(&e))
            },
        })?;

        tracing::debug!(status, bytes = body.len(), final_url = %final_url, "fetched page");

        Ok(RawPage { body, final_url, status, content_type })
    }

    fn classify(&self, url: &ArticleUrl, err: reqwest::Error) -> LumpyError {
        let failure = if err.is_timeout() {
            FetchFailure::Timeout { secs: self.timeout }
        } else if err.is_connect() {
            FetchFailure::Connect(root_cause(&err))
        } else if err.is_body() || err.is_decode() {
            FetchFailure::Body(root_cause(&err))
        } else {
            FetchFailure::Request(root_cause(&err))
        };

        LumpyError::Fetch { url: url.as_str().to_string(), status: err.status().map(|s| s.as_u16()), failure }
    }
}

/// Headers a desktop browser sends on a top-level navigation.
fn browser_headers(config: &FetchConfig) -> std::result::Result<HeaderMap, String> {
    let value = |s: &str| HeaderValue::from_str(s).map_err(|e| format!("invalid header value {:?}: {}", s, e));

    let mut headers = HeaderMap::new();
    headers.insert(header::USER_AGENT, value(&config.user_agent)?);
    headers.insert(header::ACCEPT, value(&config.accept)?);
    headers.insert(header::ACCEPT_LANGUAGE, value(&config.accept_language)?);
    headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate, br"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(header::UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    Ok(headers)
}

fn config_error(reason: &str) -> LumpyError {
    LumpyError::Fetch {
        url: String::new(),
        status: None,
        failure: FetchFailure::Request(format!("invalid fetch configuration: {}", reason)),
    }
}

/// Innermost error message; reqwest's own Display is just "error sending request".
fn root_cause(err: &(dyn std::error::Error + 'static)) -> String {
    let mut current = err;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout, 10);
        assert!(config.user_agent.contains("Chrome"));
        assert!(config.accept.starts_with("text/html"));
    }

    #[test]
    fn test_browser_headers_complete() {
        let headers = browser_headers(&FetchConfig::default()).unwrap();
        for name in [
            header::USER_AGENT,
            header::ACCEPT,
            header::ACCEPT_LANGUAGE,
            header::ACCEPT_ENCODING,
            header::CONNECTION,
            header::UPGRADE_INSECURE_REQUESTS,
        ] {
            assert!(headers.contains_key(&name), "missing {}", name);
        }
        assert_eq!(headers[header::ACCEPT_ENCODING], "gzip, deflate, br");
    }

    #[test]
    fn test_invalid_user_agent_rejected() {
        let config = FetchConfig { user_agent: "bad\nagent".to_string(), ..Default::default() };
        assert!(Fetcher::new(&config).is_err());
    }

    #[test]
    fn test_root_cause_walks_sources() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "connection reset by peer");
        assert_eq!(root_cause(&io), "connection reset by peer");
    }
}
