//! Fetch and download primitives
//!
//! [`Fetch`] is the seam between the archiving pipeline and the network:
//! the listing scanner, the asset localizer and the orchestrator all take
//! `&dyn Fetch`, so tests can substitute in-memory implementations.
//! [`HttpFetch`] is the reqwest-backed production implementation.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;

use crate::error::FetchError;
use crate::DEFAULT_USER_AGENT;

/// Connect timeout for all requests
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Total body read deadline
///
/// Unlike a text-fetching tool that can return truncated content, a
/// truncated asset is corrupt, so hitting the deadline is a hard error.
const BODY_TIMEOUT: Duration = Duration::from_secs(60);

/// Network fetch primitive
///
/// A fetch either yields the complete response body or fails; there is no
/// partial-success state and no retry policy at this level.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetch the full body behind `url`
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError>;
}

/// Reqwest-backed [`Fetch`] implementation
///
/// Holds one shared client; non-2xx statuses are fetch failures.
pub struct HttpFetch {
    client: reqwest::Client,
}

impl HttpFetch {
    /// Build a fetcher with the default User-Agent and timeouts
    pub fn new() -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(FetchError::ClientBuild)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetch {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(FetchError::InvalidUrlScheme);
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        read_body_within(response, BODY_TIMEOUT).await
    }
}

/// Read the full response body, failing if the deadline passes
async fn read_body_within(
    response: reqwest::Response,
    limit: Duration,
) -> Result<Bytes, FetchError> {
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    let deadline = tokio::time::Instant::now() + limit;

    loop {
        tokio::select! {
            chunk = stream.next() => {
                match chunk {
                    Some(Ok(bytes)) => body.extend_from_slice(&bytes),
                    Some(Err(e)) => return Err(FetchError::from_reqwest(e)),
                    None => return Ok(Bytes::from(body)),
                }
            }
            _ = tokio::time::sleep_until(deadline) => {
                return Err(FetchError::BodyTimeout);
            }
        }
    }
}

/// Download `url` into `dir` and return the dir-relative path written
///
/// `filename` overrides the name derived from the URL's last path segment;
/// `subpath` nests the file under a subdirectory of `dir`. Nothing is
/// written when the fetch fails. The returned path is what callers splice
/// into rewritten `href`/`src` attributes.
pub async fn download_into(
    fetcher: &dyn Fetch,
    url: &str,
    dir: &Path,
    filename: Option<&str>,
    subpath: Option<&str>,
) -> Result<String, FetchError> {
    let bytes = fetcher.fetch(url).await?;

    let name = match filename {
        Some(name) => name.to_string(),
        None => filename_for(url),
    };
    let relative = match subpath {
        Some(sub) => format!("{sub}/{name}"),
        None => name,
    };

    let target = dir.join(&relative);
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&target, &bytes).await?;

    debug!(url, path = %relative, bytes = bytes.len(), "downloaded");
    Ok(relative)
}

/// Derive a safe filename from the URL's last path segment
fn filename_for(url: &str) -> String {
    let segment = url::Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back())
                .map(str::to_string)
        })
        .unwrap_or_default();

    let sanitized: String = segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.is_empty() || sanitized.chars().all(|c| c == '.') {
        "download".to_string()
    } else {
        sanitized
    }
}
