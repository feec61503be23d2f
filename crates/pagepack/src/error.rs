//! Error types for PagePack

use thiserror::Error;

/// Transport-level failures raised by the fetch and download primitives
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL has invalid scheme
    #[error("invalid URL: must start with http:// or https://")]
    InvalidUrlScheme,

    /// Failed to build HTTP client
    #[error("failed to create HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    /// Failed to connect to server
    #[error("failed to connect to server")]
    Connect(#[source] reqwest::Error),

    /// Request timed out before the response arrived
    #[error("request timed out")]
    Timeout,

    /// Response body did not finish within the read deadline
    #[error("response body exceeded the read deadline")]
    BodyTimeout,

    /// Server answered with a non-success status
    #[error("server returned status {status} for {url}")]
    Status { url: String, status: u16 },

    /// Other request error
    #[error("request failed: {0}")]
    Request(String),

    /// Failed to write a downloaded file
    #[error("failed to write downloaded file")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// Create an error from a reqwest error
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_connect() {
            FetchError::Connect(err)
        } else {
            FetchError::Request(err.to_string())
        }
    }
}

/// Domain errors for the archiving pipeline
///
/// Propagation policy: per-asset failures never surface here (the localizer
/// downgrades them to `#` placeholders); a `PageFetch` or
/// `UnparsableDocument` error aborts one row; `NoTableFound` aborts one
/// listing; `MalformedUrl` aborts the unit it occurs in.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// URL is neither absolute nor relative to a known location
    #[error("malformed URL (relative to unknown location): {0}")]
    MalformedUrl(String),

    /// Fetched bytes could not be parsed as a document
    #[error("could not parse document fetched from {0}")]
    UnparsableDocument(String),

    /// Listing page has no table to scan
    #[error("no table found in listing page")]
    NoTableFound,

    /// A page's primary document could not be fetched
    #[error("failed to fetch page {url}")]
    PageFetch {
        url: String,
        #[source]
        source: FetchError,
    },

    /// Working directory I/O failed
    #[error("working directory I/O failed")]
    Io(#[from] std::io::Error),

    /// Packaging the working directory failed
    #[error("failed to package working directory")]
    Zip(#[from] zip::result::ZipError),
}
