//! URL normalization helpers
//!
//! Pages reference their assets with a mix of absolute, root-relative and
//! protocol-relative URLs. [`normalize`] maps all of them onto absolute
//! `http(s)` URLs against a site origin; everything else is rejected.

use url::Url;

use crate::error::ArchiveError;

/// Resolve a possibly-relative URL against a site origin
///
/// `//host/x` becomes `https://host/x`, `/x` becomes `{site_origin}/x`,
/// absolute `http(s)` URLs pass through unchanged. A URL relative to an
/// unknown location (no scheme, no leading slash) is a caller bug and
/// fails with [`ArchiveError::MalformedUrl`].
pub fn normalize(url: &str, site_origin: &str) -> Result<String, ArchiveError> {
    if let Some(rest) = url.strip_prefix("//") {
        return Ok(format!("https://{rest}"));
    }
    if url.starts_with('/') {
        return Ok(format!("{site_origin}{url}"));
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        return Ok(url.to_string());
    }
    Err(ArchiveError::MalformedUrl(url.to_string()))
}

/// Derive the origin (`scheme://host[:port]`) of an absolute URL
pub fn site_origin(url: &str) -> Result<String, ArchiveError> {
    let parsed = Url::parse(url).map_err(|_| ArchiveError::MalformedUrl(url.to_string()))?;
    Ok(parsed.origin().ascii_serialization())
}

/// Identifier for a page, taken from the last segment of its URL
pub fn source_id(url: &str) -> String {
    url.rsplit('/').next().unwrap_or(url).to_string()
}
