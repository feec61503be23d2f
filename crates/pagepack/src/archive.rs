//! Page Archive Orchestrator
//!
//! Drives one page end to end: fetch the detail page, localize its assets
//! into a fresh working directory, write the rewritten page as
//! `index.html`, and package the directory into a predictable zip. Rows
//! are processed strictly sequentially; a row whose page cannot be fetched
//! is skipped and recorded, never aborting the run.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use tracing::{info, warn};

use crate::error::ArchiveError;
use crate::fetch::Fetch;
use crate::listing::{scan_listing, ListingRow};
use crate::localize::localize;
use crate::package::create_predictable_zip;
use crate::urls::{site_origin, source_id};

/// A page's working directory
///
/// Exclusively owned by the orchestrator/localizer pair while the page is
/// processed, then consumed exactly once by
/// [`create_predictable_zip`](crate::package::create_predictable_zip) —
/// the move makes reuse after hand-off a compile error. Dropping it
/// removes the directory.
pub struct WorkDir {
    dir: TempDir,
}

impl WorkDir {
    /// Create a fresh working directory
    pub fn new() -> Result<Self, ArchiveError> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    /// Path of the directory
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// Finished bundle descriptor handed to the external tree-builder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageBundle {
    /// Path of the packaged zip archive
    pub archive_path: PathBuf,
    /// Row title from the listing
    pub title: String,
    /// Thumbnail URL from the listing, when one passed the suffix filter
    pub thumbnail_url: Option<String>,
    /// Identifier derived from the detail URL's last path segment
    pub source_id: String,
}

/// A row whose page could not be processed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedRow {
    pub title: String,
    pub detail_url: String,
    pub reason: String,
}

/// Outcome of archiving one listing
#[derive(Debug, Serialize, Deserialize)]
pub struct ListingArchive {
    /// Bundles in listing document order
    pub bundles: Vec<PageBundle>,
    /// Rows skipped because their page could not be fetched or parsed
    pub skipped: Vec<SkippedRow>,
}

/// Node kinds consumed by the external tree-builder
///
/// The tree-builder assembles these into a presentable hierarchy by
/// matching on the variant; building and uploading that hierarchy is not
/// this crate's concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentNode {
    /// A grouping, e.g. one listing
    Topic {
        title: String,
        source_id: String,
        children: Vec<ContentNode>,
    },
    /// A standalone document referenced by URL
    Document {
        title: String,
        source_id: String,
        url: String,
    },
    /// A packaged offline page bundle
    HtmlBundle(PageBundle),
}

/// Archive one listing row into a [`PageBundle`]
///
/// The detail URL's origin is used to resolve the page's local asset
/// references. Fails with [`ArchiveError::PageFetch`] when the primary
/// document cannot be fetched.
pub async fn archive_page(
    fetcher: &dyn Fetch,
    row: &ListingRow,
) -> Result<PageBundle, ArchiveError> {
    let bytes = fetcher
        .fetch(&row.detail_url)
        .await
        .map_err(|source| ArchiveError::PageFetch {
            url: row.detail_url.clone(),
            source,
        })?;
    let html = String::from_utf8_lossy(&bytes);
    let origin = site_origin(&row.detail_url)?;

    let work = WorkDir::new()?;
    let localized = localize(fetcher, &html, &row.detail_url, &origin, work.path()).await?;
    tokio::fs::write(work.path().join("index.html"), localized.html.as_bytes()).await?;

    info!(
        title = %row.title,
        assets = localized.assets_downloaded,
        "localized page"
    );

    let archive_path = create_predictable_zip(work)?;
    Ok(PageBundle {
        archive_path,
        title: row.title.clone(),
        thumbnail_url: row.thumbnail_url.clone(),
        source_id: source_id(&row.detail_url),
    })
}

/// Scan a listing and archive every row, one at a time, in document order
///
/// Rows whose page cannot be fetched (or whose fetched document is
/// unparsable) are logged, recorded in the skipped list and passed over;
/// listing-level failures abort the whole call.
pub async fn archive_listing(
    fetcher: &dyn Fetch,
    listing_url: &str,
) -> Result<ListingArchive, ArchiveError> {
    let rows = scan_listing(fetcher, listing_url).await?;
    info!(listing = listing_url, rows = rows.len(), "scanned listing");

    let mut bundles = Vec::new();
    let mut skipped = Vec::new();
    for row in &rows {
        match archive_page(fetcher, row).await {
            Ok(bundle) => bundles.push(bundle),
            Err(err @ (ArchiveError::PageFetch { .. } | ArchiveError::UnparsableDocument(_))) => {
                warn!(title = %row.title, url = %row.detail_url, error = %err, "skipping row");
                skipped.push(SkippedRow {
                    title: row.title.clone(),
                    detail_url: row.detail_url.clone(),
                    reason: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        }
    }

    Ok(ListingArchive { bundles, skipped })
}
