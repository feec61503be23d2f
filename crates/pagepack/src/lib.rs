//! PagePack - offline web page bundling library
//!
//! Given a listing page that links out to detail pages, PagePack archives
//! each detail page into a self-contained, browsable offline bundle: the
//! page's HTML plus every local stylesheet and image it depends on, with
//! references rewritten to point inside the bundle and outbound hyperlinks
//! neutralized so nothing dangles offline.
//!
//! ## Pipeline
//!
//! [`scan_listing`] parses a listing table into [`ListingRow`]s; for each
//! row, [`archive_page`] fetches the detail page, runs the asset localizer
//! ([`localize`]) into a fresh [`WorkDir`], and packages the result with
//! [`create_predictable_zip`]. [`archive_listing`] drives the whole run,
//! skipping rows whose pages cannot be fetched.
//!
//! Network access goes through the [`Fetch`] trait; [`HttpFetch`] is the
//! reqwest-backed implementation, and tests substitute their own.

mod archive;
mod error;
mod fetch;
mod listing;
mod localize;
mod package;
mod urls;

#[cfg(test)]
pub(crate) mod testutil;

pub use archive::{
    archive_listing, archive_page, ContentNode, ListingArchive, PageBundle, SkippedRow, WorkDir,
};
pub use error::{ArchiveError, FetchError};
pub use fetch::{download_into, Fetch, HttpFetch};
pub use listing::{parse_listing, scan_listing, ListingRow};
pub use localize::{localize, Localized};
pub use package::create_predictable_zip;
pub use urls::{normalize, site_origin, source_id};

/// Default User-Agent string
pub const DEFAULT_USER_AGENT: &str = "PagePack/1.0";
