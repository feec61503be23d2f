//! Listing Scanner
//!
//! Parses a listing page's first table into an ordered sequence of rows,
//! each pointing at a detail page to archive, with an optional thumbnail.

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ArchiveError;
use crate::fetch::Fetch;
use crate::urls::{normalize, site_origin};

/// One row of a listing table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRow {
    /// Anchor text of the row's first cell
    pub title: String,
    /// Absolute URL of the detail page
    pub detail_url: String,
    /// Absolute thumbnail URL, kept only for `.jpg`/`.png` sources
    pub thumbnail_url: Option<String>,
}

/// Fetch a listing page and scan its first table
///
/// Finite and re-invocable; each call fetches and parses afresh. Fails
/// with [`ArchiveError::PageFetch`] when the listing itself cannot be
/// fetched and [`ArchiveError::NoTableFound`] when it has no table.
pub async fn scan_listing(
    fetcher: &dyn Fetch,
    listing_url: &str,
) -> Result<Vec<ListingRow>, ArchiveError> {
    let bytes = fetcher
        .fetch(listing_url)
        .await
        .map_err(|source| ArchiveError::PageFetch {
            url: listing_url.to_string(),
            source,
        })?;
    let html = String::from_utf8_lossy(&bytes);
    parse_listing(&html, listing_url)
}

/// Parse listing rows out of already-fetched HTML
///
/// Row URLs are normalized against the listing URL's origin. Rows with no
/// cells, or whose first cell has no linking anchor, are dropped silently;
/// document order is preserved and duplicates are kept.
pub fn parse_listing(html: &str, listing_url: &str) -> Result<Vec<ListingRow>, ArchiveError> {
    if html.trim().is_empty() {
        return Err(ArchiveError::UnparsableDocument(listing_url.to_string()));
    }
    let origin = site_origin(listing_url)?;

    let table_selector = Selector::parse("table").unwrap();
    let row_selector = Selector::parse("tr").unwrap();
    let cell_selector = Selector::parse("td").unwrap();
    let anchor_selector = Selector::parse("a").unwrap();
    let img_selector = Selector::parse("img").unwrap();

    let document = Html::parse_document(html);
    let table = document
        .select(&table_selector)
        .next()
        .ok_or(ArchiveError::NoTableFound)?;

    let mut rows = Vec::new();
    for row in table.select(&row_selector) {
        let cells: Vec<_> = row.select(&cell_selector).collect();
        if cells.is_empty() {
            continue;
        }
        let Some(anchor) = cells[0].select(&anchor_selector).next() else {
            continue;
        };
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };

        let detail_url = normalize(href, &origin)?;
        let title: String = anchor.text().collect();

        let thumbnail_url = cells
            .get(1)
            .and_then(|cell| cell.select(&img_selector).next())
            .and_then(|img| img.value().attr("src"))
            .map(|src| normalize(src, &origin))
            .transpose()?
            .filter(|url| url.ends_with(".jpg") || url.ends_with(".png"));

        debug!(title = %title, url = %detail_url, "scanned listing row");
        rows.push(ListingRow {
            title,
            detail_url,
            thumbnail_url,
        });
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "https://en.wikipedia.org/wiki/List_of_citrus_fruits";

    fn table(rows: &str) -> String {
        format!("<html><body><table>{rows}</table></body></html>")
    }

    #[test]
    fn test_rows_without_links_are_dropped_in_order() {
        let html = table(concat!(
            r#"<tr><td><a href="/wiki/One">One</a></td></tr>"#,
            r#"<tr><td>no link here</td></tr>"#,
            r#"<tr><td><a href="/wiki/Three">Three</a></td></tr>"#,
        ));

        let rows = parse_listing(&html, LISTING).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].title, "One");
        assert_eq!(rows[0].detail_url, "https://en.wikipedia.org/wiki/One");
        assert_eq!(rows[1].title, "Three");
    }

    #[test]
    fn test_rows_without_cells_are_dropped() {
        let html = table(concat!(
            r#"<tr><th>Header</th></tr>"#,
            r#"<tr><td><a href="/wiki/One">One</a></td></tr>"#,
        ));

        let rows = parse_listing(&html, LISTING).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_thumbnail_suffix_filter() {
        let html = table(concat!(
            r#"<tr><td><a href="/wiki/Png">Png</a></td><td><img src="/thumb/png.png"></td></tr>"#,
            r#"<tr><td><a href="/wiki/Svg">Svg</a></td><td><img src="/thumb/vector.svg"></td></tr>"#,
        ));

        let rows = parse_listing(&html, LISTING).unwrap();

        assert_eq!(
            rows[0].thumbnail_url.as_deref(),
            Some("https://en.wikipedia.org/thumb/png.png")
        );
        assert_eq!(rows[1].thumbnail_url, None);
    }

    #[test]
    fn test_missing_second_cell_means_no_thumbnail() {
        let html = table(r#"<tr><td><a href="/wiki/One">One</a></td></tr>"#);

        let rows = parse_listing(&html, LISTING).unwrap();
        assert_eq!(rows[0].thumbnail_url, None);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let html = table(concat!(
            r#"<tr><td><a href="/wiki/One">One</a></td></tr>"#,
            r#"<tr><td><a href="/wiki/One">One</a></td></tr>"#,
        ));

        let rows = parse_listing(&html, LISTING).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], rows[1]);
    }

    #[test]
    fn test_no_table_is_fatal() {
        let html = "<html><body><p>nothing tabular</p></body></html>";
        assert!(matches!(
            parse_listing(html, LISTING),
            Err(ArchiveError::NoTableFound)
        ));
    }

    #[test]
    fn test_empty_listing_is_unparsable() {
        assert!(matches!(
            parse_listing("", LISTING),
            Err(ArchiveError::UnparsableDocument(_))
        ));
    }

    #[test]
    fn test_malformed_row_href_is_fatal() {
        let html = table(r#"<tr><td><a href="wiki/One">One</a></td></tr>"#);
        assert!(matches!(
            parse_listing(&html, LISTING),
            Err(ArchiveError::MalformedUrl(_))
        ));
    }
}
