//! Asset Localizer
//!
//! Takes one page's HTML and pulls its local stylesheet and image
//! dependencies into a working directory, rewriting every reference to the
//! downloaded copy. Outbound hyperlinks are neutralized by replacing each
//! anchor with its plain text, so the bundle has no dead links offline.
//!
//! The DOM is used for discovery only; rewriting happens as textual
//! substitution over the serialized page. Stylesheet rewrites target one
//! element at a time (leftmost remaining occurrence, i.e. document order),
//! while anchor replacement is a plain global substitution, so identical
//! anchor markups collapse to the same replacement wherever they appear.

use std::path::Path;

use scraper::{Html, Selector};
use tracing::{debug, warn};

use crate::error::ArchiveError;
use crate::fetch::{download_into, Fetch};
use crate::urls::normalize;

/// Result of localizing one page
#[derive(Debug)]
pub struct Localized {
    /// Rewritten HTML, referencing downloaded assets by relative path
    pub html: String,
    /// Number of assets successfully downloaded into the working directory
    pub assets_downloaded: usize,
}

/// Localize a page's stylesheet and image references into `work_dir`
///
/// Local (root- or protocol-relative) `<link href>` values are fetched
/// under index-numbered `item_N` subpaths; every `<img src>` is fetched
/// into the directory root. A failed asset fetch downgrades the reference
/// to the `#` placeholder and never aborts the page. The stylesheet index
/// is consumed per attempt, not per success, while images are not
/// index-numbered at all; both halves of that asymmetry are deliberate.
pub async fn localize(
    fetcher: &dyn Fetch,
    html: &str,
    base_url: &str,
    site_origin: &str,
    work_dir: &Path,
) -> Result<Localized, ArchiveError> {
    if html.trim().is_empty() {
        return Err(ArchiveError::UnparsableDocument(base_url.to_string()));
    }

    let document = Html::parse_document(html);
    let link_selector = Selector::parse("link").unwrap();
    let img_selector = Selector::parse("img").unwrap();
    let anchor_selector = Selector::parse("a").unwrap();

    let mut content = document.root_element().html();
    let mut rewrites: Vec<(String, String)> = Vec::new();
    let mut downloaded = 0usize;

    // Stylesheets: local hrefs only, item_N subpath per attempt
    let mut index = 0usize;
    for link in document.select(&link_selector) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        if !href.starts_with('/') {
            continue;
        }

        let subpath = format!("item_{index}");
        index += 1;

        let absolute = normalize(href, site_origin)?;
        let markup = link.html();
        let rewritten = match download_into(fetcher, &absolute, work_dir, None, Some(&subpath)).await
        {
            Ok(relative) => {
                downloaded += 1;
                replace_attr(&markup, "href", href, &relative)
            }
            Err(err) => {
                warn!(url = %absolute, error = %err, "stylesheet fetch failed, using placeholder");
                replace_attr(&markup, "href", href, "#")
            }
        };
        content = content.replacen(&markup, &rewritten, 1);
        rewrites.push((markup, rewritten));
    }

    // Images: every img, no subpath, no index numbering
    for image in document.select(&img_selector) {
        let markup = image.html();
        let src = image.value().attr("src");

        let fetched = match src {
            Some(src) => match normalize(src, site_origin) {
                Ok(absolute) => match download_into(fetcher, &absolute, work_dir, None, None).await
                {
                    Ok(relative) => Some(relative),
                    Err(err) => {
                        warn!(url = %absolute, error = %err, "image fetch failed, using placeholder");
                        None
                    }
                },
                Err(err) => {
                    warn!(src, error = %err, "image source not resolvable, using placeholder");
                    None
                }
            },
            None => None,
        };

        let rewritten = match (src, fetched) {
            (Some(src), Some(relative)) => {
                downloaded += 1;
                replace_attr(&markup, "src", src, &relative)
            }
            (Some(src), None) => replace_attr(&markup, "src", src, "#"),
            // No src at all still gets the placeholder
            (None, _) => format!("{} src=\"#\">", &markup[..markup.len() - 1]),
        };
        content = content.replacen(&markup, &rewritten, 1);
        rewrites.push((markup, rewritten));
    }

    // Hyperlinks: replace each anchor's serialized form with its text.
    // Asset rewrites are re-applied to the anchor markup first so anchors
    // wrapping a rewritten image still match the serialized page.
    for anchor in document.select(&anchor_selector) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if href.is_empty() || href.starts_with('#') {
            continue;
        }

        let mut markup = anchor.html();
        for (old, new) in &rewrites {
            if markup.contains(old.as_str()) {
                markup = markup.replace(old.as_str(), new);
            }
        }
        let text: String = anchor.text().collect();
        content = content.replace(&markup, &text);
    }

    debug!(base_url, assets = downloaded, "localized page");
    Ok(Localized {
        html: content,
        assets_downloaded: downloaded,
    })
}

/// Swap one attribute value inside a serialized element
fn replace_attr(markup: &str, attr: &str, old_value: &str, new_value: &str) -> String {
    let old = format!("{attr}=\"{}\"", escape_attr(old_value));
    let new = format!("{attr}=\"{}\"", escape_attr(new_value));
    markup.replacen(&old, &new, 1)
}

/// Escape an attribute value the way the HTML serializer does
fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('\u{a0}', "&nbsp;")
        .replace('"', "&quot;")
}
