//! Example: Archive a listing page into offline bundles
//!
//! Run with: cargo run -p pagepack --example archive_listing -- <listing-url>
//!
//! Plays the orchestrating-script role: scans the listing, archives every
//! row, and prints where the bundles landed.

use pagepack::{archive_listing, HttpFetch};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let listing_url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://en.wikipedia.org/wiki/List_of_citrus_fruits".to_string());

    let fetcher = match HttpFetch::new() {
        Ok(fetcher) => fetcher,
        Err(e) => {
            eprintln!("Failed to build HTTP client: {e}");
            std::process::exit(1);
        }
    };

    println!("Archiving {listing_url}\n");

    match archive_listing(&fetcher, &listing_url).await {
        Ok(outcome) => {
            println!("Archived {} pages", outcome.bundles.len());
            for bundle in &outcome.bundles {
                println!("  {} -> {}", bundle.title, bundle.archive_path.display());
            }
            if !outcome.skipped.is_empty() {
                println!("\nSkipped {} rows", outcome.skipped.len());
                for row in &outcome.skipped {
                    println!("  {} ({}): {}", row.title, row.detail_url, row.reason);
                }
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
