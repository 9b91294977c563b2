// src/browser/discovery.rs
//! Walks the paginated fund listing and collects fund page URLs.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::browser::http::fetch_html;
use crate::document::{Document, Query};
use crate::utils::error::{AppError, ExtractError};

pub const DEFAULT_ORIGIN: &str = "https://groww.in";
const LISTING_PATH: &str = "/mutual-funds/filter";
// Be gentle with the listing endpoint between pages.
const LISTING_REQUEST_DELAY_MS: u64 = 150;

/// Listing URLs in fetch order: the unfiltered first page, then `pages`
/// numbered pages starting at 0.
pub fn listing_urls(origin: &str, pages: u32) -> Vec<String> {
    let base = format!("{}{}", origin.trim_end_matches('/'), LISTING_PATH);
    let mut urls = vec![base.clone()];
    urls.extend((0..pages).map(|n| format!("{}?q=&fundSize=&pageNo={}&sortBy=3", base, n)));
    urls
}

/// Absolute URLs of the fund links on one listing page, in document order.
pub fn extract_fund_links(html: &str, origin: &str, link_classes: &str) -> Result<Vec<String>, ExtractError> {
    let query = Query::new(Some("a"), link_classes)?;
    let doc = Document::parse(html);
    Ok(doc
        .find_all(&query)
        .into_iter()
        .filter_map(|a| a.attr("href"))
        .map(|href| {
            if href.starts_with("http") {
                href.to_string()
            } else {
                format!("{}{}", origin.trim_end_matches('/'), href)
            }
        })
        .collect())
}

/// Appends links not seen before, keeping first-seen order.
fn push_unique(out: &mut Vec<String>, seen: &mut HashSet<String>, links: Vec<String>) -> usize {
    let mut added = 0;
    for link in links {
        if seen.insert(link.clone()) {
            out.push(link);
            added += 1;
        }
    }
    added
}

/// Fetches every listing page and returns the deduplicated fund URLs. A page
/// that cannot be fetched is logged and skipped.
pub async fn discover_fund_urls(
    client: &reqwest::Client,
    origin: &str,
    pages: u32,
    link_classes: &str,
) -> Result<Vec<String>, AppError> {
    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    for listing in listing_urls(origin, pages) {
        tokio::time::sleep(Duration::from_millis(LISTING_REQUEST_DELAY_MS)).await;
        let body = match fetch_html(client, &listing).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Skipping listing page {}: {}", listing, e);
                continue;
            }
        };
        let links = extract_fund_links(&body, origin, link_classes)?;
        let added = push_unique(&mut urls, &mut seen, links);
        tracing::info!("{}: {} new fund links ({} total)", listing, added, urls.len());
    }

    Ok(urls)
}

/// One URL per line.
pub fn write_url_list(path: &Path, urls: &[String]) -> Result<(), AppError> {
    let mut content = urls.join("\n");
    if !content.is_empty() {
        content.push('\n');
    }
    fs::write(path, content)?;
    tracing::info!("Wrote {} URLs to {}", urls.len(), path.display());
    Ok(())
}

/// Ordered, trimmed, non-blank lines of a URL list.
pub fn read_url_list(path: &Path) -> Result<Vec<String>, AppError> {
    let raw = fs::read_to_string(path)?;
    Ok(parse_url_list(&raw))
}

pub fn parse_url_list(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
