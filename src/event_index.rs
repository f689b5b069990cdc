use reqwest::Url;
use scraper::{Html, Selector};
use tracing::{debug, info};

use crate::config::{Config, EVENT_DETAILS_MARKER};
use crate::error::{Result, ScrapeError};
use crate::fetcher::PageFetcher;

// ============================================================================
// EVENT INDEX PARSING
// ============================================================================

/// Fetches the completed-events listing and returns event-detail URLs in page order.
/// A failure here is fatal for a multi-event run: there is nothing else to scrape.
pub async fn list_completed_event_urls<F: PageFetcher>(
    fetcher: &F,
    config: &Config,
    limit: Option<usize>,
) -> Result<Vec<String>> {
    let html = fetcher.fetch(&config.completed_events_url()).await?;
    let urls = parse_event_index(&html, &config.base_url, limit)?;

    info!("Found {} completed event URLs", urls.len());
    Ok(urls)
}

/// Extracts absolute, de-duplicated event-detail URLs from a listing page.
pub fn parse_event_index(html: &str, base_url: &str, limit: Option<usize>) -> Result<Vec<String>> {
    let base = Url::parse(base_url).map_err(|e| ScrapeError::InvalidUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })?;

    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").unwrap();

    let mut urls: Vec<String> = Vec::new();
    for link in document.select(&selector) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        if !href.contains(EVENT_DETAILS_MARKER) {
            continue;
        }

        let full_url = match base.join(href.trim()) {
            Ok(url) => url.to_string(),
            Err(e) => {
                debug!("Skipping unresolvable event link '{href}': {e}");
                continue;
            }
        };

        if !urls.contains(&full_url) {
            urls.push(full_url);
        }
    }

    if let Some(limit) = limit {
        urls.truncate(limit);
    }

    Ok(urls)
}
