use std::collections::HashSet;
use tracing::{info, warn};

use crate::clock::Clock;
use crate::config::Config;
use crate::error::Result;
use crate::event_handler::parse_event;
use crate::event_index::list_completed_event_urls;
use crate::fetcher::PageFetcher;
use crate::output::RecordSink;
use crate::records::EventRecords;

/// Counts for one loader run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub events_listed: usize,
    pub events_loaded: usize,
    /// Events with no fights or no stats (usually upcoming cards)
    pub events_skipped: usize,
    pub events_failed: usize,
    pub fighters: usize,
    pub fights: usize,
    pub fighter_stats: usize,
}

/// Scrapes the most recent completed events into `sink`, replacing what it held.
/// Fails only if the event listing cannot be fetched or the sink cannot be written.
pub async fn load_recent_events<F, C, S>(
    fetcher: &F,
    clock: &C,
    sink: &mut S,
    config: &Config,
    limit: Option<usize>,
) -> Result<LoadSummary>
where
    F: PageFetcher,
    C: Clock,
    S: RecordSink,
{
    let event_urls = list_completed_event_urls(fetcher, config, limit).await?;
    info!("Loading {} completed events", event_urls.len());

    let mut summary = LoadSummary {
        events_listed: event_urls.len(),
        ..LoadSummary::default()
    };

    sink.truncate()?;

    // fighters written during this run
    let mut seen_fighter_ids: HashSet<String> = HashSet::new();

    for (i, url) in event_urls.iter().enumerate() {
        if i > 0 && config.request_delay_ms > 0 {
            tokio::time::sleep(config.request_delay()).await;
        }

        info!("Processing event {url}");
        let mut records = match parse_event(fetcher, clock, url).await {
            Ok(records) => records,
            Err(e) => {
                warn!("Failed to scrape event {url}: {e}");
                summary.events_failed += 1;
                continue;
            }
        };

        if records.fights.is_empty() || records.fighter_stats.is_empty() {
            info!("No completed fights/stats for event {url} (likely upcoming). Skipping insert.");
            summary.events_skipped += 1;
            continue;
        }

        records
            .fighters
            .retain(|f| seen_fighter_ids.insert(f.fighter_id.clone()));

        sink.append(&records)?;
        tally(&mut summary, &records);
    }

    info!(
        "Loaded {} of {} events ({} skipped, {} failed)",
        summary.events_loaded, summary.events_listed, summary.events_skipped, summary.events_failed
    );
    Ok(summary)
}

/// Scrapes one event and replaces the sink's contents with it.
pub async fn load_single_event<F, C, S>(
    fetcher: &F,
    clock: &C,
    sink: &mut S,
    event_url: &str,
) -> Result<EventRecords>
where
    F: PageFetcher,
    C: Clock,
    S: RecordSink,
{
    let records = parse_event(fetcher, clock, event_url).await?;
    info!(
        "Got {} fighters and {} fights",
        records.fighters.len(),
        records.fights.len()
    );

    sink.replace(&records)?;
    Ok(records)
}

fn tally(summary: &mut LoadSummary, records: &EventRecords) {
    summary.events_loaded += 1;
    summary.fighters += records.fighters.len();
    summary.fights += records.fights.len();
    summary.fighter_stats += records.fighter_stats.len();
}

