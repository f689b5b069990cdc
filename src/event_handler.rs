use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use tracing::{error, info, warn};

use crate::clock::Clock;
use crate::config::{FIGHTER_DETAILS_MARKER, FIGHT_DETAILS_MARKER};
use crate::error::{Result, ScrapeError};
use crate::fetcher::PageFetcher;
use crate::fight_handler::process_fight_stats;
use crate::metadata::{parse_event_metadata, EventMetadata};
use crate::records::{EventRecords, FightRecord, FighterIdentity};
use crate::utils::{element_text, id_from_href, non_empty};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// A fight row from the event page together with the link to its details page
#[derive(Debug, Clone, PartialEq)]
pub struct FightRow {
    pub fight_url: String,
    pub fight: FightRecord,
}

/// Everything read from the event page itself, before any fight page is fetched
#[derive(Debug, Clone)]
pub struct EventPage {
    pub metadata: EventMetadata,
    pub fighters: Vec<FighterIdentity>,
    pub fights: Vec<FightRow>,
}

/// Fighter identities keyed by id, kept in first-seen order. Re-inserting an id replaces the name.
#[derive(Debug, Default)]
struct FighterRoster {
    fighters: Vec<FighterIdentity>,
    index: HashMap<String, usize>,
}

impl FighterRoster {
    fn upsert(&mut self, fighter_id: String, name: String) {
        match self.index.get(&fighter_id) {
            Some(&idx) => self.fighters[idx].name = name,
            None => {
                self.index.insert(fighter_id.clone(), self.fighters.len());
                self.fighters.push(FighterIdentity { fighter_id, name });
            }
        }
    }

    fn into_vec(self) -> Vec<FighterIdentity> {
        self.fighters
    }
}

// ============================================================================
// MAIN PROCESSING
// ============================================================================

/// Scrapes one event: the event page, then every fight-details page in card order.
/// Only a failure to fetch the event page itself is an error.
pub async fn parse_event<F: PageFetcher, C: Clock>(
    fetcher: &F,
    clock: &C,
    event_url: &str,
) -> Result<EventRecords> {
    let html = fetcher.fetch(event_url).await?;
    let Some(page) = parse_event_html(&html, event_url, clock)? else {
        return Ok(EventRecords::default());
    };

    let mut records = EventRecords {
        fighters: page.fighters,
        fights: Vec::with_capacity(page.fights.len()),
        fighter_stats: Vec::new(),
    };

    for row in page.fights {
        let stats = process_fight_stats(fetcher, &row.fight_url, &row.fight).await;
        records.fighter_stats.extend(stats);
        records.fights.push(row.fight);
    }

    info!(
        "Event '{}': {} fighters, {} fights, {} stat rows",
        page.metadata.name,
        records.fighters.len(),
        records.fights.len(),
        records.fighter_stats.len()
    );
    Ok(records)
}

/// Parses an event-details page. Returns None when the page has no fight table
/// (placeholder or malformed pages).
pub fn parse_event_html<C: Clock>(
    html: &str,
    event_url: &str,
    clock: &C,
) -> Result<Option<EventPage>> {
    let base = Url::parse(event_url).map_err(|e| ScrapeError::InvalidUrl {
        url: event_url.to_string(),
        reason: e.to_string(),
    })?;

    let document = Html::parse_document(html);
    let metadata = parse_event_metadata(&document, clock);
    info!("Parsing event '{}' on {}", metadata.name, metadata.date);

    let table_selector = Selector::parse("table.b-fight-details__table").unwrap();
    let tbody_selector = Selector::parse("tbody").unwrap();
    let row_selector = Selector::parse("tr").unwrap();

    let Some(table) = document.select(&table_selector).next() else {
        error!("Could not find fights table on event page {event_url}");
        return Ok(None);
    };
    let Some(tbody) = table.select(&tbody_selector).next() else {
        error!("Could not find tbody in fights table on {event_url}");
        return Ok(None);
    };

    let mut roster = FighterRoster::default();
    let mut fights = Vec::new();

    for row in tbody.select(&row_selector) {
        if let Some(fight_row) = parse_fight_row(row, &base, &metadata, &mut roster) {
            fights.push(fight_row);
        }
    }

    Ok(Some(EventPage {
        metadata,
        fighters: roster.into_vec(),
        fights,
    }))
}

// ============================================================================
// FIGHT ROW PARSING
// ============================================================================

/// A resolved participant link
struct FighterLink {
    id: String,
    name: String,
}

fn parse_fight_row(
    row: ElementRef,
    base: &Url,
    metadata: &EventMetadata,
    roster: &mut FighterRoster,
) -> Option<FightRow> {
    let cell_selector = Selector::parse("td").unwrap();
    let link_selector = Selector::parse("a[href]").unwrap();

    let cols: Vec<ElementRef> = row.select(&cell_selector).collect();
    if cols.is_empty() {
        return None;
    }

    let links: Vec<ElementRef> = row.select(&link_selector).collect();

    let Some(fight_href) = links
        .iter()
        .filter_map(|a| a.value().attr("href"))
        .find(|href| href.contains(FIGHT_DETAILS_MARKER))
    else {
        warn!("Skipping row without fight-details link");
        return None;
    };
    let fight_url = resolve(base, fight_href)?;
    let Some(fight_id) = id_from_href(&fight_url, FIGHT_DETAILS_MARKER) else {
        warn!("Skipping row with unusable fight link '{fight_href}'");
        return None;
    };

    let fighter_links: Vec<&ElementRef> = links
        .iter()
        .filter(|a| {
            a.value()
                .attr("href")
                .is_some_and(|href| href.contains(FIGHTER_DETAILS_MARKER))
        })
        .collect();
    if fighter_links.len() != 2 {
        warn!(
            "Expected 2 fighter links, found {} in row for fight {}; skipping",
            fighter_links.len(),
            fight_id
        );
        return None;
    }

    let fighter1 = fighter_link(fighter_links[0], base)?;
    let fighter2 = fighter_link(fighter_links[1], base)?;
    if fighter1.id == fighter2.id {
        warn!("Both fighter links point at {} in fight {}; skipping", fighter1.id, fight_id);
        return None;
    }

    roster.upsert(fighter1.id.clone(), fighter1.name);
    roster.upsert(fighter2.id.clone(), fighter2.name);

    // Trailing columns: ... Weight class, Method, Round, Time
    let from_end = |n: usize| cols.len().checked_sub(n).map(|i| element_text(&cols[i]));

    let weight_class = from_end(4).and_then(non_empty);
    let method = from_end(3).and_then(|text| text.split_whitespace().next().map(str::to_string));
    let round_ended = from_end(2).and_then(|text| parse_round(&text));
    let time_ended = from_end(1).and_then(non_empty);

    let result_text = element_text(&cols[0]).to_lowercase();
    let winner_id = if result_text.contains("win") {
        Some(fighter1.id.clone())
    } else {
        None
    };

    Some(FightRow {
        fight_url,
        fight: FightRecord {
            fight_id,
            event_name: metadata.name.clone(),
            event_date: metadata.date,
            weight_class,
            fighter1_id: fighter1.id,
            fighter2_id: fighter2.id,
            winner_id,
            method,
            round_ended,
            time_ended,
            fighter1_closing_odds: None,
            fighter2_closing_odds: None,
        },
    })
}

fn fighter_link(link: &ElementRef, base: &Url) -> Option<FighterLink> {
    let href = link.value().attr("href")?;
    let url = resolve(base, href)?;
    let Some(id) = id_from_href(&url, FIGHTER_DETAILS_MARKER) else {
        warn!("Skipping row with unusable fighter link '{href}'");
        return None;
    };
    Some(FighterLink {
        id,
        name: element_text(link),
    })
}

fn resolve(base: &Url, href: &str) -> Option<String> {
    match base.join(href.trim()) {
        Ok(url) => Some(url.to_string()),
        Err(e) => {
            warn!("Skipping row with unresolvable link '{href}': {e}");
            None
        }
    }
}

/// Round numbers are plain digits; anything else is unknown.
fn parse_round(text: &str) -> Option<u32> {
    if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
        text.parse().ok()
    } else {
        None
    }
}
