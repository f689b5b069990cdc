use chrono::NaiveDate;
use scraper::{Html, Selector};
use tracing::{error, warn};

use crate::clock::Clock;
use crate::config::{EVENT_DATE_FORMAT, UNKNOWN_EVENT_NAME};
use crate::utils::element_text;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Header information of an event-details page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventMetadata {
    pub name: String,
    pub date: NaiveDate,
    /// False when `date` came from the clock instead of the page
    pub date_from_page: bool,
}

// ============================================================================
// PARSING - METADATA
// ============================================================================

/// Reads the event title and date. A missing title becomes "Unknown Event";
/// a missing or malformed date becomes today's date.
pub fn parse_event_metadata<C: Clock>(document: &Html, clock: &C) -> EventMetadata {
    let name = extract_event_name(document).unwrap_or_else(|| UNKNOWN_EVENT_NAME.to_string());

    match extract_event_date(document) {
        Some(date) => EventMetadata {
            name,
            date,
            date_from_page: true,
        },
        None => {
            let date = clock.today();
            error!("No usable date for event '{name}', substituting {date}");
            EventMetadata {
                name,
                date,
                date_from_page: false,
            }
        }
    }
}

/// Extracts event name from the highlighted title span.
pub fn extract_event_name(document: &Html) -> Option<String> {
    let selector = Selector::parse("span.b-content__title-highlight").unwrap();
    let name = element_text(&document.select(&selector).next()?);
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Finds the "Date:" list item and parses e.g. "April 13, 2024".
pub fn extract_event_date(document: &Html) -> Option<NaiveDate> {
    let selector = Selector::parse("li.b-list__box-list-item").unwrap();

    for item in document.select(&selector) {
        let text = element_text(&item);
        if let Some((_, raw)) = text.rsplit_once("Date:") {
            let raw = raw.trim();
            return match parse_event_date(raw) {
                Some(date) => Some(date),
                None => {
                    warn!("Could not parse event date from '{raw}'");
                    None
                }
            };
        }
    }

    None
}

pub fn parse_event_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), EVENT_DATE_FORMAT).ok()
}

// ============================================================================
// TESTS
// ============================================================================
