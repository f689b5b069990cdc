use regex::Regex;
use scraper::ElementRef;
use std::sync::LazyLock;

static RE_LANDED_OF_ATTEMPTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s*of\s*(\d+)").expect("invalid regex: landed of attempted")
});

// ============================================================================
// DURATION CODEC
// ============================================================================

/// Converts clock text to seconds (e.g., "3:45" -> 225).
/// "--" and "0:00" are zero; anything that isn't minutes:seconds is None.
pub fn parse_clock_to_seconds(text: &str) -> Option<u32> {
    let text = text.trim();
    if text == "--" || text == "0:00" {
        return Some(0);
    }

    let (minutes, seconds) = text.split_once(':')?;
    let minutes: u32 = minutes.trim().parse().ok()?;
    let seconds: u32 = seconds.trim().parse().ok()?;

    minutes.checked_mul(60)?.checked_add(seconds)
}

/// Total seconds fought: every full round before the last, plus the clock in the last one.
pub fn compute_fight_duration(
    round_ended: Option<u32>,
    clock_text: Option<&str>,
    round_length_secs: u32,
) -> Option<u32> {
    let round_ended = round_ended?;
    let clock = parse_clock_to_seconds(clock_text?)?;

    let completed_rounds = round_ended.checked_sub(1)?;
    completed_rounds.checked_mul(round_length_secs)?.checked_add(clock)
}

// ============================================================================
// NUMERIC PARSING
// ============================================================================

/// Parses "23 of 57" style text into (landed, attempted).
/// Does not check that attempted >= landed.
pub fn parse_landed_of_attempted(text: &str) -> (Option<u32>, Option<u32>) {
    let Some(caps) = RE_LANDED_OF_ATTEMPTED.captures(text) else {
        return (None, None);
    };

    let landed = caps.get(1).and_then(|m| m.as_str().parse().ok());
    let attempted = caps.get(2).and_then(|m| m.as_str().parse().ok());
    match (landed, attempted) {
        (Some(l), Some(a)) => (Some(l), Some(a)),
        _ => (None, None),
    }
}

/// Plain counts (knockdowns, submission attempts). Anything that is not all digits counts as 0,
/// including "+1" or "-".
pub fn parse_count(text: Option<&str>) -> u32 {
    match text {
        Some(t) if !t.is_empty() && t.chars().all(|c| c.is_ascii_digit()) => t.parse().unwrap_or(0),
        _ => 0,
    }
}

// ============================================================================
// HTML HELPERS
// ============================================================================

/// Text of an element with each text node trimmed and joined by single spaces.
pub fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns the path segment following `marker` in an href
/// ("http://ufcstats.com/fighter-details/1338e2c7480bdf9e" -> "1338e2c7480bdf9e").
pub fn id_from_href(href: &str, marker: &str) -> Option<String> {
    let (_, rest) = href.trim().rsplit_once(marker)?;
    let id = rest.trim_matches('/');
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

/// Empty strings become None.
pub fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
