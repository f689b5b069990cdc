use std::time::Duration;

use crate::error::{Result, ScrapeError};

pub const UFCSTATS_BASE: &str = "http://www.ufcstats.com";

/// Listing of every completed event on a single page.
pub const COMPLETED_EVENTS_PATH: &str = "/statistics/events/completed?page=all";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

/// Length of one round in seconds. UFC rounds are five minutes regardless of event.
pub const ROUND_LENGTH_SECS: u32 = 5 * 60;

/// Placeholder used when an event page has no title span.
pub const UNKNOWN_EVENT_NAME: &str = "Unknown Event";

/// Date format of the "Date:" list item on event pages, e.g. "April 13, 2024".
pub const EVENT_DATE_FORMAT: &str = "%B %d, %Y";

// Path markers used to recognize links
pub const EVENT_DETAILS_MARKER: &str = "event-details";
pub const FIGHT_DETAILS_MARKER: &str = "fight-details/";
pub const FIGHTER_DETAILS_MARKER: &str = "fighter-details/";

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    /// Pause between event pages in the multi-event loader (REQUEST_DELAY_MS)
    pub request_delay_ms: u64,
    pub log_level: String,
    /// Directory the CSV sink writes into (OUTPUT_DIR)
    pub output_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: UFCSTATS_BASE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: 30,
            request_delay_ms: 100,
            log_level: "info".to_string(),
            output_dir: "data".to_string(),
        }
    }
}

impl Config {
    /// Loads `.env` from the working directory (if any), then reads the process environment.
    /// Variables already set in the environment take precedence over the file.
    pub fn load() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(ScrapeError::Config(format!("Failed to read .env: {e}")));
            }
        }
        Self::from_env()
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();
        Ok(Self {
            base_url: get("UFCSTATS_BASE")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            user_agent: get("USER_AGENT").unwrap_or(defaults.user_agent),
            request_timeout_secs: env_number(
                "REQUEST_TIMEOUT_SECS",
                get("REQUEST_TIMEOUT_SECS"),
                defaults.request_timeout_secs,
            )?,
            request_delay_ms: env_number(
                "REQUEST_DELAY_MS",
                get("REQUEST_DELAY_MS"),
                defaults.request_delay_ms,
            )?,
            log_level: get("LOG_LEVEL").unwrap_or(defaults.log_level),
            output_dir: get("OUTPUT_DIR").unwrap_or(defaults.output_dir),
        })
    }

    pub fn completed_events_url(&self) -> String {
        format!("{}{}", self.base_url, COMPLETED_EVENTS_PATH)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

fn env_number(key: &str, raw: Option<String>, default: u64) -> Result<u64> {
    match raw {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ScrapeError::Config(format!("{key} must be a non-negative integer, got '{raw}'"))),
        None => Ok(default),
    }
}
