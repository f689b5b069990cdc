pub mod clock;
pub mod config;
pub mod error;
pub mod event_handler;
pub mod event_index;
pub mod fetcher;
pub mod fight_handler;
pub mod loader;
pub mod metadata;
pub mod output;
pub mod records;
pub mod totals_table;
pub mod utils;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use error::{Result, ScrapeError};
pub use event_handler::{parse_event, parse_event_html, EventPage, FightRow};
pub use event_index::{list_completed_event_urls, parse_event_index};
pub use fetcher::{HttpFetcher, PageFetcher, StaticPages};
pub use fight_handler::{parse_fight_stats_html, process_fight_stats};
pub use loader::{load_recent_events, load_single_event, LoadSummary};
pub use metadata::EventMetadata;
pub use output::{print_event_records, CsvSink, MemorySink, RecordSink};
pub use records::{EventRecords, FightRecord, FighterIdentity, FighterStatRecord};
pub use totals_table::{locate_totals_table, ColumnMap, StatColumn, StructuralMismatch};
pub use utils::{compute_fight_duration, parse_clock_to_seconds, parse_landed_of_attempted};

