use chrono::NaiveDate;
use serde::Serialize;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// A fighter as identified by their ufcstats profile link
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FighterIdentity {
    pub fighter_id: String,
    pub name: String,
}

/// One bout on an event card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FightRecord {
    pub fight_id: String,
    pub event_name: String,
    pub event_date: NaiveDate,
    pub weight_class: Option<String>,
    pub fighter1_id: String,
    pub fighter2_id: String,
    /// None for draws, no-contests and fights that have not happened yet
    pub winner_id: Option<String>,
    pub method: Option<String>,
    pub round_ended: Option<u32>,
    pub time_ended: Option<String>,
    // Odds are filled in by a separate source; always empty here
    pub fighter1_closing_odds: Option<f64>,
    pub fighter2_closing_odds: Option<f64>,
}

/// Totals for one fighter in one fight
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FighterStatRecord {
    pub fight_id: String,
    pub fighter_id: String,
    pub is_winner: Option<bool>,
    pub knockdowns: u32,
    pub sig_strikes_landed: Option<u32>,
    pub sig_strikes_attempted: Option<u32>,
    pub total_strikes_landed: Option<u32>,
    pub total_strikes_attempted: Option<u32>,
    pub td_landed: Option<u32>,
    pub td_attempts: Option<u32>,
    pub sub_attempts: u32,
    pub control_time_seconds: Option<u32>,
    pub time_fought_seconds: Option<u32>,
}

/// The three record sets produced from one event page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventRecords {
    pub fighters: Vec<FighterIdentity>,
    pub fights: Vec<FightRecord>,
    pub fighter_stats: Vec<FighterStatRecord>,
}

impl EventRecords {
    pub fn is_empty(&self) -> bool {
        self.fighters.is_empty() && self.fights.is_empty() && self.fighter_stats.is_empty()
    }

    /// Stat records belonging to one fight.
    pub fn stats_for_fight<'a>(&'a self, fight_id: &'a str) -> impl Iterator<Item = &'a FighterStatRecord> + 'a {
        self.fighter_stats.iter().filter(move |s| s.fight_id == fight_id)
    }
}
