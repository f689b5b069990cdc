use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::Result;
use crate::records::{EventRecords, FightRecord, FighterIdentity, FighterStatRecord};

pub const FIGHTERS_CSV_FILE: &str = "fighters.csv";
pub const FIGHTS_CSV_FILE: &str = "fights.csv";
pub const FIGHTER_STATS_CSV_FILE: &str = "fighter_stats.csv";

const FIGHTER_COLUMNS: &[&str] = &["fighter_id", "name"];
const FIGHT_COLUMNS: &[&str] = &[
    "fight_id", "event_name", "event_date", "weight_class", "fighter1_id", "fighter2_id",
    "winner_id", "method", "round_ended", "time_ended", "fighter1_closing_odds",
    "fighter2_closing_odds",
];
const FIGHTER_STAT_COLUMNS: &[&str] = &[
    "fight_id", "fighter_id", "is_winner", "knockdowns", "sig_strikes_landed",
    "sig_strikes_attempted", "total_strikes_landed", "total_strikes_attempted", "td_landed",
    "td_attempts", "sub_attempts", "control_time_seconds", "time_fought_seconds",
];

// ============================================================================
// SINK INTERFACE
// ============================================================================

/// Destination for scraped records (fighters, fights, fighter_stats)
pub trait RecordSink {
    /// Empties all three record sets.
    fn truncate(&mut self) -> Result<()>;

    fn append(&mut self, records: &EventRecords) -> Result<()>;

    fn replace(&mut self, records: &EventRecords) -> Result<()> {
        self.truncate()?;
        self.append(records)
    }
}

// ============================================================================
// CSV OUTPUT
// ============================================================================

/// Writes fighters.csv, fights.csv and fighter_stats.csv into one directory
#[derive(Debug, Clone)]
pub struct CsvSink {
    dir: PathBuf,
}

impl CsvSink {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(CsvSink { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }
}

impl RecordSink for CsvSink {
    fn truncate(&mut self) -> Result<()> {
        write_header_only(&self.path(FIGHTERS_CSV_FILE), FIGHTER_COLUMNS)?;
        write_header_only(&self.path(FIGHTS_CSV_FILE), FIGHT_COLUMNS)?;
        write_header_only(&self.path(FIGHTER_STATS_CSV_FILE), FIGHTER_STAT_COLUMNS)?;
        info!("Truncated fighters, fights, fighter_stats in {}", self.dir.display());
        Ok(())
    }

    fn append(&mut self, records: &EventRecords) -> Result<()> {
        if !records.fighters.is_empty() {
            append_rows(&self.path(FIGHTERS_CSV_FILE), FIGHTER_COLUMNS, &records.fighters)?;
            info!("Inserted {} fighters", records.fighters.len());
        }
        if !records.fights.is_empty() {
            append_rows(&self.path(FIGHTS_CSV_FILE), FIGHT_COLUMNS, &records.fights)?;
            info!("Inserted {} fights", records.fights.len());
        }
        if !records.fighter_stats.is_empty() {
            append_rows(
                &self.path(FIGHTER_STATS_CSV_FILE),
                FIGHTER_STAT_COLUMNS,
                &records.fighter_stats,
            )?;
            info!("Inserted {} fighter_stats rows", records.fighter_stats.len());
        }
        Ok(())
    }
}

fn write_header_only(path: &Path, columns: &[&str]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(columns)?;
    writer.flush()?;
    Ok(())
}

/// Appends rows, writing the header first when the file is new or empty.
fn append_rows<T: Serialize>(path: &Path, columns: &[&str], rows: &[T]) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let needs_header = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    if needs_header {
        writer.write_record(columns)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }

    writer.flush()?;
    Ok(())
}

// ============================================================================
// IN-MEMORY OUTPUT
// ============================================================================

/// Keeps records in memory; useful for tests and for callers that post-process in-process.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub fighters: Vec<FighterIdentity>,
    pub fights: Vec<FightRecord>,
    pub fighter_stats: Vec<FighterStatRecord>,
    pub truncations: usize,
}

impl RecordSink for MemorySink {
    fn truncate(&mut self) -> Result<()> {
        self.fighters.clear();
        self.fights.clear();
        self.fighter_stats.clear();
        self.truncations += 1;
        Ok(())
    }

    fn append(&mut self, records: &EventRecords) -> Result<()> {
        self.fighters.extend(records.fighters.iter().cloned());
        self.fights.extend(records.fights.iter().cloned());
        self.fighter_stats.extend(records.fighter_stats.iter().cloned());
        Ok(())
    }
}

// ============================================================================
// OUTPUT FORMATTING
// ============================================================================

/// Prints an event's fights and stat lines to stdout
pub fn print_event_records(records: &EventRecords) {
    let name_of = |id: &str| {
        records
            .fighters
            .iter()
            .find(|f| f.fighter_id == id)
            .map(|f| f.name.clone())
            .unwrap_or_else(|| id.to_string())
    };

    if let Some(first) = records.fights.first() {
        println!("\nEvent: {} ({})", first.event_name, first.event_date);
    }
    println!("{:-<80}", "");

    for fight in &records.fights {
        let winner = fight
            .winner_id
            .as_deref()
            .map(name_of)
            .unwrap_or_else(|| "no winner".to_string());
        println!(
            "{:25} vs {:25} {:20} {} R{} {} -> {}",
            name_of(&fight.fighter1_id),
            name_of(&fight.fighter2_id),
            fight.weight_class.as_deref().unwrap_or("?"),
            fight.method.as_deref().unwrap_or("?"),
            fight.round_ended.map(|r| r.to_string()).unwrap_or_else(|| "?".to_string()),
            fight.time_ended.as_deref().unwrap_or("?"),
            winner
        );

        for stat in records.stats_for_fight(&fight.fight_id) {
            println!(
                "    {:25} KD {} SIG {}/{} TOT {}/{} TD {}/{} SUB {} CTRL {}s",
                name_of(&stat.fighter_id),
                stat.knockdowns,
                show(stat.sig_strikes_landed),
                show(stat.sig_strikes_attempted),
                show(stat.total_strikes_landed),
                show(stat.total_strikes_attempted),
                show(stat.td_landed),
                show(stat.td_attempts),
                stat.sub_attempts,
                show(stat.control_time_seconds),
            );
        }
    }
}

fn show(value: Option<u32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}
