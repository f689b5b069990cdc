use scraper::{ElementRef, Html, Selector};
use std::fmt;
use thiserror::Error;

use crate::utils::element_text;

// ============================================================================
// COLUMN CATEGORIES
// ============================================================================

/// Semantic columns of the fight-details "Totals" table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatColumn {
    Fighter,
    Knockdowns,
    SigStrikes,
    TotalStrikes,
    Takedowns,
    SubAttempts,
    ControlTime,
}

impl StatColumn {
    pub const ALL: [StatColumn; 7] = [
        StatColumn::Fighter,
        StatColumn::Knockdowns,
        StatColumn::SigStrikes,
        StatColumn::TotalStrikes,
        StatColumn::Takedowns,
        StatColumn::SubAttempts,
        StatColumn::ControlTime,
    ];

    /// Substring some header must contain for a table to count as the totals table.
    pub fn required_label(self) -> &'static str {
        match self {
            StatColumn::Fighter => "fighter",
            StatColumn::Knockdowns => "kd",
            StatColumn::SigStrikes => "sig. str",
            StatColumn::TotalStrikes => "total str",
            StatColumn::Takedowns => "td",
            StatColumn::SubAttempts => "sub. att",
            StatColumn::ControlTime => "ctrl",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for StatColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.required_label())
    }
}

// ============================================================================
// HEADER MATCHING
// ============================================================================

type HeaderMatcher = fn(&str) -> bool;

fn is_fighter(label: &str) -> bool {
    label.starts_with("fighter")
}

fn is_knockdowns(label: &str) -> bool {
    label.starts_with("kd")
}

// "Sig. str." and "Sig. str. %" share a prefix; only the raw count column qualifies
fn is_sig_strikes(label: &str) -> bool {
    label.starts_with("sig. str") && !label.contains('%')
}

fn is_total_strikes(label: &str) -> bool {
    label.starts_with("total str")
}

fn is_takedowns(label: &str) -> bool {
    label.starts_with("td") && !label.contains('%')
}

fn is_sub_attempts(label: &str) -> bool {
    label.starts_with("sub. att")
}

fn is_control_time(label: &str) -> bool {
    label.starts_with("ctrl")
}

/// Tried in this order against every header label. A label claims the first category it
/// matches, and a category keeps the first label that claimed it.
pub const HEADER_MATCHERS: [(StatColumn, HeaderMatcher); 7] = [
    (StatColumn::Fighter, is_fighter),
    (StatColumn::Knockdowns, is_knockdowns),
    (StatColumn::SigStrikes, is_sig_strikes),
    (StatColumn::TotalStrikes, is_total_strikes),
    (StatColumn::Takedowns, is_takedowns),
    (StatColumn::SubAttempts, is_sub_attempts),
    (StatColumn::ControlTime, is_control_time),
];

/// Lower-cased header text with whitespace collapsed.
pub fn normalize_label(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Column indices for every category in the totals table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    indices: [usize; 7],
}

impl ColumnMap {
    /// Maps normalized header labels to column indices.
    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Result<ColumnMap, StructuralMismatch> {
        let mut found: [Option<usize>; 7] = [None; 7];

        for (idx, label) in labels.iter().enumerate() {
            let label = label.as_ref();
            let matched = HEADER_MATCHERS.iter().find(|(_, matches)| matches(label));
            if let Some((column, _)) = matched {
                let slot = &mut found[column.slot()];
                if slot.is_none() {
                    *slot = Some(idx);
                }
            }
        }

        let missing: Vec<StatColumn> = StatColumn::ALL
            .iter()
            .copied()
            .filter(|c| found[c.slot()].is_none())
            .collect();
        if !missing.is_empty() {
            return Err(StructuralMismatch::UnmappedColumns { missing });
        }

        let mut indices = [0; 7];
        for column in StatColumn::ALL {
            indices[column.slot()] = found[column.slot()].unwrap_or_default();
        }
        Ok(ColumnMap { indices })
    }

    pub fn index_of(&self, column: StatColumn) -> usize {
        self.indices[column.slot()]
    }
}

// ============================================================================
// TABLE LOCATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralMismatch {
    #[error("no table with a totals header and body")]
    TableNotFound,

    #[error("totals table has no body row")]
    MissingRow,

    #[error("could not map totals columns: {missing:?}")]
    UnmappedColumns { missing: Vec<StatColumn> },
}

/// The totals table of a fight-details page: its column map and the single body row.
#[derive(Debug)]
pub struct TotalsTable<'a> {
    pub columns: ColumnMap,
    pub row: ElementRef<'a>,
}

/// Finds the first table whose header covers every required label and maps its columns.
pub fn locate_totals_table(document: &Html) -> Result<TotalsTable<'_>, StructuralMismatch> {
    let table_selector = Selector::parse("table").unwrap();
    let thead_selector = Selector::parse("thead.b-fight-details__table-head").unwrap();
    let tbody_selector = Selector::parse("tbody.b-fight-details__table-body").unwrap();
    let header_cell_selector = Selector::parse("th, td").unwrap();
    let row_selector = Selector::parse("tr").unwrap();

    for table in document.select(&table_selector) {
        let (Some(thead), Some(tbody)) = (
            table.select(&thead_selector).next(),
            table.select(&tbody_selector).next(),
        ) else {
            continue;
        };

        let labels: Vec<String> = thead
            .select(&header_cell_selector)
            .map(|cell| normalize_label(&element_text(&cell)))
            .collect();

        let covers_all = StatColumn::ALL
            .iter()
            .all(|c| labels.iter().any(|label| label.contains(c.required_label())));
        if !covers_all {
            continue;
        }

        let columns = ColumnMap::from_labels(&labels)?;
        let row = tbody
            .select(&row_selector)
            .next()
            .ok_or(StructuralMismatch::MissingRow)?;

        return Ok(TotalsTable { columns, row });
    }

    Err(StructuralMismatch::TableNotFound)
}
