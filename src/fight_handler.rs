use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::config::{FIGHTER_DETAILS_MARKER, ROUND_LENGTH_SECS};
use crate::fetcher::PageFetcher;
use crate::records::{FightRecord, FighterStatRecord};
use crate::totals_table::{locate_totals_table, StatColumn, StructuralMismatch};
use crate::utils::{
    compute_fight_duration, element_text, id_from_href, parse_clock_to_seconds, parse_count,
    parse_landed_of_attempted,
};

// ============================================================================
// MAIN PROCESSING
// ============================================================================

/// Fetches one fight-details page and extracts a stat record per participant.
/// Never fails: fetch errors and unreadable tables both mean "no stats for this fight".
pub async fn process_fight_stats<F: PageFetcher>(
    fetcher: &F,
    fight_url: &str,
    fight: &FightRecord,
) -> Vec<FighterStatRecord> {
    let html = match fetcher.fetch(fight_url).await {
        Ok(html) => html,
        Err(e) => {
            warn!("Failed to fetch stats for fight {}: {}", fight.fight_id, e);
            return Vec::new();
        }
    };

    match parse_fight_stats_html(&html, fight) {
        Ok(stats) => stats,
        Err(mismatch) => {
            warn!("Skipping stats for fight {}: {}", fight.fight_id, mismatch);
            Vec::new()
        }
    }
}

/// Parses the totals table of a fight-details page.
/// Returns zero, one or two records; two only when both fighters are found in the table.
pub fn parse_fight_stats_html(
    html: &str,
    fight: &FightRecord,
) -> Result<Vec<FighterStatRecord>, StructuralMismatch> {
    let document = Html::parse_document(html);
    let totals = locate_totals_table(&document)?;
    let row = TotalsRow::new(totals.row);
    let columns = totals.columns;

    let positions = row.fighter_positions(columns.index_of(StatColumn::Fighter));

    // Both fighters share the same fight length
    let time_fought_seconds =
        compute_fight_duration(fight.round_ended, fight.time_ended.as_deref(), ROUND_LENGTH_SECS);

    let mut stats = Vec::with_capacity(2);
    for fighter_id in [&fight.fighter1_id, &fight.fighter2_id] {
        let Some(&position) = positions.get(fighter_id.as_str()) else {
            warn!(
                "fighter_id {} not found in totals table for fight {}",
                fighter_id, fight.fight_id
            );
            continue;
        };

        let text = |column: StatColumn| row.text_at(columns.index_of(column), position);

        let (sig_strikes_landed, sig_strikes_attempted) =
            pair_at(text(StatColumn::SigStrikes).as_deref());
        let (total_strikes_landed, total_strikes_attempted) =
            pair_at(text(StatColumn::TotalStrikes).as_deref());
        let (td_landed, td_attempts) = pair_at(text(StatColumn::Takedowns).as_deref());

        stats.push(FighterStatRecord {
            fight_id: fight.fight_id.clone(),
            fighter_id: fighter_id.clone(),
            is_winner: fight.winner_id.as_ref().map(|winner| winner == fighter_id),
            knockdowns: parse_count(text(StatColumn::Knockdowns).as_deref()),
            sig_strikes_landed,
            sig_strikes_attempted,
            total_strikes_landed,
            total_strikes_attempted,
            td_landed,
            td_attempts,
            sub_attempts: parse_count(text(StatColumn::SubAttempts).as_deref()),
            control_time_seconds: text(StatColumn::ControlTime)
                .as_deref()
                .and_then(parse_clock_to_seconds),
            time_fought_seconds,
        });
    }

    debug!("Parsed {} stat rows for fight {}", stats.len(), fight.fight_id);
    Ok(stats)
}

fn pair_at(text: Option<&str>) -> (Option<u32>, Option<u32>) {
    text.map(parse_landed_of_attempted).unwrap_or((None, None))
}

// ============================================================================
// ROW ACCESS
// ============================================================================

/// A totals row: each cell stacks one `<p>` per fighter.
struct TotalsRow<'a> {
    cells: Vec<ElementRef<'a>>,
}

impl<'a> TotalsRow<'a> {
    fn new(row: ElementRef<'a>) -> Self {
        let cell_selector = Selector::parse("td.b-fight-details__table-col").unwrap();
        TotalsRow {
            cells: row.select(&cell_selector).collect(),
        }
    }

    /// Maps each fighter id linked in the fighter column to its position within the cells.
    /// Order is whatever the fight page uses, which may differ from the event page.
    fn fighter_positions(&self, fighter_col: usize) -> HashMap<String, usize> {
        let link_selector = Selector::parse("a[href]").unwrap();
        let mut positions = HashMap::new();

        let Some(cell) = self.cells.get(fighter_col) else {
            return positions;
        };

        let ids = cell
            .select(&link_selector)
            .filter_map(|a| a.value().attr("href"))
            .filter(|href| href.contains(FIGHTER_DETAILS_MARKER))
            .filter_map(|href| id_from_href(href, FIGHTER_DETAILS_MARKER));

        for (position, id) in ids.enumerate() {
            positions.entry(id).or_insert(position);
        }
        positions
    }

    /// Text of the `position`-th fighter's entry in column `col`.
    fn text_at(&self, col: usize, position: usize) -> Option<String> {
        let text_selector = Selector::parse("p.b-fight-details__table-text").unwrap();
        let cell = self.cells.get(col)?;
        let entry = cell.select(&text_selector).nth(position)?;
        Some(element_text(&entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn fight(winner: Option<&str>) -> FightRecord {
        FightRecord {
            fight_id: "fight1".to_string(),
            event_name: "UFC Test".to_string(),
            event_date: NaiveDate::from_ymd_opt(2024, 4, 13).unwrap(),
            weight_class: Some("Lightweight".to_string()),
            fighter1_id: "aaa".to_string(),
            fighter2_id: "bbb".to_string(),
            winner_id: winner.map(str::to_string),
            method: Some("KO/TKO".to_string()),
            round_ended: Some(2),
            time_ended: Some("1:30".to_string()),
            fighter1_closing_odds: None,
            fighter2_closing_odds: None,
        }
    }

    fn p(text: &str) -> String {
        format!(r#"<p class="b-fight-details__table-text">{text}</p>"#)
    }

    fn col(a: &str, b: &str) -> String {
        format!(r#"<td class="b-fight-details__table-col">{}{}</td>"#, p(a), p(b))
    }

    // Fighter order on this page is reversed relative to the fight record
    fn page() -> String {
        let fighters = format!(
            r#"<td class="b-fight-details__table-col l-page_align_left">{}{}</td>"#,
            p(r#"<a href="http://www.ufcstats.com/fighter-details/bbb">Second Guy</a>"#),
            p(r#"<a href="http://www.ufcstats.com/fighter-details/aaa">First Guy</a>"#),
        );
        format!(
            r#"<table>
              <thead class="b-fight-details__table-head"><tr>
                <th>Fighter</th><th>KD</th><th>Sig. str.</th><th>Sig. str. %</th><th>Total str.</th>
                <th>Td</th><th>Td %</th><th>Sub. att</th><th>Rev.</th><th>Ctrl</th>
              </tr></thead>
              <tbody class="b-fight-details__table-body"><tr>
                {fighters}{}{}{}{}{}{}{}{}{}
              </tr></tbody>
            </table>"#,
            col("0", "1"),
            col("10 of 30", "25 of 50"),
            col("33%", "50%"),
            col("12 of 35", "40 of 70"),
            col("0 of 2", "1 of 1"),
            col("0%", "100%"),
            col("0", "2"),
            col("0", "0"),
            col("0:15", "3:02"),
        )
    }

    #[test]
    fn test_parse_fight_stats_resolves_fighter_positions() {
        let stats = parse_fight_stats_html(&page(), &fight(Some("bbb"))).unwrap();
        assert_eq!(stats.len(), 2);

        let first = &stats[0];
        assert_eq!(first.fighter_id, "aaa");
        assert_eq!(first.is_winner, Some(false));
        assert_eq!(first.knockdowns, 1);
        assert_eq!((first.sig_strikes_landed, first.sig_strikes_attempted), (Some(25), Some(50)));
        assert_eq!((first.td_landed, first.td_attempts), (Some(1), Some(1)));
        assert_eq!(first.sub_attempts, 2);
        assert_eq!(first.control_time_seconds, Some(182));

        let second = &stats[1];
        assert_eq!(second.fighter_id, "bbb");
        assert_eq!(second.is_winner, Some(true));
        assert_eq!(second.knockdowns, 0);
        assert_eq!(
            (second.total_strikes_landed, second.total_strikes_attempted),
            (Some(12), Some(35))
        );
        assert_eq!(second.control_time_seconds, Some(15));

        assert_eq!(first.time_fought_seconds, Some(390));
        assert_eq!(first.time_fought_seconds, second.time_fought_seconds);
    }

    #[test]
    fn test_parse_fight_stats_no_winner() {
        let stats = parse_fight_stats_html(&page(), &fight(None)).unwrap();
        assert!(stats.iter().all(|s| s.is_winner.is_none()));
    }

    #[test]
    fn test_parse_fight_stats_skips_unknown_fighter() {
        let mut record = fight(None);
        record.fighter2_id = "ccc".to_string();

        let stats = parse_fight_stats_html(&page(), &record).unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].fighter_id, "aaa");
    }

    #[test]
    fn test_parse_fight_stats_missing_header() {
        let html = page().replace("<th>Sub. att</th>", "<th>Sub</th>");
        let err = parse_fight_stats_html(&html, &fight(None)).unwrap_err();
        assert_eq!(err, StructuralMismatch::TableNotFound);
    }

    #[test]
    fn test_parse_fight_stats_unparseable_time_leaves_duration_empty() {
        let mut record = fight(None);
        record.time_ended = Some("soon".to_string());

        let stats = parse_fight_stats_html(&page(), &record).unwrap();
        assert!(stats.iter().all(|s| s.time_fought_seconds.is_none()));
    }
}
