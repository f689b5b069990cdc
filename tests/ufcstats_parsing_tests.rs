use chrono::NaiveDate;
use ufcstats_scraper::{
    list_completed_event_urls, load_recent_events, load_single_event, parse_event, Config,
    EventRecords, FixedClock, MemorySink, ScrapeError, StaticPages,
};

const BASE: &str = "http://www.ufcstats.com";
const LISTING_URL: &str = "http://www.ufcstats.com/statistics/events/completed?page=all";
const EVENT_URL: &str = "http://www.ufcstats.com/event-details/e1a1a1a1a1a1a1a1";
const PLACEHOLDER_EVENT_URL: &str = "http://www.ufcstats.com/event-details/e2b2b2b2b2b2b2b2";
const MISSING_EVENT_URL: &str = "http://www.ufcstats.com/event-details/e3c3c3c3c3c3c3c3";

const FIGHT_KO: &str = "f1111111111111111";
const FIGHT_DRAW: &str = "f2222222222222222";
const FIGHT_NO_SUB_HEADER: &str = "f3333333333333333";
const FIGHT_NOT_SERVED: &str = "f4444444444444444";

const ALPHA: &str = "aaaa000000000001";
const BRAVO: &str = "bbbb000000000002";
const CHARLIE: &str = "cccc000000000003";
const DELTA: &str = "dddd000000000004";

fn fight_url(id: &str) -> String {
    format!("{BASE}/fight-details/{id}")
}

fn clock() -> FixedClock {
    FixedClock(NaiveDate::from_ymd_opt(2001, 1, 1).unwrap())
}

fn config() -> Config {
    Config {
        base_url: BASE.to_string(),
        request_delay_ms: 0,
        ..Config::default()
    }
}

/// The fourth fight's details page is deliberately not served
fn site() -> StaticPages {
    StaticPages::new()
        .with_page(LISTING_URL, include_str!("fixtures/completed_events.html"))
        .with_page(EVENT_URL, include_str!("fixtures/event_alpha_bravo.html"))
        .with_page(PLACEHOLDER_EVENT_URL, include_str!("fixtures/event_placeholder.html"))
        .with_page(fight_url(FIGHT_KO), include_str!("fixtures/fight_f1.html"))
        .with_page(fight_url(FIGHT_DRAW), include_str!("fixtures/fight_f2.html"))
        .with_page(
            fight_url(FIGHT_NO_SUB_HEADER),
            include_str!("fixtures/fight_f3_missing_header.html"),
        )
}

async fn scrape_alpha_bravo() -> EventRecords {
    parse_event(&site(), &clock(), EVENT_URL)
        .await
        .expect("Failed to parse event")
}

#[tokio::test]
async fn test_list_completed_event_urls() {
    let urls = list_completed_event_urls(&site(), &config(), None).await.unwrap();
    assert_eq!(urls, vec![EVENT_URL, PLACEHOLDER_EVENT_URL, MISSING_EVENT_URL]);

    let limited = list_completed_event_urls(&site(), &config(), Some(1)).await.unwrap();
    assert_eq!(limited, vec![EVENT_URL]);
}

#[tokio::test]
async fn test_parse_event_record_counts() {
    let records = scrape_alpha_bravo().await;

    assert_eq!(records.fights.len(), 4);
    assert_eq!(records.fighters.len(), 7);
    // only the two fights with readable totals tables produce stats
    assert_eq!(records.fighter_stats.len(), 4);

    for fight in &records.fights {
        assert_eq!(fight.event_name, "UFC Fight Night: Alpha vs. Bravo");
        assert_eq!(fight.event_date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_ne!(fight.fighter1_id, fight.fighter2_id);
        if let Some(winner) = &fight.winner_id {
            assert!(winner == &fight.fighter1_id || winner == &fight.fighter2_id);
        }
    }
}

#[tokio::test]
async fn test_parse_event_finished_fight() {
    let records = scrape_alpha_bravo().await;

    let fight = records.fights.iter().find(|f| f.fight_id == FIGHT_KO).unwrap();
    assert_eq!(fight.fighter1_id, ALPHA);
    assert_eq!(fight.fighter2_id, BRAVO);
    assert_eq!(fight.winner_id.as_deref(), Some(ALPHA));
    assert_eq!(fight.weight_class.as_deref(), Some("Middleweight"));
    assert_eq!(fight.method.as_deref(), Some("KO/TKO"));
    assert_eq!(fight.round_ended, Some(3));
    assert_eq!(fight.time_ended.as_deref(), Some("2:10"));

    let stats: Vec<_> = records.stats_for_fight(FIGHT_KO).collect();
    assert_eq!(stats.len(), 2);
    assert!(stats.iter().all(|s| s.time_fought_seconds == Some(730)));

    // the fight page lists Bravo first; values must still land on the right fighter
    let alpha = stats.iter().find(|s| s.fighter_id == ALPHA).unwrap();
    assert_eq!(alpha.is_winner, Some(true));
    assert_eq!(alpha.knockdowns, 1);
    assert_eq!(alpha.sig_strikes_landed, Some(45));
    assert_eq!(alpha.sig_strikes_attempted, Some(88));
    assert_eq!(alpha.total_strikes_landed, Some(60));
    assert_eq!(alpha.total_strikes_attempted, Some(105));
    assert_eq!(alpha.td_landed, Some(2));
    assert_eq!(alpha.td_attempts, Some(4));
    assert_eq!(alpha.sub_attempts, 0);
    assert_eq!(alpha.control_time_seconds, Some(245));

    let bravo = stats.iter().find(|s| s.fighter_id == BRAVO).unwrap();
    assert_eq!(bravo.is_winner, Some(false));
    assert_eq!(bravo.knockdowns, 0);
    assert_eq!(bravo.sig_strikes_landed, Some(30));
    assert_eq!(bravo.control_time_seconds, Some(32));
}

#[tokio::test]
async fn test_parse_event_draw_has_no_winner() {
    let records = scrape_alpha_bravo().await;

    let fight = records.fights.iter().find(|f| f.fight_id == FIGHT_DRAW).unwrap();
    assert_eq!(fight.winner_id, None);
    assert_eq!(fight.method.as_deref(), Some("S-DEC"));

    let stats: Vec<_> = records.stats_for_fight(FIGHT_DRAW).collect();
    assert_eq!(stats.len(), 2);
    assert!(stats.iter().all(|s| s.is_winner.is_none()));
    assert!(stats.iter().all(|s| s.time_fought_seconds == Some(900)));

    let charlie = stats.iter().find(|s| s.fighter_id == CHARLIE).unwrap();
    assert_eq!(charlie.control_time_seconds, Some(131));
    let delta = stats.iter().find(|s| s.fighter_id == DELTA).unwrap();
    assert_eq!(delta.sub_attempts, 1);
    assert_eq!(delta.td_attempts, Some(6));
}

#[tokio::test]
async fn test_parse_event_degrades_per_fight() {
    let records = scrape_alpha_bravo().await;

    // missing "Sub. att" header: fight kept, stats dropped
    assert!(records.fights.iter().any(|f| f.fight_id == FIGHT_NO_SUB_HEADER));
    assert_eq!(records.stats_for_fight(FIGHT_NO_SUB_HEADER).count(), 0);

    // fight page fetch fails: fight kept, stats dropped
    let fight = records.fights.iter().find(|f| f.fight_id == FIGHT_NOT_SERVED).unwrap();
    assert_eq!(fight.method.as_deref(), Some("U-DEC"));
    assert_eq!(records.stats_for_fight(FIGHT_NOT_SERVED).count(), 0);
}

#[tokio::test]
async fn test_parse_event_latest_fighter_name_wins() {
    let records = scrape_alpha_bravo().await;

    let alphas: Vec<_> = records.fighters.iter().filter(|f| f.fighter_id == ALPHA).collect();
    assert_eq!(alphas.len(), 1);
    assert_eq!(alphas[0].name, "Adam 'The Ace' Alpha");
}

#[tokio::test]
async fn test_parse_event_is_repeatable() {
    let first = scrape_alpha_bravo().await;
    let second = scrape_alpha_bravo().await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_parse_event_placeholder_page() {
    let records = parse_event(&site(), &clock(), PLACEHOLDER_EVENT_URL).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_parse_event_fetch_failure_is_error() {
    let err = parse_event(&site(), &clock(), MISSING_EVENT_URL).await.unwrap_err();
    assert!(matches!(err, ScrapeError::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_load_recent_events() {
    let mut sink = MemorySink::default();
    let summary = load_recent_events(&site(), &clock(), &mut sink, &config(), None)
        .await
        .unwrap();

    assert_eq!(summary.events_listed, 3);
    assert_eq!(summary.events_loaded, 1);
    assert_eq!(summary.events_skipped, 1);
    assert_eq!(summary.events_failed, 1);
    assert_eq!(summary.fights, 4);
    assert_eq!(summary.fighter_stats, 4);

    assert_eq!(sink.truncations, 1);
    assert_eq!(sink.fighters.len(), 7);
    assert_eq!(sink.fights.len(), 4);
    assert_eq!(sink.fighter_stats.len(), 4);
}

#[tokio::test]
async fn test_load_recent_events_writes_each_fighter_once() {
    // a second event URL serving the same card shares every fighter with the first
    let pages = site().with_page(MISSING_EVENT_URL, include_str!("fixtures/event_alpha_bravo.html"));
    let mut sink = MemorySink::default();

    let summary = load_recent_events(&pages, &clock(), &mut sink, &config(), None)
        .await
        .unwrap();

    assert_eq!(summary.events_loaded, 2);
    assert_eq!(sink.fighters.len(), 7);
    assert_eq!(sink.fights.len(), 8);
}

#[tokio::test]
async fn test_load_recent_events_listing_failure_is_fatal() {
    let pages = StaticPages::new().with_page(EVENT_URL, include_str!("fixtures/event_alpha_bravo.html"));
    let mut sink = MemorySink::default();

    let result = load_recent_events(&pages, &clock(), &mut sink, &config(), None).await;

    assert!(matches!(result, Err(ScrapeError::Status { .. })));
    assert_eq!(sink.truncations, 0);
    assert_eq!(pages.requests(), vec![LISTING_URL]);
}

#[tokio::test]
async fn test_load_single_event_replaces_sink() {
    let mut sink = MemorySink::default();
    load_single_event(&site(), &clock(), &mut sink, EVENT_URL).await.unwrap();
    load_single_event(&site(), &clock(), &mut sink, EVENT_URL).await.unwrap();

    assert_eq!(sink.truncations, 2);
    assert_eq!(sink.fights.len(), 4);
    assert_eq!(sink.fighters.len(), 7);
}
