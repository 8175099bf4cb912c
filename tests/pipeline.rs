use chrono::NaiveDate;

use velo_scout::pipeline::run_pipeline;
use velo_scout::scraping::SourceScraper;
use velo_scout::{CyclingEvent, EventDraft, EventType, Store};

struct StubSource {
    id: &'static str,
    events: Vec<CyclingEvent>,
}

impl SourceScraper for StubSource {
    fn source_id(&self) -> &'static str {
        self.id
    }

    fn source_url(&self) -> &'static str {
        "https://stub.example.com"
    }

    fn fetch(&self) -> anyhow::Result<Vec<CyclingEvent>> {
        Ok(self.events.clone())
    }
}

struct BrokenSource;

impl SourceScraper for BrokenSource {
    fn source_id(&self) -> &'static str {
        "broken"
    }

    fn source_url(&self) -> &'static str {
        "https://broken.example.com"
    }

    fn fetch(&self) -> anyhow::Result<Vec<CyclingEvent>> {
        anyhow::bail!("site unreachable")
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn tour(source: &str, title: &str, start: NaiveDate) -> CyclingEvent {
    let mut draft = EventDraft::new(source);
    draft.title = Some(title.to_string());
    draft.event_type = Some(EventType::Tour);
    draft.start_date = Some(start);
    draft.country = Some("Switzerland".to_string());
    draft.build().unwrap()
}

fn today() -> NaiveDate {
    date(2026, 1, 15)
}

#[test]
fn single_future_tour_is_inserted_once() {
    let store = Store::open_in_memory().unwrap();
    let sources: Vec<Box<dyn SourceScraper>> = vec![Box::new(StubSource {
        id: "stub",
        events: vec![tour("stub", "Alpen Classic", date(2026, 8, 29))],
    })];

    let summary = run_pipeline(&store, &sources, today()).unwrap();
    assert_eq!(summary.inserted, 1);
    assert_eq!(summary.skipped, 0);
    assert!(summary.failed_sources.is_empty());
    assert_eq!(store.count_events().unwrap(), 1);

    // Same source data again: nothing new, everything skipped.
    let rerun = run_pipeline(&store, &sources, today()).unwrap();
    assert_eq!(rerun.inserted, 0);
    assert_eq!(rerun.skipped, 1);
    assert_eq!(store.count_events().unwrap(), 1);
}

#[test]
fn title_formatting_variants_are_one_event() {
    let store = Store::open_in_memory().unwrap();
    let start = date(2026, 8, 29);
    let sources: Vec<Box<dyn SourceScraper>> = vec![Box::new(StubSource {
        id: "stub",
        events: vec![
            tour("stub", "Alpen Classic ", start),
            tour("stub", "alpen classic", start),
            tour("stub", "ALPEN CLASSIC", start),
        ],
    })];

    let summary = run_pipeline(&store, &sources, today()).unwrap();
    assert_eq!(summary.inserted, 1);
    assert_eq!(summary.skipped, 2);
}

#[test]
fn past_dated_records_never_reach_the_store() {
    let store = Store::open_in_memory().unwrap();
    let sources: Vec<Box<dyn SourceScraper>> = vec![Box::new(StubSource {
        id: "stub",
        events: vec![
            tour("stub", "Last Year's Fondo", date(2025, 6, 1)),
            tour("stub", "Yesterday's Ride", date(2026, 1, 14)),
            tour("stub", "Today's Ride", today()),
            tour("stub", "Future Tour", date(2026, 6, 1)),
        ],
    })];

    let summary = run_pipeline(&store, &sources, today()).unwrap();
    assert_eq!(summary.inserted, 2, "today and future survive");
    assert_eq!(summary.skipped, 0);
    assert_eq!(store.count_events().unwrap(), 2);
}

#[test]
fn failing_source_is_isolated() {
    let store = Store::open_in_memory().unwrap();
    let sources: Vec<Box<dyn SourceScraper>> = vec![
        Box::new(BrokenSource),
        Box::new(StubSource {
            id: "healthy",
            events: vec![tour("healthy", "Gravel Weekend", date(2026, 7, 4))],
        }),
    ];

    let summary = run_pipeline(&store, &sources, today()).unwrap();
    assert_eq!(summary.failed_sources, vec!["broken".to_string()]);
    assert_eq!(summary.inserted, 1, "healthy source still lands");
    assert_eq!(summary.skipped, 0);
}

#[test]
fn all_sources_failing_still_completes() {
    let store = Store::open_in_memory().unwrap();
    let sources: Vec<Box<dyn SourceScraper>> = vec![Box::new(BrokenSource)];

    let summary = run_pipeline(&store, &sources, today()).unwrap();
    assert_eq!(summary.inserted, 0);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.failed_sources, vec!["broken".to_string()]);
}

#[test]
fn same_title_different_source_is_not_a_duplicate() {
    let store = Store::open_in_memory().unwrap();
    let start = date(2026, 8, 29);
    let sources: Vec<Box<dyn SourceScraper>> = vec![
        Box::new(StubSource {
            id: "a",
            events: vec![tour("a", "Alpen Classic", start)],
        }),
        Box::new(StubSource {
            id: "b",
            events: vec![tour("b", "Alpen Classic", start)],
        }),
    ];

    let summary = run_pipeline(&store, &sources, today()).unwrap();
    assert_eq!(summary.inserted, 2);
}

#[test]
fn shared_source_url_wins_over_differing_titles() {
    let store = Store::open_in_memory().unwrap();
    let mut first = tour("a", "Alpenbrevet 2026", date(2026, 8, 29));
    first.source_url = Some("https://alpenbrevet.ch/e/1".to_string());
    let mut second = tour("b", "Alpenbrevet (classic edition)", date(2026, 8, 29));
    second.source_url = Some("https://alpenbrevet.ch/e/1/?utm=x".to_string());

    let sources: Vec<Box<dyn SourceScraper>> = vec![
        Box::new(StubSource {
            id: "a",
            events: vec![first],
        }),
        Box::new(StubSource {
            id: "b",
            events: vec![second],
        }),
    ];

    let summary = run_pipeline(&store, &sources, today()).unwrap();
    assert_eq!(summary.inserted, 1);
    assert_eq!(summary.skipped, 1);
}
