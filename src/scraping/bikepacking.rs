use anyhow::Result;
use chrono::NaiveDate;
use serde::Deserialize;

use super::base;
use super::SourceScraper;
use crate::models::{CyclingEvent, Difficulty, EventDraft, EventType};

const URL: &str = "https://bikepacking.com/feed/events.json";
const SOURCE_ID: &str = "bikepacking";

const MILES_TO_KM: f64 = 1.609_344;

/// Bikepacking.com's event feed. Everything here is a self-supported
/// multi-day route, so records come out as expeditions. Distances arrive in
/// miles and are converted.
pub struct Bikepacking;

#[derive(Deserialize, Debug)]
pub(crate) struct EventsFeed {
    events: Vec<FeedEvent>,
}

#[derive(Deserialize, Debug)]
struct FeedEvent {
    title: Option<String>,
    excerpt: Option<String>,
    country: Option<String>,
    region: Option<String>,
    date_start: Option<NaiveDate>,
    date_end: Option<NaiveDate>,
    distance_mi: Option<f64>,
    link: Option<String>,
}

impl SourceScraper for Bikepacking {
    fn source_id(&self) -> &'static str {
        SOURCE_ID
    }

    fn source_url(&self) -> &'static str {
        URL
    }

    fn fetch(&self) -> Result<Vec<CyclingEvent>> {
        let feed: EventsFeed = base::fetch_json(URL)?;
        Ok(self.parse_feed(feed))
    }
}

impl Bikepacking {
    pub(crate) fn parse_feed(&self, feed: EventsFeed) -> Vec<CyclingEvent> {
        let mut events = Vec::new();

        for item in feed.events {
            let mut draft = EventDraft::new(SOURCE_ID);
            draft.title = item.title;
            draft.description = item.excerpt;
            draft.country = item.country;
            draft.location = item.region;
            draft.start_date = item.date_start;
            draft.end_date = item.date_end;
            draft.distance_km = item.distance_mi.map(|mi| mi * MILES_TO_KM);
            draft.source_url = item.link;
            draft.website_url = Some("https://bikepacking.com".to_string());
            draft.event_type = Some(EventType::Expedition);
            draft.difficulty = Some(Difficulty::Expert);

            match draft.build() {
                Ok(event) => events.push(event),
                Err(err) => log::debug!("{SOURCE_ID}: skipping feed item: {err}"),
            }
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_JSON: &str = r#"{
        "events": [
            {
                "title": "Scottish Highlands Traverse",
                "excerpt": "Multi-day bikepacking through Scotland's wilderness",
                "country": "United Kingdom",
                "region": "Scottish Highlands",
                "date_start": "2026-06-10",
                "date_end": "2026-06-17",
                "distance_mi": 373,
                "link": "https://bikepacking.com/events/scottish-highlands"
            },
            {
                "title": "Pyrenees Traverse",
                "country": "France",
                "region": "Pyrenees",
                "date_start": "2026-07-01",
                "date_end": "2026-07-10",
                "link": "https://bikepacking.com/events/pyrenees-traverse"
            },
            {
                "excerpt": "An event with no name",
                "country": "Spain",
                "date_start": "2026-07-01"
            }
        ]
    }"#;

    #[test]
    fn parses_events_feed() {
        let feed: EventsFeed = serde_json::from_str(SAMPLE_JSON).expect("valid feed");
        let events = Bikepacking.parse_feed(feed);
        assert_eq!(events.len(), 2, "titleless item must be dropped");

        let highlands = &events[0];
        assert_eq!(highlands.event_type, EventType::Expedition);
        assert_eq!(highlands.country, "United Kingdom");
        let km = highlands.distance_km.unwrap();
        assert!((km - 600.0).abs() < 1.0, "miles should convert to km: {km}");

        assert_eq!(events[1].duration_days(), 10);
    }
}
