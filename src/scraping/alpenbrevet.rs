use anyhow::Result;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use super::base;
use super::SourceScraper;
use crate::models::{CyclingEvent, Difficulty, EventDraft, EventType};

const URL: &str = "https://alpenbrevet.ch/en/events";
const SOURCE_ID: &str = "alpenbrevet";

static CARD_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("article.event-teaser").expect("alpenbrevet card selector"));
static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".event-title").expect("alpenbrevet title"));
static DATE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".event-date").expect("alpenbrevet date"));
static LOCATION_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".event-location").expect("alpenbrevet location"));
static STATS_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".event-stats li").expect("alpenbrevet stats"));
static LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.event-link").expect("alpenbrevet link selector"));

/// The classic Swiss alpine pass brevet. Every listing is a supported road
/// tour over the high passes, so type and country are fixed.
pub struct Alpenbrevet;

impl SourceScraper for Alpenbrevet {
    fn source_id(&self) -> &'static str {
        SOURCE_ID
    }

    fn source_url(&self) -> &'static str {
        URL
    }

    fn fetch(&self) -> Result<Vec<CyclingEvent>> {
        let html = base::fetch_html(URL)?;
        self.parse_document(&html)
    }
}

impl Alpenbrevet {
    pub(crate) fn parse_document(&self, html: &str) -> Result<Vec<CyclingEvent>> {
        let document = Html::parse_document(html);
        let mut events = Vec::new();

        for card in document.select(&CARD_SELECTOR) {
            let mut draft = EventDraft::new(SOURCE_ID);
            draft.title = base::first_text(&card, &TITLE_SELECTOR);
            draft.event_type = Some(EventType::Tour);
            draft.country = Some("Switzerland".to_string());
            draft.difficulty = Some(Difficulty::Expert);

            if let Some(date_text) = base::first_text(&card, &DATE_SELECTOR) {
                if let Some((start, end)) = base::parse_date_range(&date_text) {
                    draft.start_date = Some(start);
                    draft.end_date = Some(end);
                }
            }

            draft.location = base::first_text(&card, &LOCATION_SELECTOR);
            draft.source_url =
                base::absolute_url(URL, base::first_attr(&card, &LINK_SELECTOR, "href"));
            draft.website_url = Some("https://alpenbrevet.ch".to_string());

            for stat in card.select(&STATS_SELECTOR) {
                let text = base::inner_text(stat).to_lowercase();
                if text.contains("km") {
                    draft.distance_km = base::parse_number(&text);
                } else if text.contains("hm") || text.contains("elevation") {
                    draft.elevation_m = base::parse_number(&text);
                }
            }

            match draft.build() {
                Ok(event) => events.push(event),
                Err(err) => log::debug!("{SOURCE_ID}: skipping listing: {err}"),
            }
        }

        Ok(events)
    }
}
