use anyhow::Result;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use super::base;
use super::SourceScraper;
use crate::models::{CyclingEvent, Difficulty, EventDraft, EventType};

const URL: &str = "https://ridegravel.ch/events/";
const SOURCE_ID: &str = "ridegravel";

static CARD_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.gravel-event").expect("ridegravel card selector"));
static TITLE_LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h2.gravel-event__title a").expect("ridegravel title link"));
static TIME_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("time[datetime]").expect("ridegravel time selector"));
static REGION_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".gravel-event__region").expect("ridegravel region"));
static LEVEL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".gravel-event__level").expect("ridegravel level"));
static TEASER_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".gravel-event__teaser").expect("ridegravel teaser"));

/// Swiss gravel event calendar. Cards carry machine-readable `<time>` tags;
/// the first is the start, an optional second one the end.
pub struct RideGravel;

impl SourceScraper for RideGravel {
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

impl RideGravel {
    pub(crate) fn parse_document(&self, html: &str) -> Result<Vec<CyclingEvent>> {
        let document = Html::parse_document(html);
        let mut events = Vec::new();

        for card in document.select(&CARD_SELECTOR) {
            let mut draft = EventDraft::new(SOURCE_ID);
            draft.title = base::first_text(&card, &TITLE_LINK_SELECTOR);
            draft.country = Some("Switzerland".to_string());
            draft.location = base::first_text(&card, &REGION_SELECTOR);
            draft.description = base::first_text(&card, &TEASER_SELECTOR);
            draft.source_url =
                base::absolute_url(URL, base::first_attr(&card, &TITLE_LINK_SELECTOR, "href"));
            draft.website_url = Some("https://ridegravel.ch".to_string());

            let mut times = card
                .select(&TIME_SELECTOR)
                .filter_map(|node| node.value().attr("datetime"))
                .filter_map(base::parse_date);
            draft.start_date = times.next();
            draft.end_date = times.next();

            draft.event_type = Some(classify(draft.title.as_deref().unwrap_or_default()));
            draft.difficulty = base::first_text(&card, &LEVEL_SELECTOR)
                .as_deref()
                .and_then(parse_level);

            match draft.build() {
                Ok(event) => events.push(event),
                Err(err) => log::debug!("{SOURCE_ID}: skipping listing: {err}"),
            }
        }

        Ok(events)
    }
}

fn classify(title: &str) -> EventType {
    if title.to_lowercase().contains("weekend") {
        EventType::WeekendGetaway
    } else {
        EventType::Tour
    }
}

fn parse_level(text: &str) -> Option<Difficulty> {
    let lower = text.to_lowercase();
    if lower.contains("beginner") || lower.contains("easy") {
        Some(Difficulty::Beginner)
    } else if lower.contains("intermediate") || lower.contains("medium") {
        Some(Difficulty::Intermediate)
    } else if lower.contains("advanced") {
        Some(Difficulty::Advanced)
    } else if lower.contains("expert") || lower.contains("hard") {
        Some(Difficulty::Expert)
    } else {
        None
    }
}
