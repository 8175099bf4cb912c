use anyhow::Result;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use super::base;
use super::SourceScraper;
use crate::models::{CyclingEvent, Difficulty, EventDraft, EventType};

const URL: &str = "https://www.kudoscycling.com/trips";
const SOURCE_ID: &str = "kudos_cycling";

static CARD_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.trip-card").expect("kudos card selector"));
static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".trip-card__title a").expect("kudos title"));
static KIND_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".trip-card__kind").expect("kudos kind"));
static DATES_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".trip-card__dates").expect("kudos dates"));
static PLACE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".trip-card__destination").expect("kudos destination"));
static PRICE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".trip-card__price").expect("kudos price"));
static BLURB_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".trip-card__blurb").expect("kudos blurb"));

/// Commercial training camps and cycling holidays. Destination lines read
/// "Port de Pollença, Mallorca, Spain" with the country last.
pub struct KudosCycling;

impl SourceScraper for KudosCycling {
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

impl KudosCycling {
    pub(crate) fn parse_document(&self, html: &str) -> Result<Vec<CyclingEvent>> {
        let document = Html::parse_document(html);
        let mut events = Vec::new();

        for card in document.select(&CARD_SELECTOR) {
            let mut draft = EventDraft::new(SOURCE_ID);
            draft.title = base::first_text(&card, &TITLE_SELECTOR);
            draft.description = base::first_text(&card, &BLURB_SELECTOR);
            draft.source_url =
                base::absolute_url(URL, base::first_attr(&card, &TITLE_SELECTOR, "href"));
            draft.website_url = Some("https://www.kudoscycling.com".to_string());
            draft.difficulty = Some(Difficulty::Advanced);

            draft.event_type = base::first_text(&card, &KIND_SELECTOR)
                .as_deref()
                .map(classify_kind);

            if let Some(dates) = base::first_text(&card, &DATES_SELECTOR) {
                if let Some((start, end)) = base::parse_date_range(&dates) {
                    draft.start_date = Some(start);
                    draft.end_date = Some(end);
                }
            }

            if let Some(place) = base::first_text(&card, &PLACE_SELECTOR) {
                let (location, country) = split_destination(&place);
                draft.location = location;
                draft.country = country;
            }

            if let Some(price) = base::first_text(&card, &PRICE_SELECTOR) {
                let (min, max) = base::parse_price_range(&price);
                draft.price_min = min;
                draft.price_max = max;
            }

            match draft.build() {
                Ok(event) => events.push(event),
                Err(err) => log::debug!("{SOURCE_ID}: skipping listing: {err}"),
            }
        }

        Ok(events)
    }
}

fn classify_kind(kind: &str) -> EventType {
    let lower = kind.to_lowercase();
    if lower.contains("training") || lower.contains("camp") {
        EventType::TrainingCamp
    } else if lower.contains("tour") {
        EventType::Tour
    } else {
        EventType::CyclingHoliday
    }
}

/// "City, Region, Country" -> (Some("City, Region"), Some("Country")).
fn split_destination(place: &str) -> (Option<String>, Option<String>) {
    match place.rsplit_once(',') {
        Some((rest, country)) => (
            Some(base::clean_text(rest)),
            Some(base::clean_text(country)),
        ),
        None => (None, Some(base::clean_text(place))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const SAMPLE_HTML: &str = r#"
    <div class="trip-grid">
        <div class="trip-card">
            <span class="trip-card__kind">Training Camp</span>
            <h3 class="trip-card__title"><a href="/trips/mallorca-spring">Mallorca Spring Training Camp</a></h3>
            <span class="trip-card__dates">15 March 2026 – 22 March 2026</span>
            <span class="trip-card__destination">Port de Pollença, Mallorca, Spain</span>
            <span class="trip-card__price">EUR 1'200 – 1'800</span>
            <p class="trip-card__blurb">Professional training camp in cycling paradise.</p>
        </div>
        <div class="trip-card">
            <span class="trip-card__kind">Cycling Holiday</span>
            <h3 class="trip-card__title"><a href="/trips/dolomites">Dolomites Cycling Holiday</a></h3>
            <span class="trip-card__dates">20 June 2026 – 27 June 2026</span>
            <span class="trip-card__destination">Cortina d'Ampezzo, Italy</span>
            <span class="trip-card__price">EUR 1'500 – 2'200</span>
        </div>
        <div class="trip-card">
            <h3 class="trip-card__title"><a href="/trips/soon">Coming soon</a></h3>
            <span class="trip-card__destination">Somewhere</span>
        </div>
    </div>
    "#;

    #[test]
    fn parses_trip_cards() {
        let events = KudosCycling.parse_document(SAMPLE_HTML).expect("parse html");
        assert_eq!(events.len(), 2, "undated card must be dropped");

        let camp = &events[0];
        assert_eq!(camp.event_type, EventType::TrainingCamp);
        assert_eq!(camp.country, "Spain");
        assert_eq!(camp.location.as_deref(), Some("Port de Pollença, Mallorca"));
        assert_eq!(camp.price_min, Some(1200.0));
        assert_eq!(camp.price_max, Some(1800.0));
        assert_eq!(
            camp.start_date,
            NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
        );
        assert_eq!(camp.duration_days(), 8);

        let holiday = &events[1];
        assert_eq!(holiday.event_type, EventType::CyclingHoliday);
        assert_eq!(holiday.country, "Italy");
    }
}
