use anyhow::Result;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use super::base;
use super::SourceScraper;
use crate::models::{CyclingEvent, Difficulty, EventDraft, EventType};

const URL: &str = "https://sunvelo.com/holidays";
const SOURCE_ID: &str = "sunvelo";

static CARD_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("article.holiday").expect("sunvelo card selector"));
static NAME_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h2.holiday__name a").expect("sunvelo name"));
static DATES_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".holiday__dates").expect("sunvelo dates"));
static REGION_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".holiday__region").expect("sunvelo region"));
static COUNTRY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".holiday__country").expect("sunvelo country"));
static PRICE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".holiday__price").expect("sunvelo price"));
static SUMMARY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".holiday__summary").expect("sunvelo summary"));

/// Guided sun-destination cycling holidays; mostly week-long stays, the odd
/// multi-stop tour.
pub struct SunVelo;

impl SourceScraper for SunVelo {
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

impl SunVelo {
    pub(crate) fn parse_document(&self, html: &str) -> Result<Vec<CyclingEvent>> {
        let document = Html::parse_document(html);
        let mut events = Vec::new();

        for card in document.select(&CARD_SELECTOR) {
            let mut draft = EventDraft::new(SOURCE_ID);
            draft.title = base::first_text(&card, &NAME_SELECTOR);
            draft.location = base::first_text(&card, &REGION_SELECTOR);
            draft.country = base::first_text(&card, &COUNTRY_SELECTOR);
            draft.description = base::first_text(&card, &SUMMARY_SELECTOR);
            draft.source_url =
                base::absolute_url(URL, base::first_attr(&card, &NAME_SELECTOR, "href"));
            draft.website_url = Some("https://sunvelo.com".to_string());
            draft.difficulty = Some(Difficulty::Intermediate);

            draft.event_type = Some(classify(draft.title.as_deref().unwrap_or_default()));

            if let Some(dates) = base::first_text(&card, &DATES_SELECTOR) {
                if let Some((start, end)) = base::parse_date_range(&dates) {
                    draft.start_date = Some(start);
                    draft.end_date = Some(end);
                }
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

fn classify(title: &str) -> EventType {
    if title.to_lowercase().contains("tour") {
        EventType::Tour
    } else {
        EventType::CyclingHoliday
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"
    <section>
        <article class="holiday">
            <h2 class="holiday__name"><a href="/holidays/andalusia">Andalusia Cycling Experience</a></h2>
            <span class="holiday__dates">10 April 2026 – 17 April 2026</span>
            <span class="holiday__region">Andalusia</span>
            <span class="holiday__country">Spain</span>
            <span class="holiday__price">from EUR 1'100</span>
            <p class="holiday__summary">Sunny cycling holiday in southern Spain.</p>
        </article>
        <article class="holiday">
            <h2 class="holiday__name"><a href="/holidays/douro">Portugal Coast &amp; Wine Tour</a></h2>
            <span class="holiday__dates">5 May 2026 – 12 May 2026</span>
            <span class="holiday__region">Douro Valley</span>
            <span class="holiday__country">Portugal</span>
            <span class="holiday__price">EUR 1'300 – 1'900</span>
        </article>
        <article class="holiday">
            <h2 class="holiday__name"><a href="/holidays/tba">Secret Destination</a></h2>
            <span class="holiday__dates">10 April 2026</span>
        </article>
    </section>
    "#;

    #[test]
    fn parses_holiday_cards() {
        let events = SunVelo.parse_document(SAMPLE_HTML).expect("parse html");
        assert_eq!(events.len(), 2, "card without a country must be dropped");

        let andalusia = &events[0];
        assert_eq!(andalusia.event_type, EventType::CyclingHoliday);
        assert_eq!(andalusia.country, "Spain");
        assert_eq!(andalusia.price_min, Some(1100.0));
        assert_eq!(andalusia.price_max, Some(1100.0));
        assert_eq!(andalusia.duration_days(), 8);

        let douro = &events[1];
        assert_eq!(douro.event_type, EventType::Tour);
        assert_eq!(douro.price_max, Some(1900.0));
    }
}
