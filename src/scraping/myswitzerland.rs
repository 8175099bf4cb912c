use anyhow::Result;
use serde::Deserialize;

use super::base;
use super::SourceScraper;
use crate::models::{CyclingEvent, EventDraft, EventType};

const URL: &str = "https://www.myswitzerland.com/api/offers?category=cycling";
const SOURCE_ID: &str = "myswitzerland";

/// The tourism-board offer feed. Offers are typed loosely; anything that is
/// not recognizably a camp or a getaway is treated as a tour.
pub struct MySwitzerland;

#[derive(Deserialize, Debug)]
pub(crate) struct OfferFeed {
    offers: Vec<Offer>,
}

#[derive(Deserialize, Debug)]
struct Offer {
    title: Option<String>,
    #[serde(rename = "abstract")]
    summary: Option<String>,
    #[serde(rename = "validFrom")]
    valid_from: Option<String>,
    #[serde(rename = "validThrough")]
    valid_through: Option<String>,
    area: Option<String>,
    category: Option<String>,
    url: Option<String>,
}

impl SourceScraper for MySwitzerland {
    fn source_id(&self) -> &'static str {
        SOURCE_ID
    }

    fn source_url(&self) -> &'static str {
        URL
    }

    fn fetch(&self) -> Result<Vec<CyclingEvent>> {
        let feed: OfferFeed = base::fetch_json(URL)?;
        Ok(self.parse_feed(feed))
    }
}

impl MySwitzerland {
    pub(crate) fn parse_feed(&self, feed: OfferFeed) -> Vec<CyclingEvent> {
        let mut events = Vec::new();

        for offer in feed.offers {
            let mut draft = EventDraft::new(SOURCE_ID);
            draft.title = offer.title;
            draft.description = offer.summary;
            draft.country = Some("Switzerland".to_string());
            draft.location = offer.area;
            draft.source_url = offer.url;
            draft.website_url = Some("https://www.myswitzerland.com".to_string());
            draft.start_date = offer.valid_from.as_deref().and_then(base::parse_date);
            draft.end_date = offer.valid_through.as_deref().and_then(base::parse_date);
            draft.event_type = Some(classify_category(offer.category.as_deref()));

            match draft.build() {
                Ok(event) => events.push(event),
                Err(err) => log::debug!("{SOURCE_ID}: skipping offer: {err}"),
            }
        }

        events
    }
}

fn classify_category(category: Option<&str>) -> EventType {
    match category.map(str::to_lowercase).as_deref() {
        Some(c) if c.contains("camp") => EventType::TrainingCamp,
        Some(c) if c.contains("weekend") => EventType::WeekendGetaway,
        Some(c) if c.contains("holiday") || c.contains("stay") => EventType::CyclingHoliday,
        _ => EventType::Tour,
    }
}
