use anyhow::Result;
use chrono::NaiveDate;
use serde::Deserialize;

use super::base;
use super::SourceScraper;
use crate::models::{CyclingEvent, Difficulty, EventDraft, EventType};

const URL: &str = "https://www.grouprides.cc/api/v1/rides?region=europe";
const SOURCE_ID: &str = "grouprides";

/// Community-organized group rides. The API already returns ISO dates and a
/// free-text ride kind.
pub struct GroupRides;

#[derive(Deserialize, Debug)]
pub(crate) struct RidesResponse {
    rides: Vec<Ride>,
}

#[derive(Deserialize, Debug)]
struct Ride {
    name: Option<String>,
    description: Option<String>,
    kind: Option<String>,
    country: Option<String>,
    region: Option<String>,
    city: Option<String>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    distance_km: Option<f64>,
    elevation_m: Option<f64>,
    level: Option<String>,
    url: Option<String>,
}

impl SourceScraper for GroupRides {
    fn source_id(&self) -> &'static str {
        SOURCE_ID
    }

    fn source_url(&self) -> &'static str {
        URL
    }

    fn fetch(&self) -> Result<Vec<CyclingEvent>> {
        let response: RidesResponse = base::fetch_json(URL)?;
        Ok(self.parse_response(response))
    }
}

impl GroupRides {
    pub(crate) fn parse_response(&self, response: RidesResponse) -> Vec<CyclingEvent> {
        let mut events = Vec::new();

        for ride in response.rides {
            let mut draft = EventDraft::new(SOURCE_ID);
            draft.title = ride.name;
            draft.description = ride.description;
            draft.country = ride.country;
            draft.location = match (ride.city, ride.region) {
                (Some(city), Some(region)) => Some(format!("{city}, {region}")),
                (city, region) => city.or(region),
            };
            draft.start_date = ride.start_date;
            draft.end_date = ride.end_date;
            draft.distance_km = ride.distance_km;
            draft.elevation_m = ride.elevation_m;
            draft.source_url = ride.url;
            draft.website_url = Some("https://www.grouprides.cc".to_string());
            draft.event_type = Some(classify_kind(ride.kind.as_deref()));
            draft.difficulty = ride.level.as_deref().and_then(parse_level);

            match draft.build() {
                Ok(event) => events.push(event),
                Err(err) => log::debug!("{SOURCE_ID}: skipping ride: {err}"),
            }
        }

        events
    }
}

fn classify_kind(kind: Option<&str>) -> EventType {
    match kind.map(str::to_lowercase).as_deref() {
        Some(k) if k.contains("weekend") || k.contains("fondo") => EventType::WeekendGetaway,
        Some(k) if k.contains("expedition") || k.contains("bikepacking") => EventType::Expedition,
        _ => EventType::Tour,
    }
}

fn parse_level(level: &str) -> Option<Difficulty> {
    match level.to_lowercase().as_str() {
        "beginner" => Some(Difficulty::Beginner),
        "intermediate" => Some(Difficulty::Intermediate),
        "advanced" => Some(Difficulty::Advanced),
        "expert" => Some(Difficulty::Expert),
        _ => None,
    }
}
