use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed set of event categories the platform understands.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    TrainingCamp,
    CyclingHoliday,
    WeekendGetaway,
    Tour,
    Expedition,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::TrainingCamp => "TRAINING_CAMP",
            EventType::CyclingHoliday => "CYCLING_HOLIDAY",
            EventType::WeekendGetaway => "WEEKEND_GETAWAY",
            EventType::Tour => "TOUR",
            EventType::Expedition => "EXPEDITION",
        }
    }
}

impl FromStr for EventType {
    type Err = DraftError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "TRAINING_CAMP" => Ok(EventType::TrainingCamp),
            "CYCLING_HOLIDAY" => Ok(EventType::CyclingHoliday),
            "WEEKEND_GETAWAY" => Ok(EventType::WeekendGetaway),
            "TOUR" => Ok(EventType::Tour),
            "EXPEDITION" => Ok(EventType::Expedition),
            other => Err(DraftError::UnknownEventType(other.to_string())),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

/// Canonical normalized event record. Built only through [`EventDraft::build`],
/// never mutated afterwards.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CyclingEvent {
    pub title: String,
    pub event_type: EventType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub location: Option<String>,
    pub country: String,
    pub source: String,
    pub source_url: Option<String>,
    pub description: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub distance_km: Option<f64>,
    pub elevation_m: Option<f64>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub website_url: Option<String>,
}

impl CyclingEvent {
    /// Inclusive day count, so a one-day ride reports 1.
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("listing has no title")]
    MissingTitle,
    #[error("listing has no start date")]
    MissingStartDate,
    #[error("listing has no event type")]
    MissingEventType,
    #[error("unknown event type: {0}")]
    UnknownEventType(String),
    #[error("end date {end} precedes start date {start}")]
    DatesReversed { start: NaiveDate, end: NaiveDate },
    #[error("listing has no country")]
    MissingCountry,
}

/// Loosely-typed intermediate each scraper fills from site markup. The single
/// funnel into [`CyclingEvent`]: `build` enforces the record invariants so the
/// per-site messiness stays out of the shared model.
#[derive(Debug, Default, Clone)]
pub struct EventDraft {
    pub title: Option<String>,
    pub event_type: Option<EventType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub country: Option<String>,
    pub source: String,
    pub source_url: Option<String>,
    pub description: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub distance_km: Option<f64>,
    pub elevation_m: Option<f64>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub website_url: Option<String>,
}

impl EventDraft {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            ..Self::default()
        }
    }

    pub fn build(self) -> Result<CyclingEvent, DraftError> {
        let title = self
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(DraftError::MissingTitle)?;
        let event_type = self.event_type.ok_or(DraftError::MissingEventType)?;
        let start_date = self.start_date.ok_or(DraftError::MissingStartDate)?;
        // A listing with a start but no end is a one-day event.
        let end_date = self.end_date.unwrap_or(start_date);
        if end_date < start_date {
            return Err(DraftError::DatesReversed {
                start: start_date,
                end: end_date,
            });
        }
        let country = self
            .country
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or(DraftError::MissingCountry)?;

        Ok(CyclingEvent {
            title,
            event_type,
            start_date,
            end_date,
            location: self.location,
            country,
            source: self.source,
            source_url: self.source_url,
            description: self.description,
            difficulty: self.difficulty,
            distance_km: self.distance_km,
            elevation_m: self.elevation_m,
            price_min: self.price_min,
            price_max: self.price_max,
            website_url: self.website_url,
        })
    }
}

/// One public holiday as returned by the calendar provider. Never persisted;
/// consumed only by the holiday expander.
#[derive(Deserialize, Clone, Debug)]
pub struct HolidayEntry {
    pub date: NaiveDate,
    #[serde(rename = "localName")]
    pub local_name: String,
    pub name: String,
    #[serde(rename = "countryCode", default)]
    pub country_code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn draft() -> EventDraft {
        let mut draft = EventDraft::new("test");
        draft.title = Some("Gran Fondo".to_string());
        draft.event_type = Some(EventType::Tour);
        draft.start_date = Some(date(2026, 6, 1));
        draft.end_date = Some(date(2026, 6, 3));
        draft.country = Some("Switzerland".to_string());
        draft
    }

    #[test]
    fn builds_valid_event() {
        let event = draft().build().expect("valid draft");
        assert_eq!(event.title, "Gran Fondo");
        assert_eq!(event.duration_days(), 3);
    }

    #[test]
    fn rejects_reversed_dates() {
        let mut d = draft();
        d.end_date = Some(date(2026, 5, 31));
        assert!(matches!(d.build(), Err(DraftError::DatesReversed { .. })));
    }

    #[test]
    fn missing_end_defaults_to_start() {
        let mut d = draft();
        d.end_date = None;
        let event = d.build().expect("one-day event");
        assert_eq!(event.end_date, event.start_date);
        assert_eq!(event.duration_days(), 1);
    }

    #[test]
    fn rejects_blank_title() {
        let mut d = draft();
        d.title = Some("   ".to_string());
        assert_eq!(d.build().unwrap_err(), DraftError::MissingTitle);
    }

    #[test]
    fn event_type_round_trips_screaming_snake() {
        assert_eq!(
            "WEEKEND_GETAWAY".parse::<EventType>().unwrap(),
            EventType::WeekendGetaway
        );
        assert_eq!(EventType::TrainingCamp.as_str(), "TRAINING_CAMP");
        assert!(matches!(
            "FONDO".parse::<EventType>(),
            Err(DraftError::UnknownEventType(_))
        ));
        let json = serde_json::to_string(&EventType::CyclingHoliday).unwrap();
        assert_eq!(json, "\"CYCLING_HOLIDAY\"");
    }
}
