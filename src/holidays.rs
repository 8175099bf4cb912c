use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::models::{CyclingEvent, Difficulty, EventDraft, EventType, HolidayEntry};
use crate::scraping::base;

const API_BASE: &str = "https://date.nager.at/api/v3";
pub const HOLIDAY_SOURCE: &str = "european_holidays";

/// The cycling-relevant European markets, ISO alpha-2 code and display name.
const COUNTRIES: [(&str, &str); 18] = [
    ("AT", "Austria"),
    ("BE", "Belgium"),
    ("CH", "Switzerland"),
    ("DE", "Germany"),
    ("DK", "Denmark"),
    ("ES", "Spain"),
    ("FR", "France"),
    ("GB", "United Kingdom"),
    ("IT", "Italy"),
    ("NL", "Netherlands"),
    ("NO", "Norway"),
    ("PT", "Portugal"),
    ("SE", "Sweden"),
    ("CZ", "Czech Republic"),
    ("PL", "Poland"),
    ("HR", "Croatia"),
    ("SI", "Slovenia"),
    ("GR", "Greece"),
];

fn country_name(code: &str) -> String {
    COUNTRIES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| code.to_string())
}

/// Derives weekend-getaway suggestions from public-holiday calendars. Only
/// holidays that land on a Friday or Monday produce an event; a midweek
/// holiday is not an exploitable long weekend.
pub struct HolidayExpander {
    countries: Vec<String>,
}

/// Outcome of one year's sweep over the configured countries.
#[derive(Debug, Default)]
pub struct Expansion {
    pub events: Vec<CyclingEvent>,
    pub fetched_countries: usize,
    pub failed_countries: usize,
}

impl Default for HolidayExpander {
    fn default() -> Self {
        Self::new()
    }
}

impl HolidayExpander {
    pub fn new() -> Self {
        Self {
            countries: COUNTRIES.iter().map(|(code, _)| code.to_string()).collect(),
        }
    }

    pub fn with_countries(countries: Vec<String>) -> Self {
        Self { countries }
    }

    pub fn expand(&self, year: i32) -> Vec<CyclingEvent> {
        self.sweep(year).events
    }

    pub fn sweep(&self, year: i32) -> Expansion {
        self.sweep_with(year, |url| base::fetch_json(url))
    }

    /// One calendar fetch per country; a failed country is logged and
    /// skipped, the rest continue.
    fn sweep_with<F>(&self, year: i32, fetch: F) -> Expansion
    where
        F: Fn(&str) -> anyhow::Result<Vec<HolidayEntry>>,
    {
        let mut sweep = Expansion::default();

        for code in &self.countries {
            let url = format!("{API_BASE}/publicholidays/{year}/{code}");
            let holidays = match fetch(&url) {
                Ok(holidays) => holidays,
                Err(err) => {
                    log::warn!("holiday calendar fetch failed for {code}: {err:#}");
                    sweep.failed_countries += 1;
                    continue;
                }
            };
            log::info!("fetched {} holidays for {code}", holidays.len());
            sweep.fetched_countries += 1;

            for holiday in holidays {
                if let Some(event) = getaway_for_holiday(code, &holiday) {
                    sweep.events.push(event);
                }
            }
        }

        sweep
    }
}

/// Adapter that lets the orchestrator drive the expander through the same
/// contract as the site scrapers, failure isolation included.
pub struct HolidaySource {
    expander: HolidayExpander,
    years: Vec<i32>,
}

impl HolidaySource {
    pub fn for_run(today: NaiveDate) -> Self {
        let expander = match crate::config::AppConfig::load().countries {
            Some(countries) if !countries.is_empty() => {
                HolidayExpander::with_countries(countries)
            }
            _ => HolidayExpander::new(),
        };
        Self {
            expander,
            years: years_for(today),
        }
    }
}

impl crate::scraping::SourceScraper for HolidaySource {
    fn source_id(&self) -> &'static str {
        HOLIDAY_SOURCE
    }

    fn source_url(&self) -> &'static str {
        API_BASE
    }

    fn fetch(&self) -> anyhow::Result<Vec<CyclingEvent>> {
        let sweeps = self
            .years
            .iter()
            .map(|year| self.expander.sweep(*year))
            .collect();
        collect_sweeps(sweeps)
    }
}

/// A run with some calendars down keeps going on the rest, but a sweep where
/// no calendar answered at all is a whole-source failure.
fn collect_sweeps(sweeps: Vec<Expansion>) -> anyhow::Result<Vec<CyclingEvent>> {
    let fetched: usize = sweeps.iter().map(|sweep| sweep.fetched_countries).sum();
    let failed: usize = sweeps.iter().map(|sweep| sweep.failed_countries).sum();
    if fetched == 0 && failed > 0 {
        anyhow::bail!("all {failed} holiday calendar fetches failed");
    }
    Ok(sweeps.into_iter().flat_map(|sweep| sweep.events).collect())
}

/// Years worth expanding for a run happening on `today`: always the current
/// year, plus the next one from October onward so winter runs still surface
/// spring getaways.
pub fn years_for(today: NaiveDate) -> Vec<i32> {
    if today.month() >= 10 {
        vec![today.year(), today.year() + 1]
    } else {
        vec![today.year()]
    }
}

/// A Monday holiday spans Saturday..Monday, a Friday one Friday..Sunday.
/// Everything else yields nothing.
pub fn getaway_for_holiday(country_code: &str, holiday: &HolidayEntry) -> Option<CyclingEvent> {
    let (start, end) = match holiday.date.weekday() {
        Weekday::Mon => (holiday.date - Duration::days(2), holiday.date),
        Weekday::Fri => (holiday.date, holiday.date + Duration::days(2)),
        _ => return None,
    };

    let country = country_name(country_code);
    let mut draft = EventDraft::new(HOLIDAY_SOURCE);
    draft.title = Some(format!(
        "{} Cycling Weekend - {country}",
        holiday.local_name
    ));
    draft.description = Some(format!(
        "Special cycling weekend during the {} holiday. Perfect time for a cycling getaway in {country}.",
        holiday.name
    ));
    draft.event_type = Some(EventType::WeekendGetaway);
    draft.country = Some(country);
    draft.start_date = Some(start);
    draft.end_date = Some(end);
    draft.difficulty = Some(Difficulty::Intermediate);
    // Deliberately no source_url: the calendar API has no per-event page, and
    // a shared URL would collapse every getaway into one dedup group.
    draft.website_url = Some("https://date.nager.at".to_string());

    match draft.build() {
        Ok(event) => Some(event),
        Err(err) => {
            log::debug!("skipping holiday {:?}: {err}", holiday.name);
            None
        }
    }
}
