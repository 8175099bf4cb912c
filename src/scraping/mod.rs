pub mod alpenbrevet;
pub mod base;
pub mod bikepacking;
pub mod grouprides;
pub mod kudos_cycling;
pub mod myswitzerland;
pub mod ridegravel;
pub mod sunvelo;

use crate::models::CyclingEvent;

/// One external site or feed supplying event listings. Each call to `fetch`
/// re-fetches; no retries happen at this level.
pub trait SourceScraper: Send + Sync {
    fn source_id(&self) -> &'static str;
    fn source_url(&self) -> &'static str;
    fn fetch(&self) -> anyhow::Result<Vec<CyclingEvent>>;
}

#[derive(Clone)]
pub struct SourceInfo {
    pub id: String,
    pub url: String,
}

pub fn active_scrapers() -> Vec<Box<dyn SourceScraper>> {
    vec![
        Box::new(alpenbrevet::Alpenbrevet),
        Box::new(ridegravel::RideGravel),
        Box::new(myswitzerland::MySwitzerland),
        Box::new(kudos_cycling::KudosCycling),
        Box::new(sunvelo::SunVelo),
        Box::new(grouprides::GroupRides),
        Box::new(bikepacking::Bikepacking),
    ]
}

pub fn list_sources() -> Vec<SourceInfo> {
    active_scrapers()
        .into_iter()
        .map(|scraper| SourceInfo {
            id: scraper.source_id().to_string(),
            url: scraper.source_url().to_string(),
        })
        .collect()
}

pub fn find_scraper(id: &str) -> Option<Box<dyn SourceScraper>> {
    active_scrapers()
        .into_iter()
        .find(|scraper| scraper.source_id() == id)
}
