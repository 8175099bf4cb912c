use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::db::Store;
use crate::error::PipelineError;
use crate::holidays::HolidaySource;
use crate::scraping::{self, SourceScraper};

/// Outcome of one scrape-and-sync pass. A run with failed sources is still a
/// completed run; the counts cover whatever the healthy sources produced.
#[derive(Debug, Clone, Serialize, Default)]
pub struct RunSummary {
    pub inserted: usize,
    pub skipped: usize,
    pub failed_sources: Vec<String>,
}

/// Runs every source once, drops past-dated records, and pushes the rest
/// through the dedup gate. Per-source failures are recorded and the run
/// continues; only an unreachable store aborts.
pub fn run_pipeline(
    store: &Store,
    sources: &[Box<dyn SourceScraper>],
    today: NaiveDate,
) -> Result<RunSummary, PipelineError> {
    let mut candidates = Vec::new();
    let mut failed_sources = Vec::new();

    for source in sources {
        let id = source.source_id();
        match source.fetch() {
            Ok(events) => {
                log::info!("{id}: scraped {} events", events.len());
                candidates.extend(events);
            }
            Err(err) => {
                log::error!("{id}: source failed: {err:#}");
                failed_sources.push(id.to_string());
            }
        }
    }

    let total = candidates.len();
    candidates.retain(|event| event.start_date >= today);
    let dropped = total - candidates.len();
    if dropped > 0 {
        log::info!("dropped {dropped} past-dated events");
    }

    let (inserted, skipped) = store.filter_and_persist(&candidates)?;
    log::info!(
        "run complete: {inserted} inserted, {skipped} skipped, {} sources failed",
        failed_sources.len()
    );

    Ok(RunSummary {
        inserted,
        skipped,
        failed_sources,
    })
}

/// The full scrape-and-sync pass against the configured store: every site
/// scraper plus the holiday expander, as of today.
pub fn run() -> Result<RunSummary, PipelineError> {
    let store = Store::open_default()?;
    let today = Local::now().date_naive();
    let mut sources = scraping::active_scrapers();
    sources.push(Box::new(HolidaySource::for_run(today)));
    run_pipeline(&store, &sources, today)
}
