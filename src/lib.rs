pub mod config;
pub mod db;
pub mod error;
pub mod holidays;
pub mod models;
pub mod pipeline;
pub mod scraping;
mod utils;

pub use db::Store;
pub use error::PipelineError;
pub use models::{CyclingEvent, Difficulty, EventDraft, EventType, HolidayEntry};
pub use pipeline::{run, run_pipeline, RunSummary};
