use thiserror::Error;

/// Run-level failure. Per-source and per-listing problems are recovered
/// locally inside the scrapers and the orchestrator; only losing the
/// persistence sink is fatal for a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("persistence sink unavailable: {0}")]
    Store(#[from] rusqlite::Error),
}
