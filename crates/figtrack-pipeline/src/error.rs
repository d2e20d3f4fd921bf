use figtrack_core::RepoError;
use figtrack_scraper::ScraperError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Scraper(#[from] ScraperError),

    #[error(transparent)]
    Repo(#[from] RepoError),

    /// Contract misuse by the caller or a parser implementation, e.g. a
    /// record without identity fields reaching persistence. Fatal; never
    /// retried.
    #[error("invalid input for {what}: {reason}")]
    InvalidInput { what: &'static str, reason: String },
}
