use figtrack_core::SourceSite;
use thiserror::Error;

/// A field-scoped extraction failure: the expected markup anchor for one
/// capability was absent or malformed.
///
/// One field's `ParseError` never blocks extraction of the others; record
/// assembly collects them and reports the record as degraded. Only the
/// identity field (`name`) is fatal to the item.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error in `{field}`: {reason}")]
pub struct ParseError {
    pub field: &'static str,
    pub reason: String,
}

impl ParseError {
    #[must_use]
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }

    /// The common case: the anchor the parser looks for is not on the
    /// page.
    #[must_use]
    pub fn missing_anchor(field: &'static str) -> Self {
        Self::new(field, "expected markup anchor not found")
    }
}

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Site-level feature extraction failed. The checksum gate propagates
    /// this instead of reporting "unchanged", so a transient failure can
    /// never suppress detection of a real change on the next attempt.
    #[error("checksum feature extraction failed for {site}: {reason}")]
    ChecksumExtraction { site: SourceSite, reason: String },
}
