//! Persistence contracts.
//!
//! The relational layer is an external collaborator; the pipeline only
//! ever talks to it through [`Repository`]. Backends are expected to make
//! `upsert_product` and `append_release_entries` atomic per call; the
//! pipeline serializes same-key read-compare-write sequences on its side.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::product::{NaturalKey, ProductRecord};
use crate::release::ReleaseEntry;
use crate::site::SourceSite;

/// Persisted checksum-gate state for one site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteFingerprint {
    pub site: SourceSite,
    /// MD5 hex digest of the site's listing feature.
    pub checksum: String,
    pub updated_at: DateTime<Utc>,
}

/// Backend-opaque repository failure.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("repository backend error: {0}")]
    Backend(String),

    #[error("no product stored for key {0}")]
    MissingProduct(String),
}

/// The persistence contract the ingestion pipeline consumes.
///
/// Implementations must be shareable across concurrent per-item tasks;
/// the futures are `Send` so passes can run under a multi-threaded
/// runtime.
pub trait Repository: Send + Sync {
    /// Looks up the stored record matching a natural key.
    fn find_product(
        &self,
        key: &NaturalKey,
    ) -> impl std::future::Future<Output = Result<Option<ProductRecord>, RepoError>> + Send;

    /// Inserts or replaces the record stored under its natural key,
    /// returning the persisted state.
    fn upsert_product(
        &self,
        record: ProductRecord,
    ) -> impl std::future::Future<Output = Result<ProductRecord, RepoError>> + Send;

    /// Appends release waves to an existing product.
    ///
    /// # Errors
    ///
    /// [`RepoError::MissingProduct`] when no record exists for `key`.
    fn append_release_entries(
        &self,
        key: &NaturalKey,
        entries: Vec<ReleaseEntry>,
    ) -> impl std::future::Future<Output = Result<(), RepoError>> + Send;

    /// Reads the persisted checksum-gate state for a site.
    fn get_site_fingerprint(
        &self,
        site: SourceSite,
    ) -> impl std::future::Future<Output = Result<Option<SiteFingerprint>, RepoError>> + Send;

    /// Persists `checksum` as the site's current fingerprint.
    fn save_site_fingerprint(
        &self,
        site: SourceSite,
        checksum: &str,
    ) -> impl std::future::Future<Output = Result<(), RepoError>> + Send;
}
