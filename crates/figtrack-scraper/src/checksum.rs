//! Site-level checksum gate.
//!
//! Deciding whether *anything* changed on a site costs one listing fetch
//! and a digest, against a full crawl of every product page. The gate is
//! stateless between calls except through the persisted
//! [`SiteFingerprint`]; reading ([`ChecksumGate::current`],
//! [`ChecksumGate::is_changed`]) never writes, and only
//! [`ChecksumGate::commit`] persists.

use md5::{Digest, Md5};

use figtrack_core::{RepoError, Repository, SourceSite};

use crate::error::ScraperError;
use crate::fetch::Fetcher;
use crate::announcement;

/// A captured listing observation for one site.
#[derive(Debug)]
pub struct ChecksumGate {
    site: SourceSite,
    listing_url: String,
    listing_html: String,
    current: String,
}

impl ChecksumGate {
    /// Fetches the listing at `listing_url` and digests the site's
    /// feature: the raw page bytes concatenated with the count of
    /// announcement markers. Callers derive the URL from
    /// [`SourceSite::announcement_url`].
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::ChecksumExtraction`] when the listing
    /// cannot be fetched. The failure propagates — the gate must never
    /// report "unchanged" off a failed fetch, and nothing is persisted.
    pub async fn capture(
        site: SourceSite,
        fetcher: &Fetcher,
        listing_url: &str,
    ) -> Result<Self, ScraperError> {
        let listing_html =
            fetcher
                .fetch_text(listing_url)
                .await
                .map_err(|e| ScraperError::ChecksumExtraction {
                    site,
                    reason: e.to_string(),
                })?;

        let current = md5_hex(&feature_bytes(site, listing_url, &listing_html));
        tracing::debug!(%site, listing_url, checksum = %current, "captured listing fingerprint");
        Ok(Self {
            site,
            listing_url: listing_url.to_owned(),
            listing_html,
            current,
        })
    }

    /// URL the listing was captured from.
    #[must_use]
    pub fn listing_url(&self) -> &str {
        &self.listing_url
    }

    #[must_use]
    pub fn site(&self) -> SourceSite {
        self.site
    }

    /// The captured listing page, reusable for candidate-link extraction
    /// without a second fetch.
    #[must_use]
    pub fn listing_html(&self) -> &str {
        &self.listing_html
    }

    /// MD5 hex digest of the captured feature.
    #[must_use]
    pub fn current(&self) -> &str {
        &self.current
    }

    /// Reads the previously committed checksum, if any.
    ///
    /// # Errors
    ///
    /// Propagates [`RepoError`] from the fingerprint store.
    pub async fn previous<R: Repository>(&self, repo: &R) -> Result<Option<String>, RepoError> {
        Ok(repo
            .get_site_fingerprint(self.site)
            .await?
            .map(|fp| fp.checksum))
    }

    /// Whether the captured checksum differs from the committed one. A
    /// site with no fingerprint yet always reads as changed.
    #[must_use]
    pub fn is_changed(&self, previous: Option<&str>) -> bool {
        previous != Some(self.current.as_str())
    }

    /// Persists the captured checksum as the site's fingerprint. The only
    /// mutating operation on the gate; a pass runs it last.
    ///
    /// # Errors
    ///
    /// Propagates [`RepoError`] from the fingerprint store.
    pub async fn commit<R: Repository>(&self, repo: &R) -> Result<(), RepoError> {
        repo.save_site_fingerprint(self.site, &self.current).await
    }
}

/// The site-specific change signal: raw listing bytes plus the
/// announcement-marker count.
fn feature_bytes(site: SourceSite, listing_url: &str, listing_html: &str) -> Vec<u8> {
    let marker_count =
        announcement::announcement_marker_count(site, listing_url, listing_html);
    let mut feature = listing_html.as_bytes().to_vec();
    feature.extend_from_slice(marker_count.to_string().as_bytes());
    feature
}

fn md5_hex(bytes: &[u8]) -> String {
    format!("{:x}", Md5::digest(bytes))
}
