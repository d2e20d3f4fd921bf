//! Per-site pass orchestration: gate → parse → classify → persist → emit.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};

use figtrack_core::{
    classify, AppConfig, DiffOutcome, NaturalKey, ProductRecord, ReleaseMutation, ReleaseStatus,
    RepoError, Repository, SourceSite,
};
use figtrack_scraper::{announcement, build_record, parser_for, ChecksumGate, Fetcher};

use crate::error::PipelineError;
use crate::feed::FeedItem;
use crate::locks::KeyedLocks;

/// Result of one site pass.
#[derive(Debug)]
pub struct SitePassSummary {
    pub site: SourceSite,
    /// `false` means the gate short-circuited the pass: nothing was
    /// crawled and nothing was committed.
    pub checksum_changed: bool,
    pub items: Vec<FeedItem>,
    pub skipped: Vec<SkippedItem>,
}

/// An item dropped from the pass, with the reason reported downstream.
#[derive(Debug)]
pub struct SkippedItem {
    pub url: String,
    pub reason: String,
}

/// The ingestion pipeline. Invoked per site by an external scheduler;
/// holds no state between passes beyond what the repository persists.
pub struct Tracker<R> {
    repo: Arc<R>,
    fetcher: Fetcher,
    config: AppConfig,
    locks: KeyedLocks,
}

impl<R: Repository> Tracker<R> {
    /// Builds a tracker over the given repository.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Scraper`] if the HTTP client cannot be
    /// constructed.
    pub fn new(repo: Arc<R>, config: AppConfig) -> Result<Self, PipelineError> {
        let fetcher = Fetcher::from_config(&config)?;
        Ok(Self {
            repo,
            fetcher,
            config,
            locks: KeyedLocks::new(),
        })
    }

    /// Runs a full pass for `site`, using the announcement listing for
    /// `year` as the change signal and candidate source.
    ///
    /// # Errors
    ///
    /// See [`Self::run_listing_pass`].
    pub async fn run_site_pass(
        &self,
        site: SourceSite,
        year: i32,
    ) -> Result<SitePassSummary, PipelineError> {
        self.run_listing_pass(site, &site.announcement_url(year)).await
    }

    /// Runs a full pass for `site` against an explicit listing URL.
    ///
    /// Site-level failures (listing fetch, fingerprint reads, the final
    /// commit) abort the pass and leave the stored fingerprint intact;
    /// item-level failures are isolated into
    /// [`SitePassSummary::skipped`].
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Scraper`] — the listing could not be captured.
    /// - [`PipelineError::Repo`] — the fingerprint store failed.
    pub async fn run_listing_pass(
        &self,
        site: SourceSite,
        listing_url: &str,
    ) -> Result<SitePassSummary, PipelineError> {
        let gate = ChecksumGate::capture(site, &self.fetcher, listing_url).await?;
        let previous = gate.previous(self.repo.as_ref()).await?;

        if !gate.is_changed(previous.as_deref()) {
            tracing::info!(%site, "listing fingerprint unchanged; skipping crawl");
            return Ok(SitePassSummary {
                site,
                checksum_changed: false,
                items: Vec::new(),
                skipped: Vec::new(),
            });
        }

        let links = announcement::extract_product_links(site, listing_url, gate.listing_html());
        tracing::info!(
            %site,
            candidates = links.len(),
            "listing fingerprint changed; crawling candidate pages"
        );

        // Politeness limit: bounds in-flight requests against this site.
        let max_concurrent = self.config.max_concurrent_requests.max(1);
        let outcomes: Vec<Result<FeedItem, SkippedItem>> = stream::iter(links)
            .map(|url| self.process_product(site, url))
            .buffer_unordered(max_concurrent)
            .collect()
            .await;

        let mut items = Vec::new();
        let mut skipped = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(item) => items.push(item),
                Err(skip) => {
                    tracing::warn!(%site, url = %skip.url, reason = %skip.reason, "item skipped");
                    skipped.push(skip);
                }
            }
        }

        // Commit is the pass's final operation: a pass that died above
        // leaves the previous fingerprint in place for the next attempt.
        gate.commit(self.repo.as_ref()).await?;

        Ok(SitePassSummary {
            site,
            checksum_changed: true,
            items,
            skipped,
        })
    }

    /// Fetches, parses, classifies, and persists one candidate page.
    /// Every failure is captured in the returned [`SkippedItem`] so one
    /// bad page never aborts its siblings.
    async fn process_product(
        &self,
        site: SourceSite,
        url: String,
    ) -> Result<FeedItem, SkippedItem> {
        let html = self.fetcher.fetch_text(&url).await.map_err(|e| SkippedItem {
            url: url.clone(),
            reason: format!("fetch failed: {e}"),
        })?;

        if self.config.inter_request_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.inter_request_delay_ms)).await;
        }

        let parser = parser_for(site, url.clone(), html);
        let parsed = build_record(parser.as_ref()).map_err(|e| SkippedItem {
            url: url.clone(),
            reason: format!("identity field unparseable: {e}"),
        })?;

        for err in &parsed.degraded {
            tracing::warn!(%site, url = %url, field = err.field, reason = %err.reason, "field degraded");
        }
        let record = parsed.record;
        let key = record.natural_key();

        // Same-key read-compare-write runs under the key's lock; the
        // guard spans classification and persistence.
        let _guard = self.locks.acquire(&key).await;

        let previous = self
            .repo
            .find_product(&key)
            .await
            .map_err(|e| SkippedItem {
                url: url.clone(),
                reason: format!("repository read failed: {e}"),
            })?;

        let outcome = classify(previous.as_ref(), &record);
        tracing::debug!(%site, key = %key, status = %outcome.status, "classified");

        let persisted = self
            .apply_outcome(previous, record, &outcome, &key)
            .await
            .map_err(|e| SkippedItem {
                url: url.clone(),
                reason: format!("repository write failed: {e}"),
            })?;

        Ok(FeedItem::from_record(&persisted, outcome.status))
    }

    /// Applies the classification's mutations through the repository.
    ///
    /// - first observation: stored as-is;
    /// - `Alter`: nothing is overwritten — the stored record stands until
    ///   a human resolves the flag;
    /// - otherwise: date mutations rewrite the stored history (pure
    ///   rewrite, then one upsert), appended waves go through
    ///   `append_release_entries`.
    async fn apply_outcome(
        &self,
        previous: Option<ProductRecord>,
        incoming: ProductRecord,
        outcome: &DiffOutcome,
        key: &NaturalKey,
    ) -> Result<ProductRecord, RepoError> {
        let Some(prev) = previous else {
            return self.repo.upsert_product(incoming).await;
        };

        if outcome.status == ReleaseStatus::Alter {
            for mutation in &outcome.mutations {
                if let ReleaseMutation::FlagForReview { reason } = mutation {
                    tracing::warn!(key = %key, reason = %reason, "flagged for review; stored record left untouched");
                }
            }
            return Ok(incoming);
        }

        if outcome.status == ReleaseStatus::Same {
            return Ok(prev);
        }

        // Mutation indices refer to the date-sorted history.
        let mut history = prev.release_history.clone().sorted();
        let mut appended = Vec::new();
        for mutation in &outcome.mutations {
            match mutation {
                ReleaseMutation::Append(entry) => appended.push(*entry),
                ReleaseMutation::AdjustDate { .. } | ReleaseMutation::ClearDates { .. } => {
                    history.apply(mutation);
                }
                ReleaseMutation::FlagForReview { .. } => {}
            }
        }
        history.sort();

        // Fresh descriptive fields, mutated history: the stored initial
        // dates survive while everything else tracks the live page.
        let mut updated = incoming;
        updated.release_history = history;
        let stored = self.repo.upsert_product(updated).await?;

        if appended.is_empty() {
            return Ok(stored);
        }
        self.repo.append_release_entries(key, appended).await?;
        Ok(self.repo.find_product(key).await?.unwrap_or(stored))
    }
}
