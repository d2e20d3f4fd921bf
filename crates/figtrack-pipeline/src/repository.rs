//! In-memory [`Repository`] implementation.
//!
//! Backs the pipeline's tests and gives embedding callers a zero-setup
//! repository; production deployments bring their own relational
//! implementation of the contract.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;

use figtrack_core::{
    NaturalKey, ProductRecord, ReleaseEntry, RepoError, Repository, SiteFingerprint, SourceSite,
};

#[derive(Default)]
pub struct MemoryRepository {
    products: RwLock<HashMap<NaturalKey, ProductRecord>>,
    fingerprints: RwLock<HashMap<SourceSite, SiteFingerprint>>,
}

impl MemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored products (test convenience).
    pub async fn product_count(&self) -> usize {
        self.products.read().await.len()
    }
}

impl Repository for MemoryRepository {
    async fn find_product(&self, key: &NaturalKey) -> Result<Option<ProductRecord>, RepoError> {
        Ok(self.products.read().await.get(key).cloned())
    }

    async fn upsert_product(&self, record: ProductRecord) -> Result<ProductRecord, RepoError> {
        self.products
            .write()
            .await
            .insert(record.natural_key(), record.clone());
        Ok(record)
    }

    async fn append_release_entries(
        &self,
        key: &NaturalKey,
        entries: Vec<ReleaseEntry>,
    ) -> Result<(), RepoError> {
        let mut products = self.products.write().await;
        let record = products
            .get_mut(key)
            .ok_or_else(|| RepoError::MissingProduct(key.to_string()))?;
        record.release_history.extend(entries);
        record.release_history.sort();
        Ok(())
    }

    async fn get_site_fingerprint(
        &self,
        site: SourceSite,
    ) -> Result<Option<SiteFingerprint>, RepoError> {
        Ok(self.fingerprints.read().await.get(&site).cloned())
    }

    async fn save_site_fingerprint(
        &self,
        site: SourceSite,
        checksum: &str,
    ) -> Result<(), RepoError> {
        self.fingerprints.write().await.insert(
            site,
            SiteFingerprint {
                site,
                checksum: checksum.to_owned(),
                updated_at: Utc::now(),
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use figtrack_core::ReleaseHistory;

    fn record(name: &str) -> ProductRecord {
        ProductRecord {
            url: format!("https://www.goodsmile.info/ja/product/1/{name}"),
            name: name.to_string(),
            maker_id: Some("1".to_string()),
            jan: None,
            series: None,
            manufacturer: "maker".to_string(),
            releaser: None,
            distributer: None,
            category: "figure".to_string(),
            copyright: None,
            size_mm: None,
            scale: None,
            resale: false,
            adult: false,
            sculptors: vec![],
            paintworks: vec![],
            images: vec![],
            release_history: ReleaseHistory::new(),
            order_period: None,
        }
    }

    #[tokio::test]
    async fn upsert_then_find_roundtrips() {
        let repo = MemoryRepository::new();
        let stored = repo.upsert_product(record("saber")).await.expect("upsert");
        let found = repo
            .find_product(&stored.natural_key())
            .await
            .expect("find")
            .expect("present");
        assert_eq!(found.name, "saber");
    }

    #[tokio::test]
    async fn append_to_missing_product_is_an_error() {
        let repo = MemoryRepository::new();
        let err = repo
            .append_release_entries(&record("ghost").natural_key(), vec![])
            .await
            .expect_err("missing product");
        assert!(matches!(err, RepoError::MissingProduct(_)));
    }

    #[tokio::test]
    async fn appended_entries_are_sorted_into_the_history() {
        let repo = MemoryRepository::new();
        let mut r = record("saber");
        r.release_history = ReleaseHistory::from_parsed(
            &[Some(NaiveDate::from_ymd_opt(2022, 5, 1).expect("valid"))],
            &[Some(14800)],
        );
        let key = r.natural_key();
        repo.upsert_product(r).await.expect("upsert");

        repo.append_release_entries(
            &key,
            vec![ReleaseEntry {
                price: Some(12000),
                initial_release_date: Some(NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid")),
                ..ReleaseEntry::default()
            }],
        )
        .await
        .expect("append");

        let found = repo.find_product(&key).await.expect("find").expect("present");
        assert_eq!(found.release_history.len(), 2);
        // Sorted ascending: the appended 2020 wave comes first.
        assert_eq!(
            found
                .release_history
                .get(0)
                .and_then(ReleaseEntry::release_date),
            Some(NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid"))
        );
    }
}
