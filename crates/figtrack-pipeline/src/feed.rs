//! The per-product item emitted to the notification collaborator.

use chrono::NaiveDate;
use serde::Serialize;

use figtrack_core::{OrderPeriod, ProductRecord, ReleaseHistory, ReleaseStatus};

/// Flattened product view plus the computed classification, serialized
/// for the downstream notification layer.
///
/// `price` and `release_date` project the latest release wave so simple
/// consumers need not walk the history.
#[derive(Debug, Clone, Serialize)]
pub struct FeedItem {
    pub url: String,
    pub name: String,
    pub series: Option<String>,
    pub manufacturer: String,
    pub category: String,
    pub price: Option<u32>,
    pub release_date: Option<NaiveDate>,
    pub release_history: ReleaseHistory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_period: Option<OrderPeriod>,
    pub size_mm: Option<u32>,
    pub scale: Option<u32>,
    pub sculptors: Vec<String>,
    pub paintworks: Vec<String>,
    pub resale: bool,
    pub adult: bool,
    pub copyright: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub releaser: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distributer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maker_id: Option<String>,
    pub images: Vec<String>,
    pub status: ReleaseStatus,
}

impl FeedItem {
    #[must_use]
    pub fn from_record(record: &ProductRecord, status: ReleaseStatus) -> Self {
        let last = record.last_release();
        Self {
            url: record.url.clone(),
            name: record.name.clone(),
            series: record.series.clone(),
            manufacturer: record.manufacturer.clone(),
            category: record.category.clone(),
            price: last.and_then(|entry| entry.price),
            release_date: last.and_then(figtrack_core::ReleaseEntry::release_date),
            release_history: record.release_history.clone(),
            order_period: record.order_period,
            size_mm: record.size_mm,
            scale: record.scale,
            sculptors: record.sculptors.clone(),
            paintworks: record.paintworks.clone(),
            resale: record.resale,
            adult: record.adult,
            copyright: record.copyright.clone(),
            releaser: record.releaser.clone(),
            distributer: record.distributer.clone(),
            jan: record.jan.clone(),
            maker_id: record.maker_id.clone(),
            images: record.images.clone(),
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figtrack_core::ReleaseHistory;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).expect("valid test date")
    }

    fn record() -> ProductRecord {
        ProductRecord {
            url: "https://www.goodsmile.info/ja/product/9943/".to_string(),
            name: "セイバーオルタ".to_string(),
            maker_id: Some("9943".to_string()),
            jan: None,
            series: Some("Fate/stay night".to_string()),
            manufacturer: "グッドスマイルカンパニー".to_string(),
            releaser: None,
            distributer: None,
            category: "1/7スケールフィギュア".to_string(),
            copyright: None,
            size_mm: Some(250),
            scale: Some(7),
            resale: false,
            adult: false,
            sculptors: vec![],
            paintworks: vec![],
            images: vec![],
            release_history: ReleaseHistory::from_parsed(
                &[Some(d(2020, 1, 1)), Some(d(2022, 5, 1))],
                &[Some(14800), Some(16800)],
            ),
            order_period: None,
        }
    }

    #[test]
    fn price_and_date_project_the_latest_wave() {
        let item = FeedItem::from_record(&record(), ReleaseStatus::NewRelease);
        assert_eq!(item.price, Some(16800));
        assert_eq!(item.release_date, Some(d(2022, 5, 1)));
        assert_eq!(item.status, ReleaseStatus::NewRelease);
    }

    #[test]
    fn absent_optionals_are_omitted_from_json() {
        let item = FeedItem::from_record(&record(), ReleaseStatus::Same);
        let json = serde_json::to_value(&item).expect("serializable");
        assert!(json.get("jan").is_none(), "absent jan is omitted");
        assert!(json.get("order_period").is_none());
        assert_eq!(json["status"], "SAME");
        assert_eq!(json["maker_id"], "9943");
    }
}
