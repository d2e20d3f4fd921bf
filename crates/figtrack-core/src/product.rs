//! The canonical product record and its identity key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::normalize::{normalize, normalize_all};
use crate::release::{ReleaseEntry, ReleaseHistory};

/// One tracked product, as assembled from a single page observation.
///
/// The record is owned by the ingestion pipeline until it is handed to
/// the repository; identity comparisons on later passes always go through
/// freshly loaded repository state, never a cached record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub url: String,
    /// Official product name. The only parse field whose absence
    /// invalidates the whole record.
    pub name: String,
    /// Site-assigned product id, when the site exposes one.
    pub maker_id: Option<String>,
    /// 13-digit JAN code; globally unique when present.
    pub jan: Option<String>,
    pub series: Option<String>,
    pub manufacturer: String,
    pub releaser: Option<String>,
    pub distributer: Option<String>,
    pub category: String,
    pub copyright: Option<String>,
    /// Height in millimetres.
    pub size_mm: Option<u32>,
    /// Scale denominator: a 1/7 figure stores 7.
    pub scale: Option<u32>,
    pub resale: bool,
    pub adult: bool,
    pub sculptors: Vec<String>,
    pub paintworks: Vec<String>,
    /// Image URLs in page order. The first image's path may embed the
    /// announcement date as a `YYYYMMDD` segment.
    pub images: Vec<String>,
    pub release_history: ReleaseHistory,
    pub order_period: Option<OrderPeriod>,
}

impl ProductRecord {
    /// The identity used to match this product across repeated
    /// observations: JAN when present, else the maker-assigned id scoped
    /// by manufacturer, else manufacturer plus name.
    #[must_use]
    pub fn natural_key(&self) -> NaturalKey {
        if let Some(jan) = &self.jan {
            return NaturalKey::Jan(jan.clone());
        }
        if let Some(maker_id) = &self.maker_id {
            return NaturalKey::MakerId {
                manufacturer: self.manufacturer.clone(),
                maker_id: maker_id.clone(),
            };
        }
        NaturalKey::Name {
            manufacturer: self.manufacturer.clone(),
            name: self.name.clone(),
        }
    }

    /// Runs every free-text attribute through the normalizer. Called once
    /// by record assembly, before the record is considered complete.
    pub fn normalize_attrs(&mut self) {
        self.name = normalize(&self.name);
        self.manufacturer = normalize(&self.manufacturer);
        self.series = self.series.as_deref().map(normalize);
        self.releaser = self.releaser.as_deref().map(normalize);
        self.distributer = self.distributer.as_deref().map(normalize);
        self.sculptors = normalize_all(&self.sculptors);
        self.paintworks = normalize_all(&self.paintworks);
    }

    /// The most recent release wave, if any.
    #[must_use]
    pub fn last_release(&self) -> Option<&ReleaseEntry> {
        self.release_history.last()
    }
}

/// Cross-observation identity of a product, independent of any
/// database-generated id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NaturalKey {
    Jan(String),
    MakerId { manufacturer: String, maker_id: String },
    Name { manufacturer: String, name: String },
}

impl std::fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NaturalKey::Jan(jan) => write!(f, "jan:{jan}"),
            NaturalKey::MakerId {
                manufacturer,
                maker_id,
            } => write!(f, "{manufacturer}#{maker_id}"),
            NaturalKey::Name { manufacturer, name } => write!(f, "{manufacturer}:{name}"),
        }
    }
}

/// A pre-order sale window. `end` is absent for open-ended windows
/// ("while stocks last").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPeriod {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

impl OrderPeriod {
    /// Whether `t` falls inside the window.
    #[must_use]
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        t >= self.start && self.end.is_none_or(|end| t <= end)
    }

    #[must_use]
    pub fn is_open_ended(&self) -> bool {
        self.end.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_record() -> ProductRecord {
        ProductRecord {
            url: "https://www.goodsmile.info/ja/product/4364".to_string(),
            name: "ねんどろいど 初音ミク".to_string(),
            maker_id: Some("4364".to_string()),
            jan: None,
            series: Some("キャラクター・ボーカル・シリーズ01".to_string()),
            manufacturer: "Good Smile Company".to_string(),
            releaser: None,
            distributer: None,
            category: "ねんどろいど".to_string(),
            copyright: Some("© Crypton Future Media, INC.".to_string()),
            size_mm: Some(100),
            scale: None,
            resale: false,
            adult: false,
            sculptors: vec!["ねんどろん".to_string()],
            paintworks: vec![],
            images: vec![],
            release_history: ReleaseHistory::new(),
            order_period: None,
        }
    }

    #[test]
    fn natural_key_prefers_jan() {
        let mut record = make_record();
        record.jan = Some("4580590126930".to_string());
        assert_eq!(
            record.natural_key(),
            NaturalKey::Jan("4580590126930".to_string())
        );
    }

    #[test]
    fn natural_key_falls_back_to_maker_id() {
        let record = make_record();
        assert_eq!(
            record.natural_key(),
            NaturalKey::MakerId {
                manufacturer: "Good Smile Company".to_string(),
                maker_id: "4364".to_string(),
            }
        );
    }

    #[test]
    fn natural_key_falls_back_to_name_last() {
        let mut record = make_record();
        record.maker_id = None;
        assert_eq!(
            record.natural_key(),
            NaturalKey::Name {
                manufacturer: "Good Smile Company".to_string(),
                name: "ねんどろいど 初音ミク".to_string(),
            }
        );
    }

    #[test]
    fn normalize_attrs_touches_every_free_text_field() {
        let mut record = make_record();
        record.name = "ｆｉｇｍａ  忍野忍".to_string();
        record.manufacturer = "ＫＡＤＯＫＡＷＡ".to_string();
        record.series = Some("化物語\u{3000}セカンドシーズン".to_string());
        record.sculptors = vec!["浅井真紀\u{3000}".to_string()];
        record.normalize_attrs();

        assert_eq!(record.name, "figma 忍野忍");
        assert_eq!(record.manufacturer, "KADOKAWA");
        assert_eq!(record.series.as_deref(), Some("化物語 セカンドシーズン"));
        assert_eq!(record.sculptors, vec!["浅井真紀 "]);
    }

    #[test]
    fn order_period_contains_checks_bounds() {
        let period = OrderPeriod {
            start: Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap(),
            end: Some(Utc.with_ymd_and_hms(2024, 3, 1, 21, 0, 0).unwrap()),
        };
        assert!(period.contains(Utc.with_ymd_and_hms(2024, 2, 15, 0, 0, 0).unwrap()));
        assert!(!period.contains(Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap()));
        assert!(!period.contains(Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap()));
    }

    #[test]
    fn open_ended_order_period_contains_any_later_time() {
        let period = OrderPeriod {
            start: Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap(),
            end: None,
        };
        assert!(period.is_open_ended());
        assert!(period.contains(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()));
    }
}
