//! Source-site and locale identifiers.

use serde::{Deserialize, Serialize};

/// A tracked source site. Sites form a closed set; parser selection and
/// fingerprint storage key off this enum rather than runtime type checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceSite {
    /// Good Smile Company (goodsmile.info).
    Gsc,
    /// Alter (alter-web.jp).
    Alter,
}

impl SourceSite {
    /// Every tracked site, in pass order.
    pub const ALL: [SourceSite; 2] = [SourceSite::Gsc, SourceSite::Alter];

    /// Hostname the site publishes under.
    #[must_use]
    pub fn host(self) -> &'static str {
        match self {
            SourceSite::Gsc => "www.goodsmile.info",
            SourceSite::Alter => "www.alter-web.jp",
        }
    }

    /// URL of the announcement/listing page for `year`, used by the
    /// checksum gate and as the source of candidate product links.
    ///
    /// GSC enumerates scale-figure announcements per year; Alter lists
    /// products by release year.
    #[must_use]
    pub fn announcement_url(self, year: i32) -> String {
        match self {
            SourceSite::Gsc => {
                format!("https://www.goodsmile.info/ja/products/category/scale/announced/{year}")
            }
            SourceSite::Alter => {
                format!("https://www.alter-web.jp/products/?yy={year}&mm=")
            }
        }
    }
}

impl std::fmt::Display for SourceSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceSite::Gsc => write!(f, "gsc"),
            SourceSite::Alter => write!(f, "alter"),
        }
    }
}

/// Language variant of a fetched page, derived from the URL path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lang {
    En,
    Ja,
    Zh,
}

impl Lang {
    /// Extracts the locale from a URL path segment (`/en/`, `/ja/`,
    /// `/zh/`). Returns `None` when the URL carries no locale segment;
    /// ja-only sites fall back to [`Lang::Ja`].
    #[must_use]
    pub fn from_url(url: &str) -> Option<Lang> {
        let path_start = url.find("://").map_or(0, |i| i + 3);
        let path = url[path_start..].split_once('/').map(|(_, p)| p)?;
        match path.split('/').next() {
            Some("en") => Some(Lang::En),
            Some("ja") => Some(Lang::Ja),
            Some("zh") => Some(Lang::Zh),
            _ => None,
        }
    }

    /// The two-letter path code for this locale.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Lang::En => "en",
            Lang::Ja => "ja",
            Lang::Zh => "zh",
        }
    }
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
