//! Release entries and per-product release history.
//!
//! A product can be released more than once (initial run, re-releases),
//! so release data is a sequence of entries, each carrying its own price
//! and dates. Sites frequently publish partial data: a wave without a
//! price, a wave without a date ("TBD"), or fewer prices than dates.
//! [`ReleaseHistory::from_parsed`] absorbs all of those shapes into a
//! uniform sequence.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One release wave of a product.
///
/// `initial_release_date` holds the date as first announced; when a site
/// pushes the date back, the new date lands in `adjusted_release_date`
/// and the original is preserved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseEntry {
    /// Price in JPY, tax included where the site lists it that way.
    pub price: Option<u32>,
    pub initial_release_date: Option<NaiveDate>,
    pub adjusted_release_date: Option<NaiveDate>,
    /// Date the wave was announced, when derivable.
    pub announced_at: Option<NaiveDate>,
    pub shipped_at: Option<NaiveDate>,
}

impl ReleaseEntry {
    /// The effective release date: the adjusted date when present, else
    /// the initial one. This is what end users see on the site.
    #[must_use]
    pub fn release_date(&self) -> Option<NaiveDate> {
        self.adjusted_release_date.or(self.initial_release_date)
    }

    /// Returns this entry moved to `date`.
    ///
    /// If an initial date exists it is preserved and `date` becomes the
    /// adjusted date; an entry that was still TBD takes `date` as its
    /// initial date directly.
    #[must_use]
    pub fn adjust_to(mut self, date: NaiveDate) -> Self {
        if self.initial_release_date.is_some() {
            self.adjusted_release_date = Some(date);
        } else {
            self.initial_release_date = Some(date);
        }
        self
    }

    /// Returns this entry with both date fields cleared (the site pulled
    /// the date). Price and announcement data survive.
    #[must_use]
    pub fn stalled(mut self) -> Self {
        self.initial_release_date = None;
        self.adjusted_release_date = None;
        self
    }
}

/// Ordered sequence of release waves for one product.
///
/// Invariant: entries without an effective date sort before all dated
/// entries (unannounced releases first), dated entries ascend by
/// effective date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReleaseHistory {
    entries: Vec<ReleaseEntry>,
}

impl ReleaseHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a history from the date and price series a parser produced,
    /// enforcing the alignment invariant:
    ///
    /// - no prices → every date gets a `None` price;
    /// - fewer prices than dates → the last known price is replicated
    ///   forward (sites often list the price once for several waves);
    /// - no dates → every price gets an entry with a null date.
    ///
    /// The result is sorted (TBD entries first, then ascending).
    #[must_use]
    pub fn from_parsed(dates: &[Option<NaiveDate>], prices: &[Option<u32>]) -> Self {
        let mut entries = Vec::with_capacity(dates.len().max(prices.len()));

        if dates.is_empty() {
            for price in prices {
                entries.push(ReleaseEntry {
                    price: *price,
                    ..ReleaseEntry::default()
                });
            }
        } else {
            for (i, date) in dates.iter().enumerate() {
                let price = prices.get(i).or_else(|| prices.last()).copied().flatten();
                entries.push(ReleaseEntry {
                    price,
                    initial_release_date: *date,
                    ..ReleaseEntry::default()
                });
            }
        }

        let mut history = Self { entries };
        history.sort();
        history
    }

    pub fn push(&mut self, entry: ReleaseEntry) {
        self.entries.push(entry);
    }

    /// Re-establishes the ordering invariant. `Option<NaiveDate>` orders
    /// `None` first, which is exactly the nulls-first rule.
    pub fn sort(&mut self) {
        self.entries.sort_by_key(ReleaseEntry::release_date);
    }

    /// Consuming variant of [`Self::sort`] for construction chains.
    #[must_use]
    pub fn sorted(mut self) -> Self {
        self.sort();
        self
    }

    /// The most recent wave, by the ordering invariant.
    #[must_use]
    pub fn last(&self) -> Option<&ReleaseEntry> {
        self.entries.last()
    }

    pub fn first_mut(&mut self) -> Option<&mut ReleaseEntry> {
        self.entries.first_mut()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ReleaseEntry> {
        self.entries.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut ReleaseEntry> {
        self.entries.get_mut(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReleaseEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn entries(&self) -> &[ReleaseEntry] {
        &self.entries
    }

    pub fn extend<I: IntoIterator<Item = ReleaseEntry>>(&mut self, entries: I) {
        self.entries.extend(entries);
    }
}

impl<'a> IntoIterator for &'a ReleaseHistory {
    type Item = &'a ReleaseEntry;
    type IntoIter = std::slice::Iter<'a, ReleaseEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<ReleaseEntry> for ReleaseHistory {
    fn from_iter<I: IntoIterator<Item = ReleaseEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
