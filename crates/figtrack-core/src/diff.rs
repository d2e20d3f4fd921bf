//! Release-history diff and classification.
//!
//! Given the previously persisted record (or none) and a freshly parsed
//! one, [`classify`] produces one [`ReleaseStatus`] per release entry, the
//! product-level status, and the mutations to apply. The decision table
//! lives in exactly one place; callers apply the resulting mutations
//! atomically through the repository and never re-derive the rules.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::product::ProductRecord;
use crate::release::{ReleaseEntry, ReleaseHistory};

/// Classification of one observation against stored state.
///
/// Declaration order follows increasing significance, so the
/// product-level status is the maximum over per-entry statuses.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReleaseStatus {
    /// Effective date unchanged, nothing to do.
    Same,
    /// First observation of this product or of a new release wave.
    NewRelease,
    /// The effective date moved later (or a TBD wave got its date).
    Delay,
    /// The site pulled the date entirely.
    Stalled,
    /// Identity or field disagreement the other rules cannot explain;
    /// flagged for human review, never auto-corrected.
    Alter,
}

impl std::fmt::Display for ReleaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ReleaseStatus::Same => "same",
            ReleaseStatus::NewRelease => "new_release",
            ReleaseStatus::Delay => "delay",
            ReleaseStatus::Stalled => "stalled",
            ReleaseStatus::Alter => "alter",
        };
        f.write_str(s)
    }
}

/// A single change to apply to the stored release history.
///
/// Mutations are descriptions, not effects: the engine never touches
/// stored state itself. Indices refer to the stored history after
/// date-sorting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseMutation {
    /// A release wave beyond the previously known count.
    Append(ReleaseEntry),
    /// Move entry `index` to `date` via [`ReleaseEntry::adjust_to`].
    AdjustDate { index: usize, date: NaiveDate },
    /// Clear both date fields of entry `index` via
    /// [`ReleaseEntry::stalled`].
    ClearDates { index: usize },
    /// Mark the product for manual review; no data is rewritten.
    FlagForReview { reason: String },
}

/// Result of classifying one `(previous, incoming)` record pair.
#[derive(Debug, Clone)]
pub struct DiffOutcome {
    /// Product-level status: the maximum per-entry status.
    pub status: ReleaseStatus,
    /// One status per incoming release entry, in sorted-history order.
    pub entry_statuses: Vec<ReleaseStatus>,
    pub mutations: Vec<ReleaseMutation>,
}

impl ReleaseHistory {
    /// Applies one mutation in place. `FlagForReview` deliberately has no
    /// data effect.
    pub fn apply(&mut self, mutation: &ReleaseMutation) {
        match mutation {
            ReleaseMutation::Append(entry) => self.push(*entry),
            ReleaseMutation::AdjustDate { index, date } => {
                if let Some(entry) = self.get_mut(*index) {
                    *entry = entry.adjust_to(*date);
                }
            }
            ReleaseMutation::ClearDates { index } => {
                if let Some(entry) = self.get_mut(*index) {
                    *entry = entry.stalled();
                }
            }
            ReleaseMutation::FlagForReview { .. } => {}
        }
    }
}

/// Classifies a fresh observation against the previously stored record.
///
/// Entry pairs are matched by ordinal position once both histories are
/// date-sorted. Per pair the rules run top to bottom, first match wins:
///
/// 1. no previous record → `NewRelease` (store as-is); entries appended
///    beyond the known count are `NewRelease` for that entry;
/// 2. effective dates equal, identity and price consistent → `Same`;
/// 3. date moved later, or a TBD entry got a date → `Delay` (adjust,
///    preserving the initial date);
/// 4. date pulled → `Stalled` (clear dates, keep the row);
/// 5. everything else → `Alter` (flag for review).
///
/// Every pair is classified; no input shape falls through.
#[must_use]
pub fn classify(previous: Option<&ProductRecord>, incoming: &ProductRecord) -> DiffOutcome {
    let Some(previous) = previous else {
        return DiffOutcome {
            status: ReleaseStatus::NewRelease,
            entry_statuses: incoming
                .release_history
                .iter()
                .map(|_| ReleaseStatus::NewRelease)
                .collect(),
            mutations: Vec::new(),
        };
    };

    let prev_history = previous.release_history.clone().sorted();
    let new_history = incoming.release_history.clone().sorted();

    let mut entry_statuses = Vec::with_capacity(new_history.len());
    let mut mutations = Vec::new();

    for (index, new_entry) in new_history.iter().enumerate() {
        match prev_history.get(index) {
            None => {
                entry_statuses.push(ReleaseStatus::NewRelease);
                mutations.push(ReleaseMutation::Append(*new_entry));
            }
            Some(prev_entry) => {
                let (status, mutation) = classify_entry(index, prev_entry, new_entry);
                entry_statuses.push(status);
                mutations.extend(mutation);
            }
        }
    }

    // A shrunken history (the site removed a historical wave outright) has
    // no rule of its own upstream; it is flagged, not auto-resolved.
    if new_history.len() < prev_history.len() {
        mutations.push(ReleaseMutation::FlagForReview {
            reason: format!(
                "release history shrank from {} to {} entries",
                prev_history.len(),
                new_history.len()
            ),
        });
    }

    for reason in identity_conflicts(previous, incoming) {
        mutations.push(ReleaseMutation::FlagForReview { reason });
    }

    let flagged = mutations
        .iter()
        .any(|m| matches!(m, ReleaseMutation::FlagForReview { .. }));

    let status = entry_statuses
        .iter()
        .copied()
        .max()
        .unwrap_or(ReleaseStatus::Same)
        .max(if flagged {
            ReleaseStatus::Alter
        } else {
            ReleaseStatus::Same
        });

    DiffOutcome {
        status,
        entry_statuses,
        mutations,
    }
}

/// The per-pair decision table. Returns the entry status and, for rules
/// with a data effect, the mutation implementing it.
fn classify_entry(
    index: usize,
    prev: &ReleaseEntry,
    new: &ReleaseEntry,
) -> (ReleaseStatus, Option<ReleaseMutation>) {
    let old_date = prev.release_date();
    let new_date = new.release_date();

    if old_date == new_date {
        if price_conflicts(prev, new) {
            return (
                ReleaseStatus::Alter,
                Some(ReleaseMutation::FlagForReview {
                    reason: format!(
                        "price changed without a date change on entry {index} ({:?} -> {:?})",
                        prev.price, new.price
                    ),
                }),
            );
        }
        return (ReleaseStatus::Same, None);
    }

    let Some(date) = new_date else {
        // Previously dated, now dateless: the site pulled the date.
        return (
            ReleaseStatus::Stalled,
            Some(ReleaseMutation::ClearDates { index }),
        );
    };

    match old_date {
        // Moved later, or a TBD wave got its date: the adjust path fills
        // the initial date directly in the latter case.
        Some(old) if date > old => (
            ReleaseStatus::Delay,
            Some(ReleaseMutation::AdjustDate { index, date }),
        ),
        None => (
            ReleaseStatus::Delay,
            Some(ReleaseMutation::AdjustDate { index, date }),
        ),
        // Both dated and the new date is earlier; these sites do not move
        // dates forward without an errata. Review.
        Some(old) => (
            ReleaseStatus::Alter,
            Some(ReleaseMutation::FlagForReview {
                reason: format!(
                    "effective date moved earlier on entry {index} ({old} -> {date})"
                ),
            }),
        ),
    }
}

/// True when both entries carry a price and the prices disagree. A price
/// appearing where none was known is a fill-in, not a conflict.
fn price_conflicts(prev: &ReleaseEntry, new: &ReleaseEntry) -> bool {
    matches!((prev.price, new.price), (Some(a), Some(b)) if a != b)
}

/// Identity fields that must agree for two observations matched under the
/// same natural key. Disagreement is never auto-corrected.
fn identity_conflicts(previous: &ProductRecord, incoming: &ProductRecord) -> Vec<String> {
    let mut reasons = Vec::new();

    if let (Some(a), Some(b)) = (&previous.jan, &incoming.jan) {
        if a != b {
            reasons.push(format!("jan mismatch ({a} vs {b})"));
        }
    }
    if let (Some(a), Some(b)) = (&previous.maker_id, &incoming.maker_id) {
        if a != b {
            reasons.push(format!("maker id mismatch ({a} vs {b})"));
        }
    }
    if let (Some(a), Some(b)) = (&previous.series, &incoming.series) {
        if a != b {
            reasons.push(format!("series changed without a date change ({a} vs {b})"));
        }
    }

    reasons
}
