//! Per-site product-page parsers.
//!
//! Every source site implements the same capability set behind
//! [`ProductParser`]; [`parser_for`] selects the implementation from the
//! [`SourceSite`] identifier. Capabilities are independently fallible: a
//! missing anchor fails that one field with a [`ParseError`] and record
//! assembly carries on, so a site shuffling part of its layout degrades a
//! record instead of losing it.

mod alter;
mod gsc;

use chrono::NaiveDate;
use figtrack_core::{
    Lang, OrderPeriod, ProductRecord, ReleaseHistory, SourceSite,
};
use regex::Regex;

use crate::error::ParseError;

pub use alter::AlterParser;
pub use gsc::GscParser;

/// The per-site capability set.
///
/// Each method extracts exactly one field from the already-fetched page.
/// Optional-typed capabilities return `Ok(None)` when the site simply
/// does not publish the field; `Err` means the page deviated from the
/// expected shape.
pub trait ProductParser {
    /// URL the page was fetched from.
    fn url(&self) -> &str;

    /// Language variant, derived from the URL path at construction.
    fn locale(&self) -> Lang;

    fn parse_name(&self) -> Result<String, ParseError>;
    fn parse_series(&self) -> Result<Option<String>, ParseError>;
    fn parse_category(&self) -> Result<String, ParseError>;
    fn parse_manufacturer(&self) -> Result<String, ParseError>;
    fn parse_releaser(&self) -> Result<Option<String>, ParseError>;
    fn parse_distributer(&self) -> Result<Option<String>, ParseError>;
    fn parse_order_period(&self) -> Result<Option<OrderPeriod>, ParseError>;
    fn parse_sculptors(&self) -> Result<Vec<String>, ParseError>;
    fn parse_paintworks(&self) -> Result<Vec<String>, ParseError>;
    fn parse_release_infos(&self) -> Result<ReleaseHistory, ParseError>;
    fn parse_maker_id(&self) -> Result<Option<String>, ParseError>;
    fn parse_scale(&self) -> Result<Option<u32>, ParseError>;
    fn parse_size(&self) -> Result<Option<u32>, ParseError>;
    fn parse_resale(&self) -> Result<bool, ParseError>;
    fn parse_adult(&self) -> Result<bool, ParseError>;
    fn parse_copyright(&self) -> Result<Option<String>, ParseError>;
    fn parse_images(&self) -> Result<Vec<String>, ParseError>;

    /// JAN code, for the sites that publish one.
    fn parse_jan(&self) -> Result<Option<String>, ParseError> {
        Ok(None)
    }
}

/// Selects the parser implementation for a site.
#[must_use]
pub fn parser_for(
    site: SourceSite,
    url: String,
    html: String,
) -> Box<dyn ProductParser + Send + Sync> {
    match site {
        SourceSite::Gsc => Box::new(GscParser::new(url, html)),
        SourceSite::Alter => Box::new(AlterParser::new(url, html)),
    }
}

/// A fully assembled record plus the fields that failed to parse.
#[derive(Debug)]
pub struct ParsedProduct {
    pub record: ProductRecord,
    /// Field-scoped failures collected during assembly. Non-empty means
    /// the record is degraded but still usable.
    pub degraded: Vec<ParseError>,
}

/// Runs every capability, assembles the record, and normalizes its
/// free-text attributes.
///
/// Field failures land in [`ParsedProduct::degraded`]; the first image's
/// `YYYYMMDD` path segment backfills `announced_at` on the first release
/// wave when the page itself did not provide one.
///
/// # Errors
///
/// Returns the [`ParseError`] of the identity field (`name`) — without a
/// name the record cannot be keyed and the item is skipped.
pub fn build_record(parser: &(dyn ProductParser + Send + Sync)) -> Result<ParsedProduct, ParseError> {
    let name = parser.parse_name()?;

    let mut degraded = Vec::new();

    let series = or_degraded(parser.parse_series(), None, &mut degraded);
    let category = or_degraded(parser.parse_category(), String::new(), &mut degraded);
    let manufacturer = or_degraded(parser.parse_manufacturer(), String::new(), &mut degraded);
    let releaser = or_degraded(parser.parse_releaser(), None, &mut degraded);
    let distributer = or_degraded(parser.parse_distributer(), None, &mut degraded);
    let order_period = or_degraded(parser.parse_order_period(), None, &mut degraded);
    let sculptors = or_degraded(parser.parse_sculptors(), Vec::new(), &mut degraded);
    let paintworks = or_degraded(parser.parse_paintworks(), Vec::new(), &mut degraded);
    let mut release_history = or_degraded(
        parser.parse_release_infos(),
        ReleaseHistory::new(),
        &mut degraded,
    );
    let maker_id = or_degraded(parser.parse_maker_id(), None, &mut degraded);
    let jan = or_degraded(parser.parse_jan(), None, &mut degraded);
    let scale = or_degraded(parser.parse_scale(), None, &mut degraded);
    let size_mm = or_degraded(parser.parse_size(), None, &mut degraded);
    let resale = or_degraded(parser.parse_resale(), false, &mut degraded);
    let adult = or_degraded(parser.parse_adult(), false, &mut degraded);
    let copyright = or_degraded(parser.parse_copyright(), None, &mut degraded);
    let images = or_degraded(parser.parse_images(), Vec::new(), &mut degraded);

    if let Some(date) = images.first().and_then(|url| announcement_date_from_image(url)) {
        if let Some(first) = release_history.first_mut() {
            if first.announced_at.is_none() {
                first.announced_at = Some(date);
            }
        }
    }

    let mut record = ProductRecord {
        url: parser.url().to_owned(),
        name,
        maker_id,
        jan,
        series,
        manufacturer,
        releaser,
        distributer,
        category,
        copyright,
        size_mm,
        scale,
        resale,
        adult,
        sculptors,
        paintworks,
        images,
        release_history,
        order_period,
    };
    record.normalize_attrs();

    Ok(ParsedProduct { record, degraded })
}

fn or_degraded<T>(result: Result<T, ParseError>, default: T, degraded: &mut Vec<ParseError>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            degraded.push(err);
            default
        }
    }
}

/// Extracts a `YYYYMMDD` path segment from an image URL. GSC serves
/// product images under a path segment carrying the announcement date.
pub(crate) fn announcement_date_from_image(url: &str) -> Option<NaiveDate> {
    let re = Regex::new(r"/(\d{8})/").expect("valid regex");
    let segment = re.captures(url)?.get(1)?.as_str();
    NaiveDate::parse_from_str(segment, "%Y%m%d").ok()
}

/// Parses every release-month token out of a date cell, in page order.
/// `未定`/`TBD` markers produce `None` entries (announced, not dated).
pub(crate) fn parse_release_months(value: &str) -> Vec<Option<NaiveDate>> {
    let re =
        Regex::new(r"(?:(\d{4})\s*[/年]\s*(\d{1,2})|未定|TBD)").expect("valid regex");
    re.captures_iter(value)
        .map(|cap| match (cap.get(1), cap.get(2)) {
            (Some(year), Some(month)) => {
                let year = year.as_str().parse().ok()?;
                let month = month.as_str().parse().ok()?;
                NaiveDate::from_ymd_opt(year, month, 1)
            }
            _ => None,
        })
        .collect()
}
