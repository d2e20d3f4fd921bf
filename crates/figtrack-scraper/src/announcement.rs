//! Candidate-link extraction from announcement/listing pages.
//!
//! The checksum gate fetches a site's listing page once per pass; this
//! module turns that same page into the list of product URLs worth a
//! full crawl.

use figtrack_core::SourceSite;

use crate::html;

/// Extracts product-page URLs from a listing page, de-duplicated, in
/// page order. Relative links are absolutized against the origin of
/// `listing_url`.
#[must_use]
pub fn extract_product_links(
    site: SourceSite,
    listing_url: &str,
    listing_html: &str,
) -> Vec<String> {
    let pattern = match site {
        SourceSite::Gsc => r#"href="([^"]*/[a-z]{2}/product/\d+[^"]*)""#,
        SourceSite::Alter => r#"href="([^"]*/(?:figure|altair|collabo|almecha)/\d+/?)""#,
    };

    let origin = origin_of(listing_url);
    let mut seen = std::collections::HashSet::new();
    html::capture_all(listing_html, pattern)
        .into_iter()
        .map(|href| absolutize(&origin, &href))
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// How many new-announcement markers the listing carries. Folded into the
/// checksum feature so a listing that changes only its marker set still
/// trips the gate.
#[must_use]
pub fn announcement_marker_count(
    site: SourceSite,
    listing_url: &str,
    listing_html: &str,
) -> usize {
    extract_product_links(site, listing_url, listing_html).len()
}

/// The scheme+host origin of a URL: `https://host` from
/// `https://host/any/path`.
pub(crate) fn origin_of(url: &str) -> String {
    url.trim_end_matches('/')
        .splitn(4, '/')
        .take(3)
        .collect::<Vec<_>>()
        .join("/")
}

fn absolutize(origin: &str, href: &str) -> String {
    if href.starts_with('/') {
        format!("{origin}{href}")
    } else {
        href.to_owned()
    }
}
