//! Regex-level markup helpers shared by the site parsers.
//!
//! The parsers anchor on small, stable fragments (a labelled `<dt>/<dd>`
//! pair, a class attribute, an image `src`) rather than walking a DOM, so
//! a full HTML library stays out of the dependency tree.

use regex::Regex;

/// Removes tags from a fragment, decodes the handful of entities the
/// tracked sites emit, and collapses the result to trimmed text.
pub(crate) fn strip_tags(fragment: &str) -> String {
    let re = Regex::new(r"<[^>]*>").expect("valid regex");
    let text = re.replace_all(fragment, " ");
    decode_entities(&text)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}

/// First capture group of `pattern` against `html`.
pub(crate) fn capture(html: &str, pattern: &str) -> Option<String> {
    let re = Regex::new(pattern).expect("valid regex");
    re.captures(html)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

/// Every first-group capture of `pattern` against `html`, in order.
pub(crate) fn capture_all(html: &str, pattern: &str) -> Vec<String> {
    let re = Regex::new(pattern).expect("valid regex");
    re.captures_iter(html)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Text of the `<dd>` paired with a `<dt>` whose text matches one of
/// `labels` (GSC's detail list). Labels are matched literally.
pub(crate) fn definition_value(html: &str, labels: &[&str]) -> Option<String> {
    definition_values(html, labels).into_iter().next()
}

/// Every `<dd>` paired with a matching `<dt>`, in page order. Sites list
/// one row per release wave for prices and dates.
pub(crate) fn definition_values(html: &str, labels: &[&str]) -> Vec<String> {
    let mut values = Vec::new();
    for label in labels {
        let pattern = format!(
            r"(?s)<dt[^>]*>\s*(?:<[^>]*>\s*)*{}\s*(?:</[^>]*>\s*)*</dt>\s*<dd[^>]*>(.*?)</dd>",
            regex::escape(label)
        );
        let re = Regex::new(&pattern).expect("valid regex");
        values.extend(
            re.captures_iter(html)
                .filter_map(|cap| cap.get(1).map(|m| strip_tags(m.as_str()))),
        );
        if !values.is_empty() {
            break;
        }
    }
    values
}

/// Text of the `<td>` paired with a `<th>` whose text matches one of
/// `labels` (Alter's spec table).
pub(crate) fn table_value(html: &str, labels: &[&str]) -> Option<String> {
    for label in labels {
        let pattern = format!(
            r"(?s)<th[^>]*>\s*(?:<[^>]*>\s*)*{}\s*(?:</[^>]*>\s*)*</th>\s*<td[^>]*>(.*?)</td>",
            regex::escape(label)
        );
        let re = Regex::new(&pattern).expect("valid regex");
        if let Some(cap) = re.captures(html) {
            if let Some(m) = cap.get(1) {
                return Some(strip_tags(m.as_str()));
            }
        }
    }
    None
}

/// Splits a credit line ("曳地イヲ・えこし（ひなたかほり工房）", "A / B")
/// into individual names.
pub(crate) fn split_names(value: &str) -> Vec<String> {
    value
        .split(['、', '・', '/', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses a price like `14,800円（税込）` or `13,200 JPY` to integer yen.
pub(crate) fn parse_price(value: &str) -> Option<u32> {
    let re = Regex::new(r"([0-9][0-9,]*)").expect("valid regex");
    let digits = re.captures(value)?.get(1)?.as_str().replace(',', "");
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_tags_flattens_markup_and_entities() {
        assert_eq!(
            strip_tags("<span class=\"price\">14,800&nbsp;&#39;yen&#39;</span>"),
            "14,800 'yen'"
        );
    }

    #[test]
    fn definition_value_finds_labelled_dd() {
        let html = "<dl><dt>メーカー</dt><dd><a href=\"/maker\">グッドスマイルカンパニー</a></dd></dl>";
        assert_eq!(
            definition_value(html, &["メーカー"]).as_deref(),
            Some("グッドスマイルカンパニー")
        );
    }

    #[test]
    fn definition_value_tries_labels_in_order() {
        let html = "<dt>Manufacturer</dt><dd>Good Smile Company</dd>";
        assert_eq!(
            definition_value(html, &["メーカー", "Manufacturer"]).as_deref(),
            Some("Good Smile Company")
        );
    }

    #[test]
    fn definition_values_returns_every_matching_row() {
        let html = concat!(
            "<dt>価格</dt><dd>12,000円</dd>",
            "<dt>価格</dt><dd>13,500円</dd>",
        );
        assert_eq!(
            definition_values(html, &["価格"]),
            vec!["12,000円", "13,500円"]
        );
    }

    #[test]
    fn missing_label_yields_none() {
        assert_eq!(definition_value("<p>no list here</p>", &["メーカー"]), None);
    }

    #[test]
    fn table_value_finds_labelled_td() {
        let html = "<tr><th>発売月</th><td>2022年7月</td></tr>";
        assert_eq!(table_value(html, &["発売月"]).as_deref(), Some("2022年7月"));
    }

    #[test]
    fn split_names_handles_japanese_separators() {
        assert_eq!(
            split_names("曳地イヲ・えこし"),
            vec!["曳地イヲ", "えこし"]
        );
        assert_eq!(split_names("A / B"), vec!["A", "B"]);
        assert_eq!(split_names(""), Vec::<String>::new());
    }

    #[test]
    fn parse_price_strips_grouping_and_currency() {
        assert_eq!(parse_price("14,800円（税込）"), Some(14800));
        assert_eq!(parse_price("13,200 JPY"), Some(13200));
        assert_eq!(parse_price("未定"), None);
    }
}
