//! Alter product-page parser.
//!
//! Alter publishes in Japanese only and lays product details out as a
//! `<th>/<td>` spec table. The site exposes no JAN code and no order
//! period; the category is encoded in the URL path rather than the page.

use chrono::NaiveDate;
use figtrack_core::{Lang, OrderPeriod, ReleaseHistory};

use crate::error::ParseError;
use crate::html;
use crate::parser::{parse_release_months, ProductParser};

pub struct AlterParser {
    url: String,
    html: String,
}

impl AlterParser {
    #[must_use]
    pub fn new(url: String, html: String) -> Self {
        Self { url, html }
    }

    fn spec(&self, labels: &[&str]) -> Option<String> {
        html::table_value(&self.html, labels)
    }
}

impl ProductParser for AlterParser {
    fn url(&self) -> &str {
        &self.url
    }

    fn locale(&self) -> Lang {
        // Alter URLs carry no locale segment.
        Lang::from_url(&self.url).unwrap_or(Lang::Ja)
    }

    fn parse_name(&self) -> Result<String, ParseError> {
        html::capture(&self.html, r#"(?s)<h2[^>]*class="hl06"[^>]*>(.*?)</h2>"#)
            .or_else(|| html::capture(&self.html, r"(?s)<h2[^>]*>(.*?)</h2>"))
            .map(|raw| html::strip_tags(&raw))
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ParseError::missing_anchor("name"))
    }

    fn parse_series(&self) -> Result<Option<String>, ParseError> {
        Ok(self.spec(&["作品名"]).filter(|s| !s.is_empty()))
    }

    fn parse_category(&self) -> Result<String, ParseError> {
        let segment = html::capture(&self.url, r"/(figure|altair|collabo|almecha)/\d+");
        Ok(match segment.as_deref() {
            Some("altair") => "Altair".to_string(),
            Some("collabo") => "Collabo".to_string(),
            Some("almecha") => "Almecha".to_string(),
            Some(_) => "Figure".to_string(),
            None => "Other".to_string(),
        })
    }

    fn parse_manufacturer(&self) -> Result<String, ParseError> {
        // Alter manufactures everything it lists.
        Ok("アルター".to_string())
    }

    fn parse_releaser(&self) -> Result<Option<String>, ParseError> {
        Ok(self.spec(&["発売元"]).filter(|s| !s.is_empty()))
    }

    fn parse_distributer(&self) -> Result<Option<String>, ParseError> {
        Ok(self.spec(&["販売元"]).filter(|s| !s.is_empty()))
    }

    fn parse_order_period(&self) -> Result<Option<OrderPeriod>, ParseError> {
        // Alter does not announce one.
        Ok(None)
    }

    fn parse_sculptors(&self) -> Result<Vec<String>, ParseError> {
        Ok(self
            .spec(&["原型", "原型制作"])
            .map(|cell| html::split_names(&cell))
            .unwrap_or_default())
    }

    fn parse_paintworks(&self) -> Result<Vec<String>, ParseError> {
        Ok(self
            .spec(&["彩色", "塗装"])
            .map(|cell| html::split_names(&cell))
            .unwrap_or_default())
    }

    fn parse_release_infos(&self) -> Result<ReleaseHistory, ParseError> {
        let Some(cell) = self.spec(&["発売月", "発売時期"]) else {
            return Err(ParseError::missing_anchor("release_infos"));
        };

        let dates: Vec<Option<NaiveDate>> = parse_release_months(&cell);
        let dates = if dates.is_empty() { vec![None] } else { dates };

        let price = self.spec(&["価格"]).and_then(|cell| html::parse_price(&cell));

        Ok(ReleaseHistory::from_parsed(&dates, &[price]))
    }

    fn parse_maker_id(&self) -> Result<Option<String>, ParseError> {
        Ok(html::capture(&self.url, r"/(\d+)/?(?:$|[?#])"))
    }

    fn parse_scale(&self) -> Result<Option<u32>, ParseError> {
        Ok(self
            .spec(&["仕様", "サイズ"])
            .and_then(|cell| html::capture(&cell, r"1/(\d+)"))
            .and_then(|denominator| denominator.parse().ok()))
    }

    fn parse_size(&self) -> Result<Option<u32>, ParseError> {
        Ok(self
            .spec(&["サイズ", "仕様"])
            .and_then(|cell| html::capture(&cell, r"(\d+)\s*mm"))
            .and_then(|mm| mm.parse().ok()))
    }

    fn parse_resale(&self) -> Result<bool, ParseError> {
        Ok(self.html.contains("再販"))
    }

    fn parse_adult(&self) -> Result<bool, ParseError> {
        Ok(self.html.contains("R-18") || self.html.contains("18歳未満"))
    }

    fn parse_copyright(&self) -> Result<Option<String>, ParseError> {
        Ok(html::capture(
            &self.html,
            r#"(?s)<p[^>]*class="copyright"[^>]*>(.*?)</p>"#,
        )
        .map(|raw| html::strip_tags(&raw))
        .filter(|s| !s.is_empty()))
    }

    fn parse_images(&self) -> Result<Vec<String>, ParseError> {
        let captured = html::capture_all(
            &self.html,
            r#"<img[^>]+src="([^"]*/products/[^"]+)""#,
        );

        let mut seen = std::collections::HashSet::new();
        let images: Vec<String> = captured
            .into_iter()
            .map(|src| absolutize(&src))
            .filter(|src| seen.insert(src.clone()))
            .collect();

        if images.is_empty() {
            return Err(ParseError::missing_anchor("images"));
        }
        Ok(images)
    }
}

fn absolutize(src: &str) -> String {
    if src.starts_with('/') {
        format!("https://www.alter-web.jp{src}")
    } else {
        src.to_owned()
    }
}
