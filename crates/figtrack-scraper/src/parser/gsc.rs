//! Good Smile Company product-page parser.
//!
//! GSC pages carry their details in a `<dt>/<dd>` list whose labels vary
//! by locale; release waves repeat the price/date rows once per wave.

use chrono::{NaiveDate, TimeZone, Utc};
use figtrack_core::{Lang, OrderPeriod, ReleaseHistory};
use regex::Regex;

use crate::error::ParseError;
use crate::html;
use crate::parser::{parse_release_months, ProductParser};

/// Detail-list labels for one locale.
struct Labels {
    series: &'static [&'static str],
    manufacturer: &'static [&'static str],
    category: &'static [&'static str],
    price: &'static [&'static str],
    release_date: &'static [&'static str],
    order_period: &'static [&'static str],
    sculptor: &'static [&'static str],
    paintwork: &'static [&'static str],
    releaser: &'static [&'static str],
    distributer: &'static [&'static str],
    specifications: &'static [&'static str],
    jan: &'static [&'static str],
    copyright: &'static [&'static str],
}

static JA: Labels = Labels {
    series: &["作品名"],
    manufacturer: &["メーカー"],
    category: &["カテゴリー"],
    price: &["価格"],
    release_date: &["発売時期", "再販"],
    order_period: &["ご予約期間", "予約受付期間"],
    sculptor: &["原型制作"],
    paintwork: &["彩色"],
    releaser: &["発売元"],
    distributer: &["販売元"],
    specifications: &["仕様"],
    jan: &["JANコード", "JAN"],
    copyright: &["作品コピーライト"],
};

static EN: Labels = Labels {
    series: &["Series"],
    manufacturer: &["Manufacturer"],
    category: &["Category"],
    price: &["Price"],
    release_date: &["Release Date", "Rerelease"],
    order_period: &["Preorder Period", "Order Period"],
    sculptor: &["Sculptor"],
    paintwork: &["Paintwork"],
    releaser: &["Released by"],
    distributer: &["Distributed by"],
    specifications: &["Specifications"],
    jan: &["JAN Code", "JAN"],
    copyright: &["Copyright"],
};

static ZH: Labels = Labels {
    series: &["作品名稱", "作品名"],
    manufacturer: &["製造商", "メーカー"],
    category: &["分類"],
    price: &["價格", "価格"],
    release_date: &["發售時期", "発売時期"],
    order_period: &["預購期間"],
    sculptor: &["原型製作", "原型制作"],
    paintwork: &["上色", "彩色"],
    releaser: &["發售商"],
    distributer: &["經銷商"],
    specifications: &["商品規格", "仕様"],
    jan: &["JAN Code", "JAN"],
    copyright: &["作品版權", "作品コピーライト"],
};

pub struct GscParser {
    url: String,
    html: String,
    locale: Lang,
}

impl GscParser {
    #[must_use]
    pub fn new(url: String, html: String) -> Self {
        let locale = Lang::from_url(&url).unwrap_or(Lang::Ja);
        Self { url, html, locale }
    }

    fn labels(&self) -> &'static Labels {
        match self.locale {
            Lang::Ja => &JA,
            Lang::En => &EN,
            Lang::Zh => &ZH,
        }
    }

    fn detail(&self, labels: &[&str]) -> Option<String> {
        html::definition_value(&self.html, labels)
    }
}

impl ProductParser for GscParser {
    fn url(&self) -> &str {
        &self.url
    }

    fn locale(&self) -> Lang {
        self.locale
    }

    fn parse_name(&self) -> Result<String, ParseError> {
        html::capture(&self.html, r#"(?s)<h1[^>]*class="title"[^>]*>(.*?)</h1>"#)
            .map(|raw| html::strip_tags(&raw))
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ParseError::missing_anchor("name"))
    }

    fn parse_series(&self) -> Result<Option<String>, ParseError> {
        Ok(self.detail(self.labels().series).filter(|s| !s.is_empty()))
    }

    fn parse_category(&self) -> Result<String, ParseError> {
        self.detail(self.labels().category)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ParseError::missing_anchor("category"))
    }

    fn parse_manufacturer(&self) -> Result<String, ParseError> {
        self.detail(self.labels().manufacturer)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ParseError::missing_anchor("manufacturer"))
    }

    fn parse_releaser(&self) -> Result<Option<String>, ParseError> {
        Ok(self.detail(self.labels().releaser).filter(|s| !s.is_empty()))
    }

    fn parse_distributer(&self) -> Result<Option<String>, ParseError> {
        Ok(self
            .detail(self.labels().distributer)
            .filter(|s| !s.is_empty()))
    }

    fn parse_order_period(&self) -> Result<Option<OrderPeriod>, ParseError> {
        let Some(cell) = self.detail(self.labels().order_period) else {
            // Not every product is sold through the online shop.
            return Ok(None);
        };

        let stamps = parse_order_datetimes(&cell);
        match stamps.as_slice() {
            [] => Err(ParseError::new(
                "order_period",
                format!("unparseable order period: {cell}"),
            )),
            [start] => Ok(Some(OrderPeriod {
                start: *start,
                end: None,
            })),
            [start, end, ..] => Ok(Some(OrderPeriod {
                start: *start,
                end: Some(*end),
            })),
        }
    }

    fn parse_sculptors(&self) -> Result<Vec<String>, ParseError> {
        Ok(self
            .detail(self.labels().sculptor)
            .map(|cell| html::split_names(&cell))
            .unwrap_or_default())
    }

    fn parse_paintworks(&self) -> Result<Vec<String>, ParseError> {
        Ok(self
            .detail(self.labels().paintwork)
            .map(|cell| html::split_names(&cell))
            .unwrap_or_default())
    }

    fn parse_release_infos(&self) -> Result<ReleaseHistory, ParseError> {
        let date_cells = html::definition_values(&self.html, self.labels().release_date);
        if date_cells.is_empty() {
            return Err(ParseError::missing_anchor("release_infos"));
        }

        let dates: Vec<Option<NaiveDate>> = date_cells
            .iter()
            .flat_map(|cell| parse_release_months(cell))
            .collect();

        let prices: Vec<Option<u32>> = html::definition_values(&self.html, self.labels().price)
            .iter()
            .map(|cell| html::parse_price(cell))
            .collect();

        Ok(ReleaseHistory::from_parsed(&dates, &prices))
    }

    fn parse_maker_id(&self) -> Result<Option<String>, ParseError> {
        Ok(html::capture(&self.url, r"/product/(\d+)"))
    }

    fn parse_jan(&self) -> Result<Option<String>, ParseError> {
        let Some(cell) = self.detail(self.labels().jan) else {
            return Ok(None);
        };
        let digits: String = cell.chars().filter(char::is_ascii_digit).collect();
        if digits.len() == 13 {
            Ok(Some(digits))
        } else {
            Err(ParseError::new(
                "jan",
                format!("expected a 13-digit code, got `{cell}`"),
            ))
        }
    }

    fn parse_scale(&self) -> Result<Option<u32>, ParseError> {
        Ok(self
            .detail(self.labels().specifications)
            .and_then(|cell| html::capture(&cell, r"1/(\d+)"))
            .and_then(|denominator| denominator.parse().ok()))
    }

    fn parse_size(&self) -> Result<Option<u32>, ParseError> {
        Ok(self
            .detail(self.labels().specifications)
            .and_then(|cell| html::capture(&cell, r"(\d+)\s*mm"))
            .and_then(|mm| mm.parse().ok()))
    }

    fn parse_resale(&self) -> Result<bool, ParseError> {
        let cells = html::definition_values(&self.html, self.labels().release_date);
        let marked = cells
            .iter()
            .any(|cell| cell.contains("再販") || cell.contains("Resale"));
        let waves: usize = cells.iter().map(|cell| parse_release_months(cell).len()).sum();
        Ok(marked || waves > 1)
    }

    fn parse_adult(&self) -> Result<bool, ParseError> {
        Ok(self.html.contains("R-18") || self.html.contains("18歳未満"))
    }

    fn parse_copyright(&self) -> Result<Option<String>, ParseError> {
        let from_block = html::capture(
            &self.html,
            r#"(?s)<div[^>]*class="itemCopy"[^>]*>(.*?)</div>"#,
        )
        .map(|raw| html::strip_tags(&raw))
        .filter(|s| !s.is_empty());

        Ok(from_block.or_else(|| {
            self.detail(self.labels().copyright)
                .filter(|s| !s.is_empty())
        }))
    }

    fn parse_images(&self) -> Result<Vec<String>, ParseError> {
        let captured = html::capture_all(
            &self.html,
            r#"<img[^>]+src="([^"]*(?:images\.goodsmile\.info|/cgm/images/)[^"]*)""#,
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
        format!("https://www.goodsmile.info{src}")
    } else {
        src.to_owned()
    }
}

/// Every datetime in an order-period cell, page order. Handles the ja
/// form `2021年2月18日（木）12時` and the slash form `2021/02/18 12:00`.
fn parse_order_datetimes(cell: &str) -> Vec<chrono::DateTime<Utc>> {
    let re = Regex::new(
        r"(\d{4})年(\d{1,2})月(\d{1,2})日[^\d]{0,12}?(\d{1,2})時|(\d{4})/(\d{1,2})/(\d{1,2})\s+(\d{1,2}):(\d{2})",
    )
    .expect("valid regex");

    re.captures_iter(cell)
        .filter_map(|cap| {
            let (year, month, day, hour, minute) = if cap.get(1).is_some() {
                (cap[1].parse().ok()?, cap[2].parse().ok()?, cap[3].parse().ok()?, cap[4].parse().ok()?, 0)
            } else {
                (
                    cap[5].parse().ok()?,
                    cap[6].parse().ok()?,
                    cap[7].parse().ok()?,
                    cap[8].parse().ok()?,
                    cap[9].parse().ok()?,
                )
            };
            Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).single()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRODUCT_URL: &str = "https://www.goodsmile.info/ja/product/9943/";

    fn fixture() -> String {
        r##"
<!DOCTYPE html>
<html>
<head><title>セイバーオルタ | グッドスマイルカンパニー</title></head>
<body>
<div class="itemDetail">
  <h1 class="title">セイバーオルタ</h1>
  <div class="detailBox">
    <dl>
      <dt>作品名</dt><dd>Fate/stay night</dd>
      <dt>メーカー</dt><dd><a href="/ja/maker/28">グッドスマイルカンパニー</a></dd>
      <dt>カテゴリー</dt><dd>1/7スケールフィギュア</dd>
      <dt>価格</dt><dd class="price">14,800円（税込）</dd>
      <dt>発売時期</dt><dd>2020/01</dd>
      <dt>仕様</dt><dd>塗装済み完成品・1/7スケール・ABS&amp;PVC製・専用台座付属・全高：約250mm</dd>
      <dt>原型制作</dt><dd>ひろし・koyama</dd>
      <dt>彩色</dt><dd>佳奈</dd>
      <dt>発売元</dt><dd>グッドスマイルカンパニー</dd>
      <dt>販売元</dt><dd>グッドスマイルカンパニー</dd>
      <dt>JANコード</dt><dd>4580416906179</dd>
      <dt>ご予約期間</dt><dd>2019年2月18日（木）12時より2019年4月7日（水）21時まで</dd>
    </dl>
  </div>
  <div class="itemCopy">© TYPE-MOON・ufotable・FSNPC</div>
  <div class="itemPhotos">
    <img src="https://images.goodsmile.info/cgm/images/product/20190214/9943/main.jpg" />
    <img src="https://images.goodsmile.info/cgm/images/product/20190214/9943/sub01.jpg" />
  </div>
</div>
</body>
</html>
"##
        .to_string()
    }

    fn parser() -> GscParser {
        GscParser::new(PRODUCT_URL.to_string(), fixture())
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).expect("valid test date")
    }

    #[test]
    fn locale_comes_from_url() {
        assert_eq!(parser().locale(), Lang::Ja);
        let en = GscParser::new(
            "https://www.goodsmile.info/en/product/9943/".to_string(),
            fixture(),
        );
        assert_eq!(en.locale(), Lang::En);
    }

    #[test]
    fn parses_name_from_title_heading() {
        assert_eq!(parser().parse_name().unwrap(), "セイバーオルタ");
    }

    #[test]
    fn parses_series_and_manufacturer() {
        let p = parser();
        assert_eq!(p.parse_series().unwrap().as_deref(), Some("Fate/stay night"));
        assert_eq!(
            p.parse_manufacturer().unwrap(),
            "グッドスマイルカンパニー"
        );
    }

    #[test]
    fn parses_category() {
        assert_eq!(parser().parse_category().unwrap(), "1/7スケールフィギュア");
    }

    #[test]
    fn parses_release_history_with_price() {
        let history = parser().parse_release_infos().unwrap();
        assert_eq!(history.len(), 1);
        let entry = history.last().unwrap();
        assert_eq!(entry.release_date(), Some(d(2020, 1, 1)));
        assert_eq!(entry.price, Some(14800));
    }

    #[test]
    fn parses_scale_and_size_from_specifications() {
        let p = parser();
        assert_eq!(p.parse_scale().unwrap(), Some(7));
        assert_eq!(p.parse_size().unwrap(), Some(250));
    }

    #[test]
    fn parses_sculptors_and_paintworks() {
        let p = parser();
        assert_eq!(p.parse_sculptors().unwrap(), vec!["ひろし", "koyama"]);
        assert_eq!(p.parse_paintworks().unwrap(), vec!["佳奈"]);
    }

    #[test]
    fn parses_maker_id_from_url() {
        assert_eq!(parser().parse_maker_id().unwrap().as_deref(), Some("9943"));
    }

    #[test]
    fn parses_jan_code() {
        assert_eq!(
            parser().parse_jan().unwrap().as_deref(),
            Some("4580416906179")
        );
    }

    #[test]
    fn malformed_jan_is_a_field_error() {
        let html = fixture().replace("4580416906179", "not-a-code");
        let p = GscParser::new(PRODUCT_URL.to_string(), html);
        let err = p.parse_jan().unwrap_err();
        assert_eq!(err.field, "jan");
    }

    #[test]
    fn parses_order_period_with_both_bounds() {
        let period = parser().parse_order_period().unwrap().expect("period");
        assert_eq!(
            period.start,
            Utc.with_ymd_and_hms(2019, 2, 18, 12, 0, 0).unwrap()
        );
        assert_eq!(
            period.end,
            Some(Utc.with_ymd_and_hms(2019, 4, 7, 21, 0, 0).unwrap())
        );
        assert!(!period.is_open_ended());
    }

    #[test]
    fn missing_order_period_row_is_not_an_error() {
        let html = fixture().replace("ご予約期間", "ご案内");
        let p = GscParser::new(PRODUCT_URL.to_string(), html);
        assert_eq!(p.parse_order_period().unwrap(), None);
    }

    #[test]
    fn single_datetime_means_open_ended_window() {
        let html = fixture().replace(
            "2019年2月18日（木）12時より2019年4月7日（水）21時まで",
            "2019年2月18日（木）12時より",
        );
        let p = GscParser::new(PRODUCT_URL.to_string(), html);
        let period = p.parse_order_period().unwrap().expect("period");
        assert!(period.is_open_ended());
    }

    #[test]
    fn parses_copyright_from_item_copy_block() {
        assert_eq!(
            parser().parse_copyright().unwrap().as_deref(),
            Some("© TYPE-MOON・ufotable・FSNPC")
        );
    }

    #[test]
    fn parses_images_in_page_order() {
        let images = parser().parse_images().unwrap();
        assert_eq!(images.len(), 2);
        assert!(images[0].ends_with("main.jpg"));
        assert!(images[1].ends_with("sub01.jpg"));
    }

    #[test]
    fn single_wave_without_resale_marker_is_not_resale() {
        assert!(!parser().parse_resale().unwrap());
    }

    #[test]
    fn resale_marker_or_second_wave_flags_resale() {
        let html = fixture().replace(
            "<dt>発売時期</dt><dd>2020/01</dd>",
            "<dt>発売時期</dt><dd>2020/01、2022/05(再販)</dd>",
        );
        let p = GscParser::new(PRODUCT_URL.to_string(), html);
        assert!(p.parse_resale().unwrap());
    }

    #[test]
    fn adult_flag_from_r18_marker() {
        assert!(!parser().parse_adult().unwrap());
        let html = fixture().replace("</body>", "<p>R-18</p></body>");
        let p = GscParser::new(PRODUCT_URL.to_string(), html);
        assert!(p.parse_adult().unwrap());
    }

    #[test]
    fn missing_title_is_an_identity_error() {
        let html = fixture().replace("class=\"title\"", "class=\"headline\"");
        let p = GscParser::new(PRODUCT_URL.to_string(), html);
        assert_eq!(p.parse_name().unwrap_err().field, "name");
    }

    #[test]
    fn english_page_uses_english_labels() {
        let html = r#"
<h1 class="title">Saber Alter</h1>
<dl>
  <dt>Series</dt><dd>Fate/stay night</dd>
  <dt>Manufacturer</dt><dd>Good Smile Company</dd>
  <dt>Category</dt><dd>1/7 Scale Figure</dd>
  <dt>Price</dt><dd>14,800JPY</dd>
  <dt>Release Date</dt><dd>2020/01</dd>
  <dt>Specifications</dt><dd>Painted 1/7 scale figure, approx. 250mm in height</dd>
</dl>
<img src="/cgm/images/product/20190214/9943/main.jpg" />
"#;
        let p = GscParser::new(
            "https://www.goodsmile.info/en/product/9943/".to_string(),
            html.to_string(),
        );
        assert_eq!(p.parse_name().unwrap(), "Saber Alter");
        assert_eq!(p.parse_manufacturer().unwrap(), "Good Smile Company");
        assert_eq!(p.parse_scale().unwrap(), Some(7));
        let history = p.parse_release_infos().unwrap();
        assert_eq!(history.last().unwrap().price, Some(14800));
        assert_eq!(
            p.parse_images().unwrap(),
            vec!["https://www.goodsmile.info/cgm/images/product/20190214/9943/main.jpg"]
        );
    }
}
