//! ============================================================================
//! Feed Builder - Photo records to RSS 2.0
//! ============================================================================
//! `build` maps photos onto feed items (pure, no network); `xml` writes the
//! document out with escaping and a CDATA-wrapped item description.
//! ============================================================================

mod xml;

pub use xml::{escape_html, serialize, to_xml_string};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::PhotoRecord;

/// Layout of `datetaken` values
const DATE_TAKEN_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// RFC 1123 with a numeric zone
const RFC1123Z: &str = "%a, %d %b %Y %H:%M:%S %z";

pub const ENCLOSURE_MIME_TYPE: &str = "image/jpeg";

/// Subject used for the friends & family feed
pub const CONTACTS_FEED_SUBJECT: &str = "Friends & Family";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedDocument {
    pub title: String,
    pub link: String,
    pub description: String,
    pub items: Vec<FeedItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    /// Already-escaped HTML; written inside CDATA
    pub description_html: String,
    pub pub_date: String,
    pub guid: String,
    pub enclosure: Option<Enclosure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enclosure {
    pub url: String,
    pub mime_type: String,
    /// Always "0": the image size is never fetched
    pub length: String,
}

impl PhotoRecord {
    /// Best image URL: large, then medium, then one built from farm/server/secret
    pub fn image_url(&self) -> Option<String> {
        if let Some(url) = &self.large_image_url {
            return Some(url.clone());
        }
        if let Some(url) = &self.display_image_url {
            return Some(url.clone());
        }

        let fallback = &self.fallback;
        if self.id.is_empty() || fallback.server.is_empty() || fallback.secret.is_empty() {
            return None;
        }
        Some(format!(
            "https://farm{}.staticflickr.com/{}/{}_{}_m.jpg",
            fallback.farm, fallback.server, self.id, fallback.secret
        ))
    }
}

/// Build a feed about `subject` (a display name, or "Friends & Family")
pub fn build(records: &[PhotoRecord], subject: &str) -> FeedDocument {
    FeedDocument {
        title: format!("Flickr Photos from {}", subject),
        link: format!("https://www.flickr.com/people/{}/", subject),
        description: format!("Latest photos from Flickr user {}", subject),
        items: records.iter().map(|r| build_item(r, subject)).collect(),
    }
}

fn build_item(record: &PhotoRecord, subject: &str) -> FeedItem {
    // Aggregate feeds keep per-photo attribution
    let owner = record.owner_id.as_deref().unwrap_or(subject);
    let image_url = record.image_url();

    FeedItem {
        title: record.title.clone(),
        link: format!("https://www.flickr.com/photos/{}/{}/", owner, record.id),
        description_html: item_description(record, image_url.as_deref()),
        pub_date: format_pub_date(&record.date_taken_raw),
        guid: record.id.clone(),
        enclosure: image_url.map(|url| Enclosure {
            url,
            mime_type: ENCLOSURE_MIME_TYPE.to_string(),
            length: "0".to_string(),
        }),
    }
}

fn item_description(record: &PhotoRecord, image_url: Option<&str>) -> String {
    let mut html = String::new();

    if let Some(url) = image_url {
        html.push_str(&format!(
            r#"<img src="{}" alt="{}" />"#,
            escape_html(url),
            escape_html(&record.title)
        ));
    }

    if !record.description_text.is_empty() {
        if !html.is_empty() {
            html.push_str("<br/><br/>");
        }
        html.push_str(&escape_html(&record.description_text));
    }

    html
}

/// Parse a `datetaken` value into an RSS date, falling back to now when the
/// value is empty or unparseable
pub fn format_pub_date(date_taken: &str) -> String {
    parse_date_taken(date_taken)
        .unwrap_or_else(Utc::now)
        .format(RFC1123Z)
        .to_string()
}

/// `datetaken` carries no zone; it is read as UTC
fn parse_date_taken(date_taken: &str) -> Option<DateTime<Utc>> {
    let trimmed = date_taken.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(trimmed, DATE_TAKEN_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Current time in the feed's date format
pub(crate) fn now_rfc1123() -> String {
    Utc::now().format(RFC1123Z).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ImageFallback;

    fn photo(id: &str) -> PhotoRecord {
        PhotoRecord {
            id: id.to_string(),
            title: format!("Photo {}", id),
            description_text: String::new(),
            date_taken_raw: "2023-07-15 12:34:56".to_string(),
            owner_id: None,
            display_image_url: None,
            large_image_url: None,
            fallback: ImageFallback {
                farm: 66,
                server: "65535".to_string(),
                secret: "abc123".to_string(),
            },
        }
    }

    #[test]
    fn test_format_pub_date() {
        assert_eq!(
            format_pub_date("2023-07-15 12:34:56"),
            "Sat, 15 Jul 2023 12:34:56 +0000"
        );
    }

    #[test]
    fn test_format_pub_date_falls_back_to_now() {
        for input in ["", "   ", "not a date", "2023-13-45 99:00:00", "2023-07-15"] {
            let formatted = format_pub_date(input);
            let parsed = DateTime::parse_from_rfc2822(&formatted).unwrap();
            let age = Utc::now().signed_duration_since(parsed.with_timezone(&Utc));
            assert!(age.num_seconds().abs() < 60, "input {:?} gave {}", input, formatted);
        }
    }

    #[test]
    fn test_image_url_preference() {
        let mut record = photo("1");
        assert_eq!(
            record.image_url().as_deref(),
            Some("https://farm66.staticflickr.com/65535/1_abc123_m.jpg")
        );

        record.display_image_url = Some("https://live.staticflickr.com/m.jpg".to_string());
        assert_eq!(record.image_url().as_deref(), Some("https://live.staticflickr.com/m.jpg"));

        record.large_image_url = Some("https://live.staticflickr.com/l.jpg".to_string());
        assert_eq!(record.image_url().as_deref(), Some("https://live.staticflickr.com/l.jpg"));

        let bare = PhotoRecord {
            id: "2".to_string(),
            ..Default::default()
        };
        assert_eq!(bare.image_url(), None);
    }

    #[test]
    fn test_build_feed_templates() {
        let feed = build(&[photo("1"), photo("2")], "jane");
        assert_eq!(feed.title, "Flickr Photos from jane");
        assert_eq!(feed.link, "https://www.flickr.com/people/jane/");
        assert_eq!(feed.description, "Latest photos from Flickr user jane");
        assert_eq!(feed.items.len(), 2);
        assert_eq!(feed.items[0].guid, "1");
        assert_eq!(feed.items[1].guid, "2");
        assert_eq!(feed.items[0].link, "https://www.flickr.com/photos/jane/1/");
    }

    #[test]
    fn test_item_link_prefers_owner() {
        let mut record = photo("7");
        record.owner_id = Some("99@N01".to_string());

        let feed = build(&[record], "Friends & Family");
        assert_eq!(feed.items[0].link, "https://www.flickr.com/photos/99@N01/7/");
    }

    #[test]
    fn test_item_description_escapes() {
        let mut record = photo("3");
        record.title = "Fish & \"Chips\"".to_string();
        record.description_text = "<b>bold</b> & more".to_string();
        record.large_image_url = Some("https://live.staticflickr.com/l.jpg?a=1&b=2".to_string());

        let item = &build(&[record], "jane").items[0];
        assert_eq!(
            item.description_html,
            "<img src=\"https://live.staticflickr.com/l.jpg?a=1&amp;b=2\" alt=\"Fish &amp; &quot;Chips&quot;\" />\
             <br/><br/>&lt;b&gt;bold&lt;/b&gt; &amp; more"
        );
    }

    #[test]
    fn test_enclosure() {
        let item = &build(&[photo("4")], "jane").items[0];
        let enclosure = item.enclosure.as_ref().unwrap();
        assert_eq!(enclosure.url, "https://farm66.staticflickr.com/65535/4_abc123_m.jpg");
        assert_eq!(enclosure.mime_type, "image/jpeg");
        assert_eq!(enclosure.length, "0");

        let bare = PhotoRecord {
            id: "5".to_string(),
            ..Default::default()
        };
        let item = &build(&[bare], "jane").items[0];
        assert!(item.enclosure.is_none());
        assert_eq!(item.description_html, "");
    }
}
