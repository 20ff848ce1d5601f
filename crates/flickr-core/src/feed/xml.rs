//! RSS 2.0 serialization.
//!
//! Every text field is entity-escaped except the item description, which is
//! pre-escaped HTML and goes into a CDATA section as-is.

use std::io::{self, Write};

use super::{now_rfc1123, FeedDocument, FeedItem};

/// Escape `& < > " '` for use in XML text and attribute values
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `]]>` cannot appear inside CDATA; split the section around it
fn cdata(input: &str) -> String {
    format!("<![CDATA[{}]]>", input.replace("]]>", "]]]]><![CDATA[>"))
}

/// Write the feed as RSS 2.0. `lastBuildDate` is the time of this call.
pub fn serialize<W: Write>(feed: &FeedDocument, w: &mut W) -> io::Result<()> {
    let link = escape_html(&feed.link);

    writeln!(w, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(w, r#"<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">"#)?;
    writeln!(w, "<channel>")?;
    writeln!(w, "<title>{}</title>", escape_html(&feed.title))?;
    writeln!(w, "<link>{}</link>", link)?;
    writeln!(w, "<description>{}</description>", escape_html(&feed.description))?;
    writeln!(w, "<language>en-us</language>")?;
    writeln!(w, "<lastBuildDate>{}</lastBuildDate>", now_rfc1123())?;
    writeln!(
        w,
        r#"<atom:link href="{}" rel="self" type="application/rss+xml" />"#,
        link
    )?;

    for item in &feed.items {
        write_item(item, w)?;
    }

    writeln!(w, "</channel>")?;
    writeln!(w, "</rss>")?;
    w.flush()
}

fn write_item<W: Write>(item: &FeedItem, w: &mut W) -> io::Result<()> {
    writeln!(w, "<item>")?;
    writeln!(w, "<title>{}</title>", escape_html(&item.title))?;
    writeln!(w, "<link>{}</link>", escape_html(&item.link))?;
    writeln!(w, "<description>{}</description>", cdata(&item.description_html))?;
    writeln!(w, "<pubDate>{}</pubDate>", escape_html(&item.pub_date))?;
    writeln!(w, r#"<guid isPermaLink="false">{}</guid>"#, escape_html(&item.guid))?;
    if let Some(enclosure) = &item.enclosure {
        writeln!(
            w,
            r#"<enclosure url="{}" type="{}" length="{}" />"#,
            escape_html(&enclosure.url),
            escape_html(&enclosure.mime_type),
            escape_html(&enclosure.length)
        )?;
    }
    writeln!(w, "</item>")
}

/// Serialize into a `String`
pub fn to_xml_string(feed: &FeedDocument) -> String {
    let mut buf = Vec::new();
    serialize(feed, &mut buf).expect("writing to a Vec cannot fail");
    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{build, Enclosure};
    use crate::types::PhotoRecord;

    fn sample_feed() -> FeedDocument {
        FeedDocument {
            title: "Tom & Jerry <3 > all".to_string(),
            link: "https://www.flickr.com/people/tom&jerry/".to_string(),
            description: "Latest photos from Flickr user Tom & Jerry".to_string(),
            items: vec![FeedItem {
                title: "A <b>bold</b> title".to_string(),
                link: "https://www.flickr.com/photos/1@N00/42/".to_string(),
                description_html: r#"<img src="https://x/l.jpg?a=1&amp;b=2" alt="t" />"#.to_string(),
                pub_date: "Sat, 15 Jul 2023 12:34:56 +0000".to_string(),
                guid: "42".to_string(),
                enclosure: Some(Enclosure {
                    url: "https://x/l.jpg?a=1&b=2".to_string(),
                    mime_type: "image/jpeg".to_string(),
                    length: "0".to_string(),
                }),
            }],
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a&b<c>d\"e'f"), "a&amp;b&lt;c&gt;d&quot;e&#39;f");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_cdata_splits_terminator() {
        assert_eq!(cdata("a]]>b"), "<![CDATA[a]]]]><![CDATA[>b]]>");
    }

    #[test]
    fn test_channel_fields_escaped() {
        let xml = to_xml_string(&sample_feed());

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
        assert!(xml.contains("<title>Tom &amp; Jerry &lt;3 &gt; all</title>"));
        assert!(xml.contains("<link>https://www.flickr.com/people/tom&amp;jerry/</link>"));
        assert!(xml.contains(
            "<atom:link href=\"https://www.flickr.com/people/tom&amp;jerry/\" rel=\"self\" type=\"application/rss+xml\" />"
        ));
        assert!(xml.contains("<lastBuildDate>"));
        assert!(xml.trim_end().ends_with("</channel>\n</rss>"));
    }

    #[test]
    fn test_item_description_is_cdata_not_reescaped() {
        let xml = to_xml_string(&sample_feed());

        assert!(xml.contains("<title>A &lt;b&gt;bold&lt;/b&gt; title</title>"));
        assert!(xml.contains(
            "<description><![CDATA[<img src=\"https://x/l.jpg?a=1&amp;b=2\" alt=\"t\" />]]></description>"
        ));
        assert!(!xml.contains("&amp;amp;"));
        assert!(xml.contains("<guid isPermaLink=\"false\">42</guid>"));
        assert!(xml.contains(
            "<enclosure url=\"https://x/l.jpg?a=1&amp;b=2\" type=\"image/jpeg\" length=\"0\" />"
        ));
    }

    #[test]
    fn test_last_build_date_is_now() {
        let xml = to_xml_string(&sample_feed());
        let start = xml.find("<lastBuildDate>").unwrap() + "<lastBuildDate>".len();
        let end = xml.find("</lastBuildDate>").unwrap();
        let parsed = chrono::DateTime::parse_from_rfc2822(&xml[start..end]).unwrap();
        let age = chrono::Utc::now().signed_duration_since(parsed.with_timezone(&chrono::Utc));
        assert!(age.num_seconds().abs() < 60);
    }

    #[test]
    fn test_item_order_preserved() {
        let records: Vec<PhotoRecord> = ["c", "a", "b"]
            .iter()
            .map(|id| PhotoRecord {
                id: id.to_string(),
                ..Default::default()
            })
            .collect();

        let xml = to_xml_string(&build(&records, "jane"));
        let c = xml.find("<guid isPermaLink=\"false\">c</guid>").unwrap();
        let a = xml.find("<guid isPermaLink=\"false\">a</guid>").unwrap();
        let b = xml.find("<guid isPermaLink=\"false\">b</guid>").unwrap();
        assert!(c < a && a < b);
    }

    #[test]
    fn test_to_xml_string_matches_serialize() {
        let feed = sample_feed();
        let mut buf = Vec::new();
        serialize(&feed, &mut buf).unwrap();

        let without_build_date = |xml: &str| -> String {
            xml.lines()
                .filter(|l| !l.starts_with("<lastBuildDate>"))
                .collect::<Vec<_>>()
                .join("\n")
        };
        assert_eq!(
            without_build_date(&to_xml_string(&feed)),
            without_build_date(&String::from_utf8(buf).unwrap())
        );
    }

    #[test]
    fn test_empty_feed() {
        let xml = to_xml_string(&build(&[], "jane"));
        assert!(!xml.contains("<item>"));
        assert!(xml.contains("<title>Flickr Photos from jane</title>"));
    }
}
