// src/feed.rs
//! RSS source adapter: fetch + parse a feed URL into entries.
//!
//! Network and parse failures degrade to an empty entry list — a broken
//! feed must never take the cycle down. Only the first
//! `MAX_ENTRIES_PER_FEED` items are kept, in feed order.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use quick_xml::de::from_str;
use regex::Regex;
use serde::Deserialize;

use crate::config::MAX_ENTRIES_PER_FEED;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    /// Stable identifier; doubles as the dedup key.
    pub link: String,
    pub title: String,
    /// Raw summary markup as provided by the feed.
    pub summary: String,
    pub published: Option<DateTime<Utc>>,
    /// URLs from structured `media:content` fields, feed order.
    pub media_urls: Vec<String>,
    pub enclosures: Vec<Enclosure>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enclosure {
    pub url: String,
    pub mime_type: String,
}

impl FeedEntry {
    /// Summary with entities decoded, tags stripped and whitespace
    /// collapsed. This is what the keyword gate and the LLM see.
    pub fn clean_summary(&self) -> String {
        normalize_text(&self.summary)
    }
}

#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Vec<FeedEntry>;
}

/* ----------------------------
RSS deserialization
---------------------------- */

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    #[serde(rename = "enclosure", default)]
    enclosures: Vec<EnclosureXml>,
    // quick-xml exposes namespaced elements (media:content) under their
    // local name.
    #[serde(rename = "content", default)]
    media: Vec<MediaContentXml>,
}

#[derive(Debug, Deserialize)]
struct EnclosureXml {
    #[serde(rename = "@url")]
    url: Option<String>,
    #[serde(rename = "@type")]
    mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MediaContentXml {
    #[serde(rename = "@url")]
    url: Option<String>,
}

fn parse_pub_date(ts: &str) -> Option<DateTime<Utc>> {
    let ts = ts.trim();
    DateTime::parse_from_rfc2822(ts)
        .or_else(|_| DateTime::parse_from_rfc3339(ts))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse feed markup into entries. Items without a `<link>` are dropped.
pub fn parse_feed(xml: &str) -> anyhow::Result<Vec<FeedEntry>> {
    let xml_clean = scrub_html_entities_for_xml(xml);
    let rss: Rss = from_str(&xml_clean)?;

    let mut out = Vec::new();
    for it in rss.channel.item.into_iter() {
        let Some(link) = it.link.map(|l| l.trim().to_string()).filter(|l| !l.is_empty())
        else {
            continue;
        };

        out.push(FeedEntry {
            link,
            title: it.title.unwrap_or_default(),
            summary: it.description.unwrap_or_default(),
            published: it.pub_date.as_deref().and_then(parse_pub_date),
            media_urls: it.media.into_iter().filter_map(|m| m.url).collect(),
            enclosures: it
                .enclosures
                .into_iter()
                .filter_map(|e| {
                    Some(Enclosure {
                        url: e.url?,
                        mime_type: e.mime_type.unwrap_or_default(),
                    })
                })
                .collect(),
        });
        if out.len() >= MAX_ENTRIES_PER_FEED {
            break;
        }
    }
    Ok(out)
}

/* ----------------------------
Image reference extraction
---------------------------- */

static RE_IMG_SRC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<img[^>]+src="([^"]+)""#).expect("img src regex"));

/// Best-effort image URL for an entry, in priority order:
/// structured `media:content` URL, then an image-typed enclosure, then the
/// first `<img src="...">` in the raw summary markup. The first match may
/// occasionally point at an unrelated image; that is accepted.
pub fn extract_image(entry: &FeedEntry) -> Option<String> {
    if let Some(url) = entry.media_urls.first() {
        return Some(url.clone());
    }
    if let Some(enc) = entry
        .enclosures
        .iter()
        .find(|e| e.mime_type.to_ascii_lowercase().contains("image"))
    {
        return Some(enc.url.clone());
    }
    RE_IMG_SRC
        .captures(&entry.summary)
        .map(|caps| caps[1].to_string())
}

/* ----------------------------
Text normalization
---------------------------- */

static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("ws regex"));

const MAX_SUMMARY_CHARS: usize = 2000;

/// Decode HTML entities, strip tags, collapse whitespace, cap length.
pub fn normalize_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();
    out = RE_TAGS.replace_all(&out, "").to_string();
    out = RE_WS.replace_all(&out, " ").trim().to_string();
    if out.chars().count() > MAX_SUMMARY_CHARS {
        out = out.chars().take(MAX_SUMMARY_CHARS).collect();
    }
    out
}

// Feeds occasionally embed named HTML entities that are not valid XML.
// One unscrubbed entity fails the whole parse, so the list covers the
// typographic entities Russian-language feeds actually emit.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&laquo;", "\"")
        .replace("&raquo;", "\"")
        .replace("&hellip;", "...")
}

/* ----------------------------
HTTP source
---------------------------- */

pub struct HttpFeedSource {
    client: reqwest::Client,
}

impl HttpFeedSource {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent("kaznews-bot/0.1")
            .connect_timeout(std::time::Duration::from_secs(10))
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("reqwest client");
        Self { client }
    }
}

impl Default for HttpFeedSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self, url: &str) -> Vec<FeedEntry> {
        let body = match self.client.get(url).send().await {
            Ok(resp) => match resp.error_for_status() {
                Ok(resp) => match resp.text().await {
                    Ok(body) => body,
                    Err(e) => {
                        tracing::warn!(error = ?e, feed = url, "feed body read failed");
                        return Vec::new();
                    }
                },
                Err(e) => {
                    tracing::warn!(error = ?e, feed = url, "feed returned error status");
                    return Vec::new();
                }
            },
            Err(e) => {
                tracing::warn!(error = ?e, feed = url, "feed fetch failed");
                return Vec::new();
            }
        };

        match parse_feed(&body) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = ?e, feed = url, "feed parse failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const FIXTURE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
  <channel>
    <title>Test feed</title>
    <item>
      <title>First</title>
      <link>https://x/1</link>
      <pubDate>Mon, 18 Aug 2025 10:00:00 +0000</pubDate>
      <description>В Алматы открыли новый парк. &lt;img src="https://img/inline.jpg"&gt;</description>
      <media:content url="https://img/media.jpg" />
      <enclosure url="https://img/enclosure.jpg" type="image/jpeg" />
    </item>
    <item>
      <title>No link, dropped</title>
      <description>orphan</description>
    </item>
    <item>
      <title>Second</title>
      <link>https://x/2</link>
      <description>Новости&nbsp;без даты</description>
      <enclosure url="https://files/audio.mp3" type="audio/mpeg" />
    </item>
  </channel>
</rss>"#;

    #[test]
    fn parses_items_and_drops_linkless() {
        let entries = parse_feed(FIXTURE).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].link, "https://x/1");
        assert_eq!(
            entries[0].published,
            Some(Utc.with_ymd_and_hms(2025, 8, 18, 10, 0, 0).unwrap())
        );
        assert_eq!(entries[1].link, "https://x/2");
        assert!(entries[1].published.is_none());
    }

    #[test]
    fn caps_entries_per_feed() {
        let items: String = (0..10)
            .map(|i| format!("<item><link>https://x/{i}</link></item>"))
            .collect();
        let xml = format!("<rss><channel>{items}</channel></rss>");
        let entries = parse_feed(&xml).unwrap();
        assert_eq!(entries.len(), MAX_ENTRIES_PER_FEED);
        assert_eq!(entries[0].link, "https://x/0");
    }

    #[test]
    fn media_content_wins_over_enclosure_and_inline_img() {
        let entries = parse_feed(FIXTURE).unwrap();
        assert_eq!(
            extract_image(&entries[0]).as_deref(),
            Some("https://img/media.jpg")
        );
    }

    #[test]
    fn non_image_enclosure_is_skipped() {
        let entries = parse_feed(FIXTURE).unwrap();
        // Second item's only enclosure is audio, and there is no inline img.
        assert_eq!(extract_image(&entries[1]), None);
    }

    #[test]
    fn inline_img_is_the_last_resort() {
        let entry = FeedEntry {
            link: "https://x/3".into(),
            title: String::new(),
            summary: r#"<p>text</p><img class="a" src="https://img/only.png" alt="">"#.into(),
            published: None,
            media_urls: Vec::new(),
            enclosures: Vec::new(),
        };
        assert_eq!(
            extract_image(&entry).as_deref(),
            Some("https://img/only.png")
        );
    }

    #[test]
    fn enclosure_beats_inline_img() {
        let entry = FeedEntry {
            link: "https://x/4".into(),
            title: String::new(),
            summary: r#"<img src="https://img/inline.jpg">"#.into(),
            published: None,
            media_urls: Vec::new(),
            enclosures: vec![Enclosure {
                url: "https://img/enc.jpg".into(),
                mime_type: "image/jpeg".into(),
            }],
        };
        assert_eq!(extract_image(&entry).as_deref(), Some("https://img/enc.jpg"));
    }

    #[test]
    fn guillemets_and_ellipsis_entities_do_not_break_parsing() {
        let xml = r#"<rss><channel><item>
            <link>https://x/5</link>
            <description>Форум &laquo;Астана&raquo; продолжается&hellip;</description>
        </item></channel></rss>"#;
        let entries = parse_feed(xml).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].clean_summary(),
            "Форум \"Астана\" продолжается..."
        );
    }

    #[test]
    fn normalize_strips_tags_and_collapses_ws() {
        let s = "  <p>В&nbsp;Астане   прошёл</p> <b>саммит</b>. ";
        assert_eq!(normalize_text(s), "В Астане прошёл саммит.");
    }

    #[test]
    fn clean_summary_keeps_cyrillic() {
        let entries = parse_feed(FIXTURE).unwrap();
        assert!(entries[0].clean_summary().contains("Алматы"));
    }
}
