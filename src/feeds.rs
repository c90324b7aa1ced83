//! Feed fetching and parsing.
//!
//! [`HttpFeedSource`] downloads a feed and parses it with `feed-rs`, which
//! covers RSS 0.9x/1.0/2.0, Atom and JSON Feed. Each entry becomes a
//! [`FeedEntry`]; fields a feed leaves out stay `None`.

use crate::error::FeedError;
use crate::models::FeedEntry;
use tracing::{debug, instrument};

/// Anything that can list the entries of a feed URL.
pub trait FeedSource {
    async fn fetch_entries(&self, feed_url: &str) -> Result<Vec<FeedEntry>, FeedError>;
}

#[derive(Debug, Clone)]
pub struct HttpFeedSource {
    http: reqwest::Client,
}

impl HttpFeedSource {
    /// Shares `http` with the page fetcher and the Gemini client.
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl FeedSource for HttpFeedSource {
    #[instrument(level = "info", skip(self))]
    async fn fetch_entries(&self, feed_url: &str) -> Result<Vec<FeedEntry>, FeedError> {
        let response = self.http.get(feed_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status));
        }
        let bytes = response.bytes().await?;
        let entries = parse_feed(&bytes)?;
        debug!(count = entries.len(), "Parsed feed");
        Ok(entries)
    }
}

/// Parse a feed document into entries, in document order.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<FeedEntry>, FeedError> {
    let feed = feed_rs::parser::parse(bytes)?;
    Ok(feed.entries.into_iter().map(to_feed_entry).collect())
}

fn to_feed_entry(entry: feed_rs::model::Entry) -> FeedEntry {
    let link = entry
        .links
        .first()
        .map(|l| l.href.trim().to_string())
        .filter(|href| !href.is_empty())
        .or_else(|| {
            (entry.id.starts_with("http://") || entry.id.starts_with("https://"))
                .then(|| entry.id.clone())
        })
        .unwrap_or_default();

    let title = entry
        .title
        .map(|t| t.content.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| {
            if link.is_empty() {
                "Untitled".to_string()
            } else {
                link.clone()
            }
        });

    let summary = entry
        .summary
        .map(|s| s.content)
        .or_else(|| entry.content.and_then(|c| c.body))
        .filter(|s| !s.trim().is_empty());

    FeedEntry {
        title,
        link,
        published: entry.published,
        updated: entry.updated,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>National</title>
    <link>https://www.thehindu.com/news/national/</link>
    <description>National news</description>
    <item>
      <title>Budget announced</title>
      <link>https://www.thehindu.com/news/national/budget/article1.ece</link>
      <description>The Finance Minister presented the budget.</description>
      <pubDate>Fri, 16 Oct 2026 09:30:00 +0530</pubDate>
    </item>
    <item>
      <link>https://www.thehindu.com/news/national/article2.ece</link>
    </item>
    <item>
      <title>No link at all</title>
      <description>Orphan entry</description>
    </item>
  </channel>
</rss>"#;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Top stories</title>
  <id>urn:uuid:feed</id>
  <updated>2026-10-16T10:00:00Z</updated>
  <entry>
    <title>Monsoon withdraws</title>
    <id>https://ndtv.com/india-news/monsoon-1</id>
    <updated>2026-10-16T08:00:00Z</updated>
    <content type="text">Full content body.</content>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_rss_entries() {
        let entries = parse_feed(RSS.as_bytes()).unwrap();
        assert_eq!(entries.len(), 3);

        let first = &entries[0];
        assert_eq!(first.title, "Budget announced");
        assert_eq!(
            first.link,
            "https://www.thehindu.com/news/national/budget/article1.ece"
        );
        assert_eq!(
            first.summary.as_deref(),
            Some("The Finance Minister presented the budget.")
        );
        assert_eq!(
            first.published.map(|p| p.to_rfc3339()).as_deref(),
            Some("2026-10-16T04:00:00+00:00")
        );
    }

    #[test]
    fn test_missing_title_falls_back_to_link() {
        let entries = parse_feed(RSS.as_bytes()).unwrap();
        assert_eq!(entries[1].title, "https://www.thehindu.com/news/national/article2.ece");
        assert_eq!(entries[1].summary, None);
        assert_eq!(entries[1].published, None);
    }

    #[test]
    fn test_missing_link_is_empty() {
        let entries = parse_feed(RSS.as_bytes()).unwrap();
        assert_eq!(entries[2].link, "");
        assert_eq!(entries[2].title, "No link at all");
    }

    #[test]
    fn test_parse_atom_uses_id_and_content() {
        let entries = parse_feed(ATOM.as_bytes()).unwrap();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.link, "https://ndtv.com/india-news/monsoon-1");
        assert_eq!(entry.summary.as_deref(), Some("Full content body."));
        assert!(entry.published.is_none());
        assert!(entry.updated.is_some());
    }

    #[test]
    fn test_garbage_is_a_parse_error() {
        assert!(matches!(
            parse_feed(b"<html>not a feed</html>"),
            Err(FeedError::Parse(_))
        ));
    }
}
