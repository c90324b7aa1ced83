//! Data models for feed entries and the digest items built from them.
//!
//! - [`FeedEntry`]: one raw item as read from a feed
//! - [`Candidate`]: a feed entry paired with the timestamp it is ranked by
//! - [`DigestItem`]: an accepted, summarized article ready for formatting
//! - [`CollectionStats`]: per-run counters logged after collection

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A raw article entry as read from a syndication feed.
///
/// Every field a feed may omit is optional, except `title` which is resolved
/// to the link (or `"Untitled"`) when the feed leaves it out.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    /// The article headline.
    pub title: String,
    /// The article URL. Empty when the feed gave no usable link.
    pub link: String,
    /// When the feed says the article was published.
    pub published: Option<DateTime<Utc>>,
    /// When the feed says the article was last updated.
    pub updated: Option<DateTime<Utc>>,
    /// The feed-provided summary or description, as given by the feed.
    pub summary: Option<String>,
}

impl FeedEntry {
    /// Best-effort timestamp: published, then updated, then `collected_at`.
    pub fn resolved_timestamp(&self, collected_at: DateTime<Utc>) -> DateTime<Utc> {
        self.published.or(self.updated).unwrap_or(collected_at)
    }

    /// The feed summary, or `""` when absent.
    pub fn summary_text(&self) -> &str {
        self.summary.as_deref().unwrap_or("")
    }
}

/// A feed entry waiting to be ranked by recency.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub published: DateTime<Utc>,
    pub entry: FeedEntry,
}

/// An article that passed every filter and has been summarized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DigestItem {
    pub title: String,
    pub url: String,
    /// Headline line followed by `- ` bullet lines.
    pub summary: String,
    /// RFC 3339 publication timestamp.
    pub published: String,
}

/// Counters for a single collection run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionStats {
    /// Candidates the collector looked at before stopping.
    pub considered: usize,
    /// Skipped because the URL was delivered by a previous run.
    pub already_sent: usize,
    /// Skipped because the same URL was accepted earlier in this run.
    pub duplicates: usize,
    /// Page extraction failed and the feed summary was used instead.
    pub summary_fallbacks: usize,
    /// Neither page text nor feed summary was available.
    pub no_content: usize,
    /// Rejected by the filter chain.
    pub filtered: usize,
    pub accepted: usize,
}

/// The outcome of one collection run.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    pub items: Vec<DigestItem>,
    pub stats: CollectionStats,
}
