//! Turns feed entries into summarized digest items.
//!
//! A run reads every feed, ranks all entries newest first, and walks the list
//! until enough articles are accepted:
//!
//! ```text
//! candidate ─▶ already sent? ─▶ extract page ─▶ filter ─▶ summarize ─▶ accept
//!                   │ skip           │ fail: feed summary   │ skip
//!                   ▼                ▼ none: skip           ▼
//! ```
//!
//! Everything is sequential: one feed, one page, one summary at a time, with
//! a politeness pause after each page fetch.

use crate::api::AskAsync;
use crate::config::DigestConfig;
use crate::dedup::DedupStore;
use crate::extractor::{ContentExtractor, PageFetcher};
use crate::feeds::FeedSource;
use crate::filters::FilterChain;
use crate::models::{Candidate, Collection, CollectionStats, DigestItem};
use crate::summarizer::Summarizer;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

pub struct DigestCollector<F, P, A> {
    feed_urls: Vec<String>,
    max_items: usize,
    max_per_feed: usize,
    politeness_delay: Duration,
    feeds: F,
    extractor: ContentExtractor<P>,
    filters: FilterChain,
    summarizer: Summarizer<A>,
}

impl<F, P, A> DigestCollector<F, P, A>
where
    F: FeedSource,
    P: PageFetcher,
    A: AskAsync,
{
    /// Build a collector from the resolved configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Supplies the feed list, limits, politeness delay and filter settings.
    /// * `feeds` - Where feed entries come from.
    /// * `pages` - Fetches article HTML for extraction.
    /// * `summarizer` - Generative or extractive summarizer for accepted articles.
    pub fn new(config: &DigestConfig, feeds: F, pages: P, summarizer: Summarizer<A>) -> Self {
        Self {
            feed_urls: config.feed_urls.clone(),
            max_items: config.max_items,
            max_per_feed: config.max_per_feed,
            politeness_delay: config.politeness_delay,
            feeds,
            extractor: ContentExtractor::new(
                pages,
                config.min_article_length,
                config.max_article_chars,
            ),
            filters: FilterChain::from_config(config),
            summarizer,
        }
    }

    /// Read every feed and return its entries ranked newest first.
    ///
    /// Each feed contributes at most `max_per_feed` of its most recent entries.
    /// A feed that fails is logged and left out.
    #[instrument(level = "info", skip_all, fields(feeds = self.feed_urls.len()))]
    pub async fn gather_candidates(&self, collected_at: DateTime<Utc>) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        for feed_url in &self.feed_urls {
            match self.feeds.fetch_entries(feed_url).await {
                Ok(entries) => {
                    let mut ranked: Vec<Candidate> = entries
                        .into_iter()
                        .map(|entry| Candidate {
                            published: entry.resolved_timestamp(collected_at),
                            entry,
                        })
                        .collect();
                    ranked.sort_by(|a, b| b.published.cmp(&a.published));
                    ranked.truncate(self.max_per_feed);
                    debug!(%feed_url, count = ranked.len(), "Feed entries taken");
                    candidates.extend(ranked);
                }
                Err(e) => warn!(%feed_url, error = %e, "Feed could not be read; skipping"),
            }
        }
        candidates.sort_by(|a, b| b.published.cmp(&a.published));
        info!(count = candidates.len(), "Gathered candidates");
        candidates
    }

    /// Collect up to `max_items` new articles, skipping anything in `sent`.
    #[instrument(level = "info", skip_all, fields(max_items = self.max_items))]
    pub async fn collect(&self, sent: &DedupStore) -> Collection {
        let candidates = self.gather_candidates(Utc::now()).await;
        let mut stats = CollectionStats::default();
        let mut items: Vec<DigestItem> = Vec::new();
        let mut accepted_urls: HashSet<String> = HashSet::new();

        for Candidate { published, entry } in candidates {
            if items.len() >= self.max_items {
                break;
            }
            stats.considered += 1;

            let url = entry.link.as_str();
            if url.is_empty() {
                debug!(title = %entry.title, "Entry has no link; skipping");
                continue;
            }
            if sent.contains(url) {
                stats.already_sent += 1;
                debug!(%url, "Already sent; skipping");
                continue;
            }
            if accepted_urls.contains(url) {
                stats.duplicates += 1;
                debug!(%url, "Already in this digest; skipping");
                continue;
            }

            info!(title = %entry.title, %url, "Trying candidate");
            let extracted = self.extractor.extract(url).await;
            let effective_text = match extracted {
                Ok(text) => text,
                Err(e) => match entry.summary.as_deref() {
                    Some(fallback) => {
                        stats.summary_fallbacks += 1;
                        info!(
                            %url,
                            reason = %e,
                            network = e.is_network(),
                            "Using feed summary as fallback"
                        );
                        fallback.to_string()
                    }
                    None => {
                        stats.no_content += 1;
                        info!(
                            %url,
                            reason = %e,
                            network = e.is_network(),
                            "No page text and no feed summary; skipping"
                        );
                        self.pause().await;
                        continue;
                    }
                },
            };

            if let Err(reason) = self.filters.check(&entry, &effective_text) {
                stats.filtered += 1;
                info!(%url, %reason, "Filtered out");
                self.pause().await;
                continue;
            }

            let summary = self.summarizer.summarize(&entry.title, &effective_text).await;
            accepted_urls.insert(entry.link.clone());
            items.push(DigestItem {
                title: entry.title,
                url: entry.link,
                summary,
                published: published.to_rfc3339(),
            });
            stats.accepted += 1;

            if items.len() < self.max_items {
                self.pause().await;
            }
        }

        info!(
            considered = stats.considered,
            accepted = stats.accepted,
            already_sent = stats.already_sent,
            duplicates = stats.duplicates,
            summary_fallbacks = stats.summary_fallbacks,
            no_content = stats.no_content,
            filtered = stats.filtered,
            "Collection finished"
        );
        Collection { items, stats }
    }

    async fn pause(&self) {
        if !self.politeness_delay.is_zero() {
            sleep(self.politeness_delay).await;
        }
    }
}
