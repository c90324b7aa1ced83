//! Article body extraction from arbitrary news pages.
//!
//! No per-site selectors: the text is the page's paragraphs, taken from the
//! first `<article>` element when there is one and from the whole document
//! otherwise. Pages that come out shorter than the configured minimum are
//! reported as [`ExtractError::InsufficientContent`] so the caller can fall
//! back to the feed summary.

use crate::error::ExtractError;
use crate::utils::truncate_chars;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

static ARTICLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("article").expect("valid article selector"));
static PARAGRAPH_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p").expect("valid paragraph selector"));

/// Source of raw page markup.
pub trait PageFetcher {
    /// Fetch the page at `url`, returning its body as text.
    async fn fetch_html(&self, url: &str) -> Result<String, ExtractError>;
}

/// Plain HTTP GET through the shared client (timeout and user agent are set on it).
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    http: reqwest::Client,
}

impl HttpPageFetcher {
    /// Wrap a client already configured with the request timeout and user agent.
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl PageFetcher for HttpPageFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch_html(&self, url: &str) -> Result<String, ExtractError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::Network(format!("HTTP {status} for {url}")));
        }
        Ok(response.text().await?)
    }
}

/// Fetches pages and turns them into bounded plain text.
#[derive(Debug, Clone)]
pub struct ContentExtractor<P> {
    fetcher: P,
    min_length: usize,
    max_chars: usize,
}

impl<P: PageFetcher> ContentExtractor<P> {
    pub fn new(fetcher: P, min_length: usize, max_chars: usize) -> Self {
        Self {
            fetcher,
            min_length,
            max_chars,
        }
    }

    #[instrument(level = "info", skip(self))]
    pub async fn extract(&self, url: &str) -> Result<String, ExtractError> {
        let html = self.fetcher.fetch_html(url).await?;
        let text = extract_text(&html, self.min_length, self.max_chars)?;
        debug!(chars = text.chars().count(), "Extracted article text");
        Ok(text)
    }
}

/// Paragraph text of `html`, space-joined, at least `min_length` characters
/// and cut to `max_chars`.
pub fn extract_text(html: &str, min_length: usize, max_chars: usize) -> Result<String, ExtractError> {
    let document = Html::parse_document(html);
    let paragraphs: Vec<ElementRef<'_>> = match document.select(&ARTICLE_SELECTOR).next() {
        Some(article) => article.select(&PARAGRAPH_SELECTOR).collect(),
        None => document.select(&PARAGRAPH_SELECTOR).collect(),
    };

    let text = paragraphs
        .iter()
        .map(|p| p.text().collect::<String>())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let len = text.chars().count();
    if text.is_empty() || len < min_length {
        return Err(ExtractError::InsufficientContent { len });
    }
    Ok(truncate_chars(&text, max_chars).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FakePages(HashMap<String, String>);

    impl PageFetcher for FakePages {
        async fn fetch_html(&self, url: &str) -> Result<String, ExtractError> {
            self.0
                .get(url)
                .cloned()
                .ok_or_else(|| ExtractError::Network(format!("HTTP 404 Not Found for {url}")))
        }
    }

    fn sentence(n: usize) -> String {
        "word ".repeat(n).trim_end().to_string()
    }

    #[test]
    fn test_prefers_article_paragraphs() {
        let html = format!(
            "<html><body><p>Cookie banner text</p>\
             <article><p>{}</p><p>  </p><p>Second <b>para</b>.</p></article>\
             <footer><p>Footer</p></footer></body></html>",
            sentence(10)
        );
        let text = extract_text(&html, 10, 6000).unwrap();
        assert_eq!(text, format!("{} Second para.", sentence(10)));
        assert!(!text.contains("Cookie"));
        assert!(!text.contains("Footer"));
    }

    #[test]
    fn test_uses_all_paragraphs_without_article() {
        let html = "<div><p>First one.</p></div><p>Second one.</p>";
        let text = extract_text(html, 5, 6000).unwrap();
        assert_eq!(text, "First one. Second one.");
    }

    #[test]
    fn test_short_page_is_insufficient() {
        let html = "<article><p>Too short.</p></article>";
        match extract_text(html, 150, 6000) {
            Err(ExtractError::InsufficientContent { len }) => assert_eq!(len, 10),
            other => panic!("expected insufficient content, got {other:?}"),
        }
    }

    #[test]
    fn test_page_without_paragraphs_is_insufficient() {
        let html = "<html><body><div>No paragraphs here</div></body></html>";
        assert!(matches!(
            extract_text(html, 1, 6000),
            Err(ExtractError::InsufficientContent { len: 0 })
        ));
    }

    #[test]
    fn test_text_is_truncated_to_cap() {
        let html = format!("<p>{}</p>", "a".repeat(7000));
        let text = extract_text(&html, 150, 6000).unwrap();
        assert_eq!(text.chars().count(), 6000);
    }

    #[tokio::test]
    async fn test_extractor_reports_fetch_failure() {
        let extractor = ContentExtractor::new(FakePages(HashMap::new()), 150, 6000);
        let err = extractor.extract("https://thehindu.com/missing").await.unwrap_err();
        assert!(err.is_network());
    }

    #[tokio::test]
    async fn test_extractor_returns_page_text() {
        let url = "https://thehindu.com/a";
        let body = format!("<article><p>{}</p></article>", "b".repeat(300));
        let pages = FakePages(HashMap::from([(url.to_string(), body)]));
        let extractor = ContentExtractor::new(pages, 150, 6000);
        assert_eq!(extractor.extract(url).await.unwrap().len(), 300);
    }
}
