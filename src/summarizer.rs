//! Headline-and-bullets summaries for digest items.
//!
//! A [`Summarizer`] is built with a [`SummaryBackend`]: either a generative
//! client or nothing. With a client, the model is asked for one headline and
//! three bullets; any failure drops to the extractive summary. Without one,
//! the extractive summary is used directly. [`Summarizer::summarize`] never
//! fails.

use crate::api::AskAsync;
use crate::utils::{normalize_whitespace, truncate_chars, truncate_for_log};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, instrument, warn};

static SENTENCE_END_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.?!]\s+").expect("valid sentence boundary regex"));

/// Characters kept when no sentence can be found.
const HEADLINE_FALLBACK_CHARS: usize = 100;

/// Where summaries come from.
#[derive(Debug)]
pub enum SummaryBackend<A> {
    /// A configured generative model.
    Generative(A),
    /// No model configured; extractive summaries only.
    Unavailable,
}

#[derive(Debug)]
pub struct Summarizer<A> {
    backend: SummaryBackend<A>,
    max_sentences: usize,
}

impl<A: AskAsync> Summarizer<A> {
    pub fn new(backend: SummaryBackend<A>, max_sentences: usize) -> Self {
        Self {
            backend,
            max_sentences,
        }
    }

    pub fn generative(client: A, max_sentences: usize) -> Self {
        Self::new(SummaryBackend::Generative(client), max_sentences)
    }

    pub fn unavailable(max_sentences: usize) -> Self {
        Self::new(SummaryBackend::Unavailable, max_sentences)
    }

    #[instrument(level = "info", skip_all, fields(%title))]
    pub async fn summarize(&self, title: &str, text: &str) -> String {
        if let SummaryBackend::Generative(client) = &self.backend {
            match client.ask(&summary_prompt(title, text)).await {
                Ok(summary) => return summary,
                Err(e) => warn!(
                    error = %e,
                    text_preview = %truncate_for_log(text, 120),
                    "Generative summary failed; using extractive summary"
                ),
            }
        }
        let summary = extractive_summary(text, self.max_sentences);
        debug!(lines = summary.lines().count(), "Built extractive summary");
        summary
    }
}

/// Prompt asking for one headline line and three one-sentence bullets.
pub fn summary_prompt(title: &str, text: &str) -> String {
    format!(
        "You are a concise, factual summarizer. Output:\n\
         - One short headline (one line)\n\
         - Three clear bullet points (each 1 sentence)\n\n\
         Article Title: {title}\n\nArticle Text:\n{text}\n\nSummary:"
    )
}

/// Split normalized text after `.`, `?` or `!` followed by whitespace.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for m in SENTENCE_END_RE.find_iter(text) {
        // Keep the punctuation, drop the whitespace.
        let end = m.start() + 1;
        sentences.push(text[start..end].trim());
        start = m.end();
    }
    sentences.push(text[start..].trim());
    sentences.retain(|s| !s.is_empty());
    sentences
}

/// First sentence as the headline, the next ones (up to `max_sentences` in
/// total) as `- ` bullet lines.
///
/// ```ignore
/// assert_eq!(extractive_summary("", 3), "");
/// assert_eq!(extractive_summary("One. Two. Three.", 3), "One.\n- Two.\n- Three.");
/// ```
pub fn extractive_summary(text: &str, max_sentences: usize) -> String {
    let text = normalize_whitespace(text);
    if text.is_empty() {
        return String::new();
    }

    let sentences = split_sentences(&text);
    let pool = &sentences[..sentences.len().min(max_sentences.max(1))];
    // Non-empty text always yields a sentence; this only guards the slice.
    let Some((headline, bullets)) = pool.split_first() else {
        return truncated_headline(&text);
    };

    std::iter::once(headline.to_string())
        .chain(bullets.iter().map(|b| format!("- {b}")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The first `HEADLINE_FALLBACK_CHARS` characters of `text` followed by `...`.
fn truncated_headline(text: &str) -> String {
    format!("{}...", truncate_chars(text, HEADLINE_FALLBACK_CHARS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SummarizeError;
    use std::sync::Mutex;

    /// Records prompts and answers with a fixed result.
    struct FakeModel {
        reply: Option<String>,
        prompts: Mutex<Vec<String>>,
    }

    impl FakeModel {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Some(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: None,
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    impl AskAsync for FakeModel {
        async fn ask(&self, prompt: &str) -> Result<String, SummarizeError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().ok_or(SummarizeError::EmptyResponse)
        }
    }

    const FIVE: &str = "First sentence here. Second one? Third one! Fourth one. Fifth one.";

    #[test]
    fn test_extractive_empty_input() {
        assert_eq!(extractive_summary("", 3), "");
        assert_eq!(extractive_summary("  \n\t ", 3), "");
    }

    #[test]
    fn test_extractive_single_sentence_has_no_bullets() {
        assert_eq!(
            extractive_summary("Parliament passed the bill.", 3),
            "Parliament passed the bill."
        );
        assert_eq!(extractive_summary("no terminal punctuation", 3), "no terminal punctuation");
    }

    #[test]
    fn test_extractive_five_sentences_gives_two_bullets() {
        let summary = extractive_summary(FIVE, 3);
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines, vec!["First sentence here.", "- Second one?", "- Third one!"]);
        assert_eq!(lines.iter().filter(|l| l.starts_with("- ")).count(), 2);
    }

    #[test]
    fn test_extractive_normalizes_whitespace() {
        let summary = extractive_summary("One   line.\n\nTwo\tlines.", 3);
        assert_eq!(summary, "One line.\n- Two lines.");
    }

    #[test]
    fn test_truncated_headline_caps_at_100_chars() {
        let long = "ग".repeat(150);
        let headline = truncated_headline(&long);
        assert_eq!(headline.chars().count(), 103);
        assert!(headline.ends_with("..."));
        assert_eq!(truncated_headline("short"), "short...");
    }

    #[test]
    fn test_split_keeps_abbreviation_like_dots_without_space() {
        assert_eq!(
            split_sentences("GDP grew 7.5 per cent. Markets rose."),
            vec!["GDP grew 7.5 per cent.", "Markets rose."]
        );
    }

    #[tokio::test]
    async fn test_generative_reply_is_returned() {
        let summarizer = Summarizer::generative(FakeModel::replying("Headline\n- a\n- b\n- c"), 3);
        assert!(matches!(summarizer.backend, SummaryBackend::Generative(_)));
        let summary = summarizer.summarize("Budget announced", FIVE).await;
        assert_eq!(summary, "Headline\n- a\n- b\n- c");

        let SummaryBackend::Generative(model) = &summarizer.backend else {
            unreachable!()
        };
        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Article Title: Budget announced"));
        assert!(prompts[0].contains(FIVE));
    }

    #[tokio::test]
    async fn test_generative_failure_falls_back() {
        let summarizer = Summarizer::generative(FakeModel::failing(), 3);
        let summary = summarizer.summarize("Budget announced", FIVE).await;
        assert_eq!(summary, extractive_summary(FIVE, 3));
    }

    #[tokio::test]
    async fn test_unavailable_backend_is_extractive() {
        let summarizer: Summarizer<FakeModel> = Summarizer::unavailable(3);
        assert!(matches!(summarizer.backend, SummaryBackend::Unavailable));
        assert_eq!(summarizer.summarize("t", "").await, "");
        assert_eq!(summarizer.summarize("t", FIVE).await, extractive_summary(FIVE, 3));
    }
}
