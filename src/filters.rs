//! Accept/reject decisions for a candidate article.
//!
//! Checks run in a fixed order and the first failure wins:
//!
//! 1. Host allow-list ([`DomainMatcher`])
//! 2. Exclude keywords over title and feed summary
//! 3. Include keywords, when any are configured
//! 4. Minimum length of the effective article text

use crate::config::DigestConfig;
use crate::models::FeedEntry;
use crate::utils::normalize_terms;
use std::fmt;
use url::Url;

/// Lowercased host of `url` with a leading `www.` removed, or `""` if it has none.
pub fn host_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase))
        .map(|host| match host.strip_prefix("www.") {
            Some(rest) => rest.to_string(),
            None => host,
        })
        .unwrap_or_default()
}

/// Substring match of a URL's host against an allow-list.
///
/// `"thehindu.com"` allows `thehindu.com`, `www.thehindu.com` and
/// `epaper.thehindu.com`. An empty allow-list allows every host.
#[derive(Debug, Clone, Default)]
pub struct DomainMatcher {
    allowed: Vec<String>,
}

impl DomainMatcher {
    pub fn new(allowed: &[String]) -> Self {
        Self {
            allowed: normalize_terms(allowed),
        }
    }

    pub fn allows_host(&self, host: &str) -> bool {
        self.allowed.is_empty() || self.allowed.iter().any(|a| host.contains(a.as_str()))
    }

    #[cfg(test)]
    pub fn allows(&self, url: &str) -> bool {
        self.allows_host(&host_of(url))
    }
}

/// Why the filter chain turned a candidate down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    DomainNotAllowed(String),
    ExcludeKeyword(String),
    IncludeKeywordsNotMatched,
    TooShort(usize),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::DomainNotAllowed(host) => write!(f, "domain_not_allowed:{host}"),
            Rejection::ExcludeKeyword(kw) => write!(f, "exclude_keyword:{kw}"),
            Rejection::IncludeKeywordsNotMatched => f.write_str("include_keywords_not_matched"),
            Rejection::TooShort(len) => write!(f, "too_short(len={len})"),
        }
    }
}

/// Domain, keyword and length checks composed into one decision.
#[derive(Debug, Clone)]
pub struct FilterChain {
    domains: DomainMatcher,
    include_keywords: Vec<String>,
    exclude_keywords: Vec<String>,
    min_length: usize,
}

impl FilterChain {
    pub fn new(
        allow_domains: &[String],
        include_keywords: &[String],
        exclude_keywords: &[String],
        min_length: usize,
    ) -> Self {
        Self {
            domains: DomainMatcher::new(allow_domains),
            include_keywords: normalize_terms(include_keywords),
            exclude_keywords: normalize_terms(exclude_keywords),
            min_length,
        }
    }

    pub fn from_config(config: &DigestConfig) -> Self {
        Self::new(
            &config.allow_domains,
            &config.include_keywords,
            &config.exclude_keywords,
            config.min_article_length,
        )
    }

    /// Decide on `entry` given its effective text (page text or the feed summary).
    pub fn check(&self, entry: &FeedEntry, effective_text: &str) -> Result<(), Rejection> {
        let host = host_of(&entry.link);
        if !self.domains.allows_host(&host) {
            return Err(Rejection::DomainNotAllowed(host));
        }

        let combined = format!("{} {}", entry.title, entry.summary_text()).to_lowercase();
        if let Some(kw) = self
            .exclude_keywords
            .iter()
            .find(|kw| combined.contains(kw.as_str()))
        {
            return Err(Rejection::ExcludeKeyword(kw.clone()));
        }

        if !self.include_keywords.is_empty()
            && !self
                .include_keywords
                .iter()
                .any(|kw| combined.contains(kw.as_str()))
        {
            return Err(Rejection::IncludeKeywordsNotMatched);
        }

        let effective_len = if effective_text.is_empty() {
            entry.summary_text().chars().count()
        } else {
            effective_text.chars().count()
        };
        if effective_len < self.min_length {
            return Err(Rejection::TooShort(effective_len));
        }

        Ok(())
    }
}
