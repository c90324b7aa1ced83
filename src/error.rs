//! Typed failures for each stage of the digest pipeline.
//!
//! Only [`ConfigError`] and [`DispatchError`] ever stop a run. Everything else
//! is logged by the caller and degraded into a fallback value or a skipped
//! candidate.

use std::path::PathBuf;
use thiserror::Error;

/// Invalid or incomplete configuration, detected at start-up.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("SENDER_EMAIL, RECEIVER_EMAIL and APP_PASSWORD are required to send email (missing: {missing})")]
    MissingCredentials { missing: String },
}

/// A feed could not be read. Isolated to that one feed.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("feed returned HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("feed could not be parsed: {0}")]
    Parse(#[from] feed_rs::parser::ParseFeedError),
}

/// Why a page did not yield usable article text.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Transport failure, timeout or non-2xx status.
    #[error("fetch_error: {0}")]
    Network(String),

    #[error("extract_error: {0}")]
    Parse(String),

    /// The page parsed but carried fewer characters than the configured minimum.
    #[error("insufficient_content(len={len})")]
    InsufficientContent { len: usize },
}

impl ExtractError {
    pub fn is_network(&self) -> bool {
        matches!(self, ExtractError::Network(_))
    }
}

impl From<reqwest::Error> for ExtractError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ExtractError::Parse(e.to_string())
        } else {
            ExtractError::Network(e.to_string())
        }
    }
}

/// The generative summarization call failed. Always recovered from.
#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("summarization request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("summarization API returned HTTP {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("summarization API returned no text")]
    EmptyResponse,
}

/// The dedup store could not be written.
#[derive(Debug, Error)]
pub enum DedupError {
    #[error("could not write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not serialize sent URLs: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The digest could not be delivered.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("invalid email address {address:?}: {source}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("could not build email: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_error_reasons() {
        assert_eq!(
            ExtractError::InsufficientContent { len: 42 }.to_string(),
            "insufficient_content(len=42)"
        );
        assert!(ExtractError::Network("timed out".into()).is_network());
        assert!(!ExtractError::Parse("bad markup".into()).is_network());
    }

    #[test]
    fn test_missing_credentials_message() {
        let e = ConfigError::MissingCredentials {
            missing: "APP_PASSWORD".into(),
        };
        assert!(e.to_string().contains("missing: APP_PASSWORD"));
    }
}
