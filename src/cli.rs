//! Command-line interface definitions for the daily news digest.
//!
//! Every option can also be given through the environment variable named in
//! its `env` attribute. Anything left unset falls back to the YAML file given
//! with `--config`, then to the built-in defaults in [`crate::config`].

use clap::Parser;
use clap::builder::BoolishValueParser;
use std::path::PathBuf;

/// Command-line arguments for the daily news digest.
///
/// # Examples
///
/// ```sh
/// # Collect and print the digest without sending anything
/// daily_news_digest
///
/// # Send for real, only stories mentioning the monsoon
/// DRY_RUN=false INCLUDE_KEYWORDS=monsoon daily_news_digest \
///     --sender-email me@gmail.com --receiver-email you@example.com
/// ```
#[derive(Parser, Debug, Default)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long, env = "DIGEST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Comma-separated RSS/Atom feed URLs
    #[arg(long, env = "FEED_URLS")]
    pub feed_urls: Option<String>,

    /// Comma-separated domain allow-list (substring match on the host)
    #[arg(long, env = "ALLOW_DOMAINS")]
    pub allow_domains: Option<String>,

    /// Comma-separated keywords; when set an article must mention at least one
    #[arg(long, env = "INCLUDE_KEYWORDS")]
    pub include_keywords: Option<String>,

    /// Comma-separated keywords that drop an article
    #[arg(long, env = "EXCLUDE_KEYWORDS")]
    pub exclude_keywords: Option<String>,

    /// Number of articles in the digest
    #[arg(long, env = "MAX_ITEMS")]
    pub max_items: Option<usize>,

    /// Most recent entries to read from each feed
    #[arg(long, env = "MAX_PER_FEED")]
    pub max_per_feed: Option<usize>,

    /// Minimum characters of article text (or feed summary) to accept
    #[arg(long, env = "MIN_ARTICLE_LENGTH")]
    pub min_article_length: Option<usize>,

    /// Extracted article text is cut to this many characters
    #[arg(long, env = "MAX_ARTICLE_CHARS")]
    pub max_article_chars: Option<usize>,

    /// Sentences used by the extractive fallback summary
    #[arg(long, env = "SUMMARY_SENTENCES")]
    pub summary_sentences: Option<usize>,

    /// Per-request HTTP timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    /// Pause between article fetches in milliseconds
    #[arg(long, env = "POLITENESS_DELAY_MS")]
    pub politeness_delay_ms: Option<u64>,

    /// Print the digest instead of sending it
    #[arg(long, env = "DRY_RUN", value_parser = BoolishValueParser::new())]
    pub dry_run: Option<bool>,

    /// Remember delivered URLs so they are not sent again
    #[arg(long, env = "PERSIST_SENT", value_parser = BoolishValueParser::new())]
    pub persist_sent: Option<bool>,

    /// JSON file holding already-delivered URLs
    #[arg(long, env = "SENT_FILE")]
    pub sent_file: Option<PathBuf>,

    /// Heading used in the digest body and subject
    #[arg(long, env = "DIGEST_TITLE")]
    pub digest_title: Option<String>,

    /// Gemini API key; enables generative summaries
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub google_api_key: Option<String>,

    /// Gemini model name
    #[arg(long, env = "GEMINI_MODEL")]
    pub gemini_model: Option<String>,

    /// Address the digest is sent from (also the SMTP login)
    #[arg(long, env = "SENDER_EMAIL")]
    pub sender_email: Option<String>,

    /// Address the digest is sent to
    #[arg(long, env = "RECEIVER_EMAIL")]
    pub receiver_email: Option<String>,

    /// SMTP application password
    #[arg(long, env = "APP_PASSWORD", hide_env_values = true)]
    pub app_password: Option<String>,

    /// SMTP relay host (implicit TLS)
    #[arg(long, env = "SMTP_HOST")]
    pub smtp_host: Option<String>,

    /// SMTP relay port
    #[arg(long, env = "SMTP_PORT")]
    pub smtp_port: Option<u16>,
}
