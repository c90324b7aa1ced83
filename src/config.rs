//! Runtime configuration for a digest run.
//!
//! [`DigestConfig`] is built once in `main` and handed to every stage. Values
//! are layered: built-in defaults, then the optional YAML file, then CLI flags
//! and environment variables.
//!
//! ```yaml
//! # digest.yaml
//! feed_urls:
//!   - https://www.thehindu.com/news/national/feeder/default.rss
//! allow_domains: [thehindu.com]
//! exclude_keywords: [cricket]
//! max_items: 5
//! dry_run: false
//! ```

use crate::cli::Cli;
use crate::error::ConfigError;
use crate::utils::{normalize_terms, parse_list};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument, warn};

pub const DEFAULT_FEEDS: &[&str] = &[
    "https://timesofindia.indiatimes.com/rssfeedstopstories.cms",
    "https://www.thehindu.com/news/national/feeder/default.rss",
    "https://www.hindustantimes.com/rss/topnews/rssfeed.xml",
    "https://indianexpress.com/section/india/feed/",
    "https://feeds.feedburner.com/ndtvnews-top-stories",
    "https://www.indiatoday.in/rss/home",
];

pub const DEFAULT_ALLOW_DOMAINS: &[&str] = &[
    "timesofindia.indiatimes.com",
    "thehindu.com",
    "hindustantimes.com",
    "indianexpress.com",
    "ndtv.com",
    "indiatoday.in",
    "economictimes.indiatimes.com",
    "news18.com",
];

pub const DEFAULT_MAX_ITEMS: usize = 10;
pub const DEFAULT_MAX_PER_FEED: usize = 25;
pub const DEFAULT_MIN_ARTICLE_LENGTH: usize = 150;
pub const DEFAULT_MAX_ARTICLE_CHARS: usize = 6000;
pub const DEFAULT_SUMMARY_SENTENCES: usize = 3;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(12);
pub const DEFAULT_POLITENESS_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_SENT_FILE: &str = "sent.json";
pub const DEFAULT_DIGEST_TITLE: &str = "India Daily Digest";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
/// Implicit TLS (SMTPS).
pub const DEFAULT_SMTP_PORT: u16 = 465;

/// Everything a digest run needs to know.
#[derive(Debug, Clone)]
pub struct DigestConfig {
    pub feed_urls: Vec<String>,
    /// Lowercased host fragments. Empty allows every host.
    pub allow_domains: Vec<String>,
    /// Lowercased; empty disables the include check.
    pub include_keywords: Vec<String>,
    /// Lowercased.
    pub exclude_keywords: Vec<String>,
    pub max_items: usize,
    pub max_per_feed: usize,
    pub min_article_length: usize,
    pub max_article_chars: usize,
    pub summary_sentences: usize,
    pub request_timeout: Duration,
    pub politeness_delay: Duration,
    pub dry_run: bool,
    pub persist_sent: bool,
    pub sent_file: PathBuf,
    pub digest_title: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub smtp: SmtpSettings,
}

/// Mail relay and credentials. Only checked when not in dry-run mode.
#[derive(Clone, Default)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub sender_email: Option<String>,
    pub receiver_email: Option<String>,
    pub app_password: Option<String>,
}

impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("sender_email", &self.sender_email)
            .field("receiver_email", &self.receiver_email)
            .field("app_password", &self.app_password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Complete sender credentials, borrowed from [`SmtpSettings`].
#[derive(Debug, Clone, Copy)]
pub struct Credentials<'a> {
    pub sender_email: &'a str,
    pub receiver_email: &'a str,
    pub app_password: &'a str,
}

impl SmtpSettings {
    /// Return the credentials, or name every one that is missing.
    pub fn credentials(&self) -> Result<Credentials<'_>, ConfigError> {
        fn present(v: &Option<String>) -> Option<&str> {
            v.as_deref().filter(|s| !s.trim().is_empty())
        }

        match (
            present(&self.sender_email),
            present(&self.receiver_email),
            present(&self.app_password),
        ) {
            (Some(sender_email), Some(receiver_email), Some(app_password)) => Ok(Credentials {
                sender_email,
                receiver_email,
                app_password,
            }),
            (s, r, p) => {
                let missing = [
                    (s.is_none(), "SENDER_EMAIL"),
                    (r.is_none(), "RECEIVER_EMAIL"),
                    (p.is_none(), "APP_PASSWORD"),
                ]
                .into_iter()
                .filter_map(|(absent, name)| absent.then_some(name))
                .collect::<Vec<_>>()
                .join(", ");
                Err(ConfigError::MissingCredentials { missing })
            }
        }
    }
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            feed_urls: DEFAULT_FEEDS.iter().map(|s| s.to_string()).collect(),
            allow_domains: DEFAULT_ALLOW_DOMAINS.iter().map(|s| s.to_string()).collect(),
            include_keywords: Vec::new(),
            exclude_keywords: Vec::new(),
            max_items: DEFAULT_MAX_ITEMS,
            max_per_feed: DEFAULT_MAX_PER_FEED,
            min_article_length: DEFAULT_MIN_ARTICLE_LENGTH,
            max_article_chars: DEFAULT_MAX_ARTICLE_CHARS,
            summary_sentences: DEFAULT_SUMMARY_SENTENCES,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            politeness_delay: DEFAULT_POLITENESS_DELAY,
            dry_run: true,
            persist_sent: true,
            sent_file: PathBuf::from(DEFAULT_SENT_FILE),
            digest_title: DEFAULT_DIGEST_TITLE.to_string(),
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            smtp: SmtpSettings {
                host: DEFAULT_SMTP_HOST.to_string(),
                port: DEFAULT_SMTP_PORT,
                ..SmtpSettings::default()
            },
        }
    }
}

/// Shape of the optional YAML config file. Every key may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub feed_urls: Option<Vec<String>>,
    pub allow_domains: Option<Vec<String>>,
    pub include_keywords: Option<Vec<String>>,
    pub exclude_keywords: Option<Vec<String>>,
    pub max_items: Option<usize>,
    pub max_per_feed: Option<usize>,
    pub min_article_length: Option<usize>,
    pub max_article_chars: Option<usize>,
    pub summary_sentences: Option<usize>,
    pub request_timeout_secs: Option<u64>,
    pub politeness_delay_ms: Option<u64>,
    pub dry_run: Option<bool>,
    pub persist_sent: Option<bool>,
    pub sent_file: Option<PathBuf>,
    pub digest_title: Option<String>,
    pub gemini_model: Option<String>,
    pub sender_email: Option<String>,
    pub receiver_email: Option<String>,
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
}

impl FileConfig {
    #[instrument(level = "info")]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let parsed = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded config file");
        Ok(parsed)
    }
}

impl DigestConfig {
    /// Build the run configuration from defaults, the optional config file and the CLI.
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(path) = &cli.config {
            config.apply_file(FileConfig::load(path)?);
        }
        config.apply_cli(cli);
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Lists given in the file are taken as-is, so `allow_domains: []` really is empty.
    pub fn apply_file(&mut self, file: FileConfig) {
        if let Some(v) = file.feed_urls {
            self.feed_urls = v;
        }
        if let Some(v) = file.allow_domains {
            self.allow_domains = v;
        }
        if let Some(v) = file.include_keywords {
            self.include_keywords = v;
        }
        if let Some(v) = file.exclude_keywords {
            self.exclude_keywords = v;
        }
        set(&mut self.max_items, file.max_items);
        set(&mut self.max_per_feed, file.max_per_feed);
        set(&mut self.min_article_length, file.min_article_length);
        set(&mut self.max_article_chars, file.max_article_chars);
        set(&mut self.summary_sentences, file.summary_sentences);
        set(&mut self.request_timeout, file.request_timeout_secs.map(Duration::from_secs));
        set(&mut self.politeness_delay, file.politeness_delay_ms.map(Duration::from_millis));
        set(&mut self.dry_run, file.dry_run);
        set(&mut self.persist_sent, file.persist_sent);
        set(&mut self.sent_file, file.sent_file);
        set(&mut self.digest_title, file.digest_title);
        set(&mut self.gemini_model, file.gemini_model);
        set(&mut self.smtp.host, file.smtp_host);
        set(&mut self.smtp.port, file.smtp_port);
        if file.sender_email.is_some() {
            self.smtp.sender_email = file.sender_email;
        }
        if file.receiver_email.is_some() {
            self.smtp.receiver_email = file.receiver_email;
        }
    }

    /// A blank comma list on the command line counts as unset.
    pub fn apply_cli(&mut self, cli: &Cli) {
        set_list(&mut self.feed_urls, cli.feed_urls.as_deref());
        set_list(&mut self.allow_domains, cli.allow_domains.as_deref());
        set_list(&mut self.include_keywords, cli.include_keywords.as_deref());
        set_list(&mut self.exclude_keywords, cli.exclude_keywords.as_deref());
        set(&mut self.max_items, cli.max_items);
        set(&mut self.max_per_feed, cli.max_per_feed);
        set(&mut self.min_article_length, cli.min_article_length);
        set(&mut self.max_article_chars, cli.max_article_chars);
        set(&mut self.summary_sentences, cli.summary_sentences);
        set(&mut self.request_timeout, cli.request_timeout_secs.map(Duration::from_secs));
        set(&mut self.politeness_delay, cli.politeness_delay_ms.map(Duration::from_millis));
        set(&mut self.dry_run, cli.dry_run);
        set(&mut self.persist_sent, cli.persist_sent);
        set(&mut self.sent_file, cli.sent_file.clone());
        set(&mut self.digest_title, cli.digest_title.clone());
        set(&mut self.gemini_model, cli.gemini_model.clone());
        set(&mut self.smtp.host, cli.smtp_host.clone());
        set(&mut self.smtp.port, cli.smtp_port);
        if let Some(key) = cli.google_api_key.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
            self.gemini_api_key = Some(key.to_string());
        }
        if cli.sender_email.is_some() {
            self.smtp.sender_email = cli.sender_email.clone();
        }
        if cli.receiver_email.is_some() {
            self.smtp.receiver_email = cli.receiver_email.clone();
        }
        if cli.app_password.is_some() {
            self.smtp.app_password = cli.app_password.clone();
        }
    }

    fn normalize(&mut self) {
        self.feed_urls = self
            .feed_urls
            .iter()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .collect();
        self.allow_domains = normalize_terms(&self.allow_domains);
        self.include_keywords = normalize_terms(&self.include_keywords);
        self.exclude_keywords = normalize_terms(&self.exclude_keywords);
    }

    /// Reject zero limits, and missing credentials unless this is a dry run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("MAX_ITEMS", self.max_items),
            ("MAX_PER_FEED", self.max_per_feed),
            ("SUMMARY_SENTENCES", self.summary_sentences),
        ] {
            if value == 0 {
                return Err(ConfigError::Zero { field });
            }
        }
        if !self.dry_run {
            self.smtp.credentials()?;
        }
        Ok(())
    }

    /// Log the effective settings, without secrets.
    pub fn log_summary(&self) {
        info!(
            dry_run = self.dry_run,
            feeds = ?self.feed_urls,
            allow_domains = ?self.allow_domains,
            include_keywords = ?self.include_keywords,
            exclude_keywords = ?self.exclude_keywords,
            max_items = self.max_items,
            max_per_feed = self.max_per_feed,
            min_article_length = self.min_article_length,
            generative_summaries = self.gemini_api_key.is_some(),
            persist_sent = self.persist_sent,
            sent_file = %self.sent_file.display(),
            "Digest configuration"
        );
        if self.allow_domains.is_empty() {
            warn!("Domain allow-list is empty; articles from every host are allowed");
        }
    }
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}

fn set_list(slot: &mut Vec<String>, raw: Option<&str>) {
    let list = raw.map(parse_list).unwrap_or_default();
    if !list.is_empty() {
        *slot = list;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = DigestConfig::resolve(&Cli::default()).unwrap();
        assert_eq!(config.feed_urls.len(), DEFAULT_FEEDS.len());
        assert!(config.allow_domains.contains(&"thehindu.com".to_string()));
        assert_eq!(config.max_items, 10);
        assert_eq!(config.max_per_feed, 25);
        assert_eq!(config.min_article_length, 150);
        assert!(config.dry_run);
        assert!(config.persist_sent);
        assert_eq!(config.smtp.port, 465);
    }

    #[test]
    fn test_cli_lists_are_normalized() {
        let cli = Cli {
            allow_domains: Some(" TheHindu.com , ndtv.com,".to_string()),
            exclude_keywords: Some("Cricket,cricket".to_string()),
            ..Cli::default()
        };
        let config = DigestConfig::resolve(&cli).unwrap();
        assert_eq!(config.allow_domains, vec!["thehindu.com", "ndtv.com"]);
        assert_eq!(config.exclude_keywords, vec!["cricket"]);
    }

    #[test]
    fn test_blank_cli_list_keeps_default_allow_domains() {
        let cli = Cli {
            allow_domains: Some(" , ".to_string()),
            ..Cli::default()
        };
        let config = DigestConfig::resolve(&cli).unwrap();
        assert_eq!(config.allow_domains.len(), DEFAULT_ALLOW_DOMAINS.len());
    }

    #[test]
    fn test_file_then_cli_precedence() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "allow_domains: []\nmax_items: 4\nmax_per_feed: 7\ndigest_title: Weekend Roundup"
        )
        .unwrap();

        let cli = Cli {
            config: Some(file.path().to_path_buf()),
            max_items: Some(2),
            ..Cli::default()
        };
        let config = DigestConfig::resolve(&cli).unwrap();
        assert!(config.allow_domains.is_empty());
        assert_eq!(config.max_items, 2);
        assert_eq!(config.max_per_feed, 7);
        assert_eq!(config.digest_title, "Weekend Roundup");
    }

    #[test]
    fn test_unknown_file_key_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_itemz: 4").unwrap();
        let cli = Cli {
            config: Some(file.path().to_path_buf()),
            ..Cli::default()
        };
        assert!(matches!(
            DigestConfig::resolve(&cli),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let cli = Cli {
            config: Some(PathBuf::from("/nonexistent/digest.yaml")),
            ..Cli::default()
        };
        assert!(matches!(
            DigestConfig::resolve(&cli),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_send_mode_requires_credentials() {
        let cli = Cli {
            dry_run: Some(false),
            sender_email: Some("me@example.com".to_string()),
            ..Cli::default()
        };
        match DigestConfig::resolve(&cli) {
            Err(ConfigError::MissingCredentials { missing }) => {
                assert_eq!(missing, "RECEIVER_EMAIL, APP_PASSWORD");
            }
            other => panic!("expected missing credentials, got {other:?}"),
        }
    }

    #[test]
    fn test_send_mode_with_credentials() {
        let cli = Cli {
            dry_run: Some(false),
            sender_email: Some("me@example.com".to_string()),
            receiver_email: Some("you@example.com".to_string()),
            app_password: Some("abcd efgh ijkl mnop".to_string()),
            ..Cli::default()
        };
        let config = DigestConfig::resolve(&cli).unwrap();
        let creds = config.smtp.credentials().unwrap();
        assert_eq!(creds.receiver_email, "you@example.com");
    }

    #[test]
    fn test_blank_credentials_count_as_missing() {
        let smtp = SmtpSettings {
            sender_email: Some("me@example.com".to_string()),
            receiver_email: Some("   ".to_string()),
            app_password: Some(String::new()),
            ..SmtpSettings::default()
        };
        match smtp.credentials() {
            Err(ConfigError::MissingCredentials { missing }) => {
                assert_eq!(missing, "RECEIVER_EMAIL, APP_PASSWORD");
            }
            other => panic!("expected missing credentials, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_max_items_is_rejected() {
        let cli = Cli {
            max_items: Some(0),
            ..Cli::default()
        };
        assert!(matches!(
            DigestConfig::resolve(&cli),
            Err(ConfigError::Zero { field: "MAX_ITEMS" })
        ));
    }

    #[test]
    fn test_app_password_is_redacted() {
        let smtp = SmtpSettings {
            app_password: Some("secret".to_string()),
            ..SmtpSettings::default()
        };
        let debug = format!("{smtp:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }
}
