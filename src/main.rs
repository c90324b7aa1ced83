//! # Daily News Digest
//!
//! Reads a fixed set of news feeds, drops anything already delivered or off
//! topic, summarizes the freshest articles and emails them as one digest.
//!
//! ## Usage
//!
//! ```sh
//! # Print today's digest without sending
//! daily_news_digest
//!
//! # Send it
//! DRY_RUN=false SENDER_EMAIL=me@gmail.com RECEIVER_EMAIL=you@example.com \
//!     APP_PASSWORD='xxxx xxxx xxxx xxxx' daily_news_digest
//! ```
//!
//! ## Pipeline
//!
//! 1. **Feeds**: read every feed, rank entries newest first
//! 2. **Dedup**: skip URLs delivered by earlier runs (`sent.json`)
//! 3. **Extract**: pull paragraph text from the article page, or fall back to
//!    the feed summary
//! 4. **Filter**: domain allow-list, keywords, minimum length
//! 5. **Summarize**: Gemini when `GOOGLE_API_KEY` is set, extractive otherwise
//! 6. **Deliver**: print (dry run) or send over SMTPS, then record the URLs
//!
//! Run one instance at a time per `sent.json`; concurrent runs can lose
//! each other's history.

use chrono::Local;
use clap::Parser;
use std::error::Error;
use tracing::{error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod collector;
mod config;
mod dedup;
mod dispatch;
mod error;
mod extractor;
mod feeds;
mod filters;
mod models;
mod outputs;
mod summarizer;
mod utils;

use api::GeminiClient;
use cli::Cli;
use collector::DigestCollector;
use config::DigestConfig;
use dedup::DedupStore;
use dispatch::{Digest, Dispatcher};
use extractor::HttpPageFetcher;
use feeds::HttpFeedSource;
use summarizer::Summarizer;

const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; DailyNewsDigest/",
    env!("CARGO_PKG_VERSION"),
    ")"
);

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("daily_news_digest starting up");

    // --- Configuration; missing send credentials stop here ---
    let args = Cli::parse();
    let config = DigestConfig::resolve(&args).inspect_err(|e| {
        error!(error = %e, "Invalid configuration");
    })?;
    config.log_summary();
    let dispatcher = Dispatcher::from_config(&config)?;

    let http = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .user_agent(USER_AGENT)
        .build()?;

    let mut sent = DedupStore::load(&config.sent_file, config.persist_sent);
    if sent.is_empty() {
        info!(path = %config.sent_file.display(), "No sent history yet; every entry is new");
    }

    let summarizer = match &config.gemini_api_key {
        Some(key) => {
            info!(model = %config.gemini_model, "Generative summaries enabled");
            Summarizer::generative(
                GeminiClient::new(http.clone(), key.clone(), config.gemini_model.clone()),
                config.summary_sentences,
            )
        }
        None => {
            info!("GOOGLE_API_KEY not set; using extractive summaries");
            Summarizer::unavailable(config.summary_sentences)
        }
    };

    // ---- Collect ----
    let collector = DigestCollector::new(
        &config,
        HttpFeedSource::new(http.clone()),
        HttpPageFetcher::new(http),
        summarizer,
    );
    let collection = collector.collect(&sent).await;

    let stats = collection.stats;
    if collection.items.is_empty() {
        info!(
            considered = stats.considered,
            already_sent = stats.already_sent,
            filtered = stats.filtered,
            "No items selected after filtering; nothing to send"
        );
        return Ok(());
    }

    // ---- Render ----
    let today = Local::now().date_naive();
    let digest = Digest {
        subject: outputs::text::render_subject(collection.items.len(), &config.digest_title, today),
        text_body: outputs::text::render_body(&collection.items, &config.digest_title, today),
        html_body: outputs::html::render_body(&collection.items, &config.digest_title, today),
    };

    // ---- Deliver ----
    if let Err(e) = dispatcher.deliver(&digest).await {
        error!(error = %e, "Digest delivery failed; sent history left unchanged");
        return Err(e.into());
    }

    // ---- Record delivered URLs ----
    if config.persist_sent && !dispatcher.is_dry_run() {
        let mut added = 0usize;
        for item in &collection.items {
            if sent.add(item.url.clone()) {
                added += 1;
            }
        }
        match sent.save() {
            Ok(()) => info!(added, total = sent.len(), "Updated sent history"),
            Err(e) => warn!(error = %e, "Could not save sent history"),
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        items = collection.items.len(),
        considered = stats.considered,
        summary_fallbacks = stats.summary_fallbacks,
        dry_run = dispatcher.is_dry_run(),
        "Execution complete"
    );

    Ok(())
}
