//! Persisted record of article URLs already delivered.
//!
//! The file is a JSON array of strings, written sorted. Reading is lenient:
//! a missing, unreadable or malformed file is treated as an empty history so
//! a damaged file can never block a run. The set only grows.
//!
//! Only one run may use a given file at a time. Two concurrent runs would each
//! load the same history and the last save would drop the other's additions.

use crate::error::DedupError;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone)]
pub struct DedupStore {
    path: PathBuf,
    persist: bool,
    urls: BTreeSet<String>,
}

impl DedupStore {
    /// A store that remembers nothing between runs.
    #[cfg(test)]
    pub fn ephemeral() -> Self {
        Self {
            path: PathBuf::new(),
            persist: false,
            urls: BTreeSet::new(),
        }
    }

    /// Load the sent-URL history at `path`. With `persist` off the history starts empty.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display(), persist = persist))]
    pub fn load(path: impl AsRef<Path>, persist: bool) -> Self {
        let path = path.as_ref().to_path_buf();
        let urls = if persist { read_urls(&path) } else { BTreeSet::new() };
        info!(count = urls.len(), "Loaded previously sent URLs");
        Self { path, persist, urls }
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    /// Returns `true` if the URL was not already present.
    pub fn add(&mut self, url: impl Into<String>) -> bool {
        self.urls.insert(url.into())
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    #[cfg(test)]
    pub fn urls(&self) -> &BTreeSet<String> {
        &self.urls
    }

    /// Write the history as a sorted, pretty-printed JSON array.
    ///
    /// A no-op when persistence is disabled.
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    pub fn save(&self) -> Result<(), DedupError> {
        if !self.persist {
            debug!("Persistence disabled; not saving sent URLs");
            return Ok(());
        }
        let json = serde_json::to_string_pretty(&self.urls)?;
        let io_err = |source| DedupError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(&self.path, json).map_err(io_err)?;
        info!(count = self.urls.len(), "Saved sent URLs");
        Ok(())
    }
}

fn read_urls(path: &Path) -> BTreeSet<String> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeSet::new(),
        Err(e) => {
            warn!(error = %e, "Could not read sent URLs; starting with empty history");
            return BTreeSet::new();
        }
    };
    match serde_json::from_str::<serde_json::Value>(&raw) {
        Ok(serde_json::Value::Array(values)) => values
            .into_iter()
            .filter_map(|v| match v {
                serde_json::Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        Ok(_) => {
            warn!("Sent URLs file is not a JSON array; starting with empty history");
            BTreeSet::new()
        }
        Err(e) => {
            warn!(error = %e, "Sent URLs file is not valid JSON; starting with empty history");
            BTreeSet::new()
        }
    }
}
