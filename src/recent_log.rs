//! Bounded log of recent recognition-to-match events.
//!
//! Most-recent-first, capped at [`RECENT_LOG_CAP`]. Independent of the
//! ledger: correcting a log entry never touches stock or history.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::StoreResult;
use crate::models::{clamp_non_negative, now_ts, RecentLogEntry};
use crate::storage::{load_or_default, save_json};

/// Maximum retained recent-log entries.
pub const RECENT_LOG_CAP: usize = 100;

#[derive(Debug, Default, Deserialize)]
struct RecentLogDocument {
    #[serde(default)]
    logs: Vec<RecentLogEntry>,
    #[serde(default)]
    #[allow(dead_code)]
    last_updated: f64,
}

#[derive(Serialize)]
struct RecentLogDocumentRef<'a> {
    logs: &'a [RecentLogEntry],
    last_updated: f64,
}

/// The recent-match log store.
pub struct RecentLog {
    path: PathBuf,
    logs: Vec<RecentLogEntry>,
}

impl RecentLog {
    /// Opens the log at `path`. Missing or corrupt files start empty.
    pub fn open<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        let doc: RecentLogDocument = load_or_default(&path);
        Self {
            path,
            logs: doc.logs,
        }
    }

    fn persist(&self) -> StoreResult<()> {
        save_json(
            &self.path,
            &RecentLogDocumentRef {
                logs: &self.logs,
                last_updated: now_ts(),
            },
        )
    }

    /// Prepends an event, evicting the oldest beyond [`RECENT_LOG_CAP`].
    pub fn add(
        &mut self,
        ocr_text: &str,
        matched_item: Option<&str>,
        price: Option<i64>,
        match_score: Option<u8>,
        stock: i64,
    ) -> StoreResult<()> {
        self.logs.insert(
            0,
            RecentLogEntry {
                timestamp: now_ts(),
                ocr_text: ocr_text.to_string(),
                matched_item: matched_item.map(str::to_string),
                price,
                match_score,
                stock,
            },
        );
        self.logs.truncate(RECENT_LOG_CAP);
        self.persist()
    }

    /// Corrects an entry's matched item and/or price in place. Does not
    /// retroactively touch the ledger. Returns `false` on a bad index.
    pub fn correct(
        &mut self,
        index: usize,
        new_matched_item: Option<&str>,
        new_price: Option<i64>,
    ) -> StoreResult<bool> {
        let Some(entry) = self.logs.get_mut(index) else {
            return Ok(false);
        };
        if let Some(item) = new_matched_item {
            entry.matched_item = Some(item.to_string());
        }
        if let Some(price) = new_price {
            entry.price = Some(clamp_non_negative(price));
        }
        self.persist()?;
        Ok(true)
    }

    /// Up to `limit` entries, most recent first.
    pub fn recent(&self, limit: usize) -> Vec<RecentLogEntry> {
        self.logs.iter().take(limit).cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecentLogEntry> {
        self.logs.iter()
    }

    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }

    /// Drops all entries.
    pub fn clear(&mut self) -> StoreResult<()> {
        self.logs.clear();
        self.persist()
    }
}
