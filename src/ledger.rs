//! Append-only transaction ledger.
//!
//! Entries are held newest-first and capped at [`LEDGER_CAP`]; the oldest
//! entries fall off silently. Reversal of an entry's catalog effects is the
//! engine's job - this store only locates and removes entries.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::StoreResult;
use crate::models::{now_ts, LedgerEntry, TransactionType};
use crate::storage::{load_or_default, save_json};

/// Maximum retained ledger entries.
pub const LEDGER_CAP: usize = 1000;

/// Timestamps within this tolerance identify the same entry.
pub const TIMESTAMP_TOLERANCE: f64 = 0.001;

#[derive(Debug, Default, Deserialize)]
struct LedgerDocument {
    #[serde(default)]
    ledger: Vec<LedgerEntry>,
    #[serde(default)]
    #[allow(dead_code)]
    last_updated: f64,
}

#[derive(Serialize)]
struct LedgerDocumentRef<'a> {
    ledger: &'a [LedgerEntry],
    last_updated: f64,
}

/// Aggregate counts and values over the whole ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerStats {
    pub total_entries: usize,
    pub transaction_counts: BTreeMap<TransactionType, usize>,
    pub total_sales_value: i64,
    pub total_purchase_value: i64,
}

/// The stock/price transaction log, newest-first.
pub struct TransactionLedger {
    path: PathBuf,
    entries: Vec<LedgerEntry>,
}

impl TransactionLedger {
    /// Opens the ledger at `path`. Missing or corrupt files start empty.
    pub fn open<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        let doc: LedgerDocument = load_or_default(&path);
        log::info!("Ledger: {} entries from {}", doc.ledger.len(), path.display());
        Self {
            path,
            entries: doc.ledger,
        }
    }

    fn persist(&self) -> StoreResult<()> {
        save_json(
            &self.path,
            &LedgerDocumentRef {
                ledger: &self.entries,
                last_updated: now_ts(),
            },
        )
    }

    /// Prepends an entry, evicting the oldest beyond [`LEDGER_CAP`].
    pub fn record(&mut self, entry: LedgerEntry) -> StoreResult<()> {
        log::debug!(
            "Ledger: {} '{}' value {}",
            entry.transaction_type,
            entry.item_name,
            entry.value
        );
        self.entries.insert(0, entry);
        self.entries.truncate(LEDGER_CAP);
        self.persist()
    }

    /// Up to `limit` entries from the newest end, with optional ANDed
    /// type/name filters.
    pub fn entries(
        &self,
        limit: usize,
        transaction_type: Option<TransactionType>,
        item_name: Option<&str>,
    ) -> Vec<LedgerEntry> {
        self.entries
            .iter()
            .filter(|e| transaction_type.map_or(true, |t| e.transaction_type == t))
            .filter(|e| item_name.map_or(true, |n| e.item_name == n))
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Locates the entry matching `(timestamp, item_name)` within the
    /// timestamp tolerance.
    pub(crate) fn find(&self, timestamp: f64, item_name: &str) -> Option<usize> {
        self.entries.iter().position(|e| {
            (e.timestamp - timestamp).abs() < TIMESTAMP_TOLERANCE && e.item_name == item_name
        })
    }

    pub(crate) fn get(&self, index: usize) -> Option<&LedgerEntry> {
        self.entries.get(index)
    }

    /// Removes an entry by index and persists.
    pub(crate) fn remove(&mut self, index: usize) -> StoreResult<LedgerEntry> {
        let entry = self.entries.remove(index);
        self.persist()?;
        Ok(entry)
    }

    /// Totals and per-type counts across all retained entries.
    pub fn stats(&self) -> LedgerStats {
        let mut stats = LedgerStats {
            total_entries: self.entries.len(),
            transaction_counts: BTreeMap::new(),
            total_sales_value: 0,
            total_purchase_value: 0,
        };
        for entry in &self.entries {
            *stats
                .transaction_counts
                .entry(entry.transaction_type)
                .or_insert(0) += 1;
            match entry.transaction_type {
                TransactionType::Sale => stats.total_sales_value += entry.value,
                TransactionType::Purchase => stats.total_purchase_value += entry.value,
                _ => {}
            }
        }
        stats
    }
}
