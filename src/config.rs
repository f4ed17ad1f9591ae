//! Store configuration.
//!
//! All file paths are injected through [`StoreConfig`] at construction time
//! rather than read from ambient globals, so tests and embedders can point
//! the engine anywhere.

use std::path::{Path, PathBuf};

/// File locations for the four persisted stores.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Item catalog (names, prices, stock)
    pub catalog_path: PathBuf,
    /// Stock/price transaction ledger
    pub ledger_path: PathBuf,
    /// Cash balance and cash transactions
    pub cash_path: PathBuf,
    /// Recent recognition-to-match log
    pub recent_log_path: PathBuf,
}

impl StoreConfig {
    /// Places all store files inside the given directory using the
    /// conventional file names.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            catalog_path: dir.join("items_database.json"),
            ledger_path: dir.join("ledger.json"),
            cash_path: dir.join("cash_data.json"),
            recent_log_path: dir.join("recent_logs.json"),
        }
    }

    /// Default per-user data location.
    pub fn default_location() -> Self {
        let dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shop_ledger");
        Self::in_dir(dir)
    }
}
