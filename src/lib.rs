//! Item Matching & Inventory Ledger Engine
//!
//! Fuzzy-matches noisy recognized text against a local item catalog and
//! keeps stock, price, and cash bookkeeping consistent over an append-only
//! transaction log. The text recognizer, capture trigger, and any UI are
//! external collaborators: they hand this crate `(text, confidence)` pairs
//! and get plain data structures back.
//!
//! Each store persists to its own JSON document (write-through after every
//! mutation) and recovers to an empty state when its file is missing or
//! corrupt.

pub mod cash;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod matching;
pub mod models;
pub mod recent_log;
pub mod storage;
pub mod views;

// Re-export commonly used items
pub use cash::{CashLedger, CashOp};
pub use catalog::{CatalogStats, CatalogStore, InventoryValue};
pub use config::StoreConfig;
pub use engine::{RecognitionOutcome, ShopEngine};
pub use error::{StoreError, StoreResult};
pub use ledger::{LedgerStats, TransactionLedger, LEDGER_CAP};
pub use matching::{match_item, search, token_set_ratio, ItemMatch};
pub use models::{Item, LedgerEntry, Recognition, RecentLogEntry, TransactionType};
pub use recent_log::{RecentLog, RECENT_LOG_CAP};
pub use views::{
    daily_chart_series, inventory_snapshot, ledger_view, ChartPoint, InventoryRow, LedgerView,
    PriceAdjustment,
};
