//! Error types for shop_ledger

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for store operations.
///
/// Domain-level refusals (unknown item, insufficient cash, overselling) are
/// not errors: those surface as `Ok(false)` or `None` from the operation in
/// question. `StoreError` only covers persistence going wrong.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing a store file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Serializing a store document failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
