//! JSON persistence helpers.
//!
//! Each store is one pretty-printed JSON document. Loads never fail hard: a
//! missing or corrupt file yields a freshly-initialized default so the
//! application stays usable with empty state. Saves propagate errors to the
//! caller.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{StoreError, StoreResult};

/// Loads a store document, falling back to `T::default()` when the file is
/// missing or unreadable. Corruption is logged, not propagated.
pub fn load_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    if !path.exists() {
        log::debug!("{}: not found, starting empty", path.display());
        return T::default();
    }
    match fs::read_to_string(path) {
        Ok(body) => match serde_json::from_str(&body) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("{}: malformed JSON ({}), starting empty", path.display(), e);
                T::default()
            }
        },
        Err(e) => {
            log::warn!("{}: read failed ({}), starting empty", path.display(), e);
            T::default()
        }
    }
}

/// Writes a store document as pretty-printed JSON, creating parent
/// directories as needed.
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    let body = serde_json::to_string_pretty(value)?;
    fs::write(path, body).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}
