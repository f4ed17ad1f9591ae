//! Item catalog store.
//!
//! Owns the name -> item mapping and persists it as a single JSON document
//! (`{"items": {...}, "last_updated": ...}`). Every public mutator writes
//! through to disk before returning. Names are case-sensitive identities;
//! case-insensitive lookup is the matcher's job.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::StoreResult;
use crate::models::{clamp_non_negative, now_ts, Item};
use crate::storage::{load_or_default, save_json};

#[derive(Debug, Default, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    items: BTreeMap<String, Item>,
    #[serde(default)]
    #[allow(dead_code)]
    last_updated: f64,
}

#[derive(Serialize)]
struct CatalogDocumentRef<'a> {
    items: &'a BTreeMap<String, Item>,
    last_updated: f64,
}

/// Summary statistics over catalog prices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogStats {
    pub total_items: usize,
    pub avg_price: i64,
    pub min_price: i64,
    pub max_price: i64,
}

/// Total inventory valuation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryValue {
    pub total_items: usize,
    pub items_with_stock: usize,
    pub total_value: i64,
}

/// The item catalog. Iteration order is the map's key order, which makes
/// matcher tie-breaks deterministic.
pub struct CatalogStore {
    path: PathBuf,
    items: BTreeMap<String, Item>,
}

impl CatalogStore {
    /// Opens the catalog at `path`. Missing or corrupt files start empty.
    pub fn open<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        let doc: CatalogDocument = load_or_default(&path);
        log::info!("Catalog: {} items from {}", doc.items.len(), path.display());
        Self {
            path,
            items: doc.items,
        }
    }

    fn persist(&self) -> StoreResult<()> {
        save_json(
            &self.path,
            &CatalogDocumentRef {
                items: &self.items,
                last_updated: now_ts(),
            },
        )
    }

    /// Adds an item, overwriting any existing entry of the same name.
    /// Returns `None` for an empty name. Negative price/stock coerce to 0.
    pub fn add_item(&mut self, name: &str, price: i64, stock: i64) -> StoreResult<Option<String>> {
        if name.is_empty() {
            return Ok(None);
        }
        self.items.insert(name.to_string(), Item::new(price, stock));
        self.persist()?;
        log::debug!("Catalog: added '{}'", name);
        Ok(Some(name.to_string()))
    }

    /// Updates an item's price, optionally its stock, and optionally renames
    /// it. A rename moves the record: the old name no longer resolves.
    /// Returns `false` if `name` is unknown.
    pub fn update_item(
        &mut self,
        name: &str,
        price: i64,
        new_name: Option<&str>,
        stock: Option<i64>,
    ) -> StoreResult<bool> {
        let Some(mut item) = self.items.get(name).cloned() else {
            return Ok(false);
        };
        item.price = clamp_non_negative(price);
        item.last_updated = Some(now_ts());
        if let Some(stock) = stock {
            item.stock = clamp_non_negative(stock);
        }
        match new_name {
            Some(new_name) if !new_name.is_empty() && new_name != name => {
                self.items.remove(name);
                self.items.insert(new_name.to_string(), item);
                log::debug!("Catalog: renamed '{}' -> '{}'", name, new_name);
            }
            _ => {
                self.items.insert(name.to_string(), item);
            }
        }
        self.persist()?;
        Ok(true)
    }

    /// Removes an item. Ledger history referencing the name is left alone.
    pub fn delete_item(&mut self, name: &str) -> StoreResult<bool> {
        if self.items.remove(name).is_none() {
            return Ok(false);
        }
        self.persist()?;
        log::debug!("Catalog: deleted '{}'", name);
        Ok(true)
    }

    /// Exact (case-sensitive) lookup.
    pub fn get_item(&self, name: &str) -> Option<&Item> {
        self.items.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Items in deterministic (name) order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Item)> {
        self.items.iter()
    }

    /// Sets an item's stock and bumps `last_updated`. Used by the engine
    /// after its ledger/cash bookkeeping has been decided.
    pub(crate) fn commit_stock(&mut self, name: &str, new_stock: i64) -> StoreResult<bool> {
        let Some(item) = self.items.get_mut(name) else {
            return Ok(false);
        };
        item.stock = clamp_non_negative(new_stock);
        item.last_updated = Some(now_ts());
        self.persist()?;
        Ok(true)
    }

    /// Sets an item's price without touching stock.
    pub(crate) fn commit_price(&mut self, name: &str, new_price: i64) -> StoreResult<bool> {
        let Some(item) = self.items.get_mut(name) else {
            return Ok(false);
        };
        item.price = clamp_non_negative(new_price);
        self.persist()?;
        Ok(true)
    }

    /// Adds `quantity` back to an item's stock, recreating the item from the
    /// ledger's stored price when it was deleted in the meantime.
    pub(crate) fn restock_or_insert(
        &mut self,
        name: &str,
        quantity: i64,
        price: i64,
    ) -> StoreResult<()> {
        match self.items.get_mut(name) {
            Some(item) => {
                item.stock = clamp_non_negative(item.stock + quantity);
                item.last_updated = Some(now_ts());
            }
            None => {
                self.items
                    .insert(name.to_string(), Item::new(price, quantity));
            }
        }
        self.persist()
    }

    /// Price statistics across the whole catalog.
    pub fn stats(&self) -> CatalogStats {
        let prices: Vec<i64> = self.items.values().map(|i| i.price).collect();
        if prices.is_empty() {
            return CatalogStats {
                total_items: 0,
                avg_price: 0,
                min_price: 0,
                max_price: 0,
            };
        }
        let sum: i64 = prices.iter().sum();
        CatalogStats {
            total_items: prices.len(),
            avg_price: sum / prices.len() as i64,
            min_price: *prices.iter().min().unwrap_or(&0),
            max_price: *prices.iter().max().unwrap_or(&0),
        }
    }

    /// Total value of stocked inventory.
    pub fn inventory_value(&self) -> InventoryValue {
        let mut value = InventoryValue {
            total_items: 0,
            items_with_stock: 0,
            total_value: 0,
        };
        for item in self.items.values() {
            value.total_items += 1;
            if item.stock > 0 {
                value.items_with_stock += 1;
                value.total_value += item.value();
            }
        }
        value
    }
}
