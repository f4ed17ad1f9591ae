//! Typed records for the catalog, ledgers, and recognition boundary.
//!
//! Timestamps are `f64` epoch seconds throughout, matching the on-disk
//! format. Money and stock are `i64`; negative inputs are coerced to 0 at
//! the boundary rather than rejected.

use serde::{Deserialize, Serialize};

/// Current time as fractional epoch seconds.
pub fn now_ts() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// Coerces a price or stock value to the non-negative range.
pub fn clamp_non_negative(value: i64) -> i64 {
    value.max(0)
}

/// A catalog item. The item's name is the map key in [`crate::CatalogStore`],
/// not a field here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Price per unit, currency units
    pub price: i64,
    /// Units on hand, never negative
    #[serde(default)]
    pub stock: i64,
    /// Creation time, epoch seconds
    #[serde(rename = "added_date")]
    pub added_at: f64,
    /// Last mutation time, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<f64>,
}

impl Item {
    pub fn new(price: i64, stock: i64) -> Self {
        Self {
            price: clamp_non_negative(price),
            stock: clamp_non_negative(stock),
            added_at: now_ts(),
            last_updated: None,
        }
    }

    /// Inventory value of this item.
    pub fn value(&self) -> i64 {
        self.price * self.stock
    }
}

/// Kind of ledger mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Adjustment,
    Sale,
    Purchase,
    PriceUpdate,
    Cash,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Adjustment => "adjustment",
            TransactionType::Sale => "sale",
            TransactionType::Purchase => "purchase",
            TransactionType::PriceUpdate => "price_update",
            TransactionType::Cash => "cash",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ledger record. Immutable once recorded except through
/// delete-with-reversal.
///
/// `item_name` is a string reference, not a foreign key: it outlives renames
/// and deletions of the item it names. Cash transactions reuse this shape
/// with zeroed stock fields and the human description in `item_name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Epoch seconds
    pub timestamp: f64,
    pub item_name: String,
    #[serde(default)]
    pub old_stock: i64,
    #[serde(default)]
    pub new_stock: i64,
    #[serde(default)]
    pub quantity: i64,
    /// Catalog price at transaction time
    #[serde(default)]
    pub price: i64,
    /// Actual per-unit price for sales, when it matters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selling_price: Option<i64>,
    /// Signed magnitude of the transaction
    #[serde(default)]
    pub value: i64,
    pub transaction_type: TransactionType,
    /// Price before a `price_update`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_price: Option<i64>,
    /// Price after a `price_update`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_price: Option<i64>,
}

impl LedgerEntry {
    /// Entry for a plain stock change (adjustment or purchase).
    /// `quantity = |new - old|`, `value = quantity * price`.
    pub fn stock_change(
        item_name: &str,
        old_stock: i64,
        new_stock: i64,
        transaction_type: TransactionType,
        price: i64,
    ) -> Self {
        let quantity = (new_stock - old_stock).abs();
        Self {
            timestamp: now_ts(),
            item_name: item_name.to_string(),
            old_stock,
            new_stock,
            quantity,
            price,
            selling_price: None,
            value: quantity * price,
            transaction_type,
            old_price: None,
            new_price: None,
        }
    }

    /// Entry for a sale. The quantity may be decoupled from the stock delta
    /// and the selling price is kept even when it equals the catalog price.
    pub fn sale(
        item_name: &str,
        old_stock: i64,
        new_stock: i64,
        quantity: i64,
        catalog_price: i64,
        selling_price: i64,
    ) -> Self {
        Self {
            timestamp: now_ts(),
            item_name: item_name.to_string(),
            old_stock,
            new_stock,
            quantity,
            price: catalog_price,
            selling_price: Some(selling_price),
            value: selling_price * quantity,
            transaction_type: TransactionType::Sale,
            old_price: None,
            new_price: None,
        }
    }

    /// Entry for a catalog price change.
    pub fn price_change(item_name: &str, old_price: i64, new_price: i64) -> Self {
        Self {
            timestamp: now_ts(),
            item_name: item_name.to_string(),
            old_stock: 0,
            new_stock: 0,
            quantity: 0,
            price: 0,
            selling_price: None,
            value: 0,
            transaction_type: TransactionType::PriceUpdate,
            old_price: Some(old_price),
            new_price: Some(new_price),
        }
    }

    /// Entry for a cash balance change. `value` is signed.
    pub fn cash(description: &str, value: i64) -> Self {
        Self {
            timestamp: now_ts(),
            item_name: description.to_string(),
            old_stock: 0,
            new_stock: 0,
            quantity: 0,
            price: 0,
            selling_price: None,
            value,
            transaction_type: TransactionType::Cash,
            old_price: None,
            new_price: None,
        }
    }
}

/// One recognition-to-match event in the recent log. Not a source of truth
/// for stock; `stock` is a convenience snapshot refreshed on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentLogEntry {
    /// Epoch seconds
    pub timestamp: f64,
    /// Raw recognized text
    pub ocr_text: String,
    #[serde(default)]
    pub matched_item: Option<String>,
    #[serde(default)]
    pub price: Option<i64>,
    /// 0-100
    #[serde(default)]
    pub match_score: Option<u8>,
    #[serde(default)]
    pub stock: i64,
}

/// One text fragment from the recognition collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recognition {
    pub text: String,
    /// 0-100
    pub confidence: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_type_serializes_as_snake_case() {
        let json = serde_json::to_string(&TransactionType::PriceUpdate).unwrap();
        assert_eq!(json, "\"price_update\"");
        let back: TransactionType = serde_json::from_str("\"cash\"").unwrap();
        assert_eq!(back, TransactionType::Cash);
    }

    #[test]
    fn stock_change_derives_quantity_and_value() {
        let entry = LedgerEntry::stock_change("Red Potion", 3, 8, TransactionType::Purchase, 100);
        assert_eq!(entry.quantity, 5);
        assert_eq!(entry.value, 500);
        assert!(entry.selling_price.is_none());
    }

    #[test]
    fn sale_value_uses_selling_price() {
        let entry = LedgerEntry::sale("Red Potion", 10, 7, 3, 100, 120);
        assert_eq!(entry.value, 360);
        assert_eq!(entry.price, 100);
        assert_eq!(entry.selling_price, Some(120));
    }

    #[test]
    fn price_change_keeps_old_and_new() {
        let entry = LedgerEntry::price_change("Red Potion", 100, 150);
        assert_eq!(entry.old_price, Some(100));
        assert_eq!(entry.new_price, Some(150));
        assert_eq!(entry.transaction_type, TransactionType::PriceUpdate);
        // Optional price fields only appear for price updates
        let json = serde_json::to_string(&LedgerEntry::cash("deposit", 50)).unwrap();
        assert!(!json.contains("old_price"));
    }

    #[test]
    fn item_coerces_negative_inputs_to_zero() {
        let item = Item::new(-5, -3);
        assert_eq!(item.price, 0);
        assert_eq!(item.stock, 0);
    }

    #[test]
    fn item_deserializes_without_stock_field() {
        // Old catalog documents predate the stock field
        let item: Item = serde_json::from_str(r#"{"price": 42, "added_date": 1.0}"#).unwrap();
        assert_eq!(item.stock, 0);
    }
}
