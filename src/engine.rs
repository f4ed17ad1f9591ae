//! Cross-store operations: the single owner of the catalog, ledgers, and
//! recent-match log.
//!
//! All mutation funnels through one `ShopEngine` value, which serializes
//! catalog and ledger writes by construction. Cross-store operations apply
//! in a fixed order: a cash-funded purchase debits cash first and only then
//! commits stock, so an insufficient-funds refusal leaves every store
//! untouched.

use crate::cash::{CashLedger, CashOp};
use crate::catalog::CatalogStore;
use crate::config::StoreConfig;
use crate::error::StoreResult;
use crate::ledger::TransactionLedger;
use crate::matching::{self, ItemMatch};
use crate::models::{LedgerEntry, Recognition, RecentLogEntry, TransactionType};
use crate::recent_log::RecentLog;

/// Outcome of running one recognized text fragment through the matcher.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionOutcome {
    pub ocr_text: String,
    /// Recognizer confidence, 0-100 (carried through, not used for matching)
    pub confidence: f32,
    pub matched: Option<ItemMatch>,
}

/// Owns all four stores and implements the operations that span them.
pub struct ShopEngine {
    catalog: CatalogStore,
    ledger: TransactionLedger,
    cash: CashLedger,
    recent: RecentLog,
}

impl ShopEngine {
    /// Opens every store at the configured paths. Missing or corrupt files
    /// start empty; nothing here fails hard.
    pub fn open(config: &StoreConfig) -> Self {
        Self {
            catalog: CatalogStore::open(&config.catalog_path),
            ledger: TransactionLedger::open(&config.ledger_path),
            cash: CashLedger::open(&config.cash_path),
            recent: RecentLog::open(&config.recent_log_path),
        }
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    pub fn ledger(&self) -> &TransactionLedger {
        &self.ledger
    }

    pub fn cash(&self) -> &CashLedger {
        &self.cash
    }

    pub fn recent_log(&self) -> &RecentLog {
        &self.recent
    }

    // --- catalog passthroughs ---------------------------------------------

    pub fn add_item(&mut self, name: &str, price: i64, stock: i64) -> StoreResult<Option<String>> {
        self.catalog.add_item(name, price, stock)
    }

    pub fn update_item(
        &mut self,
        name: &str,
        price: i64,
        new_name: Option<&str>,
        stock: Option<i64>,
    ) -> StoreResult<bool> {
        self.catalog.update_item(name, price, new_name, stock)
    }

    pub fn delete_item(&mut self, name: &str) -> StoreResult<bool> {
        self.catalog.delete_item(name)
    }

    // --- matching ----------------------------------------------------------

    /// Resolves `text` against the catalog without logging anything.
    pub fn match_item(&self, text: &str, min_score: u8) -> Option<ItemMatch> {
        matching::match_item(&self.catalog, text, min_score)
    }

    /// Top-`limit` catalog entries ranked against `query`.
    pub fn search(&self, query: &str, limit: usize) -> Vec<ItemMatch> {
        matching::search(&self.catalog, query, limit)
    }

    /// Runs a batch of recognized text fragments through the matcher.
    /// Successful matches are recorded in the recent-match log.
    pub fn process_recognitions(
        &mut self,
        recognitions: &[Recognition],
        min_score: u8,
    ) -> StoreResult<Vec<RecognitionOutcome>> {
        let mut outcomes = Vec::with_capacity(recognitions.len());
        for recognition in recognitions {
            let matched = matching::match_item(&self.catalog, &recognition.text, min_score);
            if let Some(m) = &matched {
                self.recent.add(
                    &recognition.text,
                    Some(m.name.as_str()),
                    Some(m.price),
                    Some(m.score),
                    m.stock,
                )?;
            }
            outcomes.push(RecognitionOutcome {
                ocr_text: recognition.text.clone(),
                confidence: recognition.confidence,
                matched,
            });
        }
        Ok(outcomes)
    }

    /// Recent-match log entries with stock refreshed from the catalog.
    pub fn recent_logs(&self, limit: usize) -> Vec<RecentLogEntry> {
        self.recent
            .recent(limit)
            .into_iter()
            .map(|mut entry| {
                entry.stock = entry
                    .matched_item
                    .as_deref()
                    .and_then(|name| self.catalog.get_item(name))
                    .map_or(0, |item| item.stock);
                entry
            })
            .collect()
    }

    /// Corrects a recent-log entry in place; the ledger is not touched.
    pub fn correct_log_entry(
        &mut self,
        index: usize,
        new_matched_item: Option<&str>,
        new_price: Option<i64>,
    ) -> StoreResult<bool> {
        self.recent.correct(index, new_matched_item, new_price)
    }

    // --- stock and price mutation -------------------------------------------

    /// Changes an item's price and records a `price_update` ledger entry
    /// carrying the old and new price.
    pub fn update_price(&mut self, name: &str, new_price: i64) -> StoreResult<bool> {
        let Some(item) = self.catalog.get_item(name) else {
            return Ok(false);
        };
        let old_price = item.price;
        self.catalog.commit_price(name, new_price)?;
        self.ledger
            .record(LedgerEntry::price_change(name, old_price, new_price))?;
        Ok(true)
    }

    /// Sets an item's stock to an absolute value and records a ledger entry.
    ///
    /// A cash-funded purchase (`transaction_type = Purchase`, `use_cash`)
    /// debits `(new - old) * price` from the cash ledger before the stock
    /// commit; insufficient funds refuse the whole operation with no
    /// mutation anywhere. Unchanged stock is a no-op success.
    pub fn update_stock(
        &mut self,
        name: &str,
        new_stock: i64,
        transaction_type: TransactionType,
        use_cash: bool,
    ) -> StoreResult<bool> {
        let Some(item) = self.catalog.get_item(name) else {
            return Ok(false);
        };
        let old_stock = item.stock;
        let price = item.price;
        let new_stock = new_stock.max(0);
        if new_stock == old_stock {
            return Ok(true);
        }

        if transaction_type == TransactionType::Purchase && use_cash {
            let purchase_value = (new_stock - old_stock) * price;
            if self.cash.balance() < purchase_value {
                log::info!(
                    "Purchase of '{}' refused: needs {}, have {}",
                    name,
                    purchase_value,
                    self.cash.balance()
                );
                return Ok(false);
            }
            let description = format!("Purchase: {} x{}", name, new_stock - old_stock);
            self.cash
                .apply(&description, purchase_value, CashOp::Withdraw)?;
        }

        self.catalog.commit_stock(name, new_stock)?;
        self.ledger.record(LedgerEntry::stock_change(
            name,
            old_stock,
            new_stock,
            transaction_type,
            price,
        ))?;
        Ok(true)
    }

    /// Delta-based stock change; the result clamps at zero instead of
    /// failing. Same cash semantics as [`ShopEngine::update_stock`] for
    /// positive purchase deltas.
    pub fn adjust_stock(
        &mut self,
        name: &str,
        delta: i64,
        transaction_type: TransactionType,
        use_cash: bool,
    ) -> StoreResult<bool> {
        let Some(item) = self.catalog.get_item(name) else {
            return Ok(false);
        };
        let old_stock = item.stock;
        let price = item.price;
        let new_stock = (old_stock + delta).max(0);
        if new_stock == old_stock {
            return Ok(true);
        }

        if transaction_type == TransactionType::Purchase && delta > 0 && use_cash {
            let purchase_value = delta * price;
            if self.cash.balance() < purchase_value {
                log::info!(
                    "Purchase of '{}' refused: needs {}, have {}",
                    name,
                    purchase_value,
                    self.cash.balance()
                );
                return Ok(false);
            }
            let description = format!("Purchase: {} x{}", name, delta);
            self.cash
                .apply(&description, purchase_value, CashOp::Withdraw)?;
        }

        self.catalog.commit_stock(name, new_stock)?;
        self.ledger.record(LedgerEntry::stock_change(
            name,
            old_stock,
            new_stock,
            transaction_type,
            price,
        ))?;
        Ok(true)
    }

    /// Records a sale of `quantity` units, optionally at an ad-hoc selling
    /// price (defaults to the catalog price, and is recorded either way).
    /// Refuses a non-positive quantity or one exceeding current stock.
    pub fn mark_as_sold(
        &mut self,
        name: &str,
        quantity: i64,
        selling_price: Option<i64>,
    ) -> StoreResult<bool> {
        let Some(item) = self.catalog.get_item(name) else {
            return Ok(false);
        };
        if quantity <= 0 || quantity > item.stock {
            return Ok(false);
        }
        let old_stock = item.stock;
        let new_stock = old_stock - quantity;
        let catalog_price = item.price;
        let selling_price = selling_price.unwrap_or(catalog_price);

        self.catalog.commit_stock(name, new_stock)?;
        self.ledger.record(LedgerEntry::sale(
            name,
            old_stock,
            new_stock,
            quantity,
            catalog_price,
            selling_price,
        ))?;
        Ok(true)
    }

    // --- ledger reversal -----------------------------------------------------

    /// Deletes the ledger entry matching `(timestamp, item_name)` and, when
    /// `reverse` is set, undoes its catalog effect:
    ///
    /// - sale: quantity goes back on stock, recreating a deleted item from
    ///   the entry's stored price
    /// - adjustment: `old_stock` is restored verbatim
    /// - price_update: `old_price` is restored
    /// - purchase/cash: stock side only; the cash side is the cash ledger's
    ///   own `delete_transaction`
    ///
    /// The entry is removed whether or not the reversal found its item.
    pub fn delete_ledger_entry(
        &mut self,
        timestamp: f64,
        item_name: &str,
        reverse: bool,
    ) -> StoreResult<bool> {
        let Some(index) = self.ledger.find(timestamp, item_name) else {
            return Ok(false);
        };
        let Some(entry) = self.ledger.get(index).cloned() else {
            return Ok(false);
        };

        if reverse {
            match entry.transaction_type {
                TransactionType::Sale => {
                    self.catalog
                        .restock_or_insert(&entry.item_name, entry.quantity, entry.price)?;
                }
                TransactionType::Adjustment => {
                    // Verbatim restore; intervening changes are overwritten
                    self.catalog.commit_stock(&entry.item_name, entry.old_stock)?;
                }
                TransactionType::PriceUpdate => {
                    if let Some(old_price) = entry.old_price {
                        self.catalog.commit_price(&entry.item_name, old_price)?;
                    }
                }
                TransactionType::Purchase | TransactionType::Cash => {}
            }
        }

        self.ledger.remove(index)?;
        log::info!(
            "Ledger: deleted {} entry for '{}'{}",
            entry.transaction_type,
            entry.item_name,
            if reverse { " (reversed)" } else { "" }
        );
        Ok(true)
    }

    // --- derived views ---------------------------------------------------------

    /// Per-item valuation, last sale, and price recommendations.
    pub fn inventory_snapshot(&self) -> Vec<crate::views::InventoryRow> {
        crate::views::inventory_snapshot(&self.catalog, &self.ledger)
    }

    /// Merged item+cash ledger with totals, optionally filtered.
    pub fn ledger_view(
        &self,
        transaction_type: Option<TransactionType>,
        date_range: Option<(f64, f64)>,
    ) -> crate::views::LedgerView {
        crate::views::ledger_view(&self.ledger, &self.cash, transaction_type, date_range)
    }

    // --- cash ----------------------------------------------------------------

    pub fn cash_balance(&self) -> i64 {
        self.cash.balance()
    }

    /// Adds cash with a description; returns the new balance.
    pub fn add_cash(&mut self, description: &str, amount: i64) -> StoreResult<i64> {
        self.cash.apply(description, amount, CashOp::Add)?;
        Ok(self.cash.balance())
    }

    /// Withdraws cash; the balance may go negative. Returns the new balance.
    pub fn withdraw_cash(&mut self, description: &str, amount: i64) -> StoreResult<i64> {
        self.cash.apply(description, amount, CashOp::Withdraw)?;
        Ok(self.cash.balance())
    }

    /// Sets the balance outright, recording the delta as a transaction.
    pub fn set_cash_balance(&mut self, balance: i64) -> StoreResult<i64> {
        self.cash.apply("Set cash balance", balance, CashOp::Set)?;
        Ok(self.cash.balance())
    }

    pub fn delete_cash_transaction(
        &mut self,
        timestamp: f64,
        description: &str,
        reverse: bool,
    ) -> StoreResult<bool> {
        self.cash.delete_transaction(timestamp, description, reverse)
    }
}
