//! Cash balance ledger.
//!
//! Cash changes are isolated from item stock and persisted in their own
//! document. The balance always equals the `new_balance` implied by the most
//! recent transaction by construction. Withdrawals are not floored: the
//! balance may go negative.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::StoreResult;
use crate::ledger::TIMESTAMP_TOLERANCE;
use crate::models::{now_ts, LedgerEntry};
use crate::storage::{load_or_default, save_json};

/// How a cash amount is applied to the balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CashOp {
    /// `balance + amount`
    Add,
    /// `balance - amount`; may go negative
    Withdraw,
    /// `amount` becomes the balance
    Set,
}

#[derive(Debug, Default, Deserialize)]
struct CashDocument {
    #[serde(default)]
    cash_balance: i64,
    #[serde(default)]
    transactions: Vec<LedgerEntry>,
    #[serde(default)]
    #[allow(dead_code)]
    last_updated: f64,
}

#[derive(Serialize)]
struct CashDocumentRef<'a> {
    cash_balance: i64,
    transactions: &'a [LedgerEntry],
    last_updated: f64,
}

/// Append-only log of cash balance changes.
pub struct CashLedger {
    path: PathBuf,
    balance: i64,
    transactions: Vec<LedgerEntry>,
}

impl CashLedger {
    /// Opens the cash store at `path`. Missing or corrupt files start at a
    /// zero balance with no history.
    pub fn open<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        let doc: CashDocument = load_or_default(&path);
        log::info!(
            "Cash: balance {} with {} transactions from {}",
            doc.cash_balance,
            doc.transactions.len(),
            path.display()
        );
        Self {
            path,
            balance: doc.cash_balance,
            transactions: doc.transactions,
        }
    }

    fn persist(&self) -> StoreResult<()> {
        save_json(
            &self.path,
            &CashDocumentRef {
                cash_balance: self.balance,
                transactions: &self.transactions,
                last_updated: now_ts(),
            },
        )
    }

    pub fn balance(&self) -> i64 {
        self.balance
    }

    pub fn transactions(&self) -> &[LedgerEntry] {
        &self.transactions
    }

    /// Applies a cash change and records it. The recorded `value` is the
    /// signed balance delta. Returns the recorded transaction.
    pub fn apply(&mut self, description: &str, amount: i64, op: CashOp) -> StoreResult<LedgerEntry> {
        let new_balance = match op {
            CashOp::Add => self.balance + amount,
            CashOp::Withdraw => self.balance - amount,
            CashOp::Set => amount,
        };
        let entry = LedgerEntry::cash(description, new_balance - self.balance);
        log::debug!(
            "Cash: '{}' {} -> {}",
            description,
            self.balance,
            new_balance
        );
        self.balance = new_balance;
        self.transactions.push(entry.clone());
        self.persist()?;
        Ok(entry)
    }

    /// Deletes the transaction matching `(timestamp, description)` within the
    /// timestamp tolerance. When `reverse` is set the stored `value` is
    /// subtracted from the *current* balance; this is only exact when no
    /// later transactions depend on it.
    pub fn delete_transaction(
        &mut self,
        timestamp: f64,
        description: &str,
        reverse: bool,
    ) -> StoreResult<bool> {
        let Some(index) = self.transactions.iter().position(|t| {
            (t.timestamp - timestamp).abs() < TIMESTAMP_TOLERANCE && t.item_name == description
        }) else {
            return Ok(false);
        };
        let entry = self.transactions.remove(index);
        if reverse {
            self.balance -= entry.value;
        }
        self.persist()?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_cash() -> (tempfile::TempDir, CashLedger) {
        let dir = tempfile::tempdir().unwrap();
        let cash = CashLedger::open(dir.path().join("cash_data.json"));
        (dir, cash)
    }

    #[test]
    fn add_and_withdraw_move_the_balance() {
        let (_dir, mut cash) = temp_cash();
        cash.apply("deposit", 500, CashOp::Add).unwrap();
        cash.apply("supplies", 200, CashOp::Withdraw).unwrap();
        assert_eq!(cash.balance(), 300);
        assert_eq!(cash.transactions().len(), 2);
        assert_eq!(cash.transactions()[1].value, -200);
    }

    #[test]
    fn withdraw_may_go_negative() {
        let (_dir, mut cash) = temp_cash();
        cash.apply("deposit", 100, CashOp::Add).unwrap();
        cash.apply("big spend", 400, CashOp::Withdraw).unwrap();
        assert_eq!(cash.balance(), -300);
    }

    #[test]
    fn set_records_the_delta() {
        let (_dir, mut cash) = temp_cash();
        cash.apply("deposit", 250, CashOp::Add).unwrap();
        let entry = cash.apply("Set cash balance", 1000, CashOp::Set).unwrap();
        assert_eq!(cash.balance(), 1000);
        assert_eq!(entry.value, 750);
    }

    #[test]
    fn delete_reverses_against_current_balance() {
        let (_dir, mut cash) = temp_cash();
        let entry = cash.apply("deposit", 500, CashOp::Add).unwrap();
        cash.apply("deposit 2", 100, CashOp::Add).unwrap();
        assert!(cash
            .delete_transaction(entry.timestamp, "deposit", true)
            .unwrap());
        assert_eq!(cash.balance(), 100);
        // Second delete finds nothing
        assert!(!cash
            .delete_transaction(entry.timestamp, "deposit", true)
            .unwrap());
    }

    #[test]
    fn delete_without_reverse_keeps_balance() {
        let (_dir, mut cash) = temp_cash();
        let entry = cash.apply("deposit", 500, CashOp::Add).unwrap();
        assert!(cash
            .delete_transaction(entry.timestamp, "deposit", false)
            .unwrap());
        assert_eq!(cash.balance(), 500);
        assert!(cash.transactions().is_empty());
    }

    #[test]
    fn reopen_restores_balance_and_history() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cash_data.json");
        {
            let mut cash = CashLedger::open(&path);
            cash.apply("deposit", 900, CashOp::Add).unwrap();
        }
        let cash = CashLedger::open(&path);
        assert_eq!(cash.balance(), 900);
        assert_eq!(cash.transactions().len(), 1);
    }
}
