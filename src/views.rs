//! Derived financial views.
//!
//! Pure functions over the stores: nothing here mutates or persists.
//! "Incoming capital" counts purchases plus adjustments that increased
//! stock; `price_update` entries carry no value and fall out of every sum.

use std::collections::BTreeMap;

use chrono::{Local, NaiveDate, TimeZone};
use serde::Serialize;

use crate::cash::CashLedger;
use crate::catalog::CatalogStore;
use crate::ledger::TransactionLedger;
use crate::models::{now_ts, LedgerEntry, TransactionType};

/// Whether an item's price deserves attention, and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceAdjustment {
    pub recommended: bool,
    pub reason: String,
    /// Days since the last sale; large when never sold
    pub last_sale_days: f64,
    pub suggested_price: i64,
}

impl PriceAdjustment {
    fn none(price: i64) -> Self {
        Self {
            recommended: false,
            reason: String::new(),
            last_sale_days: NEVER_SOLD_DAYS,
            suggested_price: price,
        }
    }
}

/// Sentinel age for items that have never sold.
const NEVER_SOLD_DAYS: f64 = 999.0;

/// One row of the inventory snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryRow {
    pub name: String,
    pub price: i64,
    pub stock: i64,
    pub value: i64,
    /// `YYYY-MM-DD` of the most recent sale, empty if never sold
    pub last_sold: String,
    pub price_adjustment: PriceAdjustment,
}

/// Merged, filtered ledger sequence with its aggregate totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerView {
    /// Newest first
    pub entries: Vec<LedgerEntry>,
    pub total_entries: usize,
    pub total_sales_value: i64,
    /// Purchases plus positive-delta adjustments
    pub total_capital_value: i64,
    /// `cash_balance + total_capital_value`
    pub total_assets: i64,
}

/// One calendar day of summed activity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub sales: i64,
    pub capital: i64,
    pub cash: i64,
}

fn is_incoming_capital(entry: &LedgerEntry) -> bool {
    entry.transaction_type == TransactionType::Purchase
        || (entry.transaction_type == TransactionType::Adjustment
            && entry.new_stock > entry.old_stock)
}

fn local_date(timestamp: f64) -> Option<NaiveDate> {
    Local
        .timestamp_opt(timestamp as i64, 0)
        .single()
        .map(|dt| dt.date_naive())
}

fn last_sale_timestamp(ledger: &TransactionLedger, item_name: &str) -> Option<f64> {
    ledger
        .iter()
        .filter(|e| e.transaction_type == TransactionType::Sale && e.item_name == item_name)
        .map(|e| e.timestamp)
        .fold(None, |best, ts| match best {
            Some(b) if b >= ts => Some(b),
            _ => Some(ts),
        })
}

/// Full inventory snapshot: per-item valuation, last sale date, and a
/// price-adjustment recommendation for stocked items that have never sold.
pub fn inventory_snapshot(
    catalog: &CatalogStore,
    ledger: &TransactionLedger,
) -> Vec<InventoryRow> {
    catalog
        .iter()
        .map(|(name, item)| {
            let last_sale = last_sale_timestamp(ledger, name);
            let last_sold = last_sale
                .and_then(local_date)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default();

            let price_adjustment = match last_sale {
                None if item.stock > 0 => PriceAdjustment {
                    recommended: true,
                    reason: "Never been sold".to_string(),
                    last_sale_days: NEVER_SOLD_DAYS,
                    suggested_price: item.price,
                },
                Some(ts) => PriceAdjustment {
                    last_sale_days: (now_ts() - ts) / 86_400.0,
                    ..PriceAdjustment::none(item.price)
                },
                None => PriceAdjustment::none(item.price),
            };

            InventoryRow {
                name: name.clone(),
                price: item.price,
                stock: item.stock,
                value: item.value(),
                last_sold,
                price_adjustment,
            }
        })
        .collect()
}

/// Merges item ledger entries and cash transactions into one newest-first
/// sequence, applying optional type and inclusive date-range filters, and
/// computes the aggregate totals over the filtered set.
pub fn ledger_view(
    ledger: &TransactionLedger,
    cash: &CashLedger,
    transaction_type: Option<TransactionType>,
    date_range: Option<(f64, f64)>,
) -> LedgerView {
    let mut entries: Vec<LedgerEntry> = ledger
        .iter()
        .chain(cash.transactions().iter())
        .filter(|e| transaction_type.map_or(true, |t| e.transaction_type == t))
        .filter(|e| date_range.map_or(true, |(from, to)| e.timestamp >= from && e.timestamp <= to))
        .cloned()
        .collect();
    entries.sort_by(|a, b| b.timestamp.total_cmp(&a.timestamp));

    let mut total_sales_value = 0;
    let mut total_capital_value = 0;
    for entry in &entries {
        if entry.transaction_type == TransactionType::Sale {
            total_sales_value += entry.value;
        } else if is_incoming_capital(entry) {
            total_capital_value += entry.value;
        }
    }

    LedgerView {
        total_entries: entries.len(),
        total_sales_value,
        total_capital_value,
        total_assets: cash.balance() + total_capital_value,
        entries,
    }
}

/// Buckets entries by local calendar day into summed sales, capital, and
/// cash series, ascending by date. Empty input yields a two-point zero
/// placeholder spanning yesterday to today so charts have an axis to draw.
pub fn daily_chart_series(entries: &[LedgerEntry]) -> Vec<ChartPoint> {
    let mut days: BTreeMap<NaiveDate, (i64, i64, i64)> = BTreeMap::new();
    for entry in entries {
        let Some(date) = local_date(entry.timestamp) else {
            continue;
        };
        let bucket = days.entry(date).or_insert((0, 0, 0));
        if entry.transaction_type == TransactionType::Sale {
            bucket.0 += entry.value;
        } else if is_incoming_capital(entry) {
            bucket.1 += entry.value;
        } else if entry.transaction_type == TransactionType::Cash {
            bucket.2 += entry.value;
        }
    }

    if days.is_empty() {
        let today = Local::now().date_naive();
        let yesterday = today.pred_opt().unwrap_or(today);
        return vec![
            ChartPoint {
                date: yesterday,
                sales: 0,
                capital: 0,
                cash: 0,
            },
            ChartPoint {
                date: today,
                sales: 0,
                capital: 0,
                cash: 0,
            },
        ];
    }

    days.into_iter()
        .map(|(date, (sales, capital, cash))| ChartPoint {
            date,
            sales,
            capital,
            cash,
        })
        .collect()
}
