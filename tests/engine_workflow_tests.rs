use shop_ledger::{
    daily_chart_series, Recognition, ShopEngine, StoreConfig, TransactionType,
};
use tempfile::TempDir;

fn engine_in(dir: &TempDir) -> ShopEngine {
    ShopEngine::open(&StoreConfig::in_dir(dir.path()))
}

// End-to-end: capture -> match -> log -> sell -> views, across a reopen.

#[test]
fn capture_to_bookkeeping_workflow() {
    let dir = TempDir::new().unwrap();
    let config = StoreConfig::in_dir(dir.path());

    {
        let mut engine = ShopEngine::open(&config);
        engine.add_item("Red Potion", 100, 0).unwrap();
        engine.add_item("Orange Potion", 150, 0).unwrap();
        engine.add_cash("opening float", 2000).unwrap();

        // Recognizer hands over a noisy batch
        let outcomes = engine
            .process_recognitions(
                &[
                    Recognition {
                        text: "Red Poton".into(),
                        confidence: 91.0,
                    },
                    Recognition {
                        text: "????".into(),
                        confidence: 12.0,
                    },
                ],
                70,
            )
            .unwrap();
        assert_eq!(
            outcomes[0].matched.as_ref().map(|m| m.name.as_str()),
            Some("Red Potion")
        );
        assert!(outcomes[1].matched.is_none());
        assert_eq!(engine.recent_log().len(), 1);

        // Restock with cash, then sell some
        assert!(engine
            .adjust_stock("Red Potion", 10, TransactionType::Purchase, true)
            .unwrap());
        assert_eq!(engine.cash_balance(), 1000);
        assert!(engine.mark_as_sold("Red Potion", 4, Some(120)).unwrap());
    }

    // Everything survives a reopen
    let engine = ShopEngine::open(&config);
    assert_eq!(engine.catalog().get_item("Red Potion").unwrap().stock, 6);
    assert_eq!(engine.cash_balance(), 1000);

    let view = engine.ledger_view(None, None);
    assert_eq!(view.total_sales_value, 480);
    assert_eq!(view.total_capital_value, 1000);
    assert_eq!(view.total_assets, 1000 + 1000);
    // purchase + sale + 2 cash transactions (float, purchase debit)
    assert_eq!(view.total_entries, 4);

    let snapshot = engine.inventory_snapshot();
    let potion = snapshot.iter().find(|r| r.name == "Red Potion").unwrap();
    assert_eq!(potion.value, 600);
    assert!(!potion.price_adjustment.recommended);
    assert!(!potion.last_sold.is_empty());

    let never_sold = snapshot.iter().find(|r| r.name == "Orange Potion").unwrap();
    assert!(!never_sold.price_adjustment.recommended); // no stock either

    let points = daily_chart_series(&view.entries);
    assert!(!points.is_empty());
    let total_sales: i64 = points.iter().map(|p| p.sales).sum();
    assert_eq!(total_sales, 480);
}

#[test]
fn refused_cash_purchase_changes_nothing_on_disk() {
    let dir = TempDir::new().unwrap();
    let config = StoreConfig::in_dir(dir.path());

    {
        let mut engine = ShopEngine::open(&config);
        engine.add_item("Ice Wand", 200, 0).unwrap();
        engine.add_cash("small float", 900).unwrap();
        // 5 * 200 = 1000 > 900: refused
        assert!(!engine
            .adjust_stock("Ice Wand", 5, TransactionType::Purchase, true)
            .unwrap());
    }

    let engine = ShopEngine::open(&config);
    assert_eq!(engine.catalog().get_item("Ice Wand").unwrap().stock, 0);
    assert_eq!(engine.cash_balance(), 900);
    assert!(engine.ledger().is_empty());
}

#[test]
fn sale_reversal_survives_item_deletion_and_reopen() {
    let dir = TempDir::new().unwrap();
    let config = StoreConfig::in_dir(dir.path());
    let ts;

    {
        let mut engine = ShopEngine::open(&config);
        engine.add_item("Red Potion", 100, 10).unwrap();
        engine.mark_as_sold("Red Potion", 3, None).unwrap();
        ts = engine.ledger().entries(1, None, None)[0].timestamp;
        engine.delete_item("Red Potion").unwrap();
    }

    let mut engine = ShopEngine::open(&config);
    // Ledger history outlives the item (orphaned name reference by design)
    assert_eq!(engine.ledger().len(), 1);
    assert!(engine.delete_ledger_entry(ts, "Red Potion", true).unwrap());

    let item = engine.catalog().get_item("Red Potion").unwrap();
    assert_eq!(item.stock, 3);
    assert_eq!(item.price, 100);
    // Second reversal finds nothing
    assert!(!engine.delete_ledger_entry(ts, "Red Potion", true).unwrap());
}

#[test]
fn corrected_log_entry_promotes_to_catalog_without_ledger_noise() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in(&dir);
    engine.add_item("Red Potion", 100, 0).unwrap();

    engine
        .process_recognitions(
            &[Recognition {
                text: "red potion".into(),
                confidence: 88.0,
            }],
            0,
        )
        .unwrap();
    assert!(engine.correct_log_entry(0, Some("Red Potion X"), Some(900)).unwrap());

    let logs = engine.recent_logs(10);
    assert_eq!(logs[0].matched_item.as_deref(), Some("Red Potion X"));
    assert_eq!(logs[0].price, Some(900));
    // Correction never touches the ledger
    assert!(engine.ledger().is_empty());

    // Promote the corrected entry to a real catalog item
    engine.add_item("Red Potion X", 900, 0).unwrap();
    assert!(engine.catalog().contains("Red Potion X"));
}

#[test]
fn cash_can_go_negative_and_recovers_by_deletion() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in(&dir);

    engine.add_cash("float", 100).unwrap();
    let balance = engine.withdraw_cash("supplies", 400).unwrap();
    assert_eq!(balance, -300);

    let tx = engine.cash().transactions().last().unwrap().clone();
    assert!(engine
        .delete_cash_transaction(tx.timestamp, "supplies", true)
        .unwrap());
    assert_eq!(engine.cash_balance(), 100);
}
