//! Integration tests for atomic transaction application.
//!
//! These run against an in-memory SQLite database with real migrations,
//! exercising the full load → prepare → guarded-write → commit path.

use stockbook_core::engine::{RequestedItem, TransactionRequest};
use stockbook_core::{CoreError, PaymentMethod, TransactionKind};
use stockbook_db::{ApplyError, Database, DbConfig, ProductInput};

async fn test_db() -> Database {
    Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database")
}

async fn seed_product(db: &Database, name: &str, quantity: i64, cost: i64, sell: i64) -> String {
    let product = db
        .products()
        .insert(ProductInput {
            name: name.to_string(),
            category_id: None,
            quantity,
            cost_price_cents: cost,
            selling_price_cents: sell,
            supplier: None,
            notes: None,
            low_stock_threshold: None,
        })
        .await
        .expect("insert product");
    product.id
}

fn sale(product_id: &str, quantity: i64, unit_price_cents: i64) -> TransactionRequest {
    TransactionRequest {
        kind: TransactionKind::Sale,
        items: vec![RequestedItem {
            product_id: product_id.to_string(),
            quantity,
            unit_price_cents,
        }],
        party_name: Some("Walk-in".to_string()),
        payment_method: PaymentMethod::Cash,
        discount_cents: 0,
        notes: None,
        date: None,
    }
}

#[tokio::test]
async fn sale_decrements_stock_and_records_ledger_entry() {
    let db = test_db().await;
    let product_id = seed_product(&db, "Widget", 10, 3000, 5000).await;

    let applied = db
        .transactions()
        .apply(&sale(&product_id, 3, 5000))
        .await
        .expect("apply sale");

    assert_eq!(applied.total_cents, 15_000);
    assert_eq!(applied.items.len(), 1);
    assert_eq!(applied.items[0].unit_cost_cents, 3000);
    assert_eq!(applied.items[0].product_name, "Widget");

    let product = db
        .products()
        .get_by_id(&product_id)
        .await
        .unwrap()
        .expect("product exists");
    assert_eq!(product.product.quantity, 7);

    let stored = db
        .transactions()
        .get_by_id(&applied.id)
        .await
        .unwrap()
        .expect("ledger entry exists");
    assert_eq!(stored.items.len(), 1);
    assert_eq!(stored.kind, TransactionKind::Sale);
}

#[tokio::test]
async fn rejected_sale_leaves_stock_and_ledger_untouched() {
    let db = test_db().await;
    let product_id = seed_product(&db, "Widget", 10, 3000, 5000).await;

    db.transactions()
        .apply(&sale(&product_id, 3, 5000))
        .await
        .expect("first sale fits");

    // 8 > 7 remaining; the whole request must fail.
    let err = db
        .transactions()
        .apply(&sale(&product_id, 8, 5000))
        .await
        .expect_err("oversell rejected");

    match err {
        ApplyError::Core(CoreError::InsufficientStock {
            available,
            requested,
            ..
        }) => {
            assert_eq!(available, 7);
            assert_eq!(requested, 8);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    let product = db
        .products()
        .get_by_id(&product_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(product.product.quantity, 7);
    assert_eq!(db.transactions().count().await.unwrap(), 1);
}

#[tokio::test]
async fn multi_line_oversell_rolls_back_every_line() {
    let db = test_db().await;
    let widget = seed_product(&db, "Widget", 10, 3000, 5000).await;
    let gadget = seed_product(&db, "Gadget", 1, 1000, 2000).await;

    let request = TransactionRequest {
        kind: TransactionKind::Sale,
        items: vec![
            RequestedItem {
                product_id: widget.clone(),
                quantity: 2,
                unit_price_cents: 5000,
            },
            RequestedItem {
                product_id: gadget.clone(),
                quantity: 5,
                unit_price_cents: 2000,
            },
        ],
        party_name: None,
        payment_method: PaymentMethod::Cash,
        discount_cents: 0,
        notes: None,
        date: None,
    };

    assert!(db.transactions().apply(&request).await.is_err());

    // The valid widget line must not have been applied either.
    let widget_row = db.products().get_by_id(&widget).await.unwrap().unwrap();
    let gadget_row = db.products().get_by_id(&gadget).await.unwrap().unwrap();
    assert_eq!(widget_row.product.quantity, 10);
    assert_eq!(gadget_row.product.quantity, 1);
    assert_eq!(db.transactions().count().await.unwrap(), 0);
}

#[tokio::test]
async fn purchase_increases_stock() {
    let db = test_db().await;
    let product_id = seed_product(&db, "Widget", 2, 3000, 5000).await;

    let request = TransactionRequest {
        kind: TransactionKind::Purchase,
        items: vec![RequestedItem {
            product_id: product_id.clone(),
            quantity: 20,
            unit_price_cents: 3000,
        }],
        party_name: Some("Acme Supplies".to_string()),
        payment_method: PaymentMethod::Online,
        discount_cents: 0,
        notes: None,
        date: None,
    };

    db.transactions().apply(&request).await.expect("purchase");

    let product = db
        .products()
        .get_by_id(&product_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(product.product.quantity, 22);
}

#[tokio::test]
async fn snapshots_survive_later_cost_edits() {
    let db = test_db().await;
    let product_id = seed_product(&db, "Widget", 10, 3000, 5000).await;

    let applied = db
        .transactions()
        .apply(&sale(&product_id, 2, 5000))
        .await
        .unwrap();

    // Raise the cost price after the sale.
    db.products()
        .update(
            &product_id,
            ProductInput {
                name: "Widget".to_string(),
                category_id: None,
                quantity: 8,
                cost_price_cents: 4500,
                selling_price_cents: 5000,
                supplier: None,
                notes: None,
                low_stock_threshold: None,
            },
        )
        .await
        .unwrap();

    let stored = db
        .transactions()
        .get_by_id(&applied.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.items[0].unit_cost_cents, 3000);
}

#[tokio::test]
async fn ledger_survives_product_delete() {
    let db = test_db().await;
    let product_id = seed_product(&db, "Widget", 10, 3000, 5000).await;

    let applied = db
        .transactions()
        .apply(&sale(&product_id, 1, 5000))
        .await
        .unwrap();

    db.products().delete(&product_id).await.unwrap();

    let stored = db
        .transactions()
        .get_by_id(&applied.id)
        .await
        .unwrap()
        .expect("history survives");
    assert_eq!(stored.items[0].product_name, "Widget");
}

#[tokio::test]
async fn unknown_product_fails_whole_request() {
    let db = test_db().await;
    seed_product(&db, "Widget", 10, 3000, 5000).await;

    let err = db
        .transactions()
        .apply(&sale("no-such-id", 1, 5000))
        .await
        .expect_err("missing product");

    assert!(matches!(
        err,
        ApplyError::Core(CoreError::ProductNotFound(_))
    ));
    assert_eq!(db.transactions().count().await.unwrap(), 0);
}

#[tokio::test]
async fn list_orders_newest_first() {
    let db = test_db().await;
    let product_id = seed_product(&db, "Widget", 100, 3000, 5000).await;

    let mut early = sale(&product_id, 1, 5000);
    early.date = Some("2024-01-10T09:00:00Z".parse().unwrap());
    let mut late = sale(&product_id, 1, 5000);
    late.date = Some("2024-03-05T09:00:00Z".parse().unwrap());

    db.transactions().apply(&early).await.unwrap();
    db.transactions().apply(&late).await.unwrap();

    let listed = db.transactions().list().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed[0].date > listed[1].date);
}
