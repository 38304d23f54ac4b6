//! # Transaction Engine
//!
//! Pure preparation logic for stock-affecting ledger transactions.
//!
//! ## Validate-All-Then-Apply-All
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                  Transaction Apply Pipeline                         │
//! │                                                                     │
//! │  HTTP handler                                                       │
//! │       │ TransactionRequest                                          │
//! │       ▼                                                             │
//! │  stockbook-db: load every referenced product (inside one DB txn)    │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  prepare() ← THIS MODULE (pure, no I/O)                             │
//! │       ├── validate shape (items, quantities, prices, discount)      │
//! │       ├── resolve products, fail on any missing one                 │
//! │       ├── net stock delta per product, sufficiency check for ALL    │
//! │       │   removals BEFORE anything is applied                       │
//! │       ├── snapshot cost price + name onto each item                 │
//! │       └── total = Σ(qty × unit price) − discount                    │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  stockbook-db: apply adjustments + insert ledger row, commit        │
//! │                                                                     │
//! │  Any failure at any step → whole operation rolls back.              │
//! │  There is no partially applied transaction, ever.                   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The original item-by-item approach could leave earlier items committed
//! when a later item failed. Splitting preparation (pure, all-or-nothing
//! validation) from application (one storage transaction) removes that
//! failure mode and makes the rules unit-testable without a database.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::types::{PaymentMethod, Product, Transaction, TransactionItem, TransactionKind};
use crate::validation::{validate_amount_cents, validate_quantity};
use crate::MAX_TRANSACTION_ITEMS;

// =============================================================================
// Request Types
// =============================================================================

/// A requested ledger operation, as received from the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub kind: TransactionKind,
    pub items: Vec<RequestedItem>,
    /// Customer or supplier name.
    pub party_name: Option<String>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub discount_cents: i64,
    pub notes: Option<String>,
    /// Business date; `None` means "now". Backdating is allowed for
    /// seed and historical data.
    pub date: Option<DateTime<Utc>>,
}

/// One requested line of a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestedItem {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

// =============================================================================
// Prepared Output
// =============================================================================

/// A net stock mutation for one product.
///
/// Multiple items referencing the same product collapse into a single
/// adjustment so the sufficiency check sees the combined effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockAdjustment {
    pub product_id: String,
    /// Signed change to `Product.quantity`.
    pub delta: i64,
}

/// The validated, fully-computed result of [`prepare`].
///
/// Contains everything the storage layer needs to make the operation
/// durable: the ledger record (with snapshot items and total) and the
/// stock adjustments to apply alongside it.
#[derive(Debug, Clone)]
pub struct PreparedTransaction {
    pub transaction: Transaction,
    pub adjustments: Vec<StockAdjustment>,
}

// =============================================================================
// Preparation
// =============================================================================

/// Validates a transaction request against current product state and
/// computes the ledger record plus stock adjustments.
///
/// Pure function: `products` is the caller-loaded state of every product
/// the request references, `now` is the caller's clock. Nothing is
/// mutated here.
///
/// ## Errors
/// - [`CoreError::EmptyTransaction`] - no items
/// - [`CoreError::Validation`] - bad quantity/price/discount
/// - [`CoreError::ProductNotFound`] - a referenced product is absent
/// - [`CoreError::InsufficientStock`] - a sale or supplier return would
///   drive some product's quantity negative
pub fn prepare(
    request: &TransactionRequest,
    products: &[Product],
    now: DateTime<Utc>,
) -> CoreResult<PreparedTransaction> {
    if request.items.is_empty() {
        return Err(CoreError::EmptyTransaction);
    }
    if request.items.len() > MAX_TRANSACTION_ITEMS {
        return Err(CoreError::Validation(
            crate::error::ValidationError::OutOfRange {
                field: "items".to_string(),
                min: 1,
                max: MAX_TRANSACTION_ITEMS as i64,
            },
        ));
    }
    validate_amount_cents("discount", request.discount_cents)?;

    let by_id: HashMap<&str, &Product> =
        products.iter().map(|p| (p.id.as_str(), p)).collect();

    let transaction_id = Uuid::new_v4().to_string();
    let mut items = Vec::with_capacity(request.items.len());
    let mut subtotal_cents: i64 = 0;

    // Net delta per product, keyed in first-seen order. Two sale lines of
    // the same product must be checked against stock as one combined
    // removal, not one line at a time.
    let mut net_deltas: Vec<(String, i64)> = Vec::new();

    for requested in &request.items {
        validate_quantity(requested.quantity)?;
        validate_amount_cents("unitPrice", requested.unit_price_cents)?;

        let product = by_id
            .get(requested.product_id.as_str())
            .ok_or_else(|| CoreError::ProductNotFound(requested.product_id.clone()))?;

        subtotal_cents += requested.quantity * requested.unit_price_cents;

        let delta = request.kind.stock_delta(requested.quantity);
        match net_deltas
            .iter_mut()
            .find(|(id, _)| id == &product.id)
        {
            Some((_, net)) => *net += delta,
            None => net_deltas.push((product.id.clone(), delta)),
        }

        // Snapshot cost and name for every kind, not just sales: this is
        // what lets profit be computed from history even after the
        // product's cost price drifts.
        items.push(TransactionItem {
            id: Uuid::new_v4().to_string(),
            transaction_id: transaction_id.clone(),
            product_id: product.id.clone(),
            quantity: requested.quantity,
            unit_price_cents: requested.unit_price_cents,
            unit_cost_cents: product.cost_price_cents,
            product_name: product.name.clone(),
        });
    }

    // Sufficiency check for every product BEFORE anything is applied.
    for (product_id, net) in &net_deltas {
        let product = by_id[product_id.as_str()];
        if product.quantity + net < 0 {
            return Err(CoreError::InsufficientStock {
                name: product.name.clone(),
                available: product.quantity,
                requested: -net,
            });
        }
    }

    let transaction = Transaction {
        id: transaction_id,
        kind: request.kind,
        items,
        total_cents: subtotal_cents - request.discount_cents,
        discount_cents: request.discount_cents,
        party_name: request.party_name.clone(),
        payment_method: request.payment_method,
        notes: request.notes.clone(),
        date: request.date.unwrap_or(now),
        created_at: now,
    };

    let adjustments = net_deltas
        .into_iter()
        .map(|(product_id, delta)| StockAdjustment { product_id, delta })
        .collect();

    Ok(PreparedTransaction {
        transaction,
        adjustments,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, name: &str, quantity: i64, cost: i64, sell: i64) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            category_id: None,
            quantity,
            cost_price_cents: cost,
            selling_price_cents: sell,
            supplier: None,
            notes: None,
            low_stock_threshold: 5,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn request(kind: TransactionKind, items: Vec<RequestedItem>) -> TransactionRequest {
        TransactionRequest {
            kind,
            items,
            party_name: None,
            payment_method: PaymentMethod::Cash,
            discount_cents: 0,
            notes: None,
            date: None,
        }
    }

    fn item(product_id: &str, quantity: i64, unit_price_cents: i64) -> RequestedItem {
        RequestedItem {
            product_id: product_id.to_string(),
            quantity,
            unit_price_cents,
        }
    }

    #[test]
    fn test_sale_computes_total_and_negative_delta() {
        let products = vec![product("p1", "Widget", 10, 3000, 5000)];
        let req = request(TransactionKind::Sale, vec![item("p1", 3, 5000)]);

        let prepared = prepare(&req, &products, Utc::now()).unwrap();

        assert_eq!(prepared.transaction.total_cents, 15_000);
        assert_eq!(prepared.transaction.items.len(), 1);
        assert_eq!(
            prepared.adjustments,
            vec![StockAdjustment {
                product_id: "p1".to_string(),
                delta: -3,
            }]
        );
    }

    #[test]
    fn test_sale_snapshots_cost_and_name() {
        let products = vec![product("p1", "Widget", 10, 3000, 5000)];
        let req = request(TransactionKind::Sale, vec![item("p1", 2, 5000)]);

        let prepared = prepare(&req, &products, Utc::now()).unwrap();
        let line = &prepared.transaction.items[0];

        assert_eq!(line.unit_cost_cents, 3000);
        assert_eq!(line.product_name, "Widget");
    }

    #[test]
    fn test_purchase_snapshots_too() {
        let products = vec![product("p1", "Widget", 0, 3000, 5000)];
        let req = request(TransactionKind::Purchase, vec![item("p1", 20, 3000)]);

        let prepared = prepare(&req, &products, Utc::now()).unwrap();

        assert_eq!(prepared.adjustments[0].delta, 20);
        assert_eq!(prepared.transaction.items[0].unit_cost_cents, 3000);
        assert_eq!(prepared.transaction.items[0].product_name, "Widget");
    }

    #[test]
    fn test_sale_exceeding_stock_is_rejected() {
        let products = vec![product("p1", "Widget", 7, 3000, 5000)];
        let req = request(TransactionKind::Sale, vec![item("p1", 8, 5000)]);

        let err = prepare(&req, &products, Utc::now()).unwrap_err();
        match err {
            CoreError::InsufficientStock {
                name,
                available,
                requested,
            } => {
                assert_eq!(name, "Widget");
                assert_eq!(available, 7);
                assert_eq!(requested, 8);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
    }

    #[test]
    fn test_split_lines_checked_as_combined_removal() {
        // 5 + 6 across two lines of the same product must fail against
        // stock of 10, even though each line alone would pass.
        let products = vec![product("p1", "Widget", 10, 3000, 5000)];
        let req = request(
            TransactionKind::Sale,
            vec![item("p1", 5, 5000), item("p1", 6, 5000)],
        );

        let err = prepare(&req, &products, Utc::now()).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientStock { requested: 11, .. }));
    }

    #[test]
    fn test_return_supplier_requires_stock() {
        let products = vec![product("p1", "Widget", 2, 3000, 5000)];
        let req = request(TransactionKind::ReturnSupplier, vec![item("p1", 5, 3000)]);

        assert!(matches!(
            prepare(&req, &products, Utc::now()),
            Err(CoreError::InsufficientStock { .. })
        ));
    }

    #[test]
    fn test_return_customer_has_no_ceiling() {
        let products = vec![product("p1", "Widget", 0, 3000, 5000)];
        let req = request(TransactionKind::ReturnCustomer, vec![item("p1", 50, 5000)]);

        let prepared = prepare(&req, &products, Utc::now()).unwrap();
        assert_eq!(prepared.adjustments[0].delta, 50);
    }

    #[test]
    fn test_unknown_product_aborts_whole_request() {
        let products = vec![product("p1", "Widget", 10, 3000, 5000)];
        let req = request(
            TransactionKind::Sale,
            vec![item("p1", 1, 5000), item("missing", 1, 5000)],
        );

        assert!(matches!(
            prepare(&req, &products, Utc::now()),
            Err(CoreError::ProductNotFound(id)) if id == "missing"
        ));
    }

    #[test]
    fn test_discount_reduces_total() {
        let products = vec![product("p1", "Widget", 10, 3000, 5000)];
        let mut req = request(TransactionKind::Sale, vec![item("p1", 2, 5000)]);
        req.discount_cents = 500;

        let prepared = prepare(&req, &products, Utc::now()).unwrap();
        assert_eq!(prepared.transaction.total_cents, 9_500);
        assert_eq!(prepared.transaction.discount_cents, 500);
    }

    #[test]
    fn test_empty_items_rejected() {
        let req = request(TransactionKind::Sale, vec![]);
        assert!(matches!(
            prepare(&req, &[], Utc::now()),
            Err(CoreError::EmptyTransaction)
        ));
    }

    #[test]
    fn test_nonpositive_quantity_rejected() {
        let products = vec![product("p1", "Widget", 10, 3000, 5000)];
        let req = request(TransactionKind::Sale, vec![item("p1", 0, 5000)]);

        assert!(matches!(
            prepare(&req, &products, Utc::now()),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_oversized_unit_price_rejected_without_overflow() {
        // qty 999 at a near-i64::MAX price must come back as a
        // validation error, never reach the subtotal multiply.
        let products = vec![product("p1", "Widget", 1000, 3000, 5000)];
        let req = request(
            TransactionKind::Sale,
            vec![item("p1", 999, i64::MAX / 2)],
        );

        assert!(matches!(
            prepare(&req, &products, Utc::now()),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_max_amount_price_is_accepted() {
        let products = vec![product("p1", "Widget", 1000, 3000, 5000)];
        let req = request(
            TransactionKind::Sale,
            vec![item("p1", 999, crate::MAX_AMOUNT_CENTS)],
        );

        let prepared = prepare(&req, &products, Utc::now()).unwrap();
        assert_eq!(
            prepared.transaction.total_cents,
            999 * crate::MAX_AMOUNT_CENTS
        );
    }

    #[test]
    fn test_negative_discount_rejected() {
        let products = vec![product("p1", "Widget", 10, 3000, 5000)];
        let mut req = request(TransactionKind::Sale, vec![item("p1", 1, 5000)]);
        req.discount_cents = -1;

        assert!(matches!(
            prepare(&req, &products, Utc::now()),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_explicit_date_is_kept() {
        let products = vec![product("p1", "Widget", 10, 3000, 5000)];
        let backdate = "2023-06-15T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let mut req = request(TransactionKind::Sale, vec![item("p1", 1, 5000)]);
        req.date = Some(backdate);

        let prepared = prepare(&req, &products, Utc::now()).unwrap();
        assert_eq!(prepared.transaction.date, backdate);
    }
}
