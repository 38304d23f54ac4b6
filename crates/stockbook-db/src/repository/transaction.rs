//! # Transaction Repository (the Ledger)
//!
//! Atomic application and retrieval of ledger transactions.
//!
//! ## Atomicity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      apply(): one SQLite txn                        │
//! │                                                                     │
//! │  BEGIN                                                              │
//! │    │                                                                │
//! │    ├── load every referenced product                                │
//! │    ├── stockbook_core::prepare()   (pure validation + snapshots)    │
//! │    ├── per product: UPDATE ... SET quantity = quantity + Δ          │
//! │    │                WHERE id = ? AND quantity + Δ >= 0              │
//! │    │     rows_affected == 0  →  InsufficientStock, ROLLBACK         │
//! │    ├── INSERT transactions row                                      │
//! │    └── INSERT transaction_items rows (seq preserves line order)     │
//! │  COMMIT                                                             │
//! │                                                                     │
//! │  The guarded UPDATE re-checks sufficiency at write time, so a       │
//! │  concurrent sale that drained stock between the read and the write  │
//! │  rolls this one back instead of driving quantity negative.          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Ledger rows are append-only. There is no update or delete here;
//! corrections are recorded as compensating transactions.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{ApplyError, DbError, DbResult};
use stockbook_core::engine::{prepare, TransactionRequest};
use stockbook_core::{
    CoreError, PaymentMethod, Product, Transaction, TransactionItem, TransactionKind,
};

// =============================================================================
// Row Types
// =============================================================================

/// A `transactions` table row, before its items are attached.
///
/// Shared with the report repository, which runs its own range and
/// search queries and hands the rows back to [`TransactionRepository::assemble`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct TransactionRow {
    pub(crate) id: String,
    pub(crate) kind: TransactionKind,
    pub(crate) total_cents: i64,
    pub(crate) discount_cents: i64,
    pub(crate) party_name: Option<String>,
    pub(crate) payment_method: PaymentMethod,
    pub(crate) notes: Option<String>,
    pub(crate) date: chrono::DateTime<Utc>,
    pub(crate) created_at: chrono::DateTime<Utc>,
}

impl TransactionRow {
    fn into_transaction(self, items: Vec<TransactionItem>) -> Transaction {
        Transaction {
            id: self.id,
            kind: self.kind,
            items,
            total_cents: self.total_cents,
            discount_cents: self.discount_cents,
            party_name: self.party_name,
            payment_method: self.payment_method,
            notes: self.notes,
            date: self.date,
            created_at: self.created_at,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for the transaction ledger.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Validates and atomically applies a transaction request.
    ///
    /// Either the ledger row, its items, and every stock adjustment all
    /// become durable together, or none of them do.
    ///
    /// ## Errors
    /// - [`ApplyError::Core`] - validation, missing product, or
    ///   insufficient stock (including races lost at write time)
    /// - [`ApplyError::Db`] - storage failure
    pub async fn apply(&self, request: &TransactionRequest) -> Result<Transaction, ApplyError> {
        let mut tx = self.pool.begin().await?;

        // Load the current state of every referenced product inside the
        // transaction so preparation sees a consistent snapshot.
        let mut ids: Vec<&str> = request
            .items
            .iter()
            .map(|i| i.product_id.as_str())
            .collect();
        ids.sort_unstable();
        ids.dedup();

        let products: Vec<Product> = if ids.is_empty() {
            Vec::new()
        } else {
            let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
                "SELECT id, name, category_id, quantity, \
                 cost_price_cents, selling_price_cents, \
                 supplier, notes, low_stock_threshold, \
                 created_at, updated_at \
                 FROM products WHERE id IN (",
            );
            let mut separated = builder.separated(", ");
            for id in &ids {
                separated.push_bind(*id);
            }
            separated.push_unseparated(")");

            builder
                .build_query_as::<Product>()
                .fetch_all(&mut *tx)
                .await?
        };

        let prepared = prepare(request, &products, Utc::now())?;
        let transaction = prepared.transaction;

        // Guarded stock writes. The condition re-checks sufficiency at
        // write time; a lost race surfaces as rows_affected == 0.
        let now = Utc::now();
        for adjustment in &prepared.adjustments {
            let result = sqlx::query(
                r#"
                UPDATE products
                SET quantity = quantity + ?1, updated_at = ?2
                WHERE id = ?3 AND quantity + ?1 >= 0
                "#,
            )
            .bind(adjustment.delta)
            .bind(now)
            .bind(&adjustment.product_id)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                warn!(
                    product_id = %adjustment.product_id,
                    delta = adjustment.delta,
                    "Stock adjustment rejected at write time"
                );
                return Err(ApplyError::Core(
                    write_time_rejection(&mut tx, &adjustment.product_id, adjustment.delta, &products)
                        .await?,
                ));
            }
        }

        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, kind, total_cents, discount_cents,
                party_name, payment_method, notes, date, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&transaction.id)
        .bind(transaction.kind)
        .bind(transaction.total_cents)
        .bind(transaction.discount_cents)
        .bind(&transaction.party_name)
        .bind(transaction.payment_method)
        .bind(&transaction.notes)
        .bind(transaction.date)
        .bind(transaction.created_at)
        .execute(&mut *tx)
        .await?;

        for (seq, item) in transaction.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO transaction_items (
                    id, transaction_id, product_id, quantity,
                    unit_price_cents, unit_cost_cents, product_name, seq
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&item.id)
            .bind(&item.transaction_id)
            .bind(&item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price_cents)
            .bind(item.unit_cost_cents)
            .bind(&item.product_name)
            .bind(seq as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(
            id = %transaction.id,
            kind = ?transaction.kind,
            items = transaction.items.len(),
            total_cents = transaction.total_cents,
            "Transaction applied"
        );

        Ok(transaction)
    }

    /// Lists all transactions, newest business date first, with items.
    pub async fn list(&self) -> DbResult<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT id, kind, total_cents, discount_cents,
                   party_name, payment_method, notes, date, created_at
            FROM transactions
            ORDER BY date DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        self.assemble(rows).await
    }

    /// Gets a transaction by its ID, with items.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Transaction>> {
        let row = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT id, kind, total_cents, discount_cents,
                   party_name, payment_method, notes, date, created_at
            FROM transactions
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let items = self.fetch_items(&[row.id.clone()]).await?;
                let items = items.into_values().next().unwrap_or_default();
                Ok(Some(row.into_transaction(items)))
            }
            None => Ok(None),
        }
    }

    /// Counts ledger entries (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Attaches items to a batch of rows, preserving row order.
    pub(crate) async fn assemble(&self, rows: Vec<TransactionRow>) -> DbResult<Vec<Transaction>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
        let mut items_by_txn = self.fetch_items(&ids).await?;

        debug!(transactions = rows.len(), "Assembled transaction batch");

        Ok(rows
            .into_iter()
            .map(|row| {
                let items = items_by_txn.remove(&row.id).unwrap_or_default();
                row.into_transaction(items)
            })
            .collect())
    }

    /// Fetches items for a set of transaction IDs, grouped by owner and
    /// ordered by line position.
    async fn fetch_items(
        &self,
        transaction_ids: &[String],
    ) -> DbResult<HashMap<String, Vec<TransactionItem>>> {
        if transaction_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT id, transaction_id, product_id, quantity, \
             unit_price_cents, unit_cost_cents, product_name \
             FROM transaction_items WHERE transaction_id IN (",
        );
        let mut separated = builder.separated(", ");
        for id in transaction_ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(") ORDER BY transaction_id, seq");

        let items = builder
            .build_query_as::<TransactionItem>()
            .fetch_all(&self.pool)
            .await?;

        let mut grouped: HashMap<String, Vec<TransactionItem>> = HashMap::new();
        for item in items {
            grouped
                .entry(item.transaction_id.clone())
                .or_default()
                .push(item);
        }

        Ok(grouped)
    }
}

/// Builds the InsufficientStock error for a guarded UPDATE that
/// affected zero rows.
///
/// The load-time snapshot is stale by definition at this point (a
/// concurrent writer got in between the read and the write), so the
/// reported `available` quantity is re-read from the row rather than
/// taken from the snapshot.
async fn write_time_rejection(
    conn: &mut sqlx::SqliteConnection,
    product_id: &str,
    delta: i64,
    loaded: &[Product],
) -> Result<CoreError, sqlx::Error> {
    let available: i64 = sqlx::query_scalar("SELECT quantity FROM products WHERE id = ?1")
        .bind(product_id)
        .fetch_optional(&mut *conn)
        .await?
        .unwrap_or(0);

    Ok(CoreError::InsufficientStock {
        name: loaded
            .iter()
            .find(|p| p.id == product_id)
            .map(|p| p.name.clone())
            .unwrap_or_default(),
        available,
        requested: -delta,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::product::ProductInput;

    #[tokio::test]
    async fn test_write_time_rejection_reports_current_stock() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = db
            .products()
            .insert(ProductInput {
                name: "Widget".to_string(),
                category_id: None,
                quantity: 3,
                cost_price_cents: 3000,
                selling_price_cents: 5000,
                supplier: None,
                notes: None,
                low_stock_threshold: None,
            })
            .await
            .unwrap();

        // Stale snapshot from before a concurrent sale drained stock.
        let mut stale = product.clone();
        stale.quantity = 10;

        let mut conn = db.pool().acquire().await.unwrap();
        let err = write_time_rejection(&mut conn, &product.id, -5, &[stale])
            .await
            .unwrap();

        match err {
            CoreError::InsufficientStock {
                name,
                available,
                requested,
            } => {
                assert_eq!(name, "Widget");
                // The row's real quantity, not the stale 10.
                assert_eq!(available, 3);
                assert_eq!(requested, 5);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
    }
}
