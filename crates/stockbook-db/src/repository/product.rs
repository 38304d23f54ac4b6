//! # Product Repository
//!
//! Database operations for the inventory catalog.
//!
//! ## Stock Mutation Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Who may touch Product.quantity?                                    │
//! │                                                                     │
//! │  1. TransactionRepository::apply  ← the normal path; every change   │
//! │     goes through the ledger with snapshots and atomicity            │
//! │                                                                     │
//! │  2. update() below                ← direct catalog edit; permitted  │
//! │     but BYPASSES transaction history (stock corrections, typo       │
//! │     fixes). The quantity >= 0 CHECK still applies.                  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use stockbook_core::{Product, DEFAULT_LOW_STOCK_THRESHOLD};

/// Fields for creating or updating a product.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub category_id: Option<String>,
    pub quantity: i64,
    pub cost_price_cents: i64,
    pub selling_price_cents: i64,
    pub supplier: Option<String>,
    pub notes: Option<String>,
    pub low_stock_threshold: Option<i64>,
}

/// A product joined with its resolved category name.
///
/// `category_name` is `None` for uncategorized products (null or
/// dangling reference); reports bucket those under "Uncategorized".
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductWithCategory {
    #[sqlx(flatten)]
    pub product: Product,
    pub category_name: Option<String>,
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists all products with resolved category names, sorted by name.
    pub async fn list(&self) -> DbResult<Vec<ProductWithCategory>> {
        let products = sqlx::query_as::<_, ProductWithCategory>(
            r#"
            SELECT
                p.id, p.name, p.category_id, p.quantity,
                p.cost_price_cents, p.selling_price_cents,
                p.supplier, p.notes, p.low_stock_threshold,
                p.created_at, p.updated_at,
                c.name AS category_name
            FROM products p
            LEFT JOIN categories c ON c.id = p.category_id
            ORDER BY p.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Gets a product by its ID, with resolved category name.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<ProductWithCategory>> {
        let product = sqlx::query_as::<_, ProductWithCategory>(
            r#"
            SELECT
                p.id, p.name, p.category_id, p.quantity,
                p.cost_price_cents, p.selling_price_cents,
                p.supplier, p.notes, p.low_stock_threshold,
                p.created_at, p.updated_at,
                c.name AS category_name
            FROM products p
            LEFT JOIN categories c ON c.id = p.category_id
            WHERE p.id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a new product.
    pub async fn insert(&self, input: ProductInput) -> DbResult<Product> {
        debug!(name = %input.name, "Inserting product");

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            category_id: input.category_id,
            quantity: input.quantity,
            cost_price_cents: input.cost_price_cents,
            selling_price_cents: input.selling_price_cents,
            supplier: input.supplier,
            notes: input.notes,
            low_stock_threshold: input
                .low_stock_threshold
                .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, category_id, quantity,
                cost_price_cents, selling_price_cents,
                supplier, notes, low_stock_threshold,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category_id)
        .bind(product.quantity)
        .bind(product.cost_price_cents)
        .bind(product.selling_price_cents)
        .bind(&product.supplier)
        .bind(&product.notes)
        .bind(product.low_stock_threshold)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Updates an existing product (direct catalog edit).
    ///
    /// This path bypasses the ledger; stock corrections made here leave
    /// no transaction history.
    ///
    /// ## Returns
    /// * `Ok(())` - Update successful
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, id: &str, input: ProductInput) -> DbResult<()> {
        debug!(id = %id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                category_id = ?3,
                quantity = ?4,
                cost_price_cents = ?5,
                selling_price_cents = ?6,
                supplier = ?7,
                notes = ?8,
                low_stock_threshold = ?9,
                updated_at = ?10
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.category_id)
        .bind(input.quantity)
        .bind(input.cost_price_cents)
        .bind(input.selling_price_cents)
        .bind(&input.supplier)
        .bind(&input.notes)
        .bind(
            input
                .low_stock_threshold
                .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD),
        )
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Deletes a product from the catalog.
    ///
    /// Ledger history survives: transaction items carry name snapshots
    /// and no foreign key to products.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
