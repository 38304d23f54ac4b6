//! # Report Repository
//!
//! Read-only aggregation queries over the ledger, expenses, and the
//! catalog. Everything here is derived state: reports never write.
//!
//! ## Date Handling
//! All ranges are half-open `[start, end)`. Callers build them with
//! `stockbook_core::period` so "June" means midnight June 1 up to but
//! excluding midnight July 1, and the last second of the month is never
//! silently dropped.
//!
//! Profit math deliberately goes through `Transaction` values (with
//! their snapshot items) and `stockbook_core::reporting`, not SQL, so
//! the one margin definition lives in one place.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::transaction::{TransactionRepository, TransactionRow};
use stockbook_core::period::DateRange;
use stockbook_core::{Transaction, UNCATEGORIZED_LABEL};

// =============================================================================
// Aggregate Row Types
// =============================================================================

/// Stock position for one category bucket.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStock {
    /// Category name, or "Uncategorized" for products without one.
    pub category_name: String,
    pub product_count: i64,
    pub total_units: i64,
    /// Σ(quantity × cost price): stock valued at cost.
    pub stock_value_cents: i64,
}

/// Sales revenue for one calendar month.
///
/// Keyed by (year, month) so month 6 of 2023 and month 6 of 2024 never
/// collapse into one bucket.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRevenue {
    pub year: i64,
    pub month: i64,
    pub revenue_cents: i64,
}

/// Activity summary for one month within a year (log browsing).
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MonthBucket {
    pub month: i64,
    pub transaction_count: i64,
    /// Sum of transaction totals, all kinds.
    pub total_cents: i64,
}

/// Activity summary for one day within a month (log browsing).
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DayBucket {
    pub day: i64,
    pub transaction_count: i64,
    pub total_cents: i64,
}

/// Filter for ledger search.
///
/// `end` is exclusive; callers expand an inclusive end date to the
/// following midnight before building this.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    pub query: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl SearchFilter {
    /// True when nothing is being filtered on.
    pub fn is_empty(&self) -> bool {
        self.query.is_none() && self.start.is_none() && self.end.is_none()
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for read-only reporting queries.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    fn transactions(&self) -> TransactionRepository {
        TransactionRepository::new(self.pool.clone())
    }

    /// Sales (with items) whose business date falls in the range.
    ///
    /// The KPI layer computes revenue and profit from these in memory;
    /// the snapshot items make that correct regardless of later product
    /// edits.
    pub async fn sales_in_range(&self, range: &DateRange) -> DbResult<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT id, kind, total_cents, discount_cents,
                   party_name, payment_method, notes, date, created_at
            FROM transactions
            WHERE kind = 'sale' AND date >= ?1 AND date < ?2
            ORDER BY date DESC
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await?;

        self.transactions().assemble(rows).await
    }

    /// Total expenses in the range, in cents.
    pub async fn expense_total(&self, range: &DateRange) -> DbResult<i64> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(amount_cents), 0)
            FROM expenses
            WHERE date >= ?1 AND date < ?2
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    /// Current stock position grouped by category.
    ///
    /// Products with no category (or a dangling reference after a
    /// category delete) land in the "Uncategorized" bucket.
    pub async fn stock_by_category(&self) -> DbResult<Vec<CategoryStock>> {
        let buckets = sqlx::query_as::<_, CategoryStock>(
            r#"
            SELECT
                COALESCE(c.name, ?1) AS category_name,
                COUNT(*) AS product_count,
                COALESCE(SUM(p.quantity), 0) AS total_units,
                COALESCE(SUM(p.quantity * p.cost_price_cents), 0) AS stock_value_cents
            FROM products p
            LEFT JOIN categories c ON c.id = p.category_id
            GROUP BY COALESCE(c.name, ?1)
            ORDER BY category_name
            "#,
        )
        .bind(UNCATEGORIZED_LABEL)
        .fetch_all(&self.pool)
        .await?;

        Ok(buckets)
    }

    /// Sales revenue per calendar month within the range.
    ///
    /// Sparse: months with no sales produce no row. The dashboard feeds
    /// this a trailing twelve-month window.
    pub async fn revenue_by_month(&self, range: &DateRange) -> DbResult<Vec<MonthlyRevenue>> {
        let rows = sqlx::query_as::<_, MonthlyRevenue>(
            r#"
            SELECT
                CAST(strftime('%Y', date) AS INTEGER) AS year,
                CAST(strftime('%m', date) AS INTEGER) AS month,
                COALESCE(SUM(total_cents), 0) AS revenue_cents
            FROM transactions
            WHERE kind = 'sale' AND date >= ?1 AND date < ?2
            GROUP BY year, month
            ORDER BY year, month
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Distinct years with ledger activity, newest first.
    pub async fn list_years(&self) -> DbResult<Vec<i64>> {
        let years: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT CAST(strftime('%Y', date) AS INTEGER) AS year
            FROM transactions
            ORDER BY year DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(years)
    }

    /// Per-month activity within a year range, sparse.
    pub async fn month_buckets(&self, range: &DateRange) -> DbResult<Vec<MonthBucket>> {
        let buckets = sqlx::query_as::<_, MonthBucket>(
            r#"
            SELECT
                CAST(strftime('%m', date) AS INTEGER) AS month,
                COUNT(*) AS transaction_count,
                COALESCE(SUM(total_cents), 0) AS total_cents
            FROM transactions
            WHERE date >= ?1 AND date < ?2
            GROUP BY month
            ORDER BY month
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await?;

        Ok(buckets)
    }

    /// Per-day activity within a month range, sparse.
    pub async fn day_buckets(&self, range: &DateRange) -> DbResult<Vec<DayBucket>> {
        let buckets = sqlx::query_as::<_, DayBucket>(
            r#"
            SELECT
                CAST(strftime('%d', date) AS INTEGER) AS day,
                COUNT(*) AS transaction_count,
                COALESCE(SUM(total_cents), 0) AS total_cents
            FROM transactions
            WHERE date >= ?1 AND date < ?2
            GROUP BY day
            ORDER BY day
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await?;

        Ok(buckets)
    }

    /// Every transaction (with items) in a single day's range, in the
    /// order they were recorded.
    pub async fn day_detail(&self, range: &DateRange) -> DbResult<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT id, kind, total_cents, discount_cents,
                   party_name, payment_method, notes, date, created_at
            FROM transactions
            WHERE date >= ?1 AND date < ?2
            ORDER BY date, created_at
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await?;

        self.transactions().assemble(rows).await
    }

    /// Searches the ledger by free text and/or date range.
    ///
    /// Text matches party name, notes, or any item's snapshot product
    /// name, case-insensitively. An empty filter returns an empty
    /// result rather than the whole ledger.
    pub async fn search(&self, filter: &SearchFilter) -> DbResult<Vec<Transaction>> {
        if filter.is_empty() {
            return Ok(Vec::new());
        }

        debug!(?filter, "Searching ledger");

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT t.id, t.kind, t.total_cents, t.discount_cents, \
             t.party_name, t.payment_method, t.notes, t.date, t.created_at \
             FROM transactions t WHERE 1 = 1",
        );

        if let Some(query) = &filter.query {
            let pattern = format!("%{}%", escape_like(query));
            builder.push(
                " AND (t.party_name LIKE ",
            );
            builder.push_bind(pattern.clone());
            builder.push(" ESCAPE '\\' OR t.notes LIKE ");
            builder.push_bind(pattern.clone());
            builder.push(
                " ESCAPE '\\' OR EXISTS (\
                 SELECT 1 FROM transaction_items i \
                 WHERE i.transaction_id = t.id AND i.product_name LIKE ",
            );
            builder.push_bind(pattern);
            builder.push(" ESCAPE '\\'))");
        }

        if let Some(start) = filter.start {
            builder.push(" AND t.date >= ");
            builder.push_bind(start);
        }
        if let Some(end) = filter.end {
            builder.push(" AND t.date < ");
            builder.push_bind(end);
        }

        builder.push(" ORDER BY t.date DESC");

        let rows = builder
            .build_query_as::<TransactionRow>()
            .fetch_all(&self.pool)
            .await?;

        self.transactions().assemble(rows).await
    }
}

/// Escapes LIKE wildcards in user input so `50%` matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("50%"), "50\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_empty_filter() {
        assert!(SearchFilter::default().is_empty());
        let filter = SearchFilter {
            query: Some("widget".to_string()),
            ..Default::default()
        };
        assert!(!filter.is_empty());
    }
}
