//! # Expense Repository
//!
//! Database operations for business expenses. Expenses never touch
//! stock; the reporting service subtracts their totals from profit.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use stockbook_core::Expense;

/// Fields for creating or updating an expense.
#[derive(Debug, Clone)]
pub struct ExpenseInput {
    pub title: String,
    pub amount_cents: i64,
    /// Free-text grouping label (rent, utilities, ...).
    pub category: Option<String>,
    /// Business date; `None` means "now".
    pub date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Repository for expense database operations.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    /// Creates a new ExpenseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ExpenseRepository { pool }
    }

    /// Lists all expenses, newest business date first.
    pub async fn list(&self) -> DbResult<Vec<Expense>> {
        let expenses = sqlx::query_as::<_, Expense>(
            r#"
            SELECT id, title, amount_cents, category, date, notes, created_at
            FROM expenses
            ORDER BY date DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(expenses)
    }

    /// Gets an expense by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Expense>> {
        let expense = sqlx::query_as::<_, Expense>(
            r#"
            SELECT id, title, amount_cents, category, date, notes, created_at
            FROM expenses
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(expense)
    }

    /// Inserts a new expense.
    pub async fn insert(&self, input: ExpenseInput) -> DbResult<Expense> {
        debug!(title = %input.title, amount_cents = input.amount_cents, "Inserting expense");

        let now = Utc::now();
        let expense = Expense {
            id: Uuid::new_v4().to_string(),
            title: input.title,
            amount_cents: input.amount_cents,
            category: input.category,
            date: input.date.unwrap_or(now),
            notes: input.notes,
            created_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO expenses (id, title, amount_cents, category, date, notes, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&expense.id)
        .bind(&expense.title)
        .bind(expense.amount_cents)
        .bind(&expense.category)
        .bind(expense.date)
        .bind(&expense.notes)
        .bind(expense.created_at)
        .execute(&self.pool)
        .await?;

        Ok(expense)
    }

    /// Updates an existing expense.
    pub async fn update(&self, id: &str, input: ExpenseInput) -> DbResult<()> {
        debug!(id = %id, "Updating expense");

        let result = sqlx::query(
            r#"
            UPDATE expenses SET
                title = ?2,
                amount_cents = ?3,
                category = ?4,
                date = COALESCE(?5, date),
                notes = ?6
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&input.title)
        .bind(input.amount_cents)
        .bind(&input.category)
        .bind(input.date)
        .bind(&input.notes)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Expense", id));
        }

        Ok(())
    }

    /// Deletes an expense.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting expense");

        let result = sqlx::query("DELETE FROM expenses WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Expense", id));
        }

        Ok(())
    }
}
