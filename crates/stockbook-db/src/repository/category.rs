//! # Category Repository
//!
//! Database operations for the category reference catalog.
//!
//! The only rule worth enforcing here is name uniqueness (a UNIQUE
//! index; violations surface as `DbError::UniqueViolation`). Deletion
//! never cascades to products: the `ON DELETE SET NULL` foreign key
//! leaves them uncategorized.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use stockbook_core::Category;

/// Fields for creating or updating a category.
#[derive(Debug, Clone)]
pub struct CategoryInput {
    pub name: String,
    pub description: Option<String>,
}

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Lists all categories, sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, description, created_at, updated_at
            FROM categories
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Gets a category by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, description, created_at, updated_at
            FROM categories
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Inserts a new category.
    ///
    /// ## Returns
    /// * `Ok(Category)` - Inserted category with generated id
    /// * `Err(DbError::UniqueViolation)` - Name already exists
    pub async fn insert(&self, input: CategoryInput) -> DbResult<Category> {
        debug!(name = %input.name, "Inserting category");

        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            description: input.description,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO categories (id, name, description, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.created_at)
        .bind(category.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(category)
    }

    /// Updates an existing category.
    ///
    /// ## Returns
    /// * `Ok(())` - Update successful
    /// * `Err(DbError::NotFound)` - Category doesn't exist
    pub async fn update(&self, id: &str, input: CategoryInput) -> DbResult<()> {
        debug!(id = %id, "Updating category");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE categories SET
                name = ?2,
                description = ?3,
                updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        Ok(())
    }

    /// Deletes a category.
    ///
    /// Products referencing it keep running with a null category_id
    /// (weak reference, see migration schema).
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting category");

        let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        Ok(())
    }
}
