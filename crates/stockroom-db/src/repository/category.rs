//! # Category Repository
//!
//! CRUD over the `category` table plus the per-category product count.
//!
//! Referential integrity is left to SQLite: deleting a category that
//! products still point at fails with [`DbError::ForeignKeyViolation`].

use sqlx::SqlitePool;
use tracing::{debug, warn};

use super::rows::CategoryRow;
use crate::error::{DbError, DbResult};
use stockroom_core::{Category, CategoryProductCount, NewCategory};

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

    /// Inserts a category and returns it with its assigned id.
    ///
    /// The name is not checked here; callers run [`NewCategory::validate`].
    pub async fn create(&self, category: &NewCategory) -> DbResult<Category> {
        debug!(name = %category.name, "Inserting category");

        let result = sqlx::query("INSERT INTO category (nome, tamanho, embalagem) VALUES (?1, ?2, ?3)")
            .bind(&category.name)
            .bind(&category.size)
            .bind(&category.packaging)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(name = %category.name, error = %e, "Category insert failed");
                DbError::from(e)
            })?;

        let id = result.last_insert_rowid();
        debug!(id, "Category inserted");

        Ok(category.clone().into_category(id))
    }

    /// Overwrites name, size and packaging of an existing category.
    ///
    /// ## Returns
    /// * `Ok(true)` - Row updated
    /// * `Ok(false)` - No category with that id
    pub async fn update(&self, category: &Category) -> DbResult<bool> {
        debug!(id = category.id, "Updating category");

        let result = sqlx::query(
            "UPDATE category SET nome = ?2, tamanho = ?3, embalagem = ?4 WHERE id = ?1",
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.size)
        .bind(&category.packaging)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a category.
    ///
    /// ## Returns
    /// * `Ok(true)` - Row deleted
    /// * `Ok(false)` - No category with that id
    /// * `Err(DbError::ForeignKeyViolation)` - Products still reference it
    pub async fn delete(&self, id: i64) -> DbResult<bool> {
        debug!(id, "Deleting category");

        let result = sqlx::query("DELETE FROM category WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                let err = DbError::from(e);
                if err.is_foreign_key_violation() {
                    warn!(id, "Category still referenced by products");
                }
                err
            })?;

        Ok(result.rows_affected() > 0)
    }

    /// Gets a category by id.
    pub async fn get(&self, id: i64) -> DbResult<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, nome, tamanho, embalagem FROM category WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Category::from))
    }

    /// All categories ordered by name.
    pub async fn list_all(&self) -> DbResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, nome, tamanho, embalagem FROM category ORDER BY nome, id",
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Listed categories");
        Ok(rows.into_iter().map(Category::from).collect())
    }

    /// Number of products in each category, ordered by category name.
    ///
    /// Categories without products are included with a count of 0.
    pub async fn count_products_per_category(&self) -> DbResult<Vec<CategoryProductCount>> {
        let rows: Vec<(i64, String, i64)> = sqlx::query_as(
            r#"
            SELECT c.id, c.nome, COUNT(p.id)
            FROM category c
            LEFT JOIN produto p ON p.categoria_id = c.id
            GROUP BY c.id, c.nome
            ORDER BY c.nome, c.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(category_id, name, count)| CategoryProductCount {
                category_id,
                name,
                count,
            })
            .collect())
    }

    /// Counts categories.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM category")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
