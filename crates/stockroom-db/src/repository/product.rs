//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - CRUD, every read joined with the product's category
//! - Threshold queries (below minimum / above maximum)
//! - Price adjustments and the stock valuation
//!
//! ## Bulk Price Adjustment
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Price Update Strategy                                │
//! │                                                                         │
//! │  ❌ WRONG: read every row, compute, write back one by one              │
//! │     a crash halfway leaves half the catalogue repriced                 │
//! │                                                                         │
//! │  ✅ CORRECT: one set-based statement                                   │
//! │     UPDATE produto                                                      │
//! │     SET preco_unitario = ROUND(preco_unitario * (1 + pct / 100.0))     │
//! │                                                                         │
//! │  SQLite runs a single statement atomically, so no transaction is       │
//! │  needed and every row sees the same percentage.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock is never written here after creation: `quantidade_estoque` only
//! changes through the movement engine.

use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use super::rows::{ProductRow, PRODUCT_SELECT};
use crate::error::{DbError, DbResult};
use stockroom_core::{Money, NewProduct, Product, ProductsByCategory};

/// `preco_unitario` scaled by `(1 + ?/100)` and rounded to whole cents.
const ADJUSTED_PRICE: &str = "CAST(ROUND(preco_unitario * (1 + ?1 / 100.0)) AS INTEGER)";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let low = repo.list_below_minimum().await?;
/// let value = repo.total_stock_value().await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    // =========================================================================
    // CRUD
    // =========================================================================

    /// Inserts a product and returns it with its category resolved.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Inserted product
    /// * `Err(DbError::ForeignKeyViolation)` - `category_id` does not exist
    pub async fn create(&self, product: &NewProduct) -> DbResult<Product> {
        debug!(name = %product.name, category_id = product.category_id, "Inserting product");

        let result = sqlx::query(
            r#"
            INSERT INTO produto (
                nome, preco_unitario, unidade,
                quantidade_estoque, quantidade_minima, quantidade_maxima,
                categoria_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&product.name)
        .bind(product.unit_price.cents())
        .bind(&product.unit)
        .bind(product.stock_quantity)
        .bind(product.min_quantity)
        .bind(product.max_quantity)
        .bind(product.category_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(name = %product.name, error = %e, "Product insert failed");
            DbError::from(e)
        })?;

        let id = result.last_insert_rowid();
        debug!(id, "Product inserted");

        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Updates name, price, unit, thresholds and category of a product.
    ///
    /// `stock_quantity` is ignored; record a movement to change stock.
    ///
    /// ## Returns
    /// * `Ok(true)` - Row updated
    /// * `Ok(false)` - No product with that id
    pub async fn update(&self, product: &Product) -> DbResult<bool> {
        debug!(id = product.id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE produto SET
                nome = ?2,
                preco_unitario = ?3,
                unidade = ?4,
                quantidade_minima = ?5,
                quantidade_maxima = ?6,
                categoria_id = ?7
            WHERE id = ?1
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(product.unit_price.cents())
        .bind(&product.unit)
        .bind(product.min_quantity)
        .bind(product.max_quantity)
        .bind(product.category.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a product.
    ///
    /// ## Returns
    /// * `Ok(false)` - No product with that id
    /// * `Err(DbError::ForeignKeyViolation)` - Movements reference it
    pub async fn delete(&self, id: i64) -> DbResult<bool> {
        debug!(id, "Deleting product");

        let result = sqlx::query("DELETE FROM produto WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Gets a product by id.
    pub async fn get(&self, id: i64) -> DbResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!("{PRODUCT_SELECT} WHERE p.id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Product::from))
    }

    /// All products in id order.
    pub async fn list_all(&self) -> DbResult<Vec<Product>> {
        self.fetch_products("ORDER BY p.id").await
    }

    /// All products in name order, as the price list prints them.
    pub async fn list_by_name(&self) -> DbResult<Vec<Product>> {
        self.fetch_products("ORDER BY p.nome, p.id").await
    }

    // =========================================================================
    // Thresholds
    // =========================================================================

    /// Products whose stock is strictly below their minimum, by name.
    pub async fn list_below_minimum(&self) -> DbResult<Vec<Product>> {
        self.fetch_products("WHERE p.quantidade_estoque < p.quantidade_minima ORDER BY p.nome, p.id")
            .await
    }

    /// Products whose stock is strictly above their maximum, by name.
    pub async fn list_above_maximum(&self) -> DbResult<Vec<Product>> {
        self.fetch_products("WHERE p.quantidade_estoque > p.quantidade_maxima ORDER BY p.nome, p.id")
            .await
    }

    // =========================================================================
    // Prices
    // =========================================================================

    /// Applies a percentage to every product's price in one statement.
    ///
    /// ## Returns
    /// Number of products repriced.
    pub async fn adjust_price_all_by_percent(&self, percent: f64) -> DbResult<u64> {
        debug!(percent, "Adjusting all prices");

        let result = sqlx::query(&format!("UPDATE produto SET preco_unitario = {ADJUSTED_PRICE}"))
            .bind(percent)
            .execute(&self.pool)
            .await?;

        info!(percent, updated = result.rows_affected(), "Prices adjusted");
        Ok(result.rows_affected())
    }

    /// Applies a percentage to one product's price.
    ///
    /// ## Returns
    /// Rows affected: 1, or 0 when the id does not exist.
    pub async fn adjust_price_one_by_percent(&self, id: i64, percent: f64) -> DbResult<u64> {
        debug!(id, percent, "Adjusting price");

        let result = sqlx::query(&format!(
            "UPDATE produto SET preco_unitario = {ADJUSTED_PRICE} WHERE id = ?2"
        ))
        .bind(percent)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Sets one product's price.
    ///
    /// ## Returns
    /// Rows affected: 1, or 0 when the id does not exist.
    pub async fn adjust_price_one_direct(&self, id: i64, price: Money) -> DbResult<u64> {
        debug!(id, price = %price, "Setting price");

        let result = sqlx::query("UPDATE produto SET preco_unitario = ?2 WHERE id = ?1")
            .bind(id)
            .bind(price.cents())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    // Aggregates
    // =========================================================================

    /// `Σ unit_price × stock_quantity` over all products; zero when empty.
    pub async fn total_stock_value(&self) -> DbResult<Money> {
        let cents: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(preco_unitario * quantidade_estoque), 0) FROM produto",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(Money::from_cents(cents))
    }

    /// Products grouped by category, ordered by category name then product
    /// name. Categories without products do not appear.
    pub async fn group_by_category(&self) -> DbResult<ProductsByCategory> {
        let products = self
            .fetch_products("ORDER BY c.nome, c.id, p.nome, p.id")
            .await?;

        Ok(products.into_iter().collect())
    }

    /// Counts products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM produto")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn fetch_products(&self, tail: &str) -> DbResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!("{PRODUCT_SELECT} {tail}"))
            .fetch_all(&self.pool)
            .await?;

        debug!(count = rows.len(), "Fetched products");
        Ok(rows.into_iter().map(Product::from).collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
