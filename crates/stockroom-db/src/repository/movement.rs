//! # Movement Repository
//!
//! The movement engine: records a stock movement and adjusts the product's
//! on-hand quantity as one unit, plus the movement history queries.
//!
//! ## Apply Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       apply(NewMovement)                                │
//! │                                                                         │
//! │  1. BEGIN          pool.begin() → Transaction (owns one connection)    │
//! │       │                                                                 │
//! │  2. INSERT         movimentacao (produto_id, tipo, quantidade, ...)    │
//! │       │              └── 0 rows → InsertFailed ──────────────┐         │
//! │  3. UPDATE         produto SET quantidade_estoque            │         │
//! │       │              = quantidade_estoque ± quantidade       │         │
//! │       │              └── 0 rows → StockAdjustmentFailed ─────┤         │
//! │  4. SELECT         movement ⋈ product ⋈ category             │         │
//! │       │                                                      ▼         │
//! │  5. COMMIT ──► Movement                         ROLLBACK ──► Err       │
//! │                                                                         │
//! │  Either both rows change or neither does. The connection goes back     │
//! │  to the pool when the Transaction drops, on every path.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! The stock change is a single delta `UPDATE`, never read-then-write, and
//! SQLite holds its database write lock from that statement until commit.
//! Two concurrent applies against one product therefore serialize and both
//! deltas land. No application-level locking or retry is done here; a busy
//! database surfaces as an error after the pool's acquire timeout.
//!
//! Negative stock is allowed. Callers pre-check exits with the advisory
//! predicates on [`NewMovement`].

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info, warn};

use super::rows::{into_movements, MovementRow, MOVEMENT_ORDER, MOVEMENT_SELECT};
use crate::error::{DbError, DbResult};
use stockroom_core::{Movement, MovementKind, NewMovement};

/// Repository for stock movements.
///
/// Movements are append-only: there is no update or delete. A mistake is
/// corrected by applying a compensating movement of the opposite kind.
#[derive(Debug, Clone)]
pub struct MovementRepository {
    pool: SqlitePool,
}

impl MovementRepository {
    /// Creates a new MovementRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MovementRepository { pool }
    }

    /// Records a movement and adjusts the product's stock atomically.
    ///
    /// A missing timestamp is stamped with the current time. The quantity is
    /// trusted: callers validate it with [`NewMovement::validate`].
    ///
    /// ## Returns
    /// * `Ok(Movement)` - Committed movement with the post-update product
    /// * `Err(DbError::ForeignKeyViolation)` - Unknown product; nothing written
    /// * `Err(DbError::StockAdjustmentFailed)` - Stock update failed; nothing written
    /// * `Err(DbError::TransactionFailed)` - Could not begin or commit
    pub async fn apply(&self, movement: &NewMovement) -> DbResult<Movement> {
        debug!(
            product_id = movement.product_id,
            kind = %movement.kind,
            quantity = movement.quantity,
            "Applying movement"
        );

        let mut tx = self.pool.begin().await.map_err(|e| {
            warn!(error = %e, "Could not begin movement transaction");
            match DbError::from(e) {
                DbError::Internal(msg) | DbError::QueryFailed(msg) => DbError::TransactionFailed(msg),
                other => other,
            }
        })?;

        match Self::apply_in(&mut tx, movement).await {
            Ok(recorded) => {
                tx.commit().await.map_err(|e| {
                    warn!(product_id = movement.product_id, error = %e, "Movement commit failed");
                    DbError::TransactionFailed(e.to_string())
                })?;

                info!(
                    id = recorded.id,
                    product_id = recorded.product.id,
                    kind = %recorded.kind,
                    quantity = recorded.quantity,
                    stock = recorded.product.stock_quantity,
                    "Movement recorded"
                );
                Ok(recorded)
            }
            Err(err) => {
                warn!(product_id = movement.product_id, error = %err, "Movement failed, rolling back");
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }

    /// Steps 2-4 of the protocol, all on the transaction's connection.
    async fn apply_in(tx: &mut Transaction<'_, Sqlite>, movement: &NewMovement) -> DbResult<Movement> {
        let timestamp = movement.timestamp.unwrap_or_else(Utc::now);

        let inserted = sqlx::query(
            r#"
            INSERT INTO movimentacao (produto_id, tipo, quantidade, data_hora, observacao)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(movement.product_id)
        .bind(movement.kind.as_stored())
        .bind(movement.quantity)
        .bind(timestamp)
        .bind(&movement.note)
        .execute(&mut **tx)
        .await?;

        if inserted.rows_affected() == 0 {
            return Err(DbError::InsertFailed {
                product_id: movement.product_id,
            });
        }
        let id = inserted.last_insert_rowid();

        let stock_sql = match movement.kind {
            MovementKind::Entry => {
                "UPDATE produto SET quantidade_estoque = quantidade_estoque + ?1 WHERE id = ?2"
            }
            MovementKind::Exit => {
                "UPDATE produto SET quantidade_estoque = quantidade_estoque - ?1 WHERE id = ?2"
            }
        };

        let adjusted = sqlx::query(stock_sql)
            .bind(movement.quantity)
            .bind(movement.product_id)
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                warn!(product_id = movement.product_id, error = %e, "Stock update raised");
                DbError::StockAdjustmentFailed {
                    product_id: movement.product_id,
                }
            })?;

        if adjusted.rows_affected() == 0 {
            return Err(DbError::StockAdjustmentFailed {
                product_id: movement.product_id,
            });
        }

        let row = sqlx::query_as::<_, MovementRow>(&format!("{MOVEMENT_SELECT} WHERE m.id = ?1"))
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| DbError::not_found("Movement", id))?;

        Movement::try_from(row)
    }

    // =========================================================================
    // History
    // =========================================================================

    /// Gets a movement by id.
    pub async fn get(&self, id: i64) -> DbResult<Option<Movement>> {
        let row = sqlx::query_as::<_, MovementRow>(&format!("{MOVEMENT_SELECT} WHERE m.id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Movement::try_from).transpose()
    }

    /// All movements, newest first.
    pub async fn list_all(&self) -> DbResult<Vec<Movement>> {
        let rows = sqlx::query_as::<_, MovementRow>(&format!("{MOVEMENT_SELECT} {MOVEMENT_ORDER}"))
            .fetch_all(&self.pool)
            .await?;

        debug!(count = rows.len(), "Listed movements");
        into_movements(rows)
    }

    /// Movements of one product, newest first.
    pub async fn list_by_product(&self, product_id: i64) -> DbResult<Vec<Movement>> {
        let rows = sqlx::query_as::<_, MovementRow>(&format!(
            "{MOVEMENT_SELECT} WHERE m.produto_id = ?1 {MOVEMENT_ORDER}"
        ))
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(product_id, count = rows.len(), "Listed movements by product");
        into_movements(rows)
    }

    /// Movements of one kind, newest first.
    ///
    /// Filters on the parsed kind rather than the raw `tipo` text, so legacy
    /// spellings such as `ENTRADA` or `SAÍDA` match. SQLite's `LOWER` only
    /// folds ASCII.
    pub async fn list_by_kind(&self, kind: MovementKind) -> DbResult<Vec<Movement>> {
        let movements: Vec<Movement> = self
            .list_all()
            .await?
            .into_iter()
            .filter(|m| m.kind == kind)
            .collect();

        debug!(kind = %kind, count = movements.len(), "Listed movements by kind");
        Ok(movements)
    }

    /// Counts movements.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM movimentacao")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::test_support::{beverages, draft, soda, test_db};
    use chrono::{Duration, TimeZone};

    async fn stock_of(db: &Database, product_id: i64) -> i64 {
        db.products()
            .get(product_id)
            .await
            .unwrap()
            .unwrap()
            .stock_quantity
    }

    #[tokio::test]
    async fn test_entry_increases_stock() {
        let db = test_db().await;
        let category = beverages(&db).await;
        let product = soda(&db, &category).await;

        let movement = db
            .movements()
            .apply(&NewMovement::entry(product.id, 7))
            .await
            .unwrap();

        assert_eq!(movement.kind, MovementKind::Entry);
        assert_eq!(movement.product.stock_quantity, 27);
        assert_eq!(stock_of(&db, product.id).await, 27);
        assert!(db.movements().get(movement.id).await.unwrap().is_some());
        assert_eq!(db.movements().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_exit_can_go_negative() {
        let db = test_db().await;
        let category = beverages(&db).await;
        let product = soda(&db, &category).await;

        let movement = db
            .movements()
            .apply(&NewMovement::exit(product.id, 25))
            .await
            .unwrap();

        assert_eq!(movement.product.stock_quantity, -5);
        assert_eq!(stock_of(&db, product.id).await, -5);
    }

    #[tokio::test]
    async fn test_unknown_product_writes_nothing() {
        let db = test_db().await;
        let category = beverages(&db).await;
        let product = soda(&db, &category).await;

        let err = db
            .movements()
            .apply(&NewMovement::entry(999, 3))
            .await
            .unwrap_err();

        assert!(err.is_foreign_key_violation());
        assert_eq!(db.movements().count().await.unwrap(), 0);
        assert_eq!(stock_of(&db, product.id).await, 20);
    }

    #[tokio::test]
    async fn test_failed_stock_update_rolls_back_insert() {
        let db = test_db().await;
        let category = beverages(&db).await;
        let product = soda(&db, &category).await;

        sqlx::query(
            r#"
            CREATE TRIGGER lock_stock BEFORE UPDATE OF quantidade_estoque ON produto
            BEGIN
                SELECT RAISE(ABORT, 'stock locked');
            END
            "#,
        )
        .execute(db.pool())
        .await
        .unwrap();

        let err = db
            .movements()
            .apply(&NewMovement::exit(product.id, 5))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::StockAdjustmentFailed { product_id } if product_id == product.id));
        assert_eq!(db.movements().count().await.unwrap(), 0);
        assert_eq!(stock_of(&db, product.id).await, 20);

        // The connection went back to the pool and is usable again
        sqlx::query("DROP TRIGGER lock_stock")
            .execute(db.pool())
            .await
            .unwrap();
        db.movements()
            .apply(&NewMovement::exit(product.id, 5))
            .await
            .unwrap();
        assert_eq!(stock_of(&db, product.id).await, 15);
    }

    #[tokio::test]
    async fn test_rejected_quantity_writes_nothing() {
        let db = test_db().await;
        let category = beverages(&db).await;
        let product = soda(&db, &category).await;

        assert!(db
            .movements()
            .apply(&NewMovement::entry(product.id, 0))
            .await
            .is_err());
        assert_eq!(db.movements().count().await.unwrap(), 0);
        assert_eq!(stock_of(&db, product.id).await, 20);
    }

    #[tokio::test]
    async fn test_note_and_timestamp_are_kept() {
        let db = test_db().await;
        let category = beverages(&db).await;
        let product = soda(&db, &category).await;
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap();

        let movement = db
            .movements()
            .apply(&NewMovement::exit(product.id, 5).with_note("promo").at(at))
            .await
            .unwrap();

        let fetched = db.movements().get(movement.id).await.unwrap().unwrap();
        assert_eq!(fetched.note.as_deref(), Some("promo"));
        assert_eq!(fetched.timestamp, at);
        assert_eq!(fetched.product, product);
    }

    #[tokio::test]
    async fn test_missing_timestamp_defaults_to_now() {
        let db = test_db().await;
        let category = beverages(&db).await;
        let product = soda(&db, &category).await;

        let before = Utc::now();
        let movement = db
            .movements()
            .apply(&NewMovement::entry(product.id, 1))
            .await
            .unwrap();
        let after = Utc::now();

        assert!(movement.timestamp >= before - Duration::seconds(1));
        assert!(movement.timestamp <= after + Duration::seconds(1));
    }

    #[tokio::test]
    async fn test_history_ordering_and_filters() {
        let db = test_db().await;
        let category = beverages(&db).await;
        let soda = soda(&db, &category).await;
        let juice = db
            .products()
            .create(&draft("Juice", 300, 5, 2, 40, category.id))
            .await
            .unwrap();
        let day = |d: u32| Utc.with_ymd_and_hms(2026, 1, d, 12, 0, 0).unwrap();

        let repo = db.movements();
        repo.apply(&NewMovement::entry(soda.id, 1).at(day(1))).await.unwrap();
        repo.apply(&NewMovement::exit(juice.id, 2).at(day(3))).await.unwrap();
        repo.apply(&NewMovement::exit(soda.id, 3).at(day(2))).await.unwrap();

        let all: Vec<i64> = repo.list_all().await.unwrap().iter().map(|m| m.quantity).collect();
        assert_eq!(all, vec![2, 3, 1]);

        let for_soda: Vec<i64> = repo
            .list_by_product(soda.id)
            .await
            .unwrap()
            .iter()
            .map(|m| m.quantity)
            .collect();
        assert_eq!(for_soda, vec![3, 1]);

        let exits = repo.list_by_kind(MovementKind::Exit).await.unwrap();
        assert_eq!(exits.len(), 2);
        assert!(exits.iter().all(|m| m.is_exit()));
        assert_eq!(exits[0].product.id, juice.id);
    }

    #[tokio::test]
    async fn test_list_by_kind_ignores_stored_case() {
        let db = test_db().await;
        let category = beverages(&db).await;
        let product = soda(&db, &category).await;

        sqlx::query(
            "INSERT INTO movimentacao (produto_id, tipo, quantidade, data_hora) VALUES (?1, 'ENTRADA', 4, ?2)",
        )
        .bind(product.id)
        .bind(Utc::now())
        .execute(db.pool())
        .await
        .unwrap();

        let entries = db.movements().list_by_kind(MovementKind::Entry).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, MovementKind::Entry);
        assert!(db.movements().list_by_kind(MovementKind::Exit).await.unwrap().is_empty());

        sqlx::query(
            "INSERT INTO movimentacao (produto_id, tipo, quantidade, data_hora) VALUES (?1, 'SAÍDA', 1, ?2)",
        )
        .bind(product.id)
        .bind(Utc::now())
        .execute(db.pool())
        .await
        .unwrap();

        let exits = db.movements().list_by_kind(MovementKind::Exit).await.unwrap();
        assert_eq!(exits.len(), 1);
    }

    #[tokio::test]
    async fn test_below_minimum_scenario() {
        let db = test_db().await;
        let category = beverages(&db).await;
        let product = soda(&db, &category).await;
        let movements = db.movements();

        let first = movements
            .apply(&NewMovement::exit(product.id, 5).with_note("promo"))
            .await
            .unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(first.product.stock_quantity, 15);
        assert!(db.products().list_below_minimum().await.unwrap().is_empty());

        movements.apply(&NewMovement::exit(product.id, 6)).await.unwrap();
        let below = db.products().list_below_minimum().await.unwrap();
        assert_eq!(below.len(), 1);
        assert_eq!(below[0].stock_quantity, 9);

        movements.apply(&NewMovement::entry(product.id, 1)).await.unwrap();
        assert!(db.products().list_below_minimum().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_applies_do_not_lose_updates() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("stock.db")).max_connections(4))
            .await
            .unwrap();
        let category = beverages(&db).await;
        let product_id = soda(&db, &category).await.id;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let repo = db.movements();
            handles.push(tokio::spawn(async move {
                repo.apply(&NewMovement::entry(product_id, 1)).await
            }));
        }

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(db.movements().count().await.unwrap(), 8);
        assert_eq!(stock_of(&db, product_id).await, 28);
    }

    #[tokio::test]
    async fn test_unknown_kind_row_is_skipped_in_listings() {
        let db = test_db().await;
        let category = beverages(&db).await;
        let product = soda(&db, &category).await;
        let movements = db.movements();

        movements.apply(&NewMovement::entry(product.id, 4)).await.unwrap();
        sqlx::query(
            "INSERT INTO movimentacao (produto_id, tipo, quantidade, data_hora) \
             VALUES (?1, 'Ajuste', 2, '2026-01-01T00:00:00Z')",
        )
        .bind(product.id)
        .execute(db.pool())
        .await
        .unwrap();

        assert_eq!(movements.list_all().await.unwrap().len(), 1);
        assert_eq!(movements.list_by_product(product.id).await.unwrap().len(), 1);
        assert_eq!(movements.list_by_kind(MovementKind::Entry).await.unwrap().len(), 1);
        assert!(movements.get(2).await.is_err());
    }
}
