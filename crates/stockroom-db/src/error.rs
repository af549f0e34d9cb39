//! Errors raised by the stores and the movement engine.
//!
//! A missing row is not an error: reads return `Ok(None)` and updates or
//! deletes return `Ok(false)`. Everything below is a real failure and is
//! never folded into an empty result.
//!
//! ```text
//!  sqlx::Error ──From──► DbError ──From──► AppError (stockroom-cli)
//!                 │
//!                 └─ constraint failures are sorted by ErrorKind
//! ```

use sqlx::error::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// A row the operation depends on is gone.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Duplicate value violates {constraint}")]
    UniqueViolation { constraint: String },

    /// Unknown category or product id, or a delete that would orphan rows.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A CHECK or NOT NULL rule in the schema refused the row.
    #[error("Constraint violation: {message}")]
    ConstraintViolation { message: String },

    /// Open failed, or the pool has been closed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// The movement INSERT affected no row.
    #[error("Movement for product {product_id} was not recorded")]
    InsertFailed { product_id: i64 },

    /// The stock UPDATE of a movement matched no product; the movement is
    /// rolled back with it.
    #[error("Stock of product {product_id} could not be adjusted")]
    StockAdjustmentFailed { product_id: i64 },

    /// No connection became free within the acquire timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        DbError::NotFound { entity, id }
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(self, DbError::ForeignKeyViolation { .. })
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();
                match db_err.kind() {
                    ErrorKind::UniqueViolation => DbError::UniqueViolation {
                        constraint: message
                            .strip_prefix("UNIQUE constraint failed: ")
                            .unwrap_or(&message)
                            .to_string(),
                    },
                    ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation { message },
                    ErrorKind::CheckViolation | ErrorKind::NotNullViolation => {
                        DbError::ConstraintViolation { message }
                    }
                    _ => DbError::QueryFailed(message),
                }
            }
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),
            sqlx::Error::RowNotFound => DbError::QueryFailed("query returned no rows".to_string()),
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;
