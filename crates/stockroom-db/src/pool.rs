//! # Connection Pool
//!
//! Opens the stockroom SQLite file and hands out the three stores.
//!
//! ```text
//!  DbConfig ──► Database::new ──► SqlitePool ──┬─► categories()  CategoryRepository
//!                   │                          ├─► products()    ProductRepository
//!                   ▼                          └─► movements()   MovementRepository
//!            migrations::run_migrations
//! ```
//!
//! Every store owns a clone of the pool. A store method borrows one
//! connection, or opens one transaction, and gives it back when the call
//! returns, whether it succeeded or not.
//!
//! File databases are opened in WAL journal mode with `synchronous = NORMAL`
//! and foreign keys on. `:memory:` selects a private database that lives on
//! a single connection; it is what the test suites use.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::category::CategoryRepository;
use crate::repository::movement::MovementRepository;
use crate::repository::product::ProductRepository;

/// Path value that selects a private in-memory database.
pub const IN_MEMORY_PATH: &str = ":memory:";

/// File connections are recycled after this long.
const FILE_CONNECTION_LIFETIME: Duration = Duration::from_secs(30 * 60);

// =============================================================================
// Configuration
// =============================================================================

/// Where the stockroom database lives and how the pool around it behaves.
///
/// ```rust,ignore
/// let config = DbConfig::new("/var/lib/stockroom/stockroom.db").max_connections(8);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file, or [`IN_MEMORY_PATH`].
    pub database_path: PathBuf,

    /// Upper bound on open connections (5 for files).
    pub max_connections: u32,

    /// Connections kept open while idle (1).
    pub min_connections: u32,

    /// Longest a caller waits for a pooled connection.
    pub acquire_timeout: Duration,

    /// Idle connections above `min_connections` are closed after this.
    /// `None` never closes them.
    pub idle_timeout: Option<Duration>,

    /// Apply pending migrations inside [`Database::new`].
    pub run_migrations: bool,
}

impl DbConfig {
    /// File-backed configuration; the file is created on first open.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            run_migrations: true,
        }
    }

    /// Private in-memory database on one connection.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(IN_MEMORY_PATH),
            // a second connection would open a second, empty database
            max_connections: 1,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: None,
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Skip migrations at open time; call [`Database::run_migrations`] later.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path == Path::new(IN_MEMORY_PATH)
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        if self.is_in_memory() {
            return SqliteConnectOptions::from_str("sqlite::memory:")
                .map(|options| options.foreign_keys(true))
                .map_err(|e| DbError::ConnectionFailed(e.to_string()));
        }

        Ok(SqliteConnectOptions::new()
            .filename(&self.database_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true))
    }

    fn pool_options(&self) -> SqlitePoolOptions {
        let lifetime = (!self.is_in_memory()).then_some(FILE_CONNECTION_LIFETIME);

        SqlitePoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(self.idle_timeout)
            .max_lifetime(lifetime)
    }
}

// =============================================================================
// Database
// =============================================================================

/// Open stockroom database. Clones share one pool.
///
/// ```rust,ignore
/// let db = Database::new(DbConfig::new("stockroom.db")).await?;
/// let soda = db.products().get(1).await?;
/// db.movements().apply(&NewMovement::exit(1, 5)).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool described by `config` and, unless disabled, brings
    /// the schema up to date.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        debug!(
            path = %config.database_path.display(),
            max_connections = config.max_connections,
            "Opening stockroom database"
        );

        let pool = config
            .pool_options()
            .connect_with(config.connect_options()?)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        let db = Database { pool };
        if config.run_migrations {
            db.run_migrations().await?;
        }

        info!(
            path = %config.database_path.display(),
            in_memory = config.is_in_memory(),
            "Stockroom database ready"
        );
        Ok(db)
    }

    /// Applies any embedded migration the database has not seen yet.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Raw pool, for status queries and tests.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn categories(&self) -> CategoryRepository {
        CategoryRepository::new(self.pool.clone())
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    /// The movement engine: the only writer of `quantidade_estoque` after
    /// a product is created.
    pub fn movements(&self) -> MovementRepository {
        MovementRepository::new(self.pool.clone())
    }

    /// Closes every connection. Later store calls fail with
    /// [`DbError::ConnectionFailed`].
    pub async fn close(&self) {
        debug!("Closing stockroom database");
        self.pool.close().await;
    }

    /// `SELECT 1` round trip.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.health_check().await);
        assert_eq!(db.products().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_in_memory_databases_are_isolated() {
        let first = Database::new(DbConfig::in_memory()).await.unwrap();
        let second = Database::new(DbConfig::in_memory()).await.unwrap();

        sqlx::query("INSERT INTO category (nome, tamanho, embalagem) VALUES ('A', 'Small', 'Can')")
            .execute(first.pool())
            .await
            .unwrap();

        assert_eq!(first.categories().count().await.unwrap(), 1);
        assert_eq!(second.categories().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_file_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stockroom.db");

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        sqlx::query("INSERT INTO category (nome, tamanho, embalagem) VALUES ('A', 'Small', 'Can')")
            .execute(db.pool())
            .await
            .unwrap();
        db.close().await;

        let reopened = Database::new(DbConfig::new(&path)).await.unwrap();
        assert_eq!(reopened.categories().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_closed_pool_reports_connection_failure() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;

        let err = db.categories().list_all().await.unwrap_err();
        assert!(matches!(err, DbError::ConnectionFailed(_)));
        assert!(!db.health_check().await);
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert!(!config.is_in_memory());
        assert!(DbConfig::in_memory().is_in_memory());
    }
}
