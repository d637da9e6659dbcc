//! # Cart Database
//!
//! Opening the SQLite file that holds the cart and the catalog.
//!
//! ```text
//!  DbConfig::new(path) / DbConfig::in_memory()
//!        │
//!        ▼
//!  Database::new(config).await ── one connection, migrations applied
//!        │
//!        ├──► db.carts()     → CartItemRepository
//!        └──► db.products()  → ProductRepository
//! ```
//!
//! Every `Database` holds exactly one connection. The cart worker is the
//! only writer of its handle, so a larger pool would only add lock
//! contention on the file. Separate processes sharing the file (two CLI
//! invocations, the seed binary) wait on each other for up to
//! `busy_timeout` instead of failing with `SQLITE_BUSY`.
//!
//! WAL journaling lets a catalog read proceed while another process writes
//! the cart.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations::{self, MigrationStatus};
use crate::repository::cart::CartItemRepository;
use crate::repository::product::ProductRepository;

/// File name of the default database, shared by the CLI and `seed`.
pub const DEFAULT_DATABASE_FILE: &str = "shopping.db";

/// `shopping.db` in the platform data directory, which is created if missing.
pub fn default_database_path() -> DbResult<PathBuf> {
    let dirs = directories::ProjectDirs::from("com", "shopping", "cart").ok_or_else(|| {
        DbError::ConnectionFailed("cannot determine the app data directory".to_string())
    })?;
    let data_dir = dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .map_err(|e| DbError::ConnectionFailed(format!("{}: {e}", data_dir.display())))?;

    Ok(data_dir.join(DEFAULT_DATABASE_FILE))
}

/// Where the database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    File(PathBuf),
    /// Private to one `Database`; gone when it closes.
    Memory,
}

/// How to open the cart database.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub location: DbLocation,

    /// How long a statement waits for another process's write lock.
    /// Default: 5 seconds
    pub busy_timeout: Duration,

    /// Apply pending migrations on open. Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// A database file at `path`, created if missing.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            location: DbLocation::File(path.into()),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    /// A fresh, empty database that only this handle can see.
    pub fn in_memory() -> Self {
        DbConfig {
            location: DbLocation::Memory,
            ..DbConfig::new(PathBuf::new())
        }
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    pub fn is_in_memory(&self) -> bool {
        self.location == DbLocation::Memory
    }

    /// The file path, if any.
    pub fn path(&self) -> Option<&Path> {
        match &self.location {
            DbLocation::File(path) => Some(path),
            DbLocation::Memory => None,
        }
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let options = match &self.location {
            DbLocation::File(path) => SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal),
            // WAL is not available for in-memory databases.
            DbLocation::Memory => SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?,
        };

        Ok(options
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(self.busy_timeout))
    }
}

// =============================================================================
// Database
// =============================================================================

/// Handle to an open cart database.
///
/// Clones share the same connection.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the database and, unless disabled, brings its schema up to date.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(location = ?config.location, "Opening cart database");

        // The connection never expires: for `Memory` it *is* the database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(config.connect_options()?)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!("Connection established");

        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Applies all pending migrations. Idempotent.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    pub async fn migration_status(&self) -> DbResult<MigrationStatus> {
        migrations::migration_status(&self.pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn carts(&self) -> CartItemRepository {
        CartItemRepository::new(self.pool.clone())
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    /// Closes the connection. Repository calls on this handle fail afterwards,
    /// and an in-memory database is discarded.
    pub async fn close(&self) {
        debug!("Closing cart database");
        self.pool.close().await;
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopping_core::{ProductId, Quantity};

    #[tokio::test]
    async fn test_in_memory_database_is_migrated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let status = db.migration_status().await.unwrap();
        assert!(status.is_current());
        assert!(status.embedded >= 1);
        assert_eq!(db.carts().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_in_memory_databases_are_isolated() {
        let first = Database::new(DbConfig::in_memory()).await.unwrap();
        let second = Database::new(DbConfig::in_memory()).await.unwrap();

        first
            .carts()
            .upsert(ProductId::new(1), Quantity::MIN)
            .await
            .unwrap();

        assert_eq!(first.carts().count().await.unwrap(), 1);
        assert_eq!(second.carts().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_file_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.db");

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        db.carts()
            .upsert(ProductId::new(7), Quantity::MIN)
            .await
            .unwrap();
        db.close().await;
        assert!(db.is_closed());

        let reopened = Database::new(DbConfig::new(&path)).await.unwrap();
        assert_eq!(reopened.carts().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_skip_migrations() {
        let db = Database::new(DbConfig::in_memory().run_migrations(false))
            .await
            .unwrap();

        let status = db.migration_status().await.unwrap();
        assert_eq!(status.applied, 0);
        assert!(!status.is_current());
        assert!(db.carts().count().await.is_err());
    }

    #[test]
    fn test_config() {
        let config = DbConfig::new("/tmp/cart.db").busy_timeout(Duration::from_millis(250));

        assert_eq!(config.path(), Some(Path::new("/tmp/cart.db")));
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
        assert!(config.run_migrations);
        assert!(!config.is_in_memory());

        let memory = DbConfig::in_memory();
        assert!(memory.is_in_memory());
        assert_eq!(memory.path(), None);
    }
}
