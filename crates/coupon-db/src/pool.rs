//! # Coupon Store Connection
//!
//! Opens the SQLite database behind the coupon store and keeps the schema
//! current before the first request is served.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ApiConfig { database_path, db_max_connections }                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig ── Storage::File(path)  → WAL, up to N connections            │
//! │          └── Storage::Memory      → one connection, never retired       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::open ──► migrations::run_migrations ──► ready                │
//! │       │                                                                 │
//! │       ├── coupons()  → CouponRepository (shares the pool)               │
//! │       ├── health()   → reachable? schema current?                       │
//! │       └── close()    → drains the pool on shutdown                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! An in-memory database exists only as long as its connection, which is why
//! that pool is pinned to a single connection with no idle or lifetime limit.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::coupon::CouponRepository;

/// How long a request may wait for a free connection.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Path value that selects a private in-memory database.
pub const MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Where the coupons live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Storage {
    /// A database file, created on first open.
    File(PathBuf),
    /// A private database that disappears with the pool.
    Memory,
}

/// Store settings.
///
/// ## Example
/// ```rust
/// use coupon_db::{DbConfig, Storage};
///
/// let config = DbConfig::new("./coupons.db", 8);
/// assert_eq!(config.storage, Storage::File("./coupons.db".into()));
///
/// assert_eq!(DbConfig::new(":memory:", 8), DbConfig::in_memory());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub storage: Storage,
    pub max_connections: u32,
}

impl DbConfig {
    /// Settings for `path`; `":memory:"` selects [`Storage::Memory`].
    pub fn new(path: impl Into<PathBuf>, max_connections: u32) -> Self {
        let path = path.into();
        if path.as_os_str() == MEMORY_PATH {
            return DbConfig::in_memory();
        }

        DbConfig {
            storage: Storage::File(path),
            max_connections: max_connections.max(1),
        }
    }

    /// A fresh, isolated in-memory store (tests, throwaway runs).
    pub fn in_memory() -> Self {
        DbConfig {
            storage: Storage::Memory,
            max_connections: 1,
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Result of a store health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbHealth {
    /// The database answered `SELECT 1`.
    pub reachable: bool,
    /// Every embedded migration is recorded as applied.
    pub schema_current: bool,
}

impl DbHealth {
    pub fn is_healthy(&self) -> bool {
        self.reachable && self.schema_current
    }
}

/// Handle to the coupon database. Clones share the pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connects and migrates.
    pub async fn open(config: DbConfig) -> DbResult<Self> {
        let pool = match &config.storage {
            Storage::File(path) => {
                info!(
                    path = %path.display(),
                    max_connections = config.max_connections,
                    "Opening coupon store"
                );

                let options = SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal)
                    .synchronous(SqliteSynchronous::Normal);

                SqlitePoolOptions::new()
                    .max_connections(config.max_connections)
                    .acquire_timeout(ACQUIRE_TIMEOUT)
                    .connect_with(options)
                    .await
            }
            Storage::Memory => {
                info!("Opening in-memory coupon store");

                let options = SqliteConnectOptions::from_str("sqlite::memory:")
                    .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

                SqlitePoolOptions::new()
                    .max_connections(1)
                    .min_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
                    .acquire_timeout(ACQUIRE_TIMEOUT)
                    .connect_with(options)
                    .await
            }
        }
        .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        migrations::run_migrations(&pool).await?;

        Ok(Database { pool })
    }

    /// The coupon repository over this pool.
    pub fn coupons(&self) -> CouponRepository {
        CouponRepository::new(self.pool.clone())
    }

    /// Checks connectivity and schema state. Never fails; problems are logged.
    pub async fn health(&self) -> DbHealth {
        if let Err(e) = sqlx::query("SELECT 1").execute(&self.pool).await {
            warn!(error = %e, "Coupon store unreachable");
            return DbHealth {
                reachable: false,
                schema_current: false,
            };
        }

        let schema_current = match migrations::pending_migrations(&self.pool).await {
            Ok(0) => true,
            Ok(pending) => {
                warn!(pending, "Coupon store schema is behind");
                false
            }
            Err(e) => {
                warn!(error = %e, "Migration history unreadable");
                false
            }
        };

        DbHealth {
            reachable: true,
            schema_current,
        }
    }

    /// Closes the pool; later queries fail.
    pub async fn close(&self) {
        info!("Closing coupon store");
        self.pool.close().await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_in_memory_is_healthy() {
        let db = Database::open(DbConfig::in_memory()).await.unwrap();
        let health = db.health().await;
        assert!(health.reachable);
        assert!(health.schema_current);
        assert!(health.is_healthy());
    }

    #[tokio::test]
    async fn test_in_memory_stores_are_isolated() {
        let a = Database::open(DbConfig::in_memory()).await.unwrap();
        let b = Database::open(DbConfig::in_memory()).await.unwrap();

        sqlx::query("DELETE FROM _sqlx_migrations")
            .execute(&a.pool)
            .await
            .unwrap();

        assert!(!a.health().await.schema_current);
        assert!(b.health().await.is_healthy());
    }

    #[tokio::test]
    async fn test_missing_migration_history_is_unhealthy() {
        let db = Database::open(DbConfig::in_memory()).await.unwrap();
        sqlx::query("DROP TABLE _sqlx_migrations")
            .execute(&db.pool)
            .await
            .unwrap();

        let health = db.health().await;
        assert!(health.reachable);
        assert!(!health.schema_current);
    }

    #[tokio::test]
    async fn test_closed_database_is_unhealthy() {
        let db = Database::open(DbConfig::in_memory()).await.unwrap();
        db.close().await;
        assert_eq!(
            db.health().await,
            DbHealth {
                reachable: false,
                schema_current: false
            }
        );
    }

    #[tokio::test]
    async fn test_file_store_survives_reopen() {
        let path = std::env::temp_dir().join(format!("coupons-{}.db", uuid::Uuid::new_v4()));

        let db = Database::open(DbConfig::new(&path, 2)).await.unwrap();
        assert!(db.health().await.is_healthy());
        db.close().await;

        // Reopening re-runs migrations as a no-op.
        let db = Database::open(DbConfig::new(&path, 2)).await.unwrap();
        assert!(db.health().await.is_healthy());
        db.close().await;

        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
        }
    }

    #[test]
    fn test_config_paths() {
        assert_eq!(DbConfig::new(MEMORY_PATH, 10), DbConfig::in_memory());

        let config = DbConfig::new("/tmp/coupons.db", 0);
        assert_eq!(config.storage, Storage::File(PathBuf::from("/tmp/coupons.db")));
        assert_eq!(config.max_connections, 1);
    }
}
