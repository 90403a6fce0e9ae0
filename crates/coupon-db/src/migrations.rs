//! # Schema Migrations
//!
//! SQL files under `migrations/sqlite/` are compiled into the binary and
//! applied by [`Database::open`](crate::Database::open). sqlx records each
//! applied file in `_sqlx_migrations`; that table is also what `/health`
//! reads to decide whether the schema is current.
//!
//! New schema changes go in a new `NNN_description.sql` file. Applied files
//! are checksummed, so editing one breaks every existing database.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies every migration not yet recorded. Safe to call on each start.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    MIGRATOR.run(pool).await?;
    info!(migrations = MIGRATOR.iter().count(), "Coupon schema up to date");
    Ok(())
}

/// Number of embedded migrations without a successful record.
///
/// Fails when the history table cannot be read, for example because it is
/// missing: an unknown history is not treated as "nothing applied".
pub async fn pending_migrations(pool: &SqlitePool) -> DbResult<usize> {
    let applied: Vec<i64> =
        sqlx::query_scalar("SELECT version FROM _sqlx_migrations WHERE success = 1")
            .fetch_all(pool)
            .await?;

    Ok(MIGRATOR
        .iter()
        .filter(|migration| !applied.contains(&migration.version))
        .count())
}
