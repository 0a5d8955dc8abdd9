//! `SQLite` connection pool for rules and the execution log.
//!
//! Migrations under `migrations/` create the `rules` table (unique per
//! owner and name) and the append-only `executions` table. An in-memory
//! database lives inside a single connection, so the pool is pinned to one
//! connection for those URLs; file databases use WAL so the execution log
//! can be appended while rules are read.

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

use crate::error::StorageError;

/// How long a writer waits on a locked database file before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for the `SQLite` storage adapter.
pub struct Config {
    /// `SQLite` connection URL (e.g. `sqlite:worklog.db` or `sqlite::memory:`).
    pub database_url: String,
}

impl Config {
    /// Open the database, creating the file if missing, and apply pending
    /// migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the URL is invalid, the connection fails
    /// or a migration fails.
    pub async fn build(self) -> Result<Database, StorageError> {
        Database::initialize(&self.database_url).await
    }
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// Shared handle to the worklog database.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    async fn initialize(database_url: &str) -> Result<Self, StorageError> {
        let in_memory = is_in_memory(database_url);
        let mut options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .busy_timeout(BUSY_TIMEOUT);
        if !in_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        let mut pool_options = SqlitePoolOptions::new();
        if in_memory {
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }
        let pool = pool_options.connect_with(options).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::debug!(database_url, in_memory, "worklog database ready");

        Ok(Self { pool })
    }

    /// Pool shared by the rule repository and the execution log.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close every connection once in-flight queries finish. Called after
    /// the dispatcher has drained so no execution record is lost.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
