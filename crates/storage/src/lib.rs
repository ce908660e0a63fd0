mod link;
mod page;
mod site;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use sitecrawl_core::CrawlError;

pub use link::{delete_stale_links, list_links_for_site, touch_links_for_page, upsert_link};
pub use page::{delete_stale_pages, list_pages_for_site, update_page_error, update_page_hash, upsert_page};
pub use site::upsert_site;

/// A transaction scope: acquired on entry, committed on clean exit, rolled
/// back if the scope exits with a failure (§4.6). Since `sqlx::Transaction`
/// rolls itself back on drop, an early `?` return from whatever owns a `Tx`
/// is enough to satisfy that rule without an explicit rollback call.
pub type Tx = sqlx::Transaction<'static, sqlx::Sqlite>;

#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    /// Opens (creating if absent) the SQLite database at `path`, with WAL
    /// mode and foreign keys enabled (§4.6, §10).
    pub async fn connect(path: &str) -> Result<Self, CrawlError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(16)
            .connect_with(options)
            .await
            .map_err(|e| CrawlError::Storage(e.to_string()))?;

        info!(path, "connected to sqlite");
        Ok(Self { pool })
    }

    /// Runs the embedded schema migration. Idempotent: every statement is
    /// `CREATE ... IF NOT EXISTS`, so this can run at the start of every
    /// invocation without a separate migration-tracking table.
    pub async fn run_migrations(&self) -> Result<(), CrawlError> {
        sqlx::raw_sql(include_str!("../migrations/001_init.sql"))
            .execute(&self.pool)
            .await
            .map_err(|e| CrawlError::Storage(e.to_string()))?;
        info!("schema ready");
        Ok(())
    }

    /// Begins a new transaction scope.
    pub async fn begin(&self) -> Result<Tx, CrawlError> {
        self.pool.begin().await.map_err(|e| CrawlError::Storage(e.to_string()))
    }
}

/// Commits a transaction scope opened with `Storage::begin`.
pub async fn commit(tx: Tx) -> Result<(), CrawlError> {
    tx.commit().await.map_err(|e| CrawlError::Storage(e.to_string()))
}
