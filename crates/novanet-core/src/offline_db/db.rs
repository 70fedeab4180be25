//! Connection setup and schema for the offline store.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::{Path, PathBuf};

const SCHEMA: &[&str] = &[
    // config_json: serialized RequestConfig, replayed as-is.
    r#"
    CREATE TABLE IF NOT EXISTS pending_requests (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        config_json TEXT NOT NULL,
        context TEXT,
        attempts INTEGER NOT NULL DEFAULT 0,
        created_at INTEGER NOT NULL
    )
    "#,
    // seq orders the log; id is the ClassifiedError uuid.
    r#"
    CREATE TABLE IF NOT EXISTS error_log (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        id TEXT NOT NULL UNIQUE,
        kind TEXT NOT NULL,
        severity TEXT NOT NULL,
        message TEXT NOT NULL,
        user_message TEXT NOT NULL,
        retryable INTEGER NOT NULL,
        context TEXT,
        status INTEGER,
        timestamp TEXT NOT NULL
    )
    "#,
];

/// Pending-request queue and error log in one SQLite file,
/// by default `~/.local/state/novanet/novanet.db`.
#[derive(Clone)]
pub struct OfflineDb {
    pub(crate) pool: Pool<Sqlite>,
}

impl OfflineDb {
    pub fn default_path() -> Result<PathBuf> {
        let dirs = xdg::BaseDirectories::with_prefix("novanet")?;
        Ok(dirs.get_state_home().join("novanet").join("novanet.db"))
    }

    pub async fn open_default() -> Result<Self> {
        Self::open_at(Self::default_path()?).await
    }

    /// Open or create the database file at `path`, creating parent dirs.
    pub async fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .with_context(|| format!("open {}", path.display()))?;
        Self::from_pool(pool).await
    }

    /// Private in-memory database. One connection that never expires, so
    /// the data lives as long as the handle.
    pub async fn open_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::from_pool(pool).await
    }

    async fn from_pool(pool: Pool<Sqlite>) -> Result<Self> {
        for stmt in SCHEMA {
            sqlx::query(stmt).execute(&pool).await?;
        }
        Ok(OfflineDb { pool })
    }
}

/// Unix seconds for `created_at`.
pub(crate) fn unix_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}
