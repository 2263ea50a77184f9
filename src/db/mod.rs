pub mod library;
pub mod preferences;
pub mod reader;

pub use library::LibraryDao;
pub use preferences::Preferences;
pub use reader::ReaderDao;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

use crate::config::ReaderConfig;
use crate::error::Result;

/// 数据库连接池，可廉价克隆
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn open(config: &ReaderConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        let opts = SqliteConnectOptions::from_str(&config.database_url())?
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(opts).await?;
        let db = Self { pool };
        db.init().await?;
        tracing::info!("[database] Opened {}", config.database_path().display());
        Ok(db)
    }

    /// 内存数据库只能使用单个连接，否则每个连接各自一份数据
    pub async fn in_memory() -> Result<Self> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await?;
        let db = Self { pool };
        db.init().await?;
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn library(&self) -> LibraryDao {
        LibraryDao::new(self.pool.clone())
    }

    pub fn reader(&self) -> ReaderDao {
        ReaderDao::new(self.pool.clone())
    }

    pub fn preferences(&self) -> Preferences {
        Preferences::new(self.pool.clone())
    }

    /// 建表，可重复执行
    async fn init(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS library (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                authors TEXT NOT NULL,
                file_path TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS reader (
                library_item_id INTEGER PRIMARY KEY,
                last_chapter_index INTEGER NOT NULL DEFAULT 0,
                last_chapter_offset INTEGER NOT NULL DEFAULT 0,
                updated_at INTEGER NOT NULL,
                FOREIGN KEY (library_item_id) REFERENCES library(id) ON DELETE CASCADE
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS preferences (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        // Indexes
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_library_created_at ON library(created_at)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_library_file_path ON library(file_path)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
