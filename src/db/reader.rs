use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::ReaderItem;

#[derive(Debug, Clone)]
pub struct ReaderDao {
    pool: SqlitePool,
}

impl ReaderDao {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, item: &ReaderItem) -> Result<()> {
        sqlx::query(
            "INSERT INTO reader (library_item_id, last_chapter_index, last_chapter_offset, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(item.library_item_id)
        .bind(item.last_chapter_index)
        .bind(item.last_chapter_offset)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn update(&self, item: &ReaderItem) -> Result<()> {
        sqlx::query(
            "UPDATE reader SET last_chapter_index = ?, last_chapter_offset = ?, updated_at = ? WHERE library_item_id = ?",
        )
        .bind(item.last_chapter_index)
        .bind(item.last_chapter_offset)
        .bind(item.updated_at)
        .bind(item.library_item_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// 单条语句完成插入或更新，避免先查后写
    pub async fn upsert(&self, item: &ReaderItem) -> Result<()> {
        sqlx::query(
            "INSERT INTO reader (library_item_id, last_chapter_index, last_chapter_offset, updated_at) VALUES (?, ?, ?, ?)
             ON CONFLICT(library_item_id) DO UPDATE SET
                last_chapter_index = excluded.last_chapter_index,
                last_chapter_offset = excluded.last_chapter_offset,
                updated_at = excluded.updated_at",
        )
        .bind(item.library_item_id)
        .bind(item.last_chapter_index)
        .bind(item.last_chapter_offset)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_reader_item(&self, library_item_id: i64) -> Result<Option<ReaderItem>> {
        let item =
            sqlx::query_as::<_, ReaderItem>("SELECT * FROM reader WHERE library_item_id = ?")
                .bind(library_item_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(item)
    }

    pub async fn delete(&self, library_item_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM reader WHERE library_item_id = ?")
            .bind(library_item_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// 最近更新的进度排在前面
    pub async fn get_all_reader_items(&self) -> Result<Vec<ReaderItem>> {
        let items = sqlx::query_as::<_, ReaderItem>(
            "SELECT * FROM reader ORDER BY updated_at DESC, library_item_id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }
}
