use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::LibraryItem;

#[derive(Debug, Clone)]
pub struct LibraryDao {
    pool: SqlitePool,
}

impl LibraryDao {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// id 由数据库在插入时分配
    pub async fn insert(&self, title: &str, authors: &str, file_path: &str) -> Result<LibraryItem> {
        let created_at = chrono::Utc::now().timestamp_millis();

        let result = sqlx::query(
            "INSERT INTO library (title, authors, file_path, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(title)
        .bind(authors)
        .bind(file_path)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        let item = sqlx::query_as::<_, LibraryItem>("SELECT * FROM library WHERE id = ?")
            .bind(result.last_insert_rowid())
            .fetch_one(&self.pool)
            .await?;

        Ok(item)
    }

    pub async fn get_all(&self) -> Result<Vec<LibraryItem>> {
        let items = sqlx::query_as::<_, LibraryItem>(
            "SELECT * FROM library ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    pub async fn get_item_by_id(&self, id: i64) -> Result<Option<LibraryItem>> {
        let item = sqlx::query_as::<_, LibraryItem>("SELECT * FROM library WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    pub async fn check_if_downloaded(&self, file_path: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM library WHERE file_path = ?")
            .bind(file_path)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    /// 关联的阅读进度通过外键级联删除
    pub async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM library WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
