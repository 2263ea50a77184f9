//! 键值偏好存储

use sqlx::SqlitePool;

use crate::error::Result;

pub const READER_FONT_SIZE: &str = "reader_font_size";
pub const READER_FONT_STYLE: &str = "reader_font_style";

#[derive(Debug, Clone)]
pub struct Preferences {
    pool: SqlitePool,
}

impl Preferences {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_string(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM preferences WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(value)
    }

    pub async fn put_string(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO preferences (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// 非数字内容视为未设置
    pub async fn get_int(&self, key: &str) -> Result<Option<i64>> {
        let value = self.get_string(key).await?;
        Ok(value.and_then(|v| v.parse().ok()))
    }

    pub async fn put_int(&self, key: &str, value: i64) -> Result<()> {
        self.put_string(key, &value.to_string()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    #[tokio::test]
    async fn test_string_values_overwrite() {
        let db = Database::in_memory().await.unwrap();
        let prefs = db.preferences();

        assert_eq!(prefs.get_string(READER_FONT_STYLE).await.unwrap(), None);
        prefs.put_string(READER_FONT_STYLE, "serif").await.unwrap();
        prefs.put_string(READER_FONT_STYLE, "inter").await.unwrap();
        assert_eq!(
            prefs.get_string(READER_FONT_STYLE).await.unwrap(),
            Some("inter".to_string())
        );
    }

    #[tokio::test]
    async fn test_int_values() {
        let db = Database::in_memory().await.unwrap();
        let prefs = db.preferences();

        prefs.put_int(READER_FONT_SIZE, 120).await.unwrap();
        assert_eq!(prefs.get_int(READER_FONT_SIZE).await.unwrap(), Some(120));

        prefs.put_string(READER_FONT_SIZE, "large").await.unwrap();
        assert_eq!(prefs.get_int(READER_FONT_SIZE).await.unwrap(), None);
    }
}
