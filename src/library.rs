//! 书架：书籍的添加、列出、继续阅读与删除

use serde::Serialize;

use crate::db::{Database, LibraryDao, ReaderDao};
use crate::error::{Error, Result};
use crate::formats::epub::EpubCache;
use crate::models::{LibraryItem, ReaderItem};

/// 有阅读进度的书籍
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContinueReading {
    pub item: LibraryItem,
    pub progress: ReaderItem,
}

#[derive(Clone)]
pub struct Library {
    library: LibraryDao,
    reader: ReaderDao,
    parse_cache: Option<EpubCache>,
}

impl Library {
    pub fn new(db: &Database) -> Self {
        Self {
            library: db.library(),
            reader: db.reader(),
            parse_cache: None,
        }
    }

    /// 删除书籍时同步清理解析缓存
    pub fn with_parse_cache(mut self, cache: EpubCache) -> Self {
        self.parse_cache = Some(cache);
        self
    }

    pub async fn add_book(&self, title: &str, authors: &str, file_path: &str) -> Result<LibraryItem> {
        let item = self.library.insert(title, authors, file_path).await?;
        tracing::info!("[add_book] Added {} ({})", item.title, item.id);
        Ok(item)
    }

    pub async fn books(&self) -> Result<Vec<LibraryItem>> {
        self.library.get_all().await
    }

    pub async fn continue_reading(&self) -> Result<Vec<ContinueReading>> {
        let mut entries = Vec::new();
        for progress in self.reader.get_all_reader_items().await? {
            if let Some(item) = self.library.get_item_by_id(progress.library_item_id).await? {
                entries.push(ContinueReading { item, progress });
            }
        }
        Ok(entries)
    }

    /// 删除书籍记录及本地文件，返回文件是否删除成功。
    /// 文件删除是尽力而为的，阅读进度随外键级联删除。
    pub async fn delete_book(&self, id: i64) -> Result<bool> {
        let item = self
            .library
            .get_item_by_id(id)
            .await?
            .ok_or(Error::LibraryItemNotFound(id))?;

        // 先删记录，记录删除失败时保留文件
        self.library.delete(id).await?;
        let file_deleted = item.delete_file();

        if let Some(cache) = &self.parse_cache {
            cache.invalidate(&item.file_path).await;
        }

        tracing::info!(
            "[delete_book] Deleted {} ({}), file removed: {}",
            item.title,
            id,
            file_deleted
        );
        Ok(file_deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::EpubBook;
    use std::sync::Arc;

    fn temp_book(name: &str) -> String {
        let mut path = std::env::temp_dir();
        path.push(format!("goread_library_{}_{}", std::process::id(), name));
        std::fs::write(&path, b"epub bytes").unwrap();
        path.to_string_lossy().to_string()
    }

    #[tokio::test]
    async fn test_add_and_list_books() {
        let db = Database::in_memory().await.unwrap();
        let library = Library::new(&db);

        library.add_book("Ulysses", "James Joyce", "/books/ulysses.epub").await.unwrap();
        library.add_book("Dubliners", "James Joyce", "/books/dubliners.epub").await.unwrap();

        let titles: Vec<String> = library.books().await.unwrap().into_iter().map(|b| b.title).collect();
        assert_eq!(titles, vec!["Dubliners", "Ulysses"]);
    }

    #[tokio::test]
    async fn test_continue_reading() {
        let db = Database::in_memory().await.unwrap();
        let library = Library::new(&db);

        let read = library.add_book("Ulysses", "James Joyce", "/books/ulysses.epub").await.unwrap();
        library.add_book("Dubliners", "James Joyce", "/books/dubliners.epub").await.unwrap();
        let progress = ReaderItem::new(read.id, 4, 12);
        db.reader().insert(&progress).await.unwrap();

        let entries = library.continue_reading().await.unwrap();
        assert_eq!(entries, vec![ContinueReading { item: read, progress }]);
    }

    #[tokio::test]
    async fn test_delete_book_removes_file_and_progress() {
        let db = Database::in_memory().await.unwrap();
        let cache = EpubCache::new(4);
        let library = Library::new(&db).with_parse_cache(cache.clone());

        let path = temp_book("delete.epub");
        let item = library.add_book("Ulysses", "James Joyce", &path).await.unwrap();
        db.reader().insert(&ReaderItem::new(item.id, 2, 0)).await.unwrap();
        cache
            .put(
                &path,
                Arc::new(EpubBook {
                    file_path: path.clone(),
                    title: "Ulysses".to_string(),
                    authors: "James Joyce".to_string(),
                    language: None,
                    cover_image: None,
                    chapters: Vec::new(),
                }),
            )
            .await;

        assert!(library.delete_book(item.id).await.unwrap());
        assert!(!item.file_exists());
        assert!(library.books().await.unwrap().is_empty());
        assert_eq!(db.reader().get_reader_item(item.id).await.unwrap(), None);
        assert!(cache.get(&path).await.is_none());
    }

    #[tokio::test]
    async fn test_delete_book_with_missing_file() {
        let db = Database::in_memory().await.unwrap();
        let library = Library::new(&db);

        let item = library
            .add_book("Ulysses", "James Joyce", "/nonexistent/ulysses.epub")
            .await
            .unwrap();

        assert!(!library.delete_book(item.id).await.unwrap());
        assert!(library.books().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_row_delete_keeps_file() {
        let db = Database::in_memory().await.unwrap();
        let library = Library::new(&db);

        let path = temp_book("keep.epub");
        let item = library.add_book("Ulysses", "James Joyce", &path).await.unwrap();
        sqlx::query(
            "CREATE TRIGGER block_library_delete BEFORE DELETE ON library
             BEGIN SELECT RAISE(ABORT, 'library is read-only'); END",
        )
        .execute(db.pool())
        .await
        .unwrap();

        assert!(matches!(library.delete_book(item.id).await, Err(Error::Database(_))));
        assert!(item.file_exists());
        assert_eq!(library.books().await.unwrap(), vec![item.clone()]);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_delete_unknown_book() {
        let db = Database::in_memory().await.unwrap();
        let library = Library::new(&db);

        let err = library.delete_book(42).await.unwrap_err();
        assert!(matches!(err, Error::LibraryItemNotFound(42)));
    }
}
