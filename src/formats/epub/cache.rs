//! 已解析书籍的内存缓存
//! 以文件路径为键，重复打开同一本书时跳过解析

use moka::future::Cache;
use std::sync::Arc;

use crate::formats::EpubBook;

#[derive(Clone)]
pub struct EpubCache {
    books: Cache<String, Arc<EpubBook>>,
}

impl EpubCache {
    pub fn new(capacity: u64) -> Self {
        Self {
            books: Cache::new(capacity),
        }
    }

    pub async fn get(&self, file_path: &str) -> Option<Arc<EpubBook>> {
        self.books.get(file_path).await
    }

    pub async fn put(&self, file_path: &str, book: Arc<EpubBook>) {
        self.books.insert(file_path.to_string(), book).await;
    }

    /// 书籍文件被删除后调用
    pub async fn invalidate(&self, file_path: &str) {
        self.books.invalidate(file_path).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_book(file_path: &str) -> Arc<EpubBook> {
        Arc::new(EpubBook {
            file_path: file_path.to_string(),
            title: "Walden".to_string(),
            authors: "Henry David Thoreau".to_string(),
            language: Some("en".to_string()),
            cover_image: None,
            chapters: Vec::new(),
        })
    }

    #[tokio::test]
    async fn test_put_get_invalidate() {
        let cache = EpubCache::new(4);
        let path = "/books/walden.epub";

        assert!(cache.get(path).await.is_none());

        cache.put(path, sample_book(path)).await;
        let cached = cache.get(path).await.unwrap();
        assert_eq!(cached.title, "Walden");

        cache.invalidate(path).await;
        assert!(cache.get(path).await.is_none());
    }
}
