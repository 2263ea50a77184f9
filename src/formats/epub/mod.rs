pub mod cache;
pub mod engine;

pub use cache::EpubCache;
pub use engine::{html_to_text, parse_epub};

use std::sync::Arc;
use tokio::task;

use super::{BookParser, BoxFuture, EpubBook};
use crate::error::{Error, Result};

/// 基于 epub crate 的解析器，解析在阻塞线程池中进行
#[derive(Clone)]
pub struct EpubParser {
    cache: EpubCache,
}

impl EpubParser {
    pub fn new(cache_capacity: u64) -> Self {
        Self {
            cache: EpubCache::new(cache_capacity),
        }
    }

    pub fn cache(&self) -> &EpubCache {
        &self.cache
    }
}

impl BookParser for EpubParser {
    fn parse<'a>(&'a self, file_path: &'a str) -> BoxFuture<'a, Result<Arc<EpubBook>>> {
        Box::pin(async move {
            if let Some(book) = self.cache.get(file_path).await {
                tracing::debug!("[epub] Cache hit for {}", file_path);
                return Ok(book);
            }

            let path = file_path.to_string();
            let book = task::spawn_blocking(move || parse_epub(&path))
                .await
                .map_err(|e| Error::Parse(format!("解析任务失败: {}", e)))??;

            tracing::info!(
                "[epub] Parsed {} ({} chapters)",
                file_path,
                book.chapters.len()
            );

            let book = Arc::new(book);
            self.cache.put(file_path, book.clone()).await;
            Ok(book)
        })
    }
}
