pub mod config;
pub mod db;
pub mod error;
pub mod formats;
pub mod library;
pub mod logging;
pub mod models;
pub mod reader;

pub use config::ReaderConfig;
pub use db::Database;
pub use error::{Error, Result};
pub use formats::epub::EpubParser;
pub use formats::{BookParser, EpubBook, EpubChapter};
pub use library::{ContinueReading, Library};
pub use models::{LibraryItem, ReaderItem};
pub use reader::{ReaderFont, ReaderScreenState, ReaderViewModel};

use std::sync::Arc;

/// 应用级共享状态：数据库连接与 EPUB 解析器
#[derive(Clone)]
pub struct Shelf {
    config: ReaderConfig,
    db: Database,
    parser: Arc<EpubParser>,
}

impl Shelf {
    pub async fn open(config: ReaderConfig) -> Result<Self> {
        let db = Database::open(&config).await?;
        let parser = Arc::new(EpubParser::new(config.parse_cache_capacity));
        Ok(Self { config, db, parser })
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn library(&self) -> Library {
        Library::new(&self.db).with_parse_cache(self.parser.cache().clone())
    }

    /// 每次打开阅读界面创建一个新的状态持有者
    pub fn reader_view_model(&self) -> ReaderViewModel {
        ReaderViewModel::from_database(&self.db, self.parser.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_shelf() {
        let mut data_dir = std::env::temp_dir();
        data_dir.push(format!("goread_shelf_{}", std::process::id()));
        let config = ReaderConfig {
            data_dir: data_dir.clone(),
            ..ReaderConfig::default()
        };

        let shelf = Shelf::open(config).await.unwrap();
        let item = shelf
            .library()
            .add_book("Middlemarch", "George Eliot", "/nonexistent/middlemarch.epub")
            .await
            .unwrap();

        let vm = shelf.reader_view_model();
        assert!(matches!(vm.load_book(item.id).await, Err(Error::Parse(_))));

        shelf.database().pool().close().await;
        let _ = std::fs::remove_dir_all(&data_dir);
    }
}
