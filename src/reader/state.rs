use serde::Serialize;
use std::sync::Arc;

use crate::formats::EpubBook;
use crate::models::ReaderItem;

/// 阅读界面状态，不持久化，每次打开阅读器重新创建
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReaderScreenState {
    pub is_loading: bool,
    pub show_reader_menu: bool,
    /// 当前已加载书籍的 id
    pub library_item_id: Option<i64>,
    pub epub_book: Option<Arc<EpubBook>>,
    pub reader_item: Option<ReaderItem>,
}

impl Default for ReaderScreenState {
    fn default() -> Self {
        Self {
            is_loading: true,
            show_reader_menu: false,
            library_item_id: None,
            epub_book: None,
            reader_item: None,
        }
    }
}
