//! 阅读器界面状态持有者
//!
//! 负责加载书籍与阅读进度、发布界面状态，以及在阅读位置变化时
//! 插入、更新或删除进度记录。界面通过 [`ReaderViewModel::subscribe`]
//! 观察状态，所有写入都由本模块完成。

pub mod font;
pub mod state;

pub use font::ReaderFont;
pub use state::ReaderScreenState;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinSet;

use crate::db::preferences::{READER_FONT_SIZE, READER_FONT_STYLE};
use crate::db::{Database, LibraryDao, Preferences, ReaderDao};
use crate::error::{Error, Result};
use crate::formats::BookParser;
use crate::models::ReaderItem;

/// 字号以百分比保存
pub const DEFAULT_FONT_SIZE: i64 = 100;
pub const MIN_FONT_SIZE: i64 = 50;
pub const MAX_FONT_SIZE: i64 = 200;

struct Inner {
    library: LibraryDao,
    reader: ReaderDao,
    preferences: Preferences,
    parser: Arc<dyn BookParser>,
    state: watch::Sender<ReaderScreenState>,
    /// 进度写入的发起序号，按调用顺序递增
    next_progress_seq: AtomicU64,
    /// 串行化进度写入，保存最后一次已应用的序号
    applied_progress_seq: Mutex<u64>,
}

impl Inner {
    async fn load_book(&self, library_item_id: i64) -> Result<ReaderScreenState> {
        self.state.send_modify(|state| state.is_loading = true);

        let library_item = self
            .library
            .get_item_by_id(library_item_id)
            .await?
            .ok_or(Error::LibraryItemNotFound(library_item_id))?;
        let reader_item = self.reader.get_reader_item(library_item_id).await?;
        let epub_book = self.parser.parse(&library_item.file_path).await?;

        tracing::info!(
            "[reader] Loaded book {} ({} chapters, progress: {:?})",
            library_item_id,
            epub_book.chapters.len(),
            reader_item.as_ref().map(|r| r.last_chapter_index)
        );

        self.state.send_modify(|state| {
            state.is_loading = false;
            state.library_item_id = Some(library_item_id);
            state.epub_book = Some(epub_book);
            state.reader_item = reader_item;
        });
        let published = self.state.borrow().clone();
        Ok(published)
    }

    fn next_progress_seq(&self) -> u64 {
        self.next_progress_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// `seq` 小于已应用序号的写入已过期，直接跳过
    async fn update_progress(
        &self,
        seq: u64,
        library_item_id: i64,
        chapter_index: u32,
        chapter_offset: i64,
    ) -> Result<Option<ReaderItem>> {
        let (loaded_id, epub_book) = {
            let state = self.state.borrow();
            (state.library_item_id, state.epub_book.clone())
        };
        let epub_book = match (loaded_id, epub_book) {
            (Some(id), Some(book)) if id == library_item_id => book,
            _ => return Err(Error::BookNotLoaded),
        };

        let mut applied = self.applied_progress_seq.lock().await;
        if seq < *applied {
            tracing::debug!(
                "[reader] Skipped stale progress {}:{} for book {}",
                chapter_index,
                chapter_offset,
                library_item_id
            );
            let current = self.state.borrow().reader_item.clone();
            return Ok(current);
        }
        *applied = seq;

        let reader_item = if epub_book.is_last_chapter(chapter_index) {
            // 读到最后一章视为读完，不再保留进度
            self.reader.delete(library_item_id).await?;
            tracing::debug!("[reader] Book {} finished, progress cleared", library_item_id);
            None
        } else {
            let item = ReaderItem::new(library_item_id, chapter_index, chapter_offset);
            self.reader.upsert(&item).await?;
            tracing::debug!(
                "[reader] Book {} progress saved at {}:{}",
                library_item_id,
                chapter_index,
                chapter_offset
            );
            Some(item)
        };

        self.state
            .send_modify(|state| state.reader_item = reader_item.clone());
        Ok(reader_item)
    }
}

/// 一次阅读会话的状态持有者。
///
/// 后台任务归属于内部的 `JoinSet`，持有者被丢弃（界面销毁）时未完成的任务随之取消。
/// 每次派发新任务前会回收已结束的任务，错误已在任务内记录日志。
pub struct ReaderViewModel {
    inner: Arc<Inner>,
    tasks: JoinSet<Result<()>>,
}

impl ReaderViewModel {
    pub fn new(
        library: LibraryDao,
        reader: ReaderDao,
        preferences: Preferences,
        parser: Arc<dyn BookParser>,
    ) -> Self {
        let (state, _) = watch::channel(ReaderScreenState::default());
        Self {
            inner: Arc::new(Inner {
                library,
                reader,
                preferences,
                parser,
                state,
                next_progress_seq: AtomicU64::new(0),
                applied_progress_seq: Mutex::new(0),
            }),
            tasks: JoinSet::new(),
        }
    }

    pub fn from_database(db: &Database, parser: Arc<dyn BookParser>) -> Self {
        Self::new(db.library(), db.reader(), db.preferences(), parser)
    }

    pub fn subscribe(&self) -> watch::Receiver<ReaderScreenState> {
        self.inner.state.subscribe()
    }

    /// 当前状态快照
    pub fn state(&self) -> ReaderScreenState {
        self.inner.state.borrow().clone()
    }

    /// 加载书籍及其进度，返回发布后的状态。
    /// 书籍记录不存在或解析失败时直接返回错误，状态保持加载中。
    pub async fn load_book(&self, library_item_id: i64) -> Result<ReaderScreenState> {
        self.inner.load_book(library_item_id).await
    }

    /// 根据当前阅读位置写入进度：最后一章删除记录，否则插入或覆盖。
    /// `library_item_id` 必须是已加载的书籍，否则返回 `BookNotLoaded`。
    pub async fn update_progress(
        &self,
        library_item_id: i64,
        chapter_index: u32,
        chapter_offset: i64,
    ) -> Result<Option<ReaderItem>> {
        let seq = self.inner.next_progress_seq();
        self.inner
            .update_progress(seq, library_item_id, chapter_index, chapter_offset)
            .await
    }

    pub fn launch_load(&mut self, library_item_id: i64) {
        self.reap_finished();
        let inner = self.inner.clone();
        self.tasks.spawn(async move {
            inner.load_book(library_item_id).await.map(|_| ()).map_err(|e| {
                tracing::error!("[reader] Failed to load book {}: {}", library_item_id, e);
                e
            })
        });
    }

    pub fn launch_update_progress(
        &mut self,
        library_item_id: i64,
        chapter_index: u32,
        chapter_offset: i64,
    ) {
        self.reap_finished();
        let inner = self.inner.clone();
        // 序号在派发时确定，后发起的进度不会被先发起的覆盖
        let seq = inner.next_progress_seq();
        self.tasks.spawn(async move {
            inner
                .update_progress(seq, library_item_id, chapter_index, chapter_offset)
                .await
                .map(|_| ())
                .map_err(|e| {
                    tracing::error!(
                        "[reader] Failed to update progress for book {}: {}",
                        library_item_id,
                        e
                    );
                    e
                })
        });
    }

    /// 未回收的后台任务数量
    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    fn reap_finished(&mut self) {
        while let Some(joined) = self.tasks.try_join_next() {
            if let Err(e) = joined {
                tracing::warn!("[reader] Background task ended abnormally: {}", e);
            }
        }
    }

    /// 等待下一个后台任务结束，没有任务时返回 None
    pub async fn join_next(&mut self) -> Option<Result<()>> {
        let joined = self.tasks.join_next().await?;
        Some(joined.unwrap_or_else(|e| Err(Error::Task(e.to_string()))))
    }

    pub fn toggle_reader_menu(&self) {
        self.inner
            .state
            .send_modify(|state| state.show_reader_menu = !state.show_reader_menu);
    }

    pub fn show_reader_menu(&self) {
        self.inner
            .state
            .send_modify(|state| state.show_reader_menu = true);
    }

    pub fn hide_reader_menu(&self) {
        self.inner
            .state
            .send_modify(|state| state.show_reader_menu = false);
    }

    pub async fn font_size(&self) -> Result<i64> {
        let size = self.inner.preferences.get_int(READER_FONT_SIZE).await?;
        Ok(size
            .map(|s| s.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE))
            .unwrap_or(DEFAULT_FONT_SIZE))
    }

    /// 超出范围的字号会被截断，返回实际保存的值
    pub async fn set_font_size(&self, size: i64) -> Result<i64> {
        let size = size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
        self.inner.preferences.put_int(READER_FONT_SIZE, size).await?;
        Ok(size)
    }

    pub async fn reader_font(&self) -> Result<ReaderFont> {
        let id = self.inner.preferences.get_string(READER_FONT_STYLE).await?;
        Ok(id.map(|id| ReaderFont::by_id(&id)).unwrap_or_default())
    }

    pub async fn set_reader_font(&self, font: ReaderFont) -> Result<()> {
        self.inner
            .preferences
            .put_string(READER_FONT_STYLE, font.id())
            .await
    }
}
