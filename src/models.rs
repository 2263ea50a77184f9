use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::formats::common::{file_exists, format_size, get_file_size};

/// 已下载到本地的书籍
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct LibraryItem {
    pub id: i64,
    pub title: String,
    pub authors: String,
    pub file_path: String,
    pub created_at: i64, // Unix timestamp (ms)
}

impl LibraryItem {
    pub fn file_exists(&self) -> bool {
        file_exists(&self.file_path)
    }

    /// 文件不存在时返回 "0 B"
    pub fn file_size(&self) -> String {
        format_size(get_file_size(&self.file_path).unwrap_or(0))
    }

    /// 以本地时区格式化创建时间，如 07 Mar 2024
    pub fn formatted_date(&self) -> String {
        self.formatted_date_in(&Local)
    }

    pub fn formatted_date_in<Tz: TimeZone>(&self, tz: &Tz) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        match tz.timestamp_millis_opt(self.created_at).single() {
            Some(time) => time.format("%d %b %Y").to_string(),
            None => String::new(),
        }
    }

    /// 删除本地书籍文件，失败时只记录日志并返回 false
    pub fn delete_file(&self) -> bool {
        match std::fs::remove_file(&self.file_path) {
            Ok(_) => {
                tracing::info!("[delete_file] Successfully deleted local file: {}", self.file_path);
                true
            }
            Err(e) => {
                tracing::warn!("[delete_file] Failed to delete local file {}: {}", self.file_path, e);
                false
            }
        }
    }
}

/// 阅读进度，每本书最多一条
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ReaderItem {
    pub library_item_id: i64,
    pub last_chapter_index: u32,
    pub last_chapter_offset: i64,
    pub updated_at: i64, // Unix timestamp (ms)
}

impl ReaderItem {
    pub fn new(library_item_id: i64, last_chapter_index: u32, last_chapter_offset: i64) -> Self {
        Self {
            library_item_id,
            last_chapter_index,
            last_chapter_offset,
            updated_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// 按已读章节计算的百分比进度
    pub fn progress_percent(&self, total_chapters: usize) -> f32 {
        if total_chapters == 0 {
            return 0.0;
        }
        let read = self.last_chapter_index as f32 + 1.0;
        (read / total_chapters as f32 * 100.0).min(100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::path::PathBuf;

    fn temp_book_path(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("goread_models_{}_{}", std::process::id(), name));
        path
    }

    fn item_for(path: &PathBuf) -> LibraryItem {
        LibraryItem {
            id: 1,
            title: "Frankenstein".to_string(),
            authors: "Mary Shelley".to_string(),
            file_path: path.to_string_lossy().to_string(),
            created_at: 1_709_800_000_000,
        }
    }

    #[test]
    fn test_formatted_date() {
        let item = item_for(&temp_book_path("date.epub"));
        assert_eq!(item.formatted_date_in(&Utc), "07 Mar 2024");
    }

    #[test]
    fn test_file_helpers() {
        let path = temp_book_path("helpers.epub");
        std::fs::write(&path, vec![0u8; 1500]).unwrap();
        let item = item_for(&path);

        assert!(item.file_exists());
        assert_eq!(item.file_size(), "1.5 kB");
        assert!(item.delete_file());
        assert!(!item.file_exists());
        assert_eq!(item.file_size(), "0 B");
    }

    #[test]
    fn test_delete_missing_file_returns_false() {
        let item = item_for(&temp_book_path("missing.epub"));
        assert!(!item.delete_file());
    }

    #[test]
    fn test_progress_percent() {
        let item = ReaderItem::new(1, 4, 0);
        assert_eq!(item.progress_percent(10), 50.0);
        assert_eq!(item.progress_percent(0), 0.0);
        assert_eq!(item.progress_percent(3), 100.0);
    }
}
