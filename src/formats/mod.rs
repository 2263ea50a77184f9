use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::Result;

pub mod common;
pub mod epub;

/// 通用异步返回类型，统一封装书籍解析相关的异步接口
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// 书籍解析接口，不关心具体实现（测试中可替换为桩实现）
pub trait BookParser: Send + Sync {
    /// 解析指定路径的书籍，失败时返回 Error::Parse
    fn parse<'a>(&'a self, file_path: &'a str) -> BoxFuture<'a, Result<Arc<EpubBook>>>;
}

/// 已解析的书籍内容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpubBook {
    pub file_path: String,
    pub title: String,
    pub authors: String,
    pub language: Option<String>,
    /// data URL 格式的封面
    pub cover_image: Option<String>,
    pub chapters: Vec<EpubChapter>,
}

impl EpubBook {
    pub fn is_last_chapter(&self, chapter_index: u32) -> bool {
        !self.chapters.is_empty() && chapter_index as usize == self.chapters.len() - 1
    }
}

/// 按 spine 顺序排列的章节，body 为纯文本段落
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpubChapter {
    pub index: u32,
    pub title: String,
    pub body: String,
}
