//! 运行配置：数据目录、数据库文件与解析缓存容量

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// 默认数据目录（基于系统临时目录）
fn default_data_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push("goread_shelf");
    dir
}

fn default_database_file() -> String {
    "goread.db".to_string()
}

fn default_parse_cache_capacity() -> u64 {
    8
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_database_file")]
    pub database_file: String,
    /// 内存中最多保留的已解析书籍数量
    #[serde(default = "default_parse_cache_capacity")]
    pub parse_cache_capacity: u64,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            database_file: default_database_file(),
            parse_cache_capacity: default_parse_cache_capacity(),
        }
    }
}

impl ReaderConfig {
    /// 从 JSON 文件读取配置，缺省字段使用默认值
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("读取配置 {} 失败: {}", path.display(), e)))?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_file)
    }

    /// sqlx 对 SQLite 推荐使用 sqlite:// 前缀，并使用正斜杠路径格式
    pub fn database_url(&self) -> String {
        let db_path_str = self.database_path().to_string_lossy().replace('\\', "/");
        format!("sqlite://{}?mode=rwc", db_path_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: ReaderConfig = serde_json::from_str(r#"{"data_dir": "/data/books"}"#).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/data/books"));
        assert_eq!(config.database_file, "goread.db");
        assert_eq!(config.parse_cache_capacity, 8);
    }

    #[test]
    fn test_database_url() {
        let config = ReaderConfig {
            data_dir: PathBuf::from("/data/books"),
            ..ReaderConfig::default()
        };
        assert_eq!(config.database_url(), "sqlite:///data/books/goread.db?mode=rwc");
    }

    #[test]
    fn test_load_missing_file() {
        let err = ReaderConfig::load("/nonexistent/goread.json").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
