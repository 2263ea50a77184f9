//! 书籍文件公共工具

use std::path::Path;

/// 十进制单位，1 kB = 1000 B
const SIZE_UNITS: [&str; 7] = ["B", "kB", "MB", "GB", "TB", "PB", "EB"];

/// 获取文件大小
pub fn get_file_size(path: &str) -> Result<u64, std::io::Error> {
    let metadata = std::fs::metadata(path)?;
    Ok(metadata.len())
}

/// 检查文件是否存在
pub fn file_exists(path: &str) -> bool {
    Path::new(path).exists()
}

/// 从路径提取扩展名
pub fn get_extension(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_lowercase())
}

/// 将字节数格式化为易读的大小，最多保留一位小数
pub fn format_size(bytes: u64) -> String {
    if bytes < 1000 {
        return format!("{} {}", bytes, SIZE_UNITS[0]);
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1000.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }

    let mut rounded = (value * 10.0).round() / 10.0;
    // 999.96 kB 四舍五入后为 1000 kB，进位到下一个单位
    if rounded >= 1000.0 && unit < SIZE_UNITS.len() - 1 {
        unit += 1;
        rounded = (rounded / 1000.0 * 10.0).round() / 10.0;
    }

    if rounded.fract() == 0.0 {
        format!("{} {}", rounded as u64, SIZE_UNITS[unit])
    } else {
        format!("{:.1} {}", rounded, SIZE_UNITS[unit])
    }
}
