use std::path::Path;

use epub::doc::{EpubDoc, NavPoint};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};
use crate::formats::common::get_extension;
use crate::formats::{EpubBook, EpubChapter};

static HEAD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<head[^>]*>.*?</head>").unwrap());

static SCRIPT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<(script|style)[^>]*>.*?</(script|style)>").unwrap());

/// 块级结束标签和 <br> 视为段落分隔
static BLOCK_END_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)</(p|div|h[1-6]|li|blockquote|tr|section)\s*>|<br\s*/?>").unwrap()
});

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());

static NUMERIC_ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&#([xX]?)([0-9a-fA-F]+);").unwrap());

static SPACES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

fn decode_entities(text: &str) -> String {
    let decoded = NUMERIC_ENTITY_RE.replace_all(text, |caps: &regex::Captures| {
        let radix = if caps[1].is_empty() { 10 } else { 16 };
        u32::from_str_radix(&caps[2], radix)
            .ok()
            .and_then(char::from_u32)
            .map(|c| c.to_string())
            .unwrap_or_default()
    });

    decoded
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// 将章节 HTML 转为以空行分隔的纯文本段落
pub fn html_to_text(html: &str) -> String {
    let text = HEAD_RE.replace_all(html, "");
    let text = SCRIPT_RE.replace_all(&text, "");
    let text = SPACES_RE.replace_all(&text, " ");
    let text = BLOCK_END_RE.replace_all(&text, "\n");
    let text = TAG_RE.replace_all(&text, "");
    let text = decode_entities(&text);

    text.lines()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn extract_metadata<R: std::io::Read + std::io::Seek>(
    doc: &mut EpubDoc<R>,
) -> (Option<String>, Option<String>, Option<String>) {
    let title = doc.mdata("title").map(|m| m.value.clone());
    let author = doc.mdata("creator").map(|m| m.value.clone());
    let language = doc
        .mdata("language")
        .or_else(|| doc.mdata("dc:language"))
        .map(|m| m.value.clone());

    (title, author, language)
}

fn extract_cover_data<R: std::io::Read + std::io::Seek>(doc: &mut EpubDoc<R>) -> Option<String> {
    use base64::{engine::general_purpose, Engine as _};

    let (bytes, mime) = match doc.get_cover() {
        Some((bytes, mime)) if !bytes.is_empty() => (bytes, mime),
        _ => return None,
    };

    let encoded = general_purpose::STANDARD.encode(&bytes);
    Some(format!("data:{};base64,{}", mime, encoded))
}

/// 去掉 href 中的锚点部分
fn strip_fragment(location: &str) -> &str {
    location.split('#').next().unwrap_or(location)
}

/// 在目录树中查找指向该章节文件的标题
fn find_toc_title(navpoints: &[NavPoint], section_path: &str) -> Option<String> {
    for np in navpoints {
        let content = np.content.to_string_lossy();
        let target = strip_fragment(&content);
        if !np.label.is_empty()
            && !target.is_empty()
            && (section_path.ends_with(target) || target.ends_with(section_path))
        {
            return Some(np.label.trim().to_string());
        }
        if let Some(title) = find_toc_title(&np.children, section_path) {
            return Some(title);
        }
    }
    None
}

fn extract_chapters<R: std::io::Read + std::io::Seek>(
    doc: &mut EpubDoc<R>,
) -> Result<Vec<EpubChapter>> {
    let total = doc.get_num_chapters() as u32;
    let mut chapters = Vec::with_capacity(total as usize);

    for index in 0..total {
        if !doc.set_current_page(index as usize) {
            return Err(Error::Parse(format!("设置章节 {} 失败", index)));
        }

        let section_path = doc
            .get_current_path()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        let bytes = doc
            .get_current_with_epub_uris()
            .map_err(|e| Error::Parse(format!("读取章节 {} 内容失败: {}", index, e)))?;
        let html = String::from_utf8_lossy(&bytes);

        let title = find_toc_title(&doc.toc, &section_path)
            .unwrap_or_else(|| format!("Chapter {}", index + 1));

        chapters.push(EpubChapter {
            index,
            title,
            body: html_to_text(&html),
        });
    }

    Ok(chapters)
}

/// 同步解析 EPUB，调用方负责放到阻塞线程池
pub fn parse_epub(file_path: &str) -> Result<EpubBook> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(Error::Parse(format!("EPUB 文件不存在: {}", file_path)));
    }
    if get_extension(file_path).as_deref() != Some("epub") {
        return Err(Error::Parse(format!("不支持的书籍格式: {}", file_path)));
    }

    let mut doc =
        EpubDoc::new(file_path).map_err(|e| Error::Parse(format!("打开 EPUB 失败: {}", e)))?;

    let (title, author, language) = extract_metadata(&mut doc);
    let cover_image = extract_cover_data(&mut doc);
    let chapters = extract_chapters(&mut doc)?;

    Ok(EpubBook {
        file_path: file_path.to_string(),
        title: title.unwrap_or_default(),
        authors: author.unwrap_or_default(),
        language,
        cover_image,
        chapters,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_to_text_paragraphs() {
        let html = r#"<html><head><title>Ignored</title><style>p { color: red; }</style></head>
            <body><h1>Letter 1</h1><p>You will rejoice to hear</p><p>that no disaster&nbsp;has
            accompanied</p></body></html>"#;

        assert_eq!(
            html_to_text(html),
            "Letter 1\n\nYou will rejoice to hear\n\nthat no disaster has accompanied"
        );
    }

    #[test]
    fn test_html_to_text_entities() {
        assert_eq!(
            html_to_text("<p>Tom &amp; Jerry &#8212; &#x41;&lt;b&gt;</p>"),
            "Tom & Jerry \u{2014} A<b>"
        );
    }

    #[test]
    fn test_html_to_text_line_breaks() {
        assert_eq!(html_to_text("one<br/>two<br>three"), "one\n\ntwo\n\nthree");
    }

    #[test]
    fn test_strip_fragment() {
        assert_eq!(strip_fragment("OEBPS/ch1.xhtml#start"), "OEBPS/ch1.xhtml");
        assert_eq!(strip_fragment("OEBPS/ch1.xhtml"), "OEBPS/ch1.xhtml");
    }

    #[test]
    fn test_parse_missing_file() {
        let err = parse_epub("/nonexistent/book.epub").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_parse_rejects_other_formats() {
        let mut path = std::env::temp_dir();
        path.push(format!("goread_engine_{}.txt", std::process::id()));
        std::fs::write(&path, "plain text").unwrap();

        let err = parse_epub(&path.to_string_lossy()).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_parse_corrupt_archive() {
        let mut path = std::env::temp_dir();
        path.push(format!("goread_engine_{}.epub", std::process::id()));
        std::fs::write(&path, b"not a zip archive").unwrap();

        let err = parse_epub(&path.to_string_lossy()).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));

        let _ = std::fs::remove_file(&path);
    }
}
