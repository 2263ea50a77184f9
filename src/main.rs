// main.rs

use goread_shelf::{logging, ReaderConfig, Shelf};

#[tokio::main]
async fn main() -> goread_shelf::Result<()> {
    logging::init();

    // 可选参数：JSON 配置文件路径
    let config = match std::env::args().nth(1) {
        Some(path) => ReaderConfig::load(path)?,
        None => ReaderConfig::default(),
    };

    let shelf = Shelf::open(config).await?;
    let library = shelf.library();

    let books = library.books().await?;
    tracing::info!("[library] {} book(s)", books.len());
    for book in &books {
        tracing::info!(
            "[library] #{} {} - {} | {} | {}{}",
            book.id,
            book.title,
            book.authors,
            book.file_size(),
            book.formatted_date(),
            if book.file_exists() { "" } else { " (missing)" }
        );
    }

    for entry in library.continue_reading().await? {
        tracing::info!(
            "[continue] {} at chapter {}",
            entry.item.title,
            entry.progress.last_chapter_index + 1
        );
    }

    Ok(())
}
