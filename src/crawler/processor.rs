use std::path::PathBuf;

use anyhow::Result;
use async_zip::tokio::write::ZipFileWriter;
use async_zip::{Compression, ZipEntryBuilder};
use bytes::Bytes;
use tokio::fs::{self, File};
use tracing::{info, instrument};

use crate::chapter::ChapterId;
use crate::config::OutputFormat;

/// 章节产物落盘。接受不完整的页序列，只写成功下载的页。
pub struct Processor {
    manga_dir: PathBuf,
    format: OutputFormat,
}

impl Processor {
    pub fn new(manga_dir: PathBuf, format: OutputFormat) -> Self {
        Self { manga_dir, format }
    }

    /// 按下载顺序把页写成 001.png、002.png…，返回产物路径。
    #[instrument(skip_all, fields(%chapter))]
    pub async fn write_chapter(&self, chapter: &ChapterId, pages: &[Bytes]) -> Result<PathBuf> {
        match self.format {
            OutputFormat::Folder => self.write_folder(chapter, pages).await,
            OutputFormat::Cbz => self.write_cbz(chapter, pages).await,
        }
    }

    async fn write_folder(&self, chapter: &ChapterId, pages: &[Bytes]) -> Result<PathBuf> {
        let chapter_dir = self.manga_dir.join(format!("Chapter-{}", chapter));
        fs::create_dir_all(&chapter_dir).await?;

        for (index, page) in pages.iter().enumerate() {
            let path = chapter_dir.join(format!("{:03}.png", index + 1));
            fs::write(&path, page).await?;
        }

        info!("章节已保存到: {}", chapter_dir.display());
        Ok(chapter_dir)
    }

    async fn write_cbz(&self, chapter: &ChapterId, pages: &[Bytes]) -> Result<PathBuf> {
        fs::create_dir_all(&self.manga_dir).await?;
        let cbz_path = self.manga_dir.join(format!("Chapter-{}.cbz", chapter));

        let file = File::create(&cbz_path).await?;
        let mut writer = ZipFileWriter::with_tokio(file);
        for (index, page) in pages.iter().enumerate() {
            let entry =
                ZipEntryBuilder::new(format!("{:03}.png", index + 1).into(), Compression::Deflate);
            writer.write_entry_whole(entry, page.as_ref()).await?;
        }
        writer.close().await?;

        info!("章节已保存到: {}", cbz_path.display());
        Ok(cbz_path)
    }
}
