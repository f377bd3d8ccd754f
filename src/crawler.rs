pub mod counter;
pub mod downloader;
pub mod parser;
pub mod processor;
pub mod task;
#[cfg(test)]
pub(crate) mod testing;

pub use counter::{PageCounter, ParallelProbe, SequentialProbe};
pub use downloader::{Downloader, FetchError};
pub use parser::{Parser, ResolvedAddress};
pub use processor::Processor;
pub use task::TaskManager;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use tracing::{info, instrument, warn};

use crate::chapter::ChapterId;
use crate::config::Config;
use crate::progress::Progress;
use crate::utils;

/// 站点访问入口。实现方保证：任何失败都不升级为致命错误，
/// 解析失败表现为 None，页面缺失表现为 false / FetchError。
#[async_trait]
pub trait MangaSource: Send + Sync {
    async fn resolve(&self, slug: &str, chapter: &ChapterId) -> Option<ResolvedAddress>;

    async fn page_exists(&self, url: &str) -> bool;

    async fn image(&self, url: &str) -> Result<Bytes, FetchError>;
}

/// 统计阶段的结果，与输入章节列表逐项对齐（重复章节各占一项）。
/// 总页数在任何图片下载开始前固定，作为进度分母。
pub struct JobSizing {
    counts: Vec<usize>,
    total: usize,
}

impl JobSizing {
    fn new(counts: Vec<usize>) -> Self {
        let total = counts.iter().sum();
        Self { counts, total }
    }

    pub fn total_pages(&self) -> usize {
        self.total
    }

    pub fn count(&self, index: usize) -> usize {
        self.counts.get(index).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> impl Iterator<Item = usize> + '_ {
        self.counts.iter().copied()
    }

    /// 列表顺序中位于 index 之前的章节页数之和，作该章的进度起点。
    pub fn offset_before(&self, index: usize) -> usize {
        self.counts[..index].iter().sum()
    }
}

pub struct MangaCrawler<S = Downloader> {
    source: S,
    counter: Arc<dyn PageCounter>,
    processor: Processor,
    manga_name: String,
    slug: String,
}

impl MangaCrawler {
    pub fn new(config: &Config, raw_name: &str) -> Result<Self> {
        let source = Downloader::new(config.base_url.clone(), config.concurrency_limit)?;
        let manga_name = utils::apply_naming(raw_name, config.uppercase, config.keep_raw_name);
        let slug = utils::slugify(&manga_name);
        let manga_dir = PathBuf::from(&config.output_dir).join(&slug);
        Ok(Self {
            source,
            counter: config.counter(),
            processor: Processor::new(manga_dir, config.format),
            manga_name,
            slug,
        })
    }
}

impl<S> MangaCrawler<S>
where
    S: MangaSource + Clone + Send + Sync + 'static,
{
    pub fn from_parts(
        source: S,
        counter: Arc<dyn PageCounter>,
        processor: Processor,
        manga_name: &str,
    ) -> Self {
        let slug = utils::slugify(manga_name);
        Self {
            source,
            counter,
            processor,
            manga_name: manga_name.to_owned(),
            slug,
        }
    }

    pub fn manga_name(&self) -> &str {
        &self.manga_name
    }

    /// 统计阶段：并发解析各章地址并统计页数。
    /// 各章完成顺序不定，但返回值与输入列表逐项对齐；
    /// 不可用的章节计 0 页，照常出现在结果里。
    #[instrument(skip_all)]
    pub async fn size_chapters(&self, chapters: &[ChapterId]) -> Result<JobSizing> {
        info!("正在统计章节页数");
        let mut tasks = TaskManager::new();
        for (index, chapter) in chapters.iter().enumerate() {
            let source = self.source.clone();
            let counter = Arc::clone(&self.counter);
            let slug = self.slug.clone();
            let chapter = chapter.clone();
            tasks.spawn(async move {
                let count = match source.resolve(&slug, &chapter).await {
                    Some(address) => counter.count(&source, &address, &slug, &chapter).await,
                    None => {
                        warn!("章节 {} 地址解析失败，按 0 页处理", chapter);
                        0
                    }
                };
                (index, count)
            });
        }

        let mut counts = vec![0usize; chapters.len()];
        for (index, count) in tasks.wait().await? {
            counts[index] = count;
        }
        Ok(JobSizing::new(counts))
    }

    /// 下载阶段：按输入顺序逐章下载，非空产物交给 Processor 落盘。
    #[instrument(skip_all)]
    pub async fn download(&self, chapters: &[ChapterId], sizing: &JobSizing) -> Result<()> {
        let mut progress = (sizing.total_pages() > 0).then(|| Progress::new(sizing.total_pages()));

        for (index, chapter) in chapters.iter().enumerate() {
            let artifact = self
                .download_chapter(
                    chapter,
                    sizing.count(index),
                    sizing.offset_before(index),
                    &mut progress,
                )
                .await;
            if artifact.is_empty() {
                warn!("章节 {} 没有成功下载的页面，跳过保存", chapter);
                continue;
            }
            self.processor.write_chapter(chapter, &artifact).await?;
        }

        if let Some(progress) = &progress {
            progress.finish();
        }
        Ok(())
    }

    /// 单章流水线。地址在这里重新解析，不复用统计阶段的结果：
    /// 阅读页背后的图片主机不保证稳定。页按页码升序逐个下载，
    /// 失败的页跳过，进度只为成功页前进；该章解析失败时返回空产物，
    /// 其页数槽位不产生任何进度，分母保持不变。
    async fn download_chapter(
        &self,
        chapter: &ChapterId,
        pages: usize,
        offset: usize,
        progress: &mut Option<Progress>,
    ) -> Vec<Bytes> {
        let Some(address) = self.source.resolve(&self.slug, chapter).await else {
            warn!("章节 {} 地址解析失败，跳过", chapter);
            return Vec::new();
        };

        let mut artifact = Vec::with_capacity(pages);
        for page in 1..=pages as u32 {
            let url = address.image_url(&self.slug, chapter, page);
            match self.source.image(&url).await {
                Ok(bytes) => {
                    artifact.push(bytes);
                    if let Some(progress) = progress {
                        progress.report(offset + artifact.len());
                    }
                }
                Err(e) => warn!("章节 {} 第 {} 页下载失败: {}", chapter, page, e),
            }
        }
        artifact
    }
}
