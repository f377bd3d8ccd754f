use async_trait::async_trait;
use futures_util::future::join_all;
use tracing::debug;

use super::MangaSource;
use super::parser::ResolvedAddress;
use crate::chapter::ChapterId;

/// 章节页数统计策略。探测过程中的任何网络失败都按"页面不存在"处理。
#[async_trait]
pub trait PageCounter: Send + Sync {
    async fn count(
        &self,
        source: &dyn MangaSource,
        address: &ResolvedAddress,
        slug: &str,
        chapter: &ChapterId,
    ) -> usize;
}

/// 从第 1 页起逐页探测，遇到第一个缺页即停止。
/// 结果只统计连续存在的页，不受后面零散页的影响。
pub struct SequentialProbe;

#[async_trait]
impl PageCounter for SequentialProbe {
    async fn count(
        &self,
        source: &dyn MangaSource,
        address: &ResolvedAddress,
        slug: &str,
        chapter: &ChapterId,
    ) -> usize {
        let mut page = 1u32;
        while source
            .page_exists(&address.image_url(slug, chapter, page))
            .await
        {
            page += 1;
        }
        let count = (page - 1) as usize;
        debug!("章节 {} 逐页探测到 {} 页", chapter, count);
        count
    }
}

/// 并发探测 1..=upper_bound，统计存在的页数。
/// 延迟更低，但多发一批探测请求，且假设所有页码不超过上限。
pub struct ParallelProbe {
    pub upper_bound: u32,
}

#[async_trait]
impl PageCounter for ParallelProbe {
    async fn count(
        &self,
        source: &dyn MangaSource,
        address: &ResolvedAddress,
        slug: &str,
        chapter: &ChapterId,
    ) -> usize {
        let probes = (1..=self.upper_bound).map(|page| {
            let url = address.image_url(slug, chapter, page);
            async move { source.page_exists(&url).await }
        });
        let count = join_all(probes)
            .await
            .into_iter()
            .filter(|exists| *exists)
            .count();
        debug!("章节 {} 并发探测到 {} 页", chapter, count);
        count
    }
}
