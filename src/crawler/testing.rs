use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;

use super::parser::ResolvedAddress;
use super::{FetchError, MangaSource};
use crate::chapter::ChapterId;

/// 预置站点数据的内存实现，用于不经网络的流程测试。
/// 图片内容即其 URL 的字节，方便断言顺序。
#[derive(Clone, Default)]
pub(crate) struct FakeSource {
    addresses: HashMap<String, String>,
    pages: HashSet<String>,
    failing: HashSet<String>,
    image_requests: Arc<Mutex<Vec<String>>>,
}

impl FakeSource {
    /// 注册一个可解析的章节，页 1..=pages 均存在。
    pub fn with_chapter(mut self, chapter: &ChapterId, host: &str, slug: &str, pages: u32) -> Self {
        self.addresses.insert(chapter.to_string(), host.to_owned());
        let address = ResolvedAddress::new(host);
        for page in 1..=pages {
            self.pages.insert(address.image_url(slug, chapter, page));
        }
        self
    }

    /// 在连续页之外补一个孤立存在的页。
    pub fn with_extra_page(
        mut self,
        chapter: &ChapterId,
        host: &str,
        slug: &str,
        page: u32,
    ) -> Self {
        self.addresses
            .entry(chapter.to_string())
            .or_insert_with(|| host.to_owned());
        self.pages
            .insert(ResolvedAddress::new(host).image_url(slug, chapter, page));
        self
    }

    /// 页面在探测时存在，但下载必定失败。
    pub fn with_broken_page(
        mut self,
        chapter: &ChapterId,
        host: &str,
        slug: &str,
        page: u32,
    ) -> Self {
        let url = ResolvedAddress::new(host).image_url(slug, chapter, page);
        self.failing.insert(url);
        self
    }

    pub fn image_request_count(&self) -> usize {
        self.image_requests.lock().unwrap().len()
    }
}

#[async_trait]
impl MangaSource for FakeSource {
    async fn resolve(&self, _slug: &str, chapter: &ChapterId) -> Option<ResolvedAddress> {
        self.addresses
            .get(&chapter.to_string())
            .map(|host| ResolvedAddress::new(host.as_str()))
    }

    async fn page_exists(&self, url: &str) -> bool {
        self.pages.contains(url)
    }

    async fn image(&self, url: &str) -> Result<Bytes, FetchError> {
        self.image_requests.lock().unwrap().push(url.to_owned());
        if self.pages.contains(url) && !self.failing.contains(url) {
            Ok(Bytes::from(url.as_bytes().to_vec()))
        } else {
            Err(FetchError::Absent(StatusCode::NOT_FOUND))
        }
    }
}
