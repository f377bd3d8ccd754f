use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::debug;

use super::MangaSource;
use super::parser::{Parser, ResolvedAddress};
use crate::chapter::ChapterId;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("页面不存在: HTTP {0}")]
    Absent(StatusCode),
    #[error("网络请求失败: {0}")]
    Transport(#[from] reqwest::Error),
}

/// 站点访问层。所有请求共用一个连接池，
/// 并通过信号量限制同时在途的请求数。
#[derive(Clone)]
pub struct Downloader {
    client: Client,
    base_url: String,
    limiter: Arc<Semaphore>,
}

impl Downloader {
    pub fn new(base_url: String, concurrency_limit: usize) -> Result<Self> {
        let client = Client::builder()
            .user_agent(ua_generator::ua::spoof_ua())
            .build()?;
        Ok(Self {
            client,
            base_url,
            limiter: Arc::new(Semaphore::new(concurrency_limit)),
        })
    }

    /// GET 单个页面，仅在 HTTP 200 时返回正文。
    async fn page_text(&self, url: &str) -> Option<String> {
        let _permit = self.limiter.acquire().await.expect("信号量已关闭");
        debug!("正在获取: {}", url);
        let response = self.client.get(url).send().await.ok()?;
        if response.status() != StatusCode::OK {
            return None;
        }
        response.text().await.ok()
    }
}

pub(crate) fn viewer_url(
    base_url: &str,
    slug: &str,
    chapter: &ChapterId,
    alternate: bool,
) -> String {
    let index = if alternate { "-index-2" } else { "" };
    format!(
        "{}/read-online/{}-chapter-{}{}.html",
        base_url, slug, chapter, index
    )
}

#[async_trait]
impl MangaSource for Downloader {
    async fn resolve(&self, slug: &str, chapter: &ChapterId) -> Option<ResolvedAddress> {
        let html = self
            .page_text(&viewer_url(&self.base_url, slug, chapter, false))
            .await?;
        if let Some(address) = Parser::extract_address(&html) {
            return Some(address);
        }
        // 部分章节的地址只出现在 -index-2 变体页面上
        let html = self
            .page_text(&viewer_url(&self.base_url, slug, chapter, true))
            .await?;
        Parser::extract_address(&html)
    }

    async fn page_exists(&self, url: &str) -> bool {
        let _permit = self.limiter.acquire().await.expect("信号量已关闭");
        match self.client.get(url).send().await {
            Ok(response) => response.status() == StatusCode::OK,
            Err(_) => false,
        }
    }

    async fn image(&self, url: &str) -> Result<Bytes, FetchError> {
        let _permit = self.limiter.acquire().await.expect("信号量已关闭");
        debug!("下载图片: {}", url);
        let response = self.client.get(url).send().await?;
        if response.status() != StatusCode::OK {
            return Err(FetchError::Absent(response.status()));
        }
        Ok(response.bytes().await?)
    }
}
