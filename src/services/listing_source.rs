//! 检索结果页抓取 - 业务能力层
//!
//! 只负责"给一个 URL，拿回完整 HTML"。是否重试由编排层决定。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::browser::{self, BrowserSession};
use crate::config::{Config, FetchMode};
use crate::error::{AppError, AppResult, FetchError};

/// 检索结果页来源
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// 抓取 URL 对应页面的完整 HTML
    async fn fetch(&self, url: &str) -> AppResult<String>;
}

/// 根据配置选择抓取方式
pub fn listing_source_from_config(config: &Config) -> Arc<dyn ListingSource> {
    match config.fetch_mode {
        FetchMode::Browser => Arc::new(BrowserListingSource::new(
            config.browser_debug_port,
            config.chrome_executable.clone(),
        )),
        FetchMode::Http => Arc::new(HttpListingSource::new()),
    }
}

/// 通过 Chromium 渲染页面
///
/// 配置了调试端口时连接已有浏览器，连接在多次抓取之间复用；
/// 否则每次抓取启动一个新的无头浏览器，用完即关
pub struct BrowserListingSource {
    debug_port: Option<u16>,
    chrome_executable: Option<String>,
    attached: Mutex<Option<BrowserSession>>,
}

impl BrowserListingSource {
    pub fn new(debug_port: Option<u16>, chrome_executable: Option<String>) -> Self {
        Self {
            debug_port,
            chrome_executable,
            attached: Mutex::new(None),
        }
    }

    async fn fetch_attached(&self, port: u16, url: &str) -> AppResult<String> {
        let mut attached = self.attached.lock().await;
        let session = match attached.take() {
            Some(session) => session,
            None => browser::connect_to_browser(port).await?,
        };

        let result = browser::render_page(&session.browser, url).await;
        if result.is_ok() {
            *attached = Some(session);
        } else {
            // 连接可能已失效，丢弃后下次重新连接
            debug!("丢弃浏览器连接，下次抓取时重连");
        }
        result
    }

    async fn fetch_launched(&self, url: &str) -> AppResult<String> {
        let mut session =
            browser::launch_headless_browser(self.chrome_executable.as_deref()).await?;
        let result = browser::render_page(&session.browser, url).await;

        // 无论成功与否都关闭自己启动的浏览器
        if let Err(e) = session.browser.close().await {
            warn!("关闭无头浏览器失败: {}", e);
        }
        if let Err(e) = session.browser.wait().await {
            warn!("等待浏览器进程退出失败: {}", e);
        }
        debug!("无头浏览器已关闭");

        result
    }
}

#[async_trait]
impl ListingSource for BrowserListingSource {
    async fn fetch(&self, url: &str) -> AppResult<String> {
        match self.debug_port {
            Some(port) => self.fetch_attached(port, url).await,
            None => self.fetch_launched(url).await,
        }
    }
}

/// 直接 HTTP GET
///
/// arXiv 检索页是服务端渲染的，不需要浏览器也能拿到完整结果
pub struct HttpListingSource {
    client: reqwest::Client,
}

impl HttpListingSource {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpListingSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ListingSource for HttpListingSource {
    async fn fetch(&self, url: &str) -> AppResult<String> {
        info!("🌐 HTTP 抓取: {}", url);
        let request_failed = |e: reqwest::Error| {
            AppError::Fetch(FetchError::RequestFailed {
                url: url.to_string(),
                source: Box::new(e),
            })
        };

        let response = self.client.get(url).send().await.map_err(request_failed)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::BadStatus {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let body = response.text().await.map_err(request_failed)?;
        debug!("页面内容长度: {} 字节", body.len());
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // 需要网络：cargo test -- --ignored
    async fn test_http_fetch_search_page() {
        let _ = tracing_subscriber::fmt::try_init();

        let source = HttpListingSource::new();
        let html = source
            .fetch("https://arxiv.org/search/?query=rust&searchtype=all")
            .await
            .expect("抓取失败");
        assert!(html.contains("arxiv-result"));
    }

    #[tokio::test]
    #[ignore] // 需要本机安装 Chromium
    async fn test_browser_fetch_search_page() {
        let _ = tracing_subscriber::fmt::try_init();

        let source = BrowserListingSource::new(None, None);
        let html = source
            .fetch("https://arxiv.org/search/?query=rust&searchtype=all")
            .await
            .expect("抓取失败");
        assert!(!html.is_empty());
    }

    /// 运行方式：先用 `--remote-debugging-port=9222` 启动 Chromium，再
    /// `cargo test test_attached_session_is_reused -- --ignored`
    #[tokio::test]
    #[ignore] // 需要已开启调试端口的浏览器
    async fn test_attached_session_is_reused() {
        let _ = tracing_subscriber::fmt::try_init();

        let source = BrowserListingSource::new(Some(9222), None);
        for _ in 0..3 {
            source.fetch("about:blank").await.expect("抓取失败");
        }
        assert!(source.attached.lock().await.is_some());
    }
}
