//! 浏览器 - 基础设施层
//!
//! 启动或连接 Chromium，并把一个 URL 渲染成完整的 HTML 文本

pub mod connection;
pub mod headless;

pub use connection::connect_to_browser;
pub use headless::launch_headless_browser;

use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult, FetchError};

/// 后台事件处理任务，随守卫一起结束
///
/// chromiumoxide 的 handler 在 `Browser` 被丢弃后不会自己退出，
/// 连接已有浏览器时必须显式终止，否则 websocket 和任务会一直留着
#[derive(Debug)]
pub struct HandlerGuard(JoinHandle<()>);

impl HandlerGuard {
    pub fn new(handle: JoinHandle<()>) -> Self {
        Self(handle)
    }
}

impl Drop for HandlerGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// 一个浏览器连接及其事件处理任务
pub struct BrowserSession {
    pub browser: Browser,
    _handler: HandlerGuard,
}

impl BrowserSession {
    /// 在后台处理浏览器事件，返回会话
    pub(crate) fn spawn(browser: Browser, mut handler: chromiumoxide::Handler) -> Self {
        let handle = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Self {
            browser,
            _handler: HandlerGuard::new(handle),
        }
    }
}

/// 打开新标签页加载 URL，等待导航完成后返回渲染后的 HTML
///
/// 标签页无论成功与否都会关闭，浏览器本身由调用方管理
pub async fn render_page(browser: &Browser, url: &str) -> AppResult<String> {
    debug!("创建新页面并导航到: {}", url);
    let page = browser
        .new_page(url)
        .await
        .map_err(|e| AppError::navigation_failed(url, e))?;

    let result = page_content(&page, url).await;

    if let Err(e) = page.close().await {
        warn!("关闭页面失败: {}", e);
    }

    result
}

async fn page_content(page: &Page, url: &str) -> AppResult<String> {
    page.wait_for_navigation()
        .await
        .map_err(|e| AppError::navigation_failed(url, e))?;

    let content = page.content().await.map_err(|e| {
        AppError::Fetch(FetchError::ContentFailed {
            url: url.to_string(),
            source: Box::new(e),
        })
    })?;
    debug!("页面内容长度: {} 字节", content.len());

    Ok(content)
}
