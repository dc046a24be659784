use chromiumoxide::Browser;
use tokio::time::sleep;
use tracing::{debug, error, info};

use super::BrowserSession;
use crate::error::{AppError, AppResult};

/// 连接到已开启远程调试端口的浏览器
///
/// 返回的会话被丢弃时，后台事件处理任务和 websocket 一并结束
pub async fn connect_to_browser(port: u16) -> AppResult<BrowserSession> {
    let browser_url = format!("http://localhost:{}", port);
    info!("正在连接到浏览器: {}", browser_url);

    let (browser, handler) = Browser::connect(&browser_url).await.map_err(|e| {
        error!("连接浏览器失败: {}", e);
        AppError::browser_connection_failed(port, e)
    })?;
    debug!("浏览器连接成功");

    let session = BrowserSession::spawn(browser, handler);

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    Ok(session)
}
