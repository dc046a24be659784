use std::path::Path;

use chromiumoxide::{Browser, BrowserConfig};
use tokio::time::sleep;
use tracing::{debug, error, info};

use super::BrowserSession;
use crate::error::{AppError, AppResult, FetchError};

/// 启动无头浏览器
///
/// `chrome_executable` 为空时由 chromiumoxide 自行查找浏览器
pub async fn launch_headless_browser(chrome_executable: Option<&str>) -> AppResult<BrowserSession> {
    info!("🚀 启动无头浏览器...");

    // 配置无头浏览器
    let mut builder = BrowserConfig::builder().new_headless_mode().args(vec![
        "--disable-gpu",           // 无头模式下禁用 GPU
        "--no-sandbox",            // 容器内运行时没有沙盒权限
        "--disable-dev-shm-usage", // 防止共享内存不足
    ]);
    if let Some(path) = chrome_executable {
        debug!("使用浏览器: {}", path);
        builder = builder.chrome_executable(Path::new(path));
    }
    let config = builder.build().map_err(|e| {
        error!("配置无头浏览器失败: {}", e);
        AppError::Fetch(FetchError::LaunchFailed { source: e.into() })
    })?;

    // 启动浏览器
    let (browser, handler) = Browser::launch(config).await.map_err(|e| {
        error!("启动无头浏览器失败: {}", e);
        AppError::Fetch(FetchError::LaunchFailed {
            source: Box::new(e),
        })
    })?;
    debug!("无头浏览器启动成功");

    let session = BrowserSession::spawn(browser, handler);

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    Ok(session)
}
