//! 日志工具模块
//!
//! 提供日志格式化和输出的辅助函数

use tracing::info;

use crate::config::Config;

/// 记录服务启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 每日论文推荐服务启动");
    info!("🌐 监听地址: {}", config.bind_addr());
    info!("📄 抓取方式: {:?}, 最多 {} 次", config.fetch_mode, config.fetch_attempts);
    info!("📊 LLM 最大并发数: {}", config.max_concurrent_oracle_calls);
    info!("{}", "=".repeat(60));
}

/// 记录一次推荐的开始
pub fn log_run_start(url: &str, interest_count: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始推荐，兴趣数量: {}", interest_count);
    info!("🔗 检索地址: {}", url);
    info!("{}", "=".repeat(60));
}

/// 记录分组信息
pub fn log_groups_planned(record_count: usize, group_count: usize, group_size: usize) {
    info!(
        "📋 共 {} 篇候选论文，分为 {} 组（每组最多 {} 篇）",
        record_count, group_count, group_size
    );
}

/// 记录推荐完成
pub fn log_run_complete(selected: usize, total: usize) {
    info!("\n{}", "─".repeat(60));
    info!("✅ 推荐完成: 选中 {}/{}", selected, total);
    info!("{}", "─".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("abc", 5), "abc");
        assert_eq!(truncate_text("abcdef", 3), "abc...");
        assert_eq!(truncate_text("论文推送姬", 2), "论文...");
    }
}
