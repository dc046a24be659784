use thiserror::Error;

/// 应用程序错误类型
///
/// 对外只暴露 `"error"` 哨兵字符串，内部保留完整的错误分类用于日志
#[derive(Debug, Error)]
pub enum AppError {
    /// 多次抓取后仍然没有解析出任何论文
    #[error("抓取 {attempts} 次后仍未解析到任何论文")]
    NoResults { attempts: usize },
    /// 页面抓取错误
    #[error("页面抓取错误: {0}")]
    Fetch(#[from] FetchError),
    /// 评分模型（LLM）错误
    #[error("LLM错误: {0}")]
    Oracle(#[from] OracleError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 整体运行超时
    #[error("推荐流程超时 ({seconds} 秒)")]
    Timeout { seconds: u64 },
    /// 其他错误（用于包装第三方库错误）
    #[error("错误: {0}")]
    Other(String),
}

/// 页面抓取错误
#[derive(Debug, Error)]
pub enum FetchError {
    /// 启动浏览器失败
    #[error("启动无头浏览器失败: {source}")]
    LaunchFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {source}")]
    ConnectionFailed {
        port: u16,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 导航失败
    #[error("导航到 {url} 失败: {source}")]
    NavigationFailed {
        url: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 读取页面内容失败
    #[error("读取页面内容失败 ({url}): {source}")]
    ContentFailed {
        url: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// HTTP 请求失败
    #[error("HTTP请求失败 ({url}): {source}")]
    RequestFailed {
        url: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// HTTP 返回非成功状态码
    #[error("HTTP返回错误状态 ({url}): {status}")]
    BadStatus { url: String, status: u16 },
}

/// 评分模型错误
#[derive(Debug, Error)]
pub enum OracleError {
    /// 构建请求失败
    #[error("构建LLM请求失败: {source}")]
    RequestBuildFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
    /// 并发任务异常退出
    #[error("LLM任务异常退出: {reason}")]
    TaskFailed { reason: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        source: toml::de::Error,
    },
    /// 检索地址无效
    #[error("检索地址无效 ({url}): {reason}")]
    InvalidUrl { url: String, reason: String },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

impl AppError {
    /// 稳定的错误分类码，用于日志和排查
    pub fn category(&self) -> &'static str {
        match self {
            AppError::NoResults { .. } => "no_results",
            AppError::Fetch(_) => "fetch",
            AppError::Oracle(_) => "oracle",
            AppError::Config(_) => "config",
            AppError::Timeout { .. } => "timeout",
            AppError::Other(_) => "other",
        }
    }

    /// 创建浏览器连接错误
    pub fn browser_connection_failed(
        port: u16,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Fetch(FetchError::ConnectionFailed {
            port,
            source: Box::new(source),
        })
    }

    /// 创建页面导航错误
    pub fn navigation_failed(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Fetch(FetchError::NavigationFailed {
            url: url.into(),
            source: Box::new(source),
        })
    }

    /// 创建LLM API调用错误
    pub fn llm_api_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Oracle(OracleError::ApiCallFailed {
            model: model.into(),
            source: Box::new(source),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_codes() {
        assert_eq!(AppError::NoResults { attempts: 4 }.category(), "no_results");
        assert_eq!(AppError::Timeout { seconds: 1 }.category(), "timeout");
        assert_eq!(
            AppError::from(OracleError::EmptyContent {
                model: "m".to_string()
            })
            .category(),
            "oracle"
        );
        assert_eq!(
            AppError::from(FetchError::BadStatus {
                url: "u".to_string(),
                status: 503
            })
            .category(),
            "fetch"
        );
    }

    #[test]
    fn test_no_results_message_mentions_attempts() {
        let msg = AppError::NoResults { attempts: 4 }.to_string();
        assert!(msg.contains('4'));
    }
}
