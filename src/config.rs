use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{AppResult, ConfigError};

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "daily_arxiv.toml";

/// 页面抓取方式
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    /// 通过无头浏览器渲染页面
    Browser,
    /// 直接 HTTP GET
    Http,
}

impl FromStr for FetchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "browser" => Ok(FetchMode::Browser),
            "http" => Ok(FetchMode::Http),
            other => Err(format!("未知的抓取方式: {}", other)),
        }
    }
}

/// 检索条件中的一个检索词
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct SearchTerm {
    /// AND / OR
    pub operator: String,
    pub term: String,
    /// 检索字段，如 all / title / abstract
    pub field: String,
}

impl SearchTerm {
    pub fn new(operator: &str, term: &str, field: &str) -> Self {
        Self {
            operator: operator.to_string(),
            term: term.to_string(),
            field: field.to_string(),
        }
    }
}

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- 服务配置 ---
    pub server_host: String,
    pub server_port: u16,
    // --- 抓取配置 ---
    pub fetch_mode: FetchMode,
    /// 设置后连接已有浏览器的调试端口，否则启动新的无头浏览器
    pub browser_debug_port: Option<u16>,
    pub chrome_executable: Option<String>,
    /// 抓取总次数（含第一次）
    pub fetch_attempts: usize,
    pub retry_delay_ms: u64,
    // --- LLM 配置 ---
    pub max_concurrent_oracle_calls: usize,
    pub run_timeout_secs: u64,
    pub default_model: String,
    // --- 检索窗口 ---
    pub search_base_url: String,
    pub search_terms: Vec<SearchTerm>,
    /// 固定起始日期（YYYY-MM-DD），为空时取前天
    pub date_from: Option<String>,
    /// 固定结束日期（YYYY-MM-DD），为空时取昨天
    pub date_to: Option<String>,
    pub page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "127.0.0.1".to_string(),
            server_port: 8007,
            fetch_mode: FetchMode::Browser,
            browser_debug_port: None,
            chrome_executable: None,
            fetch_attempts: 4,
            retry_delay_ms: 1000,
            max_concurrent_oracle_calls: 8,
            run_timeout_secs: 300,
            default_model: "gpt-3.5-turbo-1106".to_string(),
            search_base_url: "https://arxiv.org/search/advanced".to_string(),
            search_terms: vec![
                SearchTerm::new("AND", "Artificial Intelligence", "all"),
                SearchTerm::new("OR", "Software Engineering", "all"),
            ],
            date_from: None,
            date_to: None,
            page_size: 200,
        }
    }
}

impl Config {
    /// 加载配置：默认值 → TOML 文件（若存在）→ 环境变量
    pub fn load() -> AppResult<Self> {
        let path = std::env::var("DAILY_ARXIV_CONFIG")
            .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let base = if Path::new(&path).exists() {
            Self::from_toml_file(&path)?
        } else {
            Self::default()
        };
        base.with_env_overrides(|name| std::env::var(name).ok())
    }

    /// 从 TOML 文件读取配置，缺省字段使用默认值
    pub fn from_toml_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_string(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }

    pub fn from_toml_str(content: &str, path: &str) -> AppResult<Self> {
        let config = toml::from_str(content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.to_string(),
            source,
        })?;
        Ok(config)
    }

    /// 用环境变量覆盖配置
    ///
    /// `lookup` 便于测试时注入变量表
    pub fn with_env_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> AppResult<Self> {
        if let Some(v) = lookup("SERVER_HOST") {
            self.server_host = v;
        }
        if let Some(v) = parse_var(&lookup, "SERVER_PORT", "u16")? {
            self.server_port = v;
        }
        if let Some(v) = parse_var(&lookup, "FETCH_MODE", "browser|http")? {
            self.fetch_mode = v;
        }
        if let Some(v) = parse_var(&lookup, "BROWSER_DEBUG_PORT", "u16")? {
            self.browser_debug_port = Some(v);
        }
        if let Some(v) = lookup("CHROME_EXECUTABLE") {
            self.chrome_executable = Some(v);
        }
        if let Some(v) = parse_var(&lookup, "FETCH_ATTEMPTS", "usize")? {
            self.fetch_attempts = v;
        }
        if let Some(v) = parse_var(&lookup, "RETRY_DELAY_MS", "u64")? {
            self.retry_delay_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "MAX_CONCURRENT_ORACLE_CALLS", "usize")? {
            self.max_concurrent_oracle_calls = v;
        }
        if let Some(v) = parse_var(&lookup, "RUN_TIMEOUT_SECS", "u64")? {
            self.run_timeout_secs = v;
        }
        if let Some(v) = lookup("DEFAULT_MODEL") {
            self.default_model = v;
        }
        if let Some(v) = lookup("SEARCH_BASE_URL") {
            self.search_base_url = v;
        }
        if let Some(v) = lookup("DATE_FROM") {
            self.date_from = Some(v);
        }
        if let Some(v) = lookup("DATE_TO") {
            self.date_to = Some(v);
        }
        if let Some(v) = parse_var(&lookup, "PAGE_SIZE", "usize")? {
            self.page_size = v;
        }
        Ok(self)
    }

    /// 监听地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var_name: &str,
    expected_type: &str,
) -> AppResult<Option<T>> {
    match lookup(var_name) {
        None => Ok(None),
        Some(value) => match value.trim().parse::<T>() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(_) => Err(ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }
            .into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.bind_addr(), "127.0.0.1:8007");
        assert_eq!(config.fetch_attempts, 4);
        assert_eq!(config.search_terms.len(), 2);
        assert_eq!(config.fetch_mode, FetchMode::Browser);
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::default()
            .with_env_overrides(lookup_from(&[
                ("SERVER_PORT", "9000"),
                ("FETCH_MODE", "HTTP"),
                ("DATE_FROM", "2024-01-05"),
                ("FETCH_ATTEMPTS", "2"),
            ]))
            .unwrap();
        assert_eq!(config.server_port, 9000);
        assert_eq!(config.fetch_mode, FetchMode::Http);
        assert_eq!(config.date_from.as_deref(), Some("2024-01-05"));
        assert_eq!(config.fetch_attempts, 2);
    }

    #[test]
    fn test_env_parse_failure() {
        let err = Config::default()
            .with_env_overrides(lookup_from(&[("SERVER_PORT", "not-a-port")]))
            .unwrap_err();
        assert_eq!(err.category(), "config");
        assert!(err.to_string().contains("SERVER_PORT"));
    }

    #[test]
    fn test_toml_partial_file() {
        let content = r#"
server_port = 8100
fetch_mode = "http"
date_to = "2024-01-06"

[[search_terms]]
operator = "AND"
term = "Program Repair"
field = "title"
"#;
        let config = Config::from_toml_str(content, "inline.toml").unwrap();
        assert_eq!(config.server_port, 8100);
        assert_eq!(config.fetch_mode, FetchMode::Http);
        assert_eq!(config.date_to.as_deref(), Some("2024-01-06"));
        assert_eq!(config.search_terms, vec![SearchTerm::new("AND", "Program Repair", "title")]);
        // 未出现的字段保持默认
        assert_eq!(config.page_size, 200);
    }

    #[test]
    fn test_toml_invalid() {
        let err = Config::from_toml_str("server_port = \"x\"", "bad.toml").unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }
}
