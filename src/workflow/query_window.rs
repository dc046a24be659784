//! 检索窗口
//!
//! 根据配置拼出 arXiv 高级检索的 URL。日期区间默认是"前天到昨天"，
//! 也可以在配置里固定。

use chrono::{Duration, Local, NaiveDate};
use reqwest::Url;

use crate::config::{Config, SearchTerm};
use crate::error::{AppResult, ConfigError};

/// 一次检索的条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryWindow {
    pub base_url: String,
    pub terms: Vec<SearchTerm>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub page_size: usize,
}

impl QueryWindow {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_url: config.search_base_url.clone(),
            terms: config.search_terms.clone(),
            date_from: config.date_from.clone(),
            date_to: config.date_to.clone(),
            page_size: config.page_size,
        }
    }

    /// 以今天为基准生成 URL
    pub fn url(&self) -> AppResult<String> {
        self.url_for(Local::now().date_naive())
    }

    /// 以指定日期为"今天"生成 URL
    pub fn url_for(&self, today: NaiveDate) -> AppResult<String> {
        let (from, to) = self.date_range(today);

        let mut params: Vec<(String, String)> = vec![("advanced".to_string(), String::new())];
        for (i, term) in self.terms.iter().enumerate() {
            params.push((format!("terms-{}-operator", i), term.operator.clone()));
            params.push((format!("terms-{}-term", i), term.term.clone()));
            params.push((format!("terms-{}-field", i), term.field.clone()));
        }
        let fixed = [
            ("classification-computer_science", "y"),
            ("classification-physics_archives", "all"),
            ("classification-include_cross_list", "include"),
            ("date-year", ""),
            ("date-filter_by", "date_range"),
        ];
        params.extend(fixed.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        params.push(("date-from_date".to_string(), from));
        params.push(("date-to_date".to_string(), to));
        params.push((
            "date-date_type".to_string(),
            "submitted_date_first".to_string(),
        ));
        params.push(("abstracts".to_string(), "show".to_string()));
        params.push(("size".to_string(), self.page_size.to_string()));
        params.push(("order".to_string(), "-announced_date_first".to_string()));

        let url = Url::parse_with_params(&self.base_url, &params).map_err(|e| {
            ConfigError::InvalidUrl {
                url: self.base_url.clone(),
                reason: e.to_string(),
            }
        })?;
        Ok(url.to_string())
    }

    /// 解析日期区间，未固定的一端按今天推算
    pub fn date_range(&self, today: NaiveDate) -> (String, String) {
        let from = self
            .date_from
            .clone()
            .unwrap_or_else(|| format_date(today - Duration::days(2)));
        let to = self
            .date_to
            .clone()
            .unwrap_or_else(|| format_date(today - Duration::days(1)));
        (from, to)
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> QueryWindow {
        QueryWindow::from_config(&Config::default())
    }

    #[test]
    fn test_default_url_matches_search_form() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        let url = window().url_for(today).unwrap();
        assert_eq!(
            url,
            "https://arxiv.org/search/advanced?advanced=&terms-0-operator=AND&terms-0-term=Artificial+Intelligence&terms-0-field=all&terms-1-operator=OR&terms-1-term=Software+Engineering&terms-1-field=all&classification-computer_science=y&classification-physics_archives=all&classification-include_cross_list=include&date-year=&date-filter_by=date_range&date-from_date=2024-01-05&date-to_date=2024-01-06&date-date_type=submitted_date_first&abstracts=show&size=200&order=-announced_date_first"
        );
    }

    #[test]
    fn test_date_range_crosses_month_boundary() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let (from, to) = window().date_range(today);
        assert_eq!(from, "2024-02-28");
        assert_eq!(to, "2024-02-29");
    }

    #[test]
    fn test_pinned_dates() {
        let mut w = window();
        w.date_from = Some("2023-12-01".to_string());
        w.date_to = Some("2023-12-31".to_string());
        let url = w.url_for(NaiveDate::from_ymd_opt(2024, 1, 7).unwrap()).unwrap();
        assert!(url.contains("date-from_date=2023-12-01&date-to_date=2023-12-31"));
    }

    #[test]
    fn test_terms_are_form_encoded() {
        let mut w = window();
        w.terms = vec![SearchTerm::new("AND", "C++ & Rust", "title")];
        let url = w.url_for(NaiveDate::from_ymd_opt(2024, 1, 7).unwrap()).unwrap();
        assert!(url.contains("terms-0-term=C%2B%2B+%26+Rust&terms-0-field=title"));
        assert!(!url.contains("terms-1-"));
    }

    #[test]
    fn test_invalid_base_url() {
        let mut w = window();
        w.base_url = "not a url".to_string();
        let err = w.url_for(NaiveDate::from_ymd_opt(2024, 1, 7).unwrap()).unwrap_err();
        assert_eq!(err.category(), "config");
    }
}
