//! 推荐编排器 - 编排层
//!
//! ## 职责
//!
//! 1. **抓取解析**：抓取检索结果页并解析，结果为空时有限次重试
//! 2. **并发评分**：所有分组的提示词同时发给模型，全部返回后再继续
//! 3. **下标还原**：组内下标 → 原序列下标，越界的直接丢弃
//! 4. **生成报告**：按选择顺序拼接链接和标题
//!
//! 任何一步出错整次推荐失败，不返回部分结果；
//! 对外只有 `"error"`，具体错误类型写入日志。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, OracleError};
use crate::models::CandidateRecord;
use crate::services::{decode_for_group, ListingSource, RecordExtractor, ScoringOracle};
use crate::utils::logging::{log_groups_planned, log_run_complete, log_run_start};
use crate::utils::truncate_text;
use crate::workflow::{plan, PlannedGroup, QueryWindow, GROUP_SIZE};

/// 推荐失败时对外返回的消息
pub const FAILURE_MESSAGE: &str = "error";

/// 运行参数
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// 抓取总次数（含第一次）
    pub fetch_attempts: usize,
    pub retry_delay: Duration,
    pub max_concurrent_oracle_calls: usize,
    pub run_timeout: Duration,
}

impl RunSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            fetch_attempts: config.fetch_attempts,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            max_concurrent_oracle_calls: config.max_concurrent_oracle_calls,
            run_timeout: Duration::from_secs(config.run_timeout_secs),
        }
    }
}

impl Default for RunSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// 一篇被选中的论文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub global_index: usize,
    pub link: String,
    pub title: String,
}

/// 推荐报告
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub selections: Vec<Selection>,
    /// 候选论文总数
    pub candidate_count: usize,
}

impl Report {
    /// 按选择顺序渲染报告文本
    pub fn render(&self) -> String {
        self.selections
            .iter()
            .map(|s| format!("======\n{}\n{}\n", s.link, s.title))
            .collect()
    }

    pub fn global_indices(&self) -> Vec<usize> {
        self.selections.iter().map(|s| s.global_index).collect()
    }
}

/// 推荐编排器
///
/// 持有检索来源和检索窗口，每次运行由调用方提供评分模型
pub struct Recommender {
    source: Arc<dyn ListingSource>,
    window: QueryWindow,
    settings: RunSettings,
}

impl Recommender {
    pub fn new(source: Arc<dyn ListingSource>, window: QueryWindow, settings: RunSettings) -> Self {
        Self {
            source,
            window,
            settings,
        }
    }

    pub fn from_config(source: Arc<dyn ListingSource>, config: &Config) -> Self {
        Self::new(
            source,
            QueryWindow::from_config(config),
            RunSettings::from_config(config),
        )
    }

    /// 运行一次推荐，失败时折叠为 `"error"`
    pub async fn run_to_message(
        &self,
        interests: &[String],
        oracle: Arc<dyn ScoringOracle>,
    ) -> String {
        match self.run(interests, oracle).await {
            Ok(report) => report.render(),
            Err(e) => {
                error!("❌ 推荐失败 [{}]: {}", e.category(), e);
                FAILURE_MESSAGE.to_string()
            }
        }
    }

    /// 运行一次推荐
    pub async fn run(
        &self,
        interests: &[String],
        oracle: Arc<dyn ScoringOracle>,
    ) -> AppResult<Report> {
        let timeout = self.settings.run_timeout;
        tokio::time::timeout(timeout, self.run_inner(interests, oracle))
            .await
            .map_err(|_| AppError::Timeout {
                seconds: timeout.as_secs(),
            })?
    }

    async fn run_inner(
        &self,
        interests: &[String],
        oracle: Arc<dyn ScoringOracle>,
    ) -> AppResult<Report> {
        let url = self.window.url()?;
        log_run_start(&url, interests.len());

        let records = self.fetch_records(&url).await?;

        let groups = plan(&records, interests);
        log_groups_planned(records.len(), groups.len(), GROUP_SIZE);

        let answers = self.score_groups(&groups, oracle).await?;
        let selected = reconstruct_global_indices(&groups, &answers, records.len());
        debug!("选中的全局下标: {:?}", selected);

        let report = assemble_report(&records, &selected);
        log_run_complete(report.selections.len(), records.len());
        Ok(report)
    }

    /// 抓取并解析，结果为空时重试
    async fn fetch_records(&self, url: &str) -> AppResult<Vec<CandidateRecord>> {
        let attempts = self.settings.fetch_attempts.max(1);
        let mut extractor = RecordExtractor::new();

        for attempt in 1..=attempts {
            let html = self.source.fetch(url).await?;
            let records = extractor.extract(&html);

            if !records.is_empty() {
                info!("✓ 第 {} 次抓取解析到 {} 篇论文", attempt, records.len());
                for record in &records {
                    debug!("  {} [{}]", truncate_text(&record.title, 60), record.tags_line());
                }
                return Ok(records);
            }

            warn!(
                "⚠️ 第 {}/{} 次抓取未解析到论文，页面预览: {}",
                attempt,
                attempts,
                truncate_text(&html, 200)
            );
            if attempt < attempts {
                sleep(self.settings.retry_delay).await;
            }
        }

        Err(AppError::NoResults { attempts })
    }

    /// 并发发送所有分组，按组号顺序返回回答
    ///
    /// 任务都放在 `JoinSet` 里：任一组失败、或整次运行超时被丢弃时，
    /// 其余还在进行的 LLM 请求随之取消
    async fn score_groups(
        &self,
        groups: &[PlannedGroup],
        oracle: Arc<dyn ScoringOracle>,
    ) -> AppResult<Vec<String>> {
        let semaphore = Arc::new(Semaphore::new(self.settings.max_concurrent_oracle_calls.max(1)));
        let mut set = JoinSet::new();

        for group in groups {
            let oracle = Arc::clone(&oracle);
            let semaphore = Arc::clone(&semaphore);
            let prompt = group.prompt.clone();
            let group_index = group.index;

            set.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => {
                        debug!("[第 {} 组] 发送给 LLM", group_index + 1);
                        oracle.complete(&prompt).await
                    }
                    Err(e) => Err(AppError::Oracle(OracleError::TaskFailed {
                        reason: e.to_string(),
                    })),
                };
                (group_index, result)
            });
        }

        let mut answers = Vec::with_capacity(groups.len());
        while let Some(joined) = set.join_next().await {
            let (group_index, result) = joined.map_err(|e| {
                AppError::Oracle(OracleError::TaskFailed {
                    reason: e.to_string(),
                })
            })?;

            match result {
                Ok(answer) => {
                    debug!(
                        "[第 {} 组] LLM 回答: {}",
                        group_index + 1,
                        truncate_text(&answer, 200)
                    );
                    answers.push((group_index, answer));
                }
                Err(e) => {
                    error!("[第 {} 组] ❌ LLM 调用失败: {}", group_index + 1, e);
                    set.abort_all();
                    return Err(e);
                }
            }
        }

        answers.sort_by_key(|(idx, _)| *idx);
        Ok(answers.into_iter().map(|(_, answer)| answer).collect())
    }
}

/// 解析每组回答并还原成原序列下标
///
/// 顺序为组号优先、组内按回答顺序，重复选择保留；
/// 超出本组大小或原序列范围的下标被丢弃
pub fn reconstruct_global_indices(
    groups: &[PlannedGroup],
    answers: &[String],
    record_count: usize,
) -> Vec<usize> {
    let mut selected = Vec::new();

    for (group, answer) in groups.iter().zip(answers) {
        let locals = decode_for_group(answer, group.len);
        if locals.is_empty() {
            debug!("[第 {} 组] 没有选中任何论文", group.index + 1);
        }

        for local in locals {
            match group.global_index(local).filter(|&g| g < record_count) {
                Some(global) => selected.push(global),
                None => warn!(
                    "[第 {} 组] 丢弃越界下标 {}（本组共 {} 篇）",
                    group.index + 1,
                    local + 1,
                    group.len
                ),
            }
        }
    }

    selected
}

/// 按下标顺序生成报告，越界下标跳过
pub fn assemble_report(records: &[CandidateRecord], selected: &[usize]) -> Report {
    let selections = selected
        .iter()
        .filter_map(|&idx| {
            records.get(idx).map(|record| Selection {
                global_index: idx,
                link: record.link.clone(),
                title: record.title.clone(),
            })
        })
        .collect();

    Report {
        selections,
        candidate_count: records.len(),
    }
}
