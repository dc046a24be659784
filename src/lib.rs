//! # Daily arXiv
//!
//! 每日论文推荐服务：抓取 arXiv 检索结果，交给 LLM 按兴趣筛选，返回推荐列表
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `browser/` - 启动或连接 Chromium，渲染页面
//!
//! ### ② 业务能力层（Services）
//! - `ListingSource` - 抓取检索结果页（浏览器 / HTTP）
//! - `RecordExtractor` - 把结果页解析成候选论文
//! - `ScoringOracle` - LLM 评分能力
//! - `selection_decoder` - 从 LLM 回答中提取序号
//!
//! ### ③ 流程层（Workflow）
//! - `QueryWindow` - 检索条件与日期区间
//! - `batch_planner` - 分组并生成提示词
//!
//! ### ④ 编排层（Orchestration）
//! - `Recommender` - 重试、并发评分、下标还原、生成报告
//!
//! ### ⑤ 入口（API）
//! - `api/` - axum 路由：`POST /daily`、`GET /ping`

pub mod api;
pub mod browser;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{CandidateRecord, Prompt};
pub use orchestrator::{Recommender, Report};
pub use workflow::GROUP_SIZE;
