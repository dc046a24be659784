//! 编排层（Orchestration Layer）
//!
//! ## 层次关系
//!
//! ```text
//! api (HTTP 入口，构建 OpenAiOracle)
//!     ↓
//! orchestrator::Recommender (抓取重试 → 分组 → 并发评分 → 还原下标 → 报告)
//!     ↓
//! workflow (QueryWindow / batch_planner)
//!     ↓
//! services (ListingSource / RecordExtractor / ScoringOracle / selection_decoder)
//!     ↓
//! browser (Chromium 启动与连接)
//! ```
//!
//! 编排层只做调度和错误折叠，不做具体解析。

pub mod recommender;

pub use recommender::{
    assemble_report, reconstruct_global_indices, Recommender, Report, RunSettings, Selection,
    FAILURE_MESSAGE,
};
