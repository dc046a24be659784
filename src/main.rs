use std::sync::Arc;

use anyhow::Result;
use daily_arxiv::api::{self, AppState};
use daily_arxiv::services::listing_source_from_config;
use daily_arxiv::utils::logging::log_startup;
use daily_arxiv::{logger, Config, Recommender};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logger::init();

    // 加载配置
    let config = Config::load()?;
    log_startup(&config);

    // 初始化并运行服务
    let source = listing_source_from_config(&config);
    let state = Arc::new(AppState {
        recommender: Recommender::from_config(source, &config),
        default_model: config.default_model.clone(),
    });

    api::serve(&config.bind_addr(), state).await
}
