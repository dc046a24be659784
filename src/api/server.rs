//! HTTP 入口
//!
//! - `POST /daily`：运行一次推荐，返回报告或 `"error"`
//! - `GET /ping`：存活检查

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, warn};

use crate::api::types::{DailyRequest, MessageResponse};
use crate::orchestrator::{Recommender, FAILURE_MESSAGE};
use crate::services::{OpenAiOracle, OracleConfig, ScoringOracle};

/// 路由共享状态
pub struct AppState {
    pub recommender: Recommender,
    pub default_model: String,
}

/// 构建路由
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/daily", post(daily))
        .route("/ping", get(ping))
        .with_state(state)
}

/// 监听并提供服务，直到进程退出
pub async fn serve(addr: &str, state: Arc<AppState>) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("✓ 服务已启动: http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// 请求体不合法时同样返回 `{"message": "error"}`，状态码 422
async fn daily(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DailyRequest>, JsonRejection>,
) -> (StatusCode, Json<MessageResponse>) {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            warn!("⚠️ 请求体无效: {}", rejection.body_text());
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(MessageResponse::new(FAILURE_MESSAGE)),
            );
        }
    };

    let oracle_config = OracleConfig {
        api_base: body.openai_api_base,
        api_key: body.openai_api_key,
        model: body.model.unwrap_or_else(|| state.default_model.clone()),
    };
    info!(
        "📨 收到推荐请求，模型: {}，兴趣: {:?}",
        oracle_config.model, body.interests
    );

    let oracle: Arc<dyn ScoringOracle> = Arc::new(OpenAiOracle::new(&oracle_config));
    let message = state.recommender.run_to_message(&body.interests, oracle).await;

    (StatusCode::OK, Json(MessageResponse::new(message)))
}

async fn ping() -> Json<MessageResponse> {
    Json(MessageResponse::new("pong"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::AppResult;
    use crate::orchestrator::RunSettings;
    use crate::services::ListingSource;
    use crate::workflow::QueryWindow;
    use async_trait::async_trait;
    use std::time::Duration;

    /// 永远返回空页面，推荐会在抓取阶段失败，不会调用 LLM
    struct EmptySource;

    #[async_trait]
    impl ListingSource for EmptySource {
        async fn fetch(&self, _url: &str) -> AppResult<String> {
            Ok("<html><body></body></html>".to_string())
        }
    }

    async fn spawn_server() -> String {
        let settings = RunSettings {
            fetch_attempts: 1,
            retry_delay: Duration::ZERO,
            ..RunSettings::default()
        };
        let state = Arc::new(AppState {
            recommender: Recommender::new(
                Arc::new(EmptySource),
                QueryWindow::from_config(&Config::default()),
                settings,
            ),
            default_model: "test-model".to_string(),
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_ping() {
        let base = spawn_server().await;
        let resp = reqwest::get(format!("{}/ping", base)).await.unwrap();
        assert_eq!(resp.status().as_u16(), 200);
        let body: MessageResponse = resp.json().await.unwrap();
        assert_eq!(body, MessageResponse::new("pong"));
    }

    #[tokio::test]
    async fn test_daily_failed_run_returns_error_message() {
        let base = spawn_server().await;
        let resp = reqwest::Client::new()
            .post(format!("{}/daily", base))
            .json(&serde_json::json!({
                "interests": ["program repair"],
                "openai_api_base": "http://127.0.0.1:1/v1",
                "openai_api_key": "sk-test"
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 200);
        let body: MessageResponse = resp.json().await.unwrap();
        assert_eq!(body.message, "error");
    }

    #[tokio::test]
    async fn test_daily_invalid_body_returns_error_message() {
        let base = spawn_server().await;
        let resp = reqwest::Client::new()
            .post(format!("{}/daily", base))
            .header("content-type", "application/json")
            .body(r#"{"interests": ["x"], "openai_api_key": "sk-test"}"#)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 422);
        let body: MessageResponse = resp.json().await.unwrap();
        assert_eq!(body.message, "error");
    }
}
