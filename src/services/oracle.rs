//! 评分模型 - 业务能力层
//!
//! 只负责"把一组消息发给 LLM，拿回文本"，不关心分组和下标
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult, OracleError};
use crate::models::Prompt;

/// 评分模型
#[async_trait]
pub trait ScoringOracle: Send + Sync {
    /// 发送一条提示词，返回模型的原始回答
    async fn complete(&self, prompt: &Prompt) -> AppResult<String>;
}

/// 调用方提供的模型连接信息
#[derive(Debug, Clone)]
pub struct OracleConfig {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
}

/// OpenAI 兼容接口的评分模型
pub struct OpenAiOracle {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl OpenAiOracle {
    pub fn new(config: &OracleConfig) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.api_key)
            .with_api_base(&config.api_base);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.model.clone(),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

fn build_failed(e: impl std::error::Error + Send + Sync + 'static) -> AppError {
    AppError::Oracle(OracleError::RequestBuildFailed {
        source: Box::new(e),
    })
}

#[async_trait]
impl ScoringOracle for OpenAiOracle {
    async fn complete(&self, prompt: &Prompt) -> AppResult<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", prompt.user.len());

        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(prompt.system.as_str())
            .build()
            .map_err(build_failed)?;
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt.user.as_str())
            .build()
            .map_err(build_failed)?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![
                ChatCompletionRequestMessage::System(system_msg),
                ChatCompletionRequestMessage::User(user_msg),
            ])
            .build()
            .map_err(build_failed)?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            AppError::llm_api_failed(&self.model_name, e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| OracleError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        Ok(content.trim().to_string())
    }
}
