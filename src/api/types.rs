use serde::{Deserialize, Serialize};

/// `POST /daily` 请求体
#[derive(Debug, Clone, Deserialize)]
pub struct DailyRequest {
    #[serde(default)]
    pub interests: Vec<String>,
    pub openai_api_base: String,
    pub openai_api_key: String,
    /// 缺省时使用配置中的默认模型
    #[serde(default)]
    pub model: Option<String>,
}

/// 统一的响应体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_request_without_model() {
        let body = r#"{
            "interests": ["program repair"],
            "openai_api_base": "http://localhost:8000/v1",
            "openai_api_key": "sk-test"
        }"#;
        let req: DailyRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.interests, vec!["program repair"]);
        assert!(req.model.is_none());
    }

    #[test]
    fn test_message_response_shape() {
        let json = serde_json::to_value(MessageResponse::new("pong")).unwrap();
        assert_eq!(json, serde_json::json!({ "message": "pong" }));
    }
}
