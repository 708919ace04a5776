use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::state::ChatMessage;

/// Display name used when the backend doesn't provide one.
pub const DEFAULT_AGENT_NAME: &str = "AI Support Agent";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request could not be sent or the body could not be read.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The body was not the JSON we expected.
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Agent identity served by `GET /api/config`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub agent_name: Option<String>,
}

impl AgentConfig {
    pub fn display_name(&self) -> &str {
        self.agent_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_AGENT_NAME)
    }

    pub fn greeting(&self) -> String {
        format!("Hello! I'm {}. How can I help you today?", self.display_name())
    }
}

/// Body of `POST /api/chat`
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub history: Vec<ChatMessage>,
}

/// Reply from `POST /api/chat`.
///
/// Both fields are kept as raw JSON since the backend is loose about types.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub response: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl ChatResponse {
    /// The error value, if the backend flagged one with a truthy `error`.
    pub fn api_error(&self) -> Option<&Value> {
        self.error.as_ref().filter(|v| is_truthy(v))
    }

    /// The reply text. Strings are used as-is, `null`/missing becomes empty,
    /// anything else is rendered as its JSON text.
    pub fn reply_text(&self) -> String {
        match &self.response {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// JavaScript-style truthiness for a JSON value
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Anything that can carry one chat turn to the support backend
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, ClientError>;
}

#[derive(Clone)]
pub struct SupportClient {
    client: Client,
    base_url: String,
}

impl SupportClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn fetch_config(&self) -> Result<AgentConfig, ClientError> {
        let url = format!("{}/api/config", self.base_url);
        tracing::debug!(%url, "loading agent config");

        let body = self.client.get(&url).send().await?.text().await?;
        let config: AgentConfig = serde_json::from_str(&body)?;
        Ok(config)
    }

    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ClientError> {
        let url = format!("{}/api/chat", self.base_url);
        tracing::debug!(%url, history = request.history.len(), "sending chat message");

        // Status codes are ignored: an error page that still parses as the
        // expected JSON is handled like any other reply.
        let body = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await?
            .text()
            .await?;

        let chat_response: ChatResponse = serde_json::from_str(&body)?;
        Ok(chat_response)
    }
}

#[async_trait]
impl ChatBackend for SupportClient {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, ClientError> {
        self.chat(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(body: &str) -> ChatResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_display_name_fallback() {
        assert_eq!(AgentConfig::default().display_name(), DEFAULT_AGENT_NAME);
        let empty = AgentConfig {
            agent_name: Some(String::new()),
        };
        assert_eq!(empty.display_name(), DEFAULT_AGENT_NAME);
        let named: AgentConfig = serde_json::from_str(r#"{"agent_name":"Alex","tone":"friendly"}"#).unwrap();
        assert_eq!(named.display_name(), "Alex");
        assert_eq!(named.greeting(), "Hello! I'm Alex. How can I help you today?");
    }

    #[test]
    fn test_truthy_error_takes_precedence() {
        let resp = parse(r#"{"response":"hello","error":"quota exceeded"}"#);
        assert_eq!(resp.api_error(), Some(&json!("quota exceeded")));
    }

    #[test]
    fn test_falsy_errors_ignored() {
        for body in [
            r#"{"response":"ok","error":null}"#,
            r#"{"response":"ok","error":false}"#,
            r#"{"response":"ok","error":""}"#,
            r#"{"response":"ok","error":0}"#,
            r#"{"response":"ok"}"#,
        ] {
            let resp = parse(body);
            assert!(resp.api_error().is_none(), "{} should not be an error", body);
            assert_eq!(resp.reply_text(), "ok");
        }
    }

    #[test]
    fn test_empty_object_error_is_truthy() {
        assert!(parse(r#"{"error":{}}"#).api_error().is_some());
    }

    #[test]
    fn test_reply_text_shapes() {
        assert_eq!(parse("{}").reply_text(), "");
        assert_eq!(parse(r#"{"response":null}"#).reply_text(), "");
        assert_eq!(parse(r#"{"response":42}"#).reply_text(), "42");
    }

    #[test]
    fn test_request_body_shape() {
        let request = ChatRequest {
            message: "where is my order?".to_string(),
            history: vec![ChatMessage {
                role: crate::state::ChatRole::User,
                content: "where is my order?".to_string(),
            }],
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "message": "where is my order?",
                "history": [{"role": "user", "content": "where is my order?"}],
            })
        );
    }

    #[test]
    fn test_base_url_trailing_slash() {
        assert_eq!(SupportClient::new("http://localhost:3000/").base_url(), "http://localhost:3000");
    }
}
