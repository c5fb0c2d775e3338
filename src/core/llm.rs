use crate::config::Settings;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    Text,
    JsonObject,
}

/// Chat-completion backend used by agents
///
/// Text in, text out. Agents hold an `Arc<dyn CompletionClient>` handed to them
/// at construction so tests can script replies without a network.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Azure OpenAI chat-completions client
pub struct LLMClient {
    client: Client,
    api_key: String,
    settings: Settings,
    response_format: Option<ResponseFormat>,
    max_retries: u32,
    base_delay_ms: u64,
}

impl LLMClient {
    pub fn new(api_key: String, settings: Settings) -> Self {
        Self {
            client: Client::new(),
            api_key,
            settings,
            response_format: None,
            max_retries: 3,
            base_delay_ms: 1000,
        }
    }

    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    pub fn with_retry(mut self, max_retries: u32, base_delay_ms: u64) -> Self {
        self.max_retries = max_retries.max(1);
        self.base_delay_ms = base_delay_ms;
        self
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.settings.llm.endpoint.trim_end_matches('/'),
            self.settings.llm.deployment,
            self.settings.llm.api_version
        )
    }

    pub async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let request = ChatRequest {
            model: self.settings.llm.model.clone(),
            messages,
            max_tokens: self.settings.llm.max_tokens,
            temperature: self.settings.llm.temperature,
            response_format: self.response_format.clone(),
        };
        let url = self.completions_url();

        let mut last_error = None;

        for attempt in 0..self.max_retries {
            if attempt > 0 {
                let delay = backoff_delay(self.base_delay_ms, attempt);
                tracing::warn!(
                    "[LLMClient] Retrying API call (attempt {}/{}) after {}ms delay",
                    attempt + 1,
                    self.max_retries,
                    delay
                );
                tokio::time::sleep(tokio::time::Duration::from_millis(delay)).await;
            }

            let response_result = self
                .client
                .post(&url)
                .header("api-key", &self.api_key)
                .header("Content-Type", "application/json")
                .json(&request)
                .send()
                .await;

            let response = match response_result {
                Ok(resp) => resp,
                Err(e) => {
                    tracing::warn!("[LLMClient] HTTP request failed: {}", e);
                    last_error = Some(anyhow::anyhow!("HTTP request failed: {}", e));
                    continue;
                }
            };

            let status = response.status();
            if !status.is_success() {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                tracing::warn!(
                    "[LLMClient] API returned error status {}: {}",
                    status,
                    error_text
                );
                last_error = Some(anyhow::anyhow!("API error {}: {}", status, error_text));
                continue;
            }

            let chat_response = match response.json::<ChatResponse>().await {
                Ok(cr) => cr,
                Err(e) => {
                    tracing::warn!("[LLMClient] Failed to decode response body: {}", e);
                    last_error = Some(anyhow::anyhow!("Response decode error: {}", e));
                    continue;
                }
            };

            return Ok(chat_response
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .unwrap_or_default());
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("All retry attempts failed")))
    }
}

/// Exponential backoff for retry `attempt` (1-based), saturating instead of overflowing
fn backoff_delay(base_delay_ms: u64, attempt: u32) -> u64 {
    2_u64
        .checked_pow(attempt.saturating_sub(1))
        .map_or(u64::MAX, |factor| base_delay_ms.saturating_mul(factor))
}

#[async_trait]
impl CompletionClient for LLMClient {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String> {
        self.chat(messages).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings_for(server: &MockServer) -> Settings {
        let mut settings = Settings::default();
        settings.llm.endpoint = server.uri();
        settings.llm.deployment = "gpt-4o-test".to_string();
        settings.llm.api_version = "2024-06-01".to_string();
        settings
    }

    #[tokio::test]
    async fn test_chat_hits_deployment_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/openai/deployments/gpt-4o-test/chat/completions"))
            .and(query_param("api-version", "2024-06-01"))
            .and(header("api-key", "secret"))
            .and(body_partial_json(json!({"model": "gpt-4o"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "hello"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = LLMClient::new("secret".to_string(), settings_for(&server));
        let reply = client.complete(vec![ChatMessage::user("hi")]).await.unwrap();
        assert_eq!(reply, "hello");
    }

    #[test]
    fn test_backoff_delay_saturates() {
        assert_eq!(backoff_delay(1000, 1), 1000);
        assert_eq!(backoff_delay(1000, 3), 4000);
        assert_eq!(backoff_delay(1000, 60), u64::MAX);
        assert_eq!(backoff_delay(1000, 100), u64::MAX);
    }

    #[tokio::test]
    async fn test_chat_retries_then_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(2)
            .mount(&server)
            .await;

        let client =
            LLMClient::new("secret".to_string(), settings_for(&server)).with_retry(2, 1);
        let err = client.chat(vec![ChatMessage::user("hi")]).await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_chat_empty_choices_yields_empty_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let client = LLMClient::new("secret".to_string(), settings_for(&server));
        assert_eq!(client.chat(vec![]).await.unwrap(), "");
    }
}
