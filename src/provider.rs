//! Model Provider Abstraction
//!
//! Unified chat-completion interface over the supported LLM providers (OpenAI, Anthropic,
//! local models via Ollama, custom OpenAI-compatible servers). The generation collaborator
//! talks to whichever client the configuration selects.

use crate::error::ApiError;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

/// Model provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ModelProvider {
    OpenAI {
        model: String,
        api_key: String,
        base_url: Option<String>, // For custom endpoints (e.g., Azure OpenAI)
    },
    Anthropic {
        model: String,
        api_key: String,
    },
    Ollama {
        model: String,
        base_url: Option<String>, // Default: http://localhost:11434
    },
    LocalCustom {
        model: String,
        endpoint: String, // Full endpoint URL (e.g., http://localhost:8080/v1)
        api_key: Option<String>,
    },
}

/// Chat message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Completion options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionOptions {
    pub temperature: Option<f32>, // 0.0-2.0, default: 1.0
    pub max_tokens: Option<u32>,
    /// Ask the provider to constrain output to a JSON object where supported.
    #[serde(default)]
    pub json_mode: bool,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: Some(1.0),
            max_tokens: None,
            json_mode: false,
        }
    }
}

/// Token usage information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Completion response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
    pub usage: TokenUsage,
    pub finish_reason: Option<String>,
}

/// Model provider client trait
#[async_trait]
pub trait ModelProviderClient: Send + Sync {
    /// Generate a completion from a list of messages
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> Result<CompletionResponse, ApiError>;

    /// Get the provider name
    fn provider_name(&self) -> &str;

    /// Get the model name
    fn model_name(&self) -> &str;
}

// OpenAI-compatible API request/response structures
#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<serde_json::Value>,
    stream: bool,
}

impl ChatCompletionRequest {
    fn new(model: &str, messages: Vec<ChatMessage>, options: CompletionOptions) -> Self {
        Self {
            model: model.to_string(),
            messages: messages
                .into_iter()
                .map(|msg| OpenAIMessage {
                    role: role_to_string(msg.role).to_string(),
                    content: msg.content,
                })
                .collect(),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            response_format: options
                .json_mode
                .then(|| json!({ "type": "json_object" })),
            stream: false,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    model: String,
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: OpenAIMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

fn role_to_string(role: MessageRole) -> &'static str {
    match role {
        MessageRole::System => "system",
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
    }
}

// Transport-level failures; timeouts pass through as request failures
fn map_http_error(error: reqwest::Error) -> ApiError {
    if let Some(status) = error.status() {
        map_status_error(status, &error.to_string())
    } else if error.is_timeout() {
        ApiError::ProviderRequestFailed(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        ApiError::ProviderRequestFailed(format!("Connection error: {}", error))
    } else {
        ApiError::ProviderError(format!("HTTP error: {}", error))
    }
}

fn map_status_error(status: StatusCode, body: &str) -> ApiError {
    match status.as_u16() {
        401 => ApiError::ProviderAuthFailed(format!("Authentication failed: {}", body)),
        429 => ApiError::ProviderRateLimit(format!("Rate limit exceeded: {}", body)),
        404 => ApiError::ProviderModelNotFound(format!("Model not found: {}", body)),
        _ => ApiError::ProviderRequestFailed(format!(
            "Request failed with status {}: {}",
            status, body
        )),
    }
}

const PROVIDER_HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const PROVIDER_HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

fn build_provider_http_client() -> Result<Client, ApiError> {
    Client::builder()
        .connect_timeout(PROVIDER_HTTP_CONNECT_TIMEOUT)
        .timeout(PROVIDER_HTTP_REQUEST_TIMEOUT)
        .build()
        .map_err(|e| ApiError::ProviderError(format!("Failed to create HTTP client: {}", e)))
}

async fn send_checked(request: RequestBuilder) -> Result<reqwest::Response, ApiError> {
    let response = request.send().await.map_err(map_http_error)?;
    if !response.status().is_success() {
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(map_status_error(status, &error_text));
    }
    Ok(response)
}

async fn post_chat_completion(request: RequestBuilder) -> Result<CompletionResponse, ApiError> {
    let response = send_checked(request).await?;
    let completion: ChatCompletionResponse = response
        .json()
        .await
        .map_err(|e| ApiError::ProviderError(format!("Failed to parse response: {}", e)))?;

    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::ProviderError("No choices in response".to_string()))?;

    let usage = completion
        .usage
        .map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        })
        .unwrap_or_default();

    Ok(CompletionResponse {
        content: choice.message.content,
        model: completion.model,
        usage,
        finish_reason: choice.finish_reason,
    })
}

/// Client for any OpenAI-compatible `chat/completions` endpoint: OpenAI itself, Ollama, and
/// self-hosted servers.
pub struct ChatCompletionsClient {
    client: Client,
    provider: &'static str,
    model: String,
    url: String,
    api_key: Option<String>,
}

impl ChatCompletionsClient {
    pub fn openai(
        model: String,
        api_key: String,
        base_url: Option<String>,
    ) -> Result<Self, ApiError> {
        let base = base_url.unwrap_or_else(|| "https://api.openai.com/v1".to_string());
        Self::new("openai", model, &base, "chat/completions", Some(api_key))
    }

    pub fn ollama(model: String, base_url: Option<String>) -> Result<Self, ApiError> {
        let base = base_url.unwrap_or_else(|| "http://localhost:11434".to_string());
        Self::new("ollama", model, &base, "v1/chat/completions", None)
    }

    pub fn local(
        model: String,
        endpoint: String,
        api_key: Option<String>,
    ) -> Result<Self, ApiError> {
        Self::new("local", model, &endpoint, "chat/completions", api_key)
    }

    fn new(
        provider: &'static str,
        model: String,
        base: &str,
        path: &str,
        api_key: Option<String>,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            client: build_provider_http_client()?,
            provider,
            model,
            url: format!("{}/{}", base.trim_end_matches('/'), path),
            api_key: api_key.filter(|k| !k.is_empty()),
        })
    }

    /// Full request URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ModelProviderClient for ChatCompletionsClient {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> Result<CompletionResponse, ApiError> {
        let request = ChatCompletionRequest::new(&self.model, messages, options);
        let mut builder = self.client.post(&self.url).json(&request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }
        post_chat_completion(builder).await
    }

    fn provider_name(&self) -> &str {
        self.provider
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Anthropic provider client (Messages API)
pub struct AnthropicClient {
    client: Client,
    model: String,
    api_key: String,
}

impl AnthropicClient {
    pub fn new(model: String, api_key: String) -> Result<Self, ApiError> {
        let client = build_provider_http_client()?;
        Ok(Self {
            client,
            model,
            api_key,
        })
    }
}

#[async_trait]
impl ModelProviderClient for AnthropicClient {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> Result<CompletionResponse, ApiError> {
        let url = "https://api.anthropic.com/v1/messages";

        let system_message = messages
            .iter()
            .filter(|m| m.role == MessageRole::System)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let conversation: Vec<serde_json::Value> = messages
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .map(|m| json!({"role": role_to_string(m.role), "content": m.content}))
            .collect();

        let mut request_body = json!({
            "model": self.model,
            "max_tokens": options.max_tokens.unwrap_or(4096),
            "messages": conversation,
        });
        if !system_message.is_empty() {
            request_body["system"] = json!(system_message);
        }
        if let Some(temp) = options.temperature {
            request_body["temperature"] = json!(temp.min(1.0));
        }

        let response = send_checked(
            self.client
                .post(url)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", "2023-06-01")
                .json(&request_body),
        )
        .await?;

        #[derive(Deserialize)]
        struct AnthropicResponse {
            content: Vec<AnthropicContent>,
            model: String,
            usage: Option<AnthropicUsage>,
            stop_reason: Option<String>,
        }

        #[derive(Deserialize)]
        struct AnthropicContent {
            #[serde(default)]
            text: String,
        }

        #[derive(Deserialize)]
        struct AnthropicUsage {
            input_tokens: u32,
            output_tokens: u32,
        }

        let completion: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| ApiError::ProviderError(format!("Failed to parse response: {}", e)))?;

        let content = completion
            .content
            .into_iter()
            .map(|c| c.text)
            .collect::<Vec<_>>()
            .join("");

        let usage = completion
            .usage
            .map(|u| TokenUsage {
                prompt_tokens: u.input_tokens,
                completion_tokens: u.output_tokens,
                total_tokens: u.input_tokens + u.output_tokens,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            content,
            model: completion.model,
            usage,
            finish_reason: completion.stop_reason,
        })
    }

    fn provider_name(&self) -> &str {
        "anthropic"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Builds a client for a configured provider.
pub struct ProviderFactory;

impl ProviderFactory {
    pub fn create_client(
        provider: &ModelProvider,
    ) -> Result<Box<dyn ModelProviderClient>, ApiError> {
        let client: Box<dyn ModelProviderClient> = match provider {
            ModelProvider::OpenAI {
                model,
                api_key,
                base_url,
            } => Box::new(ChatCompletionsClient::openai(
                model.clone(),
                api_key.clone(),
                base_url.clone(),
            )?),
            ModelProvider::Anthropic { model, api_key } => {
                Box::new(AnthropicClient::new(model.clone(), api_key.clone())?)
            }
            ModelProvider::Ollama { model, base_url } => {
                Box::new(ChatCompletionsClient::ollama(model.clone(), base_url.clone())?)
            }
            ModelProvider::LocalCustom {
                model,
                endpoint,
                api_key,
            } => Box::new(ChatCompletionsClient::local(
                model.clone(),
                endpoint.clone(),
                api_key.clone(),
            )?),
        };
        Ok(client)
    }
}

// Scripted provider for testing
#[cfg(test)]
pub struct MockProvider {
    responses: parking_lot::Mutex<std::collections::VecDeque<Result<String, String>>>,
    pub received: parking_lot::Mutex<Vec<(Vec<ChatMessage>, CompletionOptions)>>,
    model_name: String,
}

#[cfg(test)]
impl MockProvider {
    pub fn new(model_name: &str, responses: Vec<Result<String, String>>) -> Self {
        Self {
            responses: parking_lot::Mutex::new(responses.into()),
            received: parking_lot::Mutex::new(Vec::new()),
            model_name: model_name.to_string(),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl ModelProviderClient for MockProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> Result<CompletionResponse, ApiError> {
        self.received.lock().push((messages, options));
        let next = self
            .responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err("no scripted response".to_string()));
        match next {
            Ok(content) => Ok(CompletionResponse {
                content,
                model: self.model_name.clone(),
                usage: TokenUsage {
                    prompt_tokens: 10,
                    completion_tokens: 20,
                    total_tokens: 30,
                },
                finish_reason: Some("stop".to_string()),
            }),
            Err(message) => Err(ApiError::ProviderRequestFailed(message)),
        }
    }

    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
