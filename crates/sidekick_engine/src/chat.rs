use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use sidekick_logging::{sidekick_debug, sidekick_warn};
use thiserror::Error;

/// One entry of the model registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Registry key used in configuration, e.g. `cloud_fast`.
    pub key: String,
    /// Provider model id sent on the wire.
    pub id: String,
    /// Human-readable name used in error messages.
    pub name: String,
    #[serde(default)]
    pub context: Option<u64>,
    /// Runs locally; cannot be reached through the HTTP client.
    #[serde(default)]
    pub offline: bool,
}

/// Available chat backends. Passed in as configuration, never global.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRegistry {
    pub models: Vec<ModelSpec>,
}

impl ModelRegistry {
    pub fn get(&self, key: &str) -> Option<&ModelSpec> {
        self.models.iter().find(|model| model.key == key)
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        let cloud = |key: &str, id: &str, name: &str| ModelSpec {
            key: key.to_string(),
            id: id.to_string(),
            name: name.to_string(),
            context: Some(1_000_000),
            offline: false,
        };
        Self {
            models: vec![
                cloud("cloud_fast", "google/gemini-3-flash-preview", "Gemini 3.0 Flash"),
                cloud("cloud_smart", "google/gemini-3-pro-preview", "Gemini 3.0 Pro"),
                cloud("cloud_open", "meta-llama/llama-4-maverick", "Llama 4 Maverick"),
                ModelSpec {
                    key: "local_efficient".to_string(),
                    id: "local/llama-4-scout-4bit".to_string(),
                    name: "Llama 4 Scout (Local)".to_string(),
                    context: None,
                    offline: true,
                },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    pub base_url: String,
    pub api_key_env: String,
    pub active_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
    pub referer: String,
    pub title: String,
    pub registry: ModelRegistry,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai".to_string(),
            api_key_env: "OPENROUTER_API_KEY".to_string(),
            active_model: "cloud_fast".to_string(),
            temperature: 0.7,
            max_tokens: 4096,
            request_timeout_secs: 30,
            referer: "https://lumina.app".to_string(),
            title: "Lumina Sidekick".to_string(),
            registry: ModelRegistry::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("{0} not found in environment")]
    MissingApiKey(String),
    #[error("unknown model {0:?}")]
    UnknownModel(String),
    #[error("model {0} only runs offline")]
    OfflineModel(String),
    #[error("http status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("response contained no message")]
    EmptyResponse,
}

#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    /// Display name of the model answering questions.
    fn model_name(&self) -> &str;

    async fn ask(&self, question: &str) -> Result<String, ChatError>;
}

/// Ask `backend` and fold any failure into a displayable string.
pub async fn answer(backend: &dyn ChatBackend, question: &str) -> String {
    match backend.ask(question).await {
        Ok(text) => text,
        Err(err @ ChatError::MissingApiKey(_)) => format!("Error: {err}."),
        Err(err) => {
            sidekick_warn!("chat request failed: {}", err);
            format!("Cloud Brain Error ({}): {err}", backend.model_name())
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat completions client for OpenRouter.
pub struct OpenRouterClient {
    http: reqwest::Client,
    settings: ChatSettings,
    model: ModelSpec,
    api_key: Option<String>,
}

impl OpenRouterClient {
    /// Resolve the active model and read the API key from the configured
    /// environment variable. A missing key is reported per request.
    pub fn from_env(settings: ChatSettings) -> Result<Self, ChatError> {
        let api_key = std::env::var(&settings.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());
        Self::new(settings, api_key)
    }

    pub fn new(settings: ChatSettings, api_key: Option<String>) -> Result<Self, ChatError> {
        let model = settings
            .registry
            .get(&settings.active_model)
            .cloned()
            .ok_or_else(|| ChatError::UnknownModel(settings.active_model.clone()))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|err| ChatError::Network(err.to_string()))?;
        Ok(Self {
            http,
            settings,
            model,
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/api/v1/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait::async_trait]
impl ChatBackend for OpenRouterClient {
    fn model_name(&self) -> &str {
        &self.model.name
    }

    async fn ask(&self, question: &str) -> Result<String, ChatError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ChatError::MissingApiKey(self.settings.api_key_env.clone()))?;
        if self.model.offline {
            return Err(ChatError::OfflineModel(self.model.name.clone()));
        }

        let body = CompletionRequest {
            model: &self.model.id,
            messages: vec![WireMessage {
                role: "user",
                content: question,
            }],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };
        sidekick_debug!(
            "chat request model={} question_len={}",
            self.model.id,
            question.len()
        );

        let response = self
            .http
            .post(self.endpoint())
            .header(AUTHORIZATION, format!("Bearer {api_key}"))
            .header(CONTENT_TYPE, "application/json")
            .header("HTTP-Referer", &self.settings.referer)
            .header("X-Title", &self.settings.title)
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::HttpStatus {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|err| ChatError::Decode(err.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ChatError::EmptyResponse)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ChatError {
    if err.is_timeout() {
        return ChatError::Timeout;
    }
    ChatError::Network(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_resolves_active_model() {
        let settings = ChatSettings::default();
        let model = settings.registry.get(&settings.active_model).unwrap();
        assert_eq!(model.id, "google/gemini-3-flash-preview");
        assert!(settings.registry.get("local_efficient").unwrap().offline);
    }

    #[test]
    fn unknown_active_model_is_rejected() {
        let settings = ChatSettings {
            active_model: "nope".to_string(),
            ..ChatSettings::default()
        };
        let err = OpenRouterClient::new(settings, None).err();
        assert_eq!(err, Some(ChatError::UnknownModel("nope".to_string())));
    }
}
