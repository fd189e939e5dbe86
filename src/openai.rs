//! Minimal Azure OpenAI chat.completions client behind the `ChatModel` seam.
//!
//! Calls are instrumented and log deployment, latency and token usage (not contents).
//!
//! NOTE: We never log the API key or message bodies.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::config::ModelSettings;
use crate::error::{AppError, ModelError};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  System,
  User,
  Assistant,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
  pub role: Role,
  pub content: String,
}

impl ChatMessage {
  pub fn new(role: Role, content: impl Into<String>) -> Self {
    Self { role, content: content.into() }
  }
}

/// Sampling knobs. Fixed per deployment, never derived from user input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplingParams {
  pub max_tokens: u32,
  pub temperature: f32,
  pub top_p: f32,
}

pub const COUNSEL_SAMPLING: SamplingParams = SamplingParams { max_tokens: 500, temperature: 0.7, top_p: 0.9 };

/// The hosted language model as seen by the counselor: messages in, text out.
#[async_trait]
pub trait ChatModel: Send + Sync {
  async fn generate(&self, messages: &[ChatMessage], params: &SamplingParams) -> Result<String, ModelError>;

  /// Short description for startup logs.
  fn describe(&self) -> String;
}

#[derive(Clone)]
pub struct AzureOpenAI {
  client: reqwest::Client,
  api_key: String,
  endpoint: String,
  api_version: String,
  deployment: String,
  timeout: Duration,
}

impl AzureOpenAI {
  /// Build the long-lived client. The HTTP timeout is the same one the counselor enforces.
  pub fn new(settings: &ModelSettings) -> Result<Self, AppError> {
    let client = reqwest::Client::builder()
      .timeout(settings.timeout)
      .connect_timeout(Duration::from_secs(10))
      .build()
      .map_err(|e| AppError::Configuration(format!("failed to build HTTP client: {e}")))?;

    Ok(Self {
      client,
      api_key: settings.api_key.clone(),
      endpoint: settings.endpoint.clone(),
      api_version: settings.api_version.clone(),
      deployment: settings.deployment.clone(),
      timeout: settings.timeout,
    })
  }

  fn completions_url(&self) -> String {
    format!("{}/openai/deployments/{}/chat/completions", self.endpoint, self.deployment)
  }
}

#[async_trait]
impl ChatModel for AzureOpenAI {
  #[instrument(level = "info", skip(self, messages, params), fields(deployment = %self.deployment, messages = messages.len()))]
  async fn generate(&self, messages: &[ChatMessage], params: &SamplingParams) -> Result<String, ModelError> {
    let req = ChatCompletionRequest {
      messages,
      max_tokens: params.max_tokens,
      temperature: params.temperature,
      top_p: params.top_p,
    };

    let start = Instant::now();
    let res = self.client.post(self.completions_url())
      .query(&[("api-version", self.api_version.as_str())])
      .header(USER_AGENT, concat!("gamcounsel-backend/", env!("CARGO_PKG_VERSION")))
      .header(CONTENT_TYPE, "application/json")
      .header("api-key", &self.api_key)
      .json(&req).send().await
      .map_err(|e| ModelError::from_reqwest(e, self.timeout))?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let message = extract_openai_error(&body).unwrap_or(body);
      return Err(ModelError::Http { status: status.as_u16(), message });
    }

    let body: ChatCompletionResponse = res.json().await
      .map_err(|e| ModelError::from_reqwest(e, self.timeout))?;
    let elapsed = start.elapsed();
    if let Some(usage) = &body.usage {
      info!(?elapsed, prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "Model usage");
    }

    match body.choices.into_iter().next().and_then(|c| c.message.content) {
      Some(text) if !text.trim().is_empty() => Ok(text),
      _ => Err(ModelError::Malformed("response carried no message content".into())),
    }
  }

  fn describe(&self) -> String {
    format!("azure-openai {} ({}, api-version {})", self.deployment, self.endpoint, self.api_version)
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
  messages: &'a [ChatMessage],
  max_tokens: u32,
  temperature: f32,
  top_p: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
  #[serde(default)] choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from an OpenAI-style error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}
