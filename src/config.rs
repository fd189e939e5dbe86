//! Loading service configuration from the environment plus an optional TOML file.
//!
//! The TOML file (COUNSEL_CONFIG_PATH) can override prompts, crisis content,
//! recommendation copy and the questionnaire itself. See `Settings` and `Prompts`
//! for the expected schema. Model credentials only ever come from the environment.

use std::{collections::HashMap, time::Duration};

use axum::http::HeaderValue;
use serde::Deserialize;
use tracing::{error, info};

use crate::domain::{Category, QuestionCatalog};
use crate::error::AppError;
use crate::seeds;

const DEFAULT_API_VERSION: &str = "2024-02-01";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub app_name: String,
  pub app_version: String,
  pub port: u16,
  pub allowed_origins: Vec<String>,
  /// Reject unknown question ids and out-of-range values instead of summing them.
  pub strict_answers: bool,
  pub prompts: Prompts,
  pub crisis_phrases: Vec<String>,
  pub crisis_resources: Vec<String>,
  /// Tier label -> recommendation lines. A tier missing here gets no recommendations.
  pub recommendations: HashMap<String, Vec<String>>,
  /// Replaces the built-in questionnaire when present.
  pub catalog: Option<Vec<Category>>,
  #[serde(skip)]
  pub model: Option<ModelSettings>,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      app_name: "Gambling Assessment & Counselor API".into(),
      app_version: env!("CARGO_PKG_VERSION").into(),
      port: 8000,
      allowed_origins: vec![
        "http://localhost:5173".into(),
        "http://127.0.0.1:5173".into(),
        "https://www.mindiri.com".into(),
      ],
      strict_answers: false,
      prompts: Prompts::default(),
      crisis_phrases: seeds::crisis_phrases(),
      crisis_resources: seeds::crisis_resources(),
      recommendations: seeds::recommendations(),
      catalog: None,
      model: None,
    }
  }
}

impl Settings {
  pub fn question_catalog(&self) -> QuestionCatalog {
    match &self.catalog {
      Some(categories) => QuestionCatalog::new(categories.clone()),
      None => seeds::reference_catalog(),
    }
  }
}

/// Prompt text for the counselor. Defaults are the built-in Indonesian persona.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub system: String,
  /// `{risk_level}` is replaced with the caller-supplied tier.
  pub risk_addendum_template: String,
  pub fallback_response: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      system: seeds::SYSTEM_PROMPT.into(),
      risk_addendum_template: seeds::RISK_ADDENDUM_TEMPLATE.into(),
      fallback_response: seeds::FALLBACK_RESPONSE.into(),
    }
  }
}

/// Azure OpenAI deployment coordinates.
#[derive(Clone)]
pub struct ModelSettings {
  pub api_key: String,
  pub endpoint: String,
  pub api_version: String,
  pub deployment: String,
  pub timeout: Duration,
}

impl std::fmt::Debug for ModelSettings {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ModelSettings")
      .field("endpoint", &self.endpoint)
      .field("api_version", &self.api_version)
      .field("deployment", &self.deployment)
      .field("timeout", &self.timeout)
      .finish_non_exhaustive()
  }
}

/// Load settings from the process environment.
pub fn load_from_env() -> Result<Settings, AppError> {
  load_with(|key| std::env::var(key).ok())
}

/// Same as `load_from_env` with an injectable variable lookup.
pub fn load_with(var: impl Fn(&str) -> Option<String>) -> Result<Settings, AppError> {
  let mut settings = var("COUNSEL_CONFIG_PATH")
    .and_then(|path| load_toml(&path))
    .unwrap_or_default();

  if let Some(port) = var("PORT") {
    settings.port = port
      .parse()
      .map_err(|_| AppError::Configuration(format!("PORT is not a valid port: {port}")))?;
  }

  if let Some(origins) = var("ALLOWED_ORIGINS") {
    settings.allowed_origins = origins
      .split(',')
      .map(|s| s.trim().to_string())
      .filter(|s| !s.is_empty())
      .collect();
  }
  for origin in &settings.allowed_origins {
    if origin == "*" {
      return Err(AppError::Configuration("wildcard origin cannot be combined with credentials".into()));
    }
    HeaderValue::from_str(origin)
      .map_err(|_| AppError::Configuration(format!("invalid allowed origin: {origin}")))?;
  }

  settings
    .question_catalog()
    .validate()
    .map_err(|e| AppError::Configuration(format!("invalid questionnaire: {e}")))?;

  settings.model = model_settings(&var)?;
  Ok(settings)
}

/// No API key means the model is simply disabled. A key with incomplete
/// coordinates is a configuration error.
fn model_settings(var: &impl Fn(&str) -> Option<String>) -> Result<Option<ModelSettings>, AppError> {
  let api_key = match var("AZURE_OPENAI_API_KEY").filter(|k| !k.trim().is_empty()) {
    Some(k) => k,
    None => return Ok(None),
  };

  let required = |key: &str| {
    var(key)
      .filter(|v| !v.trim().is_empty())
      .ok_or_else(|| AppError::Configuration(format!("{key} must be set when AZURE_OPENAI_API_KEY is set")))
  };
  let endpoint = required("AZURE_OPENAI_ENDPOINT")?;
  let deployment = required("AZURE_OPENAI_DEPLOYMENT_NAME")?;
  let api_version = var("AZURE_OPENAI_API_VERSION")
    .filter(|v| !v.trim().is_empty())
    .unwrap_or_else(|| DEFAULT_API_VERSION.into());

  let timeout_secs = match var("MODEL_TIMEOUT_SECS") {
    Some(s) => s
      .parse::<u64>()
      .ok()
      .filter(|n| *n > 0)
      .ok_or_else(|| AppError::Configuration(format!("MODEL_TIMEOUT_SECS is not a positive integer: {s}")))?,
    None => DEFAULT_TIMEOUT_SECS,
  };

  Ok(Some(ModelSettings {
    api_key,
    endpoint: endpoint.trim_end_matches('/').to_string(),
    api_version,
    deployment,
    timeout: Duration::from_secs(timeout_secs),
  }))
}

/// Read and parse the TOML file. On any parsing/IO error, returns None and the
/// built-in defaults are used.
fn load_toml(path: &str) -> Option<Settings> {
  match std::fs::read_to_string(path) {
    Ok(s) => match toml::from_str::<Settings>(&s) {
      Ok(cfg) => {
        info!(target: "gamcounsel", %path, "Loaded counselor config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "gamcounsel", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "gamcounsel", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
