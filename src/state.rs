//! Application state: immutable questionnaire, scoring engine, counselor and
//! the optional model client.
//!
//! Everything is built once at startup from `Settings` and shared read-only
//! behind an `Arc`. Nothing here is mutated per request.

use std::{sync::Arc, time::Duration};

use tracing::{info, instrument};

use crate::assessment::{AssessmentEngine, Guidance};
use crate::config::Settings;
use crate::counsel::Counselor;
use crate::crisis::CrisisDetector;
use crate::error::AppError;
use crate::openai::{AzureOpenAI, ChatModel};

const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(30);

pub struct AppState {
    pub app_name: String,
    pub engine: AssessmentEngine,
    pub counselor: Counselor,
}

impl AppState {
    /// Build state from settings, constructing the Azure client when credentials are present.
    #[instrument(level = "info", skip_all)]
    pub fn new(settings: &Settings) -> Result<Self, AppError> {
        let model: Option<Arc<dyn ChatModel>> = match &settings.model {
            Some(m) => Some(Arc::new(AzureOpenAI::new(m)?)),
            None => None,
        };
        Ok(Self::with_model(settings, model))
    }

    /// Same as `new` with an injected model (or none).
    pub fn with_model(settings: &Settings, model: Option<Arc<dyn ChatModel>>) -> Self {
        let catalog = Arc::new(settings.question_catalog());
        info!(
            target: "gamcounsel",
            categories = catalog.categories.len(),
            questions = catalog.question_count(),
            strict_answers = settings.strict_answers,
            "Questionnaire loaded"
        );

        if let Some(m) = &model {
            info!(target: "gamcounsel", model = %m.describe(), "Model backend enabled.");
        } else {
            info!(target: "gamcounsel", "Model backend disabled (no AZURE_OPENAI_API_KEY). Chat returns the fallback response.");
        }

        let guidance = Guidance::new(&settings.recommendations, settings.crisis_resources.clone());
        let detector = CrisisDetector::new(settings.crisis_phrases.clone(), settings.crisis_resources.clone());
        let timeout = settings.model.as_ref().map(|m| m.timeout).unwrap_or(DEFAULT_MODEL_TIMEOUT);

        Self {
            app_name: settings.app_name.clone(),
            engine: AssessmentEngine::new(catalog, guidance, settings.strict_answers),
            counselor: Counselor::new(detector, settings.prompts.clone(), model, timeout),
        }
    }
}
