//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs basic request/result info, never user text.

use std::sync::Arc;
use axum::{extract::{rejection::JsonRejection, State}, Json, response::IntoResponse};
use tracing::{debug, info, instrument};

use crate::error::AppError;
use crate::protocol::*;
use crate::state::AppState;

/// Unwrap a JSON body, turning extractor rejections into validation errors.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
  payload
    .map(|Json(v)| v)
    .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

#[instrument(level = "info", skip(state))]
pub async fn http_root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(RootOut { message: format!("{} is running", state.app_name) })
}

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut {
    status: "healthy",
    timestamp: chrono::Utc::now(),
    services: ["assessment", "chat_counselor"],
    azure_openai_configured: state.counselor.model_configured(),
  })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_questions(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  // Serialized here: the body borrows the shared catalog.
  Json(QuestionsOut { questions: state.engine.catalog() }).into_response()
}

#[instrument(level = "info", skip(state, payload))]
pub async fn http_post_assessment(
  State(state): State<Arc<AppState>>,
  payload: Result<Json<AssessmentIn>, JsonRejection>,
) -> Result<Json<AssessmentOut>, AppError> {
  let input = body(payload)?;
  debug!(target: "assessment", answers = input.answers.len(), client_timestamp = %input.timestamp, "Assessment submitted");
  let result = state.engine.score(&input.answers)?;
  Ok(Json(AssessmentOut::from(result)))
}

#[instrument(level = "info")]
pub async fn http_get_statistics() -> impl IntoResponse {
  Json(StatisticsOut::empty())
}

#[instrument(level = "info", skip(state, payload))]
pub async fn http_post_chat(
  State(state): State<Arc<AppState>>,
  payload: Result<Json<ChatIn>, JsonRejection>,
) -> Result<Json<ChatOut>, AppError> {
  let input = body(payload)?;
  let history = input.conversation_history.unwrap_or_default();
  let reply = state
    .counselor
    .respond(&input.message, &history, input.user_risk_level.as_deref())
    .await;
  info!(target: "counsel", is_crisis = reply.is_crisis, history_len = history.len(), "HTTP chat turn served");
  Ok(Json(ChatOut::from(reply)))
}

#[instrument(level = "info", skip(state, payload))]
pub async fn http_post_crisis_check(
  State(state): State<Arc<AppState>>,
  payload: Result<Json<CrisisCheckIn>, JsonRejection>,
) -> Result<Json<CrisisCheckOut>, AppError> {
  let input = body(payload)?;
  let signal = state.counselor.detector().check(&input.message);
  Ok(Json(CrisisCheckOut::from(signal)))
}
