//! One counseling chat turn: crisis check, prompt assembly, model call, reply.
//!
//! The counselor holds no per-conversation state. History arrives with each
//! request and only the most recent `HISTORY_WINDOW` turns are forwarded.

use std::{sync::Arc, time::Duration};

use tracing::{error, info, instrument, warn};

use crate::config::Prompts;
use crate::crisis::CrisisDetector;
use crate::domain::{ConversationTurn, CrisisSignal, Speaker};
use crate::error::ModelError;
use crate::openai::{ChatMessage, ChatModel, Role, SamplingParams, COUNSEL_SAMPLING};
use crate::util::{fill_template, trunc_for_log};

pub const HISTORY_WINDOW: usize = 10;

/// Prompt set ready to send plus the crisis signal of the current message.
#[derive(Clone, Debug, PartialEq)]
pub struct ComposedTurn {
  pub messages: Vec<ChatMessage>,
  pub crisis: CrisisSignal,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CounselReply {
  pub response: String,
  pub is_crisis: bool,
  pub crisis_resources: Option<Vec<String>>,
}

pub struct Counselor {
  detector: CrisisDetector,
  prompts: Prompts,
  model: Option<Arc<dyn ChatModel>>,
  sampling: SamplingParams,
  timeout: Duration,
}

impl Counselor {
  pub fn new(detector: CrisisDetector, prompts: Prompts, model: Option<Arc<dyn ChatModel>>, timeout: Duration) -> Self {
    Self { detector, prompts, model, sampling: COUNSEL_SAMPLING, timeout }
  }

  pub fn detector(&self) -> &CrisisDetector {
    &self.detector
  }

  pub fn model_configured(&self) -> bool {
    self.model.is_some()
  }

  /// Base persona, then the tier directive after a blank line when a tier is known.
  pub fn system_prompt(&self, risk_level: Option<&str>) -> String {
    match risk_level.filter(|l| !l.is_empty()) {
      Some(level) => {
        let addendum = fill_template(&self.prompts.risk_addendum_template, &[("risk_level", level)]);
        format!("{}\n\n{}", self.prompts.system, addendum)
      }
      None => self.prompts.system.clone(),
    }
  }

  /// [system] + last `HISTORY_WINDOW` history turns in order + [current user message].
  pub fn compose(&self, message: &str, history: &[ConversationTurn], risk_level: Option<&str>) -> ComposedTurn {
    let crisis = self.detector.check(message);

    let recent = &history[history.len().saturating_sub(HISTORY_WINDOW)..];
    let mut messages = Vec::with_capacity(recent.len() + 2);
    messages.push(ChatMessage::new(Role::System, self.system_prompt(risk_level)));
    messages.extend(recent.iter().map(|turn| {
      let role = match turn.role {
        Speaker::User => Role::User,
        Speaker::Assistant => Role::Assistant,
      };
      ChatMessage::new(role, turn.content.clone())
    }));
    messages.push(ChatMessage::new(Role::User, message));

    ComposedTurn { messages, crisis }
  }

  /// Run one turn. Model failures never escape: they are logged and answered
  /// with the fixed fallback text, `is_crisis=false` and no resources.
  #[instrument(level = "info", skip_all, fields(message_len = message.len(), history_len = history.len(), has_risk_level = risk_level.is_some()))]
  pub async fn respond(&self, message: &str, history: &[ConversationTurn], risk_level: Option<&str>) -> CounselReply {
    let turn = self.compose(message, history, risk_level);

    match self.call_model(&turn.messages).await {
      Ok(response) => {
        info!(
          target: "counsel",
          user_preview = %trunc_for_log(message, 100),
          reply_preview = %trunc_for_log(&response, 100),
          is_crisis = turn.crisis.is_crisis,
          risk_level = risk_level.unwrap_or("-"),
          "Counsel turn completed"
        );
        CounselReply { response, is_crisis: turn.crisis.is_crisis, crisis_resources: turn.crisis.resources }
      }
      Err(e) => {
        error!(target: "counsel", error = %e, "Model call failed; returning fallback response");
        if turn.crisis.is_crisis {
          warn!(target: "counsel", "Crisis phrase was detected but is not reported on the fallback path");
        }
        self.fallback()
      }
    }
  }

  pub fn fallback(&self) -> CounselReply {
    CounselReply { response: self.prompts.fallback_response.clone(), is_crisis: false, crisis_resources: None }
  }

  /// Bounded by `timeout`. Dropping the returned future (client went away) aborts the HTTP call.
  async fn call_model(&self, messages: &[ChatMessage]) -> Result<String, ModelError> {
    let model = self.model.as_ref().ok_or(ModelError::NotConfigured)?;
    match tokio::time::timeout(self.timeout, model.generate(messages, &self.sampling)).await {
      Ok(result) => result,
      Err(_) => Err(ModelError::Timeout(self.timeout)),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::seeds;
  use async_trait::async_trait;
  use std::sync::Mutex;

  /// Records what it was sent and answers from a script.
  struct ScriptedModel {
    reply: Result<String, ()>,
    delay: Option<Duration>,
    seen: Mutex<Vec<Vec<ChatMessage>>>,
  }

  impl ScriptedModel {
    fn ok(text: &str) -> Arc<Self> {
      Arc::new(Self { reply: Ok(text.into()), delay: None, seen: Mutex::new(vec![]) })
    }
    fn failing() -> Arc<Self> {
      Arc::new(Self { reply: Err(()), delay: None, seen: Mutex::new(vec![]) })
    }
    fn slow(delay: Duration) -> Arc<Self> {
      Arc::new(Self { reply: Ok("late".into()), delay: Some(delay), seen: Mutex::new(vec![]) })
    }
  }

  #[async_trait]
  impl ChatModel for ScriptedModel {
    async fn generate(&self, messages: &[ChatMessage], params: &SamplingParams) -> Result<String, ModelError> {
      assert_eq!(*params, COUNSEL_SAMPLING);
      self.seen.lock().unwrap().push(messages.to_vec());
      if let Some(d) = self.delay {
        tokio::time::sleep(d).await;
      }
      self.reply.clone().map_err(|_| ModelError::Http { status: 401, message: "invalid key".into() })
    }

    fn describe(&self) -> String {
      "scripted".into()
    }
  }

  fn counselor(model: Option<Arc<dyn ChatModel>>) -> Counselor {
    Counselor::new(
      CrisisDetector::new(seeds::crisis_phrases(), seeds::crisis_resources()),
      Prompts::default(),
      model,
      Duration::from_secs(5),
    )
  }

  fn history(n: usize) -> Vec<ConversationTurn> {
    (0..n)
      .map(|i| ConversationTurn {
        role: if i % 2 == 0 { Speaker::User } else { Speaker::Assistant },
        content: format!("turn {i}"),
      })
      .collect()
  }

  #[test]
  fn history_is_truncated_to_the_most_recent_ten() {
    let c = counselor(None);
    let turn = c.compose("sekarang", &history(15), None);
    assert_eq!(turn.messages.len(), 12);
    assert_eq!(turn.messages[0].role, Role::System);
    assert_eq!(turn.messages[1].content, "turn 5");
    assert_eq!(turn.messages[1].role, Role::Assistant);
    assert_eq!(turn.messages[10].content, "turn 14");
    assert_eq!(turn.messages[11], ChatMessage::new(Role::User, "sekarang"));
  }

  #[test]
  fn short_history_is_forwarded_whole() {
    let c = counselor(None);
    assert_eq!(c.compose("hi", &[], None).messages.len(), 2);
    assert_eq!(c.compose("hi", &history(3), None).messages.len(), 5);
  }

  #[test]
  fn risk_level_is_appended_after_a_blank_line() {
    let c = counselor(None);
    let base = c.system_prompt(None);
    assert_eq!(base, seeds::SYSTEM_PROMPT);

    let with_tier = c.system_prompt(Some("Tinggi"));
    let (head, tail) = with_tier.split_once("\n\nINFORMASI PENGGUNA").unwrap();
    assert_eq!(head, seeds::SYSTEM_PROMPT);
    assert!(tail.contains("'Tinggi'"));

    assert_eq!(c.system_prompt(Some("")), base);
  }

  #[test]
  fn risk_level_is_forwarded_verbatim() {
    let c = counselor(None);
    assert!(c.system_prompt(Some(" Tinggi ")).contains("' Tinggi '"));
    assert_ne!(c.system_prompt(Some("  ")), c.system_prompt(None));
  }

  #[test]
  fn compose_carries_the_crisis_signal() {
    let c = counselor(None);
    let turn = c.compose("saya ingin mengakhiri hidup", &[], None);
    assert!(turn.crisis.is_crisis);
    assert!(turn.crisis.resources.is_some());
  }

  #[tokio::test]
  async fn successful_turn_reports_crisis_and_resources() {
    let model = ScriptedModel::ok("Saya di sini untuk Anda.");
    let c = counselor(Some(model.clone()));
    let reply = c.respond("BUNUH DIRI rasanya", &history(2), Some("Sedang")).await;
    assert_eq!(reply.response, "Saya di sini untuk Anda.");
    assert!(reply.is_crisis);
    assert_eq!(reply.crisis_resources, Some(seeds::crisis_resources()));

    let seen = model.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].len(), 4);
    assert!(seen[0][0].content.contains("'Sedang'"));
  }

  #[tokio::test]
  async fn calm_turn_has_no_resources() {
    let c = counselor(Some(ScriptedModel::ok("Baik.")));
    let reply = c.respond("saya ingin makan siang", &[], None).await;
    assert!(!reply.is_crisis);
    assert_eq!(reply.crisis_resources, None);
  }

  #[tokio::test]
  async fn model_failure_returns_fallback_without_crisis_even_when_detected() {
    let c = counselor(Some(ScriptedModel::failing()));
    let reply = c.respond("saya ingin mengakhiri hidup", &[], None).await;
    assert_eq!(reply.response, seeds::FALLBACK_RESPONSE);
    assert!(!reply.is_crisis);
    assert_eq!(reply.crisis_resources, None);
    assert!(reply.response.contains("119"));
  }

  #[tokio::test]
  async fn missing_model_returns_fallback() {
    let c = counselor(None);
    assert_eq!(c.respond("halo", &[], None).await, c.fallback());
  }

  #[tokio::test(start_paused = true)]
  async fn slow_model_times_out_into_fallback() {
    let mut c = counselor(Some(ScriptedModel::slow(Duration::from_secs(60))));
    c.timeout = Duration::from_secs(1);
    let reply = c.respond("halo", &[], None).await;
    assert_eq!(reply, c.fallback());
  }
}
