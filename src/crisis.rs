//! Crisis phrase detection.
//!
//! Plain case-insensitive substring matching against a fixed phrase list. No
//! stemming or fuzzy matching: a typo or an unlisted synonym is a miss.

use std::sync::Arc;

use tracing::warn;

use crate::domain::CrisisSignal;

#[derive(Clone, Debug)]
pub struct CrisisDetector {
  phrases: Arc<[String]>,
  resources: Arc<[String]>,
}

impl CrisisDetector {
  /// Phrases are lower-cased once here so each check only lower-cases the message.
  pub fn new(phrases: Vec<String>, resources: Vec<String>) -> Self {
    let phrases: Vec<String> = phrases
      .into_iter()
      .map(|p| p.trim().to_lowercase())
      .filter(|p| !p.is_empty())
      .collect();
    Self { phrases: phrases.into(), resources: resources.into() }
  }

  /// True if any crisis phrase occurs in the message.
  pub fn detect(&self, message: &str) -> bool {
    let lower = message.to_lowercase();
    match self.phrases.iter().find(|p| lower.contains(p.as_str())) {
      Some(phrase) => {
        warn!(target: "counsel", %phrase, "Crisis phrase detected");
        true
      }
      None => false,
    }
  }

  /// Detection plus the resource list, attached only when a crisis was detected.
  pub fn check(&self, message: &str) -> CrisisSignal {
    let is_crisis = self.detect(message);
    CrisisSignal { is_crisis, resources: is_crisis.then(|| self.resources()) }
  }

  pub fn resources(&self) -> Vec<String> {
    self.resources.to_vec()
  }
}
