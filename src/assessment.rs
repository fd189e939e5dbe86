//! Risk scoring: answers -> total -> percentage -> tier -> recommendations.
//!
//! Everything here is pure. The engine only reads the shared catalog and the
//! per-request answer set, so it can be called concurrently without locking.

use std::{collections::HashMap, sync::Arc};

use tracing::{info, instrument};

use crate::domain::{AssessmentResult, QuestionCatalog, RiskTier, ScoreSummary};
use crate::error::{AppError, AssessmentFailure};
use crate::util::round2;

/// Percentage of the maximum score; 0 when the maximum is 0.
pub fn percentage(total: i64, max: i64) -> f64 {
  if max > 0 { (total as f64 / max as f64) * 100.0 } else { 0.0 }
}

/// Upper bounds are inclusive: 25.0 is Low, 25.01 is Medium.
pub fn tier_for_percentage(pct: f64) -> RiskTier {
  if pct <= 25.0 {
    RiskTier::Low
  } else if pct <= 50.0 {
    RiskTier::Medium
  } else if pct <= 75.0 {
    RiskTier::High
  } else {
    RiskTier::VeryHigh
  }
}

pub fn classify(total: i64, max: i64) -> RiskTier {
  tier_for_percentage(percentage(total, max))
}

/// Tier -> recommendation copy and the emergency contact list.
#[derive(Clone, Debug)]
pub struct Guidance {
  recommendations: HashMap<RiskTier, Vec<String>>,
  emergency_contacts: Vec<String>,
}

impl Guidance {
  /// Labels that do not name a tier are ignored.
  pub fn new(by_label: &HashMap<String, Vec<String>>, emergency_contacts: Vec<String>) -> Self {
    let recommendations = by_label
      .iter()
      .filter_map(|(label, lines)| RiskTier::from_label(label).map(|t| (t, lines.clone())))
      .collect();
    Self { recommendations, emergency_contacts }
  }

  /// A tier without configured copy yields an empty list.
  pub fn recommendations(&self, tier: RiskTier) -> Vec<String> {
    self.recommendations.get(&tier).cloned().unwrap_or_default()
  }

  pub fn emergency_contacts(&self, tier: RiskTier) -> Option<Vec<String>> {
    tier.needs_emergency_contacts().then(|| self.emergency_contacts.clone())
  }
}

pub struct AssessmentEngine {
  catalog: Arc<QuestionCatalog>,
  guidance: Guidance,
  strict: bool,
}

impl AssessmentEngine {
  pub fn new(catalog: Arc<QuestionCatalog>, guidance: Guidance, strict: bool) -> Self {
    Self { catalog, guidance, strict }
  }

  pub fn catalog(&self) -> &QuestionCatalog {
    &self.catalog
  }

  /// Every answer value is summed as-is, including ids the catalog doesn't know.
  /// In strict mode unknown ids and out-of-range values are rejected first.
  #[instrument(level = "info", skip(self, answers), fields(answers = answers.len()))]
  pub fn score(&self, answers: &HashMap<String, i64>) -> Result<AssessmentResult, AppError> {
    if self.strict {
      self.check_answers(answers)?;
    }

    let max = self.max_score()?;
    let total = answers
      .values()
      .try_fold(0i64, |acc, v| acc.checked_add(*v))
      .ok_or(AssessmentFailure::Overflow)?;

    let tier = classify(total, max);
    let pct = percentage(total, max);

    info!(target: "assessment", risk_level = tier.label(), total, max, "Assessment completed");

    Ok(AssessmentResult {
      tier,
      score: ScoreSummary { total, max, percentage: round2(pct) },
      recommendations: self.guidance.recommendations(tier),
      emergency_contacts: self.guidance.emergency_contacts(tier),
    })
  }

  fn max_score(&self) -> Result<i64, AssessmentFailure> {
    let per_question = self.catalog.max_option_value()?;
    let count = i64::try_from(self.catalog.question_count()).map_err(|_| AssessmentFailure::Overflow)?;
    count.checked_mul(per_question).ok_or(AssessmentFailure::Overflow)
  }

  fn check_answers(&self, answers: &HashMap<String, i64>) -> Result<(), AppError> {
    let mut bad: Vec<&str> = answers
      .iter()
      .filter(|(id, value)| match self.catalog.question(id) {
        Some(q) => !q.options.iter().any(|o| o.value == **value),
        None => true,
      })
      .map(|(id, _)| id.as_str())
      .collect();
    if bad.is_empty() {
      return Ok(());
    }
    bad.sort_unstable();
    Err(AppError::Validation(format!("invalid answers for: {}", bad.join(", "))))
  }
}
