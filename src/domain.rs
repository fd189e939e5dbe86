//! Domain models used by the backend: questionnaire catalog, risk tiers, scores,
//! conversation turns and the crisis signal.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// One selectable answer of a question.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnswerOption {
  pub value: i64,
  pub label: String,
}

/// How the questionnaire renders a question. Only radio groups exist today.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
  #[default]
  Radio,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Question {
  pub id: String,
  pub text: String,
  #[serde(rename = "type", default)]
  pub kind: QuestionKind,
  pub options: Vec<AnswerOption>,
}

impl Question {
  /// Highest option value, or None for a question without options.
  pub fn max_value(&self) -> Option<i64> {
    self.options.iter().map(|o| o.value).max()
  }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Category {
  #[serde(rename = "category")]
  pub name: String,
  pub questions: Vec<Question>,
}

/// The ordered questionnaire. Immutable once loaded; shared behind an `Arc`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct QuestionCatalog {
  pub categories: Vec<Category>,
}

impl QuestionCatalog {
  pub fn new(categories: Vec<Category>) -> Self {
    Self { categories }
  }

  pub fn questions(&self) -> impl Iterator<Item = &Question> {
    self.categories.iter().flat_map(|c| c.questions.iter())
  }

  pub fn question_count(&self) -> usize {
    self.categories.iter().map(|c| c.questions.len()).sum()
  }

  pub fn question(&self, id: &str) -> Option<&Question> {
    self.questions().find(|q| q.id == id)
  }

  /// The value range shared by every question. Scoring assumes a single range
  /// across the catalog, so mixed ranges are rejected here.
  pub fn max_option_value(&self) -> Result<i64, CatalogError> {
    let mut shared: Option<i64> = None;
    for q in self.questions() {
      let max = q.max_value().ok_or_else(|| CatalogError::NoOptions(q.id.clone()))?;
      match shared {
        None => shared = Some(max),
        Some(m) if m != max => {
          return Err(CatalogError::MixedRanges { id: q.id.clone(), expected: m, found: max });
        }
        Some(_) => {}
      }
    }
    shared.ok_or(CatalogError::Empty)
  }

  /// Structural checks run once at startup.
  /// Option values must be exactly 0..=n in order, ids must be unique.
  pub fn validate(&self) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for q in self.questions() {
      if !seen.insert(q.id.as_str()) {
        return Err(CatalogError::DuplicateId(q.id.clone()));
      }
      if q.options.is_empty() {
        return Err(CatalogError::NoOptions(q.id.clone()));
      }
      let contiguous = q.options.iter().enumerate().all(|(i, o)| o.value == i as i64);
      if !contiguous {
        return Err(CatalogError::NonContiguous(q.id.clone()));
      }
    }
    self.max_option_value().map(|_| ())
  }
}

/// Risk severity, ordered from least to most severe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskTier {
  Low,
  Medium,
  High,
  VeryHigh,
}

impl RiskTier {
  pub const ALL: [RiskTier; 4] = [RiskTier::Low, RiskTier::Medium, RiskTier::High, RiskTier::VeryHigh];

  /// Display label used on the wire and as the lookup key in configuration.
  pub fn label(self) -> &'static str {
    match self {
      RiskTier::Low => "Rendah",
      RiskTier::Medium => "Sedang",
      RiskTier::High => "Tinggi",
      RiskTier::VeryHigh => "Sangat Tinggi",
    }
  }

  pub fn color(self) -> &'static str {
    match self {
      RiskTier::Low => "emerald",
      RiskTier::Medium => "yellow",
      RiskTier::High => "orange",
      RiskTier::VeryHigh => "red",
    }
  }

  pub fn description(self) -> &'static str {
    match self {
      RiskTier::Low => "Risiko rendah kecanduan judi",
      RiskTier::Medium => "Risiko sedang - perlu perhatian",
      RiskTier::High => "Risiko tinggi - perlu bantuan profesional",
      RiskTier::VeryHigh => "Risiko sangat tinggi - segera cari bantuan",
    }
  }

  pub fn from_label(label: &str) -> Option<RiskTier> {
    RiskTier::ALL.into_iter().find(|t| t.label() == label)
  }

  /// Tiers that get the emergency contact list attached.
  pub fn needs_emergency_contacts(self) -> bool {
    self >= RiskTier::High
  }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScoreSummary {
  pub total: i64,
  pub max: i64,
  /// Rounded to two decimals, display only.
  pub percentage: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AssessmentResult {
  pub tier: RiskTier,
  pub score: ScoreSummary,
  pub recommendations: Vec<String>,
  /// None means "not needed", which is different from an empty list.
  pub emergency_contacts: Option<Vec<String>>,
}

/// Who said a line of the conversation. System turns never come from clients.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
  User,
  Assistant,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ConversationTurn {
  pub role: Speaker,
  pub content: String,
}

/// Result of a crisis check on a single message. Nothing is remembered between calls.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct CrisisSignal {
  pub is_crisis: bool,
  pub resources: Option<Vec<String>>,
}
