//! Public protocol structs for the HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::counsel::CounselReply;
use crate::domain::{AssessmentResult, ConversationTurn, CrisisSignal, QuestionCatalog};

//
// Assessment
//

#[derive(Debug, Serialize)]
pub struct QuestionsOut<'a> {
    pub questions: &'a QuestionCatalog,
}

/// Submitted answers. `timestamp` is client-supplied and not used for scoring.
#[derive(Debug, Deserialize)]
pub struct AssessmentIn {
    pub answers: HashMap<String, i64>,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct RiskAssessmentOut {
    pub level: String,
    pub color: String,
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ScoreOut {
    pub total_score: i64,
    pub max_score: i64,
    pub percentage: f64,
}

/// `emergency_contacts` is serialized as `null` when not needed.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct AssessmentOut {
    pub risk_assessment: RiskAssessmentOut,
    pub score: ScoreOut,
    pub recommendations: Vec<String>,
    pub emergency_contacts: Option<Vec<String>>,
}

impl From<AssessmentResult> for AssessmentOut {
    fn from(r: AssessmentResult) -> Self {
        Self {
            risk_assessment: RiskAssessmentOut {
                level: r.tier.label().into(),
                color: r.tier.color().into(),
                description: r.tier.description().into(),
            },
            score: ScoreOut {
                total_score: r.score.total,
                max_score: r.score.max,
                percentage: r.score.percentage,
            },
            recommendations: r.recommendations,
            emergency_contacts: r.emergency_contacts,
        }
    }
}

/// Placeholder statistics. Nothing is persisted, so every count is zero.
#[derive(Debug, Serialize)]
pub struct StatisticsOut {
    pub total_assessments: u64,
    pub risk_distribution: RiskDistribution,
}

#[derive(Debug, Serialize, Default)]
pub struct RiskDistribution {
    #[serde(rename = "Rendah")]
    pub low: u64,
    #[serde(rename = "Sedang")]
    pub medium: u64,
    #[serde(rename = "Tinggi")]
    pub high: u64,
    #[serde(rename = "Sangat Tinggi")]
    pub very_high: u64,
}

impl StatisticsOut {
    pub fn empty() -> Self {
        Self { total_assessments: 0, risk_distribution: RiskDistribution::default() }
    }
}

//
// Chat
//

#[derive(Debug, Deserialize)]
pub struct ChatIn {
    pub message: String,
    #[serde(default)]
    pub conversation_history: Option<Vec<ConversationTurn>>,
    #[serde(default)]
    pub user_risk_level: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatOut {
    pub response: String,
    pub is_crisis: bool,
    pub crisis_resources: Option<Vec<String>>,
}

impl From<CounselReply> for ChatOut {
    fn from(r: CounselReply) -> Self {
        Self { response: r.response, is_crisis: r.is_crisis, crisis_resources: r.crisis_resources }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct CrisisCheckIn {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct CrisisCheckOut {
    pub is_crisis: bool,
    pub crisis_resources: Option<Vec<String>>,
}

impl From<CrisisSignal> for CrisisCheckOut {
    fn from(s: CrisisSignal) -> Self {
        Self { is_crisis: s.is_crisis, crisis_resources: s.resources }
    }
}

//
// Service
//

#[derive(Serialize)]
pub struct RootOut {
    pub message: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub services: [&'static str; 2],
    pub azure_openai_configured: bool,
}
