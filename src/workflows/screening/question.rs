use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for screening questions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QuestionId(pub String);

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated screening question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub guidance: Option<String>,
    pub rubric: QuestionRubric,
}

/// How a question contributes to the outcome. The filter/scored split is a
/// tagged variant so a filter without an expected answer cannot be built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum QuestionRubric {
    /// Numeric 0-10 judgment, multiplied by `weight`.
    Scale { weight: u32 },
    /// Exclusionary yes/no: a mismatch against `expected_answer` excludes
    /// the candidate. Filters carry no points.
    Filter { expected_answer: bool },
    /// Scored yes/no worth `points` when answered yes.
    YesNo { points: u32 },
}

impl Question {
    /// Maximum contribution of this question to an outcome's denominator.
    /// Filters contribute nothing on either side of the fraction.
    pub fn effective_max_points(&self) -> f64 {
        match self.rubric {
            QuestionRubric::Scale { weight } => 10.0 * f64::from(weight),
            QuestionRubric::YesNo { points } => f64::from(points),
            QuestionRubric::Filter { .. } => 0.0,
        }
    }

    pub fn is_filter(&self) -> bool {
        matches!(self.rubric, QuestionRubric::Filter { .. })
    }
}

/// Wire representation of a question as submitted by callers. Optional
/// fields mirror the intake form; `try_into_question` is the validation
/// gate that produces the tagged domain value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    #[serde(default = "default_weight")]
    pub weight: u32,
    #[serde(default)]
    pub guidance: Option<String>,
    #[serde(default)]
    pub is_filter: bool,
    #[serde(default)]
    pub expected_answer: Option<bool>,
    #[serde(default)]
    pub points: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Score,
    YesNo,
}

const DEFAULT_YES_POINTS: u32 = 10;

fn default_weight() -> u32 {
    1
}

/// Malformed question definitions are rejected here, before anything
/// reaches the engine.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("question id must not be blank")]
    BlankId,
    #[error("question '{id}' has no text")]
    BlankText { id: String },
    #[error("question '{id}' has zero weight; weights must be positive")]
    ZeroWeight { id: String },
    #[error("question '{id}' is a filter but declares no expected answer")]
    MissingExpectedAnswer { id: String },
    #[error("question '{id}' is a score question and cannot be a filter")]
    FilterOnScoreQuestion { id: String },
    #[error("duplicate question id '{id}'")]
    DuplicateId { id: String },
}

impl QuestionDraft {
    pub fn try_into_question(self) -> Result<Question, ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::BlankId);
        }
        if self.text.trim().is_empty() {
            return Err(ValidationError::BlankText { id: self.id });
        }

        let rubric = match self.kind {
            QuestionKind::Score => {
                if self.is_filter {
                    return Err(ValidationError::FilterOnScoreQuestion { id: self.id });
                }
                if self.weight == 0 {
                    return Err(ValidationError::ZeroWeight { id: self.id });
                }
                QuestionRubric::Scale {
                    weight: self.weight,
                }
            }
            QuestionKind::YesNo if self.is_filter => match self.expected_answer {
                Some(expected_answer) => QuestionRubric::Filter { expected_answer },
                None => return Err(ValidationError::MissingExpectedAnswer { id: self.id }),
            },
            QuestionKind::YesNo => QuestionRubric::YesNo {
                points: self.points.unwrap_or(DEFAULT_YES_POINTS),
            },
        };

        Ok(Question {
            id: QuestionId(self.id),
            text: self.text,
            guidance: self.guidance.filter(|guidance| !guidance.trim().is_empty()),
            rubric,
        })
    }
}

/// Validate a whole question set: every draft individually, plus id
/// uniqueness across the set.
pub fn validate_question_set(drafts: Vec<QuestionDraft>) -> Result<Vec<Question>, ValidationError> {
    let mut seen = BTreeSet::new();
    let mut questions = Vec::with_capacity(drafts.len());

    for draft in drafts {
        let question = draft.try_into_question()?;
        if !seen.insert(question.id.clone()) {
            return Err(ValidationError::DuplicateId {
                id: question.id.0.clone(),
            });
        }
        questions.push(question);
    }

    Ok(questions)
}
