use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use super::question::QuestionId;

/// Identifier wrapper for admitted candidates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidateId(pub String);

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

static CANDIDATE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_candidate_id() -> CandidateId {
    let id = CANDIDATE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    CandidateId(format!("cv-{id:06}"))
}

/// A document offered for screening: display name plus extracted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSource {
    pub name: String,
    pub text: String,
}

/// The oracle's verdict for one (candidate, question) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Judgment {
    pub value: JudgmentValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum JudgmentValue {
    /// Numeric judgment on the 0-10 scale. Stored as received; the
    /// aggregator does not clamp out-of-range values.
    Score(f64),
    /// Yes/no judgment.
    Answer(bool),
}

impl JudgmentValue {
    /// Human-readable label used by result views and the CSV export.
    pub fn label(&self) -> String {
        match self {
            JudgmentValue::Score(value) => format!("{value}/10"),
            JudgmentValue::Answer(true) => "Yes".to_string(),
            JudgmentValue::Answer(false) => "No".to_string(),
        }
    }
}

/// Aggregated, weighted result for one candidate. Exclusion is a tag, not
/// a zeroing operation: the raw score survives alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub total_points: f64,
    pub max_points: f64,
    pub percentage: f64,
    pub excluded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excluded_reason: Option<String>,
}

impl Outcome {
    pub fn fraction_label(&self) -> String {
        format!("{}/{}", self.total_points, self.max_points)
    }
}

/// Per-candidate lifecycle. Transitions are owned by the batch runner:
/// `Pending -> Processing -> {Completed | Error}`, with no way out of a
/// terminal state short of admitting a fresh document set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreeningStatus {
    Pending,
    Processing,
    Completed,
    Error,
}

impl ScreeningStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ScreeningStatus::Pending => "pending",
            ScreeningStatus::Processing => "processing",
            ScreeningStatus::Completed => "completed",
            ScreeningStatus::Error => "error",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, ScreeningStatus::Completed | ScreeningStatus::Error)
    }
}

/// One document under evaluation, including everything the oracle and
/// aggregator have produced for it so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub text: String,
    pub judgments: BTreeMap<QuestionId, Judgment>,
    pub outcome: Option<Outcome>,
    pub status: ScreeningStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Candidate {
    pub(crate) fn admitted(document: DocumentSource) -> Self {
        Self {
            id: next_candidate_id(),
            name: document.name,
            text: document.text,
            judgments: BTreeMap::new(),
            outcome: None,
            status: ScreeningStatus::Pending,
            error: None,
        }
    }

    /// Percentage used by filtering and sorting; candidates without an
    /// outcome rank as zero.
    pub fn percentage(&self) -> f64 {
        self.outcome
            .as_ref()
            .map(|outcome| outcome.percentage)
            .unwrap_or(0.0)
    }

    pub fn is_excluded(&self) -> bool {
        self.outcome
            .as_ref()
            .map(|outcome| outcome.excluded)
            .unwrap_or(false)
    }
}
