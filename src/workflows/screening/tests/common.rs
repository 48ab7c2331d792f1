use std::collections::BTreeMap;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::oracle::{JudgmentOracle, OracleError};
use crate::workflows::screening::{
    Candidate, CandidateId, DocumentSource, Judgment, JudgmentValue, Outcome, Question, QuestionId,
    QuestionRubric, ScreeningService, ScreeningStatus,
};

pub(super) fn scale_question(id: &str, text: &str, weight: u32) -> Question {
    Question {
        id: QuestionId(id.to_string()),
        text: text.to_string(),
        guidance: None,
        rubric: QuestionRubric::Scale { weight },
    }
}

pub(super) fn filter_question(id: &str, text: &str, expected_answer: bool) -> Question {
    Question {
        id: QuestionId(id.to_string()),
        text: text.to_string(),
        guidance: None,
        rubric: QuestionRubric::Filter { expected_answer },
    }
}

pub(super) fn yesno_question(id: &str, text: &str, points: u32) -> Question {
    Question {
        id: QuestionId(id.to_string()),
        text: text.to_string(),
        guidance: None,
        rubric: QuestionRubric::YesNo { points },
    }
}

pub(super) fn document(name: &str, text: &str) -> DocumentSource {
    DocumentSource {
        name: name.to_string(),
        text: text.to_string(),
    }
}

pub(super) fn score(value: f64) -> Judgment {
    Judgment {
        value: JudgmentValue::Score(value),
        explanation: None,
    }
}

pub(super) fn answer(value: bool) -> Judgment {
    Judgment {
        value: JudgmentValue::Answer(value),
        explanation: None,
    }
}

pub(super) fn judgments(entries: Vec<(&str, Judgment)>) -> BTreeMap<QuestionId, Judgment> {
    entries
        .into_iter()
        .map(|(id, judgment)| (QuestionId(id.to_string()), judgment))
        .collect()
}

/// Candidate in a chosen lifecycle state, for view and export tests that
/// bypass the orchestrator.
pub(super) fn candidate_with_outcome(
    name: &str,
    percentage: f64,
    excluded: bool,
    status: ScreeningStatus,
) -> Candidate {
    let outcome = status.is_terminal().then(|| Outcome {
        total_points: percentage,
        max_points: 100.0,
        percentage,
        excluded,
        excluded_reason: excluded.then(|| format!("Failed filter: \"{name}\"")),
    });

    Candidate {
        id: CandidateId(format!("cv-test-{name}")),
        name: name.to_string(),
        text: "text".to_string(),
        judgments: BTreeMap::new(),
        outcome,
        status,
        error: None,
    }
}

/// Oracle double replying from a script keyed by question id; unknown
/// questions fail the call, which exercises the fallback path.
#[derive(Default)]
pub(super) struct ScriptedOracle {
    replies: BTreeMap<String, JudgmentValue>,
    calls: AtomicUsize,
}

impl ScriptedOracle {
    pub(super) fn new() -> Self {
        Self::default()
    }

    pub(super) fn with_reply(mut self, question_id: &str, value: JudgmentValue) -> Self {
        self.replies.insert(question_id.to_string(), value);
        self
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl JudgmentOracle for ScriptedOracle {
    async fn judge(
        &self,
        _document: &str,
        question: &Question,
        _guidance: &str,
    ) -> Result<Judgment, OracleError> {
        self.calls.fetch_add(1, Ordering::Relaxed);

        match self.replies.get(&question.id.0) {
            Some(value) => Ok(Judgment {
                value: *value,
                explanation: Some("scripted".to_string()),
            }),
            None => Err(OracleError::EmptyReply {
                model: "scripted".to_string(),
            }),
        }
    }
}

/// Oracle double that fails every call.
pub(super) struct FailingOracle;

impl JudgmentOracle for FailingOracle {
    async fn judge(
        &self,
        _document: &str,
        _question: &Question,
        _guidance: &str,
    ) -> Result<Judgment, OracleError> {
        Err(OracleError::request(
            "failing",
            io::Error::new(io::ErrorKind::ConnectionReset, "transport down"),
        ))
    }
}

/// Oracle double that answers slowly, for in-flight re-entrancy checks.
pub(super) struct SlowOracle {
    pub(super) delay: Duration,
}

impl JudgmentOracle for SlowOracle {
    async fn judge(
        &self,
        _document: &str,
        _question: &Question,
        _guidance: &str,
    ) -> Result<Judgment, OracleError> {
        tokio::time::sleep(self.delay).await;
        Ok(Judgment {
            value: JudgmentValue::Score(5.0),
            explanation: None,
        })
    }
}

pub(super) fn build_service<O: JudgmentOracle>(oracle: O) -> Arc<ScreeningService<O>> {
    Arc::new(ScreeningService::new(oracle))
}
