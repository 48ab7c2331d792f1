use std::collections::BTreeMap;

use futures::future;
use tracing::warn;

use super::domain::{Judgment, JudgmentValue};
use super::question::{Question, QuestionId, QuestionRubric};
use crate::oracle::JudgmentOracle;

/// Explanation recorded when an oracle call fails and the question falls
/// back to its zero-value judgment.
pub const FALLBACK_EXPLANATION: &str = "Error analyzing this question";

/// Whole-candidate evaluation failure. Per-question oracle errors are
/// recovered locally and never surface here.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error("document contains no text to evaluate")]
    EmptyDocument,
}

/// Drives the oracle over every question for a single document.
pub struct CandidateEvaluator<'a, O> {
    oracle: &'a O,
}

impl<'a, O: JudgmentOracle> CandidateEvaluator<'a, O> {
    pub fn new(oracle: &'a O) -> Self {
        Self { oracle }
    }

    /// Evaluate one document against every question concurrently and join
    /// before returning: the map always carries an entry per question.
    ///
    /// A failing oracle call is replaced by the fallback judgment for that
    /// question, which then participates in scoring and filter logic like
    /// any real answer would. The warn log is what keeps a fallback-driven
    /// exclusion traceable.
    pub async fn evaluate(
        &self,
        document: &str,
        questions: &[Question],
        guidance: &str,
    ) -> Result<BTreeMap<QuestionId, Judgment>, EvaluationError> {
        if document.trim().is_empty() {
            return Err(EvaluationError::EmptyDocument);
        }

        let judgments = future::join_all(questions.iter().map(|question| async move {
            let judgment = match self.oracle.judge(document, question, guidance).await {
                Ok(judgment) => judgment,
                Err(err) => {
                    warn!(question = %question.id, %err, "oracle call failed, recording fallback judgment");
                    fallback_judgment(question)
                }
            };
            (question.id.clone(), judgment)
        }))
        .await;

        Ok(judgments.into_iter().collect())
    }
}

/// Zero-value judgment recorded in place of a failed oracle call.
pub fn fallback_judgment(question: &Question) -> Judgment {
    let value = match question.rubric {
        QuestionRubric::Scale { .. } => JudgmentValue::Score(0.0),
        QuestionRubric::Filter { .. } | QuestionRubric::YesNo { .. } => {
            JudgmentValue::Answer(false)
        }
    };

    Judgment {
        value,
        explanation: Some(FALLBACK_EXPLANATION.to_string()),
    }
}
