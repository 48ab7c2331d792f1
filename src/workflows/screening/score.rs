//! Turns a set of per-question judgments into a single weighted outcome.
//!
//! Exclusion and point accumulation are evaluated in the same ordered pass
//! but independently: every filter is checked even after one has failed,
//! and a failed filter never stops the totals from being computed.

use std::collections::BTreeMap;

use super::domain::{Judgment, JudgmentValue, Outcome};
use super::question::{Question, QuestionId, QuestionRubric};

/// Aggregate recorded judgments into an outcome.
///
/// Questions without a recorded judgment contribute nothing to either side
/// of the fraction; the reported exclusion reason is always the first
/// failing filter in question order, so output is reproducible no matter
/// in which order judgments arrived.
pub fn aggregate(questions: &[Question], judgments: &BTreeMap<QuestionId, Judgment>) -> Outcome {
    let mut total_points = 0.0;
    let mut max_points = 0.0;
    let mut excluded = false;
    let mut excluded_reason = None;

    for question in questions {
        let Some(judgment) = judgments.get(&question.id) else {
            continue;
        };

        match (question.rubric, judgment.value) {
            (QuestionRubric::Filter { expected_answer }, JudgmentValue::Answer(actual)) => {
                if actual != expected_answer {
                    excluded = true;
                    if excluded_reason.is_none() {
                        excluded_reason = Some(failed_filter_reason(
                            &question.text,
                            expected_answer,
                            actual,
                        ));
                    }
                }
            }
            (QuestionRubric::Scale { weight }, JudgmentValue::Score(value)) => {
                total_points += value * f64::from(weight);
                max_points += question.effective_max_points();
            }
            (QuestionRubric::YesNo { points }, JudgmentValue::Answer(yes)) => {
                if yes {
                    total_points += f64::from(points);
                }
                max_points += question.effective_max_points();
            }
            // A judgment whose shape does not match the rubric cannot be
            // scored; it contributes nothing.
            _ => {}
        }
    }

    let percentage = if max_points > 0.0 {
        total_points / max_points * 100.0
    } else {
        0.0
    };

    Outcome {
        total_points,
        max_points,
        percentage,
        excluded,
        excluded_reason,
    }
}

fn failed_filter_reason(question_text: &str, expected: bool, actual: bool) -> String {
    format!(
        "Failed filter: \"{question_text}\" - Expected: {}, Got: {}",
        yes_no(expected),
        yes_no(actual)
    )
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}
