//! Derived, non-owning projection over the roster's candidates: live
//! filtering and sorting for result lists, plus the sanitized views served
//! over HTTP. `select` is pure; identical inputs yield identical output.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{Candidate, ScreeningStatus};

/// Width of a score-range bucket: a lower bound of `n` keeps percentages
/// in `[n, n + 20)`.
const SCORE_BUCKET_WIDTH: f64 = 20.0;

/// Filter options applied to the candidate list. All predicates must pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterOptions {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub score_range: Option<f64>,
    #[serde(default = "default_show_excluded")]
    pub show_excluded: bool,
    #[serde(default)]
    pub status: StatusFilter,
}

fn default_show_excluded() -> bool {
    true
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            search: String::new(),
            score_range: None,
            show_excluded: true,
            status: StatusFilter::All,
        }
    }
}

/// Status bucket for the list tabs. `Pending` covers both queued and
/// in-flight candidates; `Excluded` cuts across lifecycle states and
/// ignores the score-range constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    Pending,
    Error,
    Excluded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Name,
    #[default]
    Score,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SortSpec {
    #[serde(default)]
    pub sort_by: SortField,
    #[serde(default)]
    pub direction: SortDirection,
}

/// Filter and sort a candidate snapshot. Ties keep input order (stable
/// sort), so repeated calls over the same snapshot agree exactly.
pub fn select(
    candidates: &[Candidate],
    filters: &FilterOptions,
    sort: &SortSpec,
) -> Vec<Candidate> {
    let needle = filters.search.to_lowercase();

    let mut selected: Vec<Candidate> = candidates
        .iter()
        .filter(|candidate| matches_filters(candidate, filters, &needle))
        .cloned()
        .collect();

    selected.sort_by(|a, b| {
        let ordering = match sort.sort_by {
            SortField::Name => a.name.cmp(&b.name),
            SortField::Score => a.percentage().total_cmp(&b.percentage()),
        };
        match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });

    selected
}

fn matches_filters(candidate: &Candidate, filters: &FilterOptions, needle: &str) -> bool {
    if !filters.show_excluded && candidate.is_excluded() {
        return false;
    }

    let name_match = candidate.name.to_lowercase().contains(needle);

    // The excluded bucket keeps only the name match; score range and
    // lifecycle status do not apply to it.
    if filters.status == StatusFilter::Excluded {
        return candidate.is_excluded() && name_match;
    }

    let score_match = match filters.score_range {
        Some(lower) => {
            let percentage = candidate.percentage();
            percentage >= lower && percentage < lower + SCORE_BUCKET_WIDTH
        }
        None => true,
    };

    let status_match = match filters.status {
        StatusFilter::All => true,
        StatusFilter::Completed => candidate.status == ScreeningStatus::Completed,
        StatusFilter::Pending => matches!(
            candidate.status,
            ScreeningStatus::Pending | ScreeningStatus::Processing
        ),
        StatusFilter::Error => candidate.status == ScreeningStatus::Error,
        StatusFilter::Excluded => unreachable!("handled above"),
    };

    name_match && score_match && status_match
}

/// Sanitized candidate projection for API responses; the document text
/// never leaves the roster.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateReportView {
    pub id: String,
    pub name: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<String>,
    pub percentage: f64,
    pub excluded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excluded_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub judgments: BTreeMap<String, JudgmentView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JudgmentView {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl From<&Candidate> for CandidateReportView {
    fn from(candidate: &Candidate) -> Self {
        let outcome = candidate.outcome.as_ref();

        Self {
            id: candidate.id.0.clone(),
            name: candidate.name.clone(),
            status: candidate.status.label(),
            score: outcome.map(|outcome| outcome.fraction_label()),
            percentage: candidate.percentage(),
            excluded: candidate.is_excluded(),
            excluded_reason: outcome.and_then(|outcome| outcome.excluded_reason.clone()),
            error: candidate.error.clone(),
            judgments: candidate
                .judgments
                .iter()
                .map(|(id, judgment)| {
                    (
                        id.0.clone(),
                        JudgmentView {
                            value: judgment.value.label(),
                            explanation: judgment.explanation.clone(),
                        },
                    )
                })
                .collect(),
        }
    }
}
