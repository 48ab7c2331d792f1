use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use tracing::info;

use super::batch::{BatchError, BatchProgress, BatchScreener, CandidateRoster};
use super::domain::DocumentSource;
use super::export::{self, ExportError};
use super::question::{validate_question_set, Question, QuestionDraft, ValidationError};
use super::view::{self, CandidateReportView, FilterOptions, SortSpec};
use crate::oracle::JudgmentOracle;

/// Facade composing the question plan, the candidate roster, and the
/// screener. One service instance owns one batch at a time; admitting a
/// new batch replaces everything the previous one produced.
pub struct ScreeningService<O> {
    screener: BatchScreener<O>,
    roster: CandidateRoster,
    plan: Mutex<ScreeningPlan>,
}

/// The validated question set and guidance the next run will use. Held in
/// an `Arc` so a running batch keeps its plan even if reconfigured later.
#[derive(Default)]
struct ScreeningPlan {
    questions: Arc<Vec<Question>>,
    guidance: String,
}

/// Error raised by the screening service.
#[derive(Debug, thiserror::Error)]
pub enum ScreeningServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Batch(#[from] BatchError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl ScreeningServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ScreeningServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ScreeningServiceError::Batch(_) => StatusCode::CONFLICT,
            ScreeningServiceError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl<O: JudgmentOracle> ScreeningService<O> {
    pub fn new(oracle: O) -> Self {
        Self {
            screener: BatchScreener::new(oracle),
            roster: CandidateRoster::new(),
            plan: Mutex::new(ScreeningPlan::default()),
        }
    }

    /// Validate and install a question set plus guidance for the next run.
    pub fn configure(
        &self,
        drafts: Vec<QuestionDraft>,
        guidance: String,
    ) -> Result<usize, ScreeningServiceError> {
        let questions = validate_question_set(drafts)?;
        let count = questions.len();

        let mut plan = self.plan_lock();
        plan.questions = Arc::new(questions);
        plan.guidance = guidance;

        Ok(count)
    }

    /// Admit a new document set, replacing the current roster.
    pub fn admit(&self, documents: Vec<DocumentSource>) -> Result<usize, ScreeningServiceError> {
        let admitted = self.roster.admit(documents)?;
        info!(admitted, "admitted screening batch");
        Ok(admitted)
    }

    /// Run the current batch to completion. Progress lands in the roster
    /// after every candidate, so observers can poll while this is pending.
    pub async fn run_batch(&self) -> Result<(), ScreeningServiceError> {
        let (questions, guidance) = {
            let plan = self.plan_lock();
            (Arc::clone(&plan.questions), plan.guidance.clone())
        };

        self.screener
            .run(&self.roster, &questions, &guidance, |processed, total| {
                info!(processed, total, "screened candidate");
            })
            .await?;

        Ok(())
    }

    pub fn progress(&self) -> BatchProgress {
        self.roster.progress()
    }

    /// Filtered, sorted, sanitized projection of the current roster.
    pub fn results(&self, filters: &FilterOptions, sort: &SortSpec) -> Vec<CandidateReportView> {
        let snapshot = self.roster.snapshot();
        view::select(&snapshot, filters, sort)
            .iter()
            .map(CandidateReportView::from)
            .collect()
    }

    /// CSV artifact covering the completed candidates of the current
    /// batch. Zero completed candidates yields a header-only table.
    pub fn export_csv(&self) -> Result<String, ScreeningServiceError> {
        let questions = Arc::clone(&self.plan_lock().questions);
        let snapshot = self.roster.snapshot();
        Ok(export::completed_csv(&questions, &snapshot)?)
    }

    pub fn roster(&self) -> &CandidateRoster {
        &self.roster
    }

    fn plan_lock(&self) -> std::sync::MutexGuard<'_, ScreeningPlan> {
        self.plan.lock().expect("plan mutex poisoned")
    }
}
