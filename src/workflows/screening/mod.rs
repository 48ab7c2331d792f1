//! CV screening engine: question intake and validation, oracle-driven
//! evaluation, weighted aggregation with exclusion filters, batch
//! lifecycle orchestration, result projection, and CSV export.

pub mod batch;
pub mod domain;
pub(crate) mod evaluator;
pub mod export;
pub mod question;
pub mod router;
pub(crate) mod score;
pub mod service;
pub mod view;

#[cfg(test)]
mod tests;

pub use batch::{BatchError, BatchProgress, BatchScreener, CandidateRoster};
pub use domain::{
    Candidate, CandidateId, DocumentSource, Judgment, JudgmentValue, Outcome, ScreeningStatus,
};
pub use evaluator::{CandidateEvaluator, EvaluationError, FALLBACK_EXPLANATION};
pub use export::{completed_csv, ExportError, EXPORT_FILE_NAME};
pub use question::{
    validate_question_set, Question, QuestionDraft, QuestionId, QuestionKind, QuestionRubric,
    ValidationError,
};
pub use router::screening_router;
pub use score::aggregate;
pub use service::{ScreeningService, ScreeningServiceError};
pub use view::{
    select, CandidateReportView, FilterOptions, SortDirection, SortField, SortSpec, StatusFilter,
};
