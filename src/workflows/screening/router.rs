use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::batch::BatchError;
use super::domain::DocumentSource;
use super::export::EXPORT_FILE_NAME;
use super::question::QuestionDraft;
use super::service::{ScreeningService, ScreeningServiceError};
use super::view::{FilterOptions, SortDirection, SortField, SortSpec, StatusFilter};
use crate::oracle::JudgmentOracle;

/// Router builder exposing the screening API.
pub fn screening_router<O>(service: Arc<ScreeningService<O>>) -> Router
where
    O: JudgmentOracle + 'static,
{
    Router::new()
        .route("/api/v1/screening/batch", post(admit_handler::<O>))
        .route("/api/v1/screening/batch/run", post(run_handler::<O>))
        .route(
            "/api/v1/screening/batch/progress",
            get(progress_handler::<O>),
        )
        .route("/api/v1/screening/results", get(results_handler::<O>))
        .route("/api/v1/screening/export", get(export_handler::<O>))
        .with_state(service)
}

/// One batch submission: the question plan plus the documents to screen.
#[derive(Debug, Deserialize)]
pub(crate) struct BatchSubmission {
    pub(crate) questions: Vec<QuestionDraft>,
    #[serde(default)]
    pub(crate) guidance: String,
    pub(crate) candidates: Vec<DocumentSource>,
}

pub(crate) async fn admit_handler<O>(
    State(service): State<Arc<ScreeningService<O>>>,
    axum::Json(submission): axum::Json<BatchSubmission>,
) -> Response
where
    O: JudgmentOracle + 'static,
{
    let questions = match service.configure(submission.questions, submission.guidance) {
        Ok(count) => count,
        Err(err) => return service_error_response(err),
    };

    match service.admit(submission.candidates) {
        Ok(admitted) => {
            let payload = json!({
                "admitted": admitted,
                "questions": questions,
                "status": "admitted",
            });
            (StatusCode::ACCEPTED, axum::Json(payload)).into_response()
        }
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn run_handler<O>(
    State(service): State<Arc<ScreeningService<O>>>,
) -> Response
where
    O: JudgmentOracle + 'static,
{
    let progress = service.progress();
    if progress.running {
        return service_error_response(ScreeningServiceError::Batch(BatchError::AlreadyRunning));
    }
    if progress.finished_at.is_some() {
        return service_error_response(ScreeningServiceError::Batch(BatchError::AlreadyScreened));
    }

    let total = progress.total;
    tokio::spawn(async move {
        if let Err(err) = service.run_batch().await {
            error!(%err, "screening batch failed to run");
        }
    });

    let payload = json!({
        "status": "processing",
        "total": total,
    });
    (StatusCode::ACCEPTED, axum::Json(payload)).into_response()
}

pub(crate) async fn progress_handler<O>(
    State(service): State<Arc<ScreeningService<O>>>,
) -> Response
where
    O: JudgmentOracle + 'static,
{
    (StatusCode::OK, axum::Json(service.progress())).into_response()
}

/// Query parameters mirroring the result list's filter and sort controls.
#[derive(Debug, Deserialize)]
pub(crate) struct ResultsQuery {
    #[serde(default)]
    search: String,
    #[serde(default)]
    score_range: Option<f64>,
    #[serde(default = "default_show_excluded")]
    show_excluded: bool,
    #[serde(default)]
    status: StatusFilter,
    #[serde(default)]
    sort_by: SortField,
    #[serde(default)]
    direction: SortDirection,
}

fn default_show_excluded() -> bool {
    true
}

pub(crate) async fn results_handler<O>(
    State(service): State<Arc<ScreeningService<O>>>,
    Query(query): Query<ResultsQuery>,
) -> Response
where
    O: JudgmentOracle + 'static,
{
    let filters = FilterOptions {
        search: query.search,
        score_range: query.score_range,
        show_excluded: query.show_excluded,
        status: query.status,
    };
    let sort = SortSpec {
        sort_by: query.sort_by,
        direction: query.direction,
    };

    let views = service.results(&filters, &sort);
    (StatusCode::OK, axum::Json(views)).into_response()
}

pub(crate) async fn export_handler<O>(
    State(service): State<Arc<ScreeningService<O>>>,
) -> Response
where
    O: JudgmentOracle + 'static,
{
    match service.export_csv() {
        Ok(csv) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
                ),
            ],
            csv,
        )
            .into_response(),
        Err(err) => service_error_response(err),
    }
}

fn service_error_response(err: ScreeningServiceError) -> Response {
    let status = err.status_code();
    let payload = json!({ "error": err.to_string() });
    (status, axum::Json(payload)).into_response()
}
