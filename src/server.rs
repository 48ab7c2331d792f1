use crate::cli::ServeArgs;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::oracle::OpenAiOracle;
use crate::routes::{with_screening_routes, AppState};
use crate::telemetry;
use crate::workflows::screening::ScreeningService;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let oracle = OpenAiOracle::from_config(&config.oracle)?;
    let screening_service = Arc::new(ScreeningService::new(oracle));

    let app = with_screening_routes(screening_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, model = %config.oracle.model, "cv screening orchestrator ready");

    axum::serve(listener, app).await?;
    Ok(())
}
