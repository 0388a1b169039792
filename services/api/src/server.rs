use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryAssessmentLog, InMemoryReferenceData};
use crate::routes::{router, PipelineContext};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use cropflow::config::AppConfig;
use cropflow::error::AppError;
use cropflow::telemetry;
use cropflow::workflows::assessment::market::insight::RuleBasedInsight;
use cropflow::workflows::assessment::AssessmentPipeline;
use std::sync::atomic::Ordering;
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
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let source = Arc::new(InMemoryReferenceData::default());
    let log = Arc::new(InMemoryAssessmentLog::default());
    let pipeline = Arc::new(AssessmentPipeline::new(
        source,
        Arc::new(RuleBasedInsight),
        Arc::clone(&log),
        config.pipeline.freshness_weights,
        config.pipeline.advisory_timeout,
    ));

    let app = router(PipelineContext { pipeline, log })
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "crop assessment service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
