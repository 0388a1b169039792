use crate::infra::{AppState, InMemoryAssessmentLog, InMemoryReferenceData};
use axum::extract::Query;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use cropflow::error::AppError;
use cropflow::workflows::assessment::domain::{
    validate_distance_km, CropObservation, SaleUrgency,
};
use cropflow::workflows::assessment::geo::Coordinates;
use cropflow::workflows::assessment::market::insight::RuleBasedInsight;
use cropflow::workflows::assessment::{
    AssessmentPipeline, AssessmentReport, AssessmentRequest, WorkflowStatus,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

pub(crate) type ApiPipeline =
    AssessmentPipeline<InMemoryReferenceData, RuleBasedInsight, InMemoryAssessmentLog>;

/// Shared handler context: the pipeline plus the history log it writes to.
#[derive(Clone)]
pub(crate) struct PipelineContext {
    pub(crate) pipeline: Arc<ApiPipeline>,
    pub(crate) log: Arc<InMemoryAssessmentLog>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssessmentApiRequest {
    pub(crate) crop_name: String,
    pub(crate) temperature: f64,
    pub(crate) humidity: f64,
    #[serde(default)]
    pub(crate) age_hours: Option<f64>,
    pub(crate) quantity_kg: f64,
    #[serde(default)]
    pub(crate) logistics: Option<LogisticsParams>,
    #[serde(default)]
    pub(crate) market: Option<MarketParams>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LogisticsParams {
    pub(crate) distance_km: f64,
    #[serde(default)]
    pub(crate) availability_window_hours: Option<f64>,
    #[serde(default)]
    pub(crate) location: Option<String>,
    #[serde(default)]
    pub(crate) origin_lat: Option<f64>,
    #[serde(default)]
    pub(crate) origin_lon: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MarketParams {
    pub(crate) urgency: SaleUrgency,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HistoryQuery {
    #[serde(default = "default_history_limit")]
    pub(crate) limit: usize,
}

fn default_history_limit() -> usize {
    10
}

/// Condensed view of a report for the quick endpoint.
#[derive(Debug, Serialize)]
pub(crate) struct QuickAssessmentResponse {
    pub(crate) assessment_id: String,
    pub(crate) crop_name: String,
    pub(crate) status: WorkflowStatus,
    pub(crate) final_score: Option<f64>,
    pub(crate) final_level: Option<String>,
    pub(crate) recommended_price: Option<f64>,
    pub(crate) delivery_mode: Option<String>,
    pub(crate) weather_risk: Option<String>,
    pub(crate) recommendations: Vec<String>,
}

pub(crate) fn router(context: PipelineContext) -> axum::Router {
    axum::Router::new()
        .route(
            "/api/v1/assessments",
            axum::routing::post(create_assessment),
        )
        .route(
            "/api/v1/assessments/quick",
            axum::routing::post(quick_assessment),
        )
        .route(
            "/api/v1/assessments/history",
            axum::routing::get(assessment_history),
        )
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .layer(Extension(context))
}

fn build_request(payload: AssessmentApiRequest) -> Result<AssessmentRequest, AppError> {
    let observation = CropObservation::new(
        payload.crop_name,
        payload.temperature,
        payload.humidity,
        payload.age_hours,
        payload.quantity_kg,
    )?;

    let logistics = payload.logistics;
    let distance_km =
        validate_distance_km(logistics.as_ref().map(|l| l.distance_km).unwrap_or(100.0))?;

    let mut request = AssessmentRequest::new(observation, distance_km);
    if let Some(params) = logistics {
        request.availability_window_hours = params.availability_window_hours;
        if let Some(location) = params.location {
            request.location = location;
        }
        if let (Some(lat), Some(lon)) = (params.origin_lat, params.origin_lon) {
            request.origin = Coordinates::new(lat, lon);
        }
    }
    if let Some(market) = payload.market {
        request.sale_urgency = market.urgency;
    }

    Ok(request)
}

pub(crate) async fn create_assessment(
    Extension(context): Extension<PipelineContext>,
    Json(payload): Json<AssessmentApiRequest>,
) -> Result<Json<AssessmentReport>, AppError> {
    let request = build_request(payload)?;
    let report = context.pipeline.execute(request).await;
    Ok(Json(report))
}

pub(crate) async fn quick_assessment(
    Extension(context): Extension<PipelineContext>,
    Json(payload): Json<AssessmentApiRequest>,
) -> Result<Json<QuickAssessmentResponse>, AppError> {
    let request = build_request(payload)?;
    let report = context.pipeline.execute(request).await;

    let synthesis = report.synthesis.as_ref();
    let response = QuickAssessmentResponse {
        assessment_id: report.assessment_id.clone(),
        crop_name: report.observation.crop_name.clone(),
        status: report.status,
        final_score: synthesis.map(|s| s.final_score),
        final_level: synthesis.map(|s| s.final_level.to_string()),
        recommended_price: synthesis.and_then(|s| s.market_summary.recommended_price),
        delivery_mode: synthesis.map(|s| s.logistics_impact.delivery_mode.to_string()),
        weather_risk: synthesis
            .and_then(|s| s.weather_impact.risk_level)
            .map(|r| r.label().to_string()),
        recommendations: synthesis
            .map(|s| s.recommendations.clone())
            .unwrap_or_default(),
    };

    Ok(Json(response))
}

pub(crate) async fn assessment_history(
    Extension(context): Extension<PipelineContext>,
    Query(query): Query<HistoryQuery>,
) -> Json<Vec<AssessmentReport>> {
    Json(context.log.recent(query.limit))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
