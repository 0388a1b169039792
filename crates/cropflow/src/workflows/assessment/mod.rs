pub mod crops;
pub mod domain;
pub mod freshness;
pub mod geo;
pub mod logistics;
pub mod market;
pub mod sources;
pub mod synthesis;
pub mod weather;

use self::domain::{CropObservation, SaleUrgency, StageError, StageName};
use self::freshness::{FreshnessResult, FreshnessScorer, FreshnessWeights};
use self::geo::Coordinates;
use self::logistics::{LogisticsInput, LogisticsPlan};
use self::market::{MarketAnalysis, MarketStageInput};
use self::sources::{AssessmentLog, InsightGenerator, ReferenceDataSource};
use self::synthesis::SynthesisResult;
use self::weather::WeatherAssessment;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Average speed assumed for the weather-exposure window before the
/// logistics stage has picked a mode.
const ASSUMED_TRANSPORT_SPEED_KMH: f64 = 50.0;

const DEFAULT_ORIGIN: Coordinates = Coordinates::new(18.5204, 73.8567);
const DEFAULT_LOCATION: &str = "Pune, Maharashtra";

/// Everything the caller supplies for one assessment.
#[derive(Debug, Clone)]
pub struct AssessmentRequest {
    pub observation: CropObservation,
    pub distance_km: f64,
    pub availability_window_hours: Option<f64>,
    pub location: String,
    pub origin: Coordinates,
    pub sale_urgency: SaleUrgency,
}

impl AssessmentRequest {
    pub fn new(observation: CropObservation, distance_km: f64) -> Self {
        Self {
            observation,
            distance_km,
            availability_window_hours: None,
            location: DEFAULT_LOCATION.to_string(),
            origin: DEFAULT_ORIGIN,
            sale_urgency: SaleUrgency::Low,
        }
    }
}

/// Typed outcome of one stage. Serialized adjacently tagged so consumers can
/// switch on `status` without probing the payload shape.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum StageResult<T> {
    Completed(T),
    Failed { error: String },
    Skipped { reason: String },
}

impl<T> StageResult<T> {
    pub fn completed(&self) -> Option<&T> {
        match self {
            Self::Completed(value) => Some(value),
            _ => None,
        }
    }

    fn from_result(result: Result<T, StageError>) -> Self {
        match result {
            Ok(value) => Self::Completed(value),
            Err(err) => {
                warn!(stage = %err.stage, error = %err, "stage failed");
                Self::Failed {
                    error: err.to_string(),
                }
            }
        }
    }
}

/// Overall invocation status. `Error` only when the freshness stage itself
/// failed; partial stage failures still complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Completed,
    Error,
}

/// The full report for one invocation.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentReport {
    pub assessment_id: String,
    pub generated_at: DateTime<Utc>,
    pub status: WorkflowStatus,
    pub observation: CropObservation,
    pub freshness: StageResult<FreshnessResult>,
    pub market: StageResult<MarketAnalysis>,
    pub logistics: StageResult<LogisticsPlan>,
    pub weather: StageResult<WeatherAssessment>,
    pub synthesis: Option<SynthesisResult>,
}

/// The decision pipeline, generic over its three collaborators so tests can
/// substitute fakes. Stateless apart from the id sequence; every invocation
/// works on local values only.
pub struct AssessmentPipeline<S, I, L> {
    source: Arc<S>,
    insight: Arc<I>,
    log: Arc<L>,
    scorer: FreshnessScorer,
    advisory_timeout: Duration,
    sequence: AtomicU64,
}

impl<S, I, L> AssessmentPipeline<S, I, L>
where
    S: ReferenceDataSource,
    I: InsightGenerator,
    L: AssessmentLog,
{
    pub fn new(
        source: Arc<S>,
        insight: Arc<I>,
        log: Arc<L>,
        weights: FreshnessWeights,
        advisory_timeout: Duration,
    ) -> Self {
        Self {
            source,
            insight,
            log,
            scorer: FreshnessScorer::new(weights),
            advisory_timeout,
            sequence: AtomicU64::new(1),
        }
    }

    fn next_id(&self) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("assess-{seq:06}")
    }

    /// Run the four stages and synthesize. Freshness runs first and alone
    /// can abort the invocation; the other three run concurrently and fail
    /// independently.
    pub async fn execute(&self, request: AssessmentRequest) -> AssessmentReport {
        let assessment_id = self.next_id();
        info!(
            assessment_id,
            crop = %request.observation.crop_name,
            quantity_kg = request.observation.quantity_kg,
            "assessment started"
        );

        let freshness = match self.scorer.score(&request.observation) {
            Ok(result) => result,
            Err(err) => {
                warn!(assessment_id, error = %err, "freshness stage failed, aborting");
                let report = self.error_report(assessment_id, request, err);
                self.record(&report);
                return report;
            }
        };

        let crop = freshness.crop;
        let transport_hours = request.distance_km / ASSUMED_TRANSPORT_SPEED_KMH;

        let market_input = MarketStageInput {
            crop,
            freshness_score: freshness.score,
            quantity_kg: request.observation.quantity_kg,
            origin: request.origin,
            urgency: request.sale_urgency,
        };
        let logistics_input = LogisticsInput {
            freshness_score: freshness.score,
            freshness_level: freshness.level,
            distance_km: request.distance_km,
            quantity_kg: request.observation.quantity_kg,
            availability_window_hours: request.availability_window_hours,
        };

        let (market, logistics, weather) = tokio::join!(
            market::analyze(
                self.source.as_ref(),
                self.insight.as_ref(),
                market_input,
                self.advisory_timeout,
            ),
            async { logistics::plan(self.source.as_ref(), logistics_input) },
            async {
                weather::assess(
                    self.source.as_ref(),
                    &request.location,
                    crop,
                    transport_hours,
                )
            },
        );

        let market = StageResult::from_result(market);
        let logistics = StageResult::from_result(logistics);
        let weather = StageResult::from_result(weather);

        let synthesis = synthesis::synthesize(
            &freshness,
            market.completed(),
            logistics.completed(),
            weather.completed(),
        );

        info!(
            assessment_id,
            final_score = synthesis.final_score,
            final_level = %synthesis.final_level,
            "assessment completed"
        );

        let report = AssessmentReport {
            assessment_id,
            generated_at: Utc::now(),
            status: WorkflowStatus::Completed,
            observation: request.observation,
            freshness: StageResult::Completed(freshness),
            market,
            logistics,
            weather,
            synthesis: Some(synthesis),
        };

        self.record(&report);
        report
    }

    fn error_report(
        &self,
        assessment_id: String,
        request: AssessmentRequest,
        err: StageError,
    ) -> AssessmentReport {
        AssessmentReport {
            assessment_id,
            generated_at: Utc::now(),
            status: WorkflowStatus::Error,
            observation: request.observation,
            freshness: StageResult::Failed {
                error: err.to_string(),
            },
            market: skipped(StageName::Market),
            logistics: skipped(StageName::Logistics),
            weather: skipped(StageName::Weather),
            synthesis: None,
        }
    }

    fn record(&self, report: &AssessmentReport) {
        if let Err(err) = self.log.record(report) {
            warn!(
                assessment_id = report.assessment_id,
                error = %err,
                "failed to record assessment"
            );
        }
    }
}

fn skipped<T>(stage: StageName) -> StageResult<T> {
    StageResult::Skipped {
        reason: format!("{stage} stage skipped: freshness stage failed"),
    }
}
