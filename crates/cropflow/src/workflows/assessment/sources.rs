use crate::workflows::assessment::crops::CropCategory;
use crate::workflows::assessment::domain::{DeliveryMode, SpoilageRisk, Trend};
use crate::workflows::assessment::geo::Coordinates;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Aggregated market statistics for one crop category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub average_price: f64,
    pub demand_index: f64,
    pub supply_index: f64,
    pub trend: Trend,
}

/// A candidate sale yard as known to the reference-data source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLocation {
    pub id: String,
    pub name: String,
    pub region: String,
    pub coordinates: Coordinates,
    pub price_per_kg: f64,
    pub trend: Trend,
    pub spoilage_risk: SpoilageRisk,
    pub transport_rate_per_km: f64,
}

/// A driver available for pickup, as listed by the fleet source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverProfile {
    pub id: String,
    pub name: String,
    pub vehicle_type: DeliveryMode,
    pub capacity_kg: f64,
    pub rating: f64,
    pub available_hours: f64,
}

/// One forecast sample; the weather stage aggregates a window of these.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WeatherSample {
    pub temperature: f64,
    pub humidity: f64,
    pub precipitation: f64,
    pub wind_speed: f64,
}

/// External reference data consumed by the pipeline stages. All reads are
/// idempotent; stages never write through this trait. `Ok(None)` / an empty
/// `Vec` means the source has no data, which the stages degrade around;
/// `Err` means the source itself is down.
pub trait ReferenceDataSource: Send + Sync {
    fn market_snapshot(&self, crop: CropCategory) -> Result<Option<MarketSnapshot>, SourceError>;

    fn sale_locations(&self, crop: CropCategory) -> Result<Vec<SaleLocation>, SourceError>;

    fn available_drivers(&self, mode: DeliveryMode) -> Result<Vec<DriverProfile>, SourceError>;

    fn forecast(
        &self,
        location: &str,
        horizon_hours: u32,
    ) -> Result<Vec<WeatherSample>, SourceError>;
}

/// Context handed to the advisory generator when composing market insight.
#[derive(Debug, Clone)]
pub struct InsightPrompt {
    pub crop: CropCategory,
    pub quantity_kg: f64,
    pub best_option_name: String,
    pub best_price_per_kg: f64,
    pub best_net_profit: f64,
    pub trend: Trend,
    pub pricing_strategy: Option<&'static str>,
}

/// Generative market advisory. Called under a timeout; a slow or failing
/// implementation is replaced by the deterministic rule-based sentence.
#[async_trait]
pub trait InsightGenerator: Send + Sync {
    async fn market_insight(&self, prompt: &InsightPrompt) -> Result<String, AdvisoryError>;
}

/// Append-only assessment history owned by the caller. A failing log is
/// reported but never fails the assessment itself.
pub trait AssessmentLog: Send + Sync {
    fn record(&self, report: &super::AssessmentReport) -> Result<(), LogError>;
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    #[error("reference data source unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum AdvisoryError {
    #[error("advisory generation timed out")]
    Timeout,
    #[error("advisory transport failed: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum LogError {
    #[error("assessment log unavailable: {0}")]
    Unavailable(String),
}
