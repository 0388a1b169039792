use serde::{Deserialize, Serialize};
use std::fmt;

/// A single perishable batch as handed to the pipeline by the validation
/// layer. Constructed through [`CropObservation::new`], which enforces the
/// documented ranges; stages still clamp defensively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropObservation {
    pub crop_name: String,
    pub temperature: f64,
    pub humidity: f64,
    pub age_hours: Option<f64>,
    pub quantity_kg: f64,
}

impl CropObservation {
    pub fn new(
        crop_name: impl Into<String>,
        temperature: f64,
        humidity: f64,
        age_hours: Option<f64>,
        quantity_kg: f64,
    ) -> Result<Self, ValidationError> {
        let crop_name = crop_name.into();
        let trimmed = crop_name.trim();

        if trimmed.len() < 2 || trimmed.len() > 50 {
            return Err(ValidationError::CropNameLength(trimmed.len()));
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphabetic() || c == ' ' || c == '-' || c == '_')
        {
            return Err(ValidationError::CropNameCharacters(trimmed.to_string()));
        }
        if !(-10.0..=60.0).contains(&temperature) {
            return Err(ValidationError::TemperatureOutOfRange(temperature));
        }
        if !(0.0..=100.0).contains(&humidity) {
            return Err(ValidationError::HumidityOutOfRange(humidity));
        }
        if let Some(age) = age_hours {
            if age < 0.0 {
                return Err(ValidationError::NegativeAge(age));
            }
        }
        if quantity_kg <= 0.0 {
            return Err(ValidationError::NonPositiveQuantity(quantity_kg));
        }

        Ok(Self {
            crop_name: trimmed.to_string(),
            temperature,
            humidity,
            age_hours,
            quantity_kg,
        })
    }
}

/// Shared bound on the transport distance; both the HTTP layer and the CLI
/// go through this before building a request.
pub fn validate_distance_km(distance_km: f64) -> Result<f64, ValidationError> {
    if !(0.0..=5000.0).contains(&distance_km) {
        return Err(ValidationError::DistanceOutOfRange(distance_km));
    }
    Ok(distance_km)
}

/// Rejections raised before the pipeline runs. Out-of-range observations are
/// refused here rather than silently clamped by the caller.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ValidationError {
    #[error("crop_name must be 2-50 characters (got {0})")]
    CropNameLength(usize),
    #[error("crop_name '{0}' may contain only letters, spaces, hyphen or underscore")]
    CropNameCharacters(String),
    #[error("temperature {0} outside supported range -10..=60 Celsius")]
    TemperatureOutOfRange(f64),
    #[error("humidity {0} outside supported range 0..=100 percent")]
    HumidityOutOfRange(f64),
    #[error("age_hours cannot be negative (got {0})")]
    NegativeAge(f64),
    #[error("quantity_kg must be positive (got {0})")]
    NonPositiveQuantity(f64),
    #[error("distance_km must be within 0..=5000 (got {0})")]
    DistanceOutOfRange(f64),
}

/// Five-tier freshness classification shared by the scorer and the synthesis
/// step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FreshnessLevel {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

impl FreshnessLevel {
    /// Step function over the 0-100 score; thresholds are inclusive lower
    /// bounds.
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::Excellent
        } else if score >= 60.0 {
            Self::Good
        } else if score >= 40.0 {
            Self::Fair
        } else if score >= 20.0 {
            Self::Poor
        } else {
            Self::Critical
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "EXCELLENT",
            Self::Good => "GOOD",
            Self::Fair => "FAIR",
            Self::Poor => "POOR",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for FreshnessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Transport modes ordered from cheapest to most protective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    Standard,
    Refrigerated,
    ColdChain,
}

impl DeliveryMode {
    pub const fn average_speed_kmh(self) -> f64 {
        match self {
            Self::Standard => 80.0,
            Self::Refrigerated => 70.0,
            Self::ColdChain => 60.0,
        }
    }

    pub const fn cost_multiplier(self) -> f64 {
        match self {
            Self::Standard => 1.0,
            Self::Refrigerated => 1.3,
            Self::ColdChain => 1.5,
        }
    }

    /// Freshness points preserved by better temperature control during
    /// transit; applied by the synthesis step.
    pub const fn preservation_bonus(self) -> f64 {
        match self {
            Self::Standard => 0.0,
            Self::Refrigerated => 3.0,
            Self::ColdChain => 5.0,
        }
    }

    pub const fn temperature_controlled(self) -> bool {
        !matches!(self, Self::Standard)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Refrigerated => "refrigerated",
            Self::ColdChain => "cold_chain",
        }
    }
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How soon the batch must be on the road.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryUrgency {
    Normal,
    High,
    Immediate,
}

impl DeliveryUrgency {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::High => "HIGH",
            Self::Immediate => "IMMEDIATE",
        }
    }
}

/// Seller-declared urgency used by the pricing stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaleUrgency {
    Low,
    Medium,
    High,
}

impl SaleUrgency {
    pub const fn price_multiplier(self) -> f64 {
        match self {
            Self::Low => 1.0,
            Self::Medium => 0.95,
            Self::High => 0.85,
        }
    }
}

/// Direction of reference prices at a sale location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

/// Spoilage exposure attributed to a crop at a sale location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpoilageRisk {
    Low,
    Medium,
    Critical,
}

/// Weather risk classification for a transport window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn from_risk_score(score: u32) -> Self {
        if score >= 70 {
            Self::Critical
        } else if score >= 50 {
            Self::High
        } else if score >= 30 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Percentage points of freshness lost per hour before crop sensitivity
    /// is applied.
    pub const fn base_degradation_rate(self) -> f64 {
        match self {
            Self::Low => 0.5,
            Self::Medium => 1.0,
            Self::High => 2.0,
            Self::Critical => 4.0,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

/// Identifies the pipeline stage an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    Freshness,
    Market,
    Logistics,
    Weather,
}

impl StageName {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Freshness => "freshness",
            Self::Market => "market",
            Self::Logistics => "logistics",
            Self::Weather => "weather",
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Failure of a single stage. Captured by the orchestrator instead of
/// propagating, so the remaining stages still run.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{stage} stage failed: {message}")]
pub struct StageError {
    pub stage: StageName,
    pub message: String,
}

impl StageError {
    pub fn new(stage: StageName, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observation_rejects_out_of_range_values() {
        assert!(matches!(
            CropObservation::new("tomato", 75.0, 80.0, None, 10.0),
            Err(ValidationError::TemperatureOutOfRange(_))
        ));
        assert!(matches!(
            CropObservation::new("tomato", 20.0, 120.0, None, 10.0),
            Err(ValidationError::HumidityOutOfRange(_))
        ));
        assert!(matches!(
            CropObservation::new("tomato", 20.0, 80.0, Some(-1.0), 10.0),
            Err(ValidationError::NegativeAge(_))
        ));
        assert!(matches!(
            CropObservation::new("tomato", 20.0, 80.0, None, 0.0),
            Err(ValidationError::NonPositiveQuantity(_))
        ));
        assert!(matches!(
            CropObservation::new("x", 20.0, 80.0, None, 10.0),
            Err(ValidationError::CropNameLength(_))
        ));
        assert!(matches!(
            CropObservation::new("tomato!", 20.0, 80.0, None, 10.0),
            Err(ValidationError::CropNameCharacters(_))
        ));
    }

    #[test]
    fn transport_distance_outside_bounds_is_rejected() {
        assert_eq!(validate_distance_km(0.0).unwrap(), 0.0);
        assert_eq!(validate_distance_km(5000.0).unwrap(), 5000.0);
        assert!(matches!(
            validate_distance_km(-1.0),
            Err(ValidationError::DistanceOutOfRange(_))
        ));
        assert!(matches!(
            validate_distance_km(9000.0),
            Err(ValidationError::DistanceOutOfRange(_))
        ));
        assert!(matches!(
            validate_distance_km(f64::NAN),
            Err(ValidationError::DistanceOutOfRange(_))
        ));
    }

    #[test]
    fn level_thresholds_are_inclusive_lower_bounds() {
        assert_eq!(FreshnessLevel::from_score(80.0), FreshnessLevel::Excellent);
        assert_eq!(FreshnessLevel::from_score(79.99), FreshnessLevel::Good);
        assert_eq!(FreshnessLevel::from_score(60.0), FreshnessLevel::Good);
        assert_eq!(FreshnessLevel::from_score(59.99), FreshnessLevel::Fair);
        assert_eq!(FreshnessLevel::from_score(40.0), FreshnessLevel::Fair);
        assert_eq!(FreshnessLevel::from_score(39.99), FreshnessLevel::Poor);
        assert_eq!(FreshnessLevel::from_score(20.0), FreshnessLevel::Poor);
        assert_eq!(FreshnessLevel::from_score(19.99), FreshnessLevel::Critical);
    }

    #[test]
    fn risk_level_thresholds() {
        assert_eq!(RiskLevel::from_risk_score(70), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_risk_score(69), RiskLevel::High);
        assert_eq!(RiskLevel::from_risk_score(50), RiskLevel::High);
        assert_eq!(RiskLevel::from_risk_score(30), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_risk_score(29), RiskLevel::Low);
    }
}
