use crate::workflows::assessment::crops::CropCategory;
use crate::workflows::assessment::domain::{
    CropObservation, FreshnessLevel, StageError, StageName,
};
use serde::Serialize;
use tracing::info;

/// Component weights for the composite freshness score. The canonical split
/// is 30/40/30 (humidity dominates as the strongest spoilage driver in the
/// target markets); alternative weightings are accepted as long as they are
/// finite, non-negative and sum to something positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreshnessWeights {
    pub temperature: f64,
    pub humidity: f64,
    pub age: f64,
}

impl Default for FreshnessWeights {
    fn default() -> Self {
        Self {
            temperature: 0.30,
            humidity: 0.40,
            age: 0.30,
        }
    }
}

impl FreshnessWeights {
    pub fn validate(&self) -> Result<(), StageError> {
        let components = [self.temperature, self.humidity, self.age];
        let finite = components.iter().all(|w| w.is_finite() && *w >= 0.0);
        let sum: f64 = components.iter().sum();
        if !finite || sum <= 0.0 {
            return Err(StageError::new(
                StageName::Freshness,
                format!(
                    "invalid freshness weights {:.2}/{:.2}/{:.2}",
                    self.temperature, self.humidity, self.age
                ),
            ));
        }
        Ok(())
    }

    fn normalized(&self) -> (f64, f64, f64) {
        let sum = self.temperature + self.humidity + self.age;
        (
            self.temperature / sum,
            self.humidity / sum,
            self.age / sum,
        )
    }
}

/// Outcome of the freshness stage. Scores are rounded to two decimals so the
/// rendered report matches the wire payload.
#[derive(Debug, Clone, Serialize)]
pub struct FreshnessResult {
    pub score: f64,
    pub level: FreshnessLevel,
    pub crop: CropCategory,
    pub component_scores: ComponentScores,
    pub recommendations: Vec<&'static str>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ComponentScores {
    pub temperature: f64,
    pub humidity: f64,
    pub age: f64,
}

/// Deterministic freshness scorer. Has no external collaborators and no
/// failure mode for valid input; misconfigured weights surface as the fatal
/// stage error.
#[derive(Debug, Clone, Copy)]
pub struct FreshnessScorer {
    weights: FreshnessWeights,
}

impl FreshnessScorer {
    pub fn new(weights: FreshnessWeights) -> Self {
        Self { weights }
    }

    pub fn score(&self, observation: &CropObservation) -> Result<FreshnessResult, StageError> {
        self.weights.validate()?;

        let crop = CropCategory::from_name(&observation.crop_name);
        let profile = crop.profile();

        // Inputs were validated at the boundary; clamp anyway so a bad caller
        // cannot push the composite outside 0..=100.
        let temperature = observation.temperature.clamp(-10.0, 60.0);
        let humidity = observation.humidity.clamp(0.0, 100.0);

        let temp_score = env_score(
            temperature,
            profile.optimal_temperature.0,
            profile.optimal_temperature.1,
        );
        let humidity_score = env_score(
            humidity,
            profile.optimal_humidity.0,
            profile.optimal_humidity.1,
        );
        let age_score = age_score(observation.age_hours, profile.shelf_life_days);

        let (w_temp, w_humidity, w_age) = self.weights.normalized();
        let composite = temp_score * w_temp + humidity_score * w_humidity + age_score * w_age;
        let score = round2(composite);
        let level = FreshnessLevel::from_score(score);

        info!(
            crop = %crop,
            score,
            level = %level,
            "freshness scored"
        );

        Ok(FreshnessResult {
            score,
            level,
            crop,
            component_scores: ComponentScores {
                temperature: round2(temp_score),
                humidity: round2(humidity_score),
                age: round2(age_score),
            },
            recommendations: recommendations_for(level),
        })
    }
}

impl Default for FreshnessScorer {
    fn default() -> Self {
        Self::new(FreshnessWeights::default())
    }
}

/// 100 inside the optimal band, dropping 5 points per unit of distance
/// outside it, floored at 0.
fn env_score(value: f64, optimal_min: f64, optimal_max: f64) -> f64 {
    if (optimal_min..=optimal_max).contains(&value) {
        return 100.0;
    }
    let distance = if value < optimal_min {
        optimal_min - value
    } else {
        value - optimal_max
    };
    (100.0 - distance * 5.0).max(0.0)
}

/// Linear decay over the crop's shelf life; a batch with no declared age
/// scores full marks.
fn age_score(age_hours: Option<f64>, shelf_life_days: f64) -> f64 {
    match age_hours {
        None => 100.0,
        Some(age) => {
            let degradation_per_hour = 100.0 / (shelf_life_days * 24.0);
            (100.0 - age * degradation_per_hour).max(0.0)
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn recommendations_for(level: FreshnessLevel) -> Vec<&'static str> {
    match level {
        FreshnessLevel::Excellent => vec![
            "Ready for immediate market distribution",
            "Maintain current storage conditions",
            "Can withstand longer transportation",
        ],
        FreshnessLevel::Good => vec![
            "Suitable for distribution",
            "Monitor storage conditions closely",
            "Prioritize sales within 2-3 days",
        ],
        FreshnessLevel::Fair => vec![
            "Use priority shipping",
            "Increase market urgency",
            "Consider discounted pricing",
            "Check for visible deterioration",
        ],
        FreshnessLevel::Poor => vec![
            "Immediate distribution required",
            "High discount pricing",
            "Risk of waste within 24-48 hours",
            "Local markets preferred",
        ],
        FreshnessLevel::Critical => vec![
            "Do not distribute - risk of spoilage",
            "Consider compost/waste",
            "Investigate storage failure",
            "Prevent financial loss",
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(crop: &str, temperature: f64, humidity: f64, age: Option<f64>) -> CropObservation {
        CropObservation::new(crop, temperature, humidity, age, 100.0).unwrap()
    }

    #[test]
    fn optimal_tomato_scores_a_perfect_hundred() {
        let scorer = FreshnessScorer::default();
        let result = scorer
            .score(&observation("tomato", 18.0, 90.0, Some(0.0)))
            .unwrap();

        assert_eq!(result.score, 100.0);
        assert_eq!(result.level, FreshnessLevel::Excellent);
        assert_eq!(result.component_scores.temperature, 100.0);
        assert_eq!(result.component_scores.humidity, 100.0);
        assert_eq!(result.component_scores.age, 100.0);
    }

    #[test]
    fn overheated_onion_degrades_at_least_one_tier_below_baseline() {
        let scorer = FreshnessScorer::default();
        let baseline = scorer
            .score(&observation("onion", 18.0, 90.0, Some(0.0)))
            .unwrap();
        let critical_path = scorer
            .score(&observation("onion", 31.0, 85.0, Some(0.0)))
            .unwrap();

        assert_eq!(baseline.level, FreshnessLevel::Fair);
        assert_eq!(critical_path.level, FreshnessLevel::Poor);
        assert!(critical_path.score < baseline.score);
    }

    #[test]
    fn env_score_drops_five_points_per_unit_outside_the_band() {
        assert_eq!(env_score(25.0, 15.0, 25.0), 100.0);
        assert_eq!(env_score(27.0, 15.0, 25.0), 90.0);
        assert_eq!(env_score(10.0, 15.0, 25.0), 75.0);
        assert_eq!(env_score(60.0, 15.0, 25.0), 0.0);
    }

    #[test]
    fn age_decay_tracks_shelf_life() {
        // Tomato shelf life is 7 days; half the shelf life costs half the score.
        assert_eq!(age_score(Some(84.0), 7.0), 50.0);
        assert_eq!(age_score(None, 7.0), 100.0);
        assert_eq!(age_score(Some(10_000.0), 7.0), 0.0);
    }

    #[test]
    fn weights_are_normalized_before_use() {
        let scorer = FreshnessScorer::new(FreshnessWeights {
            temperature: 3.0,
            humidity: 4.0,
            age: 3.0,
        });
        let canonical = FreshnessScorer::default();
        let obs = observation("mango", 22.0, 70.0, Some(48.0));

        assert_eq!(
            scorer.score(&obs).unwrap().score,
            canonical.score(&obs).unwrap().score
        );
    }

    #[test]
    fn non_finite_weights_are_a_fatal_stage_error() {
        let scorer = FreshnessScorer::new(FreshnessWeights {
            temperature: f64::NAN,
            humidity: 0.4,
            age: 0.3,
        });
        let err = scorer
            .score(&observation("tomato", 18.0, 90.0, None))
            .unwrap_err();
        assert_eq!(err.stage, StageName::Freshness);
    }
}
