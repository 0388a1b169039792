use crate::workflows::assessment::domain::{
    DeliveryMode, DeliveryUrgency, FreshnessLevel, StageError, StageName,
};
use crate::workflows::assessment::sources::{DriverProfile, ReferenceDataSource};
use serde::Serialize;
use tracing::info;

/// Mode and urgency derived from the freshness level, plus the feasibility
/// verdict for the caller's window.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryRecommendation {
    pub mode: DeliveryMode,
    pub urgency: DeliveryUrgency,
    pub feasible: bool,
    pub feasibility_notes: Vec<String>,
    pub distance_km: f64,
    pub estimated_hours: f64,
    pub estimated_cost: f64,
    pub temperature_controlled: bool,
    pub alternative_modes: Vec<DeliveryMode>,
}

/// A ranked driver candidate.
#[derive(Debug, Clone, Serialize)]
pub struct RankedDriver {
    pub driver_id: String,
    pub name: String,
    pub vehicle_type: DeliveryMode,
    pub capacity_kg: f64,
    pub rating: f64,
    pub suitability_score: f64,
    pub estimated_pickup: PickupWindow,
}

/// Coarse pickup-time estimate from the driver's declared availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PickupWindow {
    Immediate,
    Soon,
    Delayed,
}

impl PickupWindow {
    fn from_availability(hours: f64) -> Self {
        if hours >= 8.0 {
            Self::Immediate
        } else if hours >= 4.0 {
            Self::Soon
        } else {
            Self::Delayed
        }
    }
}

/// Combined output of the logistics stage.
#[derive(Debug, Clone, Serialize)]
pub struct LogisticsPlan {
    pub recommendation: DeliveryRecommendation,
    pub ranked_drivers: Vec<RankedDriver>,
}

/// Caller-supplied parameters for the logistics stage.
#[derive(Debug, Clone, Copy)]
pub struct LogisticsInput {
    pub freshness_score: f64,
    pub freshness_level: FreshnessLevel,
    pub distance_km: f64,
    pub quantity_kg: f64,
    pub availability_window_hours: Option<f64>,
}

const fn required_mode(level: FreshnessLevel) -> (DeliveryMode, DeliveryUrgency) {
    match level {
        FreshnessLevel::Poor | FreshnessLevel::Critical => {
            (DeliveryMode::ColdChain, DeliveryUrgency::Immediate)
        }
        FreshnessLevel::Fair => (DeliveryMode::Refrigerated, DeliveryUrgency::High),
        FreshnessLevel::Good => (DeliveryMode::Refrigerated, DeliveryUrgency::Normal),
        FreshnessLevel::Excellent => (DeliveryMode::Standard, DeliveryUrgency::Normal),
    }
}

const fn alternative_modes(primary: DeliveryMode) -> [DeliveryMode; 2] {
    match primary {
        DeliveryMode::ColdChain => [DeliveryMode::Refrigerated, DeliveryMode::Standard],
        DeliveryMode::Refrigerated => [DeliveryMode::ColdChain, DeliveryMode::Standard],
        DeliveryMode::Standard => [DeliveryMode::Refrigerated, DeliveryMode::ColdChain],
    }
}

/// Deterministic mode/urgency/feasibility mapping. No external lookups; the
/// driver pool is ranked separately so a missing pool never fails the plan.
pub fn plan_delivery(input: LogisticsInput) -> DeliveryRecommendation {
    let (mode, urgency) = required_mode(input.freshness_level);
    let estimated_hours = input.distance_km / mode.average_speed_kmh();

    let mut feasible = true;
    let mut feasibility_notes = Vec::new();

    if let Some(window) = input.availability_window_hours {
        if estimated_hours > window {
            feasible = false;
            feasibility_notes.push(format!(
                "Estimated delivery time {estimated_hours:.1}h exceeds window"
            ));
        }
    }

    if input.freshness_score < 20.0 && estimated_hours > 6.0 {
        feasible = false;
        feasibility_notes.push("Freshness critical - delivery must be within 6 hours".to_string());
    }

    let base_cost = input.distance_km * 0.5 + input.quantity_kg * 0.1;
    let estimated_cost = round2(base_cost * mode.cost_multiplier());

    DeliveryRecommendation {
        mode,
        urgency,
        feasible,
        feasibility_notes,
        distance_km: input.distance_km,
        estimated_hours: round2(estimated_hours),
        estimated_cost,
        temperature_controlled: mode.temperature_controlled(),
        alternative_modes: alternative_modes(mode).to_vec(),
    }
}

/// Suitability score in 0..=100: base 50, capacity headroom up to +30,
/// rating up to +20, vehicle match +20/+15 (standard vehicles get a flat
/// +10), long availability +10. A specialized vehicle on the wrong batch
/// earns no vehicle bonus at all.
fn score_driver(driver: &DriverProfile, level: FreshnessLevel, quantity_kg: f64) -> f64 {
    let mut score = 50.0;

    if driver.capacity_kg >= quantity_kg && quantity_kg > 0.0 {
        score += (driver.capacity_kg / quantity_kg * 10.0).min(30.0);
    }

    score += driver.rating / 5.0 * 20.0;

    let degraded = matches!(level, FreshnessLevel::Poor | FreshnessLevel::Critical);
    let mid = matches!(level, FreshnessLevel::Good | FreshnessLevel::Fair);
    if degraded && driver.vehicle_type == DeliveryMode::ColdChain {
        score += 20.0;
    } else if mid
        && matches!(
            driver.vehicle_type,
            DeliveryMode::ColdChain | DeliveryMode::Refrigerated
        )
    {
        score += 15.0;
    } else if driver.vehicle_type == DeliveryMode::Standard {
        score += 10.0;
    }

    if driver.available_hours >= 12.0 {
        score += 10.0;
    }

    score.min(100.0)
}

/// Rank the pool and keep the top three. The sort is stable so equally
/// scored drivers keep their listing order.
pub fn rank_drivers(
    pool: Vec<DriverProfile>,
    level: FreshnessLevel,
    quantity_kg: f64,
) -> Vec<RankedDriver> {
    let mut ranked: Vec<RankedDriver> = pool
        .into_iter()
        .map(|driver| {
            let suitability_score = round2(score_driver(&driver, level, quantity_kg));
            RankedDriver {
                estimated_pickup: PickupWindow::from_availability(driver.available_hours),
                driver_id: driver.id,
                name: driver.name,
                vehicle_type: driver.vehicle_type,
                capacity_kg: driver.capacity_kg,
                rating: driver.rating,
                suitability_score,
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.suitability_score.total_cmp(&a.suitability_score));
    ranked.truncate(3);
    ranked
}

/// Run the full logistics stage against the reference data source.
pub fn plan<S: ReferenceDataSource>(
    source: &S,
    input: LogisticsInput,
) -> Result<LogisticsPlan, StageError> {
    let recommendation = plan_delivery(input);

    let pool = source
        .available_drivers(recommendation.mode)
        .map_err(|err| StageError::new(StageName::Logistics, err.to_string()))?;
    let ranked_drivers = rank_drivers(pool, input.freshness_level, input.quantity_kg);

    info!(
        mode = %recommendation.mode,
        feasible = recommendation.feasible,
        drivers = ranked_drivers.len(),
        "logistics plan ready"
    );

    Ok(LogisticsPlan {
        recommendation,
        ranked_drivers,
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(level: FreshnessLevel, score: f64, distance: f64, window: Option<f64>) -> LogisticsInput {
        LogisticsInput {
            freshness_score: score,
            freshness_level: level,
            distance_km: distance,
            quantity_kg: 100.0,
            availability_window_hours: window,
        }
    }

    fn driver(id: &str, mode: DeliveryMode, capacity: f64, rating: f64, hours: f64) -> DriverProfile {
        DriverProfile {
            id: id.to_string(),
            name: format!("Driver {id}"),
            vehicle_type: mode,
            capacity_kg: capacity,
            rating,
            available_hours: hours,
        }
    }

    #[test]
    fn degraded_produce_requires_cold_chain_and_immediate_urgency() {
        let rec = plan_delivery(input(FreshnessLevel::Poor, 25.0, 100.0, None));
        assert_eq!(rec.mode, DeliveryMode::ColdChain);
        assert_eq!(rec.urgency, DeliveryUrgency::Immediate);
        assert!(rec.temperature_controlled);

        let rec = plan_delivery(input(FreshnessLevel::Excellent, 95.0, 100.0, None));
        assert_eq!(rec.mode, DeliveryMode::Standard);
        assert_eq!(rec.urgency, DeliveryUrgency::Normal);
    }

    #[test]
    fn long_cold_chain_run_exceeding_window_is_infeasible() {
        let rec = plan_delivery(input(FreshnessLevel::Critical, 25.0, 500.0, Some(6.0)));
        assert_eq!(rec.estimated_hours, 8.33);
        assert!(!rec.feasible);
        assert!(rec
            .feasibility_notes
            .iter()
            .any(|note| note.contains("exceeds window")));
    }

    #[test]
    fn critically_stale_produce_cannot_travel_more_than_six_hours() {
        let rec = plan_delivery(input(FreshnessLevel::Critical, 15.0, 500.0, None));
        assert!(!rec.feasible);
        assert!(rec
            .feasibility_notes
            .iter()
            .any(|note| note.contains("within 6 hours")));
    }

    #[test]
    fn cost_scales_with_mode_multiplier() {
        let standard = plan_delivery(input(FreshnessLevel::Excellent, 95.0, 100.0, None));
        let cold = plan_delivery(input(FreshnessLevel::Poor, 25.0, 100.0, None));
        // base = 100×0.5 + 100×0.1 = 60
        assert_eq!(standard.estimated_cost, 60.0);
        assert_eq!(cold.estimated_cost, 90.0);
    }

    #[test]
    fn driver_ranking_prefers_matching_vehicle_and_caps_at_three() {
        let pool = vec![
            driver("A", DeliveryMode::Standard, 150.0, 3.0, 10.0),
            driver("B", DeliveryMode::ColdChain, 150.0, 3.0, 10.0),
            driver("C", DeliveryMode::Refrigerated, 150.0, 3.0, 10.0),
            driver("D", DeliveryMode::Standard, 80.0, 2.0, 2.0),
        ];
        let ranked = rank_drivers(pool, FreshnessLevel::Critical, 100.0);

        // B: 50 + 15 + 12 + 20 = 97; A: 50 + 15 + 12 + 10 = 87;
        // C gets no vehicle bonus: 77. D (68) falls off the top three.
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].driver_id, "B");
        assert_eq!(ranked[0].suitability_score, 97.0);
        assert_eq!(ranked[1].driver_id, "A");
        assert_eq!(ranked[2].driver_id, "C");
        assert_eq!(ranked[2].suitability_score, 77.0);
    }

    #[test]
    fn mismatched_specialized_vehicle_earns_no_fallback_bonus() {
        let standard = driver("S", DeliveryMode::Standard, 150.0, 4.0, 2.0);
        let refrigerated = driver("R", DeliveryMode::Refrigerated, 150.0, 4.0, 2.0);

        let standard_score = score_driver(&standard, FreshnessLevel::Critical, 100.0);
        let refrigerated_score = score_driver(&refrigerated, FreshnessLevel::Critical, 100.0);

        // 50 + 15 + 16, then only the standard vehicle picks up the +10.
        assert_eq!(refrigerated_score, 81.0);
        assert_eq!(standard_score, 91.0);
    }

    #[test]
    fn equally_scored_drivers_keep_listing_order() {
        let pool = vec![
            driver("first", DeliveryMode::Standard, 300.0, 4.5, 10.0),
            driver("second", DeliveryMode::Standard, 300.0, 4.5, 10.0),
        ];
        let ranked = rank_drivers(pool, FreshnessLevel::Excellent, 100.0);
        assert_eq!(ranked[0].driver_id, "first");
        assert_eq!(ranked[1].driver_id, "second");
    }

    #[test]
    fn pickup_window_tracks_declared_availability() {
        assert_eq!(PickupWindow::from_availability(9.0), PickupWindow::Immediate);
        assert_eq!(PickupWindow::from_availability(5.0), PickupWindow::Soon);
        assert_eq!(PickupWindow::from_availability(2.0), PickupWindow::Delayed);
    }
}
