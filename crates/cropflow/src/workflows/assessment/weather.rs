use crate::workflows::assessment::crops::CropCategory;
use crate::workflows::assessment::domain::{RiskLevel, StageError, StageName};
use crate::workflows::assessment::sources::{ReferenceDataSource, WeatherSample};
use serde::Serialize;
use tracing::info;

/// Aggregated weather impact for the transport window.
#[derive(Debug, Clone, Serialize)]
pub struct WeatherImpact {
    pub avg_temperature: f64,
    pub avg_humidity: f64,
    pub max_precipitation: f64,
    pub max_wind_speed: f64,
    pub risk_score: u32,
    pub risk_level: RiskLevel,
    pub optimal_conditions: bool,
}

/// Output of the weather stage.
#[derive(Debug, Clone, Serialize)]
pub struct WeatherAssessment {
    pub impact: WeatherImpact,
    pub degradation_rate_pct_per_hour: f64,
    pub transport_hours: f64,
    pub forecast_synthesized: bool,
    pub recommendations: Vec<String>,
}

/// Deterministic stand-in forecast built from a fixed diurnal curve; used
/// when the forecast lookup returns nothing so the stage never blocks.
pub fn synthetic_forecast(hours: u32) -> Vec<WeatherSample> {
    let base_temperature: f64 = 25.0;
    let base_humidity: f64 = 70.0;

    (0..hours.max(1))
        .map(|i| {
            let temp_variation = if i < 6 {
                -5.0
            } else if i < 12 {
                3.0
            } else if i < 18 {
                -2.0
            } else {
                1.0
            };
            let humidity_variation = if i % 4 == 0 { 5.0 } else { -3.0 };

            WeatherSample {
                temperature: base_temperature + temp_variation + (i % 3) as f64 - 1.0,
                humidity: (base_humidity + humidity_variation).clamp(40.0, 95.0),
                precipitation: if i % 6 == 3 { 5.0 } else { 0.0 },
                wind_speed: 5.0 + (i % 4) as f64,
            }
        })
        .collect()
}

/// Additive risk scoring over the aggregated window. Only the tightest
/// matching temperature band contributes.
pub fn analyze_impact(forecast: &[WeatherSample]) -> WeatherImpact {
    let count = forecast.len().max(1) as f64;
    let avg_temperature = forecast.iter().map(|s| s.temperature).sum::<f64>() / count;
    let avg_humidity = forecast.iter().map(|s| s.humidity).sum::<f64>() / count;
    let max_precipitation = forecast
        .iter()
        .map(|s| s.precipitation)
        .fold(0.0_f64, f64::max);
    let max_wind_speed = forecast
        .iter()
        .map(|s| s.wind_speed)
        .fold(0.0_f64, f64::max);

    let mut risk_score = 0;

    if !(5.0..=35.0).contains(&avg_temperature) {
        risk_score += 40;
    } else if !(10.0..=30.0).contains(&avg_temperature) {
        risk_score += 20;
    }

    if !(60.0..=95.0).contains(&avg_humidity) {
        risk_score += 25;
    }

    if max_precipitation > 0.0 {
        risk_score += 20;
    }

    if max_wind_speed > 40.0 {
        risk_score += 15;
    }

    let risk_level = RiskLevel::from_risk_score(risk_score);

    WeatherImpact {
        avg_temperature: round1(avg_temperature),
        avg_humidity: round1(avg_humidity),
        max_precipitation: round1(max_precipitation),
        max_wind_speed: round1(max_wind_speed),
        risk_score,
        risk_level,
        optimal_conditions: risk_level == RiskLevel::Low,
    }
}

fn recommendations(impact: &WeatherImpact) -> Vec<String> {
    let mut out = Vec::new();

    match impact.risk_level {
        RiskLevel::Critical => {
            out.push("URGENT: Use insulated/refrigerated transport".to_string());
            out.push("Consider delaying shipment".to_string());
            out.push("Monitor temperature closely".to_string());
        }
        RiskLevel::High => {
            out.push("Use refrigerated transport recommended".to_string());
            out.push("Increase monitoring frequency".to_string());
            out.push("Plan for possible delays".to_string());
        }
        RiskLevel::Medium | RiskLevel::Low => {}
    }

    if impact.avg_temperature > 30.0 {
        out.push("Temperature high - keep in shade/cool environment".to_string());
    } else if impact.avg_temperature < 10.0 {
        out.push("Temperature low - consider insulation".to_string());
    }

    if impact.max_precipitation > 0.0 {
        out.push("Waterproof packaging required".to_string());
    }

    if out.is_empty() {
        out.push("Weather conditions favorable for transport".to_string());
    }

    out
}

/// Run the weather stage for a transport window of `transport_hours`,
/// fetching the forecast for `location` and falling back to the synthetic
/// curve when the source has none.
pub fn assess<S: ReferenceDataSource>(
    source: &S,
    location: &str,
    crop: CropCategory,
    transport_hours: f64,
) -> Result<WeatherAssessment, StageError> {
    let horizon = transport_hours.ceil().max(1.0) as u32;
    let fetched = source
        .forecast(location, horizon)
        .map_err(|err| StageError::new(StageName::Weather, err.to_string()))?;

    let forecast_synthesized = fetched.is_empty();
    let forecast = if forecast_synthesized {
        synthetic_forecast(horizon)
    } else {
        fetched
    };

    let impact = analyze_impact(&forecast);
    let degradation_rate = impact.risk_level.base_degradation_rate()
        * crop.profile().weather_sensitivity;
    let recommendations = recommendations(&impact);

    info!(
        %crop,
        risk = impact.risk_level.label(),
        degradation_rate,
        synthesized = forecast_synthesized,
        "weather impact assessed"
    );

    Ok(WeatherAssessment {
        impact,
        degradation_rate_pct_per_hour: round2(degradation_rate),
        transport_hours,
        forecast_synthesized,
        recommendations,
    })
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(temperature: f64, humidity: f64, precipitation: f64, wind: f64) -> WeatherSample {
        WeatherSample {
            temperature,
            humidity,
            precipitation,
            wind_speed: wind,
        }
    }

    #[test]
    fn risk_checks_are_additive() {
        // Extreme temperature (+40), dry air (+25), rain (+20), gale (+15).
        let forecast = vec![sample(45.0, 30.0, 2.0, 50.0)];
        let impact = analyze_impact(&forecast);
        assert_eq!(impact.risk_score, 100);
        assert_eq!(impact.risk_level, RiskLevel::Critical);
        assert!(!impact.optimal_conditions);
    }

    #[test]
    fn only_the_tightest_temperature_band_contributes() {
        // 32 °C sits inside [5,35] but outside [10,30]: the 20-point penalty
        // applies, not the 40-point one.
        let forecast = vec![sample(32.0, 80.0, 0.0, 10.0)];
        let impact = analyze_impact(&forecast);
        assert_eq!(impact.risk_score, 20);
        assert_eq!(impact.risk_level, RiskLevel::Low);
    }

    #[test]
    fn mild_window_is_low_risk_with_favorable_recommendation() {
        let forecast = vec![sample(22.0, 75.0, 0.0, 8.0), sample(24.0, 70.0, 0.0, 6.0)];
        let impact = analyze_impact(&forecast);
        assert_eq!(impact.risk_level, RiskLevel::Low);
        let recs = recommendations(&impact);
        assert_eq!(recs, ["Weather conditions favorable for transport"]);
    }

    #[test]
    fn synthetic_forecast_is_deterministic_and_bounded() {
        let first = synthetic_forecast(24);
        let second = synthetic_forecast(24);
        assert_eq!(first.len(), 24);

        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.temperature, b.temperature);
            assert_eq!(a.humidity, b.humidity);
            assert_eq!(a.precipitation, b.precipitation);
            assert_eq!(a.wind_speed, b.wind_speed);
        }

        for s in &first {
            assert!((40.0..=95.0).contains(&s.humidity));
            assert!(s.wind_speed < 10.0);
        }
        // Periodic precipitation spike at every sixth-hour offset of three.
        assert!(first[3].precipitation > 0.0);
        assert_eq!(first[4].precipitation, 0.0);
    }

    #[test]
    fn degradation_scales_with_crop_sensitivity() {
        // Onion (0.4) resists what wilts leafy greens (1.5).
        let onion = RiskLevel::High.base_degradation_rate()
            * CropCategory::Onion.profile().weather_sensitivity;
        let greens = RiskLevel::High.base_degradation_rate()
            * CropCategory::LeafyGreens.profile().weather_sensitivity;
        assert!((onion - 0.8).abs() < 1e-9);
        assert!((greens - 3.0).abs() < 1e-9);
    }
}
