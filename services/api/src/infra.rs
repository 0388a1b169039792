use cropflow::workflows::assessment::crops::CropCategory;
use cropflow::workflows::assessment::domain::{DeliveryMode, SpoilageRisk, Trend};
use cropflow::workflows::assessment::geo::Coordinates;
use cropflow::workflows::assessment::sources::{
    AssessmentLog, DriverProfile, LogError, MarketSnapshot, ReferenceDataSource, SaleLocation,
    SourceError, WeatherSample,
};
use cropflow::workflows::assessment::AssessmentReport;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Seeded reference data for the default deployment. Market snapshots and
/// sale yards cover the common categories; the forecast lookup is left empty
/// so the weather stage exercises its synthetic path.
pub(crate) struct InMemoryReferenceData {
    snapshots: HashMap<CropCategory, MarketSnapshot>,
    locations: Vec<SaleLocation>,
    drivers: Vec<DriverProfile>,
}

impl Default for InMemoryReferenceData {
    fn default() -> Self {
        let mut snapshots = HashMap::new();
        snapshots.insert(
            CropCategory::Tomato,
            MarketSnapshot {
                average_price: 80.0,
                demand_index: 120.0,
                supply_index: 100.0,
                trend: Trend::Up,
            },
        );
        snapshots.insert(
            CropCategory::Onion,
            MarketSnapshot {
                average_price: 40.0,
                demand_index: 90.0,
                supply_index: 110.0,
                trend: Trend::Stable,
            },
        );
        snapshots.insert(
            CropCategory::Mango,
            MarketSnapshot {
                average_price: 150.0,
                demand_index: 140.0,
                supply_index: 100.0,
                trend: Trend::Up,
            },
        );
        snapshots.insert(
            CropCategory::Potato,
            MarketSnapshot {
                average_price: 30.0,
                demand_index: 80.0,
                supply_index: 120.0,
                trend: Trend::Stable,
            },
        );

        let yard = |id: &str,
                    name: &str,
                    region: &str,
                    lat: f64,
                    lon: f64,
                    price: f64,
                    trend: Trend,
                    risk: SpoilageRisk,
                    rate: f64| SaleLocation {
            id: id.to_string(),
            name: name.to_string(),
            region: region.to_string(),
            coordinates: Coordinates::new(lat, lon),
            price_per_kg: price,
            trend,
            spoilage_risk: risk,
            transport_rate_per_km: rate,
        };

        let locations = vec![
            yard("M001", "Pune APMC", "Pune", 18.5204, 73.8567, 82.0, Trend::Up, SpoilageRisk::Critical, 3.5),
            yard("M002", "Mumbai Wholesale", "Mumbai", 19.0760, 72.8777, 95.0, Trend::Up, SpoilageRisk::Critical, 4.0),
            yard("M003", "Nashik Mandi", "Nashik", 19.9975, 73.7898, 78.0, Trend::Stable, SpoilageRisk::Medium, 3.0),
            yard("M004", "Kolhapur Market", "Kolhapur", 16.7050, 74.2433, 80.0, Trend::Stable, SpoilageRisk::Medium, 3.2),
            yard("M005", "Solapur APMC", "Solapur", 17.6599, 75.9064, 75.0, Trend::Stable, SpoilageRisk::Medium, 3.0),
        ];

        let driver = |id: &str, name: &str, mode: DeliveryMode, capacity: f64, rating: f64, hours: f64| {
            DriverProfile {
                id: id.to_string(),
                name: name.to_string(),
                vehicle_type: mode,
                capacity_kg: capacity,
                rating,
                available_hours: hours,
            }
        };

        let drivers = vec![
            driver("D001", "Ramesh Patil", DeliveryMode::ColdChain, 2500.0, 4.8, 14.0),
            driver("D002", "Suresh Jadhav", DeliveryMode::Refrigerated, 1500.0, 4.5, 10.0),
            driver("D003", "Vikram More", DeliveryMode::Standard, 1000.0, 4.2, 8.0),
            driver("D004", "Anil Shinde", DeliveryMode::Standard, 750.0, 3.9, 5.0),
            driver("D005", "Prakash Kale", DeliveryMode::Refrigerated, 2000.0, 4.7, 12.0),
        ];

        Self {
            snapshots,
            locations,
            drivers,
        }
    }
}

impl ReferenceDataSource for InMemoryReferenceData {
    fn market_snapshot(&self, crop: CropCategory) -> Result<Option<MarketSnapshot>, SourceError> {
        Ok(self.snapshots.get(&crop).copied())
    }

    fn sale_locations(&self, crop: CropCategory) -> Result<Vec<SaleLocation>, SourceError> {
        // Listings are seeded for tomato only; other categories synthesize.
        if crop == CropCategory::Tomato {
            Ok(self.locations.clone())
        } else {
            Ok(Vec::new())
        }
    }

    fn available_drivers(&self, _mode: DeliveryMode) -> Result<Vec<DriverProfile>, SourceError> {
        Ok(self.drivers.clone())
    }

    fn forecast(
        &self,
        _location: &str,
        _horizon_hours: u32,
    ) -> Result<Vec<WeatherSample>, SourceError> {
        Ok(Vec::new())
    }
}

/// Append-only in-memory history behind the [`AssessmentLog`] trait.
#[derive(Default)]
pub(crate) struct InMemoryAssessmentLog {
    reports: Mutex<Vec<AssessmentReport>>,
}

impl InMemoryAssessmentLog {
    pub(crate) fn recent(&self, limit: usize) -> Vec<AssessmentReport> {
        let guard = self.reports.lock().expect("log mutex poisoned");
        let start = guard.len().saturating_sub(limit);
        guard[start..].to_vec()
    }
}

impl AssessmentLog for InMemoryAssessmentLog {
    fn record(&self, report: &AssessmentReport) -> Result<(), LogError> {
        let mut guard = self.reports.lock().expect("log mutex poisoned");
        guard.push(report.clone());
        Ok(())
    }
}
