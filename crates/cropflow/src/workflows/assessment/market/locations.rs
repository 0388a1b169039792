use crate::workflows::assessment::crops::CropCategory;
use crate::workflows::assessment::domain::{SpoilageRisk, Trend};
use crate::workflows::assessment::geo::{haversine_km, Coordinates};
use crate::workflows::assessment::sources::SaleLocation;
use serde::Serialize;

/// One ranked sale option with its computed economics.
#[derive(Debug, Clone, Serialize)]
pub struct MarketOption {
    pub location_id: String,
    pub name: String,
    pub region: String,
    pub price_per_kg: f64,
    pub trend: Trend,
    pub spoilage_risk: SpoilageRisk,
    pub distance_km: f64,
    pub estimated_revenue: f64,
    pub transport_cost: f64,
    pub net_profit: f64,
    pub profit_margin_percent: f64,
    pub is_recommended: bool,
    pub recommendation_reason: String,
}

/// How soon the seller should commit, derived from the spoilage exposure
/// across the candidate set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SellUrgency {
    Immediate,
    Within24h,
    Flexible,
}

/// The ranked candidate set plus its summary lines.
#[derive(Debug, Clone, Serialize)]
pub struct LocationRanking {
    pub options: Vec<MarketOption>,
    pub price_range: String,
    pub profit_gap: String,
    pub sell_urgency: SellUrgency,
    pub urgency_reason: String,
}

/// Fallback reference prices per category, used when the candidate lookup
/// returns nothing.
const fn default_price(crop: CropCategory) -> (f64, Trend, SpoilageRisk) {
    match crop {
        CropCategory::Tomato => (80.0, Trend::Up, SpoilageRisk::Critical),
        CropCategory::Onion => (40.0, Trend::Stable, SpoilageRisk::Low),
        CropCategory::Mango => (150.0, Trend::Up, SpoilageRisk::Critical),
        CropCategory::Potato => (30.0, Trend::Stable, SpoilageRisk::Low),
        CropCategory::Carrot => (40.0, Trend::Stable, SpoilageRisk::Low),
        CropCategory::Cucumber => (35.0, Trend::Stable, SpoilageRisk::Medium),
        CropCategory::LeafyGreens => (40.0, Trend::Stable, SpoilageRisk::Critical),
    }
}

struct DefaultYard {
    id: &'static str,
    name: &'static str,
    region: &'static str,
    coordinates: Coordinates,
    price_multiplier: f64,
    transport_rate_per_km: f64,
    trend_override: Option<Trend>,
}

/// The synthesized candidate set when no listings exist. Multipliers stay
/// within the documented ±20% band and are fixed so repeated assessments
/// rank identically.
const DEFAULT_YARDS: [DefaultYard; 5] = [
    DefaultYard {
        id: "M001",
        name: "Pune APMC",
        region: "Pune",
        coordinates: Coordinates::new(18.5204, 73.8567),
        price_multiplier: 1.05,
        transport_rate_per_km: 3.5,
        trend_override: None,
    },
    DefaultYard {
        id: "M002",
        name: "Mumbai Wholesale",
        region: "Mumbai",
        coordinates: Coordinates::new(19.0760, 72.8777),
        price_multiplier: 1.15,
        transport_rate_per_km: 4.0,
        trend_override: Some(Trend::Up),
    },
    DefaultYard {
        id: "M003",
        name: "Nashik Mandi",
        region: "Nashik",
        coordinates: Coordinates::new(19.9975, 73.7898),
        price_multiplier: 1.00,
        transport_rate_per_km: 3.0,
        trend_override: None,
    },
    DefaultYard {
        id: "M004",
        name: "Kolhapur Market",
        region: "Kolhapur",
        coordinates: Coordinates::new(16.7050, 74.2433),
        price_multiplier: 1.02,
        transport_rate_per_km: 3.2,
        trend_override: None,
    },
    DefaultYard {
        id: "M005",
        name: "Solapur APMC",
        region: "Solapur",
        coordinates: Coordinates::new(17.6599, 75.9064),
        price_multiplier: 0.98,
        transport_rate_per_km: 3.0,
        trend_override: Some(Trend::Stable),
    },
];

/// Synthesize a plausible candidate set around the crop's default price.
pub fn synthesize_locations(crop: CropCategory) -> Vec<SaleLocation> {
    let (base_price, trend, spoilage) = default_price(crop);
    DEFAULT_YARDS
        .iter()
        .map(|yard| SaleLocation {
            id: yard.id.to_string(),
            name: yard.name.to_string(),
            region: yard.region.to_string(),
            coordinates: yard.coordinates,
            price_per_kg: (base_price * yard.price_multiplier).round(),
            trend: yard.trend_override.unwrap_or(trend),
            spoilage_risk: spoilage,
            transport_rate_per_km: yard.transport_rate_per_km,
        })
        .collect()
}

/// Rank candidates by net profit. The sort is stable so candidates with
/// identical profit keep their input order.
pub fn rank_locations(
    crop: CropCategory,
    candidates: Vec<SaleLocation>,
    origin: Coordinates,
    quantity_kg: f64,
) -> LocationRanking {
    let candidates = if candidates.is_empty() {
        synthesize_locations(crop)
    } else {
        candidates
    };

    let mut options: Vec<MarketOption> = candidates
        .into_iter()
        .map(|location| {
            let distance_km = haversine_km(origin, location.coordinates);
            let revenue = location.price_per_kg * quantity_kg;
            let transport_cost = distance_km * location.transport_rate_per_km * (quantity_kg / 100.0);
            let net_profit = revenue - transport_cost;
            let profit_margin = if revenue > 0.0 {
                net_profit / revenue * 100.0
            } else {
                0.0
            };

            MarketOption {
                location_id: location.id,
                name: location.name,
                region: location.region,
                price_per_kg: location.price_per_kg,
                trend: location.trend,
                spoilage_risk: location.spoilage_risk,
                distance_km,
                estimated_revenue: round2(revenue),
                transport_cost: round2(transport_cost),
                net_profit: round2(net_profit),
                profit_margin_percent: round1(profit_margin),
                is_recommended: false,
                recommendation_reason: String::new(),
            }
        })
        .collect();

    options.sort_by(|a, b| b.net_profit.total_cmp(&a.net_profit));

    let profit_gap = match options.len() {
        0 => "No market data available".to_string(),
        1 => "Single option available".to_string(),
        _ => {
            let best = options.first().map(|o| o.net_profit).unwrap_or(0.0);
            let worst = options.last().map(|o| o.net_profit).unwrap_or(0.0);
            format!("Rs {:.0} difference between best and worst option", best - worst)
        }
    };

    if let Some(best) = options.first_mut() {
        best.is_recommended = true;
        best.recommendation_reason = format!(
            "Highest net profit (Rs {:.0}) with {}% margin",
            best.net_profit, best.profit_margin_percent
        );
    }

    let price_range = if options.is_empty() {
        "No price data".to_string()
    } else {
        let min = options
            .iter()
            .map(|o| o.price_per_kg)
            .fold(f64::INFINITY, f64::min);
        let max = options
            .iter()
            .map(|o| o.price_per_kg)
            .fold(f64::NEG_INFINITY, f64::max);
        format!("Rs {min:.0} - Rs {max:.0} per kg")
    };

    let (sell_urgency, urgency_reason) = classify_urgency(crop, &options);

    LocationRanking {
        options,
        price_range,
        profit_gap,
        sell_urgency,
        urgency_reason,
    }
}

fn classify_urgency(crop: CropCategory, options: &[MarketOption]) -> (SellUrgency, String) {
    let any = |risk: SpoilageRisk| options.iter().any(|o| o.spoilage_risk == risk);

    if any(SpoilageRisk::Critical) {
        (
            SellUrgency::Immediate,
            format!("{crop} has high spoilage risk. Sell within 24 hours for best quality."),
        )
    } else if any(SpoilageRisk::Medium) {
        (
            SellUrgency::Within24h,
            format!("Moderate spoilage risk for {crop}. Recommend selling within 48 hours."),
        )
    } else {
        (
            SellUrgency::Flexible,
            format!("{crop} has good shelf life. You can wait for better prices."),
        )
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
