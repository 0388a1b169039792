use crate::workflows::assessment::domain::SaleUrgency;
use crate::workflows::assessment::sources::MarketSnapshot;
use serde::Serialize;

/// Demand classification derived from the snapshot's demand vs supply
/// indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DemandLevel {
    HighDemand,
    NormalDemand,
    LowDemand,
}

impl DemandLevel {
    pub fn classify(snapshot: &MarketSnapshot) -> Self {
        if snapshot.demand_index > snapshot.supply_index {
            Self::HighDemand
        } else if snapshot.demand_index < 0.7 * snapshot.supply_index {
            Self::LowDemand
        } else {
            Self::NormalDemand
        }
    }

    const fn multiplier(self) -> f64 {
        match self {
            Self::HighDemand => 1.15,
            Self::NormalDemand => 1.0,
            Self::LowDemand => 0.85,
        }
    }
}

/// Named pricing posture; discrete tiers a human negotiator would use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PricingStrategy {
    Premium,
    AboveMarket,
    MarketRatePlus,
    CompetitiveDiscount,
    Clearance,
    MarketRate,
}

impl PricingStrategy {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Premium => "PREMIUM",
            Self::AboveMarket => "ABOVE_MARKET",
            Self::MarketRatePlus => "MARKET_RATE_PLUS",
            Self::CompetitiveDiscount => "COMPETITIVE_DISCOUNT",
            Self::Clearance => "CLEARANCE",
            Self::MarketRate => "MARKET_RATE",
        }
    }

    /// First matching rule wins; ordering is part of the contract.
    fn choose(freshness_score: f64, demand: DemandLevel) -> Self {
        if freshness_score >= 80.0 && demand == DemandLevel::HighDemand {
            Self::Premium
        } else if freshness_score >= 80.0 {
            Self::AboveMarket
        } else if demand == DemandLevel::HighDemand {
            Self::MarketRatePlus
        } else if demand == DemandLevel::LowDemand {
            Self::CompetitiveDiscount
        } else if freshness_score < 40.0 {
            Self::Clearance
        } else {
            Self::MarketRate
        }
    }
}

/// Outcome of the price-recommendation half of the market stage. The absence
/// of market statistics is a typed result, not an error.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PriceRecommendation {
    Recommended {
        price_per_kg: f64,
        strategy: PricingStrategy,
        demand: DemandLevel,
        freshness_multiplier: f64,
        demand_multiplier: f64,
        urgency_multiplier: f64,
        quantity_multiplier: f64,
    },
    InsufficientData {
        price_multiplier: f64,
    },
}

impl PriceRecommendation {
    pub fn strategy(&self) -> Option<PricingStrategy> {
        match self {
            Self::Recommended { strategy, .. } => Some(*strategy),
            Self::InsufficientData { .. } => None,
        }
    }
}

/// Step table rather than a continuous curve: discrete tiers negotiate
/// better.
fn freshness_multiplier(score: f64) -> f64 {
    if score >= 80.0 {
        1.20
    } else if score >= 60.0 {
        1.10
    } else if score >= 40.0 {
        0.95
    } else if score >= 20.0 {
        0.75
    } else {
        0.50
    }
}

fn quantity_multiplier(quantity_kg: f64) -> f64 {
    if quantity_kg < 50.0 {
        1.0
    } else if quantity_kg < 100.0 {
        0.98
    } else {
        0.95
    }
}

pub fn recommend_price(
    snapshot: Option<&MarketSnapshot>,
    freshness_score: f64,
    quantity_kg: f64,
    urgency: SaleUrgency,
) -> PriceRecommendation {
    let Some(snapshot) = snapshot else {
        return PriceRecommendation::InsufficientData {
            price_multiplier: 1.0,
        };
    };

    let demand = DemandLevel::classify(snapshot);
    let f_mult = freshness_multiplier(freshness_score);
    let d_mult = demand.multiplier();
    let u_mult = urgency.price_multiplier();
    let q_mult = quantity_multiplier(quantity_kg);

    let price = snapshot.average_price * f_mult * d_mult * u_mult * q_mult;

    PriceRecommendation::Recommended {
        price_per_kg: (price * 100.0).round() / 100.0,
        strategy: PricingStrategy::choose(freshness_score, demand),
        demand,
        freshness_multiplier: f_mult,
        demand_multiplier: d_mult,
        urgency_multiplier: u_mult,
        quantity_multiplier: q_mult,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::assessment::domain::Trend;

    fn snapshot(average_price: f64, demand: f64, supply: f64) -> MarketSnapshot {
        MarketSnapshot {
            average_price,
            demand_index: demand,
            supply_index: supply,
            trend: Trend::Stable,
        }
    }

    #[test]
    fn premium_requires_excellent_freshness_and_high_demand() {
        let snap = snapshot(100.0, 120.0, 100.0);
        let rec = recommend_price(Some(&snap), 85.0, 40.0, SaleUrgency::Low);
        match rec {
            PriceRecommendation::Recommended {
                price_per_kg,
                strategy,
                ..
            } => {
                assert_eq!(strategy, PricingStrategy::Premium);
                // 100 × 1.20 × 1.15 × 1.0 × 1.0
                assert!((price_per_kg - 138.0).abs() < 1e-9);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn strategy_priority_order_first_match_wins() {
        let high = snapshot(50.0, 120.0, 100.0);
        let low = snapshot(50.0, 50.0, 100.0);
        let normal = snapshot(50.0, 90.0, 100.0);

        assert_eq!(
            recommend_price(Some(&high), 85.0, 10.0, SaleUrgency::Low).strategy(),
            Some(PricingStrategy::Premium)
        );
        assert_eq!(
            recommend_price(Some(&normal), 85.0, 10.0, SaleUrgency::Low).strategy(),
            Some(PricingStrategy::AboveMarket)
        );
        assert_eq!(
            recommend_price(Some(&high), 50.0, 10.0, SaleUrgency::Low).strategy(),
            Some(PricingStrategy::MarketRatePlus)
        );
        assert_eq!(
            recommend_price(Some(&low), 30.0, 10.0, SaleUrgency::Low).strategy(),
            Some(PricingStrategy::CompetitiveDiscount)
        );
        assert_eq!(
            recommend_price(Some(&normal), 30.0, 10.0, SaleUrgency::Low).strategy(),
            Some(PricingStrategy::Clearance)
        );
        assert_eq!(
            recommend_price(Some(&normal), 50.0, 10.0, SaleUrgency::Low).strategy(),
            Some(PricingStrategy::MarketRate)
        );
    }

    #[test]
    fn urgency_and_quantity_discount_the_price() {
        let snap = snapshot(100.0, 90.0, 100.0);
        let rec = recommend_price(Some(&snap), 70.0, 150.0, SaleUrgency::High);
        match rec {
            PriceRecommendation::Recommended { price_per_kg, .. } => {
                // 100 × 1.10 × 1.0 × 0.85 × 0.95
                assert!((price_per_kg - 88.83).abs() < 0.01, "got {price_per_kg}");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_statistics_yield_typed_insufficient_data() {
        let rec = recommend_price(None, 90.0, 10.0, SaleUrgency::Low);
        assert!(matches!(
            rec,
            PriceRecommendation::InsufficientData {
                price_multiplier
            } if price_multiplier == 1.0
        ));
    }
}
