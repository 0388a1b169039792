use crate::workflows::assessment::domain::{DeliveryMode, FreshnessLevel, RiskLevel};
use crate::workflows::assessment::freshness::FreshnessResult;
use crate::workflows::assessment::logistics::LogisticsPlan;
use crate::workflows::assessment::market::pricing::PriceRecommendation;
use crate::workflows::assessment::market::MarketAnalysis;
use crate::workflows::assessment::weather::WeatherAssessment;
use serde::Serialize;

/// Final merged outcome. Synthesis is pure and total: failed stages simply
/// contribute nothing, and the result always carries a score and level.
#[derive(Debug, Clone, Serialize)]
pub struct SynthesisResult {
    pub final_score: f64,
    pub final_level: FreshnessLevel,
    pub base_score: f64,
    pub weather_impact: WeatherContribution,
    pub logistics_impact: LogisticsContribution,
    pub market_summary: MarketContribution,
    pub recommendations: Vec<String>,
    pub action_items: Vec<ActionItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeatherContribution {
    pub degradation_rate: f64,
    pub estimated_loss: f64,
    pub risk_level: Option<RiskLevel>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogisticsContribution {
    pub delivery_mode: DeliveryMode,
    pub preservation_bonus: f64,
    pub feasible: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarketContribution {
    pub recommended_price: Option<f64>,
    pub pricing_strategy: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionPriority {
    Critical,
    High,
    Normal,
    Important,
    Warning,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionItem {
    pub priority: ActionPriority,
    pub action: String,
    pub details: String,
}

/// Merge the stage outputs. `Option` arguments are the surviving values of
/// the three fallible stages; `None` means the stage failed and contributes
/// defaults (no loss, no bonus, no price).
pub fn synthesize(
    freshness: &FreshnessResult,
    market: Option<&MarketAnalysis>,
    logistics: Option<&LogisticsPlan>,
    weather: Option<&WeatherAssessment>,
) -> SynthesisResult {
    let base_score = freshness.score;

    let (degradation_rate, transport_hours, risk_level) = match weather {
        Some(w) => (
            w.degradation_rate_pct_per_hour,
            w.transport_hours,
            Some(w.impact.risk_level),
        ),
        None => (0.0, 0.0, None),
    };
    let estimated_loss = degradation_rate * transport_hours;

    let (delivery_mode, feasible) = match logistics {
        Some(plan) => (plan.recommendation.mode, plan.recommendation.feasible),
        None => (DeliveryMode::Standard, true),
    };
    let preservation_bonus = delivery_mode.preservation_bonus();

    let final_score = round2((base_score - estimated_loss + preservation_bonus).clamp(0.0, 100.0));
    let final_level = FreshnessLevel::from_score(final_score);

    let (recommended_price, pricing_strategy) = match market.map(|m| &m.price) {
        Some(PriceRecommendation::Recommended {
            price_per_kg,
            strategy,
            ..
        }) => (Some(*price_per_kg), Some(strategy.label())),
        _ => (None, None),
    };

    let recommendations = assemble_recommendations(
        base_score,
        final_score,
        final_level,
        recommended_price,
        pricing_strategy,
        delivery_mode,
        logistics,
        weather,
    );

    let action_items = assemble_action_items(
        final_level,
        delivery_mode,
        recommended_price,
        pricing_strategy,
        logistics,
    );

    SynthesisResult {
        final_score,
        final_level,
        base_score,
        weather_impact: WeatherContribution {
            degradation_rate,
            estimated_loss: round2(estimated_loss),
            risk_level,
        },
        logistics_impact: LogisticsContribution {
            delivery_mode,
            preservation_bonus,
            feasible,
        },
        market_summary: MarketContribution {
            recommended_price,
            pricing_strategy,
        },
        recommendations,
        action_items,
    }
}

/// Assembly order is fixed: loss warning, status line, price line, delivery
/// line, feasibility notes, weather advice, urgency escalation.
#[allow(clippy::too_many_arguments)]
fn assemble_recommendations(
    base_score: f64,
    final_score: f64,
    final_level: FreshnessLevel,
    recommended_price: Option<f64>,
    pricing_strategy: Option<&'static str>,
    delivery_mode: DeliveryMode,
    logistics: Option<&LogisticsPlan>,
    weather: Option<&WeatherAssessment>,
) -> Vec<String> {
    let mut out = Vec::new();

    if final_score < base_score {
        let loss = base_score - final_score;
        out.push(format!(
            "Weather will degrade freshness by ~{loss:.1}% during transport"
        ));
    }

    out.push(format!(
        "Current Status: {final_level} (Score: {final_score:.0}/100)"
    ));

    if let Some(price) = recommended_price {
        let strategy = pricing_strategy.unwrap_or("MARKET_RATE");
        out.push(format!("Recommended Price: Rs {price:.2} ({strategy})"));
    }

    out.push(format!(
        "Use {} delivery",
        delivery_mode.label().to_uppercase()
    ));

    if let Some(plan) = logistics {
        if !plan.recommendation.feasible {
            out.extend(plan.recommendation.feasibility_notes.iter().cloned());
        }
    }

    if let Some(w) = weather {
        out.extend(w.recommendations.iter().cloned());
    }

    match final_level {
        FreshnessLevel::Poor | FreshnessLevel::Critical => {
            out.push("URGENT: Initiate immediate distribution to prevent total loss".to_string());
        }
        FreshnessLevel::Fair => {
            out.push("HIGH PRIORITY: Schedule delivery within 24 hours".to_string());
        }
        _ => {}
    }

    out
}

fn assemble_action_items(
    final_level: FreshnessLevel,
    delivery_mode: DeliveryMode,
    recommended_price: Option<f64>,
    pricing_strategy: Option<&'static str>,
    logistics: Option<&LogisticsPlan>,
) -> Vec<ActionItem> {
    let priority = match final_level {
        FreshnessLevel::Critical | FreshnessLevel::Poor => ActionPriority::Critical,
        FreshnessLevel::Fair => ActionPriority::High,
        _ => ActionPriority::Normal,
    };

    let mut actions = vec![ActionItem {
        priority,
        action: "Confirm delivery arrangements".to_string(),
        details: format!("Recommended mode: {delivery_mode}"),
    }];

    if let Some(price) = recommended_price {
        let strategy = pricing_strategy.unwrap_or("market analysis");
        actions.push(ActionItem {
            priority: ActionPriority::Important,
            action: "Set market price".to_string(),
            details: format!("Rs {price:.2} based on {strategy}"),
        });
    }

    if let Some(plan) = logistics {
        let notes = &plan.recommendation.feasibility_notes;
        if !notes.is_empty() {
            actions.push(ActionItem {
                priority: ActionPriority::Warning,
                action: "Address logistics constraints".to_string(),
                details: notes
                    .iter()
                    .take(2)
                    .cloned()
                    .collect::<Vec<_>>()
                    .join("; "),
            });
        }
    }

    actions
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
