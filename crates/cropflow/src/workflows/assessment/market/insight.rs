use crate::workflows::assessment::domain::Trend;
use crate::workflows::assessment::sources::{AdvisoryError, InsightGenerator, InsightPrompt};
use async_trait::async_trait;

/// Deterministic advisory sentence used whenever the generative path is
/// unavailable, slow, or absent.
pub fn rule_based_insight(prompt: &InsightPrompt) -> String {
    let trend_advice = match prompt.trend {
        Trend::Up => "Prices are rising - good time to sell!",
        Trend::Down => "Prices are falling - consider selling soon before further drop.",
        Trend::Stable => "Prices are stable.",
    };

    let strategy_note = prompt
        .pricing_strategy
        .map(|s| format!(" Suggested pricing strategy: {s}."))
        .unwrap_or_default();

    format!(
        "Best option is {} at Rs {:.0}/kg. You'll earn Rs {:.0} after transport costs. {}{}",
        prompt.best_option_name,
        prompt.best_price_per_kg,
        prompt.best_net_profit,
        trend_advice,
        strategy_note
    )
}

/// The always-available [`InsightGenerator`]: no I/O, never errors, never
/// times out.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedInsight;

#[async_trait]
impl InsightGenerator for RuleBasedInsight {
    async fn market_insight(&self, prompt: &InsightPrompt) -> Result<String, AdvisoryError> {
        Ok(rule_based_insight(prompt))
    }
}
