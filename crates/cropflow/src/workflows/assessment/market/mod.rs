pub mod insight;
pub mod locations;
pub mod pricing;

use crate::workflows::assessment::crops::CropCategory;
use crate::workflows::assessment::domain::{SaleUrgency, StageError, StageName};
use crate::workflows::assessment::geo::Coordinates;
use crate::workflows::assessment::sources::{InsightGenerator, InsightPrompt, ReferenceDataSource};
use self::locations::LocationRanking;
use self::pricing::PriceRecommendation;
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

/// Combined output of the market stage: the price recommendation, the ranked
/// sale options, and the advisory line.
#[derive(Debug, Clone, Serialize)]
pub struct MarketAnalysis {
    pub price: PriceRecommendation,
    pub ranking: LocationRanking,
    pub insight: String,
}

/// Parameters the caller supplies to the market stage.
#[derive(Debug, Clone, Copy)]
pub struct MarketStageInput {
    pub crop: CropCategory,
    pub freshness_score: f64,
    pub quantity_kg: f64,
    pub origin: Coordinates,
    pub urgency: SaleUrgency,
}

/// Run the market stage. The advisory call is bounded by `advisory_timeout`;
/// on timeout or transport failure the deterministic sentence is substituted
/// and the stage still completes.
pub async fn analyze<S, I>(
    source: &S,
    insight_generator: &I,
    input: MarketStageInput,
    advisory_timeout: Duration,
) -> Result<MarketAnalysis, StageError>
where
    S: ReferenceDataSource,
    I: InsightGenerator,
{
    let snapshot = source
        .market_snapshot(input.crop)
        .map_err(|err| StageError::new(StageName::Market, err.to_string()))?;

    let price = pricing::recommend_price(
        snapshot.as_ref(),
        input.freshness_score,
        input.quantity_kg,
        input.urgency,
    );

    let candidates = source
        .sale_locations(input.crop)
        .map_err(|err| StageError::new(StageName::Market, err.to_string()))?;
    let ranking = locations::rank_locations(input.crop, candidates, input.origin, input.quantity_kg);

    let insight = match ranking.options.first() {
        None => format!(
            "No market data available for {}. Contact the local market for current prices.",
            input.crop
        ),
        Some(best) => {
            let prompt = InsightPrompt {
                crop: input.crop,
                quantity_kg: input.quantity_kg,
                best_option_name: best.name.clone(),
                best_price_per_kg: best.price_per_kg,
                best_net_profit: best.net_profit,
                trend: best.trend,
                pricing_strategy: price.strategy().map(|s| s.label()),
            };

            match tokio::time::timeout(advisory_timeout, insight_generator.market_insight(&prompt))
                .await
            {
                Ok(Ok(text)) => text,
                Ok(Err(err)) => {
                    warn!(error = %err, "advisory generation failed, using rule-based insight");
                    insight::rule_based_insight(&prompt)
                }
                Err(_) => {
                    warn!(
                        timeout_ms = advisory_timeout.as_millis() as u64,
                        "advisory generation timed out, using rule-based insight"
                    );
                    insight::rule_based_insight(&prompt)
                }
            }
        }
    };

    info!(
        crop = %input.crop,
        options = ranking.options.len(),
        "market analysis complete"
    );

    Ok(MarketAnalysis {
        price,
        ranking,
        insight,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::assessment::sources::{
        AdvisoryError, DriverProfile, MarketSnapshot, SaleLocation, SourceError, WeatherSample,
    };
    use async_trait::async_trait;

    struct EmptySource;

    impl ReferenceDataSource for EmptySource {
        fn market_snapshot(
            &self,
            _crop: CropCategory,
        ) -> Result<Option<MarketSnapshot>, SourceError> {
            Ok(None)
        }

        fn sale_locations(&self, _crop: CropCategory) -> Result<Vec<SaleLocation>, SourceError> {
            Ok(Vec::new())
        }

        fn available_drivers(
            &self,
            _mode: crate::workflows::assessment::domain::DeliveryMode,
        ) -> Result<Vec<DriverProfile>, SourceError> {
            Ok(Vec::new())
        }

        fn forecast(
            &self,
            _location: &str,
            _horizon_hours: u32,
        ) -> Result<Vec<WeatherSample>, SourceError> {
            Ok(Vec::new())
        }
    }

    struct StallingInsight;

    #[async_trait]
    impl InsightGenerator for StallingInsight {
        async fn market_insight(&self, _prompt: &InsightPrompt) -> Result<String, AdvisoryError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("too late".to_string())
        }
    }

    fn input() -> MarketStageInput {
        MarketStageInput {
            crop: CropCategory::Tomato,
            freshness_score: 90.0,
            quantity_kg: 100.0,
            origin: Coordinates::new(18.5204, 73.8567),
            urgency: SaleUrgency::Low,
        }
    }

    #[tokio::test]
    async fn empty_source_still_yields_ranked_synthetic_options() {
        let analysis = analyze(
            &EmptySource,
            &insight::RuleBasedInsight,
            input(),
            Duration::from_millis(100),
        )
        .await
        .unwrap();

        assert!(matches!(
            analysis.price,
            PriceRecommendation::InsufficientData { .. }
        ));
        assert_eq!(analysis.ranking.options.len(), 5);
        assert!(analysis.ranking.options[0].is_recommended);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_advisory_falls_back_to_rule_based_sentence() {
        let analysis = analyze(
            &EmptySource,
            &StallingInsight,
            input(),
            Duration::from_millis(50),
        )
        .await
        .unwrap();

        assert!(analysis.insight.contains("Best option is"));
        assert!(!analysis.insight.contains("too late"));
    }
}
