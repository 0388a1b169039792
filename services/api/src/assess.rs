use crate::infra::{InMemoryAssessmentLog, InMemoryReferenceData};
use clap::Args;
use cropflow::config::AppConfig;
use cropflow::error::AppError;
use cropflow::telemetry;
use cropflow::workflows::assessment::domain::{validate_distance_km, CropObservation, SaleUrgency};
use cropflow::workflows::assessment::market::insight::RuleBasedInsight;
use cropflow::workflows::assessment::market::pricing::PriceRecommendation;
use cropflow::workflows::assessment::{AssessmentPipeline, AssessmentRequest, StageResult};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// Crop name (free text; vernacular names accepted)
    #[arg(long)]
    pub(crate) crop: String,
    /// Storage temperature in Celsius
    #[arg(long)]
    pub(crate) temperature: f64,
    /// Relative humidity in percent
    #[arg(long)]
    pub(crate) humidity: f64,
    /// Hours since harvest
    #[arg(long)]
    pub(crate) age_hours: Option<f64>,
    /// Batch size in kilograms
    #[arg(long, default_value_t = 100.0)]
    pub(crate) quantity_kg: f64,
    /// Transport distance in kilometres
    #[arg(long, default_value_t = 100.0)]
    pub(crate) distance_km: f64,
    /// Delivery window in hours
    #[arg(long)]
    pub(crate) window_hours: Option<f64>,
    /// Seller urgency: low, medium or high
    #[arg(long, default_value = "low")]
    pub(crate) urgency: String,
}

pub(crate) async fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let observation = CropObservation::new(
        args.crop,
        args.temperature,
        args.humidity,
        args.age_hours,
        args.quantity_kg,
    )?;

    let distance_km = validate_distance_km(args.distance_km)?;

    let mut request = AssessmentRequest::new(observation, distance_km);
    request.availability_window_hours = args.window_hours;
    request.sale_urgency = match args.urgency.to_ascii_lowercase().as_str() {
        "high" => SaleUrgency::High,
        "medium" => SaleUrgency::Medium,
        _ => SaleUrgency::Low,
    };

    let pipeline = AssessmentPipeline::new(
        Arc::new(InMemoryReferenceData::default()),
        Arc::new(RuleBasedInsight),
        Arc::new(InMemoryAssessmentLog::default()),
        config.pipeline.freshness_weights,
        config.pipeline.advisory_timeout,
    );

    let report = pipeline.execute(request).await;

    println!("Assessment {}", report.assessment_id);
    println!(
        "  Crop: {} ({} kg)",
        report.observation.crop_name, report.observation.quantity_kg
    );

    match &report.freshness {
        StageResult::Completed(freshness) => {
            println!(
                "  Freshness: {:.2}/100 ({}) [temp {:.0}, humidity {:.0}, age {:.0}]",
                freshness.score,
                freshness.level,
                freshness.component_scores.temperature,
                freshness.component_scores.humidity,
                freshness.component_scores.age
            );
        }
        StageResult::Failed { error } => println!("  Freshness stage failed: {error}"),
        StageResult::Skipped { reason } => println!("  Freshness stage skipped: {reason}"),
    }

    if let Some(market) = report.market.completed() {
        match &market.price {
            PriceRecommendation::Recommended {
                price_per_kg,
                strategy,
                ..
            } => println!(
                "  Price: Rs {price_per_kg:.2}/kg ({})",
                strategy.label()
            ),
            PriceRecommendation::InsufficientData { .. } => {
                println!("  Price: insufficient market data");
            }
        }
        println!("  Markets ({}):", market.ranking.price_range);
        for option in &market.ranking.options {
            let marker = if option.is_recommended { "*" } else { " " };
            println!(
                "   {marker} {} ({:.1} km): Rs {:.0}/kg, net profit Rs {:.0}",
                option.name, option.distance_km, option.price_per_kg, option.net_profit
            );
        }
        println!("  Insight: {}", market.insight);
    }

    if let Some(logistics) = report.logistics.completed() {
        let rec = &logistics.recommendation;
        println!(
            "  Delivery: {} ({}), {:.2}h, Rs {:.0}, feasible: {}",
            rec.mode, rec.urgency.label(), rec.estimated_hours, rec.estimated_cost, rec.feasible
        );
        for driver in &logistics.ranked_drivers {
            println!(
                "    Driver {} ({}, {:.0} kg, rating {:.1}): score {:.0}",
                driver.name,
                driver.vehicle_type,
                driver.capacity_kg,
                driver.rating,
                driver.suitability_score
            );
        }
    }

    if let Some(weather) = report.weather.completed() {
        println!(
            "  Weather: {} risk, {:.2}%/h degradation over {:.1}h",
            weather.impact.risk_level.label(),
            weather.degradation_rate_pct_per_hour,
            weather.transport_hours
        );
    }

    if let Some(synthesis) = &report.synthesis {
        println!(
            "  Final: {:.2}/100 ({})",
            synthesis.final_score, synthesis.final_level
        );
        println!("  Recommendations:");
        for line in &synthesis.recommendations {
            println!("    - {line}");
        }
        println!("  Action items:");
        for item in &synthesis.action_items {
            println!("    [{:?}] {}: {}", item.priority, item.action, item.details);
        }
    }

    Ok(())
}
