use cropflow::workflows::assessment::crops::CropCategory;
use cropflow::workflows::assessment::domain::{SpoilageRisk, Trend};
use cropflow::workflows::assessment::geo::Coordinates;
use cropflow::workflows::assessment::market::locations::rank_locations;
use cropflow::workflows::assessment::sources::SaleLocation;

const PUNE: Coordinates = Coordinates::new(18.5204, 73.8567);

fn yard(id: &str, price: f64, lat: f64, lon: f64, rate: f64) -> SaleLocation {
    SaleLocation {
        id: id.to_string(),
        name: format!("{id} Market"),
        region: "Maharashtra".to_string(),
        coordinates: Coordinates::new(lat, lon),
        price_per_kg: price,
        trend: Trend::Stable,
        spoilage_risk: SpoilageRisk::Medium,
        transport_rate_per_km: rate,
    }
}

fn candidates() -> Vec<SaleLocation> {
    vec![
        yard("pune", 80.0, 18.5204, 73.8567, 3.5),
        yard("mumbai", 95.0, 19.0760, 72.8777, 4.0),
        yard("nashik", 70.0, 19.9975, 73.7898, 3.0),
        yard("kolhapur", 85.0, 16.7050, 74.2433, 3.2),
        yard("solapur", 75.0, 17.6599, 75.9064, 3.0),
    ]
}

#[test]
fn ranking_is_invariant_under_input_permutation() {
    let quantity = 100.0;
    let baseline = rank_locations(CropCategory::Tomato, candidates(), PUNE, quantity);

    let mut reversed = candidates();
    reversed.reverse();
    let permuted = rank_locations(CropCategory::Tomato, reversed, PUNE, quantity);

    let baseline_ids: Vec<_> = baseline
        .options
        .iter()
        .map(|o| o.location_id.clone())
        .collect();
    let permuted_ids: Vec<_> = permuted
        .options
        .iter()
        .map(|o| o.location_id.clone())
        .collect();

    assert_eq!(baseline_ids, permuted_ids);
    assert_eq!(
        baseline.options[0].location_id,
        permuted.options[0].location_id
    );
    assert!(baseline.options[0].is_recommended);
    assert!(permuted.options[0].is_recommended);
}

#[test]
fn net_profit_accounts_for_distance_scaled_transport_cost() {
    let ranking = rank_locations(CropCategory::Tomato, candidates(), PUNE, 100.0);

    // The local yard has zero transport cost; its net profit equals revenue.
    let pune = ranking
        .options
        .iter()
        .find(|o| o.location_id == "pune")
        .unwrap();
    assert_eq!(pune.distance_km, 0.0);
    assert_eq!(pune.transport_cost, 0.0);
    assert_eq!(pune.net_profit, pune.estimated_revenue);

    // Every remote yard pays for its distance.
    for option in ranking.options.iter().filter(|o| o.location_id != "pune") {
        assert!(option.distance_km > 0.0);
        assert!(option.transport_cost > 0.0);
        assert!(option.net_profit < option.estimated_revenue);
    }
}

#[test]
fn summary_lines_cover_range_gap_and_urgency() {
    let ranking = rank_locations(CropCategory::Tomato, candidates(), PUNE, 100.0);

    assert!(ranking.price_range.contains("Rs 70"));
    assert!(ranking.price_range.contains("Rs 95"));
    assert!(ranking.profit_gap.contains("difference between best and worst"));
    // All candidates carry Medium spoilage risk.
    assert!(ranking.urgency_reason.contains("48 hours"));
}
