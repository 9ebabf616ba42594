//! Scoring Regression Tests
//!
//! Exercises the public scoring API end to end: a fixed reference site with
//! hand-checked figures, a seeded random sweep over the full valid input
//! range, and the monotonicity and boundary properties of the curves.

use erw_sitescore::config::{NormalizerConfig, ScoringConfig};
use erw_sitescore::scoring::normalizers;
use erw_sitescore::{SiteParameters, SiteScoreRequest, SiteScorer, SustainabilityGrade};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 100 ha, 50 km haul, infrastructure 0.8, every other reading at its optimum.
fn reference_site() -> SiteParameters {
    SiteParameters {
        latitude: -1.29,
        longitude: 36.82,
        rainfall_mm: 1500.0,
        soil_ph: 7.0,
        avg_temperature_c: 28.0,
        annual_rainfall_variability: 0.0,
        soil_organic_carbon_percent: 3.0,
        elevation_meters: 500.0,
        soil_moisture_percent: 40.0,
        soil_cec_meq_per_100g: 25.0,
        distance_to_road_km: 0.0,
        basalt_transport_distance_km: 50.0,
        basalt_availability_index: 1.0,
        infrastructure_quality_index: 0.8,
        monitoring_capability_index: 1.0,
        agricultural_land_hectares: 100.0,
        population_density_per_km2: 0.0,
        energy_cost_per_kwh: 0.05,
        labor_cost_per_hour: 5.0,
        carbon_market_accessibility: 1.0,
        regulatory_stability_index: 1.0,
    }
}

/// Uniform draw over every field's accepted range.
fn random_site(rng: &mut StdRng) -> SiteParameters {
    SiteParameters {
        latitude: rng.gen_range(-90.0..=90.0),
        longitude: rng.gen_range(-180.0..=180.0),
        rainfall_mm: rng.gen_range(0.0..=4000.0),
        soil_ph: rng.gen_range(0.0..=14.0),
        avg_temperature_c: rng.gen_range(-50.0..=60.0),
        annual_rainfall_variability: rng.gen_range(0.0..=5000.0),
        soil_organic_carbon_percent: rng.gen_range(0.0..=100.0),
        elevation_meters: rng.gen_range(0.0..=3000.0),
        soil_moisture_percent: rng.gen_range(10.0..=90.0),
        soil_cec_meq_per_100g: rng.gen_range(0.0..=50.0),
        distance_to_road_km: rng.gen_range(0.0..=200.0),
        basalt_transport_distance_km: rng.gen_range(0.0..=1000.0),
        basalt_availability_index: rng.gen_range(0.0..=1.0),
        infrastructure_quality_index: rng.gen_range(0.0..=1.0),
        monitoring_capability_index: rng.gen_range(0.0..=1.0),
        agricultural_land_hectares: rng.gen_range(0.0..=20_000_000.0),
        population_density_per_km2: rng.gen_range(0.0..=10_000.0),
        energy_cost_per_kwh: rng.gen_range(0.01..=1.0),
        labor_cost_per_hour: rng.gen_range(1.0..=200.0),
        carbon_market_accessibility: rng.gen_range(0.0..=1.0),
        regulatory_stability_index: rng.gen_range(0.0..=1.0),
    }
}

// ============================================================================
// Reference site
// ============================================================================

#[test]
fn reference_site_matches_hand_computed_figures() {
    let a = SiteScorer::default().score(&reference_site());

    assert_eq!(a.score, 0.97);
    assert_eq!(a.project_capacity_hectares, 100.0);
    assert_eq!(a.co2_emissions_kg_per_year, 8_100.0);
    assert_eq!(a.carbon_removal_kg_per_year, 204_330.0);
    assert_eq!(a.net_carbon_impact_kg_per_year, 196_230.0);
    assert_eq!(a.carbon_efficiency_ratio, 0.96);
    assert_eq!(a.total_cost_usd_per_year, 2_160_710.0);
    assert_eq!(a.cost_per_ton_co2_removed, 10_574.61);
    assert_eq!(a.sustainability_grade, SustainabilityGrade::F);
}

#[test]
fn reference_site_serializes_with_wire_names() {
    let a = SiteScorer::default().score(&reference_site());
    let v = serde_json::to_value(&a).unwrap();

    for key in [
        "score",
        "breakdown",
        "projectCapacityHectares",
        "co2EmissionsKgPerYear",
        "carbonRemovalKgPerYear",
        "netCarbonImpactKgPerYear",
        "carbonEfficiencyRatio",
        "basaltMaterialCostUsdPerYear",
        "transportCostUsdPerYear",
        "laborCostUsdPerYear",
        "equipmentCostUsdPerYear",
        "totalCostUsdPerYear",
        "costPerTonCo2Removed",
        "sustainabilityGrade",
    ] {
        assert!(v.get(key).is_some(), "missing output field {key}");
    }
    assert_eq!(v["sustainabilityGrade"], "F");
    assert_eq!(v["breakdown"]["soilPh"], 1.0);
}

#[test]
fn request_round_trip_through_validation_scores_identically() {
    let scorer = SiteScorer::default();
    let direct = scorer.score(&reference_site());

    let json = serde_json::to_string(&SiteScoreRequest::from(reference_site())).unwrap();
    assert!(json.contains("\"energyCostPerKWh\""));
    let request: SiteScoreRequest = serde_json::from_str(&json).unwrap();
    let via_request = scorer.score(&request.into_parameters().unwrap());

    assert_eq!(direct, via_request);
}

// ============================================================================
// Properties over the whole valid input space
// ============================================================================

#[test]
fn random_sweep_keeps_scores_in_unit_interval() {
    let scorer = SiteScorer::default();
    let mut rng = StdRng::seed_from_u64(0x45_52_57);

    for _ in 0..2_000 {
        let site = random_site(&mut rng);
        let a = scorer.score(&site);

        assert!((0.0..=1.0).contains(&a.score), "score {} for {site:?}", a.score);
        for (name, value) in a.breakdown.iter() {
            assert!((0.0..=1.0).contains(&value), "{name} = {value} for {site:?}");
        }
        assert!(a.carbon_efficiency_ratio <= 1.0);
        assert!(a.cost_per_ton_co2_removed.is_finite());
        assert!(a.cost_per_ton_co2_removed >= 0.0);
        assert!(a.project_capacity_hectares <= 100.0);
    }
}

#[test]
fn random_sweep_is_deterministic() {
    let scorer = SiteScorer::default();
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..200 {
        let site = random_site(&mut rng);
        assert_eq!(scorer.score(&site), scorer.score(&site));
    }
}

#[test]
fn ph_score_strictly_decreases_away_from_neutral() {
    let n = NormalizerConfig::default();
    let mut previous = normalizers::soil_ph(7.0, &n);
    for step in 1..=70 {
        let offset = f64::from(step) * 0.1;
        let above = normalizers::soil_ph(7.0 + offset, &n);
        let below = normalizers::soil_ph(7.0 - offset, &n);
        assert!(above < previous, "pH {}", 7.0 + offset);
        assert!((above - below).abs() < 1e-12);
        previous = above;
    }
}

#[test]
fn transport_and_population_scores_never_increase() {
    let n = NormalizerConfig::default();

    let mut last = f64::INFINITY;
    for km in 0..=1000 {
        let s = normalizers::transport(f64::from(km), &n);
        assert!(s <= last, "transport rose at {km} km");
        last = s;
    }

    let mut last = f64::INFINITY;
    for density in (0..=10_000).step_by(5) {
        let s = normalizers::population_density(f64::from(density), &n);
        assert!(s <= last + 1e-12, "population score rose at {density}/km2");
        last = s;
    }
}

#[test]
fn tropical_boundary_is_inclusive() {
    let scorer = SiteScorer::default();
    let mut site = reference_site();
    site.avg_temperature_c = 24.0;
    site.rainfall_mm = 1200.0;
    let tropical = scorer.score(&site);
    assert_eq!(tropical.breakdown.get("climateBonus"), Some(1.0));

    site.avg_temperature_c = 23.9;
    let temperate = scorer.score(&site);
    assert_eq!(temperate.breakdown.get("climateBonus"), Some(0.6));
    assert!(temperate.carbon_removal_kg_per_year < tropical.carbon_removal_kg_per_year);
}

#[test]
fn reloaded_weights_flow_through_to_score() {
    let mut config = ScoringConfig::default();
    config.version = "3.1".to_string();
    config.weights.overall.environmental = 0.0;
    config.weights.overall.logistics = 0.0;
    config.weights.overall.economic = 0.0;
    config.weights.overall.advanced = 1.0;

    let scorer = SiteScorer::new(config).unwrap();
    let a = scorer.score(&reference_site());
    assert_eq!(a.score, 1.0);
    assert_eq!(a.scoring_version, "3.1");
}
