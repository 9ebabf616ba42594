//! Site Scoring Engine
//!
//! Closed-form, versioned scoring of a candidate ERW site. Pure and
//! synchronous: no I/O, no shared mutable state, identical inputs always
//! produce identical outputs, so one scorer can be shared across threads.
//!
//! ## Pipeline
//! 1. `normalizers::evaluate()` - raw readings to [0, 1] sub-scores
//! 2. `aggregation::aggregate()` - category and overall weighted sums
//! 3. `carbon::estimate()` - throughput, emissions, climate-dependent removal
//! 4. `cost::estimate()` - material, haulage, labor, equipment, cost per ton
//! 5. `grading::classify()` - first-match grade from unrounded metrics
//!
//! Rounding to two decimals happens once, when the [`SiteAssessment`] is
//! assembled. Internal chaining uses full precision.

pub mod aggregation;
pub mod carbon;
pub mod cost;
pub mod grading;
pub mod normalizers;

pub use aggregation::CategoryScores;
pub use carbon::CarbonImpact;
pub use cost::CostBreakdown;
pub use normalizers::{Category, NORMALIZERS};

use tracing::debug;

use crate::config::{ConfigError, ScoringConfig};
use crate::types::{ScoreBreakdown, SiteAssessment, SiteParameters};

/// Round half-up to two decimal places: `floor(v × 100 + 0.5) / 100`.
///
/// Negative halves round toward positive infinity (-1.005 → -1.0).
pub fn round2(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0
}

/// Scorer bound to one validated [`ScoringConfig`].
#[derive(Debug, Clone)]
pub struct SiteScorer {
    config: ScoringConfig,
}

impl Default for SiteScorer {
    /// Scorer for the built-in v3.0 formula.
    fn default() -> Self {
        Self {
            config: ScoringConfig::default(),
        }
    }
}

impl SiteScorer {
    /// Build a scorer, rejecting configs that fail [`ScoringConfig::validate`].
    pub fn new(config: ScoringConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn version(&self) -> &str {
        &self.config.version
    }

    /// Score one site.
    pub fn score(&self, params: &SiteParameters) -> SiteAssessment {
        let cfg = &self.config;

        let sub_scores = normalizers::evaluate(params, cfg);
        let categories = aggregation::aggregate(&sub_scores, &cfg.weights);
        let impact = carbon::estimate(params, categories.overall, &cfg.carbon, &cfg.climate);
        let costs = cost::estimate(params, &impact, &cfg.cost, &cfg.carbon);

        let grade = grading::classify(
            &cfg.grades,
            categories.overall,
            impact.efficiency_ratio,
            costs.cost_per_ton_co2,
        );

        debug!(
            score = categories.overall,
            efficiency = impact.efficiency_ratio,
            cost_per_ton = costs.cost_per_ton_co2,
            grade = %grade,
            "Site scored"
        );

        SiteAssessment {
            score: round2(categories.overall),
            breakdown: breakdown(&categories, &sub_scores),
            project_capacity_hectares: round2(impact.project_hectares),
            co2_emissions_kg_per_year: round2(impact.transport_emissions_kg),
            carbon_removal_kg_per_year: round2(impact.carbon_removal_kg),
            net_carbon_impact_kg_per_year: round2(impact.net_carbon_impact_kg),
            carbon_efficiency_ratio: round2(impact.efficiency_ratio),
            basalt_material_cost_usd_per_year: round2(costs.basalt_material),
            transport_cost_usd_per_year: round2(costs.transport),
            labor_cost_usd_per_year: round2(costs.labor),
            equipment_cost_usd_per_year: round2(costs.equipment),
            total_cost_usd_per_year: round2(costs.total),
            cost_per_ton_co2_removed: round2(costs.cost_per_ton_co2),
            sustainability_grade: grade,
            scoring_version: cfg.version.clone(),
        }
    }
}

/// Categories first, then every sub-score in table order, all rounded.
fn breakdown(categories: &CategoryScores, sub_scores: &[f64; normalizers::NORMALIZER_COUNT]) -> ScoreBreakdown {
    let mut out = ScoreBreakdown::with_capacity(Category::ALL.len() + NORMALIZERS.len());
    for category in Category::ALL {
        out.push(category.name(), round2(categories.get(category)));
    }
    for (n, score) in NORMALIZERS.iter().zip(sub_scores) {
        out.push(n.name, round2(*score));
    }
    out
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::SustainabilityGrade;

    /// 100 ha, 50 km haul, infrastructure 0.8, every other reading at its optimum.
    pub(crate) fn reference_site() -> SiteParameters {
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

    #[test]
    fn test_round2_half_up() {
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(0.973), 0.97);
        assert_eq!(round2(0.005), 0.01);
        assert_eq!(round2(0.0025), 0.0);
        assert_eq!(round2(-0.125), -0.12);
        assert_eq!(round2(10_574.609_7), 10_574.61);
    }

    #[test]
    fn test_reference_site_assessment() {
        let a = SiteScorer::default().score(&reference_site());

        assert_eq!(a.score, 0.97);
        assert_eq!(a.breakdown.get("environmental"), Some(1.0));
        assert_eq!(a.breakdown.get("logistics"), Some(0.96));
        assert_eq!(a.breakdown.get("economic"), Some(0.94));
        assert_eq!(a.breakdown.get("advanced"), Some(1.0));
        assert_eq!(a.breakdown.get("climateBonus"), Some(1.0));

        assert_eq!(a.project_capacity_hectares, 100.0);
        assert_eq!(a.co2_emissions_kg_per_year, 8_100.0);
        assert_eq!(a.carbon_removal_kg_per_year, 204_330.0);
        assert_eq!(a.net_carbon_impact_kg_per_year, 196_230.0);
        assert_eq!(a.carbon_efficiency_ratio, 0.96);

        assert_eq!(a.basalt_material_cost_usd_per_year, 10_500.0);
        assert_eq!(a.transport_cost_usd_per_year, 6_210.0);
        assert_eq!(a.labor_cost_usd_per_year, 200_000.0);
        assert_eq!(a.equipment_cost_usd_per_year, 1_944_000.0);
        assert_eq!(a.total_cost_usd_per_year, 2_160_710.0);
        assert_eq!(a.cost_per_ton_co2_removed, 10_574.61);

        // Equipment dominates at pilot scale, so the cost bound fails every row
        assert_eq!(a.sustainability_grade, SustainabilityGrade::F);
        assert_eq!(a.scoring_version, "3.0");
    }

    #[test]
    fn test_breakdown_order_categories_then_parameters() {
        let a = SiteScorer::default().score(&reference_site());
        let keys: Vec<&str> = a.breakdown.keys().collect();
        assert_eq!(keys.len(), 24);
        assert_eq!(&keys[..4], &["environmental", "logistics", "economic", "advanced"]);
        assert_eq!(keys[4], "soilPh");
        assert_eq!(keys[23], "climateBonus");

        // The externally required keys keep their relative order
        let required = [
            "environmental",
            "logistics",
            "economic",
            "soilPh",
            "temperature",
            "rainfall",
            "roadAccess",
            "transport",
            "infrastructure",
            "basaltAvailability",
        ];
        let positions: Vec<usize> = required
            .iter()
            .map(|k| keys.iter().position(|key| key == k).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_deterministic() {
        let scorer = SiteScorer::default();
        let site = reference_site();
        assert_eq!(scorer.score(&site), scorer.score(&site));
    }

    #[test]
    fn test_zero_score_site_guards_ratios() {
        let site = SiteParameters {
            rainfall_mm: 0.0,
            soil_ph: 0.0,
            avg_temperature_c: -50.0,
            annual_rainfall_variability: 5_000.0,
            soil_organic_carbon_percent: 0.0,
            elevation_meters: 3_000.0,
            soil_moisture_percent: 90.0,
            soil_cec_meq_per_100g: 0.0,
            distance_to_road_km: 100.0,
            basalt_transport_distance_km: 1_000.0,
            basalt_availability_index: 0.0,
            infrastructure_quality_index: 0.0,
            monitoring_capability_index: 0.0,
            agricultural_land_hectares: 0.0,
            population_density_per_km2: 10_000.0,
            energy_cost_per_kwh: 1.0,
            labor_cost_per_hour: 200.0,
            carbon_market_accessibility: 0.0,
            regulatory_stability_index: 0.0,
            ..reference_site()
        };
        let a = SiteScorer::default().score(&site);
        // No land means no basalt and no removal, whatever the score
        assert_eq!(a.carbon_removal_kg_per_year, 0.0);
        assert_eq!(a.carbon_efficiency_ratio, 0.0);
        assert_eq!(a.cost_per_ton_co2_removed, 0.0);
        assert!(a.cost_per_ton_co2_removed.is_finite());
        assert_eq!(a.sustainability_grade, SustainabilityGrade::F);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = ScoringConfig::default();
        config.normalizers.soil_ph_optimum = 0.0;
        assert!(SiteScorer::new(config).is_err());
    }

    #[test]
    fn test_new_rejects_weights_that_overshoot_one() {
        let mut config = ScoringConfig::default();
        config.weights.overall.environmental = 0.40;
        assert!(SiteScorer::new(config).is_err());
    }

    #[test]
    fn test_custom_version_echoed() {
        let mut config = ScoringConfig::default();
        config.version = "4.0-draft".to_string();
        let scorer = SiteScorer::new(config).unwrap();
        assert_eq!(scorer.version(), "4.0-draft");
        assert_eq!(scorer.score(&reference_site()).scoring_version, "4.0-draft");
    }

    #[test]
    fn test_reweighted_config_changes_score() {
        let mut config = ScoringConfig::default();
        config.weights.overall.environmental = 0.10;
        config.weights.overall.logistics = 0.55;
        let baseline = SiteScorer::default().score(&reference_site()).score;
        let reweighted = SiteScorer::new(config).unwrap().score(&reference_site()).score;
        assert!(reweighted < baseline);
    }
}
