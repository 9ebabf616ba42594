//! Scoring Configuration - every constant of the site-scoring formula
//!
//! The formula is versioned: optima, breakpoints, weights, carbon and cost
//! rates, and the grade table all live here instead of in the scoring code.
//! `Default` reproduces the v3.0 constants exactly, so an empty `[scoring]`
//! section (or no config file at all) scores identically to the reference
//! implementation.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::defaults::SCORING_VERSION;
use super::ConfigError;
use crate::types::SustainabilityGrade;

// ============================================================================
// Top-Level Scoring Config
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Formula version, echoed in every assessment.
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub normalizers: NormalizerConfig,

    #[serde(default)]
    pub weights: WeightsConfig,

    #[serde(default)]
    pub climate: ClimateConfig,

    #[serde(default)]
    pub carbon: CarbonConfig,

    #[serde(default)]
    pub cost: CostConfig,

    /// Ordered grade table, evaluated top-down, first match wins.
    #[serde(default = "default_grades")]
    pub grades: Vec<GradeRule>,
}

fn default_version() -> String {
    SCORING_VERSION.to_string()
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            normalizers: NormalizerConfig::default(),
            weights: WeightsConfig::default(),
            climate: ClimateConfig::default(),
            carbon: CarbonConfig::default(),
            cost: CostConfig::default(),
            grades: default_grades(),
        }
    }
}

// ============================================================================
// Normalizer optima and breakpoints
// ============================================================================

/// Optimum constants and segment breakpoints for the per-parameter
/// desirability curves. Score levels at the breakpoints are part of the
/// curve shape and stay in `scoring::normalizers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    pub soil_ph_optimum: f64,

    pub temperature_optimum_c: f64,
    pub temperature_tolerance_c: f64,

    pub rainfall_low_mm: f64,
    pub rainfall_moderate_mm: f64,
    pub rainfall_optimum_mm: f64,
    pub rainfall_high_mm: f64,
    pub rainfall_excess_span_mm: f64,

    pub road_max_distance_km: f64,

    pub transport_optimal_km: f64,
    pub transport_good_km: f64,
    pub transport_max_viable_km: f64,

    pub land_small_ha: f64,
    pub land_pilot_ha: f64,
    pub land_full_ha: f64,

    pub population_low_per_km2: f64,
    pub population_medium_per_km2: f64,
    pub population_high_per_km2: f64,
    pub population_excess_span_per_km2: f64,

    pub energy_cheap_per_kwh: f64,
    pub energy_moderate_per_kwh: f64,
    pub energy_expensive_per_kwh: f64,

    pub labor_cheap_per_hour: f64,
    pub labor_moderate_per_hour: f64,
    pub labor_expensive_per_hour: f64,

    pub elevation_optimum_m: f64,
    pub elevation_tolerance_m: f64,

    pub soil_moisture_optimum_percent: f64,
    pub soil_moisture_tolerance_percent: f64,

    pub soc_optimum_percent: f64,

    pub rainfall_variability_tolerance: f64,

    pub cec_reference_meq: f64,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            soil_ph_optimum: 7.0,
            temperature_optimum_c: 28.0,
            temperature_tolerance_c: 30.0,
            rainfall_low_mm: 400.0,
            rainfall_moderate_mm: 800.0,
            rainfall_optimum_mm: 1500.0,
            rainfall_high_mm: 2000.0,
            rainfall_excess_span_mm: 2000.0,
            road_max_distance_km: 50.0,
            transport_optimal_km: 100.0,
            transport_good_km: 300.0,
            transport_max_viable_km: 540.0,
            land_small_ha: 10.0,
            land_pilot_ha: 100.0,
            land_full_ha: 1000.0,
            population_low_per_km2: 50.0,
            population_medium_per_km2: 200.0,
            population_high_per_km2: 500.0,
            population_excess_span_per_km2: 1000.0,
            energy_cheap_per_kwh: 0.05,
            energy_moderate_per_kwh: 0.15,
            energy_expensive_per_kwh: 0.30,
            labor_cheap_per_hour: 5.0,
            labor_moderate_per_hour: 15.0,
            labor_expensive_per_hour: 30.0,
            elevation_optimum_m: 500.0,
            elevation_tolerance_m: 2000.0,
            soil_moisture_optimum_percent: 40.0,
            soil_moisture_tolerance_percent: 50.0,
            soc_optimum_percent: 3.0,
            rainfall_variability_tolerance: 2000.0,
            cec_reference_meq: 25.0,
        }
    }
}

// ============================================================================
// Weights
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentalWeights {
    pub soil_ph: f64,
    pub temperature: f64,
    pub rainfall: f64,
    pub elevation: f64,
    pub soil_moisture: f64,
    pub soil_organic_carbon: f64,
    pub rainfall_variability: f64,
}

impl Default for EnvironmentalWeights {
    fn default() -> Self {
        Self {
            soil_ph: 0.20,
            temperature: 0.20,
            rainfall: 0.15,
            elevation: 0.15,
            soil_moisture: 0.15,
            soil_organic_carbon: 0.10,
            rainfall_variability: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticsWeights {
    pub road_access: f64,
    pub transport: f64,
    pub infrastructure: f64,
    pub basalt_availability: f64,
}

impl Default for LogisticsWeights {
    fn default() -> Self {
        Self {
            road_access: 0.25,
            transport: 0.35,
            infrastructure: 0.20,
            basalt_availability: 0.20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomicWeights {
    pub agricultural_land: f64,
    pub population_density: f64,
    pub energy_cost: f64,
    pub labor_cost: f64,
    pub carbon_market: f64,
}

impl Default for EconomicWeights {
    fn default() -> Self {
        Self {
            agricultural_land: 0.30,
            population_density: 0.15,
            energy_cost: 0.20,
            labor_cost: 0.20,
            carbon_market: 0.15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedWeights {
    pub regulatory_stability: f64,
    pub monitoring_capability: f64,
    pub soil_cec: f64,
    pub climate_bonus: f64,
}

impl Default for AdvancedWeights {
    fn default() -> Self {
        Self {
            regulatory_stability: 0.30,
            monitoring_capability: 0.30,
            soil_cec: 0.20,
            climate_bonus: 0.20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverallWeights {
    pub environmental: f64,
    pub logistics: f64,
    pub economic: f64,
    pub advanced: f64,
}

impl Default for OverallWeights {
    fn default() -> Self {
        Self {
            environmental: 0.35,
            logistics: 0.30,
            economic: 0.25,
            advanced: 0.10,
        }
    }
}

/// Allowed drift of a weight group's sum from 1.0.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Category and overall weights. Each group must sum to 1.0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightsConfig {
    pub environmental: EnvironmentalWeights,
    pub logistics: LogisticsWeights,
    pub economic: EconomicWeights,
    pub advanced: AdvancedWeights,
    pub overall: OverallWeights,
}

impl WeightsConfig {
    /// `(group name, sum of weights)` for every weight group.
    pub fn group_sums(&self) -> [(&'static str, f64); 5] {
        let e = &self.environmental;
        let l = &self.logistics;
        let c = &self.economic;
        let a = &self.advanced;
        let o = &self.overall;
        [
            (
                "environmental",
                e.soil_ph
                    + e.temperature
                    + e.rainfall
                    + e.elevation
                    + e.soil_moisture
                    + e.soil_organic_carbon
                    + e.rainfall_variability,
            ),
            (
                "logistics",
                l.road_access + l.transport + l.infrastructure + l.basalt_availability,
            ),
            (
                "economic",
                c.agricultural_land + c.population_density + c.energy_cost + c.labor_cost + c.carbon_market,
            ),
            (
                "advanced",
                a.regulatory_stability + a.monitoring_capability + a.soil_cec + a.climate_bonus,
            ),
            ("overall", o.environmental + o.logistics + o.economic + o.advanced),
        ]
    }
}

// ============================================================================
// Climate
// ============================================================================

/// Tropical predicate: `temperature >= min_temperature && rainfall >= min_rainfall`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimateConfig {
    pub tropical_min_temperature_c: f64,
    pub tropical_min_rainfall_mm: f64,
    /// Climate-bonus sub-score for tropical sites.
    pub tropical_bonus: f64,
    /// Climate-bonus sub-score for everything else.
    pub temperate_bonus: f64,
}

impl Default for ClimateConfig {
    fn default() -> Self {
        Self {
            tropical_min_temperature_c: 24.0,
            tropical_min_rainfall_mm: 1200.0,
            tropical_bonus: 1.0,
            temperate_bonus: 0.6,
        }
    }
}

// ============================================================================
// Carbon
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarbonConfig {
    /// Project capacity cap regardless of available land (ha).
    pub pilot_project_hectares: f64,
    /// Basalt application rate (t/ha/yr).
    pub basalt_tons_per_hectare: f64,
    /// Truck emissions (kg CO2 per ton-km).
    pub truck_emissions_kg_per_ton_km: f64,
    /// Round-trip multiplier applied to haulage emissions and cost.
    pub round_trip_factor: f64,
    /// CO2 removal per ton of basalt in tropical climates (kg).
    pub tropical_removal_kg_per_ton: f64,
    /// CO2 removal per ton of basalt elsewhere (kg).
    pub base_removal_kg_per_ton: f64,
}

impl Default for CarbonConfig {
    fn default() -> Self {
        Self {
            pilot_project_hectares: 100.0,
            basalt_tons_per_hectare: 3.0,
            truck_emissions_kg_per_ton_km: 0.27,
            round_trip_factor: 2.0,
            tropical_removal_kg_per_ton: 700.0,
            base_removal_kg_per_ton: 333.0,
        }
    }
}

// ============================================================================
// Cost
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostConfig {
    /// Raw basalt including grinding (USD/t).
    pub basalt_cost_per_ton: f64,
    /// Haulage (USD per ton-km).
    pub truck_cost_per_ton_km: f64,
    /// Hauls shorter than this are priced as urban logistics (km).
    pub urban_distance_threshold_km: f64,
    pub urban_logistics_premium: f64,
    pub agricultural_efficiency_factor: f64,
    pub hectares_per_crew: f64,
    pub workers_per_crew: f64,
    pub min_workers: f64,
    pub hours_per_day: f64,
    pub working_days_per_year: f64,
    /// Grinding/application equipment (USD/ha/yr).
    pub equipment_cost_per_hectare: f64,
    /// Equipment multiplier is `ceiling - infrastructure_quality_index`.
    pub infrastructure_ceiling: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            basalt_cost_per_ton: 35.0,
            truck_cost_per_ton_km: 0.18,
            urban_distance_threshold_km: 100.0,
            urban_logistics_premium: 1.15,
            agricultural_efficiency_factor: 0.92,
            hectares_per_crew: 10.0,
            workers_per_crew: 2.0,
            min_workers: 1.0,
            hours_per_day: 8.0,
            working_days_per_year: 250.0,
            equipment_cost_per_hectare: 16_200.0,
            infrastructure_ceiling: 2.0,
        }
    }
}

// ============================================================================
// Grade table
// ============================================================================

/// One row of the sustainability decision table. Matches when
/// `score >= min_score && efficiency >= min_efficiency && cost <= max_cost_per_ton`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeRule {
    pub grade: SustainabilityGrade,
    pub min_score: f64,
    pub min_efficiency: f64,
    pub max_cost_per_ton: f64,
}

impl GradeRule {
    const fn new(grade: SustainabilityGrade, min_score: f64, min_efficiency: f64, max_cost_per_ton: f64) -> Self {
        Self {
            grade,
            min_score,
            min_efficiency,
            max_cost_per_ton,
        }
    }
}

fn default_grades() -> Vec<GradeRule> {
    use SustainabilityGrade::{APlus, BPlus, CPlus, A, B, C, D};
    vec![
        GradeRule::new(APlus, 0.8, 0.9, 120.0),
        GradeRule::new(A, 0.7, 0.8, 150.0),
        GradeRule::new(BPlus, 0.6, 0.7, 180.0),
        GradeRule::new(B, 0.5, 0.6, 220.0),
        GradeRule::new(CPlus, 0.4, 0.5, 280.0),
        GradeRule::new(C, 0.3, 0.4, 350.0),
        GradeRule::new(D, 0.2, 0.3, 500.0),
    ]
}

// ============================================================================
// Validation
// ============================================================================

impl ScoringConfig {
    /// Validate the formula constants for internal consistency.
    ///
    /// Rules:
    /// - `soil_ph_optimum` must be > 0 (it is the pH-curve divisor)
    /// - every divisor, span and tolerance must be > 0
    /// - breakpoints within a curve must be strictly increasing
    /// - every weight group must sum to 1.0 (within `WEIGHT_SUM_TOLERANCE`)
    /// - the grade table must be non-empty with score/efficiency in [0, 1]
    /// - all values must be finite
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();
        let n = &self.normalizers;

        if self.version.trim().is_empty() {
            errors.push("scoring.version must not be empty".to_string());
        }

        if !(n.soil_ph_optimum > 0.0) {
            errors.push(format!(
                "scoring.normalizers.soil_ph_optimum ({}) must be > 0",
                n.soil_ph_optimum
            ));
        }

        let positives = [
            ("normalizers.temperature_tolerance_c", n.temperature_tolerance_c),
            ("normalizers.rainfall_low_mm", n.rainfall_low_mm),
            ("normalizers.rainfall_excess_span_mm", n.rainfall_excess_span_mm),
            ("normalizers.road_max_distance_km", n.road_max_distance_km),
            ("normalizers.land_small_ha", n.land_small_ha),
            ("normalizers.population_excess_span_per_km2", n.population_excess_span_per_km2),
            ("normalizers.elevation_tolerance_m", n.elevation_tolerance_m),
            ("normalizers.soil_moisture_tolerance_percent", n.soil_moisture_tolerance_percent),
            ("normalizers.soc_optimum_percent", n.soc_optimum_percent),
            ("normalizers.rainfall_variability_tolerance", n.rainfall_variability_tolerance),
            ("normalizers.cec_reference_meq", n.cec_reference_meq),
            ("carbon.pilot_project_hectares", self.carbon.pilot_project_hectares),
            ("carbon.basalt_tons_per_hectare", self.carbon.basalt_tons_per_hectare),
            ("cost.hectares_per_crew", self.cost.hectares_per_crew),
        ];
        for (name, value) in positives {
            if !(value > 0.0) {
                errors.push(format!("scoring.{name} ({value}) must be > 0"));
            }
        }

        let ladders: [(&str, &[f64]); 6] = [
            (
                "rainfall",
                &[n.rainfall_low_mm, n.rainfall_moderate_mm, n.rainfall_optimum_mm, n.rainfall_high_mm],
            ),
            (
                "transport",
                &[n.transport_optimal_km, n.transport_good_km, n.transport_max_viable_km],
            ),
            ("land", &[n.land_small_ha, n.land_pilot_ha, n.land_full_ha]),
            (
                "population",
                &[n.population_low_per_km2, n.population_medium_per_km2, n.population_high_per_km2],
            ),
            (
                "energy",
                &[n.energy_cheap_per_kwh, n.energy_moderate_per_kwh, n.energy_expensive_per_kwh],
            ),
            (
                "labor",
                &[n.labor_cheap_per_hour, n.labor_moderate_per_hour, n.labor_expensive_per_hour],
            ),
        ];
        for (name, steps) in ladders {
            if steps.windows(2).any(|w| !(w[0] < w[1])) {
                errors.push(format!(
                    "scoring.normalizers: {name} breakpoints must be strictly increasing, got {steps:?}"
                ));
            }
        }

        for (group, sum) in self.weights.group_sums() {
            if !((sum - 1.0).abs() <= WEIGHT_SUM_TOLERANCE) {
                errors.push(format!("scoring.weights.{group} must sum to 1.0, got {sum}"));
            }
        }

        if self.grades.is_empty() {
            errors.push("scoring.grades must contain at least one rule".to_string());
        }
        for (i, rule) in self.grades.iter().enumerate() {
            if !(0.0..=1.0).contains(&rule.min_score) || !(0.0..=1.0).contains(&rule.min_efficiency) {
                errors.push(format!(
                    "scoring.grades[{i}] ({}): min_score and min_efficiency must be within [0, 1]",
                    rule.grade
                ));
            }
            if !(rule.max_cost_per_ton > 0.0) {
                errors.push(format!(
                    "scoring.grades[{i}] ({}): max_cost_per_ton must be > 0",
                    rule.grade
                ));
            }
        }
        for pair in self.grades.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.min_score > prev.min_score
                || next.min_efficiency > prev.min_efficiency
                || next.max_cost_per_ton < prev.max_cost_per_ton
            {
                warn!(
                    stricter = %next.grade,
                    looser = %prev.grade,
                    "Grade rule is stricter than the rule above it and can be shadowed"
                );
            }
        }

        // NaN/Inf comparisons silently pass the checks above, sweep every float explicitly
        if let Ok(value) = toml::Value::try_from(self) {
            for key in non_finite_keys(&value, "scoring") {
                errors.push(format!("{key} must be a finite number"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Dotted paths of every float in `value` that is NaN or infinite.
fn non_finite_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    match value {
        toml::Value::Float(f) if !f.is_finite() => vec![prefix.to_string()],
        toml::Value::Table(table) => table
            .iter()
            .flat_map(|(k, v)| non_finite_keys(v, &format!("{prefix}.{k}")))
            .collect(),
        toml::Value::Array(items) => items
            .iter()
            .enumerate()
            .flat_map(|(i, v)| non_finite_keys(v, &format!("{prefix}[{i}]")))
            .collect(),
        _ => Vec::new(),
    }
}
