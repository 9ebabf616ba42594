//! Config validation: unknown-key detection with Levenshtein suggestions
//! and scoring range checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for ServiceConfig.
///
/// Maintained by hand to match the struct hierarchy in `service_config.rs`
/// and `scoring_config.rs`. Any new field must be added here too.
/// Entries of the `[[scoring.grades]]` array are arrays, not tables, and are
/// not walked.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [server]
        "server",
        "server.addr",
        // [storage]
        "storage",
        "storage.backend",
        "storage.data_dir",
        // [scoring]
        "scoring",
        "scoring.version",
        "scoring.grades",
        // [scoring.normalizers]
        "scoring.normalizers",
        "scoring.normalizers.soil_ph_optimum",
        "scoring.normalizers.temperature_optimum_c",
        "scoring.normalizers.temperature_tolerance_c",
        "scoring.normalizers.rainfall_low_mm",
        "scoring.normalizers.rainfall_moderate_mm",
        "scoring.normalizers.rainfall_optimum_mm",
        "scoring.normalizers.rainfall_high_mm",
        "scoring.normalizers.rainfall_excess_span_mm",
        "scoring.normalizers.road_max_distance_km",
        "scoring.normalizers.transport_optimal_km",
        "scoring.normalizers.transport_good_km",
        "scoring.normalizers.transport_max_viable_km",
        "scoring.normalizers.land_small_ha",
        "scoring.normalizers.land_pilot_ha",
        "scoring.normalizers.land_full_ha",
        "scoring.normalizers.population_low_per_km2",
        "scoring.normalizers.population_medium_per_km2",
        "scoring.normalizers.population_high_per_km2",
        "scoring.normalizers.population_excess_span_per_km2",
        "scoring.normalizers.energy_cheap_per_kwh",
        "scoring.normalizers.energy_moderate_per_kwh",
        "scoring.normalizers.energy_expensive_per_kwh",
        "scoring.normalizers.labor_cheap_per_hour",
        "scoring.normalizers.labor_moderate_per_hour",
        "scoring.normalizers.labor_expensive_per_hour",
        "scoring.normalizers.elevation_optimum_m",
        "scoring.normalizers.elevation_tolerance_m",
        "scoring.normalizers.soil_moisture_optimum_percent",
        "scoring.normalizers.soil_moisture_tolerance_percent",
        "scoring.normalizers.soc_optimum_percent",
        "scoring.normalizers.rainfall_variability_tolerance",
        "scoring.normalizers.cec_reference_meq",
        // [scoring.weights]
        "scoring.weights",
        "scoring.weights.environmental",
        "scoring.weights.environmental.soil_ph",
        "scoring.weights.environmental.temperature",
        "scoring.weights.environmental.rainfall",
        "scoring.weights.environmental.elevation",
        "scoring.weights.environmental.soil_moisture",
        "scoring.weights.environmental.soil_organic_carbon",
        "scoring.weights.environmental.rainfall_variability",
        "scoring.weights.logistics",
        "scoring.weights.logistics.road_access",
        "scoring.weights.logistics.transport",
        "scoring.weights.logistics.infrastructure",
        "scoring.weights.logistics.basalt_availability",
        "scoring.weights.economic",
        "scoring.weights.economic.agricultural_land",
        "scoring.weights.economic.population_density",
        "scoring.weights.economic.energy_cost",
        "scoring.weights.economic.labor_cost",
        "scoring.weights.economic.carbon_market",
        "scoring.weights.advanced",
        "scoring.weights.advanced.regulatory_stability",
        "scoring.weights.advanced.monitoring_capability",
        "scoring.weights.advanced.soil_cec",
        "scoring.weights.advanced.climate_bonus",
        "scoring.weights.overall",
        "scoring.weights.overall.environmental",
        "scoring.weights.overall.logistics",
        "scoring.weights.overall.economic",
        "scoring.weights.overall.advanced",
        // [scoring.climate]
        "scoring.climate",
        "scoring.climate.tropical_min_temperature_c",
        "scoring.climate.tropical_min_rainfall_mm",
        "scoring.climate.tropical_bonus",
        "scoring.climate.temperate_bonus",
        // [scoring.carbon]
        "scoring.carbon",
        "scoring.carbon.pilot_project_hectares",
        "scoring.carbon.basalt_tons_per_hectare",
        "scoring.carbon.truck_emissions_kg_per_ton_km",
        "scoring.carbon.round_trip_factor",
        "scoring.carbon.tropical_removal_kg_per_ton",
        "scoring.carbon.base_removal_kg_per_ton",
        // [scoring.cost]
        "scoring.cost",
        "scoring.cost.basalt_cost_per_ton",
        "scoring.cost.truck_cost_per_ton_km",
        "scoring.cost.urban_distance_threshold_km",
        "scoring.cost.urban_logistics_premium",
        "scoring.cost.agricultural_efficiency_factor",
        "scoring.cost.hectares_per_crew",
        "scoring.cost.workers_per_crew",
        "scoring.cost.min_workers",
        "scoring.cost.hours_per_day",
        "scoring.cost.working_days_per_year",
        "scoring.cost.equipment_cost_per_hectare",
        "scoring.cost.infrastructure_ceiling",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let a_len = a.len();
    let b_len = b.len();
    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.chars().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1)
                .min(curr[j] + 1)
                .min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;
    for &k in known {
        let dist = levenshtein(unknown, k);
        if dist <= 3 {
            if let Some((_, best_dist)) = best {
                if dist < best_dist {
                    best = Some((k, dist));
                }
            } else {
                best = Some((k, dist));
            }
        }
    }
    best.map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// This does NOT fail on unknown keys; it only warns. Existing configs
/// always continue to work.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are handled by serde later
    };

    let known = known_config_keys();
    let found = walk_toml_keys(&value, "");
    let mut warnings = Vec::new();

    for key in &found {
        if !known.contains(key.as_str()) {
            let suggestion = suggest_correction(key, &known);
            let message = format!("Unknown config key '{key}'");
            warnings.push(ValidationWarning {
                field: key.clone(),
                message,
                suggestion,
            });
        }
    }

    warnings
}

// ============================================================================
// Scoring Range Validation
// ============================================================================

/// Validate plausible ranges on a parsed ScoringConfig.
///
/// Returns (errors, warnings). Errors are values no site could be scored
/// against; warnings are legal but unusual.
pub fn validate_scoring_ranges(
    config: &super::ScoringConfig,
) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let n = &config.normalizers;

    // pH optimum is a divisor and must sit on the 0-14 scale
    if n.soil_ph_optimum > 14.0 {
        errors.push(format!(
            "normalizers.soil_ph_optimum = {:.1} is outside the pH scale (0-14)",
            n.soil_ph_optimum
        ));
    }

    // Rates and prices cannot be negative
    let non_negative = [
        ("carbon.truck_emissions_kg_per_ton_km", config.carbon.truck_emissions_kg_per_ton_km),
        ("carbon.round_trip_factor", config.carbon.round_trip_factor),
        ("carbon.tropical_removal_kg_per_ton", config.carbon.tropical_removal_kg_per_ton),
        ("carbon.base_removal_kg_per_ton", config.carbon.base_removal_kg_per_ton),
        ("cost.basalt_cost_per_ton", config.cost.basalt_cost_per_ton),
        ("cost.truck_cost_per_ton_km", config.cost.truck_cost_per_ton_km),
        ("cost.urban_logistics_premium", config.cost.urban_logistics_premium),
        ("cost.agricultural_efficiency_factor", config.cost.agricultural_efficiency_factor),
        ("cost.workers_per_crew", config.cost.workers_per_crew),
        ("cost.min_workers", config.cost.min_workers),
        ("cost.hours_per_day", config.cost.hours_per_day),
        ("cost.working_days_per_year", config.cost.working_days_per_year),
        ("cost.equipment_cost_per_hectare", config.cost.equipment_cost_per_hectare),
    ];
    for (name, value) in non_negative {
        if value < 0.0 {
            errors.push(format!("{name} = {value} cannot be negative"));
        }
    }

    if config.cost.hours_per_day > 24.0 {
        errors.push(format!(
            "cost.hours_per_day = {:.1} exceeds 24 hours",
            config.cost.hours_per_day
        ));
    }
    if config.cost.working_days_per_year > 366.0 {
        errors.push(format!(
            "cost.working_days_per_year = {:.0} exceeds one year",
            config.cost.working_days_per_year
        ));
    }

    // Climate bonuses are sub-scores and must stay in [0, 1]
    for (name, value) in [
        ("climate.tropical_bonus", config.climate.tropical_bonus),
        ("climate.temperate_bonus", config.climate.temperate_bonus),
    ] {
        if !(0.0..=1.0).contains(&value) {
            errors.push(format!("{name} = {value} must be within [0, 1]"));
        }
    }

    // Equipment multiplier goes non-positive for well-equipped sites
    if config.cost.infrastructure_ceiling < 1.0 {
        warnings.push(ValidationWarning {
            field: "scoring.cost.infrastructure_ceiling".to_string(),
            message: format!(
                "infrastructure_ceiling = {:.2} is below 1.0, equipment cost reaches zero before infrastructure index 1.0",
                config.cost.infrastructure_ceiling
            ),
            suggestion: None,
        });
    }

    // Tropical sites normally weather faster than the rest
    if config.carbon.tropical_removal_kg_per_ton < config.carbon.base_removal_kg_per_ton {
        warnings.push(ValidationWarning {
            field: "scoring.carbon.tropical_removal_kg_per_ton".to_string(),
            message: format!(
                "tropical_removal_kg_per_ton = {:.0} is below base_removal_kg_per_ton = {:.0}",
                config.carbon.tropical_removal_kg_per_ton, config.carbon.base_removal_kg_per_ton
            ),
            suggestion: None,
        });
    }

    // Temperature optimum outside any agricultural climate
    if !(-10.0..=45.0).contains(&n.temperature_optimum_c) {
        warnings.push(ValidationWarning {
            field: "scoring.normalizers.temperature_optimum_c".to_string(),
            message: format!(
                "temperature_optimum_c = {:.1} is outside typical range (-10 to 45 C)",
                n.temperature_optimum_c
            ),
            suggestion: None,
        });
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================
