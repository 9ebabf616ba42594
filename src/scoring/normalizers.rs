//! Per-parameter desirability curves
//!
//! Each normalizer maps one raw reading to a desirability sub-score in [0, 1]
//! using a piecewise-linear shape around configured optima and breakpoints.
//! The score levels at the breakpoints (0.3, 0.7, 1.0, ...) are the shape of
//! the curve and live here; where the breakpoints sit lives in
//! [`NormalizerConfig`].
//!
//! [`NORMALIZERS`] is the dispatch table: name, category, curve and weight
//! for every sub-score, in breakdown order.

use crate::config::{ClimateConfig, NormalizerConfig, ScoringConfig, WeightsConfig};
use crate::types::SiteParameters;

// ============================================================================
// Dispatch table
// ============================================================================

/// Scoring category a sub-score contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Environmental,
    Logistics,
    Economic,
    Advanced,
}

impl Category {
    /// All categories in aggregation order.
    pub const ALL: [Self; 4] = [
        Self::Environmental,
        Self::Logistics,
        Self::Economic,
        Self::Advanced,
    ];

    /// Breakdown key.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Environmental => "environmental",
            Self::Logistics => "logistics",
            Self::Economic => "economic",
            Self::Advanced => "advanced",
        }
    }

    /// Weight of this category in the overall score.
    pub fn overall_weight(self, weights: &WeightsConfig) -> f64 {
        match self {
            Self::Environmental => weights.overall.environmental,
            Self::Logistics => weights.overall.logistics,
            Self::Economic => weights.overall.economic,
            Self::Advanced => weights.overall.advanced,
        }
    }
}

/// One row of the dispatch table.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    /// Breakdown key (camelCase, matches the wire field naming).
    pub name: &'static str,
    pub category: Category,
    pub score: fn(&SiteParameters, &ScoringConfig) -> f64,
    pub weight: fn(&WeightsConfig) -> f64,
}

/// Number of sub-scores.
pub const NORMALIZER_COUNT: usize = 20;

/// Every sub-score in breakdown order. Within a category the order is also
/// the summation order of the weighted sum.
pub const NORMALIZERS: [Normalizer; NORMALIZER_COUNT] = [
    // Environmental
    Normalizer {
        name: "soilPh",
        category: Category::Environmental,
        score: |p, c| soil_ph(p.soil_ph, &c.normalizers),
        weight: |w| w.environmental.soil_ph,
    },
    Normalizer {
        name: "temperature",
        category: Category::Environmental,
        score: |p, c| temperature(p.avg_temperature_c, &c.normalizers),
        weight: |w| w.environmental.temperature,
    },
    Normalizer {
        name: "rainfall",
        category: Category::Environmental,
        score: |p, c| rainfall(p.rainfall_mm, &c.normalizers),
        weight: |w| w.environmental.rainfall,
    },
    Normalizer {
        name: "elevation",
        category: Category::Environmental,
        score: |p, c| elevation(p.elevation_meters, &c.normalizers),
        weight: |w| w.environmental.elevation,
    },
    Normalizer {
        name: "soilMoisture",
        category: Category::Environmental,
        score: |p, c| soil_moisture(p.soil_moisture_percent, &c.normalizers),
        weight: |w| w.environmental.soil_moisture,
    },
    Normalizer {
        name: "soilOrganicCarbon",
        category: Category::Environmental,
        score: |p, c| soil_organic_carbon(p.soil_organic_carbon_percent, &c.normalizers),
        weight: |w| w.environmental.soil_organic_carbon,
    },
    Normalizer {
        name: "rainfallVariability",
        category: Category::Environmental,
        score: |p, c| rainfall_variability(p.annual_rainfall_variability, &c.normalizers),
        weight: |w| w.environmental.rainfall_variability,
    },
    // Logistics
    Normalizer {
        name: "roadAccess",
        category: Category::Logistics,
        score: |p, c| road_access(p.distance_to_road_km, &c.normalizers),
        weight: |w| w.logistics.road_access,
    },
    Normalizer {
        name: "transport",
        category: Category::Logistics,
        score: |p, c| transport(p.basalt_transport_distance_km, &c.normalizers),
        weight: |w| w.logistics.transport,
    },
    Normalizer {
        name: "infrastructure",
        category: Category::Logistics,
        score: |p, _| p.infrastructure_quality_index,
        weight: |w| w.logistics.infrastructure,
    },
    Normalizer {
        name: "basaltAvailability",
        category: Category::Logistics,
        score: |p, _| p.basalt_availability_index,
        weight: |w| w.logistics.basalt_availability,
    },
    // Economic
    Normalizer {
        name: "agriculturalLand",
        category: Category::Economic,
        score: |p, c| agricultural_land(p.agricultural_land_hectares, &c.normalizers),
        weight: |w| w.economic.agricultural_land,
    },
    Normalizer {
        name: "populationDensity",
        category: Category::Economic,
        score: |p, c| population_density(p.population_density_per_km2, &c.normalizers),
        weight: |w| w.economic.population_density,
    },
    Normalizer {
        name: "energyCost",
        category: Category::Economic,
        score: |p, c| energy_cost(p.energy_cost_per_kwh, &c.normalizers),
        weight: |w| w.economic.energy_cost,
    },
    Normalizer {
        name: "laborCost",
        category: Category::Economic,
        score: |p, c| labor_cost(p.labor_cost_per_hour, &c.normalizers),
        weight: |w| w.economic.labor_cost,
    },
    Normalizer {
        name: "carbonMarket",
        category: Category::Economic,
        score: |p, _| p.carbon_market_accessibility,
        weight: |w| w.economic.carbon_market,
    },
    // Advanced
    Normalizer {
        name: "regulatoryStability",
        category: Category::Advanced,
        score: |p, _| p.regulatory_stability_index,
        weight: |w| w.advanced.regulatory_stability,
    },
    Normalizer {
        name: "monitoringCapability",
        category: Category::Advanced,
        score: |p, _| p.monitoring_capability_index,
        weight: |w| w.advanced.monitoring_capability,
    },
    Normalizer {
        name: "soilCec",
        category: Category::Advanced,
        score: |p, c| soil_cec(p.soil_cec_meq_per_100g, &c.normalizers),
        weight: |w| w.advanced.soil_cec,
    },
    Normalizer {
        name: "climateBonus",
        category: Category::Advanced,
        score: |p, c| climate_bonus(p.avg_temperature_c, p.rainfall_mm, &c.climate),
        weight: |w| w.advanced.climate_bonus,
    },
];

/// Evaluate every normalizer against `params`, in table order.
pub fn evaluate(params: &SiteParameters, config: &ScoringConfig) -> [f64; NORMALIZER_COUNT] {
    NORMALIZERS.map(|n| (n.score)(params, config))
}

// ============================================================================
// Shared helpers
// ============================================================================

/// `start + (x - from) / (to - from) * delta`: linear segment anchored at `from`.
#[inline]
fn ramp(x: f64, from: f64, to: f64, start: f64, delta: f64) -> f64 {
    start + (x - from) / (to - from) * delta
}

/// Tropical climate: warm AND wet, both bounds inclusive.
pub fn is_tropical(temperature_c: f64, rainfall_mm: f64, climate: &ClimateConfig) -> bool {
    temperature_c >= climate.tropical_min_temperature_c && rainfall_mm >= climate.tropical_min_rainfall_mm
}

// ============================================================================
// Environmental
// ============================================================================

/// Formula: max(0, 1 - |pH - optimum| / optimum)
pub fn soil_ph(ph: f64, n: &NormalizerConfig) -> f64 {
    debug_assert!(n.soil_ph_optimum > 0.0, "soil_ph_optimum must be > 0");
    (1.0 - (ph - n.soil_ph_optimum).abs() / n.soil_ph_optimum).max(0.0)
}

/// Formula: max(0, 1 - |T - optimum| / tolerance)
pub fn temperature(temp_c: f64, n: &NormalizerConfig) -> f64 {
    (1.0 - (temp_c - n.temperature_optimum_c).abs() / n.temperature_tolerance_c).max(0.0)
}

/// Five segments: 0→0.3 below `low`, 0.3→0.7 up to `moderate`, 0.7→1.0 up to
/// `optimum`, 1.0→0.8 up to `high`, then a slow decline floored at 0.5.
///
/// Each ramp interpolates over its own span, so the curve peaks at exactly
/// 1.0 at the optimum.
pub fn rainfall(mm: f64, n: &NormalizerConfig) -> f64 {
    if mm < n.rainfall_low_mm {
        return mm / n.rainfall_low_mm * 0.3;
    }
    if mm < n.rainfall_moderate_mm {
        return ramp(mm, n.rainfall_low_mm, n.rainfall_moderate_mm, 0.3, 0.4);
    }
    if mm <= n.rainfall_optimum_mm {
        return ramp(mm, n.rainfall_moderate_mm, n.rainfall_optimum_mm, 0.7, 0.3);
    }
    if mm <= n.rainfall_high_mm {
        return ramp(mm, n.rainfall_optimum_mm, n.rainfall_high_mm, 1.0, -0.2);
    }
    (1.0 - (mm - n.rainfall_high_mm) / n.rainfall_excess_span_mm * 0.5).max(0.5)
}

/// Formula: max(0.2, 1 - |e - optimum| / tolerance)
pub fn elevation(meters: f64, n: &NormalizerConfig) -> f64 {
    (1.0 - (meters - n.elevation_optimum_m).abs() / n.elevation_tolerance_m).max(0.2)
}

/// Formula: max(0.1, 1 - |m - optimum| / tolerance)
pub fn soil_moisture(percent: f64, n: &NormalizerConfig) -> f64 {
    (1.0 - (percent - n.soil_moisture_optimum_percent).abs() / n.soil_moisture_tolerance_percent).max(0.1)
}

/// Formula: min(1, soc / optimum)
pub fn soil_organic_carbon(percent: f64, n: &NormalizerConfig) -> f64 {
    (percent / n.soc_optimum_percent).min(1.0)
}

/// Formula: max(0.3, 1 - v / tolerance)
pub fn rainfall_variability(variability: f64, n: &NormalizerConfig) -> f64 {
    (1.0 - variability / n.rainfall_variability_tolerance).max(0.3)
}

// ============================================================================
// Logistics
// ============================================================================

/// Formula: max(0, 1 - d / max_distance)
pub fn road_access(km: f64, n: &NormalizerConfig) -> f64 {
    (1.0 - km / n.road_max_distance_km).max(0.0)
}

/// 1.0 up to `optimal`, 0.8→0.5 up to `good`, 0.5→0.1 up to `max_viable`
/// (floored at 0.1 so it meets the tail exactly), then a flat 0.1. The step
/// down at `optimal` is part of the curve.
pub fn transport(km: f64, n: &NormalizerConfig) -> f64 {
    if km <= n.transport_optimal_km {
        return 1.0;
    }
    if km <= n.transport_good_km {
        return ramp(km, n.transport_optimal_km, n.transport_good_km, 0.8, -0.3);
    }
    if km <= n.transport_max_viable_km {
        return ramp(km, n.transport_good_km, n.transport_max_viable_km, 0.5, -0.4).max(0.1);
    }
    0.1
}

// ============================================================================
// Economic
// ============================================================================

/// 0→0.3 below `small`, 0.3→0.8 below `pilot`, 0.8→1.0 up to `full`, then 1.0.
pub fn agricultural_land(hectares: f64, n: &NormalizerConfig) -> f64 {
    if hectares < n.land_small_ha {
        return hectares / n.land_small_ha * 0.3;
    }
    if hectares < n.land_pilot_ha {
        return ramp(hectares, n.land_small_ha, n.land_pilot_ha, 0.3, 0.5);
    }
    if hectares <= n.land_full_ha {
        return ramp(hectares, n.land_pilot_ha, n.land_full_ha, 0.8, 0.2);
    }
    1.0
}

/// 1.0 below `low`, 1.0→0.7 below `medium`, 0.7→0.3 below `high`, then
/// declining over `excess_span` and floored at 0.1.
pub fn population_density(per_km2: f64, n: &NormalizerConfig) -> f64 {
    if per_km2 < n.population_low_per_km2 {
        return 1.0;
    }
    if per_km2 < n.population_medium_per_km2 {
        return ramp(per_km2, n.population_low_per_km2, n.population_medium_per_km2, 1.0, -0.3);
    }
    if per_km2 < n.population_high_per_km2 {
        return ramp(per_km2, n.population_medium_per_km2, n.population_high_per_km2, 0.7, -0.4);
    }
    (0.3 - (per_km2 - n.population_high_per_km2) / n.population_excess_span_per_km2 * 0.2).max(0.1)
}

/// Shared cost curve for energy and labor: 1.0 up to `cheap`, 1.0→0.7 up to
/// `moderate`, 0.7→0.3 up to `expensive`, then declining over one more
/// `expensive` span and floored at 0.1.
fn cost_curve(cost: f64, cheap: f64, moderate: f64, expensive: f64) -> f64 {
    if cost <= cheap {
        return 1.0;
    }
    if cost <= moderate {
        return ramp(cost, cheap, moderate, 1.0, -0.3);
    }
    if cost <= expensive {
        return ramp(cost, moderate, expensive, 0.7, -0.4);
    }
    (0.3 - (cost - expensive) / expensive * 0.2).max(0.1)
}

pub fn energy_cost(per_kwh: f64, n: &NormalizerConfig) -> f64 {
    cost_curve(
        per_kwh,
        n.energy_cheap_per_kwh,
        n.energy_moderate_per_kwh,
        n.energy_expensive_per_kwh,
    )
}

pub fn labor_cost(per_hour: f64, n: &NormalizerConfig) -> f64 {
    cost_curve(
        per_hour,
        n.labor_cheap_per_hour,
        n.labor_moderate_per_hour,
        n.labor_expensive_per_hour,
    )
}

// ============================================================================
// Advanced
// ============================================================================

/// Formula: min(1, cec / reference)
pub fn soil_cec(meq_per_100g: f64, n: &NormalizerConfig) -> f64 {
    (meq_per_100g / n.cec_reference_meq).min(1.0)
}

pub fn climate_bonus(temperature_c: f64, rainfall_mm: f64, climate: &ClimateConfig) -> f64 {
    if is_tropical(temperature_c, rainfall_mm, climate) {
        climate.tropical_bonus
    } else {
        climate.temperate_bonus
    }
}

// ============================================================================
// Tests
// ============================================================================
