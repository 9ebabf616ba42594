//! Cost estimator
//!
//! Yearly material, haulage, labor and equipment costs for the capped project
//! area, plus cost per ton of CO2 removed.

use super::carbon::CarbonImpact;
use crate::config::{CarbonConfig, CostConfig};
use crate::types::SiteParameters;

/// Unrounded yearly costs (USD).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostBreakdown {
    pub basalt_material: f64,
    pub transport: f64,
    pub labor: f64,
    pub equipment: f64,
    pub total: f64,
    /// `total / (removal_kg / 1000)`, or 0 when nothing is removed.
    pub cost_per_ton_co2: f64,
}

/// Estimate yearly costs from the throughput and removal in `impact`.
pub fn estimate(
    params: &SiteParameters,
    impact: &CarbonImpact,
    cost: &CostConfig,
    carbon: &CarbonConfig,
) -> CostBreakdown {
    let tons = impact.basalt_tons_per_year;
    let hectares = impact.project_hectares;
    let distance_km = params.basalt_transport_distance_km;

    let basalt_material = tons * cost.basalt_cost_per_ton;
    let transport = haulage_cost(tons, distance_km, cost, carbon);
    let labor = labor_cost(hectares, params.labor_cost_per_hour, cost);
    let equipment =
        hectares * cost.equipment_cost_per_hectare * (cost.infrastructure_ceiling - params.infrastructure_quality_index);

    let total = basalt_material + transport + labor + equipment;
    let cost_per_ton_co2 = if impact.carbon_removal_kg > 0.0 {
        total / (impact.carbon_removal_kg / 1000.0)
    } else {
        0.0
    };

    CostBreakdown {
        basalt_material,
        transport,
        labor,
        equipment,
        total,
        cost_per_ton_co2,
    }
}

/// Round-trip haulage, with exactly one of the urban premium (short hauls)
/// or the agricultural efficiency factor applied.
fn haulage_cost(tons: f64, distance_km: f64, cost: &CostConfig, carbon: &CarbonConfig) -> f64 {
    let base = tons * distance_km * cost.truck_cost_per_ton_km * carbon.round_trip_factor;
    if distance_km < cost.urban_distance_threshold_km {
        base * cost.urban_logistics_premium
    } else {
        base * cost.agricultural_efficiency_factor
    }
}

/// Formula: max(min_workers, ha / ha_per_crew × workers_per_crew) × rate × hours × days
fn labor_cost(hectares: f64, hourly_rate: f64, cost: &CostConfig) -> f64 {
    let workers = (hectares / cost.hectares_per_crew * cost.workers_per_crew).max(cost.min_workers);
    workers * hourly_rate * cost.hours_per_day * cost.working_days_per_year
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClimateConfig;
    use crate::scoring::carbon;
    use crate::scoring::tests::reference_site;

    fn run(params: &SiteParameters, score: f64) -> CostBreakdown {
        let carbon_cfg = CarbonConfig::default();
        let impact = carbon::estimate(params, score, &carbon_cfg, &ClimateConfig::default());
        estimate(params, &impact, &CostConfig::default(), &carbon_cfg)
    }

    #[test]
    fn test_reference_site_costs() {
        let costs = run(&reference_site(), 0.973);
        assert_eq!(costs.basalt_material, 10_500.0);
        assert!((costs.transport - 6_210.0).abs() < 1e-6, "urban premium applies below 100 km");
        assert_eq!(costs.labor, 200_000.0);
        assert!((costs.equipment - 1_944_000.0).abs() < 1e-6);
        assert!((costs.total - 2_160_710.0).abs() < 1e-6);
        assert!((costs.cost_per_ton_co2 - 10_574.609_7).abs() < 1e-3);
    }

    #[test]
    fn test_rural_factor_from_threshold_up() {
        let mut params = reference_site();
        params.basalt_transport_distance_km = 100.0;
        let costs = run(&params, 0.9);
        // 300 t × 100 km × 0.18 × 2 × 0.92
        assert!((costs.transport - 9_936.0).abs() < 1e-6);
    }

    #[test]
    fn test_labor_floor_of_one_worker() {
        let mut params = reference_site();
        params.agricultural_land_hectares = 2.0;
        params.labor_cost_per_hour = 10.0;
        let costs = run(&params, 0.9);
        // 2 ha → 0.4 workers, floored to 1
        assert_eq!(costs.labor, 10.0 * 8.0 * 250.0);
    }

    #[test]
    fn test_better_infrastructure_lowers_equipment_cost() {
        let mut params = reference_site();
        params.infrastructure_quality_index = 0.0;
        let poor = run(&params, 0.9).equipment;
        params.infrastructure_quality_index = 1.0;
        let good = run(&params, 0.9).equipment;
        assert_eq!(poor, 100.0 * 16_200.0 * 2.0);
        assert_eq!(good, 100.0 * 16_200.0);
    }

    #[test]
    fn test_zero_removal_gives_zero_cost_per_ton() {
        let costs = run(&reference_site(), 0.0);
        assert!(costs.total > 0.0);
        assert_eq!(costs.cost_per_ton_co2, 0.0);
    }
}
