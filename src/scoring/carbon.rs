//! Carbon impact estimator
//!
//! Yearly basalt throughput for the capped project area, haulage emissions,
//! climate-dependent removal and the resulting efficiency ratio.

use super::normalizers::is_tropical;
use crate::config::{CarbonConfig, ClimateConfig};
use crate::types::SiteParameters;

/// Unrounded carbon figures for one site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarbonImpact {
    /// `min(agricultural land, pilot cap)` in hectares.
    pub project_hectares: f64,
    pub basalt_tons_per_year: f64,
    /// Round-trip truck emissions (kg CO2 / yr).
    pub transport_emissions_kg: f64,
    /// kg CO2 removed per ton of basalt for this climate.
    pub removal_rate_kg_per_ton: f64,
    /// Removal discounted by the overall suitability score (kg CO2 / yr).
    pub carbon_removal_kg: f64,
    pub net_carbon_impact_kg: f64,
    /// `net / removal`, or 0 when nothing is removed.
    pub efficiency_ratio: f64,
}

/// Estimate the yearly carbon balance.
///
/// `overall_score` acts as a real-world efficiency multiplier on the
/// theoretical removal, so a zero score removes nothing and both ratios fall
/// back to 0.
pub fn estimate(
    params: &SiteParameters,
    overall_score: f64,
    carbon: &CarbonConfig,
    climate: &ClimateConfig,
) -> CarbonImpact {
    let project_hectares = params.agricultural_land_hectares.min(carbon.pilot_project_hectares);
    let basalt_tons_per_year = project_hectares * carbon.basalt_tons_per_hectare;

    let transport_emissions_kg = basalt_tons_per_year
        * params.basalt_transport_distance_km
        * carbon.truck_emissions_kg_per_ton_km
        * carbon.round_trip_factor;

    let removal_rate_kg_per_ton = if is_tropical(params.avg_temperature_c, params.rainfall_mm, climate) {
        carbon.tropical_removal_kg_per_ton
    } else {
        carbon.base_removal_kg_per_ton
    };

    let carbon_removal_kg = basalt_tons_per_year * removal_rate_kg_per_ton * overall_score;
    let net_carbon_impact_kg = carbon_removal_kg - transport_emissions_kg;
    let efficiency_ratio = if carbon_removal_kg > 0.0 {
        net_carbon_impact_kg / carbon_removal_kg
    } else {
        0.0
    };

    CarbonImpact {
        project_hectares,
        basalt_tons_per_year,
        transport_emissions_kg,
        removal_rate_kg_per_ton,
        carbon_removal_kg,
        net_carbon_impact_kg,
        efficiency_ratio,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::tests::reference_site;

    fn run(params: &SiteParameters, score: f64) -> CarbonImpact {
        estimate(params, score, &CarbonConfig::default(), &ClimateConfig::default())
    }

    #[test]
    fn test_project_capacity_capped_at_pilot_scale() {
        let mut params = reference_site();
        params.agricultural_land_hectares = 5_000.0;
        assert_eq!(run(&params, 1.0).project_hectares, 100.0);

        params.agricultural_land_hectares = 42.0;
        let impact = run(&params, 1.0);
        assert_eq!(impact.project_hectares, 42.0);
        assert_eq!(impact.basalt_tons_per_year, 126.0);
    }

    #[test]
    fn test_reference_site_balance() {
        // 100 ha, 50 km haul, tropical
        let impact = run(&reference_site(), 0.973);
        assert_eq!(impact.basalt_tons_per_year, 300.0);
        assert!((impact.transport_emissions_kg - 8_100.0).abs() < 1e-9);
        assert_eq!(impact.removal_rate_kg_per_ton, 700.0);
        assert!((impact.carbon_removal_kg - 204_330.0).abs() < 1e-6);
        assert!((impact.net_carbon_impact_kg - 196_230.0).abs() < 1e-6);
        assert!((impact.efficiency_ratio - 0.960_358).abs() < 1e-6);
    }

    #[test]
    fn test_tropical_boundary_switches_removal_rate() {
        let mut params = reference_site();
        params.avg_temperature_c = 24.0;
        params.rainfall_mm = 1200.0;
        assert_eq!(run(&params, 0.5).removal_rate_kg_per_ton, 700.0);

        params.avg_temperature_c = 23.9;
        assert_eq!(run(&params, 0.5).removal_rate_kg_per_ton, 333.0);
    }

    #[test]
    fn test_zero_score_guards_division() {
        let impact = run(&reference_site(), 0.0);
        assert_eq!(impact.carbon_removal_kg, 0.0);
        assert_eq!(impact.efficiency_ratio, 0.0);
        assert!(impact.net_carbon_impact_kg < 0.0);
    }

    #[test]
    fn test_long_haul_goes_net_negative() {
        let mut params = reference_site();
        params.basalt_transport_distance_km = 1_000.0;
        params.avg_temperature_c = 15.0;
        let impact = run(&params, 0.5);
        assert!(impact.net_carbon_impact_kg < 0.0);
        assert!(impact.efficiency_ratio < 0.0);
    }
}
