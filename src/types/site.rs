//! Site parameters, assessment output and sustainability grades

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

// ============================================================================
// Input: SiteParameters
// ============================================================================

/// Validated environmental, logistics and economic readings for one candidate site.
///
/// Built once per request by [`crate::validation`] and never mutated while
/// scoring. Latitude/longitude are informational only and take no part in
/// any formula.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteParameters {
    pub latitude: f64,
    pub longitude: f64,

    // Environmental
    pub rainfall_mm: f64,
    pub soil_ph: f64,
    pub avg_temperature_c: f64,
    pub annual_rainfall_variability: f64,
    pub soil_organic_carbon_percent: f64,
    pub elevation_meters: f64,
    pub soil_moisture_percent: f64,
    pub soil_cec_meq_per_100g: f64,

    // Logistics
    pub distance_to_road_km: f64,
    pub basalt_transport_distance_km: f64,
    pub basalt_availability_index: f64,
    pub infrastructure_quality_index: f64,
    pub monitoring_capability_index: f64,

    // Economic
    pub agricultural_land_hectares: f64,
    pub population_density_per_km2: f64,
    #[serde(rename = "energyCostPerKWh")]
    pub energy_cost_per_kwh: f64,
    pub labor_cost_per_hour: f64,
    pub carbon_market_accessibility: f64,

    // Governance
    pub regulatory_stability_index: f64,
}

// ============================================================================
// Explainability: ScoreBreakdown
// ============================================================================

/// Ordered name → rounded sub-score mapping.
///
/// Serializes as a JSON object whose key order is the insertion order
/// (categories first, then parameters).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreBreakdown {
    entries: Vec<(&'static str, f64)>,
}

impl ScoreBreakdown {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, name: &'static str, value: f64) {
        self.entries.push((name, value));
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(key, _)| *key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ScoreBreakdown {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

// ============================================================================
// Grade
// ============================================================================

/// Discrete sustainability rating, best first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SustainabilityGrade {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "F")]
    F,
}

impl SustainabilityGrade {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::BPlus => "B+",
            Self::B => "B",
            Self::CPlus => "C+",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        }
    }
}

impl std::fmt::Display for SustainabilityGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Output: SiteAssessment
// ============================================================================

/// Complete result of one scoring call. Every numeric field is rounded to
/// two decimal places.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteAssessment {
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    pub project_capacity_hectares: f64,

    // Carbon impact (kg CO2 / year)
    pub co2_emissions_kg_per_year: f64,
    pub carbon_removal_kg_per_year: f64,
    pub net_carbon_impact_kg_per_year: f64,
    pub carbon_efficiency_ratio: f64,

    // Costs (USD / year)
    pub basalt_material_cost_usd_per_year: f64,
    pub transport_cost_usd_per_year: f64,
    pub labor_cost_usd_per_year: f64,
    pub equipment_cost_usd_per_year: f64,
    pub total_cost_usd_per_year: f64,
    pub cost_per_ton_co2_removed: f64,

    pub sustainability_grade: SustainabilityGrade,

    /// Version of the scoring configuration that produced this assessment.
    pub scoring_version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakdown_serializes_in_insertion_order() {
        let mut breakdown = ScoreBreakdown::with_capacity(3);
        breakdown.push("environmental", 0.9);
        breakdown.push("logistics", 0.5);
        breakdown.push("advanced", 0.1);

        let json = serde_json::to_string(&breakdown).unwrap();
        assert_eq!(json, r#"{"environmental":0.9,"logistics":0.5,"advanced":0.1}"#);
    }

    #[test]
    fn test_breakdown_lookup() {
        let mut breakdown = ScoreBreakdown::default();
        assert!(breakdown.is_empty());
        breakdown.push("soilPh", 1.0);
        assert_eq!(breakdown.get("soilPh"), Some(1.0));
        assert_eq!(breakdown.get("missing"), None);
        assert_eq!(breakdown.len(), 1);
    }

    #[test]
    fn test_grade_wire_names() {
        assert_eq!(serde_json::to_string(&SustainabilityGrade::APlus).unwrap(), "\"A+\"");
        assert_eq!(serde_json::to_string(&SustainabilityGrade::CPlus).unwrap(), "\"C+\"");
        let parsed: SustainabilityGrade = serde_json::from_str("\"B+\"").unwrap();
        assert_eq!(parsed, SustainabilityGrade::BPlus);
        assert_eq!(SustainabilityGrade::F.to_string(), "F");
    }

    #[test]
    fn test_grade_ordering_best_first() {
        assert!(SustainabilityGrade::APlus < SustainabilityGrade::A);
        assert!(SustainabilityGrade::D < SustainabilityGrade::F);
    }
}
