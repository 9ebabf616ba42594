//! Scoring request validation
//!
//! The wire request carries every reading as an optional number. Validation
//! checks presence, finiteness and the per-field bounds, reports every
//! offending field in declaration order, and only then produces the
//! [`SiteParameters`] the scoring core is allowed to see.

use serde::{Deserialize, Serialize};

use crate::types::SiteParameters;

// ============================================================================
// Wire request
// ============================================================================

/// Raw scoring request as received over HTTP or from a batch file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteScoreRequest {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    pub rainfall_mm: Option<f64>,
    pub soil_ph: Option<f64>,
    pub avg_temperature_c: Option<f64>,

    pub distance_to_road_km: Option<f64>,
    pub basalt_transport_distance_km: Option<f64>,
    pub basalt_availability_index: Option<f64>,
    pub infrastructure_quality_index: Option<f64>,

    pub agricultural_land_hectares: Option<f64>,
    pub population_density_per_km2: Option<f64>,
    #[serde(rename = "energyCostPerKWh")]
    pub energy_cost_per_kwh: Option<f64>,
    pub labor_cost_per_hour: Option<f64>,

    pub annual_rainfall_variability: Option<f64>,
    pub soil_organic_carbon_percent: Option<f64>,
    pub elevation_meters: Option<f64>,
    pub regulatory_stability_index: Option<f64>,
    pub soil_moisture_percent: Option<f64>,
    pub carbon_market_accessibility: Option<f64>,
    pub soil_cec_meq_per_100g: Option<f64>,
    pub monitoring_capability_index: Option<f64>,
}

/// Inclusive bounds for one field. `None` means unbounded on that side.
#[derive(Debug, Clone, Copy)]
struct Bounds {
    min: Option<f64>,
    max: Option<f64>,
}

const UNBOUNDED: Bounds = Bounds { min: None, max: None };
const NON_NEGATIVE: Bounds = Bounds { min: Some(0.0), max: None };
const UNIT_INDEX: Bounds = Bounds { min: Some(0.0), max: Some(1.0) };

const fn range(min: f64, max: f64) -> Bounds {
    Bounds {
        min: Some(min),
        max: Some(max),
    }
}

impl SiteScoreRequest {
    /// Validate every field and convert to [`SiteParameters`].
    ///
    /// All violations are collected; the error lists them in field
    /// declaration order.
    pub fn into_parameters(self) -> Result<SiteParameters, ValidationError> {
        let mut v = Checker::default();

        let latitude = v.check("latitude", self.latitude, UNBOUNDED);
        let longitude = v.check("longitude", self.longitude, UNBOUNDED);
        let rainfall_mm = v.check("rainfallMm", self.rainfall_mm, NON_NEGATIVE);
        let soil_ph = v.check("soilPh", self.soil_ph, range(0.0, 14.0));
        let avg_temperature_c = v.check("avgTemperatureC", self.avg_temperature_c, range(-50.0, 60.0));
        let distance_to_road_km = v.check("distanceToRoadKm", self.distance_to_road_km, NON_NEGATIVE);
        let basalt_transport_distance_km = v.check(
            "basaltTransportDistanceKm",
            self.basalt_transport_distance_km,
            range(0.0, 1000.0),
        );
        let basalt_availability_index =
            v.check("basaltAvailabilityIndex", self.basalt_availability_index, UNIT_INDEX);
        let infrastructure_quality_index =
            v.check("infrastructureQualityIndex", self.infrastructure_quality_index, UNIT_INDEX);
        let agricultural_land_hectares = v.check(
            "agriculturalLandHectares",
            self.agricultural_land_hectares,
            range(0.0, 20_000_000.0),
        );
        let population_density_per_km2 = v.check(
            "populationDensityPerKm2",
            self.population_density_per_km2,
            range(0.0, 10_000.0),
        );
        let energy_cost_per_kwh = v.check("energyCostPerKWh", self.energy_cost_per_kwh, range(0.01, 1.0));
        let labor_cost_per_hour = v.check("laborCostPerHour", self.labor_cost_per_hour, range(1.0, 200.0));
        let annual_rainfall_variability = v.check(
            "annualRainfallVariability",
            self.annual_rainfall_variability,
            range(0.0, 5000.0),
        );
        let soil_organic_carbon_percent = v.check(
            "soilOrganicCarbonPercent",
            self.soil_organic_carbon_percent,
            range(0.0, 100.0),
        );
        let elevation_meters = v.check("elevationMeters", self.elevation_meters, range(0.0, 3000.0));
        let regulatory_stability_index =
            v.check("regulatoryStabilityIndex", self.regulatory_stability_index, UNIT_INDEX);
        let soil_moisture_percent = v.check("soilMoisturePercent", self.soil_moisture_percent, range(10.0, 90.0));
        let carbon_market_accessibility =
            v.check("carbonMarketAccessibility", self.carbon_market_accessibility, UNIT_INDEX);
        let soil_cec_meq_per_100g = v.check("soilCecMeqPer100g", self.soil_cec_meq_per_100g, range(0.0, 50.0));
        let monitoring_capability_index =
            v.check("monitoringCapabilityIndex", self.monitoring_capability_index, UNIT_INDEX);

        v.finish()?;

        Ok(SiteParameters {
            latitude,
            longitude,
            rainfall_mm,
            soil_ph,
            avg_temperature_c,
            annual_rainfall_variability,
            soil_organic_carbon_percent,
            elevation_meters,
            soil_moisture_percent,
            soil_cec_meq_per_100g,
            distance_to_road_km,
            basalt_transport_distance_km,
            basalt_availability_index,
            infrastructure_quality_index,
            monitoring_capability_index,
            agricultural_land_hectares,
            population_density_per_km2,
            energy_cost_per_kwh,
            labor_cost_per_hour,
            carbon_market_accessibility,
            regulatory_stability_index,
        })
    }
}

impl From<SiteParameters> for SiteScoreRequest {
    fn from(p: SiteParameters) -> Self {
        Self {
            latitude: Some(p.latitude),
            longitude: Some(p.longitude),
            rainfall_mm: Some(p.rainfall_mm),
            soil_ph: Some(p.soil_ph),
            avg_temperature_c: Some(p.avg_temperature_c),
            distance_to_road_km: Some(p.distance_to_road_km),
            basalt_transport_distance_km: Some(p.basalt_transport_distance_km),
            basalt_availability_index: Some(p.basalt_availability_index),
            infrastructure_quality_index: Some(p.infrastructure_quality_index),
            agricultural_land_hectares: Some(p.agricultural_land_hectares),
            population_density_per_km2: Some(p.population_density_per_km2),
            energy_cost_per_kwh: Some(p.energy_cost_per_kwh),
            labor_cost_per_hour: Some(p.labor_cost_per_hour),
            annual_rainfall_variability: Some(p.annual_rainfall_variability),
            soil_organic_carbon_percent: Some(p.soil_organic_carbon_percent),
            elevation_meters: Some(p.elevation_meters),
            regulatory_stability_index: Some(p.regulatory_stability_index),
            soil_moisture_percent: Some(p.soil_moisture_percent),
            carbon_market_accessibility: Some(p.carbon_market_accessibility),
            soil_cec_meq_per_100g: Some(p.soil_cec_meq_per_100g),
            monitoring_capability_index: Some(p.monitoring_capability_index),
        }
    }
}

// ============================================================================
// Violations
// ============================================================================

/// One rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

/// Every rejected field of one request, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Validation failed for ")?;
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "field '{}': {}", v.field, v.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Check the trimmed `name` and `region` that identify a stored site.
///
/// Blank values and control characters are rejected. Violations come back
/// name first, so callers can prepend them to parameter violations.
pub fn check_site_identity(name: &str, region: &str) -> Vec<FieldViolation> {
    let mut violations = Vec::new();
    for (field, value) in [("name", name), ("region", region)] {
        let value = value.trim();
        let message = if value.is_empty() {
            "must not be blank"
        } else if value.chars().any(char::is_control) {
            "must not contain control characters"
        } else {
            continue;
        };
        violations.push(FieldViolation {
            field,
            message: message.to_string(),
        });
    }
    violations
}

#[derive(Default)]
struct Checker {
    violations: Vec<FieldViolation>,
}

impl Checker {
    /// Record at most one violation for `field`; returns the value or 0.0 as
    /// a placeholder when the field is rejected.
    fn check(&mut self, field: &'static str, value: Option<f64>, bounds: Bounds) -> f64 {
        let message = match value {
            None => Some("must not be null".to_string()),
            Some(x) if !x.is_finite() => Some("must be a finite number".to_string()),
            Some(x) => match bounds {
                Bounds { min: Some(min), .. } if x < min => {
                    Some(format!("must be greater than or equal to {min:?}"))
                }
                Bounds { max: Some(max), .. } if x > max => {
                    Some(format!("must be less than or equal to {max:?}"))
                }
                _ => None,
            },
        };

        match message {
            Some(message) => {
                self.violations.push(FieldViolation { field, message });
                0.0
            }
            None => value.unwrap_or_default(),
        }
    }

    fn finish(self) -> Result<(), ValidationError> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                violations: self.violations,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::tests::reference_site;

    fn valid() -> SiteScoreRequest {
        SiteScoreRequest::from(reference_site())
    }

    #[test]
    fn test_site_identity_checks() {
        assert!(check_site_identity("Kericho", " Kenya ").is_empty());

        let v = check_site_identity("  ", "");
        let fields: Vec<_> = v.iter().map(|v| v.field).collect();
        assert_eq!(fields, ["name", "region"]);
        assert_eq!(v[0].message, "must not be blank");

        let v = check_site_identity("Keri\0cho", "Kenya");
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].field, "name");
        assert_eq!(v[0].message, "must not contain control characters");
    }

    #[test]
    fn test_valid_request_converts() {
        let params = valid().into_parameters().expect("reference site is in bounds");
        assert_eq!(params, reference_site());
    }

    #[test]
    fn test_missing_field_reported() {
        let mut req = valid();
        req.soil_ph = None;
        let err = req.into_parameters().unwrap_err();
        assert_eq!(err.violations.len(), 1);
        assert_eq!(err.violations[0].field, "soilPh");
        assert_eq!(err.violations[0].message, "must not be null");
    }

    #[test]
    fn test_all_violations_in_declaration_order() {
        let mut req = valid();
        req.monitoring_capability_index = Some(1.5);
        req.soil_ph = Some(15.0);
        req.energy_cost_per_kwh = Some(0.001);
        req.latitude = None;

        let err = req.into_parameters().unwrap_err();
        let fields: Vec<&str> = err.violations.iter().map(|v| v.field).collect();
        assert_eq!(fields, vec!["latitude", "soilPh", "energyCostPerKWh", "monitoringCapabilityIndex"]);
        assert_eq!(err.violations[1].message, "must be less than or equal to 14.0");
        assert_eq!(err.violations[2].message, "must be greater than or equal to 0.01");
    }

    #[test]
    fn test_display_format() {
        let mut req = valid();
        req.soil_ph = Some(-1.0);
        req.elevation_meters = Some(3001.0);
        let err = req.into_parameters().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed for field 'soilPh': must be greater than or equal to 0.0; \
             field 'elevationMeters': must be less than or equal to 3000.0"
        );
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let mut req = valid();
        req.soil_moisture_percent = Some(10.0);
        req.labor_cost_per_hour = Some(200.0);
        req.agricultural_land_hectares = Some(20_000_000.0);
        req.avg_temperature_c = Some(-50.0);
        assert!(req.into_parameters().is_ok());
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut req = valid();
        req.rainfall_mm = Some(f64::INFINITY);
        let err = req.into_parameters().unwrap_err();
        assert_eq!(err.violations[0].message, "must be a finite number");
    }

    #[test]
    fn test_coordinates_unbounded() {
        let mut req = valid();
        req.latitude = Some(-500.0);
        req.longitude = Some(1.0e6);
        assert!(req.into_parameters().is_ok());
    }

    #[test]
    fn test_empty_request_lists_every_field() {
        let err = SiteScoreRequest::default().into_parameters().unwrap_err();
        assert_eq!(err.violations.len(), 21);
        assert!(err.violations.iter().all(|v| v.message == "must not be null"));
    }

    #[test]
    fn test_wire_field_names() {
        let json = serde_json::to_value(valid()).unwrap();
        assert!(json.get("energyCostPerKWh").is_some());
        assert!(json.get("soilCecMeqPer100g").is_some());
        assert!(json.get("avgTemperatureC").is_some());
    }
}
