use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Physical profile of one shipment, in the mixed units freight rate
/// cards are written in: length and height in feet, width in inches,
/// weight in pounds. A field of `0.0` means "unknown / not applicable",
/// not a zero-size shipment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ShipmentProfile {
    /// Overall length in feet.
    #[serde(default)]
    pub length: f64,
    /// Overall width in inches.
    #[serde(default)]
    pub width: f64,
    /// Overall height in feet.
    #[serde(default)]
    pub height: f64,
    /// Gross weight in pounds.
    #[serde(default)]
    pub weight: f64,
}

impl ShipmentProfile {
    pub fn new(length: f64, width: f64, height: f64, weight: f64) -> Self {
        Self {
            length,
            width,
            height,
            weight,
        }
    }

    /// Rejects dimensions the classifier must never see: every field has
    /// to be a finite, non-negative number.
    pub fn validate(&self) -> Result<(), QuoteError> {
        let fields = [
            ("length", self.length),
            ("width", self.width),
            ("height", self.height),
            ("weight", self.weight),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(QuoteError::InvalidShipment { field, value });
            }
        }
        Ok(())
    }
}

/// A geographic coordinate pair in decimal degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Basic numeric-range check. Geographic plausibility beyond this is
    /// the geocoding collaborator's problem, not the estimator's.
    pub fn in_range(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude.abs() <= 90.0
            && self.longitude.abs() <= 180.0
    }
}

/// Route inputs for one quote: both resolved endpoints, the state each
/// endpoint sits in (when the geocoder knew it), and how many states the
/// route crosses. The state count is caller-supplied route data; the
/// estimator never guesses it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteEndpoints {
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    /// Origin state name as the geocoder reports it, e.g. "Pennsylvania".
    #[serde(default)]
    pub origin_state: Option<String>,
    #[serde(default)]
    pub destination_state: Option<String>,
    /// Number of states traversed, origin and destination included.
    pub states_traversed: u32,
}

impl RouteEndpoints {
    pub fn new(origin: GeoPoint, destination: GeoPoint, states_traversed: u32) -> Self {
        Self {
            origin,
            destination,
            origin_state: None,
            destination_state: None,
            states_traversed,
        }
    }

    pub fn with_states(
        mut self,
        origin_state: impl Into<String>,
        destination_state: impl Into<String>,
    ) -> Self {
        self.origin_state = Some(origin_state.into());
        self.destination_state = Some(destination_state.into());
        self
    }

    /// Both endpoints must carry usable coordinates before a distance or
    /// a quote can be computed.
    pub fn validate(&self) -> Result<(), QuoteError> {
        if !self.origin.in_range() {
            return Err(QuoteError::UnresolvedRoute { endpoint: "origin" });
        }
        if !self.destination.in_range() {
            return Err(QuoteError::UnresolvedRoute {
                endpoint: "destination",
            });
        }
        Ok(())
    }
}

/// What the zip-code geocoder resolves one postal code to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZipLocation {
    pub zip: String,
    pub city: String,
    /// Full state name, e.g. "New Jersey".
    pub state: String,
    pub state_abbreviation: String,
    pub point: GeoPoint,
}

/// Tunable prices applied on top of the fixed classification thresholds.
/// Defaults reproduce the standard rate policy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RateCard {
    /// Per-mile rate for full-load shipments (also the fallback rate).
    pub full_load_rate: f64,
    /// Per-mile rate for shipments in the partial-load band.
    pub partial_load_rate: f64,
    /// Flat cost per pilot car.
    pub pilot_car_base: f64,
    /// Per-mile cost per pilot car.
    pub pilot_car_per_mile: f64,
    /// Permit fee per state when exactly one of overwidth/overheight holds.
    pub permit_fee_single: f64,
    /// Permit fee per state when both overwidth and overheight hold.
    pub permit_fee_double: f64,
    /// Fee per matched escort rule, per endpoint jurisdiction.
    pub escort_fee: f64,
    /// Fixed-percentage markup applied to the aggregated cost.
    pub service_fee_rate: f64,
}

impl Default for RateCard {
    fn default() -> Self {
        Self {
            full_load_rate: 3.0,
            partial_load_rate: 2.0,
            pilot_car_base: 500.0,
            pilot_car_per_mile: 1.5,
            permit_fee_single: 125.0,
            permit_fee_double: 200.0,
            escort_fee: 500.0,
            service_fee_rate: 0.15,
        }
    }
}

/// Per-component dollar costs making up one quote, before the service fee.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// Base per-mile rate times distance.
    pub base_cost: f64,
    /// Overweight per-mile surcharge times distance.
    pub overweight_surcharge: f64,
    pub pilot_car_cost: f64,
    pub permit_cost: f64,
    pub escort_cost: f64,
}

impl CostBreakdown {
    /// Sum of every cost component.
    pub fn total(&self) -> f64 {
        self.base_cost
            + self.overweight_surcharge
            + self.pilot_car_cost
            + self.permit_cost
            + self.escort_cost
    }
}

/// One state's legal size and weight limits, against which oversize
/// permit requirements are assessed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateLimits {
    /// Legal width in feet.
    pub width: f64,
    /// Legal height in feet.
    pub height: f64,
    /// Legal gross vehicle weight in pounds.
    pub weight: f64,
}

/// One row of a state's escort table. A rule matches when the shipment
/// width falls inside the rule's range, or its height meets the rule's
/// minimum; absent bounds leave that side of the range open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EscortRule {
    /// Lower width bound in inches, inclusive.
    #[serde(default)]
    pub width_min: Option<f64>,
    /// Upper width bound in inches, inclusive.
    #[serde(default)]
    pub width_max: Option<f64>,
    /// Height threshold in feet, inclusive.
    #[serde(default)]
    pub height_min: Option<f64>,
}

impl EscortRule {
    pub fn matches(&self, shipment: &ShipmentProfile) -> bool {
        let width_hit = match (self.width_min, self.width_max) {
            (None, None) => false,
            (min, max) => {
                shipment.width >= min.unwrap_or(f64::MIN)
                    && shipment.width <= max.unwrap_or(f64::MAX)
            }
        };
        let height_hit = self
            .height_min
            .map(|min| shipment.height >= min)
            .unwrap_or(false);
        width_hit || height_hit
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum QuoteError {
    #[error("shipment {field} must be a finite non-negative number, got {value}")]
    InvalidShipment { field: &'static str, value: f64 },
    #[error("route {endpoint} has no usable coordinates")]
    UnresolvedRoute { endpoint: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_dimensions_are_valid_unknowns() {
        assert!(ShipmentProfile::default().validate().is_ok());
    }

    #[test]
    fn negative_dimension_is_rejected() {
        let shipment = ShipmentProfile::new(20.0, -4.0, 9.0, 15000.0);
        assert_eq!(
            shipment.validate(),
            Err(QuoteError::InvalidShipment {
                field: "width",
                value: -4.0
            })
        );
    }

    #[test]
    fn nan_dimension_is_rejected() {
        let shipment = ShipmentProfile::new(20.0, 80.0, f64::NAN, 15000.0);
        assert!(matches!(
            shipment.validate(),
            Err(QuoteError::InvalidShipment {
                field: "height",
                ..
            })
        ));
    }

    #[test]
    fn geo_point_range_check() {
        assert!(GeoPoint::new(40.7128, -74.0060).in_range());
        assert!(GeoPoint::new(0.0, 0.0).in_range());
        assert!(!GeoPoint::new(91.0, 0.0).in_range());
        assert!(!GeoPoint::new(0.0, -181.0).in_range());
        assert!(!GeoPoint::new(f64::NAN, 0.0).in_range());
    }

    #[test]
    fn route_requires_both_endpoints_in_range() {
        let bad = RouteEndpoints::new(GeoPoint::new(40.0, -75.0), GeoPoint::new(200.0, 0.0), 2);
        assert_eq!(
            bad.validate(),
            Err(QuoteError::UnresolvedRoute {
                endpoint: "destination"
            })
        );
    }

    #[test]
    fn escort_rule_width_range() {
        let rule = EscortRule {
            width_min: Some(144.0),
            width_max: Some(192.0),
            height_min: None,
        };
        assert!(rule.matches(&ShipmentProfile::new(30.0, 150.0, 9.0, 20000.0)));
        assert!(!rule.matches(&ShipmentProfile::new(30.0, 120.0, 9.0, 20000.0)));
        assert!(!rule.matches(&ShipmentProfile::new(30.0, 200.0, 9.0, 20000.0)));
    }

    #[test]
    fn escort_rule_height_only() {
        let rule = EscortRule {
            height_min: Some(14.5),
            ..EscortRule::default()
        };
        assert!(rule.matches(&ShipmentProfile::new(30.0, 90.0, 15.0, 20000.0)));
        assert!(!rule.matches(&ShipmentProfile::new(30.0, 90.0, 14.0, 20000.0)));
    }

    #[test]
    fn escort_rule_half_open_width_range() {
        let rule = EscortRule {
            width_min: Some(102.0),
            width_max: None,
            height_min: None,
        };
        assert!(rule.matches(&ShipmentProfile::new(30.0, 130.0, 9.0, 20000.0)));
        assert!(!rule.matches(&ShipmentProfile::new(30.0, 96.0, 9.0, 20000.0)));
    }

    #[test]
    fn breakdown_total_sums_components() {
        let breakdown = CostBreakdown {
            base_cost: 300.0,
            overweight_surcharge: 150.0,
            pilot_car_cost: 650.0,
            permit_cost: 375.0,
            escort_cost: 500.0,
        };
        assert_eq!(breakdown.total(), 1975.0);
    }
}
