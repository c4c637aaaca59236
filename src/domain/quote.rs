use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::entities::{
    CostBreakdown, QuoteError, RateCard, RouteEndpoints, ShipmentProfile, ZipLocation,
};
use crate::domain::haversine::distance_miles;
use crate::domain::rating::{classify, LoadClassification};
use crate::domain::surcharges::{self, JurisdictionCheck, ReferenceData};

/// A complete priced quote for one shipment over one route.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RateQuote {
    pub distance_miles: f64,
    pub classification: LoadClassification,
    pub pilot_cars: u32,
    pub breakdown: CostBreakdown,
    pub total_before_fee: f64,
    pub service_fee: f64,
    pub final_cost: f64,
    /// Legal-limit findings per named endpoint jurisdiction, origin
    /// first. Informational only.
    pub jurisdiction_checks: Vec<JurisdictionCheck>,
}

/// One breakdown summed and marked up with the service fee.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuoteTotals {
    pub total_before_fee: f64,
    pub service_fee: f64,
    pub final_cost: f64,
}

/// Sums the cost components and applies the fixed-percentage service fee.
/// No rounding here; display formatting is the caller's concern.
pub fn aggregate(breakdown: &CostBreakdown, service_fee_rate: f64) -> QuoteTotals {
    let total_before_fee = breakdown.total();
    let service_fee = total_before_fee * service_fee_rate;
    QuoteTotals {
        total_before_fee,
        service_fee,
        final_cost: total_before_fee + service_fee,
    }
}

/// Prices one shipment over one route: distance, classification, every
/// surcharge, the legal-limit checks, and the fee-marked-up total.
///
/// Pure and deterministic; identical inputs produce identical quotes.
/// Fails only on unusable input, never on pricing itself.
pub fn estimate(
    shipment: &ShipmentProfile,
    route: &RouteEndpoints,
    reference: &ReferenceData,
    card: &RateCard,
) -> Result<RateQuote, QuoteError> {
    shipment.validate()?;
    route.validate()?;

    let distance = distance_miles(route.origin, route.destination);
    let classification = classify(shipment, card);
    let pilot_cars = surcharges::pilot_cars_needed(&classification);

    let breakdown = CostBreakdown {
        base_cost: classification.base_rate_per_mile * distance,
        overweight_surcharge: classification.overweight_rate_per_mile * distance,
        pilot_car_cost: surcharges::pilot_car_cost(pilot_cars, distance, card),
        permit_cost: surcharges::permit_cost(&classification, route.states_traversed, card),
        escort_cost: surcharges::escort_cost(shipment, route, reference, card),
    };
    let totals = aggregate(&breakdown, card.service_fee_rate);

    Ok(RateQuote {
        distance_miles: distance,
        classification,
        pilot_cars,
        breakdown,
        total_before_fee: totals.total_before_fee,
        service_fee: totals.service_fee,
        final_cost: totals.final_cost,
        jurisdiction_checks: surcharges::jurisdiction_checks(shipment, route, reference),
    })
}

/// Caller-facing envelope around one quote: a reference token, the
/// creation time, and an echo of what was quoted. Transient; nothing is
/// stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub reference: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub origin: Option<ZipLocation>,
    pub destination: Option<ZipLocation>,
    pub shipment: ShipmentProfile,
    pub quote: RateQuote,
}

impl QuoteRecord {
    pub fn new(shipment: ShipmentProfile, quote: RateQuote) -> Self {
        Self {
            reference: Uuid::new_v4(),
            created_at: OffsetDateTime::now_utc(),
            origin: None,
            destination: None,
            shipment,
            quote,
        }
    }

    pub fn with_endpoints(mut self, origin: ZipLocation, destination: ZipLocation) -> Self {
        self.origin = Some(origin);
        self.destination = Some(destination);
        self
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::entities::GeoPoint;

    use super::*;

    fn card() -> RateCard {
        RateCard::default()
    }

    fn plain_route() -> RouteEndpoints {
        RouteEndpoints::new(GeoPoint::new(40.0, -75.0), GeoPoint::new(41.0, -76.0), 3)
    }

    #[test]
    fn aggregate_applies_the_service_fee() {
        let breakdown = CostBreakdown {
            base_cost: 100.0,
            ..CostBreakdown::default()
        };
        let totals = aggregate(&breakdown, 0.15);
        assert_eq!(totals.total_before_fee, 100.0);
        assert_eq!(totals.service_fee, 15.0);
        assert_eq!(totals.final_cost, 115.0);
    }

    #[test]
    fn aggregate_of_empty_breakdown_is_zero() {
        let totals = aggregate(&CostBreakdown::default(), 0.15);
        assert_eq!(totals.final_cost, 0.0);
    }

    #[test]
    fn estimate_is_deterministic() {
        let shipment = ShipmentProfile::new(42.0, 100.0, 11.0, 40_000.0);
        let reference = ReferenceData::default();
        let first = estimate(&shipment, &plain_route(), &reference, &card()).unwrap();
        let second = estimate(&shipment, &plain_route(), &reference, &card()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn estimate_rejects_bad_shipment() {
        let shipment = ShipmentProfile::new(-1.0, 80.0, 9.0, 10_000.0);
        let result = estimate(&shipment, &plain_route(), &ReferenceData::default(), &card());
        assert!(matches!(
            result,
            Err(QuoteError::InvalidShipment { field: "length", .. })
        ));
    }

    #[test]
    fn estimate_rejects_unresolved_route() {
        let shipment = ShipmentProfile::new(20.0, 80.0, 9.0, 10_000.0);
        let route = RouteEndpoints::new(GeoPoint::default(), GeoPoint::new(f64::NAN, 0.0), 1);
        let result = estimate(&shipment, &route, &ReferenceData::default(), &card());
        assert_eq!(
            result,
            Err(QuoteError::UnresolvedRoute {
                endpoint: "destination"
            })
        );
    }

    #[test]
    fn zero_distance_prices_only_flat_components() {
        let shipment = ShipmentProfile::new(42.0, 100.0, 11.0, 40_000.0);
        let point = GeoPoint::new(40.0, -75.0);
        let route = RouteEndpoints::new(point, point, 1);
        let quote = estimate(&shipment, &route, &ReferenceData::default(), &card()).unwrap();
        assert_eq!(quote.distance_miles, 0.0);
        assert_eq!(quote.breakdown.base_cost, 0.0);
        // Two pilot cars still bill their flat base, permits still apply.
        assert_eq!(quote.breakdown.pilot_car_cost, 1000.0);
        assert_eq!(quote.breakdown.permit_cost, 200.0);
    }

    #[test]
    fn oversize_overweight_quote_assembles_every_component() {
        let shipment = ShipmentProfile::new(42.0, 100.0, 11.0, 40_000.0);
        let quote = estimate(&shipment, &plain_route(), &ReferenceData::default(), &card()).unwrap();
        let d = quote.distance_miles;
        assert!(d > 0.0);
        assert_eq!(quote.classification.base_rate_per_mile, 3.0);
        assert_eq!(quote.classification.overweight_rate_per_mile, 0.0); // 40k lb is below the bands
        assert_eq!(quote.pilot_cars, 2);
        assert_eq!(quote.breakdown.base_cost, 3.0 * d);
        assert_eq!(quote.breakdown.pilot_car_cost, 1000.0 + 3.0 * d);
        assert_eq!(quote.breakdown.permit_cost, 600.0);
        assert_eq!(quote.breakdown.escort_cost, 0.0);
        assert_eq!(quote.total_before_fee, quote.breakdown.total());
        assert_eq!(quote.final_cost, quote.total_before_fee + quote.service_fee);
        assert!((quote.final_cost - quote.total_before_fee * 1.15).abs() < 1e-9);
    }

    #[test]
    fn partial_load_quote_carries_no_surcharges() {
        let shipment = ShipmentProfile::new(20.0, 80.0, 9.0, 15_000.0);
        let quote = estimate(&shipment, &plain_route(), &ReferenceData::default(), &card()).unwrap();
        let d = quote.distance_miles;
        assert_eq!(quote.pilot_cars, 0);
        assert_eq!(quote.breakdown.base_cost, 2.0 * d);
        assert_eq!(quote.breakdown.overweight_surcharge, 0.0);
        assert_eq!(quote.breakdown.pilot_car_cost, 0.0);
        assert_eq!(quote.breakdown.permit_cost, 0.0);
        assert!((quote.final_cost - 2.0 * d * 1.15).abs() < 1e-9);
    }

    #[test]
    fn record_references_are_unique() {
        let shipment = ShipmentProfile::new(20.0, 80.0, 9.0, 15_000.0);
        let quote = estimate(&shipment, &plain_route(), &ReferenceData::default(), &card()).unwrap();
        let a = QuoteRecord::new(shipment, quote.clone());
        let b = QuoteRecord::new(shipment, quote);
        assert_ne!(a.reference, b.reference);
    }

    #[test]
    fn record_serializes_with_rfc3339_timestamp() {
        let shipment = ShipmentProfile::new(20.0, 80.0, 9.0, 15_000.0);
        let quote = estimate(&shipment, &plain_route(), &ReferenceData::default(), &card()).unwrap();
        let record = QuoteRecord::new(shipment, quote);
        let json = serde_json::to_value(&record).unwrap();
        let created_at = json["created_at"].as_str().unwrap();
        // RFC 3339: date, 'T', time, offset.
        assert!(created_at.contains('T'));
        assert!(json["reference"].as_str().is_some());
    }
}
