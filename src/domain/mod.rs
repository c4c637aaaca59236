//! The rate-estimation engine: pure, synchronous, no I/O.

pub mod entities;
pub mod haversine;
pub mod quote;
pub mod rating;
pub mod surcharges;

pub use entities::{
    CostBreakdown, EscortRule, GeoPoint, QuoteError, RateCard, RouteEndpoints, ShipmentProfile,
    StateLimits, ZipLocation,
};
pub use haversine::{distance_km, distance_miles};
pub use quote::{aggregate, estimate, QuoteRecord, QuoteTotals, RateQuote};
pub use rating::{classify, overweight_rate_per_mile, LoadClass, LoadClassification};
pub use surcharges::{
    escort_cost, jurisdiction_checks, permit_cost, pilot_car_cost, pilot_cars_needed,
    JurisdictionCheck, ReferenceData,
};
