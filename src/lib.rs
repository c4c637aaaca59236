//! Instant rate estimation for oversize and overweight equipment freight.
//!
//! The engine itself (`domain`) is pure: a haversine route distance fed
//! through a tiered rate policy of load classification, overweight bands,
//! pilot cars, permits, escorts, and a service fee. Zip-code geocoding
//! (`infra`) and the embedded reference datasets (`util`) feed it.

pub mod domain;
pub mod infra;
pub mod util;

pub use domain::{
    classify, distance_miles, estimate, CostBreakdown, EscortRule, GeoPoint, JurisdictionCheck,
    LoadClass, LoadClassification, QuoteError, QuoteRecord, RateCard, RateQuote, ReferenceData,
    RouteEndpoints, ShipmentProfile, StateLimits, ZipLocation,
};
pub use infra::{ZipLookupError, ZippopotamClient};
pub use util::datasets;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
