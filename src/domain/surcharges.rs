use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::entities::{EscortRule, RateCard, RouteEndpoints, ShipmentProfile, StateLimits};
use crate::domain::rating::LoadClassification;

/// Reference tables the surcharge rules consult, keyed by full state
/// name. Built once from the embedded datasets at startup; tests build
/// small tables inline.
#[derive(Clone, Debug, Default)]
pub struct ReferenceData {
    pub state_limits: HashMap<String, StateLimits>,
    pub escort_rules: HashMap<String, Vec<EscortRule>>,
}

impl ReferenceData {
    /// Legal limits for a state, or None (logged) when the dataset has no
    /// row for it.
    pub fn limits_for(&self, state: &str) -> Option<&StateLimits> {
        let limits = self.state_limits.get(state);
        if limits.is_none() {
            warn!(state, "no legal-limit data for state");
        }
        limits
    }

    /// Escort rule table for a state; an unknown state yields an empty
    /// table (logged), never an error.
    pub fn escort_rules_for(&self, state: &str) -> &[EscortRule] {
        match self.escort_rules.get(state) {
            Some(rules) => rules,
            None => {
                warn!(state, "no escort rules for state");
                &[]
            }
        }
    }
}

/// Number of pilot cars the oversize flags demand: overwidth and
/// overheight together take two, exactly one of them takes one.
pub fn pilot_cars_needed(classification: &LoadClassification) -> u32 {
    match (classification.over_width, classification.over_height) {
        (true, true) => 2,
        (true, false) | (false, true) => 1,
        (false, false) => 0,
    }
}

/// Pilot cars bill a flat base plus a per-mile rate, per car.
pub fn pilot_car_cost(cars: u32, distance_miles: f64, card: &RateCard) -> f64 {
    f64::from(cars) * (card.pilot_car_base + card.pilot_car_per_mile * distance_miles)
}

/// Permit cost across every state traversed. The per-state fee depends
/// on whether one or both of the overwidth/overheight flags tripped.
pub fn permit_cost(
    classification: &LoadClassification,
    states_traversed: u32,
    card: &RateCard,
) -> f64 {
    let per_state = match (classification.over_width, classification.over_height) {
        (true, true) => card.permit_fee_double,
        (true, false) | (false, true) => card.permit_fee_single,
        (false, false) => 0.0,
    };
    per_state * f64::from(states_traversed)
}

fn endpoint_states(route: &RouteEndpoints) -> impl Iterator<Item = &str> {
    route
        .origin_state
        .as_deref()
        .into_iter()
        .chain(route.destination_state.as_deref())
}

/// Escort fees: every escort rule the shipment matches bills one flat
/// fee, assessed in the origin and destination jurisdictions
/// independently.
pub fn escort_cost(
    shipment: &ShipmentProfile,
    route: &RouteEndpoints,
    reference: &ReferenceData,
    card: &RateCard,
) -> f64 {
    let mut matched = 0usize;
    for state in endpoint_states(route) {
        matched += reference
            .escort_rules_for(state)
            .iter()
            .filter(|rule| rule.matches(shipment))
            .count();
    }
    matched as f64 * card.escort_fee
}

/// Shipment measured against one state's legal limits. A tripped flag
/// means that state requires an oversize/overweight permit; pricing is
/// unaffected, the fee schedule keys off the dimensional flags alone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JurisdictionCheck {
    pub state: String,
    pub exceeds_width: bool,
    pub exceeds_height: bool,
    pub exceeds_weight: bool,
}

impl JurisdictionCheck {
    pub fn permit_required(&self) -> bool {
        self.exceeds_width || self.exceeds_height || self.exceeds_weight
    }
}

/// Checks the shipment against the legal limits of each named endpoint
/// jurisdiction, origin first. States without limit data are skipped.
pub fn jurisdiction_checks(
    shipment: &ShipmentProfile,
    route: &RouteEndpoints,
    reference: &ReferenceData,
) -> Vec<JurisdictionCheck> {
    endpoint_states(route)
        .filter_map(|state| {
            reference.limits_for(state).map(|limits| JurisdictionCheck {
                state: state.to_string(),
                // Legal width is tabulated in feet, shipment width in inches.
                exceeds_width: shipment.width > limits.width * 12.0,
                exceeds_height: shipment.height > limits.height,
                exceeds_weight: shipment.weight > limits.weight,
            })
        })
        .collect()
}
