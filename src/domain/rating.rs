use serde::{Deserialize, Serialize};

use crate::domain::entities::{RateCard, ShipmentProfile};

/// Width above which a shipment is overwidth, in inches.
pub const OVER_WIDTH_IN: f64 = 96.0;
/// Height above which a shipment is overheight, in feet.
pub const OVER_HEIGHT_FT: f64 = 10.5;
/// Length at or above which a shipment is overlength, in feet.
pub const OVER_LENGTH_FT: f64 = 40.0;
/// Gross weight at or above which a shipment always takes a full load.
pub const FULL_LOAD_WEIGHT_LB: f64 = 35_000.0;

/// Partial-load length band, feet: inclusive lower, exclusive upper.
const PARTIAL_MIN_LENGTH_FT: f64 = 15.0;
const PARTIAL_MAX_LENGTH_FT: f64 = 30.0;
/// Weight ceiling (exclusive) for the partial-load band, pounds.
const PARTIAL_MAX_WEIGHT_LB: f64 = 20_000.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadClass {
    Full,
    Partial,
}

/// Outcome of classifying one shipment: the load class, the per-mile
/// rates it earns, and which oversize flags tripped.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoadClassification {
    pub class: LoadClass,
    pub base_rate_per_mile: f64,
    /// Per-mile overweight surcharge from the weight-band table.
    pub overweight_rate_per_mile: f64,
    pub over_width: bool,
    pub over_height: bool,
    pub over_length: bool,
    /// True when an oversize flag or the 35k lb gross weight threshold
    /// forced the full load, as opposed to the fallback pricing path.
    pub requires_full_load: bool,
}

/// Classifies a shipment against the fixed dimensional thresholds and
/// prices it from the rate card.
///
/// Any oversize flag, or gross weight of 35k lb and up, forces a full
/// load. Shipments 15 to just under 30 ft and under 20k lb ride as a
/// partial load; everything else falls back to full-load pricing.
pub fn classify(shipment: &ShipmentProfile, card: &RateCard) -> LoadClassification {
    let over_width = shipment.width > OVER_WIDTH_IN;
    let over_height = shipment.height > OVER_HEIGHT_FT;
    let over_length = shipment.length >= OVER_LENGTH_FT;
    let requires_full_load =
        over_width || over_height || over_length || shipment.weight >= FULL_LOAD_WEIGHT_LB;

    let in_partial_band = (PARTIAL_MIN_LENGTH_FT..PARTIAL_MAX_LENGTH_FT)
        .contains(&shipment.length)
        && shipment.weight < PARTIAL_MAX_WEIGHT_LB;

    let (class, base_rate_per_mile) = if requires_full_load {
        (LoadClass::Full, card.full_load_rate)
    } else if in_partial_band {
        (LoadClass::Partial, card.partial_load_rate)
    } else {
        (LoadClass::Full, card.full_load_rate)
    };

    LoadClassification {
        class,
        base_rate_per_mile,
        overweight_rate_per_mile: overweight_rate_per_mile(shipment.weight),
        over_width,
        over_height,
        over_length,
        requires_full_load,
    }
}

/// Per-mile overweight surcharge by gross weight band.
///
/// The rate table leaves the sliver (105_000, 105_001] uncovered;
/// weights in it carry no surcharge.
pub fn overweight_rate_per_mile(weight_lb: f64) -> f64 {
    if (48_000.0..60_000.0).contains(&weight_lb) {
        1.5
    } else if (60_000.0..80_000.0).contains(&weight_lb) {
        2.5
    } else if (80_000.0..90_000.0).contains(&weight_lb) {
        3.0
    } else if (90_000.0..=105_000.0).contains(&weight_lb) {
        5.0
    } else if weight_lb > 105_001.0 {
        8.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn card() -> RateCard {
        RateCard::default()
    }

    #[rstest]
    #[case(45.0, 80.0, 9.0, 10_000.0)] // overlength
    #[case(40.0, 80.0, 9.0, 10_000.0)] // overlength, at the threshold
    #[case(20.0, 100.0, 9.0, 10_000.0)] // overwidth
    #[case(20.0, 80.0, 11.0, 10_000.0)] // overheight
    #[case(20.0, 80.0, 9.0, 35_000.0)] // heavy, at the threshold
    fn oversize_or_heavy_forces_full_load(
        #[case] length: f64,
        #[case] width: f64,
        #[case] height: f64,
        #[case] weight: f64,
    ) {
        let result = classify(&ShipmentProfile::new(length, width, height, weight), &card());
        assert_eq!(result.class, LoadClass::Full);
        assert_eq!(result.base_rate_per_mile, 3.0);
        assert!(result.requires_full_load);
    }

    #[test]
    fn partial_band_earns_partial_rate() {
        let result = classify(&ShipmentProfile::new(20.0, 80.0, 9.0, 15_000.0), &card());
        assert_eq!(result.class, LoadClass::Partial);
        assert_eq!(result.base_rate_per_mile, 2.0);
        assert!(!result.over_width && !result.over_height && !result.over_length);
        assert!(!result.requires_full_load);
    }

    #[test]
    fn partial_band_lower_length_bound_is_inclusive() {
        let result = classify(&ShipmentProfile::new(15.0, 80.0, 9.0, 19_999.0), &card());
        assert_eq!(result.class, LoadClass::Partial);
    }

    #[rstest]
    #[case(30.0, 10_000.0)] // length bound is exclusive
    #[case(14.9, 5_000.0)] // below the band
    #[case(20.0, 20_000.0)] // weight bound is exclusive
    fn outside_partial_band_falls_back_to_full(#[case] length: f64, #[case] weight: f64) {
        let result = classify(&ShipmentProfile::new(length, 80.0, 9.0, weight), &card());
        assert_eq!(result.class, LoadClass::Full);
        assert_eq!(result.base_rate_per_mile, 3.0);
        // Fallback pricing, not a mandated full load.
        assert!(!result.requires_full_load);
    }

    #[test]
    fn classification_carries_the_overweight_rate() {
        let result = classify(&ShipmentProfile::new(45.0, 80.0, 9.0, 60_000.0), &card());
        assert_eq!(result.class, LoadClass::Full);
        assert_eq!(result.overweight_rate_per_mile, 2.5);
    }

    #[test]
    fn threshold_dimensions_are_not_oversize() {
        // Exactly 96 in wide and 10.5 ft tall sits at the limits, not over.
        let result = classify(&ShipmentProfile::new(20.0, 96.0, 10.5, 15_000.0), &card());
        assert_eq!(result.class, LoadClass::Partial);
        assert!(!result.over_width);
        assert!(!result.over_height);
    }

    #[test]
    fn classification_reports_tripped_flags() {
        let result = classify(&ShipmentProfile::new(45.0, 100.0, 9.0, 10_000.0), &card());
        assert!(result.over_length);
        assert!(result.over_width);
        assert!(!result.over_height);
    }

    #[test]
    fn custom_rate_card_prices_the_classes() {
        let custom = RateCard {
            full_load_rate: 4.5,
            partial_load_rate: 2.75,
            ..RateCard::default()
        };
        let full = classify(&ShipmentProfile::new(45.0, 80.0, 9.0, 10_000.0), &custom);
        assert_eq!(full.base_rate_per_mile, 4.5);
        let partial = classify(&ShipmentProfile::new(20.0, 80.0, 9.0, 15_000.0), &custom);
        assert_eq!(partial.base_rate_per_mile, 2.75);
    }

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(20_000.0, 0.0)]
    #[case(47_999.0, 0.0)]
    #[case(48_000.0, 1.5)]
    #[case(59_999.0, 1.5)]
    #[case(60_000.0, 2.5)]
    #[case(79_999.0, 2.5)]
    #[case(80_000.0, 3.0)]
    #[case(89_999.0, 3.0)]
    #[case(90_000.0, 5.0)]
    #[case(105_000.0, 5.0)]
    #[case(105_002.0, 8.0)]
    #[case(250_000.0, 8.0)]
    fn overweight_bands(#[case] weight: f64, #[case] expected: f64) {
        assert_eq!(overweight_rate_per_mile(weight), expected);
    }

    #[rstest]
    #[case(105_000.5)]
    #[case(105_001.0)]
    fn uncovered_sliver_above_105k_has_no_surcharge(#[case] weight: f64) {
        assert_eq!(overweight_rate_per_mile(weight), 0.0);
    }
}
