use crate::domain::entities::GeoPoint;

/// Mean Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;
/// Kilometers to statute miles.
const MILES_PER_KM: f64 = 0.621371;

/// Great-circle distance between two points in kilometers, by the
/// haversine formula. Symmetric in its arguments and zero for identical
/// points; longitude wraparound across the antimeridian needs no special
/// casing because only the sine of the half-delta enters the formula.
pub fn distance_km(origin: GeoPoint, destination: GeoPoint) -> f64 {
    let lat1 = origin.latitude.to_radians();
    let lat2 = destination.latitude.to_radians();
    let d_lat = (destination.latitude - origin.latitude).to_radians();
    let d_lon = (destination.longitude - origin.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Great-circle distance in statute miles, the unit every per-mile rate
/// in this crate is quoted in.
pub fn distance_miles(origin: GeoPoint, destination: GeoPoint) -> f64 {
    distance_km(origin, destination) * MILES_PER_KM
}
