//! Great-circle distance

use geo::geometry::Point;

/// Earth radius used by every distance of the crate, in meters
pub const EARTH_RADIUS: f64 = 6_371_000.0;

/// Haversine distance in meters between two lon/lat points
pub fn haversine_distance(a: &Point, b: &Point) -> f64 {
    let dlat = (b.y() - a.y()).to_radians();
    let dlng = (b.x() - a.x()).to_radians();

    let h = (dlat / 2.0).sin().powi(2)
        + a.y().to_radians().cos() * b.y().to_radians().cos() * (dlng / 2.0).sin().powi(2);

    EARTH_RADIUS * 2.0 * h.sqrt().atan2((1.0 - h).sqrt())
}
