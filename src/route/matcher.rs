//! Radars detection along a route polyline

use geo::geometry::Point;
use log::{debug, warn};
use serde::Serialize;

use super::distance::haversine_distance;
use crate::Radar;

/// Default max distance between a radar and the route, in meters
pub const DETECTION_RADIUS: f64 = 500.0;

/// Radar found close to the route
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedRadar {
    #[serde(flatten)]
    pub radar: Radar,
    /// Meters to the closest route point, rounded
    pub distance_from_route: u32,
    /// Closest route point index over the route points count, 0 = start
    pub route_position: f64,
}

/// Finds the radars within a radius of the route points
#[derive(Clone, Debug, PartialEq)]
pub struct RadarMatcher {
    /// Detection radius in meters
    pub radius: f64,
}

impl RadarMatcher {
    pub fn new() -> Self {
        Self {
            radius: DETECTION_RADIUS,
        }
    }

    /// Negative radius is clamped to 0, a non finite one is ignored
    pub fn radius(&mut self, radius: f64) -> &mut Self {
        if !radius.is_finite() {
            warn!("Invalid detection radius {}, keeping {} m", radius, self.radius);
            return self;
        }

        self.radius = radius.max(0.0);

        self
    }

    /// Radars close to the route, ordered by position along it.
    ///
    /// Each radar is compared with every route point, the closest one wins.
    /// Radars without usable coordinates are ignored. An empty route has no
    /// closest point at all, so nothing matches it.
    pub fn find(&self, route: &[Point], radars: &[Radar]) -> Vec<MatchedRadar> {
        if route.is_empty() {
            warn!("Radars lookup on an empty route");
            return vec![];
        }

        let mut matched = vec![];
        let mut skipped = 0;

        for radar in radars {
            let position = match radar.point() {
                Some(p) => p,
                None => {
                    skipped += 1;
                    continue;
                }
            };

            let mut min_distance = f64::INFINITY;
            let mut closest = 0;

            for (idx, point) in route.iter().enumerate() {
                let distance = haversine_distance(&position, point);
                if distance < min_distance {
                    min_distance = distance;
                    closest = idx;
                }
            }

            if min_distance <= self.radius {
                matched.push(MatchedRadar {
                    radar: radar.clone(),
                    distance_from_route: min_distance.round() as u32,
                    route_position: closest as f64 / route.len() as f64,
                });
            }
        }

        matched.sort_by(|a, b| a.route_position.total_cmp(&b.route_position));

        debug!(
            "{} radars on a {} points route ({} without coordinates)",
            matched.len(),
            route.len(),
            skipped
        );

        matched
    }
}

impl Default for RadarMatcher {
    fn default() -> Self {
        Self::new()
    }
}
