//! Driving routes and radars detection along them

use geo::geometry::{Coord, LineString, Point};

pub mod distance;
pub mod gpx;
pub mod matcher;
pub mod summary;


/// Route end, geocoded
#[derive(Clone, Debug, PartialEq)]
pub struct Endpoint {
    pub point: Point,
    /// Human label of the place
    pub label: String,
}

impl Endpoint {
    pub fn new(latitude: f64, longitude: f64, label: String) -> Self {
        Self {
            point: Point::new(longitude, latitude),
            label,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.point.y()
    }

    pub fn longitude(&self) -> f64 {
        self.point.x()
    }
}

/// Route computed by the routing engine
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    /// Polyline, x = longitude, y = latitude
    pub line: LineString<f64>,
    /// Meters
    pub distance: f64,
    /// Seconds
    pub duration: f64,
    pub start: Endpoint,
    pub end: Endpoint,
}

impl Route {
    /// Build the route from GeoJSON ordered pairs, `[longitude, latitude]`
    pub fn from_lon_lat(
        coordinates: &[[f64; 2]],
        distance: f64,
        duration: f64,
        start: Endpoint,
        end: Endpoint,
    ) -> Self {
        let line = coordinates
            .iter()
            .map(|[lng, lat]| Coord { x: *lng, y: *lat })
            .collect::<Vec<_>>()
            .into();

        Self {
            line,
            distance,
            duration,
            start,
            end,
        }
    }

    pub fn points(&self) -> Vec<Point> {
        self.line.points().collect()
    }
}
