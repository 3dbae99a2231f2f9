//! radarroute - Speed cameras along driving routes

pub mod radar;
pub mod route;
pub mod services;
pub mod sources;
mod planner;

pub use planner::{RoutePlan, RoutePlanner};
pub use radar::filter::{find_by_id, paginate, radar_types, RadarFilter, RadarPage};
pub use radar::stats::{RadarStats, TypeDistribution};
pub use radar::{Radar, RadarType};
pub use route::distance::{haversine_distance, EARTH_RADIUS};
pub use route::gpx::RouteGpx;
pub use route::matcher::{MatchedRadar, RadarMatcher, DETECTION_RADIUS};
pub use route::summary::{format_distance, format_duration, RouteSummary};
pub use route::{Endpoint, Route};
pub use services::{Geocoder, RouteProvider, ServicesConfiguration};
pub use sources::{FieldsConfiguration, JsonSource, RadarsSource};
