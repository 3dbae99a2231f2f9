//! GPX export of a computed route

use gpx::{Gpx, GpxVersion, Track, TrackSegment, Waypoint};

use super::matcher::MatchedRadar;
use super::Route;

pub struct RouteGpx<'a> {
    pub route: &'a Route,
    /// Radars on the route, already ordered
    pub radars: &'a [MatchedRadar],
}

impl<'a> RouteGpx<'a> {
    pub fn new(route: &'a Route, radars: &'a [MatchedRadar]) -> Self {
        Self { route, radars }
    }

    /// Track of the route, ends and radars as waypoints
    pub fn generate(self) -> Result<Gpx, String> {
        let mut gpx: Gpx = Default::default();
        gpx.version = GpxVersion::Gpx11;
        gpx.creator = Some("radarroute".to_string());

        let mut track = Track::new();
        track.name = Some(format!("{} - {}", self.route.start.label, self.route.end.label));
        track.description = Some(format!("{} radar(s) on the route", self.radars.len()));

        let mut segment = TrackSegment::new();
        for point in self.route.line.points() {
            segment.points.push(Waypoint::new(point));
        }
        track.segments.push(segment);
        gpx.tracks.push(track);

        let mut start = Waypoint::new(self.route.start.point);
        start.name = Some("A".to_string());
        start.description = Some(self.route.start.label.clone());
        gpx.waypoints.push(start);

        for (idx, matched) in self.radars.iter().enumerate() {
            let point = matched
                .radar
                .point()
                .ok_or_else(|| format!("Radar #{} without coordinates", idx + 1))?;

            let mut wp = Waypoint::new(point);
            wp.name = Some(format!("{}. {}", idx + 1, matched.radar.display_name()));
            wp.description = Some(match matched.radar.speed_limit {
                Some(speed) => format!(
                    "{} - {} km/h - {} m from the route",
                    matched.radar.kind.label(),
                    speed,
                    matched.distance_from_route
                ),
                None => format!(
                    "{} - {} m from the route",
                    matched.radar.kind.label(),
                    matched.distance_from_route
                ),
            });
            wp.source = matched.radar.number.clone();
            gpx.waypoints.push(wp);
        }

        let mut end = Waypoint::new(self.route.end.point);
        end.name = Some("B".to_string());
        end.description = Some(self.route.end.label.clone());
        gpx.waypoints.push(end);

        Ok(gpx)
    }
}
