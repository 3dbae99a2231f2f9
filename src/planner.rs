//! Route planning over a radars snapshot

use gpx::Gpx;
use log::info;

use crate::radar::filter::RadarFilter;
use crate::route::gpx::RouteGpx;
use crate::route::matcher::{MatchedRadar, RadarMatcher};
use crate::route::summary::RouteSummary;
use crate::services::{Geocoder, RouteProvider};
use crate::{Radar, Route};

/// Computed route and the radars found on it
#[derive(Clone, Debug, PartialEq)]
pub struct RoutePlan {
    pub route: Route,
    /// Ordered by position along the route
    pub radars: Vec<MatchedRadar>,
}

impl RoutePlan {
    pub fn summary(&self) -> RouteSummary {
        RouteSummary::new(&self.route, &self.radars)
    }

    pub fn gpx(&self) -> Result<Gpx, String> {
        RouteGpx::new(&self.route, &self.radars).generate()
    }
}

/// Planning state: the radars snapshot and the last computed route
pub struct RoutePlanner {
    radars: Vec<Radar>,
    matcher: RadarMatcher,
    current: Option<RoutePlan>,
}

impl RoutePlanner {
    pub fn new(radars: Vec<Radar>) -> Self {
        Self {
            radars,
            matcher: RadarMatcher::new(),
            current: None,
        }
    }

    /// Detection radius in meters
    pub fn radius(&mut self, radius: f64) -> &mut Self {
        self.matcher.radius(radius);

        self
    }

    pub fn radars(&self) -> &[Radar] {
        &self.radars
    }

    pub fn current(&self) -> Option<&RoutePlan> {
        self.current.as_ref()
    }

    /// Radars to show on the map
    pub fn visible(&self, filter: &RadarFilter) -> Vec<&Radar> {
        filter.apply(&self.radars)
    }

    /// Geocode both places, compute the route and find its radars.
    ///
    /// The new plan replaces the current one, which is kept on failure.
    pub fn calculate<G, R>(
        &mut self,
        geocoder: &G,
        router: &R,
        start: &str,
        end: &str,
    ) -> Result<&RoutePlan, String>
    where
        G: Geocoder + ?Sized,
        R: RouteProvider + ?Sized,
    {
        let (start, end) = (start.trim(), end.trim());
        if start.is_empty() || end.is_empty() {
            return Err("Start and end places are required".to_string());
        }

        let start = geocoder.geocode(start)?;
        let end = geocoder.geocode(end)?;

        let route = router.route(&start, &end)?;
        let radars = self.matcher.find(&route.points(), &self.radars);

        info!(
            "Route {} -> {}: {} radars on {:.0} m",
            route.start.label,
            route.end.label,
            radars.len(),
            route.distance
        );

        Ok(&*self.current.insert(RoutePlan { route, radars }))
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}
