//! Route summary for display

use std::fmt;

use super::matcher::MatchedRadar;
use super::Route;

/// Figures shown once a route is computed
#[derive(Clone, Debug, PartialEq)]
pub struct RouteSummary {
    pub distance: String,
    pub duration: String,
    pub radars: usize,
}

impl RouteSummary {
    pub fn new(route: &Route, radars: &[MatchedRadar]) -> Self {
        Self {
            distance: format_distance(route.distance),
            duration: format_duration(route.duration),
            radars: radars.len(),
        }
    }
}

impl fmt::Display for RouteSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} - {} radar(s)",
            self.distance, self.duration, self.radars
        )
    }
}

/// Kilometers from 1 km, meters below
pub fn format_distance(meters: f64) -> String {
    if meters >= 1000.0 {
        format!("{} km", (meters / 1000.0).round() as u64)
    } else {
        format!("{} m", meters.round().max(0.0) as u64)
    }
}

/// `1h05` from one hour, `42 min` below
pub fn format_duration(seconds: f64) -> String {
    let seconds = seconds.max(0.0) as u64;
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;

    if hours > 0 {
        format!("{}h{:02}", hours, minutes)
    } else {
        format!("{} min", minutes)
    }
}
