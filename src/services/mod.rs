//! External geocoding and routing services

use serde::Deserialize;

use crate::{Endpoint, Route};

pub mod nominatim;
pub mod osrm;

/// Turns a place name into a position
pub trait Geocoder {
    fn geocode(&self, query: &str) -> Result<Endpoint, String>;
}

/// Computes a driving route between two positions
pub trait RouteProvider {
    fn route(&self, start: &Endpoint, end: &Endpoint) -> Result<Route, String>;
}

/// Services endpoints and identification
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServicesConfiguration {
    /// OSRM driving route API, coordinates are appended
    pub osrm_url: String,
    /// Nominatim search API
    pub nominatim_url: String,
    /// Countries the geocoding is restricted to, empty for none
    pub country_codes: String,
    pub user_agent: String,
}

impl Default for ServicesConfiguration {
    fn default() -> Self {
        Self {
            osrm_url: "https://router.project-osrm.org/route/v1/driving/".to_string(),
            nominatim_url: "https://nominatim.openstreetmap.org/search".to_string(),
            country_codes: "fr".to_string(),
            user_agent: concat!("radarroute/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Position typed as `lat,lon`, no lookup needed
pub fn parse_coordinates(input: &str) -> Option<Endpoint> {
    let (lat, lng) = input.trim().split_once(',')?;
    let (lat, lng) = (lat.trim(), lng.trim());

    if !is_decimal(lat) || !is_decimal(lng) {
        return None;
    }

    Some(Endpoint::new(
        lat.parse().ok()?,
        lng.parse().ok()?,
        format!("{}, {}", lat, lng),
    ))
}

/// `-12`, `12.`, `12.34`
fn is_decimal(s: &str) -> bool {
    let unsigned = s.strip_prefix('-').unwrap_or(s);
    let (int, frac) = match unsigned.split_once('.') {
        Some((int, frac)) => (int, frac),
        None => (unsigned, ""),
    };

    !int.is_empty()
        && int.chars().all(|c| c.is_ascii_digit())
        && frac.chars().all(|c| c.is_ascii_digit())
}
