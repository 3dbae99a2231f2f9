//! Nominatim geocoding

use serde::Deserialize;

use crate::Endpoint;

/// Search API hit, coordinates are strings
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
    display_name: String,
}

/// First place of a search response, `None` when nothing was found
pub fn parse_search_response(body: &str) -> Result<Option<Endpoint>, String> {
    let places: Vec<Place> = serde_json::from_str(body)
        .map_err(|e| format!("Failed on parse the geocoding response: {}", e.to_string()))?;

    let place = match places.into_iter().next() {
        Some(p) => p,
        None => return Ok(None),
    };

    let lat = place
        .lat
        .parse::<f64>()
        .map_err(|e| format!("Invalid latitude format: {}", e.to_string()))?;
    let lng = place
        .lon
        .parse::<f64>()
        .map_err(|e| format!("Invalid longitude format: {}", e.to_string()))?;

    let label = place
        .display_name
        .split(',')
        .take(2)
        .collect::<Vec<_>>()
        .join(",");

    Ok(Some(Endpoint::new(lat, lng, label)))
}

#[cfg(feature = "http")]
pub use client::NominatimGeocoder;

#[cfg(feature = "http")]
mod client {
    use log::debug;
    use reqwest::blocking::Client;

    use super::parse_search_response;
    use crate::services::{parse_coordinates, Geocoder, ServicesConfiguration};
    use crate::Endpoint;

    /// Nominatim search API client
    pub struct NominatimGeocoder {
        client: Client,
        url: String,
        country_codes: String,
    }

    impl NominatimGeocoder {
        pub fn new(config: &ServicesConfiguration) -> Result<Self, String> {
            let client = Client::builder()
                .user_agent(config.user_agent.clone())
                .build()
                .map_err(|e| format!("Failed on build the http client: {}", e.to_string()))?;

            Ok(Self {
                client,
                url: config.nominatim_url.clone(),
                country_codes: config.country_codes.clone(),
            })
        }
    }

    impl Geocoder for NominatimGeocoder {
        fn geocode(&self, query: &str) -> Result<Endpoint, String> {
            if let Some(endpoint) = parse_coordinates(query) {
                return Ok(endpoint);
            }

            let mut params = vec![("q", query), ("format", "json"), ("limit", "1")];
            if !self.country_codes.is_empty() {
                params.push(("countrycodes", self.country_codes.as_str()));
            }

            debug!("Geocoding `{}`", query);
            let body = self
                .client
                .get(&self.url)
                .query(&params)
                .send()
                .and_then(|r| r.error_for_status())
                .and_then(|r| r.text())
                .map_err(|e| format!("Failed on geocode `{}`: {}", query, e.to_string()))?;

            parse_search_response(&body)?.ok_or_else(|| format!("Address not found: {}", query))
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::parse_search_response;

    #[test]
    fn first_place() -> Result<(), String> {
        let body = r#"[
            {"place_id": 1, "lat": "48.8588897", "lon": "2.3200410", "display_name": "Paris, Île-de-France, France métropolitaine, France"},
            {"place_id": 2, "lat": "33.66", "lon": "-95.55", "display_name": "Paris, Lamar County, Texas, United States"}
        ]"#;

        let endpoint = parse_search_response(body)?.ok_or("no place")?;
        assert_eq!(48.8588897, endpoint.latitude());
        assert_eq!(2.3200410, endpoint.longitude());
        assert_eq!("Paris, Île-de-France", endpoint.label);

        Ok(())
    }

    #[test]
    fn nothing_found() -> Result<(), String> {
        assert_eq!(None, parse_search_response("[]")?);
        assert!(parse_search_response("{\"error\": 1}").is_err());

        Ok(())
    }
}
