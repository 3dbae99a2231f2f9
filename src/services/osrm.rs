//! OSRM driving routes

use serde::Deserialize;

use crate::{Endpoint, Route};

#[derive(Debug, Deserialize)]
struct RouteResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: Geometry,
    distance: f64,
    duration: f64,
}

/// GeoJSON line, `[longitude, latitude]` pairs
#[derive(Debug, Deserialize)]
struct Geometry {
    coordinates: Vec<[f64; 2]>,
}

/// Route path for the two ends, longitude first
pub fn route_path(start: &Endpoint, end: &Endpoint) -> String {
    format!(
        "{},{};{},{}?overview=full&geometries=geojson",
        start.longitude(),
        start.latitude(),
        end.longitude(),
        end.latitude()
    )
}

/// First route of a route service response
pub fn parse_route_response(body: &str, start: Endpoint, end: Endpoint) -> Result<Route, String> {
    let response: RouteResponse = serde_json::from_str(body)
        .map_err(|e| format!("Failed on parse the route response: {}", e.to_string()))?;

    if response.code != "Ok" {
        return Err(format!("Failed on compute the route: {}", response.code));
    }

    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or("Failed on compute the route: no route found")?;

    Ok(Route::from_lon_lat(
        &route.geometry.coordinates,
        route.distance,
        route.duration,
        start,
        end,
    ))
}

#[cfg(feature = "http")]
pub use client::OsrmRouter;

#[cfg(feature = "http")]
mod client {
    use log::debug;
    use reqwest::blocking::Client;

    use super::{parse_route_response, route_path};
    use crate::services::{RouteProvider, ServicesConfiguration};
    use crate::{Endpoint, Route};

    /// OSRM route API client
    pub struct OsrmRouter {
        client: Client,
        url: String,
    }

    impl OsrmRouter {
        pub fn new(config: &ServicesConfiguration) -> Result<Self, String> {
            let client = Client::builder()
                .user_agent(config.user_agent.clone())
                .build()
                .map_err(|e| format!("Failed on build the http client: {}", e.to_string()))?;

            Ok(Self {
                client,
                url: config.osrm_url.clone(),
            })
        }
    }

    impl RouteProvider for OsrmRouter {
        fn route(&self, start: &Endpoint, end: &Endpoint) -> Result<Route, String> {
            let url = format!("{}{}", self.url, route_path(start, end));

            debug!("Routing {}", url);
            // error statuses still carry a json body with the failure code
            let body = self
                .client
                .get(&url)
                .send()
                .and_then(|r| r.text())
                .map_err(|e| format!("Failed on request the route: {}", e.to_string()))?;

            parse_route_response(&body, start.clone(), end.clone())
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::{parse_route_response, route_path};
    use crate::Endpoint;

    fn ends() -> (Endpoint, Endpoint) {
        (
            Endpoint::new(48.85, 2.35, "Paris".to_string()),
            Endpoint::new(45.76, 4.83, "Lyon".to_string()),
        )
    }

    #[test]
    fn path() {
        let (start, end) = ends();

        assert_eq!(
            "2.35,48.85;4.83,45.76?overview=full&geometries=geojson",
            route_path(&start, &end)
        );
    }

    #[test]
    fn route() -> Result<(), String> {
        let (start, end) = ends();
        let body = r#"{
            "code": "Ok",
            "routes": [{
                "geometry": {"type": "LineString", "coordinates": [[2.35, 48.85], [3.1, 47.2], [4.83, 45.76]]},
                "distance": 465123.4, "duration": 16320.5, "weight": 16320.5
            }],
            "waypoints": []
        }"#;

        let route = parse_route_response(body, start, end)?;
        let points = route.points();
        assert_eq!(3, points.len());
        assert_eq!(2.35, points[0].x());
        assert_eq!(48.85, points[0].y());
        assert_eq!(465123.4, route.distance);
        assert_eq!(16320.5, route.duration);
        assert_eq!("Lyon", route.end.label);

        Ok(())
    }

    #[test]
    fn no_route() {
        let (start, end) = ends();

        let res = parse_route_response(r#"{"code": "NoRoute", "message": "Impossible route"}"#, start.clone(), end.clone());
        assert_eq!(Err("Failed on compute the route: NoRoute".to_string()), res);

        let res = parse_route_response(r#"{"code": "Ok", "routes": []}"#, start, end);
        assert!(res.is_err());
    }
}
