//! Radar records definition

use std::fmt;

use geo::geometry::Point;
use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::Date;

pub mod filter;
pub mod stats;


/// Category of an enforcement device
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RadarType {
    /// Discriminating fixed radar (cars and trucks)
    Discriminating,
    /// Red light radar
    RedLight,
    /// Level crossing radar
    LevelCrossing,
    /// New generation fixed radar
    NewGeneration,
    /// New generation urban radar
    Urban,
    /// Average speed (section control) radar
    AverageSpeed,
    /// Any category out of the catalogue, kept as is
    Other(String),
}

impl RadarType {
    pub fn code(&self) -> &str {
        match self {
            RadarType::Discriminating => "ETD",
            RadarType::RedLight => "ETFR",
            RadarType::LevelCrossing => "ETPN",
            RadarType::NewGeneration => "ETT",
            RadarType::Urban => "ETU",
            RadarType::AverageSpeed => "ETVM",
            RadarType::Other(code) => code,
        }
    }

    /// Display name, the raw code when unknown
    pub fn label(&self) -> &str {
        match self {
            RadarType::Discriminating => "Fixe Discriminant",
            RadarType::RedLight => "Feu Rouge",
            RadarType::LevelCrossing => "Passage à Niveau",
            RadarType::NewGeneration => "Nouvelle Génération",
            RadarType::Urban => "NG Urbain",
            RadarType::AverageSpeed => "Tronçon (Vitesse Moy.)",
            RadarType::Other(code) => code,
        }
    }
}

impl From<&str> for RadarType {
    fn from(code: &str) -> Self {
        match code.trim() {
            "ETD" => RadarType::Discriminating,
            "ETFR" => RadarType::RedLight,
            "ETPN" => RadarType::LevelCrossing,
            "ETT" => RadarType::NewGeneration,
            "ETU" => RadarType::Urban,
            "ETVM" => RadarType::AverageSpeed,
            other => RadarType::Other(other.to_string()),
        }
    }
}

impl From<String> for RadarType {
    fn from(code: String) -> Self {
        RadarType::from(code.as_str())
    }
}

impl From<RadarType> for String {
    fn from(kind: RadarType) -> Self {
        kind.code().to_string()
    }
}

impl fmt::Display for RadarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Speed camera record, as served by the radars API.
///
/// Serialized with the API field names, the english names are accepted on read.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Radar {
    #[serde(default)]
    pub id: Option<i64>,
    /// Official device number
    #[serde(default, rename = "numero", alias = "number")]
    pub number: Option<String>,
    #[serde(rename = "type")]
    pub kind: RadarType,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Controlled speed in km/h
    #[serde(default, rename = "vitesse", alias = "speed_limit", alias = "speed")]
    pub speed_limit: Option<u32>,
    #[serde(default, rename = "voie", alias = "lane")]
    pub lane: Option<String>,
    #[serde(default, rename = "sens", alias = "direction")]
    pub direction: Option<String>,
    /// Commissioning date, as provided by the source
    #[serde(default, rename = "date_mise_service", alias = "commissioned")]
    pub commissioned: Option<String>,
    /// Free text location, absent from the API records
    #[serde(
        default,
        rename = "emplacement",
        alias = "location",
        skip_serializing_if = "Option::is_none"
    )]
    pub location: Option<String>,
}

impl Radar {
    pub fn basic(kind: RadarType, latitude: f64, longitude: f64) -> Self {
        Self {
            id: None,
            number: None,
            kind,
            latitude: Some(latitude),
            longitude: Some(longitude),
            speed_limit: None,
            lane: None,
            direction: None,
            commissioned: None,
            location: None,
        }
    }

    /// Position of the radar, when both coordinates are usable
    pub fn point(&self) -> Option<Point> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng))
                if lat.is_finite()
                    && lng.is_finite()
                    && lat.abs() <= 90.0
                    && lng.abs() <= 180.0 =>
            {
                Some(Point::new(lng, lat))
            }
            _ => None,
        }
    }

    pub fn commissioning_date(&self) -> Option<Date> {
        let raw = self.commissioned.as_deref()?.trim();

        Date::parse(raw, format_description!("[year]-[month]-[day]"))
            .or_else(|_| Date::parse(raw, format_description!("[day]/[month]/[year]")))
            .ok()
    }

    /// Best human name for the radar: location, lane or its category
    pub fn display_name(&self) -> String {
        [&self.location, &self.lane]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| self.kind.label().to_string())
    }
}
