//! Radars sources API

use std::io::Read;

use log::info;
use serde::{Deserialize, Deserializer};

use crate::Radar;

/// Radars snapshot source
pub trait RadarsSource {
    /// Fetch every radar of the source
    fn fetch(&mut self) -> Result<Vec<Radar>, String>;
}

/// Names of the radar fields in the source, the first one found is used.
///
/// Each field takes a name or a list of names. The defaults cover the API
/// names and the official data.gouv.fr CSV headers.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct FieldsConfiguration {
    #[serde(deserialize_with = "one_or_many")]
    pub id: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub number: Vec<String>,
    #[serde(rename = "type", deserialize_with = "one_or_many")]
    pub kind: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub latitude: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub longitude: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub speed: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub lane: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub direction: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub commissioned: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub location: Vec<String>,
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|n| n.to_string()).collect()
}

impl Default for FieldsConfiguration {
    fn default() -> Self {
        Self {
            id: names(&["id"]),
            number: names(&["number", "numero", "Numéro", "Numéro de radar"]),
            kind: names(&["type"]),
            latitude: names(&["latitude"]),
            longitude: names(&["longitude"]),
            speed: names(&["speed", "vitesse"]),
            lane: names(&["lane", "voie"]),
            direction: names(&["direction", "sens"]),
            commissioned: names(&["commissioned", "date_mise_service", "Date de mise en service"]),
            location: names(&["location", "emplacement"]),
        }
    }
}

impl FieldsConfiguration {
    pub fn kind(mut self, name: &str) -> Self {
        self.kind = names(&[name]);
        self
    }

    pub fn coordinates(mut self, latitude: &str, longitude: &str) -> Self {
        self.latitude = names(&[latitude]);
        self.longitude = names(&[longitude]);
        self
    }

    pub fn speed(mut self, name: &str) -> Self {
        self.speed = names(&[name]);
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(name) => vec![name],
        OneOrMany::Many(list) => list,
    })
}

/// Radars API body: a bare list or a page of radars
#[derive(Deserialize)]
#[serde(untagged)]
enum RadarsPayload {
    Page { data: Vec<Radar> },
    List(Vec<Radar>),
}

/// JSON source, as served by the radars API
pub struct JsonSource<T>
where
    T: Read,
{
    rdr: Option<T>,
}

impl<T> JsonSource<T>
where
    T: Read,
{
    pub fn new(rdr: T) -> Self {
        Self { rdr: Some(rdr) }
    }
}

impl<T> RadarsSource for JsonSource<T>
where
    T: Read,
{
    fn fetch(&mut self) -> Result<Vec<Radar>, String> {
        let rdr = self.rdr.take().ok_or("JSON source already consumed")?;

        let payload: RadarsPayload = serde_json::from_reader(rdr)
            .map_err(|e| format!("Failed on parse the radars: {}", e.to_string()))?;

        let radars = match payload {
            RadarsPayload::Page { data } => data,
            RadarsPayload::List(list) => list,
        };
        info!("{} radars loaded from JSON", radars.len());

        Ok(radars)
    }
}

#[cfg(feature = "csv")]
mod csv_file;

#[cfg(feature = "csv")]
pub use csv_file::CsvSource;

#[cfg(feature = "mongo")]
mod mongo;

#[cfg(feature = "mongo")]
pub use mongo::MongoDbSource;
