//! Mongodb source integration

use bson::{doc, Bson, Document};
use log::info;
use mongodb::sync::Collection;
use time::macros::format_description;

use super::{FieldsConfiguration, RadarsSource};
use crate::{Radar, RadarType};

/// MongoDB radars source
pub struct MongoDbSource {
    collection: Collection<Document>,
    fields: FieldsConfiguration,
}

impl MongoDbSource {
    pub fn new(collection: Collection<Document>, fields: Option<FieldsConfiguration>) -> Self {
        Self {
            collection,
            fields: match fields {
                Some(f) => f,
                None => FieldsConfiguration::default(),
            },
        }
    }
}

impl RadarsSource for MongoDbSource {
    fn fetch(&mut self) -> Result<Vec<Radar>, String> {
        let mut radars = vec![];

        let cursor = self
            .collection
            .find(doc! {}, None)
            .map_err(|e| format!("Failed on fetch the docs: {}", e.to_string()))?;

        for rdoc in cursor {
            let doc = rdoc.map_err(|e| format!("Failed on read some doc: {}", e.to_string()))?;

            let radar = match parse_doc(&self.fields, &doc) {
                Ok(radar) => Ok(radar),
                Err(e) => Err(format!("Error with doc {0}: {1}", doc, e)),
            }?;

            radars.push(radar);
        }

        info!("{} radars loaded from mongodb", radars.len());

        Ok(radars)
    }
}

/// Value of the first field present in the doc
fn lookup<'a>(doc: &'a Document, fields: &[String]) -> Option<&'a Bson> {
    fields.iter().find_map(|f| doc.get(f))
}

fn number(doc: &Document, fields: &[String]) -> Option<f64> {
    match lookup(doc, fields) {
        Some(Bson::Double(n)) => Some(*n),
        Some(Bson::Int32(n)) => Some(*n as f64),
        Some(Bson::Int64(n)) => Some(*n as f64),
        Some(Bson::String(s)) => s.trim().trim_start_matches('+').parse::<f64>().ok(),
        _ => None,
    }
}

fn text(doc: &Document, fields: &[String]) -> Option<String> {
    match lookup(doc, fields) {
        Some(Bson::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Bson::Int32(n)) => Some(n.to_string()),
        Some(Bson::Int64(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_doc(fields: &FieldsConfiguration, doc: &Document) -> Result<Radar, String> {
    let kind = match lookup(doc, &fields.kind) {
        Some(Bson::String(k)) => Ok(RadarType::from(k.as_str())),
        Some(_) => Err("Type field type not supported"),
        None => Err("Type field not found"),
    }?;

    let id = match lookup(doc, &fields.id) {
        Some(Bson::Int32(i)) => Some(*i as i64),
        Some(Bson::Int64(i)) => Some(*i),
        _ => None,
    };

    let commissioned = match lookup(doc, &fields.commissioned) {
        Some(Bson::DateTime(dt)) => Some(
            dt.to_time_0_3()
                .date()
                .format(format_description!("[year]-[month]-[day]"))
                .map_err(|e| format!("Failed on format the commissioning date: {}", e.to_string()))?,
        ),
        _ => text(doc, &fields.commissioned),
    };

    // missing coordinates are kept, the matcher ignores them
    Ok(Radar {
        id,
        number: text(doc, &fields.number),
        kind,
        latitude: number(doc, &fields.latitude),
        longitude: number(doc, &fields.longitude),
        speed_limit: number(doc, &fields.speed)
            .filter(|s| *s >= 0.0)
            .map(|s| s as u32),
        lane: text(doc, &fields.lane),
        direction: text(doc, &fields.direction),
        commissioned,
        location: text(doc, &fields.location),
    })
}

#[cfg(test)]
pub mod tests {
    use bson::{doc, DateTime, Document};
    use mongodb::sync::Client;
    use time::macros::{date, datetime};

    use super::{parse_doc, MongoDbSource};
    use crate::{FieldsConfiguration, RadarType, RadarsSource};

    #[test]
    fn doc_fields_types() -> Result<(), String> {
        let fields = FieldsConfiguration::default();

        let radar = parse_doc(
            &fields,
            &doc! { "id": 7_i64, "type": "ETFR", "latitude": 48.85, "longitude": 2, "speed": 50,
                "commissioned": DateTime::from_time_0_3(datetime!(2015-06-01 0:00 UTC)) },
        )?;
        assert_eq!(Some(7), radar.id);
        assert_eq!(RadarType::RedLight, radar.kind);
        assert_eq!(Some(2.0), radar.longitude);
        assert_eq!(Some(50), radar.speed_limit);
        assert_eq!(Some(date!(2015-06-01)), radar.commissioning_date());

        let radar = parse_doc(
            &fields,
            &doc! { "numero": "0123", "type": "ETD", "latitude": "+48.85", "vitesse": 110 },
        )?;
        assert_eq!(Some("0123".to_string()), radar.number);
        assert_eq!(Some(110), radar.speed_limit);
        assert_eq!(Some(48.85), radar.latitude);
        assert!(radar.point().is_none());

        assert!(parse_doc(&fields, &doc! { "latitude": 48.85 }).is_err());
        assert!(parse_doc(&fields, &doc! { "type": 3 }).is_err());

        Ok(())
    }

    #[test]
    #[ignore = "needs a mongod on localhost:27017"]
    fn mongo_radars() -> Result<(), String> {
        let client = Client::with_uri_str("mongodb://localhost:27017").map_err(|e| e.to_string())?;
        let db = client.database("radarroute_tests");
        let collection = db.collection::<Document>("radars");
        collection.drop(None).map_err(|e| e.to_string())?;

        let docs = vec![
            doc! { "id": 1, "type": "ETD", "latitude": 48.85, "longitude": 2.35, "speed": 90 },
            doc! { "id": 2, "type": "ETT", "latitude": 48.86, "longitude": 2.36 },
            doc! { "id": 3, "type": "ETU" },
        ];
        collection.insert_many(docs, None).map_err(|e| e.to_string())?;

        let radars = MongoDbSource::new(collection, None).fetch()?;
        assert_eq!(3, radars.len());
        assert_eq!(Some(90), radars[0].speed_limit);
        assert!(radars[2].point().is_none());

        Ok(())
    }

    #[test]
    #[ignore = "needs a mongod on localhost:27017"]
    fn mongo_radars_custom_fields() -> Result<(), String> {
        let client = Client::with_uri_str("mongodb://localhost:27017").map_err(|e| e.to_string())?;
        let db = client.database("radarroute_tests");
        let collection = db.collection::<Document>("radars_fr");
        collection.drop(None).map_err(|e| e.to_string())?;

        let docs = vec![
            doc! { "Type": "ETVM", "Latitude": 48.85, "Longitude": 2.35, "Vitesse": 110 },
        ];
        collection.insert_many(docs, None).map_err(|e| e.to_string())?;

        let fields = FieldsConfiguration::default()
            .kind("Type")
            .coordinates("Latitude", "Longitude")
            .speed("Vitesse");
        let radars = MongoDbSource::new(collection, Some(fields)).fetch()?;
        assert_eq!(1, radars.len());
        assert_eq!(RadarType::AverageSpeed, radars[0].kind);
        assert_eq!(Some(110), radars[0].speed_limit);

        Ok(())
    }
}
