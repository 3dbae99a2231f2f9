//! CSV file source integration

use std::io::Read;

use csv::{ByteRecord, Reader};
use log::{debug, info, warn};

use super::{FieldsConfiguration, RadarsSource};
use crate::{Radar, RadarType};

/// CSV radars source, UTF-8 or Latin-1 encoded
pub struct CsvSource<T>
where
    T: Read,
{
    rdr: Reader<T>,
    fields: FieldsConfiguration,
}

impl<T> CsvSource<T>
where
    T: Read,
{
    pub fn new(rdr: Reader<T>, fields: Option<FieldsConfiguration>) -> Self {
        Self {
            rdr,
            fields: match fields {
                Some(f) => f,
                None => FieldsConfiguration::default(),
            },
        }
    }
}

impl<T> RadarsSource for CsvSource<T>
where
    T: Read,
{
    fn fetch(&mut self) -> Result<Vec<Radar>, String> {
        let mut radars = vec![];
        let mut ignored = 0;

        let header = self
            .rdr
            .byte_headers()
            .map_err(|e| format!("Failed on read the header: {}", e.to_string()))?
            .clone();
        let header_idx = parse_header(&self.fields, &header)?;
        debug!("CSV columns: {:?}", header_idx);

        let mut recs = self.rdr.byte_records();
        while let Some(row) = recs.next() {
            let rec = row.map_err(|e| format!("Failed on read some row: {}", e.to_string()))?;

            if rec.iter().all(|f| decode(f).trim().is_empty()) {
                continue;
            }

            match parse_row(&header_idx, &rec) {
                Some(mut radar) => {
                    if header_idx.id.is_none() {
                        radar.id = Some(radars.len() as i64 + 1);
                    }
                    radars.push(radar);
                }
                None => {
                    ignored += 1;
                    if ignored <= 10 {
                        warn!(
                            "Line {:?} ignored: invalid coordinates",
                            rec.position().map(|p| p.line())
                        );
                    }
                }
            }
        }

        info!("{} radars loaded, {} rows ignored", radars.len(), ignored);

        Ok(radars)
    }
}

/// Field to index map
#[derive(Debug)]
struct FieldsIndex {
    kind: usize,
    latitude: usize,
    longitude: usize,
    id: Option<usize>,
    number: Option<usize>,
    speed: Option<usize>,
    lane: Option<usize>,
    direction: Option<usize>,
    commissioned: Option<usize>,
    location: Option<usize>,
}

/// Field text, Latin-1 when not valid UTF-8
fn decode(field: &[u8]) -> String {
    match std::str::from_utf8(field) {
        Ok(s) => s.to_string(),
        Err(_) => field.iter().map(|b| *b as char).collect(),
    }
}

fn parse_header(fields: &FieldsConfiguration, header: &ByteRecord) -> Result<FieldsIndex, String> {
    let names: Vec<String> = header
        .iter()
        .map(|h| decode(h).trim().trim_start_matches('\u{feff}').to_lowercase())
        .collect();

    let position = |accepted: &[String]| {
        accepted.iter().find_map(|field| {
            let field = field.trim().to_lowercase();
            names.iter().position(|h| *h == field)
        })
    };

    let kind = match position(&fields.kind) {
        Some(p) => Ok(p),
        None => Err("Type header not found"),
    }?;

    let latitude = match position(&fields.latitude) {
        Some(p) => Ok(p),
        None => Err("Latitude header not found"),
    }?;

    let longitude = match position(&fields.longitude) {
        Some(p) => Ok(p),
        None => Err("Longitude header not found"),
    }?;

    Ok(FieldsIndex {
        kind,
        latitude,
        longitude,
        id: position(&fields.id),
        number: position(&fields.number),
        speed: position(&fields.speed),
        lane: position(&fields.lane),
        direction: position(&fields.direction),
        commissioned: position(&fields.commissioned),
        location: position(&fields.location),
    })
}

fn parse_row(header: &FieldsIndex, row: &ByteRecord) -> Option<Radar> {
    let text = |idx: Option<usize>| -> Option<String> {
        let value = decode(row.get(idx?)?);
        let value = value.trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    };

    let coordinate = |idx: usize| -> Option<f64> {
        text(Some(idx))?.trim_start_matches('+').parse::<f64>().ok()
    };

    let lat = coordinate(header.latitude)?;
    let lng = coordinate(header.longitude)?;

    let kind = RadarType::from(text(Some(header.kind)).unwrap_or_default());
    let mut radar = Radar::basic(kind, lat, lng);

    radar.id = text(header.id).and_then(|s| s.parse::<i64>().ok());
    radar.number = text(header.number);
    radar.speed_limit = text(header.speed).and_then(|s| s.parse::<u32>().ok());
    radar.lane = text(header.lane);
    radar.direction = text(header.direction);
    radar.commissioned = text(header.commissioned);
    radar.location = text(header.location);

    Some(radar)
}

#[cfg(test)]
pub mod tests {
    use csv::ReaderBuilder;
    use geo::geometry::Point;

    use super::CsvSource;
    use crate::{FieldsConfiguration, RadarType, RadarsSource};

    #[test]
    fn radars() -> Result<(), String> {
        let data = "id,type,latitude,longitude,speed,lane,direction\n\
            1,ETD,48.85,2.35,90,A6,Paris vers Lyon\n\
            2,ETFR,+48.86,+2.36,50,,\n\
            3,ETVM,48.87,2.37,,N118,\n";
        let rdr = ReaderBuilder::new()
            .flexible(true)
            .from_reader(data.as_bytes());

        let radars = CsvSource::new(rdr, None).fetch()?;
        assert_eq!(3, radars.len());

        let first = &radars[0];
        assert_eq!(Some(1), first.id);
        assert_eq!(RadarType::Discriminating, first.kind);
        assert_eq!(Some(Point::new(2.35, 48.85)), first.point());
        assert_eq!(Some(90), first.speed_limit);
        assert_eq!(Some("A6".to_string()), first.lane);
        assert_eq!(Some("Paris vers Lyon".to_string()), first.direction);

        assert_eq!(Some(Point::new(2.36, 48.86)), radars[1].point());
        assert_eq!(None, radars[1].lane);
        assert_eq!(None, radars[2].speed_limit);

        Ok(())
    }

    #[test]
    fn skip_invalid_coordinates() -> Result<(), String> {
        let data = "type,latitude,longitude\n\
            ETD,48.85,2.35\n\
            ETD,,2.35\n\
            ETD,abc,2.35\n\
            \n\
            ETT,48.86,2.36\n";
        let rdr = ReaderBuilder::new()
            .flexible(true)
            .from_reader(data.as_bytes());

        let radars = CsvSource::new(rdr, None).fetch()?;
        assert_eq!(2, radars.len());
        assert_eq!(Some(1), radars[0].id);
        assert_eq!(Some(2), radars[1].id);
        assert_eq!(RadarType::NewGeneration, radars[1].kind);

        Ok(())
    }

    #[test]
    fn custom_fields_latin1() -> Result<(), String> {
        let mut data: Vec<u8> = vec![];
        data.extend_from_slice(b"Num\xe9ro de radar;Type;Latitude;Longitude;Vitesse;Voie\n");
        data.extend_from_slice(b"0123;ETU;48.85;2.35;30;Rue de l'\xc9glise\n");

        let rdr = ReaderBuilder::new()
            .delimiter(b';')
            .from_reader(data.as_slice());

        let mut fields = FieldsConfiguration::default()
            .kind("Type")
            .coordinates("Latitude", "Longitude")
            .speed("Vitesse");
        fields.number = vec!["Numéro de radar".to_string()];
        fields.lane = vec!["Voie".to_string()];

        let radars = CsvSource::new(rdr, Some(fields)).fetch()?;
        assert_eq!(1, radars.len());
        assert_eq!(Some("0123".to_string()), radars[0].number);
        assert_eq!(Some(30), radars[0].speed_limit);
        assert_eq!(Some("Rue de l'Église".to_string()), radars[0].lane);

        Ok(())
    }

    #[test]
    fn datagouv_headers() -> Result<(), String> {
        let mut data: Vec<u8> = vec![];
        data.extend_from_slice(
            b"Num\xe9ro de radar; Type; Date de mise en service; Vitesse; Latitude; Longitude\n",
        );
        data.extend_from_slice(b"0123;ETU;2019-03-04;30;+48.85;+2.35\n");
        data.extend_from_slice(b"0456;ETFR;21/12/2012;;+45.76;+4.83\n");

        let rdr = ReaderBuilder::new()
            .delimiter(b';')
            .from_reader(data.as_slice());

        let radars = CsvSource::new(rdr, None).fetch()?;
        assert_eq!(2, radars.len());

        let first = &radars[0];
        assert_eq!(Some(1), first.id);
        assert_eq!(Some("0123".to_string()), first.number);
        assert_eq!(RadarType::Urban, first.kind);
        assert_eq!(Some(30), first.speed_limit);
        assert_eq!(Some("2019-03-04".to_string()), first.commissioned);
        assert_eq!(Some(Point::new(2.35, 48.85)), first.point());

        assert_eq!(None, radars[1].speed_limit);
        assert!(radars[1].commissioning_date().is_some());

        Ok(())
    }

    #[test]
    fn short_number_header() -> Result<(), String> {
        let data = " Numéro; Type; Vitesse; Latitude; Longitude\n789;ETD;90;48.85;2.35\n";
        let rdr = ReaderBuilder::new()
            .delimiter(b';')
            .from_reader(data.as_bytes());

        let radars = CsvSource::new(rdr, None).fetch()?;
        assert_eq!(Some("789".to_string()), radars[0].number);
        assert_eq!(Some(90), radars[0].speed_limit);

        Ok(())
    }

    #[test]
    fn missing_header() {
        let data = "type,lat,lng\nETD,48.85,2.35\n";
        let rdr = ReaderBuilder::new().from_reader(data.as_bytes());

        let res = CsvSource::new(rdr, None).fetch();
        assert_eq!(Err("Latitude header not found".to_string()), res);
    }
}
