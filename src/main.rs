//! radarroute cli - Speed cameras along driving routes

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter};

use argopt::{cmd_group, subcmd};
use csv::ReaderBuilder;
use log::{debug, info, warn};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;

use radarroute::services::nominatim::NominatimGeocoder;
use radarroute::services::osrm::OsrmRouter;
use radarroute::sources::CsvSource;
use radarroute::{
    find_by_id, paginate, radar_types, FieldsConfiguration, JsonSource, Radar, RadarFilter,
    RadarStats, RadarType, RadarsSource, RoutePlanner, ServicesConfiguration, DETECTION_RADIUS,
};

/// CLI of radarroute - Find the speed cameras along your driving route
#[cmd_group(commands = [route, radars, types, stats])]
fn main() -> Result<(), String> {}

/// Compute a route between two places and list its radars
#[subcmd]
fn route(
    /// Radars source: CSV or JSON file, http(s) url, `data.gouv.fr`, mongodb connection string
    source: String,
    /// Start place or `lat,lon`
    start: String,
    /// End place or `lat,lon`
    end: String,
    /// Mongo collection name, for mongodb sources
    #[opt(long)]
    collection: Option<String>,
    /// Detection radius in meters. Default: 500
    #[opt(long)]
    radius: Option<f64>,
    /// GPX path file destination of the route and its radars
    #[opt(long)]
    output: Option<String>,
    /// Print the radars as JSON
    #[opt(long)]
    json: bool,
    /// Fields, detection and services configuration. Default: .radarroute.yaml, ~/.radarroute.yaml
    #[opt(long)]
    config: Option<String>,
) -> Result<(), String> {
    init_logger();
    let conf = load_configs(config);

    let radars = load_radars(&source, collection, conf.fields, &conf.services)?;

    let geocoder = NominatimGeocoder::new(&conf.services)?;
    let router = OsrmRouter::new(&conf.services)?;

    let mut planner = RoutePlanner::new(radars);
    planner.radius(radius.unwrap_or(conf.detection.radius));

    let plan = planner.calculate(&geocoder, &router, &start, &end)?;

    if json {
        let out = serde_json::to_string_pretty(&plan.radars)
            .map_err(|e| format!("Failed on serialize the radars: {}", e.to_string()))?;
        println!("{}", out);
    } else {
        println!("{} -> {}", plan.route.start.label, plan.route.end.label);
        println!("{}", plan.summary());
        if plan.radars.is_empty() {
            println!("No radar on this route");
        }
        for (idx, matched) in plan.radars.iter().enumerate() {
            let speed = match matched.radar.speed_limit {
                Some(s) => format!(" - {} km/h", s),
                None => String::new(),
            };
            println!(
                "{:>3}. {} [{}]{} - {} m",
                idx + 1,
                matched.radar.display_name(),
                matched.radar.kind.label(),
                speed,
                matched.distance_from_route
            );
        }
    }

    if let Some(destination) = output {
        let destination = File::create(destination)
            .map_err(|e| format!("Failed on create the destination file: {}", e.to_string()))?;

        let doc = plan.gpx()?;

        let mut writer = BufWriter::new(destination);
        gpx::write(&doc, &mut writer).map_err(|e| e.to_string())?;
    }

    Ok(())
}

/// List the radars, filtered and paginated, as JSON
#[subcmd]
fn radars(
    /// Radars source: CSV or JSON file, http(s) url, `data.gouv.fr`, mongodb connection string
    source: String,
    /// Mongo collection name, for mongodb sources
    #[opt(long)]
    collection: Option<String>,
    /// Only this radar
    #[opt(long)]
    id: Option<i64>,
    /// Type codes, comma separated: ETD,ETFR,ETPN,ETT,ETU,ETVM
    #[opt(long)]
    types: Option<String>,
    /// Min controlled speed
    #[opt(long)]
    speed_min: Option<u32>,
    /// Max controlled speed
    #[opt(long)]
    speed_max: Option<u32>,
    /// Text searched in the lane, direction and location
    #[opt(long)]
    search: Option<String>,
    /// Page number. Default: 1
    #[opt(long)]
    page: Option<usize>,
    /// Radars per page, up to 1000. Default: 100
    #[opt(long)]
    limit: Option<usize>,
    /// Fields configuration. Default: .radarroute.yaml, ~/.radarroute.yaml
    #[opt(long)]
    config: Option<String>,
) -> Result<(), String> {
    init_logger();
    let conf = load_configs(config);

    let radars = load_radars(&source, collection, conf.fields, &conf.services)?;

    let out = if let Some(id) = id {
        let radar = find_by_id(&radars, id).ok_or(format!("Radar {} not found", id))?;
        serde_json::to_string_pretty(radar)
    } else {
        let mut filter = RadarFilter::default();
        if let Some(types) = types {
            filter = filter.types(
                types
                    .split(',')
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect(),
            );
        }
        if let Some(min) = speed_min {
            filter = filter.speed_min(min);
        }
        if let Some(max) = speed_max {
            filter = filter.speed_max(max);
        }
        if let Some(search) = search {
            filter = filter.search(&search);
        }

        let page = paginate(
            &filter.apply(&radars),
            page.unwrap_or(1),
            limit.unwrap_or(radarroute::radar::filter::DEFAULT_PAGE_LIMIT),
        );
        serde_json::to_string_pretty(&page)
    }
    .map_err(|e| format!("Failed on serialize the radars: {}", e.to_string()))?;

    println!("{}", out);

    Ok(())
}

/// List the radar types available in the source
#[subcmd]
fn types(
    /// Radars source: CSV or JSON file, http(s) url, `data.gouv.fr`, mongodb connection string
    source: String,
    /// Mongo collection name, for mongodb sources
    #[opt(long)]
    collection: Option<String>,
    /// Fields configuration. Default: .radarroute.yaml, ~/.radarroute.yaml
    #[opt(long)]
    config: Option<String>,
) -> Result<(), String> {
    init_logger();
    let conf = load_configs(config);

    let radars = load_radars(&source, collection, conf.fields, &conf.services)?;

    for code in radar_types(&radars) {
        let kind = RadarType::from(code.as_str());
        println!("{}\t{}", code, kind.label());
    }

    Ok(())
}

/// Print the radars statistics as JSON
#[subcmd]
fn stats(
    /// Radars source: CSV or JSON file, http(s) url, `data.gouv.fr`, mongodb connection string
    source: String,
    /// Mongo collection name, for mongodb sources
    #[opt(long)]
    collection: Option<String>,
    /// Fields configuration. Default: .radarroute.yaml, ~/.radarroute.yaml
    #[opt(long)]
    config: Option<String>,
) -> Result<(), String> {
    init_logger();
    let conf = load_configs(config);

    let radars = load_radars(&source, collection, conf.fields, &conf.services)?;

    let out = serde_json::to_string_pretty(&RadarStats::compute(&radars))
        .map_err(|e| format!("Failed on serialize the stats: {}", e.to_string()))?;
    println!("{}", out);

    Ok(())
}

fn init_logger() {
    let env = env_logger::Env::default().default_filter_or("warn");
    let _ = env_logger::Builder::from_env(env).try_init();
}

/// Official radars snapshot, a Latin-1 `;` separated CSV
const DATAGOUV_RADARS_URL: &str =
    "https://www.data.gouv.fr/fr/datasets/r/17f7cfd9-a5fe-4b6a-9f5d-3625feaa396e";

/// Loader of a radars source
#[derive(Debug, PartialEq)]
enum SourceKind {
    Mongo,
    /// Downloaded CSV or JSON
    Remote(String),
    Json,
    Csv,
}

impl SourceKind {
    fn of(source: &str) -> Self {
        let lower = source.trim().to_lowercase();

        if lower.starts_with("mongodb://") || lower.starts_with("mongodb+srv://") {
            SourceKind::Mongo
        } else if lower == "data.gouv.fr" {
            SourceKind::Remote(DATAGOUV_RADARS_URL.to_string())
        } else if lower.starts_with("http://") || lower.starts_with("https://") {
            SourceKind::Remote(source.trim().to_string())
        } else if lower.ends_with(".json") {
            SourceKind::Json
        } else {
            SourceKind::Csv
        }
    }
}

/// Load the radars snapshot from a file, an url or a mongodb collection
fn load_radars(
    source: &str,
    collection: Option<String>,
    fields: FieldsConfiguration,
    services: &ServicesConfiguration,
) -> Result<Vec<Radar>, String> {
    match SourceKind::of(source) {
        SourceKind::Mongo => load_mongo(source, collection, fields),
        SourceKind::Remote(url) => load_remote(&url, fields, services),
        SourceKind::Json => {
            let file = File::open(source)
                .map_err(|e| format!("Failed on open the radars file: {}", e.to_string()))?;

            JsonSource::new(BufReader::new(file)).fetch()
        }
        SourceKind::Csv => {
            let file = File::open(source)
                .map_err(|e| format!("Failed on open the radars file: {}", e.to_string()))?;

            load_csv(BufReader::new(file), fields)
        }
    }
}

fn load_csv<R: BufRead>(mut rdr: R, fields: FieldsConfiguration) -> Result<Vec<Radar>, String> {
    let delimiter = sniff_delimiter(&mut rdr)?;
    debug!("CSV delimiter: {:?}", delimiter as char);

    let rcsv = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(rdr);

    CsvSource::new(rcsv, Some(fields)).fetch()
}

/// Download the snapshot, JSON when the server or the url says so
fn load_remote(
    url: &str,
    fields: FieldsConfiguration,
    services: &ServicesConfiguration,
) -> Result<Vec<Radar>, String> {
    let client = Client::builder()
        .user_agent(services.user_agent.clone())
        .build()
        .map_err(|e| format!("Failed on build the http client: {}", e.to_string()))?;

    info!("Downloading the radars from {}", url);
    let response = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(|e| format!("Failed on download the radars: {}", e.to_string()))?;

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());
    let json = is_json(url, content_type.as_deref());

    let body = response
        .bytes()
        .map_err(|e| format!("Failed on download the radars: {}", e.to_string()))?;
    debug!("{} bytes downloaded", body.len());

    if json {
        JsonSource::new(&body[..]).fetch()
    } else {
        load_csv(&body[..], fields)
    }
}

/// JSON content type, or a `.json` path when the server gives none
fn is_json(url: &str, content_type: Option<&str>) -> bool {
    match content_type {
        Some(ct) if ct.contains("json") => true,
        Some(ct) if ct.contains("csv") => false,
        _ => {
            let path = url.split(['?', '#']).next().unwrap_or(url);
            path.to_lowercase().ends_with(".json")
        }
    }
}

/// `;` when the header has more of them than `,`
fn sniff_delimiter<R: BufRead>(rdr: &mut R) -> Result<u8, String> {
    let head = rdr
        .fill_buf()
        .map_err(|e| format!("Failed on read the radars file: {}", e.to_string()))?;
    let line = head.split(|b| *b == b'\n').next().unwrap_or(&[]);

    let semicolons = line.iter().filter(|b| **b == b';').count();
    let commas = line.iter().filter(|b| **b == b',').count();

    Ok(if semicolons > commas { b';' } else { b',' })
}

#[cfg(feature = "mongo")]
fn load_mongo(
    connection: &str,
    collection: Option<String>,
    fields: FieldsConfiguration,
) -> Result<Vec<Radar>, String> {
    use bson::Document;
    use mongodb::sync::Client;
    use radarroute::sources::MongoDbSource;

    let collection = collection.ok_or("Mongo collection not provided")?;

    let client = Client::with_uri_str(connection)
        .map_err(|e| format!("Failed on connect: {0}", e.to_string()))?;
    let db = client
        .default_database()
        .ok_or("Default database not provided")?;
    let collection = db.collection::<Document>(&collection);

    MongoDbSource::new(collection, Some(fields)).fetch()
}

#[cfg(not(feature = "mongo"))]
fn load_mongo(
    _connection: &str,
    _collection: Option<String>,
    _fields: FieldsConfiguration,
) -> Result<Vec<Radar>, String> {
    Err("Built without mongodb support".to_string())
}

/// Load the current config
fn load_configs(provided: Option<String>) -> Configs {
    let mut options = vec![];

    if let Some(sprovided) = provided {
        options.push(sprovided);
    }

    options.push(".radarroute.yaml".to_string());

    if let Some(home) = dirs::home_dir() {
        if let Some(shome) = home.to_str() {
            options.push(format!("{}/.radarroute.yaml", shome));
        }
    }

    for fi in options {
        if let Ok(s) = fs::read_to_string(&fi) {
            match serde_yaml::from_str::<Configs>(&s) {
                Ok(conf) => {
                    debug!("Config loaded from {}", fi);
                    return conf;
                }
                Err(e) => {
                    warn!("Invalid config {}: {}", fi, e);
                    break;
                }
            }
        }
    }

    Configs::default()
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
struct Configs {
    pub fields: FieldsConfiguration,
    pub detection: DetectionOptions,
    pub services: ServicesConfiguration,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
struct DetectionOptions {
    /// Max distance between a radar and the route, in meters
    pub radius: f64,
}

impl Default for DetectionOptions {
    fn default() -> Self {
        Self {
            radius: DETECTION_RADIUS,
        }
    }
}

#[test]
fn parse_configs() -> Result<(), String> {
    let yaml = "\nfields:\n  type: Type\ndetection:\n  radius: 250";

    let conf: Configs = serde_yaml::from_str(&yaml).map_err(|e| e.to_string())?;

    assert_eq!(vec!["Type".to_string()], conf.fields.kind);
    assert_eq!(vec!["latitude".to_string()], conf.fields.latitude);
    assert_eq!(FieldsConfiguration::default().speed, conf.fields.speed);
    assert_eq!(250.0, conf.detection.radius);
    assert_eq!(ServicesConfiguration::default(), conf.services);

    let yaml = "\nservices:\n  country_codes: fr,be\n  osrm_url: http://localhost:5000/route/v1/driving/";

    let conf: Configs = serde_yaml::from_str(&yaml).map_err(|e| e.to_string())?;

    assert_eq!(FieldsConfiguration::default(), conf.fields);
    assert_eq!(500.0, conf.detection.radius);

    let yaml = "\nfields:\n  speed: [Vitesse, VMA]\n";

    let list: Configs = serde_yaml::from_str(&yaml).map_err(|e| e.to_string())?;
    assert_eq!(vec!["Vitesse".to_string(), "VMA".to_string()], list.fields.speed);
    assert_eq!("fr,be", conf.services.country_codes);
    assert_eq!(
        "http://localhost:5000/route/v1/driving/",
        conf.services.osrm_url
    );
    assert_eq!(
        "https://nominatim.openstreetmap.org/search",
        conf.services.nominatim_url
    );

    Ok(())
}

#[test]
fn source_kinds() {
    assert_eq!(SourceKind::Mongo, SourceKind::of("mongodb://localhost:27017/radars"));
    assert_eq!(SourceKind::Mongo, SourceKind::of("mongodb+srv://cluster.example.net/db"));
    assert_eq!(
        SourceKind::Remote(DATAGOUV_RADARS_URL.to_string()),
        SourceKind::of("data.gouv.fr")
    );
    assert_eq!(
        SourceKind::Remote("https://example.org/Radars.json".to_string()),
        SourceKind::of(" https://example.org/Radars.json ")
    );
    assert_eq!(SourceKind::Json, SourceKind::of("radars.JSON"));
    assert_eq!(SourceKind::Csv, SourceKind::of("radars.csv"));
    assert_eq!(SourceKind::Csv, SourceKind::of("/tmp/radars_final"));
}

#[test]
fn remote_formats() {
    assert!(is_json("https://example.org/radars", Some("application/json; charset=utf-8")));
    assert!(!is_json(DATAGOUV_RADARS_URL, Some("text/csv")));
    assert!(!is_json("https://example.org/radars.json", Some("text/csv")));
    assert!(is_json("https://example.org/radars.json?page=1", None));
    assert!(is_json("https://example.org/radars.json", Some("application/octet-stream")));
    assert!(!is_json(DATAGOUV_RADARS_URL, None));
}

#[test]
fn remote_csv_body() -> Result<(), String> {
    let body: &[u8] = b" Num\xe9ro; Type; Vitesse; Latitude; Longitude\n0123;ETU;30;+48.85;+2.35\n";

    let radars = load_csv(body, FieldsConfiguration::default())?;
    assert_eq!(1, radars.len());
    assert_eq!(Some("0123".to_string()), radars[0].number);
    assert_eq!(Some(30), radars[0].speed_limit);

    Ok(())
}

#[test]
fn delimiters() -> Result<(), String> {
    let mut semi = "Type;Latitude;Longitude\nETD;48,85;2,35\n".as_bytes();
    assert_eq!(b';', sniff_delimiter(&mut semi)?);

    let mut comma = "type,latitude,longitude\nETD,48.85,2.35\n".as_bytes();
    assert_eq!(b',', sniff_delimiter(&mut comma)?);

    Ok(())
}
