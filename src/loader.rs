// Dataset loading: CSV and GeoJSON files in, a fully populated `Datasets`
// out. Loading is all-or-nothing; if any required file fails to open or
// parse at the file level, the whole load fails and no partial `Datasets`
// escapes. Individual malformed rows are dropped silently by the normalizer
// and only counted for console diagnostics.
use crate::normalize;
use crate::types::Datasets;
use csv::ReaderBuilder;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::error::Error;
use std::path::Path;

pub const RATE_FILE: &str = "rate_per_10k.csv";
pub const AGE_FILE: &str = "fines_by_age.csv";
pub const LOCATION_FILE: &str = "fines_by_location.csv";
pub const REGIONAL_FILE: &str = "regional_differences.csv";
pub const DETECTION_FILE: &str = "detection_method.csv";
pub const RATIO_FILE: &str = "police_camera_ratio.csv";
pub const MONTHLY_FILE: &str = "fines_by_month.csv";
pub const BOUNDARIES_FILE: &str = "state_boundaries.geojson";

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub file: String,
    pub total_rows: usize,
    pub kept_rows: usize,
}

impl LoadReport {
    pub fn dropped_rows(&self) -> usize {
        self.total_rows - self.kept_rows
    }
}

/// Load every dataset from `dir`. All files are required; the first failure
/// aborts the whole load.
pub fn load_all(dir: &Path) -> Result<(Datasets, Vec<LoadReport>), Box<dyn Error>> {
    let mut reports = Vec::new();

    let rate = load_rows(dir, RATE_FILE, normalize::normalize_rate, &mut reports)?;
    let age = load_rows(dir, AGE_FILE, normalize::normalize_age, &mut reports)?;
    let location = load_rows(dir, LOCATION_FILE, normalize::normalize_location, &mut reports)?;
    let regional = load_rows(dir, REGIONAL_FILE, normalize::normalize_regional, &mut reports)?;
    let detection = load_rows(dir, DETECTION_FILE, normalize::normalize_detection, &mut reports)?;
    let monthly = load_rows(dir, MONTHLY_FILE, normalize::normalize_monthly, &mut reports)?;
    let ratio = load_ratio(dir, &mut reports)?;
    let boundaries = load_boundaries(dir, &mut reports)?;

    let datasets = Datasets {
        rate,
        age,
        location,
        regional,
        detection,
        monthly,
        ratio,
        boundaries,
    };
    Ok((datasets, reports))
}

/// Shared CSV loop: deserialize each row, push whatever the normalizer
/// keeps. Rows that fail serde deserialization count as dropped too.
fn load_rows<R, T, F>(
    dir: &Path,
    file: &str,
    normalize_fn: F,
    reports: &mut Vec<LoadReport>,
) -> Result<Vec<T>, Box<dyn Error>>
where
    R: DeserializeOwned,
    F: Fn(R) -> Option<T>,
{
    let path = dir.join(file);
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(&path)?;
    let mut total_rows = 0usize;
    let mut kept = Vec::new();
    for result in rdr.deserialize::<R>() {
        total_rows += 1;
        let Ok(raw) = result else { continue };
        if let Some(record) = normalize_fn(raw) {
            kept.push(record);
        }
    }
    reports.push(LoadReport {
        file: file.to_string(),
        total_rows,
        kept_rows: kept.len(),
    });
    Ok(kept)
}

/// The ratio table is wide (one column per jurisdiction code), so it goes
/// through the header-driven normalizer instead of serde.
fn load_ratio(
    dir: &Path,
    reports: &mut Vec<LoadReport>,
) -> Result<Vec<crate::types::RatioRecord>, Box<dyn Error>> {
    let path = dir.join(RATIO_FILE);
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(&path)?;
    let headers = rdr.headers()?.clone();
    let mut total_rows = 0usize;
    let mut kept = Vec::new();
    for result in rdr.records() {
        total_rows += 1;
        let Ok(record) = result else { continue };
        if let Some(row) = normalize::normalize_ratio(&headers, &record) {
            kept.push(row);
        }
    }
    reports.push(LoadReport {
        file: RATIO_FILE.to_string(),
        total_rows,
        kept_rows: kept.len(),
    });
    Ok(kept)
}

fn load_boundaries(dir: &Path, reports: &mut Vec<LoadReport>) -> Result<Vec<Value>, Box<dyn Error>> {
    let path = dir.join(BOUNDARIES_FILE);
    let text = std::fs::read_to_string(&path)?;
    let doc: Value = serde_json::from_str(&text)?;
    let features = doc
        .get("features")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    // Only features that resolve to a jurisdiction are useful downstream.
    let total = features.len();
    let kept: Vec<Value> = features
        .into_iter()
        .filter(|f| normalize::feature_jurisdiction(f).is_some())
        .collect();
    reports.push(LoadReport {
        file: BOUNDARIES_FILE.to_string(),
        total_rows: total,
        kept_rows: kept.len(),
    });
    Ok(kept)
}
