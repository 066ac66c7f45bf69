use crate::domain::{AgeGroup, DetectionMethod, Jurisdiction, LocationBucket};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tabled::Tabled;

// ---------------------------------------------------------------------------
// Raw rows, one struct per CSV contract. Every cell is `Option<String>`
// because the exports mix quoted numbers, blanks and stray text; the
// normalizer decides what survives.
// ---------------------------------------------------------------------------

/// `RATE_PER_10K` dataset: the primary source every summary hangs off.
#[derive(Debug, Deserialize)]
pub struct RawRateRow {
    #[serde(rename = "JURISDICTION")]
    pub jurisdiction: Option<String>,
    #[serde(rename = "YEAR")]
    pub year: Option<String>,
    #[serde(rename = "RATE_PER_10K")]
    pub rate_per_10k: Option<String>,
    #[serde(rename = "LICENCES")]
    pub licences: Option<String>,
    #[serde(rename = "Sum(FINES)")]
    pub fines: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawAgeRow {
    #[serde(rename = "JURISDICTION")]
    pub jurisdiction: Option<String>,
    #[serde(rename = "YEAR")]
    pub year: Option<String>,
    #[serde(rename = "AGE_GROUP")]
    pub age_group: Option<String>,
    #[serde(rename = "Sum(FINES)")]
    pub fines: Option<String>,
}

/// Per-location-per-year dataset (the fine-grained remoteness source).
#[derive(Debug, Deserialize)]
pub struct RawLocationRow {
    #[serde(rename = "JURISDICTION")]
    pub jurisdiction: Option<String>,
    #[serde(rename = "YEAR")]
    pub year: Option<String>,
    #[serde(rename = "LOCATION")]
    pub location: Option<String>,
    #[serde(rename = "Sum(FINES)")]
    pub fines: Option<String>,
}

/// Coarse regional-difference dataset: same buckets, no year axis.
#[derive(Debug, Deserialize)]
pub struct RawRegionalRow {
    #[serde(rename = "JURISDICTION")]
    pub jurisdiction: Option<String>,
    #[serde(rename = "LOCATION")]
    pub location: Option<String>,
    #[serde(rename = "Sum(FINES)")]
    pub fines: Option<String>,
}

/// Camera/police annual dataset. Note the different fines header.
#[derive(Debug, Deserialize)]
pub struct RawDetectionRow {
    #[serde(rename = "JURISDICTION")]
    pub jurisdiction: Option<String>,
    #[serde(rename = "YEAR")]
    pub year: Option<String>,
    #[serde(rename = "DETECTION_METHOD")]
    pub detection_method: Option<String>,
    #[serde(rename = "FINES (Sum)")]
    pub fines: Option<String>,
}

/// Monthly dataset; `MONTH` cells are `"YYYY-MM"` periods.
#[derive(Debug, Deserialize)]
pub struct RawMonthlyRow {
    #[serde(rename = "JURISDICTION")]
    pub jurisdiction: Option<String>,
    #[serde(rename = "MONTH")]
    pub month: Option<String>,
    #[serde(rename = "Sum(FINES)")]
    pub fines: Option<String>,
}

// ---------------------------------------------------------------------------
// Canonical records, built once by the normalizer and read-only after.
// ---------------------------------------------------------------------------

/// One fact row. Dimensions are optional because each dataset carries a
/// different subset; `fines` is always present.
#[derive(Debug, Clone, PartialEq)]
pub struct FineRecord {
    pub jurisdiction: Jurisdiction,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub age_group: Option<AgeGroup>,
    pub location: Option<LocationBucket>,
    pub detection: Option<DetectionMethod>,
    pub fines: f64,
}

/// Canonical row of the primary rate dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct RateRecord {
    pub jurisdiction: Jurisdiction,
    pub year: i32,
    pub rate_per_10k: Option<f64>,
    pub licences: Option<f64>,
    pub fines: f64,
}

/// One row of the wide police-per-camera ratio table: a year plus one value
/// per jurisdiction that published a figure.
#[derive(Debug, Clone, PartialEq)]
pub struct RatioRecord {
    pub year: i32,
    pub by_jurisdiction: HashMap<Jurisdiction, f64>,
}

/// Every dataset the dashboard consumes, loaded as one unit: aggregation
/// never runs against a partially loaded set.
#[derive(Debug, Clone, Default)]
pub struct Datasets {
    pub rate: Vec<RateRecord>,
    pub age: Vec<FineRecord>,
    pub location: Vec<FineRecord>,
    pub regional: Vec<FineRecord>,
    pub detection: Vec<FineRecord>,
    pub monthly: Vec<FineRecord>,
    pub ratio: Vec<RatioRecord>,
    pub boundaries: Vec<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Coverage: tagged option for summary facts. Knowing *which* dataset tier
// satisfied a fact drives narrative wording, so a bare Option is not enough.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FactSource {
    /// Satisfied by a yearly dataset; the year is citable.
    Yearly(i32),
    /// Satisfied by the coarse regional fallback, which has no year axis.
    Regional,
}

impl FactSource {
    pub fn year(&self) -> Option<i32> {
        match self {
            FactSource::Yearly(y) => Some(*y),
            FactSource::Regional => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Coverage<T> {
    Present { value: T, source: FactSource },
    Absent,
}

impl<T> Coverage<T> {
    pub fn present(value: T, source: FactSource) -> Self {
        Coverage::Present { value, source }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Coverage::Present { value, .. } => Some(value),
            Coverage::Absent => None,
        }
    }

    pub fn source(&self) -> Option<FactSource> {
        match self {
            Coverage::Present { source, .. } => Some(*source),
            Coverage::Absent => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Coverage::Present { .. })
    }
}

// ---------------------------------------------------------------------------
// Derived summaries.
// ---------------------------------------------------------------------------

/// The winning member of a partition, with its share of that partition's
/// total (share is `None` only when the partition total was not positive).
#[derive(Debug, Clone, PartialEq)]
pub struct GroupShare<L> {
    pub label: L,
    pub fines: f64,
    pub share: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectionSplit {
    pub year: i32,
    pub camera_share: f64,
    pub camera_fines: f64,
    pub police_fines: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthFact {
    pub year: i32,
    pub month: u32,
    pub fines: f64,
}

/// Per-jurisdiction aggregate. Built only when the rate dataset covers the
/// jurisdiction; every other field degrades independently to `Absent`.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSummary {
    pub jurisdiction: Jurisdiction,
    pub name: &'static str,
    pub latest_year: i32,
    pub total_fines: f64,
    pub licences: Option<f64>,
    pub rate_per_10k: Option<f64>,
    pub top_age_group: Coverage<GroupShare<AgeGroup>>,
    pub top_region: Coverage<GroupShare<LocationBucket>>,
    pub remote_share: Coverage<f64>,
    pub detection: Coverage<DetectionSplit>,
    pub police_camera_ratio: Coverage<f64>,
    pub peak_month: Coverage<MonthFact>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NationalSummary {
    pub latest_year: i32,
    pub avg_rate: f64,
    pub leader: Jurisdiction,
    pub leader_rate: f64,
    pub remote_share: Option<f64>,
}

// ---------------------------------------------------------------------------
// Comparator outputs.
// ---------------------------------------------------------------------------

/// One entry of a ranking; `rank` is 1-based in sort order.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedFact<K> {
    pub subject: K,
    pub value: f64,
    pub rank: usize,
    pub delta_from_previous: Option<f64>,
    pub delta_from_national: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mover<K> {
    pub subject: K,
    pub earliest: f64,
    pub latest: f64,
    pub pct_change: f64,
}

/// Riser and cooler are selected independently; either may be absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Movers<K> {
    pub riser: Option<Mover<K>>,
    pub cooler: Option<Mover<K>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GapFact<K> {
    pub key: K,
    pub state_value: f64,
    pub national_value: f64,
    pub delta: f64,
}

// ---------------------------------------------------------------------------
// Report rows (console preview + CSV export).
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct StateLeagueRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "State")]
    #[tabled(rename = "State")]
    pub state: String,
    #[serde(rename = "LatestYear")]
    #[tabled(rename = "LatestYear")]
    pub latest_year: i32,
    #[serde(rename = "TotalFines")]
    #[tabled(rename = "TotalFines")]
    pub total_fines: String,
    #[serde(rename = "RatePer10k")]
    #[tabled(rename = "RatePer10k")]
    pub rate_per_10k: String,
    #[serde(rename = "RemoteShare")]
    #[tabled(rename = "RemoteShare")]
    pub remote_share: String,
    #[serde(rename = "CameraShare")]
    #[tabled(rename = "CameraShare")]
    pub camera_share: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct MoverRow {
    #[serde(rename = "Direction")]
    #[tabled(rename = "Direction")]
    pub direction: String,
    #[serde(rename = "State")]
    #[tabled(rename = "State")]
    pub state: String,
    #[serde(rename = "EarliestRate")]
    #[tabled(rename = "EarliestRate")]
    pub earliest: String,
    #[serde(rename = "LatestRate")]
    #[tabled(rename = "LatestRate")]
    pub latest: String,
    #[serde(rename = "PctChange")]
    #[tabled(rename = "PctChange")]
    pub pct_change: String,
}

/// JSON export bundling the national picture with one story per state.
#[derive(Debug, Serialize)]
pub struct StoryExport {
    pub national: Option<NationalSummary>,
    pub national_story: String,
    pub stories: Vec<StateStory>,
}

#[derive(Debug, Serialize)]
pub struct StateStory {
    pub code: String,
    pub name: String,
    pub story: String,
}
