// Fixed domain enumerations for the Australian speeding-fine datasets.
//
// Everything here is a closed vocabulary: eight jurisdictions, five age
// groups (ordered for chart axes), five ABS remoteness buckets. Parsing is
// forgiving about case and whitespace because the source CSVs are not
// consistent between publications.
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Jurisdiction {
    Act,
    Nsw,
    Nt,
    Qld,
    Sa,
    Tas,
    Vic,
    Wa,
}

impl Jurisdiction {
    pub const ALL: [Jurisdiction; 8] = [
        Jurisdiction::Act,
        Jurisdiction::Nsw,
        Jurisdiction::Nt,
        Jurisdiction::Qld,
        Jurisdiction::Sa,
        Jurisdiction::Tas,
        Jurisdiction::Vic,
        Jurisdiction::Wa,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Jurisdiction::Act => "ACT",
            Jurisdiction::Nsw => "NSW",
            Jurisdiction::Nt => "NT",
            Jurisdiction::Qld => "QLD",
            Jurisdiction::Sa => "SA",
            Jurisdiction::Tas => "TAS",
            Jurisdiction::Vic => "VIC",
            Jurisdiction::Wa => "WA",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Jurisdiction::Act => "Australian Capital Territory",
            Jurisdiction::Nsw => "New South Wales",
            Jurisdiction::Nt => "Northern Territory",
            Jurisdiction::Qld => "Queensland",
            Jurisdiction::Sa => "South Australia",
            Jurisdiction::Tas => "Tasmania",
            Jurisdiction::Vic => "Victoria",
            Jurisdiction::Wa => "Western Australia",
        }
    }

    pub fn from_code(s: &str) -> Option<Jurisdiction> {
        let s = s.trim().to_uppercase();
        Jurisdiction::ALL.iter().copied().find(|j| j.code() == s)
    }

    /// Resolve either a code ("NSW") or a display name ("New South Wales").
    pub fn from_name(s: &str) -> Option<Jurisdiction> {
        NAME_LOOKUP.get(s.trim().to_lowercase().as_str()).copied()
    }
}

static NAME_LOOKUP: Lazy<HashMap<String, Jurisdiction>> = Lazy::new(|| {
    let mut m = HashMap::new();
    for j in Jurisdiction::ALL {
        m.insert(j.code().to_lowercase(), j);
        m.insert(j.name().to_lowercase(), j);
    }
    m
});

/// Ordered age brackets as published; the derive order doubles as the chart
/// axis order and the tie-break order for "peak age group" comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum AgeGroup {
    Age0To16,
    Age17To25,
    Age26To39,
    Age40To64,
    Age65Plus,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 5] = [
        AgeGroup::Age0To16,
        AgeGroup::Age17To25,
        AgeGroup::Age26To39,
        AgeGroup::Age40To64,
        AgeGroup::Age65Plus,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AgeGroup::Age0To16 => "0-16",
            AgeGroup::Age17To25 => "17-25",
            AgeGroup::Age26To39 => "26-39",
            AgeGroup::Age40To64 => "40-64",
            AgeGroup::Age65Plus => "65 and over",
        }
    }

    pub fn from_label(s: &str) -> Option<AgeGroup> {
        let s = s.trim().to_lowercase();
        AgeGroup::ALL
            .iter()
            .copied()
            .find(|g| g.label().to_lowercase() == s)
    }
}

/// ABS remoteness-structure buckets used by the location datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum LocationBucket {
    MajorCities,
    InnerRegional,
    OuterRegional,
    Remote,
    VeryRemote,
}

impl LocationBucket {
    pub const ALL: [LocationBucket; 5] = [
        LocationBucket::MajorCities,
        LocationBucket::InnerRegional,
        LocationBucket::OuterRegional,
        LocationBucket::Remote,
        LocationBucket::VeryRemote,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            LocationBucket::MajorCities => "Major Cities",
            LocationBucket::InnerRegional => "Inner Regional",
            LocationBucket::OuterRegional => "Outer Regional",
            LocationBucket::Remote => "Remote",
            LocationBucket::VeryRemote => "Very Remote",
        }
    }

    /// The "remote family": everything past inner-regional.
    pub fn is_remote_family(&self) -> bool {
        matches!(
            self,
            LocationBucket::OuterRegional | LocationBucket::Remote | LocationBucket::VeryRemote
        )
    }

    pub fn from_label(s: &str) -> Option<LocationBucket> {
        let s = s.trim().to_lowercase();
        LocationBucket::ALL
            .iter()
            .copied()
            .find(|b| b.label().to_lowercase() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum DetectionMethod {
    Camera,
    Police,
}

impl DetectionMethod {
    pub fn label(&self) -> &'static str {
        match self {
            DetectionMethod::Camera => "Camera issued",
            DetectionMethod::Police => "Police issued",
        }
    }

    /// Publications flip between "Camera", "Camera issued" and similar; a
    /// substring match covers every variant seen so far.
    pub fn from_label(s: &str) -> Option<DetectionMethod> {
        let s = s.trim().to_lowercase();
        if s.contains("camera") {
            Some(DetectionMethod::Camera)
        } else if s.contains("police") {
            Some(DetectionMethod::Police)
        } else {
            None
        }
    }
}

/// Candidate GeoJSON property keys for a feature's state name, in priority
/// order; the first key with a non-empty value wins.
pub const GEO_NAME_KEYS: [&str; 6] = [
    "STATE_NAME",
    "STE_NAME21",
    "STATE",
    "NAME",
    "STATE_ABBR",
    "STE_ABBR",
];

/// Candidate GeoJSON property keys for a feature's area, used only for map
/// draw order (largest drawn first).
pub const GEO_AREA_KEYS: [&str; 3] = ["AREASQKM21", "AREASQKM", "AREA"];
