// Row normalizer: raw CSV rows in, canonical records out.
//
// Every function here is total and silent: a row that cannot resolve a
// jurisdiction plus a numeric fine count (plus whichever dimension the
// dataset exists to provide) returns `None` and is dropped by the loader.
// Malformed rows are expected noise in these exports, not errors.
use crate::domain::{
    AgeGroup, DetectionMethod, Jurisdiction, LocationBucket, GEO_AREA_KEYS, GEO_NAME_KEYS,
};
use crate::types::{
    FineRecord, RateRecord, RatioRecord, RawAgeRow, RawDetectionRow, RawLocationRow,
    RawMonthlyRow, RawRateRow, RawRegionalRow,
};
use crate::util::{parse_f64_safe, parse_year_month_safe, parse_year_safe};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Resolve a jurisdiction cell that may hold a code ("VIC") or a display
/// name ("Victoria").
pub fn resolve_jurisdiction(cell: Option<&str>) -> Option<Jurisdiction> {
    Jurisdiction::from_name(cell?)
}

pub fn normalize_rate(row: RawRateRow) -> Option<RateRecord> {
    let jurisdiction = resolve_jurisdiction(row.jurisdiction.as_deref())?;
    let year = parse_year_safe(row.year.as_deref())?;
    let fines = parse_f64_safe(row.fines.as_deref())?;
    Some(RateRecord {
        jurisdiction,
        year,
        rate_per_10k: parse_f64_safe(row.rate_per_10k.as_deref()),
        licences: parse_f64_safe(row.licences.as_deref()),
        fines,
    })
}

pub fn normalize_age(row: RawAgeRow) -> Option<FineRecord> {
    let jurisdiction = resolve_jurisdiction(row.jurisdiction.as_deref())?;
    let year = parse_year_safe(row.year.as_deref())?;
    let age_group = AgeGroup::from_label(row.age_group.as_deref()?)?;
    let fines = parse_f64_safe(row.fines.as_deref())?;
    Some(FineRecord {
        jurisdiction,
        year: Some(year),
        month: None,
        age_group: Some(age_group),
        location: None,
        detection: None,
        fines,
    })
}

pub fn normalize_location(row: RawLocationRow) -> Option<FineRecord> {
    let jurisdiction = resolve_jurisdiction(row.jurisdiction.as_deref())?;
    let year = parse_year_safe(row.year.as_deref())?;
    let location = LocationBucket::from_label(row.location.as_deref()?)?;
    let fines = parse_f64_safe(row.fines.as_deref())?;
    Some(FineRecord {
        jurisdiction,
        year: Some(year),
        month: None,
        age_group: None,
        location: Some(location),
        detection: None,
        fines,
    })
}

/// Regional-difference rows carry no year; `year` stays `None` so downstream
/// facts derived from them cannot cite one.
pub fn normalize_regional(row: RawRegionalRow) -> Option<FineRecord> {
    let jurisdiction = resolve_jurisdiction(row.jurisdiction.as_deref())?;
    let location = LocationBucket::from_label(row.location.as_deref()?)?;
    let fines = parse_f64_safe(row.fines.as_deref())?;
    Some(FineRecord {
        jurisdiction,
        year: None,
        month: None,
        age_group: None,
        location: Some(location),
        detection: None,
        fines,
    })
}

pub fn normalize_detection(row: RawDetectionRow) -> Option<FineRecord> {
    let jurisdiction = resolve_jurisdiction(row.jurisdiction.as_deref())?;
    let year = parse_year_safe(row.year.as_deref())?;
    let detection = DetectionMethod::from_label(row.detection_method.as_deref()?)?;
    let fines = parse_f64_safe(row.fines.as_deref())?;
    Some(FineRecord {
        jurisdiction,
        year: Some(year),
        month: None,
        age_group: None,
        location: None,
        detection: Some(detection),
        fines,
    })
}

/// Monthly rows usually carry `"YYYY-MM"`; a bare `"YYYY"` is kept with no
/// month component so the fines still count toward yearly totals.
pub fn normalize_monthly(row: RawMonthlyRow) -> Option<FineRecord> {
    let jurisdiction = resolve_jurisdiction(row.jurisdiction.as_deref())?;
    let fines = parse_f64_safe(row.fines.as_deref())?;
    let (year, month) = match parse_year_month_safe(row.month.as_deref()) {
        Some((y, m)) => (y, Some(m)),
        None => (parse_year_safe(row.month.as_deref())?, None),
    };
    Some(FineRecord {
        jurisdiction,
        year: Some(year),
        month,
        age_group: None,
        location: None,
        detection: None,
        fines,
    })
}

/// One row of the wide ratio table: a `YEAR` column plus one numeric column
/// per jurisdiction code. Columns that fail to resolve to a jurisdiction are
/// ignored; cells that fail to parse leave that jurisdiction out of the row.
pub fn normalize_ratio(headers: &csv::StringRecord, record: &csv::StringRecord) -> Option<RatioRecord> {
    let mut year = None;
    let mut by_jurisdiction = HashMap::new();
    for (header, cell) in headers.iter().zip(record.iter()) {
        if header.trim().eq_ignore_ascii_case("YEAR") {
            year = parse_year_safe(Some(cell));
        } else if let Some(j) = Jurisdiction::from_code(header) {
            if let Some(v) = parse_f64_safe(Some(cell)) {
                by_jurisdiction.insert(j, v);
            }
        }
    }
    Some(RatioRecord {
        year: year?,
        by_jurisdiction,
    })
}

/// Resolve a GeoJSON feature's display name through the prioritized key
/// list; the first key holding a non-empty string wins.
pub fn feature_name(feature: &Value) -> Option<String> {
    let props = feature.get("properties")?;
    for key in GEO_NAME_KEYS {
        if let Some(s) = props.get(key).and_then(Value::as_str) {
            let s = s.trim();
            if !s.is_empty() {
                return Some(s.to_string());
            }
        }
    }
    None
}

/// Resolve a feature directly to a jurisdiction via its name properties.
pub fn feature_jurisdiction(feature: &Value) -> Option<Jurisdiction> {
    Jurisdiction::from_name(&feature_name(feature)?)
}

/// Map draw order: indices of `features` sorted by descending area so large
/// polygons paint first. Features without an area property sort last; ties
/// keep input order (`sort_by` is stable).
pub fn draw_order(features: &[Value]) -> Vec<usize> {
    let area_of = |f: &Value| -> Option<f64> {
        let props = f.get("properties")?;
        GEO_AREA_KEYS
            .iter()
            .find_map(|k| props.get(*k).and_then(Value::as_f64))
    };
    let mut idx: Vec<usize> = (0..features.len()).collect();
    idx.sort_by(|&a, &b| {
        match (area_of(&features[a]), area_of(&features[b])) {
            (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
    idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cell(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn rate_row_with_string_numbers() {
        let rec = normalize_rate(RawRateRow {
            jurisdiction: cell("VIC"),
            year: cell("2023"),
            rate_per_10k: cell("130"),
            licences: cell("1,000,000"),
            fines: cell("13000"),
        })
        .unwrap();
        assert_eq!(rec.jurisdiction, Jurisdiction::Vic);
        assert_eq!(rec.year, 2023);
        assert_eq!(rec.rate_per_10k, Some(130.0));
        assert_eq!(rec.licences, Some(1_000_000.0));
        assert_eq!(rec.fines, 13000.0);
    }

    #[test]
    fn unresolvable_rows_drop_silently() {
        assert!(normalize_rate(RawRateRow {
            jurisdiction: cell("Atlantis"),
            year: cell("2023"),
            rate_per_10k: None,
            licences: None,
            fines: cell("10"),
        })
        .is_none());
        assert!(normalize_age(RawAgeRow {
            jurisdiction: cell("NSW"),
            year: cell("2023"),
            age_group: cell("26-39"),
            fines: cell("not a number"),
        })
        .is_none());
    }

    #[test]
    fn jurisdiction_by_display_name() {
        let rec = normalize_location(RawLocationRow {
            jurisdiction: cell("Western Australia"),
            year: cell("2022"),
            location: cell("Very Remote"),
            fines: cell("42"),
        })
        .unwrap();
        assert_eq!(rec.jurisdiction, Jurisdiction::Wa);
        assert_eq!(rec.location, Some(LocationBucket::VeryRemote));
    }

    #[test]
    fn regional_rows_have_no_year() {
        let rec = normalize_regional(RawRegionalRow {
            jurisdiction: cell("NT"),
            location: cell("Remote"),
            fines: cell("7"),
        })
        .unwrap();
        assert_eq!(rec.year, None);
    }

    #[test]
    fn monthly_rows_accept_period_or_bare_year() {
        let with_month = normalize_monthly(RawMonthlyRow {
            jurisdiction: cell("QLD"),
            month: cell("2023-07"),
            fines: cell("100"),
        })
        .unwrap();
        assert_eq!((with_month.year, with_month.month), (Some(2023), Some(7)));

        let bare = normalize_monthly(RawMonthlyRow {
            jurisdiction: cell("QLD"),
            month: cell("2023"),
            fines: cell("100"),
        })
        .unwrap();
        assert_eq!((bare.year, bare.month), (Some(2023), None));
    }

    #[test]
    fn ratio_row_skips_bad_cells() {
        let headers = csv::StringRecord::from(vec!["YEAR", "NSW", "VIC", "NOTES"]);
        let record = csv::StringRecord::from(vec!["2023", "1.4", "", "ignore"]);
        let row = normalize_ratio(&headers, &record).unwrap();
        assert_eq!(row.year, 2023);
        assert_eq!(row.by_jurisdiction.get(&Jurisdiction::Nsw), Some(&1.4));
        assert!(!row.by_jurisdiction.contains_key(&Jurisdiction::Vic));
    }

    #[test]
    fn feature_name_priority_order() {
        let f = json!({"properties": {"STATE": "Victoria", "NAME": "ignored"}});
        assert_eq!(feature_name(&f), Some("Victoria".to_string()));
        assert_eq!(feature_jurisdiction(&f), Some(Jurisdiction::Vic));
        let blank = json!({"properties": {"STATE_NAME": "  ", "NAME": "Tasmania"}});
        assert_eq!(feature_name(&blank), Some("Tasmania".to_string()));
        assert_eq!(feature_name(&json!({"properties": {}})), None);
    }

    #[test]
    fn draw_order_descending_area_stable_ties() {
        let features = vec![
            json!({"properties": {"AREASQKM": 10.0}}),
            json!({"properties": {"AREASQKM": 50.0}}),
            json!({"properties": {"AREASQKM": 10.0}}),
            json!({"properties": {}}),
        ];
        assert_eq!(draw_order(&features), vec![1, 0, 2, 3]);
    }
}
