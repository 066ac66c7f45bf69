// Aggregation core: grouping, rollups, shares, and the per-jurisdiction
// summaries every chart and sentence is built from.
//
// Every function is pure and total. Insufficient data degrades to `None` or
// `Coverage::Absent`, never to a panic, a zero, or an unguarded division.
// Results do not depend on input iteration order except where documented
// (duplicate-year tie-breaks, which are last-occurrence-wins).
use crate::domain::Jurisdiction;
use crate::types::{
    Coverage, Datasets, DetectionSplit, FactSource, FineRecord, GroupShare, MonthFact,
    NationalSummary, RateRecord, RatioRecord, StateSummary,
};
use crate::util::average;
use std::collections::BTreeMap;

/// Total fines grouped by an arbitrary derived key. Rows whose key function
/// returns `None` (the row lacks that dimension) are skipped.
pub fn sum_by_key<K, F>(records: &[FineRecord], key_fn: F) -> BTreeMap<K, f64>
where
    K: Ord,
    F: Fn(&FineRecord) -> Option<K>,
{
    let mut totals = BTreeMap::new();
    for r in records {
        if let Some(k) = key_fn(r) {
            *totals.entry(k).or_insert(0.0) += r.fines;
        }
    }
    totals
}

/// For each group, the record with the maximum year. Duplicate rows for the
/// same group and year resolve to the last occurrence in input order.
pub fn latest_by_group<'a, T, K, G, Y>(
    records: &'a [T],
    group_fn: G,
    year_fn: Y,
) -> BTreeMap<K, &'a T>
where
    K: Ord,
    G: Fn(&T) -> Option<K>,
    Y: Fn(&T) -> Option<i32>,
{
    let mut latest: BTreeMap<K, (i32, &T)> = BTreeMap::new();
    for r in records {
        let (Some(k), Some(y)) = (group_fn(r), year_fn(r)) else {
            continue;
        };
        match latest.get(&k) {
            // `>=` implements last-occurrence-wins for equal years.
            Some((best, _)) if y < *best => {}
            _ => {
                latest.insert(k, (y, r));
            }
        }
    }
    latest.into_iter().map(|(k, (_, r))| (k, r)).collect()
}

/// Share of a whole, `None` when the whole is zero, negative or non-finite.
/// `None` means "no data", which is distinct from a genuine zero share.
pub fn share_of_total(part: f64, whole: f64) -> Option<f64> {
    if !whole.is_finite() || whole <= 0.0 || !part.is_finite() {
        return None;
    }
    Some(part / whole)
}

/// Remote-family share of fines for one jurisdiction, resolved through the
/// fixed fallback chain: the per-location-per-year dataset's latest year for
/// that jurisdiction, else the coarse regional dataset (which has no year
/// axis, so the fact cannot cite one), else `Absent`.
pub fn remote_share(
    location: &[FineRecord],
    regional: &[FineRecord],
    jurisdiction: Jurisdiction,
) -> Coverage<f64> {
    let yearly: Vec<&FineRecord> = location
        .iter()
        .filter(|r| r.jurisdiction == jurisdiction && r.location.is_some() && r.year.is_some())
        .collect();
    if !yearly.is_empty() {
        // The fine-grained dataset covers this jurisdiction; the coarse one
        // is not consulted even if the covered year nets out to nothing.
        let year = yearly.iter().filter_map(|r| r.year).max();
        let Some(year) = year else {
            return Coverage::Absent;
        };
        return match split_share(yearly.iter().copied().filter(|r| r.year == Some(year))) {
            Some(share) => Coverage::present(share, FactSource::Yearly(year)),
            None => Coverage::Absent,
        };
    }

    let coarse = regional
        .iter()
        .filter(|r| r.jurisdiction == jurisdiction && r.location.is_some());
    match split_share(coarse) {
        Some(share) => Coverage::present(share, FactSource::Regional),
        None => Coverage::Absent,
    }
}

fn split_share<'a, I>(rows: I) -> Option<f64>
where
    I: Iterator<Item = &'a FineRecord> + Clone,
{
    let total: f64 = rows.clone().map(|r| r.fines).sum();
    let remote: f64 = rows
        .filter(|r| r.location.map(|l| l.is_remote_family()).unwrap_or(false))
        .map(|r| r.fines)
        .sum();
    share_of_total(remote, total)
}

/// Camera-vs-police split for the jurisdiction's most recent year in the
/// detection dataset; `None` when that dataset has nothing for it.
pub fn detection_split(rows: &[FineRecord], jurisdiction: Jurisdiction) -> Option<DetectionSplit> {
    let mine: Vec<&FineRecord> = rows
        .iter()
        .filter(|r| r.jurisdiction == jurisdiction && r.detection.is_some() && r.year.is_some())
        .collect();
    let year = mine.iter().filter_map(|r| r.year).max()?;
    let mut camera = 0.0;
    let mut police = 0.0;
    for r in mine.iter().filter(|r| r.year == Some(year)) {
        match r.detection {
            Some(crate::domain::DetectionMethod::Camera) => camera += r.fines,
            Some(crate::domain::DetectionMethod::Police) => police += r.fines,
            None => {}
        }
    }
    let camera_share = share_of_total(camera, camera + police)?;
    Some(DetectionSplit {
        year,
        camera_share,
        camera_fines: camera,
        police_fines: police,
    })
}

/// Winning member of a one-dimension partition (age group or location) for
/// the jurisdiction's latest covered year. Ties on fines resolve to the
/// lower enum value, i.e. the first bucket in published order.
fn top_group<L, D>(rows: &[FineRecord], jurisdiction: Jurisdiction, dim: D) -> Coverage<GroupShare<L>>
where
    L: Copy + Ord,
    D: Fn(&FineRecord) -> Option<L>,
{
    let mine: Vec<FineRecord> = rows
        .iter()
        .filter(|r| r.jurisdiction == jurisdiction && dim(r).is_some() && r.year.is_some())
        .cloned()
        .collect();
    let Some(year) = mine.iter().filter_map(|r| r.year).max() else {
        return Coverage::Absent;
    };
    let in_year: Vec<FineRecord> = mine.into_iter().filter(|r| r.year == Some(year)).collect();
    let totals = sum_by_key(&in_year, &dim);
    let mut best: Option<(L, f64)> = None;
    let mut whole = 0.0;
    for (label, fines) in &totals {
        whole += fines;
        match best {
            // Strict `>` keeps the first (lowest-ordered) bucket on ties.
            Some((_, top)) if *fines <= top => {}
            _ => best = Some((*label, *fines)),
        }
    }
    match best {
        Some((label, fines)) => Coverage::present(
            GroupShare {
                label,
                fines,
                share: share_of_total(fines, whole),
            },
            FactSource::Yearly(year),
        ),
        None => Coverage::Absent,
    }
}

/// Latest published police-per-camera ratio for a jurisdiction from the
/// wide ratio table. Blank cells mean the jurisdiction sat that year out.
pub fn police_camera_ratio(rows: &[RatioRecord], jurisdiction: Jurisdiction) -> Coverage<f64> {
    let mut best: Option<(i32, f64)> = None;
    for row in rows {
        let Some(v) = row.by_jurisdiction.get(&jurisdiction) else {
            continue;
        };
        match best {
            Some((year, _)) if row.year < year => {}
            _ => best = Some((row.year, *v)),
        }
    }
    match best {
        Some((year, value)) => Coverage::present(value, FactSource::Yearly(year)),
        None => Coverage::Absent,
    }
}

/// Busiest month of the jurisdiction's latest monthly-covered year. Ties on
/// fines resolve to the earlier month.
pub fn peak_month(rows: &[FineRecord], jurisdiction: Jurisdiction) -> Coverage<MonthFact> {
    let mine: Vec<FineRecord> = rows
        .iter()
        .filter(|r| r.jurisdiction == jurisdiction && r.month.is_some() && r.year.is_some())
        .cloned()
        .collect();
    let Some(year) = mine.iter().filter_map(|r| r.year).max() else {
        return Coverage::Absent;
    };
    let in_year: Vec<FineRecord> = mine.into_iter().filter(|r| r.year == Some(year)).collect();
    let totals = sum_by_key(&in_year, |r| r.month);
    let mut best: Option<(u32, f64)> = None;
    for (month, fines) in &totals {
        match best {
            Some((_, top)) if *fines <= top => {}
            _ => best = Some((*month, *fines)),
        }
    }
    match best {
        Some((month, fines)) => Coverage::present(
            MonthFact { year, month, fines },
            FactSource::Yearly(year),
        ),
        None => Coverage::Absent,
    }
}

/// Build the full per-jurisdiction summary. Returns `None` only when the
/// primary rate dataset has no rows at all for the jurisdiction; every other
/// field is populated independently through its own fallback chain, so a gap
/// in one secondary dataset never nulls out the rest.
pub fn build_state_summary(jurisdiction: Jurisdiction, data: &Datasets) -> Option<StateSummary> {
    // Max year wins; duplicates for the same year fall to the last row. No
    // rate rows at all means no summary.
    let by_state = latest_by_group(
        &data.rate,
        |r| (r.jurisdiction == jurisdiction).then_some(()),
        |r| Some(r.year),
    );
    let latest: &RateRecord = by_state.get(&()).copied()?;

    let rate_per_10k = latest.rate_per_10k.or_else(|| match latest.licences {
        Some(l) if l > 0.0 => Some(latest.fines / l * 10_000.0),
        _ => None,
    });

    Some(StateSummary {
        jurisdiction,
        name: jurisdiction.name(),
        latest_year: latest.year,
        total_fines: latest.fines,
        licences: latest.licences,
        rate_per_10k,
        top_age_group: top_group(&data.age, jurisdiction, |r| r.age_group),
        top_region: top_group(&data.location, jurisdiction, |r| r.location),
        remote_share: remote_share(&data.location, &data.regional, jurisdiction),
        detection: match detection_split(&data.detection, jurisdiction) {
            Some(split) => {
                let year = split.year;
                Coverage::present(split, FactSource::Yearly(year))
            }
            None => Coverage::Absent,
        },
        police_camera_ratio: police_camera_ratio(&data.ratio, jurisdiction),
        peak_month: peak_month(&data.monthly, jurisdiction),
    })
}

/// Summaries for every jurisdiction the rate dataset covers.
pub fn build_all_summaries(data: &Datasets) -> BTreeMap<Jurisdiction, StateSummary> {
    Jurisdiction::ALL
        .iter()
        .filter_map(|&j| build_state_summary(j, data).map(|s| (j, s)))
        .collect()
}

/// Reduce the per-state summaries into the national picture. `None` when no
/// state carries a rate (nothing to average or lead).
pub fn build_national_summary(
    summaries: &BTreeMap<Jurisdiction, StateSummary>,
) -> Option<NationalSummary> {
    let latest_year = summaries.values().map(|s| s.latest_year).max()?;
    let rated: Vec<(Jurisdiction, f64)> = summaries
        .values()
        .filter_map(|s| s.rate_per_10k.map(|r| (s.jurisdiction, r)))
        .collect();
    if rated.is_empty() {
        return None;
    }
    let avg_rate = average(&rated.iter().map(|(_, r)| *r).collect::<Vec<_>>());
    let mut leader = rated[0];
    for &(j, r) in &rated[1..] {
        if r > leader.1 {
            leader = (j, r);
        }
    }
    let remote: Vec<f64> = summaries
        .values()
        .filter_map(|s| s.remote_share.value().copied())
        .collect();
    let remote_share = if remote.is_empty() {
        None
    } else {
        Some(average(&remote))
    };
    Some(NationalSummary {
        latest_year,
        avg_rate,
        leader: leader.0,
        leader_rate: leader.1,
        remote_share,
    })
}

/// Per-jurisdiction rate trajectory (year-ascending values), for movers.
pub fn rate_series(data: &Datasets) -> BTreeMap<Jurisdiction, Vec<f64>> {
    let mut by_state: BTreeMap<Jurisdiction, Vec<(i32, f64)>> = BTreeMap::new();
    for r in &data.rate {
        if let Some(rate) = r.rate_per_10k {
            by_state.entry(r.jurisdiction).or_default().push((r.year, rate));
        }
    }
    by_state
        .into_iter()
        .map(|(j, mut pts)| {
            pts.sort_by_key(|(y, _)| *y);
            (j, pts.into_iter().map(|(_, v)| v).collect())
        })
        .collect()
}

/// One jurisdiction's rate keyed by year.
pub fn rate_by_year(data: &Datasets, jurisdiction: Jurisdiction) -> BTreeMap<i32, f64> {
    let mut out = BTreeMap::new();
    for r in &data.rate {
        if r.jurisdiction == jurisdiction {
            if let Some(rate) = r.rate_per_10k {
                // Duplicate years: last occurrence wins, as elsewhere.
                out.insert(r.year, rate);
            }
        }
    }
    out
}

/// National mean rate keyed by year, across whichever jurisdictions have a
/// rate in that year.
pub fn national_rate_by_year(data: &Datasets) -> BTreeMap<i32, f64> {
    let mut acc: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
    for r in &data.rate {
        if let Some(rate) = r.rate_per_10k {
            acc.entry(r.year).or_default().push(rate);
        }
    }
    acc.into_iter().map(|(y, v)| (y, average(&v))).collect()
}
