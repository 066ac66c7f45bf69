// Comparator/ranker: orderings and movement facts derived from aggregated
// series. These feed both the KPI tiles and the narrative sentences.
use crate::types::{GapFact, Mover, Movers, RankedFact};
use crate::util;
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Rank subjects by a metric. The sort is stable, so ties keep their
/// original relative order; no secondary key is applied. Ranks are 1-based
/// and `delta_from_previous` is relative to the subject one rank better.
pub fn rank_by<K: Clone>(pairs: &[(K, f64)], direction: Direction) -> Vec<RankedFact<K>> {
    let mut ordered: Vec<(K, f64)> = pairs.to_vec();
    ordered.sort_by(|a, b| {
        let cmp = a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal);
        match direction {
            Direction::Ascending => cmp,
            Direction::Descending => cmp.reverse(),
        }
    });
    let mut out = Vec::with_capacity(ordered.len());
    let mut previous: Option<f64> = None;
    for (rank, (subject, value)) in ordered.into_iter().enumerate() {
        out.push(RankedFact {
            subject,
            value,
            rank: rank + 1,
            delta_from_previous: previous.map(|p| value - p),
            delta_from_national: None,
        });
        previous = Some(value);
    }
    out
}

/// Fill in each fact's distance from a national reference value.
pub fn with_national_delta<K>(facts: &mut [RankedFact<K>], national: f64) {
    for f in facts {
        f.delta_from_national = Some(f.value - national);
    }
}

/// Largest movers across each subject's first and last series value.
/// Percentage change is `(latest - earliest) / earliest`, undefined when the
/// earliest value is 0 (such subjects are skipped, not reported as zero).
/// The riser is the largest positive change and the cooler the most negative
/// one, selected independently; either can be absent.
pub fn largest_mover<K: Clone + Ord>(series: &BTreeMap<K, Vec<f64>>) -> Movers<K> {
    let mut riser: Option<Mover<K>> = None;
    let mut cooler: Option<Mover<K>> = None;
    for (subject, values) in series {
        if values.len() < 2 {
            continue;
        }
        let earliest = values[0];
        let latest = values[values.len() - 1];
        if earliest == 0.0 || !earliest.is_finite() || !latest.is_finite() {
            continue;
        }
        let pct_change = (latest - earliest) / earliest;
        let mover = Mover {
            subject: subject.clone(),
            earliest,
            latest,
            pct_change,
        };
        if pct_change > 0.0 {
            match &riser {
                Some(best) if pct_change <= best.pct_change => {}
                _ => riser = Some(mover),
            }
        } else if pct_change < 0.0 {
            match &cooler {
                Some(best) if pct_change >= best.pct_change => {}
                _ => cooler = Some(mover),
            }
        }
    }
    Movers { riser, cooler }
}

/// Widest gap between a state series and the national series over their
/// common keys: the maximum `|state - national|`, sign preserved in `delta`.
pub fn widest_gap<K: Clone + Ord>(
    state: &BTreeMap<K, f64>,
    national: &BTreeMap<K, f64>,
) -> Option<GapFact<K>> {
    let mut widest: Option<GapFact<K>> = None;
    for (key, state_value) in state {
        let Some(national_value) = national.get(key) else {
            continue;
        };
        let delta = state_value - national_value;
        if !delta.is_finite() {
            continue;
        }
        match &widest {
            Some(best) if delta.abs() <= best.delta.abs() => {}
            _ => {
                widest = Some(GapFact {
                    key: key.clone(),
                    state_value: *state_value,
                    national_value: *national_value,
                    delta,
                })
            }
        }
    }
    widest
}

/// Median of a metric across summaries, for "most states cluster around X"
/// copy. `None` on empty input.
pub fn median_cluster(values: &[f64]) -> Option<f64> {
    util::median(values.to_vec())
}
