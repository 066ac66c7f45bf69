// Narrative formatter: fixed-template sentences built from summaries and
// ranked facts. Every function is pure, every branch on missing data lands
// on a specific "needs more data" sentence; a sentence never interpolates a
// value that is not there.
use crate::domain::Jurisdiction;
use crate::types::{
    Coverage, FactSource, GapFact, Movers, NationalSummary, StateSummary,
};
use crate::util::{format_decimal, format_int, format_pct, month_name};

/// The full story paragraph for one summarizable state.
pub fn state_story(s: &StateSummary) -> String {
    [
        headline(s),
        age_sentence(s),
        remote_sentence(s),
        detection_sentence(s),
        ratio_sentence(s),
        peak_month_sentence(s),
    ]
    .join(" ")
}

/// The exact fallback for a jurisdiction the rate dataset cannot summarize.
pub fn missing_state_story(jurisdiction: Jurisdiction) -> String {
    format!(
        "We need more data for {} before we can tell its story.",
        jurisdiction.name()
    )
}

pub fn headline(s: &StateSummary) -> String {
    match s.rate_per_10k {
        Some(rate) => format!(
            "{} issued {} fines in {}, translating to {} penalties per 10k licence holders.",
            s.name,
            format_int(s.total_fines.round() as i64),
            s.latest_year,
            format_decimal(rate)
        ),
        None => format!(
            "{} issued {} fines in {}; licence figures are unavailable, so no per-10k rate can be quoted.",
            s.name,
            format_int(s.total_fines.round() as i64),
            s.latest_year
        ),
    }
}

pub fn age_sentence(s: &StateSummary) -> String {
    match &s.top_age_group {
        Coverage::Present { value, source } => {
            let year = year_phrase(*source);
            match value.share {
                Some(share) => format!(
                    "Drivers aged {} took the largest share of fines{}, at {}.",
                    value.label.label(),
                    year,
                    format_pct(share)
                ),
                None => format!(
                    "Drivers aged {} took the largest share of fines{}.",
                    value.label.label(),
                    year
                ),
            }
        }
        Coverage::Absent => format!("Age breakdowns are not yet published for {}.", s.name),
    }
}

pub fn remote_sentence(s: &StateSummary) -> String {
    match &s.remote_share {
        Coverage::Present {
            value,
            source: FactSource::Yearly(year),
        } => format!(
            "Remote and outer-regional roads drew {} of fines in {}.",
            format_pct(*value),
            year
        ),
        Coverage::Present {
            value,
            source: FactSource::Regional,
        } => format!(
            "Regional benchmarks suggest remote roads draw around {} of fines, though no yearly breakdown exists.",
            format_pct(*value)
        ),
        Coverage::Absent => format!("Location breakdowns are not yet published for {}.", s.name),
    }
}

pub fn detection_sentence(s: &StateSummary) -> String {
    match &s.detection {
        Coverage::Present { value, .. } => format!(
            "Cameras caught {} of offences in {} ({} camera versus {} police-issued fines).",
            format_pct(value.camera_share),
            value.year,
            format_int(value.camera_fines.round() as i64),
            format_int(value.police_fines.round() as i64)
        ),
        Coverage::Absent => format!(
            "Camera and police detection figures are not yet published for {}.",
            s.name
        ),
    }
}

pub fn ratio_sentence(s: &StateSummary) -> String {
    match &s.police_camera_ratio {
        Coverage::Present { value, source } => format!(
            "Police officers wrote {} fines for every camera fine{}.",
            format_decimal(*value),
            year_phrase(*source)
        ),
        Coverage::Absent => format!(
            "No police-to-camera ratio has been published for {}.",
            s.name
        ),
    }
}

pub fn peak_month_sentence(s: &StateSummary) -> String {
    match &s.peak_month {
        Coverage::Present { value, .. } => format!(
            "The busiest month on record was {} {}, with {} fines.",
            month_name(value.month),
            value.year,
            format_int(value.fines.round() as i64)
        ),
        Coverage::Absent => format!("Monthly figures are not yet published for {}.", s.name),
    }
}

/// National overview sentence; the no-data branch covers a dataset where no
/// state carries a rate.
pub fn national_story(national: Option<&NationalSummary>) -> String {
    let Some(n) = national else {
        return "National figures are still being assembled; we need more data before a \
                country-wide picture emerges."
            .to_string();
    };
    let mut out = format!(
        "Nationally, fines ran at {} per 10k licence holders around {}, with {} leading at {}.",
        format_decimal(n.avg_rate),
        n.latest_year,
        n.leader.name(),
        format_decimal(n.leader_rate)
    );
    if let Some(share) = n.remote_share {
        out.push_str(&format!(
            " Remote-family roads account for {} of fines where location is recorded.",
            format_pct(share)
        ));
    }
    out
}

/// Movement sentence built from the rate-trajectory movers.
pub fn movers_story(movers: &Movers<Jurisdiction>) -> String {
    let mut parts = Vec::new();
    if let Some(r) = &movers.riser {
        parts.push(format!(
            "{} is the fastest riser, up {} ({} to {} per 10k).",
            r.subject.name(),
            format_pct(r.pct_change),
            format_decimal(r.earliest),
            format_decimal(r.latest)
        ));
    }
    if let Some(c) = &movers.cooler {
        parts.push(format!(
            "{} cooled the most, down {} ({} to {} per 10k).",
            c.subject.name(),
            format_pct(c.pct_change.abs()),
            format_decimal(c.earliest),
            format_decimal(c.latest)
        ));
    }
    if parts.is_empty() {
        return "No state shows a clear movement trend yet.".to_string();
    }
    parts.join(" ")
}

/// Widest-gap sentence for one state against the national series, keyed by
/// year.
pub fn gap_story(jurisdiction: Jurisdiction, gap: Option<&GapFact<i32>>) -> String {
    let Some(g) = gap else {
        return format!(
            "{} shares too little overlapping data with the national series to compare.",
            jurisdiction.name()
        );
    };
    let direction = if g.delta >= 0.0 { "above" } else { "below" };
    format!(
        "{}'s widest split from the national average came in {}, sitting {} points {} it.",
        jurisdiction.name(),
        g.key,
        format_decimal(g.delta.abs()),
        direction
    )
}

fn year_phrase(source: FactSource) -> String {
    match source.year() {
        Some(y) => format!(" in {}", y),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AgeGroup;
    use crate::types::{DetectionSplit, GroupShare, MonthFact};

    fn bare_summary() -> StateSummary {
        StateSummary {
            jurisdiction: Jurisdiction::Vic,
            name: Jurisdiction::Vic.name(),
            latest_year: 2023,
            total_fines: 13_000.0,
            licences: Some(1_000_000.0),
            rate_per_10k: Some(130.0),
            top_age_group: Coverage::Absent,
            top_region: Coverage::Absent,
            remote_share: Coverage::Absent,
            detection: Coverage::Absent,
            police_camera_ratio: Coverage::Absent,
            peak_month: Coverage::Absent,
        }
    }

    #[test]
    fn headline_with_rate() {
        assert_eq!(
            headline(&bare_summary()),
            "Victoria issued 13,000 fines in 2023, translating to 130.0 penalties per 10k \
             licence holders."
        );
    }

    #[test]
    fn headline_without_rate_never_interpolates_missing() {
        let mut s = bare_summary();
        s.rate_per_10k = None;
        let text = headline(&s);
        assert!(text.contains("licence figures are unavailable"));
        assert!(!text.contains("per 10k licence holders."));
    }

    #[test]
    fn age_sentence_with_share() {
        let mut s = bare_summary();
        s.top_age_group = Coverage::present(
            GroupShare {
                label: AgeGroup::Age40To64,
                fines: 800.0,
                share: Some(800.0 / 1300.0),
            },
            FactSource::Yearly(2023),
        );
        assert_eq!(
            age_sentence(&s),
            "Drivers aged 40-64 took the largest share of fines in 2023, at 61.5%."
        );
    }

    #[test]
    fn remote_wording_depends_on_source_tier() {
        let mut s = bare_summary();
        s.remote_share = Coverage::present(0.4, FactSource::Yearly(2023));
        assert_eq!(
            remote_sentence(&s),
            "Remote and outer-regional roads drew 40.0% of fines in 2023."
        );
        s.remote_share = Coverage::present(0.75, FactSource::Regional);
        let text = remote_sentence(&s);
        assert!(text.contains("no yearly breakdown exists"));
        assert!(text.contains("75.0%"));
    }

    #[test]
    fn absent_fields_fall_to_unavailable_sentences() {
        let s = bare_summary();
        assert_eq!(
            age_sentence(&s),
            "Age breakdowns are not yet published for Victoria."
        );
        assert_eq!(
            remote_sentence(&s),
            "Location breakdowns are not yet published for Victoria."
        );
        assert_eq!(
            detection_sentence(&s),
            "Camera and police detection figures are not yet published for Victoria."
        );
        assert_eq!(
            peak_month_sentence(&s),
            "Monthly figures are not yet published for Victoria."
        );
    }

    #[test]
    fn missing_state_template() {
        assert_eq!(
            missing_state_story(Jurisdiction::Tas),
            "We need more data for Tasmania before we can tell its story."
        );
    }

    #[test]
    fn full_story_assembles_all_sentences() {
        let mut s = bare_summary();
        s.detection = Coverage::present(
            DetectionSplit {
                year: 2023,
                camera_share: 0.6,
                camera_fines: 600.0,
                police_fines: 400.0,
            },
            FactSource::Yearly(2023),
        );
        s.peak_month = Coverage::present(
            MonthFact {
                year: 2023,
                month: 7,
                fines: 1_200.0,
            },
            FactSource::Yearly(2023),
        );
        let story = state_story(&s);
        assert!(story.starts_with("Victoria issued 13,000 fines in 2023"));
        assert!(story.contains("Cameras caught 60.0% of offences in 2023"));
        assert!(story.contains("July 2023, with 1,200 fines."));
    }

    #[test]
    fn national_story_branches() {
        assert!(national_story(None).contains("we need more data"));
        let n = NationalSummary {
            latest_year: 2023,
            avg_rate: 120.0,
            leader: Jurisdiction::Vic,
            leader_rate: 130.0,
            remote_share: Some(0.31),
        };
        let text = national_story(Some(&n));
        assert!(text.contains("120.0 per 10k"));
        assert!(text.contains("Victoria leading at 130.0"));
        assert!(text.contains("31.0% of fines"));
    }

    #[test]
    fn gap_story_sign_wording() {
        let above = GapFact {
            key: 2023,
            state_value: 130.0,
            national_value: 112.0,
            delta: 18.0,
        };
        assert!(gap_story(Jurisdiction::Vic, Some(&above)).contains("18.0 points above"));
        let below = GapFact {
            key: 2022,
            state_value: 80.0,
            national_value: 110.0,
            delta: -30.0,
        };
        assert!(gap_story(Jurisdiction::Act, Some(&below)).contains("30.0 points below"));
        assert!(gap_story(Jurisdiction::Act, None).contains("too little overlapping data"));
    }
}
