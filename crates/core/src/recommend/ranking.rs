use super::scoring::ScoreCalculator;
use super::types::ScoredCandidate;
use crate::domain::race::RaceProfile;
use crate::domain::tire::TireRecord;

/// Ideal width for a course of the given technical rating.
pub fn target_width(technical_rating: u8) -> u16 {
    match technical_rating {
        0 | 1 => 38,
        2 => 40,
        3 => 42,
        _ => 45,
    }
}

/// The manufactured width of `tire` closest to the target for the rating.
pub fn recommend_width(technical_rating: u8, tire: &TireRecord) -> u16 {
    let target = target_width(technical_rating);
    tire.closest_width(target).unwrap_or(target)
}

/// Scores every candidate and sorts by score, highest first. The sort is
/// stable, so equal scores keep catalog order.
pub fn rank_candidates<'a>(
    candidates: &[&'a TireRecord],
    profile: &RaceProfile,
    calculator: &ScoreCalculator,
) -> Vec<ScoredCandidate<'a>> {
    let mut scored: Vec<ScoredCandidate<'a>> = candidates
        .iter()
        .map(|&tire| {
            let breakdown = calculator.breakdown(tire, profile);
            ScoredCandidate {
                tire,
                score: breakdown.total(),
                width_mm: recommend_width(profile.technical_rating, tire),
                breakdown,
            }
        })
        .collect();
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{rank_candidates, recommend_width, target_width};
    use crate::domain::race::{RaceProfile, SurfaceCategory};
    use crate::domain::tire::TireRecord;
    use crate::recommend::ScoreCalculator;

    fn tire(id: &str, widths: &[u16], uses: &[&str]) -> TireRecord {
        serde_json::from_value(json!({
            "id": id,
            "brand": "Test",
            "name": id,
            "widths_mm": widths,
            "tread_type": "knobby",
            "recommended_use": uses,
            "puncture_resistance": "moderate",
            "wet_traction": "fair",
            "mud_clearance": "low"
        }))
        .expect("fixture should parse")
    }

    fn mixed_profile() -> RaceProfile {
        RaceProfile {
            surface_category: SurfaceCategory::Mixed,
            technical_rating: 3,
            distance_mi: 60.0,
            elevation_ft: 0.0,
            climbing_ratio: 0.0,
            precip_pct: 20.0,
            needs_puncture: false,
            needs_wet: false,
            needs_mud: false,
            needs_speed: false,
            needs_comfort: false,
            corpus: String::new(),
            features: Vec::new(),
        }
    }

    #[test]
    fn target_width_table() {
        assert_eq!(target_width(1), 38);
        assert_eq!(target_width(2), 40);
        assert_eq!(target_width(3), 42);
        assert_eq!(target_width(4), 45);
        assert_eq!(target_width(5), 45);
    }

    #[test]
    fn width_ties_go_to_first_listed_width() {
        let candidate = tire("tie", &[40, 44], &["mixed gravel"]);
        assert_eq!(recommend_width(3, &candidate), 40);
        assert_eq!(recommend_width(5, &candidate), 44);
    }

    #[test]
    fn ranking_is_descending_and_stable_on_ties() {
        let first = tire("first", &[40], &["mixed gravel"]);
        let second = tire("second", &[40], &["mixed gravel"]);
        let best = tire("best", &[42], &["mixed gravel", "all-rounder"]);
        let candidates = vec![&first, &second, &best];

        let ranked = rank_candidates(&candidates, &mixed_profile(), &ScoreCalculator::new());

        let ids: Vec<&str> = ranked.iter().map(|c| c.tire.id.0.as_str()).collect();
        assert_eq!(ids, vec!["best", "first", "second"]);
        assert_eq!(ranked[0].width_mm, 42);
    }
}
