use super::types::{FrontRearSplit, ScoredCandidate, SplitPick, SplitSkipReason};
use crate::domain::race::RaceProfile;
use crate::domain::tire::TreadType;

const SPLIT_RATIONALE: &str = "Faster front for reduced rolling resistance on straights, grippier \
rear for traction on loose climbs and corners";

/// Pairs a fast file-tread front with a grippier rear on moderately technical
/// courses. `ranked` is the whole filtered catalog, best first; `top_count`
/// is the number of picks actually returned.
pub fn advise_front_rear_split(
    profile: &RaceProfile,
    ranked: &[ScoredCandidate<'_>],
    top_count: usize,
) -> FrontRearSplit {
    let not_applicable = |reason| FrontRearSplit::NotApplicable { reason };

    if !(2..4).contains(&profile.technical_rating) {
        return not_applicable(SplitSkipReason::TechnicalRatingOutOfRange);
    }
    if top_count < 2 {
        return not_applicable(SplitSkipReason::TooFewCandidates);
    }

    let front = ranked.iter().find(|candidate| candidate.tire.tread_type == TreadType::File);
    let rear = ranked.iter().find(|candidate| {
        matches!(candidate.tire.tread_type, TreadType::Knobby | TreadType::Aggressive)
    });

    match (front, rear) {
        (Some(front), Some(rear)) if front.tire.id == rear.tire.id => {
            not_applicable(SplitSkipReason::SameTire)
        }
        (Some(front), Some(rear)) => FrontRearSplit::Recommended {
            front: SplitPick::from_candidate(front),
            rear: SplitPick::from_candidate(rear),
            rationale: SPLIT_RATIONALE.to_string(),
        },
        _ => not_applicable(SplitSkipReason::MissingTreadCategory),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::advise_front_rear_split;
    use crate::domain::race::{RaceProfile, SurfaceCategory};
    use crate::domain::tire::TireRecord;
    use crate::recommend::{rank_candidates, FrontRearSplit, ScoreCalculator, SplitSkipReason};

    fn tire(id: &str, tread: &str, uses: &[&str]) -> TireRecord {
        serde_json::from_value(json!({
            "id": id,
            "brand": "Test",
            "name": id,
            "widths_mm": [38, 40, 42],
            "tread_type": tread,
            "recommended_use": uses,
            "puncture_resistance": "moderate",
            "wet_traction": "fair",
            "mud_clearance": "low"
        }))
        .expect("fixture should parse")
    }

    fn profile(technical_rating: u8) -> RaceProfile {
        RaceProfile {
            surface_category: SurfaceCategory::Mixed,
            technical_rating,
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

    fn catalog() -> Vec<TireRecord> {
        vec![
            tire("knobby-a", "knobby", &["mixed gravel", "all-rounder"]),
            tire("file-a", "file", &["mixed gravel"]),
            tire("file-b", "file", &["fast gravel"]),
            tire("aggro", "aggressive", &["technical terrain"]),
        ]
    }

    fn split_for(technical_rating: u8, tires: &[TireRecord]) -> FrontRearSplit {
        let race = profile(technical_rating);
        let refs: Vec<&TireRecord> = tires.iter().collect();
        let ranked = rank_candidates(&refs, &race, &ScoreCalculator::new());
        advise_front_rear_split(&race, &ranked, ranked.len().min(3))
    }

    #[test]
    fn picks_best_file_front_and_best_knobby_rear() {
        match split_for(2, &catalog()) {
            FrontRearSplit::Recommended { front, rear, rationale } => {
                assert_eq!(front.tire_id.0, "file-a");
                assert_eq!(rear.tire_id.0, "knobby-a");
                assert_eq!(front.width_mm, 40);
                assert!(rationale.starts_with("Faster front"));
            }
            other => panic!("expected a split, got {other:?}"),
        }
    }

    #[test]
    fn outside_rating_window_is_not_applicable() {
        for rating in [1, 4, 5] {
            assert_eq!(
                split_for(rating, &catalog()),
                FrontRearSplit::NotApplicable {
                    reason: SplitSkipReason::TechnicalRatingOutOfRange
                }
            );
        }
    }

    #[test]
    fn missing_file_tread_is_not_applicable() {
        let tires = vec![
            tire("knobby-a", "knobby", &["mixed gravel"]),
            tire("aggro", "aggressive", &["technical terrain"]),
        ];
        assert_eq!(
            split_for(3, &tires),
            FrontRearSplit::NotApplicable { reason: SplitSkipReason::MissingTreadCategory }
        );
    }

    #[test]
    fn single_pick_is_not_applicable() {
        let tires = vec![tire("only", "file", &["mixed gravel"])];
        assert_eq!(
            split_for(2, &tires),
            FrontRearSplit::NotApplicable { reason: SplitSkipReason::TooFewCandidates }
        );
    }
}
