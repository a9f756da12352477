use super::ranking::recommend_width;
use super::scoring::ScoreCalculator;
use super::types::{AlternativePick, ConditionAlternative, ConditionAlternatives, ScoredCandidate};
use crate::domain::race::RaceProfile;
use crate::domain::tire::{TireRecord, TreadType, WetTraction};

const WET_SPECIALIST_BOOST: f64 = 20.0;
const DRY_SPECIALIST_BOOST: f64 = 15.0;
const DRY_SPECIALIST_MAX_CRR_WATTS: f64 = 30.0;

/// Wet and dry backups for the #1 pick, drawn from catalog tires outside the
/// top picks. Ties keep catalog order.
pub fn find_condition_alternatives(
    tires: &[TireRecord],
    profile: &RaceProfile,
    top: &[ScoredCandidate<'_>],
    calculator: &ScoreCalculator,
) -> ConditionAlternatives {
    let Some(primary) = top.first() else {
        return ConditionAlternatives {
            wet: ConditionAlternative::NotNeeded,
            dry: ConditionAlternative::NotNeeded,
        };
    };

    let outside_top: Vec<&TireRecord> = tires
        .iter()
        .filter(|tire| top.iter().all(|picked| picked.tire.id != tire.id))
        .collect();

    let wet = if matches!(primary.tire.wet_traction, WetTraction::Poor | WetTraction::Fair) {
        best_alternative(&outside_top, profile, calculator, |tire, _| {
            (tire.wet_traction == WetTraction::Good).then_some(WET_SPECIALIST_BOOST)
        })
    } else {
        ConditionAlternative::NotNeeded
    };

    let dry = if primary.tire.is_mud_oriented() {
        best_alternative(&outside_top, profile, calculator, |tire, width_mm| {
            if tire.tread_type != TreadType::File {
                return None;
            }
            let fast = tire
                .crr_watts_near(width_mm)
                .is_some_and(|watts| watts <= DRY_SPECIALIST_MAX_CRR_WATTS);
            Some(if fast { DRY_SPECIALIST_BOOST } else { 0.0 })
        })
    } else {
        ConditionAlternative::NotNeeded
    };

    tracing::debug!(
        event_name = "recommend.alternatives.searched",
        wet = wet.pick().is_some(),
        dry = dry.pick().is_some(),
        "condition alternatives searched"
    );
    ConditionAlternatives { wet, dry }
}

/// `boost` returns `None` for ineligible tires and the score boost otherwise.
fn best_alternative(
    candidates: &[&TireRecord],
    profile: &RaceProfile,
    calculator: &ScoreCalculator,
    boost: impl Fn(&TireRecord, u16) -> Option<f64>,
) -> ConditionAlternative {
    let mut best: Option<AlternativePick> = None;

    for &tire in candidates {
        let width_mm = recommend_width(profile.technical_rating, tire);
        let Some(bonus) = boost(tire, width_mm) else {
            continue;
        };
        let score = calculator.score(tire, profile) + bonus;
        if best.as_ref().map_or(true, |current| score > current.score) {
            best = Some(AlternativePick {
                tire_id: tire.id.clone(),
                brand: tire.brand.clone(),
                name: tire.name.clone(),
                score,
                recommended_width_mm: width_mm,
            });
        }
    }

    match best {
        Some(pick) => ConditionAlternative::Found { pick },
        None => ConditionAlternative::NoneFound,
    }
}
