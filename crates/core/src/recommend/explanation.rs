use super::types::PickExplanation;
use crate::domain::race::RaceProfile;
use crate::domain::tire::{MudClearance, PunctureResistance, TireRecord, WetTraction};

const MAX_FACTS: usize = 3;
const CRR_FAST_WATTS: f64 = 30.0;
const CRR_QUICK_WATTS: f64 = 35.0;
const DEFAULT_TAGLINE: &str = "Solid all-round choice";

/// Renders a measurement without a trailing `.0`.
pub fn format_measure(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        let text = format!("{value:.2}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

fn condition_notes(tire: &TireRecord, profile: &RaceProfile) -> Vec<String> {
    let mut notes = Vec::new();
    if profile.needs_puncture {
        match tire.puncture_resistance {
            PunctureResistance::High => notes.push("high puncture resistance for sharp surfaces"),
            PunctureResistance::Low => {
                notes.push("low puncture protection, consider carefully for sharp surfaces")
            }
            PunctureResistance::Moderate => {}
        }
    }
    if profile.needs_wet {
        match tire.wet_traction {
            WetTraction::Good => notes.push("strong wet grip"),
            WetTraction::Poor => notes.push("limited wet traction, monitor the forecast"),
            WetTraction::Fair => {}
        }
    }
    if profile.needs_mud {
        match tire.mud_clearance {
            MudClearance::High => notes.push("excellent mud shedding"),
            MudClearance::Moderate => notes.push("decent mud clearance"),
            MudClearance::Low | MudClearance::None => {}
        }
    }
    notes.into_iter().map(str::to_string).collect()
}

/// Builds the "why this tire" facts for a pick at `width_mm`.
pub fn explain_pick(tire: &TireRecord, profile: &RaceProfile, width_mm: u16) -> PickExplanation {
    let mut facts = Vec::new();

    if let Some(watts) = tire.crr_watts_near(width_mm) {
        let qualifier = if watts <= CRR_FAST_WATTS {
            " (among the fastest tested)"
        } else if watts <= CRR_QUICK_WATTS {
            " (fast for a knobby)"
        } else {
            ""
        };
        facts.push(format!("{}W rolling resistance{qualifier}", format_measure(watts)));
    }
    if let Some(msrp) = tire.msrp_usd {
        facts.push(format!("${:.2} MSRP", msrp.round_dp(2)));
    }
    if let Some((measured_width, grams)) = tire.weight_near(width_mm) {
        facts.push(format!("{}g per tire ({measured_width}mm)", format_measure(grams)));
    }
    facts.extend(condition_notes(tire, profile));
    facts.truncate(MAX_FACTS);

    let tagline = if tire.tagline.trim().is_empty() {
        DEFAULT_TAGLINE.to_string()
    } else {
        tire.tagline.trim().to_string()
    };

    PickExplanation { facts, tagline }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{explain_pick, format_measure};
    use crate::domain::race::{RaceProfile, SurfaceCategory};
    use crate::domain::tire::TireRecord;

    fn profile() -> RaceProfile {
        RaceProfile {
            surface_category: SurfaceCategory::Technical,
            technical_rating: 3,
            distance_mi: 100.0,
            elevation_ft: 0.0,
            climbing_ratio: 0.0,
            precip_pct: 60.0,
            needs_puncture: true,
            needs_wet: true,
            needs_mud: false,
            needs_speed: false,
            needs_comfort: true,
            corpus: String::new(),
            features: Vec::new(),
        }
    }

    fn bare_tire() -> TireRecord {
        serde_json::from_value(json!({
            "id": "bare",
            "brand": "Test",
            "name": "Bare",
            "tagline": "Quietly competent",
            "widths_mm": [40, 45],
            "tread_type": "knobby",
            "recommended_use": ["mixed gravel"],
            "puncture_resistance": "moderate",
            "wet_traction": "fair",
            "mud_clearance": "low"
        }))
        .expect("fixture should parse")
    }

    #[test]
    fn measurements_render_without_trailing_zeros() {
        assert_eq!(format_measure(28.0), "28");
        assert_eq!(format_measure(28.5), "28.5");
        assert_eq!(format_measure(410.25), "410.25");
    }

    #[test]
    fn facts_follow_priority_and_cap_at_three() {
        let mut tire = bare_tire();
        tire.crr_watts_at_29kmh =
            Some(serde_json::from_value(json!({"40": 29.5, "45": 31.0})).expect("crr map"));
        tire.weight_grams = serde_json::from_value(json!({"45": 520})).expect("weight map");
        tire.msrp_usd = Some(rust_decimal::Decimal::new(7500, 2));
        tire.puncture_resistance = crate::domain::tire::PunctureResistance::High;

        let explanation = explain_pick(&tire, &profile(), 42);

        assert_eq!(
            explanation.facts,
            vec![
                "29.5W rolling resistance (among the fastest tested)".to_string(),
                "$75.00 MSRP".to_string(),
                "520g per tire (45mm)".to_string(),
            ]
        );
        assert_eq!(
            explanation.for_race("Unbound 200 - Emporia, Kansas"),
            "For Unbound 200: 29.5W rolling resistance (among the fastest tested), $75.00 MSRP, \
             520g per tire (45mm). Quietly competent"
        );
    }

    #[test]
    fn condition_notes_fill_in_when_measurements_are_missing() {
        let mut tire = bare_tire();
        tire.wet_traction = crate::domain::tire::WetTraction::Good;

        let explanation = explain_pick(&tire, &profile(), 40);
        assert_eq!(explanation.facts, vec!["strong wet grip".to_string()]);
    }

    #[test]
    fn tagline_stands_alone_without_facts() {
        let mut race = profile();
        race.needs_puncture = false;
        race.needs_wet = false;

        let explanation = explain_pick(&bare_tire(), &race, 40);
        assert!(explanation.facts.is_empty());
        assert_eq!(explanation.for_race("Mid South"), "For Mid South: Quietly competent");
    }
}
