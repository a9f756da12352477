//! Additive scoring for tire candidates

use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use super::ranking::target_width;
use crate::domain::race::{RaceProfile, SurfaceCategory};
use crate::domain::tire::{MudClearance, PunctureResistance, TireRecord, WetTraction};

/// Calibration constants for the scoring stage. The different magnitudes are
/// the relative weighting; terms are never normalised against each other.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Bonus per `recommended_use` entry matching a target use-case phrase
    pub use_match: f64,
    /// Penalty per `avoid_use` entry naming a present race condition (negative)
    pub avoid_penalty: f64,
    /// Wattage treated as the slowest observed
    pub crr_ceiling_watts: f64,
    pub crr_divisor: f64,
    pub puncture_high: f64,
    pub puncture_moderate: f64,
    pub weight_ceiling_grams: f64,
    pub weight_divisor: f64,
    /// Feet of climbing per mile above which weight matters
    pub climbing_ratio_threshold: f64,
    pub wet_good: f64,
    pub wet_fair: f64,
    pub mud_high: f64,
    pub mud_moderate: f64,
    pub mud_low: f64,
    pub comfort_wide: f64,
    pub comfort_wide_min_mm: u16,
    pub comfort_durable_high: f64,
    pub comfort_durable_moderate: f64,
    pub terrain_keyword: f64,
    pub price_cheap: f64,
    pub price_cheap_max_usd: f64,
    pub price_mid: f64,
    pub price_mid_max_usd: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        super::DEFAULT_WEIGHTS
    }
}

/// Per-term contributions to a candidate's score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub use_match: f64,
    pub avoid_penalty: f64,
    pub rolling_resistance: f64,
    pub puncture: f64,
    pub weight: f64,
    pub wet_traction: f64,
    pub mud_clearance: f64,
    pub comfort: f64,
    pub terrain_keywords: f64,
    pub price: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.use_match
            + self.avoid_penalty
            + self.rolling_resistance
            + self.puncture
            + self.weight
            + self.wet_traction
            + self.mud_clearance
            + self.comfort
            + self.terrain_keywords
            + self.price
    }
}

/// Keywords rewarded when they appear in both the terrain text and a tire's
/// recommended uses.
const TERRAIN_KEYWORDS: &[&str] = &[
    "sharp rock",
    "chunky",
    "long distance",
    "durability",
    "comfort",
    "fast gravel",
    "smooth",
    "rocky",
    "loose",
    "technical",
    "singletrack",
    "mud",
    "wet",
    "clay",
];

/// Target use-case phrases for a surface category.
pub fn use_case_phrases(category: SurfaceCategory) -> &'static [&'static str] {
    match category {
        SurfaceCategory::Fast => {
            &["fast gravel", "road-to-gravel", "smooth hardpack", "dry racing"]
        }
        SurfaceCategory::Mixed => {
            &["mixed gravel", "all-rounder", "variable conditions", "fast mixed"]
        }
        SurfaceCategory::Technical => {
            &["technical terrain", "rocky", "loose over hard", "mixed technical"]
        }
        SurfaceCategory::Muddy => &["mud", "wet", "clay", "saturated courses"],
        SurfaceCategory::Wet => &["wet", "wet technical", "mixed wet"],
    }
}

/// Conditions an `avoid_use` entry is checked against, derived from the
/// profile flags.
pub fn present_conditions(profile: &RaceProfile) -> Vec<&'static str> {
    let mut conditions = Vec::new();
    if profile.needs_mud {
        conditions.extend(["mud", "wet"]);
    }
    if profile.needs_wet {
        conditions.push("wet");
    }
    if profile.needs_puncture {
        conditions.push("sharp rock");
    }
    if profile.needs_speed {
        conditions.extend(["smooth", "fast"]);
    }
    conditions
}

/// Score calculator for tire candidates
#[derive(Debug, Clone, Default)]
pub struct ScoreCalculator {
    weights: ScoringWeights,
}

impl ScoreCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Total score of `tire` for `profile`.
    pub fn score(&self, tire: &TireRecord, profile: &RaceProfile) -> f64 {
        self.breakdown(tire, profile).total()
    }

    pub fn breakdown(&self, tire: &TireRecord, profile: &RaceProfile) -> ScoreBreakdown {
        ScoreBreakdown {
            use_match: self.use_match_score(tire, profile.surface_category),
            avoid_penalty: self.avoid_penalty(tire, profile),
            rolling_resistance: self.rolling_resistance_score(tire, profile),
            puncture: self.puncture_score(tire, profile),
            weight: self.weight_score(tire, profile),
            wet_traction: self.wet_traction_score(tire, profile),
            mud_clearance: self.mud_clearance_score(tire, profile),
            comfort: self.comfort_score(tire, profile),
            terrain_keywords: self.terrain_keyword_score(tire, &profile.corpus),
            price: self.price_score(tire),
        }
    }

    pub fn use_match_score(&self, tire: &TireRecord, category: SurfaceCategory) -> f64 {
        let phrases = use_case_phrases(category);
        let matches = tire
            .recommended_use
            .iter()
            .map(|entry| entry.to_lowercase())
            .filter(|entry| phrases.iter().any(|phrase| entry.contains(phrase)))
            .count();
        matches as f64 * self.weights.use_match
    }

    pub fn avoid_penalty(&self, tire: &TireRecord, profile: &RaceProfile) -> f64 {
        let conditions = present_conditions(profile);
        if conditions.is_empty() {
            return 0.0;
        }
        let hits = tire
            .avoid_use
            .iter()
            .map(|entry| entry.to_lowercase())
            .filter(|entry| conditions.iter().any(|condition| entry.contains(condition)))
            .count();
        hits as f64 * self.weights.avoid_penalty
    }

    /// Uses the wattage measured nearest to the width this tire would be
    /// recommended at for the race.
    pub fn rolling_resistance_score(&self, tire: &TireRecord, profile: &RaceProfile) -> f64 {
        if !profile.needs_speed {
            return 0.0;
        }
        let target = target_width(profile.technical_rating);
        let width = tire.closest_width(target).unwrap_or(target);
        match tire.crr_watts_near(width) {
            Some(watts) => {
                ((self.weights.crr_ceiling_watts - watts) / self.weights.crr_divisor).max(0.0)
            }
            None => 0.0,
        }
    }

    pub fn puncture_score(&self, tire: &TireRecord, profile: &RaceProfile) -> f64 {
        if !profile.needs_puncture {
            return 0.0;
        }
        match tire.puncture_resistance {
            PunctureResistance::High => self.weights.puncture_high,
            PunctureResistance::Moderate => self.weights.puncture_moderate,
            PunctureResistance::Low => 0.0,
        }
    }

    pub fn weight_score(&self, tire: &TireRecord, profile: &RaceProfile) -> f64 {
        if profile.climbing_ratio <= self.weights.climbing_ratio_threshold {
            return 0.0;
        }
        match tire.weight_grams.mean() {
            Some(avg) => ((self.weights.weight_ceiling_grams - avg) / self.weights.weight_divisor)
                .max(0.0),
            None => 0.0,
        }
    }

    pub fn wet_traction_score(&self, tire: &TireRecord, profile: &RaceProfile) -> f64 {
        if !profile.needs_wet {
            return 0.0;
        }
        match tire.wet_traction {
            WetTraction::Good => self.weights.wet_good,
            WetTraction::Fair => self.weights.wet_fair,
            WetTraction::Poor => 0.0,
        }
    }

    pub fn mud_clearance_score(&self, tire: &TireRecord, profile: &RaceProfile) -> f64 {
        if !profile.needs_mud {
            return 0.0;
        }
        match tire.mud_clearance {
            MudClearance::High => self.weights.mud_high,
            MudClearance::Moderate => self.weights.mud_moderate,
            MudClearance::Low => self.weights.mud_low,
            MudClearance::None => 0.0,
        }
    }

    pub fn comfort_score(&self, tire: &TireRecord, profile: &RaceProfile) -> f64 {
        if !profile.needs_comfort {
            return 0.0;
        }
        let wide = match tire.max_width() {
            Some(width) if width >= self.weights.comfort_wide_min_mm => self.weights.comfort_wide,
            _ => 0.0,
        };
        let durable = match tire.puncture_resistance {
            PunctureResistance::High => self.weights.comfort_durable_high,
            PunctureResistance::Moderate => self.weights.comfort_durable_moderate,
            PunctureResistance::Low => 0.0,
        };
        wide + durable
    }

    /// One bonus per keyword, however many recommended uses mention it.
    pub fn terrain_keyword_score(&self, tire: &TireRecord, corpus: &str) -> f64 {
        let uses: Vec<String> =
            tire.recommended_use.iter().map(|entry| entry.to_lowercase()).collect();
        let hits = TERRAIN_KEYWORDS
            .iter()
            .filter(|keyword| corpus.contains(*keyword))
            .filter(|keyword| uses.iter().any(|entry| entry.contains(*keyword)))
            .count();
        hits as f64 * self.weights.terrain_keyword
    }

    /// Tires without a listed price get no value bonus.
    pub fn price_score(&self, tire: &TireRecord) -> f64 {
        let Some(msrp) = tire.msrp_usd.and_then(|msrp| msrp.to_f64()) else {
            return 0.0;
        };
        if msrp <= self.weights.price_cheap_max_usd {
            self.weights.price_cheap
        } else if msrp <= self.weights.price_mid_max_usd {
            self.weights.price_mid
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{present_conditions, ScoreCalculator, ScoringWeights};
    use crate::domain::race::{RaceProfile, SurfaceCategory};
    use crate::domain::tire::TireRecord;

    fn profile() -> RaceProfile {
        RaceProfile {
            surface_category: SurfaceCategory::Mixed,
            technical_rating: 2,
            distance_mi: 60.0,
            elevation_ft: 3000.0,
            climbing_ratio: 50.0,
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

    fn tire() -> TireRecord {
        serde_json::from_value(json!({
            "id": "pathfinder",
            "brand": "Specialized",
            "name": "Pathfinder Pro",
            "widths_mm": [38, 42, 47],
            "tread_type": "file",
            "recommended_use": ["Mixed gravel", "fast gravel", "smooth hardpack"],
            "avoid_use": ["deep mud", "sharp rock gardens"],
            "puncture_resistance": "moderate",
            "wet_traction": "fair",
            "mud_clearance": "low",
            "crr_watts_at_29kmh": {"38": 29.0, "42": 31.0},
            "weight_grams": {"38": 420, "42": 480},
            "msrp_usd": 65.0
        }))
        .expect("fixture should parse")
    }

    #[test]
    fn default_weights_match_calibration() {
        let weights = ScoringWeights::default();
        assert_eq!(weights.use_match, 10.0);
        assert_eq!(weights.avoid_penalty, -15.0);
        assert_eq!(weights.crr_ceiling_watts, 45.0);
        assert_eq!(weights.comfort_wide_min_mm, 45);
    }

    #[test]
    fn use_match_counts_each_matching_entry_case_insensitively() {
        let calc = ScoreCalculator::new();
        assert_eq!(calc.use_match_score(&tire(), SurfaceCategory::Mixed), 10.0);
        assert_eq!(calc.use_match_score(&tire(), SurfaceCategory::Fast), 20.0);
        assert_eq!(calc.use_match_score(&tire(), SurfaceCategory::Muddy), 0.0);
    }

    #[test]
    fn avoid_penalty_applies_per_entry_naming_present_condition() {
        let calc = ScoreCalculator::new();
        let mut race = profile();
        assert_eq!(calc.avoid_penalty(&tire(), &race), 0.0);

        race.needs_mud = true;
        race.needs_puncture = true;
        assert_eq!(calc.avoid_penalty(&tire(), &race), -30.0);
    }

    #[test]
    fn present_conditions_follow_profile_flags() {
        let mut race = profile();
        race.needs_mud = true;
        race.needs_speed = true;
        assert_eq!(present_conditions(&race), vec!["mud", "wet", "smooth", "fast"]);
    }

    #[test]
    fn rolling_resistance_uses_wattage_at_target_width() {
        let calc = ScoreCalculator::new();
        let mut race = profile();
        assert_eq!(calc.rolling_resistance_score(&tire(), &race), 0.0);

        race.needs_speed = true;
        race.technical_rating = 1;
        // target 38 mm -> 29 W
        assert_eq!(calc.rolling_resistance_score(&tire(), &race), 8.0);

        race.technical_rating = 3;
        // target 42 mm -> 31 W
        assert_eq!(calc.rolling_resistance_score(&tire(), &race), 7.0);
    }

    #[test]
    fn weight_bonus_uses_average_weight_above_climbing_threshold() {
        let calc = ScoreCalculator::new();
        let mut race = profile();
        assert_eq!(calc.weight_score(&tire(), &race), 0.0);

        race.climbing_ratio = 95.0;
        // mean 450 g -> (600 - 450) / 50
        assert_eq!(calc.weight_score(&tire(), &race), 3.0);
    }

    #[test]
    fn comfort_combines_width_and_durability() {
        let calc = ScoreCalculator::new();
        let mut race = profile();
        race.needs_comfort = true;
        assert_eq!(calc.comfort_score(&tire(), &race), 5.0);
    }

    #[test]
    fn terrain_keywords_score_once_per_keyword() {
        let calc = ScoreCalculator::new();
        let corpus = "smooth fast gravel roads with some mud";
        // "fast gravel" and "smooth" are in both; "mud" is not in recommended uses
        assert_eq!(calc.terrain_keyword_score(&tire(), corpus), 10.0);
    }

    #[test]
    fn price_bonus_tiers() {
        let calc = ScoreCalculator::new();
        let mut cheap = tire();
        cheap.msrp_usd = Some(rust_decimal::Decimal::new(5999, 2));
        let mut pricey = tire();
        pricey.msrp_usd = Some(rust_decimal::Decimal::new(8500, 2));
        let mut unlisted = tire();
        unlisted.msrp_usd = None;

        assert_eq!(calc.price_score(&cheap), 2.0);
        assert_eq!(calc.price_score(&tire()), 1.0);
        assert_eq!(calc.price_score(&pricey), 0.0);
        assert_eq!(calc.price_score(&unlisted), 0.0);
    }

    #[test]
    fn total_is_sum_of_breakdown() {
        let calc = ScoreCalculator::new();
        let mut race = profile();
        race.needs_speed = true;
        race.corpus = "smooth fast gravel".to_string();

        let breakdown = calc.breakdown(&tire(), &race);
        assert_eq!(calc.score(&tire(), &race), breakdown.total());
        assert!(breakdown.rolling_resistance > 0.0);
    }
}
