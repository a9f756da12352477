//! Types for the recommendation engine

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::scoring::ScoreBreakdown;
use crate::domain::race::SurfaceCategory;
use crate::domain::tire::{PunctureResistance, TireId, TireRecord, TreadType};

/// A catalog tire scored against one race profile.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate<'a> {
    pub tire: &'a TireRecord,
    pub score: f64,
    pub width_mm: u16,
    pub breakdown: ScoreBreakdown,
}

/// Measured facts about a pick at its recommended width
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickFacts {
    pub crr_watts: Option<f64>,
    pub weight_grams: Option<f64>,
    pub puncture_resistance: PunctureResistance,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub msrp_usd: Option<Decimal>,
}

/// One of the top-N ranked tires
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPick {
    pub rank: usize,
    pub tire_id: TireId,
    pub brand: String,
    pub name: String,
    pub tread_type: TreadType,
    pub score: f64,
    pub recommended_width_mm: u16,
    pub facts: PickFacts,
    pub breakdown: ScoreBreakdown,
    pub explanation: PickExplanation,
}

/// Short natural-language justification for a pick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickExplanation {
    /// At most three facts, most important first.
    pub facts: Vec<String>,
    pub tagline: String,
}

impl PickExplanation {
    /// Facts joined into one sentence, followed by the tagline.
    pub fn summary(&self) -> String {
        let sentence = if self.facts.is_empty() {
            self.tagline.clone()
        } else if self.tagline.is_empty() {
            format!("{}.", self.facts.join(", "))
        } else {
            format!("{}. {}", self.facts.join(", "), self.tagline)
        };
        sentence.trim().to_string()
    }

    /// Summary prefixed with the race's short name ("Unbound 200 - Kansas"
    /// reads as "Unbound 200").
    pub fn for_race(&self, race_name: &str) -> String {
        let short = race_name.split(" - ").next().unwrap_or(race_name).trim();
        format!("For {short}: {}", self.summary())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitPick {
    pub tire_id: TireId,
    pub brand: String,
    pub name: String,
    pub width_mm: u16,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub msrp_usd: Option<Decimal>,
}

impl SplitPick {
    pub fn from_candidate(candidate: &ScoredCandidate<'_>) -> Self {
        Self {
            tire_id: candidate.tire.id.clone(),
            brand: candidate.tire.brand.clone(),
            name: candidate.tire.name.clone(),
            width_mm: candidate.width_mm,
            msrp_usd: candidate.tire.msrp_usd,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitSkipReason {
    /// Below rating 2 one fast tire suits both ends; at 4+ one aggressive tire does.
    TechnicalRatingOutOfRange,
    TooFewCandidates,
    MissingTreadCategory,
    SameTire,
}

/// Front/rear pairing advice. Inapplicability is data, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FrontRearSplit {
    NotApplicable { reason: SplitSkipReason },
    Recommended { front: SplitPick, rear: SplitPick, rationale: String },
}

impl FrontRearSplit {
    pub fn is_applicable(&self) -> bool {
        matches!(self, Self::Recommended { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightBracket {
    #[serde(rename = "140_160lb")]
    Lbs140To160,
    #[serde(rename = "160_180lb")]
    Lbs160To180,
    #[serde(rename = "180_200lb")]
    Lbs180To200,
    #[serde(rename = "200pluslb")]
    Lbs200Plus,
}

impl WeightBracket {
    pub const ALL: [WeightBracket; 4] =
        [Self::Lbs140To160, Self::Lbs160To180, Self::Lbs180To200, Self::Lbs200Plus];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Lbs140To160 => "140-160 lbs",
            Self::Lbs160To180 => "160-180 lbs",
            Self::Lbs180To200 => "180-200 lbs",
            Self::Lbs200Plus => "200+ lbs",
        }
    }

    /// Key used in flattened pressure maps, e.g. `160_180lb`.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Lbs140To160 => "140_160lb",
            Self::Lbs160To180 => "160_180lb",
            Self::Lbs180To200 => "180_200lb",
            Self::Lbs200Plus => "200pluslb",
        }
    }

    pub fn offset_psi(&self) -> f64 {
        match self {
            Self::Lbs140To160 => -3.0,
            Self::Lbs160To180 => 0.0,
            Self::Lbs180To200 => 3.0,
            Self::Lbs200Plus => 6.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RideCondition {
    Dry,
    Mixed,
    Wet,
}

impl RideCondition {
    pub const ALL: [RideCondition; 3] = [Self::Dry, Self::Mixed, Self::Wet];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dry => "dry",
            Self::Mixed => "mixed",
            Self::Wet => "wet",
        }
    }
}

/// Inclusive psi range, rendered as `low-high`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PsiRange {
    pub low: i32,
    pub high: i32,
}

impl fmt::Display for PsiRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PressureRow {
    pub weight_bracket: WeightBracket,
    pub dry: PsiRange,
    pub mixed: PsiRange,
    pub wet: PsiRange,
}

impl PressureRow {
    pub fn range(&self, condition: RideCondition) -> PsiRange {
        match condition {
            RideCondition::Dry => self.dry,
            RideCondition::Mixed => self.mixed,
            RideCondition::Wet => self.wet,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressureTable {
    pub technical_rating: u8,
    pub width_mm: u16,
    pub base_psi: f64,
    pub rows: Vec<PressureRow>,
}

impl PressureTable {
    pub fn row(&self, bracket: WeightBracket) -> Option<&PressureRow> {
        self.rows.iter().find(|row| row.weight_bracket == bracket)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TubelessStrength {
    StronglyRecommended,
    Recommended,
}

impl TubelessStrength {
    pub fn label(&self) -> &'static str {
        match self {
            Self::StronglyRecommended => "Strongly recommended",
            Self::Recommended => "Recommended",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupStrategy {
    pub tubeless: TubelessStrength,
    pub tubeless_note: String,
    pub sealant_volume: String,
    pub sealant_note: String,
    pub spare_kit: String,
    pub break_in: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativePick {
    pub tire_id: TireId,
    pub brand: String,
    pub name: String,
    /// Score including the condition boost.
    pub score: f64,
    pub recommended_width_mm: u16,
}

/// Outcome of one condition-alternative search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConditionAlternative {
    /// The primary pick has no weakness in this condition.
    NotNeeded,
    /// Searched, but no tire outside the top picks qualifies.
    NoneFound,
    Found { pick: AlternativePick },
}

impl ConditionAlternative {
    pub fn pick(&self) -> Option<&AlternativePick> {
        match self {
            Self::Found { pick } => Some(pick),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionAlternatives {
    pub wet: ConditionAlternative,
    pub dry: ConditionAlternative,
}

/// Everything the presentation layer needs for one race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationBundle {
    pub surface_category: SurfaceCategory,
    pub technical_rating: u8,
    /// Set when every tire was disqualified and the unfiltered catalog was ranked instead.
    pub filter_fallback: bool,
    pub recommended_width_mm: u16,
    pub picks: Vec<RankedPick>,
    pub front_rear_split: FrontRearSplit,
    pub pressure_table: PressureTable,
    pub setup: SetupStrategy,
    pub alternatives: ConditionAlternatives,
}
