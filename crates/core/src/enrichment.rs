//! `tire_recommendations` records written back into race files

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::race::{RaceDocument, SurfaceCategory};
use crate::domain::tire::TireId;
use crate::errors::DomainError;
use crate::recommend::{FrontRearSplit, RecommendationBundle, RideCondition, SplitPick};

pub const ENRICHMENT_FIELD: &str = "tire_recommendations";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TireRecommendations {
    pub generated_at: NaiveDate,
    pub primary: Vec<PrimaryPick>,
    pub front_rear_split: SplitSummary,
    pub race_surface_profile: SurfaceCategory,
    pub recommended_width_mm: u16,
    /// Keys like `160_180lb_dry`, values like `36-40`.
    pub pressure_psi: BTreeMap<String, String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrimaryPick {
    pub rank: usize,
    pub tire_id: TireId,
    pub name: String,
    pub brand: String,
    pub recommended_width_mm: u16,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub msrp_usd: Option<Decimal>,
    pub weight_grams: Option<f64>,
    pub crr_watts: Option<f64>,
    pub why: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitSide {
    pub tire_id: TireId,
    pub name: String,
    pub width_mm: u16,
}

impl From<&SplitPick> for SplitSide {
    fn from(pick: &SplitPick) -> Self {
        Self { tire_id: pick.tire_id.clone(), name: pick.name.clone(), width_mm: pick.width_mm }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitSummary {
    pub applicable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front: Option<SplitSide>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rear: Option<SplitSide>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

impl From<&FrontRearSplit> for SplitSummary {
    fn from(split: &FrontRearSplit) -> Self {
        match split {
            FrontRearSplit::Recommended { front, rear, rationale } => Self {
                applicable: true,
                front: Some(front.into()),
                rear: Some(rear.into()),
                rationale: Some(rationale.clone()),
            },
            FrontRearSplit::NotApplicable { .. } => {
                Self { applicable: false, front: None, rear: None, rationale: None }
            }
        }
    }
}

pub fn build_recommendations(
    bundle: &RecommendationBundle,
    race_name: &str,
    generated_at: NaiveDate,
) -> TireRecommendations {
    let primary = bundle
        .picks
        .iter()
        .map(|pick| PrimaryPick {
            rank: pick.rank,
            tire_id: pick.tire_id.clone(),
            name: pick.name.clone(),
            brand: pick.brand.clone(),
            recommended_width_mm: pick.recommended_width_mm,
            msrp_usd: pick.facts.msrp_usd,
            weight_grams: pick.facts.weight_grams,
            crr_watts: pick.facts.crr_watts,
            why: pick.explanation.for_race(race_name),
        })
        .collect();

    let mut pressure_psi = BTreeMap::new();
    for row in &bundle.pressure_table.rows {
        for condition in RideCondition::ALL {
            let key = format!("{}_{}", row.weight_bracket.key(), condition.as_str());
            pressure_psi.insert(key, row.range(condition).to_string());
        }
    }

    TireRecommendations {
        generated_at,
        primary,
        front_rear_split: SplitSummary::from(&bundle.front_rear_split),
        race_surface_profile: bundle.surface_category,
        recommended_width_mm: bundle.recommended_width_mm,
        pressure_psi,
    }
}

/// True when the race already carries a non-empty recommendation list.
pub fn is_enriched(document: &RaceDocument) -> bool {
    document
        .field(ENRICHMENT_FIELD)
        .and_then(|value| value.get("primary"))
        .and_then(Value::as_array)
        .is_some_and(|primary| !primary.is_empty())
}

pub fn apply_recommendations(
    document: &mut RaceDocument,
    recommendations: &TireRecommendations,
) -> Result<(), DomainError> {
    let value = serde_json::to_value(recommendations).map_err(|error| {
        DomainError::InvariantViolation(format!(
            "tire recommendations for `{}` could not be serialized: {error}",
            document.slug
        ))
    })?;
    document.set_field(ENRICHMENT_FIELD, value);
    Ok(())
}

/// One-line preview of the #1 pick, e.g.
/// `unbound-200: #1 Pathfinder Pro 42mm $65.00 (mixed)`.
pub fn preview_line(slug: &str, recommendations: &TireRecommendations) -> String {
    match recommendations.primary.first() {
        Some(top) => {
            let price = top
                .msrp_usd
                .map_or_else(|| "?".to_string(), |msrp| format!("${:.2}", msrp.round_dp(2)));
            format!(
                "{slug}: #1 {} {}mm {price} ({})",
                top.name,
                top.recommended_width_mm,
                recommendations.race_surface_profile
            )
        }
        None => format!("{slug}: no pick ({})", recommendations.race_surface_profile),
    }
}
