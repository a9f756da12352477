use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TireId(pub String);

impl fmt::Display for TireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreadType {
    File,
    Knobby,
    Aggressive,
    Mud,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PunctureResistance {
    Low,
    Moderate,
    High,
}

impl PunctureResistance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WetTraction {
    Poor,
    Fair,
    Good,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MudClearance {
    None,
    Low,
    Moderate,
    High,
}

/// Sparse per-width measurements, keyed by width in millimetres.
///
/// Catalog JSON keys these maps by text (`"40"`); serde parses the keys into
/// integers. Lookups never fail on a missing width: [`WidthMap::nearest`]
/// resolves to the closest measured width instead.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidthMap<T>(BTreeMap<u16, T>);

impl<T: Copy> WidthMap<T> {
    pub fn new(entries: BTreeMap<u16, T>) -> Self {
        Self(entries)
    }

    pub fn get(&self, width_mm: u16) -> Option<T> {
        self.0.get(&width_mm).copied()
    }

    /// Value at the measured width closest to `width_mm`. Ties go to the
    /// narrower width.
    pub fn nearest(&self, width_mm: u16) -> Option<(u16, T)> {
        self.0
            .iter()
            .min_by_key(|(width, _)| width.abs_diff(width_mm))
            .map(|(width, value)| (*width, *value))
    }

    pub fn values(&self) -> impl Iterator<Item = T> + '_ {
        self.0.values().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, T)> + '_ {
        self.0.iter().map(|(width, value)| (*width, *value))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl WidthMap<f64> {
    pub fn mean(&self) -> Option<f64> {
        if self.0.is_empty() {
            return None;
        }
        Some(self.0.values().sum::<f64>() / self.0.len() as f64)
    }
}

/// A catalog tire. Created once at catalog load and never mutated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TireRecord {
    pub id: TireId,
    pub brand: String,
    pub name: String,
    #[serde(default)]
    pub tagline: String,
    pub widths_mm: Vec<u16>,
    pub tread_type: TreadType,
    #[serde(default)]
    pub recommended_use: Vec<String>,
    #[serde(default)]
    pub avoid_use: Vec<String>,
    pub puncture_resistance: PunctureResistance,
    pub wet_traction: WetTraction,
    pub mud_clearance: MudClearance,
    #[serde(default)]
    pub crr_watts_at_29kmh: Option<WidthMap<f64>>,
    #[serde(default)]
    pub weight_grams: WidthMap<f64>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub msrp_usd: Option<Decimal>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub review_urls: BTreeMap<String, String>,
}

impl TireRecord {
    pub fn max_width(&self) -> Option<u16> {
        self.widths_mm.iter().copied().max()
    }

    /// Manufactured width closest to `target_mm`. `widths_mm` is kept sorted,
    /// so ties resolve to the first (narrower) width.
    pub fn closest_width(&self, target_mm: u16) -> Option<u16> {
        self.widths_mm.iter().copied().min_by_key(|width| width.abs_diff(target_mm))
    }

    /// Rolling-resistance wattage at the measured width nearest `width_mm`.
    pub fn crr_watts_near(&self, width_mm: u16) -> Option<f64> {
        self.crr_watts_at_29kmh.as_ref().and_then(|crr| crr.nearest(width_mm)).map(|(_, w)| w)
    }

    /// Weight at the measured width nearest `width_mm`, with the width it was
    /// measured at.
    pub fn weight_near(&self, width_mm: u16) -> Option<(u16, f64)> {
        self.weight_grams.nearest(width_mm)
    }

    pub fn is_mud_oriented(&self) -> bool {
        matches!(self.tread_type, TreadType::Mud | TreadType::Aggressive)
            || matches!(self.mud_clearance, MudClearance::Moderate | MudClearance::High)
    }
}
