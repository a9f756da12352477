use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::DomainError;

/// The single dominant terrain demand of a race.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceCategory {
    Fast,
    Mixed,
    Technical,
    Muddy,
    Wet,
}

impl SurfaceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Mixed => "mixed",
            Self::Technical => "technical",
            Self::Muddy => "muddy",
            Self::Wet => "wet",
        }
    }
}

impl fmt::Display for SurfaceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured demand profile derived from one race and its weather.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RaceProfile {
    pub surface_category: SurfaceCategory,
    pub technical_rating: u8,
    pub distance_mi: f64,
    pub elevation_ft: f64,
    pub climbing_ratio: f64,
    pub precip_pct: f64,
    pub needs_puncture: bool,
    pub needs_wet: bool,
    pub needs_mud: bool,
    pub needs_speed: bool,
    pub needs_comfort: bool,
    /// Lowercased terrain text the profile was classified from.
    #[serde(default)]
    pub corpus: String,
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    #[serde(default)]
    pub precip_chance_pct: Option<f64>,
    #[serde(default)]
    pub avg_high_f: Option<f64>,
    #[serde(default)]
    pub max_wind_mph: Option<f64>,
}

/// A race file as read from disk. The race object is either the document
/// root or nested under a `race` key; both layouts round-trip unchanged.
#[derive(Clone, Debug, PartialEq)]
pub struct RaceDocument {
    pub slug: String,
    race: Map<String, Value>,
    envelope: Option<Map<String, Value>>,
}

impl RaceDocument {
    pub fn from_value(slug: impl Into<String>, root: Value) -> Result<Self, DomainError> {
        let slug = slug.into();
        let Value::Object(mut root) = root else {
            return Err(DomainError::MalformedRace {
                slug,
                reason: "race document root must be a JSON object".to_string(),
            });
        };

        // The envelope keeps an empty placeholder so write-back lands in the same position.
        let nested = match root.get_mut("race") {
            Some(Value::Object(race)) => Some(std::mem::take(race)),
            _ => None,
        };
        match nested {
            Some(race) => Ok(Self { slug, race, envelope: Some(root) }),
            None => Ok(Self { slug, race: root, envelope: None }),
        }
    }

    pub fn race(&self) -> &Map<String, Value> {
        &self.race
    }

    pub fn display_name(&self) -> String {
        self.race
            .get("name")
            .and_then(Value::as_str)
            .filter(|name| !name.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.slug.clone())
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.race.get(key)
    }

    pub fn set_field(&mut self, key: &str, value: Value) {
        self.race.insert(key.to_string(), value);
    }

    pub fn into_value(self) -> Value {
        match self.envelope {
            Some(mut envelope) => {
                envelope.insert("race".to_string(), Value::Object(self.race));
                Value::Object(envelope)
            }
            None => Value::Object(self.race),
        }
    }
}
