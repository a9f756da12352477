//! Terrain profile extraction
//!
//! Turns the free-text terrain description of a race, its vitals and its
//! weather record into a [`RaceProfile`]. Keyword detection is a best-effort
//! heuristic: a keyword only counts when it appears in the terrain corpus and
//! is not negated by one of the recognised phrases ("no mud", "minimal mud",
//! ...). More elaborate negations ("mud is unlikely") are not detected.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::domain::race::{RaceProfile, SurfaceCategory, WeatherRecord};

pub const DEFAULT_TECHNICAL_RATING: u8 = 2;
pub const DEFAULT_DISTANCE_MI: f64 = 50.0;
pub const DEFAULT_ELEVATION_FT: f64 = 0.0;
pub const DEFAULT_PRECIP_PCT: f64 = 20.0;

/// Races at or above this distance get the comfort flag.
pub const COMFORT_DISTANCE_MI: f64 = 100.0;
/// Precipitation chance at which the race counts as wet.
pub const PRECIP_WET_THRESHOLD: f64 = 40.0;
/// Precipitation chance at which wet becomes the dominant surface category.
pub const PRECIP_SURFACE_WET_THRESHOLD: f64 = 50.0;

const MUD_KEYWORDS: &[&str] = &["mud", "clay", "bog", "swamp"];
const WET_KEYWORDS: &[&str] = &["wet", "rain", "creek"];
const PUNCTURE_KEYWORDS: &[&str] =
    &["limestone", "flint", "sharp", "rocky", "chunk", "shred", "angular", "abrasive"];
const SINGLETRACK_KEYWORDS: &[&str] =
    &["singletrack", "switchback", "technical descent", "roots", "rock garden"];

fn negation_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Longer phrases come first so the alternation prefers them over bare "no".
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\b(?:little\s+to\s+no|no\s+significant|absent\s+of|without|minimal|no)\s+(\w+)")
            .expect("negation pattern is a valid regex")
    })
}

fn leading_number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\d[\d,]*(?:\.\d+)?").expect("leading number pattern is a valid regex")
    })
}

/// Terrain text and vitals pulled out of a race object, before classification.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainText {
    pub corpus: String,
    pub technical_rating: u8,
    pub distance_mi: f64,
    pub elevation_ft: f64,
    pub features: Vec<String>,
}

/// Words negated in `text`, lowercased (`"minimal mud"` yields `mud`).
pub fn extract_negated_keywords(text: &str) -> HashSet<String> {
    negation_pattern()
        .captures_iter(text)
        .filter_map(|captures| captures.get(1))
        .map(|word| word.as_str().to_lowercase())
        .collect()
}

pub fn keyword_present(text: &str, keyword: &str, negated: &HashSet<String>) -> bool {
    text.contains(keyword) && !negated.contains(keyword)
}

fn any_keyword_present(text: &str, keywords: &[&str], negated: &HashSet<String>) -> bool {
    keywords.iter().any(|keyword| keyword_present(text, keyword, negated))
}

/// First number in a text value, so `"4,500-9,116"` reads as 4500.
pub fn parse_leading_number(text: &str) -> Option<f64> {
    let found = leading_number_pattern().find(text)?;
    found.as_str().replace(',', "").parse::<f64>().ok()
}

fn text_of(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Object(map) => map.keys().cloned().collect::<Vec<_>>().join(" "),
        Value::Array(items) => items.iter().map(text_of).collect::<Vec<_>>().join(" "),
        other => other.to_string(),
    }
}

/// Reads a number or numeric text. Absent fields are `None` silently;
/// unparseable ones are `None` with a warning.
pub fn lenient_number(value: Option<&Value>, field: &'static str) -> Option<f64> {
    let parsed = match value {
        None | Some(Value::Null) => return None,
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => parse_leading_number(text),
        Some(_) => None,
    };

    match parsed {
        Some(number) if number.is_finite() => Some(number),
        _ => {
            let raw = value.map(|raw| raw.to_string()).unwrap_or_default();
            tracing::warn!(
                event_name = "profile.parse.numeric_fallback",
                field,
                raw = %raw,
                "could not parse numeric field; falling back"
            );
            None
        }
    }
}

fn numeric_field(value: Option<&Value>, field: &'static str, default: f64) -> f64 {
    lenient_number(value, field).unwrap_or(default)
}

fn technical_rating(value: Option<&Value>) -> u8 {
    let raw = numeric_field(value, "technical_rating", f64::from(DEFAULT_TECHNICAL_RATING));
    let rounded = raw.round();
    let clamped = rounded.clamp(1.0, 5.0);
    if clamped != rounded {
        tracing::warn!(
            event_name = "profile.parse.technical_rating_clamped",
            raw,
            clamped,
            "technical rating outside 1..=5; clamping"
        );
    }
    clamped as u8
}

/// Collects the terrain corpus and vitals from a race object. Missing or
/// oddly-shaped fields degrade to defaults.
pub fn parse_terrain_text(race: &Map<String, Value>) -> TerrainText {
    let empty = Map::new();
    let terrain_value = race.get("terrain").unwrap_or(&Value::Null);

    // A bare string terrain stands in for both surface and primary.
    let (terrain, surface, primary) = match terrain_value {
        Value::Object(map) => (
            map,
            text_of(map.get("surface").unwrap_or(&Value::Null)),
            text_of(map.get("primary").unwrap_or(&Value::Null)),
        ),
        Value::Null => (&empty, String::new(), String::new()),
        other => {
            let text = text_of(other);
            (&empty, text.clone(), text)
        }
    };

    let features: Vec<String> = match terrain.get("features") {
        Some(Value::Array(items)) => items.iter().map(text_of).collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => {
            let text = text_of(other);
            if text.is_empty() {
                Vec::new()
            } else {
                vec![text]
            }
        }
    };

    let vitals = match race.get("vitals") {
        Some(Value::Object(map)) => map,
        _ => &empty,
    };

    let mut corpus = format!("{surface} {primary} {}", features.join(" ")).to_lowercase();
    if let Some(Value::Array(types)) = vitals.get("terrain_types") {
        for terrain_type in types {
            corpus.push(' ');
            corpus.push_str(&text_of(terrain_type).to_lowercase());
        }
    }

    TerrainText {
        corpus,
        technical_rating: technical_rating(terrain.get("technical_rating")),
        distance_mi: numeric_field(vitals.get("distance_mi"), "distance_mi", DEFAULT_DISTANCE_MI),
        elevation_ft: numeric_field(
            vitals.get("elevation_ft"),
            "elevation_ft",
            DEFAULT_ELEVATION_FT,
        ),
        features,
    }
}

/// Classifies a race into a [`RaceProfile`].
pub fn build_race_profile(race: &Map<String, Value>, weather: &WeatherRecord) -> RaceProfile {
    let terrain = parse_terrain_text(race);
    let precip_pct = weather.precip_chance_pct.unwrap_or(DEFAULT_PRECIP_PCT);
    profile_from_terrain(terrain, precip_pct)
}

pub fn profile_from_terrain(terrain: TerrainText, precip_pct: f64) -> RaceProfile {
    let TerrainText { corpus, technical_rating, distance_mi, elevation_ft, features } = terrain;
    let negated = extract_negated_keywords(&corpus);

    let climbing_ratio = elevation_ft / distance_mi.max(1.0);

    let needs_mud = any_keyword_present(&corpus, MUD_KEYWORDS, &negated);
    let needs_wet =
        precip_pct >= PRECIP_WET_THRESHOLD || any_keyword_present(&corpus, WET_KEYWORDS, &negated);
    let needs_puncture = any_keyword_present(&corpus, PUNCTURE_KEYWORDS, &negated);
    let needs_speed = technical_rating <= 2 && !needs_mud;
    let needs_comfort = distance_mi >= COMFORT_DISTANCE_MI;
    let has_singletrack = any_keyword_present(&corpus, SINGLETRACK_KEYWORDS, &negated);

    let surface_category = if needs_mud {
        SurfaceCategory::Muddy
    } else if needs_wet && precip_pct >= PRECIP_SURFACE_WET_THRESHOLD {
        SurfaceCategory::Wet
    } else if technical_rating >= 4 || (technical_rating >= 3 && has_singletrack) {
        SurfaceCategory::Technical
    } else if technical_rating <= 1 && !needs_puncture {
        SurfaceCategory::Fast
    } else {
        SurfaceCategory::Mixed
    };

    tracing::debug!(
        event_name = "profile.classified",
        surface_category = %surface_category,
        technical_rating,
        needs_mud,
        needs_wet,
        needs_puncture,
        "race profile classified"
    );

    RaceProfile {
        surface_category,
        technical_rating,
        distance_mi,
        elevation_ft,
        climbing_ratio,
        precip_pct,
        needs_puncture,
        needs_wet,
        needs_mud,
        needs_speed,
        needs_comfort,
        corpus,
        features,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Map, Value};

    use super::*;

    fn race(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test race must be an object"),
        }
    }

    fn weather(precip: f64) -> WeatherRecord {
        WeatherRecord { precip_chance_pct: Some(precip), ..WeatherRecord::default() }
    }

    #[test]
    fn negation_phrases_are_recognised() {
        for text in [
            "without mud on this course",
            "minimal mud expected this year",
            "little to no mud on the course",
            "no significant mud sections",
            "no mud",
        ] {
            assert!(extract_negated_keywords(text).contains("mud"), "{text}");
        }
    }

    #[test]
    fn negated_mud_does_not_set_mud_flag() {
        let profile = build_race_profile(
            &race(json!({"terrain": {"surface": "hardpack gravel, no mud", "technical_rating": 2}})),
            &weather(10.0),
        );
        assert!(!profile.needs_mud);
        assert_ne!(profile.surface_category, SurfaceCategory::Muddy);
    }

    #[test]
    fn positive_mud_sets_muddy_category() {
        let profile = build_race_profile(
            &race(json!({"terrain": {"surface": "Vermont dirt", "features": ["Deep mud", "snow"]}})),
            &weather(10.0),
        );
        assert!(profile.needs_mud);
        assert!(!profile.needs_speed);
        assert_eq!(profile.surface_category, SurfaceCategory::Muddy);
    }

    #[test]
    fn high_precipitation_makes_wet_category() {
        let profile = build_race_profile(
            &race(json!({"terrain": {"surface": "gravel", "technical_rating": 3}})),
            &weather(55.0),
        );
        assert!(profile.needs_wet);
        assert_eq!(profile.surface_category, SurfaceCategory::Wet);
    }

    #[test]
    fn moderate_precipitation_sets_wet_flag_only() {
        let profile = build_race_profile(
            &race(json!({"terrain": {"surface": "gravel", "technical_rating": 2}})),
            &weather(45.0),
        );
        assert!(profile.needs_wet);
        assert_eq!(profile.surface_category, SurfaceCategory::Mixed);
    }

    #[test]
    fn technical_rating_three_needs_singletrack_for_technical() {
        let plain = build_race_profile(
            &race(json!({"terrain": {"surface": "rough gravel", "technical_rating": 3}})),
            &weather(10.0),
        );
        let singletrack = build_race_profile(
            &race(json!({"terrain": {"surface": "gravel and singletrack", "technical_rating": 3}})),
            &weather(10.0),
        );
        assert_eq!(plain.surface_category, SurfaceCategory::Mixed);
        assert_eq!(singletrack.surface_category, SurfaceCategory::Technical);
    }

    #[test]
    fn smooth_low_rated_course_is_fast() {
        let profile = build_race_profile(
            &race(json!({"terrain": {"surface": "smooth hardpack", "technical_rating": 1}})),
            &weather(10.0),
        );
        assert_eq!(profile.surface_category, SurfaceCategory::Fast);
        assert!(profile.needs_speed);
    }

    #[test]
    fn sharp_rock_on_low_rated_course_is_mixed() {
        let profile = build_race_profile(
            &race(json!({"terrain": {"surface": "Flint Hills limestone", "technical_rating": 1}})),
            &weather(10.0),
        );
        assert!(profile.needs_puncture);
        assert_eq!(profile.surface_category, SurfaceCategory::Mixed);
    }

    #[test]
    fn string_terrain_and_dict_surface_are_read_as_text() {
        let string_terrain = parse_terrain_text(&race(json!({"terrain": "Chunky Gravel"})));
        assert!(string_terrain.corpus.contains("chunky gravel"));
        assert_eq!(string_terrain.technical_rating, DEFAULT_TECHNICAL_RATING);

        let dict_surface = parse_terrain_text(&race(json!({
            "terrain": {"surface": {"gravel": 70, "pavement": 30}, "features": "creek crossings"}
        })));
        assert!(dict_surface.corpus.contains("gravel"));
        assert!(dict_surface.corpus.contains("pavement"));
        assert_eq!(dict_surface.features, vec!["creek crossings".to_string()]);
    }

    #[test]
    fn missing_terrain_and_vitals_use_defaults() {
        let terrain = parse_terrain_text(&race(json!({"name": "Bare"})));
        assert_eq!(terrain.technical_rating, DEFAULT_TECHNICAL_RATING);
        assert_eq!(terrain.distance_mi, DEFAULT_DISTANCE_MI);
        assert_eq!(terrain.elevation_ft, DEFAULT_ELEVATION_FT);
        assert!(terrain.features.is_empty());

        let profile = build_race_profile(&race(json!({})), &WeatherRecord::default());
        assert_eq!(profile.precip_pct, DEFAULT_PRECIP_PCT);
    }

    #[test]
    fn range_and_comma_numbers_use_first_value() {
        let terrain = parse_terrain_text(&race(json!({
            "vitals": {"distance_mi": "50-100", "elevation_ft": "4,500–9,116"}
        })));
        assert_eq!(terrain.distance_mi, 50.0);
        assert_eq!(terrain.elevation_ft, 4500.0);
    }

    #[test]
    fn unparseable_numbers_fall_back() {
        let terrain = parse_terrain_text(&race(json!({
            "vitals": {"distance_mi": "TBD", "elevation_ft": ["nope"]}
        })));
        assert_eq!(terrain.distance_mi, DEFAULT_DISTANCE_MI);
        assert_eq!(terrain.elevation_ft, DEFAULT_ELEVATION_FT);
    }

    #[test]
    fn technical_rating_is_clamped() {
        let high = parse_terrain_text(&race(json!({"terrain": {"technical_rating": 9}})));
        let text = parse_terrain_text(&race(json!({"terrain": {"technical_rating": "4"}})));
        assert_eq!(high.technical_rating, 5);
        assert_eq!(text.technical_rating, 4);
    }

    #[test]
    fn terrain_types_join_the_corpus() {
        let profile = build_race_profile(
            &race(json!({"vitals": {"terrain_types": ["Clay roads"]}})),
            &weather(0.0),
        );
        assert!(profile.needs_mud);
    }

    #[test]
    fn long_races_need_comfort_and_ratio_uses_distance() {
        let profile = build_race_profile(
            &race(json!({"vitals": {"distance_mi": 200, "elevation_ft": 11000}})),
            &weather(0.0),
        );
        assert!(profile.needs_comfort);
        assert!((profile.climbing_ratio - 55.0).abs() < 1e-9);
    }
}
