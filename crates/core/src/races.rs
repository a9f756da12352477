//! Race and weather files on disk
//!
//! Races live at `<race_dir>/<slug>.json` and weather at
//! `<weather_dir>/<slug>.json`. Weather is optional: a missing or unreadable
//! file yields default conditions.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::DataConfig;
use crate::domain::race::{RaceDocument, WeatherRecord};
use crate::errors::{ApplicationError, DomainError};
use crate::terrain::lenient_number;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RaceStore {
    race_dir: PathBuf,
    weather_dir: PathBuf,
}

impl RaceStore {
    pub fn new(race_dir: impl Into<PathBuf>, weather_dir: impl Into<PathBuf>) -> Self {
        Self { race_dir: race_dir.into(), weather_dir: weather_dir.into() }
    }

    pub fn from_config(data: &DataConfig) -> Self {
        Self::new(&data.race_dir, &data.weather_dir)
    }

    pub fn race_dir(&self) -> &Path {
        &self.race_dir
    }

    pub fn race_path(&self, slug: &str) -> PathBuf {
        self.race_dir.join(format!("{slug}.json"))
    }

    fn weather_path(&self, slug: &str) -> PathBuf {
        self.weather_dir.join(format!("{slug}.json"))
    }

    /// Slugs of every race file, sorted.
    pub fn list_slugs(&self) -> Result<Vec<String>, ApplicationError> {
        let entries = fs::read_dir(&self.race_dir).map_err(|error| {
            ApplicationError::Input(format!(
                "could not read race directory `{}`: {error}",
                self.race_dir.display()
            ))
        })?;

        let mut slugs: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| path.file_stem().and_then(|stem| stem.to_str()).map(str::to_string))
            .collect();
        slugs.sort();
        Ok(slugs)
    }

    pub fn load_race(&self, slug: &str) -> Result<RaceDocument, ApplicationError> {
        let path = self.race_path(slug);
        let raw = fs::read_to_string(&path).map_err(|error| {
            ApplicationError::Input(format!("could not read race `{}`: {error}", path.display()))
        })?;
        let root: Value = serde_json::from_str(&raw).map_err(|error| {
            ApplicationError::Input(format!("race `{}` is not valid JSON: {error}", path.display()))
        })?;
        Ok(RaceDocument::from_value(slug, root)?)
    }

    pub fn load_weather(&self, slug: &str) -> WeatherRecord {
        let path = self.weather_path(slug);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(
                    event_name = "race.weather.missing",
                    slug,
                    "no weather file; using default conditions"
                );
                return WeatherRecord::default();
            }
            Err(error) => {
                tracing::warn!(
                    event_name = "race.weather.unreadable",
                    slug,
                    error = %error,
                    "could not read weather file; using default conditions"
                );
                return WeatherRecord::default();
            }
        };

        let fields = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(fields)) => fields,
            Ok(_) => {
                tracing::warn!(
                    event_name = "race.weather.malformed",
                    slug,
                    "weather root is not an object; using default conditions"
                );
                return WeatherRecord::default();
            }
            Err(error) => {
                tracing::warn!(
                    event_name = "race.weather.malformed",
                    slug,
                    error = %error,
                    "malformed weather file; using default conditions"
                );
                return WeatherRecord::default();
            }
        };

        // Each field falls back on its own.
        WeatherRecord {
            precip_chance_pct: lenient_number(fields.get("precip_chance_pct"), "precip_chance_pct"),
            avg_high_f: lenient_number(fields.get("avg_high_f"), "avg_high_f"),
            max_wind_mph: lenient_number(fields.get("max_wind_mph"), "max_wind_mph"),
        }
    }

    /// Writes the document back as pretty JSON, keeping its layout and key order.
    pub fn save_race(&self, document: RaceDocument) -> Result<(), ApplicationError> {
        let path = self.race_path(&document.slug);
        let slug = document.slug.clone();
        let mut body = serde_json::to_string_pretty(&document.into_value()).map_err(|error| {
            let reason = format!("race `{slug}` could not be serialized: {error}");
            DomainError::InvariantViolation(reason)
        })?;
        body.push('\n');

        fs::write(&path, body).map_err(|error| {
            ApplicationError::Input(format!("could not write race `{}`: {error}", path.display()))
        })?;
        tracing::debug!(event_name = "race.saved", slug = %slug, "race file written");
        Ok(())
    }
}
