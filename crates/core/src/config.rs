use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::recommend::ScoringWeights;

pub const DEFAULT_CONFIG_FILE: &str = "tireguide.toml";
pub const MAX_TOP_N: usize = 10;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AppConfig {
    pub data: DataConfig,
    pub engine: EngineConfig,
    pub scoring: ScoringWeights,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DataConfig {
    pub tire_dir: PathBuf,
    pub race_dir: PathBuf,
    pub weather_dir: PathBuf,
    pub output_dir: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EngineConfig {
    pub top_n: usize,
    /// Process batch races on the rayon thread pool.
    pub parallel: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub tire_dir: Option<PathBuf>,
    pub race_dir: Option<PathBuf>,
    pub weather_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub top_n: Option<usize>,
    pub parallel: Option<bool>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataConfig {
                tire_dir: PathBuf::from("data/tires"),
                race_dir: PathBuf::from("race-data"),
                weather_dir: PathBuf::from("data/weather"),
                output_dir: PathBuf::from("output/tires"),
            },
            engine: EngineConfig { top_n: crate::recommend::DEFAULT_TOP_N, parallel: false },
            scoring: ScoringWeights::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(data) = patch.data {
            if let Some(tire_dir) = data.tire_dir {
                self.data.tire_dir = tire_dir;
            }
            if let Some(race_dir) = data.race_dir {
                self.data.race_dir = race_dir;
            }
            if let Some(weather_dir) = data.weather_dir {
                self.data.weather_dir = weather_dir;
            }
            if let Some(output_dir) = data.output_dir {
                self.data.output_dir = output_dir;
            }
        }

        if let Some(engine) = patch.engine {
            if let Some(top_n) = engine.top_n {
                self.engine.top_n = top_n;
            }
            if let Some(parallel) = engine.parallel {
                self.engine.parallel = parallel;
            }
        }

        // Missing keys in a partial [scoring] table keep their defaults.
        if let Some(scoring) = patch.scoring {
            self.scoring = scoring;
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("TIREGUIDE_DATA_TIRE_DIR") {
            self.data.tire_dir = PathBuf::from(value);
        }
        if let Some(value) = read_env("TIREGUIDE_DATA_RACE_DIR") {
            self.data.race_dir = PathBuf::from(value);
        }
        if let Some(value) = read_env("TIREGUIDE_DATA_WEATHER_DIR") {
            self.data.weather_dir = PathBuf::from(value);
        }
        if let Some(value) = read_env("TIREGUIDE_DATA_OUTPUT_DIR") {
            self.data.output_dir = PathBuf::from(value);
        }

        if let Some(value) = read_env("TIREGUIDE_ENGINE_TOP_N") {
            self.engine.top_n = parse_usize("TIREGUIDE_ENGINE_TOP_N", &value)?;
        }
        if let Some(value) = read_env("TIREGUIDE_ENGINE_PARALLEL") {
            self.engine.parallel = parse_bool("TIREGUIDE_ENGINE_PARALLEL", &value)?;
        }

        let log_level =
            read_env("TIREGUIDE_LOGGING_LEVEL").or_else(|| read_env("TIREGUIDE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("TIREGUIDE_LOGGING_FORMAT").or_else(|| read_env("TIREGUIDE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(tire_dir) = overrides.tire_dir {
            self.data.tire_dir = tire_dir;
        }
        if let Some(race_dir) = overrides.race_dir {
            self.data.race_dir = race_dir;
        }
        if let Some(weather_dir) = overrides.weather_dir {
            self.data.weather_dir = weather_dir;
        }
        if let Some(output_dir) = overrides.output_dir {
            self.data.output_dir = output_dir;
        }
        if let Some(top_n) = overrides.top_n {
            self.engine.top_n = top_n;
        }
        if let Some(parallel) = overrides.parallel {
            self.engine.parallel = parallel;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_data(&self.data)?;
        validate_engine(&self.engine)?;
        validate_scoring(&self.scoring)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from("config").join(DEFAULT_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_data(data: &DataConfig) -> Result<(), ConfigError> {
    let dirs = [
        ("data.tire_dir", &data.tire_dir),
        ("data.race_dir", &data.race_dir),
        ("data.weather_dir", &data.weather_dir),
        ("data.output_dir", &data.output_dir),
    ];
    for (key, dir) in dirs {
        if dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(format!("{key} must not be empty")));
        }
    }
    Ok(())
}

fn validate_engine(engine: &EngineConfig) -> Result<(), ConfigError> {
    if engine.top_n == 0 || engine.top_n > MAX_TOP_N {
        return Err(ConfigError::Validation(format!(
            "engine.top_n must be in range 1..={MAX_TOP_N}"
        )));
    }
    Ok(())
}

fn validate_scoring(scoring: &ScoringWeights) -> Result<(), ConfigError> {
    let values = [
        scoring.use_match,
        scoring.avoid_penalty,
        scoring.crr_ceiling_watts,
        scoring.crr_divisor,
        scoring.puncture_high,
        scoring.puncture_moderate,
        scoring.weight_ceiling_grams,
        scoring.weight_divisor,
        scoring.climbing_ratio_threshold,
        scoring.wet_good,
        scoring.wet_fair,
        scoring.mud_high,
        scoring.mud_moderate,
        scoring.mud_low,
        scoring.comfort_wide,
        scoring.comfort_durable_high,
        scoring.comfort_durable_moderate,
        scoring.terrain_keyword,
        scoring.price_cheap,
        scoring.price_cheap_max_usd,
        scoring.price_mid,
        scoring.price_mid_max_usd,
    ];
    if values.iter().any(|value| !value.is_finite()) {
        return Err(ConfigError::Validation("scoring values must be finite numbers".to_string()));
    }

    if scoring.avoid_penalty >= 0.0 {
        return Err(ConfigError::Validation(
            "scoring.avoid_penalty must be negative so avoided conditions lower the score"
                .to_string(),
        ));
    }
    if scoring.crr_ceiling_watts <= 0.0 {
        return Err(ConfigError::Validation(
            "scoring.crr_ceiling_watts must be greater than zero".to_string(),
        ));
    }
    if scoring.crr_divisor == 0.0 || scoring.weight_divisor == 0.0 {
        return Err(ConfigError::Validation(
            "scoring.crr_divisor and scoring.weight_divisor must not be zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.trim().parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.trim().parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    data: Option<DataPatch>,
    engine: Option<EnginePatch>,
    scoring: Option<ScoringWeights>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DataPatch {
    tire_dir: Option<PathBuf>,
    race_dir: Option<PathBuf>,
    weather_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct EnginePatch {
    top_n: Option<usize>,
    parallel: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
