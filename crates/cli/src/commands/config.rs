use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tireguide_core::config::{resolve_config_path, AppConfig, ConfigOverrides, LoadOptions};
use toml::Value;

use super::{CommandResult, EXIT_CONFIG};

const COMMAND: &str = "config";

pub fn run(options: LoadOptions) -> CommandResult {
    let config_file_path = resolve_config_path(options.config_path.as_deref());
    let overridden = overridden_keys(&options.overrides);
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "config_validation",
                error.to_string(),
                EXIT_CONFIG,
            )
        }
    };

    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        if overridden.iter().any(|key| *key == key_path) {
            return "override (command line)".to_string();
        }
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines = vec![
        "effective config (source precedence: override > env > file > default):".to_string(),
    ];

    let dirs: [(&str, &PathBuf, &str); 4] = [
        ("data.tire_dir", &config.data.tire_dir, "TIREGUIDE_DATA_TIRE_DIR"),
        ("data.race_dir", &config.data.race_dir, "TIREGUIDE_DATA_RACE_DIR"),
        ("data.weather_dir", &config.data.weather_dir, "TIREGUIDE_DATA_WEATHER_DIR"),
        ("data.output_dir", &config.data.output_dir, "TIREGUIDE_DATA_OUTPUT_DIR"),
    ];
    for (key_path, dir, env_key) in dirs {
        let value = dir.display().to_string();
        lines.push(render_line(key_path, &value, source(key_path, &[env_key])));
    }

    lines.push(render_line(
        "engine.top_n",
        &config.engine.top_n.to_string(),
        source("engine.top_n", &["TIREGUIDE_ENGINE_TOP_N"]),
    ));
    lines.push(render_line(
        "engine.parallel",
        &config.engine.parallel.to_string(),
        source("engine.parallel", &["TIREGUIDE_ENGINE_PARALLEL"]),
    ));

    // Scoring weights are file-only.
    if let Ok(Value::Table(weights)) = Value::try_from(config.scoring) {
        for (name, value) in &weights {
            let key_path = format!("scoring.{name}");
            lines.push(render_line(&key_path, &value.to_string(), source(&key_path, &[])));
        }
    }

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", &["TIREGUIDE_LOGGING_LEVEL", "TIREGUIDE_LOG_LEVEL"]),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format).to_lowercase(),
        source("logging.format", &["TIREGUIDE_LOGGING_FORMAT", "TIREGUIDE_LOG_FORMAT"]),
    ));

    CommandResult { exit_code: 0, output: lines.join("\n") }
}

fn overridden_keys(overrides: &ConfigOverrides) -> Vec<&'static str> {
    [
        ("data.tire_dir", overrides.tire_dir.is_some()),
        ("data.race_dir", overrides.race_dir.is_some()),
        ("data.weather_dir", overrides.weather_dir.is_some()),
        ("data.output_dir", overrides.output_dir.is_some()),
        ("engine.top_n", overrides.top_n.is_some()),
        ("engine.parallel", overrides.parallel.is_some()),
        ("logging.level", overrides.log_level.is_some()),
    ]
    .into_iter()
    .filter_map(|(key, set)| set.then_some(key))
    .collect()
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
