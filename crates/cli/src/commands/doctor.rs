use std::path::Path;

use serde::Serialize;
use tireguide_core::config::{AppConfig, LoadOptions};
use tireguide_core::{RaceStore, TireCatalog};

use super::{CommandResult, EXIT_CATALOG, EXIT_CONFIG, EXIT_INPUT};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(options: LoadOptions, json_output: bool) -> CommandResult {
    let report = build_report(options);
    let exit_code = exit_code(&report);

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };
    CommandResult { exit_code, output }
}

/// The first failing check decides the exit code.
fn exit_code(report: &DoctorReport) -> u8 {
    let first_failure = report.checks.iter().find(|check| check.status == CheckStatus::Fail);
    match first_failure.map(|check| check.name) {
        None => 0,
        Some("config_validation") => EXIT_CONFIG,
        Some("tire_catalog") => EXIT_CATALOG,
        Some(_) => EXIT_INPUT,
    }
}

fn build_report(options: LoadOptions) -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(options) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_catalog(&config));
            checks.push(check_races(&config));
            checks.push(check_weather_dir(&config.data.weather_dir));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["tire_catalog", "race_data", "weather_data"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_catalog(config: &AppConfig) -> DoctorCheck {
    let (status, details) = match TireCatalog::load_dir(&config.data.tire_dir) {
        Ok((catalog, _)) if catalog.is_empty() => (
            CheckStatus::Fail,
            format!("no valid tires in `{}`", config.data.tire_dir.display()),
        ),
        Ok((catalog, report)) => (
            CheckStatus::Pass,
            format!("{} tires loaded, {} skipped", catalog.len(), report.skipped.len()),
        ),
        Err(error) => (CheckStatus::Fail, error.to_string()),
    };
    DoctorCheck { name: "tire_catalog", status, details }
}

fn check_races(config: &AppConfig) -> DoctorCheck {
    let store = RaceStore::from_config(&config.data);
    let (status, details) = match store.list_slugs() {
        Ok(slugs) if slugs.is_empty() => (
            CheckStatus::Fail,
            format!("no race files in `{}`", config.data.race_dir.display()),
        ),
        Ok(slugs) => (CheckStatus::Pass, format!("{} race files found", slugs.len())),
        Err(error) => (CheckStatus::Fail, error.to_string()),
    };
    DoctorCheck { name: "race_data", status, details }
}

// Weather is optional per race; only a missing directory is reported.
fn check_weather_dir(dir: &Path) -> DoctorCheck {
    if dir.is_dir() {
        DoctorCheck {
            name: "weather_data",
            status: CheckStatus::Pass,
            details: format!("weather directory `{}` present", dir.display()),
        }
    } else {
        DoctorCheck {
            name: "weather_data",
            status: CheckStatus::Fail,
            details: format!(
                "weather directory `{}` not found; races will use default conditions",
                dir.display()
            ),
        }
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
