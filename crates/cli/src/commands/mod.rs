pub mod catalog;
pub mod config;
pub mod doctor;
pub mod enrich;
pub mod recommend;

use std::sync::Arc;

use serde::Serialize;
use tireguide_core::config::{AppConfig, LoadOptions};
use tireguide_core::{
    ApplicationError, CatalogLoadReport, DeterministicRecommender, RaceStore, TireCatalog,
};

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_CATALOG: u8 = 3;
pub const EXIT_INPUT: u8 = 4;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(&payload) }
    }

    /// Emits a command-specific report; `exit_code` is chosen by the caller.
    fn report(command: &str, exit_code: u8, payload: &impl Serialize) -> Self {
        match serde_json::to_string_pretty(payload) {
            Ok(output) => Self { exit_code, output },
            Err(error) => Self::failure(command, "serialization", error.to_string(), 1),
        }
    }
}

fn serialize_payload(payload: &CommandOutcome) -> String {
    serde_json::to_string(payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Loaded config, catalog and race store shared by the race commands.
struct Session {
    config: AppConfig,
    store: RaceStore,
    recommender: DeterministicRecommender,
}

impl Session {
    fn open(command: &str, options: LoadOptions) -> Result<Self, CommandResult> {
        let config = AppConfig::load(options).map_err(|error| {
            CommandResult::failure(command, "config_validation", error.to_string(), EXIT_CONFIG)
        })?;
        let (catalog, _report) = load_catalog(command, &config)?;

        let recommender = DeterministicRecommender::new(Arc::new(catalog))
            .with_weights(config.scoring)
            .with_top_n(config.engine.top_n);
        let store = RaceStore::from_config(&config.data);
        Ok(Self { config, store, recommender })
    }

    /// Explicit slugs, or every race file when `all` is set.
    fn resolve_slugs(
        &self,
        command: &str,
        slugs: Vec<String>,
        all: bool,
    ) -> Result<Vec<String>, CommandResult> {
        let slugs = if all || slugs.is_empty() {
            self.store.list_slugs().map_err(|error| input_failure(command, &error))?
        } else {
            slugs
        };
        if slugs.is_empty() {
            return Err(CommandResult::failure(
                command,
                "no_races",
                format!("no race files found in `{}`", self.store.race_dir().display()),
                EXIT_INPUT,
            ));
        }
        Ok(slugs)
    }
}

fn load_catalog(
    command: &str,
    config: &AppConfig,
) -> Result<(TireCatalog, CatalogLoadReport), CommandResult> {
    let (catalog, report) = TireCatalog::load_dir(&config.data.tire_dir).map_err(|error| {
        CommandResult::failure(command, "catalog_unavailable", error.to_string(), EXIT_CATALOG)
    })?;
    if catalog.is_empty() {
        return Err(CommandResult::failure(
            command,
            "catalog_empty",
            format!(
                "no valid tires found in `{}` ({} skipped)",
                config.data.tire_dir.display(),
                report.skipped.len()
            ),
            EXIT_CATALOG,
        ));
    }
    Ok((catalog, report))
}

fn input_failure(command: &str, error: &ApplicationError) -> CommandResult {
    CommandResult::failure(command, "input", error.to_string(), EXIT_INPUT)
}

#[derive(Debug, Serialize)]
struct RaceFailure {
    error_class: &'static str,
    message: String,
    detail: String,
}

impl RaceFailure {
    fn from_interface(error: &tireguide_core::InterfaceError) -> Self {
        let error_class = match error {
            tireguide_core::InterfaceError::BadInput { .. } => "bad_input",
            tireguide_core::InterfaceError::Unavailable { .. } => "unavailable",
            tireguide_core::InterfaceError::Internal { .. } => "internal",
        };
        Self { error_class, message: error.user_message().to_string(), detail: error.to_string() }
    }

    fn output(detail: String) -> Self {
        Self {
            error_class: "output_unavailable",
            message: "The recommendation could not be written to the output directory."
                .to_string(),
            detail,
        }
    }
}
