use serde::Serialize;
use tireguide_core::config::{AppConfig, LoadOptions};
use tireguide_core::{SkippedEntry, TireId, TreadType};

use super::{load_catalog, CommandResult, EXIT_CONFIG};

const COMMAND: &str = "catalog";

#[derive(Debug, Serialize)]
struct CatalogReport {
    command: &'static str,
    status: &'static str,
    loaded: usize,
    tires: Vec<CatalogTire>,
    skipped: Vec<SkippedEntry>,
}

#[derive(Debug, Serialize)]
struct CatalogTire {
    id: TireId,
    brand: String,
    name: String,
    tread_type: TreadType,
    widths_mm: Vec<u16>,
}

/// Loads and validates the tire catalog, listing accepted and skipped entries.
pub fn run(options: LoadOptions) -> CommandResult {
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
    let (catalog, report) = match load_catalog(COMMAND, &config) {
        Ok(loaded) => loaded,
        Err(result) => return result,
    };

    let tires = catalog
        .tires()
        .iter()
        .map(|tire| CatalogTire {
            id: tire.id.clone(),
            brand: tire.brand.clone(),
            name: tire.name.clone(),
            tread_type: tire.tread_type,
            widths_mm: tire.widths_mm.clone(),
        })
        .collect();

    CommandResult::report(
        COMMAND,
        0,
        &CatalogReport {
            command: COMMAND,
            status: "ok",
            loaded: report.loaded,
            tires,
            skipped: report.skipped,
        },
    )
}
