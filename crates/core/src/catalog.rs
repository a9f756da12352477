use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::tire::{TireId, TireRecord};
use crate::errors::{ApplicationError, DomainError};

/// Read-only tire catalog. Built once per run and shared by every race.
#[derive(Clone, Debug, Default)]
pub struct TireCatalog {
    tires: Vec<TireRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    pub source: String,
    pub reason: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CatalogLoadReport {
    pub loaded: usize,
    pub skipped: Vec<SkippedEntry>,
}

impl TireCatalog {
    /// Wraps already-validated records, keeping their order.
    pub fn new(tires: Vec<TireRecord>) -> Self {
        Self { tires }
    }

    /// Validates each record and drops the ones that fail, keeping catalog
    /// order for the rest. Duplicate ids keep the first occurrence.
    pub fn from_records(
        records: impl IntoIterator<Item = (String, TireRecord)>,
    ) -> (Self, CatalogLoadReport) {
        let mut tires = Vec::new();
        let mut seen: HashSet<TireId> = HashSet::new();
        let mut report = CatalogLoadReport::default();

        for (source, record) in records {
            match validate_tire(record) {
                Ok(tire) if !seen.insert(tire.id.clone()) => {
                    skip(&mut report, source, format!("duplicate tire id `{}`", tire.id));
                }
                Ok(tire) => tires.push(tire),
                Err(error) => skip(&mut report, source, error.to_string()),
            }
        }

        report.loaded = tires.len();
        (Self { tires }, report)
    }

    /// Loads every `*.json` file in `dir`, sorted by file name.
    pub fn load_dir(dir: &Path) -> Result<(Self, CatalogLoadReport), ApplicationError> {
        let entries = fs::read_dir(dir).map_err(|error| {
            ApplicationError::Input(format!(
                "could not read tire directory `{}`: {error}",
                dir.display()
            ))
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut parsed = Vec::with_capacity(paths.len());
        let mut unreadable = Vec::new();
        for path in paths {
            let source = path.display().to_string();
            let record = fs::read_to_string(&path)
                .map_err(|error| error.to_string())
                .and_then(|raw| {
                    serde_json::from_str::<TireRecord>(&raw).map_err(|error| error.to_string())
                });
            match record {
                Ok(record) => parsed.push((source, record)),
                Err(reason) => unreadable.push(SkippedEntry { source, reason }),
            }
        }

        for entry in &unreadable {
            log_skipped(entry);
        }
        let (catalog, mut report) = Self::from_records(parsed);
        report.skipped.splice(0..0, unreadable);

        tracing::info!(
            event_name = "catalog.loaded",
            loaded = report.loaded,
            skipped = report.skipped.len(),
            dir = %dir.display(),
            "tire catalog loaded"
        );
        Ok((catalog, report))
    }

    pub fn tires(&self) -> &[TireRecord] {
        &self.tires
    }

    pub fn find(&self, id: &TireId) -> Option<&TireRecord> {
        self.tires.iter().find(|tire| &tire.id == id)
    }

    pub fn len(&self) -> usize {
        self.tires.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tires.is_empty()
    }
}

fn skip(report: &mut CatalogLoadReport, source: String, reason: String) {
    let entry = SkippedEntry { source, reason };
    log_skipped(&entry);
    report.skipped.push(entry);
}

fn log_skipped(entry: &SkippedEntry) {
    tracing::warn!(
        event_name = "catalog.entry.skipped",
        source = %entry.source,
        reason = %entry.reason,
        "skipping catalog entry"
    );
}

/// Checks a catalog record and normalises its width list (sorted, unique).
pub fn validate_tire(mut tire: TireRecord) -> Result<TireRecord, DomainError> {
    let invalid = |reason: &str| DomainError::InvalidTire {
        id: tire.id.0.clone(),
        reason: reason.to_string(),
    };

    if tire.id.0.trim().is_empty() {
        return Err(invalid("id must not be empty"));
    }
    if tire.brand.trim().is_empty() || tire.name.trim().is_empty() {
        return Err(invalid("brand and name are required"));
    }
    if tire.widths_mm.is_empty() || tire.widths_mm.contains(&0) {
        return Err(invalid("widths_mm must list at least one positive width"));
    }
    if tire.recommended_use.is_empty() {
        return Err(invalid("recommended_use must not be empty"));
    }
    if tire.msrp_usd.is_some_and(|msrp| msrp <= Decimal::ZERO) {
        return Err(invalid("msrp_usd must be positive"));
    }
    if tire.weight_grams.values().any(|grams| !(grams.is_finite() && grams > 0.0)) {
        return Err(invalid("weight_grams values must be positive"));
    }
    let bad_crr = tire
        .crr_watts_at_29kmh
        .as_ref()
        .is_some_and(|crr| crr.values().any(|watts| !(watts.is_finite() && watts > 0.0)));
    if bad_crr {
        return Err(invalid("crr_watts_at_29kmh values must be positive"));
    }

    tire.widths_mm.sort_unstable();
    tire.widths_mm.dedup();
    Ok(tire)
}
