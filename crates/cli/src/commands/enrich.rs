use chrono::Local;
use serde::Serialize;
use tireguide_core::config::LoadOptions;
use tireguide_core::{enrich_race, run_batch, BatchSummary, EnrichOptions, EnrichOutcome};

use super::{CommandResult, RaceFailure, Session, EXIT_INPUT};

const COMMAND: &str = "enrich";

#[derive(Debug, Serialize)]
struct EnrichReport {
    command: &'static str,
    status: &'static str,
    dry_run: bool,
    summary: EnrichSummary,
    races: Vec<EnrichEntry>,
}

#[derive(Debug, Default, Serialize)]
struct EnrichSummary {
    #[serde(flatten)]
    batch: BatchSummary,
    written: usize,
    previewed: usize,
    skipped: usize,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum EnrichEntry {
    Ok { slug: String, outcome: &'static str, preview: Option<String> },
    Error {
        slug: String,
        #[serde(flatten)]
        failure: RaceFailure,
    },
}

pub fn run(
    load_options: LoadOptions,
    slugs: Vec<String>,
    dry_run: bool,
    force: bool,
) -> CommandResult {
    let session = match Session::open(COMMAND, load_options) {
        Ok(session) => session,
        Err(result) => return result,
    };
    let slugs = match session.resolve_slugs(COMMAND, slugs, false) {
        Ok(slugs) => slugs,
        Err(result) => return result,
    };

    let options = EnrichOptions { dry_run, force, today: Local::now().date_naive() };
    let items = run_batch(&slugs, session.config.engine.parallel, |slug| {
        enrich_race(&session.store, &session.recommender, slug, options)
    });

    let mut summary =
        EnrichSummary { batch: BatchSummary::from_items(&items), ..EnrichSummary::default() };
    let mut races = Vec::with_capacity(items.len());
    for item in items {
        let entry = match item.result {
            Ok(EnrichOutcome::Skipped) => {
                summary.skipped += 1;
                EnrichEntry::Ok { slug: item.slug, outcome: "skipped", preview: None }
            }
            Ok(EnrichOutcome::Previewed { preview }) => {
                summary.previewed += 1;
                EnrichEntry::Ok { slug: item.slug, outcome: "previewed", preview: Some(preview) }
            }
            Ok(EnrichOutcome::Written { preview, .. }) => {
                summary.written += 1;
                EnrichEntry::Ok { slug: item.slug, outcome: "written", preview: Some(preview) }
            }
            Err(error) => {
                EnrichEntry::Error { slug: item.slug, failure: RaceFailure::from_interface(&error) }
            }
        };
        races.push(entry);
    }

    tracing::info!(
        event_name = "cli.enrich.completed",
        written = summary.written,
        previewed = summary.previewed,
        skipped = summary.skipped,
        failed = summary.batch.failed,
        "enrich run finished"
    );

    let (status, exit_code) =
        if summary.batch.all_failed() { ("error", EXIT_INPUT) } else { ("ok", 0) };
    CommandResult::report(
        COMMAND,
        exit_code,
        &EnrichReport { command: COMMAND, status, dry_run, summary, races },
    )
}
