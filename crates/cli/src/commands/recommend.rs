use std::fs;
use std::path::PathBuf;

use serde::Serialize;
use tireguide_core::config::LoadOptions;
use tireguide_core::{recommend_race, run_batch, BatchSummary, RaceRecommendation};

use super::{CommandResult, RaceFailure, Session, EXIT_INPUT};

const COMMAND: &str = "recommend";

#[derive(Debug, Serialize)]
struct RecommendReport {
    command: &'static str,
    status: &'static str,
    summary: BatchSummary,
    races: Vec<RaceEntry>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum RaceEntry {
    Ok {
        slug: String,
        #[serde(flatten)]
        output: RaceOutput,
    },
    Error {
        slug: String,
        #[serde(flatten)]
        failure: RaceFailure,
    },
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RaceOutput {
    Inline { recommendation: Box<RaceRecommendation> },
    Written { path: PathBuf },
}

pub fn run(options: LoadOptions, slugs: Vec<String>, all: bool, write: bool) -> CommandResult {
    let session = match Session::open(COMMAND, options) {
        Ok(session) => session,
        Err(result) => return result,
    };
    let slugs = match session.resolve_slugs(COMMAND, slugs, all) {
        Ok(slugs) => slugs,
        Err(result) => return result,
    };

    let output_dir = &session.config.data.output_dir;
    if write {
        if let Err(error) = fs::create_dir_all(output_dir) {
            return CommandResult::failure(
                COMMAND,
                "output_unavailable",
                format!("could not create output directory `{}`: {error}", output_dir.display()),
                EXIT_INPUT,
            );
        }
    }

    let items = run_batch(&slugs, session.config.engine.parallel, |slug| {
        recommend_race(&session.store, &session.recommender, slug)
    });
    let mut summary = BatchSummary::from_items(&items);

    let mut races = Vec::with_capacity(items.len());
    for item in items {
        let entry = match item.result {
            Ok(recommendation) if write => {
                let path = output_dir.join(format!("{}.json", item.slug));
                match write_recommendation(&path, &recommendation) {
                    Ok(()) => {
                        RaceEntry::Ok { slug: item.slug, output: RaceOutput::Written { path } }
                    }
                    Err(detail) => {
                        tracing::warn!(
                            event_name = "cli.recommend.write_failed",
                            slug = %item.slug,
                            error = %detail,
                            "could not write recommendation"
                        );
                        summary.succeeded -= 1;
                        summary.failed += 1;
                        RaceEntry::Error { slug: item.slug, failure: RaceFailure::output(detail) }
                    }
                }
            }
            Ok(recommendation) => RaceEntry::Ok {
                slug: item.slug,
                output: RaceOutput::Inline { recommendation: Box::new(recommendation) },
            },
            Err(error) => {
                RaceEntry::Error { slug: item.slug, failure: RaceFailure::from_interface(&error) }
            }
        };
        races.push(entry);
    }

    tracing::info!(
        event_name = "cli.recommend.completed",
        total = summary.total,
        failed = summary.failed,
        "recommend run finished"
    );

    let (status, exit_code) = if summary.all_failed() { ("error", EXIT_INPUT) } else { ("ok", 0) };
    CommandResult::report(
        COMMAND,
        exit_code,
        &RecommendReport { command: COMMAND, status, summary, races },
    )
}

fn write_recommendation(
    path: &std::path::Path,
    recommendation: &RaceRecommendation,
) -> Result<(), String> {
    let mut body = serde_json::to_string_pretty(recommendation)
        .map_err(|error| format!("could not serialize `{}`: {error}", recommendation.slug))?;
    body.push('\n');
    fs::write(path, body).map_err(|error| format!("could not write `{}`: {error}", path.display()))
}
