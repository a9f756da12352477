//! Per-race pipeline runs over many race files
//!
//! Each race is independent. A failing race is recorded as an
//! [`InterfaceError`] carrying its slug and the batch carries on.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;

use crate::domain::race::RaceProfile;
use crate::enrichment::{
    apply_recommendations, build_recommendations, is_enriched, preview_line, TireRecommendations,
};
use crate::errors::{ApplicationError, InterfaceError};
use crate::races::RaceStore;
use crate::recommend::{RecommendationBundle, Recommender};
use crate::terrain::build_race_profile;

/// Everything the engine produced for one race.
#[derive(Clone, Debug, Serialize)]
pub struct RaceRecommendation {
    pub slug: String,
    pub race_name: String,
    pub profile: RaceProfile,
    pub bundle: RecommendationBundle,
}

pub fn recommend_race(
    store: &RaceStore,
    recommender: &dyn Recommender,
    slug: &str,
) -> Result<RaceRecommendation, ApplicationError> {
    let document = store.load_race(slug)?;
    let weather = store.load_weather(slug);
    let profile = build_race_profile(document.race(), &weather);
    let bundle = recommender.recommend(&profile);

    tracing::info!(
        event_name = "batch.race.recommended",
        slug,
        surface = %profile.surface_category,
        technical_rating = profile.technical_rating,
        picks = bundle.picks.len(),
        "race recommended"
    );

    Ok(RaceRecommendation {
        slug: slug.to_string(),
        race_name: document.display_name(),
        profile,
        bundle,
    })
}

#[derive(Clone, Copy, Debug)]
pub struct EnrichOptions {
    pub dry_run: bool,
    pub force: bool,
    pub today: NaiveDate,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EnrichOutcome {
    /// Already carries recommendations and neither `force` nor `dry_run` was set.
    Skipped,
    Previewed { preview: String },
    Written { preview: String, record: TireRecommendations },
}

pub fn enrich_race(
    store: &RaceStore,
    recommender: &dyn Recommender,
    slug: &str,
    options: EnrichOptions,
) -> Result<EnrichOutcome, ApplicationError> {
    let mut document = store.load_race(slug)?;
    if is_enriched(&document) && !options.force && !options.dry_run {
        tracing::debug!(event_name = "enrich.race.skipped", slug, "race already enriched");
        return Ok(EnrichOutcome::Skipped);
    }

    let weather = store.load_weather(slug);
    let profile = build_race_profile(document.race(), &weather);
    let bundle = recommender.recommend(&profile);
    let record = build_recommendations(&bundle, &document.display_name(), options.today);
    let preview = preview_line(slug, &record);

    if options.dry_run {
        return Ok(EnrichOutcome::Previewed { preview });
    }

    apply_recommendations(&mut document, &record)?;
    store.save_race(document)?;
    tracing::info!(event_name = "enrich.race.written", slug, "tire recommendations written");
    Ok(EnrichOutcome::Written { preview, record })
}

#[derive(Clone, Debug)]
pub struct BatchItem<T> {
    pub slug: String,
    pub result: Result<T, InterfaceError>,
}

fn run_one<T, F>(slug: &str, task: &F) -> BatchItem<T>
where
    F: Fn(&str) -> Result<T, ApplicationError>,
{
    let span = tracing::info_span!("race", slug);
    let _entered = span.enter();
    let result = task(slug).map_err(|error| {
        let mapped = error.into_interface(slug);
        tracing::warn!(
            event_name = "batch.race.failed",
            slug,
            error = %mapped,
            "race skipped"
        );
        mapped
    });
    BatchItem { slug: slug.to_string(), result }
}

/// Runs `task` for every slug, in input order. With `parallel` the races are
/// spread across the rayon pool; results still come back in input order.
pub fn run_batch<T, F>(slugs: &[String], parallel: bool, task: F) -> Vec<BatchItem<T>>
where
    T: Send,
    F: Fn(&str) -> Result<T, ApplicationError> + Sync,
{
    if parallel {
        slugs.par_iter().map(|slug| run_one(slug, &task)).collect()
    } else {
        slugs.iter().map(|slug| run_one(slug, &task)).collect()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_items<T>(items: &[BatchItem<T>]) -> Self {
        let failed = items.iter().filter(|item| item.result.is_err()).count();
        Self { total: items.len(), succeeded: items.len() - failed, failed }
    }

    pub fn all_failed(&self) -> bool {
        self.total > 0 && self.succeeded == 0
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use chrono::NaiveDate;
    use serde_json::json;
    use tempfile::TempDir;

    use super::{enrich_race, recommend_race, run_batch, BatchSummary, EnrichOptions, EnrichOutcome};
    use crate::catalog::TireCatalog;
    use crate::domain::tire::TireRecord;
    use crate::errors::{ApplicationError, InterfaceError};
    use crate::races::RaceStore;
    use crate::recommend::DeterministicRecommender;

    fn recommender() -> DeterministicRecommender {
        let tire: TireRecord = serde_json::from_value(json!({
            "id": "allroad",
            "brand": "Test",
            "name": "Allroad",
            "widths_mm": [38, 40, 42, 45],
            "tread_type": "knobby",
            "recommended_use": ["mixed gravel"],
            "puncture_resistance": "moderate",
            "wet_traction": "fair",
            "mud_clearance": "moderate",
            "msrp_usd": 55.0
        }))
        .expect("fixture should parse");
        DeterministicRecommender::new(Arc::new(TireCatalog::new(vec![tire])))
    }

    fn store_with(races: &[(&str, &str)]) -> (TempDir, RaceStore) {
        let dir = TempDir::new().expect("tempdir");
        let race_dir = dir.path().join("races");
        fs::create_dir_all(&race_dir).expect("race dir");
        for (slug, body) in races {
            fs::write(race_dir.join(format!("{slug}.json")), body).expect("race file");
        }
        let store = RaceStore::new(race_dir, dir.path().join("weather"));
        (dir, store)
    }

    fn options(dry_run: bool, force: bool) -> EnrichOptions {
        EnrichOptions {
            dry_run,
            force,
            today: NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date"),
        }
    }

    #[test]
    fn recommend_race_uses_display_name_and_profile() {
        let (_dir, store) = store_with(&[(
            "mid-south",
            r#"{"race": {"name": "The Mid South",
                "terrain": {"surface": "red clay and mud", "technical_rating": 3}}}"#,
        )]);

        let outcome =
            recommend_race(&store, &recommender(), "mid-south").expect("race should recommend");
        assert_eq!(outcome.race_name, "The Mid South");
        assert_eq!(outcome.profile.technical_rating, 3);
        assert_eq!(outcome.bundle.picks.len(), 1);
    }

    #[test]
    fn batch_continues_past_bad_races_and_keeps_order() {
        let (_dir, store) = store_with(&[("good", r#"{"name": "Good"}"#), ("bad", "[1, 2]")]);
        let engine = recommender();
        let slugs = vec!["bad".to_string(), "good".to_string(), "missing".to_string()];

        for parallel in [false, true] {
            let items = run_batch(&slugs, parallel, |slug| recommend_race(&store, &engine, slug));

            let order: Vec<&str> = items.iter().map(|item| item.slug.as_str()).collect();
            assert_eq!(order, vec!["bad", "good", "missing"]);
            assert!(matches!(
                items[0].result,
                Err(InterfaceError::BadInput { ref race_slug, .. }) if race_slug == "bad"
            ));
            assert!(items[1].result.is_ok());
            assert!(matches!(items[2].result, Err(InterfaceError::Unavailable { .. })));

            let summary = BatchSummary::from_items(&items);
            assert_eq!(summary, BatchSummary { total: 3, succeeded: 1, failed: 2 });
            assert!(!summary.all_failed());
        }
    }

    #[test]
    fn summary_flags_when_every_race_failed() {
        let items = run_batch(&["x".to_string()], false, |_| -> Result<(), ApplicationError> {
            Err(ApplicationError::Input("nope".to_string()))
        });
        assert!(BatchSummary::from_items(&items).all_failed());
        assert!(!BatchSummary::default().all_failed());
    }

    #[test]
    fn enrich_writes_then_skips_unless_forced() {
        let (_dir, store) = store_with(&[("bwr", r#"{"race": {"name": "BWR"}}"#)]);
        let engine = recommender();

        let preview = enrich_race(&store, &engine, "bwr", options(true, false))
            .expect("dry run should succeed");
        assert!(matches!(
            preview,
            EnrichOutcome::Previewed { ref preview } if preview.starts_with("bwr: #1 Allroad")
        ));
        let untouched = fs::read_to_string(store.race_path("bwr")).expect("race file");
        assert!(!untouched.contains("tire_recommendations"));

        let written = enrich_race(&store, &engine, "bwr", options(false, false)).expect("write");
        assert!(matches!(written, EnrichOutcome::Written { .. }));
        let saved: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.race_path("bwr")).expect("race file"))
                .expect("saved race is JSON");
        assert_eq!(saved["race"]["tire_recommendations"]["primary"][0]["tire_id"], "allroad");

        let again = enrich_race(&store, &engine, "bwr", options(false, false)).expect("skip");
        assert_eq!(again, EnrichOutcome::Skipped);

        let forced = enrich_race(&store, &engine, "bwr", options(false, true)).expect("force");
        assert!(matches!(forced, EnrichOutcome::Written { .. }));
    }

    #[test]
    fn dry_run_previews_races_that_are_already_enriched() {
        let (_dir, store) = store_with(&[("bwr", r#"{"race": {"name": "BWR"}}"#)]);
        let engine = recommender();
        enrich_race(&store, &engine, "bwr", options(false, false)).expect("first write");
        let before = fs::read_to_string(store.race_path("bwr")).expect("race file");

        let preview = enrich_race(&store, &engine, "bwr", options(true, false)).expect("dry run");
        assert!(matches!(
            preview,
            EnrichOutcome::Previewed { ref preview } if preview.starts_with("bwr: #1 Allroad")
        ));
        let after = fs::read_to_string(store.race_path("bwr")).expect("race file");
        assert_eq!(before, after);
    }
}
