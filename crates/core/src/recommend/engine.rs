//! Recommendation engine entry point

use std::sync::Arc;

use super::alternatives::find_condition_alternatives;
use super::explanation::explain_pick;
use super::filter::filter_with_fallback;
use super::pressure::compute_pressure_table;
use super::ranking::rank_candidates;
use super::scoring::{ScoreCalculator, ScoringWeights};
use super::setup::build_setup_strategy;
use super::split::advise_front_rear_split;
use super::types::{PickFacts, RankedPick, RecommendationBundle, ScoredCandidate};
use super::{DEFAULT_TOP_N, FALLBACK_WIDTH_MM};
use crate::catalog::TireCatalog;
use crate::domain::race::RaceProfile;

pub trait Recommender: Send + Sync {
    fn recommend(&self, profile: &RaceProfile) -> RecommendationBundle;
}

/// Filter-then-rank recommender over an immutable catalog. Holds no mutable
/// state, so one instance can serve many races concurrently.
#[derive(Debug, Clone)]
pub struct DeterministicRecommender {
    catalog: Arc<TireCatalog>,
    calculator: ScoreCalculator,
    top_n: usize,
}

impl DeterministicRecommender {
    pub fn new(catalog: Arc<TireCatalog>) -> Self {
        Self { catalog, calculator: ScoreCalculator::new(), top_n: DEFAULT_TOP_N }
    }

    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.calculator = ScoreCalculator::with_weights(weights);
        self
    }

    /// Number of ranked picks to return; at least one.
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n.max(1);
        self
    }

    pub fn catalog(&self) -> &TireCatalog {
        &self.catalog
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    fn ranked_pick(
        &self,
        rank: usize,
        candidate: &ScoredCandidate<'_>,
        profile: &RaceProfile,
    ) -> RankedPick {
        let tire = candidate.tire;
        RankedPick {
            rank,
            tire_id: tire.id.clone(),
            brand: tire.brand.clone(),
            name: tire.name.clone(),
            tread_type: tire.tread_type,
            score: candidate.score,
            recommended_width_mm: candidate.width_mm,
            facts: PickFacts {
                crr_watts: tire.crr_watts_near(candidate.width_mm),
                weight_grams: tire.weight_near(candidate.width_mm).map(|(_, grams)| grams),
                puncture_resistance: tire.puncture_resistance,
                msrp_usd: tire.msrp_usd,
            },
            breakdown: candidate.breakdown,
            explanation: explain_pick(tire, profile, candidate.width_mm),
        }
    }
}

impl Recommender for DeterministicRecommender {
    fn recommend(&self, profile: &RaceProfile) -> RecommendationBundle {
        let tires = self.catalog.tires();
        let filtered = filter_with_fallback(tires, profile);
        let ranked = rank_candidates(&filtered.candidates, profile, &self.calculator);
        let top = &ranked[..self.top_n.min(ranked.len())];

        let recommended_width_mm = top.first().map_or(FALLBACK_WIDTH_MM, |best| best.width_mm);
        let front_rear_split = advise_front_rear_split(profile, &ranked, top.len());
        let alternatives = find_condition_alternatives(tires, profile, top, &self.calculator);
        let picks: Vec<RankedPick> = top
            .iter()
            .enumerate()
            .map(|(index, candidate)| self.ranked_pick(index + 1, candidate, profile))
            .collect();

        tracing::debug!(
            event_name = "recommend.ranked",
            surface_category = %profile.surface_category,
            candidates = ranked.len(),
            picks = picks.len(),
            filter_fallback = filtered.fallback,
            "tires ranked"
        );

        RecommendationBundle {
            surface_category: profile.surface_category,
            technical_rating: profile.technical_rating,
            filter_fallback: filtered.fallback,
            recommended_width_mm,
            picks,
            front_rear_split,
            pressure_table: compute_pressure_table(profile.technical_rating, recommended_width_mm),
            setup: build_setup_strategy(
                profile.technical_rating,
                recommended_width_mm,
                profile.needs_puncture,
            ),
            alternatives,
        }
    }
}
